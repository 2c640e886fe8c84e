//! Environment-based configuration, loaded once at startup.

use std::env;
use std::path::PathBuf;

/// Default web sources for the knowledge base.
const DEFAULT_SOURCES: [&str; 2] = [
    "https://pt.wikipedia.org/wiki/Turismo_no_Brasil",
    "https://www.viajenaviagem.com/",
];

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Credential for the language-model and embedding provider. May be
    /// empty, in which case every provider call fails at first use.
    pub google_api_key: String,
    pub history_path: PathBuf,
    pub log_dir: PathBuf,
    pub knowledge_sources: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let port = env::var("PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse()?;

        let google_api_key = env::var("GOOGLE_API_KEY").unwrap_or_default();
        if google_api_key.is_empty() {
            tracing::warn!("GOOGLE_API_KEY is not set; provider calls will fail");
        }

        let history_path = env::var("HISTORY_PATH")
            .unwrap_or_else(|_| "historico.json".to_string())
            .into();

        let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()).into();

        let knowledge_sources = match env::var("KNOWLEDGE_SOURCES") {
            Ok(raw) => raw
                .split(',')
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty())
                .collect(),
            Err(_) => DEFAULT_SOURCES.iter().map(|url| url.to_string()).collect(),
        };

        Ok(Self {
            port,
            google_api_key,
            history_path,
            log_dir,
            knowledge_sources,
        })
    }
}
