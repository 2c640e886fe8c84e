use std::sync::Arc;

use crate::config::AppConfig;
use crate::history::HistoryStore;
use crate::knowledge::KnowledgeService;
use crate::llm::gemini::GeminiProvider;
use crate::llm::LlmProvider;
use crate::tools::wikipedia::WikipediaTool;
use crate::tools::LookupTool;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub llm: Arc<dyn LlmProvider>,
    pub tool: Arc<dyn LookupTool>,
    pub knowledge: Arc<KnowledgeService>,
    pub history: HistoryStore,
}

impl AppState {
    pub fn initialize(config: AppConfig) -> Self {
        let llm: Arc<dyn LlmProvider> = Arc::new(GeminiProvider::new(config.google_api_key.clone()));
        let tool: Arc<dyn LookupTool> = Arc::new(WikipediaTool::new());
        let knowledge = Arc::new(KnowledgeService::new(
            llm.clone(),
            config.knowledge_sources.clone(),
        ));
        let history = HistoryStore::new(config.history_path.clone());

        AppState {
            config: Arc::new(config),
            llm,
            tool,
            knowledge,
            history,
        }
    }
}
