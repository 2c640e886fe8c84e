//! Request-scoped agents.
//!
//! - `research`: tool-using reasoning loop that gathers live web context
//! - `synthesizer`: single-call itinerary generation from all gathered context

pub mod research;
pub mod synthesizer;

pub use research::ResearchAgent;
