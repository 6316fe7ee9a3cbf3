pub mod analysis;
pub mod config;
pub mod credentials;
pub mod db;
pub mod domain;
pub mod error;
pub mod history;
pub mod orchestrator;
pub mod transport;
pub mod utilities;

use std::sync::Arc;

use log::info;

pub use analysis::{AnalysisClient, GeminiService, ReasoningService};
pub use config::Config;
pub use db::{MemoryStore, Persistence, PulseDb};
pub use domain::{
    request::{HttpMethod, KeyValue, KeyValues, Request, RequestDraft},
    request_item::HistoryEntry,
    response::Response,
    suggestion::Suggestion,
    ui::{Event, State},
};
pub use error::{MissingCredential, OrchestratorError, ValidationError};
pub use history::{HistoryStore, HistoryView};
pub use orchestrator::Orchestrator;
pub use transport::{HttpTransport, ReqwestTransport, TransportError};

pub struct PulseApi;

impl PulseApi {
    /// Orchestrator backed by the SQLite file in `config.db_path`, the
    /// reqwest transport and the Gemini service.
    pub async fn open(config: &Config) -> anyhow::Result<Orchestrator> {
        let db = PulseDb::new(&config.db_path).await?;
        Ok(Self::with_persistence(config, Arc::new(db)).await)
    }

    /// Same wiring as `open`, with the caller's storage.
    pub async fn with_persistence(
        config: &Config,
        persistence: Arc<dyn Persistence>,
    ) -> Orchestrator {
        info!("using model {} at {}", config.model, config.ai_base_url);
        Orchestrator::with_persistence(
            config,
            persistence,
            Arc::new(ReqwestTransport::new()),
            Arc::new(GeminiService::new_with_base_url(&config.ai_base_url)),
        )
        .await
    }
}
