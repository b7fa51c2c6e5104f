//! Application state wiring all services together.
//!
//! Services are generic over the repository traits in agentdesk-core;
//! AppState pins them to the SQLite implementations.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use agentdesk_core::relay::{RelaySettings, StreamRelay};
use agentdesk_core::service::agent::AgentService;
use agentdesk_core::service::conversation::ConversationService;
use agentdesk_core::source::FragmentSource;
use agentdesk_core::source::simulated::SimulatedGenerator;
use agentdesk_infra::llm::openai_compat::OpenAiCompatClient;
use agentdesk_infra::sqlite::agent::SqliteAgentRepository;
use agentdesk_infra::sqlite::conversation::SqliteConversationRepository;
use agentdesk_infra::sqlite::pool::{DatabasePool, database_url};
use agentdesk_types::config::AppConfig;

pub type ConcreteAgentService = AgentService<SqliteAgentRepository>;

pub type ConcreteConversationService =
    ConversationService<SqliteAgentRepository, SqliteConversationRepository>;

pub type ConcreteStreamRelay = StreamRelay<SqliteAgentRepository, SqliteConversationRepository>;

/// Shared state for the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub agent_service: Arc<ConcreteAgentService>,
    pub conversation_service: Arc<ConcreteConversationService>,
    pub relay: Arc<ConcreteStreamRelay>,
    pub config: Arc<AppConfig>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Open the database under `data_dir` and build the upstream client.
    ///
    /// A missing credential is not fatal: the server still runs, and
    /// streams for upstream-routed agents are refused with 503.
    pub async fn init(data_dir: PathBuf, config: AppConfig) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(&data_dir).await?;

        let db_pool = DatabasePool::new(&database_url(&data_dir)).await?;

        let upstream: Option<Arc<dyn FragmentSource>> =
            match OpenAiCompatClient::from_env(&config.upstream) {
                Ok(client) => {
                    tracing::info!(
                        endpoint = %client.endpoint(),
                        mode = %client.mode(),
                        "upstream client configured"
                    );
                    Some(Arc::new(client))
                }
                Err(e) => {
                    tracing::warn!("upstream client unavailable: {e}");
                    None
                }
            };

        Ok(Self::from_parts(db_pool, config, upstream, data_dir))
    }

    /// Wire services over an already opened pool.
    pub fn from_parts(
        db_pool: DatabasePool,
        config: AppConfig,
        upstream: Option<Arc<dyn FragmentSource>>,
        data_dir: PathBuf,
    ) -> Self {
        let agents = Arc::new(SqliteAgentRepository::new(db_pool.clone()));
        let conversations = Arc::new(SqliteConversationRepository::new(db_pool));

        let relay = StreamRelay::new(
            agents.clone(),
            conversations.clone(),
            upstream,
            SimulatedGenerator::new(Duration::from_millis(config.relay.simulated_delay_ms)),
            RelaySettings::from(&config.relay),
        );

        Self {
            agent_service: Arc::new(AgentService::new(agents.clone())),
            conversation_service: Arc::new(ConversationService::new(agents, conversations)),
            relay: Arc::new(relay),
            config: Arc::new(config),
            data_dir,
        }
    }
}
