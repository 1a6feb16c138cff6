//! Application state wiring storage, the generation backend, and the tale
//! service together.
//!
//! `TaleService` is generic over its repository; AppState pins it to the
//! SQLite implementation. Used by both CLI commands and REST handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use taleweaver_core::service::tale::TaleService;
use taleweaver_core::tale::synthesizer::TaleSynthesizer;
use taleweaver_infra::config::{load_global_config, resolve_data_dir};
use taleweaver_infra::llm::provider_from_config;
use taleweaver_infra::sqlite::pool::{DatabasePool, database_url};
use taleweaver_infra::sqlite::tale::SqliteTaleRepository;
use taleweaver_types::config::GlobalConfig;

pub type ConcreteTaleService = TaleService<SqliteTaleRepository>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub tale_service: Arc<ConcreteTaleService>,
    pub config: Arc<GlobalConfig>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Resolve the data directory, load `config.toml`, and wire services.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;
        let config = load_global_config(&data_dir).await;
        Self::build(&data_dir, config).await
    }

    /// Wire services against the database in `data_dir` using `config`.
    pub async fn build(data_dir: &Path, config: GlobalConfig) -> anyhow::Result<Self> {
        let db_pool = DatabasePool::new(&database_url(data_dir)).await?;
        let repo = SqliteTaleRepository::new(db_pool);

        let provider = provider_from_config(config.provider.as_ref());
        if provider.is_none() && !config.generation.fallback_enabled {
            tracing::warn!("no generation backend and template fallback disabled; generation will be unavailable");
        }
        let synthesizer = TaleSynthesizer::new(provider, config.generation.clone());

        Ok(Self {
            tale_service: Arc::new(TaleService::new(repo, synthesizer)),
            config: Arc::new(config),
            data_dir: data_dir.to_path_buf(),
        })
    }
}
