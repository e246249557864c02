use thiserror::Error;
use tracing::info;
use wardrobe_core::config::{AppConfig, ConfigError, LoadOptions};
use wardrobe_core::lifecycle::{DurabilityScorer, DurabilityTables};
use wardrobe_db::{connect_with_settings, migrations, DbPool};

use crate::service::{Repositories, WardrobeService};

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub service: WardrobeService,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

/// Wires an already-loaded configuration into a running service.
pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let scorer = DurabilityScorer::new(DurabilityTables::from_config(&config.lifecycle));
    let service = WardrobeService::new(Repositories::sql(db_pool.clone()), scorer);

    Ok(Application { config, db_pool, service })
}
