use std::sync::Arc;

use anyhow::Result;
use tracing::info;

mod config;
mod jobs;
mod logging;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = config::Config::load()?;

    // Initialize logging
    logging::init_logging(&config.logging);

    info!("Starting PetClinic backend v{}", env!("CARGO_PKG_VERSION"));

    // Connection source. The pool connects lazily on first use.
    let pool = persistence::db::create_pool(&config.database)?;

    // Build the persistence factory and bind the transaction manager
    let factory = Arc::new(persistence::factory::build_persistence_factory(
        &pool,
        &config.jpa,
        &config.cache,
    )?);
    info!(
        dialect = factory.dialect(),
        ddl_auto = factory.ddl_auto(),
        show_sql = factory.show_sql(),
        cache_provider = factory.cache().provider(),
        "Persistence factory ready"
    );
    for (key, value) in factory.properties().iter() {
        tracing::debug!(key, value, "Engine property");
    }

    let tx_manager = persistence::tx::TransactionManager::new(factory.clone());

    // Under the validate policy, probe the database before accepting work
    if factory.ddl_auto() == "validate" {
        let tx = tx_manager.begin().await?;
        tx.rollback().await?;
        info!("Database connection validated");
    }

    jobs::spawn_metrics_recorder(pool.clone(), factory);

    info!("Startup complete, waiting for shutdown signal");
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received, closing connection pool");
    pool.close().await;

    Ok(())
}
