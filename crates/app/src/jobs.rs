//! Background task recording connection pool and cache metrics.

use std::sync::Arc;
use std::time::Duration;

use persistence::factory::PersistenceFactory;
use sqlx::PgPool;

// Record every 10 seconds for real-time monitoring.
const RECORD_INTERVAL: Duration = Duration::from_secs(10);

/// Spawn the periodic metrics recorder for the pool and second-level cache.
pub fn spawn_metrics_recorder(pool: PgPool, factory: Arc<PersistenceFactory>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(RECORD_INTERVAL);
        loop {
            ticker.tick().await;
            persistence::metrics::record_pool_metrics(&pool);
            persistence::metrics::record_cache_metrics(factory.cache());
            tracing::debug!("Recorded pool and cache metrics");
        }
    });
}
