//! Persistence metrics collection.
//!
//! Provides functions for recording connection pool and second-level cache
//! metrics.

use metrics::gauge;
use sqlx::PgPool;

use crate::cache::{EntityCache, QUERY_REGION};

/// Record database connection pool metrics.
///
/// Call this function periodically to track pool health.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();
    let active = size.saturating_sub(idle);

    gauge!("database_connections_active").set(active as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_total").set(size as f64);
}

/// Record second-level cache occupancy per region.
pub fn record_cache_metrics(cache: &EntityCache) {
    gauge!(
        "second_level_cache_entries",
        "region" => cache.namespace().to_string()
    )
    .set(cache.entity_entry_count() as f64);

    gauge!(
        "second_level_cache_entries",
        "region" => QUERY_REGION.to_string()
    )
    .set(cache.query_entry_count() as f64);
}
