//! Second-level cache assembly.
//!
//! Builds the shared entity and query cache regions from the configured
//! provider and region tuning file. Eviction and expiry are delegated to
//! the cache provider; nothing here implements caching policy.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::error::PersistenceError;
use crate::settings::CacheSettings;

/// The one supported cache provider.
pub const MOKA_PROVIDER: &str = "moka";

/// Name of the shared query result region.
pub const QUERY_REGION: &str = "query";

/// Tuning for a single cache region.
#[derive(Debug, Clone, Deserialize)]
pub struct RegionConfig {
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,

    #[serde(default = "default_time_to_live")]
    pub time_to_live_secs: u64,

    #[serde(default = "default_time_to_idle")]
    pub time_to_idle_secs: u64,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            max_capacity: default_max_capacity(),
            time_to_live_secs: default_time_to_live(),
            time_to_idle_secs: default_time_to_idle(),
        }
    }
}

fn default_max_capacity() -> u64 {
    10_000
}
fn default_time_to_live() -> u64 {
    300
}
fn default_time_to_idle() -> u64 {
    60
}

/// Region tuning loaded from the cache settings file.
///
/// The `[default]` table supplies the fallback; `[regions.<name>]` tables
/// override individual regions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegionSettings {
    #[serde(default)]
    pub default: RegionConfig,

    #[serde(default)]
    pub regions: HashMap<String, RegionConfig>,
}

impl RegionSettings {
    /// Load region tuning from the given file.
    ///
    /// A missing file falls back to built-in defaults; an unreadable or
    /// malformed file is a startup failure.
    pub fn load(uri: &str) -> Result<Self, PersistenceError> {
        if !Path::new(uri).exists() {
            warn!(uri, "Cache settings file not found, using built-in region defaults");
            return Ok(Self::default());
        }

        let settings = config::Config::builder()
            .add_source(config::File::with_name(uri))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    /// Tuning for the named region, falling back to the default table.
    pub fn for_region(&self, name: &str) -> &RegionConfig {
        self.regions.get(name).unwrap_or(&self.default)
    }
}

/// Shared second-level cache handle.
///
/// Holds one region for entities, keyed by namespaced entity identity, and
/// one region for query results, keyed by query fingerprint. Values are
/// stored as shared JSON documents.
#[derive(Debug)]
pub struct EntityCache {
    provider: String,
    namespace: String,
    entities: Cache<String, Arc<Value>>,
    queries: Cache<String, Arc<Value>>,
}

impl EntityCache {
    /// Name of the provider backing this cache.
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Namespace used to key the entity region.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn get_entity(&self, entity: &str, id: &str) -> Option<Arc<Value>> {
        self.entities.get(&self.entity_key(entity, id))
    }

    pub fn put_entity(&self, entity: &str, id: &str, value: Arc<Value>) {
        self.entities.insert(self.entity_key(entity, id), value);
    }

    pub fn get_query(&self, fingerprint: &str) -> Option<Arc<Value>> {
        self.queries.get(fingerprint)
    }

    pub fn put_query(&self, fingerprint: &str, value: Arc<Value>) {
        self.queries.insert(fingerprint.to_string(), value);
    }

    /// Drop every cached entity and query result.
    pub fn invalidate_all(&self) {
        self.entities.invalidate_all();
        self.queries.invalidate_all();
    }

    /// Number of entries currently held in the entity region.
    pub fn entity_entry_count(&self) -> u64 {
        self.entities.run_pending_tasks();
        self.entities.entry_count()
    }

    /// Number of entries currently held in the query region.
    pub fn query_entry_count(&self) -> u64 {
        self.queries.run_pending_tasks();
        self.queries.entry_count()
    }

    fn entity_key(&self, entity: &str, id: &str) -> String {
        format!("{}.{}:{}", self.namespace, entity, id)
    }
}

/// Build the second-level cache from the given settings.
///
/// Only the moka provider is supported; an unknown provider name is a
/// startup configuration failure.
pub fn build_entity_cache(
    settings: &CacheSettings,
    namespace: &str,
) -> Result<EntityCache, PersistenceError> {
    if settings.provider != MOKA_PROVIDER {
        return Err(PersistenceError::UnsupportedCacheProvider(
            settings.provider.clone(),
        ));
    }

    let regions = RegionSettings::load(&settings.uri)?;

    Ok(EntityCache {
        provider: settings.provider.clone(),
        namespace: namespace.to_string(),
        entities: build_region(regions.for_region(namespace)),
        queries: build_region(regions.for_region(QUERY_REGION)),
    })
}

fn build_region(config: &RegionConfig) -> Cache<String, Arc<Value>> {
    Cache::builder()
        .max_capacity(config.max_capacity)
        .time_to_live(Duration::from_secs(config.time_to_live_secs))
        .time_to_idle(Duration::from_secs(config.time_to_idle_secs))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn moka_settings() -> CacheSettings {
        CacheSettings {
            provider: "moka".to_string(),
            uri: "does-not-exist/cache.toml".to_string(),
        }
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let settings = CacheSettings {
            provider: "redis".to_string(),
            ..CacheSettings::default()
        };

        let err = build_entity_cache(&settings, "petclinic.model").unwrap_err();
        assert!(matches!(err, PersistenceError::UnsupportedCacheProvider(p) if p == "redis"));
    }

    #[test]
    fn test_missing_tuning_file_uses_defaults() {
        let cache =
            build_entity_cache(&moka_settings(), "petclinic.model").expect("Failed to build cache");

        assert_eq!(cache.provider(), "moka");
        assert_eq!(cache.namespace(), "petclinic.model");
        assert_eq!(cache.entity_entry_count(), 0);
    }

    #[test]
    fn test_entity_round_trip() {
        let cache =
            build_entity_cache(&moka_settings(), "petclinic.model").expect("Failed to build cache");

        let owner = Arc::new(json!({"id": 7, "last_name": "Davis"}));
        cache.put_entity("Owner", "7", owner.clone());

        let cached = cache.get_entity("Owner", "7").expect("Entity not cached");
        assert_eq!(cached, owner);
        assert!(cache.get_entity("Owner", "8").is_none());
        assert!(cache.get_entity("Pet", "7").is_none());
    }

    #[test]
    fn test_query_region_and_invalidation() {
        let cache =
            build_entity_cache(&moka_settings(), "petclinic.model").expect("Failed to build cache");

        cache.put_query("owners:by-city:Madison", Arc::new(json!([1, 2, 3])));
        assert!(cache.get_query("owners:by-city:Madison").is_some());

        cache.invalidate_all();
        assert!(cache.get_query("owners:by-city:Madison").is_none());
        assert_eq!(cache.query_entry_count(), 0);
    }

    #[test]
    fn test_region_settings_fallback() {
        let toml = r#"
            [default]
            max_capacity = 100

            [regions.query]
            time_to_live_secs = 30
        "#;

        let settings: RegionSettings = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .expect("Failed to build config")
            .try_deserialize()
            .expect("Failed to deserialize");

        assert_eq!(settings.default.max_capacity, 100);
        assert_eq!(settings.default.time_to_live_secs, 300);
        assert_eq!(settings.for_region("query").time_to_live_secs, 30);
        assert_eq!(settings.for_region("unknown").max_capacity, 100);
    }
}
