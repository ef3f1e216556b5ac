//! Settings consumed by the persistence layer.
//!
//! All structs deserialize from the layered application configuration.
//! Optional keys carry serde defaults; `jpa.database_platform` is the one
//! required key and is rejected at factory construction when left empty.

use serde::Deserialize;

/// Connection pool settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionSettings {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

/// Object-relational engine settings.
#[derive(Debug, Clone, Deserialize)]
pub struct JpaSettings {
    /// Database platform the engine generates SQL for. Required.
    #[serde(default)]
    pub database_platform: String,

    /// Echo executed SQL statements to the log.
    #[serde(default)]
    pub show_sql: bool,

    /// Pretty-print echoed SQL statements.
    #[serde(default)]
    pub format_sql: bool,

    /// Schema handling policy applied at startup.
    #[serde(default = "default_ddl_auto")]
    pub ddl_auto: String,
}

impl Default for JpaSettings {
    fn default() -> Self {
        Self {
            database_platform: String::new(),
            show_sql: false,
            format_sql: false,
            ddl_auto: default_ddl_auto(),
        }
    }
}

/// Second-level cache settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// Cache provider backing the entity and query regions.
    #[serde(default = "default_cache_provider")]
    pub provider: String,

    /// Location of the region tuning file.
    #[serde(default = "default_cache_uri")]
    pub uri: String,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            provider: default_cache_provider(),
            uri: default_cache_uri(),
        }
    }
}

// Default value functions
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    5
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_ddl_auto() -> String {
    "validate".to_string()
}
fn default_cache_provider() -> String {
    "moka".to_string()
}
fn default_cache_uri() -> String {
    "config/cache.toml".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml<T: for<'de> Deserialize<'de>>(toml: &str) -> T {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .expect("Failed to build config")
            .try_deserialize()
            .expect("Failed to deserialize")
    }

    #[test]
    fn test_jpa_settings_defaults() {
        let jpa: JpaSettings = from_toml(r#"database_platform = "postgres""#);

        assert_eq!(jpa.database_platform, "postgres");
        assert!(!jpa.show_sql);
        assert!(!jpa.format_sql);
        assert_eq!(jpa.ddl_auto, "validate");
    }

    #[test]
    fn test_jpa_settings_overrides() {
        let jpa: JpaSettings = from_toml(
            r#"
            database_platform = "postgres"
            show_sql = true
            ddl_auto = "update"
            "#,
        );

        assert!(jpa.show_sql);
        assert!(!jpa.format_sql);
        assert_eq!(jpa.ddl_auto, "update");
    }

    #[test]
    fn test_connection_settings_defaults() {
        let conn: ConnectionSettings =
            from_toml(r#"url = "postgres://petclinic@localhost:5432/petclinic""#);

        assert_eq!(conn.max_connections, 20);
        assert_eq!(conn.min_connections, 5);
        assert_eq!(conn.connect_timeout_secs, 10);
        assert_eq!(conn.idle_timeout_secs, 600);
    }

    #[test]
    fn test_cache_settings_defaults() {
        let cache = CacheSettings::default();

        assert_eq!(cache.provider, "moka");
        assert_eq!(cache.uri, "config/cache.toml");
    }
}
