use rocket::figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "Shelfwise.toml";
pub const ENV_PREFIX: &str = "SHELFWISE_";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub session: SessionConfig,
    pub bootstrap: BootstrapConfig,
    pub pagination: PaginationConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub address: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub json_format: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionConfig {
    /// Seconds a session stays valid after login.
    pub timeout_secs: i64,
    /// How many fresh tokens a login may try before giving up on collisions.
    pub token_attempts: u32,
}

/// User seeded at startup when it does not exist yet.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BootstrapConfig {
    pub enabled: bool,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PaginationConfig {
    pub default_per_page: i64,
    pub max_per_page: i64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://library.db".to_string(),
            max_connections: 16,
            min_connections: 1,
            acquire_timeout: 5,
        }
    }
}

impl DatabaseConfig {
    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            address: "127.0.0.1".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 3600,
            token_attempts: 3,
        }
    }
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            username: "testuser".to_string(),
            password: "testpassword".to_string(),
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_per_page: 10,
            max_per_page: 100,
        }
    }
}

impl Config {
    /// Configuration sources in priority order:
    /// 1. compiled defaults
    /// 2. Shelfwise.toml
    /// 3. environment variables prefixed with SHELFWISE_, nested on `__`
    ///    (e.g. SHELFWISE_SESSION__TIMEOUT_SECS)
    /// 4. DATABASE_URL
    pub fn figment() -> Result<Figment, figment::Error> {
        let defaults = toml::to_string(&Config::default()).map_err(|e| figment::Error::from(format!("Failed to serialize default configuration: {}", e)))?;

        Ok(Figment::new()
            .merge(Toml::string(&defaults))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(Env::raw().only(&["DATABASE_URL"]).map(|_| "database.url".into())))
    }

    pub fn load() -> Result<Self, figment::Error> {
        Self::figment()?.extract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_constants() {
        let config = Config::default();
        assert_eq!(config.session.timeout_secs, 3600);
        assert_eq!(config.session.token_attempts, 3);
        assert_eq!(config.bootstrap.username, "testuser");
        assert_eq!(config.pagination.default_per_page, 10);
        assert!(!config.database.is_in_memory());
    }

    #[test]
    fn file_values_override_defaults() {
        let defaults = toml::to_string(&Config::default()).unwrap();
        let config: Config = Figment::new()
            .merge(Toml::string(&defaults))
            .merge(Toml::string(
                r#"
                [session]
                timeout_secs = 60

                [database]
                url = "sqlite::memory:"
                "#,
            ))
            .extract()
            .unwrap();

        assert_eq!(config.session.timeout_secs, 60);
        assert_eq!(config.session.token_attempts, 3);
        assert!(config.database.is_in_memory());
        assert_eq!(config.server.port, 8000);
    }
}
