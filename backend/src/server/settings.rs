//! Process settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `SPENDING_*` environment variables and an
//! optional configuration file, in that order of precedence.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use spending_api::domain::DEFAULT_DOWNLOAD_LIMIT;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_FILES_BASE_URL: &str = "https://files.usaspending.gov/";

/// Configuration values controlling the HTTP server and its adapters.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SPENDING")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; fixture repositories are used when unset.
    pub database_url: Option<String>,
    /// Maximum pooled PostgreSQL connections.
    #[ortho_config(default = 10)]
    pub db_pool_size: u32,
    /// Elasticsearch base URL; a fixture search is used when unset.
    pub elasticsearch_url: Option<String>,
    /// Transaction index name.
    pub elasticsearch_index: Option<String>,
    /// Search request timeout in seconds.
    #[ortho_config(default = 30)]
    pub elasticsearch_timeout_secs: u64,
    /// Redis URL; responses are not cached when unset.
    pub redis_url: Option<String>,
    /// Maximum pooled Redis connections.
    #[ortho_config(default = 8)]
    pub redis_pool_size: u32,
    /// Base lifetime of cached responses in seconds.
    #[ortho_config(default = 3600)]
    pub cache_ttl_secs: u64,
    /// Upper bound of the random extra lifetime in seconds.
    #[ortho_config(default = 300)]
    pub cache_jitter_secs: u64,
    /// Largest download the service will build.
    pub download_limit: Option<u64>,
    /// Base URL of the published submission files.
    pub files_base_url: Option<String>,
}

/// Settings that cannot be turned into a running configuration.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The bind address is not `host:port`.
    #[error("invalid bind address '{value}': {message}")]
    BindAddr { value: String, message: String },
    /// A configured URL does not parse.
    #[error("invalid {setting} '{value}': {message}")]
    Url {
        setting: &'static str,
        value: String,
        message: String,
    },
}

fn parse_url(setting: &'static str, value: &str) -> Result<Url, SettingsError> {
    Url::parse(value).map_err(|err| SettingsError::Url {
        setting,
        value: value.to_owned(),
        message: err.to_string(),
    })
}

impl ServerSettings {
    /// Socket address to listen on, defaulting to all interfaces on 8080.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::BindAddr`] when the value is not `host:port`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: value.to_owned(),
            message: err.to_string(),
        })
    }

    /// Elasticsearch base URL, if configured.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Url`] when the value does not parse.
    pub fn elasticsearch_url(&self) -> Result<Option<Url>, SettingsError> {
        self.elasticsearch_url
            .as_deref()
            .map(|value| parse_url("elasticsearch url", value))
            .transpose()
    }

    /// Transaction index name.
    pub fn elasticsearch_index(&self) -> &str {
        self.elasticsearch_index.as_deref().unwrap_or("transactions")
    }

    /// Search request timeout.
    pub const fn elasticsearch_timeout(&self) -> Duration {
        Duration::from_secs(self.elasticsearch_timeout_secs)
    }

    /// Base lifetime of cached responses.
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Upper bound of the extra lifetime added to each cached response.
    pub const fn cache_jitter(&self) -> Duration {
        Duration::from_secs(self.cache_jitter_secs)
    }

    /// Largest download the service will build.
    pub fn download_limit(&self) -> u64 {
        self.download_limit.unwrap_or(DEFAULT_DOWNLOAD_LIMIT)
    }

    /// Base URL of the published submission files.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Url`] when the value does not parse.
    pub fn files_base_url(&self) -> Result<Url, SettingsError> {
        parse_url(
            "files base url",
            self.files_base_url
                .as_deref()
                .unwrap_or(DEFAULT_FILES_BASE_URL),
        )
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for server settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const KEYS: [&str; 13] = [
        "SPENDING_BIND_ADDR",
        "SPENDING_DATABASE_URL",
        "SPENDING_DB_POOL_SIZE",
        "SPENDING_ELASTICSEARCH_URL",
        "SPENDING_ELASTICSEARCH_INDEX",
        "SPENDING_ELASTICSEARCH_TIMEOUT_SECS",
        "SPENDING_REDIS_URL",
        "SPENDING_REDIS_POOL_SIZE",
        "SPENDING_CACHE_TTL_SECS",
        "SPENDING_CACHE_JITTER_SECS",
        "SPENDING_DOWNLOAD_LIMIT",
        "SPENDING_FILES_BASE_URL",
        "SPENDING_CONFIG_PATH",
    ];

    fn load_from_empty_args() -> ServerSettings {
        ServerSettings::load_from_iter([OsString::from("spending-api")])
            .expect("config should load")
    }

    fn env_with(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        KEYS.iter()
            .map(|key| {
                let value = overrides
                    .iter()
                    .find(|(name, _)| name == key)
                    .map(|(_, value)| (*value).to_owned());
                (*key, value)
            })
            .collect()
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(env_with(&[]));

        let settings = load_from_empty_args();

        assert_eq!(
            settings.bind_addr().expect("default bind addr"),
            DEFAULT_BIND_ADDR.parse::<SocketAddr>().expect("valid addr")
        );
        assert!(settings.database_url.is_none());
        assert_eq!(settings.db_pool_size, 10);
        assert!(settings.elasticsearch_url().expect("no url").is_none());
        assert_eq!(settings.elasticsearch_index(), "transactions");
        assert_eq!(settings.elasticsearch_timeout(), Duration::from_secs(30));
        assert!(settings.redis_url.is_none());
        assert_eq!(settings.cache_ttl(), Duration::from_secs(3600));
        assert_eq!(settings.cache_jitter(), Duration::from_secs(300));
        assert_eq!(settings.download_limit(), DEFAULT_DOWNLOAD_LIMIT);
        assert_eq!(
            settings.files_base_url().expect("default url").as_str(),
            DEFAULT_FILES_BASE_URL
        );
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(env_with(&[
            ("SPENDING_BIND_ADDR", "127.0.0.1:9000"),
            ("SPENDING_ELASTICSEARCH_URL", "http://es:9200/"),
            ("SPENDING_ELASTICSEARCH_INDEX", "tx-2024"),
            ("SPENDING_CACHE_TTL_SECS", "60"),
            ("SPENDING_DOWNLOAD_LIMIT", "1000"),
        ]));

        let settings = load_from_empty_args();

        assert_eq!(
            settings.bind_addr().expect("bind addr").port(),
            9000
        );
        assert_eq!(
            settings
                .elasticsearch_url()
                .expect("valid url")
                .map(|url| url.to_string()),
            Some("http://es:9200/".to_owned())
        );
        assert_eq!(settings.elasticsearch_index(), "tx-2024");
        assert_eq!(settings.cache_ttl(), Duration::from_secs(60));
        assert_eq!(settings.download_limit(), 1000);
    }

    #[rstest]
    fn malformed_values_are_reported() {
        let _guard = lock_env(env_with(&[
            ("SPENDING_BIND_ADDR", "not an address"),
            ("SPENDING_FILES_BASE_URL", "::"),
        ]));

        let settings = load_from_empty_args();

        assert!(matches!(
            settings.bind_addr(),
            Err(SettingsError::BindAddr { .. })
        ));
        assert!(matches!(
            settings.files_base_url(),
            Err(SettingsError::Url { .. })
        ));
    }
}
