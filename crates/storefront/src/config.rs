//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! Nothing is required; every variable has a working default.
//!
//! ## Server
//! - `SHOWROOM_HOST` - Bind address (default: 127.0.0.1)
//! - `SHOWROOM_PORT` - Listen port (default: 3000)
//! - `SHOWROOM_BASE_URL` - Public URL (default: `http://{host}:{port}`)
//! - `SHOWROOM_STATIC_DIR` - Static asset directory (default: crates/storefront/static)
//!
//! ## Catalog
//! - `SHOWROOM_CATALOG_URL` - Catalog Source base URL (default: <https://fakestoreapi.com>)
//! - `SHOWROOM_CATALOG_TIMEOUT_SECS` - Request timeout for the Catalog Source (default: none)
//! - `SHOWROOM_CATALOG_SOURCES` - `merged`, `remote` or `static` (default: merged)
//! - `SHOWROOM_CATALOG_WRITES` - `passthrough` or `simulated` (default: passthrough)
//! - `SHOWROOM_STATIC_CATALOG` - JSON file replacing the bundled static catalog
//!
//! ## Error tracking
//! - `SENTRY_DSN` - Sentry DSN; Sentry stays off when unset
//! - `SENTRY_ENVIRONMENT` - Environment tag (default: development)
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate (default: 0.1)

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_CATALOG_URL: &str = "https://fakestoreapi.com";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Where products come from and where writes go
    pub catalog: CatalogSourceConfig,
    /// Sentry error tracking
    pub sentry: SentryConfig,
}

/// Which product lists make up the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogSources {
    /// Remote records followed by the static catalog.
    #[default]
    Merged,
    /// Catalog Source only.
    Remote,
    /// Static catalog only; never touches the network.
    Static,
}

impl CatalogSources {
    /// Whether the Catalog Source is consulted at all.
    #[must_use]
    pub const fn uses_remote(self) -> bool {
        matches!(self, Self::Merged | Self::Remote)
    }

    /// Whether the static catalog is part of the product list.
    #[must_use]
    pub const fn uses_static(self) -> bool {
        matches!(self, Self::Merged | Self::Static)
    }
}

impl FromStr for CatalogSources {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "merged" => Ok(Self::Merged),
            "remote" => Ok(Self::Remote),
            "static" => Ok(Self::Static),
            other => Err(format!("expected merged, remote or static, got `{other}`")),
        }
    }
}

impl fmt::Display for CatalogSources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Merged => "merged",
            Self::Remote => "remote",
            Self::Static => "static",
        })
    }
}

/// Whether catalog writes reach the Catalog Source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Remote records are written through before the local update.
    #[default]
    Passthrough,
    /// All writes stay in memory.
    Simulated,
}

impl FromStr for WriteMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "passthrough" => Ok(Self::Passthrough),
            "simulated" => Ok(Self::Simulated),
            other => Err(format!("expected passthrough or simulated, got `{other}`")),
        }
    }
}

/// Catalog Source and static catalog configuration.
#[derive(Debug, Clone)]
pub struct CatalogSourceConfig {
    /// Catalog Source base URL; `/products` is appended
    pub base_url: String,
    /// Per-request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
    pub sources: CatalogSources,
    pub writes: WriteMode,
    /// Replacement for the bundled static catalog
    pub static_catalog_path: Option<PathBuf>,
}

impl Default for CatalogSourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CATALOG_URL.to_string(),
            timeout: None,
            sources: CatalogSources::default(),
            writes: WriteMode::default(),
            static_catalog_path: None,
        }
    }
}

/// Sentry configuration.
///
/// Implements `Debug` manually to redact the DSN.
#[derive(Clone, Default)]
pub struct SentryConfig {
    pub dsn: Option<String>,
    pub environment: Option<String>,
    pub sample_rate: Option<f32>,
    pub traces_sample_rate: Option<f32>,
}

impl fmt::Debug for SentryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentryConfig")
            .field("dsn", &self.dsn.as_ref().map(|_| "[REDACTED]"))
            .field("environment", &self.environment)
            .field("sample_rate", &self.sample_rate)
            .field("traces_sample_rate", &self.traces_sample_rate)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if a variable is set but cannot
    /// be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env_or_default::<IpAddr>("SHOWROOM_HOST", "127.0.0.1")?;
        let port = parse_env_or_default::<u16>("SHOWROOM_PORT", "3000")?;
        let base_url = get_optional_env("SHOWROOM_BASE_URL")
            .unwrap_or_else(|| format!("http://{host}:{port}"));
        let static_dir = PathBuf::from(get_env_or_default(
            "SHOWROOM_STATIC_DIR",
            "crates/storefront/static",
        ));

        Ok(Self {
            host,
            port,
            base_url,
            static_dir,
            catalog: CatalogSourceConfig::from_env()?,
            sentry: SentryConfig::from_env()?,
        })
    }

    /// Defaults for tests and embedding: static files from the crate
    /// directory, everything else as if no variable were set.
    #[must_use]
    pub fn with_catalog(catalog: CatalogSourceConfig) -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: "http://127.0.0.1:3000".to_string(),
            static_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/static")),
            catalog,
            sentry: SentryConfig::default(),
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether session cookies should carry the `Secure` flag.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl CatalogSourceConfig {
    /// Load the catalog section on its own (also used by the CLI).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` for unparseable values.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = get_env_or_default("SHOWROOM_CATALOG_URL", DEFAULT_CATALOG_URL);
        Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("SHOWROOM_CATALOG_URL".to_string(), e.to_string())
        })?;
        let timeout = parse_optional_env::<u64>("SHOWROOM_CATALOG_TIMEOUT_SECS")?
            .map(Duration::from_secs);

        Ok(Self {
            base_url,
            timeout,
            sources: parse_env_or_default("SHOWROOM_CATALOG_SOURCES", "merged")?,
            writes: parse_env_or_default("SHOWROOM_CATALOG_WRITES", "passthrough")?,
            static_catalog_path: get_optional_env("SHOWROOM_STATIC_CATALOG").map(PathBuf::from),
        })
    }
}

impl SentryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            dsn: get_optional_env("SENTRY_DSN"),
            environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sample_rate: parse_optional_env("SENTRY_SAMPLE_RATE")?,
            traces_sample_rate: parse_optional_env("SENTRY_TRACES_SAMPLE_RATE")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable; empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse an optional environment variable.
fn parse_optional_env<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    get_optional_env(key)
        .map(|value| {
            value
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
        .transpose()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_sources_parse() {
        assert_eq!("merged".parse::<CatalogSources>().unwrap(), CatalogSources::Merged);
        assert_eq!(" Remote ".parse::<CatalogSources>().unwrap(), CatalogSources::Remote);
        assert_eq!("STATIC".parse::<CatalogSources>().unwrap(), CatalogSources::Static);
        assert!("both".parse::<CatalogSources>().is_err());
    }

    #[test]
    fn test_catalog_sources_flags() {
        assert!(CatalogSources::Merged.uses_remote());
        assert!(CatalogSources::Merged.uses_static());
        assert!(!CatalogSources::Remote.uses_static());
        assert!(!CatalogSources::Static.uses_remote());
    }

    #[test]
    fn test_write_mode_parse() {
        assert_eq!("passthrough".parse::<WriteMode>().unwrap(), WriteMode::Passthrough);
        assert_eq!("simulated".parse::<WriteMode>().unwrap(), WriteMode::Simulated);
        assert!("dry-run".parse::<WriteMode>().is_err());
    }

    #[test]
    fn test_default_catalog_url() {
        let config = CatalogSourceConfig::default();
        assert_eq!(config.base_url, "https://fakestoreapi.com");
        assert_eq!(config.sources, CatalogSources::Merged);
        assert_eq!(config.writes, WriteMode::Passthrough);
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig::with_catalog(CatalogSourceConfig::default());

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
        assert!(!config.secure_cookies());
    }

    #[test]
    fn test_secure_cookies_follow_base_url() {
        let mut config = StorefrontConfig::with_catalog(CatalogSourceConfig::default());
        config.base_url = "https://showroom.example".to_string();
        assert!(config.secure_cookies());
    }

    #[test]
    fn test_sentry_config_debug_redacts_dsn() {
        let config = SentryConfig {
            dsn: Some("https://public@o0.ingest.sentry.io/0".to_string()),
            environment: Some("staging".to_string()),
            ..SentryConfig::default()
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("staging"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("ingest.sentry.io"));
    }
}
