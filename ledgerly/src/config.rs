//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable
//! overrides. The file path defaults to `config.yaml` but can be specified via
//! the `-f` flag or the `LEDGERLY_CONFIG` environment variable.
//!
//! ## Loading Priority
//!
//! Sources are merged in order (later sources override earlier ones):
//!
//! 1. **YAML config file** - base configuration (default: `config.yaml`)
//! 2. **Environment variables** - variables prefixed with `LEDGERLY_`
//! 3. **DATABASE_URL** - special case: overrides `database.url` if set
//!
//! For nested values, use double underscores in environment variables, e.g.
//! `LEDGERLY_DATABASE__MAX_CONNECTIONS=20`.

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::errors::Error;

/// Simple CLI args - just for specifying the config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "LEDGERLY_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// All fields have sensible defaults defined in the `Default` implementation;
/// `secret_key` and `database.url` must be provided for a real deployment.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Secret key for JWT signing (required for production)
    pub secret_key: Option<String>,
    /// PostgreSQL connection settings
    pub database: DatabaseConfig,
    /// Token lifetimes
    pub auth: AuthConfig,
    /// Outgoing email settings
    pub email: EmailConfig,
    /// Optional SMS gateway; monthly reports skip SMS when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sms: Option<SmsConfig>,
    /// Monthly report background job settings
    pub reports: ReportConfig,
    /// Allowed CORS origins; empty list allows none
    pub cors_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            secret_key: None,
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            email: EmailConfig::default(),
            sms: None,
            reports: ReportConfig::default(),
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,
    /// Maximum size of the connection pool
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/ledgerly".to_string(),
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Access token (JWT) lifetime
    #[serde(with = "humantime_serde")]
    pub jwt_expiry: Duration,
    /// Refresh token lifetime
    #[serde(with = "humantime_serde")]
    pub refresh_expiry: Duration,
    /// Password reset token lifetime
    #[serde(with = "humantime_serde")]
    pub reset_token_expiry: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_expiry: Duration::from_secs(60 * 60),                // 1 hour
            refresh_expiry: Duration::from_secs(60 * 60 * 24 * 30),  // 30 days
            reset_token_expiry: Duration::from_secs(60 * 60),        // 1 hour
        }
    }
}

/// Email transport configuration - SMTP for deployments, file for development.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EmailTransportConfig {
    Smtp {
        host: String,
        port: u16,
        username: String,
        password: String,
        use_tls: bool,
    },
    File {
        path: String,
    },
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmailConfig {
    pub transport: EmailTransportConfig,
    pub from_email: String,
    pub from_name: String,
    /// Base URL used in confirmation and password reset links
    pub base_url: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            transport: EmailTransportConfig::File {
                path: "./emails".to_string(),
            },
            from_email: "noreply@ledgerly.local".to_string(),
            from_name: "Ledgerly".to_string(),
            base_url: "http://localhost:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SmsConfig {
    /// SMS gateway endpoint, messages are POSTed here as JSON
    pub gateway_url: Url,
    /// Bearer token for the gateway
    pub api_token: String,
    /// Sender name or number
    pub from: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// Whether the monthly report job runs at all
    pub enabled: bool,
    /// How often the job wakes up to check whether a new month has started
    #[serde(with = "humantime_serde")]
    pub check_interval: Duration,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            check_interval: Duration::from_secs(60 * 60), // 1 hour
        }
    }
}

impl Config {
    /// Load configuration from the YAML file and environment.
    pub fn load(args: &Args) -> Result<Self, Error> {
        let mut figment = Figment::new()
            .merge(Yaml::file(&args.config))
            .merge(Env::prefixed("LEDGERLY_").split("__"));

        // DATABASE_URL is the conventional override and wins over everything
        if let Ok(url) = std::env::var("DATABASE_URL") {
            figment = figment.merge(("database.url", url));
        }

        let config: Config = figment.extract().map_err(|e| Error::Internal {
            operation: format!("load configuration: {e}"),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Address the HTTP server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Sanity-check values that cannot be expressed in the type system.
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(key) = &self.secret_key {
            if key.len() < 16 {
                return Err(Error::Internal {
                    operation: "validate configuration: secret_key must be at least 16 characters".to_string(),
                });
            }
        }

        if self.database.max_connections == 0 {
            return Err(Error::Internal {
                operation: "validate configuration: database.max_connections must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.auth.jwt_expiry, Duration::from_secs(3600));
        assert_eq!(config.auth.refresh_expiry, Duration::from_secs(30 * 24 * 3600));
        assert!(config.reports.enabled);
        assert!(config.sms.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_short_secret_key_rejected() {
        let config = Config {
            secret_key: Some("short".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_yaml_with_env_override() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r#"
port: 8080
secret_key: "a-sufficiently-long-secret"
auth:
  jwt_expiry: 15m
email:
  transport:
    type: file
    path: ./mailbox
"#,
            )?;
            jail.set_env("LEDGERLY_PORT", "9090");
            jail.set_env("DATABASE_URL", "postgresql://db.internal/ledgerly");

            let args = Args {
                config: "config.yaml".to_string(),
                validate: false,
            };
            let config = Config::load(&args).expect("config should load");

            assert_eq!(config.port, 9090);
            assert_eq!(config.auth.jwt_expiry, Duration::from_secs(15 * 60));
            assert_eq!(config.database.url, "postgresql://db.internal/ledgerly");
            Ok(())
        });
    }
}
