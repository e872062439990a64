//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `FIELDCTL_CONFIG`
//! environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `FIELDCTL_` override YAML values
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `FIELDCTL_DATABASE__URL=sqlite://ops.db` sets the `database.url` field.
//!
//! ## Configuration Structure
//!
//! - **Server**: `host`, `port` - HTTP server binding configuration
//! - **Database**: `database.url`, `database.max_connections` - SQLite connection settings
//! - **Admin User**: `admin.email`, `admin.password`, `admin.implementer` - initial admin seeded on startup
//! - **Security**: `secret_key`, `auth.session`, `auth.password` - sessions and password policy
//! - **Attendance**: `attendance.cutoff_time` - the daily cutoff after which marking requires a
//!   delayed-payment acknowledgment

use chrono::NaiveTime;
use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "FIELDCTL_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    /// Useful for CI/CD pipelines to catch config errors before deployment.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// This is the root configuration structure loaded from YAML and environment variables.
/// All fields have sensible defaults defined in the `Default` implementation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Secret key used to sign JWT session tokens. Required to serve.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Initial admin user seeded on startup
    pub admin: AdminConfig,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Attendance policy configuration
    pub attendance: AttendanceConfig,
    /// Origins allowed by CORS. Empty list means permissive (development).
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// SQLite connection URL, e.g. "sqlite://fieldctl.db"
    pub url: String,
    /// Maximum number of pooled connections
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdminConfig {
    /// Email for the initial admin user. No admin is seeded when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Password for the initial admin user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Name of the implementer organization the admin belongs to
    pub implementer: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    pub session: SessionConfig,
    pub password: PasswordConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Name of the session cookie
    pub cookie_name: String,
    /// Session token lifetime, e.g. "24h"
    #[serde(with = "humantime_serde")]
    pub jwt_expiry: Duration,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PasswordConfig {
    pub min_length: usize,
    pub max_length: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AttendanceConfig {
    /// The daily cutoff time. Attendance for a session may be marked freely
    /// until this time on the day after the session date; later marks require
    /// a delayed-payment acknowledgment.
    pub cutoff_time: NaiveTime,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3100,
            secret_key: None,
            database: DatabaseConfig::default(),
            admin: AdminConfig::default(),
            auth: AuthConfig::default(),
            attendance: AttendanceConfig::default(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://fieldctl.db".to_string(),
            max_connections: 5,
        }
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            email: None,
            password: None,
            implementer: "default".to_string(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            password: PasswordConfig::default(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "fieldctl_session".to_string(),
            jwt_expiry: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: 10,
            max_length: 128,
        }
    }
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        Self {
            cutoff_time: default_cutoff_time(),
        }
    }
}

/// The cutoff shipped by default: 09:00 on the day after the session.
pub fn default_cutoff_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).expect("09:00:00 is a valid time")
}

impl Config {
    /// Load configuration from the YAML file named in `args`, with
    /// `FIELDCTL_`-prefixed environment variables taking precedence.
    pub fn load(args: &Args) -> anyhow::Result<Self> {
        let figment = Figment::new()
            .merge(Yaml::file(&args.config))
            .merge(Env::prefixed("FIELDCTL_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.secret_key.is_none() {
            anyhow::bail!("secret_key is required (used to sign session tokens)");
        }
        if self.auth.password.min_length > self.auth.password.max_length {
            anyhow::bail!(
                "auth.password.min_length ({}) exceeds max_length ({})",
                self.auth.password.min_length,
                self.auth.password.max_length
            );
        }
        if self.admin.email.is_some() && self.admin.password.is_none() {
            anyhow::bail!("admin.password is required when admin.email is set");
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_from_yaml(yaml: &str) -> anyhow::Result<Config> {
        let config: Config = Figment::new().merge(Yaml::string(yaml)).extract()?;
        config.validate()?;
        Ok(config)
    }

    #[test]
    fn test_defaults_applied() {
        let config = load_from_yaml("secret_key: test-secret").unwrap();
        assert_eq!(config.port, 3100);
        assert_eq!(config.database.url, "sqlite://fieldctl.db");
        assert_eq!(config.attendance.cutoff_time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(config.auth.session.cookie_name, "fieldctl_session");
    }

    #[test]
    fn test_cutoff_time_override() {
        let config = load_from_yaml(
            r#"
secret_key: test-secret
attendance:
  cutoff_time: "11:30:00"
"#,
        )
        .unwrap();
        assert_eq!(config.attendance.cutoff_time, NaiveTime::from_hms_opt(11, 30, 0).unwrap());
    }

    #[test]
    fn test_missing_secret_key_rejected() {
        assert!(load_from_yaml("port: 8080").is_err());
    }

    #[test]
    fn test_admin_email_without_password_rejected() {
        let result = load_from_yaml(
            r#"
secret_key: test-secret
admin:
  email: admin@example.com
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_jwt_expiry_humantime() {
        let config = load_from_yaml(
            r#"
secret_key: test-secret
auth:
  session:
    jwt_expiry: 2h
"#,
        )
        .unwrap();
        assert_eq!(config.auth.session.jwt_expiry, Duration::from_secs(2 * 60 * 60));
    }
}
