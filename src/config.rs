//! Configuration for the folio backend.
//!
//! The [`Config`] struct controls server behavior:
//! - Bind port and the projects file / static frontend locations
//! - Admin credentials and the optional IP allowlist for the gate
//! - SMTP settings for the mail relay
//!
//! Values come from environment variables (a `.env` file is loaded by the
//! binary before [`Config::from_env`] runs):
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `PORT` | `3000` | TCP port to bind |
//! | `PROJECTS_FILE` | `projects.json` | Path of the persisted collection |
//! | `STATIC_DIR` | `public` | Directory of the static frontend |
//! | `ADMIN_USER` / `ADMIN_PASS` | unset | Admin credentials; unset fails closed |
//! | `ALLOWED_IP` | unset | Comma-separated allowlist addresses |
//! | `IP_FILTER` | `false` | Enables the allowlist predicate |
//! | `EMAIL_USER` / `EMAIL_PASS` | unset | SMTP submission credentials |
//! | `MAIL_TO` | unset | Recipient of form notifications |
//! | `SMTP_RELAY` | `smtp.gmail.com` | SMTP submission host |

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

use tracing::warn;

use crate::error::{BackendError, Result};
use crate::gate::Credentials;

/// Server configuration.
///
/// All fields have defaults suitable for local development except the
/// gate and mail credentials, which stay unset until configured.
#[derive(Clone, Debug)]
pub struct Config {
    /// TCP port the server binds on `0.0.0.0`.
    pub port: u16,

    /// Path of the JSON projects file.
    pub projects_file: PathBuf,

    /// Directory holding the static frontend (`index.html`, `admin.html`).
    pub static_dir: PathBuf,

    /// Admin credentials for the gate's challenge predicate.
    ///
    /// When unset, gated routes deny every request.
    pub admin: Option<Credentials>,

    /// Addresses accepted by the allowlist predicate (loopback always
    /// passes).
    pub allowed_ips: Vec<IpAddr>,

    /// Whether the allowlist predicate is enforced on gated routes.
    pub ip_filter: bool,

    /// Outbound mail settings; `None` disables the relay.
    pub mail: Option<MailConfig>,
}

/// SMTP relay settings for the contact/newsletter forms.
#[derive(Clone, Debug)]
pub struct MailConfig {
    /// SMTP submission host.
    pub smtp_relay: String,

    /// Account used for submission and as the `From` address.
    pub username: String,

    /// Submission password (app password for gmail-style hosts).
    pub password: String,

    /// Address receiving the form notifications.
    pub recipient: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            projects_file: PathBuf::from("projects.json"),
            static_dir: PathBuf::from("public"),
            admin: None,
            allowed_ips: Vec::new(),
            ip_filter: false,
            mail: None,
        }
    }
}

impl Config {
    /// Builds the configuration from environment variables.
    ///
    /// Unset variables fall back to their defaults; malformed values are
    /// configuration errors rather than silent fallbacks.
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` is not a number, an `ALLOWED_IP` entry
    /// is not an IP address, or [`validate`](Config::validate) fails.
    pub fn from_env() -> Result<Self> {
        let defaults = Config::default();

        let port = match var("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| BackendError::config(format!("PORT is not a number: {raw}")))?,
            None => defaults.port,
        };

        let admin = match (var("ADMIN_USER"), var("ADMIN_PASS")) {
            (Some(username), Some(password)) => Some(Credentials::new(username, password)),
            (None, None) => None,
            _ => {
                return Err(BackendError::config(
                    "ADMIN_USER and ADMIN_PASS must be set together",
                ))
            }
        };
        if admin.is_none() {
            warn!("ADMIN_USER/ADMIN_PASS not set; admin routes will deny all requests");
        }

        let allowed_ips = match var("ALLOWED_IP") {
            Some(raw) => parse_allowed_ips(&raw)?,
            None => Vec::new(),
        };

        let ip_filter = match var("IP_FILTER") {
            Some(raw) => matches!(raw.as_str(), "1" | "true" | "TRUE" | "yes"),
            None => false,
        };

        let mail = match (var("EMAIL_USER"), var("EMAIL_PASS"), var("MAIL_TO")) {
            (Some(username), Some(password), Some(recipient)) => Some(MailConfig {
                smtp_relay: var("SMTP_RELAY").unwrap_or_else(|| "smtp.gmail.com".to_string()),
                username,
                password,
                recipient,
            }),
            _ => {
                warn!("EMAIL_USER/EMAIL_PASS/MAIL_TO not fully set; mail relay disabled");
                None
            }
        };

        let config = Self {
            port,
            projects_file: var("PROJECTS_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.projects_file),
            static_dir: var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            admin,
            allowed_ips,
            ip_filter,
            mail,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Called by [`from_env`](Config::from_env); call explicitly when
    /// constructing a `Config` by hand.
    ///
    /// # Errors
    /// Returns an error if the IP filter is enabled without any allowlist
    /// entries, or a credential field is empty.
    pub fn validate(&self) -> Result<()> {
        if self.ip_filter && self.allowed_ips.is_empty() {
            return Err(BackendError::config(
                "IP_FILTER enabled but ALLOWED_IP is unset",
            ));
        }

        if let Some(admin) = &self.admin {
            if admin.username().is_empty() || admin.password().is_empty() {
                return Err(BackendError::config("admin credentials must be non-empty"));
            }
        }

        Ok(())
    }
}

/// Reads a trimmed, non-empty environment variable.
fn var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses a comma-separated allowlist.
fn parse_allowed_ips(raw: &str) -> Result<Vec<IpAddr>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse()
                .map_err(|_| BackendError::config(format!("ALLOWED_IP entry is not an IP: {s}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.projects_file, PathBuf::from("projects.json"));
        assert_eq!(config.static_dir, PathBuf::from("public"));
        assert!(config.admin.is_none());
        assert!(!config.ip_filter);
        assert!(config.mail.is_none());
    }

    #[test]
    fn test_validate_default_passes() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_ip_filter_without_allowlist() {
        let config = Config {
            ip_filter: true,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_ip_filter_with_allowlist() {
        let config = Config {
            ip_filter: true,
            allowed_ips: vec!["203.0.113.7".parse().unwrap()],
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_admin_credentials() {
        let config = Config {
            admin: Some(Credentials::new("admin", "")),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_allowed_ips() {
        let ips = parse_allowed_ips("203.0.113.7, 2001:db8::1").unwrap();
        assert_eq!(ips.len(), 2);
        assert_eq!(ips[0], "203.0.113.7".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_parse_allowed_ips_rejects_garbage() {
        assert!(parse_allowed_ips("not-an-ip").is_err());
    }

    #[test]
    fn test_parse_allowed_ips_skips_blank_entries() {
        let ips = parse_allowed_ips("203.0.113.7,,").unwrap();
        assert_eq!(ips.len(), 1);
    }
}
