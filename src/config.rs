// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the contact relay.
//!
//! Everything is resolved once at startup from environment variables (a
//! `.env` file is loaded first when present). Mail settings are collapsed
//! into a [`MailMode`] so the dispatcher never re-reads the environment.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the contact relay service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:3000)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Validation configuration
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Outbound mail configuration
    #[serde(default)]
    pub mail: MailConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Sliding window rate limiting per caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Window length in milliseconds (default: 900000, 15 minutes)
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    /// Attempts allowed per caller per window (default: 5)
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Interval between stale-key sweeps in seconds (default: 60)
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

/// Minimum field lengths for contact submissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "default_min_name_len")]
    pub min_name_len: usize,

    #[serde(default = "default_min_subject_len")]
    pub min_subject_len: usize,

    #[serde(default = "default_min_message_len")]
    pub min_message_len: usize,
}

/// Outbound SMTP relay configuration.
///
/// Host, user and password are all required for real delivery; if any of
/// them is missing the service runs in test mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    pub host: Option<String>,

    #[serde(default = "default_smtp_port")]
    pub port: u16,

    /// Implicit TLS when true, STARTTLS otherwise
    #[serde(default)]
    pub secure: bool,

    pub user: Option<String>,

    #[serde(skip_serializing)]
    pub password: Option<String>,

    /// From-address override (falls back to `user`)
    pub from: Option<String>,

    /// Operator mailbox (falls back to `user`)
    pub to: Option<String>,

    /// Site name shown in the message footer
    #[serde(default = "default_site_name")]
    pub site_name: String,

    /// Timeout for each relay network step in seconds (default: 30)
    #[serde(default = "default_smtp_timeout_secs")]
    pub timeout_secs: u64,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

/// How the dispatcher delivers mail, decided once from [`MailConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailMode {
    /// Complete relay credentials are available
    Relay(RelaySettings),
    /// Relay configuration incomplete: compose and log, never connect
    TestMode,
}

/// Connection parameters for a fully configured relay.
#[derive(Clone, PartialEq, Eq)]
pub struct RelaySettings {
    pub host: String,
    pub port: u16,
    pub secure: bool,
    pub user: String,
    pub password: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for RelaySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelaySettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("secure", &self.secure)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

pub const DEFAULT_FROM_ADDRESS: &str = "contact@example.com";
pub const DEFAULT_TO_ADDRESS: &str = "info@example.com";

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_window_ms() -> u64 {
    15 * 60 * 1000
}

fn default_max_requests() -> u32 {
    5
}

fn default_cleanup_interval_secs() -> u64 {
    60
}

fn default_min_name_len() -> usize {
    2
}

fn default_min_subject_len() -> usize {
    5
}

fn default_min_message_len() -> usize {
    10
}

fn default_smtp_port() -> u16 {
    587
}

fn default_site_name() -> String {
    "our website".to_string()
}

fn default_smtp_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            rate_limit: RateLimitConfig::default(),
            validation: ValidationConfig::default(),
            mail: MailConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_ms: default_window_ms(),
            max_requests: default_max_requests(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_name_len: default_min_name_len(),
            min_subject_len: default_min_subject_len(),
            min_message_len: default_min_message_len(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: default_smtp_port(),
            secure: false,
            user: None,
            password: None,
            from: None,
            to: None,
            site_name: default_site_name(),
            timeout_secs: default_smtp_timeout_secs(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl RateLimitConfig {
    /// Get the sliding window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    /// Get the stale-key sweep interval
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

impl MailConfig {
    /// Resolve the delivery mode. Empty strings count as missing.
    pub fn resolve(&self) -> MailMode {
        match (
            present(&self.host),
            present(&self.user),
            present(&self.password),
        ) {
            (Some(host), Some(user), Some(password)) => MailMode::Relay(RelaySettings {
                host: host.to_string(),
                port: self.port,
                secure: self.secure,
                user: user.to_string(),
                password: password.to_string(),
                timeout: Duration::from_secs(self.timeout_secs),
            }),
            _ => MailMode::TestMode,
        }
    }

    /// Envelope sender: explicit override, then relay user, then a placeholder.
    pub fn from_address(&self) -> &str {
        present(&self.from)
            .or_else(|| present(&self.user))
            .unwrap_or(DEFAULT_FROM_ADDRESS)
    }

    /// Operator mailbox: explicit recipient, then relay user, then a placeholder.
    pub fn to_address(&self) -> &str {
        present(&self.to)
            .or_else(|| present(&self.user))
            .unwrap_or(DEFAULT_TO_ADDRESS)
    }
}

fn parsed<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|v| v.trim().parse().ok())
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        Config {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            rate_limit: RateLimitConfig {
                window_ms: parsed(&lookup, "RATE_LIMIT_WINDOW_MS").unwrap_or(default_window_ms()),
                max_requests: parsed(&lookup, "RATE_LIMIT_MAX_REQUESTS").unwrap_or(default_max_requests()),
                cleanup_interval_secs: parsed(&lookup, "RATE_LIMIT_CLEANUP_SECS")
                    .unwrap_or(default_cleanup_interval_secs()),
            },
            validation: defaults.validation,
            mail: MailConfig {
                host: lookup("SMTP_HOST"),
                port: parsed(&lookup, "SMTP_PORT").unwrap_or(default_smtp_port()),
                secure: lookup("SMTP_SECURE")
                    .map(|v| v.trim().eq_ignore_ascii_case("true"))
                    .unwrap_or(false),
                user: lookup("SMTP_USER"),
                password: lookup("SMTP_PASS"),
                from: lookup("SMTP_FROM"),
                to: lookup("CONTACT_EMAIL"),
                site_name: lookup("SITE_NAME")
                    .filter(|v| !v.trim().is_empty())
                    .unwrap_or_else(default_site_name),
                timeout_secs: parsed(&lookup, "SMTP_TIMEOUT_SECS").unwrap_or(default_smtp_timeout_secs()),
            },
            metrics: MetricsConfig {
                enabled: lookup("METRICS_ENABLED")
                    .map(|v| !v.trim().eq_ignore_ascii_case("false"))
                    .unwrap_or(true),
                ..defaults.metrics
            },
        }
    }
}
