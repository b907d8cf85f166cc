// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error taxonomy for contact submissions.
//!
//! [`TransportError`] carries the raw relay detail and only ever reaches the
//! logs. [`DispatchFailure`] is the closed set of categories that crosses
//! the boundary to the caller; its `Display` is the user-facing message.

use thiserror::Error;

/// Normalized dispatch failure category.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DispatchFailure {
    #[error("Email authentication failed")]
    AuthenticationFailed,

    #[error("Failed to connect to email server")]
    ConnectionFailed,

    #[error("Email server timeout")]
    TimedOut,

    #[error("Email service configuration error")]
    ConfigurationError,

    #[error("Failed to send email")]
    Unknown,
}

impl DispatchFailure {
    /// Short label used in logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed => "authentication_failed",
            Self::ConnectionFailed => "connection_failed",
            Self::TimedOut => "timed_out",
            Self::ConfigurationError => "configuration_error",
            Self::Unknown => "unknown",
        }
    }
}

/// Raw failure reported by a relay transport.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("relay rejected credentials: {0}")]
    Authentication(String),

    #[error("relay connection failed: {0}")]
    Connection(String),

    #[error("relay timed out: {0}")]
    Timeout(String),

    #[error("relay could not be verified")]
    VerificationRejected,

    #[error("message could not be built: {0}")]
    Message(String),

    #[error("relay error: {0}")]
    Other(String),
}

impl TransportError {
    /// Category surfaced to the caller for this failure.
    pub fn category(&self) -> DispatchFailure {
        match self {
            Self::Authentication(_) => DispatchFailure::AuthenticationFailed,
            Self::Connection(_) => DispatchFailure::ConnectionFailed,
            Self::Timeout(_) => DispatchFailure::TimedOut,
            Self::VerificationRejected => DispatchFailure::ConfigurationError,
            Self::Message(_) | Self::Other(_) => DispatchFailure::Unknown,
        }
    }

    /// Category for a failure seen while verifying the relay, before any
    /// message was attempted. Uncategorized causes are configuration problems.
    pub fn verification_category(&self) -> DispatchFailure {
        match self.category() {
            DispatchFailure::Unknown => DispatchFailure::ConfigurationError,
            category => category,
        }
    }
}
