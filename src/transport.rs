// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outbound relay transports.
//!
//! [`RelayTransport`] is the seam between the dispatcher and the network.
//! [`SmtpRelay`] is the production implementation on top of lettre; it
//! builds a fresh connection for every call and never pools. Without
//! `secure` the connection is upgraded with STARTTLS only when the relay
//! offers it.

use crate::config::RelaySettings;
use crate::error::TransportError;
use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::transport::smtp::Error as SmtpError;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::error::Error as StdError;
use std::future::Future;
use std::io;
use tracing::debug;

/// SMTP reply codes meaning the relay refused our credentials.
const AUTH_REJECTION_CODES: &[&str] = &["534", "535", "538"];

/// Also sent for "must issue STARTTLS first"; only a credential rejection
/// when the reply text says so.
const AUTH_REQUIRED_CODE: &str = "530";

/// A mail relay able to verify its connection and send one message.
#[async_trait]
pub trait RelayTransport: Send + Sync {
    /// Connect and authenticate without sending anything.
    async fn verify(&self) -> Result<(), TransportError>;

    /// Send a single message. Returns the relay's reply summary.
    async fn send(&self, message: Message) -> Result<String, TransportError>;
}

/// SMTP relay backed by lettre's tokio transport.
pub struct SmtpRelay {
    settings: RelaySettings,
}

impl SmtpRelay {
    pub fn new(settings: RelaySettings) -> Self {
        Self { settings }
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, TransportError> {
        let host = self.settings.host.as_str();
        let builder = if self.settings.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host).map_err(classify)?
        } else {
            let tls = TlsParameters::new(host.to_string()).map_err(classify)?;
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
                .tls(Tls::Opportunistic(tls))
        };

        Ok(builder
            .port(self.settings.port)
            .credentials(Credentials::new(
                self.settings.user.clone(),
                self.settings.password.clone(),
            ))
            .timeout(Some(self.settings.timeout))
            .build())
    }

    async fn bounded<T, F>(&self, step: &str, fut: F) -> Result<T, TransportError>
    where
        F: Future<Output = Result<T, SmtpError>>,
    {
        match tokio::time::timeout(self.settings.timeout, fut).await {
            Ok(result) => result.map_err(classify),
            Err(_) => Err(TransportError::Timeout(format!(
                "{} exceeded {:?}",
                step, self.settings.timeout
            ))),
        }
    }
}

#[async_trait]
impl RelayTransport for SmtpRelay {
    async fn verify(&self) -> Result<(), TransportError> {
        let transport = self.transport()?;
        debug!(host = %self.settings.host, port = self.settings.port, "Verifying SMTP relay");

        if self.bounded("verify", transport.test_connection()).await? {
            Ok(())
        } else {
            Err(TransportError::VerificationRejected)
        }
    }

    async fn send(&self, message: Message) -> Result<String, TransportError> {
        let transport = self.transport()?;
        let response = self.bounded("send", transport.send(message)).await?;

        Ok(format!(
            "{} {}",
            response.code(),
            response.message().collect::<Vec<_>>().join(" ")
        ))
    }
}

/// Map a lettre SMTP error onto the transport taxonomy.
fn classify(err: SmtpError) -> TransportError {
    let detail = err.to_string();

    if let Some(code) = err.status() {
        return classify_reply(&code.to_string(), detail);
    }

    if let Some(kind) = io_error_kind(&err) {
        return classify_io(kind, detail);
    }

    // lettre reports a failed mechanism negotiation as a client error
    if err.is_client() && detail.to_lowercase().contains("authentication") {
        return TransportError::Authentication(detail);
    }

    TransportError::Other(detail)
}

/// Map a negative SMTP reply onto the transport taxonomy.
fn classify_reply(code: &str, detail: String) -> TransportError {
    let lowered = detail.to_lowercase();
    let credentials_rejected = AUTH_REJECTION_CODES.contains(&code)
        || (code == AUTH_REQUIRED_CODE
            && lowered.contains("auth")
            && !lowered.contains("starttls"));

    if credentials_rejected {
        TransportError::Authentication(detail)
    } else {
        TransportError::Other(detail)
    }
}

fn io_error_kind(err: &SmtpError) -> Option<io::ErrorKind> {
    let mut source = err.source();
    while let Some(inner) = source {
        if let Some(io_err) = inner.downcast_ref::<io::Error>() {
            return Some(io_err.kind());
        }
        source = inner.source();
    }
    None
}

/// Socket-level failures: timeouts are told apart, everything else is a
/// connection problem.
fn classify_io(kind: io::ErrorKind, detail: String) -> TransportError {
    match kind {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TransportError::Timeout(detail),
        _ => TransportError::Connection(detail),
    }
}
