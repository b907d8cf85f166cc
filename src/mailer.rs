// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Mail dispatcher for sanitized contact submissions.
//!
//! The delivery mode is resolved once, at construction. In test mode the
//! complete message is still built (so content problems show up) and then
//! logged instead of sent. In relay mode the relay is verified, then the
//! message is sent exactly once.

use crate::config::{MailConfig, MailMode};
use crate::error::{DispatchFailure, TransportError};
use crate::sanitizer::{escape_html, SanitizedSubmission};
use crate::transport::{RelayTransport, SmtpRelay};
use chrono::{DateTime, Utc};
use lettre::message::{Mailbox, MultiPart};
use lettre::{Address, Message};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Prefix for every subject line sent to the operator.
pub const SUBJECT_PREFIX: &str = "Contact Form: ";

/// Result of a single dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Accepted by the relay
    Delivered { message_id: String },
    /// Test mode: composed and logged, nothing sent
    Simulated,
    /// Delivery failed; only the category is exposed
    Failed(DispatchFailure),
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, DispatchOutcome::Failed(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Delivered { .. } => "delivered",
            Self::Simulated => "simulated",
            Self::Failed(_) => "failed",
        }
    }
}

/// A fully composed operator notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactEmail {
    pub from_name: String,
    pub from_address: String,
    pub to_address: String,
    pub reply_to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
    pub message_id: String,
}

impl ContactEmail {
    /// Build the wire-format message.
    ///
    /// The form's address check is looser than RFC 5322, so a Reply-To that
    /// lettre cannot represent is dropped instead of failing the message.
    pub fn to_message(&self) -> Result<Message, TransportError> {
        let from = parse_address("from", &self.from_address)?;
        let to = parse_address("to", &self.to_address)?;

        let mut builder = Message::builder()
            .message_id(Some(self.message_id.clone()))
            .from(Mailbox::new(Some(self.from_name.clone()), from))
            .to(Mailbox::new(None, to))
            .subject(self.subject.clone());

        match parse_address("reply-to", &self.reply_to) {
            Ok(reply_to) => builder = builder.reply_to(Mailbox::new(None, reply_to)),
            Err(err) => warn!(error = %err, "Omitting Reply-To header"),
        }

        builder
            .multipart(MultiPart::alternative_plain_html(
                self.text_body.clone(),
                self.html_body.clone(),
            ))
            .map_err(|e| TransportError::Message(e.to_string()))
    }
}

fn parse_address(role: &str, value: &str) -> Result<Address, TransportError> {
    value
        .parse::<Address>()
        .map_err(|e| TransportError::Message(format!("invalid {} address {:?}: {}", role, value, e)))
}

/// Dispatches contact emails through a relay, or simulates in test mode.
pub struct MailDispatcher {
    mode: MailMode,
    from_address: String,
    to_address: String,
    site_name: String,
    /// Present only in relay mode
    transport: Option<Arc<dyn RelayTransport>>,
}

impl MailDispatcher {
    /// Resolve the mail configuration and use the SMTP relay when complete.
    pub fn from_config(config: &MailConfig) -> Self {
        let transport = match config.resolve() {
            MailMode::Relay(settings) => {
                Some(Arc::new(SmtpRelay::new(settings)) as Arc<dyn RelayTransport>)
            }
            MailMode::TestMode => None,
        };
        Self::build(config, transport)
    }

    /// Resolve the mail configuration but deliver through `transport`.
    ///
    /// The transport is ignored when the configuration resolves to test mode.
    pub fn with_transport(config: &MailConfig, transport: Arc<dyn RelayTransport>) -> Self {
        Self::build(config, Some(transport))
    }

    fn build(config: &MailConfig, transport: Option<Arc<dyn RelayTransport>>) -> Self {
        let mode = config.resolve();
        let transport = match mode {
            MailMode::Relay(_) => transport,
            MailMode::TestMode => None,
        };

        Self {
            mode,
            from_address: config.from_address().to_string(),
            to_address: config.to_address().to_string(),
            site_name: config.site_name.clone(),
            transport,
        }
    }

    pub fn mode(&self) -> &MailMode {
        &self.mode
    }

    pub fn is_test_mode(&self) -> bool {
        self.transport.is_none()
    }

    /// Compose the operator notification for a submission.
    pub fn compose(&self, submission: &SanitizedSubmission, received_at: DateTime<Utc>) -> ContactEmail {
        let received = received_at.format("%Y-%m-%d %H:%M:%S UTC").to_string();
        let site = escape_html(&self.site_name);
        let email = escape_html(&submission.email);

        let text_body = format!(
            "New Contact Form Submission\n\n\
             Name: {name}\n\
             Email: {email}\n\
             Subject: {subject}\n\n\
             Message:\n{message}\n\n\
             ---\n\
             This message was sent via the contact form on {site}\n\
             Received: {received}\n",
            name = submission.name,
            email = submission.email,
            subject = submission.subject,
            message = submission.message,
            site = self.site_name,
            received = received,
        );

        let html_body = format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #333; border-bottom: 2px solid #007bff; padding-bottom: 10px;">New Contact Form Submission</h2>
  <table style="width: 100%; border-collapse: collapse;">
    <tr><td style="font-weight: bold; padding: 8px 0;">Name:</td><td style="padding: 8px 0;">{name}</td></tr>
    <tr><td style="font-weight: bold; padding: 8px 0;">Email:</td><td style="padding: 8px 0;"><a href="mailto:{email}">{email}</a></td></tr>
    <tr><td style="font-weight: bold; padding: 8px 0;">Subject:</td><td style="padding: 8px 0;">{subject}</td></tr>
    <tr><td style="font-weight: bold; padding: 8px 0; vertical-align: top;">Message:</td><td style="padding: 8px 0; line-height: 1.6;">{message}</td></tr>
  </table>
  <div style="margin-top: 30px; padding-top: 20px; border-top: 1px solid #ddd; color: #888; font-size: 12px;">
    <p>This message was sent via the contact form on {site}</p>
    <p>Received: {received}</p>
  </div>
</div>"#,
            name = submission.name,
            email = email,
            subject = submission.subject,
            message = submission.message.replace('\n', "<br>"),
            site = site,
            received = received,
        );

        let domain = self
            .from_address
            .rsplit_once('@')
            .map(|(_, domain)| domain)
            .filter(|domain| !domain.is_empty())
            .unwrap_or("localhost");

        ContactEmail {
            from_name: submission.name.clone(),
            from_address: self.from_address.clone(),
            to_address: self.to_address.clone(),
            reply_to: submission.email.clone(),
            subject: format!("{}{}", SUBJECT_PREFIX, submission.subject),
            text_body,
            html_body,
            message_id: format!("<{}@{}>", Uuid::new_v4(), domain),
        }
    }

    /// Deliver or simulate one submission. Never retries.
    pub async fn dispatch(&self, submission: &SanitizedSubmission) -> DispatchOutcome {
        let email = self.compose(submission, Utc::now());
        let message = email.to_message();

        let Some(transport) = &self.transport else {
            if let Err(err) = &message {
                warn!(error = %err, "Contact email would not build, logging composed fields");
            }
            info!(
                from = %format!("\"{}\" <{}>", email.from_name, email.from_address),
                to = %email.to_address,
                reply_to = %email.reply_to,
                subject = %email.subject,
                message_id = %email.message_id,
                body = %email.text_body,
                "Mail relay not configured, simulated contact email"
            );
            return DispatchOutcome::Simulated;
        };

        let message = match message {
            Ok(message) => message,
            Err(err) => {
                error!(error = %err, "Failed to build contact email");
                return DispatchOutcome::Failed(err.category());
            }
        };

        if let Err(err) = transport.verify().await {
            let category = err.verification_category();
            error!(error = %err, category = category.label(), "SMTP relay verification failed");
            return DispatchOutcome::Failed(category);
        }

        match transport.send(message).await {
            Ok(reply) => {
                info!(message_id = %email.message_id, reply = %reply, "Contact email delivered");
                DispatchOutcome::Delivered {
                    message_id: email.message_id,
                }
            }
            Err(err) => {
                let category = err.category();
                error!(error = %err, category = category.label(), "Failed to send contact email");
                DispatchOutcome::Failed(category)
            }
        }
    }
}
