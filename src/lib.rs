// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Relay
//!
//! This crate accepts website contact form submissions and forwards them to
//! an operator mailbox:
//!
//! - Per-caller sliding window rate limiting (5 per 15 minutes default)
//! - Field validation with every violation reported at once
//! - HTML escaping of values interpolated into the notification email
//! - SMTP relay delivery, or a logged simulation when the relay is not
//!   configured
//! - A closed set of user-facing dispatch failure categories

pub mod config;
pub mod error;
pub mod handlers;
pub mod limiter;
pub mod mailer;
pub mod metrics;
pub mod pipeline;
pub mod sanitizer;
pub mod transport;
pub mod validator;

pub use config::Config;
pub use error::{DispatchFailure, TransportError};
pub use limiter::{RateLimitResult, RateLimiter};
pub use mailer::{DispatchOutcome, MailDispatcher};
pub use pipeline::{ContactPipeline, SubmissionOutcome};
pub use validator::{ContactRequest, ContactValidator, ValidationResult};
