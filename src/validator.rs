// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact form validator.
//!
//! Every rule runs on every submission; all violations are reported
//! together, in field order (name, email, subject, message).

use crate::config::ValidationConfig;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::debug;

/// Format-shape check only; deliverability is never verified.
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// Raw contact form body. Fields are optional so that absence is reported
/// by validation rather than by the decoder.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ContactRequest {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
            subject: Some(subject.into()),
            message: Some(message.into()),
        }
    }
}

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Name must be at least {min} characters long")]
    NameTooShort { min: usize },

    #[error("Please provide a valid email address")]
    InvalidEmail,

    #[error("Subject must be at least {min} characters long")]
    SubjectTooShort { min: usize },

    #[error("Message must be at least {min} characters long")]
    MessageTooShort { min: usize },
}

/// Result of validation. An empty error list means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Human-readable messages, in rule order.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

/// Contact form validator.
pub struct ContactValidator {
    config: ValidationConfig,
}

impl ContactValidator {
    /// Create a new validator with the given configuration.
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a complete submission.
    pub fn validate(&self, request: &ContactRequest) -> ValidationResult {
        let mut errors = Vec::new();

        if !meets_min_len(request.name.as_deref(), self.config.min_name_len) {
            errors.push(ValidationError::NameTooShort {
                min: self.config.min_name_len,
            });
        }

        if !is_valid_email(request.email.as_deref()) {
            errors.push(ValidationError::InvalidEmail);
        }

        if !meets_min_len(request.subject.as_deref(), self.config.min_subject_len) {
            errors.push(ValidationError::SubjectTooShort {
                min: self.config.min_subject_len,
            });
        }

        if !meets_min_len(request.message.as_deref(), self.config.min_message_len) {
            errors.push(ValidationError::MessageTooShort {
                min: self.config.min_message_len,
            });
        }

        debug!(error_count = errors.len(), "Validated contact submission");
        ValidationResult { errors }
    }
}

/// Lengths are counted in UTF-16 code units, the way browser-side form
/// checks count them, so an astral character such as an emoji counts twice.
fn meets_min_len(value: Option<&str>, min: usize) -> bool {
    value.is_some_and(|v| v.trim().encode_utf16().count() >= min)
}

/// Check an address against the permissive `local@domain.tld` shape.
pub fn is_valid_email(value: Option<&str>) -> bool {
    value.is_some_and(|v| email_regex().is_match(v.trim()))
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is a valid regex"))
}
