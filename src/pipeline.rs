// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Submission pipeline: rate check, validation, sanitization, dispatch.
//!
//! Each stage may end the submission early; later stages never run after
//! an early exit.

use crate::limiter::{RateLimitResult, RateLimiter};
use crate::mailer::{DispatchOutcome, MailDispatcher};
use crate::sanitizer::sanitize;
use crate::validator::{ContactRequest, ContactValidator};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Terminal state of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Rejected at the rate check
    Throttled { retry_after: Duration },
    /// Rejected by validation, with every violated rule
    Invalid(Vec<String>),
    /// Reached the dispatcher
    Dispatched(DispatchOutcome),
}

impl SubmissionOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Throttled { .. } => "throttled",
            Self::Invalid(_) => "invalid",
            Self::Dispatched(outcome) => outcome.label(),
        }
    }
}

/// Owns the process-wide limiter together with the validator and dispatcher.
pub struct ContactPipeline {
    limiter: RateLimiter,
    validator: ContactValidator,
    dispatcher: MailDispatcher,
}

impl ContactPipeline {
    pub fn new(limiter: RateLimiter, validator: ContactValidator, dispatcher: MailDispatcher) -> Self {
        Self {
            limiter,
            validator,
            dispatcher,
        }
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn dispatcher(&self) -> &MailDispatcher {
        &self.dispatcher
    }

    /// Record an attempt for `caller_key`; `Some(retry_after)` if throttled.
    pub async fn throttle(&self, caller_key: &str) -> Option<Duration> {
        match self.limiter.check(caller_key).await {
            RateLimitResult::Allowed { remaining } => {
                debug!(caller = %caller_key, remaining, "Submission admitted by rate limiter");
                None
            }
            RateLimitResult::Limited { retry_after } => {
                warn!(
                    caller = %caller_key,
                    retry_after_secs = retry_after.as_secs(),
                    "Submission rate limited"
                );
                Some(retry_after)
            }
        }
    }

    /// Validate, sanitize and dispatch an already rate-checked submission.
    pub async fn submit(&self, request: &ContactRequest) -> SubmissionOutcome {
        let validation = self.validator.validate(request);
        if !validation.is_valid() {
            let errors = validation.messages();
            warn!(?errors, "Contact submission failed validation");
            return SubmissionOutcome::Invalid(errors);
        }

        let sanitized = sanitize(request);
        let outcome = self.dispatcher.dispatch(&sanitized).await;
        info!(outcome = outcome.label(), "Contact submission processed");
        SubmissionOutcome::Dispatched(outcome)
    }

    /// Run the whole pipeline for one submission.
    pub async fn process(&self, caller_key: &str, request: &ContactRequest) -> SubmissionOutcome {
        if let Some(retry_after) = self.throttle(caller_key).await {
            return SubmissionOutcome::Throttled { retry_after };
        }
        self.submit(request).await
    }
}
