// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Sliding window rate limiter for contact submissions.
//!
//! Each caller key keeps the timestamps of its admitted attempts. A check
//! purges timestamps older than the window, then admits the attempt only if
//! fewer than `max_requests` remain. Throttled attempts are not recorded.
//!
//! State lives in process memory and is lost on restart.

use crate::config::RateLimitConfig;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Attempt admitted and recorded
    Allowed {
        /// Attempts left in the current window
        remaining: u32,
    },
    /// Attempt rejected
    Limited {
        /// Time until the oldest counted attempt leaves the window
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }
}

/// Thread-safe sliding window rate limiter keyed by caller.
pub struct RateLimiter {
    config: RateLimitConfig,
    /// Admitted attempt timestamps per caller key, oldest first
    windows: Arc<RwLock<HashMap<String, Vec<Instant>>>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Check and record an attempt for `caller_key`.
    ///
    /// The whole purge-count-append sequence runs under the write lock, so
    /// concurrent attempts from one caller cannot share the last slot.
    pub async fn check(&self, caller_key: &str) -> RateLimitResult {
        let now = Instant::now();
        let window = self.config.window_duration();
        let max = self.config.max_requests as usize;

        let mut windows = self.windows.write().await;
        let attempts = windows.entry(caller_key.to_string()).or_default();

        attempts.retain(|t| now.duration_since(*t) < window);

        if attempts.len() >= max {
            let retry_after = attempts
                .first()
                .map(|oldest| window.saturating_sub(now.duration_since(*oldest)))
                .unwrap_or(window);
            debug!(caller = %caller_key, ?retry_after, "Caller rate limit exceeded");
            return RateLimitResult::Limited { retry_after };
        }

        attempts.push(now);
        RateLimitResult::Allowed {
            remaining: (max - attempts.len()) as u32,
        }
    }

    /// Boolean form of [`RateLimiter::check`].
    pub async fn is_allowed(&self, caller_key: &str) -> bool {
        self.check(caller_key).await.is_allowed()
    }

    /// Drop caller keys with no attempt inside the window.
    ///
    /// Returns the number of keys removed.
    pub async fn cleanup(&self) -> usize {
        let now = Instant::now();
        let window = self.config.window_duration();

        let mut windows = self.windows.write().await;
        let before = windows.len();
        windows.retain(|_, attempts| {
            attempts.retain(|t| now.duration_since(*t) < window);
            !attempts.is_empty()
        });
        let removed = before - windows.len();
        if removed > 0 {
            debug!(removed, remaining = windows.len(), "Pruned stale rate limit keys");
        }
        removed
    }

    /// Number of caller keys currently tracked.
    pub async fn tracked_keys(&self) -> usize {
        self.windows.read().await.len()
    }
}
