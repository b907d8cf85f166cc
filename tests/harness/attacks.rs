// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Flood patterns for abuse simulation.

/// Flood pattern configuration.
#[derive(Debug, Clone)]
pub struct AttackConfig {
    /// Total number of submissions to send
    pub total_requests: usize,
    /// Number of unique caller keys to rotate through
    pub unique_callers: usize,
    /// Whether submissions pass validation
    pub valid_payload: bool,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            total_requests: 100,
            unique_callers: 1,
            valid_payload: true,
        }
    }
}

/// Predefined flood patterns.
impl AttackConfig {
    /// One caller submitting as fast as it can.
    pub fn single_caller_flood() -> Self {
        Self {
            total_requests: 200,
            unique_callers: 1,
            ..Default::default()
        }
    }

    /// Many callers, a handful of submissions each.
    pub fn distributed_flood() -> Self {
        Self {
            total_requests: 500,
            unique_callers: 50,
            ..Default::default()
        }
    }

    /// Garbage submissions from a few callers.
    pub fn invalid_payload_flood() -> Self {
        Self {
            total_requests: 60,
            unique_callers: 3,
            valid_payload: false,
        }
    }

    /// Most submissions a limiter allowing `max_per_window` may admit.
    pub fn max_admitted(&self, max_per_window: usize) -> usize {
        let per_caller = self.total_requests.div_ceil(self.unique_callers);
        self.unique_callers * per_caller.min(max_per_window)
    }
}
