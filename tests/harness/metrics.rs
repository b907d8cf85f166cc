// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outcome collection for abuse simulation.

use contact_relay::{DispatchOutcome, SubmissionOutcome};
use std::collections::HashMap;
use std::time::Duration;

/// Possible outcomes for a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Accepted,
    Throttled,
    Invalid,
    Failed,
}

impl From<&SubmissionOutcome> for Outcome {
    fn from(outcome: &SubmissionOutcome) -> Self {
        match outcome {
            SubmissionOutcome::Throttled { .. } => Outcome::Throttled,
            SubmissionOutcome::Invalid(_) => Outcome::Invalid,
            SubmissionOutcome::Dispatched(DispatchOutcome::Failed(_)) => Outcome::Failed,
            SubmissionOutcome::Dispatched(_) => Outcome::Accepted,
        }
    }
}

/// Collects outcomes during a simulation.
#[derive(Debug, Default)]
pub struct AttackMetrics {
    outcomes: HashMap<Outcome, usize>,
    accepted_per_caller: HashMap<String, usize>,
    latencies: Vec<u64>,
}

impl AttackMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a submission outcome.
    pub fn record(&mut self, outcome: Outcome, caller: &str, latency: Duration) {
        *self.outcomes.entry(outcome).or_insert(0) += 1;
        if outcome == Outcome::Accepted {
            *self.accepted_per_caller.entry(caller.to_string()).or_insert(0) += 1;
        }
        self.latencies.push(latency.as_micros() as u64);
    }

    pub fn total(&self) -> usize {
        self.outcomes.values().sum()
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// Largest number of accepted submissions from any one caller.
    pub fn max_accepted_per_caller(&self) -> usize {
        self.accepted_per_caller.values().copied().max().unwrap_or(0)
    }

    pub fn callers_accepted(&self) -> usize {
        self.accepted_per_caller.len()
    }

    /// Ratio of non-accepted submissions to total.
    pub fn block_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (total - self.count(Outcome::Accepted)) as f64 / total as f64
    }

    pub fn median_latency_us(&self) -> u64 {
        if self.latencies.is_empty() {
            return 0;
        }
        let mut sorted = self.latencies.clone();
        sorted.sort_unstable();
        sorted[sorted.len() / 2]
    }
}

impl std::fmt::Display for AttackMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Abuse Simulation Report ===")?;
        writeln!(f, "Total:       {}", self.total())?;
        writeln!(f, "Accepted:    {}", self.count(Outcome::Accepted))?;
        writeln!(f, "Throttled:   {}", self.count(Outcome::Throttled))?;
        writeln!(f, "Invalid:     {}", self.count(Outcome::Invalid))?;
        writeln!(f, "Failed:      {}", self.count(Outcome::Failed))?;
        writeln!(f, "Block Rate:  {:.1}%", self.block_rate() * 100.0)?;
        writeln!(f, "Median:      {} us", self.median_latency_us())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_rate() {
        let mut metrics = AttackMetrics::new();
        for _ in 0..3 {
            metrics.record(Outcome::Accepted, "10.0.0.1", Duration::ZERO);
        }
        for _ in 0..7 {
            metrics.record(Outcome::Throttled, "10.0.0.1", Duration::ZERO);
        }

        assert!((metrics.block_rate() - 0.7).abs() < 0.01);
        assert_eq!(metrics.max_accepted_per_caller(), 3);
    }
}
