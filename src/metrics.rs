// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus counters for contact submissions.

use crate::mailer::DispatchOutcome;
use crate::pipeline::SubmissionOutcome;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

pub struct Metrics {
    registry: Registry,
    submissions: IntCounterVec,
    dispatch_failures: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let submissions = IntCounterVec::new(
            Opts::new("contact_submissions_total", "Contact submissions by outcome"),
            &["outcome"],
        )?;
        let dispatch_failures = IntCounterVec::new(
            Opts::new(
                "contact_dispatch_failures_total",
                "Failed mail dispatches by category",
            ),
            &["category"],
        )?;

        registry.register(Box::new(submissions.clone()))?;
        registry.register(Box::new(dispatch_failures.clone()))?;

        Ok(Self {
            registry,
            submissions,
            dispatch_failures,
        })
    }

    pub fn record(&self, outcome: &SubmissionOutcome) {
        self.submissions.with_label_values(&[outcome.label()]).inc();
        if let SubmissionOutcome::Dispatched(DispatchOutcome::Failed(category)) = outcome {
            self.dispatch_failures
                .with_label_values(&[category.label()])
                .inc();
        }
    }

    pub fn submissions(&self, label: &str) -> u64 {
        self.submissions.with_label_values(&[label]).get()
    }

    /// Render all metrics in the Prometheus text format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
