// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test harness for contact relay abuse simulation.
//!
//! Provides flood patterns, payload generators, outcome metrics and scripted
//! relays that stand in for a real SMTP server.

pub mod attacks;
pub mod generators;
pub mod metrics;
pub mod relays;
