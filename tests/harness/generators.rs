// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test data generators for abuse simulation.

use contact_relay::ContactRequest;
use std::net::{IpAddr, Ipv4Addr};

/// Generate a pool of caller keys (10.x.x.x addresses).
pub fn generate_callers(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            let a = ((i >> 16) & 0xFF) as u8;
            let b = ((i >> 8) & 0xFF) as u8;
            let c = (i & 0xFF) as u8;
            IpAddr::V4(Ipv4Addr::new(10, a, b, c)).to_string()
        })
        .collect()
}

/// A submission that passes every validation rule.
pub fn valid_request(i: usize) -> ContactRequest {
    ContactRequest::new(
        format!("Visitor {}", i),
        format!("visitor{}@example.com", i),
        format!("Enquiry number {}", i),
        format!("Hello, this is message number {} from the form.", i),
    )
}

/// A submission that fails every validation rule.
pub fn invalid_request() -> ContactRequest {
    ContactRequest::new("A", "bad", "Hi", "short")
}

/// Markup injection attempts aimed at the operator's mail client.
pub fn injection_payloads() -> Vec<&'static str> {
    vec![
        "<script>alert(1)</script>",
        "<img src=x onerror=alert(1)>",
        "\"><svg onload=alert(1)>",
        "'><iframe src=javascript:alert(1)>",
        "<a href=\"https://evil.example\">click</a>",
        "</td></tr></table><h1>Fake</h1>",
        "&lt;script&gt; already escaped",
    ]
}

/// Addresses the permissive shape check must reject.
pub fn malformed_emails() -> Vec<&'static str> {
    vec![
        "",
        "   ",
        "plainaddress",
        "@no-local.com",
        "no-domain@",
        "no-tld@example",
        "spaces in@example.com",
        "two@@example.com",
        "trailing-dot@example.",
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_callers() {
        let callers = generate_callers(256);
        assert_eq!(callers.len(), 256);
        let unique: std::collections::HashSet<_> = callers.iter().collect();
        assert_eq!(unique.len(), 256);
    }
}
