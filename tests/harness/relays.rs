// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Scripted relays standing in for an SMTP server.

use async_trait::async_trait;
use contact_relay::transport::RelayTransport;
use contact_relay::TransportError;
use lettre::Message;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Relay whose verify and send results are fixed up front.
pub struct ScriptedRelay {
    verify_result: Result<(), TransportError>,
    send_result: Result<String, TransportError>,
    verify_calls: AtomicUsize,
    send_calls: AtomicUsize,
    sent: Mutex<Vec<Vec<u8>>>,
}

impl ScriptedRelay {
    /// Accepts every message.
    pub fn accepting() -> Self {
        Self::new(Ok(()), Ok("250 2.0.0 Ok: queued".to_string()))
    }

    /// Rejects the credentials during verification.
    pub fn rejecting_credentials() -> Self {
        Self::new(
            Err(TransportError::Authentication(
                "535 5.7.8 Authentication credentials invalid".to_string(),
            )),
            Ok(String::new()),
        )
    }

    /// Verifies fine, then fails the send.
    pub fn failing_send(err: TransportError) -> Self {
        Self::new(Ok(()), Err(err))
    }

    /// Fails verification with `err`.
    pub fn failing_verify(err: TransportError) -> Self {
        Self::new(Err(err), Ok(String::new()))
    }

    fn new(
        verify_result: Result<(), TransportError>,
        send_result: Result<String, TransportError>,
    ) -> Self {
        Self {
            verify_result,
            send_result,
            verify_calls: AtomicUsize::new(0),
            send_calls: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }

    pub fn send_calls(&self) -> usize {
        self.send_calls.load(Ordering::SeqCst)
    }

    /// Raw bytes of every message handed to `send`.
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl RelayTransport for ScriptedRelay {
    async fn verify(&self) -> Result<(), TransportError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        self.verify_result.clone()
    }

    async fn send(&self, message: Message) -> Result<String, TransportError> {
        self.send_calls.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().unwrap().push(message.formatted());
        self.send_result.clone()
    }
}
