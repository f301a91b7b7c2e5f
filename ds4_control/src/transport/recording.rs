//! Recording transport.
//!
//! Keeps every publish and service call in memory and lets the caller
//! make individual services refuse or disappear. Used by the test suites
//! and benchmarks to observe exactly what the node sent.

use ds4_common::transport::{Transport, TransportError, TriggerResponse, VelocityCommand};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

#[derive(Debug, Default)]
struct Recording {
    published: Vec<(String, VelocityCommand)>,
    calls: Vec<String>,
    refused: HashSet<String>,
    disconnected: HashSet<String>,
    delay: Duration,
}

fn lock(shared: &Mutex<Recording>) -> MutexGuard<'_, Recording> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Transport half; hand it to the registry.
#[derive(Debug)]
pub struct RecordingTransport {
    shared: Arc<Mutex<Recording>>,
}

/// Observer half; inspect traffic and inject failures.
#[derive(Debug, Clone)]
pub struct RecordingHandle {
    shared: Arc<Mutex<Recording>>,
}

impl RecordingTransport {
    /// Create a transport and its observer handle.
    pub fn new() -> (Self, RecordingHandle) {
        let shared = Arc::new(Mutex::new(Recording::default()));
        (
            Self {
                shared: Arc::clone(&shared),
            },
            RecordingHandle { shared },
        )
    }
}

impl RecordingHandle {
    /// Every published `(channel, command)` in order.
    pub fn published(&self) -> Vec<(String, VelocityCommand)> {
        lock(&self.shared).published.clone()
    }

    /// Commands published on `channel`, in order.
    pub fn published_on(&self, channel: &str) -> Vec<VelocityCommand> {
        lock(&self.shared)
            .published
            .iter()
            .filter(|(ch, _)| ch == channel)
            .map(|(_, cmd)| *cmd)
            .collect()
    }

    /// Every called service in order.
    pub fn calls(&self) -> Vec<String> {
        lock(&self.shared).calls.clone()
    }

    /// Make `service` answer `success = false`.
    pub fn refuse(&self, service: &str) {
        lock(&self.shared).refused.insert(service.to_string());
    }

    /// Make `service` unreachable.
    pub fn disconnect(&self, service: &str) {
        lock(&self.shared).disconnected.insert(service.to_string());
    }

    /// Undo [`refuse`](Self::refuse) / [`disconnect`](Self::disconnect).
    pub fn restore(&self, service: &str) {
        let mut rec = lock(&self.shared);
        rec.refused.remove(service);
        rec.disconnected.remove(service);
    }

    /// Answer service calls only after `delay`, ignoring the caller's timeout.
    pub fn respond_after(&self, delay: Duration) {
        lock(&self.shared).delay = delay;
    }

    /// Forget recorded traffic; injected failures stay.
    pub fn clear(&self) {
        let mut rec = lock(&self.shared);
        rec.published.clear();
        rec.calls.clear();
    }
}

impl Transport for RecordingTransport {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn publish_velocity(
        &mut self,
        channel: &str,
        command: VelocityCommand,
    ) -> Result<(), TransportError> {
        let mut rec = lock(&self.shared);
        if rec.disconnected.contains(channel) {
            return Err(TransportError::NotConnected(channel.to_string()));
        }
        rec.published.push((channel.to_string(), command));
        Ok(())
    }

    fn call_trigger(
        &mut self,
        service: &str,
        _timeout: Duration,
    ) -> Result<TriggerResponse, TransportError> {
        let delay = {
            let mut rec = lock(&self.shared);
            rec.calls.push(service.to_string());
            rec.delay
        };
        if !delay.is_zero() {
            thread::sleep(delay);
        }

        let rec = lock(&self.shared);
        if rec.disconnected.contains(service) {
            Err(TransportError::NotConnected(service.to_string()))
        } else if rec.refused.contains(service) {
            Ok(TriggerResponse::failed("refused"))
        } else {
            Ok(TriggerResponse::ok(""))
        }
    }
}
