//! Probe abstraction: one echo attempt against a host
//!
//! A probe either returns a reply, returns the `Timeout` sentinel, or fails
//! with an error (name resolution, permissions, socket failure). The sampler
//! treats the sentinel and the error differently, so the two must never be
//! folded together.

pub mod icmp;
pub mod packet;

pub use icmp::{resolve_host, IcmpProbe};

use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// A successful echo exchange
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EchoReply {
    /// Round-trip time in milliseconds
    pub latency_ms: f64,
    /// Size of the ICMP reply message
    pub bytes: usize,
    /// Sequence number carried by the reply, when the transport has one
    pub sequence: Option<u16>,
    /// Address that answered
    pub address: Option<IpAddr>,
}

impl EchoReply {
    /// Reply with a classic 64 byte echo size and no transport details
    pub fn with_latency(latency_ms: f64) -> Self {
        Self {
            latency_ms,
            bytes: packet::ICMP_HEADER_LEN + packet::DEFAULT_PAYLOAD_LEN,
            sequence: None,
            address: None,
        }
    }
}

/// Non-exceptional outcome of a probe
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProbeOutcome {
    Reply(EchoReply),
    /// No reply before the timeout elapsed
    Timeout,
}

#[async_trait]
pub trait Probe: Send + Sync {
    /// Send one echo request to `host` and wait up to `timeout` for the reply
    async fn probe(&self, host: &str, timeout: Duration) -> Result<ProbeOutcome>;

    /// Address `host` resolves to, for display. Probes without name
    /// resolution return `None`.
    async fn resolve(&self, _host: &str) -> Result<Option<IpAddr>> {
        Ok(None)
    }
}

#[async_trait]
impl<P: Probe + ?Sized> Probe for Box<P> {
    async fn probe(&self, host: &str, timeout: Duration) -> Result<ProbeOutcome> {
        (**self).probe(host, timeout).await
    }

    async fn resolve(&self, host: &str) -> Result<Option<IpAddr>> {
        (**self).resolve(host).await
    }
}

/// One scripted probe result
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptStep {
    Reply(f64),
    Timeout,
    /// Transport failure with this message
    Fail(String),
    /// Never completes
    Hang,
}

/// Probe replaying a fixed list of outcomes; the last step repeats once the
/// script runs out. Used by tests, benchmarks and offline demos.
pub struct ScriptedProbe {
    steps: Mutex<VecDeque<ScriptStep>>,
    last: Mutex<ScriptStep>,
    calls: AtomicUsize,
    resolve_delay: Option<Duration>,
}

impl ScriptedProbe {
    pub fn new<I: IntoIterator<Item = ScriptStep>>(steps: I) -> Self {
        Self {
            steps: Mutex::new(steps.into_iter().collect()),
            last: Mutex::new(ScriptStep::Timeout),
            calls: AtomicUsize::new(0),
            resolve_delay: None,
        }
    }

    /// Make the header lookup take `delay`, like a slow resolver
    pub fn with_resolve_delay(mut self, delay: Duration) -> Self {
        self.resolve_delay = Some(delay);
        self
    }

    /// Script made only of replies with the given latencies
    pub fn replies<I: IntoIterator<Item = f64>>(latencies: I) -> Self {
        Self::new(latencies.into_iter().map(ScriptStep::Reply))
    }

    /// Number of probes issued so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_step(&self) -> Result<ScriptStep> {
        let mut steps = self
            .steps
            .lock()
            .map_err(|_| AppError::internal("scripted probe lock poisoned"))?;
        let mut last = self
            .last
            .lock()
            .map_err(|_| AppError::internal("scripted probe lock poisoned"))?;

        if let Some(step) = steps.pop_front() {
            *last = step;
        }
        Ok(last.clone())
    }
}

#[async_trait]
impl Probe for ScriptedProbe {
    async fn probe(&self, host: &str, _timeout: Duration) -> Result<ProbeOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match self.next_step()? {
            ScriptStep::Reply(latency_ms) => {
                Ok(ProbeOutcome::Reply(EchoReply::with_latency(latency_ms)))
            }
            ScriptStep::Timeout => Ok(ProbeOutcome::Timeout),
            ScriptStep::Fail(message) => Err(AppError::network(format!("{}: {}", host, message))),
            ScriptStep::Hang => std::future::pending().await,
        }
    }

    async fn resolve(&self, _host: &str) -> Result<Option<IpAddr>> {
        if let Some(delay) = self.resolve_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_probe_replays_and_repeats_last() {
        let probe = ScriptedProbe::new([
            ScriptStep::Reply(12.0),
            ScriptStep::Timeout,
            ScriptStep::Fail("unreachable".to_string()),
        ]);
        let timeout = Duration::from_secs(1);

        let first = probe.probe("h", timeout).await.unwrap();
        assert_eq!(first, ProbeOutcome::Reply(EchoReply::with_latency(12.0)));
        assert_eq!(probe.probe("h", timeout).await.unwrap(), ProbeOutcome::Timeout);

        let err = probe.probe("h", timeout).await.unwrap_err();
        assert_eq!(err.category(), "NETWORK");
        assert!(err.to_string().contains("unreachable"));

        assert!(probe.probe("h", timeout).await.is_err());
        assert_eq!(probe.calls(), 4);
    }

    #[tokio::test]
    async fn test_empty_script_times_out() {
        let probe = ScriptedProbe::new([]);
        let outcome = probe.probe("h", Duration::from_secs(1)).await.unwrap();
        assert_eq!(outcome, ProbeOutcome::Timeout);
        assert_eq!(probe.resolve("h").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_boxed_probe_delegates() {
        let probe: Box<dyn Probe> = Box::new(ScriptedProbe::replies([5.0]));
        let outcome = probe.probe("h", Duration::from_secs(1)).await.unwrap();
        assert_eq!(outcome, ProbeOutcome::Reply(EchoReply::with_latency(5.0)));
    }

    #[test]
    fn test_echo_reply_default_size() {
        assert_eq!(EchoReply::with_latency(1.0).bytes, 64);
    }
}
