//! Collaborator call metrics.
//!
//! One [`CallEvent`] per interpreter call, summarized per [`Capability`].
//!
//! # Example
//!
//! ```
//! use deecide::metrics::{CallEvent, InterpreterMetrics};
//! use deecide::prompts::Capability;
//!
//! let metrics = InterpreterMetrics::new();
//! metrics.record(CallEvent::new(Capability::Evaluate, 150, true));
//! metrics.record(CallEvent::new(Capability::Evaluate, 250, false));
//! metrics.record(CallEvent::new(Capability::Suggest, 300, true));
//!
//! let summary = metrics.summary();
//! assert_eq!(summary.total_calls, 3);
//! assert_eq!(summary.by_capability[&Capability::Evaluate].failed, 1);
//! ```

#![allow(clippy::cast_precision_loss)]

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::prompts::Capability;

/// Oldest events are dropped past this many.
const MAX_EVENTS: usize = 10_000;

/// A single collaborator call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallEvent {
    /// Capability that was invoked.
    pub capability: Capability,
    /// Wall-clock latency in milliseconds.
    pub latency_ms: u64,
    /// Whether the call produced a usable reply.
    pub success: bool,
    /// Error kind on failure (`validation`, `interpretation`, `transport`).
    pub error_kind: Option<String>,
    /// When the call finished.
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl CallEvent {
    /// Create an event stamped now.
    #[must_use]
    pub fn new(capability: Capability, latency_ms: u64, success: bool) -> Self {
        Self {
            capability,
            latency_ms,
            success,
            error_kind: None,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Attach the failure kind.
    #[must_use]
    pub fn with_error_kind(mut self, kind: impl Into<String>) -> Self {
        self.error_kind = Some(kind.into());
        self
    }
}

/// Statistics for one capability.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[allow(clippy::derive_partial_eq_without_eq)]
pub struct CapabilitySummary {
    /// Total calls.
    pub calls: u64,
    /// Successful calls.
    pub successful: u64,
    /// Failed calls.
    pub failed: u64,
    /// Mean latency in milliseconds.
    pub avg_latency_ms: f64,
    /// Fastest call.
    pub min_latency_ms: u64,
    /// Slowest call.
    pub max_latency_ms: u64,
}

impl CapabilitySummary {
    /// Fraction of calls that succeeded; 1.0 when there were none.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.calls == 0 {
            1.0
        } else {
            self.successful as f64 / self.calls as f64
        }
    }
}

/// Summary across all capabilities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[allow(clippy::derive_partial_eq_without_eq)]
pub struct MetricsSummary {
    /// Total calls.
    pub total_calls: u64,
    /// Overall success rate; 1.0 when no calls were made.
    pub overall_success_rate: f64,
    /// Per-capability statistics; capabilities never called are absent.
    pub by_capability: HashMap<Capability, CapabilitySummary>,
}

impl fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.total_calls == 0 {
            return write!(f, "No interpreter calls yet.");
        }
        write!(
            f,
            "{} interpreter call(s), {:.0}% succeeded",
            self.total_calls,
            self.overall_success_rate * 100.0
        )?;
        for capability in Capability::ALL {
            if let Some(s) = self.by_capability.get(&capability) {
                write!(
                    f,
                    "\n  {capability}: {} call(s), {} failed, avg {:.0} ms (min {}, max {})",
                    s.calls, s.failed, s.avg_latency_ms, s.min_latency_ms, s.max_latency_ms
                )?;
            }
        }
        Ok(())
    }
}

/// Thread-safe collector shared by the driver's tasks.
#[derive(Debug, Default)]
pub struct InterpreterMetrics {
    events: RwLock<Vec<CallEvent>>,
}

impl InterpreterMetrics {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a call.
    pub fn record(&self, event: CallEvent) {
        match self.events.write() {
            Ok(mut events) => {
                if events.len() >= MAX_EVENTS {
                    events.remove(0);
                }
                events.push(event);
            }
            Err(poison_error) => {
                tracing::error!(
                    capability = %event.capability,
                    error = %poison_error,
                    "Failed to record call event: RwLock poisoned"
                );
            }
        }
    }

    /// Snapshot of the recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<CallEvent> {
        match self.events.read() {
            Ok(events) => events.clone(),
            Err(poison_error) => {
                tracing::warn!(
                    error = %poison_error,
                    "Reading events from poisoned lock, using recovered data"
                );
                poison_error.into_inner().clone()
            }
        }
    }

    /// Number of recorded calls.
    #[must_use]
    pub fn total_calls(&self) -> u64 {
        self.events.read().map_or(0, |events| events.len() as u64)
    }

    /// Aggregate statistics.
    #[must_use]
    pub fn summary(&self) -> MetricsSummary {
        let events = self.events();

        let mut grouped: HashMap<Capability, Vec<&CallEvent>> = HashMap::new();
        for event in &events {
            grouped.entry(event.capability).or_default().push(event);
        }

        let by_capability = grouped
            .into_iter()
            .map(|(capability, calls)| {
                let total = calls.len() as u64;
                let successful = calls.iter().filter(|e| e.success).count() as u64;
                let latency_sum: u64 = calls.iter().map(|e| e.latency_ms).sum();
                (
                    capability,
                    CapabilitySummary {
                        calls: total,
                        successful,
                        failed: total - successful,
                        avg_latency_ms: latency_sum as f64 / total as f64,
                        min_latency_ms: calls.iter().map(|e| e.latency_ms).min().unwrap_or(0),
                        max_latency_ms: calls.iter().map(|e| e.latency_ms).max().unwrap_or(0),
                    },
                )
            })
            .collect();

        let total_calls = events.len() as u64;
        let successful = events.iter().filter(|e| e.success).count() as u64;
        let overall_success_rate = if total_calls == 0 {
            1.0
        } else {
            successful as f64 / total_calls as f64
        };

        MetricsSummary {
            total_calls,
            overall_success_rate,
            by_capability,
        }
    }

    /// Drop every recorded event.
    pub fn clear(&self) {
        if let Ok(mut events) = self.events.write() {
            events.clear();
        }
    }
}

/// Measures one call's latency.
#[derive(Debug)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start timing.
    #[must_use]
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Milliseconds since [`Timer::start`].
    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::start()
    }
}
