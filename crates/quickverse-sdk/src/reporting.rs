//! Batched usage reporting.
//!
//! Every lookup is a telemetry event. [`UsageAggregator`] folds those events
//! into two key-indexed maps and decides when they are worth a request:
//!
//! - any pending missing key makes a report due immediately;
//! - otherwise a report is due once `missing + sum(usage counts)` reaches
//!   the threshold.
//!
//! At most one report is in flight. Events recorded meanwhile land in the
//! same maps and go out with a later report. A failed report leaves every
//! record in place; the next due event retries. On success only what was
//! sent is removed.

use crate::credential::{AuthToken, Credential};
use crate::error::Error;
use crate::gateway::Gateway;
use crate::model::{MissingKeyRecord, ReportBatch, UtilisedKeyCount};
use parking_lot::Mutex;
use quickverse_common_log::spans::report_span;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn, Instrument};

/// Observations that make a report due when no key is missing.
pub const DEFAULT_REPORT_THRESHOLD: usize = 4;

/// Outcome of an explicit flush or of a settled background report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transmission {
    /// Nothing was pending.
    Idle,
    /// Another report is still in flight.
    Busy,
    /// The service accepted the report.
    Sent,
    /// The report failed; its records remain pending.
    Failed,
    /// No usable credential, so nothing was sent.
    Deferred,
}

#[derive(Debug, Default)]
struct Pending {
    utilised: HashMap<String, u32>,
    missing: HashMap<String, String>,
    in_flight: bool,
    /// The spawned report behind `in_flight`, if it was spawned.
    task: Option<JoinHandle<Transmission>>,
}

impl Pending {
    fn weight(&self) -> usize {
        let used: usize = self.utilised.values().map(|&count| count as usize).sum();
        self.missing.len() + used
    }

    fn is_empty(&self) -> bool {
        self.utilised.is_empty() && self.missing.is_empty()
    }

    fn is_due(&self, threshold: usize) -> bool {
        !self.missing.is_empty() || self.weight() >= threshold
    }

    fn snapshot(&self) -> ReportBatch {
        let mut missing_keys: Vec<MissingKeyRecord> = self
            .missing
            .iter()
            .map(|(key, default_value)| MissingKeyRecord {
                key: key.clone(),
                default_value: default_value.clone(),
            })
            .collect();
        missing_keys.sort_by(|a, b| a.key.cmp(&b.key));

        let mut utilised_keys: Vec<UtilisedKeyCount> = self
            .utilised
            .iter()
            .map(|(key, &count)| UtilisedKeyCount {
                key: key.clone(),
                count,
            })
            .collect();
        utilised_keys.sort_by(|a, b| a.key.cmp(&b.key));

        ReportBatch {
            missing_keys,
            utilised_keys,
        }
    }

    /// Remove what `sent` delivered. Usage counted after the snapshot and
    /// missing keys whose default changed since survive.
    fn acknowledge(&mut self, sent: &ReportBatch) {
        for used in &sent.utilised_keys {
            if let Some(count) = self.utilised.get_mut(&used.key) {
                *count = count.saturating_sub(used.count);
                if *count == 0 {
                    self.utilised.remove(&used.key);
                }
            }
        }

        for missing in &sent.missing_keys {
            if self.missing.get(&missing.key) == Some(&missing.default_value) {
                self.missing.remove(&missing.key);
            }
        }
    }
}

/// Clears `in_flight` if a submission is dropped before it finishes, as
/// happens when its runtime shuts down mid-request.
struct FlightGuard<'a> {
    pending: &'a Mutex<Pending>,
    armed: bool,
}

impl FlightGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            debug!("usage report abandoned; records stay pending");
            self.pending.lock().in_flight = false;
        }
    }
}

enum Start {
    Ready(ReportBatch, AuthToken),
    NotDue,
    Busy,
    Unconfigured,
}

struct Shared {
    gateway: Arc<dyn Gateway>,
    token: Option<AuthToken>,
    threshold: usize,
    pending: Mutex<Pending>,
}

impl Shared {
    /// Mark a report in flight and snapshot it, if one should start.
    fn try_start(&self, pending: &mut Pending, force: bool) -> Start {
        if pending.in_flight {
            return Start::Busy;
        }

        let due = if force {
            !pending.is_empty()
        } else {
            pending.is_due(self.threshold)
        };
        if !due {
            return Start::NotDue;
        }

        let Some(token) = self.token.clone() else {
            trace!("usage report due but no credential; keeping records");
            return Start::Unconfigured;
        };

        pending.in_flight = true;
        Start::Ready(pending.snapshot(), token)
    }

    async fn submit(&self, batch: ReportBatch, token: AuthToken) -> Transmission {
        let guard = FlightGuard {
            pending: &self.pending,
            armed: true,
        };
        let span = report_span(batch.missing_keys.len(), batch.utilised_keys.len());
        let result = self.gateway.submit_report(&token, &batch).instrument(span).await;

        guard.disarm();
        let mut pending = self.pending.lock();
        pending.in_flight = false;
        match result {
            Ok(()) => {
                pending.acknowledge(&batch);
                debug!(
                    missing = batch.missing_keys.len(),
                    utilised = batch.utilised_keys.len(),
                    "usage report accepted"
                );
                Transmission::Sent
            }
            Err(e) => {
                let (status, timeout) = (e.status(), e.is_timeout());
                let error = Error::ReportFailed(e);
                warn!(?status, timeout, %error, pending = pending.weight(), "keeping usage records for the next attempt");
                Transmission::Failed
            }
        }
    }
}

/// Accumulates usage and missing-key records and submits them in batches.
pub struct UsageAggregator {
    shared: Arc<Shared>,
}

impl UsageAggregator {
    /// Aggregator with the default threshold.
    pub fn new(gateway: Arc<dyn Gateway>, credential: &Credential) -> Self {
        Self::with_threshold(gateway, credential, DEFAULT_REPORT_THRESHOLD)
    }

    /// Aggregator with a custom threshold (at least 1).
    pub fn with_threshold(gateway: Arc<dyn Gateway>, credential: &Credential, threshold: usize) -> Self {
        let token = match credential.auth_token() {
            Ok(token) => Some(token),
            Err(error) => {
                debug!(%error, "usage reports disabled until configured");
                None
            }
        };

        Self {
            shared: Arc::new(Shared {
                gateway,
                token,
                threshold: threshold.max(1),
                pending: Mutex::new(Pending::default()),
            }),
        }
    }

    /// Observations that make a report due.
    pub fn threshold(&self) -> usize {
        self.shared.threshold
    }

    /// Count one successful lookup of `key`.
    pub fn record_used(&self, key: &str) {
        self.record(|pending| {
            let count = pending.utilised.entry(key.to_string()).or_insert(0);
            *count = count.saturating_add(1);
        });
    }

    /// Record a failed lookup of `key`. A later miss for the same key
    /// replaces the default value.
    pub fn record_missing(&self, key: &str, default_value: &str) {
        self.record(|pending| {
            pending
                .missing
                .insert(key.to_string(), default_value.to_string());
        });
    }

    /// Copy of everything not yet accepted by the service.
    pub fn pending(&self) -> ReportBatch {
        self.shared.pending.lock().snapshot()
    }

    /// Whether a report is awaiting the service.
    pub fn is_in_flight(&self) -> bool {
        self.shared.pending.lock().in_flight
    }

    /// Wait for the background report currently in flight, if any.
    pub async fn settle(&self) -> Option<Transmission> {
        let handle = self.shared.pending.lock().task.take()?;
        match handle.await {
            Ok(outcome) => Some(outcome),
            Err(error) => {
                warn!(%error, "usage report task ended abnormally");
                Some(Transmission::Failed)
            }
        }
    }

    /// Submit everything pending regardless of the threshold and wait for
    /// the outcome. A report already in flight is awaited first.
    pub async fn flush(&self) -> Transmission {
        self.settle().await;

        let start = {
            let mut pending = self.shared.pending.lock();
            self.shared.try_start(&mut pending, true)
        };

        match start {
            Start::Ready(batch, token) => self.shared.submit(batch, token).await,
            Start::NotDue => Transmission::Idle,
            Start::Busy => Transmission::Busy,
            Start::Unconfigured => Transmission::Deferred,
        }
    }

    fn record(&self, update: impl FnOnce(&mut Pending)) {
        let mut pending = self.shared.pending.lock();
        update(&mut pending);
        if let Start::Ready(batch, token) = self.shared.try_start(&mut pending, false) {
            self.spawn(&mut pending, batch, token);
        }
    }

    /// Spawn the report while `pending` is still locked so the stored
    /// handle always belongs to the flight that set `in_flight`.
    fn spawn(&self, pending: &mut Pending, batch: ReportBatch, token: AuthToken) {
        match Handle::try_current() {
            Ok(runtime) => {
                let shared = Arc::clone(&self.shared);
                pending.task = Some(runtime.spawn(async move { shared.submit(batch, token).await }));
            }
            Err(_) => {
                warn!("no tokio runtime available; usage report postponed");
                pending.in_flight = false;
            }
        }
    }
}

impl std::fmt::Debug for UsageAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pending = self.shared.pending.lock();
        f.debug_struct("UsageAggregator")
            .field("threshold", &self.shared.threshold)
            .field("utilised", &pending.utilised.len())
            .field("missing", &pending.missing.len())
            .field("in_flight", &pending.in_flight)
            .finish()
    }
}
