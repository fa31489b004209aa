//! In-memory gateway for tests.

use crate::credential::AuthToken;
use crate::gateway::{Gateway, GatewayError};
use crate::model::{LocalizationEntry, ReportBatch};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Semaphore;

/// A [`Gateway`] that serves scripted localizations and records every call.
///
/// Reports can be held open with [`hold_reports`](Self::hold_reports) to
/// observe the in-flight state, then let through one at a time with
/// [`release_report`](Self::release_report).
#[derive(Debug)]
pub struct RecordingGateway {
    localizations: Mutex<Vec<LocalizationEntry>>,
    fail_fetches: AtomicBool,
    fetch_requests: Mutex<Vec<String>>,
    tokens: Mutex<Vec<String>>,
    reports: Mutex<Vec<ReportBatch>>,
    report_failures: AtomicUsize,
    holding: AtomicBool,
    gate: Semaphore,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self {
            localizations: Mutex::new(Vec::new()),
            fail_fetches: AtomicBool::new(false),
            fetch_requests: Mutex::new(Vec::new()),
            tokens: Mutex::new(Vec::new()),
            reports: Mutex::new(Vec::new()),
            report_failures: AtomicUsize::new(0),
            holding: AtomicBool::new(false),
            gate: Semaphore::new(0),
        }
    }

    /// Gateway that serves the given `(key, text)` pairs.
    pub fn with_localizations(pairs: &[(&str, &str)]) -> Self {
        let gateway = Self::new();
        gateway.set_localizations(pairs);
        gateway
    }

    pub fn set_localizations(&self, pairs: &[(&str, &str)]) {
        *self.localizations.lock() = pairs
            .iter()
            .map(|(key, text)| LocalizationEntry::new(*key, *text))
            .collect();
    }

    /// Make fetches fail until called again with `false`.
    pub fn fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    /// Fail the next `count` report submissions.
    pub fn fail_next_reports(&self, count: usize) {
        self.report_failures.store(count, Ordering::SeqCst);
    }

    /// Block report submissions until released.
    pub fn hold_reports(&self) {
        self.holding.store(true, Ordering::SeqCst);
    }

    /// Let one held report submission complete.
    pub fn release_report(&self) {
        self.gate.add_permits(1);
    }

    /// Language preference strings passed to every fetch.
    pub fn fetch_requests(&self) -> Vec<String> {
        self.fetch_requests.lock().clone()
    }

    /// Tokens presented with every call, fetches and reports alike.
    pub fn tokens(&self) -> Vec<String> {
        self.tokens.lock().clone()
    }

    /// Every report submitted, including failed attempts.
    pub fn reports(&self) -> Vec<ReportBatch> {
        self.reports.lock().clone()
    }

    pub fn report_count(&self) -> usize {
        self.reports.lock().len()
    }

    /// Wait until at least `count` reports have been submitted.
    ///
    /// # Panics
    ///
    /// After five seconds without reaching `count`.
    pub async fn wait_for_reports(&self, count: usize) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while self.report_count() < count {
            assert!(
                tokio::time::Instant::now() < deadline,
                "timed out waiting for {count} reports, saw {}",
                self.report_count()
            );
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }
}

impl Default for RecordingGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Gateway for RecordingGateway {
    async fn fetch_localizations(
        &self,
        token: &AuthToken,
        language_codes: &str,
    ) -> Result<Vec<LocalizationEntry>, GatewayError> {
        self.tokens.lock().push(token.expose().to_string());
        self.fetch_requests.lock().push(language_codes.to_string());

        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(GatewayError::Unavailable("scripted fetch failure".to_string()));
        }
        Ok(self.localizations.lock().clone())
    }

    async fn submit_report(&self, token: &AuthToken, batch: &ReportBatch) -> Result<(), GatewayError> {
        self.tokens.lock().push(token.expose().to_string());
        self.reports.lock().push(batch.clone());

        if self.holding.load(Ordering::SeqCst) {
            self.gate
                .acquire()
                .await
                .map_err(|e| GatewayError::Unavailable(e.to_string()))?
                .forget();
        }

        let fail = self
            .report_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if fail {
            return Err(GatewayError::Unavailable("scripted report failure".to_string()));
        }
        Ok(())
    }
}
