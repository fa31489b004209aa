//! The application-facing entry point.

use crate::credential::Credential;
use crate::error::{Error, Result, UnconfiguredReason};
use crate::gateway::{Gateway, HttpGateway};
use crate::model::ReportBatch;
use crate::reporting::{Transmission, UsageAggregator, DEFAULT_REPORT_THRESHOLD};
use crate::store::LocalizationStore;
use crate::substitution::Substitution;
use parking_lot::RwLock;
use quickverse_common_config::ClientConfig;
use quickverse_common_locale::{device_language_tags, preference_list, primary_language};
use quickverse_common_log::spans::fetch_span;
use quickverse_common_secret::SecretString;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, trace, warn, Instrument};

struct Session {
    credential: Option<Credential>,
    usage: Arc<UsageAggregator>,
}

/// QuickVerse client.
///
/// 1. [`configure`](Self::configure) with your API key and package name.
/// 2. Fetch localizations once, typically during launch, with
///    [`fetch_for_device_language`](Self::fetch_for_device_language) or
///    [`fetch_specific`](Self::fetch_specific).
/// 3. Resolve keys with the `string_for*` methods from anywhere holding the
///    instance.
///
/// Every lookup also records usage: hits count toward the key's usage and
/// misses are reported together with the default the caller supplied.
pub struct QuickVerse {
    gateway: Arc<dyn Gateway>,
    store: LocalizationStore,
    session: RwLock<Session>,
    debug: AtomicBool,
    fetched: AtomicBool,
    threshold: usize,
    device_languages: Vec<String>,
}

impl QuickVerse {
    /// Client over `gateway` with device languages detected from the
    /// environment.
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self::builder(gateway).build()
    }

    /// Start a [`QuickVerseBuilder`] over `gateway`.
    pub fn builder(gateway: Arc<dyn Gateway>) -> QuickVerseBuilder {
        QuickVerseBuilder::new(gateway)
    }

    /// Client talking HTTP to `base_url` with default timeouts.
    pub fn http(base_url: &str) -> Result<Self> {
        let gateway = HttpGateway::new(base_url).map_err(Error::Setup)?;
        Ok(Self::new(Arc::new(gateway)))
    }

    /// Client built from a loaded configuration, already configured with
    /// its credential. A blank key or package name surfaces as
    /// `Unconfigured` on the first fetch.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let gateway = HttpGateway::from_config(config).map_err(Error::Setup)?;
        let quickverse = Self::builder(Arc::new(gateway))
            .report_threshold(config.report_threshold)
            .debug(config.debug)
            .build();
        quickverse.configure(config.api_key.clone(), config.package_name.clone());
        Ok(quickverse)
    }

    /// Set the credential for all later requests.
    ///
    /// Empties the store and discards pending usage records. Never fails:
    /// an empty field is reported as `Unconfigured` by the next fetch.
    pub fn configure(&self, api_key: impl Into<SecretString>, package_name: impl Into<String>) {
        let credential = Credential::new(api_key, package_name);
        let usage = Arc::new(UsageAggregator::with_threshold(
            Arc::clone(&self.gateway),
            &credential,
            self.threshold,
        ));

        if self.is_debug_enabled() {
            info!(package = credential.package_name(), "QuickVerse configured");
        }

        let mut session = self.session.write();
        self.store.clear();
        self.fetched.store(false, Ordering::SeqCst);
        *session = Session {
            credential: Some(credential),
            usage,
        };
    }

    /// Fetch localizations for the device's preferred language.
    pub async fn fetch_for_device_language(&self) -> Result<usize> {
        let language = primary_language(&self.device_languages);
        self.fetch_specific(&language).await
    }

    /// Fetch localizations for `language_code`, usually a two-letter
    /// ISO 639-1 code.
    ///
    /// The device locales are sent after it as fallbacks. On success the
    /// store is replaced and the number of entries returned. On failure the
    /// store keeps its previous contents.
    pub async fn fetch_specific(&self, language_code: &str) -> Result<usize> {
        let credential = self
            .session
            .read()
            .credential
            .clone()
            .ok_or_else(|| Error::unconfigured(UnconfiguredReason::NotConfigured))?;
        let token = credential.auth_token()?;

        let languages = preference_list(language_code, &self.device_languages);
        if self.is_debug_enabled() {
            info!(language = language_code, %languages, "retrieving localizations");
        }

        let result = self
            .gateway
            .fetch_localizations(&token, &languages)
            .instrument(fetch_span(&languages))
            .await;

        match result {
            Ok(entries) => {
                let count = self.store.replace(entries, language_code);
                self.fetched.store(true, Ordering::SeqCst);
                if self.is_debug_enabled() {
                    if count == 0 {
                        warn!(
                            language = language_code,
                            "localizations empty; add at least one localization to your quickverse.io account"
                        );
                    } else {
                        info!(language = language_code, count, "retrieved localizations");
                    }
                }
                Ok(count)
            }
            Err(e) => {
                let (status, timeout) = (e.status(), e.is_timeout());
                let error = Error::FetchFailed(e);
                warn!(language = language_code, ?status, timeout, %error, "keeping previous localizations");
                Err(error)
            }
        }
    }

    /// Localized text for `key`, or `None` if the key is unknown.
    pub fn string_for(&self, key: &str) -> Option<String> {
        self.resolve(key, None)
    }

    /// Localized text for `key`, or `default_value` if the key is unknown.
    pub fn string_for_or(&self, key: &str, default_value: &str) -> String {
        self.resolve(key, Some(default_value))
            .unwrap_or_else(|| default_value.to_string())
    }

    /// Like [`string_for`](Self::string_for), with placeholders replaced in
    /// the localized text.
    pub fn string_for_with(&self, key: &str, substitutions: &[Substitution]) -> Option<String> {
        self.string_for(key)
            .map(|text| Substitution::apply_all(&text, substitutions))
    }

    /// Like [`string_for_or`](Self::string_for_or), with placeholders
    /// replaced in the localized text. The default is returned as given.
    pub fn string_for_or_with(
        &self,
        key: &str,
        default_value: &str,
        substitutions: &[Substitution],
    ) -> String {
        match self.resolve(key, Some(default_value)) {
            Some(text) => Substitution::apply_all(&text, substitutions),
            None => default_value.to_string(),
        }
    }

    fn resolve(&self, key: &str, default_value: Option<&str>) -> Option<String> {
        let usage = self.usage();
        match self.store.lookup(key) {
            Some(text) => {
                usage.record_used(key);
                Some(text)
            }
            None => {
                if self.store.is_empty() {
                    warn!(
                        key,
                        "no localizations have been received; check your account has at least one localization and that the fetch succeeded"
                    );
                } else {
                    warn!(key, "value not found for key; check it exists in your quickverse.io account");
                }
                usage.record_missing(key, default_value.unwrap_or_default());
                None
            }
        }
    }

    fn usage(&self) -> Arc<UsageAggregator> {
        Arc::clone(&self.session.read().usage)
    }

    /// Toggle informational diagnostics. Warnings are always logged.
    pub fn set_debug_enabled(&self, enabled: bool) {
        self.debug.store(enabled, Ordering::Relaxed);
    }

    /// Whether diagnostic logging is on.
    pub fn is_debug_enabled(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }

    /// Whether a fetch has succeeded since the last `configure`.
    pub fn has_fetched(&self) -> bool {
        self.fetched.load(Ordering::SeqCst)
    }

    /// Number of localizations in the store.
    pub fn localization_count(&self) -> usize {
        self.store.len()
    }

    /// Language code of the last successful fetch.
    pub fn current_language(&self) -> Option<String> {
        self.store.language()
    }

    /// Usage records not yet accepted by the service.
    pub fn pending_report(&self) -> ReportBatch {
        self.usage().pending()
    }

    /// Submit pending usage now, regardless of the threshold.
    pub async fn flush(&self) -> Transmission {
        self.usage().flush().await
    }

    /// Wait for a usage report currently in flight.
    pub async fn settle(&self) -> Option<Transmission> {
        self.usage().settle().await
    }

    /// Flush pending usage every `period` until the returned task is stopped
    /// or dropped. The task holds only a weak reference to the client.
    ///
    /// # Panics
    ///
    /// When called outside a tokio runtime.
    pub fn spawn_periodic_flush(self: &Arc<Self>, period: Duration) -> FlushTask {
        let client: Weak<Self> = Arc::downgrade(self);
        let period = period.max(Duration::from_millis(1));

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(client) = client.upgrade() else { break };
                let outcome = client.flush().await;
                trace!(?outcome, "periodic usage flush");
            }
        });

        FlushTask { handle }
    }
}

impl std::fmt::Debug for QuickVerse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.session.read();
        f.debug_struct("QuickVerse")
            .field("credential", &session.credential)
            .field("usage", &session.usage)
            .field("localizations", &self.store.len())
            .field("debug", &self.is_debug_enabled())
            .finish()
    }
}

/// Builder for [`QuickVerse`].
pub struct QuickVerseBuilder {
    gateway: Arc<dyn Gateway>,
    threshold: usize,
    device_languages: Option<Vec<String>>,
    debug: bool,
}

impl QuickVerseBuilder {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            gateway,
            threshold: DEFAULT_REPORT_THRESHOLD,
            device_languages: None,
            debug: false,
        }
    }

    /// Observations that make a usage report due.
    pub fn report_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    /// Override the device language tags, most preferred first.
    pub fn device_languages<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.device_languages = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Enable diagnostic logging from the start.
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    /// Build an unconfigured client.
    pub fn build(self) -> QuickVerse {
        let usage = Arc::new(UsageAggregator::with_threshold(
            Arc::clone(&self.gateway),
            &Credential::new("", ""),
            self.threshold,
        ));

        QuickVerse {
            gateway: self.gateway,
            store: LocalizationStore::new(),
            session: RwLock::new(Session {
                credential: None,
                usage,
            }),
            debug: AtomicBool::new(self.debug),
            fetched: AtomicBool::new(false),
            threshold: self.threshold,
            device_languages: self.device_languages.unwrap_or_else(device_language_tags),
        }
    }
}

/// Handle to a periodic flush; aborts the task when stopped or dropped.
#[derive(Debug)]
pub struct FlushTask {
    handle: JoinHandle<()>,
}

impl FlushTask {
    /// Cancel the periodic flush.
    pub fn stop(self) {
        self.handle.abort();
    }

    /// Whether the flush loop is still scheduled.
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for FlushTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
