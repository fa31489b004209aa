//! Client runtime for the QuickVerse localization service.
//!
//! [`QuickVerse`] fetches the translated strings for a language, serves key
//! lookups from memory, and reports back which keys were used or missing.
//! Usage reports are batched: a report goes out once a missing key has been
//! seen or enough lookups have accumulated, at most one report is in flight
//! at a time, and nothing is discarded until the service has accepted it.
//!
//! ```no_run
//! use quickverse_sdk::QuickVerse;
//!
//! # async fn run() -> Result<(), quickverse_sdk::Error> {
//! let quickverse = QuickVerse::http("https://quickverse.io/sdk/api/")?;
//! quickverse.configure("your-api-key", "com.example.app");
//! quickverse.fetch_for_device_language().await?;
//!
//! let title = quickverse.string_for_or("Onboarding.Welcome.Title", "Welcome");
//! # let _ = title;
//! # Ok(())
//! # }
//! ```

pub mod credential;
pub mod error;
pub mod facade;
pub mod gateway;
pub mod model;
pub mod reporting;
pub mod store;
pub mod substitution;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use credential::{AuthToken, Credential};
pub use error::{Error, Result, UnconfiguredReason};
pub use facade::{FlushTask, QuickVerse, QuickVerseBuilder};
pub use gateway::{Gateway, GatewayError, HttpGateway};
pub use model::{LocalizationEntry, MissingKeyRecord, ReportBatch, UtilisedKeyCount};
pub use reporting::{Transmission, UsageAggregator, DEFAULT_REPORT_THRESHOLD};
pub use store::LocalizationStore;
pub use substitution::Substitution;
