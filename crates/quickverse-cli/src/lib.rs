//! QuickVerse command line client.
//!
//! Fetches localizations for a language and resolves keys through the SDK,
//! so the usage reporting path can be exercised from a terminal.

pub mod cli;
pub mod error;
pub mod output;

pub use error::CliError;
