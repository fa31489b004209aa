//! Configuration for QuickVerse clients.
//!
//! Values come from `.quickverse/config.yaml` (with `${VAR}` expansion) and
//! are then overridden by `QUICKVERSE_*` environment variables, after `.env`
//! files have been loaded.

pub mod env;
pub mod loader;
pub mod types;

pub use env::{vars, EnvError, Environment};
pub use loader::{ConfigError, ConfigLoader};
pub use types::ClientConfig;
