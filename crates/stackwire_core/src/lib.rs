//! # stackwire_core
//!
//! Shared runtime pieces for stackwire: the settings struct built once by the
//! CLI entry point and the retry policy that wraps calls to remote APIs.
//!
//! ## Example
//!
//! ```rust,no_run
//! use stackwire_core::Settings;
//! use std::path::Path;
//!
//! let settings = Settings::load_or_default(Path::new("stackwire.yaml"))
//!     .unwrap()
//!     .with_region("eu-west-1");
//! settings.validate().unwrap();
//!
//! let policy = settings.retry_policy();
//! assert!(policy.max_attempts() >= 1);
//! ```

pub mod config;
pub mod error;
pub mod retry;

pub use config::Settings;
pub use error::{CoreError, CoreResult};
pub use retry::{Backoff, RetryPolicy, Retryable};
