//! # stackwire_params
//!
//! Reading, updating and writing the deployment parameter file.
//!
//! The parameter file is the JSON list handed to the provisioning API as
//! template parameters:
//!
//! ```json
//! [
//!   { "ParameterKey": "AppName", "ParameterValue": "shows" },
//!   { "ParameterKey": "Environment", "ParameterValue": "dev" }
//! ]
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use stackwire_params::ParameterStore;
//! use std::path::Path;
//!
//! let path = Path::new("parameters.json");
//! let mut store = ParameterStore::load(path).unwrap();
//! println!("app: {}", store.get("AppName").unwrap());
//!
//! if store.upsert("CurrentGitHash", "3f2a9c1") {
//!     store.persist(path).unwrap();
//! }
//! ```

pub mod error;
pub mod store;

pub use error::{ParamError, ParamResult};
pub use store::{ParameterEntry, ParameterStore};
