//! # stackwire_stacks
//!
//! Stack naming, lifecycle and output aggregation for stackwire.
//!
//! ## Features
//!
//! - Deterministic stack names per role (`{AppName}-{Environment}[-{Color}]-{role}`)
//! - Exact-name selection of deployed stacks
//! - Output merging with duplicate-key detection
//! - Front-end config (`aws_config.js`) and stack snapshot generation
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use stackwire_params::ParameterStore;
//! use stackwire_stacks::{write_aws_config, MockProvisioner, StackOutputAggregator, StackRole};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let params = ParameterStore::load(Path::new("parameters.json"))?;
//! let api = Arc::new(MockProvisioner::new());
//!
//! let config = StackOutputAggregator::new(api, &params)
//!     .aggregate(&[StackRole::Main, StackRole::Logic])
//!     .await?;
//! write_aws_config(Path::new("out"), &config)?;
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod artifact;
pub mod error;
pub mod lifecycle;
pub mod mock;
pub mod provisioning;
pub mod resolver;
pub mod role;

pub use aggregator::{AggregatedConfig, StackOutputAggregator, IDENTITY_POOL_REGION_KEY, REGION_KEY};
pub use artifact::{render_aws_config, write_aws_config, write_stack_description};
pub use error::{StackError, StackResult};
pub use lifecycle::StackDeployer;
pub use mock::{CapturedCall, MockProvisioner};
pub use provisioning::{DeployedStack, ProvisioningApi, StackOutput, StackRequest, StackResponse};
pub use resolver::{ResolvedStack, StackNameResolver, APP_NAME_KEY, COLOR_KEY, ENVIRONMENT_KEY};
pub use role::StackRole;
