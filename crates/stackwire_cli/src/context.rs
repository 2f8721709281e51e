//! Per-invocation deployment context.
//!
//! Settings, the parameter store and the AWS configuration are loaded once
//! and handed to the command by reference.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, Region, SdkConfig};
use tracing::{debug, info};

use stackwire_core::{RetryPolicy, Settings};
use stackwire_params::ParameterStore;
use stackwire_stacks::ProvisioningApi;

use crate::aws::cloudformation::CloudFormationProvisioner;
use crate::aws::cognito::CognitoUserPool;
use crate::aws::s3::S3ObjectStore;
use crate::commands::GlobalArgs;

pub struct DeployContext {
    pub settings: Settings,
    pub params: ParameterStore,
    sdk_config: SdkConfig,
}

impl DeployContext {
    /// Load settings and the parameter file, and resolve AWS credentials.
    pub async fn load(global: &GlobalArgs) -> Result<Self> {
        let settings = resolve_settings(global)?;
        let params = ParameterStore::load(&settings.parameter_file).with_context(|| {
            format!("failed to load parameter file {}", settings.parameter_file.display())
        })?;
        info!(
            "Loaded {} parameters from {}",
            params.len(),
            settings.parameter_file.display()
        );

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .load()
            .await;
        debug!("AWS configuration loaded for region {}", settings.region);

        Ok(Self {
            settings,
            params,
            sdk_config,
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.settings.retry_policy()
    }

    pub fn outpath(&self) -> &Path {
        &self.settings.outpath
    }

    pub fn provisioner(&self) -> Arc<dyn ProvisioningApi> {
        Arc::new(CloudFormationProvisioner::new(&self.sdk_config))
    }

    pub fn object_store(&self) -> S3ObjectStore {
        S3ObjectStore::new(&self.sdk_config)
    }

    pub fn user_pool(&self) -> CognitoUserPool {
        CognitoUserPool::new(&self.sdk_config)
    }

    pub fn sdk_config(&self) -> &SdkConfig {
        &self.sdk_config
    }
}

/// Settings file (if present) with command-line and environment overrides.
pub fn resolve_settings(global: &GlobalArgs) -> Result<Settings> {
    let mut settings = Settings::load_or_default(&global.config)
        .with_context(|| format!("failed to load settings from {}", global.config.display()))?;

    if let Some(region) = &global.region {
        settings = settings.with_region(region.clone());
    }
    if let Some(path) = &global.parameters {
        settings = settings.with_parameter_file(path.clone());
    }
    if let Some(path) = &global.outpath {
        settings = settings.with_outpath(path.clone());
    }

    settings.validate()?;
    Ok(settings)
}
