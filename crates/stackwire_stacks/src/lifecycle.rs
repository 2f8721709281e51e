//! Stack lifecycle calls (create, update, delete).
//!
//! These mutate remote state and are therefore run once, bounded by the
//! policy timeout, and never retried.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use stackwire_core::RetryPolicy;
use stackwire_params::ParameterStore;

use crate::error::{StackError, StackResult};
use crate::provisioning::{ProvisioningApi, StackRequest, StackResponse};
use crate::resolver::{ResolvedStack, StackNameResolver};
use crate::role::StackRole;

/// Drives create/update/delete for a role.
pub struct StackDeployer<'a> {
    api: Arc<dyn ProvisioningApi>,
    params: &'a ParameterStore,
    template_root: PathBuf,
    retry: RetryPolicy,
}

impl<'a> StackDeployer<'a> {
    pub fn new(api: Arc<dyn ProvisioningApi>, params: &'a ParameterStore) -> Self {
        Self {
            api,
            params,
            template_root: PathBuf::from("."),
            retry: RetryPolicy::default(),
        }
    }

    /// Directory the role template paths are relative to.
    pub fn with_template_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.template_root = root.into();
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn resolve(&self, role: StackRole) -> StackResult<ResolvedStack> {
        StackNameResolver::new(self.params).resolve(role)
    }

    /// Create the stack for `role` from its template.
    pub async fn create(&self, role: StackRole) -> StackResult<StackResponse> {
        let request = self.request(role)?;
        info!("Creating stack {}", request.name);
        self.retry
            .run_once("create stack", self.api.create_stack(&request))
            .await
    }

    /// Update the stack for `role` from its template.
    pub async fn update(&self, role: StackRole) -> StackResult<StackResponse> {
        let request = self.request(role)?;
        info!("Updating stack {}", request.name);
        self.retry
            .run_once("update stack", self.api.update_stack(&request))
            .await
    }

    /// Delete the stack for `role`. Returns the deleted stack name.
    pub async fn delete(&self, role: StackRole) -> StackResult<String> {
        let stack = self.resolve(role)?;
        info!("Deleting stack {}", stack.name);
        self.retry
            .run_once("delete stack", self.api.delete_stack(&stack.name))
            .await?;
        Ok(stack.name)
    }

    fn request(&self, role: StackRole) -> StackResult<StackRequest> {
        let stack = self.resolve(role)?;
        let template_body = read_template(&self.template_root.join(&stack.template_path))?;
        Ok(StackRequest::new(&stack, template_body, self.params))
    }
}

fn read_template(path: &Path) -> StackResult<String> {
    fs::read_to_string(path).map_err(|e| {
        StackError::Config(format!("cannot read template {}: {}", path.display(), e))
    })
}
