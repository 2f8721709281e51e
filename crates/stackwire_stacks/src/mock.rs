//! In-memory provisioning API for testing.
//!
//! Holds a list of deployed stacks, records every call and can simulate
//! transient or permanent failures.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::error::{StackError, StackResult};
use crate::provisioning::{DeployedStack, ProvisioningApi, StackRequest, StackResponse};

/// Captured call information for verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedCall {
    pub method: String,
    pub stack_name: Option<String>,
    pub parameter_count: Option<usize>,
}

impl CapturedCall {
    fn new(method: &str, stack_name: Option<&str>, parameter_count: Option<usize>) -> Self {
        Self {
            method: method.to_string(),
            stack_name: stack_name.map(str::to_string),
            parameter_count,
        }
    }
}

/// Mock provisioning API.
#[derive(Clone, Default)]
pub struct MockProvisioner {
    stacks: Arc<RwLock<Vec<DeployedStack>>>,
    captured_calls: Arc<RwLock<Vec<CapturedCall>>>,
    /// Number of upcoming calls that fail with a transient error.
    transient_failures: Arc<AtomicUsize>,
    /// Permanent failure returned by every call.
    simulate_failure: Arc<RwLock<Option<String>>>,
}

impl MockProvisioner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a deployed stack.
    pub fn with_stack(self, stack: DeployedStack) -> Self {
        self.stacks.write().push(stack);
        self
    }

    pub fn with_stacks(self, stacks: Vec<DeployedStack>) -> Self {
        *self.stacks.write() = stacks;
        self
    }

    /// Fail the next `count` calls with a transient error.
    pub fn fail_transiently(self, count: usize) -> Self {
        self.transient_failures.store(count, Ordering::SeqCst);
        self
    }

    /// Fail every call with a permanent error.
    pub fn simulate_failure(self, message: impl Into<String>) -> Self {
        *self.simulate_failure.write() = Some(message.into());
        self
    }

    pub fn stacks(&self) -> Vec<DeployedStack> {
        self.stacks.read().clone()
    }

    pub fn get_calls(&self) -> Vec<CapturedCall> {
        self.captured_calls.read().clone()
    }

    pub fn call_count(&self) -> usize {
        self.captured_calls.read().len()
    }

    pub fn get_method_calls(&self, method: &str) -> Vec<CapturedCall> {
        self.captured_calls
            .read()
            .iter()
            .filter(|c| c.method == method)
            .cloned()
            .collect()
    }

    fn record_call(&self, call: CapturedCall) {
        self.captured_calls.write().push(call);
    }

    fn check_failure(&self) -> StackResult<()> {
        let remaining = self.transient_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.transient_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(StackError::transient("Rate exceeded"));
        }
        if let Some(msg) = self.simulate_failure.read().clone() {
            return Err(StackError::provisioning(msg));
        }
        Ok(())
    }
}

#[async_trait]
impl ProvisioningApi for MockProvisioner {
    async fn describe_stacks(&self) -> StackResult<Vec<DeployedStack>> {
        self.record_call(CapturedCall::new("describe_stacks", None, None));
        self.check_failure()?;
        Ok(self.stacks.read().clone())
    }

    async fn create_stack(&self, request: &StackRequest) -> StackResult<StackResponse> {
        self.record_call(CapturedCall::new(
            "create_stack",
            Some(&request.name),
            Some(request.parameters.len()),
        ));
        self.check_failure()?;

        let mut stacks = self.stacks.write();
        if stacks.iter().any(|s| s.name == request.name) {
            return Err(StackError::provisioning(format!(
                "Stack [{}] already exists",
                request.name
            )));
        }
        let mut stack = DeployedStack::new(&request.name).with_status("CREATE_COMPLETE");
        stack.created_at = Some(Utc::now());
        stacks.push(stack);

        Ok(StackResponse {
            stack_id: Some(format!("mock/{}", request.name)),
        })
    }

    async fn update_stack(&self, request: &StackRequest) -> StackResult<StackResponse> {
        self.record_call(CapturedCall::new(
            "update_stack",
            Some(&request.name),
            Some(request.parameters.len()),
        ));
        self.check_failure()?;

        let mut stacks = self.stacks.write();
        match stacks.iter_mut().find(|s| s.name == request.name) {
            Some(stack) => {
                stack.status = Some("UPDATE_COMPLETE".to_string());
                Ok(StackResponse {
                    stack_id: Some(format!("mock/{}", request.name)),
                })
            }
            None => Err(StackError::provisioning(format!(
                "Stack [{}] does not exist",
                request.name
            ))),
        }
    }

    async fn delete_stack(&self, name: &str) -> StackResult<()> {
        self.record_call(CapturedCall::new("delete_stack", Some(name), None));
        self.check_failure()?;
        self.stacks.write().retain(|s| s.name != name);
        Ok(())
    }
}
