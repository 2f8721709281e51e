//! Provisioning API seam.
//!
//! The aggregator only reads (`describe_stacks`); the lifecycle calls are
//! driven by [`crate::lifecycle::StackDeployer`] on behalf of the CLI.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stackwire_params::{ParameterEntry, ParameterStore};

use crate::error::StackResult;
use crate::resolver::ResolvedStack;

/// One output declared by a deployed stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackOutput {
    #[serde(rename = "OutputKey")]
    pub key: String,
    #[serde(rename = "OutputValue")]
    pub value: String,
}

impl StackOutput {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A stack as reported by the provisioning API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedStack {
    #[serde(rename = "StackName")]
    pub name: String,
    #[serde(rename = "StackStatus", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "CreationTime", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "Outputs", default)]
    pub outputs: Vec<StackOutput>,
}

impl DeployedStack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: None,
            created_at: None,
            outputs: Vec::new(),
        }
    }

    pub fn with_output(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.outputs.push(StackOutput::new(key, value));
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

/// Create or update request for one stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackRequest {
    pub name: String,
    pub template_body: String,
    pub parameters: Vec<ParameterEntry>,
}

impl StackRequest {
    pub fn new(stack: &ResolvedStack, template_body: impl Into<String>, params: &ParameterStore) -> Self {
        Self {
            name: stack.name.clone(),
            template_body: template_body.into(),
            parameters: params.entries().cloned().collect(),
        }
    }
}

/// Identifier returned by a lifecycle call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackResponse {
    pub stack_id: Option<String>,
}

/// Provisioning API used to inspect and manage stacks.
#[async_trait]
pub trait ProvisioningApi: Send + Sync {
    /// List every currently deployed stack with its outputs.
    async fn describe_stacks(&self) -> StackResult<Vec<DeployedStack>>;

    /// Create a new stack.
    async fn create_stack(&self, request: &StackRequest) -> StackResult<StackResponse>;

    /// Update an existing stack.
    async fn update_stack(&self, request: &StackRequest) -> StackResult<StackResponse>;

    /// Delete a stack by name.
    async fn delete_stack(&self, name: &str) -> StackResult<()>;
}
