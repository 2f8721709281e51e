//! CloudFormation implementation of the provisioning API.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_cloudformation::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_cloudformation::types::{Capability, Parameter, Stack};
use aws_sdk_cloudformation::Client;
use chrono::{DateTime, Utc};
use tracing::debug;

use stackwire_stacks::{
    DeployedStack, ProvisioningApi, StackError, StackOutput, StackRequest, StackResponse, StackResult,
};

use super::describe_sdk_error;

pub struct CloudFormationProvisioner {
    client: Client,
}

impl CloudFormationProvisioner {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }

    fn parameters(request: &StackRequest) -> Vec<Parameter> {
        request
            .parameters
            .iter()
            .map(|entry| {
                Parameter::builder()
                    .parameter_key(&entry.key)
                    .parameter_value(&entry.value)
                    .build()
            })
            .collect()
    }
}

#[async_trait]
impl ProvisioningApi for CloudFormationProvisioner {
    async fn describe_stacks(&self) -> StackResult<Vec<DeployedStack>> {
        let mut stacks = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let response = self
                .client
                .describe_stacks()
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(to_stack_error)?;

            stacks.extend(response.stacks().iter().map(convert_stack));

            match response.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        debug!("DescribeStacks returned {} stacks", stacks.len());
        Ok(stacks)
    }

    async fn create_stack(&self, request: &StackRequest) -> StackResult<StackResponse> {
        let response = self
            .client
            .create_stack()
            .stack_name(&request.name)
            .template_body(&request.template_body)
            .set_parameters(Some(Self::parameters(request)))
            .capabilities(Capability::CapabilityNamedIam)
            .capabilities(Capability::CapabilityAutoExpand)
            .send()
            .await
            .map_err(to_stack_error)?;

        Ok(StackResponse {
            stack_id: response.stack_id().map(str::to_string),
        })
    }

    async fn update_stack(&self, request: &StackRequest) -> StackResult<StackResponse> {
        let response = self
            .client
            .update_stack()
            .stack_name(&request.name)
            .template_body(&request.template_body)
            .set_parameters(Some(Self::parameters(request)))
            .capabilities(Capability::CapabilityNamedIam)
            .capabilities(Capability::CapabilityAutoExpand)
            .send()
            .await
            .map_err(to_stack_error)?;

        Ok(StackResponse {
            stack_id: response.stack_id().map(str::to_string),
        })
    }

    async fn delete_stack(&self, name: &str) -> StackResult<()> {
        self.client
            .delete_stack()
            .stack_name(name)
            .send()
            .await
            .map_err(to_stack_error)?;
        Ok(())
    }
}

fn convert_stack(stack: &Stack) -> DeployedStack {
    DeployedStack {
        name: stack.stack_name().unwrap_or_default().to_string(),
        status: stack.stack_status().map(|s| s.as_str().to_string()),
        created_at: stack
            .creation_time()
            .and_then(|t| DateTime::<Utc>::from_timestamp(t.secs(), t.subsec_nanos())),
        outputs: stack
            .outputs()
            .iter()
            .filter_map(|output| match (output.output_key(), output.output_value()) {
                (Some(key), Some(value)) => Some(StackOutput::new(key, value)),
                _ => None,
            })
            .collect(),
    }
}

fn to_stack_error<E, R>(err: SdkError<E, R>) -> StackError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match describe_sdk_error(&err) {
        (message, true) => StackError::transient(message),
        (message, false) => StackError::provisioning(message),
    }
}
