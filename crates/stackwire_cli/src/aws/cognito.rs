//! Cognito user pool administration.

use anyhow::{anyhow, Result};
use aws_config::SdkConfig;
use aws_sdk_cognitoidentityprovider::types::MessageActionType;
use aws_sdk_cognitoidentityprovider::Client;
use tracing::info;

use stackwire_core::RetryPolicy;

use super::describe_sdk_error;

pub struct CognitoUserPool {
    client: Client,
}

impl CognitoUserPool {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }

    /// Create `username` without sending an invitation and give it a
    /// permanent password, so it can sign in right away.
    ///
    /// Both calls run once, bounded by the policy timeout.
    pub async fn create_confirmed_user(
        &self,
        retry: &RetryPolicy,
        pool_id: &str,
        username: &str,
        password: &str,
    ) -> Result<()> {
        let create = async {
            self.client
                .admin_create_user()
                .user_pool_id(pool_id)
                .username(username)
                .message_action(MessageActionType::Suppress)
                .send()
                .await
                .map_err(|e| anyhow!("creating user {} failed: {}", username, describe_sdk_error(&e).0))
        };
        retry.run_once("create user", create).await?;

        let set_password = async {
            self.client
                .admin_set_user_password()
                .user_pool_id(pool_id)
                .username(username)
                .password(password)
                .permanent(true)
                .send()
                .await
                .map_err(|e| anyhow!("setting password for {} failed: {}", username, describe_sdk_error(&e).0))
        };
        retry.run_once("set user password", set_password).await?;

        info!("Created confirmed user {} in pool {}", username, pool_id);
        Ok(())
    }
}
