//! add_dummy_user command - create a confirmed test user.

use anyhow::{Context, Result};
use clap::Args;

use stackwire_stacks::StackOutputAggregator;

use super::{GlobalArgs, RoleSelection};
use crate::context::DeployContext;

/// Output key of the user pool id.
pub const USER_POOL_ID_KEY: &str = "userPoolId";

#[derive(Args, Debug, Clone)]
pub struct AddDummyUserArgs {
    #[command(flatten)]
    pub selection: RoleSelection,

    /// User name (an email address in the default pool setup)
    #[arg(long, default_value = "test@test.de")]
    pub username: String,

    /// Permanent password for the user
    #[arg(long, default_value = "testpw")]
    pub password: String,
}

pub async fn execute(global: &GlobalArgs, args: &AddDummyUserArgs) -> Result<()> {
    let ctx = DeployContext::load(global).await?;

    let config = StackOutputAggregator::new(ctx.provisioner(), &ctx.params)
        .with_retry_policy(ctx.retry_policy())
        .aggregate(&args.selection.roles)
        .await
        .context("failed to aggregate stack outputs")?;
    let pool_id = config.require(USER_POOL_ID_KEY)?;

    ctx.user_pool()
        .create_confirmed_user(&ctx.retry_policy(), pool_id, &args.username, &args.password)
        .await?;

    println!("Created user {} in {}", args.username, pool_id);
    Ok(())
}
