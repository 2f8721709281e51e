//! Config generation commands: generate_aws_config, describe_stack_config.

use anyhow::{Context, Result};

use stackwire_stacks::{write_aws_config, write_stack_description, StackOutputAggregator};

use super::{GlobalArgs, RoleSelection};
use crate::context::DeployContext;

pub async fn generate(global: &GlobalArgs, args: &RoleSelection) -> Result<()> {
    let ctx = DeployContext::load(global).await?;

    let config = StackOutputAggregator::new(ctx.provisioner(), &ctx.params)
        .with_retry_policy(ctx.retry_policy())
        .aggregate(&args.roles)
        .await
        .context("failed to aggregate stack outputs")?;

    let path = write_aws_config(ctx.outpath(), &config)?;
    println!("Wrote {} ({} values)", path.display(), config.len());
    Ok(())
}

pub async fn describe(global: &GlobalArgs) -> Result<()> {
    let ctx = DeployContext::load(global).await?;

    let stacks = StackOutputAggregator::new(ctx.provisioner(), &ctx.params)
        .with_retry_policy(ctx.retry_policy())
        .describe()
        .await
        .context("failed to describe stacks")?;

    let path = write_stack_description(ctx.outpath(), &stacks)?;
    println!("Wrote {} ({} stacks)", path.display(), stacks.len());
    Ok(())
}
