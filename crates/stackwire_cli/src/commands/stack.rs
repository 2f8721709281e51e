//! Stack lifecycle commands: create_stack, update_stack, delete_stack.

use anyhow::{Context, Result};
use tracing::info;

use stackwire_stacks::StackDeployer;

use super::{GlobalArgs, StackArgs};
use crate::context::DeployContext;

pub async fn create(global: &GlobalArgs, args: &StackArgs) -> Result<()> {
    let ctx = DeployContext::load(global).await?;
    let deployer = deployer(&ctx, args);

    let response = deployer
        .create(args.role)
        .await
        .with_context(|| format!("create_stack failed for role {}", args.role))?;

    println!(
        "Creating stack {}",
        response.stack_id.as_deref().unwrap_or("(no stack id returned)")
    );
    Ok(())
}

pub async fn update(global: &GlobalArgs, args: &StackArgs) -> Result<()> {
    let ctx = DeployContext::load(global).await?;
    let deployer = deployer(&ctx, args);

    let response = deployer
        .update(args.role)
        .await
        .with_context(|| format!("update_stack failed for role {}", args.role))?;

    println!(
        "Updating stack {}",
        response.stack_id.as_deref().unwrap_or("(no stack id returned)")
    );
    Ok(())
}

pub async fn delete(global: &GlobalArgs, args: &StackArgs) -> Result<()> {
    let ctx = DeployContext::load(global).await?;
    let name = deployer(&ctx, args)
        .delete(args.role)
        .await
        .with_context(|| format!("delete_stack failed for role {}", args.role))?;

    info!("Delete requested for {}", name);
    println!("Deleting stack {}", name);
    Ok(())
}

fn deployer<'a>(ctx: &'a DeployContext, args: &StackArgs) -> StackDeployer<'a> {
    StackDeployer::new(ctx.provisioner(), &ctx.params)
        .with_template_root(&args.template_root)
        .with_retry_policy(ctx.retry_policy())
}
