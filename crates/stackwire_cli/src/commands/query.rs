//! query command - run a read-only statement against the data backend.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use stackwire_data::{DataApiClient, SqlParameter};
use stackwire_stacks::StackOutputAggregator;

use super::{parse_sql_parameter, GlobalArgs, RoleSelection};
use crate::aws::rds_data::{RdsDataClient, CLUSTER_ARN_KEY, DATABASE_KEY, SECRET_ARN_KEY};
use crate::context::DeployContext;

#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// SQL statement
    pub sql: String,

    #[command(flatten)]
    pub selection: RoleSelection,

    /// Statement parameter as NAME[:TYPE]=VALUE (TYPE: string, int, long, bool)
    #[arg(long = "param", value_parser = parse_sql_parameter)]
    pub params: Vec<SqlParameter>,

    /// Only print these columns
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<String>,
}

pub async fn execute(global: &GlobalArgs, args: &QueryArgs) -> Result<()> {
    let ctx = DeployContext::load(global).await?;

    let config = StackOutputAggregator::new(ctx.provisioner(), &ctx.params)
        .with_retry_policy(ctx.retry_policy())
        .aggregate(&args.selection.roles)
        .await
        .context("failed to aggregate stack outputs")?;

    let api = RdsDataClient::new(
        ctx.sdk_config(),
        config.require(CLUSTER_ARN_KEY)?,
        config.require(SECRET_ARN_KEY)?,
        config.require(DATABASE_KEY)?,
    );
    let client = DataApiClient::new(Arc::new(api)).with_retry_policy(ctx.retry_policy());

    let selected: Option<HashSet<String>> = if args.columns.is_empty() {
        None
    } else {
        Some(args.columns.iter().cloned().collect())
    };

    let records = client
        .query(&args.sql, &args.params, selected.as_ref())
        .await
        .context("query failed")?;

    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}
