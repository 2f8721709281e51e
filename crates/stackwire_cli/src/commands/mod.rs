//! CLI command definitions.
//!
//! Each subcommand maps to one deployment action. Subcommand names keep the
//! underscore spelling used by the build scripts that call this tool.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use stackwire_data::SqlParameter;
use stackwire_stacks::StackRole;

pub mod add_dummy_user;
pub mod aws_config;
pub mod query;
pub mod stack;
pub mod upload_functions;

/// stackwire - deployment helper for a CloudFormation-hosted web app
#[derive(Parser)]
#[command(name = "stackwire")]
#[command(version, about = "stackwire - deployment helper for a CloudFormation-hosted web app")]
#[command(long_about = r#"
stackwire derives stack names from a shared parameter file, drives stack
lifecycle calls, and turns deployed stack outputs into front-end config.

ACTIONS:
  create_stack          → Create the stack for a role from its template
  update_stack          → Update the stack for a role from its template
  delete_stack          → Delete the stack for a role
  generate_aws_config   → Write aws_config.js from the outputs of the given roles
  describe_stack_config → Write stacks.json with every deployed stack
  upload_functions      → Zip and upload function sources, record the build id
  add_dummy_user        → Create a confirmed test user in the user pool
  query                 → Run a read-only statement against the data backend

EXIT CODES:
  0 - Success
  1 - Error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every action. Flags win over the settings file.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Settings file (optional)
    #[arg(long, global = true, default_value = "stackwire.yaml")]
    pub config: PathBuf,

    /// AWS region
    #[arg(long, global = true, env = "STACKWIRE_REGION")]
    pub region: Option<String>,

    /// Parameter file ([{ParameterKey, ParameterValue}])
    #[arg(long, global = true, env = "STACKWIRE_PARAMETERS")]
    pub parameters: Option<PathBuf>,

    /// Directory generated artifacts are written to
    #[arg(long, global = true, env = "STACKWIRE_OUTPATH")]
    pub outpath: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the stack for a role
    #[command(name = "create_stack")]
    CreateStack(StackArgs),

    /// Update the stack for a role
    #[command(name = "update_stack")]
    UpdateStack(StackArgs),

    /// Delete the stack for a role
    #[command(name = "delete_stack")]
    DeleteStack(StackArgs),

    /// Generate aws_config.js from stack outputs
    #[command(name = "generate_aws_config")]
    GenerateAwsConfig(RoleSelection),

    /// Write a snapshot of all deployed stacks
    #[command(name = "describe_stack_config")]
    DescribeStackConfig,

    /// Package and upload function sources
    #[command(name = "upload_functions")]
    UploadFunctions(upload_functions::UploadFunctionsArgs),

    /// Create a confirmed test user
    #[command(name = "add_dummy_user")]
    AddDummyUser(add_dummy_user::AddDummyUserArgs),

    /// Run a read-only SQL statement
    Query(query::QueryArgs),
}

/// A single stack role.
#[derive(Args, Debug, Clone)]
pub struct StackArgs {
    /// Stack role (main or logic)
    #[arg(long, value_parser = parse_role, default_value = "main")]
    pub role: StackRole,

    /// Directory the role templates are looked up in
    #[arg(long, default_value = ".")]
    pub template_root: PathBuf,
}

/// One or more stack roles whose outputs are merged.
#[derive(Args, Debug, Clone)]
pub struct RoleSelection {
    /// Stack roles (main, logic); may be repeated
    #[arg(long = "role", value_parser = parse_role, num_args = 1.., default_value = "main")]
    pub roles: Vec<StackRole>,
}

fn parse_role(value: &str) -> Result<StackRole, String> {
    value.parse().map_err(|e: stackwire_stacks::StackError| e.to_string())
}

/// Parse `NAME:TYPE=VALUE` (or `NAME=VALUE` for strings).
pub(crate) fn parse_sql_parameter(value: &str) -> Result<SqlParameter, String> {
    let (head, raw) = value
        .split_once('=')
        .ok_or_else(|| format!("expected NAME[:TYPE]=VALUE, got {:?}", value))?;
    let (name, param_type) = head.split_once(':').unwrap_or((head, "string"));
    if name.is_empty() {
        return Err(format!("missing parameter name in {:?}", value));
    }
    SqlParameter::typed(name, raw, param_type).map_err(|e| e.to_string())
}
