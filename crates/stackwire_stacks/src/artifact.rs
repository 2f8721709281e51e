//! Generated artifacts: the front-end config module and the stack snapshot.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::aggregator::AggregatedConfig;
use crate::error::StackResult;
use crate::provisioning::DeployedStack;

pub const AWS_CONFIG_FILE: &str = "aws_config.js";
pub const STACKS_FILE: &str = "stacks.json";

#[derive(Serialize)]
struct StackDescription<'a> {
    #[serde(rename = "Stacks")]
    stacks: &'a [DeployedStack],
}

/// Render the front-end config module.
///
/// The shape is fixed for downstream builds: the assignment, a newline and
/// the export, with no trailing newline.
pub fn render_aws_config(config: &AggregatedConfig) -> StackResult<String> {
    let json = serde_json::to_string_pretty(config)?;
    Ok(format!("const aws_config={}\nexport default aws_config", json))
}

/// Write `aws_config.js` into `outpath`, creating the directory if needed.
pub fn write_aws_config(outpath: &Path, config: &AggregatedConfig) -> StackResult<PathBuf> {
    let content = render_aws_config(config)?;
    let path = write_atomically(outpath, AWS_CONFIG_FILE, &content)?;
    info!("Wrote {} config values to {:?}", config.len(), path);
    Ok(path)
}

/// Write the describe-stacks snapshot as `stacks.json` into `outpath`.
pub fn write_stack_description(outpath: &Path, stacks: &[DeployedStack]) -> StackResult<PathBuf> {
    let content = serde_json::to_string_pretty(&StackDescription { stacks })?;
    let path = write_atomically(outpath, STACKS_FILE, &content)?;
    info!("Wrote description of {} stacks to {:?}", stacks.len(), path);
    Ok(path)
}

fn write_atomically(dir: &Path, file_name: &str, content: &str) -> StackResult<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    let staging = dir.join(format!(".{}.tmp", file_name));
    fs::write(&staging, content)?;
    fs::rename(&staging, &path)?;
    Ok(path)
}
