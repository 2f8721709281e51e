//! Stack name resolution.
//!
//! Stack names are built as `{AppName}-{Environment}[-{Color}]-{role}`. Only
//! the logic role reads `Color`, so several colored logic stacks can run next
//! to a single main stack.

use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use stackwire_params::ParameterStore;

use crate::error::{StackError, StackResult};
use crate::role::StackRole;

pub const APP_NAME_KEY: &str = "AppName";
pub const ENVIRONMENT_KEY: &str = "Environment";
pub const COLOR_KEY: &str = "Color";

/// Names accepted by the provisioning API.
fn stack_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9-]{0,127}$").expect("valid regex"))
}

/// A role resolved against the deployment parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedStack {
    pub role: StackRole,
    pub name: String,
    pub template_path: PathBuf,
}

/// Resolves stack roles to fully-qualified stack names.
pub struct StackNameResolver<'a> {
    params: &'a ParameterStore,
}

impl<'a> StackNameResolver<'a> {
    pub fn new(params: &'a ParameterStore) -> Self {
        Self { params }
    }

    /// Resolve a role to its stack name and template.
    pub fn resolve(&self, role: StackRole) -> StackResult<ResolvedStack> {
        let mut segments = vec![
            self.required(APP_NAME_KEY, role)?,
            self.required(ENVIRONMENT_KEY, role)?,
        ];
        if role.uses_discriminator() {
            segments.push(self.required(COLOR_KEY, role)?);
        }
        segments.push(role.as_str());

        let name = segments.join("-");
        if !stack_name_pattern().is_match(&name) {
            return Err(StackError::Config(format!(
                "parameters produce an invalid stack name for the {} role: {:?}",
                role, name
            )));
        }

        debug!("Resolved {} stack to {}", role, name);
        Ok(ResolvedStack {
            role,
            name,
            template_path: role.template_path().to_path_buf(),
        })
    }

    /// Resolve a role given by name.
    pub fn resolve_str(&self, role: &str) -> StackResult<ResolvedStack> {
        self.resolve(role.parse()?)
    }

    /// Resolve several roles, keeping their order.
    pub fn resolve_all(&self, roles: &[StackRole]) -> StackResult<Vec<ResolvedStack>> {
        roles.iter().map(|role| self.resolve(*role)).collect()
    }

    fn required(&self, key: &str, role: StackRole) -> StackResult<&'a str> {
        match self.params.get_opt(key) {
            Some(value) if !value.trim().is_empty() => Ok(value),
            Some(_) => Err(StackError::Config(format!(
                "parameter {} is empty (required by the {} stack)",
                key, role
            ))),
            None => Err(StackError::Config(format!(
                "missing parameter {} (required by the {} stack)",
                key, role
            ))),
        }
    }
}
