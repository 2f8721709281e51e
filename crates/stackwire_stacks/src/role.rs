//! Stack roles.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StackError;

/// Logical purpose of a stack within the deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackRole {
    /// Shared infrastructure: user pool, API, database, buckets.
    Main,
    /// Function code; deployed side by side per color for blue/green rollout.
    Logic,
}

impl StackRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            StackRole::Main => "main",
            StackRole::Logic => "logic",
        }
    }

    pub fn all() -> Vec<Self> {
        vec![StackRole::Main, StackRole::Logic]
    }

    /// Template file, relative to the template root.
    pub fn template_path(&self) -> &'static Path {
        match self {
            StackRole::Main => Path::new("templates/main.yaml"),
            StackRole::Logic => Path::new("templates/logic.yaml"),
        }
    }

    /// Whether the stack name carries the color discriminator.
    pub fn uses_discriminator(&self) -> bool {
        matches!(self, StackRole::Logic)
    }
}

impl FromStr for StackRole {
    type Err = StackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "main" => Ok(StackRole::Main),
            "logic" => Ok(StackRole::Logic),
            other => Err(StackError::InvalidRole(other.to_string())),
        }
    }
}

impl std::fmt::Display for StackRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roles() {
        for role in StackRole::all() {
            assert_eq!(role.as_str().parse::<StackRole>().unwrap(), role);
        }
        assert!(matches!(
            "frontend".parse::<StackRole>(),
            Err(StackError::InvalidRole(r)) if r == "frontend"
        ));
        assert!("Main".parse::<StackRole>().is_err());
    }

    #[test]
    fn test_templates_are_distinct() {
        assert_ne!(StackRole::Main.template_path(), StackRole::Logic.template_path());
    }
}
