//! Stack output aggregation.
//!
//! Collects the outputs of this deployment's stacks into one flat map. Stacks
//! are selected by exact name; an output key declared by two stacks is an
//! error rather than an override.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use stackwire_core::RetryPolicy;
use stackwire_params::ParameterStore;

use crate::error::{StackError, StackResult};
use crate::provisioning::{DeployedStack, ProvisioningApi};
use crate::resolver::{ResolvedStack, StackNameResolver};
use crate::role::StackRole;

pub const REGION_KEY: &str = "region";
pub const IDENTITY_POOL_REGION_KEY: &str = "identityPoolRegion";

const DERIVED_SOURCE: &str = "<derived from region>";

/// Merged outputs of all selected stacks, sorted by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregatedConfig {
    values: BTreeMap<String, String>,
}

impl AggregatedConfig {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Value for `key`, or a configuration error naming it.
    pub fn require(&self, key: &str) -> StackResult<&str> {
        self.get(key)
            .ok_or_else(|| StackError::Config(format!("stack output {} is not available", key)))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.values
    }
}

/// Aggregates stack outputs for a set of roles.
pub struct StackOutputAggregator<'a> {
    api: Arc<dyn ProvisioningApi>,
    resolver: StackNameResolver<'a>,
    retry: RetryPolicy,
}

impl<'a> StackOutputAggregator<'a> {
    pub fn new(api: Arc<dyn ProvisioningApi>, params: &'a ParameterStore) -> Self {
        Self {
            api,
            resolver: StackNameResolver::new(params),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Fetch all deployed stacks with a single describe call.
    pub async fn describe(&self) -> StackResult<Vec<DeployedStack>> {
        let api = &self.api;
        let stacks = self
            .retry
            .run_read("describe stacks", move || api.describe_stacks())
            .await?;
        debug!("Provisioning API reported {} stacks", stacks.len());
        Ok(stacks)
    }

    /// Aggregate the outputs of the stacks behind `roles`.
    pub async fn aggregate(&self, roles: &[StackRole]) -> StackResult<AggregatedConfig> {
        // Resolve first so parameter problems surface without a remote call.
        let selected = self.resolve(roles)?;
        let stacks = self.describe().await?;
        merge_outputs(&stacks, &selected)
    }

    /// Aggregate against an already fetched list of stacks.
    pub fn aggregate_snapshot(
        &self,
        stacks: &[DeployedStack],
        roles: &[StackRole],
    ) -> StackResult<AggregatedConfig> {
        let selected = self.resolve(roles)?;
        merge_outputs(stacks, &selected)
    }

    fn resolve(&self, roles: &[StackRole]) -> StackResult<Vec<ResolvedStack>> {
        if roles.is_empty() {
            return Err(StackError::Config("no stack roles given".to_string()));
        }
        let unique: BTreeSet<StackRole> = roles.iter().copied().collect();
        let unique: Vec<StackRole> = unique.into_iter().collect();
        self.resolver.resolve_all(&unique)
    }
}

fn select<'s>(stacks: &'s [DeployedStack], name: &str) -> StackResult<&'s DeployedStack> {
    let matches: Vec<&DeployedStack> = stacks.iter().filter(|s| s.name == name).collect();
    match matches.as_slice() {
        [stack] => Ok(stack),
        [] => Err(StackError::StackNotFound(name.to_string())),
        many => Err(StackError::AmbiguousStack {
            name: name.to_string(),
            count: many.len(),
        }),
    }
}

fn merge_outputs(
    stacks: &[DeployedStack],
    selected: &[ResolvedStack],
) -> StackResult<AggregatedConfig> {
    // key -> (value, stack that declared it)
    let mut merged: BTreeMap<String, (String, String)> = BTreeMap::new();

    for resolved in selected {
        let stack = select(stacks, &resolved.name)?;
        debug!("Merging {} outputs from {}", stack.outputs.len(), stack.name);

        for output in &stack.outputs {
            match merged.entry(output.key.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert((output.value.clone(), stack.name.clone()));
                }
                Entry::Occupied(existing) => {
                    return Err(StackError::DuplicateOutputKey {
                        key: output.key.clone(),
                        first_stack: existing.get().1.clone(),
                        second_stack: stack.name.clone(),
                    });
                }
            }
        }
    }

    let region = merged
        .get(REGION_KEY)
        .map(|(value, _)| value.clone())
        .ok_or_else(|| {
            StackError::Config(format!(
                "none of the selected stacks declares the {} output",
                REGION_KEY
            ))
        })?;

    match merged.get(IDENTITY_POOL_REGION_KEY) {
        Some((value, _)) if *value == region => {}
        Some((_, source)) => {
            return Err(StackError::DuplicateOutputKey {
                key: IDENTITY_POOL_REGION_KEY.to_string(),
                first_stack: source.clone(),
                second_stack: DERIVED_SOURCE.to_string(),
            });
        }
        None => {
            merged.insert(
                IDENTITY_POOL_REGION_KEY.to_string(),
                (region, DERIVED_SOURCE.to_string()),
            );
        }
    }

    let values: BTreeMap<String, String> = merged
        .into_iter()
        .map(|(key, (value, _))| (key, value))
        .collect();
    info!(
        "Aggregated {} outputs from {} stacks",
        values.len(),
        selected.len()
    );
    Ok(AggregatedConfig { values })
}
