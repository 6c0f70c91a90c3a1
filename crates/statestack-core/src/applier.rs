//! Dependency-ordered converge of a plan against a provider.
//!
//! One logical evaluation pass per [`Applier::apply`] call: descriptors are
//! visited in topological order; each one is read back from the provider
//! first and only written when the remote value differs, so re-applying an
//! unchanged plan performs no remote mutation. A failing resource halts its
//! transitive dependents but not independent branches; already-converged
//! resources stay as applied.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use statestack_model::{ResourceId, ResourceSpec};

use crate::config::BackendConfig;
use crate::error::{BackendError, BackendResult, ProviderError};
use crate::graph::DependencyGraph;
use crate::plan::BackendPlan;
use crate::provider::ResourceProvider;
use crate::state::AppliedState;

/// What one converge did to a resource.
enum Outcome {
    Created,
    Updated,
    Unchanged,
}

/// Result of a successful apply run.
#[derive(Debug, Clone)]
pub struct ApplyReport {
    /// Identifier of this run.
    pub run_id: Uuid,
    /// When the run finished.
    pub applied_at: DateTime<Utc>,
    /// Resources created remotely.
    pub created: Vec<ResourceId>,
    /// Resources whose remote value was updated.
    pub updated: Vec<ResourceId>,
    /// Resources already matching their descriptor (no remote mutation).
    pub unchanged: Vec<ResourceId>,
    /// Resources deleted after being removed from the plan.
    pub deleted: Vec<ResourceId>,
}

impl ApplyReport {
    fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            applied_at: Utc::now(),
            created: Vec::new(),
            updated: Vec::new(),
            unchanged: Vec::new(),
            deleted: Vec::new(),
        }
    }

    /// Total number of resources the run touched or verified.
    #[must_use]
    pub fn total(&self) -> usize {
        self.created.len() + self.updated.len() + self.unchanged.len() + self.deleted.len()
    }
}

/// Converges descriptor sets against a [`ResourceProvider`].
#[derive(Debug)]
pub struct Applier<P> {
    provider: P,
}

impl<P: ResourceProvider> Applier<P> {
    /// Create an applier over a provider.
    #[must_use]
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Access the underlying provider.
    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Resolve the caller identity, build the plan from `config`, and apply
    /// it.
    ///
    /// # Errors
    /// Fails on identity resolution, configuration validation, or any of the
    /// apply-time errors described on [`Applier::apply`].
    pub async fn bootstrap(
        &self,
        config: &BackendConfig,
        state: &mut AppliedState,
    ) -> BackendResult<ApplyReport> {
        // Malformed configuration must surface before any remote call.
        config.validate()?;
        let identity = self
            .provider
            .caller_identity()
            .await
            .map_err(BackendError::Identity)?;
        let plan = BackendPlan::new(config, &identity)?;
        self.apply(&plan, state).await
    }

    /// Converge the remote resource set to match `plan`, updating `state`
    /// as resources converge.
    ///
    /// Descriptors removed from the plan but still recorded in `state` are
    /// deleted, in reverse dependency order, after the converge pass.
    /// Protected resources are never deleted: their removal is rejected
    /// before any remote call is issued.
    ///
    /// # Errors
    /// - [`BackendError::DependencyCycle`] if descriptor references form a
    ///   cycle (nothing is applied).
    /// - [`BackendError::ProtectedDeletion`] if the plan drops a protected
    ///   resource (nothing is applied).
    /// - [`BackendError::Converge`] if a provider call fails; the error
    ///   names the first failing resource and the dependents that were
    ///   skipped. Resources that converged before the failure remain
    ///   converged and recorded in `state`.
    pub async fn apply(
        &self,
        plan: &BackendPlan,
        state: &mut AppliedState,
    ) -> BackendResult<ApplyReport> {
        let graph = DependencyGraph::build(plan.resources())?;
        let order = graph.topological_order()?;
        let desired: HashMap<ResourceId, &ResourceSpec> = plan
            .resources()
            .iter()
            .map(|spec| (spec.id(), spec))
            .collect();

        // Removal detection happens before any remote call so a protected
        // deletion aborts the run with the remote set untouched.
        let removed: Vec<ResourceSpec> = state
            .resources()
            .filter(|spec| !desired.contains_key(&spec.id()))
            .cloned()
            .collect();
        for spec in &removed {
            if spec.is_protected() {
                return Err(BackendError::ProtectedDeletion {
                    resource: spec.id(),
                });
            }
        }

        let mut report = ApplyReport::new();
        let mut first_failure: Option<(ResourceId, ProviderError)> = None;
        let mut halted: HashSet<ResourceId> = HashSet::new();
        let mut skipped: Vec<ResourceId> = Vec::new();

        for id in &order {
            let spec = desired[id];
            if spec.depends_on().iter().any(|dep| halted.contains(dep)) {
                warn!(resource = %id, "skipped: a dependency failed to converge");
                halted.insert(id.clone());
                skipped.push(id.clone());
                continue;
            }
            match self.converge(spec, state).await {
                Ok(Outcome::Created) => report.created.push(id.clone()),
                Ok(Outcome::Updated) => report.updated.push(id.clone()),
                Ok(Outcome::Unchanged) => report.unchanged.push(id.clone()),
                Err(err) => {
                    warn!(resource = %id, error = %err, "converge failed");
                    halted.insert(id.clone());
                    if first_failure.is_none() {
                        first_failure = Some((id.clone(), err));
                    }
                }
            }
        }

        if let Some((resource, source)) = first_failure {
            return Err(BackendError::Converge {
                resource,
                skipped,
                source,
            });
        }

        self.delete_removed(removed, state, &mut report).await?;

        state.stamp(report.run_id, report.applied_at);
        info!(
            run_id = %report.run_id,
            created = report.created.len(),
            updated = report.updated.len(),
            unchanged = report.unchanged.len(),
            deleted = report.deleted.len(),
            "apply complete"
        );
        Ok(report)
    }

    /// Read-compare-write one descriptor.
    async fn converge(
        &self,
        spec: &ResourceSpec,
        state: &mut AppliedState,
    ) -> Result<Outcome, ProviderError> {
        let id = spec.id();
        let outcome = match self.provider.read(&id).await? {
            Some(remote) if remote == *spec => {
                debug!(resource = %id, "resource unchanged");
                Outcome::Unchanged
            }
            Some(_) => {
                self.provider.put(spec).await?;
                info!(resource = %id, "resource updated");
                Outcome::Updated
            }
            None => {
                self.provider.put(spec).await?;
                info!(resource = %id, "resource created");
                Outcome::Created
            }
        };
        state.record(spec.clone());
        Ok(outcome)
    }

    /// Delete descriptors that left the plan, dependents before their
    /// dependencies.
    async fn delete_removed(
        &self,
        removed: Vec<ResourceSpec>,
        state: &mut AppliedState,
        report: &mut ApplyReport,
    ) -> BackendResult<()> {
        if removed.is_empty() {
            return Ok(());
        }
        let removal_set: HashSet<ResourceId> = removed.iter().map(ResourceSpec::id).collect();
        // References leaving the removal set point at resources that stay
        // managed; only edges inside the set order the deletions.
        let graph = DependencyGraph::from_edges(
            removed
                .iter()
                .map(|spec| {
                    let references = spec
                        .depends_on()
                        .into_iter()
                        .filter(|dep| removal_set.contains(dep))
                        .collect();
                    (spec.id(), references)
                })
                .collect(),
        )?;
        let mut order = graph.topological_order()?;
        order.reverse();

        for id in order {
            if let Err(source) = self.provider.delete(&id).await {
                return Err(BackendError::Converge {
                    resource: id,
                    skipped: Vec::new(),
                    source,
                });
            }
            info!(resource = %id, "resource deleted");
            state.forget(&id);
            report.deleted.push(id);
        }
        Ok(())
    }
}
