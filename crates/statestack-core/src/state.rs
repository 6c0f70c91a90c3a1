//! Applied-state snapshot.
//!
//! [`AppliedState`] records the descriptor set as of the last successful
//! converge of each resource. The applier diffs the desired set against it
//! to detect removals, and updates it incrementally as resources converge,
//! so an interrupted run leaves an accurate record of what was actually
//! applied.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use statestack_model::{ResourceId, ResourceSpec};

/// Last-applied descriptor set plus run metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedState {
    /// Last-applied descriptor per resource identity.
    resources: BTreeMap<ResourceId, ResourceSpec>,
    /// Identifier of the last apply run that touched this state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_run_id: Option<String>,
    /// When the last apply run finished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_applied_at: Option<DateTime<Utc>>,
}

impl AppliedState {
    /// Create an empty state (nothing under management yet).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind an existing remote resource into management before the first
    /// convergence.
    ///
    /// An adopted resource whose remote value already matches the desired
    /// descriptor converges as a no-op; adoption never triggers
    /// re-creation.
    pub fn adopt(&mut self, spec: ResourceSpec) {
        self.resources.insert(spec.id(), spec);
    }

    /// The last-applied descriptor for an identity, if any.
    #[must_use]
    pub fn get(&self, id: &ResourceId) -> Option<&ResourceSpec> {
        self.resources.get(id)
    }

    /// Whether an identity is under management.
    #[must_use]
    pub fn contains(&self, id: &ResourceId) -> bool {
        self.resources.contains_key(id)
    }

    /// Managed descriptors in identity order.
    pub fn resources(&self) -> impl Iterator<Item = &ResourceSpec> {
        self.resources.values()
    }

    /// Managed identities in order.
    pub fn resource_ids(&self) -> impl Iterator<Item = &ResourceId> {
        self.resources.keys()
    }

    /// Number of managed resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether nothing is under management.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Record a successful converge of a descriptor.
    pub(crate) fn record(&mut self, spec: ResourceSpec) {
        self.resources.insert(spec.id(), spec);
    }

    /// Drop a deleted resource from management.
    pub(crate) fn forget(&mut self, id: &ResourceId) {
        self.resources.remove(id);
    }

    /// Stamp run metadata after a successful apply.
    pub(crate) fn stamp(&mut self, run_id: Uuid, applied_at: DateTime<Utc>) {
        self.last_run_id = Some(run_id.to_string());
        self.last_applied_at = Some(applied_at);
    }
}

#[cfg(test)]
mod tests {
    use statestack_model::{BucketRole, BucketSpec, ResourceKind, TagMap};

    use super::*;

    fn bucket(name: &str) -> ResourceSpec {
        ResourceSpec::Bucket(BucketSpec {
            name: name.to_owned(),
            role: BucketRole::Primary,
            tags: TagMap::new(),
        })
    }

    #[test]
    fn test_should_track_adopted_resources() {
        let mut state = AppliedState::new();
        assert!(state.is_empty());
        state.adopt(bucket("my-state"));
        let id = ResourceId::new(ResourceKind::Bucket, "my-state");
        assert!(state.contains(&id));
        assert_eq!(state.get(&id), Some(&bucket("my-state")));
    }

    #[test]
    fn test_should_round_trip_through_json() {
        let mut state = AppliedState::new();
        state.adopt(bucket("my-state"));
        state.stamp(Uuid::new_v4(), Utc::now());
        let json = serde_json::to_string(&state).unwrap();
        let back: AppliedState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_should_forget_removed_resources() {
        let mut state = AppliedState::new();
        state.adopt(bucket("my-state"));
        state.forget(&ResourceId::new(ResourceKind::Bucket, "my-state"));
        assert!(state.is_empty());
    }
}
