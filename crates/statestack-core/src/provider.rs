//! Provider seam and the in-memory provider.
//!
//! [`ResourceProvider`] is the boundary to the remote control plane: slow,
//! fallible network calls that create, describe and destroy resources.
//! [`MemoryProvider`] implements it entirely in process for tests and local
//! development, with interior mutability via `DashMap` for the resource
//! table and `parking_lot::RwLock` for the failure-injection set.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::debug;

use statestack_model::{AccountId, CallerIdentity, ResourceId, ResourceSpec};

use crate::error::ProviderError;

/// Boundary to the remote control plane.
///
/// Implementations must make `put` idempotent: applying the same descriptor
/// twice is a no-op the second time. The applier additionally avoids calling
/// `put` at all when the remote value already matches.
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    /// Resolve the caller's account context. Called once per run.
    async fn caller_identity(&self) -> Result<CallerIdentity, ProviderError>;

    /// Describe the remote resource, or `None` if it does not exist.
    async fn read(&self, id: &ResourceId) -> Result<Option<ResourceSpec>, ProviderError>;

    /// Create or update the remote resource to match the descriptor.
    async fn put(&self, spec: &ResourceSpec) -> Result<(), ProviderError>;

    /// Destroy the remote resource.
    async fn delete(&self, id: &ResourceId) -> Result<(), ProviderError>;
}

/// In-memory provider backing tests and local development.
pub struct MemoryProvider {
    /// Account this provider resolves identities against.
    account_id: AccountId,
    /// Remote resource table.
    resources: DashMap<ResourceId, ResourceSpec>,
    /// Identities whose mutations fail (for testing).
    failures: RwLock<HashSet<ResourceId>>,
    /// Number of `read` calls served.
    reads: AtomicU64,
    /// Number of mutations (`put` + `delete`) performed.
    mutations: AtomicU64,
}

impl std::fmt::Debug for MemoryProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryProvider")
            .field("account_id", &self.account_id)
            .field("resource_count", &self.resources.len())
            .finish_non_exhaustive()
    }
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::new(AccountId::default())
    }
}

impl MemoryProvider {
    /// Create an empty provider for the given account.
    #[must_use]
    pub fn new(account_id: AccountId) -> Self {
        Self {
            account_id,
            resources: DashMap::new(),
            failures: RwLock::new(HashSet::new()),
            reads: AtomicU64::new(0),
            mutations: AtomicU64::new(0),
        }
    }

    /// Install a pre-existing remote resource without counting a mutation
    /// (models a resource created outside this tool).
    pub fn seed(&self, spec: ResourceSpec) {
        self.resources.insert(spec.id(), spec);
    }

    /// Make every mutation of the given identity fail (for testing).
    pub fn inject_failure(&self, id: ResourceId) {
        self.failures.write().insert(id);
    }

    /// The remote value of a resource, if present.
    #[must_use]
    pub fn get(&self, id: &ResourceId) -> Option<ResourceSpec> {
        self.resources.get(id).map(|r| r.value().clone())
    }

    /// Whether a resource exists remotely.
    #[must_use]
    pub fn contains(&self, id: &ResourceId) -> bool {
        self.resources.contains_key(id)
    }

    /// Number of remote resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether no remote resources exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Number of `read` calls served so far.
    #[must_use]
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Number of mutations (`put` + `delete`) performed so far.
    #[must_use]
    pub fn mutation_count(&self) -> u64 {
        self.mutations.load(Ordering::Relaxed)
    }

    fn check_failure(&self, id: &ResourceId) -> Result<(), ProviderError> {
        if self.failures.read().contains(id) {
            return Err(ProviderError::Rejected {
                resource: id.clone(),
                message: "injected failure".to_owned(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceProvider for MemoryProvider {
    async fn caller_identity(&self) -> Result<CallerIdentity, ProviderError> {
        Ok(CallerIdentity::root(self.account_id.clone()))
    }

    async fn read(&self, id: &ResourceId) -> Result<Option<ResourceSpec>, ProviderError> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        Ok(self.get(id))
    }

    async fn put(&self, spec: &ResourceSpec) -> Result<(), ProviderError> {
        let id = spec.id();
        self.check_failure(&id)?;
        self.mutations.fetch_add(1, Ordering::Relaxed);
        debug!(resource = %id, "resource stored");
        self.resources.insert(id, spec.clone());
        Ok(())
    }

    async fn delete(&self, id: &ResourceId) -> Result<(), ProviderError> {
        self.check_failure(id)?;
        if self.resources.remove(id).is_none() {
            return Err(ProviderError::NotFound(id.clone()));
        }
        self.mutations.fetch_add(1, Ordering::Relaxed);
        debug!(resource = %id, "resource removed");
        Ok(())
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

    #[tokio::test]
    async fn test_should_store_and_read_resources() {
        let provider = MemoryProvider::default();
        let spec = bucket("my-state");
        provider.put(&spec).await.unwrap();
        let read = provider.read(&spec.id()).await.unwrap();
        assert_eq!(read, Some(spec));
        assert_eq!(provider.mutation_count(), 1);
        assert_eq!(provider.read_count(), 1);
    }

    #[tokio::test]
    async fn test_should_fail_delete_of_missing_resource() {
        let provider = MemoryProvider::default();
        let id = ResourceId::new(ResourceKind::Bucket, "missing");
        let err = provider.delete(&id).await.unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(_)));
        assert_eq!(provider.mutation_count(), 0);
    }

    #[tokio::test]
    async fn test_should_not_count_seeded_resources_as_mutations() {
        let provider = MemoryProvider::default();
        provider.seed(bucket("my-state"));
        assert_eq!(provider.mutation_count(), 0);
        assert_eq!(provider.len(), 1);
    }

    #[tokio::test]
    async fn test_should_reject_mutations_of_poisoned_identities() {
        let provider = MemoryProvider::default();
        let spec = bucket("my-state");
        provider.inject_failure(spec.id());
        let err = provider.put(&spec).await.unwrap_err();
        assert!(matches!(err, ProviderError::Rejected { .. }));
        assert!(provider.is_empty());
    }

    #[tokio::test]
    async fn test_should_resolve_root_identity() {
        let provider = MemoryProvider::new(AccountId::new("123456789012").unwrap());
        let identity = provider.caller_identity().await.unwrap();
        assert_eq!(identity.account_id.as_str(), "123456789012");
    }
}
