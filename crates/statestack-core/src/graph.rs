//! Dependency graph over resource descriptors.
//!
//! Reference expressions between descriptors (a logging target naming its
//! log bucket, a setting naming its owning bucket) become explicit edges
//! here. Nothing in the domain guarantees acyclicity structurally, so the
//! evaluator always checks, even though the shipped descriptor set is
//! acyclic by construction.

use std::collections::HashMap;

use statestack_model::{ResourceId, ResourceSpec};

use crate::error::{BackendError, BackendResult};

/// A directed graph of resource references with deterministic ordering.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    /// Node identities in insertion order.
    nodes: Vec<ResourceId>,
    /// Identity to node index.
    index: HashMap<ResourceId, usize>,
    /// Per node, the indices of its dependencies (references out).
    dependencies: Vec<Vec<usize>>,
    /// Per node, the indices of its dependents (references in).
    dependents: Vec<Vec<usize>>,
}

impl DependencyGraph {
    /// Build the graph from a descriptor set using each descriptor's
    /// declared references.
    ///
    /// # Errors
    /// Returns an error on duplicate identities or references to resources
    /// outside the set.
    pub fn build(resources: &[ResourceSpec]) -> BackendResult<Self> {
        Self::from_edges(
            resources
                .iter()
                .map(|spec| (spec.id(), spec.depends_on()))
                .collect(),
        )
    }

    /// Build the graph from explicit `(node, references)` pairs.
    ///
    /// # Errors
    /// Returns an error on duplicate identities or references to resources
    /// outside the set.
    pub fn from_edges(pairs: Vec<(ResourceId, Vec<ResourceId>)>) -> BackendResult<Self> {
        let mut nodes = Vec::with_capacity(pairs.len());
        let mut index = HashMap::with_capacity(pairs.len());
        for (id, _) in &pairs {
            if index.insert(id.clone(), nodes.len()).is_some() {
                return Err(BackendError::Validation(format!(
                    "duplicate resource descriptor {id}"
                )));
            }
            nodes.push(id.clone());
        }

        let mut dependencies = vec![Vec::new(); nodes.len()];
        let mut dependents = vec![Vec::new(); nodes.len()];
        for (node, (_, references)) in pairs.iter().enumerate() {
            for reference in references {
                let Some(&target) = index.get(reference) else {
                    return Err(BackendError::UnknownReference {
                        resource: nodes[node].clone(),
                        reference: reference.clone(),
                    });
                };
                dependencies[node].push(target);
                dependents[target].push(node);
            }
        }

        Ok(Self {
            nodes,
            index,
            dependencies,
            dependents,
        })
    }

    /// Produce an application order: every node appears after all nodes it
    /// references and before any node that references it.
    ///
    /// Ties are broken by insertion order, so the result is deterministic
    /// for a given descriptor set.
    ///
    /// # Errors
    /// Returns [`BackendError::DependencyCycle`] if the references contain a
    /// cycle; the error names every node left unordered.
    pub fn topological_order(&self) -> BackendResult<Vec<ResourceId>> {
        let mut remaining: Vec<usize> = self.dependencies.iter().map(Vec::len).collect();
        let mut ready: Vec<usize> = (0..self.nodes.len())
            .filter(|&n| remaining[n] == 0)
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        let mut next = 0;
        while next < ready.len() {
            let node = ready[next];
            next += 1;
            order.push(self.nodes[node].clone());
            for &dependent in &self.dependents[node] {
                remaining[dependent] -= 1;
                if remaining[dependent] == 0 {
                    ready.push(dependent);
                }
            }
        }

        if order.len() < self.nodes.len() {
            let members = (0..self.nodes.len())
                .filter(|&n| remaining[n] > 0)
                .map(|n| self.nodes[n].clone())
                .collect();
            return Err(BackendError::DependencyCycle { members });
        }
        Ok(order)
    }

    /// All transitive dependents of a node, in breadth-first order.
    ///
    /// Used to report which resources were skipped when a node fails.
    #[must_use]
    pub fn transitive_dependents(&self, id: &ResourceId) -> Vec<ResourceId> {
        let Some(&start) = self.index.get(id) else {
            return Vec::new();
        };
        let mut seen = vec![false; self.nodes.len()];
        let mut queue = vec![start];
        let mut result = Vec::new();
        let mut next = 0;
        while next < queue.len() {
            let node = queue[next];
            next += 1;
            for &dependent in &self.dependents[node] {
                if !seen[dependent] {
                    seen[dependent] = true;
                    queue.push(dependent);
                    result.push(self.nodes[dependent].clone());
                }
            }
        }
        result
    }

    /// Whether the graph contains the given identity.
    #[must_use]
    pub fn contains(&self, id: &ResourceId) -> bool {
        self.index.contains_key(id)
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use statestack_model::{AccountId, CallerIdentity, ResourceKind};

    use crate::config::BackendConfig;
    use crate::plan::BackendPlan;

    use super::*;

    fn id(kind: ResourceKind, name: &str) -> ResourceId {
        ResourceId::new(kind, name)
    }

    fn backend_order() -> Vec<ResourceId> {
        let config = BackendConfig::builder().bucket("my-state").build();
        let identity = CallerIdentity::root(AccountId::default());
        let plan = BackendPlan::new(&config, &identity).unwrap();
        DependencyGraph::build(plan.resources())
            .unwrap()
            .topological_order()
            .unwrap()
    }

    fn position(order: &[ResourceId], target: &ResourceId) -> usize {
        order.iter().position(|i| i == target).unwrap()
    }

    #[test]
    fn test_should_order_buckets_before_their_settings() {
        let order = backend_order();
        let bucket = position(&order, &id(ResourceKind::Bucket, "my-state"));
        for kind in [
            ResourceKind::BucketVersioning,
            ResourceKind::BucketEncryption,
            ResourceKind::BucketPublicAccessBlock,
            ResourceKind::BucketAcl,
            ResourceKind::BucketPolicy,
        ] {
            assert!(bucket < position(&order, &id(kind, "my-state")));
        }
    }

    #[test]
    fn test_should_order_logs_bucket_before_logging_target() {
        let order = backend_order();
        let logs = position(&order, &id(ResourceKind::Bucket, "my-state-logs"));
        let logging = position(&order, &id(ResourceKind::BucketLogging, "my-state"));
        assert!(logs < logging, "log target must converge after its bucket");
    }

    #[test]
    fn test_should_detect_cycles() {
        let a = id(ResourceKind::Bucket, "a");
        let b = id(ResourceKind::Bucket, "b");
        let graph = DependencyGraph::from_edges(vec![
            (a.clone(), vec![b.clone()]),
            (b.clone(), vec![a.clone()]),
        ])
        .unwrap();
        let err = graph.topological_order().unwrap_err();
        assert!(matches!(err, BackendError::DependencyCycle { members } if members.len() == 2));
    }

    #[test]
    fn test_should_reject_unknown_references() {
        let err = DependencyGraph::from_edges(vec![(
            id(ResourceKind::BucketVersioning, "x"),
            vec![id(ResourceKind::Bucket, "x")],
        )])
        .unwrap_err();
        assert!(matches!(err, BackendError::UnknownReference { .. }));
    }

    #[test]
    fn test_should_reject_duplicate_descriptors() {
        let a = id(ResourceKind::Bucket, "a");
        let err =
            DependencyGraph::from_edges(vec![(a.clone(), vec![]), (a.clone(), vec![])])
                .unwrap_err();
        assert!(matches!(err, BackendError::Validation(_)));
    }

    #[test]
    fn test_should_collect_transitive_dependents() {
        let bucket = id(ResourceKind::Bucket, "b");
        let versioning = id(ResourceKind::BucketVersioning, "b");
        let graph = DependencyGraph::from_edges(vec![
            (bucket.clone(), vec![]),
            (versioning.clone(), vec![bucket.clone()]),
        ])
        .unwrap();
        assert_eq!(graph.transitive_dependents(&bucket), vec![versioning]);
    }
}
