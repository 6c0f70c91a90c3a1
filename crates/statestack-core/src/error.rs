//! Error types for planning and convergence.

use statestack_model::{ModelError, ResourceId};

/// Join resource identities for display in error messages.
fn join_ids(ids: &[ResourceId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors raised by a remote resource provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The resource does not exist remotely.
    #[error("resource {0} not found")]
    NotFound(ResourceId),

    /// The resource exists but conflicts with the requested operation.
    #[error("resource {0} already exists")]
    Conflict(ResourceId),

    /// The control plane rejected the operation.
    #[error("provider rejected {resource}: {message}")]
    Rejected {
        /// The resource the operation targeted.
        resource: ResourceId,
        /// The provider's stated reason.
        message: String,
    },

    /// Internal provider error with context.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Errors raised while planning or applying the backend resource set.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Malformed or missing required configuration, surfaced before any
    /// remote call.
    #[error("configuration error: {0}")]
    Validation(String),

    /// Descriptor-level validation failure.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Caller identity could not be resolved.
    #[error("failed to resolve caller identity")]
    Identity(#[source] ProviderError),

    /// A descriptor references a resource that is not part of the set.
    #[error("{resource} references unknown resource {reference}")]
    UnknownReference {
        /// The referencing descriptor.
        resource: ResourceId,
        /// The missing reference target.
        reference: ResourceId,
    },

    /// The reference edges contain a cycle. Fatal; nothing is applied.
    #[error("dependency cycle among resources: {}", join_ids(.members))]
    DependencyCycle {
        /// Resources participating in (or downstream of) the cycle.
        members: Vec<ResourceId>,
    },

    /// A converge would delete a protected resource; rejected locally
    /// before any remote call is issued.
    #[error("refusing to delete protected resource {resource}")]
    ProtectedDeletion {
        /// The protected resource.
        resource: ResourceId,
    },

    /// A resource failed to converge. Dependent resources were not applied;
    /// already-converged resources remain in their last-applied state.
    #[error(
        "failed to converge {resource} ({} dependent resource(s) skipped, no rollback)",
        .skipped.len()
    )]
    Converge {
        /// The first failing resource.
        resource: ResourceId,
        /// Dependents that were not applied because of the failure.
        skipped: Vec<ResourceId>,
        /// The underlying provider failure.
        #[source]
        source: ProviderError,
    },
}

/// Convenience result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;
