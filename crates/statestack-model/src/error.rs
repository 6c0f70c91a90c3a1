//! Error types for descriptor construction and validation.

/// Errors produced while constructing or validating resource descriptors.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Invalid AWS account ID format.
    #[error("invalid AWS account ID: {0} (must be 12-digit numeric string)")]
    InvalidAccountId(String),

    /// Bucket name violates the naming rules.
    #[error("invalid bucket name {name:?}: {reason}")]
    InvalidBucketName {
        /// The rejected name.
        name: String,
        /// Which rule was violated.
        reason: &'static str,
    },

    /// Lock table name violates the naming rules.
    #[error("invalid lock table name {name:?}: {reason}")]
    InvalidTableName {
        /// The rejected name.
        name: String,
        /// Which rule was violated.
        reason: &'static str,
    },

    /// A resource identity string could not be parsed.
    #[error("invalid resource id: {0} (expected <kind>/<name>)")]
    InvalidResourceId(String),
}
