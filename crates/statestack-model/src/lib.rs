//! Resource descriptor schemas for the StateStack remote-state backend.
//!
//! This crate defines the declarative desired-state records for the small,
//! fixed set of resources that back an infrastructure-as-code tool's remote
//! state: the primary state bucket, its access-log bucket, their per-bucket
//! settings (versioning, encryption, public-access block, ACL, log delivery,
//! access policy), and the optional key-value lock table. Descriptors are
//! plain data; convergence against a remote control plane lives in
//! `statestack-core`.

pub mod bucket;
pub mod error;
pub mod policy;
pub mod resource;
pub mod table;
pub mod tags;
pub mod types;

pub use bucket::{
    AclSpec, BucketRole, BucketSpec, CannedAcl, EncryptionRule, EncryptionSpec, LoggingSpec,
    PublicAccessBlockConfig, PublicAccessBlockSpec, SseAlgorithm, VersioningSpec,
    VersioningStatus, logs_bucket_name, validate_bucket_name,
};
pub use error::ModelError;
pub use policy::{Effect, PolicyDocument, PolicySpec, PolicyStatement, deny_insecure_transport};
pub use resource::{ResourceId, ResourceKind, ResourceSpec};
pub use table::{
    AttributeDefinition, LockTableSpec, ProvisionedThroughput, ScalarAttributeType,
    StreamSpecification, StreamViewType, validate_lock_table_name,
};
pub use tags::{TagMap, management_tags, merge_tags};
pub use types::{AccountId, AwsRegion, CallerIdentity};
