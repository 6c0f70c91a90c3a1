//! Unified resource descriptor with stable identities and reference edges.
//!
//! Every descriptor the planner emits is wrapped in a [`ResourceSpec`] so the
//! dependency evaluator and the applier can treat the whole set uniformly:
//! each spec has a stable [`ResourceId`], an explicit `depends_on` list, and
//! a protection flag for resources that must never be destroyed by a
//! converge.

use serde::{Deserialize, Serialize};

use crate::bucket::{
    AclSpec, BucketSpec, EncryptionSpec, LoggingSpec, PublicAccessBlockSpec, VersioningSpec,
};
use crate::policy::PolicySpec;
use crate::table::LockTableSpec;

/// Kind of a managed resource.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ResourceKind {
    /// A storage bucket.
    #[serde(rename = "bucket")]
    Bucket,
    /// A bucket's versioning setting.
    #[serde(rename = "bucket-versioning")]
    BucketVersioning,
    /// A bucket's default encryption rule.
    #[serde(rename = "bucket-encryption")]
    BucketEncryption,
    /// A bucket's public-access block.
    #[serde(rename = "bucket-public-access-block")]
    BucketPublicAccessBlock,
    /// A bucket's canned ACL.
    #[serde(rename = "bucket-acl")]
    BucketAcl,
    /// A bucket's log-delivery wiring.
    #[serde(rename = "bucket-logging")]
    BucketLogging,
    /// A bucket's attached access policy.
    #[serde(rename = "bucket-policy")]
    BucketPolicy,
    /// The lock table.
    #[serde(rename = "lock-table")]
    LockTable,
}

impl ResourceKind {
    /// Returns the string value of this enum variant.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bucket => "bucket",
            Self::BucketVersioning => "bucket-versioning",
            Self::BucketEncryption => "bucket-encryption",
            Self::BucketPublicAccessBlock => "bucket-public-access-block",
            Self::BucketAcl => "bucket-acl",
            Self::BucketLogging => "bucket-logging",
            Self::BucketPolicy => "bucket-policy",
            Self::LockTable => "lock-table",
        }
    }

    /// Parse a kind from its string value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "bucket" => Some(Self::Bucket),
            "bucket-versioning" => Some(Self::BucketVersioning),
            "bucket-encryption" => Some(Self::BucketEncryption),
            "bucket-public-access-block" => Some(Self::BucketPublicAccessBlock),
            "bucket-acl" => Some(Self::BucketAcl),
            "bucket-logging" => Some(Self::BucketLogging),
            "bucket-policy" => Some(Self::BucketPolicy),
            "lock-table" => Some(Self::LockTable),
            _ => None,
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable identity of a managed resource: kind plus owning name.
///
/// Sub-setting descriptors share their owning bucket's name, so the kind is
/// part of the identity. Serializes as the string `<kind>/<name>` so it can
/// key JSON maps in state snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId {
    /// Kind of the resource.
    pub kind: ResourceKind,
    /// Name of the resource (bucket or table name).
    pub name: String,
}

impl ResourceId {
    /// Create a resource identity.
    #[must_use]
    pub fn new(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.kind, self.name)
    }
}

impl std::str::FromStr for ResourceId {
    type Err = crate::error::ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || crate::error::ModelError::InvalidResourceId(s.to_owned());
        let (kind, name) = s.split_once('/').ok_or_else(invalid)?;
        let kind = ResourceKind::parse(kind).ok_or_else(invalid)?;
        if name.is_empty() {
            return Err(invalid());
        }
        Ok(Self::new(kind, name))
    }
}

impl Serialize for ResourceId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ResourceId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A declarative record of desired resource configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceSpec {
    /// A storage bucket.
    Bucket(BucketSpec),
    /// A bucket's versioning setting.
    Versioning(VersioningSpec),
    /// A bucket's default encryption rule.
    Encryption(EncryptionSpec),
    /// A bucket's public-access block.
    PublicAccessBlock(PublicAccessBlockSpec),
    /// A bucket's canned ACL.
    Acl(AclSpec),
    /// A bucket's log-delivery wiring.
    Logging(LoggingSpec),
    /// A bucket's attached access policy.
    Policy(PolicySpec),
    /// The lock table.
    LockTable(LockTableSpec),
}

impl ResourceSpec {
    /// The stable identity of this descriptor.
    #[must_use]
    pub fn id(&self) -> ResourceId {
        match self {
            Self::Bucket(spec) => ResourceId::new(ResourceKind::Bucket, &spec.name),
            Self::Versioning(spec) => ResourceId::new(ResourceKind::BucketVersioning, &spec.bucket),
            Self::Encryption(spec) => ResourceId::new(ResourceKind::BucketEncryption, &spec.bucket),
            Self::PublicAccessBlock(spec) => {
                ResourceId::new(ResourceKind::BucketPublicAccessBlock, &spec.bucket)
            }
            Self::Acl(spec) => ResourceId::new(ResourceKind::BucketAcl, &spec.bucket),
            Self::Logging(spec) => ResourceId::new(ResourceKind::BucketLogging, &spec.bucket),
            Self::Policy(spec) => ResourceId::new(ResourceKind::BucketPolicy, &spec.bucket),
            Self::LockTable(spec) => ResourceId::new(ResourceKind::LockTable, &spec.name),
        }
    }

    /// Identities of the resources this descriptor references.
    ///
    /// Every referenced resource must converge before this one; the
    /// dependency evaluator turns these edges into the application order.
    #[must_use]
    pub fn depends_on(&self) -> Vec<ResourceId> {
        let owner = |bucket: &str| ResourceId::new(ResourceKind::Bucket, bucket);
        match self {
            Self::Bucket(_) | Self::LockTable(_) => Vec::new(),
            Self::Versioning(spec) => vec![owner(&spec.bucket)],
            Self::Encryption(spec) => vec![owner(&spec.bucket)],
            Self::PublicAccessBlock(spec) => vec![owner(&spec.bucket)],
            Self::Acl(spec) => vec![owner(&spec.bucket)],
            Self::Policy(spec) => vec![owner(&spec.bucket)],
            Self::Logging(spec) => vec![owner(&spec.bucket), owner(&spec.target_bucket)],
        }
    }

    /// Whether a converge is allowed to destroy this resource.
    ///
    /// Buckets and the lock table hold state that must persist indefinitely;
    /// a converge that would delete one is rejected before any remote call.
    #[must_use]
    pub fn is_protected(&self) -> bool {
        matches!(self, Self::Bucket(_) | Self::LockTable(_))
    }
}
