//! Storage bucket descriptor and its per-bucket setting descriptors.
//!
//! A [`BucketSpec`] describes the bucket itself (name, role, tags); the
//! settings that attach to a bucket — versioning, default encryption,
//! public-access block, canned ACL, log delivery — are separate descriptors
//! that reference their owning bucket by name. They converge in place and
//! are never recreated independently of the bucket they attach to.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::tags::TagMap;

/// Suffix appended to the primary bucket name to derive the logs bucket name.
pub const LOGS_BUCKET_SUFFIX: &str = "-logs";

/// Key prefix under which access logs are delivered.
pub const LOG_DELIVERY_PREFIX: &str = "log/";

/// Derive the access-log bucket name from the primary bucket name.
#[must_use]
pub fn logs_bucket_name(primary: &str) -> String {
    format!("{primary}{LOGS_BUCKET_SUFFIX}")
}

/// Validate a bucket name: 3-63 characters, lowercase letters, digits,
/// hyphens and dots, starting and ending with a letter or digit.
pub fn validate_bucket_name(name: &str) -> Result<(), ModelError> {
    let invalid = |reason| ModelError::InvalidBucketName {
        name: name.to_owned(),
        reason,
    };
    if name.len() < 3 || name.len() > 63 {
        return Err(invalid("must be between 3 and 63 characters long"));
    }
    if !name
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'.')
    {
        return Err(invalid(
            "may only contain lowercase letters, digits, hyphens and dots",
        ));
    }
    let first = name.as_bytes()[0];
    let last = name.as_bytes()[name.len() - 1];
    if !first.is_ascii_alphanumeric() || !last.is_ascii_alphanumeric() {
        return Err(invalid("must start and end with a letter or digit"));
    }
    Ok(())
}

/// Role a bucket plays in the backend resource set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BucketRole {
    /// Holds the state files themselves.
    #[serde(rename = "primary")]
    Primary,
    /// Receives the primary bucket's access logs.
    #[serde(rename = "logs")]
    Logs,
}

impl BucketRole {
    /// Returns the string value of this enum variant.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Logs => "logs",
        }
    }
}

impl std::fmt::Display for BucketRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bucket versioning status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VersioningStatus {
    /// Object versioning is off.
    #[default]
    Disabled,
    /// Object versioning is on.
    Enabled,
}

/// Canned ACL applied to a bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CannedAcl {
    /// Owner-only access.
    #[default]
    #[serde(rename = "private")]
    Private,
    /// Grants the log-delivery group write access; used on the logs bucket.
    #[serde(rename = "log-delivery-write")]
    LogDeliveryWrite,
}

impl CannedAcl {
    /// Returns the string value of this enum variant.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::LogDeliveryWrite => "log-delivery-write",
        }
    }
}

impl std::fmt::Display for CannedAcl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for CannedAcl {
    fn from(s: &str) -> Self {
        match s {
            "log-delivery-write" => Self::LogDeliveryWrite,
            _ => Self::default(),
        }
    }
}

/// Server-side encryption algorithm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SseAlgorithm {
    /// S3-managed keys.
    #[default]
    #[serde(rename = "AES256")]
    Aes256,
    /// KMS-managed key.
    #[serde(rename = "aws:kms")]
    AwsKms,
}

impl SseAlgorithm {
    /// Returns the string value of this enum variant.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aes256 => "AES256",
            Self::AwsKms => "aws:kms",
        }
    }
}

impl std::fmt::Display for SseAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default server-side encryption rule for a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptionRule {
    /// The encryption algorithm.
    pub sse_algorithm: SseAlgorithm,
    /// KMS master key ID; present iff the algorithm is `aws:kms`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kms_master_key_id: Option<String>,
}

impl EncryptionRule {
    /// Select the encryption rule for a bucket from a caller-supplied KMS
    /// key ID. An empty key ID selects `AES256` with no key reference;
    /// anything else selects `aws:kms` referencing the supplied key.
    #[must_use]
    pub fn for_key(kms_key_id: &str) -> Self {
        if kms_key_id.is_empty() {
            Self {
                sse_algorithm: SseAlgorithm::Aes256,
                kms_master_key_id: None,
            }
        } else {
            Self {
                sse_algorithm: SseAlgorithm::AwsKms,
                kms_master_key_id: Some(kms_key_id.to_owned()),
            }
        }
    }
}

/// Public access block configuration for a bucket.
///
/// AWS defines exactly four boolean fields for this configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct PublicAccessBlockConfig {
    /// Whether public ACLs are blocked for this bucket.
    pub block_public_acls: bool,
    /// Whether public ACLs are ignored for this bucket.
    pub ignore_public_acls: bool,
    /// Whether public bucket policies are blocked.
    pub block_public_policy: bool,
    /// Whether public bucket policies are restricted.
    pub restrict_public_buckets: bool,
}

impl PublicAccessBlockConfig {
    /// All four flags enabled. Both backend buckets always use this.
    #[must_use]
    pub fn locked_down() -> Self {
        Self {
            block_public_acls: true,
            ignore_public_acls: true,
            block_public_policy: true,
            restrict_public_buckets: true,
        }
    }
}

/// The bucket itself: name, role and tags.
///
/// The name is the bucket's identity key and is immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketSpec {
    /// Globally unique, externally assigned bucket name.
    pub name: String,
    /// The role this bucket plays.
    pub role: BucketRole,
    /// Tags applied to the bucket.
    pub tags: TagMap,
}

impl BucketSpec {
    /// ARN of the bucket itself.
    #[must_use]
    pub fn arn(&self) -> String {
        format!("arn:aws:s3:::{}", self.name)
    }
}

/// Per-bucket object-versioning toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersioningSpec {
    /// Owning bucket.
    pub bucket: String,
    /// Desired versioning status.
    pub status: VersioningStatus,
}

/// Per-bucket default server-side encryption rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptionSpec {
    /// Owning bucket.
    pub bucket: String,
    /// The default encryption rule.
    pub rule: EncryptionRule,
}

/// Per-bucket public-access denial flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicAccessBlockSpec {
    /// Owning bucket.
    pub bucket: String,
    /// The four denial flags.
    pub config: PublicAccessBlockConfig,
}

/// Per-bucket canned ACL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AclSpec {
    /// Owning bucket.
    pub bucket: String,
    /// The canned ACL to apply.
    pub acl: CannedAcl,
}

/// Log-delivery wiring from a source bucket to a target bucket.
///
/// One-directional: the target must never itself log back to the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingSpec {
    /// Source bucket whose access is logged.
    pub bucket: String,
    /// Bucket receiving the log objects.
    pub target_bucket: String,
    /// Key prefix for delivered log objects.
    pub target_prefix: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_derive_logs_bucket_name() {
        assert_eq!(logs_bucket_name("my-state"), "my-state-logs");
        assert_eq!(logs_bucket_name("a.b"), "a.b-logs");
    }

    #[test]
    fn test_should_accept_valid_bucket_names() {
        assert!(validate_bucket_name("my-state-bucket").is_ok());
        assert!(validate_bucket_name("abc").is_ok());
        assert!(validate_bucket_name("a.b-c123").is_ok());
    }

    #[test]
    fn test_should_reject_invalid_bucket_names() {
        assert!(validate_bucket_name("").is_err());
        assert!(validate_bucket_name("ab").is_err());
        assert!(validate_bucket_name("UPPER").is_err());
        assert!(validate_bucket_name("-leading").is_err());
        assert!(validate_bucket_name("trailing-").is_err());
        assert!(validate_bucket_name(&"x".repeat(64)).is_err());
    }

    #[test]
    fn test_should_select_aes256_for_empty_key() {
        let rule = EncryptionRule::for_key("");
        assert_eq!(rule.sse_algorithm, SseAlgorithm::Aes256);
        assert!(rule.kms_master_key_id.is_none());
    }

    #[test]
    fn test_should_select_kms_for_nonempty_key() {
        let rule = EncryptionRule::for_key("alias/state");
        assert_eq!(rule.sse_algorithm, SseAlgorithm::AwsKms);
        assert_eq!(rule.kms_master_key_id.as_deref(), Some("alias/state"));
    }

    #[test]
    fn test_should_render_bucket_arn() {
        let spec = BucketSpec {
            name: "my-state".to_owned(),
            role: BucketRole::Primary,
            tags: TagMap::new(),
        };
        assert_eq!(spec.arn(), "arn:aws:s3:::my-state");
    }

    #[test]
    fn test_should_lock_down_all_public_access_flags() {
        let config = PublicAccessBlockConfig::locked_down();
        assert!(config.block_public_acls);
        assert!(config.ignore_public_acls);
        assert!(config.block_public_policy);
        assert!(config.restrict_public_buckets);
    }

    #[test]
    fn test_should_serialize_canned_acl_values() {
        assert_eq!(CannedAcl::Private.as_str(), "private");
        assert_eq!(CannedAcl::LogDeliveryWrite.as_str(), "log-delivery-write");
        assert_eq!(CannedAcl::from("log-delivery-write"), CannedAcl::LogDeliveryWrite);
        assert_eq!(CannedAcl::from("unknown"), CannedAcl::Private);
    }
}
