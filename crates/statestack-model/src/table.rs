//! Lock table descriptor.
//!
//! The lock table is the shared-mutation arbitration mechanism for the state
//! artifact stored in the primary bucket. Its attribute schema is fixed: a
//! single string attribute named `LockID` serving as the hash key. This crate
//! only describes the table; the locking protocol itself lives in the engine
//! that consumes it.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::tags::TagMap;
use crate::types::{AccountId, AwsRegion};

/// Name of the single hash-key attribute identifying a lock row.
pub const LOCK_TABLE_HASH_KEY: &str = "LockID";

/// Validate a lock table name: 3-255 characters, `[a-zA-Z0-9._-]+`.
pub fn validate_lock_table_name(name: &str) -> Result<(), ModelError> {
    let invalid = |reason| ModelError::InvalidTableName {
        name: name.to_owned(),
        reason,
    };
    if name.len() < 3 || name.len() > 255 {
        return Err(invalid("must be between 3 and 255 characters long"));
    }
    if !name
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'_' || b == b'-')
    {
        return Err(invalid(
            "may only contain letters, digits, dots, underscores and hyphens",
        ));
    }
    Ok(())
}

/// Scalar attribute type for a key attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarAttributeType {
    /// String.
    S,
    /// Number.
    N,
    /// Binary.
    B,
}

/// Definition of a key attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttributeDefinition {
    /// Name of the attribute.
    pub attribute_name: String,
    /// Scalar type of the attribute.
    pub attribute_type: ScalarAttributeType,
}

/// Stream view type controlling what data is captured in the table stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StreamViewType {
    /// Only the key attributes of the modified item.
    #[serde(rename = "KEYS_ONLY")]
    KeysOnly,
    /// The entire item as it appears after modification.
    #[serde(rename = "NEW_IMAGE")]
    NewImage,
    /// The entire item as it appeared before modification.
    #[serde(rename = "OLD_IMAGE")]
    OldImage,
    /// Both the new and old item images.
    #[serde(rename = "NEW_AND_OLD_IMAGES")]
    NewAndOldImages,
}

impl StreamViewType {
    /// Returns the wire-format string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KeysOnly => "KEYS_ONLY",
            Self::NewImage => "NEW_IMAGE",
            Self::OldImage => "OLD_IMAGE",
            Self::NewAndOldImages => "NEW_AND_OLD_IMAGES",
        }
    }
}

impl std::fmt::Display for StreamViewType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for StreamViewType {
    fn from(s: &str) -> Self {
        match s {
            "KEYS_ONLY" => Self::KeysOnly,
            "NEW_IMAGE" => Self::NewImage,
            "OLD_IMAGE" => Self::OldImage,
            _ => Self::NewAndOldImages,
        }
    }
}

/// Stream configuration for the lock table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StreamSpecification {
    /// Whether the table stream is enabled.
    pub stream_enabled: bool,
    /// What information is written to the stream when an item is modified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_view_type: Option<StreamViewType>,
}

impl StreamSpecification {
    /// Build a stream specification, coercing the view type to `None`
    /// whenever the stream is disabled. A disabled stream never carries a
    /// view type, regardless of caller input.
    #[must_use]
    pub fn new(stream_enabled: bool, stream_view_type: Option<StreamViewType>) -> Self {
        Self {
            stream_enabled,
            stream_view_type: if stream_enabled {
                stream_view_type
            } else {
                None
            },
        }
    }
}

/// Provisioned read and write capacity units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProvisionedThroughput {
    /// The maximum number of strongly consistent reads per second.
    pub read_capacity_units: i64,
    /// The maximum number of writes per second.
    pub write_capacity_units: i64,
}

/// The lock table descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockTableSpec {
    /// Table name.
    pub name: String,
    /// Provisioned capacity.
    pub throughput: ProvisionedThroughput,
    /// Stream configuration.
    pub stream: StreamSpecification,
    /// Tags applied to the table.
    pub tags: TagMap,
}

impl LockTableSpec {
    /// The fixed attribute schema: one string hash key named `LockID`.
    #[must_use]
    pub fn hash_key() -> AttributeDefinition {
        AttributeDefinition {
            attribute_name: LOCK_TABLE_HASH_KEY.to_owned(),
            attribute_type: ScalarAttributeType::S,
        }
    }

    /// ARN of the table in the given region and account.
    #[must_use]
    pub fn arn(&self, region: &AwsRegion, account: &AccountId) -> String {
        format!("arn:aws:dynamodb:{region}:{account}:table/{}", self.name)
    }
}
