//! Backend configuration surface.
//!
//! [`BackendConfig`] is the caller-supplied configuration for the whole
//! resource set. Values can also be loaded from environment variables via
//! [`BackendConfig::from_env`].

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use statestack_model::{
    AwsRegion, StreamViewType, TagMap, validate_bucket_name, validate_lock_table_name,
};

use crate::error::{BackendError, BackendResult};

/// Parse a boolean environment value (`"1"` or case-insensitive `"true"`).
fn env_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

/// Configuration for the remote-state backend resource set.
///
/// Only the primary bucket name is required; everything else has a default.
///
/// # Examples
///
/// ```
/// use statestack_core::BackendConfig;
///
/// let config = BackendConfig::builder().bucket("my-state").build();
/// assert!(config.lock_table_enabled);
/// assert_eq!(config.lock_table_name, "terraform-state-lock");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfig {
    /// Name of the primary state bucket. Required; also determines the logs
    /// bucket name (`<bucket>-logs`).
    #[builder(setter(into))]
    pub bucket: String,

    /// Region the lock table lives in (buckets are region-agnostic here).
    #[builder(default)]
    pub region: AwsRegion,

    /// Whether the lock table is provisioned at all. When false, no lock
    /// table descriptor exists; "feature disabled" and "table absent" are
    /// the same state.
    #[builder(default = true)]
    pub lock_table_enabled: bool,

    /// Name of the lock table.
    #[builder(default = String::from("terraform-state-lock"), setter(into))]
    pub lock_table_name: String,

    /// Provisioned read capacity units for the lock table.
    #[builder(default = 1)]
    pub lock_table_read_capacity: i64,

    /// Provisioned write capacity units for the lock table.
    #[builder(default = 1)]
    pub lock_table_write_capacity: i64,

    /// Whether the lock table's stream is enabled.
    #[builder(default = false)]
    pub lock_table_stream_enabled: bool,

    /// Stream view type; ignored (and coerced away) when the stream is
    /// disabled.
    #[builder(default)]
    pub lock_table_stream_view_type: Option<StreamViewType>,

    /// KMS key for bucket default encryption. Empty selects `AES256`.
    #[builder(default, setter(into))]
    pub kms_key_id: String,

    /// Caller-supplied base tags, merged under the fixed management tags.
    #[builder(default)]
    pub tags: TagMap,
}

impl BackendConfig {
    /// Load configuration from environment variables.
    ///
    /// Recognized variables: `BACKEND_BUCKET` (required), `DEFAULT_REGION`,
    /// `LOCK_TABLE_ENABLED`, `LOCK_TABLE_NAME`, `LOCK_TABLE_READ_CAPACITY`,
    /// `LOCK_TABLE_WRITE_CAPACITY`, `LOCK_TABLE_STREAM_ENABLED`,
    /// `LOCK_TABLE_STREAM_VIEW_TYPE`, `KMS_KEY_ID`.
    ///
    /// # Errors
    /// Returns a validation error if `BACKEND_BUCKET` is unset.
    pub fn from_env() -> BackendResult<Self> {
        let bucket = std::env::var("BACKEND_BUCKET")
            .map_err(|_| BackendError::Validation("BACKEND_BUCKET is not set".to_owned()))?;
        let mut config = Self::builder().bucket(bucket).build();

        if let Ok(v) = std::env::var("DEFAULT_REGION") {
            config.region = AwsRegion::new(v);
        }
        if let Ok(v) = std::env::var("LOCK_TABLE_ENABLED") {
            config.lock_table_enabled = env_bool(&v);
        }
        if let Ok(v) = std::env::var("LOCK_TABLE_NAME") {
            config.lock_table_name = v;
        }
        if let Ok(v) = std::env::var("LOCK_TABLE_READ_CAPACITY") {
            if let Ok(n) = v.parse() {
                config.lock_table_read_capacity = n;
            }
        }
        if let Ok(v) = std::env::var("LOCK_TABLE_WRITE_CAPACITY") {
            if let Ok(n) = v.parse() {
                config.lock_table_write_capacity = n;
            }
        }
        if let Ok(v) = std::env::var("LOCK_TABLE_STREAM_ENABLED") {
            config.lock_table_stream_enabled = env_bool(&v);
        }
        if let Ok(v) = std::env::var("LOCK_TABLE_STREAM_VIEW_TYPE") {
            config.lock_table_stream_view_type = if v.is_empty() {
                None
            } else {
                Some(StreamViewType::from(v.as_str()))
            };
        }
        if let Ok(v) = std::env::var("KMS_KEY_ID") {
            config.kms_key_id = v;
        }

        Ok(config)
    }

    /// Validate the configuration. Called before any remote interaction.
    ///
    /// # Errors
    /// Returns an error for an invalid bucket name, an invalid lock table
    /// name, or non-positive lock table capacity units (when the lock table
    /// is enabled).
    pub fn validate(&self) -> BackendResult<()> {
        validate_bucket_name(&self.bucket)?;
        if self.lock_table_enabled {
            validate_lock_table_name(&self.lock_table_name)?;
            if self.lock_table_read_capacity < 1 || self.lock_table_write_capacity < 1 {
                return Err(BackendError::Validation(format!(
                    "lock table capacity units must be at least 1 \
                     (read: {}, write: {})",
                    self.lock_table_read_capacity, self.lock_table_write_capacity
                )));
            }
        }
        Ok(())
    }
}
