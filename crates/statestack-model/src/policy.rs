//! Access policy document model.
//!
//! Documents serialize to the provider's policy JSON wire format
//! (PascalCase keys, `Version: 2012-10-17`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Policy language version understood by the provider.
pub const POLICY_VERSION: &str = "2012-10-17";

/// Condition context key that is true only when the request arrives over an
/// encrypted transport channel.
pub const SECURE_TRANSPORT_CONDITION_KEY: &str = "aws:SecureTransport";

/// Action glob covering every object-storage operation.
pub const ALL_S3_ACTIONS: &str = "s3:*";

/// Statement effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    /// Grant the listed actions.
    Allow,
    /// Deny the listed actions.
    Deny,
}

/// A single policy statement.
///
/// Conditions are a two-level map: operator (e.g. `Bool`) to context key
/// (e.g. `aws:SecureTransport`) to expected value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    /// Statement identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    /// Allow or Deny.
    pub effect: Effect,
    /// Principal the statement applies to (`"*"` for any).
    pub principal: String,
    /// Actions the statement covers.
    pub action: Vec<String>,
    /// Resources the statement covers.
    pub resource: Vec<String>,
    /// Conditions gating the statement.
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub condition: BTreeMap<String, BTreeMap<String, String>>,
}

/// An ordered list of statements under one policy version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    /// Policy language version.
    pub version: String,
    /// The statements, in order.
    pub statement: Vec<PolicyStatement>,
}

impl PolicyDocument {
    /// Render the document as policy JSON.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Build the access policy attached to the primary bucket: deny every
/// object-storage action on the bucket's objects, for any principal, when the
/// request is not made over secure transport.
///
/// This is intentionally the only enforced statement. A second statement
/// rejecting uploads that do not use the selected server-side encryption
/// algorithm was drafted upstream but never enabled (the algorithm name and
/// the provider's condition key never lined up), so it must not be emitted.
#[must_use]
pub fn deny_insecure_transport(bucket_arn: &str) -> PolicyDocument {
    let mut condition = BTreeMap::new();
    condition.insert(
        "Bool".to_owned(),
        BTreeMap::from([(
            SECURE_TRANSPORT_CONDITION_KEY.to_owned(),
            "false".to_owned(),
        )]),
    );
    PolicyDocument {
        version: POLICY_VERSION.to_owned(),
        statement: vec![PolicyStatement {
            sid: Some("DenyInsecureTransport".to_owned()),
            effect: Effect::Deny,
            principal: "*".to_owned(),
            action: vec![ALL_S3_ACTIONS.to_owned()],
            resource: vec![format!("{bucket_arn}/*")],
            condition,
        }],
    }
}

/// Policy attachment for a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicySpec {
    /// Owning bucket.
    pub bucket: String,
    /// The policy document to attach.
    pub document: PolicyDocument,
}
