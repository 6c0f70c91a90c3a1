//! Common identity type definitions shared across descriptors.

use std::fmt;

use crate::error::ModelError;

/// AWS Account ID (12-digit string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Account ID used when no real identity is available (local development).
    pub const DEFAULT: &str = "000000000000";

    /// Create a new account ID from a string.
    ///
    /// # Errors
    /// Returns an error if the account ID is not a 12-digit numeric string.
    pub fn new(id: impl Into<String>) -> Result<Self, ModelError> {
        let id = id.into();
        if id.len() != 12 || !id.chars().all(|c| c.is_ascii_digit()) {
            return Err(ModelError::InvalidAccountId(id));
        }
        Ok(Self(id))
    }

    /// Get the account ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// AWS Region identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct AwsRegion(String);

impl AwsRegion {
    /// Default region.
    pub const DEFAULT: &str = "us-east-1";

    /// Create a new region.
    #[must_use]
    pub fn new(region: impl Into<String>) -> Self {
        Self(region.into())
    }

    /// Get the region as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AwsRegion {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

impl fmt::Display for AwsRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolved caller identity.
///
/// Resolved once per evaluation run and passed by value into every descriptor
/// builder that consumes it for tag or description templating. There is no
/// ambient singleton; callers thread this through explicitly.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallerIdentity {
    /// Account the caller belongs to.
    pub account_id: AccountId,
    /// ARN of the calling principal.
    pub arn: String,
    /// Unique identifier of the calling principal.
    pub user_id: String,
}

impl CallerIdentity {
    /// Build the identity of the given account's root principal.
    #[must_use]
    pub fn root(account_id: AccountId) -> Self {
        let arn = format!("arn:aws:iam::{account_id}:root");
        let user_id = account_id.as_str().to_owned();
        Self {
            account_id,
            arn,
            user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_create_valid_account_id() {
        let id = AccountId::new("123456789012").unwrap();
        assert_eq!(id.as_str(), "123456789012");
    }

    #[test]
    fn test_should_reject_invalid_account_id() {
        assert!(AccountId::new("12345").is_err());
        assert!(AccountId::new("abcdefghijkl").is_err());
        assert!(AccountId::new("1234567890123").is_err());
    }

    #[test]
    fn test_should_use_default_account_id() {
        let id = AccountId::default();
        assert_eq!(id.as_str(), "000000000000");
    }

    #[test]
    fn test_should_build_root_identity() {
        let identity = CallerIdentity::root(AccountId::new("123456789012").unwrap());
        assert_eq!(identity.arn, "arn:aws:iam::123456789012:root");
        assert_eq!(identity.user_id, "123456789012");
    }
}
