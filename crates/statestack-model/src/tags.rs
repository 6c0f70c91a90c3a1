//! Tagging helpers applied to every managed resource.

use std::collections::BTreeMap;

/// Tag map applied to a resource. `BTreeMap` keeps iteration deterministic.
pub type TagMap = BTreeMap<String, String>;

/// Tag key carrying a human-readable description of the resource's purpose.
pub const TAG_DESCRIPTION: &str = "Description";

/// Tag key marking the resource as managed by Terraform.
pub const TAG_MANAGED_BY: &str = "ManagedByTerraform";

/// Tag key naming the module that owns the resource.
pub const TAG_MODULE: &str = "TerraformModule";

/// Value stamped under [`TAG_MODULE`].
pub const MODULE_NAME: &str = "statestack";

/// Merge caller-supplied tags with the fixed management tags.
///
/// Every key in `fixed` overwrites the same key in `base`; all other `base`
/// keys pass through unchanged. Pure and deterministic.
#[must_use]
pub fn merge_tags(base: &TagMap, fixed: &TagMap) -> TagMap {
    let mut merged = base.clone();
    for (key, value) in fixed {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Fixed management tags stamped on every resource this module owns.
///
/// `description` is templated by the caller (typically with the resolved
/// account ID) before being passed in.
#[must_use]
pub fn management_tags(description: impl Into<String>) -> TagMap {
    let mut tags = TagMap::new();
    tags.insert(TAG_DESCRIPTION.to_owned(), description.into());
    tags.insert(TAG_MANAGED_BY.to_owned(), "true".to_owned());
    tags.insert(TAG_MODULE.to_owned(), MODULE_NAME.to_owned());
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> TagMap {
        let mut tags = TagMap::new();
        tags.insert("Team".to_owned(), "platform".to_owned());
        tags.insert(TAG_MODULE.to_owned(), "something-else".to_owned());
        tags
    }

    #[test]
    fn test_should_let_fixed_keys_override_base() {
        let merged = merge_tags(&base(), &management_tags("state storage"));
        assert_eq!(merged.get(TAG_MODULE).map(String::as_str), Some(MODULE_NAME));
    }

    #[test]
    fn test_should_pass_through_unrelated_base_keys() {
        let merged = merge_tags(&base(), &management_tags("state storage"));
        assert_eq!(merged.get("Team").map(String::as_str), Some("platform"));
    }

    #[test]
    fn test_should_contain_every_fixed_key() {
        let fixed = management_tags("state storage");
        let merged = merge_tags(&base(), &fixed);
        for (key, value) in &fixed {
            assert_eq!(merged.get(key), Some(value), "fixed key {key} must win");
        }
    }

    #[test]
    fn test_should_merge_into_empty_base() {
        let merged = merge_tags(&TagMap::new(), &management_tags("logs"));
        assert_eq!(merged.get(TAG_MANAGED_BY).map(String::as_str), Some("true"));
        assert_eq!(merged.get(TAG_DESCRIPTION).map(String::as_str), Some("logs"));
    }
}
