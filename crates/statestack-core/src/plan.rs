//! Plan construction: configuration plus caller identity in, descriptor set
//! out.
//!
//! The plan is the full desired-state description of the backend: the
//! optional lock table, the logs bucket with its settings, and the primary
//! bucket with its settings, log-delivery wiring and access policy. Builders
//! here are pure; nothing talks to a provider.

use tracing::debug;

use statestack_model::bucket::LOG_DELIVERY_PREFIX;
use statestack_model::{
    AclSpec, BucketRole, BucketSpec, CallerIdentity, CannedAcl, EncryptionRule, EncryptionSpec,
    LockTableSpec, LoggingSpec, PolicySpec, ProvisionedThroughput, PublicAccessBlockConfig,
    PublicAccessBlockSpec, ResourceSpec, StreamSpecification, VersioningSpec, VersioningStatus,
    deny_insecure_transport, logs_bucket_name, management_tags, merge_tags,
};

use crate::config::BackendConfig;
use crate::error::BackendResult;

/// The desired descriptor set for one backend environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendPlan {
    resources: Vec<ResourceSpec>,
}

impl BackendPlan {
    /// Build the full descriptor set from validated configuration and the
    /// resolved caller identity.
    ///
    /// # Errors
    /// Returns a validation error if the configuration is malformed; no
    /// remote interaction happens here.
    pub fn new(config: &BackendConfig, identity: &CallerIdentity) -> BackendResult<Self> {
        config.validate()?;

        let mut resources = lock_table_resources(config, identity);
        let logs_name = logs_bucket_name(&config.bucket);
        resources.extend(bucket_resources(&logs_name, BucketRole::Logs, config, identity));
        resources.extend(bucket_resources(
            &config.bucket,
            BucketRole::Primary,
            config,
            identity,
        ));

        debug!(resources = resources.len(), "backend plan built");
        Ok(Self { resources })
    }

    /// The descriptors in build order.
    #[must_use]
    pub fn resources(&self) -> &[ResourceSpec] {
        &self.resources
    }

    /// Consume the plan, yielding its descriptors.
    #[must_use]
    pub fn into_resources(self) -> Vec<ResourceSpec> {
        self.resources
    }

    /// Number of descriptors in the plan.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether the plan is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Zero-or-one lock table descriptors, gated on the enabled flag.
///
/// A disabled lock table emits nothing at all, never a descriptor carrying a
/// "disabled" state.
fn lock_table_resources(config: &BackendConfig, identity: &CallerIdentity) -> Vec<ResourceSpec> {
    if !config.lock_table_enabled {
        return Vec::new();
    }
    let description = format!(
        "Terraform state locking for account {}",
        identity.account_id
    );
    vec![ResourceSpec::LockTable(LockTableSpec {
        name: config.lock_table_name.clone(),
        throughput: ProvisionedThroughput {
            read_capacity_units: config.lock_table_read_capacity,
            write_capacity_units: config.lock_table_write_capacity,
        },
        stream: StreamSpecification::new(
            config.lock_table_stream_enabled,
            config.lock_table_stream_view_type,
        ),
        tags: merge_tags(&config.tags, &management_tags(description)),
    })]
}

/// The bucket descriptor and its setting descriptors for one role.
fn bucket_resources(
    name: &str,
    role: BucketRole,
    config: &BackendConfig,
    identity: &CallerIdentity,
) -> Vec<ResourceSpec> {
    let description = match role {
        BucketRole::Primary => format!(
            "Terraform remote state for account {}",
            identity.account_id
        ),
        BucketRole::Logs => format!("Access logs for bucket {}", config.bucket),
    };
    let bucket = BucketSpec {
        name: name.to_owned(),
        role,
        tags: merge_tags(&config.tags, &management_tags(description)),
    };
    let arn = bucket.arn();

    let mut resources = vec![
        ResourceSpec::Bucket(bucket),
        ResourceSpec::Versioning(VersioningSpec {
            bucket: name.to_owned(),
            status: match role {
                BucketRole::Primary => VersioningStatus::Enabled,
                BucketRole::Logs => VersioningStatus::Disabled,
            },
        }),
        ResourceSpec::Encryption(EncryptionSpec {
            bucket: name.to_owned(),
            rule: EncryptionRule::for_key(&config.kms_key_id),
        }),
        ResourceSpec::PublicAccessBlock(PublicAccessBlockSpec {
            bucket: name.to_owned(),
            config: PublicAccessBlockConfig::locked_down(),
        }),
        ResourceSpec::Acl(AclSpec {
            bucket: name.to_owned(),
            acl: match role {
                BucketRole::Primary => CannedAcl::Private,
                BucketRole::Logs => CannedAcl::LogDeliveryWrite,
            },
        }),
    ];

    if role == BucketRole::Primary {
        resources.push(ResourceSpec::Logging(LoggingSpec {
            bucket: name.to_owned(),
            target_bucket: logs_bucket_name(name),
            target_prefix: LOG_DELIVERY_PREFIX.to_owned(),
        }));
        resources.push(ResourceSpec::Policy(PolicySpec {
            bucket: name.to_owned(),
            document: deny_insecure_transport(&arn),
        }));
    }

    resources
}

#[cfg(test)]
mod tests {
    use statestack_model::{
        AccountId, Effect, ResourceId, ResourceKind, SseAlgorithm, StreamViewType, TagMap,
    };

    use super::*;

    fn identity() -> CallerIdentity {
        CallerIdentity::root(AccountId::new("123456789012").unwrap())
    }

    fn plan(config: &BackendConfig) -> BackendPlan {
        BackendPlan::new(config, &identity()).unwrap()
    }

    fn find_spec<'a>(plan: &'a BackendPlan, kind: ResourceKind, name: &str) -> &'a ResourceSpec {
        plan.resources()
            .iter()
            .find(|r| r.id() == ResourceId::new(kind, name))
            .unwrap_or_else(|| panic!("missing {kind}/{name}"))
    }

    #[test]
    fn test_should_emit_full_resource_set() {
        let config = BackendConfig::builder().bucket("my-state").build();
        let plan = plan(&config);
        // 1 lock table + 5 logs-bucket descriptors + 7 primary descriptors.
        assert_eq!(plan.len(), 13);
    }

    #[test]
    fn test_should_emit_no_lock_table_when_disabled() {
        let config = BackendConfig::builder()
            .bucket("my-state")
            .lock_table_enabled(false)
            .lock_table_stream_enabled(true)
            .lock_table_stream_view_type(Some(StreamViewType::KeysOnly))
            .build();
        let plan = plan(&config);
        assert_eq!(plan.len(), 12);
        assert!(
            plan.resources()
                .iter()
                .all(|r| r.id().kind != ResourceKind::LockTable)
        );
    }

    #[test]
    fn test_should_coerce_stream_view_type_when_stream_disabled() {
        let config = BackendConfig::builder()
            .bucket("my-state")
            .lock_table_stream_enabled(false)
            .lock_table_stream_view_type(Some(StreamViewType::NewAndOldImages))
            .build();
        let plan = plan(&config);
        let ResourceSpec::LockTable(table) =
            find_spec(&plan, ResourceKind::LockTable, "terraform-state-lock")
        else {
            panic!("expected lock table");
        };
        assert!(!table.stream.stream_enabled);
        assert!(table.stream.stream_view_type.is_none());
    }

    #[test]
    fn test_should_derive_logs_bucket_name_from_primary() {
        let config = BackendConfig::builder().bucket("my-state").build();
        let plan = plan(&config);
        find_spec(&plan, ResourceKind::Bucket, "my-state-logs");
        let ResourceSpec::Logging(logging) =
            find_spec(&plan, ResourceKind::BucketLogging, "my-state")
        else {
            panic!("expected logging spec");
        };
        assert_eq!(logging.target_bucket, "my-state-logs");
        assert_eq!(logging.target_prefix, "log/");
    }

    #[test]
    fn test_should_select_encryption_per_bucket_for_empty_key() {
        let config = BackendConfig::builder().bucket("my-state").build();
        let plan = plan(&config);
        for bucket in ["my-state", "my-state-logs"] {
            let ResourceSpec::Encryption(spec) =
                find_spec(&plan, ResourceKind::BucketEncryption, bucket)
            else {
                panic!("expected encryption spec");
            };
            assert_eq!(spec.rule.sse_algorithm, SseAlgorithm::Aes256);
            assert!(spec.rule.kms_master_key_id.is_none());
        }
    }

    #[test]
    fn test_should_select_kms_encryption_per_bucket_for_supplied_key() {
        let config = BackendConfig::builder()
            .bucket("my-state")
            .kms_key_id("alias/state")
            .build();
        let plan = plan(&config);
        for bucket in ["my-state", "my-state-logs"] {
            let ResourceSpec::Encryption(spec) =
                find_spec(&plan, ResourceKind::BucketEncryption, bucket)
            else {
                panic!("expected encryption spec");
            };
            assert_eq!(spec.rule.sse_algorithm, SseAlgorithm::AwsKms);
            assert_eq!(spec.rule.kms_master_key_id.as_deref(), Some("alias/state"));
        }
    }

    #[test]
    fn test_should_apply_role_specific_settings() {
        let config = BackendConfig::builder().bucket("my-state").build();
        let plan = plan(&config);

        let ResourceSpec::Versioning(primary) =
            find_spec(&plan, ResourceKind::BucketVersioning, "my-state")
        else {
            panic!("expected versioning spec");
        };
        assert_eq!(primary.status, VersioningStatus::Enabled);

        let ResourceSpec::Versioning(logs) =
            find_spec(&plan, ResourceKind::BucketVersioning, "my-state-logs")
        else {
            panic!("expected versioning spec");
        };
        assert_eq!(logs.status, VersioningStatus::Disabled);

        let ResourceSpec::Acl(acl) = find_spec(&plan, ResourceKind::BucketAcl, "my-state-logs")
        else {
            panic!("expected acl spec");
        };
        assert_eq!(acl.acl, CannedAcl::LogDeliveryWrite);
    }

    #[test]
    fn test_should_merge_management_tags_over_caller_tags() {
        let mut tags = TagMap::new();
        tags.insert("Team".to_owned(), "platform".to_owned());
        tags.insert("ManagedByTerraform".to_owned(), "false".to_owned());
        let config = BackendConfig::builder().bucket("my-state").tags(tags).build();
        let plan = plan(&config);
        let ResourceSpec::Bucket(bucket) = find_spec(&plan, ResourceKind::Bucket, "my-state")
        else {
            panic!("expected bucket spec");
        };
        assert_eq!(
            bucket.tags.get("ManagedByTerraform").map(String::as_str),
            Some("true")
        );
        assert_eq!(bucket.tags.get("Team").map(String::as_str), Some("platform"));
        assert!(
            bucket
                .tags
                .get("Description")
                .is_some_and(|d| d.contains("123456789012"))
        );
    }

    #[test]
    fn test_should_attach_deny_policy_to_primary_only() {
        let config = BackendConfig::builder().bucket("my-state").build();
        let plan = plan(&config);
        let ResourceSpec::Policy(policy) = find_spec(&plan, ResourceKind::BucketPolicy, "my-state")
        else {
            panic!("expected policy spec");
        };
        assert_eq!(policy.document.statement.len(), 1);
        assert_eq!(policy.document.statement[0].effect, Effect::Deny);
        assert!(
            plan.resources()
                .iter()
                .all(|r| r.id() != ResourceId::new(ResourceKind::BucketPolicy, "my-state-logs"))
        );
        assert!(
            plan.resources()
                .iter()
                .all(|r| r.id() != ResourceId::new(ResourceKind::BucketLogging, "my-state-logs"))
        );
    }

    #[test]
    fn test_should_reject_invalid_configuration() {
        let config = BackendConfig::builder().bucket("BAD").build();
        assert!(BackendPlan::new(&config, &identity()).is_err());
    }
}
