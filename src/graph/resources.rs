// Copyright (c) 2025 - Cowboy AI, Inc.
//! Typed Resource Specifications
//!
//! One struct per emitted resource kind. These are declarative: they say
//! what must exist, and the external provisioning engine reconciles them
//! against live infrastructure. Cross-references between resources are by
//! resource name, with ordering constraints carried separately as graph
//! edges.

use crate::config::{OptionSpec, Parameter, ServerlessScaling};
use crate::domain::{CidrBlock, Engine, SecurityGroupId, SubnetId, VpcId};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Sentinel instance class for serverless cluster members
pub const SERVERLESS_INSTANCE_CLASS: &str = "db.serverless";

/// Tag set carried by every emitted resource
pub type Tags = BTreeMap<String, String>;

/// Merge caller tags with the mandatory `Name` tag
pub fn tags_with_name(base: &Tags, name: &str) -> Tags {
    let mut tags = base.clone();
    tags.insert("Name".to_string(), name.to_string());
    tags
}

/// Network grouping resource (subnet group)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubnetGroupSpec {
    pub name: String,
    pub description: String,
    pub subnet_ids: Vec<SubnetId>,
    pub tags: Tags,
}

/// A single ingress rule on the access-control resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IngressRule {
    /// One rule listing every allowed CIDR range
    Cidr {
        port: u16,
        cidr_blocks: Vec<CidrBlock>,
        description: String,
    },
    /// One rule per allowed peer security group
    PeerGroup {
        port: u16,
        source_security_group_id: SecurityGroupId,
        description: String,
    },
}

/// A single egress rule on the access-control resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EgressRule {
    /// All protocols, all ports, all destinations
    AllowAll { description: String },
}

/// Access-control resource (security group) with child rules
///
/// Always carries exactly one egress-allow-all rule; ingress rules use the
/// effective port for both bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityGroupSpec {
    pub name: String,
    pub description: String,
    pub vpc_id: VpcId,
    pub ingress: Vec<IngressRule>,
    /// Exactly one allow-all entry on every group
    pub egress: Vec<EgressRule>,
    pub tags: Tags,
}

/// Enhanced-monitoring role (identity/access support resource)
///
/// Materialized only when the enhanced-monitoring interval is non-zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonitoringRoleSpec {
    pub name: String,
    /// Service principal allowed to assume the role
    pub assume_role_service: String,
    /// Managed policy granting the monitoring permissions
    pub managed_policy: String,
    pub tags: Tags,
}

/// Parameter-group resource (instance-level or cluster-level)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterGroupSpec {
    pub name: String,
    pub family: String,
    pub description: String,
    pub parameters: Vec<Parameter>,
    pub tags: Tags,
}

/// Option-group resource (standalone mysql/mariadb only)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionGroupSpec {
    pub name: String,
    pub engine: Engine,
    /// Leading `MAJOR.MINOR` of the configured engine version
    pub major_engine_version: String,
    pub options: Vec<OptionSpec>,
    pub tags: Tags,
}

/// Credentials wiring for the primary resource
///
/// When `manage_master_password` is set the external engine requests the
/// credential from the secret store; the resolver never generates one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialsSpec {
    pub master_username: String,
    pub manage_master_password: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master_password: Option<String>,
}

/// Storage block for the standalone primary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceStorageSpec {
    pub allocated_storage_gb: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_allocated_storage_gb: Option<u32>,
    pub storage_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iops: Option<u32>,
    /// gp3 only; derivation clears it for every other storage type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throughput_mibs: Option<u32>,
    pub encrypted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kms_key_id: Option<String>,
}

/// Backup block shared by the primary and cluster resources
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupSpec {
    pub retention_days: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_window: Option<String>,
    pub skip_final_snapshot: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_snapshot_name: Option<String>,
    pub deletion_protection: bool,
    pub copy_tags_to_snapshot: bool,
}

/// Monitoring block shared by instance-shaped resources
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceMonitoringSpec {
    pub enhanced_monitoring_interval_seconds: u32,
    /// Name of the monitoring role; present only when the interval is > 0
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitoring_role: Option<String>,
    pub performance_insights_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_insights_retention_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_insights_kms_key_id: Option<String>,
}

/// Primary database resource (standalone mode)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DbInstanceSpec {
    pub identifier: String,
    pub engine: Engine,
    pub engine_version: String,
    pub instance_class: String,
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_name: Option<String>,
    pub credentials: CredentialsSpec,
    pub storage: InstanceStorageSpec,
    pub multi_az: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
    pub publicly_accessible: bool,
    pub subnet_group: String,
    pub security_group: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter_group_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_group_name: Option<String>,
    pub backup: BackupSpec,
    pub monitoring: InstanceMonitoringSpec,
    pub cloudwatch_log_exports: BTreeSet<String>,
    pub iam_auth_enabled: bool,
    pub auto_minor_version_upgrade: bool,
    pub apply_immediately: bool,
    pub tags: Tags,
}

/// Read replica resource (standalone mode only)
///
/// Replicas are disposable: they always skip the final snapshot, whatever
/// the primary's backup policy says.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadReplicaSpec {
    pub identifier: String,
    /// Key this replica was configured under; outputs are keyed by it
    pub replica_key: String,
    /// Identifier of the primary this replica streams from
    pub source_identifier: String,
    pub instance_class: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
    pub publicly_accessible: bool,
    pub skip_final_snapshot: bool,
    pub security_group: String,
    pub tags: Tags,
}

/// Cluster control resource (cluster mode)
///
/// Clusters manage their own distributed storage; no allocated-storage
/// sizing fields appear here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DbClusterSpec {
    pub identifier: String,
    pub engine: Engine,
    pub engine_version: String,
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_name: Option<String>,
    pub credentials: CredentialsSpec,
    pub storage_encrypted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kms_key_id: Option<String>,
    pub subnet_group: String,
    pub security_group: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_parameter_group_name: Option<String>,
    pub backup: BackupSpec,
    pub cloudwatch_log_exports: BTreeSet<String>,
    pub iam_auth_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serverless_scaling: Option<ServerlessScaling>,
    pub apply_immediately: bool,
    pub tags: Tags,
}

/// Cluster member resource, numbered `1..=instance_count`
///
/// Members own no storage or backup settings (cluster-owned). The external
/// engine elects the writer; by its convention that is the first member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterMemberSpec {
    pub identifier: String,
    /// 1-based member index
    pub index: u32,
    /// Identifier of the owning cluster resource
    pub cluster_identifier: String,
    pub engine: Engine,
    /// Forced to `db.serverless` when the cluster scales serverlessly
    pub instance_class: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter_group_name: Option<String>,
    pub monitoring: InstanceMonitoringSpec,
    pub auto_minor_version_upgrade: bool,
    pub apply_immediately: bool,
    pub tags: Tags,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_with_name_merges() {
        let mut base = Tags::new();
        base.insert("team".to_string(), "data".to_string());

        let tags = tags_with_name(&base, "my-db-sg");
        assert_eq!(tags.get("team").map(String::as_str), Some("data"));
        assert_eq!(tags.get("Name").map(String::as_str), Some("my-db-sg"));
    }

    #[test]
    fn test_tags_with_name_overrides_caller_name() {
        let mut base = Tags::new();
        base.insert("Name".to_string(), "caller-supplied".to_string());

        let tags = tags_with_name(&base, "derived");
        assert_eq!(tags.get("Name").map(String::as_str), Some("derived"));
    }

    #[test]
    fn test_ingress_rule_serialization_is_tagged() {
        let rule = IngressRule::PeerGroup {
            port: 5432,
            source_security_group_id: SecurityGroupId::new("sg-0badcafe").unwrap(),
            description: "app tier".to_string(),
        };
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["kind"], "peer_group");
        assert_eq!(json["port"], 5432);
    }

    #[test]
    fn test_egress_rule_serialization_is_tagged() {
        let rule = EgressRule::AllowAll {
            description: "all outbound".to_string(),
        };
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["kind"], "allow_all");
    }
}
