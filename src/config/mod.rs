// Copyright (c) 2025 - Cowboy AI, Inc.
//! Deployment Configuration Model
//!
//! The raw configuration document supplied by the operator, as a serde tree.
//! Pattern-constrained fields stay as plain strings here so the validator
//! can report every violation in one pass; the engine and other closed sets
//! are typed at the serde boundary.

pub mod effective;
pub mod validate;

pub use effective::EffectiveConfiguration;
pub use validate::{validate, ValidatedInputs, ValidationError, Violation};

use crate::domain::Engine;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

fn default_true() -> bool {
    true
}

fn default_master_username() -> String {
    "admin".to_string()
}

fn default_allocated_storage() -> u32 {
    20
}

fn default_backup_retention() -> u32 {
    7
}

fn default_instance_count() -> u32 {
    1
}

/// Complete deployment configuration
///
/// Immutable input to a resolution pass. Supplied once, never mutated
/// mid-pass; the resolver recomputes everything from it on every pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Configuration {
    /// Deployment identifier, seeds every emitted resource name
    pub identifier: String,

    /// Database engine; `aurora-*` selects cluster mode
    pub engine: Engine,

    /// Engine version string (engine-specific, free form)
    pub engine_version: String,

    /// Instance class (`db.` prefixed)
    pub instance_class: String,

    /// Network placement and access control
    pub network: NetworkConfig,

    /// Credentials and logical database settings
    #[serde(default)]
    pub database: DatabaseAccessConfig,

    /// Storage settings (standalone mode only; ignored for clusters)
    #[serde(default)]
    pub storage: StorageConfig,

    /// Multi-AZ / availability-zone placement
    #[serde(default)]
    pub high_availability: HighAvailabilityConfig,

    /// Cluster sizing and serverless scaling (cluster mode only)
    #[serde(default)]
    pub cluster_options: ClusterOptions,

    /// Backup and snapshot policy
    #[serde(default)]
    pub backup: BackupConfig,

    /// Performance Insights, enhanced monitoring, log exports
    #[serde(default)]
    pub monitoring: MonitoringConfig,

    /// Parameter-group family and parameters
    #[serde(default)]
    pub parameter_group: ParameterGroupConfig,

    /// Option group (standalone mysql/mariadb only)
    #[serde(default)]
    pub option_group: OptionGroupConfig,

    /// Read replicas keyed by replica name suffix (standalone mode only)
    #[serde(default)]
    pub read_replicas: BTreeMap<String, ReadReplicaConfig>,

    /// IAM database authentication
    #[serde(default)]
    pub iam_auth_enabled: bool,

    /// Automatic minor version upgrades
    #[serde(default = "default_true")]
    pub auto_minor_version_upgrade: bool,

    /// Apply modifications immediately instead of in the maintenance window
    #[serde(default)]
    pub apply_immediately: bool,

    /// Caller-supplied tags, merged onto every emitted resource
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// Network placement and access-control inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkConfig {
    /// VPC the deployment lives in (`vpc-<hex>`)
    pub vpc_id: String,

    /// Subnets for the network grouping resource (at least two)
    pub subnet_ids: Vec<String>,

    /// Whether the endpoint is publicly reachable
    #[serde(default)]
    pub publicly_accessible: bool,

    /// CIDR ranges allowed to connect (one ingress rule listing all)
    #[serde(default)]
    pub allowed_cidr_blocks: Vec<String>,

    /// Peer security groups allowed to connect (one ingress rule each)
    #[serde(default)]
    pub allowed_security_group_ids: Vec<String>,
}

/// Credentials and logical database settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseAccessConfig {
    /// Initial database name (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Master username
    #[serde(default = "default_master_username")]
    pub master_username: String,

    /// Master password; ignored when the secret store manages it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_password: Option<String>,

    /// Delegate master-password generation and storage to the secret store
    #[serde(default = "default_true")]
    pub manage_master_password: bool,

    /// Listener port; defaulted per engine when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

impl Default for DatabaseAccessConfig {
    fn default() -> Self {
        Self {
            name: None,
            master_username: default_master_username(),
            master_password: None,
            manage_master_password: true,
            port: None,
        }
    }
}

/// Storage type for standalone instances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    Gp2,
    Gp3,
    Io1,
    Io2,
}

impl StorageType {
    /// Canonical provider string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gp2 => "gp2",
            Self::Gp3 => "gp3",
            Self::Io1 => "io1",
            Self::Io2 => "io2",
        }
    }

    /// Whether this type takes a provisioned IOPS setting
    pub fn supports_iops(&self) -> bool {
        matches!(self, Self::Gp3 | Self::Io1 | Self::Io2)
    }
}

/// Storage settings (standalone mode only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Allocated storage in GiB (20-65536)
    #[serde(default = "default_allocated_storage")]
    pub allocated_storage_gb: u32,

    /// Autoscaling ceiling in GiB; must not be below the allocation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_allocated_storage_gb: Option<u32>,

    /// Storage type
    #[serde(default = "StorageConfig::default_storage_type")]
    pub storage_type: StorageType,

    /// Provisioned IOPS (io1/io2 require it, gp3 accepts it)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iops: Option<u32>,

    /// Throughput in MiB/s; only meaningful for gp3
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throughput_mibs: Option<u32>,

    /// Encrypt storage at rest
    #[serde(default = "default_true")]
    pub encrypted: bool,

    /// Customer-managed KMS key for storage encryption
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kms_key_id: Option<String>,
}

impl StorageConfig {
    /// Minimum allocated storage in GiB
    pub const MIN_ALLOCATED_GB: u32 = 20;

    /// Maximum allocated storage in GiB
    pub const MAX_ALLOCATED_GB: u32 = 65536;

    fn default_storage_type() -> StorageType {
        StorageType::Gp3
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            allocated_storage_gb: default_allocated_storage(),
            max_allocated_storage_gb: None,
            storage_type: StorageType::Gp3,
            iops: None,
            throughput_mibs: None,
            encrypted: true,
            kms_key_id: None,
        }
    }
}

/// Multi-AZ / availability-zone placement
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HighAvailabilityConfig {
    /// Synchronous standby in a second availability zone
    #[serde(default)]
    pub multi_az: bool,

    /// Pinned availability zone; mutually exclusive with multi-AZ
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
}

/// Serverless v2 scaling range in capacity units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerlessScaling {
    /// Minimum capacity (>= 0.5)
    pub min_capacity: f64,

    /// Maximum capacity (<= 128)
    pub max_capacity: f64,
}

impl ServerlessScaling {
    /// Minimum allowed capacity
    pub const MIN_CAPACITY: f64 = 0.5;

    /// Maximum allowed capacity
    pub const MAX_CAPACITY: f64 = 128.0;
}

/// Cluster sizing (cluster mode only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClusterOptions {
    /// Number of cluster members (1-16)
    #[serde(default = "default_instance_count")]
    pub instance_count: u32,

    /// Serverless v2 scaling; when set, every member's instance class is
    /// overridden to the `db.serverless` sentinel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serverless_scaling: Option<ServerlessScaling>,
}

impl ClusterOptions {
    /// Maximum cluster member count
    pub const MAX_INSTANCES: u32 = 16;
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            instance_count: default_instance_count(),
            serverless_scaling: None,
        }
    }
}

/// Backup and snapshot policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackupConfig {
    /// Automated backup retention in days (0-35; 0 disables)
    #[serde(default = "default_backup_retention")]
    pub retention_days: u32,

    /// Preferred backup window (`hh:mm-hh:mm`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<String>,

    /// Preferred maintenance window (`ddd:hh:mm-ddd:hh:mm`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance_window: Option<String>,

    /// Skip the final snapshot on destruction
    #[serde(default)]
    pub skip_final_snapshot: bool,

    /// Final snapshot name; defaulted from the identifier when not skipping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_snapshot_name: Option<String>,

    /// Engine-level hold blocking destruction
    #[serde(default)]
    pub deletion_protection: bool,

    /// Copy resource tags onto snapshots
    #[serde(default = "default_true")]
    pub copy_tags_to_snapshot: bool,
}

impl BackupConfig {
    /// Maximum retention in days
    pub const MAX_RETENTION_DAYS: u32 = 35;
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            retention_days: default_backup_retention(),
            window: None,
            maintenance_window: None,
            skip_final_snapshot: false,
            final_snapshot_name: None,
            deletion_protection: false,
            copy_tags_to_snapshot: true,
        }
    }
}

/// Performance Insights, enhanced monitoring, and log exports
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitoringConfig {
    /// Enable Performance Insights
    #[serde(default)]
    pub performance_insights_enabled: bool,

    /// Performance Insights retention in days (7, or 31-731)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_insights_retention_days: Option<u32>,

    /// KMS key for Performance Insights data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_insights_kms_key_id: Option<String>,

    /// Enhanced-monitoring interval in seconds (0 disables)
    #[serde(default)]
    pub enhanced_monitoring_interval_seconds: u32,

    /// Log types exported to the logging backend
    #[serde(default)]
    pub cloudwatch_log_exports: BTreeSet<String>,
}

impl MonitoringConfig {
    /// Allowed enhanced-monitoring intervals
    pub const ALLOWED_INTERVALS: [u32; 7] = [0, 1, 5, 10, 15, 30, 60];
}

/// When an engine parameter change takes effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApplyMethod {
    #[default]
    Immediate,
    PendingReboot,
}

/// A single engine parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Parameter {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub apply_method: ApplyMethod,
}

/// Parameter-group inputs
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterGroupConfig {
    /// Parameter-group family; defaulted per engine when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,

    /// Instance-level parameters
    #[serde(default)]
    pub instance_parameters: Vec<Parameter>,

    /// Cluster-level parameters (cluster mode only)
    #[serde(default)]
    pub cluster_parameters: Vec<Parameter>,
}

/// A single option-group option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionSpec {
    /// Option name as the provider knows it
    pub name: String,

    /// Dedicated option port, if the option listens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Option settings (name/value pairs)
    #[serde(default)]
    pub settings: Vec<OptionSetting>,
}

/// A single option setting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionSetting {
    pub name: String,
    pub value: String,
}

/// Option-group inputs (standalone mysql/mariadb only)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionGroupConfig {
    /// Reference an existing option group instead of emitting one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_name: Option<String>,

    /// Options to bake into an emitted option group
    #[serde(default)]
    pub options: Vec<OptionSpec>,
}

/// A single read replica (standalone mode only)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReadReplicaConfig {
    /// Instance class; inherits the primary's when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_class: Option<String>,

    /// Pinned availability zone for the replica
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,

    /// Whether the replica endpoint is publicly reachable
    #[serde(default)]
    pub publicly_accessible: bool,
}
