// Copyright (c) 2025 - Cowboy AI, Inc.
//! Configuration Validator
//!
//! Every field rule is an independent predicate; all of them run so the
//! operator sees every problem in one report. No short-circuiting, no side
//! effects. A configuration that passes here cannot fail later in
//! derivation, with the single exception of engine-version prefix
//! extraction for option groups.

use super::{ClusterOptions, Configuration, MonitoringConfig, ServerlessScaling, StorageConfig};
use crate::domain::{CidrBlock, DbIdentifier, SecurityGroupId, SubnetId, VpcId};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// A single field-level violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Dotted path to the offending field
    pub field: String,
    /// Short machine-readable rule name
    pub rule: &'static str,
    /// Human-readable explanation
    pub message: String,
}

impl Violation {
    fn new(field: impl Into<String>, rule: &'static str, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            rule,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.field, self.rule, self.message)
    }
}

/// Validation failed with one or more field violations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation violation(s)", self.violations.len())?;
        for v in &self.violations {
            write!(f, "\n  - {}", v)?;
        }
        Ok(())
    }
}

/// Typed view of the pattern-constrained inputs, produced on success
///
/// The emitters consume these instead of re-parsing strings, so nothing
/// past validation can fail on input shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedInputs {
    pub identifier: DbIdentifier,
    pub vpc_id: VpcId,
    pub subnet_ids: Vec<SubnetId>,
    pub allowed_cidr_blocks: Vec<CidrBlock>,
    pub allowed_security_group_ids: Vec<SecurityGroupId>,
}

/// Validate a raw configuration, collecting every violation
///
/// Returns the typed view of pattern-constrained fields on success.
///
/// # Policy
/// - Storage settings are ignored (not validated) in cluster mode; cluster
///   options are ignored in standalone mode.
/// - `read_replicas` under a cluster engine is rejected rather than
///   silently dropped.
pub fn validate(config: &Configuration) -> Result<ValidatedInputs, ValidationError> {
    let mut violations = Vec::new();

    let identifier = validate_identity(config, &mut violations);
    let network = validate_network(config, &mut violations);
    validate_database(config, &mut violations);
    validate_backup(config, &mut violations);
    validate_monitoring(&config.monitoring, &mut violations);
    validate_parameters(config, &mut violations);

    if config.engine.is_cluster() {
        validate_cluster_options(&config.cluster_options, &mut violations);

        // Replicas are a standalone-only concept; reject loudly instead of
        // silently dropping caller intent.
        if !config.read_replicas.is_empty() {
            violations.push(Violation::new(
                "read_replicas",
                "standalone_only",
                format!(
                    "read replicas are not supported for cluster engine {}; cluster members are sized via cluster_options.instance_count",
                    config.engine
                ),
            ));
        }
    } else {
        validate_storage(&config.storage, &mut violations);
        validate_read_replicas(config, &mut violations);
    }

    match (identifier, network) {
        (Some(identifier), Some(network)) if violations.is_empty() => {
            tracing::debug!(identifier = %config.identifier, "configuration valid");
            Ok(ValidatedInputs {
                identifier,
                vpc_id: network.0,
                subnet_ids: network.1,
                allowed_cidr_blocks: network.2,
                allowed_security_group_ids: network.3,
            })
        }
        _ => {
            tracing::debug!(
                identifier = %config.identifier,
                count = violations.len(),
                "configuration invalid"
            );
            Err(ValidationError { violations })
        }
    }
}

fn validate_identity(
    config: &Configuration,
    violations: &mut Vec<Violation>,
) -> Option<DbIdentifier> {
    let identifier = match DbIdentifier::new(&config.identifier) {
        Ok(id) => Some(id),
        Err(e) => {
            violations.push(Violation::new("identifier", "identifier_format", e.to_string()));
            None
        }
    };

    if !config.instance_class.starts_with("db.") {
        violations.push(Violation::new(
            "instance_class",
            "db_prefix",
            format!("instance class must start with \"db.\": {}", config.instance_class),
        ));
    }

    identifier
}

type ParsedNetwork = (VpcId, Vec<SubnetId>, Vec<CidrBlock>, Vec<SecurityGroupId>);

fn validate_network(
    config: &Configuration,
    violations: &mut Vec<Violation>,
) -> Option<ParsedNetwork> {
    let network = &config.network;

    let vpc_id = match VpcId::new(&network.vpc_id) {
        Ok(id) => Some(id),
        Err(e) => {
            violations.push(Violation::new("network.vpc_id", "vpc_id_format", e.to_string()));
            None
        }
    };

    if network.subnet_ids.len() < 2 {
        violations.push(Violation::new(
            "network.subnet_ids",
            "min_count",
            format!(
                "at least 2 subnets are required, got {}",
                network.subnet_ids.len()
            ),
        ));
    }
    let mut subnet_ids = Vec::with_capacity(network.subnet_ids.len());
    for (i, subnet) in network.subnet_ids.iter().enumerate() {
        match SubnetId::new(subnet) {
            Ok(id) => subnet_ids.push(id),
            Err(e) => violations.push(Violation::new(
                format!("network.subnet_ids[{}]", i),
                "subnet_id_format",
                e.to_string(),
            )),
        }
    }

    let mut cidr_blocks = Vec::with_capacity(network.allowed_cidr_blocks.len());
    for (i, cidr) in network.allowed_cidr_blocks.iter().enumerate() {
        match CidrBlock::new(cidr) {
            Ok(block) => cidr_blocks.push(block),
            Err(e) => violations.push(Violation::new(
                format!("network.allowed_cidr_blocks[{}]", i),
                "cidr_format",
                e.to_string(),
            )),
        }
    }

    let mut security_group_ids = Vec::with_capacity(network.allowed_security_group_ids.len());
    for (i, sg) in network.allowed_security_group_ids.iter().enumerate() {
        match SecurityGroupId::new(sg) {
            Ok(id) => security_group_ids.push(id),
            Err(e) => violations.push(Violation::new(
                format!("network.allowed_security_group_ids[{}]", i),
                "security_group_id_format",
                e.to_string(),
            )),
        }
    }

    vpc_id.map(|vpc_id| (vpc_id, subnet_ids, cidr_blocks, security_group_ids))
}

/// `[a-zA-Z][a-zA-Z0-9_]*`
fn is_valid_db_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn validate_database(config: &Configuration, violations: &mut Vec<Violation>) {
    let database = &config.database;

    if let Some(name) = &database.name {
        if !is_valid_db_name(name) {
            violations.push(Violation::new(
                "database.name",
                "db_name_format",
                format!(
                    "database name must start with a letter and contain only letters, digits, and underscores: {}",
                    name
                ),
            ));
        }
    }

    if !is_valid_db_name(&database.master_username) {
        violations.push(Violation::new(
            "database.master_username",
            "db_name_format",
            format!(
                "master username must start with a letter and contain only letters, digits, and underscores: {}",
                database.master_username
            ),
        ));
    }
}

fn validate_storage(storage: &StorageConfig, violations: &mut Vec<Violation>) {
    if storage.allocated_storage_gb < StorageConfig::MIN_ALLOCATED_GB
        || storage.allocated_storage_gb > StorageConfig::MAX_ALLOCATED_GB
    {
        violations.push(Violation::new(
            "storage.allocated_storage_gb",
            "range",
            format!(
                "allocated storage must be between {} and {} GiB, got {}",
                StorageConfig::MIN_ALLOCATED_GB,
                StorageConfig::MAX_ALLOCATED_GB,
                storage.allocated_storage_gb
            ),
        ));
    }

    if let Some(max) = storage.max_allocated_storage_gb {
        if max < storage.allocated_storage_gb {
            violations.push(Violation::new(
                "storage.max_allocated_storage_gb",
                "autoscale_ceiling",
                format!(
                    "autoscaling ceiling ({}) must not be below the allocation ({})",
                    max, storage.allocated_storage_gb
                ),
            ));
        }
    }

    match storage.storage_type {
        super::StorageType::Io1 | super::StorageType::Io2 => {
            if storage.iops.is_none() {
                violations.push(Violation::new(
                    "storage.iops",
                    "iops_required",
                    format!(
                        "storage type {} requires provisioned IOPS",
                        storage.storage_type.as_str()
                    ),
                ));
            }
        }
        super::StorageType::Gp2 => {
            if storage.iops.is_some() {
                violations.push(Violation::new(
                    "storage.iops",
                    "iops_unsupported",
                    "storage type gp2 does not take provisioned IOPS",
                ));
            }
        }
        super::StorageType::Gp3 => {}
    }
}

fn validate_cluster_options(options: &ClusterOptions, violations: &mut Vec<Violation>) {
    if options.instance_count < 1 || options.instance_count > ClusterOptions::MAX_INSTANCES {
        violations.push(Violation::new(
            "cluster_options.instance_count",
            "range",
            format!(
                "instance count must be between 1 and {}, got {}",
                ClusterOptions::MAX_INSTANCES,
                options.instance_count
            ),
        ));
    }

    if let Some(scaling) = &options.serverless_scaling {
        if scaling.min_capacity < ServerlessScaling::MIN_CAPACITY {
            violations.push(Violation::new(
                "cluster_options.serverless_scaling.min_capacity",
                "range",
                format!(
                    "minimum capacity must be at least {}, got {}",
                    ServerlessScaling::MIN_CAPACITY,
                    scaling.min_capacity
                ),
            ));
        }
        if scaling.max_capacity > ServerlessScaling::MAX_CAPACITY {
            violations.push(Violation::new(
                "cluster_options.serverless_scaling.max_capacity",
                "range",
                format!(
                    "maximum capacity must be at most {}, got {}",
                    ServerlessScaling::MAX_CAPACITY,
                    scaling.max_capacity
                ),
            ));
        }
        if scaling.min_capacity > scaling.max_capacity {
            violations.push(Violation::new(
                "cluster_options.serverless_scaling",
                "min_le_max",
                format!(
                    "minimum capacity ({}) must not exceed maximum capacity ({})",
                    scaling.min_capacity, scaling.max_capacity
                ),
            ));
        }
    }
}

fn validate_backup(config: &Configuration, violations: &mut Vec<Violation>) {
    if config.backup.retention_days > super::BackupConfig::MAX_RETENTION_DAYS {
        violations.push(Violation::new(
            "backup.retention_days",
            "range",
            format!(
                "retention must be between 0 and {} days, got {}",
                super::BackupConfig::MAX_RETENTION_DAYS,
                config.backup.retention_days
            ),
        ));
    }
}

fn validate_monitoring(monitoring: &MonitoringConfig, violations: &mut Vec<Violation>) {
    if !MonitoringConfig::ALLOWED_INTERVALS.contains(&monitoring.enhanced_monitoring_interval_seconds)
    {
        violations.push(Violation::new(
            "monitoring.enhanced_monitoring_interval_seconds",
            "allowed_values",
            format!(
                "interval must be one of {:?}, got {}",
                MonitoringConfig::ALLOWED_INTERVALS,
                monitoring.enhanced_monitoring_interval_seconds
            ),
        ));
    }

    if let Some(retention) = monitoring.performance_insights_retention_days {
        let valid = retention == 7 || (31..=731).contains(&retention);
        if !valid {
            violations.push(Violation::new(
                "monitoring.performance_insights_retention_days",
                "allowed_values",
                format!("retention must be 7 or between 31 and 731 days, got {}", retention),
            ));
        }
    }
}

fn validate_parameters(config: &Configuration, violations: &mut Vec<Violation>) {
    for (i, parameter) in config.parameter_group.instance_parameters.iter().enumerate() {
        if parameter.name.is_empty() {
            violations.push(Violation::new(
                format!("parameter_group.instance_parameters[{}].name", i),
                "non_empty",
                "parameter name cannot be empty",
            ));
        }
    }
    for (i, parameter) in config.parameter_group.cluster_parameters.iter().enumerate() {
        if parameter.name.is_empty() {
            violations.push(Violation::new(
                format!("parameter_group.cluster_parameters[{}].name", i),
                "non_empty",
                "parameter name cannot be empty",
            ));
        }
    }
}

fn validate_read_replicas(config: &Configuration, violations: &mut Vec<Violation>) {
    for (key, replica) in &config.read_replicas {
        if let Err(e) = DbIdentifier::new(format!("{}-{}", config.identifier, key)) {
            violations.push(Violation::new(
                format!("read_replicas.{}", key),
                "identifier_format",
                format!("replica key produces an invalid identifier: {}", e),
            ));
        }
        if let Some(class) = &replica.instance_class {
            if !class.starts_with("db.") {
                violations.push(Violation::new(
                    format!("read_replicas.{}.instance_class", key),
                    "db_prefix",
                    format!("instance class must start with \"db.\": {}", class),
                ));
            }
        }
    }
}
