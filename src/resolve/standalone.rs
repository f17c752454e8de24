// Copyright (c) 2025 - Cowboy AI, Inc.
//! Standalone-Instance Emitter
//!
//! Emits one primary database resource with its storage, HA, backup, and
//! monitoring settings, plus optional parameter/option groups and read
//! replicas. Replicas carry explicit ordering edges back to the primary:
//! replication needs a running source.

use super::{major_engine_version, monitoring_edge, CommonResources, DerivationError};
use crate::config::{Configuration, EffectiveConfiguration, ValidatedInputs};
use crate::graph::{
    tags_with_name, BackupSpec, CredentialsSpec, DatabaseTopology, DbInstanceSpec,
    InstanceMonitoringSpec, InstanceStorageSpec, OptionGroupSpec, OrderingEdge, ParameterGroupSpec,
    ReadReplicaSpec, ResourceKind, ResourceRef,
};
use tracing::debug;

pub(crate) fn emit(
    config: &Configuration,
    inputs: &ValidatedInputs,
    effective: &EffectiveConfiguration,
    common: &CommonResources,
) -> Result<(DatabaseTopology, Vec<OrderingEdge>), DerivationError> {
    let identifier = &inputs.identifier;
    let mut edges = Vec::new();

    let parameter_group = if config.parameter_group.instance_parameters.is_empty() {
        None
    } else {
        let name = identifier.child("params");
        Some(ParameterGroupSpec {
            name: name.clone(),
            family: effective.parameter_family.clone(),
            description: format!("Instance parameters for {}", identifier),
            parameters: config.parameter_group.instance_parameters.clone(),
            tags: tags_with_name(&config.tags, &name),
        })
    };

    let (option_group, option_group_name) = emit_option_group(config, inputs)?;

    let monitoring = InstanceMonitoringSpec {
        enhanced_monitoring_interval_seconds: config
            .monitoring
            .enhanced_monitoring_interval_seconds,
        monitoring_role: common.monitoring_role.as_ref().map(|r| r.name.clone()),
        performance_insights_enabled: config.monitoring.performance_insights_enabled,
        performance_insights_retention_days: effective.performance_insights_retention_days,
        performance_insights_kms_key_id: effective.performance_insights_kms_key_id.clone(),
    };

    let primary = DbInstanceSpec {
        identifier: identifier.as_str().to_string(),
        engine: config.engine,
        engine_version: config.engine_version.clone(),
        instance_class: config.instance_class.clone(),
        port: effective.port,
        db_name: config.database.name.clone(),
        credentials: CredentialsSpec {
            master_username: config.database.master_username.clone(),
            manage_master_password: config.database.manage_master_password,
            master_password: if config.database.manage_master_password {
                None
            } else {
                config.database.master_password.clone()
            },
        },
        storage: InstanceStorageSpec {
            allocated_storage_gb: config.storage.allocated_storage_gb,
            max_allocated_storage_gb: config.storage.max_allocated_storage_gb,
            storage_type: config.storage.storage_type.as_str().to_string(),
            iops: config.storage.iops,
            throughput_mibs: effective.storage_throughput_mibs,
            encrypted: config.storage.encrypted,
            kms_key_id: config.storage.kms_key_id.clone(),
        },
        multi_az: config.high_availability.multi_az,
        availability_zone: effective.availability_zone.clone(),
        publicly_accessible: config.network.publicly_accessible,
        subnet_group: common.subnet_group.name.clone(),
        security_group: common.security_group.name.clone(),
        parameter_group_name: parameter_group.as_ref().map(|pg| pg.name.clone()),
        option_group_name,
        backup: BackupSpec {
            retention_days: config.backup.retention_days,
            window: config.backup.window.clone(),
            maintenance_window: config.backup.maintenance_window.clone(),
            skip_final_snapshot: config.backup.skip_final_snapshot,
            final_snapshot_name: effective.final_snapshot_name.clone(),
            deletion_protection: config.backup.deletion_protection,
            copy_tags_to_snapshot: config.backup.copy_tags_to_snapshot,
        },
        monitoring,
        cloudwatch_log_exports: config.monitoring.cloudwatch_log_exports.clone(),
        iam_auth_enabled: config.iam_auth_enabled,
        auto_minor_version_upgrade: config.auto_minor_version_upgrade,
        apply_immediately: config.apply_immediately,
        tags: tags_with_name(&config.tags, identifier.as_str()),
    };

    let primary_ref = ResourceRef::new(ResourceKind::DbInstance, &primary.identifier);
    if let Some(edge) = monitoring_edge(common, primary_ref.clone()) {
        edges.push(edge);
    }

    // Replicas stream from the primary; each one orders strictly after it.
    let mut replicas = Vec::with_capacity(config.read_replicas.len());
    for (key, replica_config) in &config.read_replicas {
        let replica_identifier = identifier.child(key);
        let replica = ReadReplicaSpec {
            identifier: replica_identifier.clone(),
            replica_key: key.clone(),
            source_identifier: identifier.as_str().to_string(),
            instance_class: replica_config
                .instance_class
                .clone()
                .unwrap_or_else(|| config.instance_class.clone()),
            availability_zone: replica_config.availability_zone.clone(),
            publicly_accessible: replica_config.publicly_accessible,
            // Replicas are disposable, whatever the primary's policy says
            skip_final_snapshot: true,
            security_group: common.security_group.name.clone(),
            tags: tags_with_name(&config.tags, &replica_identifier),
        };
        edges.push(OrderingEdge::new(
            ResourceRef::new(ResourceKind::ReadReplica, &replica.identifier),
            primary_ref.clone(),
        ));
        replicas.push(replica);
    }

    debug!(
        identifier = %identifier,
        replicas = replicas.len(),
        parameter_group = parameter_group.is_some(),
        option_group = option_group.is_some(),
        "emitted standalone topology"
    );

    Ok((
        DatabaseTopology::Standalone {
            primary,
            parameter_group,
            option_group,
            replicas,
        },
        edges,
    ))
}

/// Option groups exist only for standalone mysql/mariadb
///
/// With options configured, an option group is emitted and referenced by
/// name; with none, a caller-supplied existing name is passed through.
fn emit_option_group(
    config: &Configuration,
    inputs: &ValidatedInputs,
) -> Result<(Option<OptionGroupSpec>, Option<String>), DerivationError> {
    if !config.engine.supports_option_groups() {
        return Ok((None, None));
    }

    if config.option_group.options.is_empty() {
        return Ok((None, config.option_group.existing_name.clone()));
    }

    let name = inputs.identifier.child("options");
    let spec = OptionGroupSpec {
        name: name.clone(),
        engine: config.engine,
        major_engine_version: major_engine_version(&config.engine_version)?,
        options: config.option_group.options.clone(),
        tags: tags_with_name(&config.tags, &name),
    };
    Ok((Some(spec), Some(name)))
}
