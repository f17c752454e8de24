// Copyright (c) 2025 - Cowboy AI, Inc.
//! Cluster Emitter
//!
//! Emits the cluster control resource plus `instance_count` member
//! resources numbered from 1. Storage sizing never applies here: clusters
//! manage their distributed storage layer themselves. Members own no
//! backup settings either; both are cluster-owned concerns.

use super::{monitoring_edge, CommonResources};
use crate::config::{Configuration, EffectiveConfiguration, ValidatedInputs};
use crate::graph::{
    tags_with_name, BackupSpec, ClusterMemberSpec, CredentialsSpec, DatabaseTopology,
    DbClusterSpec, InstanceMonitoringSpec, OrderingEdge, ParameterGroupSpec, ResourceKind,
    ResourceRef, SERVERLESS_INSTANCE_CLASS,
};
use tracing::debug;

pub(crate) fn emit(
    config: &Configuration,
    inputs: &ValidatedInputs,
    effective: &EffectiveConfiguration,
    common: &CommonResources,
) -> (DatabaseTopology, Vec<OrderingEdge>) {
    let identifier = &inputs.identifier;
    let mut edges = Vec::new();

    let cluster_parameter_group = if config.parameter_group.cluster_parameters.is_empty() {
        None
    } else {
        let name = identifier.child("cluster-params");
        Some(ParameterGroupSpec {
            name: name.clone(),
            family: effective.parameter_family.clone(),
            description: format!("Cluster parameters for {}", identifier),
            parameters: config.parameter_group.cluster_parameters.clone(),
            tags: tags_with_name(&config.tags, &name),
        })
    };

    // Distinct resource from the cluster-level group; members reference it.
    let instance_parameter_group = if config.parameter_group.instance_parameters.is_empty() {
        None
    } else {
        let name = identifier.child("params");
        Some(ParameterGroupSpec {
            name: name.clone(),
            family: effective.parameter_family.clone(),
            description: format!("Member instance parameters for {}", identifier),
            parameters: config.parameter_group.instance_parameters.clone(),
            tags: tags_with_name(&config.tags, &name),
        })
    };

    let serverless = config.cluster_options.serverless_scaling.clone();

    let cluster = DbClusterSpec {
        identifier: identifier.as_str().to_string(),
        engine: config.engine,
        engine_version: config.engine_version.clone(),
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
        storage_encrypted: config.storage.encrypted,
        kms_key_id: config.storage.kms_key_id.clone(),
        subnet_group: common.subnet_group.name.clone(),
        security_group: common.security_group.name.clone(),
        cluster_parameter_group_name: cluster_parameter_group.as_ref().map(|pg| pg.name.clone()),
        backup: BackupSpec {
            retention_days: config.backup.retention_days,
            window: config.backup.window.clone(),
            maintenance_window: config.backup.maintenance_window.clone(),
            skip_final_snapshot: config.backup.skip_final_snapshot,
            final_snapshot_name: effective.final_snapshot_name.clone(),
            deletion_protection: config.backup.deletion_protection,
            copy_tags_to_snapshot: config.backup.copy_tags_to_snapshot,
        },
        cloudwatch_log_exports: config.monitoring.cloudwatch_log_exports.clone(),
        iam_auth_enabled: config.iam_auth_enabled,
        serverless_scaling: serverless.clone(),
        apply_immediately: config.apply_immediately,
        tags: tags_with_name(&config.tags, identifier.as_str()),
    };

    let cluster_ref = ResourceRef::new(ResourceKind::DbCluster, &cluster.identifier);
    if let Some(edge) = monitoring_edge(common, cluster_ref.clone()) {
        edges.push(edge);
    }

    // Serverless scaling overrides any configured instance class. Documented
    // override, not a conflict: the sentinel class is what the platform
    // expects for auto-scaled members.
    let member_class = if serverless.is_some() {
        SERVERLESS_INSTANCE_CLASS.to_string()
    } else {
        config.instance_class.clone()
    };

    let monitoring = InstanceMonitoringSpec {
        enhanced_monitoring_interval_seconds: config
            .monitoring
            .enhanced_monitoring_interval_seconds,
        monitoring_role: common.monitoring_role.as_ref().map(|r| r.name.clone()),
        performance_insights_enabled: config.monitoring.performance_insights_enabled,
        performance_insights_retention_days: effective.performance_insights_retention_days,
        performance_insights_kms_key_id: effective.performance_insights_kms_key_id.clone(),
    };

    let count = config.cluster_options.instance_count;
    let mut members = Vec::with_capacity(count as usize);
    for index in 1..=count {
        let member_identifier = identifier.child(&index.to_string());
        let member = ClusterMemberSpec {
            identifier: member_identifier.clone(),
            index,
            cluster_identifier: cluster.identifier.clone(),
            engine: config.engine,
            instance_class: member_class.clone(),
            parameter_group_name: instance_parameter_group.as_ref().map(|pg| pg.name.clone()),
            monitoring: monitoring.clone(),
            auto_minor_version_upgrade: config.auto_minor_version_upgrade,
            apply_immediately: config.apply_immediately,
            tags: tags_with_name(&config.tags, &member_identifier),
        };

        let member_ref = ResourceRef::new(ResourceKind::ClusterMember, &member.identifier);
        edges.push(OrderingEdge::new(member_ref.clone(), cluster_ref.clone()));
        if let Some(edge) = monitoring_edge(common, member_ref) {
            edges.push(edge);
        }

        members.push(member);
    }

    debug!(
        identifier = %identifier,
        members = members.len(),
        serverless = serverless.is_some(),
        "emitted cluster topology"
    );

    (
        DatabaseTopology::Cluster {
            cluster,
            cluster_parameter_group,
            instance_parameter_group,
            members,
        },
        edges,
    )
}
