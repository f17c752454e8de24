// Copyright (c) 2025 - Cowboy AI, Inc.
//! Integration tests for end-to-end topology resolution
//!
//! These tests drive the full pipeline — validate, derive, emit — and
//! check the emitted resource set, cross-references, and ordering edges
//! for both topology modes.

use pretty_assertions::assert_eq;
use rds_topology::config::{
    Configuration, Parameter, ReadReplicaConfig, ServerlessScaling, StorageType,
};
use rds_topology::graph::{
    DatabaseTopology, EgressRule, IngressRule, ResourceKind, SERVERLESS_INSTANCE_CLASS,
};
use rds_topology::{resolve, ResolverError};

// Test fixtures

fn mysql_config() -> Configuration {
    serde_json::from_value(serde_json::json!({
        "identifier": "my-mysql-db",
        "engine": "mysql",
        "engine_version": "8.0",
        "instance_class": "db.t3.micro",
        "network": {
            "vpc_id": "vpc-0a1b2c3d",
            "subnet_ids": ["subnet-aaa1", "subnet-bbb2"],
            "allowed_security_group_ids": ["sg-0badcafe"]
        }
    }))
    .unwrap()
}

fn aurora_config(instance_count: u32) -> Configuration {
    serde_json::from_value(serde_json::json!({
        "identifier": "my-aurora-db",
        "engine": "aurora-postgresql",
        "engine_version": "15.4",
        "instance_class": "db.r6g.large",
        "network": {
            "vpc_id": "vpc-0a1b2c3d",
            "subnet_ids": ["subnet-aaa1", "subnet-bbb2"],
            "allowed_security_group_ids": ["sg-0badcafe"]
        },
        "cluster_options": { "instance_count": instance_count }
    }))
    .unwrap()
}

/// Worked example: minimal standalone mysql deployment
#[test]
fn test_standalone_mysql_scenario() {
    let graph = resolve(&mysql_config()).unwrap();

    match &graph.topology {
        DatabaseTopology::Standalone {
            primary,
            parameter_group,
            option_group,
            replicas,
        } => {
            assert_eq!(primary.port, 3306);
            assert_eq!(primary.identifier, "my-mysql-db");
            // No parameters supplied, so no parameter-group resource
            assert!(parameter_group.is_none());
            assert!(primary.parameter_group_name.is_none());
            assert!(option_group.is_none());
            assert!(replicas.is_empty());
        }
        _ => panic!("expected standalone topology"),
    }

    // One peer-group ingress rule, no CIDR rule, one egress-allow-all
    assert_eq!(graph.security_group.ingress.len(), 1);
    assert!(matches!(
        graph.security_group.ingress[0],
        IngressRule::PeerGroup { port: 3306, .. }
    ));
    assert_eq!(graph.security_group.egress.len(), 1);
    assert!(matches!(
        graph.security_group.egress[0],
        EgressRule::AllowAll { .. }
    ));

    assert!(graph.monitoring_role.is_none());
    assert!(graph.validate_edges().is_ok());
}

/// Worked example: aurora-postgresql cluster with three members
#[test]
fn test_aurora_cluster_scenario() {
    let graph = resolve(&aurora_config(3)).unwrap();

    match &graph.topology {
        DatabaseTopology::Cluster {
            cluster, members, ..
        } => {
            assert_eq!(cluster.port, 5432);
            assert_eq!(members.len(), 3);
            let indexes: Vec<u32> = members.iter().map(|m| m.index).collect();
            assert_eq!(indexes, vec![1, 2, 3]);
        }
        _ => panic!("expected cluster topology"),
    }

    // No standalone resources of any kind in cluster mode
    let refs = graph.resource_refs();
    assert!(!refs.iter().any(|r| r.kind == ResourceKind::DbInstance));
    assert!(!refs.iter().any(|r| r.kind == ResourceKind::ReadReplica));
    assert!(graph.validate_edges().is_ok());
}

/// Worked example: serverless v2 scaling with two members
#[test]
fn test_serverless_scenario() {
    let mut config = aurora_config(2);
    config.cluster_options.serverless_scaling = Some(ServerlessScaling {
        min_capacity: 0.5,
        max_capacity: 16.0,
    });

    let graph = resolve(&config).unwrap();
    match &graph.topology {
        DatabaseTopology::Cluster {
            cluster, members, ..
        } => {
            let scaling = cluster.serverless_scaling.as_ref().unwrap();
            assert_eq!(scaling.min_capacity, 0.5);
            assert_eq!(scaling.max_capacity, 16.0);
            assert_eq!(members.len(), 2);
            for member in members {
                assert_eq!(member.instance_class, SERVERLESS_INSTANCE_CLASS);
            }
        }
        _ => panic!("expected cluster topology"),
    }
}

/// Resolving the same configuration twice yields byte-identical graphs
#[test]
fn test_resolution_is_idempotent() {
    let config = mysql_config();
    let first = serde_json::to_string(&resolve(&config).unwrap()).unwrap();
    let second = serde_json::to_string(&resolve(&config).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_backup_retention_boundaries() {
    let mut config = mysql_config();

    config.backup.retention_days = 0; // Disables automated backups, valid
    assert!(resolve(&config).is_ok());

    config.backup.retention_days = 35;
    assert!(resolve(&config).is_ok());

    config.backup.retention_days = 36;
    match resolve(&config) {
        Err(ResolverError::Validation(e)) => {
            assert!(e.violations.iter().any(|v| v.field == "backup.retention_days"));
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn test_throughput_dropped_for_non_gp3_storage() {
    let mut config = mysql_config();
    config.storage.throughput_mibs = Some(500);
    config.storage.storage_type = StorageType::Gp2;

    let graph = resolve(&config).unwrap();
    match &graph.topology {
        DatabaseTopology::Standalone { primary, .. } => {
            assert_eq!(primary.storage.throughput_mibs, None);
        }
        _ => panic!("expected standalone topology"),
    }
}

#[test]
fn test_replica_ordering_and_snapshot_policy() {
    let mut config = mysql_config();
    config.backup.skip_final_snapshot = false;
    config
        .read_replicas
        .insert("reporting".to_string(), ReadReplicaConfig::default());

    let graph = resolve(&config).unwrap();
    match &graph.topology {
        DatabaseTopology::Standalone { replicas, .. } => {
            assert_eq!(replicas.len(), 1);
            assert_eq!(replicas[0].identifier, "my-mysql-db-reporting");
            assert_eq!(replicas[0].replica_key, "reporting");
            // Always disposable, regardless of the primary's policy
            assert!(replicas[0].skip_final_snapshot);
        }
        _ => panic!("expected standalone topology"),
    }

    // Explicit precedence edge: replica after primary
    assert!(graph.edges.iter().any(|e| {
        e.resource.kind == ResourceKind::ReadReplica
            && e.resource.name == "my-mysql-db-reporting"
            && e.depends_on.kind == ResourceKind::DbInstance
            && e.depends_on.name == "my-mysql-db"
    }));
}

#[test]
fn test_monitoring_role_materialized_and_ordered() {
    let mut config = mysql_config();
    config.monitoring.enhanced_monitoring_interval_seconds = 60;

    let graph = resolve(&config).unwrap();
    let role = graph.monitoring_role.as_ref().unwrap();
    assert_eq!(role.name, "my-mysql-db-monitoring-role");

    match &graph.topology {
        DatabaseTopology::Standalone { primary, .. } => {
            assert_eq!(
                primary.monitoring.monitoring_role.as_deref(),
                Some("my-mysql-db-monitoring-role")
            );
        }
        _ => panic!("expected standalone topology"),
    }

    // Role must be attached before the monitored resource
    assert!(graph.edges.iter().any(|e| {
        e.resource.kind == ResourceKind::DbInstance
            && e.depends_on.kind == ResourceKind::MonitoringRole
    }));
    assert!(graph.validate_edges().is_ok());
}

#[test]
fn test_cidr_ingress_batched_into_single_rule() {
    let mut config = mysql_config();
    config.network.allowed_cidr_blocks =
        vec!["10.0.0.0/16".to_string(), "172.16.0.0/12".to_string()];

    let graph = resolve(&config).unwrap();
    let cidr_rules: Vec<_> = graph
        .security_group
        .ingress
        .iter()
        .filter(|r| matches!(r, IngressRule::Cidr { .. }))
        .collect();
    assert_eq!(cidr_rules.len(), 1);
    match cidr_rules[0] {
        IngressRule::Cidr { cidr_blocks, port, .. } => {
            assert_eq!(cidr_blocks.len(), 2);
            assert_eq!(*port, 3306);
        }
        _ => unreachable!(),
    }
}

#[test]
fn test_every_resource_carries_name_tag() {
    let mut config = mysql_config();
    config.tags.insert("team".to_string(), "data".to_string());
    config.monitoring.enhanced_monitoring_interval_seconds = 30;
    config.parameter_group.instance_parameters = vec![Parameter {
        name: "max_connections".to_string(),
        value: "500".to_string(),
        apply_method: Default::default(),
    }];

    let graph = resolve(&config).unwrap();

    assert_eq!(
        graph.subnet_group.tags.get("Name").map(String::as_str),
        Some("my-mysql-db-subnet-group")
    );
    assert_eq!(
        graph.security_group.tags.get("team").map(String::as_str),
        Some("data")
    );
    let role = graph.monitoring_role.as_ref().unwrap();
    assert_eq!(
        role.tags.get("Name").map(String::as_str),
        Some("my-mysql-db-monitoring-role")
    );
    match &graph.topology {
        DatabaseTopology::Standalone {
            primary,
            parameter_group,
            ..
        } => {
            assert_eq!(primary.tags.get("Name").map(String::as_str), Some("my-mysql-db"));
            assert_eq!(primary.tags.get("team").map(String::as_str), Some("data"));
            let pg = parameter_group.as_ref().unwrap();
            assert_eq!(pg.tags.get("Name").map(String::as_str), Some("my-mysql-db-params"));
        }
        _ => panic!("expected standalone topology"),
    }
}

#[test]
fn test_cluster_rejects_read_replicas() {
    let mut config = aurora_config(2);
    config
        .read_replicas
        .insert("extra".to_string(), ReadReplicaConfig::default());

    match resolve(&config) {
        Err(ResolverError::Validation(e)) => {
            assert!(e.violations.iter().any(|v| v.rule == "standalone_only"));
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn test_default_database_credentials() {
    let graph = resolve(&mysql_config()).unwrap();
    match &graph.topology {
        DatabaseTopology::Standalone { primary, .. } => {
            assert_eq!(primary.credentials.master_username, "admin");
            assert!(primary.credentials.manage_master_password);
            assert_eq!(primary.credentials.master_password, None);
            assert_eq!(
                primary.backup.final_snapshot_name.as_deref(),
                Some("my-mysql-db-final-snapshot")
            );
        }
        _ => panic!("expected standalone topology"),
    }
}
