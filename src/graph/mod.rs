// Copyright (c) 2025 - Cowboy AI, Inc.
//! Declarative Resource Graph
//!
//! The resolver's output: a set of typed resource specifications plus the
//! explicit ordering edges the external provisioning engine is required to
//! respect. Exactly one topology mode is active per graph; the type system
//! enforces that standalone and cluster resources never coexist.

pub mod resources;

pub use resources::{
    tags_with_name, BackupSpec, ClusterMemberSpec, CredentialsSpec, DbClusterSpec, DbInstanceSpec,
    EgressRule, IngressRule, InstanceMonitoringSpec, InstanceStorageSpec, MonitoringRoleSpec,
    OptionGroupSpec, ParameterGroupSpec, ReadReplicaSpec, SecurityGroupSpec, SubnetGroupSpec,
    Tags, SERVERLESS_INSTANCE_CLASS,
};

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

/// Graph consistency error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Ordering edge references a resource that was never emitted: {0}")]
    DanglingEdge(ResourceRef),

    #[error("Ordering edges contain a cycle involving {0}")]
    Cycle(ResourceRef),
}

/// Resource taxonomy for graph nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    SubnetGroup,
    SecurityGroup,
    MonitoringRole,
    ParameterGroup,
    ClusterParameterGroup,
    OptionGroup,
    DbInstance,
    DbCluster,
    ClusterMember,
    ReadReplica,
}

impl ResourceKind {
    /// Get the canonical string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SubnetGroup => "subnet_group",
            Self::SecurityGroup => "security_group",
            Self::MonitoringRole => "monitoring_role",
            Self::ParameterGroup => "parameter_group",
            Self::ClusterParameterGroup => "cluster_parameter_group",
            Self::OptionGroup => "option_group",
            Self::DbInstance => "db_instance",
            Self::DbCluster => "db_cluster",
            Self::ClusterMember => "cluster_member",
            Self::ReadReplica => "read_replica",
        }
    }
}

/// Reference to an emitted resource (kind + name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ResourceRef {
    pub kind: ResourceKind,
    pub name: String,
}

impl ResourceRef {
    pub fn new(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.name)
    }
}

/// Explicit precedence edge: `resource` must be created after `depends_on`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderingEdge {
    pub resource: ResourceRef,
    pub depends_on: ResourceRef,
}

impl OrderingEdge {
    pub fn new(resource: ResourceRef, depends_on: ResourceRef) -> Self {
        Self {
            resource,
            depends_on,
        }
    }
}

/// Exactly one topology mode per deployment
///
/// Standalone-instance resources and cluster resources are mutually
/// exclusive; the tagged variant makes a mixed graph unrepresentable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DatabaseTopology {
    Standalone {
        primary: DbInstanceSpec,
        #[serde(skip_serializing_if = "Option::is_none")]
        parameter_group: Option<ParameterGroupSpec>,
        #[serde(skip_serializing_if = "Option::is_none")]
        option_group: Option<OptionGroupSpec>,
        replicas: Vec<ReadReplicaSpec>,
    },
    Cluster {
        cluster: DbClusterSpec,
        #[serde(skip_serializing_if = "Option::is_none")]
        cluster_parameter_group: Option<ParameterGroupSpec>,
        #[serde(skip_serializing_if = "Option::is_none")]
        instance_parameter_group: Option<ParameterGroupSpec>,
        members: Vec<ClusterMemberSpec>,
    },
}

impl DatabaseTopology {
    /// Whether this is the clustered variant
    pub fn is_cluster(&self) -> bool {
        matches!(self, Self::Cluster { .. })
    }
}

/// Complete resolved resource graph for one deployment
///
/// Either a complete, internally consistent graph is produced or none is;
/// there are no partial graphs. Resolution is referentially transparent:
/// the same configuration always produces a byte-identical graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceGraph {
    pub subnet_group: SubnetGroupSpec,
    pub security_group: SecurityGroupSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitoring_role: Option<MonitoringRoleSpec>,
    pub topology: DatabaseTopology,
    pub edges: Vec<OrderingEdge>,
}

impl ResourceGraph {
    /// Enumerate every emitted resource as a reference
    pub fn resource_refs(&self) -> Vec<ResourceRef> {
        let mut refs = vec![
            ResourceRef::new(ResourceKind::SubnetGroup, &self.subnet_group.name),
            ResourceRef::new(ResourceKind::SecurityGroup, &self.security_group.name),
        ];

        if let Some(role) = &self.monitoring_role {
            refs.push(ResourceRef::new(ResourceKind::MonitoringRole, &role.name));
        }

        match &self.topology {
            DatabaseTopology::Standalone {
                primary,
                parameter_group,
                option_group,
                replicas,
            } => {
                refs.push(ResourceRef::new(ResourceKind::DbInstance, &primary.identifier));
                if let Some(pg) = parameter_group {
                    refs.push(ResourceRef::new(ResourceKind::ParameterGroup, &pg.name));
                }
                if let Some(og) = option_group {
                    refs.push(ResourceRef::new(ResourceKind::OptionGroup, &og.name));
                }
                for replica in replicas {
                    refs.push(ResourceRef::new(ResourceKind::ReadReplica, &replica.identifier));
                }
            }
            DatabaseTopology::Cluster {
                cluster,
                cluster_parameter_group,
                instance_parameter_group,
                members,
            } => {
                refs.push(ResourceRef::new(ResourceKind::DbCluster, &cluster.identifier));
                if let Some(pg) = cluster_parameter_group {
                    refs.push(ResourceRef::new(ResourceKind::ClusterParameterGroup, &pg.name));
                }
                if let Some(pg) = instance_parameter_group {
                    refs.push(ResourceRef::new(ResourceKind::ParameterGroup, &pg.name));
                }
                for member in members {
                    refs.push(ResourceRef::new(ResourceKind::ClusterMember, &member.identifier));
                }
            }
        }

        refs
    }

    /// Validate edge integrity: every endpoint exists and the edge set is
    /// acyclic (Kahn's algorithm)
    pub fn validate_edges(&self) -> Result<(), GraphError> {
        let nodes: BTreeSet<ResourceRef> = self.resource_refs().into_iter().collect();

        for edge in &self.edges {
            if !nodes.contains(&edge.resource) {
                return Err(GraphError::DanglingEdge(edge.resource.clone()));
            }
            if !nodes.contains(&edge.depends_on) {
                return Err(GraphError::DanglingEdge(edge.depends_on.clone()));
            }
        }

        // Kahn's algorithm over the precedence edges
        let mut in_degree: BTreeMap<&ResourceRef, usize> =
            nodes.iter().map(|n| (n, 0)).collect();
        for edge in &self.edges {
            if let Some(degree) = in_degree.get_mut(&edge.resource) {
                *degree += 1;
            }
        }

        let mut ready: Vec<&ResourceRef> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(node, _)| *node)
            .collect();
        let mut visited = 0usize;

        while let Some(node) = ready.pop() {
            visited += 1;
            for edge in &self.edges {
                if &edge.depends_on != node {
                    continue;
                }
                if let Some(degree) = in_degree.get_mut(&edge.resource) {
                    *degree -= 1;
                    if *degree == 0 {
                        if let Some(next) = nodes.get(&edge.resource) {
                            ready.push(next);
                        }
                    }
                }
            }
        }

        if visited != nodes.len() {
            if let Some((stuck, _)) = in_degree.into_iter().find(|(_, degree)| *degree > 0) {
                return Err(GraphError::Cycle(stuck.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SubnetId, VpcId};

    fn minimal_graph() -> ResourceGraph {
        ResourceGraph {
            subnet_group: SubnetGroupSpec {
                name: "db-subnets".to_string(),
                description: "test".to_string(),
                subnet_ids: vec![
                    SubnetId::new("subnet-aaa1").unwrap(),
                    SubnetId::new("subnet-bbb2").unwrap(),
                ],
                tags: Tags::new(),
            },
            security_group: SecurityGroupSpec {
                name: "db-sg".to_string(),
                description: "test".to_string(),
                vpc_id: VpcId::new("vpc-0a1b2c3d").unwrap(),
                ingress: vec![],
                egress: vec![EgressRule::AllowAll {
                    description: "test".to_string(),
                }],
                tags: Tags::new(),
            },
            monitoring_role: None,
            topology: DatabaseTopology::Standalone {
                primary: test_primary(),
                parameter_group: None,
                option_group: None,
                replicas: vec![],
            },
            edges: vec![],
        }
    }

    fn test_primary() -> DbInstanceSpec {
        DbInstanceSpec {
            identifier: "db".to_string(),
            engine: crate::domain::Engine::Mysql,
            engine_version: "8.0".to_string(),
            instance_class: "db.t3.micro".to_string(),
            port: 3306,
            db_name: None,
            credentials: CredentialsSpec {
                master_username: "admin".to_string(),
                manage_master_password: true,
                master_password: None,
            },
            storage: InstanceStorageSpec {
                allocated_storage_gb: 20,
                max_allocated_storage_gb: None,
                storage_type: "gp3".to_string(),
                iops: None,
                throughput_mibs: None,
                encrypted: true,
                kms_key_id: None,
            },
            multi_az: false,
            availability_zone: None,
            publicly_accessible: false,
            subnet_group: "db-subnets".to_string(),
            security_group: "db-sg".to_string(),
            parameter_group_name: None,
            option_group_name: None,
            backup: BackupSpec {
                retention_days: 7,
                window: None,
                maintenance_window: None,
                skip_final_snapshot: false,
                final_snapshot_name: Some("db-final-snapshot".to_string()),
                deletion_protection: false,
                copy_tags_to_snapshot: true,
            },
            monitoring: InstanceMonitoringSpec {
                enhanced_monitoring_interval_seconds: 0,
                monitoring_role: None,
                performance_insights_enabled: false,
                performance_insights_retention_days: None,
                performance_insights_kms_key_id: None,
            },
            cloudwatch_log_exports: Default::default(),
            iam_auth_enabled: false,
            auto_minor_version_upgrade: true,
            apply_immediately: false,
            tags: Tags::new(),
        }
    }

    #[test]
    fn test_resource_refs_enumeration() {
        let graph = minimal_graph();
        let refs = graph.resource_refs();
        assert_eq!(refs.len(), 3);
        assert!(refs.contains(&ResourceRef::new(ResourceKind::DbInstance, "db")));
    }

    #[test]
    fn test_empty_edges_validate() {
        assert!(minimal_graph().validate_edges().is_ok());
    }

    #[test]
    fn test_dangling_edge_detected() {
        let mut graph = minimal_graph();
        graph.edges.push(OrderingEdge::new(
            ResourceRef::new(ResourceKind::ReadReplica, "ghost"),
            ResourceRef::new(ResourceKind::DbInstance, "db"),
        ));
        assert!(matches!(
            graph.validate_edges(),
            Err(GraphError::DanglingEdge(_))
        ));
    }

    #[test]
    fn test_cycle_detected() {
        let mut graph = minimal_graph();
        let a = ResourceRef::new(ResourceKind::DbInstance, "db");
        let b = ResourceRef::new(ResourceKind::SecurityGroup, "db-sg");
        graph.edges.push(OrderingEdge::new(a.clone(), b.clone()));
        graph.edges.push(OrderingEdge::new(b, a));
        assert!(matches!(graph.validate_edges(), Err(GraphError::Cycle(_))));
    }

    #[test]
    fn test_valid_chain_accepted() {
        let mut graph = minimal_graph();
        graph.edges.push(OrderingEdge::new(
            ResourceRef::new(ResourceKind::DbInstance, "db"),
            ResourceRef::new(ResourceKind::SubnetGroup, "db-subnets"),
        ));
        graph.edges.push(OrderingEdge::new(
            ResourceRef::new(ResourceKind::DbInstance, "db"),
            ResourceRef::new(ResourceKind::SecurityGroup, "db-sg"),
        ));
        assert!(graph.validate_edges().is_ok());
    }
}
