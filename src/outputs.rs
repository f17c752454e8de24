// Copyright (c) 2025 - Cowboy AI, Inc.
//! Output Projection
//!
//! After the external engine reconciles the resource graph it reports back
//! per-resource identifiers, ARNs, and endpoints. This module projects
//! those materialized records into the deployment's output surface.
//!
//! Region and account identity come in as an explicit [`ResolverContext`]
//! rather than ambient environment state, so output projection stays as
//! reproducible as resolution itself.

use crate::domain::EngineFamily;
use crate::graph::{DatabaseTopology, ResourceGraph};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Explicit provider identity for output construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverContext {
    pub region: String,
    pub account_id: String,
}

impl ResolverContext {
    /// Synthesize a provider ARN for a resource this account owns
    fn arn(&self, service: &str, resource: &str) -> String {
        format!(
            "arn:aws:{}:{}:{}:{}",
            service, self.region, self.account_id, resource
        )
    }
}

/// One resource as reported back by the provisioning engine
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MaterializedResource {
    /// Provider-assigned id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Provider ARN
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,

    /// Writer hostname, for endpoint-bearing resources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Reader hostname (clusters only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reader_endpoint: Option<String>,

    /// Lifecycle status as the engine last saw it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Immutable provider resource id (distinct from the identifier)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,

    /// Secret-store ARN for the managed master credential
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_arn: Option<String>,
}

/// Materialized records keyed by emitted resource name
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterializedSet(pub BTreeMap<String, MaterializedResource>);

impl MaterializedSet {
    fn get(&self, name: &str) -> Option<&MaterializedResource> {
        self.0.get(name)
    }
}

/// Primary-instance outputs (standalone mode)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrimaryOutputs {
    pub identifier: String,
    pub arn: Option<String>,
    /// `host:port`
    pub endpoint: Option<String>,
    pub hostname: Option<String>,
    pub port: u16,
    pub status: Option<String>,
    pub resource_id: Option<String>,
}

/// Per-member outputs (cluster mode)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberOutputs {
    pub id: Option<String>,
    pub arn: Option<String>,
    pub endpoint: Option<String>,
    pub is_writer: bool,
}

/// Cluster outputs (cluster mode)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterOutputs {
    pub identifier: String,
    pub arn: Option<String>,
    pub writer_endpoint: Option<String>,
    pub reader_endpoint: Option<String>,
    pub port: u16,
    pub resource_id: Option<String>,
    pub members: BTreeMap<String, MemberOutputs>,
}

/// Per-replica outputs (standalone mode only)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplicaOutputs {
    pub endpoint: Option<String>,
    pub hostname: Option<String>,
    pub port: u16,
    pub arn: Option<String>,
}

/// Complete output surface for one deployment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outputs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary: Option<PrimaryOutputs>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<ClusterOutputs>,

    /// Replica key → outputs (standalone mode only)
    pub replicas: BTreeMap<String, ReplicaOutputs>,

    /// Writer endpoint of whichever mode is active (`host:port`)
    pub endpoint: Option<String>,

    /// Writer hostname of whichever mode is active
    pub hostname: Option<String>,

    /// Effective listener port
    pub port: u16,

    pub database_name: Option<String>,
    pub master_username: String,

    /// Secret-store reference for the managed master credential
    pub master_password_secret_arn: Option<String>,

    pub security_group_id: Option<String>,
    pub subnet_group_name: String,
    pub subnet_group_arn: Option<String>,
    pub parameter_group_name: Option<String>,
    pub cluster_parameter_group_name: Option<String>,
    pub option_group_name: Option<String>,
    pub monitoring_role_arn: Option<String>,

    /// Populated only for mysql-family engines
    pub connection_string_mysql: Option<String>,

    /// Populated only for postgres-family engines
    pub connection_string_postgres: Option<String>,
}

impl Outputs {
    /// Project engine-reported state into the output surface
    pub fn from_materialized(
        graph: &ResourceGraph,
        materialized: &MaterializedSet,
        ctx: &ResolverContext,
    ) -> Self {
        let security_group_id = materialized
            .get(&graph.security_group.name)
            .and_then(|r| r.id.clone());

        let subnet_group_arn = materialized
            .get(&graph.subnet_group.name)
            .and_then(|r| r.arn.clone())
            .or_else(|| Some(ctx.arn("rds", &format!("subgrp:{}", graph.subnet_group.name))));

        let monitoring_role_arn = graph.monitoring_role.as_ref().map(|role| {
            materialized
                .get(&role.name)
                .and_then(|r| r.arn.clone())
                .unwrap_or_else(|| ctx.arn("iam", &format!("role/{}", role.name)))
        });

        match &graph.topology {
            DatabaseTopology::Standalone {
                primary,
                parameter_group,
                option_group,
                replicas,
            } => {
                let record = materialized.get(&primary.identifier);
                let hostname = record.and_then(|r| r.endpoint.clone());
                let endpoint = hostname
                    .as_ref()
                    .map(|host| format!("{}:{}", host, primary.port));

                let primary_outputs = PrimaryOutputs {
                    identifier: primary.identifier.clone(),
                    arn: record
                        .and_then(|r| r.arn.clone())
                        .or_else(|| Some(ctx.arn("rds", &format!("db:{}", primary.identifier)))),
                    endpoint: endpoint.clone(),
                    hostname: hostname.clone(),
                    port: primary.port,
                    status: record.and_then(|r| r.status.clone()),
                    resource_id: record.and_then(|r| r.resource_id.clone()),
                };

                let replica_outputs: BTreeMap<String, ReplicaOutputs> = replicas
                    .iter()
                    .map(|replica| {
                        let record = materialized.get(&replica.identifier);
                        let hostname = record.and_then(|r| r.endpoint.clone());
                        (
                            replica.replica_key.clone(),
                            ReplicaOutputs {
                                endpoint: hostname
                                    .as_ref()
                                    .map(|host| format!("{}:{}", host, primary.port)),
                                hostname,
                                port: primary.port,
                                arn: record.and_then(|r| r.arn.clone()),
                            },
                        )
                    })
                    .collect();

                let (mysql_conn, postgres_conn) = connection_strings(
                    primary.engine.family(),
                    &primary.credentials.master_username,
                    hostname.as_deref(),
                    primary.port,
                    primary.db_name.as_deref(),
                );

                Self {
                    primary: Some(primary_outputs),
                    cluster: None,
                    replicas: replica_outputs,
                    endpoint,
                    hostname,
                    port: primary.port,
                    database_name: primary.db_name.clone(),
                    master_username: primary.credentials.master_username.clone(),
                    master_password_secret_arn: record.and_then(|r| r.secret_arn.clone()),
                    security_group_id,
                    subnet_group_name: graph.subnet_group.name.clone(),
                    subnet_group_arn,
                    parameter_group_name: parameter_group.as_ref().map(|pg| pg.name.clone()),
                    cluster_parameter_group_name: None,
                    option_group_name: primary
                        .option_group_name
                        .clone()
                        .or_else(|| option_group.as_ref().map(|og| og.name.clone())),
                    monitoring_role_arn,
                    connection_string_mysql: mysql_conn,
                    connection_string_postgres: postgres_conn,
                }
            }
            DatabaseTopology::Cluster {
                cluster,
                cluster_parameter_group,
                instance_parameter_group,
                members,
            } => {
                let record = materialized.get(&cluster.identifier);
                let hostname = record.and_then(|r| r.endpoint.clone());
                let writer_endpoint = hostname
                    .as_ref()
                    .map(|host| format!("{}:{}", host, cluster.port));
                let reader_endpoint = record
                    .and_then(|r| r.reader_endpoint.clone())
                    .map(|host| format!("{}:{}", host, cluster.port));

                let member_outputs: BTreeMap<String, MemberOutputs> = members
                    .iter()
                    .map(|member| {
                        let record = materialized.get(&member.identifier);
                        (
                            member.identifier.clone(),
                            MemberOutputs {
                                id: record.and_then(|r| r.id.clone()),
                                arn: record.and_then(|r| r.arn.clone()),
                                endpoint: record.and_then(|r| r.endpoint.clone()),
                                // The engine's election convention: first
                                // member serves as writer
                                is_writer: member.index == 1,
                            },
                        )
                    })
                    .collect();

                let cluster_outputs = ClusterOutputs {
                    identifier: cluster.identifier.clone(),
                    arn: record
                        .and_then(|r| r.arn.clone())
                        .or_else(|| Some(ctx.arn("rds", &format!("cluster:{}", cluster.identifier)))),
                    writer_endpoint: writer_endpoint.clone(),
                    reader_endpoint,
                    port: cluster.port,
                    resource_id: record.and_then(|r| r.resource_id.clone()),
                    members: member_outputs,
                };

                let (mysql_conn, postgres_conn) = connection_strings(
                    cluster.engine.family(),
                    &cluster.credentials.master_username,
                    hostname.as_deref(),
                    cluster.port,
                    cluster.db_name.as_deref(),
                );

                Self {
                    primary: None,
                    cluster: Some(cluster_outputs),
                    replicas: BTreeMap::new(),
                    endpoint: writer_endpoint,
                    hostname,
                    port: cluster.port,
                    database_name: cluster.db_name.clone(),
                    master_username: cluster.credentials.master_username.clone(),
                    master_password_secret_arn: record.and_then(|r| r.secret_arn.clone()),
                    security_group_id,
                    subnet_group_name: graph.subnet_group.name.clone(),
                    subnet_group_arn,
                    parameter_group_name: instance_parameter_group
                        .as_ref()
                        .map(|pg| pg.name.clone()),
                    cluster_parameter_group_name: cluster_parameter_group
                        .as_ref()
                        .map(|pg| pg.name.clone()),
                    option_group_name: None,
                    monitoring_role_arn,
                    connection_string_mysql: mysql_conn,
                    connection_string_postgres: postgres_conn,
                }
            }
        }
    }
}

/// Family-gated example connection strings
///
/// Only the active family's template is populated; the other stays empty.
fn connection_strings(
    family: EngineFamily,
    username: &str,
    hostname: Option<&str>,
    port: u16,
    db_name: Option<&str>,
) -> (Option<String>, Option<String>) {
    let host = match hostname {
        Some(host) => host,
        None => return (None, None),
    };
    let database = db_name.unwrap_or("");

    match family {
        EngineFamily::MysqlCompatible => (
            Some(format!("mysql://{}@{}:{}/{}", username, host, port, database)),
            None,
        ),
        EngineFamily::PostgresCompatible => (
            None,
            Some(format!(
                "postgresql://{}@{}:{}/{}",
                username, host, port, database
            )),
        ),
    }
}
