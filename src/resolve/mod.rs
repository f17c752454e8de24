// Copyright (c) 2025 - Cowboy AI, Inc.
//! Topology Resolution - Mode Selection and Graph Emission
//!
//! `resolve` is the crate's entry point: validate, derive, branch into
//! exactly one topology mode, emit the resource set with its ordering
//! edges. The whole pass is a pure function of the configuration; the same
//! input always yields a byte-identical graph.

pub mod cluster;
pub mod standalone;

use crate::config::{validate, Configuration, EffectiveConfiguration, ValidatedInputs};
use crate::errors::ResolverResult;
use crate::graph::{
    tags_with_name, EgressRule, IngressRule, MonitoringRoleSpec, OrderingEdge, ResourceGraph,
    ResourceKind, ResourceRef, SecurityGroupSpec, SubnetGroupSpec,
};
use thiserror::Error;
use tracing::{debug, info};

/// Service principal the enhanced-monitoring role trusts
const MONITORING_SERVICE: &str = "monitoring.rds.amazonaws.com";

/// Managed policy granting enhanced-monitoring permissions
const MONITORING_POLICY: &str = "service-role/AmazonRDSEnhancedMonitoringRole";

/// Derivation failure during graph emission
///
/// The only failure mode past validation: option-group emission needs a
/// `MAJOR.MINOR` prefix on the engine version.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DerivationError {
    #[error("Engine version {0:?} has no leading MAJOR.MINOR prefix")]
    NoMajorVersion(String),
}

/// Extract the leading `MAJOR.MINOR` numeric prefix of an engine version
///
/// `"8.0.35"` yields `"8.0"`; `"15"` and `"latest"` fail.
pub(crate) fn major_engine_version(version: &str) -> Result<String, DerivationError> {
    let mut chars = version.chars().peekable();

    let mut major = String::new();
    while let Some(c) = chars.peek().filter(|c| c.is_ascii_digit()) {
        major.push(*c);
        chars.next();
    }

    if major.is_empty() || chars.next() != Some('.') {
        return Err(DerivationError::NoMajorVersion(version.to_string()));
    }

    let mut minor = String::new();
    while let Some(c) = chars.peek().filter(|c| c.is_ascii_digit()) {
        minor.push(*c);
        chars.next();
    }

    if minor.is_empty() {
        return Err(DerivationError::NoMajorVersion(version.to_string()));
    }

    Ok(format!("{}.{}", major, minor))
}

/// Mode-independent resources shared by both emitters
pub(crate) struct CommonResources {
    pub subnet_group: SubnetGroupSpec,
    pub security_group: SecurityGroupSpec,
    pub monitoring_role: Option<MonitoringRoleSpec>,
}

/// Resolve a configuration into its declarative resource graph
///
/// Either a complete, internally consistent graph is returned or an error;
/// no partial graphs. The emitted ordering edges (replica after primary,
/// member after cluster, monitoring role before any monitored resource)
/// are validated for integrity before the graph is handed back.
pub fn resolve(config: &Configuration) -> ResolverResult<ResourceGraph> {
    let inputs = validate(config)?;
    let effective = EffectiveConfiguration::derive(config);
    let common = emit_common(config, &inputs, &effective);

    let (topology, edges) = if effective.is_cluster {
        cluster::emit(config, &inputs, &effective, &common)
    } else {
        standalone::emit(config, &inputs, &effective, &common)?
    };

    let graph = ResourceGraph {
        subnet_group: common.subnet_group,
        security_group: common.security_group,
        monitoring_role: common.monitoring_role,
        topology,
        edges,
    };

    graph.validate_edges()?;

    info!(
        identifier = %inputs.identifier,
        engine = %config.engine,
        cluster = effective.is_cluster,
        resources = graph.resource_refs().len(),
        "resolved resource graph"
    );

    Ok(graph)
}

fn emit_common(
    config: &Configuration,
    inputs: &ValidatedInputs,
    effective: &EffectiveConfiguration,
) -> CommonResources {
    let identifier = &inputs.identifier;

    let subnet_group_name = identifier.child("subnet-group");
    let subnet_group = SubnetGroupSpec {
        name: subnet_group_name.clone(),
        description: format!("Subnet group for {}", identifier),
        subnet_ids: inputs.subnet_ids.clone(),
        tags: tags_with_name(&config.tags, &subnet_group_name),
    };

    let mut ingress = Vec::new();
    if !inputs.allowed_cidr_blocks.is_empty() {
        // Single rule listing every allowed CIDR range
        ingress.push(IngressRule::Cidr {
            port: effective.port,
            cidr_blocks: inputs.allowed_cidr_blocks.clone(),
            description: format!("Database access for {}", identifier),
        });
    }
    // One rule per peer security group, not batched
    for sg in &inputs.allowed_security_group_ids {
        ingress.push(IngressRule::PeerGroup {
            port: effective.port,
            source_security_group_id: sg.clone(),
            description: format!("Database access from {}", sg),
        });
    }

    let security_group_name = identifier.child("sg");
    let security_group = SecurityGroupSpec {
        name: security_group_name.clone(),
        description: format!("Access control for {}", identifier),
        vpc_id: inputs.vpc_id.clone(),
        ingress,
        egress: vec![EgressRule::AllowAll {
            description: format!("All outbound traffic for {}", identifier),
        }],
        tags: tags_with_name(&config.tags, &security_group_name),
    };

    let monitoring_role = if effective.monitoring_role_required {
        let role_name = identifier.child("monitoring-role");
        Some(MonitoringRoleSpec {
            name: role_name.clone(),
            assume_role_service: MONITORING_SERVICE.to_string(),
            managed_policy: MONITORING_POLICY.to_string(),
            tags: tags_with_name(&config.tags, &role_name),
        })
    } else {
        None
    };

    debug!(
        identifier = %identifier,
        ingress_rules = security_group.ingress.len(),
        monitoring_role = monitoring_role.is_some(),
        "emitted common resources"
    );

    CommonResources {
        subnet_group,
        security_group,
        monitoring_role,
    }
}

/// Ordering edge from a monitored resource to the monitoring role
///
/// Enhanced monitoring cannot reference a role that is not yet authorized,
/// so the role must be fully attached first.
pub(crate) fn monitoring_edge(
    common: &CommonResources,
    resource: ResourceRef,
) -> Option<OrderingEdge> {
    common.monitoring_role.as_ref().map(|role| {
        OrderingEdge::new(
            resource,
            ResourceRef::new(ResourceKind::MonitoringRole, &role.name),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_major_engine_version_extraction() {
        assert_eq!(major_engine_version("8.0").unwrap(), "8.0");
        assert_eq!(major_engine_version("8.0.35").unwrap(), "8.0");
        assert_eq!(major_engine_version("10.11.6").unwrap(), "10.11");
    }

    #[test]
    fn test_major_engine_version_failures() {
        assert!(major_engine_version("15").is_err());
        assert!(major_engine_version("latest").is_err());
        assert!(major_engine_version("8.").is_err());
        assert!(major_engine_version(".5").is_err());
        assert!(major_engine_version("").is_err());
    }
}
