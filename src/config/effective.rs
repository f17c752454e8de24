// Copyright (c) 2025 - Cowboy AI, Inc.
//! Derivation Engine - Configuration to EffectiveConfiguration
//!
//! Fills every optional field with its engine-aware default and applies the
//! cross-field overrides. Total on validated input: nothing here can fail.

use super::Configuration;
use serde::Serialize;

/// Effective (defaulted, derived) values for one resolution pass
///
/// Pure function of the [`Configuration`]; recomputed in full on every
/// pass. Cross-field overrides applied here:
/// - storage throughput is cleared unless the storage type is gp3
/// - a pinned availability zone is cleared under multi-AZ
/// - Performance Insights retention/KMS are cleared when PI is disabled
/// - the final snapshot name exists only when final snapshots are taken
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveConfiguration {
    /// Listener port (caller-supplied or the engine default)
    pub port: u16,

    /// Parameter-group family (caller-supplied or the engine default)
    pub parameter_family: String,

    /// Whether the engine resolves to a clustered topology
    pub is_cluster: bool,

    /// Storage throughput in MiB/s; present only for gp3
    pub storage_throughput_mibs: Option<u32>,

    /// Pinned availability zone; absent under multi-AZ
    pub availability_zone: Option<String>,

    /// Final snapshot name; absent when final snapshots are skipped
    pub final_snapshot_name: Option<String>,

    /// Performance Insights retention; absent when PI is disabled
    pub performance_insights_retention_days: Option<u32>,

    /// Performance Insights KMS key; absent when PI is disabled
    pub performance_insights_kms_key_id: Option<String>,

    /// Whether an enhanced-monitoring role must be materialized
    pub monitoring_role_required: bool,
}

impl EffectiveConfiguration {
    /// Derive effective values from a validated configuration
    pub fn derive(config: &Configuration) -> Self {
        let engine = config.engine;

        let port = config.database.port.unwrap_or_else(|| engine.default_port());

        let parameter_family = config
            .parameter_group
            .family
            .clone()
            .unwrap_or_else(|| engine.default_parameter_family().to_string());

        // Throughput is a gp3-only knob; drop it everywhere else even if
        // the caller supplied a value.
        let storage_throughput_mibs = match config.storage.storage_type {
            super::StorageType::Gp3 => config.storage.throughput_mibs,
            _ => None,
        };

        // Multi-AZ and a pinned zone are mutually exclusive; multi-AZ wins.
        let availability_zone = if config.high_availability.multi_az {
            None
        } else {
            config.high_availability.availability_zone.clone()
        };

        let final_snapshot_name = if config.backup.skip_final_snapshot {
            None
        } else {
            Some(
                config
                    .backup
                    .final_snapshot_name
                    .clone()
                    .unwrap_or_else(|| format!("{}-final-snapshot", config.identifier)),
            )
        };

        let (performance_insights_retention_days, performance_insights_kms_key_id) =
            if config.monitoring.performance_insights_enabled {
                (
                    config.monitoring.performance_insights_retention_days,
                    config.monitoring.performance_insights_kms_key_id.clone(),
                )
            } else {
                (None, None)
            };

        let monitoring_role_required = config.monitoring.enhanced_monitoring_interval_seconds > 0;

        let effective = Self {
            port,
            parameter_family,
            is_cluster: engine.is_cluster(),
            storage_throughput_mibs,
            availability_zone,
            final_snapshot_name,
            performance_insights_retention_days,
            performance_insights_kms_key_id,
            monitoring_role_required,
        };

        tracing::debug!(
            identifier = %config.identifier,
            engine = %engine,
            port = effective.port,
            is_cluster = effective.is_cluster,
            "derived effective configuration"
        );

        effective
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageType;
    use crate::domain::Engine;
    use test_case::test_case;

    fn config_for(engine: &str) -> Configuration {
        serde_json::from_value(serde_json::json!({
            "identifier": "my-db",
            "engine": engine,
            "engine_version": "8.0",
            "instance_class": "db.t3.micro",
            "network": {
                "vpc_id": "vpc-0a1b2c3d",
                "subnet_ids": ["subnet-aaa1", "subnet-bbb2"]
            }
        }))
        .unwrap()
    }

    #[test_case("mysql", 3306 ; "mysql default port")]
    #[test_case("mariadb", 3306 ; "mariadb default port")]
    #[test_case("aurora-mysql", 3306 ; "aurora mysql default port")]
    #[test_case("postgres", 5432 ; "postgres default port")]
    #[test_case("aurora-postgresql", 5432 ; "aurora postgresql default port")]
    fn test_default_port_per_engine(engine: &str, expected: u16) {
        let effective = EffectiveConfiguration::derive(&config_for(engine));
        assert_eq!(effective.port, expected);
    }

    #[test]
    fn test_supplied_port_wins() {
        let mut config = config_for("mysql");
        config.database.port = Some(3307);
        let effective = EffectiveConfiguration::derive(&config);
        assert_eq!(effective.port, 3307);
    }

    #[test_case("mysql", "mysql8.0")]
    #[test_case("aurora-postgresql", "aurora-postgresql15")]
    fn test_default_parameter_family(engine: &str, expected: &str) {
        let effective = EffectiveConfiguration::derive(&config_for(engine));
        assert_eq!(effective.parameter_family, expected);
    }

    #[test]
    fn test_supplied_parameter_family_wins() {
        let mut config = config_for("postgres");
        config.parameter_group.family = Some("postgres16".to_string());
        let effective = EffectiveConfiguration::derive(&config);
        assert_eq!(effective.parameter_family, "postgres16");
    }

    #[test]
    fn test_throughput_cleared_unless_gp3() {
        let mut config = config_for("mysql");
        config.storage.throughput_mibs = Some(250);

        config.storage.storage_type = StorageType::Gp3;
        assert_eq!(
            EffectiveConfiguration::derive(&config).storage_throughput_mibs,
            Some(250)
        );

        config.storage.storage_type = StorageType::Gp2;
        assert_eq!(
            EffectiveConfiguration::derive(&config).storage_throughput_mibs,
            None
        );
    }

    #[test]
    fn test_multi_az_clears_pinned_zone() {
        let mut config = config_for("mysql");
        config.high_availability.availability_zone = Some("us-east-1a".to_string());

        let effective = EffectiveConfiguration::derive(&config);
        assert_eq!(effective.availability_zone.as_deref(), Some("us-east-1a"));

        config.high_availability.multi_az = true;
        let effective = EffectiveConfiguration::derive(&config);
        assert_eq!(effective.availability_zone, None);
    }

    #[test]
    fn test_final_snapshot_name_defaulting() {
        let config = config_for("mysql");
        let effective = EffectiveConfiguration::derive(&config);
        assert_eq!(
            effective.final_snapshot_name.as_deref(),
            Some("my-db-final-snapshot")
        );

        let mut config = config_for("mysql");
        config.backup.skip_final_snapshot = true;
        config.backup.final_snapshot_name = Some("explicit".to_string());
        let effective = EffectiveConfiguration::derive(&config);
        assert_eq!(effective.final_snapshot_name, None);
    }

    #[test]
    fn test_performance_insights_fields_cleared_when_disabled() {
        let mut config = config_for("postgres");
        config.monitoring.performance_insights_retention_days = Some(7);
        config.monitoring.performance_insights_kms_key_id = Some("key-1".to_string());

        let effective = EffectiveConfiguration::derive(&config);
        assert_eq!(effective.performance_insights_retention_days, None);
        assert_eq!(effective.performance_insights_kms_key_id, None);

        config.monitoring.performance_insights_enabled = true;
        let effective = EffectiveConfiguration::derive(&config);
        assert_eq!(effective.performance_insights_retention_days, Some(7));
    }

    #[test]
    fn test_monitoring_role_flag() {
        let mut config = config_for("mysql");
        assert!(!EffectiveConfiguration::derive(&config).monitoring_role_required);

        config.monitoring.enhanced_monitoring_interval_seconds = 60;
        assert!(EffectiveConfiguration::derive(&config).monitoring_role_required);
    }

    #[test]
    fn test_cluster_flag_follows_engine() {
        assert!(!EffectiveConfiguration::derive(&config_for("mysql")).is_cluster);
        assert!(EffectiveConfiguration::derive(&config_for("aurora-mysql")).is_cluster);
        assert_eq!(config_for("aurora-mysql").engine, Engine::AuroraMysql);
    }
}
