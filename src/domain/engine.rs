// Copyright (c) 2025 - Cowboy AI, Inc.
//! Database Engine Taxonomy and Per-Engine Defaults
//!
//! The supported engine set and the immutable lookup tables that drive
//! engine-aware derivation (default port, default parameter-group family).
//! Adding an engine is a one-line edit to the `DEFAULTS` table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported database engines
///
/// The engine name alone determines the deployment mode: `aurora-*` engines
/// resolve to a clustered topology, everything else to a standalone
/// instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Engine {
    Mysql,
    Postgres,
    Mariadb,
    AuroraMysql,
    AuroraPostgresql,
}

/// Engine family for client-facing conventions (connection strings)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineFamily {
    /// mysql, mariadb, aurora-mysql
    MysqlCompatible,
    /// postgres, aurora-postgresql
    PostgresCompatible,
}

/// Per-engine default values
///
/// One row per supported engine. The parameter-group family strings carry a
/// version suffix by provider convention; they are data owned by this table,
/// not logic.
struct EngineDefaults {
    engine: Engine,
    port: u16,
    parameter_family: &'static str,
}

const DEFAULTS: &[EngineDefaults] = &[
    EngineDefaults {
        engine: Engine::Mysql,
        port: 3306,
        parameter_family: "mysql8.0",
    },
    EngineDefaults {
        engine: Engine::Postgres,
        port: 5432,
        parameter_family: "postgres15",
    },
    EngineDefaults {
        engine: Engine::Mariadb,
        port: 3306,
        parameter_family: "mariadb10.11",
    },
    EngineDefaults {
        engine: Engine::AuroraMysql,
        port: 3306,
        parameter_family: "aurora-mysql8.0",
    },
    EngineDefaults {
        engine: Engine::AuroraPostgresql,
        port: 5432,
        parameter_family: "aurora-postgresql15",
    },
];

impl Engine {
    /// All supported engines
    pub const ALL: [Engine; 5] = [
        Engine::Mysql,
        Engine::Postgres,
        Engine::Mariadb,
        Engine::AuroraMysql,
        Engine::AuroraPostgresql,
    ];

    /// Get the canonical string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mysql => "mysql",
            Self::Postgres => "postgres",
            Self::Mariadb => "mariadb",
            Self::AuroraMysql => "aurora-mysql",
            Self::AuroraPostgresql => "aurora-postgresql",
        }
    }

    /// Whether this engine deploys as an Aurora-style cluster
    pub fn is_cluster(&self) -> bool {
        self.as_str().starts_with("aurora")
    }

    /// Whether this engine supports option groups (standalone mysql/mariadb)
    pub fn supports_option_groups(&self) -> bool {
        matches!(self, Self::Mysql | Self::Mariadb)
    }

    /// Client-facing engine family
    pub fn family(&self) -> EngineFamily {
        match self {
            Self::Mysql | Self::Mariadb | Self::AuroraMysql => EngineFamily::MysqlCompatible,
            Self::Postgres | Self::AuroraPostgresql => EngineFamily::PostgresCompatible,
        }
    }

    fn defaults(&self) -> &'static EngineDefaults {
        DEFAULTS
            .iter()
            .find(|d| d.engine == *self)
            .unwrap_or_else(|| unreachable!("defaults table covers every engine"))
    }

    /// Default listener port for this engine
    pub fn default_port(&self) -> u16 {
        self.defaults().port
    }

    /// Default parameter-group family for this engine
    pub fn default_parameter_family(&self) -> &'static str {
        self.defaults().parameter_family
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
