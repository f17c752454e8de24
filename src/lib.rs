//! Topology resolver for managed relational database deployments
//!
//! This crate turns a validated deployment configuration into a declarative
//! resource graph — network grouping, access control, credential and
//! monitoring support resources, and either a standalone database instance
//! with read replicas or an Aurora-style cluster with members — for an
//! external provisioning engine to reconcile against live infrastructure.
//!
//! Resolution is a pure, synchronous transformation: the same configuration
//! always produces a byte-identical graph, which is what keeps the external
//! engine's plan/apply/diff cycle sound.
//!
//! # Pipeline
//!
//! 1. [`config::validate`] — every field rule checked independently, all
//!    violations reported together
//! 2. [`config::EffectiveConfiguration::derive`] — engine-aware defaults
//!    and cross-field overrides
//! 3. [`resolve::resolve`] — mode selection (standalone vs. cluster) and
//!    graph emission with explicit ordering edges
//! 4. [`outputs::Outputs::from_materialized`] — projection of
//!    engine-reported identifiers and endpoints into the output surface

pub mod config;
pub mod domain;
pub mod errors;
pub mod graph;
pub mod outputs;
pub mod resolve;

// Re-export commonly used types
pub use config::{Configuration, EffectiveConfiguration, ValidationError, Violation};
pub use errors::{ResolverError, ResolverResult};
pub use graph::{DatabaseTopology, ResourceGraph};
pub use outputs::{MaterializedSet, Outputs, ResolverContext};
pub use resolve::{resolve, DerivationError};
