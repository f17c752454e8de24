// Copyright (c) 2025 - Cowboy AI, Inc.
//! Database Deployment Domain Models
//!
//! Value objects with validation invariants for the topology resolver.
//! All value objects are immutable and validated on construction.
//!
//! # Value Objects with Invariants
//!
//! - [`DbIdentifier`] - deployment identifier (1-63 chars, lowercase DNS style)
//! - [`VpcId`] / [`SubnetId`] / [`SecurityGroupId`] - provider resource ids
//! - [`CidrBlock`] - IPv4/IPv6 range with mandatory prefix
//! - [`Engine`] - supported engine taxonomy with per-engine default tables

pub mod engine;
pub mod identifier;
pub mod network;

// Re-export value objects
pub use engine::{Engine, EngineFamily};
pub use identifier::{DbIdentifier, IdentifierError};
pub use network::{CidrBlock, NetworkError, SecurityGroupId, SubnetId, VpcId};
