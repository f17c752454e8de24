// Copyright (c) 2025 - Cowboy AI, Inc.
//! Topology Resolution CLI
//!
//! Reads a JSON deployment configuration, resolves it, and prints the
//! declarative resource graph as pretty JSON for the provisioning engine.
//!
//! Run with: cargo run --bin resolve-topology -- config.json
//! Use `-` to read the configuration from stdin.

use anyhow::{bail, Context, Result};
use rds_topology::{resolve, Configuration, ResolverError};
use std::io::Read;
use tracing::info;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let path = match args.get(1).map(String::as_str) {
        Some(path) => path,
        None => bail!("usage: resolve-topology <config.json | ->"),
    };

    let raw = if path == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read configuration from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration file {}", path))?
    };

    let config: Configuration =
        serde_json::from_str(&raw).context("configuration is not valid JSON")?;

    let graph = match resolve(&config) {
        Ok(graph) => graph,
        Err(ResolverError::Validation(e)) => {
            eprintln!("configuration invalid:");
            for violation in &e.violations {
                eprintln!("  - {}", violation);
            }
            std::process::exit(1);
        }
        Err(e) => return Err(e).context("resolution failed"),
    };

    info!(
        identifier = %config.identifier,
        resources = graph.resource_refs().len(),
        "resolved"
    );

    println!(
        "{}",
        serde_json::to_string_pretty(&graph).context("failed to serialize resource graph")?
    );

    Ok(())
}
