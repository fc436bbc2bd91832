// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # PCE Workload Rule Report
//!
//! Fetches every draft-policy ruleset from the configured PCE, extracts the
//! rules whose consumers are workloads, and writes one CSV row per matched
//! workload consumer.
//!
//! Connection settings come from `PCE_*` environment variables (see
//! `config.rs`), optionally seeded from a `.env` file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing::info;

use pce_rule_report::{extract_workload_rules, PceClient, PceConfig};

/// Report PCE draft-policy rules whose consumers are workloads
#[derive(Parser)]
#[command(name = "pce-rule-report")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path of the CSV report to write
    #[arg(
        short,
        long,
        env = "PCE_REPORT_OUTPUT",
        value_name = "FILE",
        default_value = "workload_rules.csv"
    )]
    output: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "PCE_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    let config = PceConfig::from_env().context("Failed to load PCE configuration")?;
    let client = PceClient::new(&config).context("Failed to build PCE client")?;

    println!("Fetching rulesets from {}...", config.base_url());
    let rulesets = client
        .fetch_rulesets()
        .await
        .context("Failed to fetch rulesets from the PCE")?;
    info!("retrieved {} rulesets", rulesets.len());
    println!("Retrieved {} rulesets", rulesets.len());

    // All-or-nothing: every ruleset is extracted before anything is written.
    let records: Vec<_> = rulesets.iter().flat_map(extract_workload_rules).collect();

    if records.is_empty() {
        println!("{}", "No rules with workload consumers found.".yellow());
        return Ok(());
    }

    pce_rule_report::report::write_csv(&records, &cli.output)
        .context("Failed to write CSV report")?;

    println!(
        "{}",
        format!(
            "✓ {} workload rules written to {}",
            records.len(),
            cli.output.display()
        )
        .green()
    );

    Ok(())
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}
