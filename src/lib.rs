// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! PCE workload-rule report library - exposes testable components
//!
//! # Architecture
//!
//! - **Layer:** Library root
//! - **Purpose:** Fetch draft-policy rulesets from a PCE and extract rules
//!   whose consumers are workloads

pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod model;
pub mod report;

pub use client::PceClient;
pub use config::PceConfig;
pub use error::FetchError;
pub use extract::{extract_workload_rules, WorkloadRuleRecord};
