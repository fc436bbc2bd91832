// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! PCE connection configuration
//!
//! All settings come from the environment (optionally seeded from a `.env`
//! file). The struct is built once at process start and passed by reference
//! into the client; nothing here is global or mutable.
//!
//! # Environment
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `PCE_HOST` | (required) | scheme + hostname, e.g. `https://pce.example.com` |
//! | `PCE_PORT` | `443` | API port |
//! | `PCE_ORG_ID` | `1` | organization id |
//! | `PCE_API_KEY` | (required) | API key username |
//! | `PCE_API_SECRET` | (required) | API key secret |
//! | `PCE_API_VERSION` | `v2` | API version path segment |
//! | `PCE_DISABLE_TLS` | `false` | disable TLS certificate verification |
//! | `PCE_REQUEST_TIMEOUT_SECS` | `30` | per-call HTTP timeout |
//! | `PCE_JOB_DEADLINE_SECS` | `300` | overall async-job deadline |
//! | `PCE_POLL_INTERVAL_SECS` | `2` | wait between job-status polls |
//! | `PCE_MAX_POLL_ATTEMPTS` | `60` | hard ceiling on status polls |
//! | `PCE_CONNECT_RETRIES` | `3` | connection-level retry budget |

use std::time::Duration;

use anyhow::{Context, Result};

/// Connection and polling settings for one PCE.
#[derive(Debug, Clone)]
pub struct PceConfig {
    /// Scheme and hostname, without port (`https://pce.example.com`).
    pub host: String,
    pub port: u16,
    pub org_id: u32,
    pub api_key: String,
    pub api_secret: String,
    /// API version path segment, e.g. `v2`.
    pub api_version: String,
    /// Skip TLS certificate verification (lab PCEs with self-signed certs).
    pub disable_tls_verify: bool,
    /// Timeout for each individual HTTP call, independent of `job_deadline`.
    pub request_timeout: Duration,
    /// Wall-clock budget for the whole async-job exchange.
    pub job_deadline: Duration,
    pub poll_interval: Duration,
    pub max_poll_attempts: u32,
    /// Connection-level retry budget for the transport layer.
    pub connect_retries: u32,
}

impl PceConfig {
    /// Load configuration from the environment, seeding from `.env` if one
    /// is present.
    pub fn from_env() -> Result<Self> {
        // Best-effort: a missing .env file is not an error.
        dotenvy::dotenv().ok();

        let host = std::env::var("PCE_HOST")
            .context("PCE_HOST environment variable not set")?;
        let api_key = std::env::var("PCE_API_KEY")
            .context("PCE_API_KEY environment variable not set")?;
        let api_secret = std::env::var("PCE_API_SECRET")
            .context("PCE_API_SECRET environment variable not set")?;

        Ok(Self {
            host,
            port: env_parse("PCE_PORT", 443)?,
            org_id: env_parse("PCE_ORG_ID", 1)?,
            api_key,
            api_secret,
            api_version: std::env::var("PCE_API_VERSION").unwrap_or_else(|_| "v2".to_string()),
            disable_tls_verify: env_bool("PCE_DISABLE_TLS", false)?,
            request_timeout: Duration::from_secs(env_parse("PCE_REQUEST_TIMEOUT_SECS", 30)?),
            job_deadline: Duration::from_secs(env_parse("PCE_JOB_DEADLINE_SECS", 300)?),
            poll_interval: Duration::from_secs(env_parse("PCE_POLL_INTERVAL_SECS", 2)?),
            max_poll_attempts: env_parse("PCE_MAX_POLL_ATTEMPTS", 60)?,
            connect_retries: env_parse("PCE_CONNECT_RETRIES", 3)?,
        })
    }

    /// Scheme, host and port: `https://pce.example.com:8443`.
    pub fn origin(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// API root: `https://pce.example.com:8443/api/v2`.
    pub fn base_url(&self) -> String {
        format!("{}/api/{}", self.origin(), self.api_version)
    }

    /// Path of the draft-policy rulesets collection, relative to `base_url`.
    pub fn rule_sets_path(&self) -> String {
        format!("/orgs/{}/sec_policy/draft/rule_sets", self.org_id)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(val) => val
            .parse()
            .with_context(|| format!("Invalid value for {}: '{}'", name, val)),
        Err(_) => Ok(default),
    }
}

fn env_bool(name: &str, default: bool) -> Result<bool> {
    match std::env::var(name) {
        Ok(val) => match val.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => anyhow::bail!("Invalid value for {}: '{}'. Expected true/false.", name, val),
        },
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> PceConfig {
        PceConfig {
            host: "https://pce.example.com".to_string(),
            port: 8443,
            org_id: 12,
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
            api_version: "v2".to_string(),
            disable_tls_verify: false,
            request_timeout: Duration::from_secs(30),
            job_deadline: Duration::from_secs(300),
            poll_interval: Duration::from_secs(2),
            max_poll_attempts: 60,
            connect_retries: 3,
        }
    }

    #[test]
    fn test_url_helpers() {
        let config = test_config();
        assert_eq!(config.origin(), "https://pce.example.com:8443");
        assert_eq!(config.base_url(), "https://pce.example.com:8443/api/v2");
        assert_eq!(config.rule_sets_path(), "/orgs/12/sec_policy/draft/rule_sets");
    }
}
