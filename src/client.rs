// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! HTTP client for the PCE sec_policy API
//!
//! Large ruleset collections are served through the PCE's async-job
//! protocol: the listing request carries `Prefer: respond-async`, the
//! server answers `202 Accepted` with a job-status `Location`, and the
//! client polls that resource until the job reaches a terminal state, then
//! fetches the result body. Servers that ignore the preference answer
//! synchronously and the poll loop never runs.

use std::time::{Duration, Instant};

use reqwest::header::LOCATION;
use reqwest::StatusCode;
use tracing::{debug, info, warn};

use crate::config::PceConfig;
use crate::error::FetchError;
use crate::model::{JobState, JobStatusDocument, Ruleset};

/// Client for one PCE organization's draft-policy rulesets.
pub struct PceClient {
    http: reqwest::Client,
    origin: String,
    base_url: String,
    rule_sets_url: String,
    api_key: String,
    api_secret: String,
    job_deadline: Duration,
    poll_interval: Duration,
    max_poll_attempts: u32,
    connect_retries: u32,
}

impl PceClient {
    /// Build a client from connection settings. The per-call timeout and
    /// TLS-verification toggle are baked into the underlying HTTP client.
    pub fn new(config: &PceConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .danger_accept_invalid_certs(config.disable_tls_verify)
            .build()
            .map_err(|e| FetchError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            origin: config.origin(),
            base_url: config.base_url(),
            rule_sets_url: format!("{}{}", config.base_url(), config.rule_sets_path()),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            job_deadline: config.job_deadline,
            poll_interval: config.poll_interval,
            max_poll_attempts: config.max_poll_attempts,
            connect_retries: config.connect_retries,
        })
    }

    /// Fetch every draft-policy ruleset for the configured organization.
    ///
    /// Issues the listing request with the async preference, then either
    /// returns the synchronous body directly or drives the job poll loop to
    /// completion. Fails with [`FetchError::Timeout`] once the overall
    /// deadline or the poll-attempt ceiling is exhausted; never returns a
    /// partial collection.
    pub async fn fetch_rulesets(&self) -> Result<Vec<Ruleset>, FetchError> {
        let started = Instant::now();

        debug!("GET {}", self.rule_sets_url);
        let response = self
            .send(self.get(&self.rule_sets_url).header("Prefer", "respond-async"))
            .await?;

        let status = response.status();
        if status == StatusCode::ACCEPTED {
            let job_url = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(|v| self.absolute_url(v))
                .ok_or_else(|| {
                    FetchError::Protocol(
                        "202 Accepted response carried no Location header".to_string(),
                    )
                })?;
            info!("ruleset listing accepted as async job: {}", job_url);
            return self.poll_job(&job_url, started).await;
        }

        if status.is_success() {
            debug!("server answered the listing synchronously");
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        Err(FetchError::Transport(format!(
            "ruleset listing returned HTTP {}: {}",
            status, body
        )))
    }

    /// Poll the job-status resource until a terminal state, the overall
    /// deadline, or the attempt ceiling. The ceiling is a hard backstop
    /// independent of clock behavior; both limits are checked every
    /// iteration.
    async fn poll_job(&self, job_url: &str, started: Instant) -> Result<Vec<Ruleset>, FetchError> {
        let mut polls: u32 = 0;

        while started.elapsed() < self.job_deadline && polls < self.max_poll_attempts {
            let response = self.send(self.get(job_url)).await?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(FetchError::Transport(format!(
                    "job status request returned HTTP {}: {}",
                    status, body
                )));
            }

            let doc: JobStatusDocument = response.json().await?;
            match JobState::parse(&doc.status) {
                JobState::Completed => {
                    let href = doc
                        .result
                        .map(|r| r.href)
                        .filter(|h| !h.is_empty())
                        .ok_or_else(|| {
                            FetchError::Protocol(
                                "job completed without a result href".to_string(),
                            )
                        })?;
                    let result_url = self.absolute_url(&href);
                    debug!("job done after {} polls, fetching {}", polls, result_url);
                    return self.fetch_result(&result_url).await;
                }
                JobState::Failed | JobState::Cancelled => {
                    let detail = doc
                        .error
                        .unwrap_or_else(|| format!("server reported status '{}'", doc.status));
                    return Err(FetchError::JobFailed(detail));
                }
                JobState::Pending(state) => {
                    debug!("job still '{}' after {} polls", state, polls);
                    polls += 1;
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }

        if polls >= self.max_poll_attempts {
            Err(FetchError::Timeout(format!(
                "async job made no progress within {} status polls (attempt ceiling)",
                polls
            )))
        } else {
            Err(FetchError::Timeout(format!(
                "async job did not finish within the {:?} deadline",
                self.job_deadline
            )))
        }
    }

    async fn fetch_result(&self, result_url: &str) -> Result<Vec<Ruleset>, FetchError> {
        let response = self.send(self.get(result_url)).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Transport(format!(
                "job result request returned HTTP {}: {}",
                status, body
            )));
        }
        Ok(response.json().await?)
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.http
            .get(url)
            .basic_auth(&self.api_key, Some(&self.api_secret))
    }

    /// Send with a bounded connection-retry budget. Only connect failures
    /// are retried; protocol-level outcomes and timeouts pass straight
    /// through to the caller.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, FetchError> {
        let mut attempt: u32 = 0;
        loop {
            let cloned = request.try_clone().ok_or_else(|| {
                FetchError::Transport("request body is not cloneable for retry".to_string())
            })?;
            match cloned.send().await {
                Ok(response) => return Ok(response),
                Err(err) if err.is_connect() && attempt < self.connect_retries => {
                    attempt += 1;
                    warn!("connection attempt {} failed: {}; retrying", attempt, err);
                    tokio::time::sleep(Duration::from_millis(250)).await;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// The PCE hands back hrefs as `/api/{v}/...` paths; older builds omit
    /// the `/api` prefix. Absolute URLs pass through untouched.
    fn absolute_url(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            href.to_string()
        } else if href.starts_with("/api/") {
            format!("{}{}", self.origin, href)
        } else {
            format!("{}{}", self.base_url, href)
        }
    }
}
