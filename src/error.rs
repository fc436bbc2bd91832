// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Error taxonomy for the ruleset fetch workflow

use thiserror::Error;

/// Failures surfaced by [`crate::PceClient`]. All variants are terminal for
/// the current fetch; nothing is retried at this level.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network or connection failure on any call.
    #[error("Transport failure: {0}")]
    Transport(String),

    /// Overall deadline, poll-attempt ceiling, or a per-call timeout.
    #[error("Timed out: {0}")]
    Timeout(String),

    /// A server response was missing an expected field or could not be decoded.
    #[error("Protocol violation: {0}")]
    Protocol(String),

    /// The server explicitly reported the async job as failed or cancelled.
    #[error("Async job failed: {0}")]
    JobFailed(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(format!("request timed out: {}", err))
        } else if err.is_decode() {
            FetchError::Protocol(format!("undecodable response body: {}", err))
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}
