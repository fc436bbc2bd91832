// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Wire documents returned by the PCE sec_policy API
//!
//! Actors and service references arrive as objects whose single key names
//! the entity kind (`{"label": {...}}`, `{"workload": {...}}`). They are
//! resolved into explicit tagged unions once, at parse time, so consumers
//! match on a variant instead of re-probing JSON keys.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

/// A named collection of rules under draft policy.
#[derive(Debug, Clone, Deserialize)]
pub struct Ruleset {
    #[serde(default)]
    pub href: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

/// A permission entry: providers (sources), consumers (destinations) and
/// the services permitted between them.
#[derive(Debug, Clone, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub href: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub providers: Vec<Actor>,
    #[serde(default)]
    pub consumers: Vec<Actor>,
    #[serde(default)]
    pub ingress_services: Vec<ServiceRef>,
}

/// Key/value label payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LabelRef {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
}

/// Payload shared by IP lists and virtual services.
#[derive(Debug, Clone, Deserialize)]
pub struct NamedRef {
    #[serde(default)]
    pub name: String,
}

/// Workload payload; `hostname` is optional on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkloadRef {
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub href: String,
}

/// Any entity that can appear as a rule provider or consumer.
#[derive(Debug, Clone)]
pub enum Actor {
    Label(LabelRef),
    IpList(NamedRef),
    VirtualService(NamedRef),
    Workload(WorkloadRef),
    /// Actor-set shorthand, e.g. `"ams"` (all managed systems).
    Actors(String),
    /// Tag not recognized; kept so unknown entries skip cleanly downstream.
    Unrecognized,
}

impl<'de> Deserialize<'de> for Actor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        let obj = value
            .as_object()
            .ok_or_else(|| D::Error::custom("actor entry must be a JSON object"))?;

        if let Some(v) = obj.get("label") {
            let label = serde_json::from_value(v.clone()).map_err(D::Error::custom)?;
            return Ok(Actor::Label(label));
        }
        if let Some(v) = obj.get("ip_list") {
            let ip_list = serde_json::from_value(v.clone()).map_err(D::Error::custom)?;
            return Ok(Actor::IpList(ip_list));
        }
        if let Some(v) = obj.get("virtual_service") {
            let vs = serde_json::from_value(v.clone()).map_err(D::Error::custom)?;
            return Ok(Actor::VirtualService(vs));
        }
        if let Some(v) = obj.get("workload") {
            let workload = serde_json::from_value(v.clone()).map_err(D::Error::custom)?;
            return Ok(Actor::Workload(workload));
        }
        if let Some(v) = obj.get("actors") {
            let raw = match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            return Ok(Actor::Actors(raw));
        }

        Ok(Actor::Unrecognized)
    }
}

/// A permitted service: either a reference to a named service object or an
/// inline port/protocol spec.
#[derive(Debug, Clone)]
pub enum ServiceRef {
    Named {
        href: String,
        name: Option<String>,
    },
    PortProto {
        port: u16,
        to_port: Option<u16>,
        proto: Option<serde_json::Value>,
    },
    Unrecognized,
}

impl<'de> Deserialize<'de> for ServiceRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        let obj = value
            .as_object()
            .ok_or_else(|| D::Error::custom("service entry must be a JSON object"))?;

        // An href-bearing reference wins over an inline port spec.
        if let Some(href) = obj.get("href").and_then(|v| v.as_str()) {
            let name = obj
                .get("name")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string());
            return Ok(ServiceRef::Named {
                href: href.to_string(),
                name,
            });
        }

        if let Some(port) = obj.get("port") {
            let port = serde_json::from_value(port.clone()).map_err(D::Error::custom)?;
            let to_port = match obj.get("to_port") {
                Some(v) if !v.is_null() => {
                    Some(serde_json::from_value(v.clone()).map_err(D::Error::custom)?)
                }
                _ => None,
            };
            let proto = obj.get("proto").filter(|v| !v.is_null()).cloned();
            return Ok(ServiceRef::PortProto {
                port,
                to_port,
                proto,
            });
        }

        Ok(ServiceRef::Unrecognized)
    }
}

/// Body of the async job-status resource.
#[derive(Debug, Clone, Deserialize)]
pub struct JobStatusDocument {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub result: Option<JobResult>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobResult {
    #[serde(default)]
    pub href: String,
}

/// Job status values the poller acts on. Anything the server invents later
/// lands in `Pending` and keeps the poll loop running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Completed,
    Failed,
    Cancelled,
    Pending(String),
}

impl JobState {
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "completed" | "done" => JobState::Completed,
            "failed" => JobState::Failed,
            "cancelled" => JobState::Cancelled,
            other => JobState::Pending(other.to_string()),
        }
    }
}
