//! Workload-rule extraction
//!
//! Pure transformation from a fetched [`Ruleset`] to flat report records.
//! A rule contributes one record per workload-tagged consumer; providers
//! and services are rule-wide and repeat across those records.

use crate::model::{Actor, Rule, Ruleset, ServiceRef, WorkloadRef};

/// One report row, immutable once built. The three list fields stay as
/// ordered sequences here and are only joined with `"; "` at the output
/// boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadRuleRecord {
    pub ruleset_href: String,
    pub ruleset_name: String,
    pub rule_href: String,
    pub description: String,
    pub enabled: String,
    pub providers: Vec<String>,
    pub consumers: Vec<String>,
    pub ingress_services: Vec<String>,
}

/// Extract one record per workload-tagged consumer across every rule in
/// the ruleset. Rules without workload consumers contribute nothing.
pub fn extract_workload_rules(ruleset: &Ruleset) -> Vec<WorkloadRuleRecord> {
    let mut records = Vec::new();

    for rule in &ruleset.rules {
        for consumer in &rule.consumers {
            if let Actor::Workload(workload) = consumer {
                records.push(build_record(ruleset, rule, workload));
            }
        }
    }

    records
}

fn build_record(ruleset: &Ruleset, rule: &Rule, workload: &WorkloadRef) -> WorkloadRuleRecord {
    WorkloadRuleRecord {
        ruleset_href: ruleset.href.clone(),
        ruleset_name: ruleset.name.clone(),
        rule_href: rule.href.clone(),
        description: rule.description.clone(),
        enabled: match rule.enabled {
            Some(true) => "True".to_string(),
            Some(false) => "False".to_string(),
            None => String::new(),
        },
        providers: format_providers(&rule.providers),
        consumers: format_consumers(&rule.consumers, workload),
        ingress_services: format_services(&rule.ingress_services),
    }
}

fn format_providers(providers: &[Actor]) -> Vec<String> {
    let mut out = Vec::new();
    for provider in providers {
        match provider {
            Actor::Label(label) => out.push(format!("Label: {}={}", label.key, label.value)),
            Actor::IpList(ip_list) => out.push(format!("IP List: {}", ip_list.name)),
            Actor::VirtualService(vs) => out.push(format!("Virtual Service: {}", vs.name)),
            // Workloads, actor sets and unknown tags are not provider
            // shapes this report renders; skip them without complaint.
            _ => {}
        }
    }
    out
}

/// The matched workload's descriptor comes first, then every label and
/// actor-set entry from the full consumer list in original order.
fn format_consumers(consumers: &[Actor], matched: &WorkloadRef) -> Vec<String> {
    let mut out = vec![format!(
        "Workload: {} ({})",
        matched.hostname.as_deref().unwrap_or("Unknown"),
        matched.href
    )];
    for consumer in consumers {
        match consumer {
            Actor::Label(label) => out.push(format!("Label: {}={}", label.key, label.value)),
            Actor::Actors(actors) => out.push(format!("Actors: {}", actors)),
            _ => {}
        }
    }
    out
}

fn format_services(services: &[ServiceRef]) -> Vec<String> {
    let mut out = Vec::new();
    for service in services {
        match service {
            ServiceRef::Named { name, .. } => {
                out.push(format!("Service: {}", name.as_deref().unwrap_or("Unknown")))
            }
            ServiceRef::PortProto {
                port,
                to_port,
                proto,
            } => {
                let mut entry = format!("Port: {}", port);
                if let Some(to_port) = to_port {
                    entry.push_str(&format!("-{}", to_port));
                }
                entry.push_str(&format!(", Proto: {}", scalar_string(proto.as_ref())));
                out.push(entry);
            }
            ServiceRef::Unrecognized => {}
        }
    }
    out
}

/// Render a JSON scalar the way it appears on the wire: strings without
/// quotes, numbers as-is, absent values as empty.
fn scalar_string(value: Option<&serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ruleset(json: &str) -> Ruleset {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_end_to_end_example() {
        let ruleset = parse_ruleset(
            r#"{"href":"/rs/1","name":"RS1","rules":[{"href":"/r/1","description":"d","enabled":true,
                "providers":[{"label":{"key":"app","value":"web"}}],
                "consumers":[{"workload":{"hostname":"h1","href":"/wl/1"}}],
                "ingress_services":[{"port":443,"proto":"tcp"}]}]}"#,
        );

        let records = extract_workload_rules(&ruleset);
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.ruleset_href, "/rs/1");
        assert_eq!(record.ruleset_name, "RS1");
        assert_eq!(record.rule_href, "/r/1");
        assert_eq!(record.description, "d");
        assert_eq!(record.enabled, "True");
        assert_eq!(record.providers, vec!["Label: app=web"]);
        assert_eq!(record.consumers, vec!["Workload: h1 (/wl/1)"]);
        assert_eq!(record.ingress_services, vec!["Port: 443, Proto: tcp"]);
    }

    #[test]
    fn test_two_workload_consumers_yield_two_records() {
        let ruleset = parse_ruleset(
            r#"{"href":"/rs/2","name":"RS2","rules":[{"href":"/r/2","enabled":false,
                "consumers":[
                    {"workload":{"hostname":"h1","href":"/wl/1"}},
                    {"label":{"key":"env","value":"prod"}},
                    {"workload":{"hostname":"h2","href":"/wl/2"}}
                ]}]}"#,
        );

        let records = extract_workload_rules(&ruleset);
        assert_eq!(records.len(), 2);

        assert_eq!(
            records[0].consumers,
            vec!["Workload: h1 (/wl/1)", "Label: env=prod"]
        );
        assert_eq!(
            records[1].consumers,
            vec!["Workload: h2 (/wl/2)", "Label: env=prod"]
        );
        assert_eq!(records[0].enabled, "False");
    }

    #[test]
    fn test_unrecognized_provider_tag_is_skipped() {
        let ruleset = parse_ruleset(
            r#"{"href":"/rs/3","name":"RS3","rules":[{"href":"/r/3",
                "providers":[
                    {"unknown_type":{"x":1}},
                    {"ip_list":{"name":"corp"}},
                    {"virtual_service":{"name":"vs1"}}
                ],
                "consumers":[{"workload":{"hostname":"h1","href":"/wl/1"}}]}]}"#,
        );

        let records = extract_workload_rules(&ruleset);
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].providers,
            vec!["IP List: corp", "Virtual Service: vs1"]
        );
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let ruleset = parse_ruleset(
            r#"{"href":"/rs/4","name":"RS4","rules":[{"href":"/r/4",
                "consumers":[{"workload":{"hostname":"h1","href":"/wl/1"}},{"actors":"ams"}],
                "ingress_services":[{"href":"/svc/1","name":"HTTPS"},{"port":8000,"to_port":8100,"proto":6}]}]}"#,
        );

        let first = extract_workload_rules(&ruleset);
        let second = extract_workload_rules(&ruleset);
        assert_eq!(first, second);

        assert_eq!(
            first[0].consumers,
            vec!["Workload: h1 (/wl/1)", "Actors: ams"]
        );
        assert_eq!(
            first[0].ingress_services,
            vec!["Service: HTTPS", "Port: 8000-8100, Proto: 6"]
        );
    }

    #[test]
    fn test_missing_optionals_degrade_to_defaults() {
        let ruleset = parse_ruleset(
            r#"{"rules":[{
                "consumers":[{"workload":{"href":"/wl/1"}}],
                "ingress_services":[{"href":"/svc/1"}]}]}"#,
        );

        let records = extract_workload_rules(&ruleset);
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.ruleset_href, "");
        assert_eq!(record.description, "");
        assert_eq!(record.enabled, "");
        assert_eq!(record.consumers, vec!["Workload: Unknown (/wl/1)"]);
        assert_eq!(record.ingress_services, vec!["Service: Unknown"]);
    }

    #[test]
    fn test_rules_without_workload_consumers_contribute_nothing() {
        let ruleset = parse_ruleset(
            r#"{"href":"/rs/5","name":"RS5","rules":[
                {"href":"/r/5","consumers":[{"label":{"key":"env","value":"dev"}}]},
                {"href":"/r/6","consumers":[]}
            ]}"#,
        );
        assert!(extract_workload_rules(&ruleset).is_empty());

        let empty = parse_ruleset(r#"{"href":"/rs/6","name":"RS6","rules":[]}"#);
        assert!(extract_workload_rules(&empty).is_empty());
    }
}
