//! CSV report writer

use std::path::Path;

use anyhow::{Context, Result};

use crate::extract::WorkloadRuleRecord;

const HEADERS: [&str; 8] = [
    "Ruleset Href",
    "Ruleset Name",
    "Rule Href",
    "Description",
    "Enabled",
    "Providers",
    "Consumers",
    "Ingress Services",
];

/// Write all records to `path` in one pass. Callers accumulate the full
/// record set first; nothing is written if an earlier stage failed.
pub fn write_csv(records: &[WorkloadRuleRecord], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create report file {:?}", path))?;

    writer.write_record(HEADERS)?;
    for record in records {
        let providers = record.providers.join("; ");
        let consumers = record.consumers.join("; ");
        let ingress_services = record.ingress_services.join("; ");
        writer.write_record([
            record.ruleset_href.as_str(),
            record.ruleset_name.as_str(),
            record.rule_href.as_str(),
            record.description.as_str(),
            record.enabled.as_str(),
            providers.as_str(),
            consumers.as_str(),
            ingress_services.as_str(),
        ])?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to flush report file {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> WorkloadRuleRecord {
        WorkloadRuleRecord {
            ruleset_href: "/rs/1".to_string(),
            ruleset_name: "Core, Services".to_string(),
            rule_href: "/r/1".to_string(),
            description: "allow web".to_string(),
            enabled: "True".to_string(),
            providers: vec!["Label: app=web".to_string()],
            consumers: vec![
                "Workload: h1 (/wl/1)".to_string(),
                "Label: env=prod".to_string(),
            ],
            ingress_services: vec!["Port: 443, Proto: tcp".to_string()],
        }
    }

    #[test]
    fn test_write_csv_headers_rows_and_quoting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workload_rules.csv");

        write_csv(&[sample_record()], &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Ruleset Href,Ruleset Name,Rule Href,Description,Enabled,Providers,Consumers,Ingress Services"
        );
        let row = lines.next().unwrap();
        // Name contains the delimiter, so it must be quoted.
        assert!(row.contains("\"Core, Services\""), "got '{}'", row);
        assert!(row.contains("Workload: h1 (/wl/1); Label: env=prod"));
        assert!(lines.next().is_none());
    }
}
