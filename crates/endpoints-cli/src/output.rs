//! JSON shapes printed by `--dry-run`.

use endpoints_core::publish::PreparedRecord;
use serde_json::{json, Value};

/// Knack records as one JSON array, each entry tagged with the URL it would
/// be posted to.
pub fn knack_dry_run(target: &str, records: &[PreparedRecord]) -> Value {
    Value::Array(
        records
            .iter()
            .map(|prepared| {
                json!({
                    "target": target,
                    "format": prepared.format,
                    "record": prepared.record,
                })
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use endpoints_core::models::ExportFormat;
    use serde_json::Map;

    fn record(format: ExportFormat) -> PreparedRecord {
        let mut record = Map::new();
        record.insert("field_3".to_string(), json!(format.label()));
        PreparedRecord { format, record }
    }

    #[test]
    fn test_knack_dry_run_is_single_array() {
        let records = vec![
            record(ExportFormat::Csv),
            record(ExportFormat::ApiDocumentation),
        ];
        let value = knack_dry_run("https://api.knack.com/v1/objects/object_5/records", &records);

        let entries = value.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["format"], "CSV");
        assert_eq!(entries[1]["record"]["field_3"], "API Documentation");
        assert_eq!(
            entries[1]["target"],
            "https://api.knack.com/v1/objects/object_5/records"
        );

        // The printed text parses back as one JSON value.
        let text = serde_json::to_string_pretty(&value).unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, value);
    }

    #[test]
    fn test_knack_dry_run_empty() {
        assert_eq!(knack_dry_run("t", &[]), json!([]));
    }
}
