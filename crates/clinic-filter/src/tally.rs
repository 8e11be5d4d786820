//! Dashboard tallies over a record list.

use std::collections::BTreeMap;

use clinic_model::Record;
use serde_json::Value;

/// Bucket label for records without a value.
pub const UNSPECIFIED: &str = "Unspecified";

/// Count records per display value of `field`.
///
/// Nested reference objects are grouped by their `name`. List-valued fields
/// count once per element, so totals can exceed the record count.
pub fn count_by(records: &[Record], field: &str) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        match record.get(field) {
            Some(Value::Array(items)) if !items.is_empty() => {
                for item in items {
                    *counts.entry(display_value(Some(item))).or_insert(0) += 1;
                }
            }
            value => *counts.entry(display_value(value)).or_insert(0) += 1,
        }
    }
    counts
}

fn display_value(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) if !text.trim().is_empty() => text.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(true)) => "Yes".to_string(),
        Some(Value::Bool(false)) => "No".to_string(),
        Some(Value::Object(nested)) => nested
            .get("name")
            .and_then(Value::as_str)
            .map_or_else(|| UNSPECIFIED.to_string(), str::to_string),
        _ => UNSPECIFIED.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(values: Vec<Value>) -> Vec<Record> {
        values
            .into_iter()
            .map(|value| Record::try_from(value).unwrap())
            .collect()
    }

    #[test]
    fn counts_by_nested_name() {
        let data = records(vec![
            json!({ "gender": { "id": 1, "name": "Female" } }),
            json!({ "gender": { "id": 1, "name": "Female" } }),
            json!({ "gender": { "id": 2, "name": "Male" } }),
            json!({}),
        ]);
        let counts = count_by(&data, "gender");
        assert_eq!(counts.get("Female"), Some(&2));
        assert_eq!(counts.get("Male"), Some(&1));
        assert_eq!(counts.get(UNSPECIFIED), Some(&1));
    }

    #[test]
    fn list_values_count_per_element() {
        let data = records(vec![
            json!({ "illnesses": [1, 2] }),
            json!({ "illnesses": [2] }),
            json!({ "illnesses": [] }),
        ]);
        let counts = count_by(&data, "illnesses");
        assert_eq!(counts.get("1"), Some(&1));
        assert_eq!(counts.get("2"), Some(&2));
        assert_eq!(counts.get(UNSPECIFIED), Some(&1));
    }
}
