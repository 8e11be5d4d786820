//! Filter predicate evaluation.

use std::borrow::Cow;

use clinic_model::{Record, TIMEFRAME_CODE};
use serde_json::Value;
use tracing::debug;

use crate::state::{DateRange, FilterState, parse_date};

/// Evaluation options shared by every list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOptions {
    /// Record field the date range applies to.
    pub date_field: String,
    /// Dropdown keys that select a date bucket rather than a record value.
    /// The list view turns them into a `dateRange`; they never match fields.
    pub bucket_keys: Vec<String>,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            date_field: "createdAt".to_string(),
            bucket_keys: vec![TIMEFRAME_CODE.to_string()],
        }
    }
}

/// Narrow `records` by the constraints in `state` using default options.
///
/// Without any active constraint the input slice is returned borrowed.
pub fn filter_records<'a>(records: &'a [Record], state: Option<&FilterState>) -> Cow<'a, [Record]> {
    filter_records_with(records, state, &FilterOptions::default())
}

/// Narrow `records` by the constraints in `state`.
///
/// Dropdown constraints are checked before the text search, then the date
/// range. All constraints are conjunctive.
pub fn filter_records_with<'a>(
    records: &'a [Record],
    state: Option<&FilterState>,
    options: &FilterOptions,
) -> Cow<'a, [Record]> {
    let Some(state) = state else {
        return Cow::Borrowed(records);
    };
    let snapshot = state.extract();
    let mut dropdowns = snapshot.active_dropdowns();
    dropdowns.retain(|(field, _)| !options.bucket_keys.iter().any(|key| key == field));
    let needle = snapshot.text_needle();
    let range = snapshot.active_date_range();

    if dropdowns.is_empty() && needle.is_none() && range.is_none() {
        return Cow::Borrowed(records);
    }

    let narrowed: Vec<Record> = records
        .iter()
        .filter(|record| {
            dropdowns
                .iter()
                .all(|(field, expected)| field_matches(record.get(field), expected))
        })
        .filter(|record| needle.as_deref().is_none_or(|needle| text_matches(record, needle)))
        .filter(|record| range.is_none_or(|range| date_matches(record, &options.date_field, range)))
        .cloned()
        .collect();

    debug!(
        total = records.len(),
        kept = narrowed.len(),
        dropdown_constraints = dropdowns.len(),
        text_search = needle.is_some(),
        date_range = range.is_some(),
        "filtered records"
    );
    Cow::Owned(narrowed)
}

/// Exact-match check of one dropdown constraint against a record field.
fn field_matches(actual: Option<&Value>, expected: &Value) -> bool {
    let Some(actual) = actual else {
        return false;
    };
    match expected {
        // A list selection is a whitelist.
        Value::Array(allowed) => allowed.iter().any(|value| field_matches(Some(actual), value)),
        _ => match actual {
            Value::Array(items) => items.iter().any(|item| scalar_eq(item, expected)),
            _ => scalar_eq(actual, expected),
        },
    }
}

fn scalar_eq(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        // Nested reference objects compare on their id.
        (Value::Object(map), _) if !expected.is_object() => {
            map.get("id").is_some_and(|id| scalar_eq(id, expected))
        }
        _ => actual == expected,
    }
}

/// Case-insensitive substring match against string fields and nested `name`s.
fn text_matches(record: &Record, needle: &str) -> bool {
    record.fields().any(|(_, value)| match value {
        Value::String(text) => text.to_lowercase().contains(needle),
        Value::Object(nested) => nested
            .get("name")
            .and_then(Value::as_str)
            .is_some_and(|name| name.to_lowercase().contains(needle)),
        _ => false,
    })
}

fn date_matches(record: &Record, date_field: &str, range: DateRange) -> bool {
    record
        .get(date_field)
        .and_then(Value::as_str)
        .and_then(parse_date)
        .is_some_and(|date| range.contains(date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        Record::try_from(value).unwrap()
    }

    fn state(value: Value) -> FilterState {
        FilterState::from_json(value)
    }

    #[test]
    fn no_state_returns_input_borrowed() {
        let records = vec![record(json!({ "id": 1 }))];
        let result = filter_records(&records, None);
        assert!(matches!(result, Cow::Borrowed(_)));
    }

    #[test]
    fn falsy_only_state_returns_input_borrowed() {
        let records = vec![record(json!({ "id": 1 }))];
        let filter = state(json!({
            "textField": { "inputValue": "" },
            "dropDown": { "roleId": 0, "tags": [] }
        }));
        let result = filter_records(&records, Some(&filter));
        assert!(matches!(result, Cow::Borrowed(_)));
    }

    #[test]
    fn array_record_value_contains_selection() {
        let records = vec![
            record(json!({ "id": 1, "illnesses": [2, 5] })),
            record(json!({ "id": 2, "illnesses": [3] })),
        ];
        let filter = state(json!({ "dropDown": { "illnesses": 5 } }));
        let result = filter_records(&records, Some(&filter));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id(), Some(1));
    }

    #[test]
    fn list_selection_is_a_whitelist() {
        let records = vec![
            record(json!({ "id": 1, "statusId": 1 })),
            record(json!({ "id": 2, "statusId": 2 })),
            record(json!({ "id": 3, "statusId": 3 })),
        ];
        let filter = state(json!({ "dropDown": { "statusId": [1, 3] } }));
        let ids: Vec<_> = filter_records(&records, Some(&filter))
            .iter()
            .filter_map(Record::id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn numbers_compare_numerically() {
        let records = vec![record(json!({ "id": 1, "roleId": 2.0 }))];
        let filter = state(json!({ "dropDown": { "roleId": 2 } }));
        assert_eq!(filter_records(&records, Some(&filter)).len(), 1);
    }

    #[test]
    fn nested_reference_matches_on_id() {
        let records = vec![
            record(json!({ "id": 1, "role": { "id": 2, "name": "Doctor" } })),
            record(json!({ "id": 2, "role": { "id": 3, "name": "Nurse" } })),
        ];
        let filter = state(json!({ "dropDown": { "role": 3 } }));
        let result = filter_records(&records, Some(&filter));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id(), Some(2));
    }

    #[test]
    fn missing_field_fails_active_constraint() {
        let records = vec![record(json!({ "id": 1 }))];
        let filter = state(json!({ "dropDown": { "roleId": 2 } }));
        assert!(filter_records(&records, Some(&filter)).is_empty());
    }

    #[test]
    fn text_search_reads_nested_names() {
        let records = vec![
            record(json!({ "id": 1, "role": { "id": 2, "name": "Doctor" } })),
            record(json!({ "id": 2, "role": { "id": 3, "name": "Nurse" } })),
        ];
        let filter = state(json!({ "textField": { "inputValue": "DOC" } }));
        let result = filter_records(&records, Some(&filter));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id(), Some(1));
    }

    #[test]
    fn text_search_ignores_non_string_fields() {
        let records = vec![record(json!({ "id": 12, "age": 12 }))];
        let filter = state(json!({ "textField": { "inputValue": "12" } }));
        assert!(filter_records(&records, Some(&filter)).is_empty());
    }

    #[test]
    fn date_range_uses_configured_field() {
        let records = vec![
            record(json!({ "id": 1, "visitDate": "2024-03-01" })),
            record(json!({ "id": 2, "visitDate": "2024-04-15T08:30:00Z" })),
            record(json!({ "id": 3 })),
        ];
        let filter = state(json!({ "dateRange": { "start": "2024-04-01" } }));
        let options = FilterOptions {
            date_field: "visitDate".to_string(),
            ..FilterOptions::default()
        };
        let result = filter_records_with(&records, Some(&filter), &options);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id(), Some(2));
    }

    #[test]
    fn timeframe_selection_is_not_a_field_match() {
        let records = vec![
            record(json!({ "id": 1, "roleId": 2 })),
            record(json!({ "id": 2, "roleId": 3 })),
        ];
        let filter = state(json!({ "dropDown": { "timeframe": "week" } }));
        assert_eq!(filter_records(&records, Some(&filter)).len(), 2);

        let filter = state(json!({ "dropDown": { "timeframe": "week", "roleId": 3 } }));
        let result = filter_records(&records, Some(&filter));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id(), Some(2));

        let strict = FilterOptions {
            bucket_keys: Vec::new(),
            ..FilterOptions::default()
        };
        let filter = state(json!({ "dropDown": { "timeframe": "week" } }));
        assert!(filter_records_with(&records, Some(&filter), &strict).is_empty());
    }

    #[test]
    fn unbounded_date_range_is_no_constraint() {
        let records = vec![record(json!({ "id": 3 }))];
        let filter = state(json!({ "dateRange": { "start": "", "end": null } }));
        assert_eq!(filter_records(&records, Some(&filter)).len(), 1);
    }
}
