//! Filter state and its normalized snapshot.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const TEXT_FIELD: &str = "textField";
const INPUT_VALUE: &str = "inputValue";
const DROP_DOWN: &str = "dropDown";
const DATE_RANGE: &str = "dateRange";
const START: &str = "start";
const END: &str = "end";

/// Loosely-typed, path-addressed filter state owned by one list view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterState(Map<String, Value>);

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an arbitrary JSON value; anything but an object is an empty state.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn as_json(&self) -> Value {
        Value::Object(self.0.clone())
    }

    /// Safe nested lookup; any missing or non-object step yields `None`.
    fn lookup(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        let mut current = self.0.get(*first)?;
        for key in rest {
            current = current.as_object()?.get(*key)?;
        }
        Some(current)
    }

    fn namespace_mut(&mut self, key: &str) -> &mut Map<String, Value> {
        let slot = self
            .0
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        match slot {
            Value::Object(map) => map,
            _ => unreachable!("namespace slot was just replaced by an object"),
        }
    }

    /// Split the state into its three recognized namespaces.
    pub fn extract(&self) -> FilterSnapshot {
        let text_input = self
            .lookup(&[TEXT_FIELD, INPUT_VALUE])
            .and_then(Value::as_str)
            .map(str::to_string);

        let dropdown_values = self.lookup(&[DROP_DOWN]).and_then(Value::as_object).map(|map| {
            map.iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect::<BTreeMap<_, _>>()
        });

        let date_range = self
            .lookup(&[DATE_RANGE])
            .and_then(Value::as_object)
            .map(|range| DateRange {
                start: range.get(START).and_then(Value::as_str).and_then(parse_date),
                end: range.get(END).and_then(Value::as_str).and_then(parse_date),
            });

        FilterSnapshot {
            text_input,
            dropdown_values,
            date_range,
        }
    }

    pub fn set_text_input(&mut self, text: impl Into<String>) {
        self.namespace_mut(TEXT_FIELD)
            .insert(INPUT_VALUE.to_string(), Value::String(text.into()));
    }

    pub fn dropdown_value(&self, field: &str) -> Option<&Value> {
        self.lookup(&[DROP_DOWN, field])
    }

    pub fn set_dropdown(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.namespace_mut(DROP_DOWN)
            .insert(field.into(), value.into());
    }

    pub fn set_date_range(&mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) {
        let range = self.namespace_mut(DATE_RANGE);
        for (key, bound) in [(START, start), (END, end)] {
            match bound {
                Some(date) => {
                    let formatted = date.format("%Y-%m-%d").to_string();
                    range.insert(key.to_string(), Value::String(formatted));
                }
                None => {
                    range.remove(key);
                }
            }
        }
    }

    /// Drop every constraint.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_unconstrained(&self) -> bool {
        self.extract().is_unconstrained()
    }
}

/// Inclusive date bounds; either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn is_bounded(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }
}

/// The three namespaces of a [`FilterState`], each independently optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSnapshot {
    pub text_input: Option<String>,
    pub dropdown_values: Option<BTreeMap<String, Value>>,
    pub date_range: Option<DateRange>,
}

impl FilterSnapshot {
    /// Lowercased search needle, `None` when there is nothing to search for.
    pub fn text_needle(&self) -> Option<String> {
        self.text_input
            .as_deref()
            .filter(|text| !text.is_empty())
            .map(str::to_lowercase)
    }

    /// Dropdown constraints with falsy selections removed.
    ///
    /// `0`, `""`, `false`, `null` and `[]` all mean "show all" for that key.
    pub fn active_dropdowns(&self) -> Vec<(&str, &Value)> {
        self.dropdown_values
            .iter()
            .flatten()
            .filter(|(_, value)| !is_falsy(value))
            .map(|(key, value)| (key.as_str(), value))
            .collect()
    }

    pub fn active_date_range(&self) -> Option<DateRange> {
        self.date_range.filter(DateRange::is_bounded)
    }

    pub fn is_unconstrained(&self) -> bool {
        self.text_needle().is_none()
            && self.active_dropdowns().is_empty()
            && self.active_date_range().is_none()
    }
}

/// JavaScript-style falsiness, extended to empty lists.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(_) => false,
    }
}

/// Parse `YYYY-MM-DD`, also accepting the date prefix of an RFC 3339 datetime.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    let prefix = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extract_from_empty_state_yields_nothing() {
        let snapshot = FilterState::new().extract();
        assert_eq!(snapshot, FilterSnapshot::default());
        assert!(snapshot.is_unconstrained());
    }

    #[test]
    fn extract_tolerates_wrong_shapes() {
        let state = FilterState::from_json(json!({
            "textField": "oops",
            "dropDown": [1, 2],
            "dateRange": { "start": "not a date" }
        }));
        let snapshot = state.extract();
        assert_eq!(snapshot.text_input, None);
        assert_eq!(snapshot.dropdown_values, None);
        assert_eq!(snapshot.date_range, Some(DateRange::default()));
        assert!(snapshot.is_unconstrained());
    }

    #[test]
    fn extract_reads_all_namespaces() {
        let state = FilterState::from_json(json!({
            "textField": { "inputValue": "Jo" },
            "dropDown": { "roleId": 2, "statusId": 0 },
            "dateRange": { "start": "2024-01-01", "end": "2024-01-31T23:59:59Z" }
        }));
        let snapshot = state.extract();
        assert_eq!(snapshot.text_needle().as_deref(), Some("jo"));
        assert_eq!(snapshot.active_dropdowns(), vec![("roleId", &json!(2))]);
        let range = snapshot.active_date_range().unwrap();
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2024, 1, 31));
    }

    #[test]
    fn setters_create_namespaces() {
        let mut state = FilterState::new();
        state.set_text_input("ann");
        state.set_dropdown("roleId", 3);
        state.set_date_range(NaiveDate::from_ymd_opt(2024, 2, 1), None);
        assert_eq!(
            state.as_json(),
            json!({
                "textField": { "inputValue": "ann" },
                "dropDown": { "roleId": 3 },
                "dateRange": { "start": "2024-02-01" }
            })
        );
        assert_eq!(state.extract().text_input.as_deref(), Some("ann"));
        assert_eq!(state.dropdown_value("roleId"), Some(&json!(3)));
    }

    #[test]
    fn setter_replaces_non_object_namespace() {
        let mut state = FilterState::from_json(json!({ "dropDown": 5 }));
        state.set_dropdown("roleId", 1);
        assert_eq!(state.dropdown_value("roleId"), Some(&json!(1)));
    }

    #[test]
    fn falsy_values() {
        for value in [json!(0), json!(0.0), json!(""), json!(false), json!(null), json!([])] {
            assert!(is_falsy(&value), "{value} should be falsy");
        }
        for value in [json!(1), json!("a"), json!(true), json!([0]), json!({})] {
            assert!(!is_falsy(&value), "{value} should be truthy");
        }
    }

    #[test]
    fn date_range_bounds_are_inclusive() {
        let range = DateRange {
            start: NaiveDate::from_ymd_opt(2024, 1, 1),
            end: NaiveDate::from_ymd_opt(2024, 1, 31),
        };
        assert!(range.contains(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
        assert!(range.contains(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()));
    }
}
