//! The typed patient intake form.
//!
//! All wizard steps share one `PatientIntake` value, so navigating between
//! steps never loses data.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::record::RecordId;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub birth_date: Option<NaiveDate>,
    /// Reference option id, `0` when unselected.
    pub gender_id: RecordId,
    pub civil_status_id: RecordId,
    pub address: String,
    pub contact_number: String,
}

impl PersonalInfo {
    /// "First Middle Last" with empty parts skipped.
    pub fn full_name(&self) -> String {
        [&self.first_name, &self.middle_name, &self.last_name]
            .iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Completed years on `today`, `None` without a birth date or when born after `today`.
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        let birth = self.birth_date?;
        if birth > today {
            return None;
        }
        let mut years = today.year() - birth.year();
        if (today.month(), today.day()) < (birth.month(), birth.day()) {
            years -= 1;
        }
        u32::try_from(years).ok()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FamilyHistory {
    /// Checked illness option ids.
    pub illnesses: Vec<RecordId>,
    pub others: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalHistory {
    pub illnesses: Vec<RecordId>,
    pub others: String,
    pub smoker: bool,
    pub alcohol: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientIntake {
    #[serde(flatten)]
    pub personal: PersonalInfo,
    pub family_history: FamilyHistory,
    pub personal_history: PersonalHistory,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn age_counts_completed_years() {
        let info = PersonalInfo {
            birth_date: Some(date(1990, 6, 15)),
            ..Default::default()
        };
        assert_eq!(info.age_on(date(2024, 6, 14)), Some(33));
        assert_eq!(info.age_on(date(2024, 6, 15)), Some(34));
    }

    #[test]
    fn age_is_none_for_future_birth_date() {
        let info = PersonalInfo {
            birth_date: Some(date(2030, 1, 1)),
            ..Default::default()
        };
        assert_eq!(info.age_on(date(2024, 1, 1)), None);
    }

    #[test]
    fn full_name_skips_blank_parts() {
        let info = PersonalInfo {
            first_name: "Maria".into(),
            middle_name: "  ".into(),
            last_name: "Santos".into(),
            ..Default::default()
        };
        assert_eq!(info.full_name(), "Maria Santos");
    }

    #[test]
    fn intake_serializes_personal_fields_flat() {
        let intake = PatientIntake {
            personal: PersonalInfo {
                first_name: "Ana".into(),
                ..Default::default()
            },
            ..Default::default()
        };
        let value = serde_json::to_value(&intake).expect("serialize intake");
        assert_eq!(value["firstName"], "Ana");
        assert!(value["familyHistory"]["illnesses"].is_array());
    }
}
