//! Checkup and history entries.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnosis {
    /// ICD-style code when one was picked.
    #[serde(default)]
    pub code: Option<String>,
    pub description: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Treatment {
    pub description: String,
    #[serde(default)]
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub name: String,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
}

impl Medication {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Vital signs taken during a checkup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalSigns {
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub temperature_c: Option<f64>,
    pub pulse_bpm: Option<u32>,
    pub respiratory_rate: Option<u32>,
    pub systolic: Option<u32>,
    pub diastolic: Option<u32>,
}

impl VitalSigns {
    /// Body-mass index rounded to one decimal, when height and weight are known.
    pub fn bmi(&self) -> Option<f64> {
        let height_m = self.height_cm? / 100.0;
        let weight = self.weight_kg?;
        if height_m <= 0.0 || weight <= 0.0 {
            return None;
        }
        let bmi = weight / (height_m * height_m);
        Some((bmi * 10.0).round() / 10.0)
    }

    /// Blood pressure as `systolic/diastolic`.
    pub fn blood_pressure(&self) -> Option<String> {
        match (self.systolic, self.diastolic) {
            (Some(sys), Some(dia)) => Some(format!("{sys}/{dia}")),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bmi_from_height_and_weight() {
        let vitals = VitalSigns {
            height_cm: Some(180.0),
            weight_kg: Some(81.0),
            ..Default::default()
        };
        assert_eq!(vitals.bmi(), Some(25.0));
    }

    #[test]
    fn bmi_requires_positive_height() {
        let vitals = VitalSigns {
            height_cm: Some(0.0),
            weight_kg: Some(70.0),
            ..Default::default()
        };
        assert_eq!(vitals.bmi(), None);
        assert_eq!(VitalSigns::default().bmi(), None);
    }

    #[test]
    fn blood_pressure_needs_both_readings() {
        let mut vitals = VitalSigns {
            systolic: Some(120),
            ..Default::default()
        };
        assert_eq!(vitals.blood_pressure(), None);
        vitals.diastolic = Some(80);
        assert_eq!(vitals.blood_pressure().as_deref(), Some("120/80"));
    }
}
