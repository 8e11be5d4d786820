use std::fmt;

use serde::{Deserialize, Serialize};

/// Feature areas that own a list view and an add/edit dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FeatureArea {
    Patient,
    Checkup,
    VitalSign,
    User,
    Reference,
}

impl FeatureArea {
    pub const ALL: [FeatureArea; 5] = [
        FeatureArea::Patient,
        FeatureArea::Checkup,
        FeatureArea::VitalSign,
        FeatureArea::User,
        FeatureArea::Reference,
    ];

    /// Entity name used by the transport for this feature's collection.
    pub fn entity_name(&self) -> &'static str {
        match self {
            Self::Patient => "patients",
            Self::Checkup => "checkups",
            Self::VitalSign => "vitalSigns",
            Self::User => "users",
            Self::Reference => "references",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Patient => "Patient",
            Self::Checkup => "Checkup",
            Self::VitalSign => "Vital Signs",
            Self::User => "User",
            Self::Reference => "Reference",
        }
    }
}

impl fmt::Display for FeatureArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
