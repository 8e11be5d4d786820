//! Identity read from the ambient session.
//!
//! Authentication happens elsewhere; the core only reads who is signed in and
//! with which role.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::feature::FeatureArea;
use crate::record::RecordId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Doctor,
    Nurse,
    Staff,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Doctor => "Doctor",
            Self::Nurse => "Nurse",
            Self::Staff => "Staff",
        }
    }

    /// Whether this role may create or edit records of the given feature.
    pub fn can_manage(&self, area: FeatureArea) -> bool {
        match (self, area) {
            (Self::Admin, _) => true,
            (_, FeatureArea::User | FeatureArea::Reference) => false,
            (Self::Staff, FeatureArea::Checkup | FeatureArea::VitalSign) => false,
            _ => true,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "doctor" => Ok(Self::Doctor),
            "nurse" => Ok(Self::Nurse),
            "staff" => Ok(Self::Staff),
            _ => Err(format!("Unknown role: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: RecordId,
    pub role: Role,
}

/// Ambient session object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub current_user: Option<CurrentUser>,
}

impl Session {
    pub fn signed_in(id: RecordId, role: Role) -> Self {
        Self {
            current_user: Some(CurrentUser { id, role }),
        }
    }

    pub fn user_id(&self) -> Option<RecordId> {
        self.current_user.map(|user| user.id)
    }

    pub fn role(&self) -> Option<Role> {
        self.current_user.map(|user| user.role)
    }

    /// Anonymous sessions manage nothing.
    pub fn can_manage(&self, area: FeatureArea) -> bool {
        self.role().is_some_and(|role| role.can_manage(area))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_manages_everything() {
        for area in FeatureArea::ALL {
            assert!(Role::Admin.can_manage(area));
        }
    }

    #[test]
    fn staff_cannot_record_checkups() {
        assert!(!Role::Staff.can_manage(FeatureArea::Checkup));
        assert!(!Role::Staff.can_manage(FeatureArea::VitalSign));
        assert!(Role::Staff.can_manage(FeatureArea::Patient));
    }

    #[test]
    fn only_admin_manages_users() {
        assert!(!Role::Doctor.can_manage(FeatureArea::User));
        assert!(!Role::Nurse.can_manage(FeatureArea::Reference));
    }

    #[test]
    fn anonymous_session_manages_nothing() {
        let session = Session::default();
        assert!(!session.can_manage(FeatureArea::Patient));
        assert_eq!(session.user_id(), None);
    }

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("Doctor".parse::<Role>(), Ok(Role::Doctor));
        assert!("surgeon".parse::<Role>().is_err());
    }
}
