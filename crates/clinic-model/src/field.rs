//! Field addressing and declarative field descriptors.
//!
//! The rendering layer addresses form fields by dotted strings such as
//! `"familyHistory.others"`. Inside the core those strings are parsed once into
//! the closed [`FieldPath`] enum and read or written through [`FieldAccess`].

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ModelError;
use crate::intake::PatientIntake;
use crate::record::RecordId;

// =============================================================================
// FIELD PATH
// =============================================================================

/// Every addressable field of the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldPath {
    FirstName,
    MiddleName,
    LastName,
    BirthDate,
    GenderId,
    CivilStatusId,
    Address,
    ContactNumber,
    FamilyIllnesses,
    FamilyOthers,
    PersonalIllnesses,
    PersonalOthers,
    Smoker,
    Alcohol,
}

impl FieldPath {
    pub const ALL: [FieldPath; 14] = [
        FieldPath::FirstName,
        FieldPath::MiddleName,
        FieldPath::LastName,
        FieldPath::BirthDate,
        FieldPath::GenderId,
        FieldPath::CivilStatusId,
        FieldPath::Address,
        FieldPath::ContactNumber,
        FieldPath::FamilyIllnesses,
        FieldPath::FamilyOthers,
        FieldPath::PersonalIllnesses,
        FieldPath::PersonalOthers,
        FieldPath::Smoker,
        FieldPath::Alcohol,
    ];

    /// Dotted path used by the rendering layer.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::MiddleName => "middleName",
            Self::LastName => "lastName",
            Self::BirthDate => "birthDate",
            Self::GenderId => "genderId",
            Self::CivilStatusId => "civilStatusId",
            Self::Address => "address",
            Self::ContactNumber => "contactNumber",
            Self::FamilyIllnesses => "familyHistory.illnesses",
            Self::FamilyOthers => "familyHistory.others",
            Self::PersonalIllnesses => "personalHistory.illnesses",
            Self::PersonalOthers => "personalHistory.others",
            Self::Smoker => "personalHistory.smoker",
            Self::Alcohol => "personalHistory.alcohol",
        }
    }

    /// Kind of value stored at this path.
    pub fn value_kind(&self) -> &'static str {
        match self {
            Self::BirthDate => "date",
            Self::GenderId | Self::CivilStatusId => "number",
            Self::FamilyIllnesses | Self::PersonalIllnesses => "ids",
            Self::Smoker | Self::Alcohol => "flag",
            _ => "text",
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldPath {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|path| path.as_str() == s.trim())
            .ok_or_else(|| ModelError::UnknownFieldPath(s.to_string()))
    }
}

impl Serialize for FieldPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// FIELD VALUE
// =============================================================================

/// A value read from or written to a form field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldValue {
    #[default]
    Empty,
    Text(String),
    Number(i64),
    Date(NaiveDate),
    Flag(bool),
    Ids(Vec<RecordId>),
}

impl FieldValue {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Text(_) => "text",
            Self::Number(_) => "number",
            Self::Date(_) => "date",
            Self::Flag(_) => "flag",
            Self::Ids(_) => "ids",
        }
    }

    /// Blank text, zero ids and empty lists count as empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(text) => text.trim().is_empty(),
            Self::Number(n) => *n == 0,
            Self::Ids(ids) => ids.is_empty(),
            Self::Date(_) | Self::Flag(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_ids(&self) -> Option<&[RecordId]> {
        match self {
            Self::Ids(ids) => Some(ids),
            _ => None,
        }
    }

    /// JSON form sent to the transport.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Empty => Value::Null,
            Self::Text(text) => Value::from(text.as_str()),
            Self::Number(n) => Value::from(*n),
            Self::Date(date) => Value::from(date.format("%Y-%m-%d").to_string()),
            Self::Flag(flag) => Value::from(*flag),
            Self::Ids(ids) => Value::from(ids.clone()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<Vec<RecordId>> for FieldValue {
    fn from(value: Vec<RecordId>) -> Self {
        Self::Ids(value)
    }
}

// =============================================================================
// FIELD ACCESS
// =============================================================================

/// Typed read/write access to a form by field path.
pub trait FieldAccess {
    fn get_field(&self, path: FieldPath) -> FieldValue;

    /// Write a value; `FieldValue::Empty` clears the field.
    fn set_field(&mut self, path: FieldPath, value: FieldValue) -> Result<(), ModelError>;
}

fn mismatch(path: FieldPath, found: &FieldValue) -> ModelError {
    ModelError::ValueKind {
        path,
        expected: path.value_kind(),
        found: found.kind(),
    }
}

fn text_slot(value: FieldValue, path: FieldPath) -> Result<String, ModelError> {
    match value {
        FieldValue::Empty => Ok(String::new()),
        FieldValue::Text(text) => Ok(text),
        other => Err(mismatch(path, &other)),
    }
}

fn number_slot(value: FieldValue, path: FieldPath) -> Result<RecordId, ModelError> {
    match value {
        FieldValue::Empty => Ok(0),
        FieldValue::Number(n) => Ok(n),
        other => Err(mismatch(path, &other)),
    }
}

fn ids_slot(value: FieldValue, path: FieldPath) -> Result<Vec<RecordId>, ModelError> {
    match value {
        FieldValue::Empty => Ok(Vec::new()),
        FieldValue::Ids(ids) => Ok(ids),
        other => Err(mismatch(path, &other)),
    }
}

fn flag_slot(value: FieldValue, path: FieldPath) -> Result<bool, ModelError> {
    match value {
        FieldValue::Empty => Ok(false),
        FieldValue::Flag(flag) => Ok(flag),
        other => Err(mismatch(path, &other)),
    }
}

fn text_value(text: &str) -> FieldValue {
    if text.is_empty() {
        FieldValue::Empty
    } else {
        FieldValue::Text(text.to_string())
    }
}

impl FieldAccess for PatientIntake {
    fn get_field(&self, path: FieldPath) -> FieldValue {
        let personal = &self.personal;
        match path {
            FieldPath::FirstName => text_value(&personal.first_name),
            FieldPath::MiddleName => text_value(&personal.middle_name),
            FieldPath::LastName => text_value(&personal.last_name),
            FieldPath::BirthDate => personal
                .birth_date
                .map_or(FieldValue::Empty, FieldValue::Date),
            FieldPath::GenderId => FieldValue::Number(personal.gender_id),
            FieldPath::CivilStatusId => FieldValue::Number(personal.civil_status_id),
            FieldPath::Address => text_value(&personal.address),
            FieldPath::ContactNumber => text_value(&personal.contact_number),
            FieldPath::FamilyIllnesses => FieldValue::Ids(self.family_history.illnesses.clone()),
            FieldPath::FamilyOthers => text_value(&self.family_history.others),
            FieldPath::PersonalIllnesses => {
                FieldValue::Ids(self.personal_history.illnesses.clone())
            }
            FieldPath::PersonalOthers => text_value(&self.personal_history.others),
            FieldPath::Smoker => FieldValue::Flag(self.personal_history.smoker),
            FieldPath::Alcohol => FieldValue::Flag(self.personal_history.alcohol),
        }
    }

    fn set_field(&mut self, path: FieldPath, value: FieldValue) -> Result<(), ModelError> {
        match path {
            FieldPath::FirstName => self.personal.first_name = text_slot(value, path)?,
            FieldPath::MiddleName => self.personal.middle_name = text_slot(value, path)?,
            FieldPath::LastName => self.personal.last_name = text_slot(value, path)?,
            FieldPath::BirthDate => {
                self.personal.birth_date = match value {
                    FieldValue::Empty => None,
                    FieldValue::Date(date) => Some(date),
                    other => return Err(mismatch(path, &other)),
                }
            }
            FieldPath::GenderId => self.personal.gender_id = number_slot(value, path)?,
            FieldPath::CivilStatusId => self.personal.civil_status_id = number_slot(value, path)?,
            FieldPath::Address => self.personal.address = text_slot(value, path)?,
            FieldPath::ContactNumber => self.personal.contact_number = text_slot(value, path)?,
            FieldPath::FamilyIllnesses => self.family_history.illnesses = ids_slot(value, path)?,
            FieldPath::FamilyOthers => self.family_history.others = text_slot(value, path)?,
            FieldPath::PersonalIllnesses => {
                self.personal_history.illnesses = ids_slot(value, path)?
            }
            FieldPath::PersonalOthers => self.personal_history.others = text_slot(value, path)?,
            FieldPath::Smoker => self.personal_history.smoker = flag_slot(value, path)?,
            FieldPath::Alcohol => self.personal_history.alcohol = flag_slot(value, path)?,
        }
        Ok(())
    }
}

// =============================================================================
// FIELD DESCRIPTORS
// =============================================================================

/// Control type of a rendered field, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ControlKind {
    TextField {
        #[serde(default)]
        multiline: bool,
    },
    DropDown {
        entity_id: RecordId,
    },
    DatePicker {
        #[serde(default)]
        disable_future: bool,
    },
    Checkbox,
    #[serde(rename = "multi-checkbox")]
    MultiCheckbox {
        entity_id: RecordId,
    },
}

impl ControlKind {
    /// Reference entity feeding this control, if any.
    pub fn entity_id(&self) -> Option<RecordId> {
        match self {
            Self::DropDown { entity_id } | Self::MultiCheckbox { entity_id } => Some(*entity_id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Grid columns the control spans (out of 12).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_span: Option<u8>,
}

impl ExtendedProps {
    pub fn is_empty(&self) -> bool {
        self.placeholder.is_none() && self.max_length.is_none() && self.grid_span.is_none()
    }
}

/// Declarative description of one input, turned into a control by the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub label: String,
    pub db_field: FieldPath,
    #[serde(flatten)]
    pub control: ControlKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "ExtendedProps::is_empty")]
    pub extended_props: ExtendedProps,
}

impl FieldDescriptor {
    fn new(label: impl Into<String>, db_field: FieldPath, control: ControlKind) -> Self {
        Self {
            label: label.into(),
            db_field,
            control,
            required: false,
            extended_props: ExtendedProps::default(),
        }
    }

    pub fn text(label: impl Into<String>, db_field: FieldPath) -> Self {
        Self::new(label, db_field, ControlKind::TextField { multiline: false })
    }

    pub fn text_area(label: impl Into<String>, db_field: FieldPath) -> Self {
        Self::new(label, db_field, ControlKind::TextField { multiline: true })
    }

    pub fn drop_down(label: impl Into<String>, db_field: FieldPath, entity_id: RecordId) -> Self {
        Self::new(label, db_field, ControlKind::DropDown { entity_id })
    }

    pub fn date_picker(label: impl Into<String>, db_field: FieldPath) -> Self {
        Self::new(
            label,
            db_field,
            ControlKind::DatePicker {
                disable_future: true,
            },
        )
    }

    pub fn checkbox(label: impl Into<String>, db_field: FieldPath) -> Self {
        Self::new(label, db_field, ControlKind::Checkbox)
    }

    pub fn multi_checkbox(
        label: impl Into<String>,
        db_field: FieldPath,
        entity_id: RecordId,
    ) -> Self {
        Self::new(label, db_field, ControlKind::MultiCheckbox { entity_id })
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn max_length(mut self, max: usize) -> Self {
        self.extended_props.max_length = Some(max);
        self
    }

    #[must_use]
    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.extended_props.placeholder = Some(text.into());
        self
    }

    #[must_use]
    pub fn span(mut self, columns: u8) -> Self {
        self.extended_props.grid_span = Some(columns);
        self
    }
}
