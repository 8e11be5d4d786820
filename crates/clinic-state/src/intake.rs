//! The patient intake wizard form.
//!
//! Steps are described by field descriptor tables; required and length rules
//! come from the tables, the remaining rules are checked here.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use clinic_model::{
    FieldAccess, FieldDescriptor, FieldPath, FieldValue, Medication, PatientIntake, Record,
    RecordId,
};
use clinic_reference::ReferenceCatalog;
use clinic_transport::encode_record;

use crate::entries::EntryList;
use crate::wizard::{FieldErrors, WizardForm};

/// Reference entity feeding the gender dropdown.
pub const GENDER_ENTITY: RecordId = 1;
/// Reference entity feeding the civil status dropdown.
pub const CIVIL_STATUS_ENTITY: RecordId = 2;
/// Reference entity feeding both illness checkbox groups.
pub const ILLNESS_ENTITY: RecordId = 3;

/// Maximum length of the free-text "others" fields.
pub const OTHERS_MAX_LENGTH: usize = 500;

const MEDICATIONS: &str = "medications";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntakeStep {
    PersonalInformation,
    FamilyHistory,
    PersonalHistory,
    Review,
}

impl IntakeStep {
    pub const ALL: [IntakeStep; 4] = [
        IntakeStep::PersonalInformation,
        IntakeStep::FamilyHistory,
        IntakeStep::PersonalHistory,
        IntakeStep::Review,
    ];

    const TITLES: [&'static str; 4] = [
        "Personal Information",
        "Family History",
        "Personal History",
        "Review",
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn title(&self) -> &'static str {
        Self::TITLES[*self as usize]
    }

    /// Fields rendered on this step. The review step has none.
    pub fn fields(&self) -> Vec<FieldDescriptor> {
        match self {
            Self::PersonalInformation => vec![
                FieldDescriptor::text("First Name", FieldPath::FirstName)
                    .required()
                    .span(4),
                FieldDescriptor::text("Middle Name", FieldPath::MiddleName).span(4),
                FieldDescriptor::text("Last Name", FieldPath::LastName)
                    .required()
                    .span(4),
                FieldDescriptor::date_picker("Birth Date", FieldPath::BirthDate)
                    .required()
                    .span(4),
                FieldDescriptor::drop_down("Gender", FieldPath::GenderId, GENDER_ENTITY)
                    .required()
                    .span(4),
                FieldDescriptor::drop_down(
                    "Civil Status",
                    FieldPath::CivilStatusId,
                    CIVIL_STATUS_ENTITY,
                )
                .span(4),
                FieldDescriptor::text_area("Address", FieldPath::Address).span(8),
                FieldDescriptor::text("Contact Number", FieldPath::ContactNumber)
                    .placeholder("+639171234567")
                    .span(4),
            ],
            Self::FamilyHistory => vec![
                FieldDescriptor::multi_checkbox(
                    "Illnesses",
                    FieldPath::FamilyIllnesses,
                    ILLNESS_ENTITY,
                ),
                FieldDescriptor::text_area("Others", FieldPath::FamilyOthers)
                    .max_length(OTHERS_MAX_LENGTH),
            ],
            Self::PersonalHistory => vec![
                FieldDescriptor::multi_checkbox(
                    "Illnesses",
                    FieldPath::PersonalIllnesses,
                    ILLNESS_ENTITY,
                ),
                FieldDescriptor::text_area("Others", FieldPath::PersonalOthers)
                    .max_length(OTHERS_MAX_LENGTH),
                FieldDescriptor::checkbox("Smoker", FieldPath::Smoker),
                FieldDescriptor::checkbox("Drinks alcohol", FieldPath::Alcohol),
            ],
            Self::Review => Vec::new(),
        }
    }
}

impl fmt::Display for IntakeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Intake form shared by every wizard step.
#[derive(Debug, Clone, PartialEq)]
pub struct IntakeForm {
    pub intake: PatientIntake,
    pub medications: EntryList<Medication>,
    today: NaiveDate,
}

impl IntakeForm {
    /// `today` bounds the birth date.
    pub fn new(today: NaiveDate) -> Self {
        Self::with_intake(PatientIntake::default(), today)
    }

    pub fn with_intake(intake: PatientIntake, today: NaiveDate) -> Self {
        Self {
            intake,
            medications: EntryList::new(),
            today,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Validate one step's fields.
    pub fn validate(&self, step: IntakeStep) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for field in step.fields() {
            let value = self.intake.get_field(field.db_field);
            let key = field.db_field.as_str().to_string();
            if field.required && value.is_empty() {
                errors.insert(key, format!("{} is required", field.label));
                continue;
            }
            if let (Some(max), Some(text)) = (field.extended_props.max_length, value.as_text())
                && text.chars().count() > max
            {
                errors.insert(key, format!("{} must be at most {max} characters", field.label));
            }
        }

        match step {
            IntakeStep::PersonalInformation => {
                let personal = &self.intake.personal;
                if personal.birth_date.is_some_and(|birth| birth > self.today) {
                    errors.insert(
                        FieldPath::BirthDate.to_string(),
                        "Birth date cannot be in the future".to_string(),
                    );
                }
                let contact = personal.contact_number.trim();
                if !contact.is_empty() && !is_contact_number(contact) {
                    errors.insert(
                        FieldPath::ContactNumber.to_string(),
                        "Contact number must be 7 to 15 digits".to_string(),
                    );
                }
            }
            IntakeStep::PersonalHistory => {
                for (index, medication) in self.medications.values().enumerate() {
                    if medication.name.trim().is_empty() {
                        errors.insert(
                            format!("{MEDICATIONS}[{index}].name"),
                            "Medication name is required".to_string(),
                        );
                    }
                }
            }
            IntakeStep::FamilyHistory | IntakeStep::Review => {}
        }
        errors
    }

    /// Record sent to the patients collection.
    pub fn payload(&self) -> clinic_transport::Result<Record> {
        #[derive(Serialize)]
        struct Payload<'a> {
            #[serde(flatten)]
            intake: &'a PatientIntake,
            medications: Vec<&'a Medication>,
        }

        encode_record(
            "patients",
            &Payload {
                intake: &self.intake,
                medications: self.medications.values().collect(),
            },
        )
    }

    /// Aggregate of every step for the review screen.
    ///
    /// Dropdown and checkbox ids are shown by option name when the catalog
    /// knows them.
    pub fn review(&self, catalog: &ReferenceCatalog) -> ReviewSummary {
        let mut sections: Vec<ReviewSection> = IntakeStep::ALL
            .iter()
            .filter(|step| **step != IntakeStep::Review)
            .map(|step| ReviewSection {
                title: step.title(),
                rows: step
                    .fields()
                    .iter()
                    .map(|field| ReviewRow {
                        label: field.label.clone(),
                        value: display_value(
                            &self.intake.get_field(field.db_field),
                            field.control.entity_id(),
                            catalog,
                        ),
                    })
                    .collect(),
            })
            .collect();

        if let Some(age) = self.intake.personal.age_on(self.today)
            && let Some(personal) = sections.first_mut()
        {
            personal.rows.push(ReviewRow {
                label: "Age".to_string(),
                value: age.to_string(),
            });
        }
        if let Some(history) = sections.last_mut() {
            history.rows.push(ReviewRow {
                label: "Medications".to_string(),
                value: describe_medications(&self.medications),
            });
        }
        ReviewSummary { sections }
    }
}

impl WizardForm for IntakeForm {
    fn step_titles(&self) -> &'static [&'static str] {
        &IntakeStep::TITLES
    }

    fn validate_step(&self, step: usize) -> FieldErrors {
        IntakeStep::from_index(step)
            .map(|step| self.validate(step))
            .unwrap_or_default()
    }

    fn reset(&mut self) {
        self.intake = PatientIntake::default();
        self.medications.clear();
    }
}

/// Seven to fifteen digits, optionally prefixed with `+`.
fn is_contact_number(value: &str) -> bool {
    let digits = value.strip_prefix('+').unwrap_or(value);
    (7..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}

fn option_name(catalog: &ReferenceCatalog, entity_id: Option<RecordId>, id: RecordId) -> String {
    let belongs = |owner: RecordId| entity_id.is_none_or(|entity_id| entity_id == owner);
    catalog
        .options
        .ready()
        .and_then(|options| {
            options
                .iter()
                .find(|option| option.id == id && belongs(option.entity_id))
        })
        .map_or_else(|| format!("#{id}"), |option| option.name.clone())
}

fn display_value(
    value: &FieldValue,
    entity_id: Option<RecordId>,
    catalog: &ReferenceCatalog,
) -> String {
    match value {
        FieldValue::Empty => "-".to_string(),
        FieldValue::Text(text) => text.clone(),
        FieldValue::Number(0) => "-".to_string(),
        FieldValue::Number(id) if entity_id.is_some() => option_name(catalog, entity_id, *id),
        FieldValue::Number(n) => n.to_string(),
        FieldValue::Date(date) => date.format("%Y-%m-%d").to_string(),
        FieldValue::Flag(flag) => String::from(if *flag { "Yes" } else { "No" }),
        FieldValue::Ids(ids) if ids.is_empty() => "None".to_string(),
        FieldValue::Ids(ids) => ids
            .iter()
            .map(|id| option_name(catalog, entity_id, *id))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

fn describe_medications(medications: &EntryList<Medication>) -> String {
    if medications.is_empty() {
        return "None".to_string();
    }
    medications
        .values()
        .map(|medication| {
            let details: Vec<&str> = [&medication.dosage, &medication.frequency]
                .into_iter()
                .flatten()
                .map(String::as_str)
                .collect();
            if details.is_empty() {
                medication.name.clone()
            } else {
                format!("{} ({})", medication.name, details.join(", "))
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewRow {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewSection {
    pub title: &'static str,
    pub rows: Vec<ReviewRow>,
}

/// Everything entered so far, grouped by step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewSummary {
    pub sections: Vec<ReviewSection>,
}

impl ReviewSummary {
    /// Value of one row, looked up by section title and label.
    pub fn value(&self, section: &str, label: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.title == section)?
            .rows
            .iter()
            .find(|row| row.label == label)
            .map(|row| row.value.as_str())
    }
}

impl fmt::Display for ReviewSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, section) in self.sections.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{}", section.title)?;
            for row in &section.rows {
                writeln!(f, "  {}: {}", row.label, row.value)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn contact_number_format() {
        assert!(is_contact_number("+639171234567"));
        assert!(is_contact_number("1234567"));
        assert!(!is_contact_number("123456"));
        assert!(!is_contact_number("12-345-678"));
        assert!(!is_contact_number("+1234567890123456"));
    }

    #[test]
    fn required_fields_come_from_descriptors() {
        let form = IntakeForm::new(today());
        let errors = form.validate(IntakeStep::PersonalInformation);
        let keys: Vec<_> = errors.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["birthDate", "firstName", "genderId", "lastName"]);
        assert_eq!(errors["genderId"], "Gender is required");
    }

    #[test]
    fn others_text_is_capped() {
        let mut form = IntakeForm::new(today());
        form.intake.family_history.others = "x".repeat(OTHERS_MAX_LENGTH + 1);
        let errors = form.validate(IntakeStep::FamilyHistory);
        assert_eq!(
            errors["familyHistory.others"],
            "Others must be at most 500 characters"
        );
    }

    #[test]
    fn medications_need_names() {
        let mut form = IntakeForm::new(today());
        form.medications.add(Medication::new("Metformin"));
        form.medications.add(Medication::new(" "));
        let errors = form.validate(IntakeStep::PersonalHistory);
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key("medications[1].name"));
    }

    #[test]
    fn payload_includes_medications() {
        let mut form = IntakeForm::new(today());
        form.intake.personal.first_name = "Ana".into();
        form.medications.add(Medication::new("Metformin"));
        let record = form.payload().unwrap();
        assert_eq!(record.get("firstName"), Some(&"Ana".into()));
        let medications = record.get(MEDICATIONS).and_then(|v| v.as_array()).unwrap();
        assert_eq!(medications[0]["name"], "Metformin");
    }
}
