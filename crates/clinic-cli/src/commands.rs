//! Command implementations.
//!
//! Each command reads its JSON inputs, drives the core crates and returns a
//! report. Printing lives in `summary.rs`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use chrono::Local;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, info_span};

use clinic_filter::{FilterOptions, FilterState, count_by, filter_records_with};
use clinic_model::{
    EntityDescriptor, FeatureArea, FieldAccess, FieldPath, FieldValue, Medication, PatientIntake,
    Record, RecordId, ReferenceOption, Session,
};
use clinic_reference::{
    Binding, CustomControl, CustomMenuItem, ReferenceCatalog, Resolution, ResolveMode,
    ResolvedControl, Resolver,
};
use clinic_state::{
    CompletionEffect, DialogStore, FieldErrors, IntakeForm, MutationRequest, MutationService,
    MutationSuccess, Notification, ReviewSummary, ServiceError, StepOutcome, Wizard,
};
use clinic_transport::{CachingClient, InMemoryTransport};

use crate::cli::{ConfigArgs, FilterArgs, IntakeArgs, OptionsArgs, TallyArgs};
use crate::logging::redact_value;
use crate::settings::Settings;

/// Option code replaced by a date range picker in timeframe selects.
pub const CUSTOM_RANGE_CODE: &str = "custom";

#[derive(Debug, Clone)]
pub struct FilterReport {
    pub entity: String,
    /// Records before filtering.
    pub total: usize,
    pub records: Vec<Record>,
    /// Filter state after applying command-line constraints.
    pub state: FilterState,
}

/// One submitted wizard step.
#[derive(Debug, Clone)]
pub struct StepLog {
    pub title: &'static str,
    /// Empty when the step was accepted.
    pub errors: FieldErrors,
}

impl StepLog {
    pub fn accepted(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct IntakeReport {
    pub steps: Vec<StepLog>,
    /// Present once every step validated.
    pub review: Option<ReviewSummary>,
    pub saved: Option<Record>,
    pub notification: Option<Notification>,
}

impl IntakeReport {
    pub fn is_saved(&self) -> bool {
        self.saved.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct ConfigReport {
    pub path: PathBuf,
    pub created: bool,
    pub settings: Settings,
}

/// Intake file layout: the intake fields plus an optional medication list.
#[derive(Debug, Deserialize)]
struct IntakeDocument {
    #[serde(flatten)]
    intake: PatientIntake,
    #[serde(default)]
    medications: Vec<Medication>,
}

pub fn run_filter(args: &FilterArgs, settings: &Settings) -> Result<FilterReport> {
    let records: Vec<Record> = read_json(&args.records)?;
    let mut state = match &args.filter {
        Some(path) => FilterState::from_json(read_json(path)?),
        None => FilterState::new(),
    };
    if let Some(text) = &args.text {
        debug!(text = redact_value(text), "text search");
        state.set_text_input(text.as_str());
    }
    for assignment in &args.set {
        let (field, value) = parse_assignment(assignment)?;
        state.set_dropdown(field, value);
    }
    if args.from.is_some() || args.to.is_some() {
        state.set_date_range(args.from, args.to);
    }

    let entity = args
        .entity
        .clone()
        .unwrap_or_else(|| settings.filter.entity.clone());
    let options = FilterOptions {
        date_field: args
            .date_field
            .clone()
            .unwrap_or_else(|| settings.filter.date_field.clone()),
        ..FilterOptions::default()
    };
    let _span = info_span!("filter", entity = %entity).entered();

    // Input order and duplicate ids are kept as exported.
    let total = records.len();
    let matched = filter_records_with(&records, Some(&state), &options).into_owned();
    info!(total, matched = matched.len(), "records filtered");

    Ok(FilterReport {
        entity,
        total,
        records: matched,
        state,
    })
}

pub fn run_options(args: &OptionsArgs) -> Result<ResolvedControl> {
    let entities: Vec<EntityDescriptor> = read_json(&args.entities)?;
    let options: Vec<ReferenceOption> = read_json(&args.options)?;
    let catalog = ReferenceCatalog::ready(entities, options);
    let resolver = Resolver::new(&catalog).with_custom_item(CustomMenuItem::new(
        CUSTOM_RANGE_CODE,
        CustomControl::DateRangePicker,
    ));

    let field_prop = catalog
        .find_entity(args.entity)
        .map(|entity| entity.field_prop.clone())
        .ok_or_else(|| anyhow!("No entity with id {}", args.entity))?;

    let resolution = match ResolveMode::from(args.mode) {
        ResolveMode::Filter => {
            let mut state = FilterState::new();
            if let Some(value) = &args.value {
                state.set_dropdown(field_prop, parse_scalar(value));
            }
            resolver.resolve(args.entity, Binding::Filter(&state))
        }
        ResolveMode::Control => {
            let path = intake_path(&field_prop)?;
            let mut intake = PatientIntake::default();
            if let Some(value) = &args.value {
                let id = parse_id(value)?;
                intake.set_field(path, FieldValue::Number(id))?;
            }
            resolver.resolve(args.entity, Binding::Control { form: &intake, path })
        }
        ResolveMode::Multi => {
            let path = intake_path(&field_prop)?;
            let mut intake = PatientIntake::default();
            if let Some(value) = &args.value {
                let ids = value
                    .split(',')
                    .filter(|part| !part.trim().is_empty())
                    .map(parse_id)
                    .collect::<Result<Vec<_>>>()?;
                intake.set_field(path, FieldValue::Ids(ids))?;
            }
            resolver.resolve(args.entity, Binding::Multi { form: &intake, path })
        }
    };

    match resolution {
        Resolution::Ready(control) => Ok(control),
        Resolution::Missing { entity_id } => bail!("No entity with id {entity_id}"),
        Resolution::Pending => bail!("Reference data is not loaded"),
    }
}

pub fn run_intake(args: &IntakeArgs) -> Result<IntakeReport> {
    let document: IntakeDocument = read_json(&args.input)?;
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let catalog = match (&args.entities, &args.options) {
        (Some(entities), Some(options)) => {
            ReferenceCatalog::ready(read_json(entities)?, read_json(options)?)
        }
        _ => ReferenceCatalog::ready(Vec::new(), Vec::new()),
    };

    let mut form = IntakeForm::with_intake(document.intake, today);
    for medication in document.medications {
        form.medications.add(medication);
    }
    debug!(
        patient = redact_value(&form.intake.personal.full_name()),
        medications = form.medications.len(),
        "intake loaded"
    );

    let mut wizard = Wizard::new(form);
    let mut steps = Vec::new();
    let request = loop {
        let title = wizard.active_title().unwrap_or_default();
        match wizard.submit_step()? {
            StepOutcome::Rejected => {
                steps.push(StepLog {
                    title,
                    errors: wizard.errors().clone(),
                });
                info!(step = title, "intake rejected");
                return Ok(IntakeReport {
                    steps,
                    review: None,
                    saved: None,
                    notification: None,
                });
            }
            StepOutcome::Advanced(_) => steps.push(StepLog {
                title,
                errors: FieldErrors::new(),
            }),
            StepOutcome::Save(request) => {
                steps.push(StepLog {
                    title,
                    errors: FieldErrors::new(),
                });
                break request;
            }
        }
    };
    let review = wizard.form().review(&catalog);

    let transport = CachingClient::new(InMemoryTransport::new());
    let session = Session::signed_in(args.user_id, args.role.into());
    let service = MutationService::new(&transport, &session);
    let mut store = DialogStore::new(FeatureArea::Patient);
    store.on_add();
    let ticket = store.begin_save();
    let payload = wizard.form().payload()?;
    let outcome = runtime()?.block_on(service.run(MutationRequest::create(ticket, payload)));

    wizard.finish_save(
        request.ticket,
        outcome
            .result
            .as_ref()
            .map(|_| ())
            .map_err(ServiceError::user_message),
    )?;
    let notification = match store.complete(&outcome) {
        CompletionEffect::Notify(notification) => Some(notification),
        CompletionEffect::Discarded => None,
    };
    let saved = match outcome.result {
        Ok(MutationSuccess::Created(record)) => Some(record),
        _ => None,
    };
    info!(completed = wizard.is_completed(), "intake finished");

    Ok(IntakeReport {
        steps,
        review: Some(review),
        saved,
        notification,
    })
}

pub fn run_tally(args: &TallyArgs) -> Result<BTreeMap<String, usize>> {
    let records: Vec<Record> = read_json(&args.records)?;
    let counts = count_by(&records, &args.by);
    info!(field = %args.by, buckets = counts.len(), "tallied");
    Ok(counts)
}

pub fn run_config(args: &ConfigArgs, path: &Path) -> Result<ConfigReport> {
    let created = args.init && !path.exists();
    if created {
        Settings::default().save_to(path)?;
        info!(path = %path.display(), "settings initialized");
    }
    Ok(ConfigReport {
        path: path.to_path_buf(),
        created,
        settings: Settings::load_from(path),
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .context("Failed to start async runtime")
}

/// `FIELD=VALUE`; the value is read as JSON when it parses, else as text.
fn parse_assignment(assignment: &str) -> Result<(String, Value)> {
    let (field, value) = assignment
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected FIELD=VALUE, got '{assignment}'"))?;
    let field = field.trim();
    if field.is_empty() {
        bail!("Missing field name in '{assignment}'");
    }
    Ok((field.to_string(), parse_scalar(value)))
}

fn parse_scalar(value: &str) -> Value {
    let value = value.trim();
    serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()))
}

fn parse_id(value: &str) -> Result<RecordId> {
    value
        .trim()
        .parse()
        .with_context(|| format!("'{value}' is not an option id"))
}

fn intake_path(field_prop: &str) -> Result<FieldPath> {
    field_prop
        .parse()
        .with_context(|| format!("'{field_prop}' is not an intake form field"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_values_parse_as_json_first() {
        assert_eq!(
            parse_assignment("roleId=2").unwrap(),
            ("roleId".to_string(), Value::from(2))
        );
        assert_eq!(
            parse_assignment("status = active").unwrap(),
            ("status".to_string(), Value::from("active"))
        );
        assert_eq!(
            parse_assignment("statusId=[1,3]").unwrap().1,
            serde_json::json!([1, 3])
        );
    }

    #[test]
    fn assignment_requires_field_name() {
        assert!(parse_assignment("=2").is_err());
        assert!(parse_assignment("roleId").is_err());
    }

    #[test]
    fn unknown_field_prop_is_reported() {
        let err = intake_path("favoriteColor").unwrap_err();
        assert_eq!(err.to_string(), "'favoriteColor' is not an intake form field");
    }
}
