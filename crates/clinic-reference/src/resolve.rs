//! Entity id to control description.
//!
//! Resolution runs on every render: it never fetches, it only reads the
//! catalog and the current selection from the binding.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use clinic_filter::{FilterState, is_falsy};
use clinic_model::{
    EntityDescriptor, FieldAccess, FieldPath, FieldValue, RecordId, ReferenceOption,
};

use crate::catalog::ReferenceCatalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolveMode {
    /// Single select bound to the list view's filter state.
    Filter,
    /// Single select bound to a form field.
    Control,
    /// Checkbox group bound to a list of ids in the form.
    Multi,
}

impl fmt::Display for ResolveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Filter => "filter",
            Self::Control => "control",
            Self::Multi => "multi",
        })
    }
}

/// Value an option binds with: its numeric id, or its code for timeframe entities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Id(RecordId),
    Code(String),
}

impl OptionValue {
    pub fn to_json(&self) -> Value {
        match self {
            Self::Id(id) => Value::from(*id),
            Self::Code(code) => Value::from(code.as_str()),
        }
    }

    pub fn to_field_value(&self) -> FieldValue {
        match self {
            Self::Id(id) => FieldValue::Number(*id),
            Self::Code(code) => FieldValue::Text(code.clone()),
        }
    }

    /// `None` for the unselected sentinel (`0`, `""`, `null`).
    fn from_json(value: &Value) -> Option<Self> {
        if is_falsy(value) {
            return None;
        }
        match value {
            Value::Number(n) => n.as_i64().map(Self::Id),
            Value::String(code) => Some(Self::Code(code.clone())),
            _ => None,
        }
    }

    fn from_field(value: &FieldValue) -> Option<Self> {
        if value.is_empty() {
            return None;
        }
        match value {
            FieldValue::Number(id) => Some(Self::Id(*id)),
            FieldValue::Text(code) => Some(Self::Code(code.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Code(code) => f.write_str(code),
        }
    }
}

/// Where the current selection is read from.
#[derive(Clone, Copy)]
pub enum Binding<'a> {
    Filter(&'a FilterState),
    Control {
        form: &'a dyn FieldAccess,
        path: FieldPath,
    },
    Multi {
        form: &'a dyn FieldAccess,
        path: FieldPath,
    },
}

impl Binding<'_> {
    pub fn mode(&self) -> ResolveMode {
        match self {
            Self::Filter(_) => ResolveMode::Filter,
            Self::Control { .. } => ResolveMode::Control,
            Self::Multi { .. } => ResolveMode::Multi,
        }
    }
}

impl fmt::Debug for Binding<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filter(state) => f.debug_tuple("Filter").field(state).finish(),
            Self::Control { path, .. } => f.debug_struct("Control").field("path", path).finish(),
            Self::Multi { path, .. } => f.debug_struct("Multi").field("path", path).finish(),
        }
    }
}

/// Custom control rendered in place of one option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CustomControl {
    DateRangePicker,
    Named(String),
}

/// Replaces the option with `code` by a custom control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomMenuItem {
    pub code: String,
    pub control: CustomControl,
}

impl CustomMenuItem {
    pub fn new(code: impl Into<String>, control: CustomControl) -> Self {
        Self {
            code: code.into(),
            control,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectItem {
    pub value: OptionValue,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<CustomControl>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckItem {
    pub id: RecordId,
    pub label: String,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ControlModel {
    Select {
        options: Vec<SelectItem>,
        selected: Option<OptionValue>,
        /// Option marked `isDefault`, offered while a form field is unset.
        /// Not part of the form until written back with
        /// [`ResolvedControl::apply_default`].
        #[serde(skip_serializing_if = "Option::is_none")]
        default: Option<OptionValue>,
    },
    CheckGroup {
        items: Vec<CheckItem>,
    },
}

/// A control ready to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedControl {
    pub entity: EntityDescriptor,
    pub mode: ResolveMode,
    pub model: ControlModel,
}

impl ResolvedControl {
    pub fn label(&self) -> &str {
        &self.entity.name
    }

    pub fn field_prop(&self) -> &str {
        &self.entity.field_prop
    }

    /// Currently selected value of a single select.
    pub fn selected(&self) -> Option<&OptionValue> {
        match &self.model {
            ControlModel::Select { selected, .. } => selected.as_ref(),
            ControlModel::CheckGroup { .. } => None,
        }
    }

    /// Default option of an unset form field.
    pub fn default_value(&self) -> Option<&OptionValue> {
        match &self.model {
            ControlModel::Select { default, .. } => default.as_ref(),
            ControlModel::CheckGroup { .. } => None,
        }
    }

    /// Checked ids of a checkbox group.
    pub fn checked_ids(&self) -> Vec<RecordId> {
        match &self.model {
            ControlModel::CheckGroup { items } => items
                .iter()
                .filter(|item| item.checked)
                .map(|item| item.id)
                .collect(),
            ControlModel::Select { .. } => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// At least one collection is still loading; render nothing.
    Pending,
    /// No entity descriptor with that id; render nothing.
    Missing { entity_id: RecordId },
    Ready(ResolvedControl),
}

impl Resolution {
    pub fn control(&self) -> Option<&ResolvedControl> {
        match self {
            Self::Ready(control) => Some(control),
            _ => None,
        }
    }
}

/// Resolves entity ids against a catalog.
#[derive(Debug, Clone)]
pub struct Resolver<'a> {
    catalog: &'a ReferenceCatalog,
    custom_items: Vec<CustomMenuItem>,
}

impl<'a> Resolver<'a> {
    pub fn new(catalog: &'a ReferenceCatalog) -> Self {
        Self {
            catalog,
            custom_items: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_custom_item(mut self, item: CustomMenuItem) -> Self {
        self.custom_items.push(item);
        self
    }

    pub fn resolve(&self, entity_id: RecordId, binding: Binding<'_>) -> Resolution {
        if !self.catalog.is_ready() {
            return Resolution::Pending;
        }
        let Some(entity) = self.catalog.find_entity(entity_id) else {
            warn!(
                entity_id,
                mode = %binding.mode(),
                "no entity descriptor for id, rendering nothing"
            );
            return Resolution::Missing { entity_id };
        };
        let options = self.catalog.options_for(entity.id);

        let model = match binding {
            Binding::Filter(state) => {
                let selected = state
                    .dropdown_value(&entity.field_prop)
                    .and_then(OptionValue::from_json);
                self.select_model(entity, &options, selected, None)
            }
            Binding::Control { form, path } => {
                let selected = OptionValue::from_field(&form.get_field(path));
                let default = match selected {
                    Some(_) => None,
                    None => default_value(entity, &options),
                };
                self.select_model(entity, &options, selected, default)
            }
            Binding::Multi { form, path } => {
                let current = form.get_field(path);
                let checked = current.as_ids().unwrap_or_default();
                ControlModel::CheckGroup {
                    items: options
                        .iter()
                        .map(|option| CheckItem {
                            id: option.id,
                            label: option.name.clone(),
                            checked: checked.contains(&option.id),
                        })
                        .collect(),
                }
            }
        };

        Resolution::Ready(ResolvedControl {
            entity: entity.clone(),
            mode: binding.mode(),
            model,
        })
    }

    fn select_model(
        &self,
        entity: &EntityDescriptor,
        options: &[&ReferenceOption],
        selected: Option<OptionValue>,
        default: Option<OptionValue>,
    ) -> ControlModel {
        let options = options
            .iter()
            .map(|option| SelectItem {
                value: option_value(entity, option),
                label: option.name.clone(),
                custom: self
                    .custom_items
                    .iter()
                    .find(|item| item.code == option.code)
                    .map(|item| item.control.clone()),
            })
            .collect();
        ControlModel::Select {
            options,
            selected,
            default,
        }
    }
}

fn option_value(entity: &EntityDescriptor, option: &ReferenceOption) -> OptionValue {
    if entity.is_timeframe() {
        OptionValue::Code(option.code.clone())
    } else {
        OptionValue::Id(option.id)
    }
}

fn default_value(entity: &EntityDescriptor, options: &[&ReferenceOption]) -> Option<OptionValue> {
    let mut defaults = options.iter().filter(|option| option.is_default);
    let first = defaults.next()?;
    if defaults.next().is_some() {
        warn!(
            entity_id = entity.id,
            code = %entity.code,
            "several default options, using the first"
        );
    }
    Some(option_value(entity, first))
}
