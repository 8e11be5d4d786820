//! Writing selections back to their binding.

use tracing::debug;

use clinic_filter::FilterState;
use clinic_model::{FieldAccess, FieldPath, FieldValue, RecordId};

use crate::error::{ReferenceError, Result};
use crate::resolve::{OptionValue, ResolveMode, ResolvedControl};

/// A user interaction with a resolved control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// Pick one option of a single select.
    Select(OptionValue),
    /// Reset the selection to "unselected".
    Clear,
    /// Check or uncheck one box of a checkbox group.
    Toggle { id: RecordId, checked: bool },
}

impl ChangeEvent {
    /// Toggle from the raw string value a checkbox reports.
    pub fn toggle_raw(raw: &str, checked: bool) -> Result<Self> {
        let id = raw
            .trim()
            .parse::<RecordId>()
            .map_err(|_| ReferenceError::InvalidOptionId(raw.to_string()))?;
        Ok(Self::Toggle { id, checked })
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Select(_) => "select",
            Self::Clear => "clear",
            Self::Toggle { .. } => "toggle",
        }
    }
}

/// Mutable counterpart of [`crate::Binding`].
pub enum ChangeSink<'a> {
    Filter(&'a mut FilterState),
    Control {
        form: &'a mut dyn FieldAccess,
        path: FieldPath,
    },
    Multi {
        form: &'a mut dyn FieldAccess,
        path: FieldPath,
    },
}

impl ChangeSink<'_> {
    pub fn mode(&self) -> ResolveMode {
        match self {
            Self::Filter(_) => ResolveMode::Filter,
            Self::Control { .. } => ResolveMode::Control,
            Self::Multi { .. } => ResolveMode::Multi,
        }
    }
}

impl ResolvedControl {
    /// Apply a change event to the sink.
    ///
    /// Filter selections are written to `dropDown[fieldProp]`; clearing writes
    /// the `0` sentinel so the dimension stops constraining.
    pub fn apply(&self, sink: ChangeSink<'_>, event: ChangeEvent) -> Result<()> {
        debug!(
            entity_id = self.entity.id,
            mode = %sink.mode(),
            event = event.name(),
            "applying change"
        );
        match (sink, event) {
            (ChangeSink::Filter(state), ChangeEvent::Select(value)) => {
                state.set_dropdown(self.field_prop(), value.to_json());
            }
            (ChangeSink::Filter(state), ChangeEvent::Clear) => {
                state.set_dropdown(self.field_prop(), 0);
            }
            (ChangeSink::Control { form, path }, ChangeEvent::Select(value)) => {
                form.set_field(path, value.to_field_value())?;
            }
            (
                ChangeSink::Control { form, path } | ChangeSink::Multi { form, path },
                ChangeEvent::Clear,
            ) => {
                form.set_field(path, FieldValue::Empty)?;
            }
            (ChangeSink::Multi { form, path }, ChangeEvent::Toggle { id, checked }) => {
                let mut ids = form
                    .get_field(path)
                    .as_ids()
                    .map(<[RecordId]>::to_vec)
                    .unwrap_or_default();
                toggle_membership(&mut ids, id, checked);
                form.set_field(path, FieldValue::Ids(ids))?;
            }
            (sink, event) => {
                return Err(ReferenceError::UnsupportedEvent {
                    mode: sink.mode(),
                    event: event.name(),
                });
            }
        }
        Ok(())
    }

    /// Write the default option into an unset form field.
    ///
    /// Returns `false` when there is nothing to write: the field already
    /// holds a value or no option is marked default.
    pub fn apply_default(&self, sink: ChangeSink<'_>) -> Result<bool> {
        match self.default_value() {
            Some(value) => {
                self.apply(sink, ChangeEvent::Select(value.clone()))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Checked adds the id when absent; unchecked removes it.
fn toggle_membership(ids: &mut Vec<RecordId>, id: RecordId, checked: bool) {
    if checked {
        if !ids.contains(&id) {
            ids.push(id);
        }
    } else {
        ids.retain(|existing| *existing != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_raw_parses_integer_ids() {
        assert_eq!(
            ChangeEvent::toggle_raw(" 7 ", true),
            Ok(ChangeEvent::Toggle { id: 7, checked: true })
        );
        assert_eq!(
            ChangeEvent::toggle_raw("seven", true),
            Err(ReferenceError::InvalidOptionId("seven".into()))
        );
    }

    #[test]
    fn toggling_is_idempotent() {
        let mut ids = vec![1, 2];
        toggle_membership(&mut ids, 2, true);
        assert_eq!(ids, vec![1, 2]);
        toggle_membership(&mut ids, 3, true);
        toggle_membership(&mut ids, 1, false);
        toggle_membership(&mut ids, 9, false);
        assert_eq!(ids, vec![2, 3]);
    }
}
