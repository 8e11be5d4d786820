//! Per-feature dialog stores.
//!
//! Every feature area owns one add/edit dialog. A [`DialogStore`] tracks which
//! record the dialog targets, whether it is shown, whether a save is in
//! flight, and the list view's search filter. State changes go through
//! [`DialogStore::reduce`]; the `on_*` methods are shorthands for it.
//!
//! Each open or close starts a new dialog session. Saves are tied to the
//! session they started in through a [`RequestTicket`], and completions for an
//! earlier session are dropped instead of touching the current dialog.

use std::fmt;

use serde::Serialize;

use clinic_filter::FilterState;
use clinic_model::{FeatureArea, NEW_RECORD_ID, RecordId};

use crate::service::{MutationOutcome, MutationSuccess};

/// Dialog mode, shown in the dialog title.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum DialogTitle {
    #[default]
    Add,
    Edit,
}

impl fmt::Display for DialogTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "Add",
            Self::Edit => "Edit",
        })
    }
}

/// Observable state of one feature's dialog.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogFormState {
    /// Target record; [`NEW_RECORD_ID`] means "create new".
    pub id: RecordId,
    pub dialog_title: DialogTitle,
    pub show_dialog: bool,
    pub is_saving: bool,
    pub search_filter: FilterState,
}

impl DialogFormState {
    pub fn is_new(&self) -> bool {
        self.id == NEW_RECORD_ID
    }
}

/// Actions accepted by [`DialogStore::reduce`].
#[derive(Debug, Clone, PartialEq)]
pub enum DialogAction {
    /// Open in creation mode.
    Add,
    /// Open in edit mode for a record.
    Edit(RecordId),
    /// Track an in-flight mutation.
    Saving(bool),
    /// Close and reset the target record.
    Close,
    /// Replace the list view's search filter.
    SetSearchFilter(FilterState),
}

/// Ties a mutation to the dialog session it was started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTicket {
    pub area: FeatureArea,
    session: u64,
}

/// Severity of a transient notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// Transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// What applying a completion did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionEffect {
    /// The completion belonged to an earlier dialog session.
    Discarded,
    /// The completion was applied; show this notification.
    Notify(Notification),
}

/// Dialog state machine for one feature area.
#[derive(Debug, Clone)]
pub struct DialogStore {
    area: FeatureArea,
    state: DialogFormState,
    session: u64,
}

impl DialogStore {
    pub fn new(area: FeatureArea) -> Self {
        Self {
            area,
            state: DialogFormState::default(),
            session: 0,
        }
    }

    pub fn area(&self) -> FeatureArea {
        self.area
    }

    pub fn state(&self) -> &DialogFormState {
        &self.state
    }

    /// Apply one action. The most recent action always wins.
    pub fn reduce(&mut self, action: DialogAction) {
        tracing::debug!(area = %self.area, ?action, "dialog action");
        match action {
            DialogAction::Add => self.open(NEW_RECORD_ID, DialogTitle::Add),
            DialogAction::Edit(id) => self.open(id, DialogTitle::Edit),
            DialogAction::Saving(saving) => self.state.is_saving = saving,
            DialogAction::Close => {
                self.session += 1;
                self.state.id = NEW_RECORD_ID;
                self.state.show_dialog = false;
                self.state.is_saving = false;
            }
            DialogAction::SetSearchFilter(filter) => self.state.search_filter = filter,
        }
    }

    fn open(&mut self, id: RecordId, title: DialogTitle) {
        self.session += 1;
        self.state.id = id;
        self.state.dialog_title = title;
        self.state.show_dialog = true;
        self.state.is_saving = false;
    }

    pub fn on_add(&mut self) {
        self.reduce(DialogAction::Add);
    }

    pub fn on_edit(&mut self, id: RecordId) {
        self.reduce(DialogAction::Edit(id));
    }

    pub fn on_saving(&mut self, saving: bool) {
        self.reduce(DialogAction::Saving(saving));
    }

    pub fn on_closing(&mut self) {
        self.reduce(DialogAction::Close);
    }

    pub fn set_search_filter(&mut self, filter: FilterState) {
        self.reduce(DialogAction::SetSearchFilter(filter));
    }

    /// Mark a save as in flight and return the ticket its completion must carry.
    pub fn begin_save(&mut self) -> RequestTicket {
        self.on_saving(true);
        RequestTicket {
            area: self.area,
            session: self.session,
        }
    }

    /// Whether a ticket still belongs to the current dialog session.
    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        ticket.area == self.area && ticket.session == self.session
    }

    /// Apply a finished mutation.
    ///
    /// Success closes the dialog. A conflict clears the saving flag and keeps
    /// the dialog open so the user can correct the values; any other failure
    /// force-closes it. Completions from an earlier session are discarded.
    pub fn complete(&mut self, outcome: &MutationOutcome) -> CompletionEffect {
        if !self.is_current(outcome.ticket) {
            tracing::debug!(
                area = %self.area,
                ticket_session = outcome.ticket.session,
                current_session = self.session,
                "discarding stale completion"
            );
            return CompletionEffect::Discarded;
        }

        let notification = match &outcome.result {
            Ok(success) => {
                let verb = match success {
                    MutationSuccess::Created(_) => "created",
                    MutationSuccess::Updated(_) => "updated",
                    MutationSuccess::Deleted(_) => "deleted",
                };
                tracing::info!(area = %self.area, id = success.id(), "{} {}", self.area, verb);
                self.on_closing();
                Notification::success(format!("{} {} successfully", self.area, verb))
            }
            Err(err) if err.is_conflict() => {
                tracing::warn!(area = %self.area, error = %err, "save rejected with conflict");
                self.on_saving(false);
                Notification::error(err.user_message())
            }
            Err(err) => {
                tracing::warn!(area = %self.area, error = %err, "save failed, closing dialog");
                self.on_closing();
                Notification::error(err.user_message())
            }
        };
        CompletionEffect::Notify(notification)
    }
}

/// One dialog store per feature area.
#[derive(Debug, Clone)]
pub struct FeatureStores {
    patient: DialogStore,
    checkup: DialogStore,
    vital_sign: DialogStore,
    user: DialogStore,
    reference: DialogStore,
}

impl Default for FeatureStores {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureStores {
    pub fn new() -> Self {
        Self {
            patient: DialogStore::new(FeatureArea::Patient),
            checkup: DialogStore::new(FeatureArea::Checkup),
            vital_sign: DialogStore::new(FeatureArea::VitalSign),
            user: DialogStore::new(FeatureArea::User),
            reference: DialogStore::new(FeatureArea::Reference),
        }
    }

    pub fn get(&self, area: FeatureArea) -> &DialogStore {
        match area {
            FeatureArea::Patient => &self.patient,
            FeatureArea::Checkup => &self.checkup,
            FeatureArea::VitalSign => &self.vital_sign,
            FeatureArea::User => &self.user,
            FeatureArea::Reference => &self.reference,
        }
    }

    pub fn get_mut(&mut self, area: FeatureArea) -> &mut DialogStore {
        match area {
            FeatureArea::Patient => &mut self.patient,
            FeatureArea::Checkup => &mut self.checkup,
            FeatureArea::VitalSign => &mut self.vital_sign,
            FeatureArea::User => &mut self.user,
            FeatureArea::Reference => &mut self.reference,
        }
    }

    /// Route a completion to the store that issued its ticket.
    pub fn complete(&mut self, outcome: &MutationOutcome) -> CompletionEffect {
        self.get_mut(outcome.ticket.area).complete(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_then_add_ends_in_creation_mode() {
        let mut store = DialogStore::new(FeatureArea::Patient);
        store.on_edit(5);
        store.on_add();
        let state = store.state();
        assert!(state.show_dialog);
        assert_eq!(state.dialog_title, DialogTitle::Add);
        assert_eq!(state.id, NEW_RECORD_ID);
    }

    #[test]
    fn closing_resets_target_and_saving() {
        let mut store = DialogStore::new(FeatureArea::User);
        store.on_edit(3);
        store.on_saving(true);
        store.on_closing();
        let state = store.state();
        assert!(!state.show_dialog);
        assert!(!state.is_saving);
        assert!(state.is_new());
    }

    #[test]
    fn search_filter_survives_dialog_transitions() {
        let mut store = DialogStore::new(FeatureArea::Checkup);
        let mut filter = FilterState::new();
        filter.set_text_input("ana");
        store.set_search_filter(filter.clone());
        store.on_add();
        store.on_closing();
        assert_eq!(store.state().search_filter, filter);
    }

    #[test]
    fn reopening_invalidates_outstanding_tickets() {
        let mut store = DialogStore::new(FeatureArea::Patient);
        store.on_edit(1);
        let ticket = store.begin_save();
        assert!(store.is_current(ticket));
        store.on_closing();
        store.on_edit(1);
        assert!(!store.is_current(ticket));
    }

    #[test]
    fn tickets_do_not_cross_feature_areas() {
        let mut stores = FeatureStores::new();
        let ticket = stores.get_mut(FeatureArea::User).begin_save();
        assert!(stores.get(FeatureArea::User).is_current(ticket));
        assert!(!stores.get(FeatureArea::Reference).is_current(ticket));
    }

    #[test]
    fn state_serializes_in_camel_case() {
        let mut store = DialogStore::new(FeatureArea::Patient);
        store.on_edit(8);
        let value = serde_json::to_value(store.state()).unwrap();
        assert_eq!(value["dialogTitle"], "Edit");
        assert_eq!(value["showDialog"], true);
        assert_eq!(value["id"], 8);
    }
}
