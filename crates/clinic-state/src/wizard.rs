//! Stepwise wizard controller.
//!
//! A wizard walks an ordered list of steps over one shared form. States are
//! `0..=N` where `N` is the step count: `0..N` are the visible steps and `N`
//! is the completed pseudo-step. The last visible step is a review step whose
//! submission validates everything and requests a save; the wizard only
//! becomes completed after that save succeeds.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, info, warn};

use crate::error::WizardError;

/// Field path to error message.
pub type FieldErrors = BTreeMap<String, String>;

/// A form driven by a [`Wizard`].
pub trait WizardForm {
    /// Titles of the visible steps, in order. The last one is the review.
    fn step_titles(&self) -> &'static [&'static str];

    /// Validate the fields owned by one step.
    fn validate_step(&self, step: usize) -> FieldErrors;

    /// Clear the form and any auxiliary lists.
    fn reset(&mut self);
}

/// Identifies one save attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SaveTicket(u64);

impl fmt::Display for SaveTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Returned when the review step is submitted: the caller persists the form
/// and reports back through [`Wizard::finish_save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveRequest {
    pub ticket: SaveTicket,
}

/// Outcome of submitting the active step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Validation failed; errors are on the wizard.
    Rejected,
    /// Moved to the given step.
    Advanced(usize),
    /// Everything validated; persist the form.
    Save(SaveRequest),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Editing,
    Saving(SaveTicket),
    Completed,
}

#[derive(Debug, Clone)]
pub struct Wizard<F> {
    form: F,
    active_step: usize,
    errors: FieldErrors,
    save_error: Option<String>,
    phase: Phase,
    next_ticket: u64,
}

impl<F: WizardForm> Wizard<F> {
    pub fn new(form: F) -> Self {
        Self {
            form,
            active_step: 0,
            errors: FieldErrors::new(),
            save_error: None,
            phase: Phase::Editing,
            next_ticket: 1,
        }
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    /// Mutable access for field edits. Edits are refused while saving or
    /// once completed.
    pub fn form_mut(&mut self) -> Result<&mut F, WizardError> {
        match self.phase {
            Phase::Editing => Ok(&mut self.form),
            Phase::Saving(_) => Err(WizardError::SaveInFlight),
            Phase::Completed => Err(WizardError::Completed),
        }
    }

    /// Number of visible steps; also the completed state's index.
    pub fn step_count(&self) -> usize {
        self.form.step_titles().len()
    }

    pub fn active_step(&self) -> usize {
        self.active_step
    }

    /// Title of the active step, `None` once completed.
    pub fn active_title(&self) -> Option<&'static str> {
        self.form.step_titles().get(self.active_step).copied()
    }

    pub fn is_review(&self) -> bool {
        self.active_step + 1 == self.step_count()
    }

    pub fn is_completed(&self) -> bool {
        self.phase == Phase::Completed
    }

    pub fn is_saving(&self) -> bool {
        matches!(self.phase, Phase::Saving(_))
    }

    /// Field errors from the last rejected submission.
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Message of the last failed save.
    pub fn save_error(&self) -> Option<&str> {
        self.save_error.as_deref()
    }

    /// Submit the active step.
    ///
    /// Non-review steps advance when their own fields validate. The review
    /// step validates every step and, on success, enters the saving phase.
    pub fn submit_step(&mut self) -> Result<StepOutcome, WizardError> {
        match self.phase {
            Phase::Completed => return Err(WizardError::Completed),
            Phase::Saving(_) => return Err(WizardError::SaveInFlight),
            Phase::Editing => {}
        }

        let errors: FieldErrors = if self.is_review() {
            (0..self.step_count())
                .flat_map(|step| self.form.validate_step(step))
                .collect()
        } else {
            self.form.validate_step(self.active_step)
        };

        if !errors.is_empty() {
            debug!(step = self.active_step, errors = errors.len(), "step rejected");
            self.errors = errors;
            return Ok(StepOutcome::Rejected);
        }
        self.errors.clear();

        if self.is_review() {
            let ticket = SaveTicket(self.next_ticket);
            self.next_ticket += 1;
            self.phase = Phase::Saving(ticket);
            self.save_error = None;
            debug!(%ticket, "review accepted, awaiting save");
            return Ok(StepOutcome::Save(SaveRequest { ticket }));
        }

        self.active_step += 1;
        debug!(step = self.active_step, "advanced");
        Ok(StepOutcome::Advanced(self.active_step))
    }

    /// Report the result of the save requested with `ticket`.
    ///
    /// Success moves to the completed state. Failure returns to the review
    /// step with the message kept in [`Wizard::save_error`].
    pub fn finish_save<E: fmt::Display>(
        &mut self,
        ticket: SaveTicket,
        result: Result<(), E>,
    ) -> Result<(), WizardError> {
        if self.phase != Phase::Saving(ticket) {
            debug!(%ticket, "ignoring save result for a stale ticket");
            return Err(WizardError::StaleTicket(ticket.0));
        }
        match result {
            Ok(()) => {
                self.phase = Phase::Completed;
                self.active_step = self.step_count();
                info!("wizard completed");
            }
            Err(err) => {
                warn!(error = %err, "save failed, back to review");
                self.phase = Phase::Editing;
                self.save_error = Some(err.to_string());
            }
        }
        Ok(())
    }

    /// Go back one step. Saturates at the first step; no effect while saving
    /// or once completed.
    pub fn back(&mut self) {
        if self.phase != Phase::Editing {
            return;
        }
        self.active_step = self.active_step.saturating_sub(1);
        self.errors.clear();
    }

    /// Return to the first step with an empty form. Any save in flight
    /// becomes stale.
    pub fn reset(&mut self) {
        self.form.reset();
        self.active_step = 0;
        self.errors.clear();
        self.save_error = None;
        self.phase = Phase::Editing;
    }

    /// Start another entry from the completed state.
    pub fn again(&mut self) {
        debug!("starting another entry");
        self.reset();
    }

    /// Discard the form.
    pub fn close(&mut self) {
        debug!("wizard closed");
        self.reset();
    }
}
