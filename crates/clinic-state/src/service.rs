//! Mutation wiring between dialog stores and the transport.
//!
//! A dialog hands out a [`RequestTicket`] when a save starts, the mutation
//! runs asynchronously through [`MutationService::run`], and the resulting
//! [`MutationOutcome`] is applied back with `DialogStore::complete`.

use tracing::{debug, info};

use clinic_model::{FeatureArea, Record, RecordId, Session};
use clinic_transport::Transport;

use crate::dialog::RequestTicket;
use crate::error::{Result, ServiceError};

/// Field stamped with the creating user's id.
pub const CREATED_BY: &str = "createdBy";
/// Field stamped with the updating user's id.
pub const UPDATED_BY: &str = "updatedBy";

#[derive(Debug, Clone, PartialEq)]
pub enum MutationKind {
    Create(Record),
    Update(RecordId, Record),
    Delete(RecordId),
}

/// A write to run for one feature area.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationRequest {
    pub ticket: RequestTicket,
    pub kind: MutationKind,
}

impl MutationRequest {
    pub fn create(ticket: RequestTicket, record: Record) -> Self {
        Self {
            ticket,
            kind: MutationKind::Create(record),
        }
    }

    pub fn update(ticket: RequestTicket, id: RecordId, record: Record) -> Self {
        Self {
            ticket,
            kind: MutationKind::Update(id, record),
        }
    }

    pub fn delete(ticket: RequestTicket, id: RecordId) -> Self {
        Self {
            ticket,
            kind: MutationKind::Delete(id),
        }
    }

    pub fn area(&self) -> FeatureArea {
        self.ticket.area
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MutationSuccess {
    Created(Record),
    Updated(Record),
    Deleted(RecordId),
}

impl MutationSuccess {
    /// Id of the written record, or `0` if the response carried none.
    pub fn id(&self) -> RecordId {
        match self {
            Self::Created(record) | Self::Updated(record) => record.id().unwrap_or_default(),
            Self::Deleted(id) => *id,
        }
    }
}

/// Result of a mutation, still tied to its ticket.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationOutcome {
    pub ticket: RequestTicket,
    pub result: Result<MutationSuccess>,
}

/// Runs mutations on behalf of the signed-in user.
#[derive(Debug)]
pub struct MutationService<'a, T> {
    transport: &'a T,
    session: &'a Session,
}

impl<'a, T: Transport> MutationService<'a, T> {
    pub fn new(transport: &'a T, session: &'a Session) -> Self {
        Self { transport, session }
    }

    /// Check that the session may write to `area`.
    pub fn authorize(&self, area: FeatureArea) -> Result<RecordId> {
        let user = self.session.current_user.ok_or(ServiceError::NotSignedIn)?;
        if !user.role.can_manage(area) {
            return Err(ServiceError::Forbidden {
                role: user.role,
                area,
            });
        }
        Ok(user.id)
    }

    /// Run one mutation. Failures are returned inside the outcome.
    pub async fn run(&self, request: MutationRequest) -> MutationOutcome {
        let ticket = request.ticket;
        let result = self.execute(request.area(), request.kind).await;
        MutationOutcome { ticket, result }
    }

    async fn execute(&self, area: FeatureArea, kind: MutationKind) -> Result<MutationSuccess> {
        let user_id = self.authorize(area)?;
        let entity = area.entity_name();
        match kind {
            MutationKind::Create(mut record) => {
                record.insert(CREATED_BY, user_id);
                debug!(entity, user_id, "creating record");
                let response = self.transport.post(entity, record).await?;
                info!(entity, id = ?response.data.id(), "{}", response.message);
                Ok(MutationSuccess::Created(response.data))
            }
            MutationKind::Update(id, mut record) => {
                record.insert(UPDATED_BY, user_id);
                debug!(entity, id, user_id, "updating record");
                let response = self.transport.put(entity, id, record).await?;
                info!(entity, id, "{}", response.message);
                Ok(MutationSuccess::Updated(response.data))
            }
            MutationKind::Delete(id) => {
                debug!(entity, id, user_id, "deleting record");
                let response = self.transport.delete(entity, id).await?;
                info!(entity, id, "{}", response.message);
                Ok(MutationSuccess::Deleted(response.data))
            }
        }
    }
}
