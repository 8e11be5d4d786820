use std::future::Future;

use clinic_model::{Record, RecordId};

use crate::error::Result;
use crate::response::ApiResponse;

/// Request/response access to entity collections.
///
/// Completions are applied by the caller on its own logical thread; the
/// transport itself holds no UI state.
pub trait Transport: Send + Sync {
    /// Fetch a whole collection.
    fn list(&self, entity: &str) -> impl Future<Output = Result<ApiResponse<Vec<Record>>>> + Send;

    /// Fetch one record by id.
    fn record(
        &self,
        entity: &str,
        id: RecordId,
    ) -> impl Future<Output = Result<ApiResponse<Record>>> + Send;

    /// Create a record; the response carries it with its assigned id.
    fn post(
        &self,
        entity: &str,
        record: Record,
    ) -> impl Future<Output = Result<ApiResponse<Record>>> + Send;

    /// Replace the record with `id`.
    fn put(
        &self,
        entity: &str,
        id: RecordId,
        record: Record,
    ) -> impl Future<Output = Result<ApiResponse<Record>>> + Send;

    /// Delete the record with `id`; the response carries the deleted id.
    fn delete(
        &self,
        entity: &str,
        id: RecordId,
    ) -> impl Future<Output = Result<ApiResponse<RecordId>>> + Send;
}
