//! Memory pressure endpoint.

use crate::AppResources;
use crate::error::PressureError;
use crate::memory::AllocationSummary;
use axum::{
    Extension, Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Tag for OpenAPI documentation.
pub const MEMORY_TAG: &str = "Memory Pressure";

/// Error body returned when a run is rejected or runs out of memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MemoryErrorResponse {
    pub status: String,
    pub error: String,
}

impl From<&PressureError> for MemoryErrorResponse {
    fn from(err: &PressureError) -> Self {
        let status = if err.is_out_of_memory() {
            "out_of_memory"
        } else {
            "invalid_configuration"
        };
        Self {
            status: status.into(),
            error: err.to_string(),
        }
    }
}

#[tracing::instrument(skip(resources))]
#[utoipa::path(
    method(get, post),
    path = "/memory",
    tag = MEMORY_TAG,
    operation_id = "Trigger Memory Pressure",
    summary = "Allocate and retain memory until the pod is OOM-killed",
    description = "Allocates the configured number of chunks (20 MiB x 10 by default), writes \
                   every page of each chunk and keeps them for the rest of the process \
                   lifetime, pausing between chunks so logs and metrics can capture the \
                   growth.\n\n\
                   **Warning:** in a container with a memory limit below the target the \
                   process is expected to be killed before this request completes. \
                   Calls are cumulative.",
    responses(
        (status = 200, description = "All chunks allocated", body = AllocationSummary, content_type = "application/json"),
        (status = 400, description = "Pressure configuration is invalid", body = MemoryErrorResponse, content_type = "application/json"),
        (status = 500, description = "Host refused an allocation", body = MemoryErrorResponse, content_type = "application/json")
    )
)]
pub async fn memory(Extension(resources): Extension<AppResources>) -> Response {
    match resources.generator.trigger().await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(err) => (err.status_code(), Json(MemoryErrorResponse::from(&err))).into_response(),
    }
}
