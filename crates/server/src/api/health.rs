//! Health check endpoint.

/// Tag for OpenAPI documentation.
pub const MISC_TAG: &str = "Miscellaneous";

/// Health check endpoint.
#[tracing::instrument()]
#[utoipa::path(
    method(get, head),
    path = "/health",
    tag = MISC_TAG,
    operation_id = "Health Check",
    summary = "Service liveness probe",
    description = "Returns `Healthy` while the process is able to answer HTTP requests.\n\n\
                   Keeps answering while `/memory` is waiting between chunks, so the \
                   probe only fails once the process has actually been killed.",
    responses(
        (status = 200, description = "Service is healthy", body = str, content_type = "text/plain", example = "Healthy")
    )
)]
pub async fn health() -> &'static str {
    "Healthy"
}
