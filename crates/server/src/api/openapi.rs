//! OpenAPI/Utoipa configuration.

use crate::api::{health::MISC_TAG, memory::MEMORY_TAG};
use utoipa::OpenApi;

/// OpenAPI documentation configuration.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Demo API",
        version = "1.0.0",
        description = "Demonstration service for observability stacks and OOM-kill restarts."
    ),
    tags(
        (name = MISC_TAG, description = "Health and ping endpoints"),
        (name = MEMORY_TAG, description = "Deliberate memory exhaustion")
    )
)]
pub struct ApiDoc;
