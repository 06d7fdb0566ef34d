//! Ping endpoint emitting one span and one log line per call.

use crate::AppResources;
use crate::api::health::MISC_TAG;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PingResponse {
    pub ok: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
    pub version: String,
}

#[utoipa::path(
    get,
    path = "/ping",
    tag = MISC_TAG,
    operation_id = "Ping",
    summary = "Trace and log demonstration",
    description = "Opens a `ping-endpoint` span tagged `custom.endpoint=ping`, logs the call \
                   and returns the current time with the service version.",
    responses(
        (status = 200, description = "Pong", body = PingResponse, content_type = "application/json")
    )
)]
pub async fn ping(Extension(resources): Extension<AppResources>) -> Json<PingResponse> {
    let span = tracing::info_span!("ping-endpoint", custom.endpoint = "ping");
    let at = span.in_scope(|| {
        let at = OffsetDateTime::now_utc();
        tracing::info!(timestamp = %at, "Ping endpoint called at {at}");
        at
    });

    Json(PingResponse {
        ok: true,
        at,
        version: resources.config.telemetry.service_version.clone(),
    })
}
