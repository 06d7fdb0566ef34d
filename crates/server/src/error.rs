use axum::http::StatusCode;
use std::collections::TryReserveError;
use thiserror::Error;

/// The allocator could not obtain the requested block from the host.
#[derive(Debug, Error)]
#[error("Host refused to allocate {requested} bytes: {reason}")]
pub struct AllocationRefused {
    pub requested: usize,
    pub reason: String,
}

impl AllocationRefused {
    pub fn from_reserve(requested: usize, err: TryReserveError) -> Self {
        Self {
            requested,
            reason: err.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PressureError {
    #[error("Invalid pressure configuration: {0}")]
    InvalidConfiguration(String),
    /// `chunk` is the 1-based number of the chunk that could not be allocated.
    #[error("Out of memory at chunk {chunk}/{total}: {source}")]
    ResourceExhaustion {
        chunk: usize,
        total: usize,
        #[source]
        source: AllocationRefused,
    },
}

impl PressureError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PressureError::InvalidConfiguration(_) => StatusCode::BAD_REQUEST,
            PressureError::ResourceExhaustion { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_out_of_memory(&self) -> bool {
        matches!(self, PressureError::ResourceExhaustion { .. })
    }
}
