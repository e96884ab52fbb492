//! API request and error types.

use serde::{Deserialize, Serialize};

use crate::billing::ReadingInput;

/// Body of `POST /bill`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BillRequest {
    pub tariff_id: String,
    pub readings: ReadingInput,
}

/// Error response body for 4xx errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl ToString) -> Self {
        Self {
            error: error.to_string(),
        }
    }
}
