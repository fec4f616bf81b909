//! Shared error response shape for the transcoding pipeline services.
//!
//! Every service defines its own `AppError` enum (the error *kinds* differ
//! per service, per the error table in the spec) but all of them render to
//! this same wire shape at HTTP boundaries, and all of them carry one of the
//! `error_codes` below so a client can branch on `code` without parsing
//! `message`.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Standard error response body returned by every HTTP-facing service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status: u16,
    pub error_type: String,
    pub code: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(
        error: &str,
        message: &str,
        status: u16,
        error_type: &str,
        code: &str,
    ) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            status,
            error_type: error_type.to_string(),
            code: code.to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Stable error codes shared across services, so a client need not depend
/// on per-service error enums to branch on failure kind.
pub mod error_codes {
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const DOWNLOAD_ERROR: &str = "DOWNLOAD_ERROR";
    pub const ENCODE_ERROR: &str = "ENCODE_ERROR";
    pub const BUS_TRANSIENT_ERROR: &str = "BUS_TRANSIENT_ERROR";
    pub const KV_TRANSIENT_ERROR: &str = "KV_TRANSIENT_ERROR";
    pub const MISSING_METADATA: &str = "MISSING_METADATA";
    pub const MISSING_SEGMENT: &str = "MISSING_SEGMENT";
    pub const PACKAGE_ERROR: &str = "PACKAGE_ERROR";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_stamps_timestamp_and_fields() {
        let resp = ErrorResponse::new(
            "Bad Request",
            "stream_name is required",
            400,
            "validation_error",
            error_codes::VALIDATION_ERROR,
        );
        assert_eq!(resp.status, 400);
        assert_eq!(resp.code, "VALIDATION_ERROR");
        assert!(!resp.timestamp.is_empty());
    }
}
