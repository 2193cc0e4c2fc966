//! Error types for the Voices collection and export service.
//!
//! This module defines a hierarchy of error types, one per layer:
//!
//! - [`SchemaError`] - A stored payload does not match the survey schema
//! - [`StoreError`] - Record store (SQLite) errors
//! - [`ExportError`] - CSV export orchestration errors
//! - [`ServerError`] - HTTP layer errors, mapped onto status codes
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::logs::{log_error, log_warning};
use crate::api::types::error_response;

// =============================================================================
// Schema Errors
// =============================================================================

/// Errors raised while decoding or flattening a survey payload.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Payload is missing a required key or has a value of the wrong type.
    #[error("Malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A mandatory coded value has no entry in its lookup table.
    #[error("Unknown {field} code: '{code}'")]
    UnknownCode { field: &'static str, code: String },

    /// A field required by the value of another field is absent.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

// =============================================================================
// Store Errors
// =============================================================================

/// Errors from the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO error while preparing the database location.
    #[error("Store IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No record carries the requested id.
    #[error("Record not found: {0}")]
    NotFound(i64),

    /// Payload rejected before any write.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors while producing a CSV export.
///
/// Every variant is fatal for the whole export: no partial document is
/// ever produced.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Store error (including unknown record ids).
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A stored payload could not be flattened.
    #[error("Record {record_id}: {source}")]
    Schema {
        record_id: i64,
        #[source]
        source: SchemaError,
    },

    /// Selected shape index is past the end of the record's rows.
    #[error("Record {record_id} has {row_count} shape(s), no shape {shape_id}")]
    ShapeOutOfRange {
        record_id: i64,
        shape_id: usize,
        row_count: usize,
    },

    /// CSV serialization error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error while finishing the document.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Request body absent or unusable. Answered with an empty 400.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Export failed.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Store failed outside of an export.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ServerError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Store(StoreError::InvalidPayload(_)) => StatusCode::BAD_REQUEST,
            Self::Store(StoreError::NotFound(_))
            | Self::Export(ExportError::Store(StoreError::NotFound(_)))
            | Self::Export(ExportError::ShapeOutOfRange { .. }) => StatusCode::NOT_FOUND,
            Self::Export(ExportError::Schema { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_client_error() {
            log_warning(self.to_string());
        } else {
            log_error(self.to_string());
        }

        if status == StatusCode::BAD_REQUEST {
            return status.into_response();
        }
        (status, Json(error_response(&self.to_string()))).into_response()
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for payload decoding and flattening.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
