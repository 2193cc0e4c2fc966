//! # Voices - survey response collection and CSV export
//!
//! Voices stores survey submissions (arbitrary JSON objects) and exports them
//! as a flat CSV: one row per rated canvas area, prefixed with the
//! respondent's personal information.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  POST /     │────▶│ RecordStore │────▶│   flatten   │────▶│  CSV export │
//! │ (JSON body) │     │  (SQLite)   │     │ (per record)│     │ (full/sel.) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use voices::{RecordStore, full_export};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = RecordStore::open("voices.db").await.unwrap();
//!     let csv = full_export(&store).await.unwrap();
//!     println!("{}", String::from_utf8_lossy(&csv));
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Stored records, survey schema, lookup tables
//! - [`transform`] - Record to row flattening
//! - [`store`] - SQLite record store
//! - [`export`] - Full and selective CSV export
//! - [`config`] - Server configuration
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;

// Transformation
pub mod transform;

// Persistence
pub mod store;

// Export
pub mod export;

// Configuration
pub mod config;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ExportError, SchemaError, ServerError, StoreError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    AgeBracket,
    CanvasEntry,
    CanvasForm,
    EducationLevel,
    NonNativeDuration,
    PersonalInformation,
    Record,
    SurveyPayload,
    PLACEHOLDER,
};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{flatten, ExportRow, PersonalCells, COLUMN_COUNT, HEADERS};

// =============================================================================
// Re-exports - Store & Export
// =============================================================================

pub use store::{RecordStore, DEFAULT_DB_PATH};

pub use export::{
    collect_all_rows,
    collect_selected_rows,
    full_export,
    selective_export,
    write_csv,
    ShapeRef,
    EXPORT_FILENAME,
};

// =============================================================================
// Re-exports - Config & API
// =============================================================================

pub use config::ServerConfig;

pub use api::types::{error_response, HealthResponse};

// Server
pub mod server {
    pub use crate::api::server::{build_router, start_server, AppState};
}
