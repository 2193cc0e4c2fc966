//! Domain models for the Voices survey backend.
//!
//! - [`Record`] - A stored submission: identifier plus opaque JSON payload
//! - [`SurveyPayload`] - The survey schema a payload is decoded into at export time
//! - [`PersonalInformation`] - Respondent answers shared by every exported row
//! - [`CanvasEntry`] / [`CanvasForm`] - One rated area drawn on the map canvas
//!
//! The store keeps payloads verbatim. Only the flattening transform looks
//! inside them, through [`SurveyPayload::decode`].

pub mod codes;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SchemaResult;

pub use codes::{AgeBracket, EducationLevel, NonNativeDuration, PLACEHOLDER};

// =============================================================================
// Stored Record
// =============================================================================

/// A submission as persisted by the record store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    /// Identifier assigned by the store. Never reused.
    pub id: i64,
    /// The submitted JSON object, untouched.
    pub payload: Value,
    /// Time of insertion.
    pub created_at: DateTime<Utc>,
}

impl Record {
    /// The payload object with the record `id` merged in.
    ///
    /// This is the element shape of the `GET /` listing.
    pub fn listing_json(&self) -> Value {
        let mut item = self.payload.clone();
        if let Value::Object(ref mut obj) = item {
            obj.insert("id".to_string(), Value::from(self.id));
        }
        item
    }
}

// =============================================================================
// Survey Payload
// =============================================================================

/// A payload decoded against the survey schema.
///
/// Keys the export does not use (`email`, canvas `path`, ...) are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyPayload {
    pub personal_information: PersonalInformation,
    pub canvas: Vec<CanvasEntry>,
}

impl SurveyPayload {
    /// Decode a stored payload, failing on missing keys or wrong types.
    pub fn decode(payload: &Value) -> SchemaResult<Self> {
        Ok(Self::deserialize(payload)?)
    }
}

/// Respondent answers from the personal information page.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInformation {
    /// Age bracket code, see [`AgeBracket`].
    pub age: String,
    /// Free text; `"other"` defers to `gender_custom`.
    pub gender: String,
    #[serde(default)]
    pub gender_custom: Option<String>,
    /// Education level codes, see [`EducationLevel`].
    pub level_education: Vec<String>,
    pub birth_place: String,
    pub current_place: String,
    /// Optional duration code, see [`NonNativeDuration`]. Non-string values
    /// are treated as unrecognized.
    #[serde(default)]
    pub non_native: Option<Value>,
}

/// One element of the payload's `canvas` array.
#[derive(Debug, Clone, Deserialize)]
pub struct CanvasEntry {
    pub form: CanvasForm,
}

/// Answers given for one drawn area.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasForm {
    pub name: String,
    /// Any JSON value; falsy values export as [`PLACEHOLDER`].
    pub sound_example: Value,
    pub associations: Vec<String>,
    pub correctness: Value,
    pub friendliness: Value,
    pub pleasantness: Value,
    pub trustworthiness: Value,
}

// =============================================================================
// Tests
// =============================================================================
