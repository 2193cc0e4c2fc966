//! Flatten one stored survey record into CSV rows.
//!
//! ```text
//! Record #7                              Rows
//! ┌──────────────────────────────┐      ┌────┬───┬──────────┬─────────┐
//! │ personalInformation { .. }   │      │ id │ i │ personal │ canvas  │
//! │ canvas: [ A1, B2, C3 ]       │  →   ├────┼───┼──────────┼─────────┤
//! └──────────────────────────────┘      │ 7  │ 0 │  (same)  │ A1 ...  │
//!                                       │ 7  │ 1 │  (same)  │ B2 ...  │
//!                                       │ 7  │ 2 │  (same)  │ C3 ...  │
//!                                       └────┴───┴──────────┴─────────┘
//! ```
//!
//! `(id, shape id)` addresses a single row. The personal prefix is resolved
//! once per record, before the first row is produced, so a record either
//! flattens completely or fails without yielding anything.

use serde_json::Value;

use crate::error::{SchemaError, SchemaResult};
use crate::models::{
    AgeBracket, CanvasForm, EducationLevel, NonNativeDuration, PersonalInformation,
    SurveyPayload, PLACEHOLDER,
};

/// Column names of the export, in order.
///
/// "area name" carries the canvas form's `name` field.
pub const HEADERS: [&str; 15] = [
    "id",
    "shape id",
    "age",
    "gender",
    "education",
    "birth place",
    "current place",
    "non native",
    "area name",
    "sound example",
    "associations",
    "correctness",
    "friendliness",
    "pleasantness",
    "trustworthiness",
];

/// Number of cells in every row.
pub const COLUMN_COUNT: usize = HEADERS.len();

/// `gender` value that defers to `genderCustom`.
const GENDER_OTHER: &str = "other";

/// Separator for multi-valued answers.
const JOIN_SEPARATOR: &str = ", ";

/// The six personal-information cells shared by all rows of a record.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonalCells {
    pub age: &'static str,
    pub gender: String,
    pub education: String,
    pub birth_place: String,
    pub current_place: String,
    pub non_native: &'static str,
}

impl PersonalCells {
    /// Resolve coded answers into display labels.
    pub fn resolve(pi: &PersonalInformation) -> SchemaResult<Self> {
        let age = AgeBracket::resolve(&pi.age)?;

        let gender = if pi.gender == GENDER_OTHER {
            pi.gender_custom
                .clone()
                .ok_or(SchemaError::MissingField("genderCustom"))?
        } else {
            pi.gender.clone()
        };

        let education = pi
            .level_education
            .iter()
            .map(|code| EducationLevel::resolve(code))
            .collect::<SchemaResult<Vec<_>>>()?
            .join(JOIN_SEPARATOR);

        let non_native =
            NonNativeDuration::label_or_placeholder(pi.non_native.as_ref().and_then(Value::as_str));

        Ok(Self {
            age,
            gender,
            education,
            birth_place: pi.birth_place.clone(),
            current_place: pi.current_place.clone(),
            non_native,
        })
    }
}

/// One output row: a canvas entry joined with its record's personal cells.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    pub record_id: i64,
    pub shape_id: usize,
    pub personal: PersonalCells,
    pub area_name: String,
    pub sound_example: Value,
    pub associations: String,
    pub correctness: Value,
    pub friendliness: Value,
    pub pleasantness: Value,
    pub trustworthiness: Value,
}

impl ExportRow {
    fn new(record_id: i64, shape_id: usize, personal: PersonalCells, form: CanvasForm) -> Self {
        let sound_example = if is_falsy(&form.sound_example) {
            Value::from(PLACEHOLDER)
        } else {
            form.sound_example
        };

        Self {
            record_id,
            shape_id,
            personal,
            area_name: form.name,
            sound_example,
            associations: form.associations.join(JOIN_SEPARATOR),
            correctness: form.correctness,
            friendliness: form.friendliness,
            pleasantness: form.pleasantness,
            trustworthiness: form.trustworthiness,
        }
    }

    /// The row's cells, in [`HEADERS`] order.
    pub fn cells(&self) -> Vec<Value> {
        let p = &self.personal;
        vec![
            Value::from(self.record_id),
            Value::from(self.shape_id),
            Value::from(p.age),
            Value::from(p.gender.as_str()),
            Value::from(p.education.as_str()),
            Value::from(p.birth_place.as_str()),
            Value::from(p.current_place.as_str()),
            Value::from(p.non_native),
            Value::from(self.area_name.as_str()),
            self.sound_example.clone(),
            Value::from(self.associations.as_str()),
            self.correctness.clone(),
            self.friendliness.clone(),
            self.pleasantness.clone(),
            self.trustworthiness.clone(),
        ]
    }

    /// The row rendered as CSV fields.
    pub fn to_record(&self) -> Vec<String> {
        self.cells().iter().map(render_cell).collect()
    }
}

/// Flatten a stored payload into one row per canvas entry.
///
/// Decoding and personal-cell resolution happen up front; the returned
/// iterator cannot fail.
pub fn flatten(
    payload: &Value,
    record_id: i64,
) -> SchemaResult<impl Iterator<Item = ExportRow>> {
    let survey = SurveyPayload::decode(payload)?;
    let personal = PersonalCells::resolve(&survey.personal_information)?;

    Ok(survey
        .canvas
        .into_iter()
        .enumerate()
        .map(move |(i, entry)| ExportRow::new(record_id, i, personal.clone(), entry.form)))
}

/// Render a JSON scalar as CSV text.
///
/// Strings are written without JSON quotes; null becomes an empty field.
fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Truthiness as the survey client understands it.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
