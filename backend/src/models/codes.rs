//! Lookup tables for coded survey answers.
//!
//! The survey client submits short codes (`"1"`, `"2"`, ...) for the age
//! bracket, education level and non-native duration questions. These tables
//! turn them into the labels written to the CSV export.
//!
//! Age and education are mandatory answers: an unknown code is a
//! [`SchemaError`]. Non-native duration is optional and falls back to
//! [`PLACEHOLDER`].

use crate::error::{SchemaError, SchemaResult};

/// Cell value written for optional answers that are absent or unrecognized.
pub const PLACEHOLDER: &str = "-";

// =============================================================================
// Age
// =============================================================================

/// Age bracket of the respondent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeBracket {
    /// 16 - 17
    Teen,
    /// 18 - 25
    YoungAdult,
    /// 26 - 45
    Adult,
    /// 46 - 65
    MiddleAged,
    /// 66 - 75
    Senior,
    /// 75+
    Elderly,
}

impl AgeBracket {
    /// Parse a bracket from its survey code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "1" => Some(Self::Teen),
            "2" => Some(Self::YoungAdult),
            "3" => Some(Self::Adult),
            "4" => Some(Self::MiddleAged),
            "5" => Some(Self::Senior),
            "6" => Some(Self::Elderly),
            _ => None,
        }
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Teen => "16 - 17",
            Self::YoungAdult => "18 - 25",
            Self::Adult => "26 - 45",
            Self::MiddleAged => "46 - 65",
            Self::Senior => "66 - 75",
            Self::Elderly => "75+",
        }
    }

    /// Resolve a code to its label, failing on unknown codes.
    pub fn resolve(code: &str) -> SchemaResult<&'static str> {
        Self::from_code(code)
            .map(Self::label)
            .ok_or_else(|| SchemaError::UnknownCode {
                field: "age",
                code: code.to_string(),
            })
    }
}

// =============================================================================
// Education
// =============================================================================

/// Highest level of education reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EducationLevel {
    HighSchool,
    Bachelors,
    Masters,
    Doctorate,
}

impl EducationLevel {
    /// Parse a level from its survey code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "1" => Some(Self::HighSchool),
            "2" => Some(Self::Bachelors),
            "3" => Some(Self::Masters),
            "4" => Some(Self::Doctorate),
            _ => None,
        }
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::HighSchool => "High school or lower",
            Self::Bachelors => "Bachelors",
            Self::Masters => "Masters",
            Self::Doctorate => "Doctorate",
        }
    }

    /// Resolve a code to its label, failing on unknown codes.
    pub fn resolve(code: &str) -> SchemaResult<&'static str> {
        Self::from_code(code)
            .map(Self::label)
            .ok_or_else(|| SchemaError::UnknownCode {
                field: "levelEducation",
                code: code.to_string(),
            })
    }
}

// =============================================================================
// Non-native duration
// =============================================================================

/// How long a non-native respondent has lived in the area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonNativeDuration {
    UnderTwoYears,
    ThreeToFiveYears,
    SixToTenYears,
    OverTenYears,
}

impl NonNativeDuration {
    /// Parse a duration from its survey code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "1" => Some(Self::UnderTwoYears),
            "2" => Some(Self::ThreeToFiveYears),
            "3" => Some(Self::SixToTenYears),
            "4" => Some(Self::OverTenYears),
            _ => None,
        }
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::UnderTwoYears => "Less than two years",
            Self::ThreeToFiveYears => "3-5 years",
            Self::SixToTenYears => "6-10 years",
            Self::OverTenYears => "10+ years",
        }
    }

    /// Resolve an optional code, never failing.
    pub fn label_or_placeholder(code: Option<&str>) -> &'static str {
        code.and_then(Self::from_code)
            .map(Self::label)
            .unwrap_or(PLACEHOLDER)
    }
}
