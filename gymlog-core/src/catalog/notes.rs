use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::values::PrimitiveType;

/// Field types a training note may declare.
///
/// Kept apart from the exercise catalog: star scales and "Number" only
/// exist here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoteFieldType {
    Text,
    Number,
    Datetime,
    Duration,
    #[serde(rename = "5stars")]
    FiveStars,
    #[serde(rename = "10stars")]
    TenStars,
}

pub static NOTE_FIELD_TYPES: &[NoteFieldType] = &[
    NoteFieldType::Text,
    NoteFieldType::Number,
    NoteFieldType::Datetime,
    NoteFieldType::Duration,
    NoteFieldType::FiveStars,
    NoteFieldType::TenStars,
];

impl NoteFieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteFieldType::Text => "Text",
            NoteFieldType::Number => "Number",
            NoteFieldType::Datetime => "Datetime",
            NoteFieldType::Duration => "Duration",
            NoteFieldType::FiveStars => "5stars",
            NoteFieldType::TenStars => "10stars",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        NOTE_FIELD_TYPES
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ValidationError::new(format!("Invalid field '{}' in note.", s)))
    }

    pub fn primitive(&self) -> PrimitiveType {
        match self {
            NoteFieldType::Text => PrimitiveType::Text,
            NoteFieldType::Number => PrimitiveType::Float,
            NoteFieldType::Datetime => PrimitiveType::Datetime,
            NoteFieldType::Duration => PrimitiveType::Duration,
            NoteFieldType::FiveStars => PrimitiveType::FiveStars,
            NoteFieldType::TenStars => PrimitiveType::TenStars,
        }
    }
}

impl fmt::Display for NoteFieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_names() {
        assert_eq!(NoteFieldType::parse("5stars").unwrap(), NoteFieldType::FiveStars);
        assert_eq!(NoteFieldType::parse("Number").unwrap().primitive(), PrimitiveType::Float);
        let err = NoteFieldType::parse("text").unwrap_err();
        assert!(err.message().contains("Invalid field"));
    }

    #[test]
    fn serde_names_match_parse() {
        for t in NOTE_FIELD_TYPES {
            let json = serde_json::to_string(t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.as_str()));
        }
    }
}
