//! Schema validation for templates and recorded trainings.
//!
//! Training template data is checked against the global field catalog only.
//! Recorded exercises are also scoped to the fields of the exercise template
//! they reference, and report their own messages.

mod names;
mod record;
mod template;

pub use names::{
    EXERCISE_TEMPLATE_NAME_MAX, TITLE_MAX, TRAINING_TEMPLATE_NAME_MAX,
    validate_exercise_template_fields, validate_exercise_template_tags, validate_name,
    validate_title,
};
pub use record::{
    CheckedExercise, NoteValue, SetValues, UnitMap, validate_exercise_record, validate_order,
    validate_order_sequence, validate_training_notes,
};
pub use template::{ExerciseSlot, NoteSpec, TemplateSchema, validate_training_template_data};

use std::borrow::Cow;

use serde_json::Value;

use crate::error::ValidationError;

/// Integers arrive either as JSON numbers or as digit strings.
pub(crate) fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// The raw string form of a set value. Numbers are accepted and rendered.
pub(crate) fn raw_value<'a>(
    field: &str,
    value: &'a Value,
) -> Result<Cow<'a, str>, ValidationError> {
    match value {
        Value::String(s) => Ok(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Ok(Cow::Owned(n.to_string())),
        _ => Err(ValidationError::new(format!(
            "Field '{}' must be given as a string.",
            field
        ))),
    }
}

/// `None` for absent or null, otherwise the value itself.
pub(crate) fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}
