use std::collections::BTreeSet;

use crate::catalog::{self, EXERCISE_TAGS, FieldName};
use crate::error::ValidationError;

pub const TITLE_MAX: usize = 70;
pub const TRAINING_TEMPLATE_NAME_MAX: usize = 70;
pub const EXERCISE_TEMPLATE_NAME_MAX: usize = 50;

pub fn validate_name(what: &str, name: &str, max: usize) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new(format!("{} must not be empty.", what)));
    }
    if name.chars().count() > max {
        return Err(ValidationError::new(format!(
            "{} must be at most {} characters.",
            what, max
        )));
    }
    Ok(())
}

/// Titles are optional but bounded.
pub fn validate_title(title: Option<&str>) -> Result<(), ValidationError> {
    match title {
        Some(title) if title.chars().count() > TITLE_MAX => Err(ValidationError::new(format!(
            "Title must be at most {} characters.",
            TITLE_MAX
        ))),
        _ => Ok(()),
    }
}

pub fn validate_exercise_template_fields(
    fields: &[String],
) -> Result<BTreeSet<FieldName>, ValidationError> {
    if fields.is_empty() {
        return Err(ValidationError::new("Fields must not be empty."));
    }

    let invalid: Vec<&str> = fields
        .iter()
        .map(String::as_str)
        .filter(|f| catalog::lookup(f).is_none())
        .collect();
    if !invalid.is_empty() {
        return Err(ValidationError::new(format!(
            "Invalid fields provided: {}. Allowed fields are: {}.",
            invalid.join(", "),
            catalog::field_names().collect::<Vec<_>>().join(", ")
        )));
    }

    fields.iter().map(|f| FieldName::parse(f)).collect()
}

pub fn validate_exercise_template_tags(
    tags: &[String],
) -> Result<BTreeSet<String>, ValidationError> {
    let invalid: Vec<&str> = tags
        .iter()
        .map(String::as_str)
        .filter(|t| !catalog::is_known_tag(t))
        .collect();
    if !invalid.is_empty() {
        return Err(ValidationError::new(format!(
            "Invalid tags provided: {}. Allowed tags are: {}.",
            invalid.join(", "),
            EXERCISE_TAGS.join(", ")
        )));
    }
    Ok(tags.iter().cloned().collect())
}
