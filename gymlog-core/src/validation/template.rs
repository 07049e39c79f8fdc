use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::{coerce_int, present, raw_value};
use crate::catalog::{FieldName, NoteFieldType};
use crate::error::ValidationError;
use crate::values::{FieldValue, check_value};

/// Typed form of a training template's `data` blob.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateSchema {
    pub notes: Vec<NoteSpec>,
    pub exercises: Vec<ExerciseSlot>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NoteSpec {
    pub name: String,
    pub field: NoteFieldType,
    pub required: bool,
    /// `None` when no default was given or it was `""`.
    pub default: Option<FieldValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseSlot {
    pub template: i64,
    /// Units of the measured fields used in `sets`.
    pub units: BTreeMap<FieldName, &'static str>,
    /// `None` marks a value intentionally left empty.
    pub sets: Vec<BTreeMap<FieldName, Option<FieldValue>>>,
}

pub fn validate_training_template_data(data: &Value) -> Result<TemplateSchema, ValidationError> {
    let Value::Object(data) = data else {
        return Err(ValidationError::new("Data must be a dictionary."));
    };

    let mut schema = TemplateSchema::default();

    if let Some(notes) = present(data.get("Notes")) {
        let Value::Array(notes) = notes else {
            return Err(ValidationError::new("Notes must be a list."));
        };
        for note in notes {
            schema.notes.push(note_spec(note)?);
        }
    }

    if let Some(exercises) = present(data.get("Exercises")) {
        let Value::Array(exercises) = exercises else {
            return Err(ValidationError::new("Exercises must be a list."));
        };
        for exercise in exercises {
            schema.exercises.push(exercise_slot(exercise)?);
        }
    }

    Ok(schema)
}

fn note_spec(note: &Value) -> Result<NoteSpec, ValidationError> {
    let Value::Object(note) = note else {
        return Err(ValidationError::new("Each note must be a dictionary."));
    };

    let name = match note.get("Name") {
        Some(Value::String(name)) if !name.is_empty() => name.clone(),
        _ => return Err(ValidationError::new("Note name must be a non-empty string.")),
    };

    let field = match note.get("Field") {
        Some(Value::String(field)) => NoteFieldType::parse(field)?,
        other => {
            return Err(ValidationError::new(format!(
                "Invalid field '{}' in note.",
                other.map(Value::to_string).unwrap_or_default()
            )));
        }
    };

    let required = parse_required(note.get("Required"))?;

    let default = match note.get("Default") {
        None => None,
        Some(Value::String(d)) if d.is_empty() => None,
        Some(Value::String(d)) => Some(
            check_value(field.primitive(), d)
                .map_err(|e| e.context(format!("Default of note '{}'", name)))?,
        ),
        Some(_) => return Err(ValidationError::new("Note 'Default' must be a string.")),
    };

    Ok(NoteSpec {
        name,
        field,
        required,
        default,
    })
}

pub(super) fn parse_required(value: Option<&Value>) -> Result<bool, ValidationError> {
    match value.and_then(Value::as_str) {
        Some("True") => Ok(true),
        Some("False") => Ok(false),
        _ => Err(ValidationError::new("Note 'Required' must be 'True' or 'False'.")),
    }
}

fn exercise_slot(exercise: &Value) -> Result<ExerciseSlot, ValidationError> {
    let Value::Object(exercise) = exercise else {
        return Err(ValidationError::new("Each exercise must be a dictionary."));
    };

    let template = exercise
        .get("Template")
        .and_then(coerce_int)
        .ok_or_else(|| ValidationError::new("'Template' must be an integer in each exercise."))?;

    let empty = Map::new();
    let unit_map = match present(exercise.get("Unit")) {
        None => &empty,
        Some(Value::Object(units)) => units,
        Some(_) => return Err(ValidationError::new("'Unit' must be a dictionary.")),
    };

    let mut slot = ExerciseSlot {
        template,
        units: BTreeMap::new(),
        sets: Vec::new(),
    };

    let sets = match present(exercise.get("Sets")) {
        None => return Ok(slot),
        Some(Value::Array(sets)) => sets,
        Some(_) => return Err(ValidationError::new("'Sets' must be a list.")),
    };

    for set in sets {
        let Value::Object(set) = set else {
            return Err(ValidationError::new("Each set must be a dictionary."));
        };
        if set.is_empty() {
            return Err(ValidationError::new("Set dictionaries must not be empty."));
        }

        let mut values = BTreeMap::new();
        for (key, value) in set {
            let field = FieldName::parse(key)?;
            let raw = raw_value(key, value)?;
            if raw.is_empty() {
                values.insert(field, None);
                continue;
            }

            let descriptor = field.descriptor();
            let checked = check_value(descriptor.primitive, &raw)
                .map_err(|e| e.context(format!("Field '{}'", key)))?;

            if descriptor.is_measured() {
                let unit = unit_map
                    .get(key)
                    .and_then(Value::as_str)
                    .and_then(|u| descriptor.units.iter().find(|allowed| **allowed == u))
                    .ok_or_else(|| {
                        ValidationError::new(format!(
                            "Field '{}' must have unit from [{}].",
                            key,
                            descriptor.units.join(", ")
                        ))
                    })?;
                slot.units.insert(field, *unit);
            }

            values.insert(field, Some(checked));
        }
        slot.sets.push(values);
    }

    Ok(slot)
}
