//! Fixed vocabularies: exercise fields, note field types and exercise tags.
//!
//! All tables are immutable statics; nothing here is mutated at runtime.

mod notes;
mod tags;

pub use notes::{NOTE_FIELD_TYPES, NoteFieldType};
pub use tags::{EXERCISE_TAGS, is_known_tag};

use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::ValidationError;
use crate::values::PrimitiveType;

/// One entry of the exercise field catalog.
#[derive(Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub primitive: PrimitiveType,
    /// Empty for fields that are not measured.
    pub units: &'static [&'static str],
}

impl FieldDescriptor {
    pub fn is_measured(&self) -> bool {
        !self.units.is_empty()
    }

    pub fn accepts_unit(&self, unit: &str) -> bool {
        self.units.contains(&unit)
    }

    /// The unit measured values are normalised to when compared.
    pub fn base_unit(&self) -> Option<&'static str> {
        self.units.first().copied()
    }
}

const fn field(
    name: &'static str,
    primitive: PrimitiveType,
    units: &'static [&'static str],
) -> FieldDescriptor {
    FieldDescriptor {
        name,
        primitive,
        units,
    }
}

pub static EXERCISE_FIELDS: &[FieldDescriptor] = &[
    field("sets", PrimitiveType::Int, &[]),
    field("reps", PrimitiveType::Int, &[]),
    field("weight", PrimitiveType::Float, &["kg", "lbs"]),
    field("time", PrimitiveType::Duration, &[]),
    field("distance", PrimitiveType::Float, &["m", "km", "mi"]),
    field("speed", PrimitiveType::Float, &["kph", "mph", "mps"]),
    field("rounds", PrimitiveType::Int, &[]),
    field("rest", PrimitiveType::Duration, &[]),
    field("rpe", PrimitiveType::Int, &[]),
    field("attempts", PrimitiveType::Int, &[]),
    field("successes", PrimitiveType::Int, &[]),
    field("notes", PrimitiveType::Text, &[]),
    field("tempo", PrimitiveType::Text, &[]),
];

pub fn lookup(name: &str) -> Option<&'static FieldDescriptor> {
    EXERCISE_FIELDS.iter().find(|d| d.name == name)
}

fn describe(name: &str) -> Result<&'static FieldDescriptor, ValidationError> {
    lookup(name).ok_or_else(|| ValidationError::new(format!("Field '{}' is not allowed.", name)))
}

pub fn is_measured(name: &str) -> Result<bool, ValidationError> {
    describe(name).map(FieldDescriptor::is_measured)
}

pub fn allowed_units(name: &str) -> Result<&'static [&'static str], ValidationError> {
    let descriptor = describe(name)?;
    if !descriptor.is_measured() {
        return Err(ValidationError::new(format!(
            "Field '{}' does not take a unit.",
            name
        )));
    }
    Ok(descriptor.units)
}

/// How many base units (the first allowed unit of a field) one `unit` is.
pub fn unit_factor(unit: &str) -> Option<f64> {
    let factor = match unit {
        "kg" | "m" | "kph" => 1.0,
        "lbs" => 0.453_592_37,
        "km" => 1000.0,
        "mi" => 1609.344,
        "mph" => 1.609_344,
        "mps" => 3.6,
        _ => return None,
    };
    Some(factor)
}

pub fn primitive_type(name: &str) -> Result<PrimitiveType, ValidationError> {
    describe(name).map(|d| d.primitive)
}

pub fn field_names() -> impl Iterator<Item = &'static str> {
    EXERCISE_FIELDS.iter().map(|d| d.name)
}

/// A field name known to be in the catalog.
#[derive(Clone, Copy)]
pub struct FieldName(&'static FieldDescriptor);

impl FieldName {
    pub fn parse(name: &str) -> Result<Self, ValidationError> {
        describe(name).map(FieldName)
    }

    pub fn as_str(&self) -> &'static str {
        self.0.name
    }

    pub fn descriptor(&self) -> &'static FieldDescriptor {
        self.0
    }
}

impl PartialEq for FieldName {
    fn eq(&self, other: &Self) -> bool {
        self.0.name == other.0.name
    }
}

impl Eq for FieldName {}

impl PartialOrd for FieldName {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FieldName {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.name.cmp(other.0.name)
    }
}

impl std::hash::Hash for FieldName {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.name.hash(state)
    }
}

impl fmt::Debug for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0.name)
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.name)
    }
}

impl Serialize for FieldName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0.name)
    }
}
