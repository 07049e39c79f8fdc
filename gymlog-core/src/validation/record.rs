use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::template::parse_required;
use super::{coerce_int, present, raw_value};
use crate::catalog::{FieldName, NoteFieldType};
use crate::error::ValidationError;
use crate::objects::ExerciseTemplate;
use crate::values::{FieldValue, check_value};

pub type UnitMap = BTreeMap<FieldName, &'static str>;
pub type SetValues = BTreeMap<FieldName, Option<FieldValue>>;

/// Units and sets of one recorded exercise after validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckedExercise {
    pub units: Option<UnitMap>,
    pub sets: Option<Vec<SetValues>>,
}

impl CheckedExercise {
    pub fn set_count(&self) -> usize {
        self.sets.as_ref().map_or(0, Vec::len)
    }
}

/// A note attached to a recorded training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteValue {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Field")]
    pub field: NoteFieldType,
    #[serde(rename = "Required", with = "required_flag")]
    pub required: bool,
    #[serde(rename = "Value")]
    pub value: String,
}

mod required_flag {
    use super::*;

    pub fn serialize<S: Serializer>(required: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *required { "True" } else { "False" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match String::deserialize(deserializer)?.as_str() {
            "True" => Ok(true),
            "False" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected 'True' or 'False', got '{}'",
                other
            ))),
        }
    }
}

const NOTE_KEYS: [&str; 4] = ["Field", "Name", "Required", "Value"];

fn scoped_field(template: &ExerciseTemplate, key: &str) -> Result<FieldName, ValidationError> {
    let field = FieldName::parse(key)?;
    if !template.fields.contains(&field) {
        return Err(ValidationError::new(format!(
            "Field '{}' is not in exercise template '{}'.",
            key, template.name
        )));
    }
    Ok(field)
}

/// Checks the units and sets of an exercise against its template's fields.
pub fn validate_exercise_record(
    template: &ExerciseTemplate,
    units: Option<&Value>,
    sets: Option<&Value>,
) -> Result<CheckedExercise, ValidationError> {
    let units = match present(units) {
        None => None,
        Some(Value::Object(map)) => {
            let mut checked = UnitMap::new();
            for (key, unit) in map {
                let field = scoped_field(template, key)?;
                let descriptor = field.descriptor();
                if !descriptor.is_measured() {
                    return Err(ValidationError::new(format!(
                        "Field '{}' does not take a unit.",
                        key
                    )));
                }
                let unit = unit
                    .as_str()
                    .and_then(|u| descriptor.units.iter().find(|allowed| **allowed == u))
                    .ok_or_else(|| {
                        ValidationError::new(format!(
                            "Unit {} is not allowed for field '{}'; expected one of {}.",
                            unit,
                            key,
                            descriptor.units.join(", ")
                        ))
                    })?;
                checked.insert(field, *unit);
            }
            Some(checked)
        }
        Some(_) => return Err(ValidationError::new("Units must be a dictionary.")),
    };

    let sets = match present(sets) {
        None => None,
        Some(Value::Array(list)) => {
            let mut checked = Vec::with_capacity(list.len());
            for set in list {
                checked.push(check_set(template, set, units.as_ref())?);
            }
            Some(checked)
        }
        Some(_) => return Err(ValidationError::new("Sets must be a list.")),
    };

    Ok(CheckedExercise { units, sets })
}

fn check_set(
    template: &ExerciseTemplate,
    set: &Value,
    units: Option<&UnitMap>,
) -> Result<SetValues, ValidationError> {
    let Value::Object(set) = set else {
        return Err(ValidationError::new("Each set must be a dictionary."));
    };
    if set.is_empty() {
        return Err(ValidationError::new("Set dictionaries must not be empty."));
    }

    let mut values = SetValues::new();
    for (key, value) in set {
        let field = scoped_field(template, key)?;
        let raw = raw_value(key, value)?;
        if raw.is_empty() {
            values.insert(field, None);
            continue;
        }

        let descriptor = field.descriptor();
        let checked = check_value(descriptor.primitive, &raw)
            .map_err(|e| e.context(format!("Field '{}'", key)))?;
        if descriptor.is_measured() && !units.is_some_and(|u| u.contains_key(&field)) {
            return Err(ValidationError::new(format!(
                "Field {} in 'Sets' must have unit",
                key
            )));
        }
        values.insert(field, Some(checked));
    }
    Ok(values)
}

/// Checks the notes of a recorded training.
///
/// Every note carries exactly `Name`, `Field`, `Required` and `Value`.
pub fn validate_training_notes(
    notes: Option<&Value>,
) -> Result<Option<Vec<NoteValue>>, ValidationError> {
    let Some(notes) = present(notes) else {
        return Ok(None);
    };
    let Value::Array(notes) = notes else {
        return Err(ValidationError::new("Notes must be a list."));
    };

    let mut checked = Vec::with_capacity(notes.len());
    for note in notes {
        let Value::Object(note) = note else {
            return Err(ValidationError::new("Each note must be a dictionary."));
        };
        let keys: BTreeSet<&str> = note.keys().map(String::as_str).collect();
        if keys != BTreeSet::from(NOTE_KEYS) {
            return Err(ValidationError::new(
                "Each note must have exactly the keys Name, Field, Required and Value.",
            ));
        }

        let name = match note.get("Name") {
            Some(Value::String(name)) if !name.is_empty() => name.clone(),
            _ => return Err(ValidationError::new("Note name must be a non-empty string.")),
        };
        let field = match note.get("Field") {
            Some(Value::String(field)) => NoteFieldType::parse(field)?,
            _ => return Err(ValidationError::new("Note 'Field' must be a string.")),
        };
        let required = parse_required(note.get("Required"))?;
        let value = match note.get("Value") {
            Some(Value::String(value)) => value.clone(),
            _ => return Err(ValidationError::new("Note 'Value' must be a string.")),
        };

        if value.is_empty() {
            if required {
                return Err(ValidationError::new(format!(
                    "Note '{}' is required but has no value.",
                    name
                )));
            }
        } else {
            check_value(field.primitive(), &value)
                .map_err(|e| e.context(format!("Note '{}'", name)))?;
        }

        checked.push(NoteValue {
            name,
            field,
            required,
            value,
        });
    }
    Ok(Some(checked))
}

pub fn validate_order(value: Option<&Value>) -> Result<u32, ValidationError> {
    present(value)
        .and_then(coerce_int)
        .filter(|order| *order > 0)
        .and_then(|order| u32::try_from(order).ok())
        .ok_or_else(|| ValidationError::new("Order must be a positive integer."))
}

/// Orders of one submission must be exactly `1..=N`.
pub fn validate_order_sequence(orders: &[u32]) -> Result<(), ValidationError> {
    let submitted: BTreeSet<u32> = orders.iter().copied().collect();
    let expected: BTreeSet<u32> = (1..=orders.len() as u32).collect();
    if submitted != expected {
        return Err(ValidationError::new(
            "The order of exercises is incorrect. It should start from 1 and increase by 1.",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::ExerciseTemplate;
    use serde_json::json;

    fn bench_press() -> ExerciseTemplate {
        ExerciseTemplate::for_tests(1, 1, "Bench press", &["reps", "weight"])
    }

    fn record(units: Value, sets: Value) -> Result<CheckedExercise, ValidationError> {
        validate_exercise_record(&bench_press(), Some(&units), Some(&sets))
    }

    #[test]
    fn accepts_sets_with_units() {
        let checked = record(
            json!({"weight": "kg"}),
            json!([{"reps": "7", "weight": "45"}, {"reps": "4", "weight": "60"}]),
        )
        .unwrap();
        assert_eq!(checked.set_count(), 2);
        let weight = FieldName::parse("weight").unwrap();
        assert_eq!(checked.units.unwrap().get(&weight), Some(&"kg"));
        let sets = checked.sets.unwrap();
        assert_eq!(sets[0].get(&weight), Some(&Some(FieldValue::Float(45.0))));
    }

    #[test]
    fn absent_units_and_sets() {
        let checked = validate_exercise_record(&bench_press(), None, Some(&Value::Null)).unwrap();
        assert_eq!(checked, CheckedExercise::default());
    }

    #[test]
    fn measured_field_without_unit() {
        let err = record(Value::Null, json!([{"weight": "50"}])).unwrap_err();
        assert_eq!(err.message(), "Field weight in 'Sets' must have unit");
        assert!(record(json!({"weight": "kg"}), json!([{"weight": "50"}])).is_ok());
    }

    #[test]
    fn empty_value_skips_checks() {
        let checked = record(Value::Null, json!([{"weight": "", "reps": ""}])).unwrap();
        let reps = FieldName::parse("reps").unwrap();
        assert_eq!(checked.sets.unwrap()[0].get(&reps), Some(&None));
    }

    #[test]
    fn unknown_field_and_foreign_field_are_distinguished() {
        let err = record(Value::Null, json!([{"bogus": "1"}])).unwrap_err();
        assert_eq!(err.message(), "Field 'bogus' is not allowed.");

        let err = record(Value::Null, json!([{"rest": "01:00"}])).unwrap_err();
        assert_eq!(err.message(), "Field 'rest' is not in exercise template 'Bench press'.");

        let err = record(json!({"distance": "km"}), Value::Null).unwrap_err();
        assert!(err.message().contains("not in exercise template"));
    }

    #[test]
    fn unit_checks() {
        let err = record(json!({"weight": "stone"}), Value::Null).unwrap_err();
        assert_eq!(
            err.message(),
            "Unit \"stone\" is not allowed for field 'weight'; expected one of kg, lbs."
        );
        let err = record(json!({"reps": "kg"}), Value::Null).unwrap_err();
        assert_eq!(err.message(), "Field 'reps' does not take a unit.");
        let err = record(json!(["kg"]), Value::Null).unwrap_err();
        assert_eq!(err.message(), "Units must be a dictionary.");
    }

    #[test]
    fn set_shape_and_types() {
        assert_eq!(
            record(Value::Null, json!({"reps": "1"})).unwrap_err().message(),
            "Sets must be a list."
        );
        assert_eq!(
            record(Value::Null, json!([{}])).unwrap_err().message(),
            "Set dictionaries must not be empty."
        );
        assert_eq!(
            record(Value::Null, json!(["7"])).unwrap_err().message(),
            "Each set must be a dictionary."
        );
        assert_eq!(
            record(Value::Null, json!([{"reps": "seven"}])).unwrap_err().message(),
            "Field 'reps': 'seven' is not an integer."
        );
    }

    fn note(name: &str, field: &str, required: &str, value: &str) -> Value {
        json!({"Name": name, "Field": field, "Required": required, "Value": value})
    }

    #[test]
    fn valid_notes() {
        let notes = json!([
            note("Text field", "Text", "True", "I wrote this"),
            note("Number field", "Number", "False", "12"),
            note("Not mandatory", "10stars", "False", ""),
        ]);
        let checked = validate_training_notes(Some(&notes)).unwrap().unwrap();
        assert_eq!(checked.len(), 3);
        assert!(checked[0].required);
        assert_eq!(checked[2].field, NoteFieldType::TenStars);
        assert_eq!(serde_json::to_value(&checked).unwrap(), notes);
        assert_eq!(validate_training_notes(None).unwrap(), None);
    }

    #[test]
    fn required_note_without_value() {
        let notes = json!([note("Mood", "Text", "True", "")]);
        let err = validate_training_notes(Some(&notes)).unwrap_err();
        assert_eq!(err.message(), "Note 'Mood' is required but has no value.");
    }

    #[test]
    fn notes_need_exactly_four_keys() {
        let cases = [
            json!({"Field": "Text", "Required": "True", "Value": "x"}),
            json!({"Name": "n", "Required": "True", "Value": "x"}),
            json!({"Name": "n", "Field": "Text", "Value": "x"}),
            json!({"Name": "n", "Field": "Text", "Required": "False"}),
            json!({"Name": "n", "Field": "Text", "Required": "True", "Value": "x", "Wrong": "Yes"}),
        ];
        for case in cases {
            let notes = json!([case]);
            assert!(validate_training_notes(Some(&notes)).is_err(), "{notes}");
        }
    }

    #[test]
    fn note_shape_and_types() {
        let err = validate_training_notes(Some(&note("Mood", "Text", "True", "x"))).unwrap_err();
        assert_eq!(err.message(), "Notes must be a list.");

        let notes = json!([note("", "Text", "True", "x")]);
        assert!(validate_training_notes(Some(&notes)).is_err());

        let notes = json!([note("Rate", "5stars", "True", "6")]);
        let err = validate_training_notes(Some(&notes)).unwrap_err();
        assert!(err.message().starts_with("Note 'Rate'"));

        let notes = json!([note("Rate", "stars", "True", "3")]);
        assert!(validate_training_notes(Some(&notes)).is_err());

        let notes = json!([note("Rate", "5stars", "yes", "3")]);
        assert!(validate_training_notes(Some(&notes)).is_err());
    }

    #[test]
    fn order_values() {
        assert_eq!(validate_order(Some(&json!(1))).unwrap(), 1);
        assert_eq!(validate_order(Some(&json!("2"))).unwrap(), 2);
        for bad in [json!(0), json!(-1), json!(1.5), json!("x"), Value::Null] {
            assert!(validate_order(Some(&bad)).is_err());
        }
        assert!(validate_order(None).is_err());
    }

    #[test]
    fn order_sequence() {
        assert!(validate_order_sequence(&[]).is_ok());
        assert!(validate_order_sequence(&[1, 2]).is_ok());
        assert!(validate_order_sequence(&[2, 1, 3]).is_ok());
        assert!(validate_order_sequence(&[1, 3]).is_err());
        assert!(validate_order_sequence(&[1, 1]).is_err());
        let err = validate_order_sequence(&[2]).unwrap_err();
        assert!(err.message().contains("should start from 1 and increase by 1"));
    }
}
