//! Domain entities handed to callers, built from `db::models` rows.

use std::collections::BTreeSet;

use chrono::{DateTime, SecondsFormat, Utc};
use log::debug;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::catalog::FieldName;
use crate::db::models as rows;
use crate::error::{LogbookError, Result};
use crate::validation::{
    NoteValue, TemplateSchema, coerce_int, validate_training_template_data,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
}

impl From<rows::User> for User {
    fn from(u: rows::User) -> Self {
        User {
            id: u.id,
            username: u.username,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseTemplate {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub fields: BTreeSet<FieldName>,
    pub tags: BTreeSet<String>,
    pub is_admin: bool,
    pub is_active: bool,
}

impl ExerciseTemplate {
    /// Active, and either owned by `user_id` or shared by an admin.
    pub fn usable_by(&self, user_id: i64) -> bool {
        self.is_active && (self.owner_id == user_id || self.is_admin)
    }

    #[cfg(test)]
    pub(crate) fn for_tests(id: i64, owner_id: i64, name: &str, fields: &[&str]) -> Self {
        ExerciseTemplate {
            id,
            owner_id,
            name: name.to_string(),
            description: None,
            fields: fields
                .iter()
                .map(|f| FieldName::parse(f).unwrap())
                .collect(),
            tags: BTreeSet::new(),
            is_admin: false,
            is_active: true,
        }
    }
}

impl TryFrom<rows::ExerciseTemplate> for ExerciseTemplate {
    type Error = LogbookError;

    fn try_from(t: rows::ExerciseTemplate) -> Result<Self> {
        let names: Vec<String> = serde_json::from_str(&t.fields)?;
        let fields = names
            .iter()
            .map(|n| FieldName::parse(n))
            .collect::<std::result::Result<BTreeSet<_>, _>>()?;
        let tags = match t.tags {
            Some(tags) => serde_json::from_str(&tags)?,
            None => BTreeSet::new(),
        };
        Ok(ExerciseTemplate {
            id: t.id,
            owner_id: t.owner_id,
            name: t.name,
            description: t.description,
            fields,
            tags,
            is_admin: t.is_admin,
            is_active: t.is_active,
        })
    }
}

impl std::fmt::Display for ExerciseTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.id, self.name)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewExerciseTemplate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub fields: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingTemplate {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub data: Value,
}

impl TrainingTemplate {
    pub fn schema(&self) -> Result<TemplateSchema> {
        Ok(validate_training_template_data(&self.data)?)
    }
}

impl TryFrom<rows::TrainingTemplate> for TrainingTemplate {
    type Error = LogbookError;

    fn try_from(t: rows::TrainingTemplate) -> Result<Self> {
        Ok(TrainingTemplate {
            id: t.id,
            owner_id: t.owner_id,
            name: t.name,
            description: t.description,
            data: serde_json::from_str(&t.data)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Training {
    pub id: i64,
    pub owner_id: i64,
    pub template_id: Option<i64>,
    pub conducted: DateTime<Utc>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub notes: Option<Vec<NoteValue>>,
    /// Ascending by `order`.
    pub exercises: Vec<Exercise>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Training {
    pub(crate) fn from_rows(
        training: rows::Training,
        exercises: Vec<rows::Exercise>,
    ) -> Result<Self> {
        debug!(
            "Building training {} with {} exercises",
            training.id,
            exercises.len()
        );
        let conducted = parse_timestamp(&training.conducted)?;
        let notes = training
            .notes
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;
        let exercises = exercises
            .into_iter()
            .map(Exercise::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(Training {
            id: training.id,
            owner_id: training.owner_id,
            template_id: training.template_id,
            conducted,
            title: training.title,
            description: training.description,
            notes,
            exercises,
            created_at: training.created_at,
            updated_at: training.updated_at,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exercise {
    pub id: i64,
    pub training_id: i64,
    pub template_id: i64,
    pub order: u32,
    /// Field to unit, exactly as submitted.
    pub units: Option<Value>,
    /// Field to raw value per set, exactly as submitted.
    pub sets: Option<Value>,
}

impl TryFrom<rows::Exercise> for Exercise {
    type Error = LogbookError;

    fn try_from(e: rows::Exercise) -> Result<Self> {
        let order = u32::try_from(e.position)
            .map_err(|err| LogbookError::Database(sqlx::Error::Decode(Box::new(err))))?;
        Ok(Exercise {
            id: e.id,
            training_id: e.training_id,
            template_id: e.template_id,
            order,
            units: e.units.as_deref().map(serde_json::from_str).transpose()?,
            sets: e.sets.as_deref().map(serde_json::from_str).transpose()?,
        })
    }
}

/// Payload for recording a training. Notes and exercises stay raw JSON
/// until they are validated.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTraining {
    pub conducted: DateTime<Utc>,
    #[serde(default, deserialize_with = "template_id")]
    pub template: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub notes: Option<Value>,
    #[serde(default)]
    pub exercises: Option<Value>,
}

/// Partial update of a training.
///
/// The outer `Option` says whether a field was supplied; for nullable
/// fields the inner one carries the new value. Exercises are always
/// replaced: `None` leaves the training without exercises.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrainingUpdate {
    #[serde(default)]
    pub conducted: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "supplied_template_id")]
    pub template: Option<Option<i64>>,
    #[serde(default, deserialize_with = "supplied")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "supplied")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "supplied")]
    pub notes: Option<Option<Value>>,
    #[serde(default)]
    pub exercises: Option<Value>,
}

fn supplied<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Template ids arrive either as JSON numbers or as digit strings.
fn template_id<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => coerce_int(&value)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom("'template' must be an integer.")),
    }
}

fn supplied_template_id<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Option<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    template_id(deserializer).map(Some)
}

pub(crate) fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| LogbookError::Database(sqlx::Error::Decode(Box::new(err))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn timestamps_round_trip() {
        let at = Utc.with_ymd_and_hms(2025, 4, 1, 12, 0, 0).unwrap();
        let raw = format_timestamp(&at);
        assert_eq!(raw, "2025-04-01T12:00:00.000000Z");
        assert_eq!(parse_timestamp(&raw).unwrap(), at);
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn update_distinguishes_null_from_absent() {
        let update: TrainingUpdate = serde_json::from_value(json!({"title": null})).unwrap();
        assert_eq!(update.title, Some(None));
        assert_eq!(update.description, None);

        let update: TrainingUpdate =
            serde_json::from_value(json!({"template": 4, "notes": []})).unwrap();
        assert_eq!(update.template, Some(Some(4)));
        assert_eq!(update.notes, Some(Some(json!([]))));
    }

    #[test]
    fn new_training_payload() {
        let new: NewTraining = serde_json::from_value(json!({
            "conducted": "2025-04-01T12:00:00Z",
            "exercises": [{"template": 1, "order": 1}],
        }))
        .unwrap();
        assert_eq!(new.conducted, Utc.with_ymd_and_hms(2025, 4, 1, 12, 0, 0).unwrap());
        assert!(new.template.is_none());
        assert!(new.exercises.unwrap().is_array());
    }

    #[test]
    fn template_id_accepts_digit_strings() {
        let new: NewTraining = serde_json::from_value(json!({
            "conducted": "2025-04-01T12:00:00Z",
            "template": "3",
        }))
        .unwrap();
        assert_eq!(new.template, Some(3));

        let new: NewTraining = serde_json::from_value(json!({
            "conducted": "2025-04-01T12:00:00Z",
            "template": null,
        }))
        .unwrap();
        assert_eq!(new.template, None);

        let update: TrainingUpdate = serde_json::from_value(json!({"template": " 7 "})).unwrap();
        assert_eq!(update.template, Some(Some(7)));
        let update: TrainingUpdate = serde_json::from_value(json!({"template": null})).unwrap();
        assert_eq!(update.template, Some(None));

        let err = serde_json::from_value::<NewTraining>(json!({
            "conducted": "2025-04-01T12:00:00Z",
            "template": "three",
        }))
        .unwrap_err();
        assert!(err.to_string().contains("'template' must be an integer."));
    }

    #[test]
    fn exercise_template_from_row() {
        let row = rows::ExerciseTemplate {
            id: 3,
            owner_id: 1,
            name: "Legs".into(),
            description: None,
            fields: r#"["sets","weight"]"#.into(),
            tags: Some(r#"["legs"]"#.into()),
            is_admin: false,
            is_active: true,
            created_at: 0,
            updated_at: 0,
        };
        let template = ExerciseTemplate::try_from(row).unwrap();
        assert!(template.fields.contains(&FieldName::parse("weight").unwrap()));
        assert!(template.tags.contains("legs"));
        assert!(template.usable_by(1));
        assert!(!template.usable_by(2));
        assert_eq!(template.to_string(), "3 (Legs)");
    }
}
