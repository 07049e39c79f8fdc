use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use super::Logbook;
use crate::objects::{ExerciseTemplate, NewExerciseTemplate, NewTraining, User};

pub async fn logbook() -> Logbook {
    Logbook::in_memory().await.unwrap()
}

/// A file-backed logbook, for tests that need more than one connection.
pub async fn file_logbook(dir: &tempfile::TempDir) -> Logbook {
    let path = dir.path().join("gymlog.db");
    Logbook::open(path.to_str().unwrap()).await.unwrap()
}

pub async fn user(logbook: &Logbook, username: &str) -> User {
    logbook.create_user(username).await.unwrap()
}

pub async fn exercise_template(
    logbook: &Logbook,
    owner: &User,
    name: &str,
    fields: &[&str],
) -> ExerciseTemplate {
    let new = NewExerciseTemplate {
        name: name.to_string(),
        fields: fields.iter().map(|f| f.to_string()).collect(),
        ..Default::default()
    };
    logbook.create_exercise_template(owner.id, new).await.unwrap()
}

pub fn conducted() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 1, 12, 0, 0).unwrap()
}

pub fn training(exercises: Value) -> NewTraining {
    NewTraining {
        conducted: conducted(),
        exercises: Some(exercises),
        ..Default::default()
    }
}
