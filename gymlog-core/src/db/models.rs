//! Row shapes of the sqlite tables. JSON columns are kept as raw text here;
//! `crate::objects` turns them into typed values.

use sqlx::FromRow;

#[derive(FromRow, Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(FromRow, Debug, Clone)]
pub struct ExerciseTemplate {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub fields: String,
    pub tags: Option<String>,
    pub is_admin: bool,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

pub struct NewExerciseTemplate {
    pub owner_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub fields: String,
    pub tags: Option<String>,
    pub is_admin: bool,
}

#[derive(FromRow, Debug, Clone)]
pub struct TrainingTemplate {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub data: String,
    pub created_at: i64,
    pub updated_at: i64,
}

pub struct NewTrainingTemplate {
    pub owner_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub data: String,
}

#[derive(FromRow, Debug, Clone)]
pub struct Training {
    pub id: i64,
    pub owner_id: i64,
    pub template_id: Option<i64>,
    pub conducted: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Used for both insert and full-row update.
#[derive(Debug, Clone)]
pub struct NewTraining {
    pub owner_id: i64,
    pub template_id: Option<i64>,
    pub conducted: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
}

impl From<&Training> for NewTraining {
    fn from(t: &Training) -> Self {
        NewTraining {
            owner_id: t.owner_id,
            template_id: t.template_id,
            conducted: t.conducted.clone(),
            title: t.title.clone(),
            description: t.description.clone(),
            notes: t.notes.clone(),
        }
    }
}

#[derive(FromRow, Debug, Clone)]
pub struct Exercise {
    pub id: i64,
    pub training_id: i64,
    pub template_id: i64,
    pub position: i64,
    pub units: Option<String>,
    pub sets: Option<String>,
}

pub struct NewExercise {
    pub training_id: i64,
    pub template_id: i64,
    pub position: i64,
    pub units: Option<String>,
    pub sets: Option<String>,
}
