use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqliteExecutor};

use crate::db::models::{
    Exercise, ExerciseTemplate, NewExercise, NewExerciseTemplate, NewTraining, NewTrainingTemplate,
    Training, TrainingTemplate, User,
};

type Result<T> = std::result::Result<T, sqlx::Error>;

const EXERCISE_TEMPLATE_COLUMNS: &str = "id, owner_id, name, description, fields, tags, \
    is_admin, is_active, created_at, updated_at";
const TRAINING_COLUMNS: &str = "id, owner_id, template_id, conducted, title, description, notes, \
    created_at, updated_at";
const EXERCISE_COLUMNS: &str = "id, training_id, template_id, position, units, sets";

// Users
pub async fn create_user(executor: impl SqliteExecutor<'_>, username: &str) -> Result<User> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (username) VALUES (?1)
         RETURNING id, username, created_at, updated_at",
    )
    .bind(username)
    .fetch_one(executor)
    .await
}

pub async fn get_user(executor: impl SqliteExecutor<'_>, user_id: i64) -> Result<Option<User>> {
    sqlx::query_as::<_, User>(
        "SELECT id, username, created_at, updated_at FROM users WHERE id = ?1",
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

pub async fn get_user_by_username(
    executor: impl SqliteExecutor<'_>,
    username: &str,
) -> Result<Option<User>> {
    sqlx::query_as::<_, User>(
        "SELECT id, username, created_at, updated_at FROM users WHERE username = ?1",
    )
    .bind(username)
    .fetch_optional(executor)
    .await
}

// Exercise templates
pub async fn create_exercise_template(
    executor: impl SqliteExecutor<'_>,
    new: &NewExerciseTemplate,
) -> Result<ExerciseTemplate> {
    let query = format!(
        "INSERT INTO exercise_templates (owner_id, name, description, fields, tags, is_admin)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         RETURNING {EXERCISE_TEMPLATE_COLUMNS}"
    );
    sqlx::query_as::<_, ExerciseTemplate>(&query)
        .bind(new.owner_id)
        .bind(&new.name)
        .bind(&new.description)
        .bind(&new.fields)
        .bind(&new.tags)
        .bind(new.is_admin)
        .fetch_one(executor)
        .await
}

pub async fn get_exercise_template(
    executor: impl SqliteExecutor<'_>,
    template_id: i64,
) -> Result<Option<ExerciseTemplate>> {
    let query = format!("SELECT {EXERCISE_TEMPLATE_COLUMNS} FROM exercise_templates WHERE id = ?1");
    sqlx::query_as::<_, ExerciseTemplate>(&query)
        .bind(template_id)
        .fetch_optional(executor)
        .await
}

/// Active templates owned by the user or shared by an admin, by name.
pub async fn get_available_exercise_templates(
    executor: impl SqliteExecutor<'_>,
    owner_id: i64,
) -> Result<Vec<ExerciseTemplate>> {
    let query = format!(
        "SELECT {EXERCISE_TEMPLATE_COLUMNS} FROM exercise_templates
         WHERE is_active = 1 AND (owner_id = ?1 OR is_admin = 1)
         ORDER BY name ASC, id ASC"
    );
    sqlx::query_as::<_, ExerciseTemplate>(&query)
        .bind(owner_id)
        .fetch_all(executor)
        .await
}

pub async fn set_exercise_template_active(
    executor: impl SqliteExecutor<'_>,
    template_id: i64,
    is_active: bool,
) -> Result<u64> {
    let result = sqlx::query(
        "UPDATE exercise_templates
         SET is_active = ?1, updated_at = CAST(strftime('%s','now') AS INTEGER)
         WHERE id = ?2",
    )
    .bind(is_active)
    .bind(template_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

// Training templates
pub async fn create_training_template(
    executor: impl SqliteExecutor<'_>,
    new: &NewTrainingTemplate,
) -> Result<TrainingTemplate> {
    sqlx::query_as::<_, TrainingTemplate>(
        "INSERT INTO training_templates (owner_id, name, description, data)
         VALUES (?1, ?2, ?3, ?4)
         RETURNING id, owner_id, name, description, data, created_at, updated_at",
    )
    .bind(new.owner_id)
    .bind(&new.name)
    .bind(&new.description)
    .bind(&new.data)
    .fetch_one(executor)
    .await
}

pub async fn get_training_template(
    executor: impl SqliteExecutor<'_>,
    template_id: i64,
) -> Result<Option<TrainingTemplate>> {
    sqlx::query_as::<_, TrainingTemplate>(
        "SELECT id, owner_id, name, description, data, created_at, updated_at
         FROM training_templates WHERE id = ?1",
    )
    .bind(template_id)
    .fetch_optional(executor)
    .await
}

pub async fn delete_training_template(
    executor: impl SqliteExecutor<'_>,
    template_id: i64,
) -> Result<u64> {
    let result = sqlx::query("DELETE FROM training_templates WHERE id = ?1")
        .bind(template_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

// Trainings
pub async fn create_training(
    executor: impl SqliteExecutor<'_>,
    new: &NewTraining,
) -> Result<Training> {
    let query = format!(
        "INSERT INTO trainings (owner_id, template_id, conducted, title, description, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         RETURNING {TRAINING_COLUMNS}"
    );
    sqlx::query_as::<_, Training>(&query)
        .bind(new.owner_id)
        .bind(new.template_id)
        .bind(&new.conducted)
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.notes)
        .fetch_one(executor)
        .await
}

/// Overwrites every mutable column of a training.
pub async fn update_training(
    executor: impl SqliteExecutor<'_>,
    training_id: i64,
    update: &NewTraining,
) -> Result<Training> {
    let query = format!(
        "UPDATE trainings
         SET template_id = ?1, conducted = ?2, title = ?3, description = ?4, notes = ?5,
             updated_at = CAST(strftime('%s','now') AS INTEGER)
         WHERE id = ?6
         RETURNING {TRAINING_COLUMNS}"
    );
    sqlx::query_as::<_, Training>(&query)
        .bind(update.template_id)
        .bind(&update.conducted)
        .bind(&update.title)
        .bind(&update.description)
        .bind(&update.notes)
        .bind(training_id)
        .fetch_one(executor)
        .await
}

pub async fn get_training(
    executor: impl SqliteExecutor<'_>,
    training_id: i64,
) -> Result<Option<Training>> {
    let query = format!("SELECT {TRAINING_COLUMNS} FROM trainings WHERE id = ?1");
    sqlx::query_as::<_, Training>(&query)
        .bind(training_id)
        .fetch_optional(executor)
        .await
}

/// Most recently conducted first.
pub async fn get_trainings_for_owner(
    executor: impl SqliteExecutor<'_>,
    owner_id: i64,
) -> Result<Vec<Training>> {
    let query = format!(
        "SELECT {TRAINING_COLUMNS} FROM trainings
         WHERE owner_id = ?1
         ORDER BY conducted DESC, id DESC"
    );
    sqlx::query_as::<_, Training>(&query)
        .bind(owner_id)
        .fetch_all(executor)
        .await
}

pub async fn delete_training(executor: impl SqliteExecutor<'_>, training_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM trainings WHERE id = ?1")
        .bind(training_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

pub async fn count_trainings(executor: impl SqliteExecutor<'_>) -> Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM trainings")
        .fetch_one(executor)
        .await
}

// Exercises
/// Inserts all rows with a single statement.
pub async fn add_exercises_to_training(
    conn: &mut SqliteConnection,
    exercises: &[NewExercise],
) -> Result<u64> {
    if exercises.is_empty() {
        return Ok(0);
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        "INSERT INTO exercises (training_id, template_id, position, units, sets) ",
    );
    builder.push_values(exercises, |mut row, exercise| {
        row.push_bind(exercise.training_id)
            .push_bind(exercise.template_id)
            .push_bind(exercise.position)
            .push_bind(exercise.units.clone())
            .push_bind(exercise.sets.clone());
    });
    let result = builder.build().execute(conn).await?;
    Ok(result.rows_affected())
}

pub async fn get_exercises_for_training(
    executor: impl SqliteExecutor<'_>,
    training_id: i64,
) -> Result<Vec<Exercise>> {
    let query = format!(
        "SELECT {EXERCISE_COLUMNS} FROM exercises
         WHERE training_id = ?1
         ORDER BY position ASC"
    );
    sqlx::query_as::<_, Exercise>(&query)
        .bind(training_id)
        .fetch_all(executor)
        .await
}

/// Every exercise an owner recorded with the given template, oldest training first.
pub async fn get_exercise_entries(
    executor: impl SqliteExecutor<'_>,
    owner_id: i64,
    template_id: i64,
) -> Result<Vec<Exercise>> {
    sqlx::query_as::<_, Exercise>(
        "SELECT e.id, e.training_id, e.template_id, e.position, e.units, e.sets
         FROM exercises e
         JOIN trainings t ON t.id = e.training_id
         WHERE t.owner_id = ?1 AND e.template_id = ?2
         ORDER BY t.conducted ASC, e.position ASC",
    )
    .bind(owner_id)
    .bind(template_id)
    .fetch_all(executor)
    .await
}

pub async fn delete_exercises_for_training(
    executor: impl SqliteExecutor<'_>,
    training_id: i64,
) -> Result<u64> {
    let result = sqlx::query("DELETE FROM exercises WHERE training_id = ?1")
        .bind(training_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

pub async fn count_exercises(executor: impl SqliteExecutor<'_>) -> Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM exercises")
        .fetch_one(executor)
        .await
}
