//! Recording, updating and reading trainings.

use log::{debug, info, warn};
use serde_json::Value;
use sqlx::SqliteConnection;

use super::Logbook;
use crate::db::{models, operations};
use crate::error::{LogbookError, Result};
use crate::objects::{
    ExerciseTemplate, NewTraining, Training, TrainingUpdate, format_timestamp,
};
use crate::validation::{
    NoteValue, coerce_int, present, validate_exercise_record, validate_order,
    validate_order_sequence, validate_title, validate_training_notes,
};

fn not_found(id: i64) -> LogbookError {
    LogbookError::NotFound {
        entity: "training",
        id,
    }
}

fn not_owner() -> LogbookError {
    LogbookError::permission_denied("You are not the owner of this training.")
}

fn notes_json(notes: Option<Vec<NoteValue>>) -> Result<Option<String>> {
    Ok(notes.map(|n| serde_json::to_string(&n)).transpose()?)
}

/// Stored verbatim so a read returns exactly what was submitted.
fn raw_json(value: Option<&Value>) -> Result<Option<String>> {
    Ok(present(value).map(serde_json::to_string).transpose()?)
}

async fn check_training_template(
    conn: &mut SqliteConnection,
    owner_id: i64,
    template_id: i64,
) -> Result<()> {
    let template = operations::get_training_template(&mut *conn, template_id)
        .await?
        .ok_or_else(|| {
            LogbookError::validation(format!(
                "Training template {} does not exist.",
                template_id
            ))
        })?;
    if template.owner_id != owner_id {
        warn!(
            "User {} referenced training template {} owned by {}",
            owner_id, template_id, template.owner_id
        );
        return Err(LogbookError::permission_denied(
            "You are not the owner of this training template.",
        ));
    }
    Ok(())
}

/// Validates the submitted exercises of a training and inserts them.
///
/// Unauthorized templates are reported together, before any record is
/// checked. Returns the number of exercises written.
async fn process_exercise_data(
    conn: &mut SqliteConnection,
    owner_id: i64,
    training_id: i64,
    data: Option<&Value>,
) -> Result<usize> {
    let Some(data) = present(data) else {
        return Ok(0);
    };
    let Value::Array(entries) = data else {
        return Err(LogbookError::validation("Exercises data must be a list."));
    };

    let mut resolved = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.iter().enumerate() {
        let position = idx + 1;
        let Value::Object(entry) = entry else {
            return Err(LogbookError::validation(format!(
                "Exercise #{} must be a dictionary.",
                position
            )));
        };
        let template_id = present(entry.get("template"))
            .and_then(coerce_int)
            .ok_or_else(|| {
                LogbookError::validation(format!("Exercise #{} is missing a template.", position))
            })?;
        let row = operations::get_exercise_template(&mut *conn, template_id)
            .await?
            .ok_or_else(|| {
                LogbookError::validation(format!(
                    "Exercise #{}: exercise template {} does not exist.",
                    position, template_id
                ))
            })?;
        resolved.push((position, entry, ExerciseTemplate::try_from(row)?));
    }

    let mut unauthorized: Vec<&ExerciseTemplate> = Vec::new();
    for (_, _, template) in &resolved {
        if !template.usable_by(owner_id) && !unauthorized.iter().any(|t| t.id == template.id) {
            unauthorized.push(template);
        }
    }
    if !unauthorized.is_empty() {
        let listed = unauthorized
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        warn!("User {} used unauthorized exercise templates: {}", owner_id, listed);
        return Err(LogbookError::permission_denied(format!(
            "Unauthorized exercise templates: {}",
            listed
        )));
    }

    let mut orders = Vec::with_capacity(resolved.len());
    let mut rows = Vec::with_capacity(resolved.len());
    for (position, entry, template) in &resolved {
        let location = format!("Exercise #{}", position);
        let checked = validate_exercise_record(template, entry.get("units"), entry.get("sets"))
            .map_err(|e| e.context(&location))?;
        let order = validate_order(entry.get("order")).map_err(|e| e.context(&location))?;
        debug!(
            "{} uses template {} with {} sets",
            location,
            template,
            checked.set_count()
        );
        orders.push(order);
        rows.push(models::NewExercise {
            training_id,
            template_id: template.id,
            position: i64::from(order),
            units: raw_json(entry.get("units"))?,
            sets: raw_json(entry.get("sets"))?,
        });
    }
    validate_order_sequence(&orders)?;

    operations::add_exercises_to_training(conn, &rows).await?;
    Ok(rows.len())
}

impl Logbook {
    /// Records a training with its exercises, all or nothing.
    pub async fn create_training(&self, owner_id: i64, new: NewTraining) -> Result<Training> {
        let mut tx = self.begin_write().await?;

        if let Some(template_id) = new.template {
            check_training_template(&mut tx, owner_id, template_id).await?;
        }
        validate_title(new.title.as_deref())?;
        let notes = validate_training_notes(new.notes.as_ref())?;

        let training = operations::create_training(
            &mut *tx,
            &models::NewTraining {
                owner_id,
                template_id: new.template,
                conducted: format_timestamp(&new.conducted),
                title: new.title,
                description: new.description,
                notes: notes_json(notes)?,
            },
        )
        .await?;
        let count =
            process_exercise_data(&mut tx, owner_id, training.id, new.exercises.as_ref()).await?;
        let exercises = operations::get_exercises_for_training(&mut *tx, training.id).await?;
        tx.commit().await?;

        info!(
            "Recorded training {} for user {} with {} exercises",
            training.id, owner_id, count
        );
        Training::from_rows(training, exercises)
    }

    /// Applies the supplied fields and replaces every exercise of the training.
    pub async fn update_training(
        &self,
        owner_id: i64,
        training_id: i64,
        update: TrainingUpdate,
    ) -> Result<Training> {
        let mut tx = self.begin_write().await?;

        let current = operations::get_training(&mut *tx, training_id)
            .await?
            .ok_or_else(|| not_found(training_id))?;
        if current.owner_id != owner_id {
            warn!(
                "User {} tried to update training {} owned by {}",
                owner_id, training_id, current.owner_id
            );
            return Err(not_owner());
        }
        let removed = operations::delete_exercises_for_training(&mut *tx, training_id).await?;
        debug!("Removed {} exercises from training {}", removed, training_id);

        let mut row = models::NewTraining::from(&current);
        if let Some(template) = update.template {
            if let Some(template_id) = template {
                check_training_template(&mut tx, owner_id, template_id).await?;
            }
            row.template_id = template;
        }
        if let Some(conducted) = update.conducted {
            row.conducted = format_timestamp(&conducted);
        }
        if let Some(title) = update.title {
            validate_title(title.as_deref())?;
            row.title = title;
        }
        if let Some(description) = update.description {
            row.description = description;
        }
        if let Some(notes) = update.notes {
            row.notes = notes_json(validate_training_notes(notes.as_ref())?)?;
        }

        let training = operations::update_training(&mut *tx, training_id, &row).await?;
        let count =
            process_exercise_data(&mut tx, owner_id, training_id, update.exercises.as_ref()).await?;
        let exercises = operations::get_exercises_for_training(&mut *tx, training_id).await?;
        tx.commit().await?;

        info!(
            "Updated training {} for user {} with {} exercises",
            training_id, owner_id, count
        );
        Training::from_rows(training, exercises)
    }

    pub async fn get_training(&self, owner_id: i64, training_id: i64) -> Result<Training> {
        let training = operations::get_training(&self.db_pool, training_id)
            .await?
            .ok_or_else(|| not_found(training_id))?;
        if training.owner_id != owner_id {
            return Err(not_owner());
        }
        let exercises = operations::get_exercises_for_training(&self.db_pool, training_id).await?;
        Training::from_rows(training, exercises)
    }

    /// The user's trainings, most recently conducted first.
    pub async fn list_trainings(&self, owner_id: i64) -> Result<Vec<Training>> {
        let rows = operations::get_trainings_for_owner(&self.db_pool, owner_id).await?;
        let mut trainings = Vec::with_capacity(rows.len());
        for row in rows {
            let exercises = operations::get_exercises_for_training(&self.db_pool, row.id).await?;
            trainings.push(Training::from_rows(row, exercises)?);
        }
        Ok(trainings)
    }

    /// Deletes a training together with its exercises.
    pub async fn delete_training(&self, owner_id: i64, training_id: i64) -> Result<()> {
        let training = operations::get_training(&self.db_pool, training_id)
            .await?
            .ok_or_else(|| not_found(training_id))?;
        if training.owner_id != owner_id {
            return Err(not_owner());
        }
        operations::delete_training(&self.db_pool, training_id).await?;
        info!("Deleted training {}", training_id);
        Ok(())
    }
}
