//! Exercise and training template management.

use log::{debug, info, warn};
use serde_json::Value;

use super::Logbook;
use crate::db::{models, operations};
use crate::error::{LogbookError, Result};
use crate::objects::{ExerciseTemplate, NewExerciseTemplate, TrainingTemplate};
use crate::validation::{
    EXERCISE_TEMPLATE_NAME_MAX, TRAINING_TEMPLATE_NAME_MAX, validate_exercise_template_fields,
    validate_exercise_template_tags, validate_name, validate_training_template_data,
};

impl Logbook {
    pub async fn create_exercise_template(
        &self,
        owner_id: i64,
        new: NewExerciseTemplate,
    ) -> Result<ExerciseTemplate> {
        validate_name("Name", &new.name, EXERCISE_TEMPLATE_NAME_MAX)?;
        let fields = validate_exercise_template_fields(&new.fields)?;
        let tags = validate_exercise_template_tags(&new.tags)?;
        self.get_user(owner_id).await?;

        let row = operations::create_exercise_template(
            &self.db_pool,
            &models::NewExerciseTemplate {
                owner_id,
                name: new.name,
                description: new.description,
                fields: serde_json::to_string(&fields)?,
                tags: Some(serde_json::to_string(&tags)?),
                is_admin: new.is_admin,
            },
        )
        .await?;
        info!(
            "Created exercise template {} ({}) for user {}",
            row.id, row.name, owner_id
        );
        ExerciseTemplate::try_from(row)
    }

    pub async fn get_exercise_template(&self, template_id: i64) -> Result<ExerciseTemplate> {
        let row = operations::get_exercise_template(&self.db_pool, template_id)
            .await?
            .ok_or(LogbookError::NotFound {
                entity: "exercise template",
                id: template_id,
            })?;
        ExerciseTemplate::try_from(row)
    }

    /// Soft-deletes a template. Only its owner may do this.
    pub async fn deactivate_exercise_template(
        &self,
        owner_id: i64,
        template_id: i64,
    ) -> Result<()> {
        let template = self.get_exercise_template(template_id).await?;
        if template.owner_id != owner_id {
            warn!(
                "User {} tried to deactivate exercise template {}",
                owner_id, template
            );
            return Err(LogbookError::permission_denied(
                "You are not the owner of this exercise template.",
            ));
        }
        operations::set_exercise_template_active(&self.db_pool, template_id, false).await?;
        info!("Deactivated exercise template {}", template);
        Ok(())
    }

    /// Active templates the user owns, plus the admin-shared ones.
    pub async fn available_exercise_templates(
        &self,
        owner_id: i64,
    ) -> Result<Vec<ExerciseTemplate>> {
        operations::get_available_exercise_templates(&self.db_pool, owner_id)
            .await?
            .into_iter()
            .map(ExerciseTemplate::try_from)
            .collect()
    }

    pub async fn create_training_template(
        &self,
        owner_id: i64,
        name: &str,
        description: Option<String>,
        data: &Value,
    ) -> Result<TrainingTemplate> {
        validate_name("Name", name, TRAINING_TEMPLATE_NAME_MAX)?;
        let schema = validate_training_template_data(data)?;
        debug!(
            "Training template '{}' declares {} notes and {} exercises",
            name,
            schema.notes.len(),
            schema.exercises.len()
        );
        self.get_user(owner_id).await?;

        let row = operations::create_training_template(
            &self.db_pool,
            &models::NewTrainingTemplate {
                owner_id,
                name: name.to_string(),
                description,
                data: serde_json::to_string(data)?,
            },
        )
        .await?;
        info!(
            "Created training template {} ({}) for user {}",
            row.id, row.name, owner_id
        );
        TrainingTemplate::try_from(row)
    }

    pub async fn get_training_template(
        &self,
        owner_id: i64,
        template_id: i64,
    ) -> Result<TrainingTemplate> {
        let row = operations::get_training_template(&self.db_pool, template_id)
            .await?
            .ok_or(LogbookError::NotFound {
                entity: "training template",
                id: template_id,
            })?;
        if row.owner_id != owner_id {
            return Err(LogbookError::permission_denied(
                "You are not the owner of this training template.",
            ));
        }
        TrainingTemplate::try_from(row)
    }

    /// Trainings recorded from the template keep existing, detached from it.
    pub async fn delete_training_template(&self, owner_id: i64, template_id: i64) -> Result<()> {
        let template = self.get_training_template(owner_id, template_id).await?;
        operations::delete_training_template(&self.db_pool, template.id).await?;
        info!("Deleted training template {} ({})", template.id, template.name);
        Ok(())
    }
}
