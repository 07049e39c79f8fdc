use std::collections::{BTreeMap, BTreeSet};

use log::{debug, warn};
use serde::Serialize;

use super::Logbook;
use crate::catalog::{FieldName, unit_factor};
use crate::db::operations;
use crate::error::{LogbookError, Result};
use crate::objects::Exercise;
use crate::validation::{CheckedExercise, validate_exercise_record};

/// Best value of a numeric field, in the field's base unit when measured.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestValue {
    pub value: f64,
    pub unit: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseStatistics {
    pub template_id: i64,
    pub trainings: usize,
    pub sets: usize,
    pub best: BTreeMap<FieldName, BestValue>,
}

impl ExerciseStatistics {
    fn new(template_id: i64) -> Self {
        ExerciseStatistics {
            template_id,
            trainings: 0,
            sets: 0,
            best: BTreeMap::new(),
        }
    }

    fn add(&mut self, checked: &CheckedExercise) {
        self.sets += checked.set_count();
        let Some(sets) = &checked.sets else {
            return;
        };
        for set in sets {
            for (field, value) in set {
                let descriptor = field.descriptor();
                if !descriptor.primitive.is_numeric() {
                    continue;
                }
                let Some(mut value) = value.as_ref().and_then(|v| v.as_f64()) else {
                    continue;
                };
                if descriptor.is_measured() {
                    let Some(factor) = checked
                        .units
                        .as_ref()
                        .and_then(|units| units.get(field))
                        .and_then(|unit| unit_factor(unit))
                    else {
                        continue;
                    };
                    value *= factor;
                }
                let best = self.best.entry(*field).or_insert(BestValue {
                    value,
                    unit: descriptor.base_unit(),
                });
                if value > best.value {
                    best.value = value;
                }
            }
        }
    }
}

impl Logbook {
    /// Summarises what the user recorded with one exercise template.
    pub async fn exercise_statistics(
        &self,
        owner_id: i64,
        template_id: i64,
    ) -> Result<ExerciseStatistics> {
        let template = self.get_exercise_template(template_id).await?;
        if template.owner_id != owner_id && !template.is_admin {
            return Err(LogbookError::permission_denied(
                "You are not allowed to use this exercise template.",
            ));
        }

        let rows = operations::get_exercise_entries(&self.db_pool, owner_id, template_id).await?;
        let mut stats = ExerciseStatistics::new(template_id);
        let mut trainings = BTreeSet::new();
        for row in rows {
            let exercise = Exercise::try_from(row)?;
            trainings.insert(exercise.training_id);
            let checked = validate_exercise_record(
                &template,
                exercise.units.as_ref(),
                exercise.sets.as_ref(),
            );
            match checked {
                Ok(checked) => stats.add(&checked),
                Err(err) => warn!("Skipping exercise {} in statistics: {}", exercise.id, err),
            }
        }
        stats.trainings = trainings.len();
        debug!(
            "Statistics for template {}: {} trainings, {} sets",
            template, stats.trainings, stats.sets
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures;
    use crate::catalog::FieldName;
    use crate::error::LogbookError;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[tokio::test]
    async fn best_values_are_normalised() {
        let logbook = fixtures::logbook().await;
        let u1 = fixtures::user(&logbook, "u1").await;
        let bench =
            fixtures::exercise_template(&logbook, &u1, "Bench press", &["reps", "weight", "rest"])
                .await;

        let first = json!([{
            "template": bench.id,
            "order": 1,
            "units": {"weight": "kg"},
            "sets": [{"reps": "8", "weight": "100"}, {"reps": "", "weight": "", "rest": "02:00"}],
        }]);
        let second = json!([
            {
                "template": bench.id,
                "order": 1,
                "units": {"weight": "lbs"},
                "sets": [{"reps": "3", "weight": "250"}],
            },
            {"template": bench.id, "order": 2, "sets": [{"reps": "12"}]},
        ]);
        logbook
            .create_training(u1.id, fixtures::training(first))
            .await
            .unwrap();
        logbook
            .create_training(u1.id, fixtures::training(second))
            .await
            .unwrap();

        let stats = logbook.exercise_statistics(u1.id, bench.id).await.unwrap();
        assert_eq!(stats.trainings, 2);
        assert_eq!(stats.sets, 4);

        let weight = &stats.best[&FieldName::parse("weight").unwrap()];
        assert_eq!(weight.unit, Some("kg"));
        assert!((weight.value - 113.398_092_5).abs() < 1e-6);
        let reps = &stats.best[&FieldName::parse("reps").unwrap()];
        assert_eq!(reps.value, 12.0);
        assert_eq!(reps.unit, None);
        assert!(!stats.best.contains_key(&FieldName::parse("rest").unwrap()));
    }

    #[tokio::test]
    async fn statistics_are_per_owner() {
        let logbook = fixtures::logbook().await;
        let u1 = fixtures::user(&logbook, "u1").await;
        let u2 = fixtures::user(&logbook, "u2").await;
        let squat = fixtures::exercise_template(&logbook, &u1, "Squat", &["reps"]).await;

        let stats = logbook.exercise_statistics(u1.id, squat.id).await.unwrap();
        assert_eq!(stats.trainings, 0);
        assert!(stats.best.is_empty());

        assert_matches!(
            logbook.exercise_statistics(u2.id, squat.id).await,
            Err(LogbookError::PermissionDenied(_))
        );
    }
}
