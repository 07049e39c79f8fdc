//! The logbook: validation and storage brought together.
//!
//! Every write goes through one explicit sqlx transaction. Any error
//! returned before `commit` drops the transaction and rolls back all
//! rows written under it.

#[cfg(test)]
mod fixtures;
mod logbook;
mod stats;
mod templates;
mod trainings;
mod users;

pub use logbook::Logbook;
pub use stats::{BestValue, ExerciseStatistics};
