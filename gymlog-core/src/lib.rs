pub mod catalog;
pub mod db;
pub mod error;
pub mod logbook;
pub mod logging;
pub mod objects;
pub mod validation;
pub mod values;

pub use error::{LogbookError, Result, ValidationError};
pub use logbook::Logbook;
