pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod exercise;
pub mod logging;
pub mod reference;
pub mod report;
pub mod sync;

pub use config::Config;
pub use db::ExerciseStore;
pub use error::{Error, ErrorKind, Result};
