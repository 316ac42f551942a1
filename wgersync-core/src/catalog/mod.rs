//! Read-only access to the wger exercise catalog.
//!
//! [`CatalogSource`] is the seam between the synchronizer and the network:
//! [`WgerClient`] talks to the real REST API, tests substitute in-memory pages.

mod client;

pub use client::WgerClient;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// The three small lookup tables used to denormalize exercise records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceTable {
    Category,
    Equipment,
    Muscle,
}

impl ReferenceTable {
    pub const ALL: [ReferenceTable; 3] = [
        ReferenceTable::Category,
        ReferenceTable::Equipment,
        ReferenceTable::Muscle,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            ReferenceTable::Category => "exercisecategory/",
            ReferenceTable::Equipment => "equipment/",
            ReferenceTable::Muscle => "muscle/",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceTable::Category => "category",
            ReferenceTable::Equipment => "equipment",
            ReferenceTable::Muscle => "muscle",
        }
    }
}

/// One `{id, name}` entry of a lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceList {
    pub results: Vec<NamedRef>,
}

/// One page of the exercise listing. Records stay loosely typed here so
/// unknown fields survive until the document is built.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExercisePage {
    pub results: Vec<Value>,
    #[serde(default)]
    pub next: Option<String>,
}

#[allow(async_fn_in_trait)]
pub trait CatalogSource {
    /// URL of the first exercise page; later pages come from `ExercisePage::next`.
    fn first_page_url(&self) -> String;

    async fn fetch_reference_table(&self, table: ReferenceTable) -> Result<Vec<NamedRef>>;

    async fn fetch_exercise_page(&self, url: &str) -> Result<ExercisePage>;
}
