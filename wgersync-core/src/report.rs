//! Read-side views over the stored exercise documents.

use std::collections::HashMap;
use std::fmt;

use crate::db::ExerciseStore;
use crate::error::Result;
use crate::exercise::ExerciseDocument;

pub const TOP_N: usize = 10;
pub const NO_EXERCISES_NOTICE: &str = "No exercise data stored yet.";
pub const NO_CHART_DATA_NOTICE: &str = "No data to visualise yet.";

const COUNT_LABEL: &str = "Exercise Count";
const BAR_WIDTH: usize = 30;

/// One row of the plain exercise listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    pub category: String,
    pub equipment: Vec<String>,
    pub muscles: Vec<String>,
    pub secondary_muscles: Vec<String>,
}

impl From<ExerciseDocument> for ListingEntry {
    fn from(doc: ExerciseDocument) -> Self {
        Self {
            name: doc.name,
            category: doc.category_name,
            equipment: doc.equipment_names,
            muscles: doc.muscle_names,
            secondary_muscles: doc.muscle_secondary_names,
        }
    }
}

impl fmt::Display for ListingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "  Category: {}", self.category)?;
        writeln!(f, "  Equipment: {}", self.equipment.join(", "))?;
        writeln!(f, "  Primary muscles: {}", self.muscles.join(", "))?;
        write!(f, "  Secondary muscles: {}", self.secondary_muscles.join(", "))
    }
}

/// All stored exercises ordered by name. Empty when nothing has been synced.
pub fn exercise_listing(store: &ExerciseStore) -> Result<Vec<ListingEntry>> {
    Ok(store
        .find_all_sorted_by_name()?
        .into_iter()
        .map(ListingEntry::from)
        .collect())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountRow {
    pub label: String,
    pub count: u64,
}

/// A frequency table destined for a table plus a bar chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregate {
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub rows: Vec<CountRow>,
}

impl Aggregate {
    pub fn max_count(&self) -> u64 {
        self.rows.iter().map(|r| r.count).max().unwrap_or(0)
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        let width = self
            .rows
            .iter()
            .map(|r| r.label.chars().count())
            .chain(std::iter::once(self.x_label.len()))
            .max()
            .unwrap_or(0);
        writeln!(f, "{:<width$}  {}", self.x_label, self.y_label, width = width)?;

        let max = self.max_count().max(1);
        for row in &self.rows {
            let bar = (row.count as usize * BAR_WIDTH).div_ceil(max as usize);
            writeln!(
                f,
                "{:<width$}  {:>5} {}",
                row.label,
                row.count,
                "█".repeat(bar),
                width = width
            )?;
        }
        Ok(())
    }
}

/// Count occurrences, ordered by count descending and then label ascending.
pub fn count_values<'a, I>(values: I) -> Vec<CountRow>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut rows: Vec<CountRow> = counts
        .into_iter()
        .map(|(label, count)| CountRow {
            label: label.to_string(),
            count,
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    rows
}

pub fn category_counts(docs: &[ExerciseDocument]) -> Aggregate {
    Aggregate {
        title: "Exercises per Category",
        x_label: "Category",
        y_label: COUNT_LABEL,
        rows: count_values(docs.iter().map(|d| d.category_name.as_str())),
    }
}

/// Each equipment entry counts separately, so one exercise can feed several rows.
pub fn equipment_counts(docs: &[ExerciseDocument]) -> Aggregate {
    let mut rows = count_values(
        docs.iter()
            .flat_map(|d| d.equipment_names.iter().map(String::as_str)),
    );
    rows.truncate(TOP_N);
    Aggregate {
        title: "Top 10 Equipment Used",
        x_label: "Equipment",
        y_label: COUNT_LABEL,
        rows,
    }
}

pub fn muscle_counts(docs: &[ExerciseDocument]) -> Aggregate {
    let mut rows = count_values(
        docs.iter()
            .flat_map(|d| d.muscle_names.iter().map(String::as_str)),
    );
    rows.truncate(TOP_N);
    Aggregate {
        title: "Top 10 Primary Muscles Trained",
        x_label: "Muscle",
        y_label: COUNT_LABEL,
        rows,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    pub categories: Aggregate,
    pub equipment: Aggregate,
    pub muscles: Aggregate,
}

impl Dashboard {
    /// Build the three aggregates, or `None` when there is nothing to chart.
    pub fn from_documents(docs: &[ExerciseDocument]) -> Option<Self> {
        if docs.is_empty() {
            return None;
        }
        Some(Self {
            categories: category_counts(docs),
            equipment: equipment_counts(docs),
            muscles: muscle_counts(docs),
        })
    }

    pub fn load(store: &ExerciseStore) -> Result<Option<Self>> {
        Ok(Self::from_documents(&store.find_all()?))
    }

    pub fn aggregates(&self) -> [&Aggregate; 3] {
        [&self.categories, &self.equipment, &self.muscles]
    }
}
