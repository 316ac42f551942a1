//! Pull the exercise catalog into the document store.
//!
//! A run loads the reference tables, walks the paginated listing from the
//! first page, and upserts every enriched record as soon as its page arrives.
//! Any failure aborts the run; records saved before the failure are kept.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use log::{debug, error, info};
use serde_json::Value;

use crate::catalog::CatalogSource;
use crate::db::ExerciseStore;
use crate::error::{Error, Result};
use crate::exercise::ExerciseDocument;
use crate::reference::ReferenceMaps;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub saved: usize,
    pub pages: usize,
    pub synced_at: DateTime<Utc>,
}

/// Cursor over the paginated exercise listing. Not restartable: a new run starts from page one.
pub struct ExercisePages<'a, S: CatalogSource> {
    source: &'a S,
    next: Option<String>,
    visited: HashSet<String>,
}

impl<'a, S: CatalogSource> ExercisePages<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            next: Some(source.first_page_url()),
            source,
            visited: HashSet::new(),
        }
    }

    pub fn pages_fetched(&self) -> usize {
        self.visited.len()
    }

    /// Fetch the next page of raw records, or `None` once the cursor is exhausted.
    pub async fn next_page(&mut self) -> Result<Option<Vec<Value>>> {
        let Some(url) = self.next.take() else {
            return Ok(None);
        };
        if !self.visited.insert(url.clone()) {
            return Err(Error::data_shape(format!(
                "pagination cursor loops back to {}",
                url
            )));
        }

        let page = self.source.fetch_exercise_page(&url).await?;
        info!(
            "Fetched exercise page {} ({} records)",
            self.visited.len(),
            page.results.len()
        );
        self.next = page.next.filter(|n| !n.is_empty());
        Ok(Some(page.results))
    }
}

pub async fn sync_exercises<S: CatalogSource>(
    source: &S,
    store: &ExerciseStore,
) -> Result<SyncReport> {
    sync_exercises_at(source, store, Utc::now()).await
}

/// Run a sync stamping every record with `synced_at`.
pub async fn sync_exercises_at<S: CatalogSource>(
    source: &S,
    store: &ExerciseStore,
    synced_at: DateTime<Utc>,
) -> Result<SyncReport> {
    let refs = ReferenceMaps::load(source).await.map_err(|e| {
        error!("Sync aborted while loading reference tables: {}", e);
        e
    })?;

    let mut pages = ExercisePages::new(source);
    let mut saved = 0usize;

    if let Err(e) = upsert_all(&mut pages, &refs, store, synced_at, &mut saved).await {
        error!(
            "Sync aborted on page {} after {} records were saved: {}",
            pages.pages_fetched(),
            saved,
            e
        );
        return Err(e);
    }

    info!(
        "Sync finished: {} records across {} pages",
        saved,
        pages.pages_fetched()
    );
    Ok(SyncReport {
        saved,
        pages: pages.pages_fetched(),
        synced_at,
    })
}

async fn upsert_all<S: CatalogSource>(
    pages: &mut ExercisePages<'_, S>,
    refs: &ReferenceMaps,
    store: &ExerciseStore,
    synced_at: DateTime<Utc>,
    saved: &mut usize,
) -> Result<()> {
    while let Some(records) = pages.next_page().await? {
        for raw in records {
            let doc = ExerciseDocument::from_source(raw, refs, synced_at)?;
            store.upsert(&doc)?;
            debug!("Saved {}", doc);
            *saved += 1;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ExercisePage, NamedRef, ReferenceTable};
    use crate::error::ErrorKind;
    use crate::exercise::PLACEHOLDER_NAME;
    use crate::reference::UNKNOWN;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::HashMap;

    const FIRST: &str = "mem://exerciseinfo/?limit=2&language=2";

    #[derive(Default)]
    struct MemoryCatalog {
        pages: HashMap<String, ExercisePage>,
        failing_table: Option<ReferenceTable>,
        requested: RefCell<Vec<String>>,
    }

    impl MemoryCatalog {
        fn with_pages(pages: Vec<Vec<Value>>) -> Self {
            let count = pages.len();
            let pages = pages
                .into_iter()
                .enumerate()
                .map(|(i, results)| {
                    let next = (i + 1 < count).then(|| page_url(i + 1));
                    (page_url(i), ExercisePage { results, next })
                })
                .collect();
            Self {
                pages,
                ..Default::default()
            }
        }
    }

    fn page_url(index: usize) -> String {
        if index == 0 {
            FIRST.to_string()
        } else {
            format!("{}&offset={}", FIRST, index * 2)
        }
    }

    impl CatalogSource for MemoryCatalog {
        fn first_page_url(&self) -> String {
            FIRST.to_string()
        }

        async fn fetch_reference_table(&self, table: ReferenceTable) -> Result<Vec<NamedRef>> {
            if self.failing_table == Some(table) {
                return Err(Error::Connectivity("reference endpoint unreachable".into()));
            }
            let named = |id, name: &str| NamedRef {
                id,
                name: name.into(),
            };
            Ok(match table {
                ReferenceTable::Category => vec![named(10, "Strength"), named(11, "Cardio")],
                ReferenceTable::Equipment => vec![named(1, "Barbell"), named(8, "Bench")],
                ReferenceTable::Muscle => vec![named(4, "Pectoralis major"), named(5, "Triceps")],
            })
        }

        async fn fetch_exercise_page(&self, url: &str) -> Result<ExercisePage> {
            self.requested.borrow_mut().push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| Error::Connectivity(format!("no page at {}", url)))
        }
    }

    fn synced_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 30, 0).unwrap()
    }

    fn exercise(id: i64, name: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "category": {"id": 10},
            "equipment": [{"id": 1}, {"id": 8}],
            "muscles": [{"id": 4}],
            "muscles_secondary": [{"id": 5}],
        })
    }

    #[tokio::test]
    async fn walks_every_page_and_counts_all_records() {
        let catalog = MemoryCatalog::with_pages(vec![
            vec![exercise(1, "Bench Press"), exercise(2, "Dip")],
            vec![exercise(3, "Push Up"), exercise(4, "Fly")],
            vec![exercise(5, "Pullover")],
        ]);
        let store = ExerciseStore::open(":memory:").unwrap();

        let report = sync_exercises_at(&catalog, &store, synced_at()).await.unwrap();

        assert_eq!(
            report,
            SyncReport {
                saved: 5,
                pages: 3,
                synced_at: synced_at(),
            }
        );
        assert_eq!(catalog.requested.borrow().len(), 3);
        assert_eq!(store.count().unwrap(), 5);
    }

    #[tokio::test]
    async fn stored_records_are_enriched() {
        let catalog = MemoryCatalog::with_pages(vec![vec![
            exercise(1, "Bench Press"),
            json!({"id": 2, "name": "", "category": {"id": 99}, "equipment": [{"id": 3}]}),
        ]]);
        let store = ExerciseStore::open(":memory:").unwrap();
        sync_exercises_at(&catalog, &store, synced_at()).await.unwrap();

        let bench = store.find(1).unwrap().unwrap();
        assert_eq!(bench.category_name, "Strength");
        assert_eq!(bench.equipment_names, vec!["Barbell", "Bench"]);
        assert_eq!(bench.muscle_names, vec!["Pectoralis major"]);
        assert_eq!(bench.muscle_secondary_names, vec!["Triceps"]);
        assert_eq!(bench.last_synced, synced_at());

        let unnamed = store.find(2).unwrap().unwrap();
        assert_eq!(unnamed.name, PLACEHOLDER_NAME);
        assert_eq!(unnamed.category_name, UNKNOWN);
        assert_eq!(unnamed.equipment_names, vec![UNKNOWN]);
    }

    #[tokio::test]
    async fn resync_replaces_instead_of_duplicating() {
        let store = ExerciseStore::open(":memory:").unwrap();
        let first = MemoryCatalog::with_pages(vec![vec![exercise(7, "Row")]]);
        sync_exercises_at(&first, &store, synced_at()).await.unwrap();

        let later = synced_at() + chrono::Duration::hours(1);
        let second = MemoryCatalog::with_pages(vec![vec![exercise(7, "Bent Over Row")]]);
        let report = sync_exercises_at(&second, &store, later).await.unwrap();

        assert_eq!(report.saved, 1);
        assert_eq!(store.count().unwrap(), 1);
        let row = store.find(7).unwrap().unwrap();
        assert_eq!(row.name, "Bent Over Row");
        assert_eq!(row.last_synced, later);
    }

    #[tokio::test]
    async fn reference_failure_aborts_before_any_write() {
        let mut catalog = MemoryCatalog::with_pages(vec![vec![exercise(1, "Squat")]]);
        catalog.failing_table = Some(ReferenceTable::Muscle);
        let store = ExerciseStore::open(":memory:").unwrap();

        let err = sync_exercises_at(&catalog, &store, synced_at()).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Connectivity);
        assert!(catalog.requested.borrow().is_empty());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn failure_mid_run_keeps_earlier_writes() {
        let mut catalog = MemoryCatalog::with_pages(vec![
            vec![exercise(1, "Squat"), exercise(2, "Lunge")],
            vec![exercise(3, "Step Up")],
        ]);
        catalog.pages.remove(&page_url(1));
        let store = ExerciseStore::open(":memory:").unwrap();

        let err = sync_exercises_at(&catalog, &store, synced_at()).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Connectivity);
        assert_eq!(store.count().unwrap(), 2);
    }

    #[tokio::test]
    async fn malformed_record_aborts_the_run() {
        let catalog = MemoryCatalog::with_pages(vec![vec![
            exercise(1, "Squat"),
            json!({"name": "no id"}),
            exercise(3, "Lunge"),
        ]]);
        let store = ExerciseStore::open(":memory:").unwrap();

        let err = sync_exercises_at(&catalog, &store, synced_at()).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DataShape);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[tokio::test]
    async fn looping_cursor_is_rejected() {
        let mut catalog = MemoryCatalog::with_pages(vec![vec![exercise(1, "Squat")]]);
        if let Some(page) = catalog.pages.get_mut(FIRST) {
            page.next = Some(FIRST.to_string());
        }
        let store = ExerciseStore::open(":memory:").unwrap();

        let err = sync_exercises_at(&catalog, &store, synced_at()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataShape);
        assert_eq!(catalog.requested.borrow().len(), 1);
    }

    #[tokio::test]
    async fn empty_catalog_saves_nothing() {
        let catalog = MemoryCatalog::with_pages(vec![vec![]]);
        let store = ExerciseStore::open(":memory:").unwrap();

        let report = sync_exercises_at(&catalog, &store, synced_at()).await.unwrap();
        assert_eq!(report.saved, 0);
        assert_eq!(report.pages, 1);
    }
}
