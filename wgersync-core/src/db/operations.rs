use diesel::prelude::*;
use log::debug;

use crate::db::ExerciseStore;
use crate::db::models::{ExerciseRow, NewExerciseRow};
use crate::db::schema::exercise_documents;
use crate::error::Result;
use crate::exercise::ExerciseDocument;

impl ExerciseStore {
    /// Replace the document with the same id, or insert it if absent.
    pub fn upsert(&self, doc: &ExerciseDocument) -> Result<()> {
        let row = NewExerciseRow::from_document(doc)?;
        let mut conn = self.conn()?;
        diesel::insert_into(exercise_documents::table)
            .values(&row)
            .on_conflict(exercise_documents::id)
            .do_update()
            .set(&row)
            .execute(&mut conn)?;
        debug!("Upserted exercise {}", doc.id);
        Ok(())
    }

    pub fn find(&self, id: i64) -> Result<Option<ExerciseDocument>> {
        let mut conn = self.conn()?;
        exercise_documents::table
            .find(id)
            .select(ExerciseRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(ExerciseRow::into_document)
            .transpose()
    }

    pub fn find_all(&self) -> Result<Vec<ExerciseDocument>> {
        let mut conn = self.conn()?;
        let rows = exercise_documents::table
            .select(ExerciseRow::as_select())
            .load(&mut conn)?;
        rows.into_iter().map(ExerciseRow::into_document).collect()
    }

    pub fn find_all_sorted_by_name(&self) -> Result<Vec<ExerciseDocument>> {
        let mut conn = self.conn()?;
        let rows = exercise_documents::table
            .select(ExerciseRow::as_select())
            .order((exercise_documents::name.asc(), exercise_documents::id.asc()))
            .load(&mut conn)?;
        rows.into_iter().map(ExerciseRow::into_document).collect()
    }

    pub fn count(&self) -> Result<i64> {
        let mut conn = self.conn()?;
        Ok(exercise_documents::table.count().get_result(&mut conn)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use serde_json::{Map, json};

    fn doc(id: i64, name: &str, synced_at: DateTime<Utc>) -> ExerciseDocument {
        let mut extra = Map::new();
        extra.insert("uuid".into(), json!(format!("uuid-{}", id)));
        ExerciseDocument {
            id,
            name: name.into(),
            category_name: "Arms".into(),
            equipment_names: vec!["Dumbbell".into()],
            muscle_names: vec!["Biceps brachii".into()],
            muscle_secondary_names: vec![],
            last_synced: synced_at,
            extra,
        }
    }

    fn t(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, hour, 0, 0).unwrap()
    }

    #[test]
    fn empty_store_reads_empty() {
        let store = ExerciseStore::open(":memory:").unwrap();
        assert!(store.find_all().unwrap().is_empty());
        assert!(store.find_all_sorted_by_name().unwrap().is_empty());
        assert_eq!(store.find(1).unwrap(), None);
    }

    #[test]
    fn upsert_twice_keeps_one_record_with_latest_fields() {
        let store = ExerciseStore::open(":memory:").unwrap();
        store.upsert(&doc(9, "Curl", t(8))).unwrap();

        let mut newer = doc(9, "Hammer Curl", t(9));
        newer.category_name = "Biceps".into();
        store.upsert(&newer).unwrap();

        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.find(9).unwrap(), Some(newer));
    }

    #[test]
    fn documents_round_trip_through_the_store() {
        let store = ExerciseStore::open(":memory:").unwrap();
        let original = doc(3, "Plank", t(7));
        store.upsert(&original).unwrap();
        assert_eq!(store.find_all().unwrap(), vec![original]);
    }

    #[test]
    fn sorted_listing_orders_by_name() {
        let store = ExerciseStore::open(":memory:").unwrap();
        for (id, name) in [(1, "Squat"), (2, "Bench Press"), (3, "Deadlift")] {
            store.upsert(&doc(id, name, t(6))).unwrap();
        }

        let names: Vec<String> = store
            .find_all_sorted_by_name()
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["Bench Press", "Deadlift", "Squat"]);
    }
}
