use chrono::SecondsFormat;
use diesel::{AsChangeset, Insertable, Queryable, Selectable};

use crate::db::schema;
use crate::error::Result;
use crate::exercise::ExerciseDocument;

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = schema::exercise_documents)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ExerciseRow {
    pub id: i64,
    pub name: String,
    pub category_name: String,
    pub last_synced: String,
    pub document: String,
}

impl ExerciseRow {
    pub fn into_document(self) -> Result<ExerciseDocument> {
        Ok(serde_json::from_str(&self.document)?)
    }
}

#[derive(Insertable, AsChangeset, Debug)]
#[diesel(table_name = schema::exercise_documents)]
pub struct NewExerciseRow {
    pub id: i64,
    pub name: String,
    pub category_name: String,
    pub last_synced: String,
    pub document: String,
}

impl NewExerciseRow {
    pub fn from_document(doc: &ExerciseDocument) -> Result<Self> {
        Ok(Self {
            id: doc.id,
            name: doc.name.clone(),
            category_name: doc.category_name.clone(),
            last_synced: doc.last_synced.to_rfc3339_opts(SecondsFormat::Secs, true),
            document: serde_json::to_string(doc)?,
        })
    }
}
