use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::reference::ReferenceMaps;

pub const PLACEHOLDER_NAME: &str = "No Name";

/// Keys written by enrichment; a source record's own values for these are replaced.
const DERIVED_KEYS: &[&str] = &[
    "id",
    "name",
    "category_name",
    "equipment_names",
    "muscle_names",
    "muscle_secondary_names",
    "last_synced",
];

/// A foreign-key reference as it appears in a source record: either a bare
/// id or a nested object carrying one.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum RefField {
    Id(i64),
    Object {
        #[serde(default)]
        id: Option<i64>,
    },
}

impl RefField {
    fn id(&self) -> Option<i64> {
        match self {
            RefField::Id(id) => Some(*id),
            RefField::Object { id } => *id,
        }
    }
}

fn nullable_list<'de, D>(deserializer: D) -> std::result::Result<Vec<RefField>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<RefField>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Typed view over the fields enrichment needs; everything else stays in the raw value.
#[derive(Debug, Deserialize)]
struct RawExercise {
    id: i64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    category: Option<RefField>,
    #[serde(default, deserialize_with = "nullable_list")]
    equipment: Vec<RefField>,
    #[serde(default, deserialize_with = "nullable_list")]
    muscles: Vec<RefField>,
    #[serde(default, deserialize_with = "nullable_list")]
    muscles_secondary: Vec<RefField>,
}

/// The persisted, denormalized exercise record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseDocument {
    pub id: i64,
    pub name: String,
    pub category_name: String,
    pub equipment_names: Vec<String>,
    pub muscle_names: Vec<String>,
    pub muscle_secondary_names: Vec<String>,
    pub last_synced: DateTime<Utc>,
    /// Source fields passed through unmodified.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ExerciseDocument {
    /// Validate a raw catalog record and resolve its references into names.
    pub fn from_source(
        raw: Value,
        refs: &ReferenceMaps,
        synced_at: DateTime<Utc>,
    ) -> Result<Self> {
        let Value::Object(mut fields) = raw else {
            return Err(Error::data_shape("exercise record is not a JSON object"));
        };

        let typed = RawExercise::deserialize(&Value::Object(fields.clone()))
            .map_err(|e| Error::data_shape(format!("invalid exercise record: {}", e)))?;

        for key in DERIVED_KEYS {
            fields.remove(*key);
        }

        let ids = |list: &[RefField]| list.iter().map(RefField::id).collect::<Vec<_>>();

        let name = typed
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| PLACEHOLDER_NAME.to_string());

        Ok(Self {
            id: typed.id,
            name,
            category_name: refs.category_name(typed.category.as_ref().and_then(RefField::id)),
            equipment_names: refs.equipment_names(&ids(&typed.equipment)),
            muscle_names: refs.muscle_names(&ids(&typed.muscles)),
            muscle_secondary_names: refs.muscle_names(&ids(&typed.muscles_secondary)),
            last_synced: synced_at,
            extra: fields,
        })
    }
}

impl fmt::Display for ExerciseDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} ({})", self.id, self.name, self.category_name)
    }
}
