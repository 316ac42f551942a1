use std::collections::HashMap;

use log::info;

use crate::catalog::{CatalogSource, NamedRef, ReferenceTable};
use crate::error::Result;

pub const UNKNOWN: &str = "Unknown";

/// Identifier to display-name lookups, rebuilt for every sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceMaps {
    pub categories: HashMap<i64, String>,
    pub equipment: HashMap<i64, String>,
    pub muscles: HashMap<i64, String>,
}

impl ReferenceMaps {
    /// Fetch all three lookup tables. Any failure aborts; no partial maps are returned.
    pub async fn load<S: CatalogSource>(source: &S) -> Result<Self> {
        let mut maps = Self::default();
        for table in ReferenceTable::ALL {
            let entries = source.fetch_reference_table(table).await?;
            info!("Loaded {} {} references", entries.len(), table.as_str());
            *maps.table_mut(table) = to_map(entries);
        }
        Ok(maps)
    }

    fn table_mut(&mut self, table: ReferenceTable) -> &mut HashMap<i64, String> {
        match table {
            ReferenceTable::Category => &mut self.categories,
            ReferenceTable::Equipment => &mut self.equipment,
            ReferenceTable::Muscle => &mut self.muscles,
        }
    }

    pub fn category_name(&self, id: Option<i64>) -> String {
        resolve(&self.categories, id)
    }

    pub fn equipment_names(&self, ids: &[Option<i64>]) -> Vec<String> {
        ids.iter().map(|id| resolve(&self.equipment, *id)).collect()
    }

    pub fn muscle_names(&self, ids: &[Option<i64>]) -> Vec<String> {
        ids.iter().map(|id| resolve(&self.muscles, *id)).collect()
    }
}

fn to_map(entries: Vec<NamedRef>) -> HashMap<i64, String> {
    entries.into_iter().map(|r| (r.id, r.name)).collect()
}

fn resolve(map: &HashMap<i64, String>, id: Option<i64>) -> String {
    id.and_then(|id| map.get(&id))
        .cloned()
        .unwrap_or_else(|| UNKNOWN.to_string())
}
