use crate::MemoryDatabase;
use tabula_core::{Condition, PartialCollection, Record, Result, Value, resolve_primary_key};

/// The memory adapter part of a collection, bound to one session.
pub struct MemoryCollection<'s> {
    database: &'s MemoryDatabase,
    name: String,
}

impl<'s> MemoryCollection<'s> {
    pub fn new(database: &'s MemoryDatabase, name: impl Into<String>) -> Self {
        Self {
            database,
            name: name.into(),
        }
    }
}

impl PartialCollection for MemoryCollection<'_> {
    type Database = MemoryDatabase;

    fn database(&self) -> &Self::Database {
        self.database
    }

    fn name(&self) -> &str {
        &self.name
    }

    /// Integers are stored as `Int64`, literals are widened to match.
    fn filter_conditions(
        &self,
        primary_keys: &[String],
        conditions: Vec<Condition>,
    ) -> Vec<Condition> {
        resolve_primary_key(
            primary_keys,
            conditions
                .into_iter()
                .map(|c| c.map_values(&Value::into_int64))
                .collect(),
        )
    }

    async fn insert<R: Record>(&self, item: &R) -> Result<Option<Value>> {
        self.database.insert_row(&self.name, item.describe_fields())
    }
}
