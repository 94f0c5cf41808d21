use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;

use crate::error::{StoreError, StoreResult};
use crate::traits::RowStore;
use pod_types::Row;

/// Index key for an attribute value. `None` values are never indexed.
fn index_key(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// One derived index: attribute value -> keys carrying it.
type AttrIndex = BTreeMap<String, BTreeSet<String>>;

#[derive(Default)]
struct Table {
    rows: BTreeMap<String, Row>,
    indexes: BTreeMap<String, AttrIndex>,
}

impl Table {
    fn unindex(&mut self, key: &str, row: &Row) {
        for (attribute, index) in self.indexes.iter_mut() {
            if let Some(value) = row.get(attribute).and_then(index_key) {
                if let Some(keys) = index.get_mut(&value) {
                    keys.remove(key);
                    if keys.is_empty() {
                        index.remove(&value);
                    }
                }
            }
        }
    }

    fn index(&mut self, key: &str, row: &Row) {
        for (attribute, index) in self.indexes.iter_mut() {
            if let Some(value) = row.get(attribute).and_then(index_key) {
                index.entry(value).or_default().insert(key.to_string());
            }
        }
    }
}

/// In-memory, HashMap-based row store.
///
/// Intended for tests and embedding. All tables are held behind a single
/// `RwLock`, so each `set`/`delete` and its index maintenance happen as one
/// atomic step. Rows are cloned on read/write.
pub struct InMemoryRowStore {
    tables: RwLock<HashMap<String, Table>>,
}

impl InMemoryRowStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
        }
    }

    /// Names of all tables that have ever been touched, sorted.
    pub fn tables(&self) -> StoreResult<Vec<String>> {
        let tables = self.read_tables()?;
        let mut names: Vec<String> = tables.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    /// Attributes with a registered index on `table`.
    pub fn indexed_attributes(&self, table: &str) -> StoreResult<Vec<String>> {
        let tables = self.read_tables()?;
        Ok(tables
            .get(table)
            .map(|t| t.indexes.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn read_tables(&self) -> StoreResult<RwLockReadGuard<'_, HashMap<String, Table>>> {
        self.tables
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    fn write_tables(&self) -> StoreResult<RwLockWriteGuard<'_, HashMap<String, Table>>> {
        self.tables
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }
}

impl Default for InMemoryRowStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RowStore for InMemoryRowStore {
    fn get(&self, table: &str, key: &str) -> StoreResult<Option<Row>> {
        let tables = self.read_tables()?;
        Ok(tables.get(table).and_then(|t| t.rows.get(key)).cloned())
    }

    fn set(&self, table: &str, key: &str, row: Row) -> StoreResult<()> {
        let mut tables = self.write_tables()?;
        let t = tables.entry(table.to_string()).or_default();
        if let Some(old) = t.rows.remove(key) {
            t.unindex(key, &old);
        }
        t.index(key, &row);
        t.rows.insert(key.to_string(), row);
        Ok(())
    }

    fn delete(&self, table: &str, key: &str) -> StoreResult<bool> {
        let mut tables = self.write_tables()?;
        let Some(t) = tables.get_mut(table) else {
            return Ok(false);
        };
        match t.rows.remove(key) {
            Some(old) => {
                t.unindex(key, &old);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn exists(&self, table: &str, key: &str) -> StoreResult<bool> {
        let tables = self.read_tables()?;
        Ok(tables.get(table).is_some_and(|t| t.rows.contains_key(key)))
    }

    fn keys(&self, table: &str) -> StoreResult<Vec<String>> {
        let tables = self.read_tables()?;
        Ok(tables
            .get(table)
            .map(|t| t.rows.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn register_index(&self, table: &str, attribute: &str) -> StoreResult<()> {
        let mut tables = self.write_tables()?;
        let t = tables.entry(table.to_string()).or_default();
        if t.indexes.contains_key(attribute) {
            return Ok(());
        }
        let mut index = AttrIndex::new();
        for (key, row) in &t.rows {
            if let Some(value) = row.get(attribute).and_then(index_key) {
                index.entry(value).or_default().insert(key.clone());
            }
        }
        tracing::debug!(table, attribute, entries = index.len(), "registered derived index");
        t.indexes.insert(attribute.to_string(), index);
        Ok(())
    }

    fn keys_where(&self, table: &str, attribute: &str, value: &Value) -> StoreResult<Vec<String>> {
        let tables = self.read_tables()?;
        let Some(t) = tables.get(table) else {
            return Ok(Vec::new());
        };
        if let (Some(index), Some(wanted)) = (t.indexes.get(attribute), index_key(value)) {
            return Ok(index
                .get(&wanted)
                .map(|keys| keys.iter().cloned().collect())
                .unwrap_or_default());
        }
        Ok(t
            .rows
            .iter()
            .filter(|(_, row)| row.get(attribute).unwrap_or(&Value::Null) == value)
            .map(|(key, _)| key.clone())
            .collect())
    }

    fn clear_table(&self, table: &str) -> StoreResult<()> {
        let mut tables = self.write_tables()?;
        if let Some(t) = tables.get_mut(table) {
            t.rows.clear();
            for index in t.indexes.values_mut() {
                index.clear();
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryRowStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self
            .tables
            .read()
            .map(|t| t.values().map(|t| t.rows.len()).sum::<usize>())
            .unwrap_or_default();
        f.debug_struct("InMemoryRowStore")
            .field("row_count", &count)
            .finish()
    }
}
