use serde_json::Value;

use crate::error::StoreResult;
use pod_types::Row;

/// Keyed table storage with derived attribute indexes.
///
/// All implementations must satisfy these invariants:
/// - A write to one key is atomic: readers see either the old row or the new
///   one, never a mix.
/// - Registered indexes reflect every completed `set` and `delete`.
/// - The store applies no schema; callers enforce their own invariants.
pub trait RowStore: Send + Sync {
    /// Read a row. Returns `Ok(None)` if the key is absent.
    fn get(&self, table: &str, key: &str) -> StoreResult<Option<Row>>;

    /// Create or wholesale replace the row at `key`.
    fn set(&self, table: &str, key: &str, row: Row) -> StoreResult<()>;

    /// Delete a row. Returns `true` if it existed.
    fn delete(&self, table: &str, key: &str) -> StoreResult<bool>;

    /// Check whether a row exists.
    fn exists(&self, table: &str, key: &str) -> StoreResult<bool>;

    /// All keys of a table, sorted.
    fn keys(&self, table: &str) -> StoreResult<Vec<String>>;

    /// Register a derived index over `attribute`, built from the current
    /// rows. Registering an existing index is a no-op.
    fn register_index(&self, table: &str, attribute: &str) -> StoreResult<()>;

    /// Sorted keys whose `attribute` equals `value`.
    ///
    /// Uses a registered index when one exists and scans otherwise.
    fn keys_where(&self, table: &str, attribute: &str, value: &Value) -> StoreResult<Vec<String>>;

    /// Remove every row of a table. Registered indexes survive, emptied.
    fn clear_table(&self, table: &str) -> StoreResult<()>;

    /// Number of rows in a table.
    fn count(&self, table: &str) -> StoreResult<usize> {
        Ok(self.keys(table)?.len())
    }
}
