//! JSON import/export of whole tables.
//!
//! A snapshot document is a JSON object keyed by table name; each table is
//! itself an object keyed by row key, holding that row's attributes:
//!
//! ```json
//! { "resources": { "https://pod.example/": { "type": "container", ... } } }
//! ```
//!
//! Files are written to a sibling temporary file and renamed into place, so a
//! crash mid-save never leaves a truncated snapshot behind.

use std::io::Write;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{StoreError, StoreResult};
use crate::traits::RowStore;
use pod_types::Row;

/// Serialize every row of `table` into a JSON object keyed by row key.
pub fn export_table<S: RowStore + ?Sized>(store: &S, table: &str) -> StoreResult<Value> {
    let mut out = Map::new();
    for key in store.keys(table)? {
        if let Some(row) = store.get(table, &key)? {
            out.insert(key, Value::Object(row.into_iter().collect()));
        }
    }
    Ok(Value::Object(out))
}

/// Replace the contents of `table` with the rows in `snapshot`.
///
/// Returns the number of rows imported. Indexes registered on the table are
/// kept consistent by the store's own `set` path.
pub fn import_table<S: RowStore + ?Sized>(
    store: &S,
    table: &str,
    snapshot: &Value,
) -> StoreResult<usize> {
    let Value::Object(rows) = snapshot else {
        return Err(StoreError::InvalidSnapshot(format!(
            "table {table} must be a JSON object"
        )));
    };

    // Validate everything before touching the store.
    let mut parsed: Vec<(&String, Row)> = Vec::with_capacity(rows.len());
    for (key, value) in rows {
        let Value::Object(attrs) = value else {
            return Err(StoreError::InvalidSnapshot(format!(
                "row {key} in table {table} must be a JSON object"
            )));
        };
        parsed.push((key, attrs.clone().into_iter().collect()));
    }

    store.clear_table(table)?;
    let count = parsed.len();
    for (key, row) in parsed {
        store.set(table, key, row)?;
    }
    tracing::info!(table, rows = count, "imported table snapshot");
    Ok(count)
}

/// Write the given tables to `path` as one snapshot document.
pub fn save_snapshot<S: RowStore + ?Sized>(
    store: &S,
    tables: &[&str],
    path: &Path,
) -> StoreResult<()> {
    let mut doc = Map::new();
    for table in tables {
        doc.insert(table.to_string(), export_table(store, table)?);
    }
    let bytes = serde_json::to_vec_pretty(&Value::Object(doc))?;

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&bytes)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
    tracing::info!(path = %path.display(), tables = tables.len(), "saved snapshot");
    Ok(())
}

/// Load every table found in the snapshot at `path`.
///
/// Returns the names of the tables that were imported, sorted.
pub fn load_snapshot<S: RowStore + ?Sized>(store: &S, path: &Path) -> StoreResult<Vec<String>> {
    let bytes = std::fs::read(path)?;
    let doc: Value = serde_json::from_slice(&bytes)?;
    let Value::Object(tables) = doc else {
        return Err(StoreError::InvalidSnapshot(
            "snapshot root must be a JSON object".into(),
        ));
    };
    let mut loaded = Vec::with_capacity(tables.len());
    for (table, rows) in &tables {
        import_table(store, table, rows)?;
        loaded.push(table.clone());
    }
    loaded.sort();
    Ok(loaded)
}
