//! Keyed row storage for the pod resource store.
//!
//! A row store maps `(table, key)` to an attribute bag ([`Row`]). It never
//! interprets attribute values; invariants over rows are enforced by the
//! callers that own each table.
//!
//! Derived indexes group keys by the value of one attribute. Once registered,
//! an index is kept current on every `set` and `delete`, so "list keys where
//! attribute X = value" never needs a table scan.
//!
//! # Storage Backends
//!
//! All backends implement the [`RowStore`] trait:
//!
//! - [`InMemoryRowStore`] -- `HashMap`-based store for tests and embedding
//!
//! Whole tables can be exported to and imported from JSON with the
//! [`snapshot`] helpers.

pub mod error;
pub mod memory;
pub mod snapshot;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryRowStore;
pub use pod_types::Row;
pub use snapshot::{export_table, import_table, load_snapshot, save_snapshot};
pub use traits::RowStore;
