//! Persona records and the default-persona application state.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};

use pod_store::{RowStore, StoreResult};
use pod_types::{Persona, Row};

use crate::error::CommandError;

/// Table holding one row per persona, keyed by persona id.
pub const PERSONAS_TABLE: &str = "personas";

/// Table holding named application state values.
pub const STATE_TABLE: &str = "state";

/// A snapshot of the default-persona state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DefaultPersona {
    pub id: Option<String>,
    pub version: u64,
}

/// The "default persona": which identity commands act as when none is given.
///
/// Stored as a single row `{value, version}` under the key
/// [`PersonaState::NAME`] in the state table. Every `set` and `clear` bumps
/// the version, so observers can tell that the value changed even when it
/// was set back to the same id.
pub struct PersonaState {
    store: Arc<dyn RowStore>,
}

impl PersonaState {
    pub const NAME: &'static str = "default-persona";

    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self { store }
    }

    /// Current value and version.
    pub fn read(&self) -> StoreResult<DefaultPersona> {
        let Some(row) = self.store.get(STATE_TABLE, Self::NAME)? else {
            return Ok(DefaultPersona::default());
        };
        Ok(DefaultPersona {
            id: row.get("value").and_then(Value::as_str).map(str::to_string),
            version: row.get("version").and_then(Value::as_u64).unwrap_or(0),
        })
    }

    /// The default persona id, if one is set.
    pub fn get(&self) -> StoreResult<Option<String>> {
        Ok(self.read()?.id)
    }

    pub fn version(&self) -> StoreResult<u64> {
        Ok(self.read()?.version)
    }

    /// Make `id` the default. Returns the new version.
    pub fn set(&self, id: &str) -> StoreResult<u64> {
        self.write(Value::String(id.to_string()))
    }

    /// Unset the default. Returns the new version.
    pub fn clear(&self) -> StoreResult<u64> {
        self.write(Value::Null)
    }

    fn write(&self, value: Value) -> StoreResult<u64> {
        let version = self.version()? + 1;
        let mut row = Row::new();
        row.insert("value".into(), value);
        row.insert("version".into(), json!(version));
        self.store.set(STATE_TABLE, Self::NAME, row)?;
        tracing::debug!(state = Self::NAME, version, "state updated");
        Ok(version)
    }
}

/// CRUD over the personas table.
pub struct PersonaDirectory {
    store: Arc<dyn RowStore>,
    state: PersonaState,
}

impl PersonaDirectory {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        let state = PersonaState::new(Arc::clone(&store));
        Self { store, state }
    }

    pub fn state(&self) -> &PersonaState {
        &self.state
    }

    /// All personas, ordered by id.
    pub fn list(&self) -> Result<Vec<Persona>, CommandError> {
        let mut personas = Vec::new();
        for id in self.store.keys(PERSONAS_TABLE)? {
            if let Some(persona) = self.get(&id)? {
                personas.push(persona);
            }
        }
        Ok(personas)
    }

    pub fn get(&self, id: &str) -> Result<Option<Persona>, CommandError> {
        match self.store.get(PERSONAS_TABLE, id)? {
            Some(row) => Ok(Some(Persona::from_row(id, &row)?)),
            None => Ok(None),
        }
    }

    pub fn exists(&self, id: &str) -> Result<bool, CommandError> {
        Ok(self.store.exists(PERSONAS_TABLE, id)?)
    }

    /// Insert or replace a persona. Returns `true` if one was replaced.
    pub fn put(&self, persona: &Persona) -> Result<bool, CommandError> {
        let existed = self.exists(&persona.id)?;
        self.store.set(PERSONAS_TABLE, &persona.id, persona.to_row())?;
        Ok(existed)
    }

    /// Remove a persona, clearing the default if it pointed at it.
    ///
    /// Returns `false` if no such persona existed.
    pub fn remove(&self, id: &str) -> Result<bool, CommandError> {
        if !self.store.delete(PERSONAS_TABLE, id)? {
            return Ok(false);
        }
        if self.state.get()?.as_deref() == Some(id) {
            self.state.clear()?;
        }
        Ok(true)
    }
}

impl std::fmt::Debug for PersonaDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersonaDirectory").finish_non_exhaustive()
    }
}
