//! Read-modify-write helpers for resource metadata.
//!
//! Metadata lives in the extension attributes of a resource row. These
//! helpers never go through the request handler, and never touch the core
//! fields a PUT owns.

use std::collections::BTreeMap;

use serde_json::Value;

use pod_protocol::Pod;
use pod_types::{attrs, Resource};

use crate::error::{CommandError, ErrorCode};
use crate::persona::PersonaDirectory;

pub const TITLE: &str = "title";
pub const DESCRIPTION: &str = "description";
/// Persona id of the resource's author.
pub const AUTHOR: &str = "author";

/// Extension attributes of the resource at `id`.
pub fn read(pod: &Pod, id: &str) -> Result<BTreeMap<String, Value>, CommandError> {
    match pod.resource(id)? {
        Some(resource) => Ok(resource.extensions().clone()),
        None => Err(CommandError::path_not_found(id)),
    }
}

/// A batch of metadata changes written in a single read-modify-write.
///
/// Every key is checked before anything is written, so a rejected batch
/// leaves the resource untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetadataEdit {
    set: Vec<(String, Value)>,
    clear: Vec<String>,
}

impl MetadataEdit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: Value) -> &mut Self {
        self.set.push((key.to_string(), value));
        self
    }

    pub fn clear(&mut self, key: &str) -> &mut Self {
        self.clear.push(key.to_string());
        self
    }

    /// Queue `persona_id` as the author. The persona must exist.
    pub fn author(
        &mut self,
        personas: &PersonaDirectory,
        persona_id: &str,
    ) -> Result<&mut Self, CommandError> {
        if !personas.exists(persona_id)? {
            return Err(CommandError::entity_not_found("persona", persona_id));
        }
        Ok(self.set(AUTHOR, Value::String(persona_id.to_string())))
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.clear.is_empty()
    }

    /// Keys this batch sets, in the order they were queued.
    pub fn changed(&self) -> Vec<&str> {
        self.set.iter().map(|(key, _)| key.as_str()).collect()
    }

    pub fn cleared(&self) -> Vec<&str> {
        self.clear.iter().map(String::as_str).collect()
    }

    /// Validate every key, then write all changes at once. Sets run before
    /// clears.
    pub fn apply(&self, pod: &Pod, id: &str) -> Result<Resource, CommandError> {
        for key in self.set.iter().map(|(key, _)| key).chain(&self.clear) {
            check_key(key)?;
        }
        let updated = pod.edit_extensions(id, |res| {
            for (key, value) in &self.set {
                res.set_extension(key, value.clone())?;
            }
            for key in &self.clear {
                res.remove_extension(key)?;
            }
            Ok(())
        })?;
        updated.ok_or_else(|| CommandError::path_not_found(id))
    }
}

/// Set one extension attribute.
pub fn set(pod: &Pod, id: &str, key: &str, value: Value) -> Result<Resource, CommandError> {
    MetadataEdit::new().set(key, value).apply(pod, id)
}

/// Remove one extension attribute. Removing an absent key is not an error.
pub fn clear(pod: &Pod, id: &str, key: &str) -> Result<Resource, CommandError> {
    MetadataEdit::new().clear(key).apply(pod, id)
}

pub fn set_title(pod: &Pod, id: &str, title: &str) -> Result<Resource, CommandError> {
    set(pod, id, TITLE, Value::String(title.to_string()))
}

pub fn set_description(pod: &Pod, id: &str, description: &str) -> Result<Resource, CommandError> {
    set(pod, id, DESCRIPTION, Value::String(description.to_string()))
}

/// Record `persona_id` as the author. The persona must exist.
pub fn set_author(
    pod: &Pod,
    personas: &PersonaDirectory,
    id: &str,
    persona_id: &str,
) -> Result<Resource, CommandError> {
    MetadataEdit::new().author(personas, persona_id)?.apply(pod, id)
}

fn check_key(key: &str) -> Result<(), CommandError> {
    if key.is_empty() {
        return Err(CommandError::missing_argument("metadata key"));
    }
    if attrs::is_core(key) {
        return Err(CommandError::new(
            ErrorCode::MethodNotAllowed,
            format!("'{key}' is managed by the pod and cannot be edited as metadata"),
        ));
    }
    Ok(())
}
