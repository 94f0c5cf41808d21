use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{TypeError, TypeResult};

/// A raw attribute bag, as held by the row store for one key.
pub type Row = BTreeMap<String, Value>;

/// Attribute names of the core protocol slice of a resource row.
pub mod attrs {
    pub const TYPE: &str = "type";
    pub const BODY: &str = "body";
    pub const CONTENT_TYPE: &str = "contentType";
    pub const PARENT_ID: &str = "parentId";
    pub const UPDATED: &str = "updated";

    /// Every attribute owned by the protocol handler.
    pub const CORE: &[&str] = &[TYPE, BODY, CONTENT_TYPE, PARENT_ID, UPDATED];

    /// Returns `true` if `name` belongs to the core slice.
    pub fn is_core(name: &str) -> bool {
        CORE.contains(&name)
    }
}

/// Whether a resource is a folder-like container or an opaque object.
///
/// The kind is never stored independently of the identifier: a container's
/// URL always ends with `/`, an object's never does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Container,
    Object,
}

impl ResourceKind {
    /// Derive the kind from an identifier's trailing separator.
    pub fn of(id: &str) -> Self {
        if id.ends_with('/') {
            Self::Container
        } else {
            Self::Object
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Container => "container",
            Self::Object => "object",
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Self::Container)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "container" => Ok(Self::Container),
            "object" => Ok(Self::Object),
            other => Err(TypeError::InvalidAttribute {
                name: attrs::TYPE.into(),
                reason: format!("unknown resource type {other:?}"),
            }),
        }
    }
}

/// The slice of a resource row written by the protocol handler.
///
/// A PUT replaces all of these fields at once; nothing else writes them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoreFields {
    pub kind: ResourceKind,
    /// Text or base64-encoded binary content. Containers conventionally
    /// carry none.
    pub body: Option<String>,
    pub content_type: String,
    /// `None` only for the root container.
    pub parent_id: Option<String>,
    pub updated: DateTime<Utc>,
}

/// A stored resource: core protocol fields plus open extension attributes.
///
/// Extension attributes (title, description, author, ...) are owned by
/// metadata editors. They live on the same row as the core fields but may
/// never shadow a core attribute name.
#[derive(Clone, Debug, PartialEq)]
pub struct Resource {
    pub id: String,
    pub core: CoreFields,
    extensions: BTreeMap<String, Value>,
}

impl Resource {
    /// Create a resource with no extension attributes.
    pub fn new(id: impl Into<String>, core: CoreFields) -> Self {
        Self {
            id: id.into(),
            core,
            extensions: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.core.kind
    }

    pub fn is_container(&self) -> bool {
        self.core.kind.is_container()
    }

    /// Replace the whole core slice, keeping extension attributes intact.
    pub fn replace_core(&mut self, core: CoreFields) {
        self.core = core;
    }

    pub fn extensions(&self) -> &BTreeMap<String, Value> {
        &self.extensions
    }

    pub fn extension(&self, name: &str) -> Option<&Value> {
        self.extensions.get(name)
    }

    /// Set an extension attribute, returning the previous value.
    pub fn set_extension(&mut self, name: &str, value: Value) -> TypeResult<Option<Value>> {
        if attrs::is_core(name) {
            return Err(TypeError::ReservedAttribute(name.to_string()));
        }
        Ok(self.extensions.insert(name.to_string(), value))
    }

    /// Remove an extension attribute, returning its value if it was set.
    pub fn remove_extension(&mut self, name: &str) -> TypeResult<Option<Value>> {
        if attrs::is_core(name) {
            return Err(TypeError::ReservedAttribute(name.to_string()));
        }
        Ok(self.extensions.remove(name))
    }

    /// Flatten into the persisted attribute layout.
    pub fn to_row(&self) -> Row {
        let mut row: Row = self.extensions.clone();
        row.insert(attrs::TYPE.into(), Value::from(self.core.kind.as_str()));
        row.insert(
            attrs::BODY.into(),
            self.core.body.clone().map(Value::String).unwrap_or(Value::Null),
        );
        row.insert(
            attrs::CONTENT_TYPE.into(),
            Value::String(self.core.content_type.clone()),
        );
        row.insert(
            attrs::PARENT_ID.into(),
            self.core
                .parent_id
                .clone()
                .map(Value::String)
                .unwrap_or(Value::Null),
        );
        row.insert(
            attrs::UPDATED.into(),
            Value::String(self.core.updated.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        row
    }

    /// Rebuild a resource from its persisted attribute layout.
    ///
    /// The stored `type` must agree with the kind implied by `id`.
    pub fn from_row(id: &str, row: &Row) -> TypeResult<Self> {
        let kind: ResourceKind = required_str(row, attrs::TYPE)?.parse()?;
        if kind != ResourceKind::of(id) {
            return Err(TypeError::InvalidAttribute {
                name: attrs::TYPE.into(),
                reason: format!("{kind} does not match identifier {id}"),
            });
        }

        let updated = DateTime::parse_from_rfc3339(required_str(row, attrs::UPDATED)?)
            .map_err(|e| TypeError::InvalidAttribute {
                name: attrs::UPDATED.into(),
                reason: e.to_string(),
            })?
            .with_timezone(&Utc);

        let core = CoreFields {
            kind,
            body: optional_str(row, attrs::BODY)?,
            content_type: required_str(row, attrs::CONTENT_TYPE)?.to_string(),
            parent_id: optional_str(row, attrs::PARENT_ID)?,
            updated,
        };

        let extensions = row
            .iter()
            .filter(|(k, _)| !attrs::is_core(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Ok(Self {
            id: id.to_string(),
            core,
            extensions,
        })
    }
}

fn required_str<'a>(row: &'a Row, name: &'static str) -> TypeResult<&'a str> {
    match row.get(name) {
        None | Some(Value::Null) => Err(TypeError::MissingAttribute(name)),
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(TypeError::InvalidAttribute {
            name: name.into(),
            reason: format!("expected string, found {other}"),
        }),
    }
}

fn optional_str(row: &Row, name: &'static str) -> TypeResult<Option<String>> {
    match row.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(TypeError::InvalidAttribute {
            name: name.into(),
            reason: format!("expected string or null, found {other}"),
        }),
    }
}
