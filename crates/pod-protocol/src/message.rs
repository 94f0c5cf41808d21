use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Status codes the handler answers with.
pub mod status {
    pub const OK: u16 = 200;
    pub const CREATED: u16 = 201;
    pub const NO_CONTENT: u16 = 204;
    pub const BAD_REQUEST: u16 = 400;
    pub const FORBIDDEN: u16 = 403;
    pub const NOT_FOUND: u16 = 404;
    pub const METHOD_NOT_ALLOWED: u16 = 405;
    pub const CONFLICT: u16 = 409;
    pub const INTERNAL_SERVER_ERROR: u16 = 500;
}

/// Fixed response bodies for the failures callers tell apart.
pub mod reason {
    pub const NOT_FOUND: &str = "Not Found";
    pub const METHOD_NOT_ALLOWED: &str = "Method Not Allowed";
    pub const PARENT_MISSING: &str = "Parent folder missing";
    pub const ROOT_NOT_DELETABLE: &str = "Cannot delete root";
    pub const CONTAINER_NOT_EMPTY: &str = "Container not empty";
}

/// Header names the handler reads or sets.
pub mod headers {
    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const LAST_MODIFIED: &str = "Last-Modified";
    pub const LOCATION: &str = "Location";
}

/// Methods the handler serves. Anything else is answered with `405`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Put,
    Delete,
}

impl Method {
    /// Parse a method name case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "PUT" => Some(Self::Put),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    pub fn is_mutating(&self) -> bool {
        !matches!(self, Self::Get)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn header_lookup<'a>(map: &'a BTreeMap<String, String>, name: &str) -> Option<&'a str> {
    map.iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Request options: method, optional body, and headers.
///
/// The method is kept as the caller's raw text so unknown methods can be
/// answered with `405` instead of failing to construct.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub method: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl Request {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            ..Default::default()
        }
    }

    pub fn get() -> Self {
        Self::new("GET")
    }

    pub fn put(body: Option<String>) -> Self {
        Self {
            body,
            ..Self::new("PUT")
        }
    }

    pub fn delete() -> Self {
        Self::new("DELETE")
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_content_type(self, content_type: impl Into<String>) -> Self {
        self.with_header(headers::CONTENT_TYPE, content_type)
    }

    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        header_lookup(&self.headers, name)
    }
}

/// The outcome of a request: status, optional body, and headers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

impl Response {
    pub fn new(status: u16, body: Option<String>) -> Self {
        Self {
            status,
            body,
            headers: BTreeMap::new(),
        }
    }

    /// A failure response whose body is the human-readable message.
    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self::new(status, Some(message.into()))
    }

    pub fn created(location: &str) -> Self {
        Self::new(status::CREATED, None).with_header(headers::LOCATION, location)
    }

    pub fn no_content() -> Self {
        Self::new(status::NO_CONTENT, None)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        header_lookup(&self.headers, name)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(headers::CONTENT_TYPE)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
