use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{TypeError, TypeResult};
use crate::resource::Row;

/// An identity a user can act as, stored in the `personas` table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Persona {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("name".into(), Value::String(self.name.clone()));
        if let Some(email) = &self.email {
            row.insert("email".into(), Value::String(email.clone()));
        }
        row
    }

    pub fn from_row(id: &str, row: &Row) -> TypeResult<Self> {
        let name = match row.get("name") {
            Some(Value::String(s)) => s.clone(),
            None => return Err(TypeError::MissingAttribute("name")),
            Some(other) => {
                return Err(TypeError::InvalidAttribute {
                    name: "name".into(),
                    reason: format!("expected string, found {other}"),
                })
            }
        };
        let email = row.get("email").and_then(Value::as_str).map(str::to_string);
        Ok(Self {
            id: id.to_string(),
            name,
            email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_roundtrip() {
        let p = Persona::new("alice", "Alice").with_email("alice@pod.example");
        let back = Persona::from_row("alice", &p.to_row()).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn email_is_optional() {
        let p = Persona::new("bob", "Bob");
        assert!(!p.to_row().contains_key("email"));
        assert_eq!(Persona::from_row("bob", &p.to_row()).unwrap().email, None);
    }

    #[test]
    fn missing_name_is_error() {
        let err = Persona::from_row("x", &Row::new()).unwrap_err();
        assert_eq!(err, TypeError::MissingAttribute("name"));
    }
}
