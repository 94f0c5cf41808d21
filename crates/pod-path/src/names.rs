//! Resource name validation.
//!
//! Every decoded path segment of a request URL must pass these rules before
//! the handler touches the store. The defaults keep names portable to common
//! filesystems:
//!
//! - At most 255 characters
//! - No `/`, ASCII control characters, or any of `< > : " | ? * \`
//! - Must not end with `.` or a space
//! - Must not be a reserved device name (`CON`, `NUL`, `COM1`, ...), with or
//!   without an extension, compared case-insensitively
//!
//! Hidden names (leading `.`) are allowed unless `allow_hidden` is off.

use serde::{Deserialize, Serialize};

use crate::error::{PathError, PathResult};

const DEFAULT_FORBIDDEN: &[char] = &['<', '>', ':', '"', '|', '?', '*', '\\'];

const DEFAULT_RESERVED: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Configurable rule set applied to each decoded path segment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameRules {
    /// Maximum length in characters.
    pub max_length: usize,
    /// Characters rejected anywhere in a name, in addition to `/` and
    /// control characters.
    pub forbidden_chars: Vec<char>,
    /// Names rejected case-insensitively, also when followed by an extension.
    pub reserved_names: Vec<String>,
    /// Whether names starting with `.` are accepted.
    pub allow_hidden: bool,
}

impl Default for NameRules {
    fn default() -> Self {
        Self {
            max_length: 255,
            forbidden_chars: DEFAULT_FORBIDDEN.to_vec(),
            reserved_names: DEFAULT_RESERVED.iter().map(|s| s.to_string()).collect(),
            allow_hidden: true,
        }
    }
}

impl NameRules {
    /// Accept any name that is not structurally unsafe (`/`, control
    /// characters). Traversal segments are rejected before these rules run.
    pub fn permissive() -> Self {
        Self {
            max_length: usize::MAX,
            forbidden_chars: Vec::new(),
            reserved_names: Vec::new(),
            allow_hidden: true,
        }
    }

    /// Validate a decoded segment, returning `Ok(())` if it is acceptable.
    ///
    /// # Examples
    ///
    /// ```
    /// use pod_path::NameRules;
    ///
    /// let rules = NameRules::default();
    /// assert!(rules.validate("notes.txt").is_ok());
    /// assert!(rules.validate("a|b").is_err());
    /// assert!(rules.validate("nul.txt").is_err());
    /// ```
    pub fn validate(&self, name: &str) -> PathResult<()> {
        let reject = |reason: String| -> PathResult<()> {
            Err(PathError::InvalidName {
                name: name.to_string(),
                reason,
            })
        };

        if name.is_empty() {
            return reject("Name must not be empty".into());
        }

        if name.chars().count() > self.max_length {
            return reject(format!("Name too long (max {} characters)", self.max_length));
        }

        if name.chars().any(|c| c.is_ascii_control()) {
            return reject("Name contains control characters".into());
        }

        if name.contains('/') {
            return reject("Name contains forbidden character '/'".into());
        }

        for ch in &self.forbidden_chars {
            if name.contains(*ch) {
                return reject(format!("Name contains forbidden character {ch:?}"));
            }
        }

        // Traversal is handled by the caller; everything else with a
        // trailing dot or space is ambiguous on common filesystems.
        if name != "." && name != ".." && (name.ends_with('.') || name.ends_with(' ')) {
            return reject("Name must not end with a dot or space".into());
        }

        if !self.allow_hidden && name.starts_with('.') {
            return reject("Hidden names are not allowed".into());
        }

        let stem = name.split('.').next().unwrap_or(name);
        if self
            .reserved_names
            .iter()
            .any(|r| r.eq_ignore_ascii_case(stem))
        {
            return reject(format!("Reserved name: {name}"));
        }

        Ok(())
    }
}
