//! Free-form argument text to positionals and `--flag[=value]` options.
//!
//! Tokenizing is quote-aware: `"a b"` and `'a b'` are single tokens, and a
//! backslash escapes the next character outside single quotes. A bare `--`
//! ends option parsing; everything after it is positional.

use std::collections::BTreeMap;

use serde_json::Value;

/// Split a command line into tokens.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('\''), c) => current.push(c),
            (_, '\\') => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
                in_token = true;
            }
            (Some(_), c) => current.push(c),
            (None, '"') | (None, '\'') => {
                quote = Some(c);
                in_token = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    tokens
}

/// Parsed arguments of one command invocation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedArgs {
    pub positional: Vec<String>,
    /// Flag values: `Value::Bool(true)` for bare flags, strings otherwise.
    pub flags: BTreeMap<String, Value>,
}

impl ParsedArgs {
    /// Parse already-tokenized arguments.
    pub fn parse<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parsed = Self::default();
        let mut options_done = false;
        for token in tokens {
            let token: String = token.into();
            if options_done {
                parsed.positional.push(token);
                continue;
            }
            if token == "--" {
                options_done = true;
                continue;
            }
            match token.strip_prefix("--") {
                Some(flag) => match flag.split_once('=') {
                    Some((name, value)) => {
                        parsed.flags.insert(name.to_string(), Value::String(value.to_string()));
                    }
                    None => {
                        parsed.flags.insert(flag.to_string(), Value::Bool(true));
                    }
                },
                None => parsed.positional.push(token),
            }
        }
        parsed
    }

    /// Tokenize and parse argument text.
    pub fn from_text(text: &str) -> Self {
        Self::parse(tokenize(text))
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.positional.get(index).map(String::as_str)
    }

    /// Positionals from `index` on, joined with single spaces.
    pub fn rest(&self, index: usize) -> Option<String> {
        if index >= self.positional.len() {
            return None;
        }
        Some(self.positional[index..].join(" "))
    }

    pub fn has(&self, name: &str) -> bool {
        self.flags.contains_key(name)
    }

    /// String value of a flag. Bare flags have no string value.
    pub fn flag(&self, name: &str) -> Option<&str> {
        self.flags.get(name).and_then(Value::as_str)
    }

    /// Boolean value of a flag: bare flags are `true`; `--x=false`/`--x=0`/
    /// `--x=no` are `false`; absent flags are `false`.
    pub fn flag_bool(&self, name: &str) -> bool {
        match self.flags.get(name) {
            None => false,
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => !matches!(s.as_str(), "false" | "0" | "no"),
            Some(_) => true,
        }
    }
}
