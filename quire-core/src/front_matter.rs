//! Splitting a document into its YAML metadata block and Markdown body.
//!
//! ```text
//! ---
//! title: Hello
//! date: 2024-01-01
//! ---
//! Body text starts here.
//! ```
//!
//! The block opens on the very first line and closes at the next line made of
//! dashes only (or `...`). A document without an opening fence is all body.

use serde_yaml::{Mapping, Value};

#[derive(Debug, thiserror::Error)]
pub enum FrontMatterError {
    #[error("front matter is opened with `---` but never closed")]
    Unterminated,
    #[error("malformed YAML in front matter")]
    Yaml(#[from] serde_yaml::Error),
    #[error("front matter must be a mapping of keys to values")]
    NotAMapping,
}

/// A parsed document borrowing its body from the source text.
#[derive(Debug)]
pub struct Document<'a> {
    pub metadata: Metadata,
    pub body: &'a str,
}

/// Front matter key/value pairs with lenient typed accessors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata(Mapping);

impl Metadata {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Scalar value rendered as text. Null, empty strings and collections
    /// count as absent.
    pub fn get_text(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Like [`get_text`](Self::get_text), but falsy values count as absent.
    pub fn get_truthy_text(&self, key: &str) -> Option<String> {
        if self.is_truthy(key) {
            self.get_text(key)
        } else {
            None
        }
    }

    /// Truthiness of a value. Plain words such as `no` or `Off` that older
    /// YAML read as booleans are treated as booleans here too.
    pub fn is_truthy(&self, key: &str) -> bool {
        match self.get(key) {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
            Some(Value::String(s)) => yaml11_bool(s).unwrap_or(!s.is_empty()),
            Some(Value::Sequence(items)) => !items.is_empty(),
            Some(Value::Mapping(map)) => !map.is_empty(),
            Some(Value::Tagged(_)) => true,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn yaml11_bool(word: &str) -> Option<bool> {
    match word.to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" | "on" => Some(true),
        "n" | "no" | "false" | "off" => Some(false),
        _ => None,
    }
}

pub fn parse(source: &str) -> Result<Document<'_>, FrontMatterError> {
    let text = source.strip_prefix('\u{feff}').unwrap_or(source);

    let Some((yaml, body)) = split(text)? else {
        return Ok(Document {
            metadata: Metadata::default(),
            body: text,
        });
    };

    Ok(Document {
        metadata: parse_metadata(yaml)?,
        body,
    })
}

fn split(text: &str) -> Result<Option<(&str, &str)>, FrontMatterError> {
    let mut lines = text.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return Ok(None);
    };
    if !is_fence(first) {
        return Ok(None);
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        if is_fence(line) || line.trim_end() == "..." {
            let yaml = &text[yaml_start..offset];
            let body = &text[offset + line.len()..];
            return Ok(Some((yaml, body)));
        }
        offset += line.len();
    }

    Err(FrontMatterError::Unterminated)
}

fn is_fence(line: &str) -> bool {
    let line = line.trim_end();
    line.len() >= 3 && line.bytes().all(|b| b == b'-')
}

fn parse_metadata(yaml: &str) -> Result<Metadata, FrontMatterError> {
    if yaml.trim().is_empty() {
        return Ok(Metadata::default());
    }

    match serde_yaml::from_str::<Value>(yaml)? {
        Value::Null => Ok(Metadata::default()),
        Value::Mapping(map) => Ok(Metadata(map)),
        _ => Err(FrontMatterError::NotAMapping),
    }
}
