use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use treediff::{value::Key, Delegate};

/// A printable summary of a JSON value taking part in a change.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum ValueRepr {
    String(String),
    Number(serde_json::Number),
    Boolean(bool),
    Null,
    /// e.g. `[Array len=5]`
    Array(String),
    /// e.g. `{Object keys=3}`
    Object(String),
}

impl ValueRepr {
    fn from_json_value(val: &JsonValue) -> Self {
        match val {
            JsonValue::Null => ValueRepr::Null,
            JsonValue::Bool(b) => ValueRepr::Boolean(*b),
            JsonValue::Number(n) => ValueRepr::Number(n.clone()),
            JsonValue::String(s) => ValueRepr::String(s.clone()),
            JsonValue::Array(arr) => ValueRepr::Array(format!("[Array len={}]", arr.len())),
            JsonValue::Object(map) => ValueRepr::Object(format!("{{Object keys={}}}", map.len())),
        }
    }

    /// Formats the value for a one-line summary. Long strings are shortened.
    pub fn format_for_display(&self) -> String {
        const MAX_CHARS: usize = 80;
        match self {
            ValueRepr::String(s) => {
                let escaped = s
                    .replace('\\', "\\\\")
                    .replace('\n', "\\n")
                    .replace('\r', "\\r")
                    .replace('\t', "\\t")
                    .replace('\'', "\\'");
                if escaped.chars().count() > MAX_CHARS {
                    let head: String = escaped.chars().take(MAX_CHARS).collect();
                    format!("'{}…'", head)
                } else {
                    format!("'{}'", escaped)
                }
            }
            ValueRepr::Number(n) => n.to_string(),
            ValueRepr::Boolean(b) => b.to_string(),
            ValueRepr::Null => "null".to_string(),
            ValueRepr::Array(s) | ValueRepr::Object(s) => s.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChangeType {
    Added,
    Removed,
    Modified,
}

/// One field-level difference between two serialized conversion results.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Change {
    /// Dot-separated field path with bracket indices, e.g. `placeholders[2]`
    /// or `dimensions.viewBoxWidth`.
    pub path: String,
    pub change_type: ChangeType,
    /// None for `Added`.
    pub old_value: Option<ValueRepr>,
    /// None for `Removed`.
    pub new_value: Option<ValueRepr>,
}

/// treediff delegate that records every change with its path.
#[derive(Debug)]
pub(crate) struct ChangeCollector {
    pub(crate) changes: Vec<Change>,
    current_path: Vec<String>,
}

impl ChangeCollector {
    pub(crate) fn new() -> Self {
        ChangeCollector {
            changes: Vec::new(),
            current_path: Vec::new(),
        }
    }

    fn segment(&self, key: &Key) -> String {
        match key {
            Key::String(s) if self.current_path.is_empty() => s.clone(),
            Key::String(s) => format!(".{}", s),
            Key::Index(i) => format!("[{}]", i),
        }
    }

    /// The current path, extended by `key` for added/removed entries, which
    /// treediff reports without pushing their key.
    fn format_path(&self, key: Option<&Key>) -> String {
        let mut path = self.current_path.concat();
        if let Some(key) = key {
            path.push_str(&self.segment(key));
        }
        path
    }

    fn record(
        &mut self,
        key: Option<&Key>,
        change_type: ChangeType,
        old: Option<&JsonValue>,
        new: Option<&JsonValue>,
    ) {
        self.changes.push(Change {
            path: self.format_path(key),
            change_type,
            old_value: old.map(ValueRepr::from_json_value),
            new_value: new.map(ValueRepr::from_json_value),
        });
    }
}

impl<'a> Delegate<'a, Key, JsonValue> for ChangeCollector {
    fn push(&mut self, segment: &Key) {
        let segment = self.segment(segment);
        self.current_path.push(segment);
    }

    fn pop(&mut self) {
        self.current_path.pop();
    }

    fn removed<'b>(&mut self, key: &'b Key, value: &'a JsonValue) {
        self.record(Some(key), ChangeType::Removed, Some(value), None);
    }

    fn added<'b>(&mut self, key: &'b Key, value: &'a JsonValue) {
        self.record(Some(key), ChangeType::Added, None, Some(value));
    }

    fn modified(&mut self, old: &'a JsonValue, new: &'a JsonValue) {
        self.record(None, ChangeType::Modified, Some(old), Some(new));
    }
}
