//! Repeatable line-item rows
//!
//! A row is a group of inputs that can be duplicated from a template. When
//! a row is cloned its inputs are reset: numeric inputs start at one item,
//! everything else starts empty.

use std::fmt;

/// Identifier of a row inside an in-memory container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(pub u32);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row-{}", self.0)
    }
}

/// Semantic type of a row input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    Number,
    Text,
    /// Any other input type, kept verbatim
    Other(String),
}

impl InputKind {
    /// Maps an input `type` attribute to its kind
    ///
    /// A missing or empty type is a text input.
    pub fn from_type_attr(value: &str) -> Self {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "number" => InputKind::Number,
            "" | "text" => InputKind::Text,
            _ => InputKind::Other(normalized),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, InputKind::Number)
    }

    /// Value a freshly cloned input of this kind starts with
    pub fn reset_value(&self) -> &'static str {
        if self.is_numeric() { "1" } else { "" }
    }
}

/// A single input inside a row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineInput {
    pub name: String,
    pub kind: InputKind,
    pub value: String,
}

impl LineInput {
    pub fn new(name: impl Into<String>, kind: InputKind, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            value: value.into(),
        }
    }

    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, InputKind::Text, value)
    }

    pub fn number(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, InputKind::Number, value)
    }
}

/// A repeatable row of inputs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineRow {
    pub inputs: Vec<LineInput>,
}

impl LineRow {
    pub fn new(inputs: Vec<LineInput>) -> Self {
        Self { inputs }
    }

    /// Resets every input to the value a new row starts with
    pub fn reset(&mut self) {
        for input in &mut self.inputs {
            input.value = input.kind.reset_value().to_string();
        }
    }

    pub fn value_of(&self, name: &str) -> Option<&str> {
        self.inputs
            .iter()
            .find(|input| input.name == name)
            .map(|input| input.value.as_str())
    }
}
