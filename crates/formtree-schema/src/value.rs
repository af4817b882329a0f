//! Dynamic form values and change paths.
//!
//! A field value is an opaque [`serde_json::Value`]; a record is a JSON
//! object mapping field names to values. Paths identify where in a form tree
//! a change or validation error occurred: an ordered sequence of index and
//! key segments rooted at the tree's top-level form.

use core::fmt;

use serde_json::Value;

/// A single record: field name to field value.
pub type Record = serde_json::Map<String, Value>;

/// One segment of a form-tree path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum PathSeg {
    /// A list element index.
    Index(usize),
    /// A record field name.
    Key(String),
}

impl fmt::Display for PathSeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Key(k) => f.write_str(k),
        }
    }
}

impl From<usize> for PathSeg {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for PathSeg {
    fn from(key: &str) -> Self {
        Self::Key(key.to_owned())
    }
}

impl From<String> for PathSeg {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

/// A path from the form-tree root to a position inside it.
pub type Path = Vec<PathSeg>;

/// Render a path as a dotted string, e.g. `"members.1.name"`.
#[must_use]
pub fn display_path(path: &[PathSeg]) -> String {
    let mut out = String::new();
    for (i, seg) in path.iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        out.push_str(&seg.to_string());
    }
    out
}

/// Whether a value counts as "absent" for optionality purposes.
///
/// Null and the empty string are nully; everything else (including empty
/// arrays and objects) is a present value.
#[must_use]
pub fn is_nully(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
