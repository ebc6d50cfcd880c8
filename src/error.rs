// ABOUTME: Error types for shape-driven JSON decoding.
// ABOUTME: A closed taxonomy of structural mismatches, plus context frames for locating failures.

use std::fmt;

use serde_json::Value;

/// The result type for shapejson decode operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The outer kind of a JSON value, used in mismatch reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// JSON null
    Null,
    /// JSON boolean
    Bool,
    /// JSON number
    Number,
    /// JSON string
    String,
    /// JSON array
    Array,
    /// JSON object
    Object,
}

impl ValueKind {
    /// The kind of the given JSON value.
    #[must_use]
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "boolean",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        };
        f.write_str(name)
    }
}

/// One step of context attached to a decode failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Path {
    /// Inside a record field (modified name).
    Field(String),
    /// Inside a positional slot.
    Index(usize),
    /// Inside a sum alternative's payload (modified tag).
    Variant(String),
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Path::Field(name) => write!(f, "field `{name}`"),
            Path::Index(i) => write!(f, "index {i}"),
            Path::Variant(name) => write!(f, "variant `{name}`"),
        }
    }
}

/// Errors that can occur while decoding a JSON value against a shape.
///
/// Encoding has no error path: a value already conforming to its shape
/// always encodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The JSON value's outer kind does not match what the shape requires.
    TypeMismatch {
        /// What the current shape node expects, e.g. `"array"` or `"empty array"`.
        expected: &'static str,
        /// The kind actually found.
        found: ValueKind,
    },

    /// A positional array, single-field object, or two-element array had
    /// the wrong number of entries.
    ArityMismatch {
        /// The entry count the shape requires.
        expected: usize,
        /// The entry count found in the input.
        actual: usize,
    },

    /// A required record field, or a tag/value key, was absent.
    MissingField {
        /// The (modified) key that was looked up.
        name: String,
    },

    /// A tag did not match any alternative's (modified) name.
    UnknownTag {
        /// The unmatched tag.
        name: String,
    },

    /// An object key matched no record field and unknown fields are rejected.
    UnknownField {
        /// The unmatched key.
        name: String,
    },

    /// The external JSON text parser rejected the input (only reachable
    /// through [`from_str`](crate::from_str)).
    Syntax {
        /// The parser's own error message.
        message: String,
    },

    /// The primitive leaf codec failed; its message is carried unchanged.
    Leaf {
        /// The Rust type the leaf was being decoded into.
        type_name: &'static str,
        /// The leaf codec's own error message.
        message: String,
    },

    /// A failure deeper in the value, tagged with where it happened.
    At {
        /// The field, index, or variant being decoded.
        path: Path,
        /// The underlying failure.
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap this error with record-field context.
    #[must_use]
    pub fn in_field(self, name: &str) -> Self {
        Error::At {
            path: Path::Field(name.to_owned()),
            source: Box::new(self),
        }
    }

    /// Wrap this error with positional-slot context.
    #[must_use]
    pub fn at_index(self, index: usize) -> Self {
        Error::At {
            path: Path::Index(index),
            source: Box::new(self),
        }
    }

    /// Wrap this error with sum-alternative context.
    #[must_use]
    pub fn in_variant(self, name: &str) -> Self {
        Error::At {
            path: Path::Variant(name.to_owned()),
            source: Box::new(self),
        }
    }

    /// The innermost error, with all context frames stripped.
    #[must_use]
    pub fn root_cause(&self) -> &Error {
        let mut err = self;
        while let Error::At { source, .. } = err {
            err = source;
        }
        err
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::TypeMismatch { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            Error::ArityMismatch { expected, actual } => {
                write!(f, "expected {expected} entries, found {actual}")
            }
            Error::MissingField { name } => write!(f, "missing field `{name}`"),
            Error::UnknownTag { name } => write!(f, "unknown tag `{name}`"),
            Error::UnknownField { name } => write!(f, "unknown field `{name}`"),
            Error::Syntax { message } => write!(f, "invalid JSON: {message}"),
            Error::Leaf { type_name, message } => {
                write!(f, "invalid value for {type_name}: {message}")
            }
            Error::At { path, source } => write!(f, "at {path}: {source}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::At { source, .. } => Some(&**source),
            _ => None,
        }
    }
}
