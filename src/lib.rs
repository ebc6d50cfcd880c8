// ABOUTME: Shape-driven JSON codec derivation for Rust.
// ABOUTME: Derives encoders/decoders from structural type descriptors; no per-type wire code.

//! # shapejson
//!
//! Derive JSON encoders and decoders from the *shape* of a data type —
//! its fields, their names, and how constructors are organized into
//! alternatives — with no hand-written per-type wire code.
//!
//! A type describes itself once through the [`Shaped`] trait: a static
//! [`Shape`] descriptor plus two mechanical value conversions. Everything
//! else — record vs. positional layout, sum-type tagging, field naming,
//! optional-field omission — is decided by the engine from the shape and
//! the [`Options`] in force for the call.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::OnceLock;
//! use shapejson::{Decoded, Options, Rep, Shape, Shaped};
//!
//! #[derive(Debug, PartialEq)]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! impl Shaped for User {
//!     fn shape() -> &'static Shape {
//!         static SHAPE: OnceLock<Shape> = OnceLock::new();
//!         SHAPE.get_or_init(|| {
//!             Shape::record(vec![
//!                 Shape::field("id", Shape::leaf::<u64>()),
//!                 Shape::field("name", Shape::leaf::<String>()),
//!             ])
//!         })
//!     }
//!
//!     fn to_rep(&self, _options: &Options) -> Rep {
//!         Rep::product(vec![Rep::leaf(&self.id), Rep::leaf(&self.name)])
//!     }
//!
//!     fn from_decoded(decoded: Decoded) -> Self {
//!         let (id, name) = decoded.into_pair();
//!         User {
//!             id: id.take_leaf(),
//!             name: name.take_leaf(),
//!         }
//!     }
//! }
//!
//! let user = User { id: 1, name: "a".to_owned() };
//!
//! let value = shapejson::to_value(&user);
//! assert_eq!(value.to_string(), r#"{"id":1,"name":"a"}"#);
//!
//! let back: User = shapejson::from_value(&value).unwrap();
//! assert_eq!(back, user);
//! ```
//!
//! ## Sum types
//!
//! Sums pick their wire shape from [`SumEncoding`]: a tagged object
//! (optionally merging the tag into record-shaped payloads), a one-entry
//! object keyed by the tag, or a `[tag, payload]` array. A sum whose
//! alternatives all carry no payload can encode as a bare string instead.
//!
//! ## Division of labor
//!
//! JSON text and scalar conversion are consumed, not defined, here:
//! `serde_json::Value` is the value model and serde is the primitive
//! codec for leaves. This crate owns only the structural walk.

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod options;
pub mod rep;
pub mod shape;
pub mod shaped;

// Re-export commonly used items at the crate root
pub use error::{Error, Path, Result, ValueKind};
pub use options::{case, NameModifier, Options, SumEncoding};
pub use rep::{Decoded, LeafValue, Rep};
pub use shape::{LeafShape, Shape, ShapeKind};
pub use shaped::Shaped;

use serde_json::Value;

/// Encode a value to a JSON value with default options.
///
/// # Example
///
/// ```rust
/// # use std::sync::OnceLock;
/// # use shapejson::{Decoded, Options, Rep, Shape, Shaped};
/// # struct Pair(i64, String);
/// # impl Shaped for Pair {
/// #     fn shape() -> &'static Shape {
/// #         static SHAPE: OnceLock<Shape> = OnceLock::new();
/// #         SHAPE.get_or_init(|| {
/// #             Shape::tuple(vec![Shape::leaf::<i64>(), Shape::leaf::<String>()])
/// #         })
/// #     }
/// #     fn to_rep(&self, _options: &Options) -> Rep {
/// #         Rep::product(vec![Rep::leaf(&self.0), Rep::leaf(&self.1)])
/// #     }
/// #     fn from_decoded(decoded: Decoded) -> Self {
/// #         let (a, b) = decoded.into_pair();
/// #         Pair(a.take_leaf(), b.take_leaf())
/// #     }
/// # }
/// let value = shapejson::to_value(&Pair(1, "a".to_owned()));
/// assert_eq!(value, serde_json::json!([1, "a"]));
/// ```
pub fn to_value<T: Shaped>(value: &T) -> Value {
    to_value_with_options(value, &Options::default())
}

/// Encode a value to a JSON value with the given options.
pub fn to_value_with_options<T: Shaped>(value: &T, options: &Options) -> Value {
    encoder::encode(T::shape(), value.to_rep(options), options)
}

/// Decode a value from a JSON value with default options.
pub fn from_value<T: Shaped>(value: &Value) -> Result<T> {
    from_value_with_options(value, &Options::default())
}

/// Decode a value from a JSON value with the given options.
///
/// The options must match the ones the value was encoded with; name
/// modifiers in particular apply to lookups on this path too.
pub fn from_value_with_options<T: Shaped>(value: &Value, options: &Options) -> Result<T> {
    decoder::decode(T::shape(), value, options).map(T::from_decoded)
}

/// Encode a value to compact JSON text with default options.
pub fn to_string<T: Shaped>(value: &T) -> String {
    to_value(value).to_string()
}

/// Encode a value to pretty-printed JSON text with default options.
pub fn to_string_pretty<T: Shaped>(value: &T) -> String {
    serde_json::to_string_pretty(&to_value(value)).expect("printing a JSON value cannot fail")
}

/// Decode a value from JSON text with default options.
///
/// Text parsing is delegated to `serde_json`; parse failures surface as
/// [`Error::Syntax`].
pub fn from_str<T: Shaped>(text: &str) -> Result<T> {
    let value: Value = text.parse().map_err(|err: serde_json::Error| Error::Syntax {
        message: err.to_string(),
    })?;
    from_value(&value)
}
