// ABOUTME: The Shaped trait: how a type supplies its structural descriptor and value bridge.
// ABOUTME: Impls are mechanical and normally generated; the engine never cares how they were produced.

use crate::options::Options;
use crate::rep::{Decoded, Rep};
use crate::shape::Shape;

/// A type with a structural descriptor and the two mechanical conversions
/// the engine needs: value → [`Rep`] for encoding, [`Decoded`] → value
/// after decoding.
///
/// Implementations contain no wire logic — every encoding decision lives
/// in the engine and is driven by the shape and the
/// [`Options`](crate::Options). They are usually produced by code
/// generation; writing one by hand looks like this:
///
/// ```rust
/// use std::sync::OnceLock;
/// use shapejson::{Decoded, Options, Rep, Shape, Shaped};
///
/// struct Point {
///     x: i64,
///     y: i64,
/// }
///
/// impl Shaped for Point {
///     fn shape() -> &'static Shape {
///         static SHAPE: OnceLock<Shape> = OnceLock::new();
///         SHAPE.get_or_init(|| {
///             Shape::record(vec![
///                 Shape::field("x", Shape::leaf::<i64>()),
///                 Shape::field("y", Shape::leaf::<i64>()),
///             ])
///         })
///     }
///
///     fn to_rep(&self, _options: &Options) -> Rep {
///         Rep::product(vec![Rep::leaf(&self.x), Rep::leaf(&self.y)])
///     }
///
///     fn from_decoded(decoded: Decoded) -> Self {
///         let (x, y) = decoded.into_pair();
///         Point {
///             x: x.take_leaf(),
///             y: y.take_leaf(),
///         }
///     }
/// }
///
/// let value = shapejson::to_value(&Point { x: 1, y: 2 });
/// assert_eq!(value.to_string(), r#"{"x":1,"y":2}"#);
/// ```
pub trait Shaped: Sized + 'static {
    /// The type's shape, built once and shared across every call.
    fn shape() -> &'static Shape;

    /// The encode-side structural view of `self`, leaves already through
    /// the primitive codec. `options` is only needed by
    /// [`Rep::nested`] leaves.
    fn to_rep(&self, options: &Options) -> Rep;

    /// Reassemble a value from a decode result. The engine has already
    /// typed every leaf, so this is pure assembly and cannot fail.
    fn from_decoded(decoded: Decoded) -> Self;
}
