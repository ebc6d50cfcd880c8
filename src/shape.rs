// ABOUTME: Structural type descriptors: the shape tree a codec is derived from.
// ABOUTME: Shape facts (arity, record-ness, all-nullary) are computed once at construction and cached.

use std::any::type_name;
use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::options::Options;
use crate::rep::LeafValue;
use crate::shaped::Shaped;

/// A leaf in a shape tree: one value produced and consumed by an external
/// primitive codec.
///
/// The decode half lives here as a monomorphized hook so the decoder can
/// run it mid-walk and wrap its failures with positional/field context.
/// The encode half runs when the [`Rep`](crate::rep::Rep) is built.
pub struct LeafShape {
    type_name: &'static str,
    decode: fn(&Value, &Options) -> Result<LeafValue>,
}

impl LeafShape {
    /// A leaf decoded by serde, the primitive codec for scalars and containers.
    #[must_use]
    pub fn of<T: DeserializeOwned + 'static>() -> Self {
        Self {
            type_name: type_name::<T>(),
            decode: decode_primitive::<T>,
        }
    }

    /// A leaf whose type has its own derived codec; decoding recurses
    /// through the full engine with the caller's options.
    #[must_use]
    pub fn nested<T: Shaped>() -> Self {
        Self {
            type_name: type_name::<T>(),
            decode: decode_nested::<T>,
        }
    }

    /// The Rust type this leaf decodes into, for diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn decode(&self, value: &Value, options: &Options) -> Result<LeafValue> {
        (self.decode)(value, options)
    }
}

fn decode_primitive<T: DeserializeOwned + 'static>(
    value: &Value,
    _options: &Options,
) -> Result<LeafValue> {
    match serde_json::from_value::<T>(value.clone()) {
        Ok(v) => Ok(LeafValue::new(v)),
        Err(err) => Err(Error::Leaf {
            type_name: type_name::<T>(),
            message: err.to_string(),
        }),
    }
}

fn decode_nested<T: Shaped>(value: &Value, options: &Options) -> Result<LeafValue> {
    crate::from_value_with_options::<T>(value, options).map(LeafValue::new)
}

impl fmt::Debug for LeafShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeafShape")
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// The node kinds of a shape tree.
#[derive(Debug)]
pub enum ShapeKind {
    /// A constructor with no fields. Encodes as `[]`, never `{}`.
    Unit,
    /// A single field handled by the primitive codec.
    Leaf(LeafShape),
    /// An absent-or-present field; interacts with the omission policy
    /// when it sits directly under a [`ShapeKind::Field`].
    Optional(LeafShape),
    /// Two sibling sub-shapes combined positionally.
    ///
    /// Invariant: the left subtree covers the first `arity >> 1` positional
    /// slots, which the balanced builders guarantee.
    Product(Box<Shape>, Box<Shape>),
    /// Two sibling alternatives of a tagged union.
    Sum(Box<Shape>, Box<Shape>),
    /// A product child annotated with its source field name.
    Field(&'static str, Box<Shape>),
    /// A sum child annotated with its constructor name.
    Alternative(&'static str, Box<Shape>),
}

/// A static structural descriptor of one data type.
///
/// Built once per type (see [`Shaped::shape`](crate::Shaped::shape)), never
/// mutated, and shared by reference across every encode/decode call — shapes
/// are `Send + Sync` and safe to use from concurrent calls.
#[derive(Debug)]
pub struct Shape {
    kind: ShapeKind,
    arity: usize,
    is_record: bool,
    all_nullary: bool,
}

impl Shape {
    /// A fieldless constructor.
    #[must_use]
    pub fn unit() -> Shape {
        Shape {
            kind: ShapeKind::Unit,
            arity: 0,
            is_record: false,
            all_nullary: false,
        }
    }

    /// A primitive leaf of type `T`.
    #[must_use]
    pub fn leaf<T: DeserializeOwned + 'static>() -> Shape {
        Shape::from_leaf(ShapeKind::Leaf(LeafShape::of::<T>()))
    }

    /// An optional leaf holding a `T` when present.
    #[must_use]
    pub fn optional<T: DeserializeOwned + 'static>() -> Shape {
        Shape::from_leaf(ShapeKind::Optional(LeafShape::of::<T>()))
    }

    /// A leaf whose type has its own derived codec.
    #[must_use]
    pub fn nested<T: Shaped>() -> Shape {
        Shape::from_leaf(ShapeKind::Leaf(LeafShape::nested::<T>()))
    }

    /// An optional leaf whose inner type has its own derived codec.
    #[must_use]
    pub fn optional_nested<T: Shaped>() -> Shape {
        Shape::from_leaf(ShapeKind::Optional(LeafShape::nested::<T>()))
    }

    fn from_leaf(kind: ShapeKind) -> Shape {
        Shape {
            kind,
            arity: 1,
            is_record: false,
            all_nullary: false,
        }
    }

    /// A named product child.
    #[must_use]
    pub fn field(name: &'static str, inner: Shape) -> Shape {
        Shape {
            arity: inner.arity,
            is_record: true,
            all_nullary: false,
            kind: ShapeKind::Field(name, Box::new(inner)),
        }
    }

    /// A named sum alternative.
    #[must_use]
    pub fn alternative(name: &'static str, inner: Shape) -> Shape {
        Shape {
            arity: inner.arity,
            is_record: inner.is_record,
            all_nullary: matches!(inner.kind, ShapeKind::Unit),
            kind: ShapeKind::Alternative(name, Box::new(inner)),
        }
    }

    /// A positional constructor of the given sub-shapes, one entry per
    /// field (describe composite fields with [`Shape::nested`] so each
    /// entry occupies a single slot).
    ///
    /// An empty list degenerates to [`Shape::unit`]; a single sub-shape is
    /// returned unwrapped, so one-field constructors encode the bare field
    /// value rather than a one-element array.
    #[must_use]
    pub fn tuple(items: Vec<Shape>) -> Shape {
        build_product(items)
    }

    /// A record constructor of the given [`Shape::field`] children.
    ///
    /// An empty list degenerates to [`Shape::unit`], so a fieldless record
    /// still encodes as `[]`.
    #[must_use]
    pub fn record(fields: Vec<Shape>) -> Shape {
        build_product(fields)
    }

    /// A tagged union of the given [`Shape::alternative`] children, tried
    /// in order when decoding.
    ///
    /// # Panics
    ///
    /// Panics if `alternatives` is empty.
    #[must_use]
    pub fn sum(alternatives: Vec<Shape>) -> Shape {
        assert!(
            !alternatives.is_empty(),
            "a sum shape requires at least one alternative"
        );
        build_sum(alternatives)
    }

    /// The node kind.
    #[must_use]
    pub fn kind(&self) -> &ShapeKind {
        &self.kind
    }

    /// Total number of positional slots beneath this node.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// True iff every leaf under this node carries a field name.
    ///
    /// A bare leaf is not a record, and neither is [`Shape::unit`] — a
    /// fieldless constructor encodes as an empty array by convention.
    #[must_use]
    pub fn is_record(&self) -> bool {
        self.is_record
    }

    /// True iff every alternative under this sum carries no payload.
    #[must_use]
    pub fn all_nullary(&self) -> bool {
        self.all_nullary
    }
}

fn product_node(left: Shape, right: Shape) -> Shape {
    Shape {
        arity: left.arity + right.arity,
        is_record: left.is_record && right.is_record,
        all_nullary: false,
        kind: ShapeKind::Product(Box::new(left), Box::new(right)),
    }
}

fn sum_node(left: Shape, right: Shape) -> Shape {
    Shape {
        arity: 1,
        is_record: false,
        all_nullary: left.all_nullary && right.all_nullary,
        kind: ShapeKind::Sum(Box::new(left), Box::new(right)),
    }
}

/// Build a product tree whose left subtree covers exactly the first
/// `arity >> 1` slots at every level, matching the positional split the
/// codec performs.
fn build_product(mut items: Vec<Shape>) -> Shape {
    match items.len() {
        0 => Shape::unit(),
        1 => items.pop().expect("len checked"),
        len => {
            let total: usize = items.iter().map(Shape::arity).sum();
            let target = total >> 1;
            let mut split = len - 1;
            let mut acc = 0;
            for i in 1..len {
                acc += items[i - 1].arity();
                if acc >= target {
                    split = i;
                    break;
                }
            }
            let right = items.split_off(split);
            product_node(build_product(items), build_product(right))
        }
    }
}

fn build_sum(mut alternatives: Vec<Shape>) -> Shape {
    match alternatives.len() {
        0 => unreachable!("checked by Shape::sum"),
        1 => alternatives.pop().expect("len checked"),
        len => {
            let right = alternatives.split_off(len >> 1);
            sum_node(build_sum(alternatives), build_sum(right))
        }
    }
}
