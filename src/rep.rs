// ABOUTME: Structural value views walked in lockstep with a Shape.
// ABOUTME: Rep carries an encode-side value (leaves already JSON); Decoded carries a decode result (leaves already typed).

use std::any::{type_name, Any};
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::options::Options;
use crate::shaped::Shaped;

/// A decoded leaf, type-erased.
///
/// The shape's leaf hook produced the concrete value during the decode
/// walk; [`LeafValue::take`] recovers it in the bridge.
pub struct LeafValue {
    value: Box<dyn Any>,
    type_name: &'static str,
}

impl LeafValue {
    pub(crate) fn new<T: 'static>(value: T) -> Self {
        Self {
            value: Box::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// Recover the concrete leaf value.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not the type the shape's leaf was declared with —
    /// a bridge bug, not a data error.
    #[must_use]
    pub fn take<T: 'static>(self) -> T {
        match self.value.downcast::<T>() {
            Ok(v) => *v,
            Err(_) => panic!(
                "leaf type mismatch: shape declared {}, bridge asked for {}",
                self.type_name,
                type_name::<T>()
            ),
        }
    }
}

impl fmt::Debug for LeafValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LeafValue").field(&self.type_name).finish()
    }
}

/// The encode-side structural view of one value.
///
/// Leaves have already been through the primitive codec, so the encoder
/// only assembles structure. Built fresh per call by
/// [`Shaped::to_rep`](crate::Shaped::to_rep) and consumed by the encoder.
#[derive(Debug)]
pub enum Rep {
    /// A fieldless constructor.
    Unit,
    /// A leaf, already encoded.
    Leaf(Value),
    /// An optional leaf; `None` means absent.
    Optional(Option<Value>),
    /// Two positional siblings.
    Pair(Box<Rep>, Box<Rep>),
    /// Injection into the left branch of a sum.
    Left(Box<Rep>),
    /// Injection into the right branch of a sum.
    Right(Box<Rep>),
}

impl Rep {
    /// A leaf encoded by serde, the primitive codec for scalars and containers.
    ///
    /// # Panics
    ///
    /// Panics if `value` fails to serialize to JSON, which plain data
    /// values never do.
    #[must_use]
    pub fn leaf<T: Serialize>(value: &T) -> Rep {
        Rep::Leaf(to_json(value))
    }

    /// An optional leaf; `None` becomes the absent marker.
    #[must_use]
    pub fn optional<T: Serialize>(value: Option<&T>) -> Rep {
        Rep::Optional(value.map(to_json))
    }

    /// A leaf whose type has its own derived codec, encoded with the
    /// caller's options.
    #[must_use]
    pub fn nested<T: Shaped>(value: &T, options: &Options) -> Rep {
        Rep::Leaf(crate::to_value_with_options(value, options))
    }

    /// An optional leaf whose inner type has its own derived codec.
    #[must_use]
    pub fn optional_nested<T: Shaped>(value: Option<&T>, options: &Options) -> Rep {
        Rep::Optional(value.map(|v| crate::to_value_with_options(v, options)))
    }

    /// Two positional siblings.
    #[must_use]
    pub fn pair(left: Rep, right: Rep) -> Rep {
        Rep::Pair(Box::new(left), Box::new(right))
    }

    /// A positional/record constructor body, balanced exactly like
    /// [`Shape::tuple`](crate::Shape::tuple) and
    /// [`Shape::record`](crate::Shape::record) so the two trees walk in
    /// lockstep. An empty list is [`Rep::Unit`]; a single item is itself.
    #[must_use]
    pub fn product(items: Vec<Rep>) -> Rep {
        build_product(items)
    }

    /// The injection spine for alternative `index` of a sum with `count`
    /// alternatives, mirroring [`Shape::sum`](crate::Shape::sum)'s balanced
    /// tree.
    ///
    /// # Panics
    ///
    /// Panics if `index >= count`.
    #[must_use]
    pub fn variant(index: usize, count: usize, payload: Rep) -> Rep {
        assert!(index < count, "variant index {index} out of {count}");
        if count == 1 {
            return payload;
        }
        let mid = count >> 1;
        if index < mid {
            Rep::Left(Box::new(Rep::variant(index, mid, payload)))
        } else {
            Rep::Right(Box::new(Rep::variant(index - mid, count - mid, payload)))
        }
    }

    /// Number of positional slots this node occupies in an enclosing
    /// product; mirrors `Shape::arity` for the matching shape.
    pub(crate) fn slots(&self) -> usize {
        match self {
            Rep::Unit => 0,
            Rep::Leaf(_) | Rep::Optional(_) | Rep::Left(_) | Rep::Right(_) => 1,
            Rep::Pair(l, r) => l.slots() + r.slots(),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value)
        .unwrap_or_else(|err| panic!("leaf value failed to serialize: {err}"))
}

/// Balanced exactly like `shape::build_product`: the left subtree covers
/// the first `slots >> 1` positional slots at every level.
fn build_product(mut items: Vec<Rep>) -> Rep {
    match items.len() {
        0 => Rep::Unit,
        1 => items.pop().expect("len checked"),
        len => {
            let total: usize = items.iter().map(Rep::slots).sum();
            let target = total >> 1;
            let mut split = len - 1;
            let mut acc = 0;
            for i in 1..len {
                acc += items[i - 1].slots();
                if acc >= target {
                    split = i;
                    break;
                }
            }
            let right = items.split_off(split);
            Rep::pair(build_product(items), build_product(right))
        }
    }
}

/// The decode-side structural result of one value.
///
/// The decoder produced every leaf through the shape's leaf hook, so
/// [`Shaped::from_decoded`](crate::Shaped::from_decoded) is pure assembly
/// and cannot fail.
#[derive(Debug)]
pub enum Decoded {
    /// A fieldless constructor.
    Unit,
    /// A decoded leaf.
    Leaf(LeafValue),
    /// An optional leaf; `None` means the field was absent (or `null`).
    Optional(Option<LeafValue>),
    /// Two positional siblings.
    Pair(Box<Decoded>, Box<Decoded>),
    /// Injection into the left branch of a sum.
    Left(Box<Decoded>),
    /// Injection into the right branch of a sum.
    Right(Box<Decoded>),
}

impl Decoded {
    /// Take a leaf's concrete value.
    ///
    /// # Panics
    ///
    /// Panics if this node is not a leaf of type `T`.
    #[must_use]
    pub fn take_leaf<T: 'static>(self) -> T {
        match self {
            Decoded::Leaf(leaf) => leaf.take(),
            other => panic!("expected a leaf, got {other:?}"),
        }
    }

    /// Take an optional leaf's concrete value.
    ///
    /// # Panics
    ///
    /// Panics if this node is not an optional leaf of type `T`.
    #[must_use]
    pub fn take_optional<T: 'static>(self) -> Option<T> {
        match self {
            Decoded::Optional(leaf) => leaf.map(LeafValue::take),
            other => panic!("expected an optional leaf, got {other:?}"),
        }
    }

    /// Split a pair into its two sides.
    ///
    /// # Panics
    ///
    /// Panics if this node is not a pair.
    #[must_use]
    pub fn into_pair(self) -> (Decoded, Decoded) {
        match self {
            Decoded::Pair(l, r) => (*l, *r),
            other => panic!("expected a pair, got {other:?}"),
        }
    }

    /// Flatten the pair spine into the constructor's parts in declaration
    /// order, one entry per builder item.
    #[must_use]
    pub fn into_parts(self) -> Vec<Decoded> {
        let mut parts = Vec::new();
        self.flatten_into(&mut parts);
        parts
    }

    fn flatten_into(self, parts: &mut Vec<Decoded>) {
        match self {
            Decoded::Pair(l, r) => {
                l.flatten_into(parts);
                r.flatten_into(parts);
            }
            other => parts.push(other),
        }
    }

    /// Resolve the injection spine of a sum with `count` alternatives back
    /// to the alternative index and its payload, mirroring
    /// [`Rep::variant`].
    ///
    /// # Panics
    ///
    /// Panics if the spine does not match a `count`-alternative sum.
    #[must_use]
    pub fn variant_index(self, count: usize) -> (usize, Decoded) {
        if count <= 1 {
            return (0, self);
        }
        let mid = count >> 1;
        match self {
            Decoded::Left(inner) => inner.variant_index(mid),
            Decoded::Right(inner) => {
                let (i, payload) = inner.variant_index(count - mid);
                (mid + i, payload)
            }
            other => panic!("expected a sum injection, got {other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_value_take() {
        let leaf = LeafValue::new(42i64);
        assert_eq!(leaf.take::<i64>(), 42);
    }

    #[test]
    #[should_panic(expected = "leaf type mismatch")]
    fn test_leaf_value_wrong_type_panics() {
        let leaf = LeafValue::new(42i64);
        let _ = leaf.take::<String>();
    }

    #[test]
    fn test_variant_round_trip() {
        // 5 alternatives: every injection spine resolves back to its index.
        for index in 0..5 {
            let rep = Rep::variant(index, 5, Rep::Unit);
            let decoded = rep_to_decoded(rep);
            let (resolved, payload) = decoded.variant_index(5);
            assert_eq!(resolved, index);
            assert!(matches!(payload, Decoded::Unit));
        }
    }

    #[test]
    fn test_product_mirrors_shape_balance() {
        let rep = Rep::product(vec![
            Rep::leaf(&1i64),
            Rep::leaf(&2i64),
            Rep::leaf(&3i64),
        ]);
        // 3 slots: left subtree covers 1, right covers 2.
        match rep {
            Rep::Pair(l, r) => {
                assert_eq!(l.slots(), 1);
                assert_eq!(r.slots(), 2);
            }
            other => panic!("expected pair, got {other:?}"),
        }
    }

    #[test]
    fn test_into_parts_order() {
        let decoded = Decoded::Pair(
            Box::new(Decoded::Leaf(LeafValue::new(1i64))),
            Box::new(Decoded::Pair(
                Box::new(Decoded::Leaf(LeafValue::new(2i64))),
                Box::new(Decoded::Leaf(LeafValue::new(3i64))),
            )),
        );
        let parts: Vec<i64> = decoded
            .into_parts()
            .into_iter()
            .map(Decoded::take_leaf)
            .collect();
        assert_eq!(parts, vec![1, 2, 3]);
    }

    /// Mirror an injection-only Rep as a Decoded for spine tests.
    fn rep_to_decoded(rep: Rep) -> Decoded {
        match rep {
            Rep::Unit => Decoded::Unit,
            Rep::Left(inner) => Decoded::Left(Box::new(rep_to_decoded(*inner))),
            Rep::Right(inner) => Decoded::Right(Box::new(rep_to_decoded(*inner))),
            other => panic!("unsupported in this test: {other:?}"),
        }
    }
}
