// ABOUTME: The encode half of the generic dispatcher.
// ABOUTME: Walks a Shape and a Rep in lockstep, assembling a JSON value bottom-up.

use serde_json::{Map, Value};

use crate::options::{Options, SumEncoding};
use crate::rep::Rep;
use crate::shape::{Shape, ShapeKind};

/// Encode a structural value view against its shape.
///
/// Encoding is total: a `rep` produced by a correct
/// [`Shaped::to_rep`](crate::Shaped::to_rep) for the same shape always
/// encodes.
///
/// # Panics
///
/// Panics if `rep` does not structurally match `shape` — a bridge bug,
/// not a data error.
#[must_use]
pub fn encode(shape: &Shape, rep: Rep, options: &Options) -> Value {
    match (shape.kind(), rep) {
        (ShapeKind::Unit, Rep::Unit) => Value::Array(Vec::new()),
        (ShapeKind::Leaf(_), Rep::Leaf(value)) => value,
        (ShapeKind::Optional(_), Rep::Optional(value)) => value.unwrap_or(Value::Null),
        (ShapeKind::Product(..) | ShapeKind::Field(..), rep) if shape.is_record() => {
            let mut fields = Map::new();
            encode_record(shape, rep, options, &mut fields);
            Value::Object(fields)
        }
        (ShapeKind::Product(..), rep) => {
            let mut slots = vec![Value::Null; shape.arity()];
            fill_slots(shape, rep, options, &mut slots);
            Value::Array(slots)
        }
        (ShapeKind::Field(_, inner), rep) => encode(inner, rep, options),
        (ShapeKind::Sum(..) | ShapeKind::Alternative(..), rep) => encode_sum(shape, rep, options),
        (kind, rep) => panic!("shape/rep mismatch: {kind:?} against {rep:?}"),
    }
}

/// Merge one record subtree's key/value pairs into `out`, in declaration
/// order. An absent optional field contributes no pair when the omission
/// policy is set, and a `null` marker otherwise.
fn encode_record(shape: &Shape, rep: Rep, options: &Options, out: &mut Map<String, Value>) {
    match (shape.kind(), rep) {
        (ShapeKind::Product(ls, rs), Rep::Pair(lr, rr)) => {
            encode_record(ls, *lr, options, out);
            encode_record(rs, *rr, options, out);
        }
        (ShapeKind::Field(name, inner), rep) => {
            let key = (options.field_name_modifier)(name);
            match (inner.kind(), rep) {
                (ShapeKind::Optional(_), Rep::Optional(None)) => {
                    if !options.omit_absent_optional_fields {
                        out.insert(key, Value::Null);
                    }
                }
                (ShapeKind::Optional(_), Rep::Optional(Some(value))) => {
                    out.insert(key, value);
                }
                (_, rep) => {
                    out.insert(key, encode(inner, rep, options));
                }
            }
        }
        (kind, rep) => panic!("shape/rep mismatch in record: {kind:?} against {rep:?}"),
    }
}

/// Place each leaf of a positional subtree into its slot. The index range
/// halves at every product node; the balanced builders guarantee the left
/// subtree's arity equals `slots.len() >> 1`.
fn fill_slots(shape: &Shape, rep: Rep, options: &Options, slots: &mut [Value]) {
    match (shape.kind(), rep) {
        (ShapeKind::Product(ls, rs), Rep::Pair(lr, rr)) => {
            let mid = slots.len() >> 1;
            debug_assert_eq!(mid, ls.arity(), "unbalanced product shape");
            let (left, right) = slots.split_at_mut(mid);
            fill_slots(ls, *lr, options, left);
            fill_slots(rs, *rr, options, right);
        }
        (ShapeKind::Field(_, inner), rep) => fill_slots(inner, rep, options, slots),
        (ShapeKind::Unit, Rep::Unit) => debug_assert!(slots.is_empty()),
        (ShapeKind::Leaf(_), Rep::Leaf(value)) => slots[0] = value,
        (ShapeKind::Optional(_), Rep::Optional(value)) => {
            slots[0] = value.unwrap_or(Value::Null);
        }
        (ShapeKind::Sum(..) | ShapeKind::Alternative(..), rep) => {
            slots[0] = encode_sum(shape, rep, options);
        }
        (kind, rep) => panic!("shape/rep mismatch in product: {kind:?} against {rep:?}"),
    }
}

fn encode_sum(shape: &Shape, rep: Rep, options: &Options) -> Value {
    let (name, alt_shape, payload) = select_alternative(shape, rep);
    let tag = (options.constructor_name_modifier)(name);

    // The nullary-as-string rule wins over every strategy.
    if shape.all_nullary() && options.nullary_alternatives_as_string {
        return Value::String(tag);
    }

    match &options.sum_encoding {
        SumEncoding::TaggedObject { tag_key, value_key } => {
            let mut fields = Map::new();
            fields.insert(tag_key.clone(), Value::String(tag));
            if alt_shape.is_record() {
                // Record payloads absorb the tag as a leading key instead
                // of being wrapped under the value key.
                match encode(alt_shape, payload, options) {
                    Value::Object(record) => fields.extend(record),
                    other => unreachable!("record shape encoded to {other:?}"),
                }
            } else {
                fields.insert(value_key.clone(), encode(alt_shape, payload, options));
            }
            Value::Object(fields)
        }
        SumEncoding::ObjectWithSingleField => {
            let mut fields = Map::new();
            fields.insert(tag, encode(alt_shape, payload, options));
            Value::Object(fields)
        }
        SumEncoding::TwoElementArray => {
            Value::Array(vec![Value::String(tag), encode(alt_shape, payload, options)])
        }
    }
}

/// Follow the rep's injection spine down the sum tree to the alternative
/// it selects.
fn select_alternative<'s>(shape: &'s Shape, rep: Rep) -> (&'static str, &'s Shape, Rep) {
    match (shape.kind(), rep) {
        (ShapeKind::Sum(left, _), Rep::Left(inner)) => select_alternative(left, *inner),
        (ShapeKind::Sum(_, right), Rep::Right(inner)) => select_alternative(right, *inner),
        (ShapeKind::Alternative(name, inner), rep) => (*name, inner.as_ref(), rep),
        (kind, rep) => panic!("shape/rep mismatch in sum: {kind:?} against {rep:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn point_shape() -> Shape {
        Shape::record(vec![
            Shape::field("x", Shape::leaf::<i64>()),
            Shape::field("y", Shape::leaf::<i64>()),
        ])
    }

    #[test]
    fn test_encode_unit() {
        let opts = Options::default();
        assert_eq!(encode(&Shape::unit(), Rep::Unit, &opts), json!([]));
    }

    #[test]
    fn test_encode_bare_leaf() {
        let opts = Options::default();
        let shape = Shape::leaf::<i64>();
        assert_eq!(encode(&shape, Rep::leaf(&7i64), &opts), json!(7));
    }

    #[test]
    fn test_encode_record_keeps_field_order() {
        let opts = Options::default();
        let rep = Rep::product(vec![Rep::leaf(&1i64), Rep::leaf(&2i64)]);
        let value = encode(&point_shape(), rep, &opts);
        assert_eq!(value.to_string(), r#"{"x":1,"y":2}"#);
    }

    #[test]
    fn test_encode_positional() {
        let opts = Options::default();
        let shape = Shape::tuple(vec![
            Shape::leaf::<i64>(),
            Shape::leaf::<String>(),
            Shape::leaf::<bool>(),
        ]);
        let rep = Rep::product(vec![
            Rep::leaf(&1i64),
            Rep::leaf(&"a".to_owned()),
            Rep::leaf(&true),
        ]);
        assert_eq!(encode(&shape, rep, &opts), json!([1, "a", true]));
    }

    #[test]
    fn test_omitted_optional_field() {
        let shape = Shape::record(vec![
            Shape::field("x", Shape::optional::<i64>()),
            Shape::field("y", Shape::optional::<i64>()),
        ]);
        let rep = |x: Option<i64>, y: Option<i64>| {
            Rep::product(vec![Rep::optional(x.as_ref()), Rep::optional(y.as_ref())])
        };

        let omitting = Options {
            omit_absent_optional_fields: true,
            ..Options::default()
        };
        assert_eq!(encode(&shape, rep(Some(1), None), &omitting), json!({"x": 1}));

        let keeping = Options::default();
        assert_eq!(
            encode(&shape, rep(Some(1), None), &keeping),
            json!({"x": 1, "y": null})
        );
    }

    #[test]
    fn test_tagged_object_merges_record_payload() {
        let opts = Options {
            nullary_alternatives_as_string: false,
            ..Options::default()
        };
        let shape = Shape::sum(vec![
            Shape::alternative("A", Shape::unit()),
            Shape::alternative("B", point_shape()),
        ]);
        let payload = Rep::product(vec![Rep::leaf(&1i64), Rep::leaf(&2i64)]);
        let value = encode(&shape, Rep::variant(1, 2, payload), &opts);
        assert_eq!(value.to_string(), r#"{"tag":"B","x":1,"y":2}"#);
    }

    #[test]
    fn test_tagged_object_unit_payload_is_empty_array() {
        let opts = Options {
            nullary_alternatives_as_string: false,
            ..Options::default()
        };
        let shape = Shape::sum(vec![
            Shape::alternative("A", Shape::unit()),
            Shape::alternative("B", Shape::leaf::<i64>()),
        ]);
        let value = encode(&shape, Rep::variant(0, 2, Rep::Unit), &opts);
        assert_eq!(value, json!({"tag": "A", "value": []}));
    }

    #[test]
    fn test_nullary_sum_as_string() {
        let opts = Options::default();
        let shape = Shape::sum(vec![
            Shape::alternative("Red", Shape::unit()),
            Shape::alternative("Green", Shape::unit()),
            Shape::alternative("Blue", Shape::unit()),
        ]);
        let value = encode(&shape, Rep::variant(1, 3, Rep::Unit), &opts);
        assert_eq!(value, json!("Green"));
    }

    #[test]
    fn test_constructor_name_modifier_applies_to_tags() {
        let opts = Options {
            constructor_name_modifier: crate::options::case::to_snake_case,
            ..Options::default()
        };
        let shape = Shape::sum(vec![
            Shape::alternative("FirstCase", Shape::unit()),
            Shape::alternative("SecondCase", Shape::unit()),
        ]);
        let value = encode(&shape, Rep::variant(0, 2, Rep::Unit), &opts);
        assert_eq!(value, json!("first_case"));
    }
}
