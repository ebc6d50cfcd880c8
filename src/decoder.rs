// ABOUTME: The decode half of the generic dispatcher.
// ABOUTME: Inspects a JSON value's outer kind against a Shape and rebuilds the structural value, failing on any disagreement.

use serde_json::{Map, Value};

use crate::error::{Error, Result, ValueKind};
use crate::options::{Options, SumEncoding};
use crate::rep::Decoded;
use crate::shape::{Shape, ShapeKind};

/// Decode a JSON value against a shape.
///
/// Every failure carries enough context (field name, tag, or index) to
/// locate it without re-traversing the input.
pub fn decode(shape: &Shape, value: &Value, options: &Options) -> Result<Decoded> {
    match shape.kind() {
        ShapeKind::Unit => expect_unit(value),
        ShapeKind::Leaf(leaf) => leaf.decode(value, options).map(Decoded::Leaf),
        ShapeKind::Optional(leaf) => {
            if value.is_null() {
                Ok(Decoded::Optional(None))
            } else {
                leaf.decode(value, options)
                    .map(|v| Decoded::Optional(Some(v)))
            }
        }
        ShapeKind::Product(..) | ShapeKind::Field(..) if shape.is_record() => {
            let object = expect_object(value)?;
            decode_record(shape, object, options, None)
        }
        ShapeKind::Product(..) => {
            let slots = expect_array(value)?;
            if slots.len() != shape.arity() {
                return Err(Error::ArityMismatch {
                    expected: shape.arity(),
                    actual: slots.len(),
                });
            }
            decode_slots(shape, slots, 0, options)
        }
        ShapeKind::Field(_, inner) => decode(inner, value, options),
        ShapeKind::Sum(..) | ShapeKind::Alternative(..) => decode_sum(shape, value, options),
    }
}

fn expect_unit(value: &Value) -> Result<Decoded> {
    match value {
        Value::Array(items) if items.is_empty() => Ok(Decoded::Unit),
        Value::Array(items) => Err(Error::ArityMismatch {
            expected: 0,
            actual: items.len(),
        }),
        other => Err(Error::TypeMismatch {
            expected: "empty array",
            found: ValueKind::of(other),
        }),
    }
}

fn expect_object(value: &Value) -> Result<&Map<String, Value>> {
    value.as_object().ok_or_else(|| Error::TypeMismatch {
        expected: "object",
        found: ValueKind::of(value),
    })
}

fn expect_array(value: &Value) -> Result<&Vec<Value>> {
    value.as_array().ok_or_else(|| Error::TypeMismatch {
        expected: "array",
        found: ValueKind::of(value),
    })
}

fn expect_tag<'a>(value: &'a Value) -> Result<&'a str> {
    value.as_str().ok_or_else(|| Error::TypeMismatch {
        expected: "string",
        found: ValueKind::of(value),
    })
}

/// Decode a record subtree by field lookup. `exempt_key` is the tag key
/// when the record was merged with one under `TaggedObject`.
fn decode_record(
    shape: &Shape,
    object: &Map<String, Value>,
    options: &Options,
    exempt_key: Option<&str>,
) -> Result<Decoded> {
    if options.reject_unknown_fields {
        let mut known = Vec::new();
        collect_field_names(shape, options, &mut known);
        for key in object.keys() {
            if !known.iter().any(|k| k == key) && exempt_key != Some(key.as_str()) {
                return Err(Error::UnknownField { name: key.clone() });
            }
        }
    }
    decode_record_fields(shape, object, options)
}

fn decode_record_fields(
    shape: &Shape,
    object: &Map<String, Value>,
    options: &Options,
) -> Result<Decoded> {
    match shape.kind() {
        ShapeKind::Product(left, right) => Ok(Decoded::Pair(
            Box::new(decode_record_fields(left, object, options)?),
            Box::new(decode_record_fields(right, object, options)?),
        )),
        ShapeKind::Field(name, inner) => {
            let key = (options.field_name_modifier)(name);
            match inner.kind() {
                // An absent optional field decodes to "absent" rather than
                // failing; a present null is absent too.
                ShapeKind::Optional(leaf) => match object.get(&key) {
                    None => Ok(Decoded::Optional(None)),
                    Some(value) if value.is_null() => Ok(Decoded::Optional(None)),
                    Some(value) => leaf
                        .decode(value, options)
                        .map(|v| Decoded::Optional(Some(v)))
                        .map_err(|e| e.in_field(&key)),
                },
                _ => match object.get(&key) {
                    None => Err(Error::MissingField { name: key }),
                    Some(value) => {
                        decode(inner, value, options).map_err(|e| e.in_field(&key))
                    }
                },
            }
        }
        kind => unreachable!("non-record node {kind:?} in record decode"),
    }
}

fn collect_field_names(shape: &Shape, options: &Options, out: &mut Vec<String>) {
    match shape.kind() {
        ShapeKind::Product(left, right) => {
            collect_field_names(left, options, out);
            collect_field_names(right, options, out);
        }
        ShapeKind::Field(name, _) => out.push((options.field_name_modifier)(name)),
        _ => {}
    }
}

/// Decode positional slots. The index range halves at every product node,
/// exactly as on the encode side, so each leaf reads from the slot it was
/// written to.
fn decode_slots(shape: &Shape, slots: &[Value], base: usize, options: &Options) -> Result<Decoded> {
    match shape.kind() {
        ShapeKind::Product(left, right) => {
            let mid = slots.len() >> 1;
            debug_assert_eq!(mid, left.arity(), "unbalanced product shape");
            Ok(Decoded::Pair(
                Box::new(decode_slots(left, &slots[..mid], base, options)?),
                Box::new(decode_slots(right, &slots[mid..], base + mid, options)?),
            ))
        }
        ShapeKind::Field(_, inner) => decode_slots(inner, slots, base, options),
        ShapeKind::Unit => {
            debug_assert!(slots.is_empty());
            Ok(Decoded::Unit)
        }
        ShapeKind::Leaf(leaf) => leaf
            .decode(&slots[0], options)
            .map(Decoded::Leaf)
            .map_err(|e| e.at_index(base)),
        ShapeKind::Optional(leaf) => {
            if slots[0].is_null() {
                Ok(Decoded::Optional(None))
            } else {
                leaf.decode(&slots[0], options)
                    .map(|v| Decoded::Optional(Some(v)))
                    .map_err(|e| e.at_index(base))
            }
        }
        ShapeKind::Sum(..) | ShapeKind::Alternative(..) => {
            decode_sum(shape, &slots[0], options).map_err(|e| e.at_index(base))
        }
    }
}

/// Where a matched alternative's payload comes from, per strategy.
#[derive(Clone, Copy)]
enum PayloadSource<'a> {
    /// Nullary-as-string: no payload at all.
    Tag,
    /// The payload value itself (single-field object, two-element array).
    Value(&'a Value),
    /// `TaggedObject`: record payloads read the whole object, others read
    /// the value key.
    Tagged {
        object: &'a Map<String, Value>,
        tag_key: &'a str,
        value_key: &'a str,
    },
}

fn decode_sum(shape: &Shape, value: &Value, options: &Options) -> Result<Decoded> {
    if shape.all_nullary() && options.nullary_alternatives_as_string {
        let tag = expect_tag(value)?;
        return match_alternative(shape, tag, PayloadSource::Tag, options)?.ok_or_else(|| {
            Error::UnknownTag {
                name: tag.to_owned(),
            }
        });
    }

    match &options.sum_encoding {
        SumEncoding::TaggedObject { tag_key, value_key } => {
            let object = expect_object(value)?;
            let tag_value = object.get(tag_key).ok_or_else(|| Error::MissingField {
                name: tag_key.clone(),
            })?;
            let tag = expect_tag(tag_value)?;
            let source = PayloadSource::Tagged {
                object,
                tag_key: tag_key.as_str(),
                value_key: value_key.as_str(),
            };
            match_alternative(shape, tag, source, options)?.ok_or_else(|| Error::UnknownTag {
                name: tag.to_owned(),
            })
        }
        SumEncoding::ObjectWithSingleField => {
            let object = expect_object(value)?;
            if object.len() != 1 {
                return Err(Error::ArityMismatch {
                    expected: 1,
                    actual: object.len(),
                });
            }
            let (tag, payload) = object.iter().next().expect("length checked");
            match_alternative(shape, tag, PayloadSource::Value(payload), options)?.ok_or_else(
                || Error::UnknownTag {
                    name: tag.to_owned(),
                },
            )
        }
        SumEncoding::TwoElementArray => {
            let items = expect_array(value)?;
            if items.len() != 2 {
                return Err(Error::ArityMismatch {
                    expected: 2,
                    actual: items.len(),
                });
            }
            let tag = expect_tag(&items[0])?;
            match_alternative(shape, tag, PayloadSource::Value(&items[1]), options)?.ok_or_else(
                || Error::UnknownTag {
                    name: tag.to_owned(),
                },
            )
        }
    }
}

/// Try every alternative in descriptor order; the first whose (modified)
/// name equals the tag wins. Returns the injection spine for the match.
fn match_alternative(
    shape: &Shape,
    tag: &str,
    source: PayloadSource<'_>,
    options: &Options,
) -> Result<Option<Decoded>> {
    match shape.kind() {
        ShapeKind::Sum(left, right) => {
            if let Some(decoded) = match_alternative(left, tag, source, options)? {
                return Ok(Some(Decoded::Left(Box::new(decoded))));
            }
            if let Some(decoded) = match_alternative(right, tag, source, options)? {
                return Ok(Some(Decoded::Right(Box::new(decoded))));
            }
            Ok(None)
        }
        ShapeKind::Alternative(name, inner) => {
            if (options.constructor_name_modifier)(name) != tag {
                return Ok(None);
            }
            decode_payload(inner, source, options)
                .map(Some)
                .map_err(|e| e.in_variant(tag))
        }
        kind => unreachable!("non-alternative node {kind:?} in sum decode"),
    }
}

fn decode_payload(
    inner: &Shape,
    source: PayloadSource<'_>,
    options: &Options,
) -> Result<Decoded> {
    match source {
        PayloadSource::Tag => {
            debug_assert!(matches!(inner.kind(), ShapeKind::Unit));
            Ok(Decoded::Unit)
        }
        PayloadSource::Value(payload) => decode(inner, payload, options),
        PayloadSource::Tagged {
            object,
            tag_key,
            value_key,
        } => {
            if inner.is_record() {
                // The record's fields live beside the tag key; there is no
                // separate value wrapper in this form.
                decode_record(inner, object, options, Some(tag_key))
            } else {
                let payload = object.get(value_key).ok_or_else(|| Error::MissingField {
                    name: value_key.to_owned(),
                })?;
                decode(inner, payload, options)
            }
        }
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
    fn test_decode_record() {
        let opts = Options::default();
        let decoded = decode(&point_shape(), &json!({"x": 1, "y": 2}), &opts).unwrap();
        let (x, y) = decoded.into_pair();
        assert_eq!(x.take_leaf::<i64>(), 1);
        assert_eq!(y.take_leaf::<i64>(), 2);
    }

    #[test]
    fn test_decode_record_missing_field() {
        let opts = Options::default();
        let err = decode(&point_shape(), &json!({"x": 1}), &opts).unwrap_err();
        assert_eq!(
            err,
            Error::MissingField {
                name: "y".to_owned()
            }
        );
    }

    #[test]
    fn test_decode_record_rejecting_unknown_fields() {
        let opts = Options {
            reject_unknown_fields: true,
            ..Options::default()
        };
        let err = decode(&point_shape(), &json!({"x": 1, "y": 2, "z": 3}), &opts).unwrap_err();
        assert_eq!(
            err,
            Error::UnknownField {
                name: "z".to_owned()
            }
        );
    }

    #[test]
    fn test_decode_positional_arity_mismatch() {
        let opts = Options::default();
        let shape = Shape::tuple(vec![Shape::leaf::<i64>(), Shape::leaf::<String>()]);
        let err = decode(&shape, &json!([1]), &opts).unwrap_err();
        assert_eq!(
            err,
            Error::ArityMismatch {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_decode_positional_leaf_error_carries_index() {
        let opts = Options::default();
        let shape = Shape::tuple(vec![Shape::leaf::<i64>(), Shape::leaf::<i64>()]);
        let err = decode(&shape, &json!([1, "two"]), &opts).unwrap_err();
        match err {
            Error::At {
                path: crate::error::Path::Index(1),
                source,
            } => assert!(matches!(*source, Error::Leaf { .. })),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_decode_unit_rejects_non_empty_array() {
        let opts = Options::default();
        let err = decode(&Shape::unit(), &json!([1]), &opts).unwrap_err();
        assert_eq!(
            err,
            Error::ArityMismatch {
                expected: 0,
                actual: 1
            }
        );
    }

    #[test]
    fn test_decode_nullary_string_unknown_tag() {
        let opts = Options::default();
        let shape = Shape::sum(vec![
            Shape::alternative("Red", Shape::unit()),
            Shape::alternative("Green", Shape::unit()),
            Shape::alternative("Blue", Shape::unit()),
        ]);
        let err = decode(&shape, &json!("Purple"), &opts).unwrap_err();
        assert_eq!(
            err,
            Error::UnknownTag {
                name: "Purple".to_owned()
            }
        );
    }

    #[test]
    fn test_decode_tagged_object_merged_record() {
        let opts = Options {
            nullary_alternatives_as_string: false,
            ..Options::default()
        };
        let shape = Shape::sum(vec![
            Shape::alternative("A", Shape::unit()),
            Shape::alternative("B", point_shape()),
        ]);
        let decoded = decode(&shape, &json!({"tag": "B", "x": 1, "y": 2}), &opts).unwrap();
        let (index, payload) = decoded.variant_index(2);
        assert_eq!(index, 1);
        let (x, y) = payload.into_pair();
        assert_eq!(x.take_leaf::<i64>(), 1);
        assert_eq!(y.take_leaf::<i64>(), 2);
    }

    #[test]
    fn test_decode_tagged_object_missing_value_key() {
        let opts = Options {
            nullary_alternatives_as_string: false,
            ..Options::default()
        };
        let shape = Shape::sum(vec![
            Shape::alternative("A", Shape::unit()),
            Shape::alternative("B", Shape::leaf::<i64>()),
        ]);
        let err = decode(&shape, &json!({"tag": "B"}), &opts).unwrap_err();
        match err {
            Error::At { path, source } => {
                assert_eq!(path, crate::error::Path::Variant("B".to_owned()));
                assert_eq!(
                    *source,
                    Error::MissingField {
                        name: "value".to_owned()
                    }
                );
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_decode_single_field_object_arity() {
        let opts = Options {
            sum_encoding: SumEncoding::ObjectWithSingleField,
            nullary_alternatives_as_string: false,
            ..Options::default()
        };
        let shape = Shape::sum(vec![
            Shape::alternative("A", Shape::unit()),
            Shape::alternative("B", Shape::leaf::<i64>()),
        ]);
        let err = decode(&shape, &json!({"A": [], "B": 1}), &opts).unwrap_err();
        assert_eq!(
            err,
            Error::ArityMismatch {
                expected: 1,
                actual: 2
            }
        );
    }

    #[test]
    fn test_decode_two_element_array_tag_must_be_string() {
        let opts = Options {
            sum_encoding: SumEncoding::TwoElementArray,
            nullary_alternatives_as_string: false,
            ..Options::default()
        };
        let shape = Shape::sum(vec![
            Shape::alternative("A", Shape::unit()),
            Shape::alternative("B", Shape::leaf::<i64>()),
        ]);
        let err = decode(&shape, &json!([1, 2]), &opts).unwrap_err();
        assert_eq!(
            err,
            Error::TypeMismatch {
                expected: "string",
                found: ValueKind::Number
            }
        );
    }

    #[test]
    fn test_optional_field_null_and_absent_both_decode_absent() {
        let opts = Options::default();
        let shape = Shape::record(vec![Shape::field("x", Shape::optional::<i64>())]);

        let decoded = decode(&shape, &json!({}), &opts).unwrap();
        assert_eq!(decoded.take_optional::<i64>(), None);

        let decoded = decode(&shape, &json!({"x": null}), &opts).unwrap();
        assert_eq!(decoded.take_optional::<i64>(), None);

        let decoded = decode(&shape, &json!({"x": 5}), &opts).unwrap();
        assert_eq!(decoded.take_optional::<i64>(), Some(5));
    }
}
