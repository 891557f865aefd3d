//! `proptest` generators for arbitrary `Value` trees.

use cjson_core::Value;
use proptest::prelude::*;

/// A JSON-safe string: printable ASCII plus a few multi-byte characters,
/// avoiding surrogate-only code points that can't appear in a Rust
/// `char` to begin with.
pub fn gen_key() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_ /~-]{0,12}"
}

pub fn gen_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::null()),
        any::<bool>().prop_map(Value::bool),
        any::<i16>().prop_map(|n| Value::number(n as f64)),
        any::<f64>()
            .prop_filter("finite", |d| d.is_finite())
            .prop_map(Value::number),
        "[a-zA-Z0-9 ]{0,16}".prop_map(Value::string),
    ]
}

/// Arbitrary `Value` trees up to a bounded depth and branching factor,
/// so generated cases stay well under the nesting limit the parser
/// enforces.
pub fn gen_value() -> impl Strategy<Value = Value> {
    gen_scalar().prop_recursive(4, 32, 6, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..6)
                .prop_map(|items| Value::Array(cjson_core::Array::Owned(items))),
            proptest::collection::vec((gen_key(), inner), 0..6).prop_map(|pairs| {
                let members = pairs
                    .into_iter()
                    .map(|(k, v)| cjson_core::Member::new(k, v))
                    .collect();
                Value::Object(cjson_core::Object::Owned(members))
            }),
        ]
    })
}
