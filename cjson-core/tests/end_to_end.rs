use cjson_core::{merge, minify, parser, patch, pointer, printer, Value};
use pretty_assertions::assert_eq;

#[test]
fn parses_a_nested_document_and_reads_fields() {
    let doc = parser::parse(br#"{"name":"John","age":30,"cars":["Ford","BMW"]}"#).unwrap();

    let obj = doc.as_object().unwrap();
    assert_eq!(obj.len(), 3);

    let cars = doc.get_object_item("cars").unwrap();
    let cars = cars.as_array().unwrap();
    assert_eq!(cars.len(), 2);
    assert_eq!(cars[0].as_str(), Some("Ford"));
    assert_eq!(cars[1].as_str(), Some("BMW"));
}

#[test]
fn pointer_reads_an_array_element_and_rejects_dash() {
    let doc = parser::parse(br#"{"name":"John","age":30,"cars":["Ford","BMW"]}"#).unwrap();

    let bmw = pointer::resolve(&doc, "/cars/1").unwrap();
    assert_eq!(bmw.as_str(), Some("BMW"));

    assert!(pointer::resolve(&doc, "/cars/-").is_err());
}

#[test]
fn applies_a_patch_batch_adding_and_removing() {
    let mut doc = parser::parse(br#"{"name":"John","age":30,"cars":["Ford","BMW"]}"#).unwrap();
    let ops = parser::parse(
        br#"[{"op":"add","path":"/cars/-","value":"Tesla"},{"op":"remove","path":"/age"}]"#,
    )
    .unwrap();

    patch::apply(&mut doc, &ops).unwrap();

    let expected = parser::parse(br#"{"name":"John","cars":["Ford","BMW","Tesla"]}"#).unwrap();
    assert!(doc.compare(&expected, true));
}

#[test]
fn diffs_two_objects_into_replace_and_add() {
    let from = parser::parse(br#"{"a":{"b":1}}"#).unwrap();
    let to = parser::parse(br#"{"a":{"b":2,"c":3}}"#).unwrap();

    let ops = patch::diff(&from, &to);
    let ops = ops.as_array().unwrap();
    assert_eq!(ops.len(), 2);

    let has_replace_b = ops.iter().any(|op| {
        op.get_object_item("op").and_then(Value::as_str) == Some("replace")
            && op.get_object_item("path").and_then(Value::as_str) == Some("/a/b")
            && op
                .get_object_item("value")
                .and_then(Value::as_f64)
                .map(|v| v == 2.0)
                .unwrap_or(false)
    });
    let has_add_c = ops.iter().any(|op| {
        op.get_object_item("op").and_then(Value::as_str) == Some("add")
            && op.get_object_item("path").and_then(Value::as_str) == Some("/a/c")
            && op
                .get_object_item("value")
                .and_then(Value::as_f64)
                .map(|v| v == 3.0)
                .unwrap_or(false)
    });
    assert!(has_replace_b, "missing replace at /a/b in {ops:?}");
    assert!(has_add_c, "missing add at /a/c in {ops:?}");

    let ops_value = patch::diff(&from, &to);
    let mut applied = from.clone();
    patch::apply(&mut applied, &ops_value).unwrap();
    assert!(applied.compare(&to, true));
}

#[test]
fn merge_patch_deletes_keys_named_null_and_keeps_the_rest() {
    let mut target = parser::parse(br#"{"a":{"b":1,"d":4}}"#).unwrap();
    let patch_doc = parser::parse(br#"{"a":{"b":null,"c":3}}"#).unwrap();

    merge::apply(&mut target, &patch_doc);

    let expected = parser::parse(br#"{"a":{"c":3,"d":4}}"#).unwrap();
    assert!(target.compare(&expected, true));
}

#[test]
fn float_arithmetic_round_trips_through_print_and_parse() {
    let d = 0.1 + 0.2;
    let v = Value::number(d);

    let printed = printer::print(&v).unwrap();
    let reparsed = parser::parse(printed.as_bytes()).unwrap();

    assert_eq!(reparsed.as_f64(), Some(d));
}

#[test]
fn nesting_at_exactly_the_limit_succeeds_one_more_fails() {
    let depth = parser::NESTING_LIMIT;
    let at_limit = format!("{}{}{}", "[".repeat(depth), "1", "]".repeat(depth));
    assert!(parser::parse(at_limit.as_bytes()).is_ok());

    let over_limit = format!("{}{}{}", "[".repeat(depth + 1), "1", "]".repeat(depth + 1));
    assert!(parser::parse(over_limit.as_bytes()).is_err());
}

#[test]
fn overflowing_exponent_is_a_parse_error() {
    assert!(parser::parse(b"1e400").is_err());
}

#[test]
fn duplicate_keys_parse_and_get_returns_the_first() {
    let doc = parser::parse(br#"{"a":1,"a":2}"#).unwrap();
    assert_eq!(doc.get_object_item("a").and_then(Value::as_f64), Some(1.0));
}

#[test]
fn minify_of_pretty_print_matches_compact_print_byte_for_byte() {
    let doc = parser::parse(br#"{"name":"John","age":30,"cars":["Ford","BMW"]}"#).unwrap();

    let pretty = printer::print_pretty(&doc).unwrap();
    let compact = printer::print(&doc).unwrap();

    assert_eq!(minify::minify_str(&pretty), compact);
}
