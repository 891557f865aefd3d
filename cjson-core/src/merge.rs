//! RFC 7386 JSON Merge Patch: applying a merge patch document onto a
//! target, and generating a minimal merge patch between two documents.

use crate::value::{Member, Object, Value};

/// Applies `patch` onto `target` in place, per RFC 7386 section 2, matching
/// target keys case-sensitively.
///
/// If `patch` is not an Object, `target` becomes a deep duplicate of
/// `patch` outright. Otherwise `target` becomes an Object (discarding
/// whatever it was before, unless it already was one), and each patch
/// member either deletes a key (`null`) or recursively merges into it.
pub fn apply(target: &mut Value, patch: &Value) {
    apply_with(target, patch, true)
}

/// Same as [`apply`], but target keys are matched case-insensitively
/// (mirrors the original's `mergepatch`/`mergepatchcasesensitive` pair).
pub fn apply_case_insensitive(target: &mut Value, patch: &Value) {
    apply_with(target, patch, false)
}

fn apply_with(target: &mut Value, patch: &Value, case_sensitive: bool) {
    let Some(patch_members) = patch.as_object() else {
        *target = patch.duplicate(true).unwrap_or(Value::Null);
        return;
    };

    if !target.is_object() {
        *target = Value::object();
    }

    for member in patch_members {
        let existing_key = matching_key(target, member.key.as_str(), case_sensitive);

        if member.value.is_null() {
            if let Some(key) = existing_key {
                let _ = target.delete_from_object(&key);
            }
            continue;
        }

        match existing_key {
            Some(key) => {
                let mut existing = target.detach_by_key(&key).unwrap_or(Value::Null);
                apply_with(&mut existing, &member.value, case_sensitive);
                let _ = target.add_to_object(key, existing);
            },
            None => {
                let mut created = Value::Null;
                apply_with(&mut created, &member.value, case_sensitive);
                let _ = target.add_to_object(member.key.as_str().to_owned(), created);
            },
        }
    }
}

/// Finds the actual (stored) key in `target` matching `key`, so a
/// case-insensitive merge keeps the existing key's casing rather than
/// overwriting it with the patch's.
fn matching_key(target: &Value, key: &str, case_sensitive: bool) -> Option<String> {
    target.as_object()?.iter().find_map(|m| {
        let matches = if case_sensitive {
            m.key.as_str() == key
        } else {
            m.key.as_str().eq_ignore_ascii_case(key)
        };
        matches.then(|| m.key.as_str().to_owned())
    })
}

/// Generates the smallest merge patch that turns `from` into `to`, per
/// RFC 7386 section 3, matching keys between the two documents
/// case-sensitively.
///
/// `to == null` always yields `null` outright (there is no way to
/// express "delete the whole document" any other way in a merge patch,
/// so this is the one case handled before the Object/Object branch).
/// When both sides are objects, keys present in both recurse and are
/// omitted if unchanged; keys only in `from` become `null`; keys only in
/// `to` are duplicated in. An empty resulting object still collapses to
/// `null`, matching the "no-op" convention used throughout this engine.
pub fn diff(from: &Value, to: &Value) -> Value {
    diff_with(from, to, true)
}

/// Same as [`diff`], but keys are matched between `from` and `to`
/// case-insensitively (mirrors the original's `generatemergepatch`/
/// `generatemergepatchcasesensitive` pair).
pub fn diff_case_insensitive(from: &Value, to: &Value) -> Value {
    diff_with(from, to, false)
}

fn diff_with(from: &Value, to: &Value, case_sensitive: bool) -> Value {
    if to.is_null() {
        return Value::Null;
    }
    let (Some(from_members), Some(to_members)) = (from.as_object(), to.as_object()) else {
        return to.duplicate(true).unwrap_or(Value::Null);
    };

    let key_eq = |a: &str, b: &str| {
        if case_sensitive {
            a == b
        } else {
            a.eq_ignore_ascii_case(b)
        }
    };

    let mut members = Vec::new();

    for f in from_members {
        if !to_members.iter().any(|t| key_eq(t.key.as_str(), f.key.as_str())) {
            members.push(Member::new(f.key.as_str().to_owned(), Value::Null));
        }
    }

    for t in to_members {
        match from_members.iter().find(|f| key_eq(f.key.as_str(), t.key.as_str())) {
            None => members.push(Member::new(
                t.key.as_str().to_owned(),
                t.value.duplicate(true).unwrap_or(Value::Null),
            )),
            Some(f) => {
                if !f.value.compare(&t.value, case_sensitive) {
                    let nested = diff_with(&f.value, &t.value, case_sensitive);
                    members.push(Member::new(t.key.as_str().to_owned(), nested));
                }
            },
        }
    }

    if members.is_empty() {
        Value::Null
    } else {
        Value::Object(Object::Owned(members))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;
    use pretty_assertions::assert_eq;

    fn json(text: &str) -> Value {
        parser::parse(text.as_bytes()).unwrap()
    }

    #[test]
    fn null_member_deletes_key() {
        let mut target = json(r#"{"a":1,"b":2}"#);
        apply(&mut target, &json(r#"{"a":null}"#));
        assert!(!target.has_object_item("a"));
        assert_eq!(target.get_object_item("b").unwrap().as_f64(), Some(2.0));
    }

    #[test]
    fn non_object_patch_replaces_target_outright() {
        let mut target = json(r#"{"a":1}"#);
        apply(&mut target, &json(r#"["x","y"]"#));
        assert_eq!(target.array_len(), Some(2));
    }

    #[test]
    fn nested_objects_merge_recursively() {
        let mut target = json(r#"{"a":{"x":1,"y":2}}"#);
        apply(&mut target, &json(r#"{"a":{"y":9}}"#));
        let a = target.get_object_item("a").unwrap();
        assert_eq!(a.get_object_item("x").unwrap().as_f64(), Some(1.0));
        assert_eq!(a.get_object_item("y").unwrap().as_f64(), Some(9.0));
    }

    #[test]
    fn rfc7386_example_array_replaces_wholesale() {
        let mut target = json(r#"{"a":[1,2]}"#);
        apply(&mut target, &json(r#"{"a":[3,4]}"#));
        let a = target.get_object_item("a").unwrap();
        assert_eq!(a.get_array_item(0).unwrap().as_f64(), Some(3.0));
        assert_eq!(a.array_len(), Some(2));
    }

    #[test]
    fn diff_then_apply_round_trips() {
        let from = json(r#"{"a":1,"b":{"c":2,"d":3}}"#);
        let to = json(r#"{"a":1,"b":{"c":9},"e":5}"#);
        let patch = diff(&from, &to);
        let mut target = from.clone();
        apply(&mut target, &patch);
        assert!(target.compare(&to, true));
    }

    #[test]
    fn diff_of_equal_documents_is_null() {
        let doc = json(r#"{"a":1}"#);
        assert!(diff(&doc, &doc).is_null());
    }

    #[test]
    fn diff_to_null_is_null() {
        let from = json(r#"{"a":1}"#);
        assert!(diff(&from, &Value::Null).is_null());
    }

    #[test]
    fn case_insensitive_apply_matches_differently_cased_key() {
        let mut target = json(r#"{"Name":"old"}"#);
        apply_case_insensitive(&mut target, &json(r#"{"name":"new"}"#));
        assert_eq!(target.object_len(), Some(1));
        assert_eq!(target.get_object_item("Name").unwrap().as_str(), Some("new"));
    }

    #[test]
    fn case_insensitive_diff_treats_differently_cased_keys_as_the_same() {
        let from = json(r#"{"Name":1}"#);
        let to = json(r#"{"name":1}"#);
        assert!(diff_case_insensitive(&from, &to).is_null());
    }
}
