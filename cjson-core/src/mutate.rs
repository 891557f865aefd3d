//! Build, copy, compare, detach, insert, replace, delete, duplicate,
//! traversal over the model.
//!
//! Every operation that can fail returns `Result<_, Error>` rather than a
//! boolean success flag, so "never return with an invariant broken" is
//! expressed directly instead of via an out-of-band sentinel pointer.

use crate::error::{Error, Result};
use crate::value::{Array, Member, Number, Object, Text, Value};

/// Deep-duplicate recursion bound.
pub const CIRCULAR_LIMIT: usize = 10_000;

impl Value {
    // --- Array mutation ---

    /// `AddToArray(A, N)`: append `item` as the new tail.
    pub fn add_to_array(&mut self, item: Value) -> Result<()> {
        let Value::Array(array) = self else {
            return Err(Error::NotAnArray);
        };
        array.items_mut()?.push(item);
        Ok(())
    }

    /// `InsertInArray(i, N)`: insert before position `i`; if `i >= len`,
    /// append.
    pub fn insert_in_array(&mut self, index: usize, item: Value) -> Result<()> {
        let Value::Array(array) = self else {
            return Err(Error::NotAnArray);
        };
        let items = array.items_mut()?;
        let index = index.min(items.len());
        items.insert(index, item);
        Ok(())
    }

    /// `GetArrayItem(i)`: linear scan; out-of-range is `None` (in the C
    /// original, a negative index is also nil; `usize` rules that
    /// out by construction).
    pub fn get_array_item(&self, index: usize) -> Option<&Value> {
        self.as_array().and_then(|items| items.get(index))
    }

    pub fn array_len(&self) -> Option<usize> {
        match self {
            Value::Array(a) => Some(a.len()),
            _ => None,
        }
    }

    /// `DetachByIndex`: unlink and return ownership of the element at
    /// `index`.
    pub fn detach_by_index(&mut self, index: usize) -> Result<Value> {
        let Value::Array(array) = self else {
            return Err(Error::NotAnArray);
        };
        let items = array.items_mut()?;
        if index >= items.len() {
            return Err(Error::IndexOutOfBounds {
                index,
                len: items.len(),
            });
        }
        Ok(items.remove(index))
    }

    /// `DeleteFromArray`: detach then drop.
    pub fn delete_from_array(&mut self, index: usize) -> Result<()> {
        self.detach_by_index(index).map(drop)
    }

    /// `Replace(parent, old, new)` for an array element.
    pub fn replace_item_in_array(&mut self, index: usize, new: Value) -> Result<Value> {
        let Value::Array(array) = self else {
            return Err(Error::NotAnArray);
        };
        let items = array.items_mut()?;
        if index >= items.len() {
            return Err(Error::IndexOutOfBounds {
                index,
                len: items.len(),
            });
        }
        Ok(std::mem::replace(&mut items[index], new))
    }

    // --- Object mutation ---

    /// `AddToObject(O, key, N)`: append `item` with an owned key.
    pub fn add_to_object(&mut self, key: impl Into<String>, item: Value) -> Result<()> {
        self.add_member(Member::new(Text::Owned(key.into()), item))
    }

    /// `AddToObjectConstKey`: append `item` with a shared (`KeyIsConstant`)
    /// key.
    pub fn add_to_object_const_key(
        &mut self,
        key: std::rc::Rc<str>,
        item: Value,
    ) -> Result<()> {
        self.add_member(Member::new(Text::Shared(key), item))
    }

    fn add_member(&mut self, member: Member) -> Result<()> {
        let Value::Object(object) = self else {
            return Err(Error::NotAnObject);
        };
        object.members_mut()?.push(member);
        Ok(())
    }

    /// `GetObjectItem`: linear scan, first match, case-sensitive.
    pub fn get_object_item(&self, key: &str) -> Option<&Value> {
        self.as_object()?
            .iter()
            .find(|m| m.key.as_str() == key)
            .map(|m| &m.value)
    }

    /// `GetObjectItemCaseSensitive`'s insensitive sibling.
    pub fn get_object_item_case_insensitive(&self, key: &str) -> Option<&Value> {
        self.as_object()?
            .iter()
            .find(|m| m.key.as_str().eq_ignore_ascii_case(key))
            .map(|m| &m.value)
    }

    pub fn has_object_item(&self, key: &str) -> bool {
        self.get_object_item(key).is_some()
    }

    pub fn object_len(&self) -> Option<usize> {
        match self {
            Value::Object(o) => Some(o.len()),
            _ => None,
        }
    }

    /// `DetachByKey`: unlink and return ownership of the first member
    /// matching `key`.
    pub fn detach_by_key(&mut self, key: &str) -> Result<Value> {
        let Value::Object(object) = self else {
            return Err(Error::NotAnObject);
        };
        let members = object.members_mut()?;
        let index = members
            .iter()
            .position(|m| m.key.as_str() == key)
            .ok_or_else(|| Error::NoSuchKey {
                key: key.to_owned(),
            })?;
        Ok(members.remove(index).value)
    }

    pub fn delete_from_object(&mut self, key: &str) -> Result<()> {
        self.detach_by_key(key).map(drop)
    }

    /// `Replace(parent, old, new)` for an object member: the replacement
    /// adopts the old key.
    pub fn replace_item_in_object(&mut self, key: &str, new: Value) -> Result<Value> {
        let Value::Object(object) = self else {
            return Err(Error::NotAnObject);
        };
        let members = object.members_mut()?;
        let member = members
            .iter_mut()
            .find(|m| m.key.as_str() == key)
            .ok_or_else(|| Error::NoSuchKey {
                key: key.to_owned(),
            })?;
        Ok(std::mem::replace(&mut member.value, new))
    }

    // --- Duplicate / Compare ---

    /// `Duplicate(node, recurse)`: deep copy if `recurse`, else shallow
    /// (children dropped), bounded by [`CIRCULAR_LIMIT`].
    pub fn duplicate(&self, recurse: bool) -> Result<Value> {
        self.duplicate_rec(recurse, 0)
    }

    fn duplicate_rec(&self, recurse: bool, depth: usize) -> Result<Value> {
        if depth >= CIRCULAR_LIMIT {
            return Err(Error::CircularLimitExceeded {
                limit: CIRCULAR_LIMIT,
            });
        }
        Ok(match self {
            Value::Invalid => Value::Invalid,
            Value::Null => Value::Null,
            Value::Bool(b) => Value::Bool(*b),
            Value::Number(n) => Value::Number(*n),
            Value::String(t) => Value::String(Text::Owned(t.as_str().to_owned())),
            Value::Raw(t) => Value::Raw(Text::Owned(t.as_str().to_owned())),
            Value::Array(a) => {
                if !recurse {
                    Value::Array(Array::Owned(Vec::new()))
                } else {
                    let mut out = Vec::with_capacity(a.len());
                    for item in a.items() {
                        out.push(item.duplicate_rec(true, depth + 1)?);
                    }
                    Value::Array(Array::Owned(out))
                }
            },
            Value::Object(o) => {
                if !recurse {
                    Value::Object(Object::Owned(Vec::new()))
                } else {
                    let mut out = Vec::with_capacity(o.len());
                    for member in o.members() {
                        out.push(Member::new(
                            Text::Owned(member.key.as_str().to_owned()),
                            member.value.duplicate_rec(true, depth + 1)?,
                        ));
                    }
                    Value::Object(Object::Owned(out))
                }
            },
        })
    }

    /// `Compare(a, b, caseSensitive)`: structural equality with a relative
    /// double-epsilon tolerance on numbers; objects compare by key
    /// membership (order-insensitive), arrays element-wise in order.
    pub fn compare(&self, other: &Value, case_sensitive: bool) -> bool {
        self.compare_with(other, case_sensitive, Number::approx_eq)
    }

    /// Same as [`compare`](Self::compare), but numbers must also agree on
    /// their saturated `i32` view. Used only by the Patch engine's `test`
    /// operation, which (per the original `sort_object`-style comparator
    /// it mirrors) is stricter than the general-purpose `Compare`.
    pub(crate) fn compare_exact(&self, other: &Value, case_sensitive: bool) -> bool {
        self.compare_with(other, case_sensitive, numbers_match_exact)
    }

    fn compare_with(
        &self,
        other: &Value,
        case_sensitive: bool,
        number_eq: fn(&Number, &Number) -> bool,
    ) -> bool {
        match (self, other) {
            (Value::Invalid, Value::Invalid) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => number_eq(a, b),
            (Value::String(a), Value::String(b)) | (Value::Raw(a), Value::Raw(b)) => {
                a.as_str() == b.as_str()
            },
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len()
                    && a.items()
                        .iter()
                        .zip(b.items())
                        .all(|(x, y)| x.compare_with(y, case_sensitive, number_eq))
            },
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a.members().iter().all(|m1| {
                        let found = if case_sensitive {
                            b.members().iter().find(|m2| m1.key.as_str() == m2.key.as_str())
                        } else {
                            b.members()
                                .iter()
                                .find(|m2| m1.key.as_str().eq_ignore_ascii_case(m2.key.as_str()))
                        };
                        matches!(found, Some(m2) if m1.value.compare_with(&m2.value, case_sensitive, number_eq))
                    })
            },
            _ => false,
        }
    }
}

fn numbers_match_exact(a: &Number, b: &Number) -> bool {
    a.as_i32() == b.as_i32() && a.approx_eq(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn add_and_get_array_item() {
        let mut v = Value::array();
        v.add_to_array(Value::number(1.0)).unwrap();
        v.add_to_array(Value::number(2.0)).unwrap();
        assert_eq!(v.get_array_item(1).unwrap().as_f64(), Some(2.0));
        assert!(v.get_array_item(5).is_none());
    }

    #[test]
    fn duplicate_keys_lookup_returns_first() {
        let mut v = Value::object();
        v.add_to_object("a", Value::number(1.0)).unwrap();
        v.add_to_object("a", Value::number(2.0)).unwrap();
        assert_eq!(v.get_object_item("a").unwrap().as_f64(), Some(1.0));
    }

    #[test]
    fn detach_then_insert_round_trips() {
        let mut v = Value::array();
        v.add_to_array(Value::string("a")).unwrap();
        v.add_to_array(Value::string("b")).unwrap();
        let detached = v.detach_by_index(0).unwrap();
        assert_eq!(detached.as_str(), Some("a"));
        assert_eq!(v.array_len(), Some(1));
        v.insert_in_array(0, detached).unwrap();
        assert_eq!(v.array_len(), Some(2));
    }

    #[test]
    fn replace_in_object_adopts_old_key() {
        let mut v = Value::object();
        v.add_to_object("k", Value::number(1.0)).unwrap();
        let old = v.replace_item_in_object("k", Value::number(2.0)).unwrap();
        assert_eq!(old.as_f64(), Some(1.0));
        assert_eq!(v.get_object_item("k").unwrap().as_f64(), Some(2.0));
    }

    #[test]
    fn duplicate_is_deep_and_compares_equal() {
        let mut v = Value::object();
        v.add_to_object("a", Value::array_of_numbers([1.0, 2.0]))
            .unwrap();
        let dup = v.duplicate(true).unwrap();
        assert!(dup.compare(&v, true));
    }

    #[test]
    fn shallow_duplicate_drops_children() {
        let mut v = Value::array();
        v.add_to_array(Value::number(1.0)).unwrap();
        let dup = v.duplicate(false).unwrap();
        assert_eq!(dup.array_len(), Some(0));
    }

    #[test]
    fn mutation_through_reference_is_rejected() {
        let shared = std::rc::Rc::new(vec![Value::number(1.0)]);
        let mut v = Value::array_reference(shared);
        assert!(matches!(
            v.add_to_array(Value::number(2.0)),
            Err(Error::ReferenceImmutable)
        ));
    }

    #[test]
    fn compare_object_is_order_insensitive() {
        let mut a = Value::object();
        a.add_to_object("x", Value::number(1.0)).unwrap();
        a.add_to_object("y", Value::number(2.0)).unwrap();
        let mut b = Value::object();
        b.add_to_object("y", Value::number(2.0)).unwrap();
        b.add_to_object("x", Value::number(1.0)).unwrap();
        assert!(a.compare(&b, true));
    }
}
