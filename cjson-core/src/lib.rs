//! A JSON value model, parser, and printer, with RFC 6901 JSON Pointer,
//! RFC 6902 JSON Patch, and RFC 7386 JSON Merge Patch layered on top.
//!
//! ```
//! use cjson_core::{parser, value::Value};
//!
//! let doc = parser::parse(br#"{"name":"John","age":30}"#).unwrap();
//! assert_eq!(doc.get_object_item("name").and_then(Value::as_str), Some("John"));
//! ```

pub mod alloc;
pub mod error;
pub mod merge;
pub mod minify;
pub mod mutate;
pub mod parser;
pub mod patch;
pub mod pointer;
pub mod printer;
pub mod value;

pub use error::{Error, PatchErrorCode, Result};
pub use value::{Array, Kind, Member, Number, Object, Text, Value};
