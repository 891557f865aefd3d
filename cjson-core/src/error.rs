//! Typed error surface for the crate.
//!
//! The C original reports failures as bare booleans/null pointers plus, for
//! the parser, a thread-local "last error position". We keep the thread-local
//! (`last_parse_error_offset`) for parity, but every fallible public function
//! additionally returns a `Result` carrying the same information as a
//! field, so callers never have to consult global state to find out why an
//! operation failed.

use std::cell::Cell;

use thiserror::Error;

thread_local! {
    static LAST_PARSE_ERROR_OFFSET: Cell<Option<usize>> = Cell::new(None);
}

pub(crate) fn set_last_parse_error_offset(offset: usize) {
    LAST_PARSE_ERROR_OFFSET.with(|slot| slot.set(Some(offset)));
}

/// The byte offset of the last parse failure observed on this thread, if any.
///
/// Mirrors `cJSON_GetErrorPtr`: advisory, last-write-wins, per-thread.
pub fn last_parse_error_offset() -> Option<usize> {
    LAST_PARSE_ERROR_OFFSET.with(|slot| slot.get())
}

/// The stable RFC 6902 return codes, preserved verbatim as a typed
/// enum so a caller can still match on the exact numeric code while getting
/// `Display`/`Error` for free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PatchErrorCode {
    #[error("patches value is not an array")]
    NotAnArray = 1,
    #[error("operation is missing a valid path")]
    MissingPath = 2,
    #[error("operation has an invalid op")]
    InvalidOp = 3,
    #[error("move/copy operation is missing \"from\"")]
    MissingFrom = 4,
    #[error("\"from\" does not resolve to a value")]
    FromNotFound = 5,
    #[error("failed to duplicate the \"from\" value")]
    DuplicationFailed = 6,
    #[error("operation is missing \"value\"")]
    MissingValue = 7,
    #[error("failed to duplicate \"value\"")]
    ValueDuplicationFailed = 8,
    #[error("the parent of \"path\" does not resolve")]
    ParentNotFound = 9,
    #[error("insertion at \"path\" failed")]
    InsertionFailed = 10,
    #[error("\"path\" contains a malformed array index")]
    MalformedIndex = 11,
    #[error("reserved")]
    Reserved = 12,
    #[error("remove/replace target at \"path\" does not exist")]
    TargetNotFound = 13,
}

impl PatchErrorCode {
    /// The numeric code as specified, for callers that depend on the exact
    /// integer (e.g. shelling out to another cJSON-compatible component).
    pub fn code(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("parse error at byte offset {offset}")]
    Parse { offset: usize },

    #[error("allocator exhausted or rejected the request")]
    Alloc,

    #[error("cannot serialize an invalid value")]
    InvalidValue,

    #[error("print buffer exhausted in no-alloc mode")]
    Overflow,

    #[error("index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("no object member named {key:?}")]
    NoSuchKey { key: String },

    #[error("operand is not an array")]
    NotAnArray,

    #[error("operand is not an object")]
    NotAnObject,

    #[error("cannot mutate a reference node in place")]
    ReferenceImmutable,

    #[error("duplication recursion exceeded the circular limit ({limit})")]
    CircularLimitExceeded { limit: usize },

    #[error("invalid JSON Pointer: {0}")]
    InvalidPointer(String),

    #[error("patch operation {op_index} failed: {code}")]
    Patch {
        code: PatchErrorCode,
        op_index: usize,
    },
}

impl Error {
    pub fn patch(code: PatchErrorCode, op_index: usize) -> Self {
        tracing::debug!(?code, op_index, "patch batch aborted");
        Error::Patch { code, op_index }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
