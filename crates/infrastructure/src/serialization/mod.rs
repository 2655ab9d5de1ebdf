//! JSON encoding of stored session documents.

mod json;

pub use json::*;
