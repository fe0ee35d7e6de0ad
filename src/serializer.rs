//! Serialization layer for documents.
//!
//! A document is always a JSON object at the top level. Anything else found on
//! disk is rejected rather than coerced.

use crate::error::{Error, ErrorCode, Result};
use crate::value::Document;
use serde_json::Value;

/// JSON encoder/decoder for whole documents. Pretty (2-space indent) by
/// default.
#[derive(Debug, Clone)]
pub struct JsonSerializer {
    pretty: bool,
}

impl Default for JsonSerializer {
    fn default() -> Self {
        Self::pretty()
    }
}

impl JsonSerializer {
    /// Pretty-printed JSON with 2-space indentation.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    /// Compact JSON (single line, no extra whitespace).
    pub fn compact() -> Self {
        Self { pretty: false }
    }

    /// `true` when output is indented.
    #[must_use]
    pub fn is_pretty(&self) -> bool {
        self.pretty
    }

    /// Encode a document to bytes.
    pub fn serialize(&self, doc: &Document) -> Result<Vec<u8>> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(doc)
        } else {
            serde_json::to_vec(doc)
        };
        bytes.map_err(|e| Error::new(e.to_string(), ErrorCode::FileWriteError))
    }

    /// Decode bytes into a document. Malformed JSON maps to
    /// [`ErrorCode::FileReadError`], a non-object top level to
    /// [`ErrorCode::DataMustBeObject`].
    pub fn deserialize(&self, bytes: &[u8]) -> Result<Document> {
        match serde_json::from_slice::<Value>(bytes)? {
            Value::Object(map) => Ok(map),
            other => Err(Error::new(
                format!("top-level value must be an object, found {}", kind(&other)),
                ErrorCode::DataMustBeObject,
            )),
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
