//! Source document decoding.
//!
//! A file is tried as JSON first and as XML second. The result is a tagged
//! [`Decoded`] value; decoding never returns early through `?`, so the load
//! engine sees every failure as data and can skip the file.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::model::{Document, XmlElement, XmlParseError};

const UTF8_BOM: &str = "\u{feff}";

/// Why a file could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Neither valid JSON nor well-formed XML.
    #[error("document is not well-formed: {0}")]
    Malformed(String),

    /// Unreadable file, bad encoding, or a document rejected for its shape.
    #[error("could not decode document: {0}")]
    Failure(String),
}

/// Outcome of decoding one file.
#[derive(Debug, Clone)]
pub enum Decoded {
    Json { value: Value, raw: String },
    Xml { root: XmlElement, raw: String },
    Failed(DecodeError),
}

impl Decoded {
    /// Convert into a [`Document`], or the failure reason.
    ///
    /// # Errors
    ///
    /// Returns the decode error for [`Decoded::Failed`].
    pub fn into_document(self) -> Result<Document, DecodeError> {
        match self {
            Self::Json { value, raw } => Ok(Document::Json { value, raw }),
            Self::Xml { root, raw } => Ok(Document::Xml { root, raw }),
            Self::Failed(err) => Err(err),
        }
    }
}

/// Read and decode `path`.
#[must_use]
pub fn decode(path: &Path) -> Decoded {
    match fs::read(path) {
        Ok(bytes) => decode_bytes(bytes),
        Err(err) => Decoded::Failed(DecodeError::Failure(format!(
            "cannot read {}: {err}",
            path.display()
        ))),
    }
}

/// Decode raw file content.
#[must_use]
pub fn decode_bytes(bytes: Vec<u8>) -> Decoded {
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            return Decoded::Failed(DecodeError::Failure(format!("invalid UTF-8: {err}")));
        }
    };
    let raw = match text.strip_prefix(UTF8_BOM) {
        Some(stripped) => stripped.to_string(),
        None => text,
    };

    if let Ok(value) = serde_json::from_str::<Value>(&raw) {
        return Decoded::Json { value, raw };
    }

    match XmlElement::parse(&raw) {
        Ok(root) => Decoded::Xml { root, raw },
        Err(XmlParseError::NotWellFormed(msg)) => Decoded::Failed(DecodeError::Malformed(msg)),
        Err(err @ XmlParseError::TooDeep) => Decoded::Failed(DecodeError::Failure(err.to_string())),
    }
}
