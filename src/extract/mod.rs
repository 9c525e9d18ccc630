//! Record extraction.
//!
//! Turns a decoded [`Document`] into zero or more [`Record`]s. The sync
//! engine only depends on the [`RecordExtractor`] trait; [`DialectExtractor`]
//! is the built-in implementation that recognises:
//!
//! - **CSW 2.0.2** `csw:Record` / `csw:SummaryRecord` / `csw:BriefRecord`
//! - **ISO 19139** `gmd:MD_Metadata`
//! - **OGC API Records** GeoJSON `Feature` and `FeatureCollection`
//!
//! Anything else is reported as [`ExtractError::UnsupportedDialect`].

mod csw;
mod iso;
mod ogcapi;

use std::path::Path;

use crate::model::{Document, Record};

pub use csw::CSW_SCHEMA;
pub use iso::GMD_SCHEMA;
pub use ogcapi::OGCAPI_RECORDS_SCHEMA;

/// Extraction failure for one document.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExtractError {
    /// The root element / JSON type is not a known dialect.
    #[error("unsupported metadata dialect: {root}")]
    UnsupportedDialect { root: String },

    /// A field every record needs is absent or empty.
    #[error("{dialect} document is missing required field '{field}'")]
    MissingField {
        dialect: &'static str,
        field: &'static str,
    },

    /// A field is present but unusable.
    #[error("invalid value for '{field}': {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },
}

/// Per-document context passed to extractors.
#[derive(Debug, Clone, Copy)]
pub struct ExtractContext<'a> {
    /// File the document was read from.
    pub path: &'a Path,
}

/// Maps a decoded document to catalog records.
pub trait RecordExtractor {
    /// Extract every record contained in `document`.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be mapped to records.
    fn extract(
        &self,
        document: &Document,
        context: &ExtractContext<'_>,
    ) -> Result<Vec<Record>, ExtractError>;
}

/// Built-in extractor dispatching on the document's root.
#[derive(Debug, Clone, Copy, Default)]
pub struct DialectExtractor;

impl RecordExtractor for DialectExtractor {
    fn extract(
        &self,
        document: &Document,
        _context: &ExtractContext<'_>,
    ) -> Result<Vec<Record>, ExtractError> {
        match document {
            Document::Xml { root, raw } => {
                if csw::accepts(root) {
                    csw::extract(root, raw).map(|r| vec![r])
                } else if iso::accepts(root) {
                    iso::extract(root, raw).map(|r| vec![r])
                } else {
                    Err(ExtractError::UnsupportedDialect {
                        root: match &root.namespace {
                            Some(ns) => format!("{{{ns}}}{}", root.name),
                            None => root.name.clone(),
                        },
                    })
                }
            }
            Document::Json { value, raw } => ogcapi::extract(value, raw),
        }
    }
}

/// Join non-empty values with `,`, `None` when nothing is left.
fn join_non_empty<'a>(values: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let parts: Vec<&str> = values
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    (!parts.is_empty()).then(|| parts.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::XmlElement;

    fn ctx() -> ExtractContext<'static> {
        ExtractContext {
            path: Path::new("test.xml"),
        }
    }

    fn xml(text: &str) -> Document {
        Document::Xml {
            root: XmlElement::parse(text).unwrap(),
            raw: text.to_string(),
        }
    }

    #[test]
    fn test_unsupported_xml_root() {
        let err = DialectExtractor
            .extract(&xml(r#"<foo xmlns="urn:foo"/>"#), &ctx())
            .unwrap_err();
        match err {
            ExtractError::UnsupportedDialect { root } => assert_eq!(root, "{urn:foo}foo"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_dispatch_keeps_raw_document() {
        let text = r#"<csw:Record xmlns:csw="http://www.opengis.net/cat/csw/2.0.2" xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:identifier>r1</dc:identifier></csw:Record>"#;
        let records = DialectExtractor.extract(&xml(text), &ctx()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].raw_document, text);
    }

    #[test]
    fn test_join_non_empty() {
        assert_eq!(join_non_empty(["a", " ", "b "]), Some("a,b".to_string()));
        assert_eq!(join_non_empty(Vec::<&str>::new()), None);
    }
}
