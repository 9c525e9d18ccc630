//! Catalog record model.
//!
//! A [`Record`] is one normalized catalog entry derived from a source
//! metadata document. The core fields drive reconciliation and export;
//! everything in [`RecordProperties`] is descriptive payload that the
//! pipeline carries through without interpreting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Provenance tag stored in the `mdsource` column for self-authored records.
pub const LOCAL_SOURCE: &str = "local";

/// Content type recorded for XML documents.
pub const XML_CONTENT_TYPE: &str = "application/xml";

/// Content type recorded for JSON documents.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Where a record came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum MetadataSource {
    /// Loaded from a local file by this tool.
    Local,
    /// Harvested from a remote catalog; holds the origin URL.
    Harvested(String),
}

impl MetadataSource {
    /// Whether the record was loaded locally.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(self, Self::Local)
    }

    /// The value stored in the `mdsource` column.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Local => LOCAL_SOURCE,
            Self::Harvested(url) => url,
        }
    }
}

impl fmt::Display for MetadataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for MetadataSource {
    fn from(value: String) -> Self {
        if value == LOCAL_SOURCE {
            Self::Local
        } else {
            Self::Harvested(value)
        }
    }
}

impl From<&str> for MetadataSource {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<MetadataSource> for String {
    fn from(value: MetadataSource) -> Self {
        match value {
            MetadataSource::Local => LOCAL_SOURCE.to_string(),
            MetadataSource::Harvested(url) => url,
        }
    }
}

/// A normalized catalog record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Primary key, unique within the catalog.
    pub identifier: String,

    /// Type name of the source document (e.g. `csw:Record`).
    pub typename: String,

    /// Schema/dialect URI of the source document.
    pub schema: String,

    /// Provenance (`local` or the origin URL).
    pub mdsource: MetadataSource,

    /// Timestamp of first insertion; empty until the repository assigns it.
    #[serde(default)]
    pub insert_date: String,

    /// Original serialized document, retained verbatim.
    pub raw_document: String,

    /// MIME type of `raw_document`.
    pub content_type: String,

    /// Descriptive payload.
    #[serde(default)]
    pub properties: RecordProperties,
}

impl Record {
    /// Create a local record with empty descriptive properties.
    #[must_use]
    pub fn new(
        identifier: impl Into<String>,
        typename: impl Into<String>,
        schema: impl Into<String>,
        raw_document: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            typename: typename.into(),
            schema: schema.into(),
            mdsource: MetadataSource::Local,
            insert_date: String::new(),
            raw_document: raw_document.into(),
            content_type: content_type.into(),
            properties: RecordProperties::default(),
        }
    }

    /// Attach descriptive properties.
    #[must_use]
    pub fn with_properties(mut self, properties: RecordProperties) -> Self {
        self.properties = properties;
        self
    }

    /// Whether the raw document is JSON (otherwise XML).
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.content_type.contains("json")
    }
}

/// Optional descriptive fields.
///
/// List-valued fields are stored as comma-joined text (keywords) or JSON
/// arrays (links, contacts), matching the single wide table layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordProperties {
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    pub keywords: Option<String>,
    pub language: Option<String>,
    pub date: Option<String>,
    pub date_modified: Option<String>,
    pub resource_type: Option<String>,
    pub format: Option<String>,
    pub creator: Option<String>,
    pub publisher: Option<String>,
    pub contributor: Option<String>,
    pub organization: Option<String>,
    pub rights: Option<String>,
    pub topic_category: Option<String>,
    /// Spatial extent as WKT (EPSG:4326).
    pub wkt_geometry: Option<String>,
    /// JSON array of link objects.
    pub links: Option<String>,
    /// JSON array of contact objects.
    pub contacts: Option<String>,
    /// All text content of the document, space-joined, for full-text indexing.
    pub anytext: Option<String>,
}

/// Build a WKT polygon from a bounding box.
#[must_use]
pub fn bbox_to_wkt(minx: f64, miny: f64, maxx: f64, maxy: f64) -> String {
    format!(
        "POLYGON(({minx} {miny}, {minx} {maxy}, {maxx} {maxy}, {maxx} {miny}, {minx} {miny}))"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_source_roundtrip() {
        assert_eq!(MetadataSource::from("local"), MetadataSource::Local);
        assert_eq!(
            MetadataSource::from("https://example.org/csw"),
            MetadataSource::Harvested("https://example.org/csw".to_string())
        );
        assert_eq!(MetadataSource::Local.as_str(), "local");
        assert!(!MetadataSource::from("https://example.org/csw").is_local());
    }

    #[test]
    fn test_record_is_json() {
        let xml = Record::new("a", "csw:Record", "s", "<a/>", XML_CONTENT_TYPE);
        let json = Record::new("b", "record", "s", "{}", JSON_CONTENT_TYPE);
        assert!(!xml.is_json());
        assert!(json.is_json());
    }

    #[test]
    fn test_bbox_to_wkt() {
        let wkt = bbox_to_wkt(-10.0, 40.5, 5.0, 52.0);
        assert_eq!(
            wkt,
            "POLYGON((-10 40.5, -10 52, 5 52, 5 40.5, -10 40.5))"
        );
    }

    #[test]
    fn test_metadata_source_serde() {
        let json = serde_json::to_string(&MetadataSource::Local).unwrap();
        assert_eq!(json, "\"local\"");
        let back: MetadataSource = serde_json::from_str("\"http://x\"").unwrap();
        assert_eq!(back, MetadataSource::Harvested("http://x".into()));
    }
}
