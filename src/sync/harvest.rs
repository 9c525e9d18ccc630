//! Refresh of harvested (non-local) records.
//!
//! Every record whose provenance is a remote origin is re-requested from
//! that origin through a [`Harvester`]. The catalog endpoint performs the
//! actual fetch and update; this side only issues the requests.

use std::time::Duration;

use tracing::{debug, error, info};

use crate::http::HttpClient;
use crate::model::record::XML_CONTENT_TYPE;
use crate::model::XmlElement;
use crate::storage::repository::{CatalogRepository, Constraint};
use crate::sync::types::{HarvestFailure, HarvestReport, SyncResult};
use crate::sync::xml::XmlDocWriter;

const LEGACY_GMD_SCHEMA: &str = "http://www.isotc211.org/2005/gmd";
const CANONICAL_GMD_SCHEMA: &str = "http://www.isotc211.org/schemas/2005/gmd/";
const CSW_NAMESPACE: &str = "http://www.opengis.net/cat/csw/2.0.2";
const OWS_NAMESPACE: &str = "http://www.opengis.net/ows";

/// Schema identifier to send in a harvest request.
///
/// The legacy ISO 19139 namespace is rewritten to the schema location
/// harvest endpoints expect; everything else passes through.
#[must_use]
pub fn normalize_schema(schema: &str) -> &str {
    if schema == LEGACY_GMD_SCHEMA {
        CANONICAL_GMD_SCHEMA
    } else {
        schema
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum HarvestError {
    #[error("could not build harvest request: {0}")]
    Request(String),

    #[error("harvest request failed: {0}")]
    Transport(String),

    #[error("harvest endpoint returned HTTP {status}")]
    Status { status: u16, body: String },

    #[error("harvest endpoint returned an exception: {0}")]
    Exception(String),
}

/// Remote harvest operation.
pub trait Harvester {
    /// Ask the endpoint to harvest `source` as `schema`, returning the
    /// endpoint's response document.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the endpoint rejects it.
    fn harvest(&self, source: &str, schema: &str) -> Result<String, HarvestError>;
}

/// Harvest refresh engine.
pub struct HarvestRefresher<'a, R, H> {
    repo: &'a R,
    harvester: &'a H,
}

impl<'a, R: CatalogRepository, H: Harvester> HarvestRefresher<'a, R, H> {
    pub const fn new(repo: &'a R, harvester: &'a H) -> Self {
        Self { repo, harvester }
    }

    /// Re-request every harvested record from its origin.
    ///
    /// # Errors
    ///
    /// Returns an error only if the repository query fails; per-record
    /// harvest failures are logged and reported.
    pub fn refresh(&self) -> SyncResult<HarvestReport> {
        let (total, records) = self.repo.query(&Constraint::Harvested, None)?;
        let mut report = HarvestReport {
            total,
            ..HarvestReport::default()
        };

        if total == 0 {
            info!("No harvested records");
            return Ok(report);
        }
        info!("Refreshing {total} harvested records");

        for record in &records {
            let source = record.mdsource.as_str();
            let schema = normalize_schema(&record.schema);
            info!("Harvesting {source} (identifier = {}) ...", record.identifier);

            match self.harvester.harvest(source, schema) {
                Ok(response) => {
                    debug!(identifier = %record.identifier, "Harvest response: {response}");
                    report.refreshed.push(record.identifier.clone());
                }
                Err(err) => {
                    error!(identifier = %record.identifier, "Could not harvest {source}: {err}");
                    report.failed.push(HarvestFailure {
                        identifier: record.identifier.clone(),
                        source: source.to_string(),
                        message: err.to_string(),
                    });
                }
            }
        }

        info!(
            refreshed = report.refreshed.len(),
            failed = report.failed.len(),
            "Harvest refresh complete"
        );
        Ok(report)
    }
}

/// CSW 2.0.2 `Harvest` request document.
///
/// # Errors
///
/// Returns an error if the document cannot be serialized.
pub fn harvest_request(source: &str, schema: &str) -> Result<String, HarvestError> {
    let build = || -> SyncResult<String> {
        let mut w = XmlDocWriter::new()?;
        w.start(
            "csw:Harvest",
            &[
                ("xmlns:csw", CSW_NAMESPACE),
                ("service", "CSW"),
                ("version", "2.0.2"),
            ],
        )?;
        w.text_element("csw:Source", source)?;
        w.text_element("csw:ResourceType", schema)?;
        w.text_element("csw:ResourceFormat", XML_CONTENT_TYPE)?;
        w.end("csw:Harvest")?;
        w.finish()
    };
    build().map_err(|e| HarvestError::Request(e.to_string()))
}

/// Exception text from an `ows:ExceptionReport` response, if it is one.
fn exception_text(body: &str) -> Option<String> {
    let root = XmlElement::parse(body).ok()?;
    if root.name != "ExceptionReport" {
        return None;
    }
    let text = root
        .find(OWS_NAMESPACE, "ExceptionText")
        .map(XmlElement::all_text)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| root.all_text());
    Some(text)
}

/// [`Harvester`] that POSTs CSW `Harvest` requests to one catalog endpoint.
pub struct CswHarvestClient {
    endpoint: String,
    http: HttpClient,
}

impl CswHarvestClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> crate::error::Result<Self> {
        Ok(Self {
            endpoint: endpoint.into(),
            http: HttpClient::new(timeout)?,
        })
    }
}

impl Harvester for CswHarvestClient {
    fn harvest(&self, source: &str, schema: &str) -> Result<String, HarvestError> {
        let body = harvest_request(source, schema)?;
        let response = self
            .http
            .post(&self.endpoint, body, XML_CONTENT_TYPE)
            .map_err(|e| HarvestError::Transport(e.to_string()))?;

        if !response.is_success() {
            return Err(HarvestError::Status {
                status: response.status,
                body: response.body,
            });
        }
        if let Some(text) = exception_text(&response.body) {
            return Err(HarvestError::Exception(text));
        }
        Ok(response.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MetadataSource, Record};
    use crate::storage::sqlite::SqliteCatalog;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingHarvester {
        calls: RefCell<Vec<(String, String)>>,
        fail_source: Option<&'static str>,
    }

    impl Harvester for RecordingHarvester {
        fn harvest(&self, source: &str, schema: &str) -> Result<String, HarvestError> {
            self.calls
                .borrow_mut()
                .push((source.to_string(), schema.to_string()));
            if self.fail_source == Some(source) {
                return Err(HarvestError::Transport("connection refused".into()));
            }
            Ok("<ok/>".to_string())
        }
    }

    fn insert(catalog: &mut SqliteCatalog, id: &str, schema: &str, source: MetadataSource) {
        let record = Record::new(id, "csw:Record", schema, "<r/>", XML_CONTENT_TYPE);
        catalog
            .insert(&record, &source, "2024-01-01T00:00:00Z")
            .unwrap();
    }

    #[test]
    fn test_normalize_schema() {
        assert_eq!(normalize_schema(LEGACY_GMD_SCHEMA), CANONICAL_GMD_SCHEMA);
        assert_eq!(normalize_schema(CSW_NAMESPACE), CSW_NAMESPACE);
    }

    #[test]
    fn test_no_harvested_records_makes_no_calls() {
        let mut catalog = SqliteCatalog::open_memory().unwrap();
        insert(&mut catalog, "local-1", CSW_NAMESPACE, MetadataSource::Local);
        let harvester = RecordingHarvester::default();

        let report = HarvestRefresher::new(&catalog, &harvester).refresh().unwrap();
        assert!(report.is_noop());
        assert!(harvester.calls.borrow().is_empty());
    }

    #[test]
    fn test_refresh_continues_after_failure() {
        let mut catalog = SqliteCatalog::open_memory().unwrap();
        insert(
            &mut catalog,
            "a",
            LEGACY_GMD_SCHEMA,
            MetadataSource::Harvested("http://down.example/csw".into()),
        );
        insert(
            &mut catalog,
            "b",
            CSW_NAMESPACE,
            MetadataSource::Harvested("http://up.example/csw".into()),
        );
        insert(&mut catalog, "c", CSW_NAMESPACE, MetadataSource::Local);
        let harvester = RecordingHarvester {
            fail_source: Some("http://down.example/csw"),
            ..RecordingHarvester::default()
        };

        let report = HarvestRefresher::new(&catalog, &harvester).refresh().unwrap();
        assert_eq!(report.total, 2);
        assert_eq!(report.refreshed, vec!["b".to_string()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].identifier, "a");

        let calls = harvester.calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[0],
            ("http://down.example/csw".to_string(), CANONICAL_GMD_SCHEMA.to_string())
        );
    }

    #[test]
    fn test_harvest_request_document() {
        let text = harvest_request("http://src.example/csw?a=1&b=2", CSW_NAMESPACE).unwrap();
        let root = XmlElement::parse(&text).unwrap();
        assert!(root.is(CSW_NAMESPACE, "Harvest"));
        assert_eq!(root.attribute("service"), Some("CSW"));
        assert_eq!(
            root.child(CSW_NAMESPACE, "Source").unwrap().text,
            "http://src.example/csw?a=1&b=2"
        );
        assert_eq!(
            root.child(CSW_NAMESPACE, "ResourceType").unwrap().text,
            CSW_NAMESPACE
        );
    }

    #[test]
    fn test_exception_report_detection() {
        let body = r#"<ows:ExceptionReport xmlns:ows="http://www.opengis.net/ows" version="1.0.0">
  <ows:Exception exceptionCode="NoApplicableCode"><ows:ExceptionText>Harvest failed</ows:ExceptionText></ows:Exception>
</ows:ExceptionReport>"#;
        assert_eq!(exception_text(body).as_deref(), Some("Harvest failed"));
        assert_eq!(exception_text("<csw:HarvestResponse xmlns:csw=\"urn:x\"/>"), None);
        assert_eq!(exception_text("not xml"), None);
    }
}
