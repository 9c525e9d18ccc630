//! XML sitemap generation.

use std::path::Path;

use tracing::info;

use crate::storage::repository::{CatalogRepository, Constraint};
use crate::sync::file::atomic_write;
use crate::sync::types::SyncResult;
use crate::sync::xml::XmlDocWriter;

pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Retrieval URL for one record on the catalog endpoint `base_url`.
///
/// The identifier is percent-encoded so `&`, `#` and spaces stay part of
/// the `id` value.
#[must_use]
pub fn record_url(base_url: &str, identifier: &str) -> String {
    format!(
        "{base_url}?service=CSW&version=2.0.2&request=GetRepositoryItem&id={}",
        urlencoding::encode(identifier)
    )
}

/// Build a sitemap listing every record in `repo`.
///
/// # Errors
///
/// Returns an error if the records cannot be queried or serialized.
pub fn build_sitemap<R: CatalogRepository>(repo: &R, base_url: &str) -> SyncResult<(usize, String)> {
    let (count, records) = repo.query(&Constraint::All, None)?;

    let schema_location = format!("{SITEMAP_NAMESPACE} {SITEMAP_NAMESPACE}/sitemap.xsd");
    let mut w = XmlDocWriter::new()?;
    w.start(
        "urlset",
        &[
            ("xmlns", SITEMAP_NAMESPACE),
            ("xmlns:xsi", XSI_NAMESPACE),
            ("xsi:schemaLocation", &schema_location),
        ],
    )?;
    for record in &records {
        w.start("url", &[])?;
        w.text_element("loc", &record_url(base_url, &record.identifier))?;
        w.end("url")?;
    }
    w.end("urlset")?;

    Ok((count, w.finish()?))
}

/// Write the sitemap for `repo` to `output`, atomically.
///
/// # Errors
///
/// Returns an error if the sitemap cannot be built or written.
pub fn write_sitemap<R: CatalogRepository>(repo: &R, base_url: &str, output: &Path) -> SyncResult<usize> {
    let (count, document) = build_sitemap(repo, base_url)?;
    atomic_write(output, document.as_bytes())?;
    info!(records = count, "Wrote sitemap to {}", output.display());
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MetadataSource, Record, XmlElement};
    use crate::storage::sqlite::SqliteCatalog;
    use tempfile::TempDir;

    fn catalog_with(ids: &[&str]) -> SqliteCatalog {
        let mut catalog = SqliteCatalog::open_memory().unwrap();
        for id in ids {
            let record = Record::new(*id, "csw:Record", "urn:test", "<r/>", "application/xml");
            catalog
                .insert(&record, &MetadataSource::Local, "2024-01-01T00:00:00Z")
                .unwrap();
        }
        catalog
    }

    #[test]
    fn test_sitemap_lists_every_record() {
        let catalog = catalog_with(&["b", "a&b"]);
        let (count, text) = build_sitemap(&catalog, "https://example.org/csw").unwrap();
        assert_eq!(count, 2);

        let root = XmlElement::parse(&text).unwrap();
        assert!(root.is(SITEMAP_NAMESPACE, "urlset"));
        let locs: Vec<_> = root
            .find_all(SITEMAP_NAMESPACE, "loc")
            .into_iter()
            .map(|l| l.text.clone())
            .collect();
        assert_eq!(
            locs,
            vec![
                record_url("https://example.org/csw", "a&b"),
                record_url("https://example.org/csw", "b"),
            ]
        );
        assert!(root
            .attribute("schemaLocation")
            .unwrap()
            .ends_with("sitemap/0.9/sitemap.xsd"));
    }

    #[test]
    fn test_record_url_encodes_identifier() {
        assert_eq!(
            record_url("http://localhost/csw", "rec-1"),
            "http://localhost/csw?service=CSW&version=2.0.2&request=GetRepositoryItem&id=rec-1"
        );
        assert_eq!(
            record_url("http://localhost/csw", "a&b #1"),
            "http://localhost/csw?service=CSW&version=2.0.2&request=GetRepositoryItem&id=a%26b%20%231"
        );
    }

    #[test]
    fn test_write_sitemap_empty_catalog() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("sitemap.xml");
        let count = write_sitemap(&catalog_with(&[]), "http://localhost/csw", &output).unwrap();
        assert_eq!(count, 0);

        let root = XmlElement::parse(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert!(root.children.is_empty());
    }
}
