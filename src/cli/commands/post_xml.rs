//! `post-xml`: send a raw request document to an endpoint.

use std::fs;
use std::path::Path;
use std::time::Duration;

use super::Output;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::model::record::XML_CONTENT_TYPE;

/// POST the document at `xml` to `url` and print the response body.
///
/// # Errors
///
/// Returns an error if the document cannot be read, the request fails, or
/// the endpoint answers with a non-2xx status.
pub fn execute(out: &Output, url: &str, xml: &Path, timeout: u64) -> Result<()> {
    if !xml.exists() {
        return Err(Error::PathNotFound {
            path: xml.to_path_buf(),
        });
    }
    let body = fs::read_to_string(xml)?;

    tracing::info!("Executing HTTP POST request {} on server {url}", xml.display());
    let client = HttpClient::new(Duration::from_secs(timeout))?;
    let response = client.post(url, body, XML_CONTENT_TYPE)?;

    if !response.is_success() {
        return Err(Error::Http(format!(
            "{url} returned HTTP {}: {}",
            response.status,
            response.body.trim()
        )));
    }

    if out.json {
        return out.emit_json(&serde_json::json!({
            "status": response.status,
            "body": response.body,
        }));
    }
    println!("{}", response.body);
    Ok(())
}
