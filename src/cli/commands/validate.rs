//! `validate-xml`: check a document and its schema for well-formedness.

use std::fs;
use std::path::Path;

use super::Output;
use crate::error::{Error, Result};
use crate::model::XmlElement;

const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

fn parse_file(path: &Path) -> Result<XmlElement> {
    if !path.exists() {
        return Err(Error::PathNotFound {
            path: path.to_path_buf(),
        });
    }
    let text = fs::read_to_string(path)?;
    XmlElement::parse(text.trim_start_matches('\u{feff}'))
        .map_err(|e| Error::Xml(format!("{}: {e}", path.display())))
}

/// Check `xml` and `xsd`; both must be well-formed and `xsd` must be an
/// XML Schema document. Content is not validated against the schema.
///
/// # Errors
///
/// Returns `Xml` naming the offending file, or `PathNotFound`.
pub fn execute(out: &Output, xml: &Path, xsd: &Path) -> Result<()> {
    tracing::info!("Validating {} against schema {}", xml.display(), xsd.display());

    let schema = parse_file(xsd)?;
    if !schema.is(XSD_NAMESPACE, "schema") {
        return Err(Error::Xml(format!(
            "{}: not an XML Schema document",
            xsd.display()
        )));
    }
    parse_file(xml)?;

    if out.json {
        return out.emit_json(&serde_json::json!({ "valid": true, "xml": xml, "xsd": xsd }));
    }
    println!("Valid");
    Ok(())
}
