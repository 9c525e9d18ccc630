//! CSW 2.0.2 Dublin Core records.

use serde_json::json;

use super::{join_non_empty, ExtractError};
use crate::model::record::{bbox_to_wkt, XML_CONTENT_TYPE};
use crate::model::{Record, RecordProperties, XmlElement};

pub const CSW_SCHEMA: &str = "http://www.opengis.net/cat/csw/2.0.2";
const DC: &str = "http://purl.org/dc/elements/1.1/";
const DCT: &str = "http://purl.org/dc/terms/";
const OWS: &str = "http://www.opengis.net/ows";

const ROOTS: [&str; 3] = ["Record", "SummaryRecord", "BriefRecord"];

pub(super) fn accepts(root: &XmlElement) -> bool {
    ROOTS.iter().any(|name| root.is(CSW_SCHEMA, name))
}

fn text(root: &XmlElement, ns: &str, name: &str) -> Option<String> {
    root.child(ns, name)
        .and_then(XmlElement::text_trimmed)
        .map(str::to_string)
}

fn texts(root: &XmlElement, ns: &str, name: &str) -> Option<String> {
    join_non_empty(root.children_named(ns, name).filter_map(XmlElement::text_trimmed))
}

fn parse_corner(corner: &str) -> Option<(f64, f64)> {
    let mut it = corner.split_whitespace().map(str::parse::<f64>);
    match (it.next(), it.next()) {
        (Some(Ok(a)), Some(Ok(b))) => Some((a, b)),
        _ => None,
    }
}

/// `ows:BoundingBox` as WKT. URN-style EPSG:4326 uses lat/lon axis order.
fn bounding_box(root: &XmlElement) -> Option<String> {
    let bbox = root.child(OWS, "BoundingBox")?;
    let lower = parse_corner(bbox.child(OWS, "LowerCorner")?.text_trimmed()?)?;
    let upper = parse_corner(bbox.child(OWS, "UpperCorner")?.text_trimmed()?)?;

    let lat_lon = bbox
        .attribute("crs")
        .is_some_and(|crs| crs.contains("EPSG::4326"));

    let (minx, miny, maxx, maxy) = if lat_lon {
        (lower.1, lower.0, upper.1, upper.0)
    } else {
        (lower.0, lower.1, upper.0, upper.1)
    };
    Some(bbox_to_wkt(minx, miny, maxx, maxy))
}

fn links(root: &XmlElement) -> Option<String> {
    let links: Vec<_> = root
        .children_named(DCT, "references")
        .filter_map(|r| {
            r.text_trimmed().map(|url| {
                json!({
                    "url": url,
                    "protocol": r.attribute("scheme"),
                })
            })
        })
        .collect();
    (!links.is_empty()).then(|| serde_json::Value::Array(links).to_string())
}

pub(super) fn extract(root: &XmlElement, raw: &str) -> Result<Record, ExtractError> {
    let identifier = text(root, DC, "identifier").ok_or(ExtractError::MissingField {
        dialect: "csw:Record",
        field: "dc:identifier",
    })?;

    let properties = RecordProperties {
        title: text(root, DC, "title"),
        abstract_text: text(root, DCT, "abstract").or_else(|| text(root, DC, "description")),
        keywords: texts(root, DC, "subject"),
        language: text(root, DC, "language"),
        date: text(root, DC, "date"),
        date_modified: text(root, DCT, "modified"),
        resource_type: text(root, DC, "type"),
        format: texts(root, DC, "format"),
        creator: texts(root, DC, "creator"),
        publisher: texts(root, DC, "publisher"),
        contributor: texts(root, DC, "contributor"),
        rights: texts(root, DC, "rights"),
        wkt_geometry: bounding_box(root),
        links: links(root),
        anytext: Some(root.all_text()),
        ..RecordProperties::default()
    };

    Ok(
        Record::new(identifier, "csw:Record", CSW_SCHEMA, raw, XML_CONTENT_TYPE)
            .with_properties(properties),
    )
}
