//! OGC API Records GeoJSON features.

use serde_json::{Map, Value};

use super::{join_non_empty, ExtractError};
use crate::model::record::{bbox_to_wkt, JSON_CONTENT_TYPE};
use crate::model::{Record, RecordProperties};

pub const OGCAPI_RECORDS_SCHEMA: &str = "http://www.opengis.net/spec/ogcapi-records-1/1.0";

fn json_type(value: &Value) -> Option<&str> {
    value.get("type").and_then(Value::as_str)
}

fn string_prop(props: &Map<String, Value>, key: &str) -> Option<String> {
    props
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Non-null property serialized back to JSON text.
fn json_prop(value: Option<&Value>) -> Option<String> {
    value.filter(|v| !v.is_null()).map(Value::to_string)
}

fn identifier(feature: &Value) -> Result<String, ExtractError> {
    match feature.get("id") {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::String(_)) | None | Some(Value::Null) => Err(ExtractError::MissingField {
            dialect: "OGC API Records",
            field: "id",
        }),
        Some(other) => Err(ExtractError::InvalidField {
            field: "id",
            message: format!("expected string or number, found {other}"),
        }),
    }
}

fn coordinate(value: &Value) -> Option<(f64, f64)> {
    let pair = value.as_array()?;
    Some((pair.first()?.as_f64()?, pair.get(1)?.as_f64()?))
}

fn geometry_wkt(geometry: &Value) -> Option<String> {
    let coords = geometry.get("coordinates")?;
    match json_type(geometry)? {
        "Point" => {
            let (x, y) = coordinate(coords)?;
            Some(format!("POINT({x} {y})"))
        }
        "Polygon" => {
            let ring = coords.as_array()?.first()?.as_array()?;
            let points: Option<Vec<String>> = ring
                .iter()
                .map(|c| coordinate(c).map(|(x, y)| format!("{x} {y}")))
                .collect();
            Some(format!("POLYGON(({}))", points?.join(", ")))
        }
        _ => None,
    }
}

/// Falls back to a top-level `bbox` array when no geometry converts.
fn bbox_wkt(feature: &Value) -> Option<String> {
    let bbox = feature.get("bbox")?.as_array()?;
    let n: Vec<f64> = bbox.iter().filter_map(Value::as_f64).collect();
    (n.len() == 4).then(|| bbox_to_wkt(n[0], n[1], n[2], n[3]))
}

fn collect_strings<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
    match value {
        Value::String(s) => out.push(s),
        Value::Array(items) => items.iter().for_each(|v| collect_strings(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_strings(v, out)),
        _ => {}
    }
}

fn keywords(props: &Map<String, Value>) -> Option<String> {
    let items = props.get("keywords")?.as_array()?;
    join_non_empty(items.iter().filter_map(Value::as_str))
}

fn extract_feature(feature: &Value, raw: String) -> Result<Record, ExtractError> {
    let identifier = identifier(feature)?;
    let empty = Map::new();
    let props = feature
        .get("properties")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    let mut text = Vec::new();
    if let Some(p) = feature.get("properties") {
        collect_strings(p, &mut text);
    }

    let wkt = feature
        .get("geometry")
        .and_then(geometry_wkt)
        .or_else(|| bbox_wkt(feature));

    let properties = RecordProperties {
        title: string_prop(props, "title"),
        abstract_text: string_prop(props, "description"),
        keywords: keywords(props),
        language: string_prop(props, "language"),
        date: string_prop(props, "created"),
        date_modified: string_prop(props, "updated"),
        resource_type: string_prop(props, "type"),
        format: string_prop(props, "formats"),
        rights: string_prop(props, "rights"),
        contacts: json_prop(props.get("contacts")),
        links: json_prop(feature.get("links")),
        wkt_geometry: wkt,
        anytext: (!text.is_empty()).then(|| text.join(" ")),
        ..RecordProperties::default()
    };

    Ok(
        Record::new(identifier, "record", OGCAPI_RECORDS_SCHEMA, raw, JSON_CONTENT_TYPE)
            .with_properties(properties),
    )
}

/// Extract records from a `Feature` or every member of a `FeatureCollection`.
///
/// A lone feature keeps the original text as its raw document; collection
/// members are re-serialized individually.
pub(super) fn extract(value: &Value, raw: &str) -> Result<Vec<Record>, ExtractError> {
    match json_type(value) {
        Some("Feature") => extract_feature(value, raw.to_string()).map(|r| vec![r]),
        Some("FeatureCollection") => {
            let features = value
                .get("features")
                .and_then(Value::as_array)
                .ok_or(ExtractError::MissingField {
                    dialect: "OGC API Records",
                    field: "features",
                })?;
            features
                .iter()
                .map(|f| {
                    let raw = serde_json::to_string(f).map_err(|e| ExtractError::InvalidField {
                        field: "features",
                        message: e.to_string(),
                    })?;
                    extract_feature(f, raw)
                })
                .collect()
        }
        other => Err(ExtractError::UnsupportedDialect {
            root: format!("json:{}", other.unwrap_or("<untyped>")),
        }),
    }
}
