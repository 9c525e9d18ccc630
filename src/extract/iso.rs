//! ISO 19139 (`gmd:MD_Metadata`) records.

use serde_json::json;

use super::{join_non_empty, ExtractError};
use crate::model::record::{bbox_to_wkt, XML_CONTENT_TYPE};
use crate::model::{Record, RecordProperties, XmlElement};

pub const GMD_SCHEMA: &str = "http://www.isotc211.org/2005/gmd";
const GCO: &str = "http://www.isotc211.org/2005/gco";
const GMX: &str = "http://www.isotc211.org/2005/gmx";

pub(super) fn accepts(root: &XmlElement) -> bool {
    root.is(GMD_SCHEMA, "MD_Metadata")
}

/// Text of a `gco:CharacterString` / `gmx:Anchor` wrapper, or the element itself.
fn char_string(el: &XmlElement) -> Option<String> {
    el.child(GCO, "CharacterString")
        .or_else(|| el.child(GMX, "Anchor"))
        .and_then(XmlElement::text_trimmed)
        .or_else(|| el.text_trimmed())
        .map(str::to_string)
}

fn gco_date(el: &XmlElement) -> Option<String> {
    el.child(GCO, "DateTime")
        .or_else(|| el.child(GCO, "Date"))
        .and_then(XmlElement::text_trimmed)
        .map(str::to_string)
}

fn code_list_value(el: &XmlElement) -> Option<String> {
    el.children
        .iter()
        .find_map(|c| c.attribute("codeListValue"))
        .map(str::to_string)
}

fn decimal(parent: &XmlElement, name: &str) -> Option<f64> {
    parent
        .child(GMD_SCHEMA, name)?
        .child(GCO, "Decimal")?
        .text_trimmed()?
        .parse()
        .ok()
}

fn bounding_box(root: &XmlElement) -> Option<String> {
    let bbox = root.find(GMD_SCHEMA, "EX_GeographicBoundingBox")?;
    Some(bbox_to_wkt(
        decimal(bbox, "westBoundLongitude")?,
        decimal(bbox, "southBoundLatitude")?,
        decimal(bbox, "eastBoundLongitude")?,
        decimal(bbox, "northBoundLatitude")?,
    ))
}

fn links(root: &XmlElement) -> Option<String> {
    let links: Vec<_> = root
        .find_all(GMD_SCHEMA, "CI_OnlineResource")
        .into_iter()
        .filter_map(|res| {
            let url = res
                .child(GMD_SCHEMA, "linkage")?
                .child(GMD_SCHEMA, "URL")?
                .text_trimmed()?;
            Some(json!({
                "url": url,
                "protocol": res.child(GMD_SCHEMA, "protocol").and_then(char_string),
                "name": res.child(GMD_SCHEMA, "name").and_then(char_string),
            }))
        })
        .collect();
    (!links.is_empty()).then(|| serde_json::Value::Array(links).to_string())
}

fn contacts(root: &XmlElement) -> Option<String> {
    let contacts: Vec<_> = root
        .find_all(GMD_SCHEMA, "CI_ResponsibleParty")
        .into_iter()
        .map(|party| {
            json!({
                "organization": party.child(GMD_SCHEMA, "organisationName").and_then(char_string),
                "name": party.child(GMD_SCHEMA, "individualName").and_then(char_string),
                "role": party.child(GMD_SCHEMA, "role").and_then(code_list_value),
            })
        })
        .collect();
    (!contacts.is_empty()).then(|| serde_json::Value::Array(contacts).to_string())
}

pub(super) fn extract(root: &XmlElement, raw: &str) -> Result<Record, ExtractError> {
    let identifier = root
        .child(GMD_SCHEMA, "fileIdentifier")
        .and_then(char_string)
        .ok_or(ExtractError::MissingField {
            dialect: "gmd:MD_Metadata",
            field: "gmd:fileIdentifier",
        })?;

    let citation = root.find(GMD_SCHEMA, "CI_Citation");
    let keywords: Vec<String> = root
        .find_all(GMD_SCHEMA, "keyword")
        .into_iter()
        .filter_map(char_string)
        .collect();
    let topics: Vec<String> = root
        .find_all(GMD_SCHEMA, "MD_TopicCategoryCode")
        .into_iter()
        .filter_map(|t| t.text_trimmed().map(str::to_string))
        .collect();

    let properties = RecordProperties {
        title: citation
            .and_then(|c| c.child(GMD_SCHEMA, "title"))
            .and_then(char_string),
        abstract_text: root.find(GMD_SCHEMA, "abstract").and_then(char_string),
        keywords: join_non_empty(keywords.iter().map(String::as_str)),
        topic_category: join_non_empty(topics.iter().map(String::as_str)),
        language: root.child(GMD_SCHEMA, "language").and_then(|l| {
            char_string(l).or_else(|| code_list_value(l))
        }),
        date: citation
            .and_then(|c| c.find(GMD_SCHEMA, "CI_Date"))
            .and_then(|d| d.child(GMD_SCHEMA, "date"))
            .and_then(gco_date),
        date_modified: root.child(GMD_SCHEMA, "dateStamp").and_then(gco_date),
        resource_type: root
            .child(GMD_SCHEMA, "hierarchyLevel")
            .and_then(code_list_value)
            .or_else(|| Some("dataset".to_string())),
        format: root
            .find(GMD_SCHEMA, "MD_Format")
            .and_then(|f| f.child(GMD_SCHEMA, "name"))
            .and_then(char_string),
        organization: root
            .find(GMD_SCHEMA, "organisationName")
            .and_then(char_string),
        rights: root.find(GMD_SCHEMA, "useLimitation").and_then(char_string),
        wkt_geometry: bounding_box(root),
        links: links(root),
        contacts: contacts(root),
        anytext: Some(root.all_text()),
        ..RecordProperties::default()
    };

    Ok(
        Record::new(identifier, "gmd:MD_Metadata", GMD_SCHEMA, raw, XML_CONTENT_TYPE)
            .with_properties(properties),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<gmd:MD_Metadata xmlns:gmd="http://www.isotc211.org/2005/gmd" xmlns:gco="http://www.isotc211.org/2005/gco">
  <gmd:fileIdentifier><gco:CharacterString>iso-0001</gco:CharacterString></gmd:fileIdentifier>
  <gmd:language><gmd:LanguageCode codeList="x" codeListValue="eng"/></gmd:language>
  <gmd:hierarchyLevel><gmd:MD_ScopeCode codeList="x" codeListValue="series"/></gmd:hierarchyLevel>
  <gmd:contact>
    <gmd:CI_ResponsibleParty>
      <gmd:organisationName><gco:CharacterString>Mapping Agency</gco:CharacterString></gmd:organisationName>
      <gmd:role><gmd:CI_RoleCode codeList="x" codeListValue="pointOfContact"/></gmd:role>
    </gmd:CI_ResponsibleParty>
  </gmd:contact>
  <gmd:dateStamp><gco:DateTime>2021-03-04T10:00:00Z</gco:DateTime></gmd:dateStamp>
  <gmd:identificationInfo>
    <gmd:MD_DataIdentification>
      <gmd:citation>
        <gmd:CI_Citation>
          <gmd:title><gco:CharacterString>Coastline 1:50k</gco:CharacterString></gmd:title>
          <gmd:date><gmd:CI_Date><gmd:date><gco:Date>2020-01-01</gco:Date></gmd:date></gmd:CI_Date></gmd:date>
        </gmd:CI_Citation>
      </gmd:citation>
      <gmd:abstract><gco:CharacterString>Vector coastline.</gco:CharacterString></gmd:abstract>
      <gmd:descriptiveKeywords>
        <gmd:MD_Keywords>
          <gmd:keyword><gco:CharacterString>coast</gco:CharacterString></gmd:keyword>
          <gmd:keyword><gco:CharacterString>hydrography</gco:CharacterString></gmd:keyword>
        </gmd:MD_Keywords>
      </gmd:descriptiveKeywords>
      <gmd:topicCategory><gmd:MD_TopicCategoryCode>oceans</gmd:MD_TopicCategoryCode></gmd:topicCategory>
      <gmd:extent><gmd:EX_Extent><gmd:geographicElement><gmd:EX_GeographicBoundingBox>
        <gmd:westBoundLongitude><gco:Decimal>-10</gco:Decimal></gmd:westBoundLongitude>
        <gmd:eastBoundLongitude><gco:Decimal>2</gco:Decimal></gmd:eastBoundLongitude>
        <gmd:southBoundLatitude><gco:Decimal>49</gco:Decimal></gmd:southBoundLatitude>
        <gmd:northBoundLatitude><gco:Decimal>61</gco:Decimal></gmd:northBoundLatitude>
      </gmd:EX_GeographicBoundingBox></gmd:geographicElement></gmd:EX_Extent></gmd:extent>
    </gmd:MD_DataIdentification>
  </gmd:identificationInfo>
  <gmd:distributionInfo><gmd:MD_Distribution><gmd:transferOptions><gmd:MD_DigitalTransferOptions><gmd:onLine>
    <gmd:CI_OnlineResource>
      <gmd:linkage><gmd:URL>https://example.org/wms</gmd:URL></gmd:linkage>
      <gmd:protocol><gco:CharacterString>OGC:WMS</gco:CharacterString></gmd:protocol>
    </gmd:CI_OnlineResource>
  </gmd:onLine></gmd:MD_DigitalTransferOptions></gmd:transferOptions></gmd:MD_Distribution></gmd:distributionInfo>
</gmd:MD_Metadata>"#;

    #[test]
    fn test_extract_iso_fields() {
        let root = XmlElement::parse(SAMPLE).unwrap();
        assert!(accepts(&root));

        let record = extract(&root, SAMPLE).unwrap();
        assert_eq!(record.identifier, "iso-0001");
        assert_eq!(record.typename, "gmd:MD_Metadata");
        assert_eq!(record.schema, GMD_SCHEMA);

        let p = &record.properties;
        assert_eq!(p.title.as_deref(), Some("Coastline 1:50k"));
        assert_eq!(p.abstract_text.as_deref(), Some("Vector coastline."));
        assert_eq!(p.keywords.as_deref(), Some("coast,hydrography"));
        assert_eq!(p.topic_category.as_deref(), Some("oceans"));
        assert_eq!(p.language.as_deref(), Some("eng"));
        assert_eq!(p.resource_type.as_deref(), Some("series"));
        assert_eq!(p.date.as_deref(), Some("2020-01-01"));
        assert_eq!(p.date_modified.as_deref(), Some("2021-03-04T10:00:00Z"));
        assert_eq!(p.organization.as_deref(), Some("Mapping Agency"));
        assert_eq!(
            p.wkt_geometry.as_deref(),
            Some("POLYGON((-10 49, -10 61, 2 61, 2 49, -10 49))")
        );
        assert!(p.links.as_deref().unwrap().contains("OGC:WMS"));
        assert!(p.contacts.as_deref().unwrap().contains("pointOfContact"));
    }

    #[test]
    fn test_missing_file_identifier() {
        let text = r#"<gmd:MD_Metadata xmlns:gmd="http://www.isotc211.org/2005/gmd"/>"#;
        let root = XmlElement::parse(text).unwrap();
        assert!(matches!(
            extract(&root, text),
            Err(ExtractError::MissingField { field: "gmd:fileIdentifier", .. })
        ));
    }
}
