//! Decoded source documents.
//!
//! XML is parsed with `roxmltree` (which borrows its input) and then copied
//! into an owned [`XmlElement`] tree so a decoded document can outlive the
//! buffer it was read from and be handed to extractors by value.

use serde_json::Value;

use crate::model::record::{JSON_CONTENT_TYPE, XML_CONTENT_TYPE};

/// Deepest element nesting accepted from untrusted input.
pub const MAX_DEPTH: usize = 256;

/// A successfully decoded source document.
#[derive(Debug, Clone)]
pub enum Document {
    /// JSON document with its original text.
    Json { value: Value, raw: String },
    /// XML document with its original text.
    Xml { root: XmlElement, raw: String },
}

impl Document {
    /// The original serialized text.
    #[must_use]
    pub fn raw(&self) -> &str {
        match self {
            Self::Json { raw, .. } | Self::Xml { raw, .. } => raw,
        }
    }

    /// MIME type matching the serialization.
    #[must_use]
    pub const fn content_type(&self) -> &'static str {
        match self {
            Self::Json { .. } => JSON_CONTENT_TYPE,
            Self::Xml { .. } => XML_CONTENT_TYPE,
        }
    }
}

/// XML parse failure.
#[derive(Debug, Clone, thiserror::Error)]
pub enum XmlParseError {
    /// The text is not well-formed XML.
    #[error("not well-formed: {0}")]
    NotWellFormed(String),

    /// Nesting exceeds [`MAX_DEPTH`].
    #[error("element nesting deeper than {MAX_DEPTH} levels")]
    TooDeep,
}

/// An attribute on an [`XmlElement`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub namespace: Option<String>,
    pub name: String,
    pub value: String,
}

/// Owned, namespace-resolved XML element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    /// Resolved namespace URI (not the prefix).
    pub namespace: Option<String>,
    /// Local name.
    pub name: String,
    pub attributes: Vec<XmlAttribute>,
    /// Concatenated direct text children.
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Parse XML text into an owned tree.
    ///
    /// DTDs are rejected so untrusted documents cannot trigger entity expansion.
    ///
    /// # Errors
    ///
    /// Returns `NotWellFormed` for any parser error and `TooDeep` when the
    /// nesting limit is exceeded.
    pub fn parse(text: &str) -> Result<Self, XmlParseError> {
        let options = roxmltree::ParsingOptions {
            allow_dtd: false,
            ..roxmltree::ParsingOptions::default()
        };
        let doc = roxmltree::Document::parse_with_options(text, options)
            .map_err(|e| XmlParseError::NotWellFormed(e.to_string()))?;
        Self::from_node(doc.root_element(), 0)
    }

    fn from_node(node: roxmltree::Node<'_, '_>, depth: usize) -> Result<Self, XmlParseError> {
        if depth > MAX_DEPTH {
            return Err(XmlParseError::TooDeep);
        }

        let tag = node.tag_name();
        let attributes = node
            .attributes()
            .map(|a| XmlAttribute {
                namespace: a.namespace().map(str::to_string),
                name: a.name().to_string(),
                value: a.value().to_string(),
            })
            .collect();

        let mut text = String::new();
        let mut children = Vec::new();
        for child in node.children() {
            if child.is_element() {
                children.push(Self::from_node(child, depth + 1)?);
            } else if child.is_text() {
                if let Some(t) = child.text() {
                    text.push_str(t);
                }
            }
        }

        Ok(Self {
            namespace: tag.namespace().map(str::to_string),
            name: tag.name().to_string(),
            attributes,
            text,
            children,
        })
    }

    /// Whether this element has the given namespace and local name.
    #[must_use]
    pub fn is(&self, namespace: &str, name: &str) -> bool {
        self.name == name && self.namespace.as_deref() == Some(namespace)
    }

    /// First direct child with the given name.
    #[must_use]
    pub fn child(&self, namespace: &str, name: &str) -> Option<&Self> {
        self.children.iter().find(|c| c.is(namespace, name))
    }

    /// All direct children with the given name.
    pub fn children_named<'a>(
        &'a self,
        namespace: &'a str,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Self> + 'a {
        self.children.iter().filter(move |c| c.is(namespace, name))
    }

    /// All descendants (not including `self`) in document order.
    #[must_use]
    pub fn descendants(&self) -> Vec<&Self> {
        let mut out = Vec::new();
        let mut stack: Vec<&Self> = self.children.iter().rev().collect();
        while let Some(el) = stack.pop() {
            out.push(el);
            stack.extend(el.children.iter().rev());
        }
        out
    }

    /// First descendant with the given name.
    #[must_use]
    pub fn find(&self, namespace: &str, name: &str) -> Option<&Self> {
        self.descendants().into_iter().find(|e| e.is(namespace, name))
    }

    /// All descendants with the given name.
    #[must_use]
    pub fn find_all(&self, namespace: &str, name: &str) -> Vec<&Self> {
        self.descendants()
            .into_iter()
            .filter(|e| e.is(namespace, name))
            .collect()
    }

    /// Attribute value by local name (any namespace).
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Trimmed direct text, `None` when blank.
    #[must_use]
    pub fn text_trimmed(&self) -> Option<&str> {
        let t = self.text.trim();
        (!t.is_empty()).then_some(t)
    }

    /// All text in the subtree, whitespace-normalized and space-joined.
    #[must_use]
    pub fn all_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if let Some(t) = self.text_trimmed() {
            parts.push(t);
        }
        for el in self.descendants() {
            if let Some(t) = el.text_trimmed() {
                parts.push(t);
            }
        }
        parts
            .iter()
            .flat_map(|p| p.split_whitespace())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DC: &str = "http://purl.org/dc/elements/1.1/";

    #[test]
    fn test_parse_resolves_namespaces() {
        let root = XmlElement::parse(
            r#"<r:Record xmlns:r="urn:r" xmlns:dc="http://purl.org/dc/elements/1.1/">
                 <dc:identifier>abc</dc:identifier>
                 <dc:subject>one</dc:subject>
                 <dc:subject>two</dc:subject>
               </r:Record>"#,
        )
        .unwrap();

        assert!(root.is("urn:r", "Record"));
        assert_eq!(
            root.child(DC, "identifier").and_then(XmlElement::text_trimmed),
            Some("abc")
        );
        assert_eq!(root.children_named(DC, "subject").count(), 2);
        assert_eq!(root.all_text(), "abc one two");
    }

    #[test]
    fn test_parse_rejects_unclosed_tag() {
        let err = XmlElement::parse("<a><b></a>").unwrap_err();
        assert!(matches!(err, XmlParseError::NotWellFormed(_)));
    }

    #[test]
    fn test_parse_rejects_dtd() {
        let text = r#"<?xml version="1.0"?>
<!DOCTYPE a [<!ENTITY x "boom">]>
<a>&x;</a>"#;
        assert!(XmlElement::parse(text).is_err());
    }

    #[test]
    fn test_parse_rejects_excessive_depth() {
        let depth = MAX_DEPTH + 2;
        let text = format!("{}{}", "<a>".repeat(depth), "</a>".repeat(depth));
        assert!(XmlElement::parse(&text).is_err());
        let ok = format!("{}{}", "<a>".repeat(8), "</a>".repeat(8));
        assert!(XmlElement::parse(&ok).is_ok());
    }

    #[test]
    fn test_find_in_descendants() {
        let root = XmlElement::parse(
            r#"<a xmlns="urn:x"><b><c k="v">deep</c></b><c>second</c></a>"#,
        )
        .unwrap();
        let first = root.find("urn:x", "c").unwrap();
        assert_eq!(first.text_trimmed(), Some("deep"));
        assert_eq!(first.attribute("k"), Some("v"));
        assert_eq!(root.find_all("urn:x", "c").len(), 2);
    }
}
