//! Small streaming XML writer for generated documents.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::sync::types::{SyncError, SyncResult};

/// Indented UTF-8 document writer with an XML declaration.
pub(crate) struct XmlDocWriter {
    writer: Writer<Vec<u8>>,
}

impl XmlDocWriter {
    pub(crate) fn new() -> SyncResult<Self> {
        let mut out = Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
        };
        out.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        Ok(out)
    }

    fn event(&mut self, event: Event<'_>) -> SyncResult<()> {
        self.writer
            .write_event(event)
            .map_err(|e| SyncError::XmlWrite(e.to_string()))
    }

    pub(crate) fn start(&mut self, name: &str, attributes: &[(&str, &str)]) -> SyncResult<()> {
        let start = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.event(Event::Start(start))
    }

    pub(crate) fn end(&mut self, name: &str) -> SyncResult<()> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    /// `<name>text</name>`, with `text` escaped.
    pub(crate) fn text_element(&mut self, name: &str, text: &str) -> SyncResult<()> {
        self.start(name, &[])?;
        self.event(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    pub(crate) fn finish(self) -> SyncResult<String> {
        let mut bytes = self.writer.into_inner();
        bytes.push(b'\n');
        String::from_utf8(bytes).map_err(|e| SyncError::XmlWrite(e.to_string()))
    }
}
