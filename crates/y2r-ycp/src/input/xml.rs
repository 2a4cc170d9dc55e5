//! XML reader for the front end's node tree.

use crate::traits::{ReadError, Reader};
use crate::tree::RawNode;

/// Static instance of the XML reader for registry.
pub static XML_READER: XmlReader = XmlReader;

/// Reads the XML serialization: element name is the kind, XML attributes are
/// node attributes, child elements are children. Text nodes are ignored.
pub struct XmlReader;

impl Reader for XmlReader {
    fn format(&self) -> &'static str {
        "xml"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["xml"]
    }

    fn read_raw(&self, source: &str) -> Result<RawNode, ReadError> {
        read_xml(source)
    }
}

/// Parse XML text into a raw tree. A `<ycp>` document element is unwrapped.
pub fn read_xml(source: &str) -> Result<RawNode, ReadError> {
    let doc = roxmltree::Document::parse(source).map_err(|e| ReadError::Parse(e.to_string()))?;
    let root = doc.root_element();

    if root.tag_name().name() != "ycp" {
        return Ok(convert(root));
    }

    let mut elements = root.children().filter(|n| n.is_element());
    match (elements.next(), elements.next()) {
        (Some(only), None) => Ok(convert(only)),
        (None, _) => Err(ReadError::InvalidInput("empty <ycp> document".into())),
        (Some(_), Some(_)) => Err(ReadError::InvalidInput(
            "<ycp> document must contain exactly one top-level node".into(),
        )),
    }
}

fn convert(element: roxmltree::Node) -> RawNode {
    RawNode {
        kind: element.tag_name().name().to_string(),
        attrs: element
            .attributes()
            .map(|a| (a.name().to_string(), a.value().to_string()))
            .collect(),
        children: element
            .children()
            .filter(|n| n.is_element())
            .map(convert)
            .collect(),
    }
}
