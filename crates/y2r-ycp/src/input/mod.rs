//! Input readers - decode front-end output into a raw tree.

pub mod json;
pub mod xml;

pub use json::{JSON_READER, JsonReader, read_json};
pub use xml::{XML_READER, XmlReader, read_xml};
