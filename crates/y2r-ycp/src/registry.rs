//! Registry of tree readers.

use crate::input::{JSON_READER, XML_READER};
use crate::traits::Reader;

static READERS: &[&dyn Reader] = &[&XML_READER, &JSON_READER];

/// Get a reader by format name.
pub fn reader_for_format(format: &str) -> Option<&'static dyn Reader> {
    READERS.iter().find(|r| r.format() == format).copied()
}

/// Get a reader by file extension.
pub fn reader_for_extension(ext: &str) -> Option<&'static dyn Reader> {
    READERS
        .iter()
        .find(|r| r.extensions().contains(&ext))
        .copied()
}

/// Get all readers.
pub fn readers() -> &'static [&'static dyn Reader] {
    READERS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Node;

    #[test]
    fn test_reader_lookup() {
        let reader = reader_for_format("xml").expect("xml reader");
        assert_eq!(reader.format(), "xml");

        let reader = reader_for_extension("json").expect("json extension");
        assert_eq!(reader.format(), "json");

        assert!(reader_for_extension("ycp").is_none());
        assert_eq!(readers().len(), 2);
    }

    #[test]
    fn test_read_through_registry() {
        let reader = reader_for_format("xml").unwrap();
        let node = reader.read("<continue/>").unwrap();
        assert_eq!(node, Node::Continue);
    }
}
