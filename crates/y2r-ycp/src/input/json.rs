//! JSON reader for the front end's node tree.

use crate::traits::{ReadError, Reader};
use crate::tree::RawNode;

/// Static instance of the JSON reader for registry.
pub static JSON_READER: JsonReader = JsonReader;

pub struct JsonReader;

impl Reader for JsonReader {
    fn format(&self) -> &'static str {
        "json"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["json"]
    }

    fn read_raw(&self, source: &str) -> Result<RawNode, ReadError> {
        read_json(source)
    }
}

/// Parse `{"kind", "attrs", "children"}` JSON into a raw tree.
pub fn read_json(source: &str) -> Result<RawNode, ReadError> {
    serde_json::from_str(source).map_err(|e| ReadError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields() {
        let raw = read_json(r#"{"kind": "break"}"#).unwrap();
        assert_eq!(raw, RawNode::new("break"));
    }

    #[test]
    fn test_nested() {
        let raw = read_json(
            r#"{"kind": "assign", "attrs": {"name": "i"},
                "children": [{"kind": "const", "attrs": {"type": "int", "value": "42"}}]}"#,
        )
        .unwrap();
        assert_eq!(
            raw,
            RawNode::new("assign").attr("name", "i").child(
                RawNode::new("const")
                    .attr("type", "int")
                    .attr("value", "42")
            )
        );
    }

    #[test]
    fn test_missing_kind() {
        assert!(matches!(
            read_json(r#"{"attrs": {}}"#),
            Err(ReadError::Parse(_))
        ));
    }
}
