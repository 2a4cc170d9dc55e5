//! Generic attributed tree as emitted by the front end.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One node of the front end's output: a kind tag, string attributes and
/// ordered children.
///
/// In JSON the node is `{"kind": "...", "attrs": {...}, "children": [...]}`
/// with `attrs` and `children` optional.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawNode {
    pub kind: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RawNode>,
}

impl RawNode {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Default::default()
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn child(mut self, child: RawNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// First child with the given kind.
    pub fn find(&self, kind: &str) -> Option<&RawNode> {
        self.children.iter().find(|c| c.kind == kind)
    }
}
