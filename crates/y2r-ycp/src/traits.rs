//! Traits for front-end tree readers.

use crate::ast::Node;
use crate::tree::RawNode;

/// Error that can occur when reading a front-end tree into the typed AST.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid input tree: {0}")]
    InvalidInput(String),
}

/// A reader decodes one serialization of the front end's node tree.
pub trait Reader: Send + Sync {
    /// Format identifier (e.g., "xml", "json").
    fn format(&self) -> &'static str;

    /// File extensions this reader handles (e.g., &["xml"]).
    fn extensions(&self) -> &'static [&'static str];

    /// Decode the text into the generic attributed tree.
    fn read_raw(&self, source: &str) -> Result<RawNode, ReadError>;

    /// Decode the text and lower it into the typed AST.
    fn read(&self, source: &str) -> Result<Node, ReadError> {
        crate::lower::lower(&self.read_raw(source)?)
    }
}
