//! Ruby syntax tree and writer.
//!
//! The tree covers the subset of Ruby that translated YCP code needs:
//! classes and modules, method definitions, the usual control flow, method
//! calls with block literals, and literals. [`RubyWriter`] turns it into
//! source text.
//!
//! # Example
//!
//! ```
//! use y2r_ruby::{Node, RubyWriter};
//!
//! let node = Node::assign(Node::var("i"), Node::int(42));
//! assert_eq!(RubyWriter::emit(&node), "i = 42\n");
//! ```

pub mod ast;
pub mod writer;

pub use ast::{
    BinaryOp, HashEntry, Literal, Node, RESERVED_WORDS, UnaryOp, When, is_reserved_word,
};
pub use writer::RubyWriter;
