//! YCP source trees.
//!
//! The YCP front end parses and type-checks `.ycp` files and serializes the
//! resulting node tree. This crate reads that serialization and lowers it to
//! a typed AST that the compiler in `y2r` consumes.
//!
//! # Architecture
//!
//! ```text
//! Serialization          Raw tree            Typed AST
//! ─────────────      ───────────────      ──────────────
//! XML   ─┐
//!        ├─> RawNode ──── lower ────> Node
//! JSON  ─┘   (tree.rs)   (lower.rs)   (ast.rs)
//! ```
//!
//! # Example
//!
//! ```
//! use y2r_ycp::{Node, reader_for_format};
//!
//! let reader = reader_for_format("xml").unwrap();
//! let node = reader.read(r#"<assign name="i"><const type="int" value="42"/></assign>"#).unwrap();
//! assert_eq!(node, Node::assign("i", Node::int(42)));
//! ```

pub mod ast;
pub mod input;
pub mod lower;
pub mod registry;
pub mod traits;
pub mod tree;

// Re-exports: AST types
pub use ast::{
    Assign, Binary, BinaryOp, Block, BlockKind, Bracket, Builtin, Call, CallCategory, CaseClause,
    Category, Closure, Compare, CompareOp, Const, ConstType, DefaultClause, FunDef, If, Include,
    Index, Is, Loop, MapEntry, Node, Propagate, Reference, Return, ReturnExpr, Switch, Symbol,
    SymbolCategory, Term, Ternary, Unary, UnaryOp, Variable,
};

// Re-exports: Traits
pub use traits::{ReadError, Reader};

// Re-exports: Registry
pub use registry::{reader_for_extension, reader_for_format, readers};

// Re-exports: Built-in readers
pub use input::{JsonReader, XmlReader, read_json, read_xml};

pub use lower::lower;
pub use tree::RawNode;
