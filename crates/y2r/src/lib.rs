//! YCP to Ruby translation.
//!
//! `y2r` reads the tree the YCP front end writes for a `.ycp` file and
//! produces equivalent Ruby source built on the `yast` runtime.
//!
//! # Architecture
//!
//! ```text
//! front end          y2r-ycp              y2r                y2r-ruby
//! ─────────      ──────────────      ──────────────      ──────────────
//! XML / JSON ──> Reader ──> Node ──> translate ──> Node ──> RubyWriter ──> .rb
//!                (typed YCP AST)     (Context)     (Ruby AST)
//! ```
//!
//! # Example
//!
//! ```
//! use y2r::{Options, transpile};
//! use y2r_ycp::reader_for_format;
//!
//! let reader = reader_for_format("xml").unwrap();
//! let ruby = transpile(
//!     r#"<assign name="i"><const type="int" value="42"/></assign>"#,
//!     reader,
//!     &Options::default(),
//! )
//! .unwrap();
//! assert_eq!(ruby, "i = 42\n");
//! ```

pub mod compiler;
pub mod context;
pub mod error;
pub mod options;

pub use compiler::translate;
pub use error::{CompileError, Error};
pub use options::{CONFIG_FILE, ConfigError, Options};

pub use y2r_ruby;
pub use y2r_ycp;

use y2r_ruby::RubyWriter;
use y2r_ycp::{Node, Reader};

/// Translate a YCP tree and write the resulting Ruby source.
pub fn compile_to_string(node: &Node, options: &Options) -> Result<String, CompileError> {
    let ruby = translate(node, options)?;
    Ok(RubyWriter::emit(&ruby))
}

/// Read a serialized YCP tree, translate it and write Ruby source.
pub fn transpile(source: &str, reader: &dyn Reader, options: &Options) -> Result<String, Error> {
    let node = reader.read(source)?;
    tracing::debug!(format = reader.format(), root = node.kind_name(), "read tree");
    Ok(compile_to_string(&node, options)?)
}
