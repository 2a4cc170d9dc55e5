//! Whole-file translation: modules, clients and function definitions.

use super::{Result, compile_statement, compile_statements};
use crate::context::{Context, Frame};
use crate::error::{CompileError, invalid, unsupported};
use crate::options::Options;
use std::path::Path;
use tracing::debug;
use y2r_ruby::Node as RNode;
use y2r_ycp::{Block, BlockKind, FunDef, Include, Node, Symbol, SymbolCategory};

/// Translate a YCP tree into a Ruby tree.
///
/// A module or file block produces a complete [`RNode::Program`]; any other
/// node is translated as a single statement in an empty context.
pub fn translate(node: &Node, options: &Options) -> std::result::Result<RNode, CompileError> {
    let ctx = Context::new(options.export_private);
    match node {
        Node::Block(block) if block.kind == BlockKind::Module => compile_module(block, &ctx),
        Node::Block(block) if block.kind == BlockKind::File => compile_client(block, &ctx),
        other => {
            debug!(kind = other.kind_name(), "translating fragment");
            Ok(compile_statement(other, &ctx)?.unwrap_or(RNode::Statements(vec![])))
        }
    }
}

/// Top-level statements sorted by where they end up in the class.
#[derive(Default)]
struct Sections {
    textdomains: Vec<RNode>,
    main: Vec<Option<RNode>>,
    functions: Vec<RNode>,
}

fn split_sections(block: &Block, ctx: &Context) -> Result<Sections> {
    let mut sections = Sections::default();
    for statement in &block.statements {
        match statement {
            Node::Textdomain { name } => sections.textdomains.push(compile_textdomain(name)),
            Node::FunDef(def) => sections.functions.push(compile_fun_def(def, ctx)?),
            Node::Typedef | Node::Filename { .. } => {}
            other => sections
                .main
                .extend(compile_statements(std::slice::from_ref(other), ctx)?),
        }
    }
    Ok(sections)
}

/// ```ruby
/// require "yast"
///
/// module Yast
///   class MClass
///     include Yast
///     extend Exportable
///     ...
///   end
///
///   M = MClass.new
///   M.main
/// end
/// ```
fn compile_module(block: &Block, ctx: &Context) -> Result<RNode> {
    let name = block
        .name
        .as_deref()
        .ok_or_else(|| invalid("module block without a name"))?;
    let class_name = format!("{name}Class");
    let inner = ctx.inside(Frame::Block(block));
    let sections = split_sections(block, &inner)?;
    debug!(
        module = name,
        functions = sections.functions.len(),
        "translating module"
    );

    let has_main = sections.main.iter().any(Option::is_some);

    let mut body = vec![
        RNode::command(None, "include", vec![RNode::constant("Yast")]),
        RNode::command(None, "extend", vec![RNode::constant("Exportable")]),
    ];
    body.extend(sections.textdomains);
    if has_main {
        body.push(RNode::def("main", vec![], RNode::Statements(sections.main)));
    }
    body.extend(sections.functions);
    body.extend(publish_calls(&block.symbols, ctx.export_private()));

    let mut module_body = vec![
        RNode::class(class_name.as_str(), None, RNode::statements(body)),
        RNode::assign(
            RNode::constant(name),
            RNode::command(Some(RNode::constant(class_name.as_str())), "new", vec![]),
        ),
    ];
    if has_main {
        module_body.push(RNode::command(Some(RNode::constant(name)), "main", vec![]));
    }

    Ok(RNode::program(vec![
        Some(RNode::command(None, "require", vec![RNode::string("yast")])),
        Some(RNode::module("Yast", RNode::statements(module_body))),
    ]))
}

/// `publish :variable => :x, :type => "integer"` for every exported symbol.
fn publish_calls(symbols: &[Symbol], export_private: bool) -> Vec<RNode> {
    symbols
        .iter()
        .filter(|symbol| symbol.global || export_private)
        .filter_map(|symbol| {
            let kind = match symbol.category {
                SymbolCategory::Variable => "variable",
                SymbolCategory::Function => "function",
                SymbolCategory::Reference | SymbolCategory::Filename => return None,
            };
            let mut entries = vec![
                (RNode::symbol(kind), RNode::symbol(symbol.name.as_str())),
                (RNode::symbol("type"), RNode::string(symbol.ty.as_str())),
            ];
            if !symbol.global {
                entries.push((RNode::symbol("private"), RNode::bool(true)));
            }
            Some(RNode::command(None, "publish", vec![RNode::hash(entries)]))
        })
        .collect()
}

/// ```ruby
/// module Yast
///   class InstFooClient < Client
///     def main
///       ...
///       nil
///     end
///   end
/// end
///
/// Yast::InstFooClient.new.main
/// ```
fn compile_client(block: &Block, ctx: &Context) -> Result<RNode> {
    let filename = block
        .filename
        .as_deref()
        .ok_or_else(|| invalid("file block without a filename"))?;
    let class_name = client_class_name(filename)?;
    let inner = ctx.inside(Frame::Block(block));
    let sections = split_sections(block, &inner)?;
    debug!(client = %class_name, filename, "translating client");

    let mut main = sections.main;
    let returns = matches!(main.iter().flatten().last(), Some(RNode::Return { .. }));
    if !returns {
        main.push(Some(RNode::nil()));
    }

    let mut body = sections.textdomains;
    body.push(RNode::def("main", vec![], RNode::Statements(main)));
    body.extend(sections.functions);

    let class = RNode::class(
        class_name.as_str(),
        Some(RNode::constant("Client")),
        RNode::statements(body),
    );
    let instance = RNode::command(
        Some(RNode::scoped_constant(
            RNode::constant("Yast"),
            class_name.as_str(),
        )),
        "new",
        vec![],
    );

    Ok(RNode::program(vec![
        Some(RNode::module("Yast", RNode::statements(vec![class]))),
        Some(RNode::command(Some(instance), "main", vec![])),
    ]))
}

/// `clients/inst_foo.ycp` → `InstFooClient`. The stem must start with a
/// letter to give a Ruby constant.
fn client_class_name(filename: &str) -> Result<String> {
    let stem = Path::new(filename)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut name: String = stem
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(capitalize)
        .collect();
    if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Err(invalid(format!(
            "file name `{filename}` does not give a Ruby class name"
        )));
    }
    name.push_str("Client");
    Ok(name)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

pub(crate) fn compile_fun_def(def: &FunDef, ctx: &Context) -> Result<RNode> {
    if ctx.in_function() {
        return Err(unsupported(format!(
            "nested function definition `{}`",
            def.name
        )));
    }
    if def.body.kind != BlockKind::Def {
        return Err(invalid(format!(
            "body of function `{}` is not a def block",
            def.name
        )));
    }

    let inner = ctx.inside(Frame::Function(def));
    let args: Vec<String> = def
        .params
        .iter()
        .map(|param| inner.local_name(&param.name))
        .collect();

    // Values are copied on call in YCP; Ruby passes object references.
    let mut body: Vec<Option<RNode>> = def
        .params
        .iter()
        .zip(&args)
        .filter(|(param, _)| needs_copy(param))
        .map(|(_, arg)| {
            Some(RNode::assign(
                RNode::var(arg.as_str()),
                RNode::call(None, "deep_copy", vec![RNode::var(arg.as_str())]),
            ))
        })
        .collect();
    body.extend(compile_statements(&def.body.statements, &inner)?);

    Ok(RNode::def(def.name.as_str(), args, RNode::Statements(body)))
}

/// Immutable scalar parameters and references need no copy.
fn needs_copy(param: &Symbol) -> bool {
    if param.is_reference() {
        return false;
    }
    let ty = param.ty.trim();
    let ty = ty.strip_prefix("const ").unwrap_or(ty).trim();
    !matches!(ty, "boolean" | "integer" | "symbol")
}

pub(crate) fn compile_import(name: &str) -> RNode {
    RNode::command(
        Some(RNode::constant("Yast")),
        "import",
        vec![RNode::string(name)],
    )
}

pub(crate) fn compile_include(include: &Include) -> Option<RNode> {
    if include.skip {
        return None;
    }
    let path = match include.name.strip_suffix(".ycp") {
        Some(base) => format!("{base}.rb"),
        None => include.name.clone(),
    };
    Some(RNode::command(
        Some(RNode::constant("Yast")),
        "include",
        vec![RNode::SelfRef, RNode::string(path)],
    ))
}

pub(crate) fn compile_textdomain(name: &str) -> RNode {
    RNode::command(None, "textdomain", vec![RNode::string(name)])
}
