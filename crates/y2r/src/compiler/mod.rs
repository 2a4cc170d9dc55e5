//! YCP to Ruby translation.
//!
//! One function per source node kind. Every function takes the node and the
//! [`Context`] it sits in and returns a fresh Ruby node; children that open a
//! new scope are translated in [`Context::inside`] copies.
//!
//! Statements translate to `Option<RNode>` because some of them
//! (`typedef`, skipped includes) leave nothing behind.

mod calls;
mod control_flow;
mod expressions;
mod program;
mod variables;

use crate::context::{Context, Frame};
use crate::error::{CompileError, invalid};
use y2r_ruby::Node as RNode;
use y2r_ycp::{Block, BlockKind, Node};

pub use program::translate;

type Result<T> = std::result::Result<T, CompileError>;

/// Translate a node in statement position.
pub(crate) fn compile_statement(node: &Node, ctx: &Context) -> Result<Option<RNode>> {
    let compiled = match node {
        Node::Block(block) => match block.kind {
            BlockKind::Stmt | BlockKind::Def => {
                RNode::Statements(compile_block_statements(block, &block.statements, ctx)?)
            }
            BlockKind::Unspec => calls::compile_lambda(block, ctx)?,
            BlockKind::Module | BlockKind::File => {
                return Err(invalid(format!(
                    "{} block is only valid at the top level",
                    if block.kind == BlockKind::Module { "module" } else { "file" }
                )));
            }
        },
        Node::If(if_) => control_flow::compile_if(if_, ctx)?,
        Node::While(loop_) => control_flow::compile_while(loop_, ctx)?,
        Node::Do(loop_) => control_flow::compile_do(loop_, ctx)?,
        Node::Repeat(loop_) => control_flow::compile_repeat(loop_, ctx)?,
        Node::Break => control_flow::compile_break(ctx)?,
        Node::Continue => RNode::next(None),
        Node::Return(ret) => control_flow::compile_return(ret, ctx)?,
        Node::Switch(switch) => control_flow::compile_switch(switch, ctx)?,
        Node::FunDef(def) => program::compile_fun_def(def, ctx)?,
        Node::Import { name } => program::compile_import(name),
        Node::Include(include) => return Ok(program::compile_include(include)),
        Node::Textdomain { name } => program::compile_textdomain(name),
        Node::Typedef | Node::Filename { .. } => return Ok(None),
        Node::Assign(assign) => variables::compile_assign(assign, ctx)?,
        Node::Bracket(bracket) => expressions::compile_bracket(bracket, ctx)?,
        expr => compile_expr(expr, ctx)?,
    };
    Ok(Some(compiled))
}

/// Translate a node in value position.
pub(crate) fn compile_expr(node: &Node, ctx: &Context) -> Result<RNode> {
    match node {
        Node::Const(constant) => expressions::compile_const(constant),
        Node::Locale { text } => Ok(expressions::compile_locale(text)),
        Node::List { elements } => Ok(RNode::Array(compile_exprs(elements, ctx)?)),
        Node::Map { entries } => expressions::compile_map(entries, ctx),
        Node::Variable(var) => variables::compile_variable(var, ctx),
        Node::Assign(assign) => variables::compile_assign(assign, ctx),
        Node::Bracket(bracket) => expressions::compile_bracket(bracket, ctx),
        Node::Index(index) => expressions::compile_index(index, ctx),
        Node::Call(call) => calls::compile_call(call, ctx),
        Node::Builtin(builtin) => calls::compile_builtin(builtin, ctx),
        Node::Compare(compare) => expressions::compile_compare(compare, ctx),
        Node::Binary(binary) => expressions::compile_binary(binary, ctx),
        Node::Unary(unary) => expressions::compile_unary(unary, ctx),
        Node::Ternary(ternary) => expressions::compile_ternary(ternary, ctx),
        Node::Is(is) => expressions::compile_is(is, ctx),
        Node::Propagate(propagate) => expressions::compile_propagate(propagate, ctx),
        Node::Reference(reference) => Err(invalid(format!(
            "reference to `{}` outside of a call argument",
            reference.target.name
        ))),
        Node::ReturnExpr(expr) => calls::compile_return_lambda(expr, ctx),
        Node::Term(term) => calls::compile_term(term, ctx),
        Node::Block(block) if block.kind == BlockKind::Unspec => calls::compile_lambda(block, ctx),
        other => Err(invalid(format!(
            "`{}` cannot be used as a value",
            other.kind_name()
        ))),
    }
}

pub(crate) fn compile_exprs(nodes: &[Node], ctx: &Context) -> Result<Vec<RNode>> {
    nodes.iter().map(|node| compile_expr(node, ctx)).collect()
}

/// Translate a statement list in order, splicing nested statement blocks
/// into the surrounding sequence.
pub(crate) fn compile_statements(nodes: &[Node], ctx: &Context) -> Result<Vec<Option<RNode>>> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match compile_statement(node, ctx)? {
            Some(RNode::Statements(inner)) => out.extend(inner),
            other => out.push(other),
        }
    }
    Ok(out)
}

/// Translate `statements` (all or part of `block`'s) with `block` entered.
pub(crate) fn compile_block_statements(
    block: &Block,
    statements: &[Node],
    ctx: &Context,
) -> Result<Vec<Option<RNode>>> {
    let inner = ctx.inside(Frame::Block(block));
    compile_statements(statements, &inner)
}

/// Translate a branch or loop body. A statement block is entered; any other
/// statement becomes a one-statement body.
pub(crate) fn compile_body(node: &Node, ctx: &Context) -> Result<RNode> {
    let statements = match node {
        Node::Block(block) if block.kind == BlockKind::Stmt => {
            compile_block_statements(block, &block.statements, ctx)?
        }
        other => compile_statements(std::slice::from_ref(other), ctx)?,
    };
    Ok(RNode::Statements(statements))
}

/// `Receiver.name(args)` on a constant: `Ops.add(a, b)`.
pub(crate) fn ruby_call(receiver: &str, name: &str, args: Vec<RNode>) -> RNode {
    RNode::call(Some(RNode::constant(receiver)), name, args)
}
