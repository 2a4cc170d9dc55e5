//! Literals, operators and indexing.

use super::variables::compile_variable;
use super::{Result, compile_expr, ruby_call};
use crate::context::Context;
use crate::error::invalid;
use y2r_ruby::{BinaryOp as RBinaryOp, Node as RNode, UnaryOp as RUnaryOp};
use y2r_ycp::{
    Binary, BinaryOp, Bracket, Compare, CompareOp, Const, ConstType, Index, Is, MapEntry, Node,
    Propagate, Ternary, Unary, UnaryOp,
};

pub(crate) fn compile_const(constant: &Const) -> Result<RNode> {
    let value = match (constant.ty, constant.value.as_deref()) {
        (ConstType::Void, _) => return Ok(RNode::nil()),
        (_, Some(value)) => value,
        (ty, None) => return Err(invalid(format!("{ty:?} constant without a value"))),
    };

    match constant.ty {
        ConstType::Void => Ok(RNode::nil()),
        ConstType::Bool => match value {
            "true" => Ok(RNode::bool(true)),
            "false" => Ok(RNode::bool(false)),
            other => Err(invalid(format!("malformed boolean constant `{other}`"))),
        },
        ConstType::Int => value
            .parse::<i64>()
            .map(RNode::int)
            .map_err(|_| invalid(format!("malformed integer constant `{value}`"))),
        ConstType::Float => match value.parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(RNode::float(f)),
            _ => Err(invalid(format!("malformed float constant `{value}`"))),
        },
        ConstType::Symbol => Ok(RNode::symbol(value)),
        ConstType::String => Ok(RNode::string(value)),
        ConstType::Path => Ok(RNode::call(None, "path", vec![RNode::string(value)])),
    }
}

/// `_("text")`, looked up in the current text domain at runtime.
pub(crate) fn compile_locale(text: &str) -> RNode {
    RNode::call(None, "_", vec![RNode::string(text)])
}

pub(crate) fn compile_map(entries: &[MapEntry], ctx: &Context) -> Result<RNode> {
    let entries = entries
        .iter()
        .map(|entry| Ok((compile_expr(&entry.key, ctx)?, compile_expr(&entry.value, ctx)?)))
        .collect::<Result<_>>()?;
    Ok(RNode::hash(entries))
}

pub(crate) fn compile_compare(compare: &Compare, ctx: &Context) -> Result<RNode> {
    let lhs = compile_expr(&compare.lhs, ctx)?;
    let rhs = compile_expr(&compare.rhs, ctx)?;
    // Ordering of mixed or nil values is defined by the runtime, not by Ruby.
    let method = match compare.op {
        CompareOp::Eq => return Ok(RNode::binary(lhs, RBinaryOp::Eq, rhs)),
        CompareOp::Ne => return Ok(RNode::binary(lhs, RBinaryOp::Ne, rhs)),
        CompareOp::Lt => "less_than",
        CompareOp::Gt => "greater_than",
        CompareOp::Le => "less_or_equal",
        CompareOp::Ge => "greater_or_equal",
    };
    Ok(ruby_call("Ops", method, vec![lhs, rhs]))
}

pub(crate) fn compile_binary(binary: &Binary, ctx: &Context) -> Result<RNode> {
    let lhs = compile_expr(&binary.lhs, ctx)?;
    let rhs = compile_expr(&binary.rhs, ctx)?;
    let method = match binary.op {
        BinaryOp::And => return Ok(RNode::binary(lhs, RBinaryOp::And, rhs)),
        BinaryOp::Or => return Ok(RNode::binary(lhs, RBinaryOp::Or, rhs)),
        BinaryOp::Add => "add",
        BinaryOp::Sub => "subtract",
        BinaryOp::Mul => "multiply",
        BinaryOp::Div => "divide",
        BinaryOp::Mod => "modulo",
        BinaryOp::BitAnd => "bitwise_and",
        BinaryOp::BitOr => "bitwise_or",
        BinaryOp::BitXor => "bitwise_xor",
        BinaryOp::Shl => "shift_left",
        BinaryOp::Shr => "shift_right",
    };
    Ok(ruby_call("Ops", method, vec![lhs, rhs]))
}

pub(crate) fn compile_unary(unary: &Unary, ctx: &Context) -> Result<RNode> {
    let operand = compile_expr(&unary.operand, ctx)?;
    let method = match unary.op {
        UnaryOp::Not => return Ok(RNode::unary(RUnaryOp::Not, operand)),
        UnaryOp::Neg => "unary_minus",
        UnaryOp::BitNot => "bitwise_not",
    };
    Ok(ruby_call("Ops", method, vec![operand]))
}

pub(crate) fn compile_ternary(ternary: &Ternary, ctx: &Context) -> Result<RNode> {
    Ok(RNode::ternary(
        compile_expr(&ternary.cond, ctx)?,
        compile_expr(&ternary.then, ctx)?,
        compile_expr(&ternary.otherwise, ctx)?,
    ))
}

pub(crate) fn compile_is(is: &Is, ctx: &Context) -> Result<RNode> {
    Ok(ruby_call(
        "Ops",
        "is",
        vec![compile_expr(&is.operand, ctx)?, RNode::string(is.ty.as_str())],
    ))
}

pub(crate) fn compile_propagate(propagate: &Propagate, ctx: &Context) -> Result<RNode> {
    Ok(ruby_call(
        "Convert",
        "convert",
        vec![
            compile_expr(&propagate.operand, ctx)?,
            RNode::hash(vec![
                (RNode::symbol("from"), RNode::string(propagate.from.as_str())),
                (RNode::symbol("to"), RNode::string(propagate.to.as_str())),
            ]),
        ],
    ))
}

/// `m["a"]:d` → `Ops.get(m, "a", d)`.
pub(crate) fn compile_index(index: &Index, ctx: &Context) -> Result<RNode> {
    Ok(ruby_call(
        "Ops",
        "get",
        vec![
            compile_expr(&index.value, ctx)?,
            compile_index_path(&index.index, ctx)?,
            compile_expr(&index.default, ctx)?,
        ],
    ))
}

/// `m["a"] = v` → `Ops.set(m, "a", v)`.
pub(crate) fn compile_bracket(bracket: &Bracket, ctx: &Context) -> Result<RNode> {
    Ok(ruby_call(
        "Ops",
        "set",
        vec![
            compile_variable(&bracket.target, ctx)?,
            compile_index_path(&bracket.index, ctx)?,
            compile_expr(&bracket.value, ctx)?,
        ],
    ))
}

/// A one-element index path is passed as the bare key.
fn compile_index_path(index: &Node, ctx: &Context) -> Result<RNode> {
    match index {
        Node::List { elements } if elements.len() == 1 => compile_expr(&elements[0], ctx),
        other => compile_expr(other, ctx),
    }
}
