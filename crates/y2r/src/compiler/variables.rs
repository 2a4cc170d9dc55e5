//! Variable references and assignments.

use super::{Result, compile_expr};
use crate::context::Context;
use crate::error::invalid;
use y2r_ruby::Node as RNode;
use y2r_ycp::{Assign, Category, Variable};

/// The Ruby node for a possibly-qualified name, read as a plain value.
pub(crate) fn name_node(ns: Option<&str>, name: &str, ctx: &Context) -> RNode {
    match ns {
        Some(ns) if Some(ns) == ctx.module_name() => RNode::var(format!("@{name}")),
        // Another module's variable is read through its accessor.
        Some(ns) => RNode::call(Some(RNode::constant(ns)), name, vec![]),
        None => RNode::var(ctx.resolve(name)),
    }
}

/// Assignment target for a possibly-qualified name.
fn target_node(ns: Option<&str>, name: &str, ctx: &Context) -> RNode {
    match ns {
        Some(ns) if Some(ns) != ctx.module_name() => {
            RNode::command(Some(RNode::constant(ns)), name, vec![])
        }
        _ => name_node(ns, name, ctx),
    }
}

pub(crate) fn compile_variable(var: &Variable, ctx: &Context) -> Result<RNode> {
    let value = name_node(var.ns.as_deref(), &var.name, ctx);
    match var.category {
        Category::Variable => Ok(value),
        Category::Reference => Ok(RNode::command(Some(value), "value", vec![])),
        Category::Function => {
            let ty = var.ty.as_deref().ok_or_else(|| {
                invalid(format!("function reference `{}` has no type", var.name))
            })?;
            Ok(RNode::call(
                None,
                "fun_ref",
                vec![function_getter(var, ctx), RNode::string(ty)],
            ))
        }
    }
}

/// `method(:f)` for a named function, the binding itself when a local holds
/// the function.
fn function_getter(var: &Variable, ctx: &Context) -> RNode {
    match var.ns.as_deref() {
        None if ctx.is_local(&var.name) => RNode::var(ctx.local_name(&var.name)),
        Some(ns) if Some(ns) != ctx.module_name() => RNode::call(
            Some(RNode::constant(ns)),
            "method",
            vec![RNode::symbol(var.name.as_str())],
        ),
        _ => RNode::call(None, "method", vec![RNode::symbol(var.name.as_str())]),
    }
}

/// `n.value` when `name` is a parameter passed by reference.
fn reference_holder_value(ns: Option<&str>, name: &str, ctx: &Context) -> Option<RNode> {
    if ns.is_none()
        && let Some(symbol) = ctx.lookup(name)
        && symbol.is_reference()
    {
        let holder = RNode::var(ctx.resolve(name));
        return Some(RNode::command(Some(holder), "value", vec![]));
    }
    None
}

/// Current value of a name, read through the holder of a by-reference
/// parameter.
pub(crate) fn value_node(ns: Option<&str>, name: &str, ctx: &Context) -> RNode {
    reference_holder_value(ns, name, ctx).unwrap_or_else(|| name_node(ns, name, ctx))
}

/// Left-hand side for writing a name. Parameters passed by reference are
/// written through their holder: `n.value = ...`.
pub(crate) fn assignment_target(ns: Option<&str>, name: &str, ctx: &Context) -> RNode {
    reference_holder_value(ns, name, ctx).unwrap_or_else(|| target_node(ns, name, ctx))
}

pub(crate) fn compile_assign(assign: &Assign, ctx: &Context) -> Result<RNode> {
    let rhs = compile_expr(&assign.value, ctx)?;
    let lhs = assignment_target(assign.ns.as_deref(), &assign.name, ctx);
    Ok(RNode::assign(lhs, rhs))
}
