//! Function calls, builtins, closures and UI terms.

use super::variables::{assignment_target, name_node, value_node};
use super::{Result, compile_expr, compile_exprs, compile_statements};
use crate::context::{Context, Frame, escape};
use crate::error::invalid;
use y2r_ruby::Node as RNode;
use y2r_ycp::{Block, Builtin, Call, CallCategory, Closure, Node, ReturnExpr, Term};

/// UI widget and option terms that have a same-named helper method.
const UI_TERMS: &[&str] = &[
    "BarGraph", "Bottom", "BusyIndicator", "ButtonBox", "Cell", "CheckBox", "CheckBoxFrame",
    "ColoredLabel", "ComboBox", "DateField", "DownloadProgress", "DumbTab", "Empty", "Frame",
    "HBox", "HCenter", "HSpacing", "HSquash", "HStretch", "HVCenter", "HVSquash", "HVStretch",
    "HWeight", "Header", "Heading", "IconButton", "Id", "Image", "InputField", "IntField",
    "Item", "Label", "Left", "LogView", "MarginBox", "MenuButton", "MinHeight", "MinSize",
    "MinWidth", "MultiLineEdit", "MultiSelectionBox", "Opt", "PackageSelector", "Password",
    "PartitionSplitter", "ProgressBar", "PushButton", "RadioButton", "RadioButtonGroup",
    "ReplacePoint", "RichText", "Right", "SelectionBox", "Slider", "Table", "TextEntry",
    "TimeField", "Top", "Tree", "VBox", "VCenter", "VMultiProgressMeter", "VSpacing", "VSquash",
    "VStretch", "VWeight", "Wizard",
];

/// Namespace prefix of a builtin → Ruby receiver path.
const BUILTIN_NAMESPACES: &[(&str, &[&str])] = &[
    ("SCR", &["SCR"]),
    ("WFM", &["WFM"]),
    ("float", &["Builtins", "Float"]),
    ("list", &["Builtins", "List"]),
    ("multiset", &["Builtins", "Multiset"]),
];

pub(crate) fn compile_call(call: &Call, ctx: &Context) -> Result<RNode> {
    let has_references = call.args.iter().any(|a| matches!(a, Node::Reference(_)));
    if has_references {
        return compile_call_with_references(call, ctx);
    }
    let args = compile_exprs(&call.args, ctx)?;
    Ok(call_node(call, args, ctx))
}

fn call_node(call: &Call, args: Vec<RNode>, ctx: &Context) -> RNode {
    let ns = call.ns.as_deref();
    match call.category {
        CallCategory::Variable => {
            RNode::call(Some(name_node(ns, &call.name, ctx)), "call", args)
        }
        CallCategory::Function => match ns {
            Some(ns) if Some(ns) != ctx.module_name() => {
                RNode::call(Some(RNode::constant(ns)), call.name.as_str(), args)
            }
            // A local parameter holding a function shadows the method.
            _ if ns.is_none() && ctx.is_local(&call.name) => RNode::call(
                Some(RNode::var(ctx.local_name(&call.name))),
                "call",
                args,
            ),
            _ => RNode::call(None, call.name.as_str(), args),
        },
    }
}

/// `f(x)` with `x` passed by reference:
///
/// ```ruby
/// (x_ref = arg_ref(x); f_result = f(x_ref); x = x_ref.value; f_result)
/// ```
fn compile_call_with_references(call: &Call, ctx: &Context) -> Result<RNode> {
    let mut setters = Vec::new();
    let mut getters = Vec::new();
    let mut args = Vec::with_capacity(call.args.len());

    for arg in &call.args {
        let Node::Reference(reference) = arg else {
            args.push(compile_expr(arg, ctx)?);
            continue;
        };
        let target = &reference.target;
        let ns = target.ns.as_deref();
        let holder = RNode::var(escape(format!("{}_ref", target.name)));

        setters.push(RNode::assign(
            holder.clone(),
            RNode::call(None, "arg_ref", vec![value_node(ns, &target.name, ctx)]),
        ));
        getters.push(RNode::assign(
            assignment_target(ns, &target.name, ctx),
            RNode::command(Some(holder.clone()), "value", vec![]),
        ));
        args.push(holder);
    }

    let result = RNode::var(escape(format!("{}_result", call.name)));
    let mut sequence = setters;
    sequence.push(RNode::assign(result.clone(), call_node(call, args, ctx)));
    sequence.extend(getters);
    sequence.push(result);
    Ok(RNode::Expressions(sequence))
}

pub(crate) fn compile_builtin(builtin: &Builtin, ctx: &Context) -> Result<RNode> {
    let (receiver, method) = builtin_receiver(&builtin.name)?;
    let args = compile_exprs(&builtin.args, ctx)?;
    let call = RNode::call(Some(receiver), method, args);

    match builtin.closure.as_deref() {
        None => Ok(call),
        Some(Closure::Block(block)) => Ok(call.with_block(compile_as_block(block, ctx)?)),
        Some(Closure::Return(expr)) => Ok(call.with_block(compile_return_block(expr, ctx)?)),
    }
}

/// `list::reduce` → (`Builtins::List`, `reduce`).
fn builtin_receiver(name: &str) -> Result<(RNode, &str)> {
    let Some((ns, method)) = name.rsplit_once("::") else {
        return Ok((RNode::constant("Builtins"), name));
    };
    let path = BUILTIN_NAMESPACES
        .iter()
        .find(|(prefix, _)| *prefix == ns)
        .map(|(_, path)| *path)
        .ok_or_else(|| invalid(format!("unknown builtin namespace `{ns}` in `{name}`")))?;

    let mut receiver = RNode::constant(path[0]);
    for segment in &path[1..] {
        receiver = RNode::scoped_constant(receiver, *segment);
    }
    Ok((receiver, method))
}

/// Translate a closure body into a Ruby block literal.
pub(crate) fn compile_as_block(block: &Block, ctx: &Context) -> Result<RNode> {
    let inner = ctx.inside(Frame::Block(block));
    let args = block.params.iter().map(|p| inner.local_name(&p.name)).collect();
    let statements = compile_statements(&block.statements, &inner)?;
    Ok(RNode::block(args, RNode::Statements(statements)))
}

fn compile_return_block(expr: &ReturnExpr, ctx: &Context) -> Result<RNode> {
    let inner = ctx.inside(Frame::ReturnExpr(expr));
    let args = expr.params.iter().map(|p| inner.local_name(&p.name)).collect();
    let value = compile_expr(&expr.value, &inner)?;
    Ok(RNode::block(args, RNode::statements(vec![value])))
}

/// A closure used as a value: `lambda { |x| ... }`.
pub(crate) fn compile_lambda(block: &Block, ctx: &Context) -> Result<RNode> {
    Ok(RNode::command(None, "lambda", vec![]).with_block(compile_as_block(block, ctx)?))
}

pub(crate) fn compile_return_lambda(expr: &ReturnExpr, ctx: &Context) -> Result<RNode> {
    Ok(RNode::command(None, "lambda", vec![]).with_block(compile_return_block(expr, ctx)?))
}

pub(crate) fn compile_term(term: &Term, ctx: &Context) -> Result<RNode> {
    let args = compile_exprs(&term.args, ctx)?;
    let shadowed = ctx.lookup(&term.name).is_some();
    if UI_TERMS.contains(&term.name.as_str()) && !shadowed {
        return Ok(RNode::call(None, term.name.as_str(), args));
    }
    let mut all = Vec::with_capacity(args.len() + 1);
    all.push(RNode::symbol(term.name.as_str()));
    all.extend(args);
    Ok(RNode::call(None, "term", all))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CompileError;
    use y2r_ruby::RubyWriter;
    use y2r_ycp::{BlockKind, FunDef, Reference, Symbol, SymbolCategory, Variable};

    fn emit(node: &Node, ctx: &Context) -> String {
        let compiled = compile_expr(node, ctx).unwrap();
        RubyWriter::emit(&compiled).trim_end().to_string()
    }

    fn call(ns: Option<&str>, name: &str, args: Vec<Node>) -> Node {
        Node::Call(Call {
            ns: ns.map(str::to_string),
            name: name.into(),
            category: CallCategory::Function,
            ty: None,
            args,
        })
    }

    #[test]
    fn test_calls() {
        let module = Block::module("M");
        let ctx = Context::default().inside(Frame::Block(&module));

        assert_eq!(emit(&call(None, "f", vec![Node::int(1)]), &ctx), "f(1)");
        assert_eq!(emit(&call(Some("M"), "f", vec![]), &ctx), "f()");
        assert_eq!(
            emit(&call(Some("Popup"), "Message", vec![Node::string("hi")]), &ctx),
            "Popup.Message(\"hi\")"
        );
    }

    #[test]
    fn test_variable_call() {
        let block = Block::new(BlockKind::Unspec)
            .with_param(Symbol::local("handler", "boolean (string)"));
        let ctx = Context::default().inside(Frame::Block(&block));
        let node = Node::Call(Call {
            ns: None,
            name: "handler".into(),
            category: CallCategory::Variable,
            ty: None,
            args: vec![Node::string("x")],
        });
        assert_eq!(emit(&node, &ctx), "handler.call(\"x\")");
    }

    #[test]
    fn test_reference_arguments() {
        let node = call(
            None,
            "f",
            vec![
                Node::Reference(Reference {
                    target: Variable::new("x"),
                }),
                Node::int(1),
            ],
        );
        assert_eq!(
            emit(&node, &Context::default()),
            "(x_ref = arg_ref(x); f_result = f(x_ref, 1); x = x_ref.value; f_result)"
        );
    }

    #[test]
    fn test_reference_parameter_passed_on_by_reference() {
        let def = FunDef {
            name: "g".into(),
            params: vec![Symbol::new("n", "integer &", SymbolCategory::Reference, false)],
            body: Block::new(BlockKind::Def),
        };
        let ctx = Context::default().inside(Frame::Function(&def));
        let node = call(
            None,
            "f",
            vec![Node::Reference(Reference {
                target: Variable::new("n"),
            })],
        );
        assert_eq!(
            emit(&node, &ctx),
            "(n_ref = arg_ref(n.value); f_result = f(n_ref); n.value = n_ref.value; f_result)"
        );
    }

    #[test]
    fn test_builtin_namespaces() {
        let ctx = Context::default();
        let size = Node::builtin("size", vec![Node::variable("l")]);
        assert_eq!(emit(&size, &ctx), "Builtins.size(l)");

        let read = Node::builtin("SCR::Read", vec![Node::variable("p")]);
        assert_eq!(emit(&read, &ctx), "SCR.Read(p)");

        let reduce = Node::builtin("list::reduce", vec![]);
        assert_eq!(emit(&reduce, &ctx), "Builtins::List.reduce()");

        let bad = Node::builtin("str::size", vec![]);
        assert!(matches!(
            compile_expr(&bad, &ctx),
            Err(CompileError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_builtin_with_closure() {
        let closure = Block::new(BlockKind::Unspec)
            .with_param(Symbol::local("k", "string"))
            .with_statement(Node::builtin("y2milestone", vec![Node::variable("k")]));
        let node = Node::Builtin(Builtin {
            name: "foreach".into(),
            args: vec![Node::variable("l")],
            closure: Some(Box::new(Closure::Block(closure))),
        });
        assert_eq!(
            emit(&node, &Context::default()),
            "Builtins.foreach(l) { |k| Builtins.y2milestone(k) }"
        );
    }

    #[test]
    fn test_builtin_with_return_expression() {
        let expr = ReturnExpr {
            params: vec![Symbol::local("e", "integer")],
            value: Box::new(Node::variable("e")),
        };
        let node = Node::Builtin(Builtin {
            name: "filter".into(),
            args: vec![Node::variable("l")],
            closure: Some(Box::new(Closure::Return(expr))),
        });
        assert_eq!(
            emit(&node, &Context::default()),
            "Builtins.filter(l) { |e| e }"
        );
    }

    #[test]
    fn test_terms() {
        let ctx = Context::default();
        let term = |name: &str, args: Vec<Node>| {
            Node::Term(Term {
                name: name.into(),
                args,
            })
        };

        let vbox = term("VBox", vec![term("Label", vec![Node::string("x")])]);
        assert_eq!(emit(&vbox, &ctx), "VBox(Label(\"x\"))");
        assert_eq!(emit(&term("HBox", vec![]), &ctx), "HBox()");
        assert_eq!(emit(&term("item", vec![Node::int(1)]), &ctx), "term(:item, 1)");

        // A variable named like the term wins.
        let block = Block::new(BlockKind::Stmt).with_symbol(Symbol::local("Label", "term"));
        let shadowed = Context::default().inside(Frame::Block(&block));
        assert_eq!(emit(&term("Label", vec![]), &shadowed), "term(:Label)");
    }

    #[test]
    fn test_function_value_lambda() {
        let closure = Block::new(BlockKind::Unspec).with_statement(Node::ret(Some(Node::int(1))));
        let node = Node::Block(closure);
        assert_eq!(emit(&node, &Context::default()), "lambda { next 1 }");
    }
}
