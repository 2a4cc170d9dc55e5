//! Conditionals, loops, jumps and `switch`.
//!
//! The Ruby spelling of `break` and `return` depends on what encloses them:
//!
//! | statement | innermost frame       | Ruby           |
//! |-----------|-----------------------|----------------|
//! | `break`   | loop                  | `break`        |
//! | `break`   | closure               | `raise Break`  |
//! | `break`   | `switch` clause       | unsupported    |
//! | `return`  | function, client file | `return`       |
//! | `return`  | closure               | `next`         |

use super::{Result, compile_block_statements, compile_body, compile_expr};
use crate::context::{Context, Frame, FrameKind, LoopKind};
use crate::error::unsupported;
use y2r_ruby::{Node as RNode, When};
use y2r_ycp::{BlockKind, If, Loop, Node, Return, Switch};

pub(crate) fn compile_if(if_: &If, ctx: &Context) -> Result<RNode> {
    let condition = compile_expr(&if_.cond, ctx)?;
    let then = if_.then.as_deref().filter(|then| !is_empty_block(then));

    match (then, if_.otherwise.as_deref()) {
        (None, Some(otherwise)) => Ok(RNode::unless(
            condition,
            compile_body(otherwise, ctx)?,
            None,
        )),
        (then, otherwise) => {
            let then = match then {
                Some(then) => compile_body(then, ctx)?,
                None => RNode::Statements(vec![]),
            };
            let else_ = match otherwise {
                None => None,
                // Kept bare so the writer can print `elsif`.
                Some(Node::If(nested)) => Some(compile_if(nested, ctx)?),
                Some(other) => Some(compile_body(other, ctx)?),
            };
            Ok(RNode::if_(condition, then, else_))
        }
    }
}

fn is_empty_block(node: &Node) -> bool {
    matches!(
        node,
        Node::Block(block) if block.kind == BlockKind::Stmt && block.statements.is_empty()
    )
}

pub(crate) fn compile_while(loop_: &Loop, ctx: &Context) -> Result<RNode> {
    let condition = compile_expr(&loop_.cond, ctx)?;
    let body = compile_body(&loop_.body, &ctx.inside(Frame::Loop(LoopKind::While)))?;
    Ok(RNode::while_(condition, body))
}

/// `do { ... } while (c);` → `begin ... end while c`
pub(crate) fn compile_do(loop_: &Loop, ctx: &Context) -> Result<RNode> {
    let condition = compile_expr(&loop_.cond, ctx)?;
    let body = compile_body(&loop_.body, &ctx.inside(Frame::Loop(LoopKind::Do)))?;
    Ok(RNode::while_(condition, RNode::begin(body)))
}

/// `repeat { ... } until (c);` → `begin ... end until c`
pub(crate) fn compile_repeat(loop_: &Loop, ctx: &Context) -> Result<RNode> {
    let condition = compile_expr(&loop_.cond, ctx)?;
    let body = compile_body(&loop_.body, &ctx.inside(Frame::Loop(LoopKind::Repeat)))?;
    Ok(RNode::until(condition, RNode::begin(body)))
}

/// A clause-ending `break` is stripped by [`compile_switch`]; any other
/// `break` that would leave a `switch` clause has no Ruby spelling.
pub(crate) fn compile_break(ctx: &Context) -> Result<RNode> {
    let target = ctx.innermost(&[
        FrameKind::Loop,
        FrameKind::Block(BlockKind::Unspec),
        FrameKind::Case,
    ]);
    match target {
        Some(Frame::Block(_)) => {
            let raise = RNode::command(None, "raise", vec![RNode::constant("Break")]);
            Ok(raise)
        }
        Some(Frame::Case(value)) => Err(unsupported(format!(
            "{} has a break in the middle",
            clause_label(value)
        ))),
        _ => Ok(RNode::Break),
    }
}

fn clause_label(value: Option<&Node>) -> String {
    match value {
        Some(value) => format!("case {}", value.describe()),
        None => "default".to_string(),
    }
}

pub(crate) fn compile_return(ret: &Return, ctx: &Context) -> Result<RNode> {
    let value = ret
        .value
        .as_deref()
        .map(|value| compile_expr(value, ctx))
        .transpose()?;

    let exit = ctx.innermost(&[
        FrameKind::Function,
        FrameKind::Block(BlockKind::Def),
        FrameKind::Block(BlockKind::File),
        FrameKind::Block(BlockKind::Unspec),
    ]);
    match exit {
        Some(Frame::Block(block)) if block.kind == BlockKind::Unspec => Ok(RNode::next(value)),
        _ => Ok(RNode::return_(value)),
    }
}

/// `switch` → `case`. Every case must leave the switch explicitly; Ruby
/// `when` clauses never fall through, so the exit is dropped for `break` and
/// kept for `return`.
pub(crate) fn compile_switch(switch: &Switch, ctx: &Context) -> Result<RNode> {
    let expression = compile_expr(&switch.cond, ctx)?;

    let mut whens = Vec::with_capacity(switch.cases.len());
    for case in &switch.cases {
        let statements = &case.body.statements;
        let body = match statements.split_last() {
            Some((Node::Break, rest)) => rest,
            Some((Node::Return(_), _)) => statements.as_slice(),
            _ => {
                return Err(unsupported(format!(
                    "{} does not end with break or return",
                    clause_label(Some(&*case.value))
                )));
            }
        };

        let clause = ctx.inside(Frame::Case(Some(&*case.value)));
        whens.push(When {
            values: vec![compile_expr(&case.value, ctx)?],
            body: RNode::Statements(compile_block_statements(&case.body, body, &clause)?),
        });
    }

    let else_ = match &switch.default {
        None => None,
        Some(default) => {
            let statements = &default.body.statements;
            let body = match statements.split_last() {
                Some((Node::Break, rest)) => rest,
                _ => statements.as_slice(),
            };
            if body.is_empty() {
                None
            } else {
                let clause = ctx.inside(Frame::Case(None));
                let compiled = compile_block_statements(&default.body, body, &clause)?;
                Some(Box::new(RNode::Statements(compiled)))
            }
        }
    };

    Ok(RNode::Case {
        expression: Box::new(expression),
        whens,
        else_,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CompileError;
    use crate::compiler::compile_statement;
    use y2r_ruby::RubyWriter;
    use y2r_ycp::{Block, CaseClause, DefaultClause};

    fn emit(node: &Node, ctx: &Context) -> String {
        let compiled = compile_statement(node, ctx).unwrap().unwrap();
        RubyWriter::emit(&compiled)
    }

    fn stmt_block(statements: Vec<Node>) -> Block {
        Block {
            statements,
            ..Block::new(BlockKind::Stmt)
        }
    }

    fn case(value: i64, statements: Vec<Node>) -> CaseClause {
        CaseClause {
            value: Box::new(Node::int(value)),
            body: stmt_block(statements),
        }
    }

    fn switch(cases: Vec<CaseClause>, default: Option<Vec<Node>>) -> Node {
        Node::Switch(Switch {
            cond: Box::new(Node::variable("x")),
            cases,
            default: default.map(|statements| DefaultClause {
                body: stmt_block(statements),
            }),
        })
    }

    #[test]
    fn test_break_depends_on_enclosing_frame() {
        let in_loop = Context::default().inside(Frame::Loop(LoopKind::While));
        assert_eq!(compile_break(&in_loop).unwrap(), RNode::Break);

        let closure = Block::new(BlockKind::Unspec);
        let in_closure = in_loop.inside(Frame::Block(&closure));
        assert_eq!(emit(&Node::Break, &in_closure), "raise Break\n");

        // A loop inside the closure is innermost again.
        let nested_loop = in_closure.inside(Frame::Loop(LoopKind::Repeat));
        assert_eq!(emit(&Node::Break, &nested_loop), "break\n");

        assert_eq!(emit(&Node::Break, &Context::default()), "break\n");
    }

    #[test]
    fn test_return_depends_on_enclosing_frame() {
        let ret = Node::ret(Some(Node::int(1)));
        let file = Block::file("c.ycp");
        let in_file = Context::default().inside(Frame::Block(&file));
        assert_eq!(emit(&ret, &in_file), "return 1\n");

        let closure = Block::new(BlockKind::Unspec);
        let in_closure = in_file.inside(Frame::Block(&closure));
        assert_eq!(emit(&ret, &in_closure), "next 1\n");
        assert_eq!(emit(&Node::ret(None), &in_closure), "next\n");
    }

    #[test]
    fn test_continue() {
        assert_eq!(emit(&Node::Continue, &Context::default()), "next\n");
    }

    #[test]
    fn test_if_forms() {
        let ctx = Context::default();
        let cond = || Box::new(Node::variable("c"));

        let unless = Node::If(If {
            cond: cond(),
            then: None,
            otherwise: Some(Box::new(Node::Break)),
        });
        assert_eq!(emit(&unless, &ctx), "unless c\n  break\nend\n");

        let chain = Node::If(If {
            cond: cond(),
            then: Some(Box::new(Node::Break)),
            otherwise: Some(Box::new(Node::If(If {
                cond: Box::new(Node::variable("d")),
                then: Some(Box::new(Node::Continue)),
                otherwise: None,
            }))),
        });
        assert_eq!(emit(&chain, &ctx), "if c\n  break\nelsif d\n  next\nend\n");
    }

    #[test]
    fn test_loops() {
        let ctx = Context::default();

        let loop_ = || Loop {
            cond: Box::new(Node::variable("c")),
            body: Box::new(Node::Block(stmt_block(vec![Node::Break]))),
        };

        let while_ = Node::While(loop_());
        assert_eq!(emit(&while_, &ctx), "while c\n  break\nend\n");

        let do_ = Node::Do(loop_());
        assert_eq!(emit(&do_, &ctx), "begin\n  break\nend while c\n");

        let repeat = Node::Repeat(loop_());
        assert_eq!(emit(&repeat, &ctx), "begin\n  break\nend until c\n");
    }

    #[test]
    fn test_break_inside_closure_inside_loop_body() {
        // while (c) { foreach(..., { break; }) } - the closure is innermost.
        let closure = Block::new(BlockKind::Unspec).with_statement(Node::Break);
        let builtin = Node::Builtin(y2r_ycp::Builtin {
            name: "foreach".into(),
            args: vec![Node::variable("l")],
            closure: Some(Box::new(y2r_ycp::Closure::Block(closure))),
        });
        let while_ = Node::While(Loop {
            cond: Box::new(Node::variable("c")),
            body: Box::new(builtin),
        });
        assert_eq!(
            emit(&while_, &Context::default()),
            "while c\n  Builtins.foreach(l) { raise Break }\nend\n"
        );
    }

    #[test]
    fn test_switch() {
        let node = switch(
            vec![
                case(1, vec![Node::assign("y", Node::int(10)), Node::Break]),
                case(2, vec![Node::ret(Some(Node::int(20)))]),
            ],
            Some(vec![Node::assign("y", Node::int(0)), Node::Break]),
        );
        assert_eq!(
            emit(&node, &Context::default()),
            "case x\nwhen 1\n  y = 10\nwhen 2\n  return 20\nelse\n  y = 0\nend\n"
        );
    }

    #[test]
    fn test_switch_empty_default_is_omitted() {
        let node = switch(vec![case(1, vec![Node::Break])], Some(vec![Node::Break]));
        assert_eq!(emit(&node, &Context::default()), "case x\nwhen 1\nend\n");
    }

    #[test]
    fn test_switch_fallthrough_is_unsupported() {
        let node = switch(vec![case(1, vec![Node::assign("y", Node::int(1))])], None);
        let err = compile_statement(&node, &Context::default()).unwrap_err();
        assert_eq!(
            err,
            CompileError::Unsupported("case 1 does not end with break or return".into())
        );
    }

    #[test]
    fn test_switch_dead_code_after_break_is_unsupported() {
        let node = switch(
            vec![case(1, vec![Node::Break, Node::assign("y", Node::int(1)), Node::Break])],
            None,
        );
        let err = compile_statement(&node, &Context::default()).unwrap_err();
        assert_eq!(
            err,
            CompileError::Unsupported("case 1 has a break in the middle".into())
        );
    }

    #[test]
    fn test_switch_nested_break_is_unsupported() {
        // while (c) { switch (x) { case 1: if (d) break; y = 1; break; } z = 2; }
        let early = Node::If(If {
            cond: Box::new(Node::variable("d")),
            then: Some(Box::new(Node::Break)),
            otherwise: None,
        });
        let inner = switch(
            vec![case(1, vec![early, Node::assign("y", Node::int(1)), Node::Break])],
            None,
        );
        let while_ = Node::While(Loop {
            cond: Box::new(Node::variable("c")),
            body: Box::new(Node::Block(stmt_block(vec![
                inner,
                Node::assign("z", Node::int(2)),
            ]))),
        });
        let err = compile_statement(&while_, &Context::default()).unwrap_err();
        assert_eq!(
            err,
            CompileError::Unsupported("case 1 has a break in the middle".into())
        );
    }

    #[test]
    fn test_switch_default_nested_break_is_unsupported() {
        let early = Node::If(If {
            cond: Box::new(Node::variable("d")),
            then: Some(Box::new(Node::Break)),
            otherwise: None,
        });
        let node = switch(
            vec![case(1, vec![Node::Break])],
            Some(vec![early, Node::assign("y", Node::int(1)), Node::Break]),
        );
        let err = compile_statement(&node, &Context::default()).unwrap_err();
        assert_eq!(
            err,
            CompileError::Unsupported("default has a break in the middle".into())
        );
    }

    #[test]
    fn test_switch_loop_inside_case_keeps_its_break() {
        let loop_ = Node::While(Loop {
            cond: Box::new(Node::variable("c")),
            body: Box::new(Node::Block(stmt_block(vec![Node::Break]))),
        });
        let node = switch(vec![case(1, vec![loop_, Node::Break])], None);
        assert_eq!(
            emit(&node, &Context::default()),
            "case x\nwhen 1\n  while c\n    break\n  end\nend\n"
        );
    }
}
