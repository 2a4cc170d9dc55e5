//! Lowering of the raw attributed tree into the typed AST.
//!
//! This is the only place where kind tags and enumerated attribute values are
//! checked; anything unrecognized is reported as [`ReadError::InvalidInput`]
//! carrying the offending value.

use crate::ast::*;
use crate::tree::RawNode;
use crate::traits::ReadError;

type Result<T> = std::result::Result<T, ReadError>;

const CONST_TYPES: &[(&str, ConstType)] = &[
    ("void", ConstType::Void),
    ("bool", ConstType::Bool),
    ("int", ConstType::Int),
    ("float", ConstType::Float),
    ("symbol", ConstType::Symbol),
    ("string", ConstType::String),
    ("path", ConstType::Path),
];

const CATEGORIES: &[(&str, Category)] = &[
    ("variable", Category::Variable),
    ("reference", Category::Reference),
    ("function", Category::Function),
];

const CALL_CATEGORIES: &[(&str, CallCategory)] = &[
    ("function", CallCategory::Function),
    ("variable", CallCategory::Variable),
];

const SYMBOL_CATEGORIES: &[(&str, SymbolCategory)] = &[
    ("variable", SymbolCategory::Variable),
    ("reference", SymbolCategory::Reference),
    ("function", SymbolCategory::Function),
    ("filename", SymbolCategory::Filename),
];

const BLOCK_KINDS: &[(&str, BlockKind)] = &[
    ("stmt", BlockKind::Stmt),
    ("def", BlockKind::Def),
    ("unspec", BlockKind::Unspec),
    ("module", BlockKind::Module),
    ("file", BlockKind::File),
];

const COMPARE_OPS: &[(&str, CompareOp)] = &[
    ("==", CompareOp::Eq),
    ("!=", CompareOp::Ne),
    ("<", CompareOp::Lt),
    (">", CompareOp::Gt),
    ("<=", CompareOp::Le),
    (">=", CompareOp::Ge),
];

const BINARY_OPS: &[(&str, BinaryOp)] = &[
    ("+", BinaryOp::Add),
    ("-", BinaryOp::Sub),
    ("*", BinaryOp::Mul),
    ("/", BinaryOp::Div),
    ("%", BinaryOp::Mod),
    ("&", BinaryOp::BitAnd),
    ("|", BinaryOp::BitOr),
    ("^", BinaryOp::BitXor),
    ("<<", BinaryOp::Shl),
    (">>", BinaryOp::Shr),
    ("&&", BinaryOp::And),
    ("||", BinaryOp::Or),
];

const UNARY_OPS: &[(&str, UnaryOp)] = &[
    ("!", UnaryOp::Not),
    ("-", UnaryOp::Neg),
    ("~", UnaryOp::BitNot),
];

/// Wrapper kinds that group children and never stand as nodes of their own.
const WRAPPERS: &[&str] = &["symbols", "params"];

/// Lower a raw tree into the typed AST.
pub fn lower(raw: &RawNode) -> Result<Node> {
    let node = match raw.kind.as_str() {
        "const" => lower_const(raw)?,
        "locale" => Node::Locale {
            text: attr(raw, "text")?.to_string(),
        },
        "list" => Node::List {
            elements: lower_all(&raw.children)?,
        },
        "map" => Node::Map {
            entries: raw
                .children
                .iter()
                .map(lower_map_entry)
                .collect::<Result<_>>()?,
        },
        "variable" | "entry" => Node::Variable(lower_variable(raw)?),
        "assign" => {
            let (ns, name) = qualified_name(raw)?;
            let [value] = exact::<1>(raw)?;
            Node::Assign(Assign {
                ns,
                name,
                value: Box::new(lower(value)?),
            })
        }
        "bracket" => {
            let [target, index, value] = exact::<3>(raw)?;
            Node::Bracket(Bracket {
                target: lower_variable(target)?,
                index: Box::new(lower(index)?),
                value: Box::new(lower(value)?),
            })
        }
        "yebracket" => {
            let [value, index, default] = exact::<3>(raw)?;
            Node::Index(Index {
                value: Box::new(lower(value)?),
                index: Box::new(lower(index)?),
                default: Box::new(lower(default)?),
            })
        }
        "call" => {
            let (ns, name) = qualified_name(raw)?;
            Node::Call(Call {
                ns,
                name,
                category: tag(raw, "category", CALL_CATEGORIES)?,
                ty: raw.get("type").map(str::to_string),
                args: lower_all(&raw.children)?,
            })
        }
        "builtin" => lower_builtin(raw)?,
        "compare" => {
            let [lhs, rhs] = exact::<2>(raw)?;
            Node::Compare(Compare {
                op: tag(raw, "op", COMPARE_OPS)?,
                lhs: Box::new(lower(lhs)?),
                rhs: Box::new(lower(rhs)?),
            })
        }
        "yebinary" => {
            let [lhs, rhs] = exact::<2>(raw)?;
            Node::Binary(Binary {
                op: tag(raw, "op", BINARY_OPS)?,
                lhs: Box::new(lower(lhs)?),
                rhs: Box::new(lower(rhs)?),
            })
        }
        "yeunary" => {
            let [operand] = exact::<1>(raw)?;
            Node::Unary(Unary {
                op: tag(raw, "op", UNARY_OPS)?,
                operand: Box::new(lower(operand)?),
            })
        }
        "yetriple" => {
            let [cond, then, otherwise] = exact::<3>(raw)?;
            Node::Ternary(Ternary {
                cond: Box::new(lower(cond)?),
                then: Box::new(lower(then)?),
                otherwise: Box::new(lower(otherwise)?),
            })
        }
        "yeis" => {
            let [operand] = exact::<1>(raw)?;
            Node::Is(Is {
                ty: attr(raw, "type")?.to_string(),
                operand: Box::new(lower(operand)?),
            })
        }
        "yepropagate" => {
            let [operand] = exact::<1>(raw)?;
            Node::Propagate(Propagate {
                from: attr(raw, "from")?.to_string(),
                to: attr(raw, "to")?.to_string(),
                operand: Box::new(lower(operand)?),
            })
        }
        "yereference" => {
            let [target] = exact::<1>(raw)?;
            Node::Reference(Reference {
                target: lower_variable(target)?,
            })
        }
        "yereturn" => Node::ReturnExpr(lower_return_expr(raw)?),
        "yeterm" => Node::Term(Term {
            name: attr(raw, "name")?.to_string(),
            args: lower_all(&raw.children)?,
        }),
        "block" => Node::Block(lower_block(raw)?),
        "if" => Node::If(If {
            cond: Box::new(wrapped(raw, "cond")?),
            then: optional_wrapped(raw, "then")?.map(Box::new),
            otherwise: optional_wrapped(raw, "else")?.map(Box::new),
        }),
        "while" => Node::While(lower_loop(raw)?),
        "do" => Node::Do(lower_loop(raw)?),
        "repeat" => Node::Repeat(lower_loop(raw)?),
        "break" => Node::Break,
        "continue" => Node::Continue,
        "return" => {
            let value = match raw.children.as_slice() {
                [] => None,
                [value] => Some(Box::new(lower(value)?)),
                _ => return Err(child_count(raw, "at most 1")),
            };
            Node::Return(Return { value })
        }
        "switch" => lower_switch(raw)?,
        "fun_def" => lower_fun_def(raw)?,
        "import" => Node::Import {
            name: attr(raw, "name")?.to_string(),
        },
        "include" => Node::Include(Include {
            name: attr(raw, "name")?.to_string(),
            skip: flag(raw, "skip")?,
        }),
        "textdomain" => Node::Textdomain {
            name: attr(raw, "name")?.to_string(),
        },
        "typedef" => Node::Typedef,
        "filename" => Node::Filename {
            name: attr(raw, "name")?.to_string(),
        },
        other => {
            return Err(ReadError::InvalidInput(format!(
                "unknown node kind `{other}`"
            )));
        }
    };
    Ok(node)
}

fn lower_all(children: &[RawNode]) -> Result<Vec<Node>> {
    children.iter().map(lower).collect()
}

fn lower_const(raw: &RawNode) -> Result<Node> {
    let ty = tag(raw, "type", CONST_TYPES)?;
    let value = raw.get("value").map(str::to_string);
    if ty != ConstType::Void && value.is_none() {
        return Err(missing_attr(raw, "value"));
    }
    Ok(Node::Const(Const { ty, value }))
}

fn lower_map_entry(raw: &RawNode) -> Result<MapEntry> {
    if raw.kind != "element" {
        return Err(ReadError::InvalidInput(format!(
            "`map` expects `element` children, got `{}`",
            raw.kind
        )));
    }
    Ok(MapEntry {
        key: wrapped(raw, "key")?,
        value: wrapped(raw, "value")?,
    })
}

fn lower_variable(raw: &RawNode) -> Result<Variable> {
    if raw.kind != "variable" && raw.kind != "entry" {
        return Err(ReadError::InvalidInput(format!(
            "expected `variable` or `entry`, got `{}`",
            raw.kind
        )));
    }
    let (ns, name) = qualified_name(raw)?;
    let category = match raw.get("category") {
        Some(_) => tag(raw, "category", CATEGORIES)?,
        None => Category::Variable,
    };
    Ok(Variable {
        ns,
        name,
        category,
        ty: raw.get("type").map(str::to_string),
    })
}

fn lower_builtin(raw: &RawNode) -> Result<Node> {
    let mut args = Vec::new();
    let mut closure = None;

    for child in &raw.children {
        if child.kind != "callback" {
            args.push(lower(child)?);
            continue;
        }
        if closure.is_some() {
            return Err(ReadError::InvalidInput(format!(
                "builtin `{}` has more than one callback",
                attr(raw, "name")?
            )));
        }
        let [inner] = exact::<1>(child)?;
        closure = Some(Box::new(match lower(inner)? {
            Node::Block(block) if block.kind == BlockKind::Unspec => Closure::Block(block),
            Node::ReturnExpr(expr) => Closure::Return(expr),
            other => {
                return Err(ReadError::InvalidInput(format!(
                    "builtin callback must be an unspec block or yereturn, got `{}`",
                    other.kind_name()
                )));
            }
        }));
    }

    Ok(Node::Builtin(Builtin {
        name: attr(raw, "name")?.to_string(),
        args,
        closure,
    }))
}

fn lower_return_expr(raw: &RawNode) -> Result<ReturnExpr> {
    let params = symbol_list(raw, "params")?;
    let mut values = raw.children.iter().filter(|c| c.kind != "params");
    match (values.next(), values.next()) {
        (Some(value), None) => Ok(ReturnExpr {
            params,
            value: Box::new(lower(value)?),
        }),
        _ => Err(child_count(raw, "exactly 1 expression")),
    }
}

fn lower_block(raw: &RawNode) -> Result<Block> {
    let kind = tag(raw, "kind", BLOCK_KINDS)?;
    let statements = raw
        .children
        .iter()
        .filter(|c| !WRAPPERS.contains(&c.kind.as_str()))
        .map(lower)
        .collect::<Result<_>>()?;

    Ok(Block {
        kind,
        name: raw.get("name").map(str::to_string),
        filename: raw.get("filename").map(str::to_string),
        params: symbol_list(raw, "params")?,
        symbols: symbol_list(raw, "symbols")?,
        statements,
    })
}

fn lower_loop(raw: &RawNode) -> Result<Loop> {
    Ok(Loop {
        cond: Box::new(wrapped(raw, "cond")?),
        body: Box::new(wrapped(raw, "body")?),
    })
}

fn lower_switch(raw: &RawNode) -> Result<Node> {
    let mut cases = Vec::new();
    let mut default = None;

    for child in &raw.children {
        match child.kind.as_str() {
            "cond" => {}
            "case" => {
                let rest: Vec<_> = child
                    .children
                    .iter()
                    .filter(|c| c.kind != "value")
                    .cloned()
                    .collect();
                cases.push(CaseClause {
                    value: Box::new(wrapped(child, "value")?),
                    body: clause_body(&rest)?,
                });
            }
            "default" => {
                if default.is_some() {
                    return Err(ReadError::InvalidInput(
                        "switch has more than one default".into(),
                    ));
                }
                default = Some(DefaultClause {
                    body: clause_body(&child.children)?,
                });
            }
            other => {
                return Err(ReadError::InvalidInput(format!(
                    "unexpected `{other}` inside switch"
                )));
            }
        }
    }

    Ok(Node::Switch(Switch {
        cond: Box::new(wrapped(raw, "cond")?),
        cases,
        default,
    }))
}

/// A clause body is either one statement block or a plain statement list.
fn clause_body(children: &[RawNode]) -> Result<Block> {
    if let [only] = children
        && only.kind == "block"
    {
        let block = lower_block(only)?;
        if block.kind == BlockKind::Stmt {
            return Ok(block);
        }
    }
    Ok(Block {
        statements: lower_all(children)?,
        ..Block::new(BlockKind::Stmt)
    })
}

fn lower_fun_def(raw: &RawNode) -> Result<Node> {
    let name = attr(raw, "name")?.to_string();
    let body = raw
        .find("block")
        .ok_or_else(|| missing_child(raw, "block"))?;
    let body = lower_block(body)?;
    if body.kind != BlockKind::Def {
        return Err(ReadError::InvalidInput(format!(
            "body of function `{name}` must be a def block"
        )));
    }
    Ok(Node::FunDef(FunDef {
        name,
        params: symbol_list(raw, "params")?,
        body,
    }))
}

fn symbol_list(raw: &RawNode, wrapper: &str) -> Result<Vec<Symbol>> {
    match raw.find(wrapper) {
        Some(list) => list.children.iter().map(lower_symbol).collect(),
        None => Ok(Vec::new()),
    }
}

fn lower_symbol(raw: &RawNode) -> Result<Symbol> {
    if raw.kind != "symbol" {
        return Err(ReadError::InvalidInput(format!(
            "expected `symbol`, got `{}`",
            raw.kind
        )));
    }
    Ok(Symbol {
        global: flag(raw, "global")?,
        category: tag(raw, "category", SYMBOL_CATEGORIES)?,
        ty: raw.get("type").unwrap_or_default().to_string(),
        name: attr(raw, "name")?.to_string(),
    })
}

/// The `(ns, name)` pair of a node, from an explicit `ns` attribute or a
/// `ns::name` spelling of `name`.
fn qualified_name(raw: &RawNode) -> Result<(Option<String>, String)> {
    let name = attr(raw, "name")?;
    match raw.get("ns") {
        Some(ns) if !ns.is_empty() => Ok((Some(ns.to_string()), name.to_string())),
        _ => split_name(name),
    }
}

/// Split `ns::name` into its parts. More than one separator is invalid.
fn split_name(qualified: &str) -> Result<(Option<String>, String)> {
    match qualified.split_once("::") {
        None => Ok((None, qualified.to_string())),
        Some((ns, name)) if !ns.is_empty() && !name.is_empty() && !name.contains("::") => {
            Ok((Some(ns.to_string()), name.to_string()))
        }
        Some(_) => Err(ReadError::InvalidInput(format!(
            "malformed qualified name `{qualified}`"
        ))),
    }
}

fn attr<'a>(raw: &'a RawNode, name: &str) -> Result<&'a str> {
    raw.get(name).ok_or_else(|| missing_attr(raw, name))
}

fn tag<T: Copy>(raw: &RawNode, name: &str, table: &[(&str, T)]) -> Result<T> {
    let value = attr(raw, name)?;
    table
        .iter()
        .find(|(key, _)| *key == value)
        .map(|(_, v)| *v)
        .ok_or_else(|| {
            ReadError::InvalidInput(format!(
                "unrecognized {name} `{value}` on `{}` node",
                raw.kind
            ))
        })
}

fn flag(raw: &RawNode, name: &str) -> Result<bool> {
    match raw.get(name) {
        None | Some("false") | Some("0") => Ok(false),
        Some("true") | Some("1") => Ok(true),
        Some(other) => Err(ReadError::InvalidInput(format!(
            "unrecognized boolean {name} `{other}` on `{}` node",
            raw.kind
        ))),
    }
}

/// The single child of the named wrapper.
fn wrapped(raw: &RawNode, wrapper: &str) -> Result<Node> {
    optional_wrapped(raw, wrapper)?.ok_or_else(|| missing_child(raw, wrapper))
}

fn optional_wrapped(raw: &RawNode, wrapper: &str) -> Result<Option<Node>> {
    match raw.find(wrapper) {
        None => Ok(None),
        Some(w) => {
            let [inner] = exact::<1>(w)?;
            lower(inner).map(Some)
        }
    }
}

fn exact<const N: usize>(raw: &RawNode) -> Result<&[RawNode; N]> {
    raw.children
        .as_slice()
        .try_into()
        .map_err(|_| child_count(raw, &format!("exactly {N}")))
}

fn missing_attr(raw: &RawNode, name: &str) -> ReadError {
    ReadError::InvalidInput(format!("`{}` node is missing attribute `{name}`", raw.kind))
}

fn missing_child(raw: &RawNode, name: &str) -> ReadError {
    ReadError::InvalidInput(format!("`{}` node is missing `{name}`", raw.kind))
}

fn child_count(raw: &RawNode, expected: &str) -> ReadError {
    ReadError::InvalidInput(format!(
        "`{}` node expects {expected} children, got {}",
        raw.kind,
        raw.children.len()
    ))
}
