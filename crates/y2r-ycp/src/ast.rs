//! Typed YCP syntax tree.
//!
//! One variant per node kind the front end emits. The tree is built once by
//! [`crate::lower`] and never mutated afterwards.

use serde::Serialize;

/// Type tag of a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstType {
    Void,
    Bool,
    Int,
    Float,
    Symbol,
    String,
    Path,
}

/// A literal constant. The value is the front end's decoded text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Const {
    pub ty: ConstType,
    pub value: Option<String>,
}

/// How a variable reference is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Variable,
    Reference,
    Function,
}

/// Whether a call goes to a named function or through a variable holding a
/// function reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallCategory {
    Function,
    Variable,
}

/// What a declared symbol names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolCategory {
    Variable,
    Reference,
    Function,
    Filename,
}

/// A name declared by a block, function or closure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Symbol {
    /// True only for module/file-level declarations.
    pub global: bool,
    pub category: SymbolCategory,
    /// YCP type string, e.g. `integer`, `list <string>`, `map &`.
    pub ty: String,
    pub name: String,
}

impl Symbol {
    pub fn new(
        name: impl Into<String>,
        ty: impl Into<String>,
        category: SymbolCategory,
        global: bool,
    ) -> Self {
        Self {
            global,
            category,
            ty: ty.into(),
            name: name.into(),
        }
    }

    /// A non-global variable.
    pub fn local(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self::new(name, ty, SymbolCategory::Variable, false)
    }

    /// A global variable.
    pub fn global(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self::new(name, ty, SymbolCategory::Variable, true)
    }

    /// True if the symbol is bound by reference (`integer &`).
    pub fn is_reference(&self) -> bool {
        self.category == SymbolCategory::Reference || self.ty.trim_end().ends_with('&')
    }
}

/// A possibly-qualified variable reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    pub ns: Option<String>,
    pub name: String,
    pub category: Category,
    pub ty: Option<String>,
}

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            ns: None,
            name: name.into(),
            category: Category::Variable,
            ty: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapEntry {
    pub key: Node,
    pub value: Node,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assign {
    pub ns: Option<String>,
    pub name: String,
    pub value: Box<Node>,
}

/// Indexed write: `m[index] = value`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bracket {
    pub target: Variable,
    pub index: Box<Node>,
    pub value: Box<Node>,
}

/// Indexed read with a default: `m[index]:default`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Index {
    pub value: Box<Node>,
    pub index: Box<Node>,
    pub default: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Call {
    pub ns: Option<String>,
    pub name: String,
    pub category: CallCategory,
    pub ty: Option<String>,
    pub args: Vec<Node>,
}

/// Closure attached to a builtin call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Closure {
    Block(Block),
    Return(ReturnExpr),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Builtin {
    /// Possibly namespaced name, e.g. `foreach`, `SCR::Read`, `list::reduce`.
    pub name: String,
    pub args: Vec<Node>,
    pub closure: Option<Box<Closure>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    Not,
    Neg,
    BitNot,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Compare {
    pub op: CompareOp,
    pub lhs: Box<Node>,
    pub rhs: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Binary {
    pub op: BinaryOp,
    pub lhs: Box<Node>,
    pub rhs: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unary {
    pub op: UnaryOp,
    pub operand: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ternary {
    pub cond: Box<Node>,
    pub then: Box<Node>,
    pub otherwise: Box<Node>,
}

/// Runtime type test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Is {
    pub ty: String,
    pub operand: Box<Node>,
}

/// Implicit type conversion inserted by the front end.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Propagate {
    pub from: String,
    pub to: String,
    pub operand: Box<Node>,
}

/// By-reference argument.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reference {
    pub target: Variable,
}

/// Function-returning expression: a closure whose body is one expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnExpr {
    pub params: Vec<Symbol>,
    pub value: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Term {
    pub name: String,
    pub args: Vec<Node>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BlockKind {
    /// `{ ... }` statement block.
    Stmt,
    /// Function body.
    Def,
    /// Closure ("block expression").
    Unspec,
    /// Top level of a module file.
    Module,
    /// Top level of a client file.
    File,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub kind: BlockKind,
    /// Module name (`ModuleBlock` only).
    pub name: Option<String>,
    /// Source file name (`FileBlock` only).
    pub filename: Option<String>,
    /// Closure parameters (`UnspecBlock` only).
    pub params: Vec<Symbol>,
    pub symbols: Vec<Symbol>,
    pub statements: Vec<Node>,
}

impl Block {
    pub fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            name: None,
            filename: None,
            params: Vec::new(),
            symbols: Vec::new(),
            statements: Vec::new(),
        }
    }

    pub fn module(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(BlockKind::Module)
        }
    }

    pub fn file(filename: impl Into<String>) -> Self {
        Self {
            filename: Some(filename.into()),
            ..Self::new(BlockKind::File)
        }
    }

    pub fn with_symbol(mut self, symbol: Symbol) -> Self {
        self.symbols.push(symbol);
        self
    }

    pub fn with_param(mut self, symbol: Symbol) -> Self {
        self.params.push(symbol);
        self
    }

    pub fn with_statement(mut self, statement: Node) -> Self {
        self.statements.push(statement);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct If {
    pub cond: Box<Node>,
    pub then: Option<Box<Node>>,
    pub otherwise: Option<Box<Node>>,
}

/// Shared shape of `while`, `do ... while` and `repeat ... until`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Loop {
    pub cond: Box<Node>,
    pub body: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Return {
    pub value: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseClause {
    pub value: Box<Node>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefaultClause {
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Switch {
    pub cond: Box<Node>,
    pub cases: Vec<CaseClause>,
    pub default: Option<DefaultClause>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunDef {
    pub name: String,
    pub params: Vec<Symbol>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Include {
    pub name: String,
    /// Set when the file was already included elsewhere.
    pub skip: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Node {
    Const(Const),
    Locale { text: String },
    List { elements: Vec<Node> },
    Map { entries: Vec<MapEntry> },
    Variable(Variable),
    Assign(Assign),
    Bracket(Bracket),
    Index(Index),
    Call(Call),
    Builtin(Builtin),
    Compare(Compare),
    Binary(Binary),
    Unary(Unary),
    Ternary(Ternary),
    Is(Is),
    Propagate(Propagate),
    Reference(Reference),
    ReturnExpr(ReturnExpr),
    Term(Term),
    Block(Block),
    If(If),
    While(Loop),
    Do(Loop),
    Repeat(Loop),
    Break,
    Continue,
    Return(Return),
    Switch(Switch),
    FunDef(FunDef),
    Import { name: String },
    Include(Include),
    Textdomain { name: String },
    Typedef,
    Filename { name: String },
}

impl Node {
    pub fn constant(ty: ConstType, value: impl Into<String>) -> Self {
        Node::Const(Const {
            ty,
            value: Some(value.into()),
        })
    }

    pub fn void() -> Self {
        Node::Const(Const {
            ty: ConstType::Void,
            value: None,
        })
    }

    pub fn int(value: i64) -> Self {
        Self::constant(ConstType::Int, value.to_string())
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::constant(ConstType::String, value)
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Node::Variable(Variable::new(name))
    }

    pub fn assign(name: impl Into<String>, value: Node) -> Self {
        Node::Assign(Assign {
            ns: None,
            name: name.into(),
            value: Box::new(value),
        })
    }

    pub fn builtin(name: impl Into<String>, args: Vec<Node>) -> Self {
        Node::Builtin(Builtin {
            name: name.into(),
            args,
            closure: None,
        })
    }

    pub fn call(name: impl Into<String>, args: Vec<Node>) -> Self {
        Node::Call(Call {
            ns: None,
            name: name.into(),
            category: CallCategory::Function,
            ty: None,
            args,
        })
    }

    pub fn ret(value: Option<Node>) -> Self {
        Node::Return(Return {
            value: value.map(Box::new),
        })
    }

    /// Kind tag as the front end spells it, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Const(_) => "const",
            Node::Locale { .. } => "locale",
            Node::List { .. } => "list",
            Node::Map { .. } => "map",
            Node::Variable(_) => "variable",
            Node::Assign(_) => "assign",
            Node::Bracket(_) => "bracket",
            Node::Index(_) => "yebracket",
            Node::Call(_) => "call",
            Node::Builtin(_) => "builtin",
            Node::Compare(_) => "compare",
            Node::Binary(_) => "yebinary",
            Node::Unary(_) => "yeunary",
            Node::Ternary(_) => "yetriple",
            Node::Is(_) => "yeis",
            Node::Propagate(_) => "yepropagate",
            Node::Reference(_) => "yereference",
            Node::ReturnExpr(_) => "yereturn",
            Node::Term(_) => "yeterm",
            Node::Block(_) => "block",
            Node::If(_) => "if",
            Node::While(_) => "while",
            Node::Do(_) => "do",
            Node::Repeat(_) => "repeat",
            Node::Break => "break",
            Node::Continue => "continue",
            Node::Return(_) => "return",
            Node::Switch(_) => "switch",
            Node::FunDef(_) => "fun_def",
            Node::Import { .. } => "import",
            Node::Include(_) => "include",
            Node::Textdomain { .. } => "textdomain",
            Node::Typedef => "typedef",
            Node::Filename { .. } => "filename",
        }
    }

    /// Short human-readable description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Node::Const(Const { value: Some(v), ty }) => match ty {
                ConstType::String => format!("\"{v}\""),
                ConstType::Symbol => format!("`{v}"),
                _ => v.clone(),
            },
            Node::Variable(var) => match &var.ns {
                Some(ns) => format!("{ns}::{}", var.name),
                None => var.name.clone(),
            },
            other => other.kind_name().to_string(),
        }
    }
}
