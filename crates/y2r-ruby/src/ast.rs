//! Ruby syntax tree.
//!
//! Only the subset of Ruby the compiler emits. Statements and expressions
//! share one enum because Ruby does not distinguish them syntactically.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Node {
    /// A whole file: encoding comment, then the statements.
    Program {
        statements: Box<Node>,
    },
    Class {
        name: String,
        superclass: Option<Box<Node>>,
        body: Box<Node>,
    },
    Module {
        name: String,
        body: Box<Node>,
    },
    Def {
        name: String,
        args: Vec<String>,
        body: Box<Node>,
    },
    /// Statement sequence. `None` entries are skipped when printing.
    Statements(Vec<Option<Node>>),
    Begin {
        statements: Box<Node>,
    },
    If {
        condition: Box<Node>,
        then: Box<Node>,
        else_: Option<Box<Node>>,
    },
    Unless {
        condition: Box<Node>,
        then: Box<Node>,
        else_: Option<Box<Node>>,
    },
    Case {
        expression: Box<Node>,
        whens: Vec<When>,
        else_: Option<Box<Node>>,
    },
    While {
        condition: Box<Node>,
        body: Box<Node>,
    },
    Until {
        condition: Box<Node>,
        body: Box<Node>,
    },
    Break,
    Next {
        value: Option<Box<Node>>,
    },
    Return {
        value: Option<Box<Node>>,
    },
    /// `(a; b; c)`, evaluating to the last element.
    Expressions(Vec<Node>),
    Assignment {
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
    UnaryOperator {
        op: UnaryOp,
        expression: Box<Node>,
    },
    BinaryOperator {
        op: BinaryOp,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
    Ternary {
        condition: Box<Node>,
        then: Box<Node>,
        else_: Box<Node>,
    },
    MethodCall {
        receiver: Option<Box<Node>>,
        name: String,
        args: Vec<Node>,
        block: Option<Box<Node>>,
        parens: bool,
    },
    /// Block literal attached to a call: `{ |args| ... }`.
    Block {
        args: Vec<String>,
        statements: Box<Node>,
    },
    ConstAccess {
        receiver: Option<Box<Node>>,
        name: String,
    },
    Variable {
        name: String,
    },
    SelfRef,
    Literal(Literal),
    Array(Vec<Node>),
    Hash(Vec<HashEntry>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct When {
    pub values: Vec<Node>,
    pub body: Node,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HashEntry {
    pub key: Node,
    pub value: Node,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Literal {
    Nil,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Symbol(String),
    String(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    Not,
    Neg,
    BitNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    And,
    Or,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Neg => "-",
            UnaryOp::BitNot => "~",
        }
    }

    pub fn precedence(self) -> u8 {
        match self {
            UnaryOp::Not | UnaryOp::BitNot => 15,
            UnaryOp::Neg => 13,
        }
    }
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    /// Ruby binding strength; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Pow => 14,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 12,
            BinaryOp::Add | BinaryOp::Sub => 11,
            BinaryOp::Shl | BinaryOp::Shr => 10,
            BinaryOp::BitAnd => 9,
            BinaryOp::BitOr | BinaryOp::BitXor => 8,
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => 7,
            BinaryOp::Eq | BinaryOp::Ne => 6,
            BinaryOp::And => 5,
            BinaryOp::Or => 4,
        }
    }

    /// Comparison operators do not chain in Ruby.
    pub fn is_non_associative(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::Ne
                | BinaryOp::Lt
                | BinaryOp::Gt
                | BinaryOp::Le
                | BinaryOp::Ge
        )
    }
}

/// Ruby reserved words. Local variables with these names must be renamed.
pub const RESERVED_WORDS: &[&str] = &[
    "BEGIN", "END", "__ENCODING__", "__END__", "__FILE__", "__LINE__", "alias", "and", "begin",
    "break", "case", "class", "def", "defined?", "do", "else", "elsif", "end", "ensure", "false",
    "for", "if", "in", "module", "next", "nil", "not", "or", "redo", "rescue", "retry", "return",
    "self", "super", "then", "true", "undef", "unless", "until", "when", "while", "yield",
];

pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

// Constructors
impl Node {
    pub fn program(statements: Vec<Option<Node>>) -> Self {
        Node::Program {
            statements: Box::new(Node::Statements(statements)),
        }
    }

    pub fn statements(statements: Vec<Node>) -> Self {
        Node::Statements(statements.into_iter().map(Some).collect())
    }

    pub fn class(name: impl Into<String>, superclass: Option<Node>, body: Node) -> Self {
        Node::Class {
            name: name.into(),
            superclass: superclass.map(Box::new),
            body: Box::new(body),
        }
    }

    pub fn module(name: impl Into<String>, body: Node) -> Self {
        Node::Module {
            name: name.into(),
            body: Box::new(body),
        }
    }

    pub fn def(name: impl Into<String>, args: Vec<String>, body: Node) -> Self {
        Node::Def {
            name: name.into(),
            args,
            body: Box::new(body),
        }
    }

    pub fn begin(statements: Node) -> Self {
        Node::Begin {
            statements: Box::new(statements),
        }
    }

    pub fn if_(condition: Node, then: Node, else_: Option<Node>) -> Self {
        Node::If {
            condition: Box::new(condition),
            then: Box::new(then),
            else_: else_.map(Box::new),
        }
    }

    pub fn unless(condition: Node, then: Node, else_: Option<Node>) -> Self {
        Node::Unless {
            condition: Box::new(condition),
            then: Box::new(then),
            else_: else_.map(Box::new),
        }
    }

    pub fn while_(condition: Node, body: Node) -> Self {
        Node::While {
            condition: Box::new(condition),
            body: Box::new(body),
        }
    }

    pub fn until(condition: Node, body: Node) -> Self {
        Node::Until {
            condition: Box::new(condition),
            body: Box::new(body),
        }
    }

    pub fn next(value: Option<Node>) -> Self {
        Node::Next {
            value: value.map(Box::new),
        }
    }

    pub fn return_(value: Option<Node>) -> Self {
        Node::Return {
            value: value.map(Box::new),
        }
    }

    pub fn assign(lhs: Node, rhs: Node) -> Self {
        Node::Assignment {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn unary(op: UnaryOp, expression: Node) -> Self {
        Node::UnaryOperator {
            op,
            expression: Box::new(expression),
        }
    }

    pub fn binary(lhs: Node, op: BinaryOp, rhs: Node) -> Self {
        Node::BinaryOperator {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn ternary(condition: Node, then: Node, else_: Node) -> Self {
        Node::Ternary {
            condition: Box::new(condition),
            then: Box::new(then),
            else_: Box::new(else_),
        }
    }

    /// Parenthesized method call.
    pub fn call(receiver: Option<Node>, name: impl Into<String>, args: Vec<Node>) -> Self {
        Node::MethodCall {
            receiver: receiver.map(Box::new),
            name: name.into(),
            args,
            block: None,
            parens: true,
        }
    }

    /// Command-style call without parentheses: `publish :x => 1`.
    pub fn command(receiver: Option<Node>, name: impl Into<String>, args: Vec<Node>) -> Self {
        Node::MethodCall {
            receiver: receiver.map(Box::new),
            name: name.into(),
            args,
            block: None,
            parens: false,
        }
    }

    /// Attach a block to a method call; other nodes are returned unchanged.
    pub fn with_block(self, block: Node) -> Self {
        match self {
            Node::MethodCall {
                receiver,
                name,
                args,
                parens,
                ..
            } => Node::MethodCall {
                receiver,
                name,
                args,
                block: Some(Box::new(block)),
                parens,
            },
            other => other,
        }
    }

    pub fn block(args: Vec<String>, statements: Node) -> Self {
        Node::Block {
            args,
            statements: Box::new(statements),
        }
    }

    pub fn constant(name: impl Into<String>) -> Self {
        Node::ConstAccess {
            receiver: None,
            name: name.into(),
        }
    }

    /// `Receiver::Name`
    pub fn scoped_constant(receiver: Node, name: impl Into<String>) -> Self {
        Node::ConstAccess {
            receiver: Some(Box::new(receiver)),
            name: name.into(),
        }
    }

    pub fn var(name: impl Into<String>) -> Self {
        Node::Variable { name: name.into() }
    }

    pub fn nil() -> Self {
        Node::Literal(Literal::Nil)
    }

    pub fn bool(value: bool) -> Self {
        Node::Literal(Literal::Bool(value))
    }

    pub fn int(value: i64) -> Self {
        Node::Literal(Literal::Integer(value))
    }

    pub fn float(value: f64) -> Self {
        Node::Literal(Literal::Float(value))
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Node::Literal(Literal::Symbol(name.into()))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Node::Literal(Literal::String(value.into()))
    }

    pub fn hash(entries: Vec<(Node, Node)>) -> Self {
        Node::Hash(
            entries
                .into_iter()
                .map(|(key, value)| HashEntry { key, value })
                .collect(),
        )
    }

    /// True for nodes that only make sense in statement position.
    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            Node::Program { .. }
                | Node::Class { .. }
                | Node::Module { .. }
                | Node::Def { .. }
                | Node::Statements(_)
                | Node::Begin { .. }
                | Node::If { .. }
                | Node::Unless { .. }
                | Node::Case { .. }
                | Node::While { .. }
                | Node::Until { .. }
        )
    }

    /// Ruby binding strength of the node as an operand; 16 is atomic.
    pub fn precedence(&self) -> u8 {
        match self {
            Node::UnaryOperator { op, .. } => op.precedence(),
            Node::BinaryOperator { op, .. } => op.precedence(),
            Node::Ternary { .. } => 2,
            Node::Assignment { .. } => 1,
            Node::MethodCall {
                args,
                parens: false,
                block: None,
                ..
            } if !args.is_empty() => 0,
            // Negative numeric literals behave like unary minus.
            Node::Literal(Literal::Integer(n)) if *n < 0 => 13,
            Node::Literal(Literal::Float(f)) if f.is_sign_negative() => 13,
            Node::Break | Node::Next { .. } | Node::Return { .. } => 0,
            node if node.is_statement() => 0,
            _ => 16,
        }
    }
}
