//! Ruby writer.
//!
//! Emits the Ruby AST as source text with two-space indentation.

use crate::ast::*;
use std::fmt::Write;

/// Emits the Ruby AST as source code.
pub struct RubyWriter {
    output: String,
    indent: usize,
}

impl RubyWriter {
    pub fn new() -> Self {
        Self {
            output: String::new(),
            indent: 0,
        }
    }

    /// Emit a node to Ruby source.
    ///
    /// A [`Node::Program`] yields a complete file; any other node is written
    /// as a single statement.
    pub fn emit(node: &Node) -> String {
        let mut writer = Self::new();
        match node {
            Node::Program { statements } => writer.write_program(statements),
            other => {
                writer.write_stmt(other);
                writer.output.push('\n');
            }
        }
        writer.output
    }

    fn write_program(&mut self, statements: &Node) {
        self.output.push_str("# encoding: utf-8\n\n");
        self.write_lines(statements);
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.output.push_str("  ");
        }
    }

    /// Write a node as a sequence of indented lines, each ending in a newline.
    fn write_lines(&mut self, node: &Node) {
        match node {
            Node::Statements(entries) => {
                let entries: Vec<&Node> = entries.iter().flatten().collect();
                for (i, stmt) in entries.iter().enumerate() {
                    if i > 0 && (is_spaced(entries[i - 1]) || is_spaced(stmt)) {
                        self.output.push('\n');
                    }
                    self.write_indent();
                    self.write_stmt(stmt);
                    self.output.push('\n');
                }
            }
            other => {
                self.write_indent();
                self.write_stmt(other);
                self.output.push('\n');
            }
        }
    }

    fn write_body(&mut self, node: &Node) {
        self.indent += 1;
        self.write_lines(node);
        self.indent -= 1;
    }

    fn write_end(&mut self) {
        self.write_indent();
        self.output.push_str("end");
    }

    /// Write a statement starting at the current position. The caller has
    /// already written the indentation; no trailing newline is written.
    fn write_stmt(&mut self, stmt: &Node) {
        match stmt {
            Node::Program { statements } => self.write_program(statements),

            Node::Class {
                name,
                superclass,
                body,
            } => {
                self.output.push_str("class ");
                self.output.push_str(name);
                if let Some(superclass) = superclass {
                    self.output.push_str(" < ");
                    self.write_expr(superclass, 16);
                }
                self.output.push('\n');
                self.write_body(body);
                self.write_end();
            }

            Node::Module { name, body } => {
                self.output.push_str("module ");
                self.output.push_str(name);
                self.output.push('\n');
                self.write_body(body);
                self.write_end();
            }

            Node::Def { name, args, body } => {
                self.output.push_str("def ");
                self.output.push_str(name);
                if !args.is_empty() {
                    self.output.push('(');
                    self.output.push_str(&args.join(", "));
                    self.output.push(')');
                }
                self.output.push('\n');
                self.write_body(body);
                self.write_end();
            }

            Node::Statements(_) => {
                // Nested sequence: flatten into the enclosing lines.
                let start = self.output.len();
                self.write_lines(stmt);
                let written = self.output.split_off(start);
                let trimmed = written.trim_start_matches(' ').trim_end_matches('\n');
                self.output.push_str(trimmed);
            }

            Node::Begin { statements } => {
                self.output.push_str("begin\n");
                self.write_body(statements);
                self.write_end();
            }

            Node::If {
                condition,
                then,
                else_,
            } => {
                self.output.push_str("if ");
                self.write_if_tail(condition, then, else_.as_deref());
            }

            Node::Unless {
                condition,
                then,
                else_,
            } => {
                self.output.push_str("unless ");
                self.write_expr(condition, 1);
                self.output.push('\n');
                self.write_body(then);
                if let Some(else_) = else_ {
                    self.write_indent();
                    self.output.push_str("else\n");
                    self.write_body(else_);
                }
                self.write_end();
            }

            Node::Case {
                expression,
                whens,
                else_,
            } => {
                self.output.push_str("case ");
                self.write_expr(expression, 1);
                self.output.push('\n');
                for when in whens {
                    self.write_indent();
                    self.output.push_str("when ");
                    self.write_list(&when.values);
                    self.output.push('\n');
                    self.write_body(&when.body);
                }
                if let Some(else_) = else_ {
                    self.write_indent();
                    self.output.push_str("else\n");
                    self.write_body(else_);
                }
                self.write_end();
            }

            Node::While { condition, body } => self.write_loop("while", condition, body),
            Node::Until { condition, body } => self.write_loop("until", condition, body),

            Node::Break => self.output.push_str("break"),

            Node::Next { value } => self.write_jump("next", value.as_deref()),
            Node::Return { value } => self.write_jump("return", value.as_deref()),

            expr => self.write_expr(expr, 0),
        }
    }

    fn write_if_tail(&mut self, condition: &Node, then: &Node, else_: Option<&Node>) {
        self.write_expr(condition, 1);
        self.output.push('\n');
        self.write_body(then);
        match else_ {
            Some(Node::If {
                condition,
                then,
                else_,
            }) => {
                self.write_indent();
                self.output.push_str("elsif ");
                self.write_if_tail(condition, then, else_.as_deref());
                return;
            }
            Some(else_) => {
                self.write_indent();
                self.output.push_str("else\n");
                self.write_body(else_);
            }
            None => {}
        }
        self.write_end();
    }

    fn write_loop(&mut self, keyword: &str, condition: &Node, body: &Node) {
        if let Node::Begin { statements } = body {
            self.output.push_str("begin\n");
            self.write_body(statements);
            self.write_indent();
            let _ = write!(self.output, "end {keyword} ");
            self.write_expr(condition, 1);
            return;
        }
        self.output.push_str(keyword);
        self.output.push(' ');
        self.write_expr(condition, 1);
        self.output.push('\n');
        self.write_body(body);
        self.write_end();
    }

    fn write_jump(&mut self, keyword: &str, value: Option<&Node>) {
        self.output.push_str(keyword);
        if let Some(value) = value {
            self.output.push(' ');
            self.write_expr(value, 1);
        }
    }

    /// Write an expression, parenthesizing it if it binds looser than `min`.
    fn write_expr(&mut self, expr: &Node, min: u8) {
        if expr.precedence() < min {
            self.output.push('(');
            self.write_expr(expr, 0);
            self.output.push(')');
            return;
        }

        match expr {
            Node::Expressions(items) => {
                self.output.push('(');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.output.push_str("; ");
                    }
                    self.write_expr(item, 1);
                }
                self.output.push(')');
            }

            Node::Assignment { lhs, rhs } => {
                self.write_expr(lhs, 16);
                self.output.push_str(" = ");
                self.write_expr(rhs, 1);
            }

            Node::UnaryOperator { op, expression } => {
                self.output.push_str(op.symbol());
                self.write_expr(expression, op.precedence());
            }

            Node::BinaryOperator { op, lhs, rhs } => {
                let prec = op.precedence();
                let left_min = if op.is_non_associative() || *op == BinaryOp::Pow {
                    prec + 1
                } else {
                    prec
                };
                let right_min = if *op == BinaryOp::Pow { prec } else { prec + 1 };
                self.write_expr(lhs, left_min);
                let _ = write!(self.output, " {} ", op.symbol());
                self.write_expr(rhs, right_min);
            }

            Node::Ternary {
                condition,
                then,
                else_,
            } => {
                self.write_expr(condition, 3);
                self.output.push_str(" ? ");
                self.write_expr(then, 2);
                self.output.push_str(" : ");
                self.write_expr(else_, 2);
            }

            Node::MethodCall {
                receiver,
                name,
                args,
                block,
                parens,
            } => self.write_call(receiver.as_deref(), name, args, block.as_deref(), *parens),

            Node::Block { args, statements } => self.write_block(args, statements),

            Node::ConstAccess { receiver, name } => {
                if let Some(receiver) = receiver {
                    self.write_expr(receiver, 16);
                    self.output.push_str("::");
                }
                self.output.push_str(name);
            }

            Node::Variable { name } => self.output.push_str(name),

            Node::SelfRef => self.output.push_str("self"),

            Node::Literal(lit) => self.write_literal(lit),

            Node::Array(items) => {
                self.output.push('[');
                self.write_list(items);
                self.output.push(']');
            }

            Node::Hash(entries) if entries.is_empty() => self.output.push_str("{}"),

            Node::Hash(entries) => {
                self.output.push_str("{ ");
                self.write_hash_entries(entries);
                self.output.push_str(" }");
            }

            stmt => self.write_stmt(stmt),
        }
    }

    fn write_call(
        &mut self,
        receiver: Option<&Node>,
        name: &str,
        args: &[Node],
        block: Option<&Node>,
        parens: bool,
    ) {
        if let Some(receiver) = receiver {
            self.write_expr(receiver, 16);
            self.output.push('.');
        }
        self.output.push_str(name);

        if args.is_empty() {
            let capitalized = name.starts_with(|c: char| c.is_ascii_uppercase());
            if parens || (receiver.is_none() && capitalized) {
                self.output.push_str("()");
            }
        } else if parens || block.is_some() {
            self.output.push('(');
            self.write_args(args);
            self.output.push(')');
        } else {
            self.output.push(' ');
            self.write_args(args);
        }

        if let Some(block) = block {
            self.output.push(' ');
            self.write_expr(block, 16);
        }
    }

    /// Call arguments; a trailing non-empty hash loses its braces.
    fn write_args(&mut self, args: &[Node]) {
        match args.split_last() {
            Some((Node::Hash(entries), rest)) if !entries.is_empty() => {
                self.write_list(rest);
                if !rest.is_empty() {
                    self.output.push_str(", ");
                }
                self.write_hash_entries(entries);
            }
            _ => self.write_list(args),
        }
    }

    fn write_list(&mut self, items: &[Node]) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            self.write_expr(item, 1);
        }
    }

    fn write_hash_entries(&mut self, entries: &[HashEntry]) {
        for (i, entry) in entries.iter().enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            self.write_expr(&entry.key, 1);
            self.output.push_str(" => ");
            self.write_expr(&entry.value, 1);
        }
    }

    fn write_block(&mut self, args: &[String], statements: &Node) {
        self.output.push('{');
        if !args.is_empty() {
            let _ = write!(self.output, " |{}|", args.join(", "));
        }

        let entries: Vec<&Node> = match statements {
            Node::Statements(entries) => entries.iter().flatten().collect(),
            other => vec![other],
        };
        match entries.as_slice() {
            [] => self.output.push_str(" }"),
            [single] if !single.is_statement() => {
                self.output.push(' ');
                self.write_stmt(single);
                self.output.push_str(" }");
            }
            _ => {
                self.output.push('\n');
                self.write_body(statements);
                self.write_indent();
                self.output.push('}');
            }
        }
    }

    fn write_literal(&mut self, lit: &Literal) {
        match lit {
            Literal::Nil => self.output.push_str("nil"),
            Literal::Bool(true) => self.output.push_str("true"),
            Literal::Bool(false) => self.output.push_str("false"),
            Literal::Integer(n) => {
                let _ = write!(self.output, "{n}");
            }
            // Debug always keeps a fraction or exponent: `1.0`, `1e20`.
            Literal::Float(f) => {
                let _ = write!(self.output, "{f:?}");
            }
            Literal::Symbol(name) if is_plain_symbol(name) => {
                self.output.push(':');
                self.output.push_str(name);
            }
            Literal::Symbol(name) => {
                self.output.push(':');
                self.write_string(name);
            }
            Literal::String(s) => self.write_string(s),
        }
    }

    fn write_string(&mut self, s: &str) {
        self.output.push('"');
        let mut chars = s.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '"' => self.output.push_str("\\\""),
                '\\' => self.output.push_str("\\\\"),
                '\n' => self.output.push_str("\\n"),
                '\t' => self.output.push_str("\\t"),
                '\r' => self.output.push_str("\\r"),
                '\u{1b}' => self.output.push_str("\\e"),
                '#' if matches!(chars.peek(), Some('{' | '$' | '@')) => {
                    self.output.push_str("\\#")
                }
                c if c.is_control() => {
                    let _ = write!(self.output, "\\u{{{:x}}}", c as u32);
                }
                c => self.output.push(c),
            }
        }
        self.output.push('"');
    }
}

impl Default for RubyWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Definitions get a blank line on both sides.
fn is_spaced(node: &Node) -> bool {
    matches!(
        node,
        Node::Def { .. } | Node::Class { .. } | Node::Module { .. }
    )
}

/// Symbols that can be written without quotes: `:foo`, `:empty?`.
fn is_plain_symbol(name: &str) -> bool {
    let body = name.strip_suffix(['?', '!']).unwrap_or(name);
    let mut chars = body.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emit(node: Node) -> String {
        RubyWriter::emit(&node).trim_end().to_string()
    }

    #[test]
    fn test_assignment() {
        assert_eq!(emit(Node::assign(Node::var("i"), Node::int(42))), "i = 42");
    }

    #[test]
    fn test_literals() {
        assert_eq!(emit(Node::nil()), "nil");
        assert_eq!(emit(Node::bool(false)), "false");
        assert_eq!(emit(Node::int(-7)), "-7");
        assert_eq!(emit(Node::float(1.0)), "1.0");
        assert_eq!(emit(Node::float(0.25)), "0.25");
        assert_eq!(emit(Node::float(1e20)), "1e20");
        assert_eq!(emit(Node::symbol("ok")), ":ok");
        assert_eq!(emit(Node::symbol("empty?")), ":empty?");
        assert_eq!(emit(Node::symbol("a-b")), ":\"a-b\"");
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            emit(Node::string("a\"b\\c\n\t\u{1b}\u{7}")),
            r#""a\"b\\c\n\t\e\u{7}""#
        );
        assert_eq!(emit(Node::string("#{x} #$y #@z #")), r##""\#{x} \#$y \#@z #""##);
        assert_eq!(emit(Node::string("žluťoučký")), "\"žluťoučký\"");
    }

    #[test]
    fn test_call_forms() {
        let call = Node::call(Some(Node::constant("Ops")), "add", vec![Node::int(1), Node::int(2)]);
        assert_eq!(emit(call), "Ops.add(1, 2)");

        let command = Node::command(None, "textdomain", vec![Node::string("base")]);
        assert_eq!(emit(command), "textdomain \"base\"");

        assert_eq!(emit(Node::call(None, "Label", vec![])), "Label()");
        assert_eq!(emit(Node::command(None, "HBox", vec![])), "HBox()");
        assert_eq!(emit(Node::command(Some(Node::constant("M")), "new", vec![])), "M.new");
        assert_eq!(emit(Node::call(None, "f", vec![])), "f()");
    }

    #[test]
    fn test_trailing_hash_argument() {
        let call = Node::command(
            None,
            "publish",
            vec![Node::hash(vec![
                (Node::symbol("variable"), Node::symbol("x")),
                (Node::symbol("type"), Node::string("integer")),
            ])],
        );
        assert_eq!(emit(call), "publish :variable => :x, :type => \"integer\"");

        let empty = Node::call(None, "f", vec![Node::hash(vec![])]);
        assert_eq!(emit(empty), "f({})");
    }

    #[test]
    fn test_precedence() {
        // (a || b) && c
        let expr = Node::binary(
            Node::binary(Node::var("a"), BinaryOp::Or, Node::var("b")),
            BinaryOp::And,
            Node::var("c"),
        );
        assert_eq!(emit(expr), "(a || b) && c");

        // a && b || c needs no parentheses
        let expr = Node::binary(
            Node::binary(Node::var("a"), BinaryOp::And, Node::var("b")),
            BinaryOp::Or,
            Node::var("c"),
        );
        assert_eq!(emit(expr), "a && b || c");

        let expr = Node::unary(
            UnaryOp::Not,
            Node::binary(Node::var("a"), BinaryOp::Eq, Node::var("b")),
        );
        assert_eq!(emit(expr), "!(a == b)");

        let expr = Node::ternary(
            Node::var("c"),
            Node::assign(Node::var("x"), Node::int(1)),
            Node::int(2),
        );
        assert_eq!(emit(expr), "c ? (x = 1) : 2");
    }

    #[test]
    fn test_blocks() {
        let inline = Node::call(Some(Node::constant("Builtins")), "foreach", vec![Node::var("l")])
            .with_block(Node::block(
                vec!["k".into()],
                Node::statements(vec![Node::call(None, "f", vec![Node::var("k")])]),
            ));
        assert_eq!(emit(inline), "Builtins.foreach(l) { |k| f(k) }");

        let multi = Node::command(None, "lambda", vec![]).with_block(Node::block(
            vec![],
            Node::statements(vec![
                Node::assign(Node::var("a"), Node::int(1)),
                Node::next(Some(Node::var("a"))),
            ]),
        ));
        assert_eq!(RubyWriter::emit(&multi), "lambda {\n  a = 1\n  next a\n}\n");
    }

    #[test]
    fn test_do_while() {
        let node = Node::while_(
            Node::var("c"),
            Node::begin(Node::statements(vec![Node::Break])),
        );
        assert_eq!(RubyWriter::emit(&node), "begin\n  break\nend while c\n");
    }

    #[test]
    fn test_elsif() {
        let node = Node::if_(
            Node::var("a"),
            Node::statements(vec![Node::int(1)]),
            Some(Node::if_(
                Node::var("b"),
                Node::statements(vec![Node::int(2)]),
                Some(Node::statements(vec![Node::int(3)])),
            )),
        );
        assert_eq!(
            RubyWriter::emit(&node),
            "if a\n  1\nelsif b\n  2\nelse\n  3\nend\n"
        );
    }

    #[test]
    fn test_statements_skip_none_and_space_defs() {
        let node = Node::Statements(vec![
            Some(Node::command(None, "include", vec![Node::constant("Yast")])),
            None,
            Some(Node::def("main", vec![], Node::statements(vec![]))),
            Some(Node::def(
                "f",
                vec!["a".into()],
                Node::statements(vec![Node::return_(Some(Node::var("a")))]),
            )),
        ]);
        assert_eq!(
            RubyWriter::emit(&node),
            "include Yast\n\ndef main\nend\n\ndef f(a)\n  return a\nend\n"
        );
    }

    #[test]
    fn test_expressions() {
        let node = Node::Expressions(vec![
            Node::assign(Node::var("a_ref"), Node::call(None, "arg_ref", vec![Node::var("a")])),
            Node::var("a_ref"),
        ]);
        assert_eq!(emit(node), "(a_ref = arg_ref(a); a_ref)");
    }
}
