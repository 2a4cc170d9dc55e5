//! Translation context.
//!
//! The context is the stack of constructs enclosing the node being
//! translated, outermost first. It answers the questions whose answer depends
//! on where a node sits: is a name local or global, which loop or closure
//! does a `break` leave, which module are we in.
//!
//! ```text
//! Frame 0 (outermost): module M        symbols: counter          (global)
//! Frame 1:             def f(a)        symbols: a, i             (local boundary)
//! Frame 2:             while
//! Frame 3 (innermost): { |k| ... }     symbols: k                (local)
//! ```
//!
//! Contexts are values. Entering a construct creates a longer copy with
//! [`Context::inside`]; the parent is never modified.

use y2r_ruby::is_reserved_word;
use y2r_ycp::{Block, BlockKind, FunDef, Node, ReturnExpr, Symbol, SymbolCategory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopKind {
    While,
    Do,
    Repeat,
}

/// One enclosing construct.
#[derive(Debug, Clone, Copy)]
pub enum Frame<'a> {
    Block(&'a Block),
    /// Function body: the definition's parameters plus its `def` block.
    Function(&'a FunDef),
    Loop(LoopKind),
    ReturnExpr(&'a ReturnExpr),
    /// Body of a `switch` clause: the case value, `None` for `default`.
    Case(Option<&'a Node>),
}

/// Frame classification used by [`Context::innermost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Block(BlockKind),
    Function,
    Loop,
    ReturnExpr,
    Case,
}

impl<'a> Frame<'a> {
    pub fn kind(&self) -> FrameKind {
        match self {
            Frame::Block(block) => FrameKind::Block(block.kind),
            Frame::Function(_) => FrameKind::Function,
            Frame::Loop(_) => FrameKind::Loop,
            Frame::ReturnExpr(_) => FrameKind::ReturnExpr,
            Frame::Case(_) => FrameKind::Case,
        }
    }

    /// Names declared by this frame, parameters first.
    pub fn symbols(&self) -> impl Iterator<Item = &'a Symbol> + use<'a> {
        let (params, symbols): (&'a [Symbol], &'a [Symbol]) = match *self {
            Frame::Block(block) => (&block.params, &block.symbols),
            Frame::Function(def) => (&def.params, &def.body.symbols),
            Frame::ReturnExpr(expr) => (&expr.params, &[]),
            Frame::Loop(_) | Frame::Case(_) => (&[], &[]),
        };
        params
            .iter()
            .chain(symbols)
            .filter(|s| s.category != SymbolCategory::Filename)
    }

    /// True if names declared here and below are local bindings.
    fn starts_local_scope(&self) -> bool {
        matches!(
            self.kind(),
            FrameKind::Function
                | FrameKind::ReturnExpr
                | FrameKind::Block(BlockKind::Unspec)
                | FrameKind::Block(BlockKind::Def)
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct Context<'a> {
    frames: Vec<Frame<'a>>,
    export_private: bool,
}

impl<'a> Context<'a> {
    pub fn new(export_private: bool) -> Self {
        Self {
            frames: Vec::new(),
            export_private,
        }
    }

    /// A copy of this context with `frame` pushed as the innermost frame.
    pub fn inside(&self, frame: Frame<'a>) -> Self {
        let mut frames = Vec::with_capacity(self.frames.len() + 1);
        frames.extend_from_slice(&self.frames);
        frames.push(frame);
        Self {
            frames,
            export_private: self.export_private,
        }
    }

    pub fn frames(&self) -> &[Frame<'a>] {
        &self.frames
    }

    pub fn export_private(&self) -> bool {
        self.export_private
    }

    /// Nearest enclosing frame of one of the given kinds.
    pub fn innermost(&self, kinds: &[FrameKind]) -> Option<Frame<'a>> {
        self.frames
            .iter()
            .rev()
            .find(|frame| kinds.contains(&frame.kind()))
            .copied()
    }

    /// Name of the module being translated, if the outermost frame is one.
    pub fn module_name(&self) -> Option<&'a str> {
        match self.frames.first() {
            Some(Frame::Block(block)) if block.kind == BlockKind::Module => block.name.as_deref(),
            _ => None,
        }
    }

    /// True if some enclosing frame is a function body.
    pub fn in_function(&self) -> bool {
        self.frames.iter().any(|f| f.kind() == FrameKind::Function)
    }

    /// Index of the outermost frame that opens a local scope.
    fn boundary(&self) -> usize {
        self.frames
            .iter()
            .position(Frame::starts_local_scope)
            .unwrap_or(self.frames.len())
    }

    /// Names declared at or inside the local-scope boundary, outermost first.
    pub fn locals(&self) -> Vec<&'a str> {
        names(&self.frames[self.boundary()..])
    }

    /// Names declared outside the local-scope boundary, outermost first.
    pub fn globals(&self) -> Vec<&'a str> {
        names(&self.frames[..self.boundary()])
    }

    pub fn is_local(&self, name: &str) -> bool {
        self.locals().contains(&name)
    }

    /// A name is global when no local shadows it and a global frame declares it.
    pub fn is_global(&self, name: &str) -> bool {
        !self.is_local(name) && self.globals().contains(&name)
    }

    /// The innermost declaration of `name`.
    pub fn lookup(&self, name: &str) -> Option<&'a Symbol> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.symbols().filter(|s| s.name == name).last())
    }

    /// Ruby name of a local binding: suffixed on collision, then escaped.
    pub fn local_name(&self, name: &str) -> String {
        escape(suffixed(name, &self.locals()))
    }

    /// Ruby name of a module-level binding, including the `@` sigil.
    pub fn global_name(&self, name: &str) -> String {
        format!("@{}", suffixed(name, &self.globals()))
    }

    /// Ruby name of an unqualified variable reference.
    pub fn resolve(&self, name: &str) -> String {
        if self.is_global(name) {
            self.global_name(name)
        } else {
            self.local_name(name)
        }
    }
}

fn names<'a>(frames: &[Frame<'a>]) -> Vec<&'a str> {
    frames
        .iter()
        .flat_map(|frame| frame.symbols())
        .map(|symbol| symbol.name.as_str())
        .collect()
}

/// `i` seen three times is the third `i` in scope: `i3`. The number is bumped
/// past names that are themselves declared.
fn suffixed(name: &str, declared: &[&str]) -> String {
    let count = declared.iter().filter(|n| **n == name).count();
    if count <= 1 {
        return name.to_string();
    }
    let mut n = count;
    loop {
        let candidate = format!("{name}{n}");
        if !declared.contains(&candidate.as_str()) {
            return candidate;
        }
        n += 1;
    }
}

/// Ruby locals cannot be keywords or start with a capital (constant) or an
/// underscore we reserve for escaped names.
pub(crate) fn escape(name: String) -> String {
    if is_reserved_word(&name) || name.starts_with(|c: char| c.is_uppercase() || c == '_') {
        format!("_{name}")
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stmt_block(names: &[&str]) -> Block {
        names.iter().fold(Block::new(BlockKind::Stmt), |block, name| {
            block.with_symbol(Symbol::local(*name, "integer"))
        })
    }

    fn fun_def(name: &str, params: &[&str], locals: &[&str]) -> FunDef {
        let body = locals.iter().fold(Block::new(BlockKind::Def), |block, name| {
            block.with_symbol(Symbol::local(*name, "integer"))
        });
        FunDef {
            name: name.into(),
            params: params.iter().map(|p| Symbol::local(*p, "string")).collect(),
            body,
        }
    }

    #[test]
    fn test_empty_context_is_local() {
        let ctx = Context::default();
        assert!(!ctx.is_global("i"));
        assert_eq!(ctx.resolve("i"), "i");
        assert_eq!(ctx.module_name(), None);
    }

    #[test]
    fn test_nested_names_get_distinct_suffixes() {
        let def = fun_def("f", &[], &["i"]);
        let outer = stmt_block(&["i"]);
        let inner = stmt_block(&["i"]);

        let ctx1 = Context::default().inside(Frame::Function(&def));
        let ctx2 = ctx1.inside(Frame::Block(&outer));
        let ctx3 = ctx2.inside(Frame::Block(&inner));

        assert_eq!(ctx1.resolve("i"), "i");
        assert_eq!(ctx2.resolve("i"), "i2");
        assert_eq!(ctx3.resolve("i"), "i3");
    }

    #[test]
    fn test_suffix_skips_declared_names() {
        assert_eq!(suffixed("i", &["i", "i", "i2"]), "i3");
        assert_eq!(suffixed("i", &["i"]), "i");
        assert_eq!(suffixed("j", &["i", "i"]), "j");
    }

    #[test]
    fn test_module_globals() {
        let module = Block::module("M").with_symbol(Symbol::global("x", "integer"));
        let def = fun_def("f", &["y"], &["x"]);

        let in_module = Context::default().inside(Frame::Block(&module));
        assert_eq!(in_module.module_name(), Some("M"));
        assert!(in_module.is_global("x"));
        assert_eq!(in_module.resolve("x"), "@x");

        // A function local shadows the module variable.
        let in_function = in_module.inside(Frame::Function(&def));
        assert!(!in_function.is_global("x"));
        assert_eq!(in_function.resolve("x"), "x");
        assert_eq!(in_function.resolve("y"), "y");
    }

    #[test]
    fn test_closure_inside_function_keeps_function_locals() {
        let def = fun_def("f", &[], &["n"]);
        let closure = Block::new(BlockKind::Unspec).with_param(Symbol::local("k", "string"));
        let ctx = Context::default()
            .inside(Frame::Function(&def))
            .inside(Frame::Block(&closure));

        assert_eq!(ctx.locals(), vec!["n", "k"]);
        assert!(ctx.globals().is_empty());
    }

    #[test]
    fn test_escaping() {
        let block = stmt_block(&["end", "Foo", "_x", "ok"]);
        let def = fun_def("f", &[], &[]);
        let ctx = Context::default()
            .inside(Frame::Function(&def))
            .inside(Frame::Block(&block));

        assert_eq!(ctx.resolve("end"), "_end");
        assert_eq!(ctx.resolve("Foo"), "_Foo");
        assert_eq!(ctx.resolve("_x"), "__x");
        assert_eq!(ctx.resolve("ok"), "ok");
    }

    #[test]
    fn test_suffixed_names_are_escaped() {
        let def = fun_def("f", &[], &["Foo", "end"]);
        let block = stmt_block(&["Foo", "end"]);
        let ctx = Context::default()
            .inside(Frame::Function(&def))
            .inside(Frame::Block(&block));

        assert_eq!(ctx.resolve("Foo"), "_Foo2");
        // `end2` is no longer a keyword.
        assert_eq!(ctx.resolve("end"), "end2");
    }

    #[test]
    fn test_globals_are_not_escaped() {
        let module = Block::module("M").with_symbol(Symbol::global("end", "integer"));
        let ctx = Context::default().inside(Frame::Block(&module));
        assert_eq!(ctx.resolve("end"), "@end");
    }

    #[test]
    fn test_innermost() {
        let closure = Block::new(BlockKind::Unspec);
        let ctx = Context::default()
            .inside(Frame::Loop(LoopKind::While))
            .inside(Frame::Block(&closure));

        let found = ctx.innermost(&[FrameKind::Loop, FrameKind::Block(BlockKind::Unspec)]);
        assert!(matches!(found, Some(Frame::Block(_))));
        assert!(matches!(
            ctx.innermost(&[FrameKind::Loop]),
            Some(Frame::Loop(LoopKind::While))
        ));
        assert!(ctx.innermost(&[FrameKind::Function]).is_none());
    }

    #[test]
    fn test_lookup_finds_innermost() {
        let module = Block::module("M").with_symbol(Symbol::global("x", "integer"));
        let def = FunDef {
            name: "f".into(),
            params: vec![Symbol::new("x", "integer &", SymbolCategory::Reference, false)],
            body: Block::new(BlockKind::Def).with_statement(Node::Break),
        };
        let ctx = Context::default()
            .inside(Frame::Block(&module))
            .inside(Frame::Function(&def));

        let symbol = ctx.lookup("x").unwrap();
        assert!(symbol.is_reference());
        assert!(ctx.lookup("missing").is_none());
    }
}
