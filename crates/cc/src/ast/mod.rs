//! The C syntax tree.
//!
//! Nodes live in typed arenas owned by [`Ast`] and refer to each other
//! through `u32` index ids. Back-references (`Expr::xdecl`, `Type::type_decl`)
//! are plain ids too, so the tree can carry the cycles a C program implies
//! (a use points at its declaration, a named type points at the declaration
//! that defines it) without ownership knots. Passes mutate nodes in place
//! through `Index`/`IndexMut`.

pub mod ops;

pub use ops::{ExprOp, LabelOp, StmtOp, TypeKind};

use bitflags::bitflags;
use core::marker::PhantomData;
use core::ops::{Index, IndexMut};
use text_size::TextRange;

/// Typed index of an arena-allocated node.
pub struct Id<T> {
    raw: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    pub const fn from_raw(raw: u32) -> Self {
        Id {
            raw,
            _marker: PhantomData,
        }
    }

    pub const fn raw(self) -> u32 {
        self.raw
    }

    pub const fn index(self) -> usize {
        self.raw as usize
    }
}

impl<T> Copy for Id<T> {}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T> Eq for Id<T> {}

impl<T> std::hash::Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T> std::fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.raw)
    }
}

pub type ExprId = Id<Expr>;
pub type StmtId = Id<Stmt>;
pub type DeclId = Id<Decl>;
pub type TypeId = Id<Type>;
pub type InitId = Id<Init>;

bitflags! {
    /// Storage-class bits on a declaration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Storage: u8 {
        const TYPEDEF = 1 << 0;
        const STATIC = 1 << 1;
        const EXTERN = 1 << 2;
        const REGISTER = 1 << 3;
        const CONST = 1 << 4;
        const INLINE = 1 << 5;
    }
}

/// A single comment. An empty `text` encodes a blank source line, which is
/// how paragraph breaks survive the pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Comment {
    /// Raw text including the `//` or `/* */` delimiters; empty for a blank
    /// line marker.
    pub text: String,
    /// Comment sits on the same line as the code it follows.
    pub suffix: bool,
    /// A `//line` or `//go:` style directive; never folded into a steal.
    pub directive: bool,
}

impl Comment {
    pub fn line(text: impl Into<String>) -> Self {
        Comment {
            text: text.into(),
            ..Comment::default()
        }
    }

    pub fn blank() -> Self {
        Comment::default()
    }
}

/// Comment block carried by every node.
#[derive(Debug, Clone, Default)]
pub struct Comments {
    pub before: Vec<Comment>,
    pub suffix: Vec<Comment>,
    pub after: Vec<Comment>,
}

/// Span plus comments; present on every syntax node.
#[derive(Debug, Clone, Default)]
pub struct Syntax {
    pub span: TextRange,
    pub comments: Comments,
}

/// The root of a translation unit.
#[derive(Debug, Default)]
pub struct Prog {
    pub decls: Vec<DeclId>,
    pub syntax: Syntax,
}

/// A declaration: variable, field, parameter, enumerator, typedef, or
/// function (with `body` set).
#[derive(Debug, Clone, Default)]
pub struct Decl {
    pub syntax: Syntax,
    pub name: String,
    pub ty: Option<TypeId>,
    pub storage: Storage,
    pub init: Option<InitId>,
    pub body: Option<StmtId>,
    /// Kept in the decl list for its comments and ordering but emits nothing.
    pub blank: bool,
    /// Enumerator's computed constant value, when no explicit init exists.
    pub enum_value: Option<i64>,
}

/// An initializer: either a single expression or a braced list.
#[derive(Debug, Clone, Default)]
pub struct Init {
    pub syntax: Syntax,
    pub expr: Option<ExprId>,
    pub braced: Vec<InitId>,
}

/// A type. Structured kinds use `base`/`decls`; `TypedefType` and `Named`
/// carry the referenced name plus back-references that the walker never
/// follows (they would cycle).
#[derive(Debug, Clone)]
pub struct Type {
    pub kind: TypeKind,
    pub span: TextRange,
    pub base: Option<TypeId>,
    pub tag: String,
    pub name: String,
    pub decls: Vec<DeclId>,
    /// Array length.
    pub width: Option<ExprId>,
    /// A pointer the translator decided should print as a Go slice.
    pub slice: bool,
    /// Declaration defining this named struct/enum/typedef.
    pub type_decl: Option<DeclId>,
}

impl Type {
    pub fn new(kind: TypeKind) -> Self {
        Type {
            kind,
            span: TextRange::default(),
            base: None,
            tag: String::new(),
            name: String::new(),
            decls: Vec::new(),
            width: None,
            slice: false,
            type_decl: None,
        }
    }

    pub fn is(&self, kind: TypeKind) -> bool {
        self.kind == kind
    }
}

/// A case/default/name label attached to a statement.
#[derive(Debug, Clone)]
pub struct Label {
    pub op: LabelOp,
    pub name: String,
    pub expr: Option<ExprId>,
}

/// A statement.
#[derive(Debug, Clone, Default)]
pub struct Stmt {
    pub syntax: Syntax,
    pub op: StmtOp,
    pub pre: Option<ExprId>,
    pub expr: Option<ExprId>,
    pub post: Option<ExprId>,
    pub decl: Option<DeclId>,
    pub body: Option<StmtId>,
    pub else_: Option<StmtId>,
    pub block: Vec<StmtId>,
    pub labels: Vec<Label>,
    /// Goto target.
    pub text: String,
}

impl Default for StmtOp {
    fn default() -> Self {
        StmtOp::Empty
    }
}

/// An expression.
#[derive(Debug, Clone)]
pub struct Expr {
    pub syntax: Syntax,
    pub op: ExprOp,
    /// Name or literal text.
    pub text: String,
    pub left: Option<ExprId>,
    pub right: Option<ExprId>,
    pub list: Vec<ExprId>,
    /// Statements carried by `ExprBlock` and `SideEffectFunc`.
    pub block: Vec<StmtId>,
    /// Deferred fix-ups carried by `SideEffectFunc`.
    pub after: Vec<StmtId>,
    /// Cast / sizeof target type.
    pub ty: Option<TypeId>,
    /// Inferred type, when the annotator could tell.
    pub xtype: Option<TypeId>,
    /// Declaration a `Name` resolves to.
    pub xdecl: Option<DeclId>,
}

impl Expr {
    pub fn new(op: ExprOp) -> Self {
        Expr {
            syntax: Syntax::default(),
            op,
            text: String::new(),
            left: None,
            right: None,
            list: Vec::new(),
            block: Vec::new(),
            after: Vec::new(),
            ty: None,
            xtype: None,
            xdecl: None,
        }
    }
}

/// Arena of all nodes in one translation unit, plus the root [`Prog`].
#[derive(Debug, Default)]
pub struct Ast {
    pub prog: Prog,
    /// Name of the source file, for diagnostics and conflict suffixes.
    pub file: String,
    exprs: Vec<Expr>,
    stmts: Vec<Stmt>,
    decls: Vec<Decl>,
    types: Vec<Type>,
    inits: Vec<Init>,
}

macro_rules! arena_access {
    ($field:ident, $node:ty, $alloc:ident) => {
        impl Index<Id<$node>> for Ast {
            type Output = $node;
            fn index(&self, id: Id<$node>) -> &$node {
                &self.$field[id.index()]
            }
        }

        impl IndexMut<Id<$node>> for Ast {
            fn index_mut(&mut self, id: Id<$node>) -> &mut $node {
                &mut self.$field[id.index()]
            }
        }

        impl Ast {
            pub fn $alloc(&mut self, node: $node) -> Id<$node> {
                let id = Id::from_raw(self.$field.len() as u32);
                self.$field.push(node);
                id
            }
        }
    };
}

arena_access!(exprs, Expr, alloc_expr);
arena_access!(stmts, Stmt, alloc_stmt);
arena_access!(decls, Decl, alloc_decl);
arena_access!(types, Type, alloc_type);
arena_access!(inits, Init, alloc_init);

impl Ast {
    pub fn new(file: impl Into<String>) -> Self {
        Ast {
            file: file.into(),
            ..Ast::default()
        }
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    /// Allocate a bare operator node.
    pub fn expr(&mut self, op: ExprOp) -> ExprId {
        self.alloc_expr(Expr::new(op))
    }

    /// Allocate a unary node.
    pub fn unary(&mut self, op: ExprOp, left: ExprId) -> ExprId {
        let mut e = Expr::new(op);
        e.left = Some(left);
        self.alloc_expr(e)
    }

    /// Allocate a binary node.
    pub fn binary(&mut self, op: ExprOp, left: ExprId, right: ExprId) -> ExprId {
        let mut e = Expr::new(op);
        e.left = Some(left);
        e.right = Some(right);
        self.alloc_expr(e)
    }

    /// Allocate a `Name` node referring to `decl`.
    pub fn name_ref(&mut self, text: impl Into<String>, decl: Option<DeclId>) -> ExprId {
        let mut e = Expr::new(ExprOp::Name);
        e.text = text.into();
        e.xdecl = decl;
        if let Some(d) = decl {
            e.xtype = self[d].ty;
        }
        self.alloc_expr(e)
    }

    /// Allocate a statement of the given kind.
    pub fn stmt(&mut self, op: StmtOp) -> StmtId {
        self.alloc_stmt(Stmt {
            op,
            ..Stmt::default()
        })
    }

    /// Allocate a statement wrapping an expression.
    pub fn stmt_expr(&mut self, expr: ExprId) -> StmtId {
        self.alloc_stmt(Stmt {
            op: StmtOp::StmtExpr,
            expr: Some(expr),
            ..Stmt::default()
        })
    }

    /// Shallow copy of an expression into a fresh node: children are shared,
    /// span and comments are cleared so the copy doesn't duplicate them.
    pub fn copy_expr(&mut self, x: ExprId) -> ExprId {
        let mut e = self[x].clone();
        e.syntax = Syntax::default();
        self.alloc_expr(e)
    }

    /// Shallow copy of a statement; comments and labels stay behind on the
    /// original so a wrapping rewrite keeps them in place.
    pub fn copy_stmt(&mut self, x: StmtId) -> StmtId {
        let mut s = self[x].clone();
        s.syntax = Syntax::default();
        s.labels = Vec::new();
        self.alloc_stmt(s)
    }

    /// Overwrite `dst` with the contents of `src`, keeping `dst`'s comments
    /// and folding `src`'s into them. This is how a parent collapses onto a
    /// child (dropping parentheses, replacing an expression by its residue)
    /// without losing either node's comments.
    pub fn fix_merge(&mut self, dst: ExprId, src: ExprId) {
        let mut syn = self[dst].syntax.clone();
        let node = self[src].clone();
        let src_syn = node.syntax.clone();
        syn.comments.before.extend(src_syn.comments.before);
        syn.comments.after.extend(src_syn.comments.after);
        syn.comments.suffix.extend(src_syn.comments.suffix);
        self[dst] = node;
        self[dst].syntax = syn;
    }

    /// Resolved kind of a type id, reading through nothing.
    pub fn type_kind(&self, ty: Option<TypeId>) -> Option<TypeKind> {
        ty.map(|t| self[t].kind)
    }

    /// True when the expression is a `Name` whose declaration has pointer type.
    pub fn is_ptr_name(&self, x: ExprId) -> bool {
        let e = &self[x];
        if e.op != ExprOp::Name {
            return false;
        }
        match e.xdecl.and_then(|d| self[d].ty) {
            Some(t) => self[t].kind == TypeKind::Ptr,
            None => false,
        }
    }

    /// True for pointer or array types.
    pub fn is_ptr_or_array(&self, ty: Option<TypeId>) -> bool {
        matches!(
            self.type_kind(ty),
            Some(TypeKind::Ptr) | Some(TypeKind::Array)
        )
    }

    /// True for float types.
    pub fn is_float(&self, ty: Option<TypeId>) -> bool {
        self.type_kind(ty).is_some_and(|k| k.is_float())
    }
}
