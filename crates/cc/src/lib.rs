//! C front end for the c2go translator.
//!
//! The crate owns everything on the C side of the pipeline:
//!
//! - a [`lexer`] that tokenizes C and keeps every comment,
//! - a [`parser`] that builds the arena-allocated syntax tree in [`ast`],
//!   growing its typedef knowledge from a caller-supplied seed list,
//! - [`walk`], pre/postorder traversals the rewriting passes are built on,
//! - [`print`], which renders the (rewritten) tree as Go source.
//!
//! The parser's error text is load-bearing: the translator's driver scans it
//! for `syntax error near X` / `invalid function definition for X` /
//! `likely type near X` to infer typedef names and re-parse. See
//! [`error::ParseError`].

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod print;
pub mod walk;

pub use ast::{
    Ast, Comment, Comments, Decl, DeclId, Expr, ExprId, ExprOp, Init, InitId, Label, LabelOp,
    Prog, Stmt, StmtId, StmtOp, Storage, Syntax, Type, TypeId, TypeKind,
};
pub use error::{ParseError, Pos};
pub use parser::parse;
pub use print::Printer;
pub use walk::{postorder, preorder, Node};
