//! Go AST subset for the c2go translator.
//!
//! This crate stands in for `go/ast` + `go/parser` + `go/printer`: it parses
//! the Go the translator emits (plus anything a rewrite rule can say),
//! retains comments, and prints gofmt-shaped text. The pattern-rewrite
//! engine in `c2go-translate` walks these trees.

pub mod ast;
pub mod parser;
pub mod printer;
pub mod token;

pub use ast::{
    AssignOp, BinOp, Block, BranchKind, CaseClause, Comments, Decl, Expr, Field, File, FuncSig,
    Stmt, StmtKind, UnOp,
};
pub use parser::{parse_expr, parse_file, ParseError};
pub use printer::{print_expr, print_file};
