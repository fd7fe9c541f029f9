//! Tree traversal.
//!
//! `preorder` visits a node before its children, `postorder` after. Both
//! re-read a node's children *after* the callback has run, so a callback may
//! rewrite the node (including growing or replacing its child lists) and the
//! traversal will descend into the result. The rewriting passes depend on
//! this: a `do/while` loop rewritten into `for {...}` still gets its
//! synthesized `if !cond break` condition cleaned up by the same pass.
//!
//! `TypedefType` and `Named` type nodes are leaves here; following their
//! `base`/`type_decl` back-references would loop on self-referential types
//! (`struct List { List *next; }`).

use crate::ast::{Ast, DeclId, ExprId, InitId, StmtId, TypeId, TypeKind};
use smallvec::SmallVec;

/// A node reference of any kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Node {
    Prog,
    Decl(DeclId),
    Stmt(StmtId),
    Expr(ExprId),
    Type(TypeId),
    Init(InitId),
}

type Children = SmallVec<[Node; 8]>;

fn children(ast: &Ast, node: Node) -> Children {
    let mut out = Children::new();
    let mut push_expr = |out: &mut Children, e: Option<ExprId>| {
        if let Some(e) = e {
            out.push(Node::Expr(e));
        }
    };
    match node {
        Node::Prog => {
            out.extend(ast.prog.decls.iter().map(|&d| Node::Decl(d)));
        }
        Node::Decl(d) => {
            let d = &ast[d];
            if let Some(t) = d.ty {
                out.push(Node::Type(t));
            }
            if let Some(init) = d.init {
                out.push(Node::Init(init));
            }
            if let Some(body) = d.body {
                out.push(Node::Stmt(body));
            }
        }
        Node::Type(t) => {
            let ty = &ast[t];
            match ty.kind {
                TypeKind::TypedefType | TypeKind::Named => {}
                _ => {
                    if let Some(base) = ty.base {
                        out.push(Node::Type(base));
                    }
                    push_expr(&mut out, ty.width);
                    out.extend(ty.decls.iter().map(|&d| Node::Decl(d)));
                }
            }
        }
        Node::Stmt(s) => {
            let s = &ast[s];
            for lab in &s.labels {
                push_expr(&mut out, lab.expr);
            }
            push_expr(&mut out, s.pre);
            push_expr(&mut out, s.expr);
            push_expr(&mut out, s.post);
            if let Some(d) = s.decl {
                out.push(Node::Decl(d));
            }
            if let Some(b) = s.body {
                out.push(Node::Stmt(b));
            }
            if let Some(e) = s.else_ {
                out.push(Node::Stmt(e));
            }
            out.extend(s.block.iter().map(|&c| Node::Stmt(c)));
        }
        Node::Expr(e) => {
            let x = &ast[e];
            push_expr(&mut out, x.left);
            push_expr(&mut out, x.right);
            out.extend(x.list.iter().map(|&c| Node::Expr(c)));
            if let Some(t) = x.ty {
                out.push(Node::Type(t));
            }
            out.extend(x.block.iter().map(|&c| Node::Stmt(c)));
            out.extend(x.after.iter().map(|&c| Node::Stmt(c)));
        }
        Node::Init(i) => {
            let init = &ast[i];
            push_expr(&mut out, init.expr);
            out.extend(init.braced.iter().map(|&c| Node::Init(c)));
        }
    }
    out
}

fn walk<F, G>(ast: &mut Ast, node: Node, pre: &mut F, post: &mut G)
where
    F: FnMut(&mut Ast, Node),
    G: FnMut(&mut Ast, Node),
{
    pre(ast, node);
    for child in children(ast, node) {
        walk(ast, child, pre, post);
    }
    post(ast, node);
}

/// Visit `from` and everything under it, parents before children.
pub fn preorder<F>(ast: &mut Ast, from: Node, mut f: F)
where
    F: FnMut(&mut Ast, Node),
{
    walk(ast, from, &mut f, &mut |_, _| {});
}

/// Visit `from` and everything under it, children before parents.
pub fn postorder<F>(ast: &mut Ast, from: Node, mut f: F)
where
    F: FnMut(&mut Ast, Node),
{
    walk(ast, from, &mut |_, _| {}, &mut f);
}
