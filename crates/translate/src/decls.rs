//! Declaration motion: the declare-at-first-use pass.
//!
//! C piles `int x, y;` at the top of every function; Go wants `x := ...` at
//! the point of first assignment. For each function body this pass
//!
//! 1. flattens the ephemeral `BlockNoBrace` sequences earlier rewrites
//!    spliced in, so use-chains are visible,
//! 2. builds a `uses(node, decl)` relation bottom-up,
//! 3. walks each block sliding uninitialized declarations forward: fold
//!    into `:=` at a first-use assignment, push into the `if`/`for`/block
//!    that is the only consumer, or emit right before the first use.
//!
//! A pending declaration nothing ever uses is dropped entirely.

use c2go_cc::ast::*;
use c2go_cc::walk::{postorder, preorder, Node};
use std::collections::HashSet;

pub fn move_decls(ast: &mut Ast, decls: &[DeclId]) {
    for &d in decls {
        if matches!(ast.type_kind(ast[d].ty), Some(TypeKind::Func)) && ast[d].body.is_some() {
            move_func_decls(ast, d);
        }
    }
}

type Uses = HashSet<(Node, DeclId)>;

fn uses_opt(uses: &Uses, node: Option<Node>, d: DeclId) -> bool {
    node.is_some_and(|n| uses.contains(&(n, d)))
}

fn move_func_decls(ast: &mut Ast, fndecl: DeclId) {
    let body = ast[fndecl].body.expect("function has a body");

    // Inline the BlockNoBraces into the Blocks, so that the flow of the
    // variables is understandable.
    postorder(ast, Node::Stmt(body), |ast, node| {
        if let Node::Stmt(s) = node {
            crate::syntax::inline_block_nobrace(ast, s);
        }
    });

    // Collect the local declarations.
    let mut decls: Vec<DeclId> = Vec::new();
    preorder(ast, Node::Stmt(body), |_, node| {
        if let Node::Decl(d) = node {
            decls.push(d);
        }
    });

    // Propagate uses upward, children to containers.
    let mut uses: Uses = HashSet::new();
    {
        let decls = &decls;
        let copy_uses = |uses: &mut Uses, x: Node, y: Option<Node>| {
            let Some(y) = y else { return };
            for &d in decls {
                if uses.contains(&(y, d)) {
                    uses.insert((x, d));
                }
            }
        };
        postorder(ast, Node::Stmt(body), |ast, x| match x {
            Node::Stmt(s) => {
                let node = &ast[s];
                let children: Vec<Option<Node>> = vec![
                    node.pre.map(Node::Expr),
                    node.expr.map(Node::Expr),
                    node.post.map(Node::Expr),
                    node.body.map(Node::Stmt),
                    node.else_.map(Node::Stmt),
                    node.decl.map(Node::Decl),
                ];
                let block: Vec<Node> = node.block.iter().map(|&c| Node::Stmt(c)).collect();
                for y in children {
                    copy_uses(&mut uses, x, y);
                }
                for y in block {
                    copy_uses(&mut uses, x, Some(y));
                }
            }
            Node::Expr(e) => {
                let node = &ast[e];
                if node.op == ExprOp::Name {
                    if let Some(d) = node.xdecl {
                        uses.insert((x, d));
                    }
                }
                let children: Vec<Node> = node
                    .left
                    .iter()
                    .chain(node.right.iter())
                    .chain(node.list.iter())
                    .map(|&c| Node::Expr(c))
                    .chain(
                        node.block
                            .iter()
                            .chain(node.after.iter())
                            .map(|&c| Node::Stmt(c)),
                    )
                    .collect();
                for y in children {
                    copy_uses(&mut uses, x, Some(y));
                }
            }
            Node::Decl(d) => {
                let init = ast[d].init.map(Node::Init);
                copy_uses(&mut uses, x, init);
            }
            Node::Init(i) => {
                let node = &ast[i];
                let expr = node.expr.map(Node::Expr);
                let braced: Vec<Node> = node.braced.iter().map(|&c| Node::Init(c)).collect();
                copy_uses(&mut uses, x, expr);
                for y in braced {
                    copy_uses(&mut uses, x, Some(y));
                }
            }
            _ => {}
        });
    }

    // Push var declarations forward until their uses.
    preorder(ast, Node::Stmt(body), |ast, node| {
        let Node::Stmt(s) = node else { return };
        if !matches!(ast[s].op, StmtOp::Block | StmtOp::BlockNoBrace) {
            return;
        }
        let items = ast[s].block.clone();
        let mut out: Vec<StmtId> = Vec::new();
        let mut pending: Vec<StmtId> = Vec::new(); // all StmtDecls
        for (i, &stmt) in items.iter().enumerate() {
            // Emit any required declarations.
            let mut pendout = Vec::new();
            for &dstmt in &pending {
                let d = ast[dstmt].decl.expect("pending entries are StmtDecls");
                if !uses.contains(&(Node::Stmt(stmt), d)) {
                    pendout.push(dstmt);
                    continue;
                }
                if is_assign_to(ast, stmt, d) {
                    let e = ast[stmt].expr.expect("assignment statement");
                    ast[e].op = ExprOp::ColonEq;
                    continue;
                }
                if !any_uses(&uses, &items[i + 1..], d) {
                    match ast[stmt].op {
                        StmtOp::If => {
                            if add_to_if(ast, &uses, stmt, dstmt) {
                                continue;
                            }
                        }
                        StmtOp::Block => {
                            add_to_block(ast, stmt, dstmt);
                            continue;
                        }
                        StmtOp::For => {
                            let node = &ast[stmt];
                            let in_header = uses_opt(&uses, node.pre.map(Node::Expr), d)
                                || uses_opt(&uses, node.expr.map(Node::Expr), d)
                                || uses_opt(&uses, node.post.map(Node::Expr), d);
                            if !in_header {
                                // Only used in the body, and uninitialized on
                                // entry, so a fresh copy every iteration is
                                // fine.
                                let inner = ast[stmt].body;
                                let new_body = match inner {
                                    Some(b) => add_to_block(ast, b, dstmt),
                                    None => add_to_block_new(ast, dstmt),
                                };
                                ast[stmt].body = Some(new_body);
                                continue;
                            }
                            if let Some(pre) = ast[stmt].pre {
                                if ast[pre].op == ExprOp::Eq
                                    && is_name_of(ast, ast[pre].left, d)
                                {
                                    // Loop variable.
                                    ast[pre].op = ExprOp::ColonEq;
                                    continue;
                                }
                            }
                        }
                        _ => {}
                    }
                }
                out.push(dstmt);
            }
            pending = pendout;

            // Pick up any uninitialized declarations for emitting later.
            if ast[stmt].op == StmtOp::StmtDecl {
                let d = ast[stmt].decl.expect("StmtDecl carries a decl");
                if ast[d].init.is_none() {
                    pending.push(stmt);
                    // C custom puts a blank line after the declarations;
                    // drop it to match Go, since the declaration is moving
                    // anyway.
                    if let Some(&next) = items.get(i + 1) {
                        let before = &mut ast[next].syntax.comments.before;
                        if before.first().is_some_and(|c| c.text.is_empty()) {
                            before.remove(0);
                        }
                    }
                    continue;
                }
            }
            out.push(stmt);
        }
        ast[s].block = out;
    });
}

/// `d.name = e` as a whole statement.
fn is_assign_to(ast: &Ast, stmt: StmtId, d: DeclId) -> bool {
    if ast[stmt].op != StmtOp::StmtExpr {
        return false;
    }
    let Some(e) = ast[stmt].expr else { return false };
    ast[e].op == ExprOp::Eq && is_name_of(ast, ast[e].left, d)
}

fn is_name_of(ast: &Ast, e: Option<ExprId>, d: DeclId) -> bool {
    let Some(e) = e else { return false };
    ast[e].op == ExprOp::Name && ast[e].xdecl == Some(d)
}

fn any_uses(uses: &Uses, list: &[StmtId], d: DeclId) -> bool {
    list.iter().any(|&s| uses.contains(&(Node::Stmt(s), d)))
}

/// Prepend `decl` to a block, wrapping a bare statement in a new block when
/// needed. Returns the (possibly new) block.
fn add_to_block(ast: &mut Ast, x: StmtId, decl: StmtId) -> StmtId {
    if matches!(ast[x].op, StmtOp::Block | StmtOp::BlockNoBrace) {
        ast[x].block.insert(0, decl);
        return x;
    }
    ast.alloc_stmt(Stmt {
        op: StmtOp::Block,
        block: vec![decl, x],
        ..Stmt::default()
    })
}

fn add_to_block_new(ast: &mut Ast, decl: StmtId) -> StmtId {
    ast.alloc_stmt(Stmt {
        op: StmtOp::Block,
        block: vec![decl],
        ..Stmt::default()
    })
}

/// Insert `d` into whichever arms of an `if` use it. Fails (false) when the
/// condition or init uses it, in which case the caller emits it before the
/// statement instead.
fn add_to_if(ast: &mut Ast, uses: &Uses, x: StmtId, dstmt: StmtId) -> bool {
    let d = ast[dstmt].decl.expect("pending entries are StmtDecls");
    let node = &ast[x];
    if uses_opt(uses, node.pre.map(Node::Expr), d) || uses_opt(uses, node.expr.map(Node::Expr), d)
    {
        return false;
    }
    let body = node.body;
    let else_ = node.else_;
    if uses_opt(uses, body.map(Node::Stmt), d) {
        let body = body.expect("used body exists");
        let new_body = add_to_block(ast, body, dstmt);
        ast[x].body = Some(new_body);
    }
    if uses_opt(uses, else_.map(Node::Stmt), d) {
        let else_ = else_.expect("used else exists");
        if ast[else_].op != StmtOp::If || !add_to_if(ast, uses, else_, dstmt) {
            let new_else = add_to_block(ast, else_, dstmt);
            ast[x].else_ = Some(new_else);
        }
    }
    true
}
