//! Pattern rewriting over the emitted Go.
//!
//! Rules come from a gofmt-style rule file: one `old -> new` pair per line,
//! both sides Go expressions. A lowercase identifier in a pattern is a
//! wildcard binding any expression; repeated occurrences must bind
//! structurally equal expressions. The `Sel` side of a selector is literal
//! on both match and substitution, so `r.min -> r.Min` renames the field
//! and leaves `r` wild.
//!
//! Application is bottom-up over every expression in the file; a
//! substituted replacement is re-descended so its children can match
//! further rules. A final pass unwraps `(&x).f` and `(*x).f` to `x.f`.

use c2go_goast::ast::*;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub old: Expr,
    pub new: Expr,
}

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("{file}:{line}: rewrite rule must be 'old -> new'")]
    Malformed { file: String, line: usize },
    #[error("{file}:{line}: {err}")]
    BadExpr {
        file: String,
        line: usize,
        err: c2go_goast::ParseError,
    },
}

/// Parse a rule file: blank lines and `#` comments ignored, each remaining
/// line `old -> new`.
pub fn parse_rules(file: &str, data: &str) -> Result<Vec<Rule>, RuleError> {
    let mut rules = Vec::new();
    for (i, line) in data.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = line.split("->").collect();
        if parts.len() != 2 {
            return Err(RuleError::Malformed {
                file: file.to_string(),
                line: i + 1,
            });
        }
        let old = c2go_goast::parse_expr(parts[0].trim()).map_err(|err| RuleError::BadExpr {
            file: file.to_string(),
            line: i + 1,
            err: *err,
        })?;
        let new = c2go_goast::parse_expr(parts[1].trim()).map_err(|err| RuleError::BadExpr {
            file: file.to_string(),
            line: i + 1,
            err: *err,
        })?;
        rules.push(Rule { old, new });
    }
    Ok(rules)
}

/// An identifier that starts with a lowercase letter and is a plain
/// single identifier is a pattern wildcard.
fn is_wildcard(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_lowercase() => {}
        _ => return false,
    }
    chars.all(unicode_ident::is_xid_continue)
}

type Bindings = HashMap<String, Expr>;

/// Match `pat` against `val`, binding wildcards in `m`.
fn match_expr(m: &mut Bindings, pat: &Expr, val: &Expr) -> bool {
    if let Expr::Ident(name) = pat {
        if is_wildcard(name) {
            if let Some(old) = m.get(name) {
                // Repeated wildcard: must match the same expression.
                return old == val;
            }
            m.insert(name.clone(), val.clone());
            return true;
        }
    }

    match (pat, val) {
        (Expr::Ident(a), Expr::Ident(b)) => a == b,
        (Expr::Lit(a), Expr::Lit(b)) => a == b,
        (Expr::Selector { x: px, sel: ps }, Expr::Selector { x: vx, sel: vs }) => {
            // Sel is literal: no wildcard lookup.
            ps == vs && match_expr(m, px, vx)
        }
        (
            Expr::Call {
                func: pf,
                args: pa,
                ellipsis: pe,
            },
            Expr::Call {
                func: vf,
                args: va,
                ellipsis: ve,
            },
        ) => {
            // f(x) and f(x...) differ; the variadic marker must agree.
            pe == ve
                && pa.len() == va.len()
                && match_expr(m, pf, vf)
                && pa.iter().zip(va).all(|(p, v)| match_expr(m, p, v))
        }
        (Expr::Index { x: px, index: pi }, Expr::Index { x: vx, index: vi }) => {
            match_expr(m, px, vx) && match_expr(m, pi, vi)
        }
        (
            Expr::Slice {
                x: px,
                low: pl,
                high: ph,
            },
            Expr::Slice {
                x: vx,
                low: vl,
                high: vh,
            },
        ) => {
            match_expr(m, px, vx)
                && match_opt(m, pl.as_deref(), vl.as_deref())
                && match_opt(m, ph.as_deref(), vh.as_deref())
        }
        (Expr::Star { x: px }, Expr::Star { x: vx }) => match_expr(m, px, vx),
        (Expr::Unary { op: po, x: px }, Expr::Unary { op: vo, x: vx }) => {
            po == vo && match_expr(m, px, vx)
        }
        (
            Expr::Binary {
                x: px,
                op: po,
                y: py,
            },
            Expr::Binary {
                x: vx,
                op: vo,
                y: vy,
            },
        ) => po == vo && match_expr(m, px, vx) && match_expr(m, py, vy),
        (Expr::Paren { x: px }, Expr::Paren { x: vx }) => match_expr(m, px, vx),
        (
            Expr::KeyValue {
                key: pk,
                value: pv,
            },
            Expr::KeyValue {
                key: vk,
                value: vv,
            },
        ) => match_expr(m, pk, vk) && match_expr(m, pv, vv),
        (
            Expr::Composite { ty: pt, elts: pe },
            Expr::Composite { ty: vt, elts: ve },
        ) => {
            match_opt(m, pt.as_deref(), vt.as_deref())
                && pe.len() == ve.len()
                && pe.iter().zip(ve).all(|(p, v)| match_expr(m, p, v))
        }
        (Expr::ArrayType { len: pl, elt: pe }, Expr::ArrayType { len: vl, elt: ve }) => {
            match_opt(m, pl.as_deref(), vl.as_deref()) && match_expr(m, pe, ve)
        }
        // Function literals, struct and func types match structurally.
        (a, b) => a == b,
    }
}

fn match_opt(m: &mut Bindings, pat: Option<&Expr>, val: Option<&Expr>) -> bool {
    match (pat, val) {
        (None, None) => true,
        (Some(p), Some(v)) => match_expr(m, p, v),
        _ => false,
    }
}

/// Copy of `pat` with bound wildcards substituted. `Sel` is literal here
/// too: a wildcard in selector position is not substituted.
fn subst(m: &Bindings, pat: &Expr) -> Expr {
    match pat {
        Expr::Ident(name) => {
            if is_wildcard(name) {
                if let Some(bound) = m.get(name) {
                    return bound.clone();
                }
            }
            pat.clone()
        }
        Expr::Selector { x, sel } => Expr::Selector {
            x: Box::new(subst(m, x)),
            sel: sel.clone(),
        },
        Expr::Call {
            func,
            args,
            ellipsis,
        } => Expr::Call {
            func: Box::new(subst(m, func)),
            args: args.iter().map(|a| subst(m, a)).collect(),
            ellipsis: *ellipsis,
        },
        Expr::Index { x, index } => Expr::Index {
            x: Box::new(subst(m, x)),
            index: Box::new(subst(m, index)),
        },
        Expr::Slice { x, low, high } => Expr::Slice {
            x: Box::new(subst(m, x)),
            low: low.as_ref().map(|e| Box::new(subst(m, e))),
            high: high.as_ref().map(|e| Box::new(subst(m, e))),
        },
        Expr::Star { x } => Expr::Star {
            x: Box::new(subst(m, x)),
        },
        Expr::Unary { op, x } => Expr::Unary {
            op: *op,
            x: Box::new(subst(m, x)),
        },
        Expr::Binary { x, op, y } => Expr::Binary {
            x: Box::new(subst(m, x)),
            op: *op,
            y: Box::new(subst(m, y)),
        },
        Expr::Paren { x } => Expr::Paren {
            x: Box::new(subst(m, x)),
        },
        Expr::KeyValue { key, value } => Expr::KeyValue {
            key: Box::new(subst(m, key)),
            value: Box::new(subst(m, value)),
        },
        Expr::Composite { ty, elts } => Expr::Composite {
            ty: ty.as_ref().map(|t| Box::new(subst(m, t))),
            elts: elts.iter().map(|e| subst(m, e)).collect(),
        },
        Expr::ArrayType { len, elt } => Expr::ArrayType {
            len: len.as_ref().map(|e| Box::new(subst(m, e))),
            elt: Box::new(subst(m, elt)),
        },
        _ => pat.clone(),
    }
}

/// Apply `rules` over every expression in `file`, then unwrap `(&x).f` and
/// `(*x).f` selectors.
pub fn rewrite_file(file: &mut File, rules: &[Rule]) {
    for decl in &mut file.decls {
        rewrite_decl(decl, rules);
    }
    for decl in &mut file.decls {
        cleanup_decl(decl);
    }
}

fn rewrite_decl(decl: &mut Decl, rules: &[Rule]) {
    match decl {
        Decl::Func { sig, body, .. } => {
            rewrite_sig(sig, rules);
            rewrite_block(body, rules);
        }
        Decl::Var { ty, value, .. } => {
            if let Some(ty) = ty {
                rewrite_expr(ty, rules);
            }
            if let Some(value) = value {
                rewrite_expr(value, rules);
            }
        }
        Decl::Const { value, .. } => rewrite_expr(value, rules),
        Decl::Type { ty, .. } => rewrite_expr(ty, rules),
    }
}

fn rewrite_sig(sig: &mut FuncSig, rules: &[Rule]) {
    for param in &mut sig.params {
        rewrite_expr(&mut param.ty, rules);
    }
    if let Some(result) = &mut sig.result {
        rewrite_expr(result, rules);
    }
}

fn rewrite_block(block: &mut Block, rules: &[Rule]) {
    for stmt in &mut block.stmts {
        rewrite_stmt(stmt, rules);
    }
}

fn rewrite_stmt(stmt: &mut Stmt, rules: &[Rule]) {
    match &mut stmt.kind {
        StmtKind::Empty | StmtKind::Branch { .. } => {}
        StmtKind::Expr(e) => rewrite_expr(e, rules),
        StmtKind::IncDec { x, .. } => rewrite_expr(x, rules),
        StmtKind::Assign { lhs, rhs, .. } => {
            for e in lhs.iter_mut().chain(rhs) {
                rewrite_expr(e, rules);
            }
        }
        StmtKind::Var { ty, value, .. } => {
            if let Some(ty) = ty {
                rewrite_expr(ty, rules);
            }
            if let Some(value) = value {
                rewrite_expr(value, rules);
            }
        }
        StmtKind::Const { value, .. } => rewrite_expr(value, rules),
        StmtKind::Return(results) => {
            for e in results {
                rewrite_expr(e, rules);
            }
        }
        StmtKind::If { cond, body, else_ } => {
            rewrite_expr(cond, rules);
            rewrite_block(body, rules);
            if let Some(else_) = else_ {
                rewrite_stmt(else_, rules);
            }
        }
        StmtKind::For {
            init,
            cond,
            post,
            body,
        } => {
            if let Some(init) = init {
                rewrite_stmt(init, rules);
            }
            if let Some(cond) = cond {
                rewrite_expr(cond, rules);
            }
            if let Some(post) = post {
                rewrite_stmt(post, rules);
            }
            rewrite_block(body, rules);
        }
        StmtKind::Switch { tag, clauses, .. } => {
            if let Some(tag) = tag {
                rewrite_expr(tag, rules);
            }
            for clause in clauses {
                for e in &mut clause.exprs {
                    rewrite_expr(e, rules);
                }
                for stmt in &mut clause.body {
                    rewrite_stmt(stmt, rules);
                }
            }
        }
        StmtKind::Labeled { stmt, .. } => rewrite_stmt(stmt, rules),
        StmtKind::Block(block) => rewrite_block(block, rules),
    }
}

fn rewrite_expr(expr: &mut Expr, rules: &[Rule]) {
    rewrite_children(expr, rules);
    for rule in rules {
        let mut m = Bindings::new();
        if match_expr(&mut m, &rule.old, expr) {
            let mut new = subst(&m, &rule.new);
            // Re-descend so a rewrite's output can itself be matched.
            rewrite_children(&mut new, rules);
            *expr = new;
        }
    }
}

fn rewrite_children(expr: &mut Expr, rules: &[Rule]) {
    match expr {
        Expr::Ident(_) | Expr::Lit(_) | Expr::StructType { .. } | Expr::FuncType(_) => {}
        Expr::Selector { x, .. } | Expr::Star { x } | Expr::Unary { x, .. } | Expr::Paren { x } => {
            rewrite_expr(x, rules)
        }
        Expr::Call { func, args, .. } => {
            rewrite_expr(func, rules);
            for a in args {
                rewrite_expr(a, rules);
            }
        }
        Expr::Index { x, index } => {
            rewrite_expr(x, rules);
            rewrite_expr(index, rules);
        }
        Expr::Slice { x, low, high } => {
            rewrite_expr(x, rules);
            if let Some(low) = low {
                rewrite_expr(low, rules);
            }
            if let Some(high) = high {
                rewrite_expr(high, rules);
            }
        }
        Expr::Binary { x, y, .. } => {
            rewrite_expr(x, rules);
            rewrite_expr(y, rules);
        }
        Expr::KeyValue { key, value } => {
            rewrite_expr(key, rules);
            rewrite_expr(value, rules);
        }
        Expr::Composite { ty, elts } => {
            if let Some(ty) = ty {
                rewrite_expr(ty, rules);
            }
            for e in elts {
                rewrite_expr(e, rules);
            }
        }
        Expr::ArrayType { len, elt } => {
            if let Some(len) = len {
                rewrite_expr(len, rules);
            }
            rewrite_expr(elt, rules);
        }
        Expr::FuncLit { sig, body } => {
            rewrite_sig(sig, rules);
            rewrite_block(body, rules);
        }
    }
}

// ----- (&x).f / (*x).f cleanup -----

fn cleanup_decl(decl: &mut Decl) {
    match decl {
        Decl::Func { body, .. } => cleanup_block(body),
        Decl::Var { ty, value, .. } => {
            if let Some(ty) = ty {
                cleanup_expr(ty);
            }
            if let Some(value) = value {
                cleanup_expr(value);
            }
        }
        Decl::Const { value, .. } => cleanup_expr(value),
        Decl::Type { ty, .. } => cleanup_expr(ty),
    }
}

fn cleanup_block(block: &mut Block) {
    for stmt in &mut block.stmts {
        cleanup_stmt(stmt);
    }
}

fn cleanup_stmt(stmt: &mut Stmt) {
    match &mut stmt.kind {
        StmtKind::Empty | StmtKind::Branch { .. } => {}
        StmtKind::Expr(e) => cleanup_expr(e),
        StmtKind::IncDec { x, .. } => cleanup_expr(x),
        StmtKind::Assign { lhs, rhs, .. } => {
            for e in lhs.iter_mut().chain(rhs) {
                cleanup_expr(e);
            }
        }
        StmtKind::Var { ty, value, .. } => {
            if let Some(ty) = ty {
                cleanup_expr(ty);
            }
            if let Some(value) = value {
                cleanup_expr(value);
            }
        }
        StmtKind::Const { value, .. } => cleanup_expr(value),
        StmtKind::Return(results) => {
            for e in results {
                cleanup_expr(e);
            }
        }
        StmtKind::If { cond, body, else_ } => {
            cleanup_expr(cond);
            cleanup_block(body);
            if let Some(else_) = else_ {
                cleanup_stmt(else_);
            }
        }
        StmtKind::For {
            init,
            cond,
            post,
            body,
        } => {
            if let Some(init) = init {
                cleanup_stmt(init);
            }
            if let Some(cond) = cond {
                cleanup_expr(cond);
            }
            if let Some(post) = post {
                cleanup_stmt(post);
            }
            cleanup_block(body);
        }
        StmtKind::Switch { tag, clauses, .. } => {
            if let Some(tag) = tag {
                cleanup_expr(tag);
            }
            for clause in clauses {
                for e in &mut clause.exprs {
                    cleanup_expr(e);
                }
                for stmt in &mut clause.body {
                    cleanup_stmt(stmt);
                }
            }
        }
        StmtKind::Labeled { stmt, .. } => cleanup_stmt(stmt),
        StmtKind::Block(block) => cleanup_block(block),
    }
}

fn cleanup_expr(expr: &mut Expr) {
    // Children first, so nested selectors collapse outward.
    match expr {
        Expr::Ident(_) | Expr::Lit(_) | Expr::StructType { .. } | Expr::FuncType(_) => return,
        Expr::Selector { x, .. } | Expr::Star { x } | Expr::Unary { x, .. } | Expr::Paren { x } => {
            cleanup_expr(x)
        }
        Expr::Call { func, args, .. } => {
            cleanup_expr(func);
            for a in args {
                cleanup_expr(a);
            }
        }
        Expr::Index { x, index } => {
            cleanup_expr(x);
            cleanup_expr(index);
        }
        Expr::Slice { x, low, high } => {
            cleanup_expr(x);
            if let Some(low) = low {
                cleanup_expr(low);
            }
            if let Some(high) = high {
                cleanup_expr(high);
            }
        }
        Expr::Binary { x, y, .. } => {
            cleanup_expr(x);
            cleanup_expr(y);
        }
        Expr::KeyValue { key, value } => {
            cleanup_expr(key);
            cleanup_expr(value);
        }
        Expr::Composite { ty, elts } => {
            if let Some(ty) = ty {
                cleanup_expr(ty);
            }
            for e in elts {
                cleanup_expr(e);
            }
        }
        Expr::ArrayType { len, elt } => {
            if let Some(len) = len {
                cleanup_expr(len);
            }
            cleanup_expr(elt);
        }
        Expr::FuncLit { body, .. } => cleanup_block(body),
    }

    if let Expr::Selector { x, .. } = expr {
        let inner = match x.as_mut() {
            Expr::Paren { x } => x.as_mut(),
            other => other,
        };
        match inner {
            Expr::Unary { op: UnOp::Amp, x: y } => {
                let y = std::mem::replace(y.as_mut(), Expr::Ident(String::new()));
                **x = y;
            }
            Expr::Star { x: y } => {
                let y = std::mem::replace(y.as_mut(), Expr::Ident(String::new()));
                **x = y;
            }
            _ => {}
        }
    }
}
