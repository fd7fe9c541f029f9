//! Rewrite from C constructs to Go constructs.
//!
//! Three groups of passes live here, in the order the driver runs them:
//!
//! - `rewrite_syntax`: local shape changes (loops, conditions, pointer
//!   comparisons, slice marking) plus statement-level dispatch into the
//!   side-effect extractor,
//! - the side-effect extractor itself, which hoists `++`, embedded
//!   assignments, comma expressions, and ternaries out of positions Go
//!   does not allow them in,
//! - `simplify_bool`, De Morgan and comparison inversion over the result.

use c2go_cc::ast::*;
use c2go_cc::walk::{postorder, preorder, Node};

/// Fresh-name supply for extraction temporaries. A plain counter: names
/// only need to be unique within one translation unit.
#[derive(Debug, Default)]
pub struct TmpGen {
    n: u32,
}

impl TmpGen {
    pub fn new() -> Self {
        TmpGen::default()
    }

    pub fn next(&mut self) -> String {
        self.n += 1;
        format!("tmp{}", self.n)
    }
}

/// Extraction context: the expression is used as a whole statement.
pub const SIDE_STMT: u8 = 1 << 0;
/// Extraction context: fix-ups may not be emitted after the host statement.
pub const SIDE_NO_AFTER: u8 = 1 << 1;

pub fn rewrite_syntax(ast: &mut Ast, tmp: &mut TmpGen) {
    preorder(ast, Node::Prog, |ast, node| match node {
        Node::Stmt(s) => rewrite_stmt(ast, tmp, s),

        Node::Expr(e) => match ast[e].op {
            ExprOp::Name => {
                if ast[e].text == "nil" {
                    ast[e].xdecl = None; // just nil, not a C declaration
                } else if ast[e].text == "nelem" {
                    ast[e].text = "len".to_string();
                    ast[e].xdecl = None;
                }
            }
            ExprOp::Number => {
                // Rewrite char literals that mean something else in Go.
                if ast[e].text == r"'\0'" {
                    ast[e].text = r"'\x00'".to_string();
                } else if ast[e].text == r#"'\"'"# {
                    ast[e].text = r#"'"'"#.to_string();
                }
            }
            ExprOp::Paren => {
                let left = ast[e].left.expect("paren has an operand");
                if matches!(ast[left].op, ExprOp::Number | ExprOp::Name) {
                    ast.fix_merge(e, left);
                }
            }
            ExprOp::Eq | ExprOp::EqEq | ExprOp::NotEq => {
                // p = 0, p == 0, p != 0 become nil comparisons for pointers.
                let (left, right) = (ast[e].left, ast[e].right);
                if let (Some(left), Some(right)) = (left, right) {
                    if ast[right].op == ExprOp::Number
                        && ast[right].text == "0"
                        && ast.is_ptr_name(left)
                    {
                        ast[right].op = ExprOp::Name;
                        ast[right].text = "nil".to_string();
                    }
                }
            }
            ExprOp::Index => {
                // x[i] means x wants to be a slice, through every level of
                // indexing.
                let mut x = e;
                let mut depth = 1;
                while let Some(left) = ast[x].left {
                    if ast[left].op != ExprOp::Index {
                        break;
                    }
                    x = left;
                    depth += 1;
                }
                let base = ast[x].left;
                if let Some(base) = base {
                    if ast[base].op == ExprOp::Name {
                        if let Some(decl) = ast[base].xdecl {
                            let mut t = ast[decl].ty;
                            while depth > 0 {
                                let Some(ty) = t else { break };
                                if ast[ty].kind != TypeKind::Ptr {
                                    break;
                                }
                                ast[ty].slice = true;
                                t = ast[ty].base;
                                depth -= 1;
                            }
                        }
                    }
                }
            }
            _ => {}
        },

        Node::Type(t) => {
            // int f(void) becomes int f().
            if ast[t].kind == TypeKind::Func && ast[t].decls.len() == 1 {
                let param = ast[t].decls[0];
                let is_void = ast[param].name.is_empty()
                    && matches!(ast.type_kind(ast[param].ty), Some(TypeKind::Void));
                if is_void {
                    ast[t].decls.clear();
                }
            }
        }
        _ => {}
    });

    // Apply changed struct tags to typedefs. Excise dead pieces.
    postorder(ast, Node::Prog, |ast, node| match node {
        Node::Type(t) => {
            if ast[t].kind == TypeKind::TypedefType {
                if let Some(base) = ast[t].base {
                    if !ast[base].tag.is_empty() {
                        let tag = ast[base].tag.clone();
                        ast[t].name = tag;
                    }
                }
            }
        }
        Node::Stmt(s) => {
            if ast[s].op == StmtOp::StmtExpr {
                let e = ast[s].expr.expect("StmtExpr carries an expression");
                if ast[e].op == ExprOp::Comma && ast[e].list.is_empty() {
                    ast[s].op = StmtOp::Empty;
                    ast[s].expr = None;
                }
            }
        }
        Node::Expr(e) => {
            rewrite_ptr_arith(ast, e);
        }
        _ => {}
    });

    // Wrap non-boolean conditions.
    preorder(ast, Node::Prog, |ast, node| match node {
        Node::Expr(e) => match ast[e].op {
            ExprOp::AndAnd | ExprOp::OrOr => {
                let (left, right) = (ast[e].left, ast[e].right);
                if let Some(left) = left {
                    fix_bool(ast, left);
                }
                if let Some(right) = right {
                    fix_bool(ast, right);
                }
            }
            ExprOp::Not => {
                if let Some(left) = ast[e].left {
                    fix_bool(ast, left);
                }
            }
            _ => {}
        },
        Node::Stmt(s) => {
            if matches!(ast[s].op, StmtOp::If | StmtOp::For) {
                if let Some(expr) = ast[s].expr {
                    fix_bool(ast, expr);
                }
            }
        }
        _ => {}
    });

    // Cosmetic parenthesis cleanup.
    postorder(ast, Node::Prog, |ast, node| {
        if let Node::Expr(e) = node {
            match ast[e].op {
                ExprOp::OrEq
                | ExprOp::AndEq
                | ExprOp::Or
                | ExprOp::Eq
                | ExprOp::EqEq
                | ExprOp::NotEq
                | ExprOp::LtEq
                | ExprOp::GtEq
                | ExprOp::Lt
                | ExprOp::Gt => {
                    cut_paren(
                        ast,
                        e,
                        &[ExprOp::Or, ExprOp::And, ExprOp::Lsh, ExprOp::Rsh],
                    );
                }
                ExprOp::Paren => {
                    let left = ast[e].left.expect("paren has an operand");
                    if matches!(ast[left].op, ExprOp::Dot | ExprOp::Arrow) {
                        ast.fix_merge(e, left);
                    }
                }
                _ => {}
            }
        }
    });
}

/// Reassociate pointer arithmetic so only one pointer+integer addition
/// survives, which maps onto a slice operation.
fn rewrite_ptr_arith(ast: &mut Ast, e: ExprId) {
    // p + y - z, really (p + y) - z, becomes p + (y - z).
    if matches!(ast[e].op, ExprOp::Add | ExprOp::Sub)
        && matches!(ast.type_kind(ast[e].xtype), Some(TypeKind::Ptr))
    {
        let left = ast[e].left;
        if let Some(left) = left {
            if matches!(ast[left].op, ExprOp::Add | ExprOp::Sub)
                && matches!(ast.type_kind(ast[left].xtype), Some(TypeKind::Ptr))
            {
                let p = ast[left].left.expect("binary op has operands");
                let op1 = ast[left].op;
                let mut y = ast[left].right.expect("binary op has operands");
                let op2 = ast[e].op;
                let z = ast[e].right.expect("binary op has operands");
                if op1 == ExprOp::Sub {
                    let neg = ast.unary(ExprOp::Minus, y);
                    ast[neg].xtype = ast[y].xtype;
                    y = neg;
                }
                let xtype = ast[e].xtype;
                let inner = ast.binary(op2, y, z);
                ast[inner].xtype = xtype;
                ast[e].op = ExprOp::Add;
                ast[e].left = Some(p);
                ast[e].right = Some(inner);
            }
        }
    }

    // c + p - q, really (c + p) - q, becomes c + (p - q), so there is no
    // int + ptr addition, only a ptr - ptr subtraction.
    if ast[e].op == ExprOp::Sub {
        let left = match ast[e].left {
            Some(left) if ast[left].op == ExprOp::Add => left,
            _ => return,
        };
        let ll = ast[left].left.expect("binary op has operands");
        if !ast.is_ptr_or_array(ast[e].xtype)
            && ast.is_ptr_or_array(ast[left].xtype)
            && !ast.is_ptr_or_array(ast[ll].xtype)
        {
            let c = ll;
            let p = ast[left].right.expect("binary op has operands");
            let q = ast[e].right.expect("binary op has operands");
            let xtype = ast[e].xtype;
            ast[left].left = Some(p);
            ast[left].right = Some(q);
            ast[left].op = ExprOp::Sub;
            ast[left].xtype = xtype;
            ast[e].op = ExprOp::Add;
            ast[e].left = Some(c);
            ast[e].right = Some(left);
        }
    }
}

fn cut_paren(ast: &mut Ast, x: ExprId, ops: &[ExprOp]) {
    for side in [ast[x].left, ast[x].right] {
        if let Some(child) = side {
            if ast[child].op == ExprOp::Paren {
                let inner = ast[child].left.expect("paren has an operand");
                if ops.contains(&ast[inner].op) {
                    ast.fix_merge(child, inner);
                }
            }
        }
    }
}

fn rewrite_stmt(ast: &mut Ast, tmp: &mut TmpGen, s: StmtId) {
    match ast[s].op {
        StmtOp::Do => {
            // do { ... } while(x) becomes for(;;) { ...; if !x { break } }.
            // The preorder recursion into the new children cleans up x in
            // the if condition as needed.
            ast[s].op = StmtOp::For;
            let x = ast[s].expr.take();
            let body = force_block(ast, ast[s].body);
            ast[s].body = Some(body);
            if let Some(x) = x {
                let not_x = ast.unary(ExprOp::Not, x);
                let brk = ast.stmt(StmtOp::Break);
                let guard = ast.alloc_stmt(Stmt {
                    op: StmtOp::If,
                    expr: Some(not_x),
                    body: Some(brk),
                    ..Stmt::default()
                });
                ast[body].block.push(guard);
            }
        }

        StmtOp::While => {
            ast[s].op = StmtOp::For;
            rewrite_for(ast, tmp, s);
        }
        StmtOp::For => rewrite_for(ast, tmp, s),

        StmtOp::If => {
            if ast[s].else_.is_none() {
                fix_if_andand(ast, tmp, s);
            }
            rewrite_cond_stmt(ast, tmp, s);
        }
        StmtOp::Return => rewrite_cond_stmt(ast, tmp, s),

        StmtOp::StmtExpr => {
            let (before, after) = extract_side_effects(ast, tmp, ast[s].expr, SIDE_STMT);
            if !before.is_empty() || !after.is_empty() {
                let old = ast.copy_stmt(s);
                ast[s].expr = None;
                ast[s].op = StmtOp::BlockNoBrace;
                let mut block = before;
                block.push(old);
                block.extend(after);
                ast[s].block = block;
            }
        }

        StmtOp::StmtDecl => {
            let decl = ast[s].decl.expect("StmtDecl carries a decl");
            let init_expr = ast[decl].init.and_then(|i| ast[i].expr);
            if init_expr.is_some() {
                let (before, after) = extract_side_effects(ast, tmp, init_expr, SIDE_STMT);
                if !before.is_empty() || !after.is_empty() {
                    let old = ast.copy_stmt(s);
                    ast[s].expr = None;
                    ast[s].decl = None;
                    ast[s].op = StmtOp::BlockNoBrace;
                    let mut block = before;
                    block.push(old);
                    block.extend(after);
                    ast[s].block = block;
                }
            }
        }

        StmtOp::ArgBegin => {
            // Historical macro: treat the block as switch ARGBEGIN { ... }.
            let body = ast[s].block.first().copied();
            ast[s].op = StmtOp::Switch;
            ast[s].body = body;
            ast[s].block = Vec::new();
            let tag = ast.expr(ExprOp::Name);
            ast[tag].text = "ARGBEGIN".to_string();
            ast[s].expr = Some(tag);
            rewrite_switch_stmt(ast, tmp, s);
        }
        StmtOp::Switch => rewrite_switch_stmt(ast, tmp, s),

        _ => {}
    }
}

/// Shared by `if` and `return`: hoist side effects out of the controlling
/// expression; the host statement becomes a BlockNoBrace when fix-ups exist.
fn rewrite_cond_stmt(ast: &mut Ast, tmp: &mut TmpGen, s: StmtId) {
    let (before, _) = extract_side_effects(ast, tmp, ast[s].expr, SIDE_NO_AFTER);
    if !before.is_empty() {
        let old = ast.copy_stmt(s);
        ast[s].expr = None;
        ast[s].body = None;
        ast[s].else_ = None;
        ast[s].op = StmtOp::BlockNoBrace;
        let mut block = before;
        block.push(old);
        ast[s].block = block;
    }
}

fn rewrite_switch_stmt(ast: &mut Ast, tmp: &mut TmpGen, s: StmtId) {
    let (before, _) = extract_side_effects(ast, tmp, ast[s].expr, SIDE_NO_AFTER);
    if !before.is_empty() {
        let old = ast.copy_stmt(s);
        ast[s].expr = None;
        ast[s].body = None;
        ast[s].else_ = None;
        ast[s].op = StmtOp::BlockNoBrace;
        let mut block = before;
        block.push(old);
        ast[s].block = block;
        // Recursion rewrites the new inner switch.
        return;
    }
    rewrite_switch(ast, s);
}

fn rewrite_for(ast: &mut Ast, tmp: &mut TmpGen, s: StmtId) {
    fix_for_andand(ast, tmp, s);

    // Leftover empty comma lists from earlier extraction rounds print as
    // nothing; drop them.
    for clause in [ast[s].pre, ast[s].post] {
        if let Some(e) = clause {
            if ast[e].op == ExprOp::Comma && ast[e].list.is_empty() {
                if ast[s].pre == Some(e) {
                    ast[s].pre = None;
                } else {
                    ast[s].post = None;
                }
            }
        }
    }

    let (before1, _) = extract_side_effects(ast, tmp, ast[s].pre, SIDE_STMT | SIDE_NO_AFTER);
    let (before2, _) = extract_side_effects(ast, tmp, ast[s].expr, SIDE_NO_AFTER);
    if !before2.is_empty() {
        let x = ast[s].expr.take().expect("condition present");
        let body = force_block(ast, ast[s].body);
        ast[s].body = Some(body);
        let not_x = ast.unary(ExprOp::Not, x);
        let brk = ast.stmt(StmtOp::Break);
        let top = ast.alloc_stmt(Stmt {
            op: StmtOp::If,
            expr: Some(not_x),
            body: Some(brk),
            ..Stmt::default()
        });
        let mut block = before2;
        block.push(top);
        block.extend(ast[body].block.iter().copied());
        ast[body].block = block;
    }
    if !before1.is_empty() {
        let old = ast.copy_stmt(s);
        ast[s].pre = None;
        ast[s].expr = None;
        ast[s].post = None;
        ast[s].body = None;
        ast[s].op = StmtOp::BlockNoBrace;
        let mut block = before1;
        block.push(old);
        ast[s].block = block;
    }
    let (before, after) = extract_side_effects(ast, tmp, ast[s].post, SIDE_STMT);
    if !before.is_empty() || !after.is_empty() {
        let post = ast[s].post.take().expect("post present");
        let mut all = before;
        if !(ast[post].op == ExprOp::Comma && ast[post].list.is_empty()) {
            all.push(ast.stmt_expr(post));
        }
        all.extend(after);
        let block_expr = ast.expr(ExprOp::ExprBlock);
        ast[block_expr].block = all;
        ast[s].post = Some(block_expr);
    }
}

fn need_fix_bool(ast: &Ast, x: ExprId) -> bool {
    match ast[x].op {
        ExprOp::SideEffectFunc => ast[x].text != "bool",
        ExprOp::EqEq
        | ExprOp::Not
        | ExprOp::NotEq
        | ExprOp::Lt
        | ExprOp::LtEq
        | ExprOp::Gt
        | ExprOp::GtEq
        | ExprOp::AndAnd
        | ExprOp::OrOr => false,
        ExprOp::Paren => need_fix_bool(ast, ast[x].left.expect("paren has an operand")),
        _ => true,
    }
}

/// Wrap a non-boolean condition as `x != 0`, or `x != nil` for a
/// pointer-typed name.
fn fix_bool(ast: &mut Ast, x: ExprId) {
    if !need_fix_bool(ast, x) {
        return;
    }
    let mut old = ast.copy_expr(x);
    if ast[old].op == ExprOp::Paren {
        old = ast[old].left.expect("paren has an operand");
    }
    let cmp = if ast.is_ptr_name(old) { "nil" } else { "0" };
    let mut rhs = Expr::new(ExprOp::Name);
    rhs.text = cmp.to_string();
    let rhs = ast.alloc_expr(rhs);
    let node = &mut ast[x];
    node.op = ExprOp::NotEq;
    node.text = String::new();
    node.left = Some(old);
    node.right = Some(rhs);
    node.list = Vec::new();
    node.xdecl = None;
    node.xtype = None;
}

/// Rewrite `for(; x && (y = z) && ...;)` so the assignment clauses become
/// `if !(...) { break }` statements at the top of the body.
fn fix_for_andand(ast: &mut Ast, tmp: &mut TmpGen, s: StmtId) {
    let mut changed = false;
    let mut clauses = split_expr(ast, ast[s].expr, ExprOp::AndAnd);
    let mut i = clauses.len();
    while i > 1 {
        i -= 1;
        let (before, _) = extract_side_effects(ast, tmp, Some(clauses[i]), SIDE_NO_AFTER);
        if before.is_empty() {
            continue;
        }
        changed = true;
        let body = force_block(ast, ast[s].body);
        ast[s].body = Some(body);
        let tail = join_expr(ast, &clauses[i..], ExprOp::AndAnd).expect("nonempty clause list");
        let not_tail = ast.unary(ExprOp::Not, tail);
        let brk = ast.stmt(StmtOp::Break);
        let guard = ast.alloc_stmt(Stmt {
            op: StmtOp::If,
            expr: Some(not_tail),
            body: Some(brk),
            ..Stmt::default()
        });
        let mut block = before;
        block.push(guard);
        let wrapper = ast.alloc_stmt(Stmt {
            op: StmtOp::BlockNoBrace,
            block,
            ..Stmt::default()
        });
        ast[body].block.insert(0, wrapper);
        clauses.truncate(i);
    }
    if changed {
        ast[s].expr = join_expr(ast, &clauses, ExprOp::AndAnd);
    }
}

/// Rewrite `if (x && (y = z) && ...) body` to `if x { y = z; if ... body }`.
fn fix_if_andand(ast: &mut Ast, tmp: &mut TmpGen, s: StmtId) {
    let mut changed = false;
    let mut clauses = split_expr(ast, ast[s].expr, ExprOp::AndAnd);
    let mut i = clauses.len();
    while i > 1 {
        i -= 1;
        let (before, _) = extract_side_effects(ast, tmp, Some(clauses[i]), SIDE_NO_AFTER);
        if before.is_empty() {
            continue;
        }
        changed = true;
        let cond = join_expr(ast, &clauses[i..], ExprOp::AndAnd).expect("nonempty clause list");
        let inner = ast.alloc_stmt(Stmt {
            op: StmtOp::If,
            expr: Some(cond),
            body: ast[s].body,
            ..Stmt::default()
        });
        let mut block = before;
        block.push(inner);
        let wrapper = ast.alloc_stmt(Stmt {
            op: StmtOp::BlockNoBrace,
            block,
            ..Stmt::default()
        });
        ast[s].body = Some(wrapper);
        clauses.truncate(i);
    }
    if changed {
        ast[s].expr = join_expr(ast, &clauses, ExprOp::AndAnd);
    }
}

fn split_expr(ast: &Ast, x: Option<ExprId>, op: ExprOp) -> Vec<ExprId> {
    let Some(mut x) = x else { return Vec::new() };
    let mut list = Vec::new();
    while ast[x].op == op {
        list.push(ast[x].right.expect("binary op has operands"));
        x = ast[x].left.expect("binary op has operands");
    }
    list.push(x);
    list.reverse();
    list
}

fn join_expr(ast: &mut Ast, list: &[ExprId], op: ExprOp) -> Option<ExprId> {
    let (&first, rest) = list.split_first()?;
    let mut x = first;
    for &y in rest {
        x = ast.binary(op, x, y);
    }
    Some(x)
}

// ----- switch reshaping -----

/// Splice BlockNoBrace children into a block so case grouping is visible.
pub fn inline_block_nobrace(ast: &mut Ast, x: StmtId) {
    if ast[x].op != StmtOp::Block {
        return;
    }
    let items = ast[x].block.clone();
    let mut list = Vec::new();
    for stmt in items {
        // Keep the statement itself in place for its labels and comments.
        list.push(stmt);
        if ast[stmt].op == StmtOp::BlockNoBrace {
            list.extend(ast[stmt].block.iter().copied());
            ast[stmt].op = StmtOp::Empty;
            ast[stmt].block = Vec::new();
        }
    }
    ast[x].block = list;
}

fn rewrite_switch(ast: &mut Ast, swt: StmtId) {
    let Some(body) = ast[swt].body else { return };
    inline_block_nobrace(ast, body);

    let items = ast[body].block.clone();
    let mut out: Vec<StmtId> = Vec::new();
    let mut have_case = false;
    for stmt in items {
        // Put labels after cases, so that they go to the same place.
        let labels = ast[stmt].labels.clone();
        let mut names = Vec::new();
        let mut cases = Vec::new();
        let mut def = None;
        for lab in labels {
            match lab.op {
                LabelOp::LabelName => names.push(lab),
                LabelOp::Default => def = Some(lab),
                LabelOp::Case => cases.push(lab),
            }
        }
        if let Some(def) = def {
            cases.push(def); // default prints last
        }
        let ncases = cases.len();
        if ncases > 0 && !names.is_empty() {
            let mut all = cases;
            all.extend(names);
            ast[stmt].labels = all;
        }
        if ncases > 0 {
            // Remove break or add fallthrough if needed.
            if have_case {
                let mut i = out.len() as isize - 1;
                while i >= 0 && ast[out[i as usize]].op == StmtOp::Empty {
                    i -= 1;
                }
                if i >= 0 {
                    let prev = out[i as usize];
                    if ast[prev].op == StmtOp::Break && ast[prev].labels.is_empty() {
                        ast[prev].op = StmtOp::Empty;
                    } else if falls_through(ast, prev) {
                        let ft = ast.stmt(StmtOp::Fallthrough);
                        out.push(ft);
                    }
                }
            }
            have_case = true;
        }
        out.push(stmt);
    }

    // Remove final break.
    let mut i = out.len() as isize - 1;
    while i >= 0 && ast[out[i as usize]].op == StmtOp::Empty {
        i -= 1;
    }
    if i >= 0 {
        let last = out[i as usize];
        if ast[last].op == StmtOp::Break && ast[last].labels.is_empty() {
            ast[last].op = StmtOp::Empty;
        }
    }

    ast[body].block = out;
}

/// Whether control can run off the end of this statement into the next
/// case group.
fn falls_through(ast: &Ast, x: StmtId) -> bool {
    match ast[x].op {
        StmtOp::Break | StmtOp::Continue | StmtOp::Return | StmtOp::Goto => false,
        StmtOp::StmtExpr => {
            let e = ast[x].expr.expect("StmtExpr carries an expression");
            if ast[e].op == ExprOp::Call {
                if let Some(callee) = ast[e].left {
                    if ast[callee].op == ExprOp::Name
                        && matches!(ast[callee].text.as_str(), "sysfatal" | "fatal")
                    {
                        return false;
                    }
                }
            }
            !(ast[e].op == ExprOp::Name && ast[e].text == "fallthrough")
        }
        _ => true,
    }
}

fn force_block(ast: &mut Ast, x: Option<StmtId>) -> StmtId {
    match x {
        Some(x) if ast[x].op == StmtOp::Block => x,
        Some(x) => ast.alloc_stmt(Stmt {
            op: StmtOp::Block,
            block: vec![x],
            ..Stmt::default()
        }),
        None => ast.stmt(StmtOp::Block),
    }
}

// ----- side-effect extraction -----

pub fn extract_side_effects(
    ast: &mut Ast,
    tmp: &mut TmpGen,
    x: Option<ExprId>,
    mode: u8,
) -> (Vec<StmtId>, Vec<StmtId>) {
    let mut before = Vec::new();
    let mut after = Vec::new();
    if let Some(x) = x {
        do_side_effects(ast, tmp, x, &mut before, &mut after, mode);
    }
    (before, after)
}

fn do_side_effects(
    ast: &mut Ast,
    tmp: &mut TmpGen,
    x: ExprId,
    before: &mut Vec<StmtId>,
    after: &mut Vec<StmtId>,
    mode: u8,
) {
    // Cannot hoist side effects from conditionally evaluated expressions
    // into unconditionally evaluated statement lists. Detect, flag, keep
    // going.
    match ast[x].op {
        ExprOp::Cond => {
            let list = ast[x].list.clone();
            do_side_effects(ast, tmp, list[0], before, after, mode & !SIDE_STMT | SIDE_NO_AFTER);
            check_no_side_effects(ast, tmp, list[1], 0, "unknown");
            check_no_side_effects(ast, tmp, list[2], 0, "unknown");
        }
        ExprOp::AndAnd | ExprOp::OrOr => {
            let (left, right) = (ast[x].left, ast[x].right);
            if let Some(left) = left {
                do_side_effects(ast, tmp, left, before, after, mode & !SIDE_STMT | SIDE_NO_AFTER);
            }
            if let Some(right) = right {
                check_no_side_effects(ast, tmp, right, 0, "bool");
            }
        }
        ExprOp::Comma => {
            let list = ast[x].list.clone();
            let mut leftover = Vec::new();
            for (i, &y) in list.iter().enumerate() {
                let mut m = mode | SIDE_NO_AFTER;
                if i + 1 < list.len() {
                    m |= SIDE_STMT;
                }
                do_side_effects(ast, tmp, y, before, after, m);
                match ast[y].op {
                    ExprOp::PostInc | ExprOp::PostDec => {
                        let stmt = ast.stmt_expr(y);
                        before.push(stmt);
                    }
                    op if op.is_assign() => {
                        let stmt = ast.stmt_expr(y);
                        before.push(stmt);
                    }
                    _ => leftover.push(y),
                }
            }
            ast[x].list = leftover;
        }
        _ => {
            let (left, right, list) = (ast[x].left, ast[x].right, ast[x].list.clone());
            if let Some(left) = left {
                do_side_effects(ast, tmp, left, before, after, mode & !SIDE_STMT);
            }
            if let Some(right) = right {
                do_side_effects(ast, tmp, right, before, after, mode & !SIDE_STMT);
            }
            for y in list {
                do_side_effects(ast, tmp, y, before, after, mode & !SIDE_STMT);
            }
        }
    }

    if mode & SIDE_STMT != 0 {
        // Expression as statement: x++ may stay, ++x becomes x++,
        // x op= y and calls stay.
        match ast[x].op {
            ExprOp::PreInc => {
                ast[x].op = ExprOp::PostInc;
                return;
            }
            ExprOp::PreDec => {
                ast[x].op = ExprOp::PostDec;
                return;
            }
            ExprOp::PostInc | ExprOp::PostDec | ExprOp::Call => return,
            op if op.is_assign() => return,
            _ => {}
        }
    }

    match ast[x].op {
        op if op.is_assign() => {
            let left = ast[x].left.expect("assignment has a target");
            let left = force_cheap(ast, before, left);
            ast[x].left = Some(left);
            let old = ast.copy_expr(x);
            let stmt = ast.stmt_expr(old);
            before.push(stmt);
            ast.fix_merge(x, left);
        }

        ExprOp::PreInc | ExprOp::PreDec => {
            let left = ast[x].left.expect("inc/dec has a target");
            let left = force_cheap(ast, before, left);
            ast[x].left = Some(left);
            let old = ast.copy_expr(x);
            ast[old].op = if ast[x].op == ExprOp::PreInc {
                ExprOp::PostInc
            } else {
                ExprOp::PostDec
            };
            let stmt = ast.stmt_expr(old);
            before.push(stmt);
            ast.fix_merge(x, left);
        }

        ExprOp::PostInc | ExprOp::PostDec => {
            let left = ast[x].left.expect("inc/dec has a target");
            let left = force_cheap(ast, before, left);
            ast[x].left = Some(left);
            if mode & SIDE_NO_AFTER != 0 {
                // Not allowed to generate fix-ups afterward: snapshot the
                // value first, bump the original immediately.
                let d = ast.alloc_decl(Decl {
                    name: tmp.next(),
                    ty: ast[left].xtype,
                    ..Decl::default()
                });
                let name = ast[d].name.clone();
                let lhs = ast.name_ref(name.clone(), Some(d));
                let eq = ast.binary(ExprOp::ColonEq, lhs, left);
                let old = ast.copy_expr(left);
                let op = ast[x].op;
                let bump = ast.unary(op, old);
                let eq_stmt = ast.stmt_expr(eq);
                let bump_stmt = ast.stmt_expr(bump);
                before.push(eq_stmt);
                before.push(bump_stmt);
                let node = &mut ast[x];
                node.op = ExprOp::Name;
                node.text = name;
                node.xdecl = Some(d);
                node.left = None;
            } else {
                let old = ast.copy_expr(x);
                let stmt = ast.stmt_expr(old);
                after.push(stmt);
                ast.fix_merge(x, left);
            }
        }

        ExprOp::Cond => {
            // c ? y : z becomes
            //	var tmp T
            //	if c { tmp = y } else { tmp = z }
            let list = ast[x].list.clone();
            let d = ast.alloc_decl(Decl {
                name: tmp.next(),
                ty: ast[x].xtype,
                ..Decl::default()
            });
            let name = ast[d].name.clone();
            let decl_stmt = ast.alloc_stmt(Stmt {
                op: StmtOp::StmtDecl,
                decl: Some(d),
                ..Stmt::default()
            });
            let then_lhs = ast.name_ref(name.clone(), Some(d));
            let then_eq = ast.binary(ExprOp::Eq, then_lhs, list[1]);
            let then_stmt = ast.stmt_expr(then_eq);
            let else_lhs = ast.name_ref(name.clone(), Some(d));
            let else_eq = ast.binary(ExprOp::Eq, else_lhs, list[2]);
            let else_stmt = ast.stmt_expr(else_eq);
            let branch = ast.alloc_stmt(Stmt {
                op: StmtOp::If,
                expr: Some(list[0]),
                body: Some(then_stmt),
                else_: Some(else_stmt),
                ..Stmt::default()
            });
            before.push(decl_stmt);
            before.push(branch);
            let node = &mut ast[x];
            node.op = ExprOp::Name;
            node.text = name;
            node.xdecl = Some(d);
            node.list = Vec::new();
        }

        _ => {}
    }
}

/// Return an lvalue that is safe to evaluate twice.
fn force_cheap(_ast: &mut Ast, _before: &mut [StmtId], x: ExprId) -> ExprId {
    // Stubbed like the historical implementation: complex lvalues are
    // occasionally evaluated twice.
    x
}

/// Verify `x` is side-effect free; when it is not, wrap it in a
/// SideEffectFunc marker so the emitted Go fails to compile at a named
/// annotation instead of silently misordering effects.
fn check_no_side_effects(ast: &mut Ast, tmp: &mut TmpGen, x: ExprId, mode: u8, typ: &str) {
    let mut before = Vec::new();
    let mut after = Vec::new();
    do_side_effects(ast, tmp, x, &mut before, &mut after, mode);
    if !before.is_empty() || !after.is_empty() {
        let old = ast.copy_expr(x);
        let node = &mut ast[x];
        node.op = ExprOp::SideEffectFunc;
        node.left = Some(old);
        node.right = None;
        node.block = before;
        node.after = after;
        node.text = typ.to_string();
    }
}

// ----- boolean simplification -----

/// Apply De Morgan's law and invert comparisons to simplify negation of
/// boolean expressions. Float comparisons are left alone: NaN makes
/// `!(a < b)` and `a >= b` different things.
pub fn simplify_bool(ast: &mut Ast) {
    postorder(ast, Node::Prog, |ast, node| {
        let Node::Expr(x) = node else { return };
        if ast[x].op != ExprOp::Not {
            return;
        }
        let mut y = ast[x].left.expect("not has an operand");
        while ast[y].op == ExprOp::Paren {
            y = ast[y].left.expect("paren has an operand");
        }
        match ast[y].op {
            ExprOp::AndAnd | ExprOp::OrOr => {
                let flipped = if ast[y].op == ExprOp::AndAnd {
                    ExprOp::OrOr
                } else {
                    ExprOp::AndAnd
                };
                let inner = ast[y].clone();
                ast[x] = inner;
                let left = ast[x].left.expect("binary op has operands");
                let right = ast[x].right.expect("binary op has operands");
                let not_left = ast.unary(ExprOp::Not, left);
                let not_right = ast.unary(ExprOp::Not, right);
                let node = &mut ast[x];
                node.left = Some(not_left);
                node.right = Some(not_right);
                node.op = flipped;
            }
            ExprOp::EqEq
            | ExprOp::NotEq
            | ExprOp::Lt
            | ExprOp::LtEq
            | ExprOp::Gt
            | ExprOp::GtEq => {
                let operand = ast[y].left.expect("comparison has operands");
                if ast.is_float(ast[operand].xtype) {
                    return;
                }
                let flipped = match ast[y].op {
                    ExprOp::EqEq => ExprOp::NotEq,
                    ExprOp::NotEq => ExprOp::EqEq,
                    ExprOp::Lt => ExprOp::GtEq,
                    ExprOp::LtEq => ExprOp::Gt,
                    ExprOp::Gt => ExprOp::LtEq,
                    _ => ExprOp::Lt,
                };
                let inner = ast[y].clone();
                ast[x] = inner;
                ast[x].op = flipped;
            }
            _ => {}
        }
    });
}
