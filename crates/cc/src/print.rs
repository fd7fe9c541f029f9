//! Go-syntax printer for the (rewritten) C tree.
//!
//! The printer is the emitter half of the translator: it renders a `Prog`
//! whose statements have already been reshaped into Go form. It makes no
//! attempt to verify that what it prints compiles; `SideEffectFunc` markers
//! in particular are printed as deliberately bogus calls so a human lands on
//! them.
//!
//! Layout conventions are gofmt's: tabs, one statement per line, case
//! clauses at switch level, a single blank line wherever the source had a
//! paragraph break (encoded as empty comments).

use crate::ast::*;

/// Go operator precedence, used to decide where parentheses are required.
/// Higher binds tighter.
fn prec(ast: &Ast, e: ExprId) -> u8 {
    match ast[e].op {
        ExprOp::OrOr => 1,
        ExprOp::AndAnd => 2,
        ExprOp::EqEq
        | ExprOp::NotEq
        | ExprOp::Lt
        | ExprOp::LtEq
        | ExprOp::Gt
        | ExprOp::GtEq => 3,
        ExprOp::Add | ExprOp::Sub | ExprOp::Or | ExprOp::Xor => 4,
        ExprOp::Mul
        | ExprOp::Div
        | ExprOp::Mod
        | ExprOp::Lsh
        | ExprOp::Rsh
        | ExprOp::And => 5,
        ExprOp::Addr
        | ExprOp::Indir
        | ExprOp::Plus
        | ExprOp::Minus
        | ExprOp::Twid
        | ExprOp::Not => 6,
        ExprOp::Eq
        | ExprOp::ColonEq
        | ExprOp::AddEq
        | ExprOp::SubEq
        | ExprOp::MulEq
        | ExprOp::DivEq
        | ExprOp::ModEq
        | ExprOp::XorEq
        | ExprOp::OrEq
        | ExprOp::AndEq
        | ExprOp::LshEq
        | ExprOp::RshEq
        | ExprOp::Comma
        | ExprOp::Cond => 0,
        _ => 7,
    }
}

pub struct Printer<'a> {
    ast: &'a Ast,
    buf: String,
    indent: usize,
}

impl<'a> Printer<'a> {
    pub fn new(ast: &'a Ast) -> Self {
        Printer {
            ast,
            buf: String::new(),
            indent: 0,
        }
    }

    pub fn into_string(self) -> String {
        self.buf
    }

    pub fn raw(&mut self, s: &str) {
        self.buf.push_str(s);
    }

    fn tabs(&mut self) {
        for _ in 0..self.indent {
            self.buf.push('\t');
        }
    }

    fn newline(&mut self) {
        self.buf.push('\n');
    }

    /// Print a `before`/`after` comment block at the current indent.
    pub fn print_comments(&mut self, comments: &[Comment]) {
        for c in comments {
            if c.text.is_empty() {
                self.newline();
            } else {
                self.tabs();
                self.buf.push_str(&c.text);
                self.newline();
            }
        }
    }

    fn print_suffix(&mut self, comments: &[Comment]) {
        for c in comments {
            if !c.text.is_empty() {
                self.buf.push(' ');
                self.buf.push_str(&c.text);
            }
        }
    }

    // ----- declarations -----

    /// Print a top-level declaration.
    pub fn print_decl(&mut self, d: DeclId) {
        let decl = &self.ast[d];
        self.print_comments(&decl.syntax.comments.before);
        if decl.blank {
            self.print_comments(&decl.syntax.comments.after);
            return;
        }

        if decl.storage.contains(Storage::TYPEDEF) {
            self.tabs();
            self.raw("type ");
            self.raw(&decl.name.clone());
            self.raw(" ");
            let ty = decl.ty;
            self.print_type_defn(ty);
        } else if decl.ty.is_none() || decl.enum_value.is_some() {
            // Enumerator hoisted to the top level.
            self.tabs();
            self.raw("const ");
            self.raw(&decl.name.clone());
            self.raw(" = ");
            if let Some(init) = decl.init {
                let expr = self.ast[init].expr;
                if let Some(e) = expr {
                    self.print_expr(e, 0);
                }
            } else if let Some(v) = decl.enum_value {
                self.raw(&v.to_string());
            } else {
                self.raw("0");
            }
        } else if matches!(self.ast.type_kind(decl.ty), Some(TypeKind::Func)) {
            let body = match decl.body {
                Some(b) => b,
                None => return,
            };
            self.tabs();
            self.raw("func ");
            self.raw(&decl.name.clone());
            let ty = decl.ty.unwrap();
            self.print_func_signature(ty);
            self.raw(" {");
            self.newline();
            self.indent += 1;
            self.print_block_items(body);
            self.indent -= 1;
            self.tabs();
            self.raw("}");
        } else {
            self.tabs();
            self.raw("var ");
            self.raw(&decl.name.clone());
            self.raw(" ");
            let ty = decl.ty.unwrap();
            self.raw(&self.type_string(ty));
            if let Some(init) = decl.init {
                self.raw(" = ");
                self.print_init(init, decl.ty);
            }
        }
        let suffix = self.ast[d].syntax.comments.suffix.clone();
        self.print_suffix(&suffix);
        self.newline();
        let after = self.ast[d].syntax.comments.after.clone();
        self.print_comments(&after);
    }

    fn print_func_signature(&mut self, ty: TypeId) {
        self.raw("(");
        let params = self.ast[ty].decls.clone();
        for (i, &param) in params.iter().enumerate() {
            if i > 0 {
                self.raw(", ");
            }
            let p = &self.ast[param];
            if !p.name.is_empty() {
                self.raw(&p.name.clone());
                if p.ty.is_some() {
                    self.raw(" ");
                }
            }
            if let Some(pt) = p.ty {
                self.raw(&self.type_string(pt));
            }
        }
        self.raw(")");
        if let Some(ret) = self.ast[ty].base {
            if self.ast[ret].kind != TypeKind::Void {
                self.raw(" ");
                self.raw(&self.type_string(ret));
            }
        }
    }

    /// Right-hand side of a `type` declaration: structs print multiline.
    fn print_type_defn(&mut self, ty: Option<TypeId>) {
        let Some(ty) = ty else {
            self.raw("int");
            return;
        };
        match self.ast[ty].kind {
            TypeKind::Struct | TypeKind::Union => {
                self.raw("struct {");
                self.newline();
                self.indent += 1;
                let fields = self.ast[ty].decls.clone();
                for &field in &fields {
                    let before = self.ast[field].syntax.comments.before.clone();
                    self.print_comments(&before);
                    self.tabs();
                    self.raw(&self.ast[field].name.clone());
                    self.raw(" ");
                    if let Some(ft) = self.ast[field].ty {
                        self.raw(&self.type_string(ft));
                    }
                    let suffix = self.ast[field].syntax.comments.suffix.clone();
                    self.print_suffix(&suffix);
                    self.newline();
                    let after = self.ast[field].syntax.comments.after.clone();
                    self.print_comments(&after);
                }
                self.indent -= 1;
                self.tabs();
                self.raw("}");
            }
            TypeKind::Enum => self.raw("int"),
            _ => {
                self.raw(&self.type_string(ty));
            }
        }
    }

    /// Go spelling of a type, for inline positions.
    pub fn type_string(&self, ty: TypeId) -> String {
        let t = &self.ast[ty];
        match t.kind {
            TypeKind::Void => "unsafe.Pointer".to_string(), // only reachable as a pointer base
            TypeKind::Ptr => match t.base {
                Some(base) if self.ast[base].kind == TypeKind::Void => {
                    "unsafe.Pointer".to_string()
                }
                Some(base) => {
                    let inner = self.type_string(base);
                    if t.slice {
                        format!("[]{}", inner)
                    } else {
                        format!("*{}", inner)
                    }
                }
                None => "*byte".to_string(),
            },
            TypeKind::Array => {
                let inner = t.base.map(|b| self.type_string(b)).unwrap_or_default();
                match t.width {
                    Some(w) => {
                        let mut p = Printer::new(self.ast);
                        p.print_expr(w, 0);
                        format!("[{}]{}", p.into_string(), inner)
                    }
                    None => format!("[]{}", inner),
                }
            }
            TypeKind::Struct | TypeKind::Union => {
                if !t.tag.is_empty() {
                    t.tag.clone()
                } else if !t.name.is_empty() {
                    t.name.clone()
                } else {
                    let mut s = String::from("struct{ ");
                    for (i, &field) in t.decls.iter().enumerate() {
                        if i > 0 {
                            s.push_str("; ");
                        }
                        s.push_str(&self.ast[field].name);
                        s.push(' ');
                        if let Some(ft) = self.ast[field].ty {
                            s.push_str(&self.type_string(ft));
                        }
                    }
                    s.push_str(" }");
                    s
                }
            }
            TypeKind::Enum => {
                if !t.tag.is_empty() {
                    t.tag.clone()
                } else {
                    "int".to_string()
                }
            }
            TypeKind::Func => {
                let mut s = String::from("func(");
                for (i, &param) in t.decls.iter().enumerate() {
                    if i > 0 {
                        s.push_str(", ");
                    }
                    if let Some(pt) = self.ast[param].ty {
                        s.push_str(&self.type_string(pt));
                    }
                }
                s.push(')');
                if let Some(ret) = t.base {
                    if self.ast[ret].kind != TypeKind::Void {
                        s.push(' ');
                        s.push_str(&self.type_string(ret));
                    }
                }
                s
            }
            TypeKind::TypedefType | TypeKind::Named => {
                if !t.name.is_empty() {
                    t.name.clone()
                } else if let Some(base) = t.base {
                    self.type_string(base)
                } else {
                    "int".to_string()
                }
            }
            kind => kind.go_name().to_string(),
        }
    }

    fn print_init(&mut self, init: InitId, ty: Option<TypeId>) {
        let node = self.ast[init].clone();
        if let Some(expr) = node.expr {
            self.print_expr(expr, 0);
            return;
        }
        if let Some(ty) = ty {
            self.raw(&self.type_string(ty));
        }
        self.raw("{");
        for (i, &braced) in node.braced.iter().enumerate() {
            if i > 0 {
                self.raw(", ");
            }
            self.print_init(braced, None);
        }
        self.raw("}");
    }

    // ----- statements -----

    /// Print the children of a block statement, without the braces.
    pub fn print_block_items(&mut self, block: StmtId) {
        let (items, after) = {
            let s = &self.ast[block];
            (s.block.clone(), s.syntax.comments.after.clone())
        };
        if self.ast[block].op == StmtOp::Block || self.ast[block].op == StmtOp::BlockNoBrace {
            for item in items {
                self.print_stmt(item, false);
            }
            self.print_comments(&after);
        } else {
            self.print_stmt(block, false);
        }
    }

    fn print_body(&mut self, body: Option<StmtId>) {
        self.raw(" {");
        self.newline();
        self.indent += 1;
        if let Some(body) = body {
            self.print_block_items(body);
        }
        self.indent -= 1;
        self.tabs();
        self.raw("}");
    }

    /// Print one statement with its comments and name labels. Case labels
    /// are the switch loop's business (`print_switch_item`), which passes
    /// `skip_before` after printing the lead comments itself.
    pub fn print_stmt(&mut self, s: StmtId, skip_before: bool) {
        let node = self.ast[s].clone();
        if !skip_before {
            self.print_comments(&node.syntax.comments.before);
        }

        for lab in node.labels.iter().filter(|l| l.op == LabelOp::LabelName) {
            self.tabs();
            self.raw(&lab.name);
            self.raw(":");
            self.newline();
        }

        match node.op {
            StmtOp::Empty => {
                if !node.syntax.comments.suffix.is_empty() {
                    self.tabs();
                    let suffix = node.syntax.comments.suffix.clone();
                    // An empty statement with only a suffix comment keeps the
                    // comment on its own line.
                    for c in &suffix {
                        self.raw(&c.text);
                    }
                    self.newline();
                }
                self.print_comments(&node.syntax.comments.after);
                return;
            }
            StmtOp::Block => {
                self.tabs();
                self.raw("{");
                self.newline();
                self.indent += 1;
                self.print_block_items(s);
                self.indent -= 1;
                self.tabs();
                self.raw("}");
            }
            StmtOp::BlockNoBrace => {
                for &child in &node.block {
                    self.print_stmt(child, false);
                }
                return;
            }
            StmtOp::StmtExpr => {
                self.tabs();
                if let Some(e) = node.expr {
                    self.print_expr(e, 0);
                }
            }
            StmtOp::StmtDecl => {
                let decl = node.decl.expect("StmtDecl carries a decl");
                self.tabs();
                self.print_local_decl(decl);
            }
            StmtOp::If => {
                self.tabs();
                self.print_if(s);
            }
            StmtOp::For | StmtOp::While | StmtOp::Do => {
                self.tabs();
                self.raw("for ");
                if node.pre.is_some() || node.post.is_some() {
                    if let Some(pre) = node.pre {
                        self.print_expr(pre, 0);
                    }
                    self.raw(";");
                    if let Some(cond) = node.expr {
                        self.raw(" ");
                        self.print_expr(cond, 0);
                    }
                    self.raw(";");
                    if let Some(post) = node.post {
                        self.raw(" ");
                        self.print_expr(post, 0);
                    }
                    self.raw(" ");
                } else if let Some(cond) = node.expr {
                    self.print_expr(cond, 0);
                    self.raw(" ");
                }
                self.print_for_body(node.body);
            }
            StmtOp::Switch | StmtOp::ArgBegin => {
                self.tabs();
                self.raw("switch ");
                if let Some(e) = node.expr {
                    self.print_expr(e, 0);
                    self.raw(" ");
                }
                self.raw("{");
                self.newline();
                if let Some(body) = node.body {
                    let items = self.ast[body].block.clone();
                    for item in items {
                        self.print_switch_item(item);
                    }
                    let after = self.ast[body].syntax.comments.after.clone();
                    self.print_comments(&after);
                }
                self.tabs();
                self.raw("}");
            }
            StmtOp::Return => {
                self.tabs();
                self.raw("return");
                if let Some(e) = node.expr {
                    self.raw(" ");
                    self.print_expr(e, 0);
                }
            }
            StmtOp::Break => {
                self.tabs();
                self.raw("break");
            }
            StmtOp::Continue => {
                self.tabs();
                self.raw("continue");
            }
            StmtOp::Goto => {
                self.tabs();
                self.raw("goto ");
                self.raw(&node.text);
            }
            StmtOp::Fallthrough => {
                self.tabs();
                self.raw("fallthrough");
            }
        }

        self.print_suffix(&node.syntax.comments.suffix);
        self.newline();
        self.print_comments(&node.syntax.comments.after);
    }

    fn print_for_body(&mut self, body: Option<StmtId>) {
        self.raw("{");
        self.newline();
        self.indent += 1;
        if let Some(body) = body {
            self.print_block_items(body);
        }
        self.indent -= 1;
        self.tabs();
        self.raw("}");
    }

    fn print_if(&mut self, s: StmtId) {
        let node = self.ast[s].clone();
        self.raw("if ");
        if let Some(cond) = node.expr {
            self.print_expr(cond, 0);
        }
        self.print_body(node.body);
        if let Some(else_) = node.else_ {
            if self.ast[else_].op == StmtOp::If && self.ast[else_].labels.is_empty() {
                self.raw(" else ");
                self.print_if(else_);
            } else if self.ast[else_].op == StmtOp::Block {
                self.raw(" else {");
                self.newline();
                self.indent += 1;
                self.print_block_items(else_);
                self.indent -= 1;
                self.tabs();
                self.raw("}");
            } else {
                self.raw(" else");
                self.print_body(Some(else_));
            }
        }
    }

    fn print_case_labels(&mut self, labels: &[Label]) {
        let cases: Vec<&Label> = labels.iter().filter(|l| l.op == LabelOp::Case).collect();
        if !cases.is_empty() {
            self.tabs();
            self.raw("case ");
            for (i, lab) in cases.iter().enumerate() {
                if i > 0 {
                    self.raw(", ");
                }
                if let Some(e) = lab.expr {
                    self.print_expr(e, 0);
                }
            }
            self.raw(":");
            self.newline();
        }
        if labels.iter().any(|l| l.op == LabelOp::Default) {
            self.tabs();
            self.raw("default:");
            self.newline();
        }
    }

    fn print_switch_item(&mut self, s: StmtId) {
        let labels = self.ast[s].labels.clone();
        let has_case = labels.iter().any(|l| l.op != LabelOp::LabelName);
        if has_case {
            let before = self.ast[s].syntax.comments.before.clone();
            self.print_comments(&before);
            self.print_case_labels(&labels);
        }
        self.indent += 1;
        self.print_stmt(s, has_case);
        self.indent -= 1;
    }

    fn print_local_decl(&mut self, d: DeclId) {
        let decl = self.ast[d].clone();
        if let Some(init) = decl.init {
            self.raw(&decl.name);
            self.raw(" := ");
            self.print_init(init, decl.ty);
            return;
        }
        self.raw("var ");
        self.raw(&decl.name);
        if let Some(ty) = decl.ty {
            self.raw(" ");
            self.raw(&self.type_string(ty));
        }
    }

    // ----- expressions -----

    /// Print `e`, parenthesizing if its precedence is below `min`.
    pub fn print_expr(&mut self, e: ExprId, min: u8) {
        let my = prec(self.ast, e);
        let node = self.ast[e].clone();
        let needs_paren = my < min && node.op != ExprOp::Paren;
        if needs_paren {
            self.raw("(");
        }
        match node.op {
            ExprOp::Name | ExprOp::String => self.raw(&node.text),
            ExprOp::Number => {
                let text = node
                    .text
                    .trim_end_matches(['u', 'U', 'l', 'L'])
                    .to_string();
                self.raw(if text.is_empty() { &node.text } else { &text });
            }
            ExprOp::Paren => {
                self.raw("(");
                if let Some(l) = node.left {
                    self.print_expr(l, 0);
                }
                self.raw(")");
            }
            ExprOp::Dot | ExprOp::Arrow => {
                if let Some(l) = node.left {
                    self.print_expr(l, 7);
                }
                self.raw(".");
                self.raw(&node.text);
            }
            ExprOp::Call => {
                if let Some(l) = node.left {
                    self.print_expr(l, 7);
                }
                self.raw("(");
                for (i, &arg) in node.list.iter().enumerate() {
                    if i > 0 {
                        self.raw(", ");
                    }
                    self.print_expr(arg, 0);
                }
                self.raw(")");
            }
            ExprOp::Index => {
                if let Some(l) = node.left {
                    self.print_expr(l, 7);
                }
                self.raw("[");
                if let Some(r) = node.right {
                    self.print_expr(r, 0);
                }
                self.raw("]");
            }
            ExprOp::PostInc | ExprOp::PostDec => {
                if let Some(l) = node.left {
                    self.print_expr(l, 7);
                }
                self.raw(if node.op == ExprOp::PostInc { "++" } else { "--" });
            }
            ExprOp::PreInc | ExprOp::PreDec => {
                // Should have been rewritten; keep the C spelling so the
                // reader sees what is left over.
                self.raw(if node.op == ExprOp::PreInc { "++" } else { "--" });
                if let Some(l) = node.left {
                    self.print_expr(l, 6);
                }
            }
            ExprOp::Addr => self.print_unary("&", node.left),
            ExprOp::Indir => self.print_unary("*", node.left),
            ExprOp::Plus => self.print_unary("+", node.left),
            ExprOp::Minus => self.print_unary("-", node.left),
            ExprOp::Twid => self.print_unary("^", node.left),
            ExprOp::Not => self.print_unary("!", node.left),
            ExprOp::SizeofExpr => {
                self.raw("sizeof(");
                if let Some(l) = node.left {
                    self.print_expr(l, 0);
                }
                self.raw(")");
            }
            ExprOp::SizeofType => {
                self.raw("sizeof(");
                if let Some(ty) = node.ty {
                    self.raw(&self.type_string(ty));
                }
                self.raw(")");
            }
            ExprOp::Cast => {
                let ty = node.ty.map(|t| self.type_string(t)).unwrap_or_default();
                if ty.starts_with('*') || ty.starts_with('[') || ty.starts_with("func") {
                    self.raw("(");
                    self.raw(&ty);
                    self.raw(")");
                } else {
                    self.raw(&ty);
                }
                self.raw("(");
                if let Some(l) = node.left {
                    self.print_expr(l, 0);
                }
                self.raw(")");
            }
            ExprOp::Cond => {
                // Survives only inside SideEffectFunc markers; printed in C
                // syntax on purpose.
                self.print_expr(node.list[0], 1);
                self.raw(" ? ");
                self.print_expr(node.list[1], 1);
                self.raw(" : ");
                self.print_expr(node.list[2], 1);
            }
            ExprOp::Comma => {
                for (i, &item) in node.list.iter().enumerate() {
                    if i > 0 {
                        self.raw(", ");
                    }
                    self.print_expr(item, 1);
                }
            }
            ExprOp::ExprBlock => {
                self.raw("func() {");
                for (i, &stmt) in node.block.iter().enumerate() {
                    self.raw(if i == 0 { " " } else { "; " });
                    self.print_stmt_flat(stmt);
                }
                self.raw(" }()");
            }
            ExprOp::SideEffectFunc => {
                self.raw(&node.text);
                self.raw("(");
                if node.block.is_empty() && node.after.is_empty() {
                    if let Some(l) = node.left {
                        self.print_expr(l, 0);
                    }
                } else {
                    self.raw("func() {");
                    for &stmt in node.block.iter().chain(node.after.iter()) {
                        self.raw(" ");
                        self.print_stmt_flat(stmt);
                        self.raw(";");
                    }
                    self.raw(" return ");
                    if let Some(l) = node.left {
                        self.print_expr(l, 0);
                    }
                    self.raw(" }()");
                }
                self.raw(")");
            }
            op if op.is_assign() || op == ExprOp::ColonEq => {
                if let Some(l) = node.left {
                    self.print_expr(l, 1);
                }
                self.raw(" ");
                self.raw(op.as_str());
                self.raw(" ");
                if let Some(r) = node.right {
                    self.print_expr(r, 1);
                }
            }
            op => {
                // Binary operator.
                let p = prec(self.ast, e);
                if let Some(l) = node.left {
                    self.print_expr(l, p);
                }
                self.raw(" ");
                self.raw(op.as_str());
                self.raw(" ");
                if let Some(r) = node.right {
                    self.print_expr(r, p + 1);
                }
            }
        }
        if needs_paren {
            self.raw(")");
        }
    }

    fn print_unary(&mut self, op: &str, operand: Option<ExprId>) {
        self.raw(op);
        if let Some(x) = operand {
            self.print_expr(x, 6);
        }
    }

    /// One-line statement rendering, for `ExprBlock` and `SideEffectFunc`.
    fn print_stmt_flat(&mut self, s: StmtId) {
        let node = self.ast[s].clone();
        match node.op {
            StmtOp::StmtExpr => {
                if let Some(e) = node.expr {
                    self.print_expr(e, 0);
                }
            }
            StmtOp::StmtDecl => {
                if let Some(d) = node.decl {
                    self.print_local_decl(d);
                }
            }
            StmtOp::If => {
                self.raw("if ");
                if let Some(e) = node.expr {
                    self.print_expr(e, 0);
                }
                self.raw(" { ");
                if let Some(b) = node.body {
                    self.print_stmt_flat(b);
                }
                self.raw(" }");
                if let Some(el) = node.else_ {
                    self.raw(" else { ");
                    self.print_stmt_flat(el);
                    self.raw(" }");
                }
            }
            StmtOp::Block | StmtOp::BlockNoBrace => {
                for (i, &child) in node.block.iter().enumerate() {
                    if i > 0 {
                        self.raw("; ");
                    }
                    self.print_stmt_flat(child);
                }
            }
            StmtOp::Break => self.raw("break"),
            StmtOp::Continue => self.raw("continue"),
            StmtOp::Return => {
                self.raw("return");
                if let Some(e) = node.expr {
                    self.raw(" ");
                    self.print_expr(e, 0);
                }
            }
            _ => {}
        }
    }
}
