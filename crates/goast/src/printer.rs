//! gofmt-shaped printer for the Go subset.
//!
//! The layout rules deliberately match the C-tree printer in `c2go-cc`:
//! tabs, one statement per line, case clauses at switch level, blank lines
//! from empty lead-comment markers, a blank separator line between
//! top-level declarations. That agreement is what makes "reformat" (parse
//! then print) a fixed point over the translator's own output.

use crate::ast::*;

pub struct Printer {
    buf: String,
    indent: usize,
}

impl Default for Printer {
    fn default() -> Self {
        Printer::new()
    }
}

/// Render a whole file.
pub fn print_file(file: &File) -> String {
    let mut p = Printer::new();
    p.file(file);
    p.buf
}

/// Render a single expression (used by tests and rule diagnostics).
pub fn print_expr(expr: &Expr) -> String {
    let mut p = Printer::new();
    p.expr(expr, 0);
    p.buf
}

impl Printer {
    pub fn new() -> Self {
        Printer {
            buf: String::new(),
            indent: 0,
        }
    }

    fn raw(&mut self, s: &str) {
        self.buf.push_str(s);
    }

    fn tabs(&mut self) {
        for _ in 0..self.indent {
            self.buf.push('\t');
        }
    }

    fn nl(&mut self) {
        self.buf.push('\n');
    }

    fn lead_comments(&mut self, comments: &[String]) {
        for c in comments {
            if c.is_empty() {
                self.nl();
            } else {
                self.tabs();
                self.raw(c);
                self.nl();
            }
        }
    }

    fn line_comments(&mut self, comments: &[String]) {
        for c in comments {
            self.raw(" ");
            self.raw(c);
        }
    }

    fn file(&mut self, file: &File) {
        self.lead_comments(&file.head);
        self.raw("package ");
        self.raw(&file.package);
        self.nl();
        for decl in &file.decls {
            self.nl();
            self.decl(decl);
        }
        if !file.trailing.is_empty() {
            self.nl();
            self.lead_comments(&file.trailing);
        }
    }

    fn decl(&mut self, decl: &Decl) {
        match decl {
            Decl::Func {
                comments,
                name,
                sig,
                body,
            } => {
                self.lead_comments(&comments.lead);
                self.raw("func ");
                self.raw(name);
                self.signature(sig);
                self.raw(" {");
                self.line_comments(&comments.line);
                self.nl();
                self.indent += 1;
                self.block_items(body);
                self.indent -= 1;
                self.raw("}");
                self.nl();
            }
            Decl::Var {
                comments,
                name,
                ty,
                value,
            } => {
                self.lead_comments(&comments.lead);
                self.raw("var ");
                self.raw(name);
                if let Some(ty) = ty {
                    self.raw(" ");
                    self.expr(ty, 0);
                }
                if let Some(value) = value {
                    self.raw(" = ");
                    self.expr(value, 0);
                }
                self.line_comments(&comments.line);
                self.nl();
            }
            Decl::Const {
                comments,
                name,
                value,
            } => {
                self.lead_comments(&comments.lead);
                self.raw("const ");
                self.raw(name);
                self.raw(" = ");
                self.expr(value, 0);
                self.line_comments(&comments.line);
                self.nl();
            }
            Decl::Type { comments, name, ty } => {
                self.lead_comments(&comments.lead);
                self.raw("type ");
                self.raw(name);
                self.raw(" ");
                if let Expr::StructType { fields } = ty {
                    self.struct_multiline(fields);
                } else {
                    self.expr(ty, 0);
                }
                self.line_comments(&comments.line);
                self.nl();
            }
        }
    }

    fn struct_multiline(&mut self, fields: &[Field]) {
        self.raw("struct {");
        self.nl();
        self.indent += 1;
        for field in fields {
            self.lead_comments(&field.comments.lead);
            self.tabs();
            self.raw(&field.name);
            self.raw(" ");
            self.expr(&field.ty, 0);
            self.line_comments(&field.comments.line);
            self.nl();
        }
        self.indent -= 1;
        self.tabs();
        self.raw("}");
    }

    fn signature(&mut self, sig: &FuncSig) {
        self.raw("(");
        for (i, param) in sig.params.iter().enumerate() {
            if i > 0 {
                self.raw(", ");
            }
            if !param.name.is_empty() {
                self.raw(&param.name);
                self.raw(" ");
            }
            self.expr(&param.ty, 0);
        }
        self.raw(")");
        if let Some(result) = &sig.result {
            self.raw(" ");
            self.expr(result, 0);
        }
    }

    // ----- statements -----

    fn block_items(&mut self, block: &Block) {
        for stmt in &block.stmts {
            self.stmt(stmt);
        }
        self.lead_comments(&block.trailing);
    }

    fn braced(&mut self, block: &Block) {
        self.raw("{");
        self.nl();
        self.indent += 1;
        self.block_items(block);
        self.indent -= 1;
        self.tabs();
        self.raw("}");
    }

    fn stmt(&mut self, stmt: &Stmt) {
        self.lead_comments(&stmt.comments.lead);
        match &stmt.kind {
            StmtKind::Empty => {
                if !stmt.comments.line.is_empty() {
                    self.tabs();
                    let joined = stmt.comments.line.join(" ");
                    self.raw(&joined);
                    self.nl();
                }
                return;
            }
            StmtKind::Labeled { label, stmt: inner } => {
                self.tabs();
                self.raw(label);
                self.raw(":");
                self.nl();
                self.stmt(inner);
                return;
            }
            _ => {}
        }
        self.tabs();
        self.stmt_body(stmt);
        self.line_comments(&stmt.comments.line);
        self.nl();
    }

    /// The statement's own text, without indentation or trailing newline.
    fn stmt_body(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Empty | StmtKind::Labeled { .. } => {}
            StmtKind::Expr(e) => self.expr(e, 0),
            StmtKind::IncDec { x, dec } => {
                self.expr(x, 7);
                self.raw(if *dec { "--" } else { "++" });
            }
            StmtKind::Assign { lhs, op, rhs } => {
                for (i, e) in lhs.iter().enumerate() {
                    if i > 0 {
                        self.raw(", ");
                    }
                    self.expr(e, 1);
                }
                self.raw(" ");
                self.raw(op.as_str());
                self.raw(" ");
                for (i, e) in rhs.iter().enumerate() {
                    if i > 0 {
                        self.raw(", ");
                    }
                    self.expr(e, 1);
                }
            }
            StmtKind::Var { name, ty, value } => {
                self.raw("var ");
                self.raw(name);
                if let Some(ty) = ty {
                    self.raw(" ");
                    self.expr(ty, 0);
                }
                if let Some(value) = value {
                    self.raw(" = ");
                    self.expr(value, 0);
                }
            }
            StmtKind::Const { name, value } => {
                self.raw("const ");
                self.raw(name);
                self.raw(" = ");
                self.expr(value, 0);
            }
            StmtKind::Return(results) => {
                self.raw("return");
                for (i, e) in results.iter().enumerate() {
                    self.raw(if i == 0 { " " } else { ", " });
                    self.expr(e, 0);
                }
            }
            StmtKind::If { cond, body, else_ } => {
                self.if_stmt(cond, body, else_.as_deref());
            }
            StmtKind::For {
                init,
                cond,
                post,
                body,
            } => {
                self.raw("for ");
                if init.is_some() || post.is_some() {
                    if let Some(init) = init {
                        self.stmt_body(init);
                    }
                    self.raw(";");
                    if let Some(cond) = cond {
                        self.raw(" ");
                        self.expr(cond, 0);
                    }
                    self.raw(";");
                    if let Some(post) = post {
                        self.raw(" ");
                        self.stmt_body(post);
                    }
                    self.raw(" ");
                } else if let Some(cond) = cond {
                    self.expr(cond, 0);
                    self.raw(" ");
                }
                self.braced(body);
            }
            StmtKind::Switch {
                tag,
                clauses,
                trailing,
            } => {
                self.raw("switch ");
                if let Some(tag) = tag {
                    self.expr(tag, 0);
                    self.raw(" ");
                }
                self.raw("{");
                self.nl();
                for clause in clauses {
                    self.lead_comments(&clause.comments.lead);
                    self.tabs();
                    if clause.exprs.is_empty() {
                        self.raw("default:");
                    } else {
                        self.raw("case ");
                        for (i, e) in clause.exprs.iter().enumerate() {
                            if i > 0 {
                                self.raw(", ");
                            }
                            self.expr(e, 0);
                        }
                        self.raw(":");
                    }
                    self.line_comments(&clause.comments.line);
                    self.nl();
                    self.indent += 1;
                    for stmt in &clause.body {
                        self.stmt(stmt);
                    }
                    self.indent -= 1;
                }
                self.lead_comments(trailing);
                self.tabs();
                self.raw("}");
            }
            StmtKind::Branch { kind, label } => {
                self.raw(kind.as_str());
                if let Some(label) = label {
                    self.raw(" ");
                    self.raw(label);
                }
            }
            StmtKind::Block(block) => self.braced(block),
        }
    }

    fn if_stmt(&mut self, cond: &Expr, body: &Block, else_: Option<&Stmt>) {
        self.raw("if ");
        self.expr(cond, 0);
        self.raw(" ");
        self.braced(body);
        if let Some(else_) = else_ {
            self.raw(" else ");
            match &else_.kind {
                StmtKind::If { cond, body, else_ } => {
                    self.if_stmt(cond, body, else_.as_deref());
                }
                StmtKind::Block(block) => self.braced(block),
                _ => self.stmt_body(else_),
            }
        }
    }

    // ----- expressions -----

    fn prec_of(expr: &Expr) -> u8 {
        match expr {
            Expr::Binary { op, .. } => op.precedence(),
            Expr::Unary { .. } | Expr::Star { .. } => 6,
            _ => 7,
        }
    }

    fn expr(&mut self, expr: &Expr, min: u8) {
        let my = Self::prec_of(expr);
        let needs_paren = my < min && !matches!(expr, Expr::Paren { .. });
        if needs_paren {
            self.raw("(");
        }
        match expr {
            Expr::Ident(name) => self.raw(name),
            Expr::Lit(text) => self.raw(text),
            Expr::Selector { x, sel } => {
                self.expr(x, 7);
                self.raw(".");
                self.raw(sel);
            }
            Expr::Call {
                func,
                args,
                ellipsis,
            } => {
                self.expr(func, 7);
                self.raw("(");
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        self.raw(", ");
                    }
                    self.expr(arg, 0);
                }
                if *ellipsis {
                    self.raw("...");
                }
                self.raw(")");
            }
            Expr::Index { x, index } => {
                self.expr(x, 7);
                self.raw("[");
                self.expr(index, 0);
                self.raw("]");
            }
            Expr::Slice { x, low, high } => {
                self.expr(x, 7);
                self.raw("[");
                if let Some(low) = low {
                    self.expr(low, 0);
                }
                self.raw(":");
                if let Some(high) = high {
                    self.expr(high, 0);
                }
                self.raw("]");
            }
            Expr::Star { x } => {
                self.raw("*");
                self.expr(x, 6);
            }
            Expr::Unary { op, x } => {
                self.raw(op.as_str());
                self.expr(x, 6);
            }
            Expr::Binary { x, op, y } => {
                let p = op.precedence();
                self.expr(x, p);
                self.raw(" ");
                self.raw(op.as_str());
                self.raw(" ");
                self.expr(y, p + 1);
            }
            Expr::Paren { x } => {
                self.raw("(");
                self.expr(x, 0);
                self.raw(")");
            }
            Expr::KeyValue { key, value } => {
                self.expr(key, 0);
                self.raw(": ");
                self.expr(value, 0);
            }
            Expr::Composite { ty, elts } => {
                if let Some(ty) = ty {
                    self.expr(ty, 7);
                }
                self.raw("{");
                for (i, elt) in elts.iter().enumerate() {
                    if i > 0 {
                        self.raw(", ");
                    }
                    self.expr(elt, 0);
                }
                self.raw("}");
            }
            Expr::FuncLit { sig, body } => {
                self.raw("func");
                self.signature(sig);
                if body.stmts.is_empty() {
                    self.raw(" {}");
                } else {
                    self.raw(" {");
                    for (i, stmt) in body.stmts.iter().enumerate() {
                        self.raw(if i == 0 { " " } else { "; " });
                        self.stmt_body(stmt);
                    }
                    self.raw(" }");
                }
            }
            Expr::ArrayType { len, elt } => {
                self.raw("[");
                if let Some(len) = len {
                    self.expr(len, 0);
                }
                self.raw("]");
                self.expr(elt, 6);
            }
            Expr::StructType { fields } => {
                self.raw("struct{ ");
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        self.raw("; ");
                    }
                    self.raw(&field.name);
                    self.raw(" ");
                    self.expr(&field.ty, 0);
                }
                self.raw(" }");
            }
            Expr::FuncType(sig) => {
                self.raw("func");
                self.signature(sig);
            }
        }
        if needs_paren {
            self.raw(")");
        }
    }
}
