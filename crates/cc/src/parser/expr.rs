//! C expression parsing.
//!
//! Precedence climbing over the usual C operator table. Each node is
//! annotated as it is built: `xdecl` back-references for names and field
//! selections, and a best-effort `xtype`. The annotation does not aspire to
//! be a type checker; it records exactly what the rewriting passes consult
//! (pointer-ness, float-ness, field and return types).

use super::{ParseResult, Parser};
use crate::ast::*;
use crate::lexer::TokenKind;
use text_size::TextRange;

fn binary_op(kind: TokenKind) -> Option<(ExprOp, u8)> {
    Some(match kind {
        TokenKind::OrOr => (ExprOp::OrOr, 1),
        TokenKind::AndAnd => (ExprOp::AndAnd, 2),
        TokenKind::Pipe => (ExprOp::Or, 3),
        TokenKind::Caret => (ExprOp::Xor, 4),
        TokenKind::Amp => (ExprOp::And, 5),
        TokenKind::EqEq => (ExprOp::EqEq, 6),
        TokenKind::NotEq => (ExprOp::NotEq, 6),
        TokenKind::Lt => (ExprOp::Lt, 7),
        TokenKind::Gt => (ExprOp::Gt, 7),
        TokenKind::LtEq => (ExprOp::LtEq, 7),
        TokenKind::GtEq => (ExprOp::GtEq, 7),
        TokenKind::Lsh => (ExprOp::Lsh, 8),
        TokenKind::Rsh => (ExprOp::Rsh, 8),
        TokenKind::Plus => (ExprOp::Add, 9),
        TokenKind::Minus => (ExprOp::Sub, 9),
        TokenKind::Star => (ExprOp::Mul, 10),
        TokenKind::Slash => (ExprOp::Div, 10),
        TokenKind::Percent => (ExprOp::Mod, 10),
        _ => return None,
    })
}

fn assign_op(kind: TokenKind) -> Option<ExprOp> {
    Some(match kind {
        TokenKind::Assign => ExprOp::Eq,
        TokenKind::AddEq => ExprOp::AddEq,
        TokenKind::SubEq => ExprOp::SubEq,
        TokenKind::MulEq => ExprOp::MulEq,
        TokenKind::DivEq => ExprOp::DivEq,
        TokenKind::ModEq => ExprOp::ModEq,
        TokenKind::AndEq => ExprOp::AndEq,
        TokenKind::XorEq => ExprOp::XorEq,
        TokenKind::OrEq => ExprOp::OrEq,
        TokenKind::LshEq => ExprOp::LshEq,
        TokenKind::RshEq => ExprOp::RshEq,
        _ => return None,
    })
}

impl<'a> Parser<'a> {
    /// Full expression, commas allowed.
    pub(crate) fn parse_comma_expr(&mut self) -> ParseResult<ExprId> {
        let first = self.parse_assign_expr()?;
        if !self.at(TokenKind::Comma) {
            return Ok(first);
        }
        let mut list = vec![first];
        while self.eat(TokenKind::Comma) {
            list.push(self.parse_assign_expr()?);
        }
        let mut e = Expr::new(ExprOp::Comma);
        e.xtype = list.last().and_then(|&x| self.ast[x].xtype);
        e.list = list;
        Ok(self.ast.alloc_expr(e))
    }

    pub(crate) fn parse_assign_expr(&mut self) -> ParseResult<ExprId> {
        let left = self.parse_cond_expr()?;
        if let Some(op) = assign_op(self.peek_kind()) {
            self.advance();
            let right = self.parse_assign_expr()?;
            let id = self.ast.binary(op, left, right);
            self.ast[id].xtype = self.ast[left].xtype;
            return Ok(id);
        }
        Ok(left)
    }

    fn parse_cond_expr(&mut self) -> ParseResult<ExprId> {
        let cond = self.parse_binary(1)?;
        if !self.eat(TokenKind::Question) {
            return Ok(cond);
        }
        let then = self.parse_assign_expr()?;
        self.expect(TokenKind::Colon)?;
        let else_ = self.parse_cond_expr()?;
        let mut e = Expr::new(ExprOp::Cond);
        e.xtype = self.ast[then].xtype.or(self.ast[else_].xtype);
        e.list = vec![cond, then, else_];
        Ok(self.ast.alloc_expr(e))
    }

    fn parse_binary(&mut self, min_prec: u8) -> ParseResult<ExprId> {
        let mut left = self.parse_unary()?;
        while let Some((op, prec)) = binary_op(self.peek_kind()) {
            if prec < min_prec {
                break;
            }
            self.advance();
            let right = self.parse_binary(prec + 1)?;
            let id = self.ast.binary(op, left, right);
            self.annotate_binary(id, op, left, right);
            left = id;
        }
        Ok(left)
    }

    fn annotate_binary(&mut self, id: ExprId, op: ExprOp, left: ExprId, right: ExprId) {
        let lt = self.ast[left].xtype;
        let rt = self.ast[right].xtype;
        let xtype = match op {
            ExprOp::EqEq
            | ExprOp::NotEq
            | ExprOp::Lt
            | ExprOp::LtEq
            | ExprOp::Gt
            | ExprOp::GtEq
            | ExprOp::AndAnd
            | ExprOp::OrOr => Some(self.ty_bool),
            _ => {
                // ptr - ptr is a distance, not a pointer.
                if op == ExprOp::Sub
                    && self.ast.is_ptr_or_array(lt)
                    && self.ast.is_ptr_or_array(rt)
                {
                    Some(self.ty_int)
                } else if self.ast.is_ptr_or_array(lt) {
                    lt
                } else if self.ast.is_ptr_or_array(rt) {
                    rt
                } else {
                    lt.or(rt)
                }
            }
        };
        self.ast[id].xtype = xtype;
    }

    fn parse_unary(&mut self) -> ParseResult<ExprId> {
        let start = self.peek().span.start();
        let op = match self.peek_kind() {
            TokenKind::PlusPlus => Some(ExprOp::PreInc),
            TokenKind::MinusMinus => Some(ExprOp::PreDec),
            TokenKind::Amp => Some(ExprOp::Addr),
            TokenKind::Star => Some(ExprOp::Indir),
            TokenKind::Plus => Some(ExprOp::Plus),
            TokenKind::Minus => Some(ExprOp::Minus),
            TokenKind::Tilde => Some(ExprOp::Twid),
            TokenKind::Bang => Some(ExprOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.parse_unary()?;
            let id = self.ast.unary(op, operand);
            self.annotate_unary(id, op, operand);
            self.ast[id].syntax.span = TextRange::new(start, self.ast[operand].syntax.span.end());
            return Ok(id);
        }

        if self.at(TokenKind::Sizeof) {
            self.advance();
            if self.at(TokenKind::LParen) && self.is_type_start(1) {
                self.advance();
                let ty = self.parse_type_name()?;
                self.expect(TokenKind::RParen)?;
                let mut e = Expr::new(ExprOp::SizeofType);
                e.ty = Some(ty);
                e.xtype = Some(self.ty_int);
                return Ok(self.ast.alloc_expr(e));
            }
            let operand = self.parse_unary()?;
            let id = self.ast.unary(ExprOp::SizeofExpr, operand);
            self.ast[id].xtype = Some(self.ty_int);
            return Ok(id);
        }

        // Cast.
        if self.at(TokenKind::LParen) && self.is_type_start(1) {
            self.advance();
            let ty = self.parse_type_name()?;
            self.expect(TokenKind::RParen)?;
            let operand = self.parse_unary()?;
            let mut e = Expr::new(ExprOp::Cast);
            e.ty = Some(ty);
            e.left = Some(operand);
            e.xtype = Some(ty);
            return Ok(self.ast.alloc_expr(e));
        }

        let primary = self.parse_primary()?;
        self.parse_postfix(primary)
    }

    fn annotate_unary(&mut self, id: ExprId, op: ExprOp, operand: ExprId) {
        let ot = self.ast[operand].xtype;
        let xtype = match op {
            ExprOp::Not => Some(self.ty_bool),
            ExprOp::Indir => ot.and_then(|t| self.element_type(t)),
            ExprOp::Addr => ot.map(|t| {
                let mut ptr = Type::new(TypeKind::Ptr);
                ptr.base = Some(t);
                self.ast.alloc_type(ptr)
            }),
            _ => ot,
        };
        self.ast[id].xtype = xtype;
    }

    fn parse_postfix(&mut self, mut expr: ExprId) -> ParseResult<ExprId> {
        loop {
            match self.peek_kind() {
                TokenKind::LParen => {
                    self.advance();
                    let mut args = Vec::new();
                    if !self.at(TokenKind::RParen) {
                        loop {
                            args.push(self.parse_assign_expr()?);
                            if !self.eat(TokenKind::Comma) {
                                break;
                            }
                        }
                    }
                    self.expect(TokenKind::RParen)?;
                    let mut e = Expr::new(ExprOp::Call);
                    e.left = Some(expr);
                    e.list = args;
                    e.xtype = self.return_type(expr);
                    expr = self.ast.alloc_expr(e);
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_comma_expr()?;
                    self.expect(TokenKind::RBracket)?;
                    let id = self.ast.binary(ExprOp::Index, expr, index);
                    self.ast[id].xtype =
                        self.ast[expr].xtype.and_then(|t| self.element_type(t));
                    expr = id;
                }
                TokenKind::Dot | TokenKind::Arrow => {
                    let op = if self.at(TokenKind::Arrow) {
                        ExprOp::Arrow
                    } else {
                        ExprOp::Dot
                    };
                    self.advance();
                    let tok = self.expect(TokenKind::Ident)?;
                    let mut e = Expr::new(op);
                    e.left = Some(expr);
                    e.text = self.text(tok).to_string();
                    if let Some(base) = self.ast[expr].xtype {
                        if let Some((fty, fdecl)) = self.resolve_field(base, &e.text) {
                            e.xtype = Some(fty);
                            e.xdecl = Some(fdecl);
                        }
                    }
                    expr = self.ast.alloc_expr(e);
                }
                TokenKind::PlusPlus => {
                    self.advance();
                    let id = self.ast.unary(ExprOp::PostInc, expr);
                    self.ast[id].xtype = self.ast[expr].xtype;
                    expr = id;
                }
                TokenKind::MinusMinus => {
                    self.advance();
                    let id = self.ast.unary(ExprOp::PostDec, expr);
                    self.ast[id].xtype = self.ast[expr].xtype;
                    expr = id;
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_primary(&mut self) -> ParseResult<ExprId> {
        let tok = self.peek();
        match tok.kind {
            TokenKind::Ident => {
                self.advance();
                let text = self.text(tok).to_string();
                let decl = self.lookup(&text);
                let id = self.ast.name_ref(text, decl);
                self.ast[id].syntax.span = tok.span;
                Ok(id)
            }
            TokenKind::Number | TokenKind::CharLit => {
                self.advance();
                let mut e = Expr::new(ExprOp::Number);
                e.text = self.text(tok).to_string();
                e.syntax.span = tok.span;
                e.xtype = Some(self.number_type(&e.text, tok.kind));
                Ok(self.ast.alloc_expr(e))
            }
            TokenKind::StringLit => {
                self.advance();
                let mut e = Expr::new(ExprOp::String);
                e.text = self.text(tok).to_string();
                e.syntax.span = tok.span;
                e.xtype = Some(self.ty_string);
                Ok(self.ast.alloc_expr(e))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_comma_expr()?;
                self.expect(TokenKind::RParen)?;
                let id = self.ast.unary(ExprOp::Paren, inner);
                self.ast[id].xtype = self.ast[inner].xtype;
                Ok(id)
            }
            _ => Err(self.err_here()),
        }
    }

    fn number_type(&self, text: &str, kind: TokenKind) -> TypeId {
        if kind == TokenKind::CharLit {
            return self.ty_int;
        }
        let lower = text.to_ascii_lowercase();
        if lower.starts_with("0x") {
            return self.ty_int;
        }
        if lower.ends_with('f') {
            return self.ty_float32;
        }
        if lower.contains('.') || lower.contains('e') {
            return self.ty_float64;
        }
        self.ty_int
    }

    /// Is the token `n` ahead the start of a type name (for casts and
    /// `sizeof`)?
    fn is_type_start(&self, n: usize) -> bool {
        let kind = self.peek_at(n);
        if kind.starts_decl_spec() {
            return true;
        }
        if kind == TokenKind::Ident {
            if let Some(tok) = self.tokens.get(self.pos + n) {
                return self.is_type_name(&self.src[tok.span]);
            }
        }
        false
    }

    /// Parse a type name: declaration specifiers plus an abstract declarator.
    pub(crate) fn parse_type_name(&mut self) -> ParseResult<TypeId> {
        let (_, base) = self.parse_decl_specs(false)?;
        let (_, ty) = self.parse_declarator(base)?;
        Ok(ty)
    }

    // ----- type plumbing for annotation -----

    /// Element type of a pointer or array, reading through typedefs.
    fn element_type(&self, ty: TypeId) -> Option<TypeId> {
        let mut t = ty;
        for _ in 0..8 {
            let node = &self.ast[t];
            match node.kind {
                TypeKind::Ptr | TypeKind::Array => return node.base,
                TypeKind::TypedefType => t = node.base?,
                _ => return None,
            }
        }
        None
    }

    /// Return type of a call through `f`.
    fn return_type(&self, f: ExprId) -> Option<TypeId> {
        let mut t = self.ast[f].xtype?;
        for _ in 0..8 {
            let node = &self.ast[t];
            match node.kind {
                TypeKind::Func => return node.base,
                TypeKind::Ptr | TypeKind::TypedefType => t = node.base?,
                _ => return None,
            }
        }
        None
    }

    /// Field lookup through pointers and typedefs into a struct/union.
    fn resolve_field(&self, base: TypeId, name: &str) -> Option<(TypeId, DeclId)> {
        let mut t = base;
        for _ in 0..8 {
            let node = &self.ast[t];
            match node.kind {
                TypeKind::Ptr | TypeKind::TypedefType => t = node.base?,
                TypeKind::Named => t = self.ast[node.type_decl?].ty?,
                TypeKind::Struct | TypeKind::Union => {
                    for &field in &node.decls {
                        if self.ast[field].name == name {
                            return Some((self.ast[field].ty?, field));
                        }
                    }
                    return None;
                }
                _ => return None,
            }
        }
        None
    }
}
