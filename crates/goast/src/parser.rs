//! Parser for the Go subset.
//!
//! Token-vector recursive descent, the same shape as the C parser on the
//! other side of the pipeline. Comments attach to statements, declarations,
//! clauses, and fields; blank lines become empty lead-comment markers so the
//! printer can reproduce paragraphs. Composite literals are suppressed in
//! `if`/`for`/`switch` headers exactly as in Go's grammar.

use crate::ast::*;
use crate::token::{self, LexOutput, RawComment, Token, TokenKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("{line}: unexpected {found}")]
    Unexpected { line: u32, found: String },
    #[error("unexpected end of file")]
    UnexpectedEof,
    #[error("lexical error")]
    Lex,
}

pub type ParseResult<T> = Result<T, Box<ParseError>>;

/// Parse a whole Go source file.
pub fn parse_file(src: &str) -> ParseResult<File> {
    let out = token::lex(src).ok_or_else(|| Box::new(ParseError::Lex))?;
    let mut p = Parser::new(src, out);
    p.parse_file()
}

/// Parse a single Go expression (used for rewrite rules).
pub fn parse_expr(src: &str) -> ParseResult<Expr> {
    let out = token::lex(src).ok_or_else(|| Box::new(ParseError::Lex))?;
    let mut p = Parser::new(src, out);
    let expr = p.parse_expr_prec(0, false)?;
    p.eat(TokenKind::Semi);
    if !p.at(TokenKind::Eof) {
        return Err(p.err_here());
    }
    Ok(expr)
}

struct Parser<'a> {
    src: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    comments: Vec<RawComment>,
    cidx: usize,
    line_starts: Vec<u32>,
    last_line: u32,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str, out: LexOutput) -> Self {
        Parser {
            src,
            tokens: out.tokens,
            pos: 0,
            comments: out.comments,
            cidx: 0,
            line_starts: out.line_starts,
            last_line: 0,
        }
    }

    fn peek(&self) -> Token {
        self.tokens[self.pos]
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn peek_at(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos];
        if tok.kind != TokenKind::Eof {
            self.pos += 1;
            self.last_line = token::line_of(&self.line_starts, tok.span.end());
        }
        tok
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            return true;
        }
        false
    }

    fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(self.err_here())
        }
    }

    /// Consume a statement terminator: an explicit or inserted semicolon,
    /// or nothing when the statement abuts a closing brace.
    fn expect_semi(&mut self) -> ParseResult<()> {
        if self.eat(TokenKind::Semi) || self.at(TokenKind::RBrace) {
            return Ok(());
        }
        Err(self.err_here())
    }

    fn text(&self, tok: Token) -> &'a str {
        &self.src[tok.span]
    }

    fn err_here(&self) -> Box<ParseError> {
        let tok = self.peek();
        if tok.kind == TokenKind::Eof {
            return Box::new(ParseError::UnexpectedEof);
        }
        Box::new(ParseError::Unexpected {
            line: token::line_of(&self.line_starts, tok.span.start()),
            found: self.text(tok).to_string(),
        })
    }

    // ----- comments -----

    fn take_lead_comments(&mut self) -> Vec<String> {
        let next = self.peek();
        let next_start = next.span.start();
        let mut out = Vec::new();
        let mut prev_line = self.last_line;
        while self.cidx < self.comments.len() && self.comments[self.cidx].span.end() <= next_start {
            let c = &self.comments[self.cidx];
            if prev_line > 0 && c.line_start > prev_line + 1 {
                out.push(String::new());
            }
            out.push(c.text.clone());
            prev_line = c.line_end;
            self.cidx += 1;
        }
        let next_line = token::line_of(&self.line_starts, next_start);
        if prev_line > 0 && next.kind != TokenKind::Eof && next_line > prev_line + 1 {
            out.push(String::new());
        }
        self.last_line = self.last_line.max(prev_line);
        out
    }

    fn take_line_comments(&mut self) -> Vec<String> {
        let line = self.last_line;
        let mut out = Vec::new();
        while self.cidx < self.comments.len() {
            let c = &self.comments[self.cidx];
            if c.own_line || c.line_start != line {
                break;
            }
            out.push(c.text.clone());
            self.last_line = c.line_end;
            self.cidx += 1;
        }
        out
    }

    // ----- file and declarations -----

    fn parse_file(&mut self) -> ParseResult<File> {
        let head = self.take_lead_comments();
        self.expect(TokenKind::Package)?;
        let name = self.expect(TokenKind::Ident)?;
        let package = self.text(name).to_string();
        self.eat(TokenKind::Semi);

        let mut decls = Vec::new();
        let trailing;
        loop {
            let mut lead = self.take_lead_comments();
            // The blank separator line between declarations is structural;
            // the printer re-emits it.
            if lead.first().is_some_and(|c| c.is_empty()) {
                lead.remove(0);
            }
            if self.at(TokenKind::Eof) {
                trailing = lead;
                break;
            }
            let mut decl = self.parse_decl()?;
            decl.comments_mut().lead = lead;
            decls.push(decl);
        }

        Ok(File {
            head,
            package,
            decls,
            trailing,
        })
    }

    fn parse_decl(&mut self) -> ParseResult<Decl> {
        match self.peek().kind {
            TokenKind::Func => {
                self.advance();
                let name = self.expect(TokenKind::Ident)?;
                let name = self.text(name).to_string();
                let sig = self.parse_signature()?;
                let body = self.parse_block()?;
                self.eat(TokenKind::Semi);
                let mut comments = Comments::default();
                comments.line = self.take_line_comments();
                Ok(Decl::Func {
                    comments,
                    name,
                    sig,
                    body,
                })
            }
            TokenKind::Var => {
                self.advance();
                let name = self.expect(TokenKind::Ident)?;
                let name = self.text(name).to_string();
                let ty = if self.at(TokenKind::Assign) || self.at(TokenKind::Semi) {
                    None
                } else {
                    Some(self.parse_type()?)
                };
                let value = if self.eat(TokenKind::Assign) {
                    Some(self.parse_expr_prec(0, false)?)
                } else {
                    None
                };
                self.eat(TokenKind::Semi);
                let mut comments = Comments::default();
                comments.line = self.take_line_comments();
                Ok(Decl::Var {
                    comments,
                    name,
                    ty,
                    value,
                })
            }
            TokenKind::Const => {
                self.advance();
                let name = self.expect(TokenKind::Ident)?;
                let name = self.text(name).to_string();
                self.expect(TokenKind::Assign)?;
                let value = self.parse_expr_prec(0, false)?;
                self.eat(TokenKind::Semi);
                let mut comments = Comments::default();
                comments.line = self.take_line_comments();
                Ok(Decl::Const {
                    comments,
                    name,
                    value,
                })
            }
            TokenKind::Type => {
                self.advance();
                let name = self.expect(TokenKind::Ident)?;
                let name = self.text(name).to_string();
                let ty = self.parse_type()?;
                self.eat(TokenKind::Semi);
                let mut comments = Comments::default();
                comments.line = self.take_line_comments();
                Ok(Decl::Type { comments, name, ty })
            }
            _ => Err(self.err_here()),
        }
    }

    fn parse_signature(&mut self) -> ParseResult<FuncSig> {
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        while !self.at(TokenKind::RParen) {
            // `name type` when an identifier is followed by something that
            // can start a type; bare type otherwise.
            let (name, ty) = if self.at(TokenKind::Ident) && self.starts_type(1) {
                let tok = self.advance();
                let name = self.text(tok).to_string();
                (name, self.parse_type()?)
            } else {
                (String::new(), self.parse_type()?)
            };
            params.push(Field {
                comments: Comments::default(),
                name,
                ty,
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;
        let result = if self.at(TokenKind::LBrace) || self.at(TokenKind::Semi) {
            None
        } else {
            Some(Box::new(self.parse_type()?))
        };
        Ok(FuncSig { params, result })
    }

    fn starts_type(&self, n: usize) -> bool {
        matches!(
            self.peek_at(n),
            TokenKind::Ident
                | TokenKind::Star
                | TokenKind::LBracket
                | TokenKind::Struct
                | TokenKind::Func
                | TokenKind::Ellipsis
        )
    }

    fn parse_type(&mut self) -> ParseResult<Expr> {
        match self.peek().kind {
            TokenKind::Star => {
                self.advance();
                let x = self.parse_type()?;
                Ok(Expr::Star { x: Box::new(x) })
            }
            TokenKind::LBracket => {
                self.advance();
                let len = if self.at(TokenKind::RBracket) {
                    None
                } else {
                    Some(Box::new(self.parse_expr_prec(0, false)?))
                };
                self.expect(TokenKind::RBracket)?;
                let elt = self.parse_type()?;
                Ok(Expr::ArrayType {
                    len,
                    elt: Box::new(elt),
                })
            }
            TokenKind::Struct => {
                self.advance();
                self.parse_struct_type()
            }
            TokenKind::Func => {
                self.advance();
                let sig = self.parse_signature()?;
                Ok(Expr::FuncType(sig))
            }
            TokenKind::Ellipsis => {
                self.advance();
                // Variadic marker in mechanical output; keep as a literal.
                Ok(Expr::Lit("...".to_string()))
            }
            TokenKind::Ident => {
                let tok = self.advance();
                let mut x = Expr::Ident(self.text(tok).to_string());
                while self.at(TokenKind::Dot) {
                    self.advance();
                    let sel = self.expect(TokenKind::Ident)?;
                    x = Expr::Selector {
                        x: Box::new(x),
                        sel: self.text(sel).to_string(),
                    };
                }
                Ok(x)
            }
            _ => Err(self.err_here()),
        }
    }

    fn parse_struct_type(&mut self) -> ParseResult<Expr> {
        self.expect(TokenKind::LBrace)?;
        let mut fields = Vec::new();
        loop {
            let lead = self.take_lead_comments();
            if self.eat(TokenKind::RBrace) {
                // Trailing comments in an empty or finished struct are rare
                // in mechanical output; fold them onto the last field.
                if let (Some(last), false) = (fields.last_mut(), lead.is_empty()) {
                    let last: &mut Field = last;
                    last.comments.lead.extend(lead);
                }
                break;
            }
            let name = self.expect(TokenKind::Ident)?;
            let name = self.text(name).to_string();
            let ty = self.parse_type()?;
            self.eat(TokenKind::Semi);
            let mut comments = Comments::default();
            comments.lead = lead;
            comments.line = self.take_line_comments();
            fields.push(Field { comments, name, ty });
        }
        self.eat(TokenKind::Semi);
        Ok(Expr::StructType { fields })
    }

    // ----- statements -----

    fn parse_block(&mut self) -> ParseResult<Block> {
        self.expect(TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        let trailing;
        loop {
            let lead = self.take_lead_comments();
            if self.at(TokenKind::RBrace) {
                self.advance();
                trailing = lead;
                break;
            }
            if self.at(TokenKind::Eof) {
                return Err(self.err_here());
            }
            stmts.push(self.parse_stmt(lead)?);
        }
        Ok(Block { stmts, trailing })
    }

    fn parse_stmt(&mut self, lead: Vec<String>) -> ParseResult<Stmt> {
        let mut stmt = self.parse_stmt_inner()?;
        stmt.comments.lead = lead;
        Ok(stmt)
    }

    fn finish_simple(&mut self, kind: StmtKind) -> ParseResult<Stmt> {
        self.expect_semi()?;
        let mut stmt = Stmt::new(kind);
        stmt.comments.line = self.take_line_comments();
        Ok(stmt)
    }

    fn parse_stmt_inner(&mut self) -> ParseResult<Stmt> {
        match self.peek().kind {
            TokenKind::Semi => {
                self.advance();
                let mut stmt = Stmt::new(StmtKind::Empty);
                stmt.comments.line = self.take_line_comments();
                Ok(stmt)
            }
            TokenKind::LBrace => {
                let block = self.parse_block()?;
                self.eat(TokenKind::Semi);
                let mut stmt = Stmt::new(StmtKind::Block(block));
                stmt.comments.line = self.take_line_comments();
                Ok(stmt)
            }
            TokenKind::Var => {
                self.advance();
                let name = self.expect(TokenKind::Ident)?;
                let name = self.text(name).to_string();
                let ty = if self.at(TokenKind::Assign) || self.at(TokenKind::Semi) {
                    None
                } else {
                    Some(self.parse_type()?)
                };
                let value = if self.eat(TokenKind::Assign) {
                    Some(self.parse_expr_prec(0, false)?)
                } else {
                    None
                };
                self.finish_simple(StmtKind::Var { name, ty, value })
            }
            TokenKind::Const => {
                self.advance();
                let name = self.expect(TokenKind::Ident)?;
                let name = self.text(name).to_string();
                self.expect(TokenKind::Assign)?;
                let value = self.parse_expr_prec(0, false)?;
                self.finish_simple(StmtKind::Const { name, value })
            }
            TokenKind::Return => {
                self.advance();
                let mut results = Vec::new();
                if !self.at(TokenKind::Semi) && !self.at(TokenKind::RBrace) {
                    loop {
                        results.push(self.parse_expr_prec(0, false)?);
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.finish_simple(StmtKind::Return(results))
            }
            TokenKind::Break | TokenKind::Continue | TokenKind::Goto | TokenKind::Fallthrough => {
                let tok = self.advance();
                let kind = match tok.kind {
                    TokenKind::Break => BranchKind::Break,
                    TokenKind::Continue => BranchKind::Continue,
                    TokenKind::Goto => BranchKind::Goto,
                    _ => BranchKind::Fallthrough,
                };
                let label = if self.at(TokenKind::Ident) {
                    let tok = self.advance();
                    Some(self.text(tok).to_string())
                } else {
                    None
                };
                self.finish_simple(StmtKind::Branch { kind, label })
            }
            TokenKind::If => {
                let stmt = self.parse_if()?;
                self.eat(TokenKind::Semi);
                Ok(stmt)
            }
            TokenKind::For => {
                self.advance();
                let mut init = None;
                let mut cond = None;
                let mut post = None;
                if !self.at(TokenKind::LBrace) {
                    if self.at(TokenKind::Semi) {
                        // `for ; cond; post`
                        self.advance();
                    } else {
                        let first = self.parse_simple_stmt(true)?;
                        if self.eat(TokenKind::Semi) {
                            init = Some(Box::new(first));
                        } else {
                            match first.kind {
                                StmtKind::Expr(e) => {
                                    let body = self.parse_block()?;
                                    self.eat(TokenKind::Semi);
                                    let mut stmt = Stmt::new(StmtKind::For {
                                        init: None,
                                        cond: Some(e),
                                        post: None,
                                        body,
                                    });
                                    stmt.comments.line = self.take_line_comments();
                                    return Ok(stmt);
                                }
                                _ => return Err(self.err_here()),
                            }
                        }
                    }
                    if !self.at(TokenKind::Semi) {
                        cond = Some(self.parse_expr_prec(0, true)?);
                    }
                    self.expect(TokenKind::Semi)?;
                    if !self.at(TokenKind::LBrace) {
                        post = Some(Box::new(self.parse_simple_stmt(true)?));
                    }
                }
                let body = self.parse_block()?;
                self.eat(TokenKind::Semi);
                let mut stmt = Stmt::new(StmtKind::For {
                    init,
                    cond,
                    post,
                    body,
                });
                stmt.comments.line = self.take_line_comments();
                Ok(stmt)
            }
            TokenKind::Switch => {
                self.advance();
                let tag = if self.at(TokenKind::LBrace) {
                    None
                } else {
                    Some(self.parse_expr_prec(0, true)?)
                };
                let (clauses, trailing) = self.parse_switch_body()?;
                self.eat(TokenKind::Semi);
                let mut stmt = Stmt::new(StmtKind::Switch {
                    tag,
                    clauses,
                    trailing,
                });
                stmt.comments.line = self.take_line_comments();
                Ok(stmt)
            }
            TokenKind::Ident if self.peek_at(1) == TokenKind::Colon => {
                let tok = self.advance();
                let label = self.text(tok).to_string();
                self.advance();
                let inner = self.parse_stmt_inner()?;
                Ok(Stmt::new(StmtKind::Labeled {
                    label,
                    stmt: Box::new(inner),
                }))
            }
            _ => {
                let mut stmt = self.parse_simple_stmt(false)?;
                self.expect_semi()?;
                stmt.comments.line = self.take_line_comments();
                Ok(stmt)
            }
        }
    }

    fn parse_if(&mut self) -> ParseResult<Stmt> {
        self.expect(TokenKind::If)?;
        let cond = self.parse_expr_prec(0, true)?;
        let body = self.parse_block()?;
        let else_ = if self.eat(TokenKind::Else) {
            if self.at(TokenKind::If) {
                Some(Box::new(self.parse_if()?))
            } else {
                let block = self.parse_block()?;
                Some(Box::new(Stmt::new(StmtKind::Block(block))))
            }
        } else {
            None
        };
        let mut stmt = Stmt::new(StmtKind::If { cond, body, else_ });
        stmt.comments.line = self.take_line_comments();
        Ok(stmt)
    }

    fn parse_switch_body(&mut self) -> ParseResult<(Vec<CaseClause>, Vec<String>)> {
        self.expect(TokenKind::LBrace)?;
        let mut clauses = Vec::new();
        let trailing;
        let mut pending: Option<Vec<String>> = None;
        loop {
            let lead = match pending.take() {
                Some(lead) => lead,
                None => self.take_lead_comments(),
            };
            if self.at(TokenKind::RBrace) {
                self.advance();
                trailing = lead;
                break;
            }
            let mut exprs = Vec::new();
            if self.eat(TokenKind::Case) {
                loop {
                    exprs.push(self.parse_expr_prec(0, false)?);
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::Colon)?;
            } else if self.eat(TokenKind::Default) {
                self.expect(TokenKind::Colon)?;
            } else {
                return Err(self.err_here());
            }
            let mut comments = Comments::default();
            comments.lead = lead;
            comments.line = self.take_line_comments();

            let mut body = Vec::new();
            loop {
                let lead2 = self.take_lead_comments();
                if self.at(TokenKind::Case)
                    || self.at(TokenKind::Default)
                    || self.at(TokenKind::RBrace)
                {
                    pending = Some(lead2);
                    break;
                }
                body.push(self.parse_stmt(lead2)?);
            }
            clauses.push(CaseClause {
                comments,
                exprs,
                body,
            });
        }
        Ok((clauses, trailing))
    }

    fn parse_simple_stmt(&mut self, no_lit: bool) -> ParseResult<Stmt> {
        let first = self.parse_expr_prec(0, no_lit)?;
        match self.peek().kind {
            TokenKind::Inc => {
                self.advance();
                Ok(Stmt::new(StmtKind::IncDec {
                    x: first,
                    dec: false,
                }))
            }
            TokenKind::Dec => {
                self.advance();
                Ok(Stmt::new(StmtKind::IncDec { x: first, dec: true }))
            }
            TokenKind::Comma => {
                let mut lhs = vec![first];
                while self.eat(TokenKind::Comma) {
                    lhs.push(self.parse_expr_prec(0, no_lit)?);
                }
                let op = self.assign_op().ok_or_else(|| self.err_here())?;
                self.advance();
                let mut rhs = Vec::new();
                loop {
                    rhs.push(self.parse_expr_prec(0, no_lit)?);
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                Ok(Stmt::new(StmtKind::Assign { lhs, op, rhs }))
            }
            _ => {
                if let Some(op) = self.assign_op() {
                    self.advance();
                    let rhs = self.parse_expr_prec(0, no_lit)?;
                    Ok(Stmt::new(StmtKind::Assign {
                        lhs: vec![first],
                        op,
                        rhs: vec![rhs],
                    }))
                } else {
                    Ok(Stmt::new(StmtKind::Expr(first)))
                }
            }
        }
    }

    fn assign_op(&self) -> Option<AssignOp> {
        Some(match self.peek().kind {
            TokenKind::Assign => AssignOp::Assign,
            TokenKind::Define => AssignOp::Define,
            TokenKind::AddAssign => AssignOp::Add,
            TokenKind::SubAssign => AssignOp::Sub,
            TokenKind::MulAssign => AssignOp::Mul,
            TokenKind::QuoAssign => AssignOp::Quo,
            TokenKind::RemAssign => AssignOp::Rem,
            TokenKind::AndAssign => AssignOp::And,
            TokenKind::OrAssign => AssignOp::Or,
            TokenKind::XorAssign => AssignOp::Xor,
            TokenKind::ShlAssign => AssignOp::Shl,
            TokenKind::ShrAssign => AssignOp::Shr,
            TokenKind::AndNotAssign => AssignOp::AndNot,
            _ => return None,
        })
    }

    // ----- expressions -----

    fn binary_op(&self) -> Option<BinOp> {
        Some(match self.peek().kind {
            TokenKind::OrOr => BinOp::OrOr,
            TokenKind::AndAnd => BinOp::AndAnd,
            TokenKind::EqEq => BinOp::Eql,
            TokenKind::Ne => BinOp::Neq,
            TokenKind::Lt => BinOp::Lss,
            TokenKind::Le => BinOp::Leq,
            TokenKind::Gt => BinOp::Gtr,
            TokenKind::Ge => BinOp::Geq,
            TokenKind::Add => BinOp::Add,
            TokenKind::Sub => BinOp::Sub,
            TokenKind::Or => BinOp::Or,
            TokenKind::Xor => BinOp::Xor,
            TokenKind::Star => BinOp::Mul,
            TokenKind::Quo => BinOp::Quo,
            TokenKind::Rem => BinOp::Rem,
            TokenKind::Shl => BinOp::Shl,
            TokenKind::Shr => BinOp::Shr,
            TokenKind::Amp => BinOp::And,
            TokenKind::AndNot => BinOp::AndNot,
            _ => return None,
        })
    }

    pub(crate) fn parse_expr_prec(&mut self, min: u8, no_lit: bool) -> ParseResult<Expr> {
        let mut left = self.parse_unary(no_lit)?;
        while let Some(op) = self.binary_op() {
            let prec = op.precedence();
            if prec <= min {
                break;
            }
            self.advance();
            let right = self.parse_expr_prec(prec, no_lit)?;
            left = Expr::Binary {
                x: Box::new(left),
                op,
                y: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self, no_lit: bool) -> ParseResult<Expr> {
        let op = match self.peek().kind {
            TokenKind::Not => Some(UnOp::Not),
            TokenKind::Sub => Some(UnOp::Neg),
            TokenKind::Add => Some(UnOp::Pos),
            TokenKind::Xor => Some(UnOp::Xor),
            TokenKind::Amp => Some(UnOp::Amp),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let x = self.parse_unary(no_lit)?;
            return Ok(Expr::Unary {
                op,
                x: Box::new(x),
            });
        }
        if self.at(TokenKind::Star) {
            self.advance();
            let x = self.parse_unary(no_lit)?;
            return Ok(Expr::Star { x: Box::new(x) });
        }
        let primary = self.parse_primary(no_lit)?;
        self.parse_postfix(primary, no_lit)
    }

    fn parse_primary(&mut self, no_lit: bool) -> ParseResult<Expr> {
        match self.peek().kind {
            TokenKind::Ident => {
                let tok = self.advance();
                Ok(Expr::Ident(self.text(tok).to_string()))
            }
            TokenKind::Number | TokenKind::Rune | TokenKind::String => {
                let tok = self.advance();
                Ok(Expr::Lit(self.text(tok).to_string()))
            }
            TokenKind::LParen => {
                self.advance();
                let x = self.parse_expr_prec(0, false)?;
                self.expect(TokenKind::RParen)?;
                Ok(Expr::Paren { x: Box::new(x) })
            }
            TokenKind::Func => {
                self.advance();
                let sig = self.parse_signature()?;
                if self.at(TokenKind::LBrace) {
                    let body = self.parse_block_flat()?;
                    Ok(Expr::FuncLit { sig, body })
                } else {
                    Ok(Expr::FuncType(sig))
                }
            }
            TokenKind::LBracket => {
                let ty = self.parse_type()?;
                if !no_lit && self.at(TokenKind::LBrace) {
                    self.parse_composite(Some(ty))
                } else {
                    Ok(ty)
                }
            }
            TokenKind::Struct => {
                self.advance();
                let ty = self.parse_struct_type()?;
                if !no_lit && self.at(TokenKind::LBrace) {
                    self.parse_composite(Some(ty))
                } else {
                    Ok(ty)
                }
            }
            TokenKind::LBrace if !no_lit => self.parse_composite(None),
            _ => Err(self.err_here()),
        }
    }

    /// A block in expression position (func literal); the enclosing line is
    /// still one statement, so no semicolon follows the brace.
    fn parse_block_flat(&mut self) -> ParseResult<Block> {
        self.parse_block()
    }

    fn parse_composite(&mut self, ty: Option<Expr>) -> ParseResult<Expr> {
        self.expect(TokenKind::LBrace)?;
        let mut elts = Vec::new();
        while !self.at(TokenKind::RBrace) {
            let elt = self.parse_expr_prec(0, false)?;
            let elt = if self.eat(TokenKind::Colon) {
                let value = self.parse_expr_prec(0, false)?;
                Expr::KeyValue {
                    key: Box::new(elt),
                    value: Box::new(value),
                }
            } else {
                elt
            };
            elts.push(elt);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace)?;
        Ok(Expr::Composite {
            ty: ty.map(Box::new),
            elts,
        })
    }

    fn parse_postfix(&mut self, mut expr: Expr, no_lit: bool) -> ParseResult<Expr> {
        loop {
            match self.peek().kind {
                TokenKind::Dot => {
                    self.advance();
                    let sel = self.expect(TokenKind::Ident)?;
                    expr = Expr::Selector {
                        x: Box::new(expr),
                        sel: self.text(sel).to_string(),
                    };
                }
                TokenKind::LParen => {
                    self.advance();
                    let mut args = Vec::new();
                    let mut ellipsis = false;
                    while !self.at(TokenKind::RParen) {
                        args.push(self.parse_expr_prec(0, false)?);
                        if self.eat(TokenKind::Ellipsis) {
                            ellipsis = true;
                        }
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                    self.expect(TokenKind::RParen)?;
                    expr = Expr::Call {
                        func: Box::new(expr),
                        args,
                        ellipsis,
                    };
                }
                TokenKind::LBracket => {
                    self.advance();
                    let low = if self.at(TokenKind::Colon) {
                        None
                    } else {
                        Some(self.parse_expr_prec(0, false)?)
                    };
                    if self.eat(TokenKind::Colon) {
                        let high = if self.at(TokenKind::RBracket) {
                            None
                        } else {
                            Some(Box::new(self.parse_expr_prec(0, false)?))
                        };
                        self.expect(TokenKind::RBracket)?;
                        expr = Expr::Slice {
                            x: Box::new(expr),
                            low: low.map(Box::new),
                            high,
                        };
                    } else {
                        self.expect(TokenKind::RBracket)?;
                        expr = Expr::Index {
                            x: Box::new(expr),
                            index: Box::new(low.ok_or_else(|| self.err_here())?),
                        };
                    }
                }
                TokenKind::LBrace if !no_lit && composite_ty(&expr) => {
                    expr = self.parse_composite(Some(expr))?;
                }
                _ => return Ok(expr),
            }
        }
    }
}

/// Expressions that can head a composite literal.
fn composite_ty(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Ident(_) | Expr::Selector { .. } | Expr::ArrayType { .. } | Expr::StructType { .. }
    )
}
