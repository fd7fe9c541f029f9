//! C statement parsing.

use super::{ParseResult, Parser};
use crate::ast::*;
use crate::lexer::TokenKind;
use text_size::TextRange;

impl<'a> Parser<'a> {
    /// Parse a braced block.
    pub(crate) fn parse_block(&mut self) -> ParseResult<StmtId> {
        let start = self.expect(TokenKind::LBrace)?.span.start();
        self.push_scope();
        let mut block = Vec::new();
        let mut trailing = Vec::new();
        loop {
            let lead = self.take_lead_comments();
            if self.at(TokenKind::RBrace) {
                self.advance();
                trailing = lead;
                break;
            }
            if self.at(TokenKind::Eof) {
                self.pop_scope();
                return Err(self.err_here());
            }
            if self.at_local_decl() {
                block.extend(self.parse_local_decl(lead)?);
            } else {
                self.check_unknown_type()?;
                block.push(self.parse_stmt_inner(lead)?);
            }
        }
        self.pop_scope();
        let mut stmt = Stmt {
            op: StmtOp::Block,
            block,
            ..Stmt::default()
        };
        stmt.syntax.span = TextRange::new(start, self.prev_end());
        stmt.syntax.comments.after = trailing;
        Ok(self.ast.alloc_stmt(stmt))
    }

    pub(crate) fn parse_stmt(&mut self) -> ParseResult<StmtId> {
        let lead = self.take_lead_comments();
        self.parse_stmt_inner(lead)
    }

    fn parse_stmt_inner(&mut self, lead: Vec<Comment>) -> ParseResult<StmtId> {
        let start = self.peek().span.start();

        // Labels come first; cases and defaults may stack.
        let mut labels = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::Case => {
                    self.advance();
                    let expr = self.parse_assign_expr()?;
                    self.expect(TokenKind::Colon)?;
                    labels.push(Label {
                        op: LabelOp::Case,
                        name: String::new(),
                        expr: Some(expr),
                    });
                }
                TokenKind::Default => {
                    self.advance();
                    self.expect(TokenKind::Colon)?;
                    labels.push(Label {
                        op: LabelOp::Default,
                        name: String::new(),
                        expr: None,
                    });
                }
                TokenKind::Ident if self.peek_at(1) == TokenKind::Colon => {
                    let tok = self.advance();
                    let name = self.text(tok).to_string();
                    self.advance();
                    labels.push(Label {
                        op: LabelOp::LabelName,
                        name,
                        expr: None,
                    });
                }
                _ => break,
            }
        }

        let id = self.parse_unlabeled_stmt()?;
        let stmt = &mut self.ast[id];
        stmt.labels = labels;
        stmt.syntax.span = TextRange::new(start, stmt.syntax.span.end());
        stmt.syntax.comments.before = lead;
        let suffix = self.take_suffix_comments();
        self.ast[id].syntax.comments.suffix = suffix;
        Ok(id)
    }

    fn parse_unlabeled_stmt(&mut self) -> ParseResult<StmtId> {
        let start = self.peek().span.start();
        let id = match self.peek_kind() {
            TokenKind::LBrace => return self.parse_block(),
            TokenKind::Semi => {
                self.advance();
                self.ast.stmt(StmtOp::Empty)
            }
            TokenKind::If => {
                self.advance();
                self.expect(TokenKind::LParen)?;
                let cond = self.parse_comma_expr()?;
                self.expect(TokenKind::RParen)?;
                let body = self.parse_stmt()?;
                let else_ = if self.eat(TokenKind::Else) {
                    Some(self.parse_stmt()?)
                } else {
                    None
                };
                self.ast.alloc_stmt(Stmt {
                    op: StmtOp::If,
                    expr: Some(cond),
                    body: Some(body),
                    else_,
                    ..Stmt::default()
                })
            }
            TokenKind::While => {
                self.advance();
                self.expect(TokenKind::LParen)?;
                let cond = self.parse_comma_expr()?;
                self.expect(TokenKind::RParen)?;
                let body = self.parse_stmt()?;
                self.ast.alloc_stmt(Stmt {
                    op: StmtOp::While,
                    expr: Some(cond),
                    body: Some(body),
                    ..Stmt::default()
                })
            }
            TokenKind::Do => {
                self.advance();
                let body = self.parse_stmt()?;
                self.expect(TokenKind::While)?;
                self.expect(TokenKind::LParen)?;
                let cond = self.parse_comma_expr()?;
                self.expect(TokenKind::RParen)?;
                self.expect(TokenKind::Semi)?;
                self.ast.alloc_stmt(Stmt {
                    op: StmtOp::Do,
                    expr: Some(cond),
                    body: Some(body),
                    ..Stmt::default()
                })
            }
            TokenKind::For => {
                self.advance();
                self.expect(TokenKind::LParen)?;
                let pre = if self.at(TokenKind::Semi) {
                    None
                } else {
                    Some(self.parse_comma_expr()?)
                };
                self.expect(TokenKind::Semi)?;
                let cond = if self.at(TokenKind::Semi) {
                    None
                } else {
                    Some(self.parse_comma_expr()?)
                };
                self.expect(TokenKind::Semi)?;
                let post = if self.at(TokenKind::RParen) {
                    None
                } else {
                    Some(self.parse_comma_expr()?)
                };
                self.expect(TokenKind::RParen)?;
                let body = self.parse_stmt()?;
                self.ast.alloc_stmt(Stmt {
                    op: StmtOp::For,
                    pre,
                    expr: cond,
                    post,
                    body: Some(body),
                    ..Stmt::default()
                })
            }
            TokenKind::Switch => {
                self.advance();
                self.expect(TokenKind::LParen)?;
                let tag = self.parse_comma_expr()?;
                self.expect(TokenKind::RParen)?;
                let body = self.parse_stmt()?;
                self.ast.alloc_stmt(Stmt {
                    op: StmtOp::Switch,
                    expr: Some(tag),
                    body: Some(body),
                    ..Stmt::default()
                })
            }
            TokenKind::Return => {
                self.advance();
                let expr = if self.at(TokenKind::Semi) {
                    None
                } else {
                    Some(self.parse_comma_expr()?)
                };
                self.expect(TokenKind::Semi)?;
                self.ast.alloc_stmt(Stmt {
                    op: StmtOp::Return,
                    expr,
                    ..Stmt::default()
                })
            }
            TokenKind::Break => {
                self.advance();
                self.expect(TokenKind::Semi)?;
                self.ast.stmt(StmtOp::Break)
            }
            TokenKind::Continue => {
                self.advance();
                self.expect(TokenKind::Semi)?;
                self.ast.stmt(StmtOp::Continue)
            }
            TokenKind::Goto => {
                self.advance();
                let tok = self.expect(TokenKind::Ident)?;
                let text = self.text(tok).to_string();
                self.expect(TokenKind::Semi)?;
                self.ast.alloc_stmt(Stmt {
                    op: StmtOp::Goto,
                    text,
                    ..Stmt::default()
                })
            }
            TokenKind::Ident
                if self.text(self.peek()) == "ARGBEGIN" && self.peek_at(1) == TokenKind::LBrace =>
            {
                self.advance();
                let body = self.parse_block()?;
                if self.at(TokenKind::Ident) && self.text(self.peek()) == "ARGEND" {
                    self.advance();
                    self.eat(TokenKind::Semi);
                }
                self.ast.alloc_stmt(Stmt {
                    op: StmtOp::ArgBegin,
                    block: vec![body],
                    ..Stmt::default()
                })
            }
            _ => {
                let expr = self.parse_comma_expr()?;
                self.expect(TokenKind::Semi)?;
                self.ast.stmt_expr(expr)
            }
        };
        self.ast[id].syntax.span = TextRange::new(start, self.prev_end());
        Ok(id)
    }
}
