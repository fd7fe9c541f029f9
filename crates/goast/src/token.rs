//! Go tokens and semicolon insertion.
//!
//! The lexer is logos-derived. Go's grammar depends on automatic semicolon
//! insertion: a newline terminates a statement when the last token on the
//! line could end one. The token stream here has that rule already applied,
//! so the parser never sees raw newlines.

use logos::Logos;
use text_size::{TextRange, TextSize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: TextRange,
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r]+")]
pub enum TokenKind {
    #[token("break")]
    Break,
    #[token("case")]
    Case,
    #[token("const")]
    Const,
    #[token("continue")]
    Continue,
    #[token("default")]
    Default,
    #[token("else")]
    Else,
    #[token("fallthrough")]
    Fallthrough,
    #[token("for")]
    For,
    #[token("func")]
    Func,
    #[token("goto")]
    Goto,
    #[token("if")]
    If,
    #[token("package")]
    Package,
    #[token("return")]
    Return,
    #[token("struct")]
    Struct,
    #[token("switch")]
    Switch,
    #[token("type")]
    Type,
    #[token("var")]
    Var,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,
    #[regex(r"0[xX][0-9a-fA-F]+")]
    #[regex(r"[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?i?")]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?")]
    Number,
    #[regex(r"'(\\.|[^\\'\n])*'")]
    Rune,
    #[regex(r#""(\\.|[^\\"\n])*""#)]
    #[regex(r"`[^`]*`")]
    String,

    #[regex(r"//[^\n]*")]
    LineComment,
    #[regex(r"/\*([^*]|\*[^/])*\*/")]
    BlockComment,

    #[token("\n")]
    Newline,

    #[token("<<=")]
    ShlAssign,
    #[token(">>=")]
    ShrAssign,
    #[token("&^=")]
    AndNotAssign,
    #[token("...")]
    Ellipsis,
    #[token(":=")]
    Define,
    #[token("++")]
    Inc,
    #[token("--")]
    Dec,
    #[token("&^")]
    AndNot,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token("<=")]
    Le,
    #[token(">=")]
    Ge,
    #[token("==")]
    EqEq,
    #[token("!=")]
    Ne,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("+=")]
    AddAssign,
    #[token("-=")]
    SubAssign,
    #[token("*=")]
    MulAssign,
    #[token("/=")]
    QuoAssign,
    #[token("%=")]
    RemAssign,
    #[token("&=")]
    AndAssign,
    #[token("|=")]
    OrAssign,
    #[token("^=")]
    XorAssign,
    #[token("+")]
    Add,
    #[token("-")]
    Sub,
    #[token("*")]
    Star,
    #[token("/")]
    Quo,
    #[token("%")]
    Rem,
    #[token("&")]
    Amp,
    #[token("|")]
    Or,
    #[token("^")]
    Xor,
    #[token("!")]
    Not,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("=")]
    Assign,
    #[token(":")]
    Colon,
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,

    Eof,
}

impl TokenKind {
    /// Can a statement end right after this token? (Go's semicolon rule.)
    fn ends_statement(self) -> bool {
        matches!(
            self,
            TokenKind::Ident
                | TokenKind::Number
                | TokenKind::Rune
                | TokenKind::String
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Fallthrough
                | TokenKind::Return
                | TokenKind::Inc
                | TokenKind::Dec
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
        )
    }
}

/// A comment plus enough position information to re-attach it.
#[derive(Debug, Clone)]
pub struct RawComment {
    pub text: String,
    pub line_start: u32,
    pub line_end: u32,
    pub own_line: bool,
    pub span: TextRange,
}

#[derive(Debug)]
pub struct LexOutput {
    pub tokens: Vec<Token>,
    pub comments: Vec<RawComment>,
    pub line_starts: Vec<u32>,
}

pub fn line_of(line_starts: &[u32], offset: TextSize) -> u32 {
    let off = u32::from(offset);
    match line_starts.binary_search(&off) {
        Ok(i) => i as u32 + 1,
        Err(i) => i as u32,
    }
}

/// Tokenize Go source, applying semicolon insertion and separating comments.
/// Returns `None` on a lexical error; callers treat that the same as a parse
/// failure (keep the text as is).
pub fn lex(src: &str) -> Option<LexOutput> {
    let mut line_starts = vec![0u32];
    for (i, b) in src.bytes().enumerate() {
        if b == b'\n' {
            line_starts.push(i as u32 + 1);
        }
    }

    let mut tokens: Vec<Token> = Vec::new();
    let mut comments = Vec::new();
    let mut lexer = TokenKind::lexer(src);
    while let Some(result) = lexer.next() {
        let range = lexer.span();
        let span = TextRange::new(
            TextSize::from(range.start as u32),
            TextSize::from(range.end as u32),
        );
        let kind = result.ok()?;
        match kind {
            TokenKind::LineComment | TokenKind::BlockComment => {
                let own_line = src[..range.start]
                    .bytes()
                    .rev()
                    .take_while(|&b| b != b'\n')
                    .all(|b| b == b' ' || b == b'\t');
                comments.push(RawComment {
                    text: lexer.slice().to_string(),
                    line_start: line_of(&line_starts, span.start()),
                    line_end: line_of(&line_starts, span.end()),
                    own_line,
                    span,
                });
            }
            TokenKind::Newline => {
                if tokens.last().is_some_and(|t| t.kind.ends_statement()) {
                    // Zero-width, before the newline: a comment on the same
                    // line must still count as trailing the statement.
                    tokens.push(Token {
                        kind: TokenKind::Semi,
                        span: TextRange::new(span.start(), span.start()),
                    });
                }
            }
            _ => tokens.push(Token { kind, span }),
        }
    }

    let end = TextSize::from(src.len() as u32);
    if tokens.last().is_some_and(|t| t.kind.ends_statement()) {
        tokens.push(Token {
            kind: TokenKind::Semi,
            span: TextRange::new(end, end),
        });
    }
    tokens.push(Token {
        kind: TokenKind::Eof,
        span: TextRange::new(end, end),
    });

    Some(LexOutput {
        tokens,
        comments,
        line_starts,
    })
}
