//! C lexer: tokenizes a translation unit, separating comments into their own
//! stream so the parser can attach them to syntax nodes. Blank lines matter
//! to the printer, so line positions are kept alongside.

pub mod token;

pub use token::{Token, TokenKind};

use crate::error::{ParseError, Pos};
use logos::Logos;
use text_size::{TextRange, TextSize};

/// A comment as the lexer saw it, before attachment.
#[derive(Debug, Clone)]
pub struct RawComment {
    /// Raw text including delimiters.
    pub text: String,
    pub span: TextRange,
    /// First and last source line covered.
    pub line_start: u32,
    pub line_end: u32,
    /// Nothing but whitespace precedes it on its line.
    pub own_line: bool,
}

/// Byte-offset to line-number lookup.
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(src: &str) -> Self {
        let mut starts = vec![0u32];
        for (i, b) in src.bytes().enumerate() {
            if b == b'\n' {
                starts.push(i as u32 + 1);
            }
        }
        LineIndex { starts }
    }

    /// 1-based line containing `offset`.
    pub fn line(&self, offset: TextSize) -> u32 {
        let off = u32::from(offset);
        match self.starts.binary_search(&off) {
            Ok(i) => i as u32 + 1,
            Err(i) => i as u32,
        }
    }
}

/// Everything the parser needs from one pass over the source.
#[derive(Debug)]
pub struct LexOutput {
    pub tokens: Vec<Token>,
    pub comments: Vec<RawComment>,
    pub lines: LineIndex,
}

/// Tokenize `src`. Lexical errors (stray bytes) are fatal: the translator
/// cannot do anything useful with a file it cannot read to the end.
pub fn lex(file: &str, src: &str) -> Result<LexOutput, Box<ParseError>> {
    let lines = LineIndex::new(src);
    let mut tokens = Vec::new();
    let mut comments = Vec::new();

    let mut lexer = TokenKind::lexer(src);
    while let Some(result) = lexer.next() {
        let range = lexer.span();
        let span = TextRange::new(
            TextSize::from(range.start as u32),
            TextSize::from(range.end as u32),
        );
        let kind = match result {
            Ok(kind) => kind,
            Err(()) => {
                return Err(Box::new(ParseError::syntax(
                    Pos::new(file, lines.line(span.start())),
                    lexer.slice(),
                )));
            }
        };
        match kind {
            TokenKind::LineComment | TokenKind::BlockComment => {
                let line_start = lines.line(span.start());
                comments.push(RawComment {
                    text: lexer.slice().to_string(),
                    span,
                    line_start,
                    line_end: lines.line(span.end()),
                    own_line: starts_line(src, range.start),
                });
            }
            _ => tokens.push(Token { kind, span }),
        }
    }

    let end = TextSize::from(src.len() as u32);
    tokens.push(Token {
        kind: TokenKind::Eof,
        span: TextRange::new(end, end),
    });

    Ok(LexOutput {
        tokens,
        comments,
        lines,
    })
}

fn starts_line(src: &str, offset: usize) -> bool {
    src[..offset]
        .bytes()
        .rev()
        .take_while(|&b| b != b'\n')
        .all(|b| b == b' ' || b == b'\t')
}
