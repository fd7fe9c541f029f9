//! Lexer tests: token classification, comment capture, line accounting.

use c2go_cc::lexer::{lex, TokenKind};

fn kinds(src: &str) -> Vec<TokenKind> {
    lex("test.c", src)
        .expect("lex")
        .tokens
        .iter()
        .map(|t| t.kind)
        .collect()
}

#[test]
fn basic_tokens() {
    let kinds = kinds("int x = 10;");
    assert_eq!(
        kinds,
        vec![
            TokenKind::Int,
            TokenKind::Ident,
            TokenKind::Assign,
            TokenKind::Number,
            TokenKind::Semi,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn multi_char_operators() {
    let kinds = kinds("a <<= b >> c != d->e ...");
    assert!(kinds.contains(&TokenKind::LshEq));
    assert!(kinds.contains(&TokenKind::Rsh));
    assert!(kinds.contains(&TokenKind::NotEq));
    assert!(kinds.contains(&TokenKind::Arrow));
    assert!(kinds.contains(&TokenKind::Ellipsis));
}

#[test]
fn number_forms() {
    for src in ["0x1F", "017", "1.5", ".5", "1e10", "1.5f", "10UL"] {
        let kinds = kinds(src);
        assert_eq!(kinds[0], TokenKind::Number, "{}", src);
    }
}

#[test]
fn char_and_string_literals() {
    let kinds = kinds(r#"'\0' "a\"b" 'x'"#);
    assert_eq!(
        kinds,
        vec![
            TokenKind::CharLit,
            TokenKind::StringLit,
            TokenKind::CharLit,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn comments_are_separated_from_tokens() {
    let out = lex(
        "test.c",
        "int x; // trailing\n/* block\n   comment */\nint y;\n",
    )
    .expect("lex");
    assert_eq!(out.comments.len(), 2);
    assert_eq!(out.comments[0].text, "// trailing");
    assert!(!out.comments[0].own_line);
    assert!(out.comments[1].text.starts_with("/* block"));
    assert!(out.comments[1].own_line);
    // Tokens see no comments.
    assert!(out
        .tokens
        .iter()
        .all(|t| !matches!(t.kind, TokenKind::LineComment | TokenKind::BlockComment)));
}

#[test]
fn comment_lines_recorded() {
    let out = lex("test.c", "int x;\n\n// c\nint y;\n").expect("lex");
    assert_eq!(out.comments[0].line_start, 3);
    assert_eq!(out.comments[0].line_end, 3);
}

#[test]
fn lex_error_is_syntax_error() {
    let err = lex("test.c", "int @ x;").expect_err("stray byte");
    assert!(err.to_string().contains("syntax error near @"));
    assert!(err.to_string().starts_with("test.c:1:"));
}
