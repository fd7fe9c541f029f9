//! Parse/print round-trip tests. The printer must be a fixed point over
//! its own output; the translator's final reformat step depends on it.

use c2go_goast::ast::Expr;
use c2go_goast::{parse_expr, parse_file, print_expr, print_file};

fn stable(src: &str) {
    let file = parse_file(src).expect("parse");
    let printed = print_file(&file);
    assert_eq!(printed, src, "first print differs");
    let again = print_file(&parse_file(&printed).expect("reparse"));
    assert_eq!(again, printed, "second print differs");
}

#[test]
fn minimal_file() {
    stable("package pkg\n\nfunc f() int {\n\tx := 1\n\treturn x\n}\n");
}

#[test]
fn declarations() {
    stable(
        "package pkg\n\nvar count int\n\nvar table [16]uint32 = [16]uint32{1, 2, 3}\n\nconst Limit = 10\n\ntype Pair struct {\n\tx int\n\ty int\n}\n",
    );
}

#[test]
fn control_flow() {
    stable(
        "package pkg\n\nfunc f(n int) int {\n\tfor i := 0; i < n; i++ {\n\t\tif i != 2 {\n\t\t\tcontinue\n\t\t} else {\n\t\t\tn--\n\t\t}\n\t}\n\tfor n > 0 {\n\t\tn--\n\t}\n\tfor {\n\t\tbreak\n\t}\n\treturn n\n}\n",
    );
}

#[test]
fn switch_clauses() {
    stable(
        "package pkg\n\nfunc f(n int) {\n\tswitch n {\n\tcase 1, 2:\n\t\tg()\n\t\tfallthrough\n\tcase 3:\n\t\tg()\n\tdefault:\n\t\tg()\n\t}\n}\n",
    );
}

#[test]
fn labels_and_goto() {
    stable(
        "package pkg\n\nfunc f() {\n\tloop:\n\tif x != nil {\n\t\tgoto loop\n\t}\n}\n",
    );
}

#[test]
fn comments_survive() {
    stable(
        "// Header comment.\n\npackage pkg\n\n// f does nothing much.\nfunc f() {\n\t// before the call\n\tg() // after the call\n}\n",
    );
}

#[test]
fn blank_lines_survive() {
    stable(
        "package pkg\n\nfunc f() {\n\tx := 1\n\n\ty := 2\n\t_ = x\n\t_ = y\n}\n",
    );
}

#[test]
fn func_literal_post_statement() {
    stable(
        "package pkg\n\nfunc f(n int) {\n\tfor i := 0; i < n; func() { i++; n-- }() {\n\t\tg(i)\n\t}\n}\n",
    );
}

#[test]
fn expressions() {
    let src = "(a + b) * c[i] - p.x / q[1:n]";
    let expr = parse_expr(src).expect("parse expr");
    assert_eq!(print_expr(&expr), src);
}

#[test]
fn precedence_parens_inserted() {
    // A selector over a binary expression needs parentheses when printed.
    let expr = Expr::Selector {
        x: Box::new(parse_expr("a + b").expect("parse")),
        sel: "Method".to_string(),
    };
    assert_eq!(print_expr(&expr), "(a + b).Method");
}

#[test]
fn semicolon_insertion() {
    let file = parse_file("package pkg\n\nfunc f() int {\n\tx := 1\n\treturn x\n}\n")
        .expect("parse");
    let printed = print_file(&file);
    assert!(printed.contains("x := 1\n"));
}

#[test]
fn side_effect_marker_fails_to_parse() {
    // The translator emits C ternaries inside SideEffectFunc markers on
    // purpose; the reformatter must reject them and keep the raw text.
    assert!(parse_file("package pkg\n\nvar x = bool(a ? b : c)\n").is_err());
}
