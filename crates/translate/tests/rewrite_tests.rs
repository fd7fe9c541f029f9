//! Pattern-rewrite engine tests: rule parsing, wildcard matching,
//! substitution, and whole-file application.

use c2go_translate::{parse_rules, translate, Options};

fn apply(rules_text: &str, go_src: &str) -> String {
    let rules = parse_rules("rules", rules_text).expect("rules");
    let mut file = c2go_goast::parse_file(go_src).expect("go source");
    c2go_translate::rewrite::rewrite_file(&mut file, &rules);
    c2go_goast::print_file(&file)
}

#[test]
fn selector_field_rename() {
    let out = apply(
        "r.min -> r.Min\nr.max -> r.Max",
        "package pkg\n\nfunc f() int {\n\treturn q.min + q.max\n}\n",
    );
    assert!(out.contains("q.Min + q.Max"), "{}", out);
}

#[test]
fn selector_side_is_literal() {
    // `r` is wild, `min` is not: only selectors named min are renamed.
    let out = apply(
        "r.min -> r.Min",
        "package pkg\n\nfunc f() int {\n\treturn a.min + b.other\n}\n",
    );
    assert!(out.contains("a.Min"), "{}", out);
    assert!(out.contains("b.other"), "{}", out);
}

#[test]
fn call_to_method_rewrite() {
    let out = apply(
        "XMethod(x, y) -> x.Method(y)",
        "package pkg\n\nfunc f() int {\n\treturn XMethod(a+b, c)\n}\n",
    );
    assert!(out.contains("(a + b).Method(c)"), "{}", out);
}

#[test]
fn repeated_wildcard_requires_equal_operands() {
    let out = apply(
        "same(x, x) -> ok(x)",
        "package pkg\n\nfunc f() {\n\tsame(q, q)\n\tsame(q, r)\n}\n",
    );
    assert!(out.contains("ok(q)"), "{}", out);
    assert!(out.contains("same(q, r)"), "{}", out);
}

#[test]
fn uppercase_identifiers_are_not_wildcards() {
    let out = apply(
        "Old -> New",
        "package pkg\n\nfunc f() {\n\tg(Old, other)\n}\n",
    );
    assert!(out.contains("g(New, other)"), "{}", out);
}

#[test]
fn rewrite_applies_bottom_up() {
    // The inner call rewrites first, and the outer match sees the result.
    let out = apply(
        "wrap(x) -> x",
        "package pkg\n\nfunc f() int {\n\treturn wrap(wrap(v))\n}\n",
    );
    assert!(out.contains("return v"), "{}", out);
}

#[test]
fn rewrite_output_is_redescended() {
    let out = apply(
        "twice(x) -> add(x, x)\nadd(v, v) -> double(v)",
        "package pkg\n\nfunc f() int {\n\treturn twice(n)\n}\n",
    );
    assert!(out.contains("double(n)"), "{}", out);
}

#[test]
fn variadic_marker_must_agree() {
    let out = apply(
        "f(x) -> g(x)",
        "package pkg\n\nfunc h() {\n\tf(a)\n\tf(a...)\n}\n",
    );
    assert!(out.contains("g(a)"), "{}", out);
    assert!(out.contains("f(a...)"), "{}", out);
}

#[test]
fn addr_and_deref_selectors_unwrap() {
    let out = apply(
        "# no rules, only the cleanup pass\n",
        "package pkg\n\nfunc f() int {\n\treturn (&x).f + (*y).g\n}\n",
    );
    assert!(out.contains("x.f + y.g"), "{}", out);
}

#[test]
fn comments_survive_rewriting() {
    let out = apply(
        "r.min -> r.Min",
        "package pkg\n\n// keep me\nfunc f() int {\n\t// and me\n\treturn q.min // me too\n}\n",
    );
    assert!(out.contains("// keep me"), "{}", out);
    assert!(out.contains("// and me"), "{}", out);
    assert!(out.contains("// me too"), "{}", out);
    assert!(out.contains("q.Min"), "{}", out);
}

#[test]
fn rule_file_format() {
    let rules = parse_rules(
        "rules",
        "# comment line\n\n  r.min -> r.Min  \nXMethod(x, y)->x.Method(y)\n",
    )
    .expect("rules");
    assert_eq!(rules.len(), 2);
}

#[test]
fn malformed_rule_is_an_error() {
    let err = parse_rules("rules", "just one side\n").expect_err("malformed");
    assert!(err.to_string().contains("rules:1"));
    assert!(err.to_string().contains("old -> new"));

    let err = parse_rules("rules", "\n\na+ -> b\n").expect_err("bad expr");
    assert!(err.to_string().contains("rules:3"));
}

#[test]
fn rule_file_from_disk() {
    use std::io::Write;
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    writeln!(file, "# rules for the scanner").expect("write");
    writeln!(file, "XMethod(x, y) -> x.Method(y)").expect("write");
    let data = std::fs::read_to_string(file.path()).expect("read");
    let rules = parse_rules(&file.path().display().to_string(), &data).expect("rules");
    assert_eq!(rules.len(), 1);
}

#[test]
fn rules_run_inside_the_pipeline() {
    let rules = parse_rules("rules", "r.min -> r.Min\n").expect("rules");
    let out = translate(
        "rules.c",
        "typedef struct R R;\nstruct R { int min; };\nint f(R *r) { return r->min; }\n",
        &rules,
        &Options::default(),
    )
    .expect("translate")
    .go_source;
    assert!(out.contains("return r.Min"), "{}", out);
}
