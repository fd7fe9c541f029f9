//! Printer tests over parsed (unrewritten) trees. The full pipeline is
//! exercised in the translator crate; these pin the basic rendering rules.

use c2go_cc::parse;
use c2go_cc::print::Printer;

fn print_first_decl(src: &str) -> String {
    let ast = parse("test.c", src, &[]).expect("parse");
    let mut p = Printer::new(&ast);
    p.print_decl(ast.prog.decls[0]);
    p.into_string()
}

#[test]
fn function_declaration() {
    let out = print_first_decl("int f() { return 1; }");
    assert_eq!(out, "func f() int {\n\treturn 1\n}\n");
}

#[test]
fn parameters_and_pointer_types() {
    let out = print_first_decl("void g(int n, char *s) { use(n, s); }");
    assert_eq!(out, "func g(n int, s *int8) {\n\tuse(n, s)\n}\n");
}

#[test]
fn var_with_array_type() {
    let out = print_first_decl("int tab[4];");
    assert_eq!(out, "var tab [4]int\n");
}

#[test]
fn braced_initializer_prints_composite() {
    let out = print_first_decl("int tab[3] = {1, 2, 3};");
    assert_eq!(out, "var tab [3]int = [3]int{1, 2, 3}\n");
}

#[test]
fn arrow_and_dot_both_print_dot() {
    let out = print_first_decl(
        "void f(void) { a->b = c.d; }",
    );
    assert!(out.contains("a.b = c.d"), "{}", out);
}

#[test]
fn number_suffixes_are_stripped() {
    let out = print_first_decl("void f(void) { x = 10UL; }");
    assert!(out.contains("x = 10"), "{}", out);
    assert!(!out.contains("10UL"), "{}", out);
}

#[test]
fn precedence_parentheses() {
    // a + (b - c) must keep the grouping; (a + b) * c needs none beyond
    // what precedence demands.
    let out = print_first_decl("void f(void) { x = a + (b - c); y = (a + b) * c; }");
    assert!(out.contains("x = a + (b - c)"), "{}", out);
    assert!(out.contains("y = (a + b) * c"), "{}", out);
}

#[test]
fn casts_become_conversions() {
    let out = print_first_decl("void f(void) { x = (long)y; p = (char*)q; }");
    assert!(out.contains("x = int32(y)"), "{}", out);
    assert!(out.contains("p = (*int8)(q)"), "{}", out);
}

#[test]
fn comments_round_trip() {
    let out = print_first_decl(
        "// about f\nvoid f(void) {\n\t// inner\n\tg(); // call\n}",
    );
    assert!(out.starts_with("// about f\n"), "{}", out);
    assert!(out.contains("\t// inner\n"), "{}", out);
    assert!(out.contains("g() // call"), "{}", out);
}
