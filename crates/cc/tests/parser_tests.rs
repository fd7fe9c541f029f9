//! Parser tests: declarations, statements, typedef feedback, back-references.

use c2go_cc::ast::*;
use c2go_cc::parse;

fn parse_ok(src: &str) -> Ast {
    parse("test.c", src, &[]).expect("parse")
}

fn func_body(ast: &Ast, name: &str) -> StmtId {
    for &d in &ast.prog.decls {
        if ast[d].name == name {
            return ast[d].body.expect("function body");
        }
    }
    panic!("no function {name}");
}

#[test]
fn simple_function() {
    let ast = parse_ok("int f(void) { return 1; }");
    assert_eq!(ast.prog.decls.len(), 1);
    let d = ast.prog.decls[0];
    assert_eq!(ast[d].name, "f");
    let ty = ast[d].ty.expect("type");
    assert_eq!(ast[ty].kind, TypeKind::Func);
    assert_eq!(ast[ty].decls.len(), 1); // the lone void parameter survives parsing
    let body = ast[d].body.expect("body");
    assert_eq!(ast[body].op, StmtOp::Block);
    assert_eq!(ast[body].block.len(), 1);
    assert_eq!(ast[ast[body].block[0]].op, StmtOp::Return);
}

#[test]
fn declarators() {
    let ast = parse_ok("int x; int *p; int a[10]; int **pp; char *names[4];");
    let kinds: Vec<TypeKind> = ast
        .prog
        .decls
        .iter()
        .map(|&d| ast[ast[d].ty.expect("type")].kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            TypeKind::Int,
            TypeKind::Ptr,
            TypeKind::Array,
            TypeKind::Ptr,
            TypeKind::Array,
        ]
    );
    // char *names[4] is an array of pointer to char.
    let last = ast[ast.prog.decls[4]].ty.expect("type");
    let elem = ast[last].base.expect("element");
    assert_eq!(ast[elem].kind, TypeKind::Ptr);
}

#[test]
fn function_pointer_declarator() {
    let ast = parse_ok("int (*handler)(int);");
    let d = ast.prog.decls[0];
    assert_eq!(ast[d].name, "handler");
    let ty = ast[d].ty.expect("type");
    assert_eq!(ast[ty].kind, TypeKind::Ptr);
    let base = ast[ty].base.expect("pointee");
    assert_eq!(ast[base].kind, TypeKind::Func);
}

#[test]
fn struct_definition_and_typedef() {
    let ast = parse_ok(
        "typedef struct Point Point;\nstruct Point { int x; int y; };\nPoint origin;\n",
    );
    // The typedef and the definition share one type node.
    let td = ast.prog.decls[0];
    let def = ast.prog.decls[1];
    assert_eq!(ast[td].ty, ast[def].ty);
    let ty = ast[td].ty.expect("type");
    assert_eq!(ast[ty].kind, TypeKind::Struct);
    assert_eq!(ast[ty].tag, "Point");
    assert_eq!(ast[ty].decls.len(), 2);
    // The use refers back through a TypedefType.
    let origin_ty = ast[ast.prog.decls[2]].ty.expect("type");
    assert_eq!(ast[origin_ty].kind, TypeKind::TypedefType);
    assert_eq!(ast[origin_ty].base, Some(ty));
}

#[test]
fn enum_values() {
    let ast = parse_ok("enum { A, B, C = 10, D };");
    let d = ast.prog.decls[0];
    let ty = ast[d].ty.expect("type");
    assert_eq!(ast[ty].kind, TypeKind::Enum);
    let members = &ast[ty].decls;
    assert_eq!(ast[members[0]].enum_value, Some(0));
    assert_eq!(ast[members[1]].enum_value, Some(1));
    assert!(ast[members[2]].init.is_some());
    assert_eq!(ast[members[3]].enum_value, Some(11));
}

#[test]
fn name_uses_resolve_to_declarations() {
    let ast = parse_ok("int g;\nint f(int a) { return a + g; }");
    let body = func_body(&ast, "f");
    let ret = ast[body].block[0];
    let add = ast[ret].expr.expect("return value");
    let a = ast[add].left.expect("lhs");
    let g = ast[add].right.expect("rhs");
    let a_decl = ast[a].xdecl.expect("a resolves");
    let g_decl = ast[g].xdecl.expect("g resolves");
    assert_eq!(ast[a_decl].name, "a");
    assert_eq!(ast[g_decl].name, "g");
    assert_eq!(g_decl, ast.prog.decls[0]);
}

#[test]
fn field_selection_types() {
    let ast = parse_ok(
        "typedef struct S S;\nstruct S { S *next; };\nvoid f(S *p) { p = p->next; }",
    );
    let body = func_body(&ast, "f");
    let assign = ast[ast[body].block[0]].expr.expect("assignment");
    let arrow = ast[assign].right.expect("rhs");
    assert_eq!(ast[arrow].op, ExprOp::Arrow);
    let field_ty = ast[arrow].xtype.expect("field type inferred");
    assert_eq!(ast[field_ty].kind, TypeKind::Ptr);
}

#[test]
fn unknown_type_at_top_level() {
    let err = parse("test.c", "Rasp *r;\n", &[]).expect_err("unknown type");
    assert_eq!(err.to_string(), "test.c:1: likely type near Rasp");
    // With the name presumed, the same file parses.
    let ast = parse("test.c", "Rasp *r;\n", &["Rasp".to_string()]).expect("parse");
    let ty = ast[ast.prog.decls[0]].ty.expect("type");
    assert_eq!(ast[ty].kind, TypeKind::Ptr);
    let base = ast[ty].base.expect("pointee");
    assert_eq!(ast[base].kind, TypeKind::TypedefType);
    assert_eq!(ast[base].name, "Rasp");
}

#[test]
fn unknown_type_in_parameter_list() {
    let err = parse("test.c", "void f(Rasp *r) { }\n", &[]).expect_err("unknown type");
    assert_eq!(
        err.to_string(),
        "test.c:1: invalid function definition for Rasp"
    );
}

#[test]
fn unknown_type_in_function_body() {
    let err = parse("test.c", "void f(void) { Rasp *r; g(r); }\n", &[]).expect_err("unknown");
    assert_eq!(err.to_string(), "test.c:1: likely type near Rasp");
}

#[test]
fn statements_parse() {
    let ast = parse_ok(
        "void f(int n) {\n\
         \tint i;\n\
         \tfor(i = 0; i < n; i++) { g(i); }\n\
         \twhile(n > 0) n--;\n\
         \tdo { n++; } while(n < 10);\n\
         \tswitch(n) { case 1: break; default: break; }\n\
         \tif(n) g(n); else g(0);\n\
         loop:\n\
         \tgoto loop;\n\
         }",
    );
    let body = func_body(&ast, "f");
    let ops: Vec<StmtOp> = ast[body].block.iter().map(|&s| ast[s].op).collect();
    assert_eq!(
        ops,
        vec![
            StmtOp::StmtDecl,
            StmtOp::For,
            StmtOp::While,
            StmtOp::Do,
            StmtOp::Switch,
            StmtOp::If,
            StmtOp::Goto,
        ]
    );
    let goto = ast[body].block[6];
    assert_eq!(ast[goto].labels.len(), 1);
    assert_eq!(ast[goto].labels[0].name, "loop");
    assert_eq!(ast[goto].text, "loop");
}

#[test]
fn comments_attach_to_statements() {
    let ast = parse_ok(
        "int f(void) {\n\
         \t// leading comment\n\
         \treturn 1; // trailing\n\
         }",
    );
    let body = func_body(&ast, "f");
    let ret = ast[body].block[0];
    let comments = &ast[ret].syntax.comments;
    assert_eq!(comments.before.len(), 1);
    assert_eq!(comments.before[0].text, "// leading comment");
    assert_eq!(comments.suffix.len(), 1);
    assert_eq!(comments.suffix[0].text, "// trailing");
}

#[test]
fn blank_lines_become_empty_comments() {
    let ast = parse_ok("int f(void) {\n\tint x;\n\n\tx = 1;\n\treturn x;\n}");
    let body = func_body(&ast, "f");
    let assign = ast[body].block[1];
    let before = &ast[assign].syntax.comments.before;
    assert_eq!(before.len(), 1);
    assert!(before[0].text.is_empty());
}

#[test]
fn trailing_comments_attach_to_program() {
    let ast = parse_ok("int x;\n\n// the end\n");
    let after = &ast.prog.syntax.comments.after;
    assert!(after.iter().any(|c| c.text == "// the end"));
}

#[test]
fn argbegin_block() {
    let ast = parse_ok("void main(int argc) { ARGBEGIN { case 'v': verbose++; } ARGEND; }");
    let body = func_body(&ast, "main");
    let arg = ast[body].block[0];
    assert_eq!(ast[arg].op, StmtOp::ArgBegin);
    assert_eq!(ast[arg].block.len(), 1);
    assert_eq!(ast[ast[arg].block[0]].op, StmtOp::Block);
}
