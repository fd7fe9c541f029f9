//! Renaming: keep the translated program out of Go's way.
//!
//! Three concerns, in order: escape Go keywords (and a few identifiers that
//! are merely poisonous, like `iota` and `fmt`); merge anonymous
//! struct/enum definitions with the typedefs that name them; make
//! top-level names unique across the whole set of input files by suffixing
//! conflicting ones with the file base name. Function-local statics get
//! the function's name as a prefix so they can be hoisted to the top level.
//!
//! Renaming only ever touches `Decl::name`; every use reaches the new name
//! through its `xdecl` back-reference at print time.

use c2go_cc::ast::*;
use c2go_cc::lexer::LineIndex;
use c2go_cc::walk::{preorder, Node};
use indexmap::IndexMap;
use std::collections::HashMap;

fn go_keyword(name: &str) -> bool {
    matches!(
        name,
        "chan"
            | "defer"
            | "fallthrough"
            | "func"
            | "go"
            | "import"
            | "interface"
            | "map"
            | "package"
            | "range"
            | "select"
            | "type"
            | "var"
            // not keywords but still need renaming
            | "iota"
            | "fmt"
            | "path"
            | "rune"
            | "true"
            | "false"
    )
}

/// Rename declarations and return the top-level declaration list in print
/// order (enum members flattened, anonymous typedefs merged). Conflicting
/// top-level names are reported into `diags` and disambiguated with a
/// `_<filebase>` suffix.
pub fn rename_decls(ast: &mut Ast, lines: &LineIndex, diags: &mut Vec<String>) -> Vec<DeclId> {
    // Escape important Go words. The underscore goes last so the name can
    // still be upper-cased for export.
    preorder(ast, Node::Prog, |ast, node| match node {
        Node::Decl(d) => {
            if go_keyword(&ast[d].name) {
                ast[d].name.push('_');
            }
        }
        Node::Stmt(s) => {
            for lab in &mut ast[s].labels {
                if go_keyword(&lab.name) {
                    lab.name.push('_');
                }
            }
            if ast[s].op == StmtOp::Goto && go_keyword(&ast[s].text) {
                ast[s].text.push('_');
            }
        }
        Node::Expr(e) => {
            if matches!(ast[e].op, ExprOp::Dot | ExprOp::Arrow | ExprOp::Name)
                && go_keyword(&ast[e].text)
            {
                ast[e].text.push('_');
            }
        }
        _ => {}
    });

    // Build the list of declared top-level names. Not just prog.decls
    // because of enums and struct definitions.
    let mut typedefs: HashMap<TypeId, DeclId> = HashMap::new();
    for &d in &ast.prog.decls {
        if ast[d].storage.contains(Storage::TYPEDEF) {
            if let Some(ty) = ast[d].ty {
                typedefs.insert(ty, d);
            }
        }
    }

    let mut decls: Vec<DeclId> = Vec::new();
    for d in ast.prog.decls.clone() {
        if ast[d].blank {
            decls.push(d);
            continue;
        }
        if ast[d].name.is_empty() {
            let ty = ast[d].ty;
            if let Some(&td) = ty.and_then(|t| typedefs.get(&t)) {
                if td != d {
                    // Print the definition here, not at the typedef.
                    ast[td].blank = true;
                    ast[d].name = ast[td].name.clone();
                    ast[d].storage |= Storage::TYPEDEF;
                    decls.push(d);
                    continue;
                }
            }
            let Some(ty) = ty else { continue };
            match ast[ty].kind {
                TypeKind::Struct | TypeKind::Union => {
                    if !ast[ty].tag.is_empty() {
                        decls.push(d);
                        ast[d].name = ast[ty].tag.clone();
                        ast[d].storage = Storage::TYPEDEF;
                    } else {
                        ast[d].blank = true;
                        decls.push(d);
                    }
                    if ast[ty].type_decl.is_none() {
                        ast[ty].type_decl = Some(d);
                    }
                }
                TypeKind::Enum => {
                    ast[d].blank = true;
                    decls.push(d);
                    for member in ast[ty].decls.clone() {
                        decls.push(member);
                    }
                }
                _ => {}
            }
            continue;
        }
        decls.push(d);
        if ast[d].storage.contains(Storage::TYPEDEF) {
            if let Some(ty) = ast[d].ty {
                if ast[ty].type_decl.is_none() {
                    ast[ty].type_decl = Some(d);
                }
            }
        }
    }

    // Identify declaration conflicts.
    let mut count: IndexMap<String, usize> = IndexMap::new();
    let mut src: HashMap<String, String> = HashMap::new();
    for &d in &decls {
        if ast[d].blank {
            continue;
        }
        let name = ast[d].name.clone();
        let n = count.entry(name.clone()).or_insert(0);
        *n += 1;
        let here = format!(
            "{}:{}",
            ast.file,
            lines.line(ast[d].syntax.span.start())
        );
        if *n > 1 {
            diags.push(format!(
                "{}: conflicting name {} (last at {})",
                here,
                name,
                src.get(&name).map(String::as_str).unwrap_or("?")
            ));
            continue;
        }
        src.insert(name, here);
    }

    // Rename static and conflicting names.
    let filebase = {
        let base = ast
            .file
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&ast.file);
        base.split('.').next().unwrap_or(base).to_string()
    };
    for &d in &decls {
        let name = ast[d].name.clone();
        if count.get(&name).copied().unwrap_or(0) > 1 {
            ast[d].name = format!("{}_{}", name, filebase);
        }

        if matches!(ast.type_kind(ast[d].ty), Some(TypeKind::Func)) {
            if let Some(body) = ast[d].body {
                let func_name = ast[d].name.clone();
                for s in ast[body].block.clone() {
                    if ast[s].op == StmtOp::StmtDecl {
                        let local = ast[s].decl.expect("StmtDecl carries a decl");
                        if ast[local].storage.contains(Storage::STATIC) {
                            // Prefix with the function name; prints at the
                            // top level.
                            let new = format!("{}_{}", func_name, ast[local].name);
                            ast[local].name = new;
                        }
                    }
                }
            }
        }
    }

    // Every use reaches its declaration through xdecl; pull the final
    // names back onto the use sites so text and declaration agree.
    preorder(ast, Node::Prog, |ast, node| {
        if let Node::Expr(e) = node {
            if ast[e].op == ExprOp::Name {
                if let Some(d) = ast[e].xdecl {
                    let name = ast[d].name.clone();
                    ast[e].text = name;
                }
            }
        }
    });

    decls
}

/// Hoist renamed function-local statics to the top level, and blank the
/// declarations Go has no use for (prototypes, extern data). Runs between
/// renaming and declaration motion so the mover never sees the statics.
pub fn hoist_statics(ast: &mut Ast, decls: Vec<DeclId>) -> Vec<DeclId> {
    let mut out: Vec<DeclId> = Vec::new();
    for d in decls {
        let is_func = matches!(ast.type_kind(ast[d].ty), Some(TypeKind::Func));
        if is_func {
            if let Some(body) = ast[d].body {
                for s in ast[body].block.clone() {
                    if ast[s].op != StmtOp::StmtDecl {
                        continue;
                    }
                    let local = ast[s].decl.expect("StmtDecl carries a decl");
                    if ast[local].storage.contains(Storage::STATIC) {
                        out.push(local);
                        ast[s].op = StmtOp::Empty;
                        ast[s].decl = None;
                    }
                }
            } else if !ast[d].storage.contains(Storage::TYPEDEF) {
                // A prototype; Go needs no forward declarations.
                ast[d].blank = true;
            }
        } else if ast[d].storage.contains(Storage::EXTERN) {
            ast[d].blank = true;
        }
        out.push(d);
    }
    out
}
