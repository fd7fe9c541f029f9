//! Core of c2go, a syntactic C-to-Go source translator.
//!
//! The entry point is [`translate`]: give it C source and it returns Go
//! syntax. It only operates syntactically: it does not type-check the C
//! code nor the generated Go code, and the generated Go will almost
//! certainly not compile. It serves as the starting point for a manual
//! translation, with the tedious reshaping already done.
//!
//! The pipeline:
//!
//! ```text
//! parse-loop -> rewrite_syntax -> simplify_bool -> rename_decls
//!            -> move_decls -> print -> pattern rewrite -> reformat
//! ```
//!
//! The parse loop exists because C's grammar needs typedef names up front:
//! on a parse error the driver mines the diagnostic text for identifiers
//! the parser flagged as probable types, adds them to the seed set, and
//! parses again, giving up only when an error round discovers nothing new.

pub mod decls;
pub mod rename;
pub mod rewrite;
pub mod syntax;

pub use rewrite::{parse_rules, Rule, RuleError};
pub use syntax::TmpGen;

use c2go_cc::ast::*;
use c2go_cc::lexer::LineIndex;
use c2go_cc::print::Printer;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranslateError {
    #[error(transparent)]
    Parse(#[from] Box<c2go_cc::ParseError>),
}

/// Translation options.
#[derive(Debug, Clone)]
pub struct Options {
    /// Import path whose base becomes the package clause.
    pub package: String,
    /// Emit parse-loop progress into the diagnostics list.
    pub verbose: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            package: "my/pkg".to_string(),
            verbose: false,
        }
    }
}

/// Result of translating one file: the Go text plus any non-fatal
/// diagnostics (name conflicts, skipped rewrites, verbose progress).
#[derive(Debug)]
pub struct Translated {
    pub go_source: String,
    pub diagnostics: Vec<String>,
}

/// Translate one C translation unit to Go syntax.
pub fn translate(
    file: &str,
    source: &str,
    rules: &[Rule],
    opts: &Options,
) -> Result<Translated, TranslateError> {
    let mut diagnostics = Vec::new();
    let mut ast = parse_loop(file, source, opts, &mut diagnostics)?;
    let lines = LineIndex::new(source);

    let mut tmp = TmpGen::new();
    syntax::rewrite_syntax(&mut ast, &mut tmp);
    syntax::simplify_bool(&mut ast);
    let decls = rename::rename_decls(&mut ast, &lines, &mut diagnostics);
    let decls = rename::hoist_statics(&mut ast, decls);
    decls::move_decls(&mut ast, &decls);
    let go_source = write_go(&mut ast, decls, file, rules, opts, &mut diagnostics);

    Ok(Translated {
        go_source,
        diagnostics,
    })
}

/// Parse, growing the typedef seed set from the parser's own diagnostics
/// until the file parses or an error round adds nothing.
fn parse_loop(
    file: &str,
    source: &str,
    opts: &Options,
    diagnostics: &mut Vec<String>,
) -> Result<Ast, TranslateError> {
    const PROMPTS: [&str; 3] = [
        "syntax error near ",
        "invalid function definition for ",
        "likely type near ",
    ];

    let mut types: Vec<String> = Vec::new();
    let mut have: HashSet<String> = HashSet::new();
    loop {
        let err = match c2go_cc::parse(file, source, &types) {
            Ok(ast) => return Ok(ast),
            Err(err) => err,
        };

        // Can we find some new inferred type names?
        let n = have.len();
        let text = err.to_string();
        if opts.verbose {
            diagnostics.push(format!("parse errors:\n{}", text));
        }
        for line in text.lines() {
            for prompt in PROMPTS {
                if let Some(i) = line.find(prompt) {
                    let word = &line[i + prompt.len()..];
                    if !word.is_empty() && !have.contains(word) {
                        have.insert(word.to_string());
                        if opts.verbose {
                            diagnostics.push(format!("assume {} is type", word));
                        }
                        types.push(word.to_string());
                    }
                    break;
                }
            }
        }
        if have.len() == n {
            return Err(err.into());
        }
    }
}

fn write_go(
    ast: &mut Ast,
    decls: Vec<DeclId>,
    file: &str,
    rules: &[Rule],
    opts: &Options,
    diagnostics: &mut Vec<String>,
) -> String {
    // Steal the file-header comment block (everything up to the last blank
    // line) from the first declaration, so it prints above the package
    // clause.
    if let Some(&first) = decls.first() {
        let before = &mut ast[first].syntax.comments.before;
        let mut steal = 0;
        for (i, com) in before.iter().enumerate() {
            if com.text.is_empty() {
                steal = i + 1;
            }
        }
        let rest = before.split_off(steal);
        let stolen = std::mem::replace(before, rest);
        ast.prog.syntax.comments.before.extend(stolen);
    } else {
        let after = &mut ast.prog.syntax.comments.after;
        let mut steal = 0;
        for (i, com) in after.iter().enumerate() {
            if com.text.is_empty() {
                steal = i + 1;
            }
            if com.directive {
                break;
            }
        }
        let rest = after.split_off(steal);
        let stolen = std::mem::replace(after, rest);
        ast.prog.syntax.comments.before.extend(stolen);
    }

    let mut p = Printer::new(ast);
    p.print_comments(&ast.prog.syntax.comments.before);

    // Blank declarations that lead the file carry header comments; they
    // print above the package clause too.
    let mut decls = &decls[..];
    while let Some((&first, rest)) = decls.split_first() {
        if !ast[first].blank {
            break;
        }
        p.print_decl(first);
        decls = rest;
    }

    let pkg = opts.package.rsplit('/').next().unwrap_or(&opts.package);
    p.raw("package ");
    p.raw(pkg);
    p.raw("\n");

    for &d in decls {
        p.raw("\n");
        p.print_decl(d);
    }
    // The separator newline already encodes one blank line; don't let a
    // leading blank marker double it.
    let after = &ast.prog.syntax.comments.after;
    let skip = after.iter().take_while(|c| c.text.is_empty()).count();
    if skip < after.len() {
        p.raw("\n");
        p.print_comments(&after[skip..]);
    }

    let mut buf = p.into_string();

    if !rules.is_empty() {
        match c2go_goast::parse_file(&buf) {
            Ok(mut f) => {
                rewrite::rewrite_file(&mut f, rules);
                buf = c2go_goast::print_file(&f);
            }
            Err(err) => {
                diagnostics.push(format!(
                    "parsing Go for {} before rewrites: {}",
                    file, err
                ));
                return buf;
            }
        }
    }

    // Reformat: parse and reprint. Failure is non-fatal; SideEffectFunc
    // markers make the output deliberately unparseable, and the raw text is
    // still useful.
    if let Ok(f) = c2go_goast::parse_file(&buf) {
        buf = c2go_goast::print_file(&f);
    }
    buf
}
