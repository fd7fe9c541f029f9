//! File handling around the translator core.

use c2go_translate::{translate, Options, Rule, Translated};
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

/// Print a diagnostic line, prefixed with the tool name.
pub fn report(msg: &str) {
    for line in msg.lines() {
        eprintln!("c2go: {}", line);
    }
}

/// Translate one named input, reporting collected diagnostics as we go.
/// Returns the Go text, or `None` after printing a fatal parse error.
fn run(name: &str, source: &str, rules: &[Rule], opts: &Options) -> Option<String> {
    match translate(name, source, rules, opts) {
        Ok(Translated {
            go_source,
            diagnostics,
        }) => {
            for d in &diagnostics {
                report(d);
            }
            Some(go_source)
        }
        Err(err) => {
            report(&err.to_string());
            None
        }
    }
}

/// Translate stdin to stdout. Returns false on fatal error.
pub fn run_stdin(rules: &[Rule], opts: &Options) -> bool {
    let mut source = String::new();
    if let Err(err) = io::stdin().read_to_string(&mut source) {
        report(&err.to_string());
        return false;
    }
    match run("stdin", &source, rules, opts) {
        Some(out) => {
            let _ = io::stdout().write_all(out.as_bytes());
            true
        }
        None => false,
    }
}

/// Translate one file, writing alongside it (`-w`) or to stdout.
pub fn run_file(path: &Path, write: bool, rules: &[Rule], opts: &Options) -> bool {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            report(&format!("{}: {}", path.display(), err));
            return false;
        }
    };
    let name = path.display().to_string();
    let Some(out) = run(&name, &source, rules, opts) else {
        return false;
    };

    if write {
        let base = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.clone());
        let out_name = format!("{}.go", base.strip_suffix(".c").unwrap_or(&base));
        let out_path = path.with_file_name(out_name);
        if let Err(err) = fs::write(&out_path, out) {
            report(&format!("{}: {}", out_path.display(), err));
            return false;
        }
    } else {
        let _ = io::stdout().write_all(out.as_bytes());
    }
    true
}
