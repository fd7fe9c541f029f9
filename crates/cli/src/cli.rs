//! Command-line interface for c2go.

use clap::Parser;
use std::path::PathBuf;

/// Translate C syntax source files into Go syntax.
///
/// c2go only operates syntactically: it does not type-check the C code nor
/// the generated Go code. The output almost certainly does not compile, but
/// it is a useful starting point for a manual translation.
#[derive(Parser)]
#[command(name = "c2go")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Load rewrite rules from this file.
    ///
    /// Blank lines and lines beginning with # are ignored; other lines take
    /// the form "old -> new", interpreted like patterns passed to gofmt -r.
    #[arg(short = 'r', value_name = "FILE")]
    pub rulefile: Option<PathBuf>,

    /// Write a .go file next to each input instead of standard output.
    #[arg(short = 'w')]
    pub write: bool,

    /// Print verbose output.
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Import path whose base names the emitted package.
    #[arg(short = 'p', value_name = "PATH", default_value = "my/pkg")]
    pub package: String,

    /// C source files; standard input when none are given.
    pub files: Vec<PathBuf>,
}
