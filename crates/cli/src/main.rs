mod cli;
mod pipeline;

use clap::Parser;
use cli::Cli;
use pipeline::{report, run_file, run_stdin};
use std::fs;
use std::process;

fn main() {
    let cli = Cli::parse();

    // A malformed rule file is fatal before any translation begins.
    let rules = match &cli.rulefile {
        Some(path) => {
            let data = match fs::read_to_string(path) {
                Ok(data) => data,
                Err(err) => {
                    report(&format!("{}: {}", path.display(), err));
                    process::exit(1);
                }
            };
            match c2go_translate::parse_rules(&path.display().to_string(), &data) {
                Ok(rules) => rules,
                Err(err) => {
                    report(&err.to_string());
                    process::exit(1);
                }
            }
        }
        None => Vec::new(),
    };

    let opts = c2go_translate::Options {
        package: cli.package.clone(),
        verbose: cli.verbose,
    };

    let ok = if cli.files.is_empty() {
        run_stdin(&rules, &opts)
    } else {
        cli.files
            .iter()
            .map(|f| run_file(f, cli.write, &rules, &opts))
            .fold(true, |acc, ok| acc && ok)
    };

    if !ok {
        process::exit(1);
    }
}
