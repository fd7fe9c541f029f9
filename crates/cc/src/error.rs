//! Parse errors.
//!
//! The rendered text is part of the front end's contract: the translator's
//! driver greps diagnostics for `syntax error near X`, `invalid function
//! definition for X`, and `likely type near X` to grow its set of presumed
//! typedef names before re-parsing.

use thiserror::Error;

/// File and 1-based line of a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pos {
    pub file: String,
    pub line: u32,
}

impl Pos {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Pos {
            file: file.into(),
            line,
        }
    }
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Generic unexpected-token failure.
    #[error("{pos}: syntax error near {near}")]
    Syntax { pos: Pos, near: String },

    /// A function definition whose parameter list stalls on an unknown
    /// identifier in type position.
    #[error("{pos}: invalid function definition for {name}")]
    InvalidFuncDef { pos: Pos, name: String },

    /// A declaration-shaped construct beginning with an unknown identifier;
    /// the identifier is probably a typedef the parser has not seen.
    #[error("{pos}: likely type near {name}")]
    LikelyType { pos: Pos, name: String },

    #[error("{pos}: unexpected end of file")]
    UnexpectedEof { pos: Pos },
}

impl ParseError {
    pub fn syntax(pos: Pos, near: impl Into<String>) -> Self {
        ParseError::Syntax {
            pos,
            near: near.into(),
        }
    }

    pub fn likely_type(pos: Pos, name: impl Into<String>) -> Self {
        ParseError::LikelyType {
            pos,
            name: name.into(),
        }
    }

    pub fn invalid_func_def(pos: Pos, name: impl Into<String>) -> Self {
        ParseError::InvalidFuncDef {
            pos,
            name: name.into(),
        }
    }
}
