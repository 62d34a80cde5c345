//! Parser boundary.
//!
//! Parsing source text is not part of this workspace. A host plugs its own
//! parser in through [`Parse`]; the registry only ever sees the resulting
//! `Ast` or a [`ParseFailure`].

use std::fmt;

use crate::Ast;

/// A parser from script source text to an `Ast` rooted at a `Program` node.
pub trait Parse {
    fn parse(&self, source: &str) -> Result<Ast, ParseFailure>;
}

impl<F> Parse for F
where
    F: Fn(&str) -> Result<Ast, ParseFailure>,
{
    fn parse(&self, source: &str) -> Result<Ast, ParseFailure> {
        self(source)
    }
}

/// Error reported by a `Parse` implementation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}{location}")]
pub struct ParseFailure {
    pub message: String,
    pub location: Location,
}

impl ParseFailure {
    /// A failure without source position.
    pub fn new(message: impl Into<String>) -> Self {
        ParseFailure {
            message: message.into(),
            location: Location::Unknown,
        }
    }

    /// A failure at a 1-based line and column.
    pub fn at(message: impl Into<String>, line: u32, column: u32) -> Self {
        ParseFailure {
            message: message.into(),
            location: Location::At { line, column },
        }
    }
}

/// Source position of a parse failure.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Location {
    #[default]
    Unknown,
    At {
        line: u32,
        column: u32,
    },
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Unknown => Ok(()),
            Location::At { line, column } => write!(f, " at {line}:{column}"),
        }
    }
}
