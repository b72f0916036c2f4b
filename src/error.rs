//! Error types for the WCNF ingest boundary.
use thiserror::Error;

/// Possible errors while parsing a WCNF input.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("could not read '{path}'")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: missing header, expected a line starting with 'p'")]
    MissingHeader { line: usize },

    #[error("line {line}: malformed header '{header}', expected 'p <fmt> <vars> <clauses> <top>'")]
    InvalidHeader { line: usize, header: String },

    #[error("line {line}: malformed clause line '{text}'")]
    InvalidClause { line: usize, text: String },

    #[error("line {line}: clause is not terminated with a trailing 0")]
    UnterminatedClause { line: usize },

    #[error("line {line}: literal {lit} refers to variable {var}, outside 1..={max}")]
    LiteralOutOfRange {
        line: usize,
        lit: i32,
        var: u32,
        max: u32,
    },

    #[error("formula has {clause_count} clauses while the header specifies {header_clause_count}")]
    ClauseCount {
        clause_count: usize,
        header_clause_count: usize,
    },
}
