//! WCNF-style ingest: reads a weighted CNF file, asserting hard clauses into the engine's
//! watch/propagation machinery and storing soft clauses for retrieval only.
use std::fs;
use std::io::{self, BufRead};
use std::path::Path;

use log::info;

use crate::engine::{self, Engine};
use crate::error::ParseError;
use crate::lit::Lit;

struct Header {
    var_count: usize,
    clause_count: usize,
    top: i64,
}

fn parse_header(line_no: usize, line: &str) -> Result<Header, ParseError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != 5 || tokens[0] != "p" {
        return Err(ParseError::InvalidHeader { line: line_no, header: line.to_string() });
    }
    let var_count = tokens[2]
        .parse()
        .map_err(|_| ParseError::InvalidHeader { line: line_no, header: line.to_string() })?;
    let clause_count = tokens[3]
        .parse()
        .map_err(|_| ParseError::InvalidHeader { line: line_no, header: line.to_string() })?;
    let top = tokens[4]
        .parse()
        .map_err(|_| ParseError::InvalidHeader { line: line_no, header: line.to_string() })?;
    Ok(Header { var_count, clause_count, top })
}

fn parse_clause_line(
    line_no: usize,
    line: &str,
    var_count: usize,
) -> Result<(i64, Vec<Lit>), ParseError> {
    let mut tokens = line.split_whitespace();
    let weight: i64 = tokens
        .next()
        .ok_or_else(|| ParseError::InvalidClause { line: line_no, text: line.to_string() })?
        .parse()
        .map_err(|_| ParseError::InvalidClause { line: line_no, text: line.to_string() })?;

    let mut lits = Vec::new();
    let mut terminated = false;
    for tok in tokens {
        let raw: i32 = tok
            .parse()
            .map_err(|_| ParseError::InvalidClause { line: line_no, text: line.to_string() })?;
        if raw == 0 {
            terminated = true;
            break;
        }
        let var = raw.unsigned_abs();
        if var == 0 || var as usize > var_count {
            return Err(ParseError::LiteralOutOfRange {
                line: line_no,
                lit: raw,
                var,
                max: var_count as u32,
            });
        }
        lits.push(Lit::from_i32(raw));
    }
    if !terminated {
        return Err(ParseError::UnterminatedClause { line: line_no });
    }
    Ok((weight, lits))
}

/// Parses a WCNF-style formula from `path` into `engine`, returning the ingest result code
/// (`0` or `20`, per the contract) on success.
///
/// `engine` must not have been used for any clause yet; this function calls
/// [`Engine::set_var_count`] itself once the header is read.
pub fn parse(engine: &mut Engine, path: impl AsRef<Path>) -> Result<i32, ParseError> {
    let path = path.as_ref();
    let file = fs::File::open(path).map_err(|source| ParseError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_reader(engine, io::BufReader::new(file))
}

/// Parses a WCNF-style formula from any line-buffered reader. Exposed separately from
/// [`parse`] so tests can feed in-memory formulas without touching the filesystem.
pub fn parse_reader(engine: &mut Engine, reader: impl BufRead) -> Result<i32, ParseError> {
    let mut header: Option<Header> = None;
    let mut clauses_seen = 0usize;

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|source| ParseError::Io { path: String::new(), source })?;
        let line = line.trim_end();
        if line.is_empty() || line.starts_with('c') {
            continue;
        }
        if line.starts_with('p') {
            let h = parse_header(line_no, line)?;
            engine.set_var_count(h.var_count);
            header = Some(h);
            continue;
        }

        let h = header.as_ref().ok_or(ParseError::MissingHeader { line: line_no })?;
        let (weight, lits) = parse_clause_line(line_no, line, h.var_count)?;
        clauses_seen += 1;

        if weight == h.top {
            let is_unit = lits.len() == 1;
            let is_empty = lits.is_empty();
            let unit_lit = lits.first().copied();
            engine.add_clause(lits);
            if is_empty {
                engine.assert_contradiction();
            } else if is_unit {
                engine.assert_top_level_unit(unit_lit.unwrap());
            }
        } else {
            engine.add_soft_clause(lits);
        }
    }

    let header = header.ok_or(ParseError::MissingHeader { line: 1 })?;
    if clauses_seen != header.clause_count {
        return Err(ParseError::ClauseCount {
            clause_count: clauses_seen,
            header_clause_count: header.clause_count,
        });
    }

    engine.mark_origin();
    info!(
        "parsed {} hard clauses, {} soft clauses ({} lines)",
        engine.get_hard_clause().len(),
        engine.get_soft_clause().len(),
        clauses_seen
    );

    if engine.has_contradiction() {
        return Ok(engine::UNSAT);
    }

    match engine.propagate() {
        Some(_) => Ok(engine::UNSAT),
        None => Ok(engine::CONTINUE),
    }
}
