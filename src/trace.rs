//! Parser for circuit trace files.
//!
//! A trace describes a combinational circuit, for example the ISCAS-85
//! benchmark `c17`:
//!
//! ```text
//! MODULE c17
//! INPUT
//!   1gat,2gat,3gat,6gat,7gat;
//! OUTPUT
//!   22gat,23gat;
//! STRUCTURE
//!   10gat = nand(1gat, 3gat);
//!   11gat = nand(3gat, 6gat);
//!   16gat = nand(2gat, 11gat);
//!   19gat = nand(11gat, 7gat);
//!   22gat = nand(10gat, 16gat);
//!   23gat = nand(16gat, 19gat);
//! ENDMODULE
//! ```
//!
//! `#`-comment lines are recognized in the header (before `STRUCTURE`).
//! Identifier lists may span lines and end at `;`. `not` is unary, `xor`
//! binary, `and`/`or`/`nand`/`nor` n-ary with at least two operands, and
//! `out = src;` declares an alias. Parsing happens entirely at this
//! boundary; the synthesis core never sees a malformed trace.

use std::error::Error;
use std::fmt;

/// N-ary gate operator.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum NaryType {
    And,
    Or,
    Nand,
    Nor,
}

/// One `STRUCTURE` statement.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Gate {
    Not { output: String, input: String },
    Xor { output: String, inputs: [String; 2] },
    Nary { output: String, op: NaryType, inputs: Vec<String> },
    Alias { output: String, input: String },
}

impl Gate {
    pub fn output(&self) -> &str {
        match self {
            Gate::Not { output, .. } => output,
            Gate::Xor { output, .. } => output,
            Gate::Nary { output, .. } => output,
            Gate::Alias { output, .. } => output,
        }
    }
}

/// A parsed trace module.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Module {
    pub name: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub gates: Vec<Gate>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ParseError {
    MissingKeyword { keyword: &'static str, line: usize },
    UnterminatedList { keyword: &'static str, line: usize },
    MalformedGate { line: usize },
    UnknownOperator { op: String, line: usize },
    BadArity { op: String, arity: usize, line: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MissingKeyword { keyword, line } => {
                write!(f, "line {}: expected `{}`", line, keyword)
            }
            ParseError::UnterminatedList { keyword, line } => {
                write!(f, "line {}: `{}` list is not terminated by `;`", line, keyword)
            }
            ParseError::MalformedGate { line } => {
                write!(f, "line {}: malformed gate statement", line)
            }
            ParseError::UnknownOperator { op, line } => {
                write!(f, "line {}: unknown operator `{}`", line, op)
            }
            ParseError::BadArity { op, arity, line } => {
                write!(f, "line {}: operator `{}` cannot take {} operands", line, op, arity)
            }
        }
    }
}

impl Error for ParseError {}

struct Lines<'a> {
    iter: std::iter::Peekable<std::vec::IntoIter<(usize, &'a str)>>,
    last_line: usize,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str) -> Self {
        let lines: Vec<(usize, &str)> = text
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty())
            .collect();
        let last_line = lines.last().map_or(0, |&(n, _)| n);
        Self {
            iter: lines.into_iter().peekable(),
            last_line,
        }
    }

    /// Next line, skipping header comments when `comments` is set.
    fn next(&mut self, comments: bool) -> Option<(usize, &'a str)> {
        loop {
            let (n, line) = self.iter.next()?;
            if comments && line.starts_with('#') {
                continue;
            }
            return Some((n, line));
        }
    }
}

impl Module {
    /// Parse a trace from its textual form.
    pub fn parse(text: &str) -> Result<Module, ParseError> {
        let mut lines = Lines::new(text);
        let last = lines.last_line;

        let (n, line) = lines.next(true).ok_or(ParseError::MissingKeyword { keyword: "MODULE", line: last })?;
        let name = line
            .strip_prefix("MODULE")
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or(ParseError::MissingKeyword { keyword: "MODULE", line: n })?
            .to_string();

        let inputs = parse_id_list(&mut lines, "INPUT")?;
        let outputs = parse_id_list(&mut lines, "OUTPUT")?;

        let (n, line) = lines.next(true).ok_or(ParseError::MissingKeyword { keyword: "STRUCTURE", line: last })?;
        if line != "STRUCTURE" {
            return Err(ParseError::MissingKeyword { keyword: "STRUCTURE", line: n });
        }

        let mut gates = Vec::new();
        loop {
            let (n, line) = lines.next(false).ok_or(ParseError::MissingKeyword { keyword: "ENDMODULE", line: last })?;
            if line == "ENDMODULE" {
                break;
            }
            gates.push(parse_gate(n, line)?);
        }

        Ok(Module { name, inputs, outputs, gates })
    }
}

/// Parse `<keyword>` followed by a comma-separated identifier list ending
/// at `;`, possibly spanning lines. The list may begin on the keyword line.
fn parse_id_list(lines: &mut Lines, keyword: &'static str) -> Result<Vec<String>, ParseError> {
    let last = lines.last_line;
    let (n, line) = lines.next(true).ok_or(ParseError::MissingKeyword { keyword, line: last })?;
    let mut rest = line
        .strip_prefix(keyword)
        .ok_or(ParseError::MissingKeyword { keyword, line: n })?
        .to_string();

    const KEYWORDS: [&str; 5] = ["MODULE", "INPUT", "OUTPUT", "STRUCTURE", "ENDMODULE"];

    while !rest.contains(';') {
        let (_, line) = lines
            .next(true)
            .ok_or(ParseError::UnterminatedList { keyword, line: last })?;
        // Running into the next section means the `;` never came.
        if line.split_whitespace().next().is_some_and(|word| KEYWORDS.contains(&word)) {
            return Err(ParseError::UnterminatedList { keyword, line: n });
        }
        rest.push(' ');
        rest.push_str(line);
    }

    let (list, trailing) = rest.split_once(';').unwrap();
    if !trailing.trim().is_empty() {
        return Err(ParseError::UnterminatedList { keyword, line: n });
    }

    Ok(list
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect())
}

fn parse_gate(line_no: usize, line: &str) -> Result<Gate, ParseError> {
    let statement = line
        .strip_suffix(';')
        .ok_or(ParseError::MalformedGate { line: line_no })?;
    let (output, rhs) = statement
        .split_once('=')
        .ok_or(ParseError::MalformedGate { line: line_no })?;
    let output = output.trim().to_string();
    let rhs = rhs.trim();
    if output.is_empty() || rhs.is_empty() {
        return Err(ParseError::MalformedGate { line: line_no });
    }

    let Some((op, args)) = rhs.split_once('(') else {
        // Bare `out = src;` aliases another signal.
        return Ok(Gate::Alias { output, input: rhs.to_string() });
    };
    let op = op.trim();
    let args = args
        .strip_suffix(')')
        .ok_or(ParseError::MalformedGate { line: line_no })?;
    let inputs: Vec<String> = args
        .split(',')
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect();

    let arity = inputs.len();
    let arity_error = || ParseError::BadArity {
        op: op.to_string(),
        arity,
        line: line_no,
    };

    let mut inputs = inputs;
    match op {
        "not" => {
            if arity != 1 {
                return Err(arity_error());
            }
            Ok(Gate::Not { output, input: inputs.pop().unwrap() })
        }
        "xor" => {
            if arity != 2 {
                return Err(arity_error());
            }
            let b = inputs.pop().unwrap();
            let a = inputs.pop().unwrap();
            Ok(Gate::Xor { output, inputs: [a, b] })
        }
        "and" | "or" | "nand" | "nor" => {
            if arity < 2 {
                return Err(arity_error());
            }
            let op = match op {
                "and" => NaryType::And,
                "or" => NaryType::Or,
                "nand" => NaryType::Nand,
                _ => NaryType::Nor,
            };
            Ok(Gate::Nary { output, op, inputs })
        }
        _ => Err(ParseError::UnknownOperator { op: op.to_string(), line: line_no }),
    }
}
