//! The pair store: a read-only, in-memory corpus of known plaintext/
//! ciphertext block pairs, plus the text-file loader that builds one.

use std::fs;
use std::path::Path;

use crate::error::CorpusError;

/// The four 32-bit halves of a single plaintext/ciphertext pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pair {
    pub p_left: u32,
    pub p_right: u32,
    pub c_left: u32,
    pub c_right: u32,
}

/// An immutable, indexable corpus of block pairs, all produced under the
/// same unknown key.
///
/// Stored as four parallel arrays rather than a `Vec<Pair>`; this is a
/// representation choice for cache locality during the hot predicate loop,
/// not a semantic requirement.
#[derive(Debug, Default)]
pub struct PairCorpus {
    p_left: Vec<u32>,
    p_right: Vec<u32>,
    c_left: Vec<u32>,
    c_right: Vec<u32>,
}

impl PairCorpus {
    /// Builds a corpus from already-parsed halves. Infallible: malformed
    /// input is a loader concern, not a corpus concern.
    pub fn from_halves(pairs: Vec<(u32, u32, u32, u32)>) -> Self {
        let mut corpus = PairCorpus {
            p_left: Vec::with_capacity(pairs.len()),
            p_right: Vec::with_capacity(pairs.len()),
            c_left: Vec::with_capacity(pairs.len()),
            c_right: Vec::with_capacity(pairs.len()),
        };
        for (pl, pr, cl, cr) in pairs {
            corpus.p_left.push(pl);
            corpus.p_right.push(pr);
            corpus.c_left.push(cl);
            corpus.c_right.push(cr);
        }
        corpus
    }

    pub fn count(&self) -> usize {
        self.p_left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn p_left(&self, i: usize) -> u32 {
        self.p_left[i]
    }

    pub fn p_right(&self, i: usize) -> u32 {
        self.p_right[i]
    }

    pub fn c_left(&self, i: usize) -> u32 {
        self.c_left[i]
    }

    pub fn c_right(&self, i: usize) -> u32 {
        self.c_right[i]
    }

    /// Returns pair `i` as a standalone value, convenient for the predicate
    /// functions in [`crate::approx`].
    pub fn pair(&self, i: usize) -> Pair {
        Pair {
            p_left: self.p_left[i],
            p_right: self.p_right[i],
            c_left: self.c_left[i],
            c_right: self.c_right[i],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Pair> + '_ {
        (0..self.count()).map(move |i| self.pair(i))
    }

    /// Loads a corpus from the `Plaintext=`/`Ciphertext=` text format
    /// described in the external interface contract.
    pub fn load(path: &Path) -> Result<Self, CorpusError> {
        let text = fs::read_to_string(path).map_err(|source| CorpusError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let mut pairs = Vec::new();
        let mut pending: Option<(u32, u32)> = None;

        for (idx, raw_line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(rest) = strip_field(line, "Plaintext=") {
                pending = Some(parse_halves(rest, line_no)?);
            } else if let Some(rest) = strip_field(line, "Ciphertext=") {
                let (c_left, c_right) = parse_halves(rest, line_no)?;
                let (p_left, p_right) = pending.take().ok_or_else(|| CorpusError::Parse {
                    line: line_no,
                    message: "Ciphertext= with no preceding Plaintext=".to_string(),
                })?;
                pairs.push((p_left, p_right, c_left, c_right));
            }
            // Any other line is ignored per the external interface contract.
        }

        if pairs.is_empty() {
            return Err(CorpusError::Empty);
        }

        Ok(Self::from_halves(pairs))
    }
}

fn strip_field<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    line.strip_prefix(prefix).map(|rest| rest.trim_start())
}

fn parse_halves(field: &str, line_no: usize) -> Result<(u32, u32), CorpusError> {
    let digits = field.trim();
    if digits.len() != 16 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CorpusError::Parse {
            line: line_no,
            message: format!("expected 16 hex digits, got {digits:?}"),
        });
    }
    let left = u32::from_str_radix(&digits[0..8], 16).map_err(|e| CorpusError::Parse {
        line: line_no,
        message: e.to_string(),
    })?;
    let right = u32::from_str_radix(&digits[8..16], 16).map_err(|e| CorpusError::Parse {
        line: line_no,
        message: e.to_string(),
    })?;
    Ok((left, right))
}
