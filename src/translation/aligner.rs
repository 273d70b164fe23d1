//! # Response Aligner
//!
//! Turns the free-text service response back into one translation per input
//! position. Two pure stages:
//!
//! 1. [`tokenize_numbered_lines`] picks `<digits>. <text>` lines out of the
//!    response and ignores everything else.
//! 2. [`reconcile`] matches those candidates against the expected length and
//!    falls back to the source title wherever a position was not returned.
//!
//! The output always has exactly one entry per source title.

use std::collections::BTreeMap;

/// A `<digits>. <text>` line from the response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedLine {
    /// 1-based position claimed by the line
    pub position: usize,
    pub text: String,
}

/// How well a response lined up with its batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlignmentReport {
    pub expected: usize,
    /// Positions that received parsed text
    pub parsed: usize,
    /// 1-based positions filled with the source title
    pub missing_positions: Vec<usize>,
    /// Numbered lines whose number fell outside `1..=expected`
    pub stray_lines: usize,
}

impl AlignmentReport {
    pub fn is_complete(&self) -> bool {
        self.missing_positions.is_empty()
    }

    pub fn shortfall(&self) -> usize {
        self.missing_positions.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedBatch {
    /// One text per source position, in source order
    pub texts: Vec<String>,
    pub report: AlignmentReport,
}

/// Stage 1: extract numbered candidates, in response order
pub fn tokenize_numbered_lines(response: &str) -> Vec<NumberedLine> {
    response.lines().filter_map(parse_numbered_line).collect()
}

fn parse_numbered_line(line: &str) -> Option<NumberedLine> {
    let line = line.trim();
    let digits_end = line
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(idx, _)| idx)?;
    if digits_end == 0 {
        return None;
    }
    let rest = line[digits_end..].strip_prefix(". ")?;
    let text = rest.trim();
    if text.is_empty() {
        return None;
    }
    // Absurdly long numbers can never be in range
    let position = line[..digits_end].parse::<usize>().unwrap_or(usize::MAX);
    Some(NumberedLine {
        position,
        text: text.to_string(),
    })
}

/// Stage 2: one text per source position; the last duplicate of a number wins
pub fn reconcile<S: AsRef<str>>(sources: &[S], lines: Vec<NumberedLine>) -> AlignedBatch {
    let expected = sources.len();
    let mut by_position: BTreeMap<usize, String> = BTreeMap::new();
    let mut stray_lines = 0;

    for line in lines {
        if (1..=expected).contains(&line.position) {
            by_position.insert(line.position, line.text);
        } else {
            stray_lines += 1;
        }
    }

    let mut missing_positions = Vec::new();
    let texts = sources
        .iter()
        .enumerate()
        .map(|(idx, source)| {
            let position = idx + 1;
            by_position.remove(&position).unwrap_or_else(|| {
                missing_positions.push(position);
                source.as_ref().to_string()
            })
        })
        .collect();

    AlignedBatch {
        texts,
        report: AlignmentReport {
            expected,
            parsed: expected - missing_positions.len(),
            missing_positions,
            stray_lines,
        },
    }
}

/// Both stages in one call
pub fn align<S: AsRef<str>>(sources: &[S], response: &str) -> AlignedBatch {
    reconcile(sources, tokenize_numbered_lines(response))
}
