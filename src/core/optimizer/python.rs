//! Indentation-significant family (`.py`, `.pyw`, `.pyi`).
//!
//! Cross-line state lives in [`MultilineStringMachine`], which is fed one line
//! at a time. Detection is deliberately line-granular: a line that contains
//! a triple-quote delimiter flips the state even when the same line also
//! closes it, and nesting or mixing of the two delimiter styles is not
//! tracked. Downstream consumers rely on the output shape this produces.

use super::segments::{Segment, Spacing, find_in_code, rewrite_code, split_segments};
use crate::domain::models::OptimizationProfile;

const OPERATOR_SPACING: Spacing = Spacing {
    before: &['=', '+', '-', '*', '/', '<', '>', '!'],
    after: &['=', '+', '-', '*', '/', '<', '>', '!'],
    fusable: &['=', '+', '-', '*', '/', '<', '>', '!', '%', '&', '|', '^', '@'],
    collapse_runs: false,
};

const STRING_PREFIX_CHARS: &[char] = &['r', 'u', 'b', 'f', 'R', 'U', 'B', 'F'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// `"""`
    Double,
    /// `'''`
    Single,
}

impl Delimiter {
    pub fn as_str(self) -> &'static str {
        match self {
            Delimiter::Double => "\"\"\"",
            Delimiter::Single => "'''",
        }
    }

    /// The delimiter style that occurs first in `line`, if any.
    fn first_in(line: &str) -> Option<Self> {
        let double = line.find(Delimiter::Double.as_str());
        let single = line.find(Delimiter::Single.as_str());
        match (double, single) {
            (Some(d), Some(s)) if s < d => Some(Delimiter::Single),
            (Some(_), _) => Some(Delimiter::Double),
            (None, Some(_)) => Some(Delimiter::Single),
            (None, None) => None,
        }
    }
}

/// A string opened by a bare delimiter line is documentation; one opened
/// mid-expression (`x = """...`) is data and is always kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringKind {
    Docstring,
    Literal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineState {
    Normal,
    InMultilineString {
        delimiter: Delimiter,
        kind: StringKind,
    },
}

/// What a single line turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    Code,
    Opening(StringKind),
    Inside(StringKind),
    Closing(StringKind),
}

#[derive(Debug)]
pub struct MultilineStringMachine {
    state: LineState,
}

impl MultilineStringMachine {
    pub fn new() -> Self {
        Self {
            state: LineState::Normal,
        }
    }

    pub fn state(&self) -> LineState {
        self.state
    }

    /// Classifies `line` and performs at most one state transition.
    pub fn feed(&mut self, line: &str) -> LineClass {
        match self.state {
            LineState::Normal => match Delimiter::first_in(line) {
                Some(delimiter) => {
                    let kind = string_kind(line, delimiter);
                    self.state = LineState::InMultilineString { delimiter, kind };
                    LineClass::Opening(kind)
                }
                None => LineClass::Code,
            },
            LineState::InMultilineString { delimiter, kind } => {
                if line.contains(delimiter.as_str()) {
                    self.state = LineState::Normal;
                    LineClass::Closing(kind)
                } else {
                    LineClass::Inside(kind)
                }
            }
        }
    }
}

impl Default for MultilineStringMachine {
    fn default() -> Self {
        Self::new()
    }
}

fn string_kind(line: &str, delimiter: Delimiter) -> StringKind {
    let body = line.trim_start().trim_start_matches(STRING_PREFIX_CHARS);
    if body.starts_with(delimiter.as_str()) {
        StringKind::Docstring
    } else {
        StringKind::Literal
    }
}

/// The indentation step of a file: the greatest common divisor of the
/// space-indented depths of its statement lines, or 4 when nothing is
/// indented. Lines inside strings or inside open brackets do not count.
pub fn detect_indent_unit(text: &str) -> usize {
    let mut machine = MultilineStringMachine::new();
    let mut depth = 0i32;
    let mut continued = false;
    let mut unit = 0usize;

    for line in text.lines() {
        if machine.feed(line) != LineClass::Code {
            continue;
        }
        let (code, _) = split_comment(line);
        let code = code.trim_end();
        if code.trim().is_empty() {
            continue;
        }
        if depth == 0 && !continued {
            let spaces = line.len() - line.trim_start_matches(' ').len();
            if spaces > 0 {
                unit = gcd(unit, spaces);
            }
        }
        depth = (depth + bracket_delta(code)).max(0);
        continued = code.ends_with('\\');
    }

    if unit == 0 { 4 } else { unit }
}

fn gcd(a: usize, b: usize) -> usize {
    if b == 0 { a } else { gcd(b, a % b) }
}

fn bracket_delta(code: &str) -> i32 {
    split_segments(code, b"\"'")
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Code(code) => Some(code),
            Segment::Quoted(_) => None,
        })
        .flat_map(str::chars)
        .map(|c| match c {
            '(' | '[' | '{' => 1,
            ')' | ']' | '}' => -1,
            _ => 0,
        })
        .sum()
}

/// Splits a code line at the `#` that starts its comment, if any.
fn split_comment(line: &str) -> (&str, Option<&str>) {
    match find_in_code(line, b"\"'", "#") {
        Some(pos) => (&line[..pos], Some(&line[pos..])),
        None => (line, None),
    }
}

/// Tabs become one space each; a run of spaces keeps one space per `unit`
/// plus the remainder, so distinct depths stay distinct.
pub fn reduce_indentation(line: &str, unit: usize) -> String {
    let body = line.trim_start_matches([' ', '\t']);
    let indent = &line[..line.len() - body.len()];

    let mut out = String::with_capacity(line.len());
    let mut spaces = 0usize;
    for c in indent.chars() {
        if c == ' ' {
            spaces += 1;
            continue;
        }
        push_spaces(&mut out, spaces, unit);
        spaces = 0;
        out.push(' ');
    }
    push_spaces(&mut out, spaces, unit);
    out.push_str(body);
    out
}

fn push_spaces(out: &mut String, run: usize, unit: usize) {
    let unit = unit.max(1);
    let width = run / unit + run % unit;
    out.extend(std::iter::repeat_n(' ', width));
}

pub fn optimize_python(text: &str, profile: &OptimizationProfile) -> String {
    let unit = detect_indent_unit(text);
    let mut machine = MultilineStringMachine::new();
    let mut out: Vec<String> = Vec::new();

    for line in text.lines() {
        let keep_string = |kind: StringKind| {
            kind == StringKind::Literal || profile.preserve_docstrings
        };

        match machine.feed(line) {
            LineClass::Code => {
                let (code, comment) = split_comment(line.trim_end());
                let comment = comment.filter(|_| profile.preserve_comments);
                let code = code.trim_end();
                if code.trim().is_empty() {
                    if comment.is_some() {
                        out.push(reduce_indentation(line.trim_end(), unit));
                    }
                    continue;
                }
                let reduced = reduce_indentation(code, unit);
                let body_start = reduced.len() - reduced.trim_start().len();
                let (indent, body) = reduced.split_at(body_start);
                let body = rewrite_code(body, b"\"'", |code| OPERATOR_SPACING.apply(code));
                match comment {
                    Some(comment) => out.push(format!("{}{} {}", indent, body, comment)),
                    None => out.push(format!("{}{}", indent, body)),
                }
            }
            LineClass::Opening(kind) => {
                // Only the indentation is syntax; the rest belongs to the string.
                if keep_string(kind) {
                    out.push(reduce_indentation(line, unit));
                }
            }
            LineClass::Inside(kind) | LineClass::Closing(kind) => {
                if keep_string(kind) {
                    out.push(line.to_string());
                }
            }
        }
    }

    out.join("\n")
}
