//! Brace-delimited family: JavaScript/TypeScript and the C/Java lineage.

use super::segments::Spacing;
use crate::domain::models::OptimizationProfile;

const TOKEN_SPACING: Spacing = Spacing {
    before: &[
        '=', '+', '-', '*', '/', '<', '>', '!', '{', '}', '(', ')', ';', ',',
    ],
    after: &[
        '=', '+', '-', '*', '/', '<', '>', '!', '{', '}', '(', ')', ';', ',',
    ],
    fusable: &['=', '+', '-', '*', '/', '<', '>', '!', '&', '|', '%', '^'],
    collapse_runs: true,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Code,
    Quoted(char),
    LineComment,
    BlockComment,
}

/// Removes `//` and `/* */` comments outside string literals. A dropped
/// block comment leaves one space so neighbouring tokens stay apart.
pub fn strip_comments(text: &str, keep_line: bool, keep_block: bool) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut state = ScanState::Code;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match state {
            ScanState::Code => match (c, next) {
                ('/', Some('/')) => {
                    state = ScanState::LineComment;
                    if keep_line {
                        out.push_str("//");
                    }
                    i += 2;
                    continue;
                }
                ('/', Some('*')) => {
                    state = ScanState::BlockComment;
                    out.push_str(if keep_block { "/*" } else { " " });
                    i += 2;
                    continue;
                }
                ('"' | '\'' | '`', _) => {
                    state = ScanState::Quoted(c);
                    out.push(c);
                }
                _ => out.push(c),
            },
            ScanState::Quoted(quote) => {
                out.push(c);
                if c == '\\' {
                    if let Some(escaped) = next {
                        out.push(escaped);
                        i += 2;
                        continue;
                    }
                } else if c == quote || (c == '\n' && quote != '`') {
                    state = ScanState::Code;
                }
            }
            ScanState::LineComment => {
                if c == '\n' {
                    state = ScanState::Code;
                    out.push(c);
                } else if keep_line {
                    out.push(c);
                }
            }
            ScanState::BlockComment => {
                if c == '*' && next == Some('/') {
                    state = ScanState::Code;
                    if keep_block {
                        out.push_str("*/");
                    }
                    i += 2;
                    continue;
                }
                if keep_block {
                    out.push(c);
                }
            }
        }
        i += 1;
    }

    out
}

/// A construct left open at the end of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Carry {
    Nothing,
    Template,
    BlockComment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece<'a> {
    Code(&'a str),
    Protected(&'a str),
}

/// Index just past the unescaped `quote` at or after `from`.
fn find_unescaped(bytes: &[u8], from: usize, quote: u8) -> Option<usize> {
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return Some(i + 1),
            _ => i += 1,
        }
    }
    None
}

fn find_block_end(line: &str, from: usize) -> Option<usize> {
    line[from..].find("*/").map(|p| from + p + 2)
}

/// Splits one line into code and protected pieces. Literals and surviving
/// comments are protected; template literals and block comments may carry
/// over to the next line.
fn line_pieces(line: &str, carry: Carry) -> (Vec<Piece<'_>>, Carry) {
    let bytes = line.as_bytes();
    let mut pieces = Vec::new();
    let mut i = 0;

    let resumed_end = match carry {
        Carry::Nothing => Some(0),
        Carry::Template => find_unescaped(bytes, 0, b'`'),
        Carry::BlockComment => find_block_end(line, 0),
    };
    match resumed_end {
        None => return (vec![Piece::Protected(line)], carry),
        Some(0) => {}
        Some(end) => {
            pieces.push(Piece::Protected(&line[..end]));
            i = end;
        }
    }

    let mut code_start = i;
    while i < bytes.len() {
        let (end, open) = match (bytes[i], bytes.get(i + 1)) {
            (b'/', Some(b'/')) => (bytes.len(), Carry::Nothing),
            (b'/', Some(b'*')) => match find_block_end(line, i + 2) {
                Some(end) => (end, Carry::Nothing),
                None => (bytes.len(), Carry::BlockComment),
            },
            (b'`', _) => match find_unescaped(bytes, i + 1, b'`') {
                Some(end) => (end, Carry::Nothing),
                None => (bytes.len(), Carry::Template),
            },
            (quote @ (b'"' | b'\''), _) => (
                find_unescaped(bytes, i + 1, quote).unwrap_or(bytes.len()),
                Carry::Nothing,
            ),
            _ => {
                i += 1;
                continue;
            }
        };

        let end = end.min(bytes.len());
        if code_start < i {
            pieces.push(Piece::Code(&line[code_start..i]));
        }
        pieces.push(Piece::Protected(&line[i..end]));
        i = end;
        code_start = end;
        if open != Carry::Nothing {
            return (pieces, open);
        }
    }

    if code_start < bytes.len() {
        pieces.push(Piece::Code(&line[code_start..]));
    }
    (pieces, Carry::Nothing)
}

fn collapse_runs(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    let mut in_run = false;
    for c in code.chars() {
        if c.is_whitespace() {
            if !in_run {
                out.push(' ');
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}

pub fn optimize_brace(text: &str, profile: &OptimizationProfile) -> String {
    let stripped = strip_comments(text, profile.preserve_comments, profile.preserve_docstrings);
    let mut out: Vec<String> = Vec::new();
    let mut carry = Carry::Nothing;

    for line in stripped.lines() {
        let resumed = carry != Carry::Nothing;
        let line = if resumed { line } else { line.trim() };
        // Preprocessor directives: `#define F (x)` must not become `F(x)`.
        let directive = !resumed && line.starts_with('#');

        let (pieces, next) = line_pieces(line, carry);
        carry = next;

        let mut joined = String::with_capacity(line.len());
        for piece in pieces {
            match piece {
                Piece::Protected(text) => joined.push_str(text),
                Piece::Code(code) if directive => joined.push_str(&collapse_runs(code)),
                Piece::Code(code) => joined.push_str(&TOKEN_SPACING.apply(code)),
            }
        }

        if resumed || !joined.trim().is_empty() {
            out.push(joined);
        }
    }

    out.join("\n")
}
