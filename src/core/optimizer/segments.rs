//! String-aware helpers shared by the language transforms.
//!
//! Text is split into code and quoted-string segments so that whitespace
//! rewriting never reaches inside a literal. Quotes are ASCII, so scanning
//! bytes always lands slices on char boundaries.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Code(&'a str),
    Quoted(&'a str),
}

/// Splits `text` into code and string segments. A string ends at its
/// matching unescaped quote or at the end of the line; an unterminated one
/// runs to the end of the text.
pub fn split_segments<'a>(text: &'a str, quotes: &[u8]) -> Vec<Segment<'a>> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut code_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let quote = bytes[i];
        if !quotes.contains(&quote) {
            i += 1;
            continue;
        }
        if code_start < i {
            segments.push(Segment::Code(&text[code_start..i]));
        }

        let start = i;
        i += 1;
        while i < bytes.len() {
            match bytes[i] {
                b'\\' => i += 2,
                b if b == quote => {
                    i += 1;
                    break;
                }
                b'\n' => break,
                _ => i += 1,
            }
        }

        let end = i.min(bytes.len());
        segments.push(Segment::Quoted(&text[start..end]));
        code_start = end;
        i = end;
    }

    if code_start < text.len() {
        segments.push(Segment::Code(&text[code_start..]));
    }
    segments
}

/// Applies `rewrite` to every code segment and reassembles the text with
/// strings untouched.
pub fn rewrite_code(text: &str, quotes: &[u8], rewrite: impl Fn(&str) -> String) -> String {
    let mut out = String::with_capacity(text.len());
    for segment in split_segments(text, quotes) {
        match segment {
            Segment::Code(code) => out.push_str(&rewrite(code)),
            Segment::Quoted(quoted) => out.push_str(quoted),
        }
    }
    out
}

/// Byte offset of the first `marker` that sits in code rather than inside a
/// string.
pub fn find_in_code(text: &str, quotes: &[u8], marker: &str) -> Option<usize> {
    let mut offset = 0;
    for segment in split_segments(text, quotes) {
        match segment {
            Segment::Code(code) => {
                if let Some(pos) = code.find(marker) {
                    return Some(offset + pos);
                }
                offset += code.len();
            }
            Segment::Quoted(quoted) => offset += quoted.len(),
        }
    }
    None
}

/// Whitespace policy around punctuation.
#[derive(Debug, Clone, Copy)]
pub struct Spacing {
    /// Whitespace directly before one of these is removed.
    pub before: &'static [char],
    /// Whitespace directly after one of these is removed.
    pub after: &'static [char],
    /// Whitespace between two of these stays, so `a - -b` never becomes `a--b`.
    pub fusable: &'static [char],
    /// Shrink every other whitespace run to a single space.
    pub collapse_runs: bool,
}

impl Spacing {
    pub fn apply(&self, code: &str) -> String {
        let mut out = String::with_capacity(code.len());
        let mut chars = code.chars().peekable();

        while let Some(c) = chars.next() {
            if !c.is_whitespace() {
                out.push(c);
                continue;
            }

            let mut run = String::from(c);
            while let Some(&n) = chars.peek() {
                if !n.is_whitespace() {
                    break;
                }
                run.push(n);
                chars.next();
            }

            let prev = out.chars().last();
            let next = chars.peek().copied();
            let touches = prev.is_some_and(|p| self.after.contains(&p))
                || next.is_some_and(|n| self.before.contains(&n));
            let fuses = prev.is_some_and(|p| self.fusable.contains(&p))
                && next.is_some_and(|n| self.fusable.contains(&n));

            if touches && !fuses {
                continue;
            }
            if self.collapse_runs {
                out.push(' ');
            } else {
                out.push_str(&run);
            }
        }

        out
    }
}
