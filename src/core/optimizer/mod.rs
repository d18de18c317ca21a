//! Per-language text shrinking.
//!
//! Levels compose additively: level 1 normalizes whitespace, level 2 adds
//! the language family's transform, level 3 adds global whitespace
//! tightening for the formats where that cannot change meaning. Every
//! transform is infallible; the worst case is level-1 output.

mod brace;
mod json;
mod markup;
mod python;
mod segments;

use crate::domain::models::{OptimizationLevel, OptimizationProfile};
use segments::{Spacing, find_in_code, rewrite_code};

const AGGRESSIVE_SPACING: Spacing = Spacing {
    before: &['{', '}', ')', ';', ',', ':'],
    // `(` only sheds trailing space: `and (max-width` must stay apart.
    after: &['{', '}', '(', ')', ';', ',', ':'],
    fusable: &[],
    collapse_runs: true,
};

/// Dispatch key for level-2 transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageFamily {
    Indented,
    Brace,
    Markup,
    Stylesheet,
    Structured,
    Generic,
}

impl LanguageFamily {
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            ".py" | ".pyw" | ".pyi" => LanguageFamily::Indented,
            ".js" | ".jsx" | ".ts" | ".tsx" | ".mjs" | ".cjs" | ".java" | ".c" | ".cpp"
            | ".cc" | ".h" | ".hpp" => LanguageFamily::Brace,
            ".html" | ".htm" | ".xml" => LanguageFamily::Markup,
            ".css" | ".scss" | ".sass" => LanguageFamily::Stylesheet,
            ".json" => LanguageFamily::Structured,
            _ => LanguageFamily::Generic,
        }
    }

    /// The level-2 transform.
    pub fn transform(self, text: &str, profile: &OptimizationProfile) -> String {
        match self {
            LanguageFamily::Indented => python::optimize_python(text, profile),
            LanguageFamily::Brace => brace::optimize_brace(text, profile),
            LanguageFamily::Markup => markup::optimize_markup(text),
            LanguageFamily::Stylesheet => markup::optimize_stylesheet(text, profile),
            LanguageFamily::Structured => json::minify_json(text)
                .unwrap_or_else(|| optimize_generic(text, profile)),
            LanguageFamily::Generic => optimize_generic(text, profile),
        }
    }

    /// Whether level 3 may rewrite token-adjacent whitespace.
    pub fn allows_aggressive(self) -> bool {
        matches!(
            self,
            LanguageFamily::Structured | LanguageFamily::Stylesheet
        )
    }
}

/// Optimizes `text` for a file with lower-cased extension `ext`.
pub fn optimize(text: &str, ext: &str, profile: &OptimizationProfile) -> String {
    let mut out = normalize_whitespace(text);
    if profile.level < OptimizationLevel::Language {
        return out;
    }

    let family = LanguageFamily::from_extension(ext);
    out = family.transform(&out, profile);
    if profile.level >= OptimizationLevel::Aggressive && family.allows_aggressive() {
        out = tighten_globally(&out);
    }
    normalize_whitespace(&out)
}

/// Level 1: strip trailing whitespace, squeeze blank-line runs to one, and
/// trim blank lines at both ends.
pub fn normalize_whitespace(text: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut previous_blank = true;
    for line in text.lines() {
        let line = line.trim_end();
        let blank = line.is_empty();
        if blank && previous_blank {
            continue;
        }
        lines.push(line);
        previous_blank = blank;
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

pub(crate) fn drop_blank_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fallback for unrecognized families.
fn optimize_generic(text: &str, profile: &OptimizationProfile) -> String {
    text.lines()
        .filter(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                return false;
            }
            profile.preserve_comments
                || !(trimmed.starts_with('#')
                    || trimmed.starts_with("//")
                    || trimmed.starts_with("--"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Level 3: every whitespace run outside string literals becomes one space,
/// then spacing around structural punctuation is removed. A `//` comment
/// keeps its text and the line break that ends it.
fn tighten_globally(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending = String::new();
    for line in text.lines() {
        match find_in_code(line, b"\"'", "//") {
            Some(start) => {
                pending.push_str(&line[..start]);
                out.push_str(&tighten_run(&pending));
                out.push_str(line[start..].trim_end());
                out.push('\n');
                pending.clear();
            }
            None => {
                pending.push_str(line);
                pending.push('\n');
            }
        }
    }
    out.push_str(&tighten_run(&pending));
    out.trim().to_string()
}

fn tighten_run(code: &str) -> String {
    rewrite_code(code, b"\"'", |code| AGGRESSIVE_SPACING.apply(code))
        .trim()
        .to_string()
}
