//! Markup (`.html`, `.xml`) and stylesheet (`.css`, `.scss`, `.sass`)
//! transforms.

use super::brace::strip_comments;
use super::drop_blank_lines;
use super::segments::{Spacing, rewrite_code};
use crate::domain::models::OptimizationProfile;
use regex::Regex;
use std::sync::LazyLock;

static BETWEEN_TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r">\s+<").unwrap());
static SEMICOLON_BEFORE_BRACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r";(\s*\})").unwrap());

const RULE_SPACING: Spacing = Spacing {
    before: &['{', '}', ':', ';', ','],
    after: &['{', '}', ':', ';', ','],
    fusable: &[],
    collapse_runs: false,
};

pub fn optimize_markup(text: &str) -> String {
    let joined = BETWEEN_TAGS.replace_all(text, "><");
    drop_blank_lines(&joined)
}

pub fn optimize_stylesheet(text: &str, profile: &OptimizationProfile) -> String {
    // Stylesheets only have block comments; `//` in `url(http://..)` is data.
    let text = strip_comments(text, true, profile.preserve_comments);
    let tightened: Vec<String> = text
        .lines()
        .map(|line| {
            rewrite_code(line.trim(), b"\"'", |code| {
                outside_block_comments(code, |rule| RULE_SPACING.apply(rule))
            })
        })
        .collect();
    let trimmed = rewrite_code(&tightened.join("\n"), b"\"'", |code| {
        outside_block_comments(code, |rule| {
            SEMICOLON_BEFORE_BRACE.replace_all(rule, "$1").into_owned()
        })
    });
    drop_blank_lines(&trimmed)
}

/// Applies `rewrite` to the parts of `code` outside `/* */` comments. An
/// unclosed comment runs to the end.
fn outside_block_comments(code: &str, rewrite: impl Fn(&str) -> String) -> String {
    let mut out = String::with_capacity(code.len());
    let mut rest = code;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rewrite(&rest[..start]));
        let end = rest[start + 2..]
            .find("*/")
            .map_or(rest.len(), |pos| start + 2 + pos + 2);
        out.push_str(&rest[start..end]);
        rest = &rest[end..];
    }
    out.push_str(&rewrite(rest));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::OptimizationLevel;

    fn profile(preserve_comments: bool) -> OptimizationProfile {
        OptimizationProfile {
            level: OptimizationLevel::Language,
            preserve_comments,
            preserve_docstrings: true,
        }
    }

    #[test]
    fn test_markup_removes_whitespace_between_tags() {
        let src = "<ul>\n  <li>One item</li>\n\n  <li>Two</li>\n</ul>";
        assert_eq!(
            optimize_markup(src),
            "<ul><li>One item</li><li>Two</li></ul>"
        );
    }

    #[test]
    fn test_markup_keeps_text_spacing() {
        let src = "<p>Hello   world</p>\ntext after\n\n<b>x</b>";
        assert_eq!(
            optimize_markup(src),
            "<p>Hello   world</p>\ntext after\n<b>x</b>"
        );
    }

    #[test]
    fn test_stylesheet_tightens_rules() {
        let src = "/* header */\nbody {\n    color : red ;\n    margin: 0 auto;\n}\n\na, b { top: 1px; }";
        assert_eq!(
            optimize_stylesheet(src, &profile(false)),
            "body{\ncolor:red;\nmargin:0 auto\n}\na,b{top:1px}"
        );
    }

    #[test]
    fn test_semicolon_rule_skips_strings_and_comments() {
        let src = "a::after { content: \";}\"; }";
        assert_eq!(
            optimize_stylesheet(src, &profile(false)),
            "a::after{content:\";}\"}"
        );

        let src = "/* a ;  } */\nb { top: 0; }";
        assert_eq!(
            optimize_stylesheet(src, &profile(true)),
            "/* a ;  } */\nb{top:0}"
        );
    }

    #[test]
    fn test_stylesheet_keeps_comments_and_strings() {
        let src = "/* keep */\na::after { content: \"x ; y\"; }";
        assert_eq!(
            optimize_stylesheet(src, &profile(true)),
            "/* keep */\na::after{content:\"x ; y\"}"
        );
    }
}
