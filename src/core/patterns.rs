//! Flat-string glob matching for ignore rules.
//!
//! Patterns are matched against the whole relative path as one string. `*`
//! crosses `/` boundaries and `**` is simply two greedy wildcards, so
//! `**/logs/**` needs a literal `/logs/` somewhere in the path. This keeps
//! existing ignore files behaving the way they always have; do not swap in a
//! segment-aware matcher.

use log::debug;
use regex::RegexSet;

#[derive(Debug, Clone)]
pub struct IgnoreRuleSet {
    patterns: Vec<String>,
    matcher: RegexSet,
}

impl IgnoreRuleSet {
    pub fn new<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns
            .into_iter()
            .map(Into::into)
            .filter(|p| !p.trim().is_empty())
            .collect();
        let matcher = RegexSet::new(patterns.iter().map(|p| glob_to_regex(p)))?;
        debug!("Compiled {} ignore patterns", patterns.len());
        Ok(Self { patterns, matcher })
    }

    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
            matcher: RegexSet::empty(),
        }
    }

    /// True if the path matches at least one pattern.
    pub fn is_match(&self, path: &str) -> bool {
        self.matcher.is_match(path)
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Translates a shell glob into an anchored regular expression.
///
/// `*` → any run, `?` → any single char, `[...]`/`[!...]` → character
/// class. An unterminated `[` is a literal bracket.
pub fn glob_to_regex(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2 + 8);
    out.push_str("(?s)^");

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        i += 1;
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    out.push_str(&translate_class(&chars[i..end]));
                    i = end + 1;
                }
                None => out.push_str(r"\["),
            },
            other => out.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }

    out.push('$');
    out
}

/// Index of the `]` closing a class whose body starts at `start`.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start;
    if j < chars.len() && chars[j] == '!' {
        j += 1;
    }
    // A `]` right after the opening bracket is a literal member.
    if j < chars.len() && chars[j] == ']' {
        j += 1;
    }
    while j < chars.len() && chars[j] != ']' {
        j += 1;
    }
    (j < chars.len()).then_some(j)
}

fn translate_class(body: &[char]) -> String {
    let (negated, body) = match body.first() {
        Some('!') => (true, &body[1..]),
        _ => (false, body),
    };

    let mut class = String::from("[");
    if negated {
        class.push('^');
    }

    let escape = |c: char| regex::escape(c.encode_utf8(&mut [0; 4]));
    let mut k = 0;
    while k < body.len() {
        let lo = body[k];
        if k + 2 < body.len() && body[k + 1] == '-' {
            let hi = body[k + 2];
            if lo <= hi {
                class.push_str(&escape(lo));
                class.push('-');
                class.push_str(&escape(hi));
            }
            k += 3;
        } else {
            class.push_str(&escape(lo));
            k += 1;
        }
    }

    // An empty positive class can never match; an empty negated one matches
    // any character.
    if class == "[" {
        return "[^\\s\\S]".to_string();
    }
    if class == "[^" {
        return "[\\s\\S]".to_string();
    }
    class.push(']');
    class
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(patterns: &[&str]) -> IgnoreRuleSet {
        IgnoreRuleSet::new(patterns.iter().copied()).unwrap()
    }

    #[test]
    fn test_double_star_is_flat_string_wildcard() {
        let set = rules(&["**/logs/**"]);
        assert!(set.is_match("src/logs/debug.txt"));
        assert!(!set.is_match("src/logging/debug.txt"));
        // No leading slash, so the pattern's literal `/logs/` is absent.
        assert!(!set.is_match("logs/debug.txt"));
    }

    #[test]
    fn test_single_star_crosses_separators() {
        let set = rules(&["*.log"]);
        assert!(set.is_match("server.log"));
        assert!(set.is_match("var/tmp/server.log"));
        assert!(!set.is_match("server.log.txt"));
    }

    #[test]
    fn test_question_mark_and_classes() {
        let set = rules(&["data?.csv", "build[0-9]/*", "tmp[!abc].txt"]);
        assert!(set.is_match("data1.csv"));
        assert!(!set.is_match("data12.csv"));
        assert!(set.is_match("build3/out.o"));
        assert!(!set.is_match("buildx/out.o"));
        assert!(set.is_match("tmpz.txt"));
        assert!(!set.is_match("tmpa.txt"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let set = rules(&["a+b(c).txt", "[x"]);
        assert!(set.is_match("a+b(c).txt"));
        assert!(!set.is_match("aab(c).txt"));
        assert!(set.is_match("[x"));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let set = rules(&["*.MD"]);
        assert!(set.is_match("README.MD"));
        assert!(!set.is_match("README.md"));
    }

    #[test]
    fn test_empty_set_matches_nothing() {
        let set = IgnoreRuleSet::empty();
        assert!(set.is_empty());
        assert!(!set.is_match("anything"));

        let blanks = rules(&["", "  "]);
        assert_eq!(blanks.len(), 0);
        assert!(!blanks.is_match(""));
    }

    #[test]
    fn test_adding_a_pattern_only_grows_matches() {
        let paths = ["src/a.py", "src/logs/x.txt", "docs/b.md", "tmp/c.log"];
        let narrow = rules(&["*.log"]);
        let wide = rules(&["*.log", "docs/*"]);
        for path in paths {
            if narrow.is_match(path) {
                assert!(wide.is_match(path), "{} lost its match", path);
            }
        }
    }
}
