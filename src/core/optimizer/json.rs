//! Structured data (`.json`).

use log::debug;
use serde::de::IgnoredAny;

/// Minifies valid JSON; `None` when the text does not parse.
///
/// Whitespace outside string tokens is dropped and every token is kept as
/// written, so escapes and number spellings survive and minifying twice is
/// a no-op.
pub fn minify_json(text: &str) -> Option<String> {
    if let Err(e) = serde_json::from_str::<IgnoredAny>(text) {
        debug!("Not valid JSON, using generic transform: {}", e);
        return None;
    }

    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    for c in text.chars() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if !c.is_ascii_whitespace() {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minify_keeps_string_contents() {
        let src = "{\n  \"name\" : \"a  b\",\n  \"list\": [1, 2.50, 1e5],\n  \"esc\": \"q\\\" \\u00e9\"\n}";
        assert_eq!(
            minify_json(src).unwrap(),
            "{\"name\":\"a  b\",\"list\":[1,2.50,1e5],\"esc\":\"q\\\" \\u00e9\"}"
        );
    }

    #[test]
    fn test_minify_is_idempotent() {
        let once = minify_json("{ \"b\": 1, \"a\": [ true, null ] }").unwrap();
        assert_eq!(once, "{\"b\":1,\"a\":[true,null]}");
        assert_eq!(minify_json(&once).unwrap(), once);
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        assert_eq!(minify_json("{\"a\": }"), None);
        assert_eq!(minify_json(""), None);
        assert_eq!(minify_json("{} trailing"), None);
    }
}
