//! Record framing for each output shape. The exact bytes produced here are
//! what downstream consumers parse, so every shape is covered by a
//! byte-for-byte test below.

use crate::domain::models::{FileRecord, OutputFormat, RepoMetadata};
use serde::Serialize;
use serde_json::ser::Formatter;
use std::io;

#[derive(Serialize)]
struct RepositoryInfoLine<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    url: &'a str,
    branch: &'a str,
    last_commit: &'a str,
}

#[derive(Serialize)]
struct FileLine<'a> {
    path: &'a str,
    language: &'a str,
    content: &'a str,
}

/// JSON with `", "` / `": "` separators and ASCII-only output: anything
/// outside printable ASCII becomes a lower-case `\uXXXX` escape, using
/// surrogate pairs above the BMP.
struct PythonStyleFormatter;

impl Formatter for PythonStyleFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut units = [0u16; 2];
        for c in fragment.chars() {
            if (' '..='~').contains(&c) {
                writer.write_all(&[c as u8])?;
            } else {
                for unit in c.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

fn json_line<T: Serialize>(value: &T) -> anyhow::Result<String> {
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, PythonStyleFormatter);
    value.serialize(&mut serializer)?;
    buf.push(b'\n');
    Ok(String::from_utf8(buf)?)
}

pub fn format_header(meta: &RepoMetadata, format: OutputFormat) -> anyhow::Result<String> {
    let header = match format {
        OutputFormat::Simple => format!(
            "Repository: {}\nBranch: {}\nLast Commit: {}\n\n",
            meta.url, meta.branch, meta.last_commit
        ),
        OutputFormat::Markdown => format!(
            "# Repository Information\n\n- **URL:** {}\n- **Branch:** {}\n- **Last Commit:** {}\n\n---\n\n",
            meta.url, meta.branch, meta.last_commit
        ),
        OutputFormat::Jsonl => json_line(&RepositoryInfoLine {
            kind: "repository_info",
            url: &meta.url,
            branch: &meta.branch,
            last_commit: &meta.last_commit,
        })?,
        OutputFormat::Compact => format!(
            "@repo {} branch={} commit={}\n\n",
            meta.url, meta.branch, meta.last_commit
        ),
    };
    Ok(header)
}

pub fn format_record(
    file: &FileRecord,
    content: &str,
    format: OutputFormat,
) -> anyhow::Result<String> {
    let record = match format {
        OutputFormat::Simple => format!("{}\n\n", content),
        OutputFormat::Markdown => format!(
            "## File: {}\n\n```{}\n{}\n```\n\n",
            file.relative_path, file.language, content
        ),
        OutputFormat::Jsonl => json_line(&FileLine {
            path: &file.relative_path,
            language: file.language,
            content,
        })?,
        OutputFormat::Compact => format!(
            ">>> {} [{}]\n{}\n",
            file.relative_path, file.language, content
        ),
    };
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn record() -> FileRecord {
        FileRecord {
            relative_path: "src/app.py".to_string(),
            path: PathBuf::from("/tmp/repo/src/app.py"),
            size: 12,
            language: "python",
        }
    }

    fn meta() -> RepoMetadata {
        RepoMetadata {
            url: "https://example.com/r.git".to_string(),
            branch: "main".to_string(),
            last_commit: "abc123 - Dev, 2 days ago : fix".to_string(),
        }
    }

    #[test]
    fn test_simple_shape() {
        assert_eq!(
            format_header(&meta(), OutputFormat::Simple).unwrap(),
            "Repository: https://example.com/r.git\nBranch: main\nLast Commit: abc123 - Dev, 2 days ago : fix\n\n"
        );
        assert_eq!(
            format_record(&record(), "x=1", OutputFormat::Simple).unwrap(),
            "x=1\n\n"
        );
    }

    #[test]
    fn test_markdown_shape() {
        assert_eq!(
            format_header(&RepoMetadata::default(), OutputFormat::Markdown).unwrap(),
            "# Repository Information\n\n- **URL:** Unknown\n- **Branch:** Unknown\n- **Last Commit:** Unknown\n\n---\n\n"
        );
        assert_eq!(
            format_record(&record(), "x=1", OutputFormat::Markdown).unwrap(),
            "## File: src/app.py\n\n```python\nx=1\n```\n\n"
        );
    }

    #[test]
    fn test_compact_shape() {
        assert_eq!(
            format_header(&meta(), OutputFormat::Compact).unwrap(),
            "@repo https://example.com/r.git branch=main commit=abc123 - Dev, 2 days ago : fix\n\n"
        );
        assert_eq!(
            format_record(&record(), "x=1", OutputFormat::Compact).unwrap(),
            ">>> src/app.py [python]\nx=1\n"
        );
    }

    #[test]
    fn test_jsonl_shape() {
        assert_eq!(
            format_header(&RepoMetadata::default(), OutputFormat::Jsonl).unwrap(),
            "{\"type\": \"repository_info\", \"url\": \"Unknown\", \"branch\": \"Unknown\", \"last_commit\": \"Unknown\"}\n"
        );
        assert_eq!(
            format_record(&record(), "a = \"b\"\n\tc", OutputFormat::Jsonl).unwrap(),
            "{\"path\": \"src/app.py\", \"language\": \"python\", \"content\": \"a = \\\"b\\\"\\n\\tc\"}\n"
        );
    }

    #[test]
    fn test_jsonl_escapes_non_ascii() {
        let line = format_record(&record(), "é\u{7f}😀", OutputFormat::Jsonl).unwrap();
        assert!(line.is_ascii());
        assert!(line.contains(r#""content": "\u00e9\u007f\ud83d\ude00""#));
    }
}
