use crate::core::language::extension_of;
use crate::domain::errors::PackError;
use log::{debug, info, warn};
use std::fs;
use std::io::{BufRead, Read};
use std::path::Path;

/// Bytes inspected when sniffing for binary content.
pub const SNIFF_LEN: usize = 8192;

pub const EXAMPLE_IGNORE: &str = "# Example ignore file for repo-to-text
# Add patterns to ignore directories or files, one per line
# Use glob-style patterns (* matches any characters, ** for recursive matching)

# Common patterns to ignore
**/temp/**
**/logs/**
**/backup/**
**/cache/**
**/.vscode/**
**/.idea/**
**/test/fixtures/**
**/test/data/**
**/docs/examples/**
**/tools/scripts/**

# Example of ignoring specific files by pattern
**/settings.dev.json
**/*-backup.*
**/*.min.js
**/*.min.css
**/*.log
";

const MEDIA_TYPES: &[(&str, &str)] = &[
    (".txt", "text/plain"),
    (".md", "text/markdown"),
    (".py", "text/x-python"),
    (".c", "text/x-c"),
    (".h", "text/x-c"),
    (".java", "text/x-java"),
    (".html", "text/html"),
    (".htm", "text/html"),
    (".css", "text/css"),
    (".csv", "text/csv"),
    (".tsv", "text/tab-separated-values"),
    (".sh", "text/x-sh"),
    (".js", "application/javascript"),
    (".mjs", "application/javascript"),
    (".json", "application/json"),
    (".xml", "application/xml"),
    (".png", "image/png"),
    (".jpg", "image/jpeg"),
    (".jpeg", "image/jpeg"),
    (".gif", "image/gif"),
    (".ico", "image/vnd.microsoft.icon"),
    (".svg", "image/svg+xml"),
    (".pdf", "application/pdf"),
    (".zip", "application/zip"),
    (".gz", "application/gzip"),
    (".tar", "application/x-tar"),
    (".mp3", "audio/mpeg"),
    (".mp4", "video/mp4"),
    (".wasm", "application/wasm"),
    (".exe", "application/octet-stream"),
    (".bin", "application/octet-stream"),
];

const TEXT_LIKE_PREFIXES: &[&str] = &[
    "text/",
    "application/json",
    "application/xml",
    "application/javascript",
];

pub fn guess_media_type(path: &Path) -> Option<&'static str> {
    let ext = extension_of(path);
    MEDIA_TYPES
        .iter()
        .find(|(candidate, _)| *candidate == ext)
        .map(|(_, media)| *media)
}

fn is_text_media_type(media: &str) -> bool {
    TEXT_LIKE_PREFIXES.iter().any(|p| media.starts_with(p))
}

/// A file is binary when its media type is not text-like and its head does
/// not decode as UTF-8. Unreadable files count as binary.
pub fn is_binary_file(path: &Path) -> bool {
    if guess_media_type(path).is_some_and(is_text_media_type) {
        return false;
    }

    match read_head(path, SNIFF_LEN) {
        Ok(head) => !is_valid_text(&head),
        Err(e) => {
            debug!("Could not sniff {}: {}", path.display(), e);
            true
        }
    }
}

/// UTF-8 validity check that tolerates a code point cut off by the sniff
/// window.
fn is_valid_text(head: &[u8]) -> bool {
    match std::str::from_utf8(head) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none() && head.len() >= SNIFF_LEN,
    }
}

fn read_head(path: &Path, limit: usize) -> std::io::Result<Vec<u8>> {
    let file = fs::File::open(path)?;
    let mut head = Vec::with_capacity(limit);
    file.take(limit as u64).read_to_end(&mut head)?;
    Ok(head)
}

/// Reads a file, replacing invalid UTF-8 sequences.
pub fn read_file_contents(path: &Path) -> anyhow::Result<String> {
    debug!("Reading file contents: {}", path.display());
    let bytes = fs::read(path)?;
    debug!("Read {} bytes from file", bytes.len());
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Loads glob patterns, one per line, skipping blanks and `#` comments. A
/// missing or unreadable file yields no patterns.
pub fn load_ignore_patterns(path: &Path) -> Vec<String> {
    match parse_ignore_file(path) {
        Ok(patterns) => {
            info!(
                "Loaded {} ignore patterns from {}",
                patterns.len(),
                path.display()
            );
            patterns
        }
        Err(e) => {
            warn!("Could not load ignore file {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

fn parse_ignore_file(path: &Path) -> std::io::Result<Vec<String>> {
    let file = fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    let mut patterns = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() && !trimmed.starts_with('#') {
            patterns.push(trimmed.to_string());
        }
    }

    Ok(patterns)
}

pub fn create_example_ignore_file(path: &Path) -> Result<(), PackError> {
    fs::write(path, EXAMPLE_IGNORE).map_err(|source| PackError::ExampleIgnore {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Created example ignore file at {}", path.display());
    Ok(())
}
