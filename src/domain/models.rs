use std::collections::HashSet;
use std::path::PathBuf;

pub const UNKNOWN: &str = "Unknown";

pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "__pycache__",
    "venv",
    ".env",
    ".venv",
    "dist",
    "build",
];

pub const DEFAULT_EXCLUDED_FILES: &[&str] =
    &[".DS_Store", ".gitignore", "package-lock.json", "yarn.lock"];

pub const DEFAULT_EXCLUDED_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".ico", ".svg", ".woff", ".woff2", ".ttf", ".eot", ".pdf",
    ".zip", ".gz", ".tar", ".mp3", ".mp4", ".avi", ".mov", ".exe", ".bin", ".dat", ".db",
    ".sqlite", ".pyc",
];

pub const DEFAULT_MAX_FILE_SIZE: u64 = 1_000_000;

/// Lower-cases an extension and guarantees the leading dot, so `PY`, `.py`
/// and `py` all compare equal.
pub fn normalize_extension(ext: &str) -> String {
    let trimmed = ext.trim().to_lowercase();
    if trimmed.is_empty() || trimmed.starts_with('.') {
        trimmed
    } else {
        format!(".{}", trimmed)
    }
}

/// Exclusion criteria applied by the file selector.
#[derive(Debug, Clone)]
pub struct SelectionConfig {
    pub excluded_dirs: HashSet<String>,
    pub excluded_files: HashSet<String>,
    pub excluded_extensions: HashSet<String>,
    /// When non-empty this is the only positive filter; every other
    /// criterion still applies on top of it.
    pub included_extensions: HashSet<String>,
    pub max_file_size: u64,
    pub verbose_ignore: bool,
}

impl SelectionConfig {
    pub fn new<D, F, E, I>(
        excluded_dirs: D,
        excluded_files: F,
        excluded_extensions: E,
        included_extensions: I,
        max_file_size: u64,
    ) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
        E: IntoIterator,
        E::Item: AsRef<str>,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Self {
            excluded_dirs: excluded_dirs.into_iter().map(Into::into).collect(),
            excluded_files: excluded_files.into_iter().map(Into::into).collect(),
            excluded_extensions: excluded_extensions
                .into_iter()
                .map(|e| normalize_extension(e.as_ref()))
                .filter(|e| !e.is_empty())
                .collect(),
            included_extensions: included_extensions
                .into_iter()
                .map(|e| normalize_extension(e.as_ref()))
                .filter(|e| !e.is_empty())
                .collect(),
            max_file_size,
            verbose_ignore: false,
        }
    }

    pub fn with_verbose_ignore(mut self, verbose: bool) -> Self {
        self.verbose_ignore = verbose;
        self
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_EXCLUDED_DIRS.iter().copied(),
            DEFAULT_EXCLUDED_FILES.iter().copied(),
            DEFAULT_EXCLUDED_EXTENSIONS.iter().copied(),
            std::iter::empty::<&str>(),
            DEFAULT_MAX_FILE_SIZE,
        )
    }
}

/// A file admitted by the selector. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Path relative to the scanned root, always `/`-separated.
    pub relative_path: String,
    pub path: PathBuf,
    pub size: u64,
    pub language: &'static str,
}

/// Optimization severity. Each level's effects are a superset of the
/// previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OptimizationLevel {
    Whitespace = 1,
    Language = 2,
    Aggressive = 3,
}

impl OptimizationLevel {
    pub fn from_number(level: u8) -> Option<Self> {
        match level {
            0 => None,
            1 => Some(Self::Whitespace),
            2 => Some(Self::Language),
            _ => Some(Self::Aggressive),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimizationProfile {
    pub level: OptimizationLevel,
    pub preserve_comments: bool,
    pub preserve_docstrings: bool,
}

impl OptimizationProfile {
    pub fn new(level: OptimizationLevel) -> Self {
        Self {
            level,
            preserve_comments: false,
            preserve_docstrings: true,
        }
    }
}

impl Default for OptimizationProfile {
    fn default() -> Self {
        Self::new(OptimizationLevel::Whitespace)
    }
}

/// Textual framing of the emitted artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// File contents concatenated with no framing
    Simple,
    /// A `## File:` heading and fenced block per file
    Markdown,
    /// One JSON object per line
    Jsonl,
    /// A single `>>>` header line per file
    #[default]
    Compact,
}

/// Optional header describing where the tree came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoMetadata {
    pub url: String,
    pub branch: String,
    pub last_commit: String,
}

impl Default for RepoMetadata {
    fn default() -> Self {
        Self {
            url: UNKNOWN.to_string(),
            branch: UNKNOWN.to_string(),
            last_commit: UNKNOWN.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Remote(String),
    Local(PathBuf),
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub source: SourceLocation,
    pub output_path: Option<PathBuf>,
    pub selection: SelectionConfig,
    pub ignore_patterns: Vec<String>,
    pub ignore_file: Option<PathBuf>,
    /// `None` disables optimization entirely.
    pub optimization: Option<OptimizationProfile>,
    pub format: OutputFormat,
    pub include_repo_info: bool,
    /// Chunk bound in bytes; 0 means a single unbounded chunk.
    pub chunk_size: usize,
    pub show_progress: bool,
}
