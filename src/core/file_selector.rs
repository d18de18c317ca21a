use crate::core::language::{extension_of, language_for_extension};
use crate::core::patterns::IgnoreRuleSet;
use crate::domain::models::{FileRecord, SelectionConfig};
use crate::infra::file_system::is_binary_file;
use crate::infra::progress::ScanProgress;
use log::{debug, info, warn};
use std::cell::Cell;
use std::fmt;
use std::fs;
use std::path::{Component, Path};
use walkdir::{DirEntry, WalkDir};

/// Why a file was left out of the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MatchedPattern,
    ExcludedDir,
    ExcludedFile,
    TooLarge(u64),
    NotIncludedExtension,
    ExcludedExtension,
    Binary,
    Unreadable,
    LinkNotToFile,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MatchedPattern => f.write_str("matched pattern"),
            SkipReason::ExcludedDir => f.write_str("excluded dir"),
            SkipReason::ExcludedFile => f.write_str("excluded file"),
            SkipReason::TooLarge(max) => write!(f, "size > {}", max),
            SkipReason::NotIncludedExtension => f.write_str("not in included extensions"),
            SkipReason::ExcludedExtension => f.write_str("in excluded extensions"),
            SkipReason::Binary => f.write_str("binary"),
            SkipReason::Unreadable => f.write_str("unreadable"),
            SkipReason::LinkNotToFile => f.write_str("symlink target is not a file"),
        }
    }
}

#[derive(Debug, Default)]
pub struct SelectionReport {
    pub files: Vec<FileRecord>,
    pub ignored_dirs: usize,
    pub ignored_files: usize,
}

pub struct FileSelector<'a> {
    root: &'a Path,
    config: &'a SelectionConfig,
    rules: &'a IgnoreRuleSet,
}

impl<'a> FileSelector<'a> {
    pub fn new(root: &'a Path, config: &'a SelectionConfig, rules: &'a IgnoreRuleSet) -> Self {
        Self {
            root,
            config,
            rules,
        }
    }

    /// Walks the tree in file-name order and returns every admitted file.
    /// Excluded directories are pruned and never read.
    pub fn select(&self, show_progress: bool) -> SelectionReport {
        info!("Listing files in: {}", self.root.display());
        debug!("Excluded dirs: {:?}", self.config.excluded_dirs);
        debug!("Ignore patterns: {:?}", self.rules.patterns());

        let ignored_dirs = Cell::new(0usize);
        let mut report = SelectionReport::default();
        let mut progress = ScanProgress::new(show_progress);

        let walker = WalkDir::new(self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                if e.depth() == 0 || !e.file_type().is_dir() {
                    return true;
                }
                match self.prune_reason(e) {
                    Some(reason) => {
                        ignored_dirs.set(ignored_dirs.get() + 1);
                        if self.config.verbose_ignore {
                            info!(
                                "Ignoring directory ({}): {}",
                                reason,
                                relative_posix(self.root, e.path())
                            );
                        }
                        false
                    }
                    None => true,
                }
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            // Links are not followed into directories, but a link to a
            // regular file is read like the file itself.
            if !entry.file_type().is_file() && !entry.path_is_symlink() {
                continue;
            }

            let rel = relative_posix(self.root, entry.path());
            match self.admit(&rel, &entry) {
                Ok(record) => {
                    debug!("Admitted file: {}", rel);
                    progress.update(true);
                    report.files.push(record);
                }
                Err(reason) => {
                    progress.update(false);
                    report.ignored_files += 1;
                    if self.config.verbose_ignore {
                        info!("Ignoring file ({}): {}", reason, rel);
                    }
                }
            }
        }

        progress.finish();
        debug!(
            "Scanned {} files, admitted {}",
            progress.scanned(),
            progress.admitted()
        );
        report.ignored_dirs = ignored_dirs.get();
        if self.config.verbose_ignore {
            info!(
                "Ignored {} directories and {} files",
                report.ignored_dirs, report.ignored_files
            );
        }
        info!("Found {} files to process", report.files.len());
        report
    }

    fn prune_reason(&self, dir: &DirEntry) -> Option<&'static str> {
        let name = dir.file_name().to_string_lossy();
        if self.config.excluded_dirs.contains(name.as_ref()) {
            return Some("in exclude list");
        }
        if self.rules.is_match(&relative_posix(self.root, dir.path())) {
            return Some("matched pattern");
        }
        None
    }

    /// Applies every admission criterion, cheapest first. The binary sniff
    /// reads file content, so it runs last.
    fn admit(&self, rel: &str, entry: &DirEntry) -> Result<FileRecord, SkipReason> {
        if entry.path_is_symlink() && !entry.path().is_file() {
            return Err(SkipReason::LinkNotToFile);
        }
        if self.rules.is_match(rel) {
            return Err(SkipReason::MatchedPattern);
        }

        // Ancestor check on top of pruning: a file is out if any directory
        // above it carries an excluded name.
        let mut segments: Vec<&str> = rel.split('/').collect();
        let file_name = segments.pop().unwrap_or_default();
        if segments
            .iter()
            .any(|segment| self.config.excluded_dirs.contains(*segment))
        {
            return Err(SkipReason::ExcludedDir);
        }

        if self.config.excluded_files.contains(file_name) {
            return Err(SkipReason::ExcludedFile);
        }

        let metadata = if entry.path_is_symlink() {
            fs::metadata(entry.path()).ok()
        } else {
            entry.metadata().ok()
        };
        let size = metadata.ok_or(SkipReason::Unreadable)?.len();
        if size > self.config.max_file_size {
            return Err(SkipReason::TooLarge(self.config.max_file_size));
        }

        let ext = extension_of(entry.path());
        if !self.config.included_extensions.is_empty()
            && !self.config.included_extensions.contains(&ext)
        {
            return Err(SkipReason::NotIncludedExtension);
        }
        if self.config.excluded_extensions.contains(&ext) {
            return Err(SkipReason::ExcludedExtension);
        }

        if is_binary_file(entry.path()) {
            return Err(SkipReason::Binary);
        }

        Ok(FileRecord {
            relative_path: rel.to_string(),
            path: entry.path().to_path_buf(),
            size,
            language: language_for_extension(&ext),
        })
    }
}

/// `path` relative to `root`, joined with `/` on every platform.
pub fn relative_posix(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
