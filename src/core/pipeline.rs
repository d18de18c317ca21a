use crate::core::chunker::ChunkAssembler;
use crate::core::context_generator::{format_header, format_record};
use crate::core::file_selector::FileSelector;
use crate::core::language::extension_of;
use crate::core::optimizer::optimize;
use crate::core::patterns::IgnoreRuleSet;
use crate::domain::errors::PackError;
use crate::domain::models::{FileRecord, OptimizationProfile, OutputFormat, RepoMetadata, RunConfig};
use crate::infra::file_system::load_ignore_patterns;
use anyhow::Context;
use log::{debug, info, warn};
use rayon::prelude::*;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Merges inline patterns with those loaded from the ignore file.
pub fn build_ignore_rules(config: &RunConfig) -> anyhow::Result<IgnoreRuleSet> {
    let mut patterns = config.ignore_patterns.clone();
    if let Some(path) = &config.ignore_file {
        patterns.extend(load_ignore_patterns(path));
    }
    if config.selection.verbose_ignore {
        info!("Using {} ignore patterns: {:?}", patterns.len(), patterns);
        info!("Excluding directories: {:?}", config.selection.excluded_dirs);
        info!("Excluding files: {:?}", config.selection.excluded_files);
    }
    if patterns.is_empty() {
        return Ok(IgnoreRuleSet::empty());
    }
    let rules = IgnoreRuleSet::new(patterns).context("Invalid ignore pattern")?;
    debug!("Built {} ignore rules", rules.len());
    Ok(rules)
}

/// Reads, optimizes and frames every file. Files are processed in parallel
/// but records come back in selection order.
pub fn render_records<R>(
    files: &[FileRecord],
    format: OutputFormat,
    optimization: Option<&OptimizationProfile>,
    read_content: R,
) -> anyhow::Result<Vec<String>>
where
    R: Fn(&Path) -> anyhow::Result<String> + Sync,
{
    let processed = AtomicUsize::new(0);
    let total = files.len();

    files
        .par_iter()
        .map(|file| {
            let n = processed.fetch_add(1, Ordering::Relaxed) + 1;
            debug!("Processing {}/{}: {}", n, total, file.relative_path);

            let content = match read_content(&file.path) {
                Ok(text) => match optimization {
                    Some(profile) => optimize(&text, &extension_of(&file.path), profile),
                    None => text,
                },
                Err(e) => {
                    warn!("Error reading {}: {}", file.relative_path, e);
                    format!("[Error reading file: {}]", e)
                }
            };
            format_record(file, &content, format)
        })
        .collect()
}

/// Feeds the optional header and the records, in order, to a single
/// assembler.
pub fn assemble_chunks(header: Option<&str>, records: &[String], chunk_size: usize) -> Vec<String> {
    let mut assembler = ChunkAssembler::new(chunk_size);
    if let Some(header) = header {
        assembler.push_header(header);
    }
    for record in records {
        assembler.push(record);
    }
    assembler.finish()
}

/// Selection, rendering and chunking for one local tree.
pub fn pack_directory<R>(
    root: &Path,
    config: &RunConfig,
    metadata: Option<&RepoMetadata>,
    read_content: R,
) -> anyhow::Result<Vec<String>>
where
    R: Fn(&Path) -> anyhow::Result<String> + Sync,
{
    if !root.is_dir() {
        return Err(PackError::MissingSource {
            path: root.to_path_buf(),
        }
        .into());
    }

    let rules = build_ignore_rules(config)?;
    let report = FileSelector::new(root, &config.selection, &rules).select(config.show_progress);

    let records = render_records(
        &report.files,
        config.format,
        config.optimization.as_ref(),
        read_content,
    )?;
    let header = metadata
        .map(|meta| format_header(meta, config.format))
        .transpose()?;

    let chunks = assemble_chunks(header.as_deref(), &records, config.chunk_size);
    info!(
        "Packed {} files into {} chunk(s)",
        report.files.len(),
        chunks.len()
    );
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{OptimizationLevel, SelectionConfig, SourceLocation};
    use crate::infra::file_system::read_file_contents;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const SAMPLE_PY: &str = "\"\"\"Module docstring.\n\n    Indented   text stays.\n\"\"\"\n\n\nimport os\ndef main():\n    return os.getcwd()\nprint(main())\n";

    fn run_config(root: &Path) -> RunConfig {
        RunConfig {
            source: SourceLocation::Local(root.to_path_buf()),
            output_path: None,
            selection: SelectionConfig::default(),
            ignore_patterns: Vec::new(),
            ignore_file: None,
            optimization: Some(OptimizationProfile::new(OptimizationLevel::Whitespace)),
            format: OutputFormat::Compact,
            include_repo_info: false,
            chunk_size: 0,
            show_progress: false,
        }
    }

    fn sample_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.py"), SAMPLE_PY).unwrap();
        fs::create_dir(dir.path().join("node_modules")).unwrap();
        fs::write(dir.path().join("node_modules/x.js"), "module.exports = 1;\n").unwrap();
        dir
    }

    fn file(rel: &str, language: &'static str) -> FileRecord {
        FileRecord {
            relative_path: rel.to_string(),
            path: PathBuf::from(rel),
            size: 0,
            language,
        }
    }

    #[test]
    fn test_default_run_packs_python_and_skips_node_modules() {
        let dir = sample_tree();
        let config = run_config(dir.path());

        let chunks = pack_directory(dir.path(), &config, None, read_file_contents).unwrap();

        assert_eq!(
            chunks,
            vec![
                ">>> a.py [python]\n\"\"\"Module docstring.\n\n    Indented   text stays.\n\"\"\"\n\nimport os\ndef main():\n    return os.getcwd()\nprint(main())\n"
                    .to_string()
            ]
        );
    }

    #[test]
    fn test_header_precedes_records() {
        let dir = sample_tree();
        let mut config = run_config(dir.path());
        config.format = OutputFormat::Markdown;
        config.optimization = None;

        let meta = RepoMetadata::default();
        let chunks = pack_directory(dir.path(), &config, Some(&meta), |_| Ok("body".to_string()))
            .unwrap();

        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].starts_with("# Repository Information\n\n"));
        assert!(chunks[0].ends_with("---\n\n## File: a.py\n\n```python\nbody\n```\n\n"));
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let config = run_config(&missing);
        let err = pack_directory(&missing, &config, None, read_file_contents).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PackError>(),
            Some(PackError::MissingSource { .. })
        ));
    }

    #[test]
    fn test_render_keeps_selection_order() {
        let files: Vec<FileRecord> = (0..64).map(|i| file(&format!("f{:02}.txt", i), "text")).collect();
        let records = render_records(&files, OutputFormat::Simple, None, |path: &Path| {
            Ok(path.display().to_string())
        })
        .unwrap();

        let expected: Vec<String> = (0..64).map(|i| format!("f{:02}.txt\n\n", i)).collect();
        assert_eq!(records, expected);
    }

    #[test]
    fn test_read_failure_becomes_placeholder() {
        let files = vec![file("ok.rs", "rust"), file("bad.rs", "rust")];
        let records = render_records(&files, OutputFormat::Compact, None, |path: &Path| {
            if path.ends_with("bad.rs") {
                anyhow::bail!("permission denied")
            }
            Ok("fn main() {}".to_string())
        })
        .unwrap();

        assert_eq!(records[0], ">>> ok.rs [rust]\nfn main() {}\n");
        assert_eq!(
            records[1],
            ">>> bad.rs [rust]\n[Error reading file: permission denied]\n"
        );
    }

    #[test]
    fn test_optimization_uses_file_extension() {
        let files = vec![file("data.json", "json")];
        let profile = OptimizationProfile::new(OptimizationLevel::Language);
        let records = render_records(&files, OutputFormat::Simple, Some(&profile), |_| {
            Ok("{\n  \"a\": [1, 2]\n}\n".to_string())
        })
        .unwrap();
        assert_eq!(records, vec!["{\"a\":[1,2]}\n\n".to_string()]);
    }

    #[test]
    fn test_chunked_output_concatenates_to_unchunked() {
        let records: Vec<String> = (0..10).map(|i| format!("record {}\n", i)).collect();
        let whole = assemble_chunks(Some("HEAD\n"), &records, 0);
        let split = assemble_chunks(Some("HEAD\n"), &records, 20);
        assert_eq!(whole.len(), 1);
        assert!(split.len() > 1);
        assert_eq!(split.concat(), whole.concat());
    }

    #[test]
    fn test_ignore_patterns_and_file_are_merged() {
        let dir = TempDir::new().unwrap();
        let ignore = dir.path().join(".ignore");
        fs::write(&ignore, "# comment\n\n*.log\n").unwrap();

        let mut config = run_config(dir.path());
        config.ignore_patterns = vec!["tmp/*".to_string()];
        config.ignore_file = Some(ignore);

        let rules = build_ignore_rules(&config).unwrap();
        assert_eq!(rules.patterns(), ["tmp/*".to_string(), "*.log".to_string()]);
        assert!(rules.is_match("debug.log"));
        assert!(rules.is_match("tmp/x"));
    }

    #[test]
    fn test_missing_ignore_file_contributes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut config = run_config(dir.path());
        config.ignore_file = Some(dir.path().join("absent"));
        assert!(build_ignore_rules(&config).unwrap().is_empty());
    }
}
