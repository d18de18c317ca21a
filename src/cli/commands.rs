use crate::core::pipeline::pack_directory;
use crate::domain::models::{
    DEFAULT_EXCLUDED_DIRS, DEFAULT_EXCLUDED_EXTENSIONS, DEFAULT_EXCLUDED_FILES,
    DEFAULT_MAX_FILE_SIZE, OptimizationLevel, OptimizationProfile, OutputFormat, RunConfig,
    SelectionConfig, SourceLocation,
};
use crate::infra::file_system::{create_example_ignore_file, read_file_contents};
use crate::infra::git::{clone_repository, read_repo_metadata};
use crate::infra::logger::setup_logger;
use crate::infra::output::create_writer;
use clap::{Args, Parser, Subcommand};
use log::{debug, info, warn};
use std::io::IsTerminal;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "repo-to-text")]
#[command(about = "Pack a source tree into compact text for LLM context", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Select, optimize and write the files of a repository
    Generate(GenerateArgs),

    /// Write an example ignore file and exit
    InitIgnore {
        path: PathBuf,
    },
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Remote repository URL to shallow-clone
    #[arg(long, required_unless_present = "local", conflicts_with = "local")]
    pub repo: Option<String>,

    /// Local directory to pack
    #[arg(long)]
    pub local: Option<PathBuf>,

    /// Output path; stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[arg(long, num_args = 1.., value_delimiter = ',', default_values_t = owned(DEFAULT_EXCLUDED_DIRS))]
    pub exclude_dirs: Vec<String>,

    #[arg(long, num_args = 1.., value_delimiter = ',', default_values_t = owned(DEFAULT_EXCLUDED_FILES))]
    pub exclude_files: Vec<String>,

    /// Maximum file size in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_FILE_SIZE)]
    pub max_file_size: u64,

    /// Only admit these extensions
    #[arg(long, num_args = 1.., value_delimiter = ',')]
    pub include_extensions: Vec<String>,

    #[arg(long, num_args = 1.., value_delimiter = ',', default_values_t = owned(DEFAULT_EXCLUDED_EXTENSIONS))]
    pub exclude_extensions: Vec<String>,

    /// Glob patterns matched against relative paths
    #[arg(long, num_args = 1.., value_delimiter = ',')]
    pub ignore_patterns: Vec<String>,

    /// File with one ignore glob per line
    #[arg(long)]
    pub ignore_file: Option<PathBuf>,

    /// Log every skipped file and directory with its reason
    #[arg(long)]
    pub verbose_ignore: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Compact)]
    pub format: OutputFormat,

    /// Prefix the output with git origin, branch and last commit
    #[arg(long)]
    pub include_repo_info: bool,

    /// Chunk bound in bytes; 0 writes a single output
    #[arg(long, default_value_t = 0)]
    pub chunk_size: usize,

    /// 0 disables optimization, 1-3 increase its severity
    #[arg(long, default_value_t = 1)]
    pub optimization_level: u8,

    #[arg(long)]
    pub preserve_comments: bool,

    #[arg(long)]
    pub strip_docstrings: bool,
}

impl GenerateArgs {
    pub fn to_run_config(&self) -> RunConfig {
        let source = match (&self.repo, &self.local) {
            (Some(url), _) => SourceLocation::Remote(url.clone()),
            (None, Some(path)) => SourceLocation::Local(path.clone()),
            (None, None) => SourceLocation::Local(PathBuf::from(".")),
        };

        let selection = SelectionConfig::new(
            self.exclude_dirs.iter().cloned(),
            self.exclude_files.iter().cloned(),
            &self.exclude_extensions,
            &self.include_extensions,
            self.max_file_size,
        )
        .with_verbose_ignore(self.verbose_ignore);

        let optimization =
            OptimizationLevel::from_number(self.optimization_level).map(|level| {
                OptimizationProfile {
                    level,
                    preserve_comments: self.preserve_comments,
                    preserve_docstrings: !self.strip_docstrings,
                }
            });

        RunConfig {
            source,
            output_path: self.output.clone(),
            selection,
            ignore_patterns: self.ignore_patterns.clone(),
            ignore_file: self.ignore_file.clone(),
            optimization,
            format: self.format,
            include_repo_info: self.include_repo_info,
            chunk_size: self.chunk_size,
            show_progress: std::io::stderr().is_terminal(),
        }
    }
}

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::InitIgnore { path } => {
            setup_logger(cli.verbose, false)?;
            create_example_ignore_file(&path)?;
            eprintln!("Example ignore file created at {}", path.display());
        }
        Commands::Generate(args) => {
            setup_logger(cli.verbose, args.verbose_ignore)?;
            info!("Starting generate command");
            debug!("Command parameters: {:?}", args);

            let config = args.to_run_config();
            generate(&config)?;
        }
    }
    Ok(())
}

fn generate(config: &RunConfig) -> anyhow::Result<()> {
    // The clone guard removes the checkout on every exit path.
    let (root, clone) = match &config.source {
        SourceLocation::Remote(url) => {
            let dir = clone_repository(url)?;
            (dir.path().to_path_buf(), Some(dir))
        }
        SourceLocation::Local(path) => (path.clone(), None),
    };

    let metadata = config
        .include_repo_info
        .then(|| read_repo_metadata(&root));

    info!("Scanning for files in {}", root.display());
    let chunks = pack_directory(&root, config, metadata.as_ref(), read_file_contents)?;

    info!("Writing output");
    let writer = create_writer(config.output_path.as_deref(), config.chunk_size > 0);
    writer.write(&chunks)?;

    if let Some(dir) = clone {
        info!("Cleaning up temporary directory {}", dir.path().display());
        if let Err(e) = dir.close() {
            warn!("Failed to remove temporary directory: {}", e);
        }
    }
    Ok(())
}
