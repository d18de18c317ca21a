use crate::domain::errors::PackError;
use log::{debug, info};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub trait OutputWriter {
    fn write(&self, chunks: &[String]) -> Result<(), PackError>;
}

/// Writes to `path`, or to numbered siblings of it when chunking produced
/// more than one chunk.
pub struct FileWriter {
    path: PathBuf,
    chunked: bool,
}

impl FileWriter {
    pub fn new(path: PathBuf, chunked: bool) -> Self {
        Self { path, chunked }
    }
}

impl OutputWriter for FileWriter {
    fn write(&self, chunks: &[String]) -> Result<(), PackError> {
        if self.chunked && chunks.len() > 1 {
            let paths = chunk_paths(&self.path, chunks.len());
            for (idx, (path, chunk)) in paths.iter().zip(chunks).enumerate() {
                write_file(path, chunk)?;
                info!("Wrote chunk {}/{} to {}", idx + 1, chunks.len(), path.display());
            }
        } else {
            write_file(&self.path, &chunks.concat())?;
            info!("Wrote output to {}", self.path.display());
        }
        Ok(())
    }
}

pub struct ConsoleWriter;

impl OutputWriter for ConsoleWriter {
    fn write(&self, chunks: &[String]) -> Result<(), PackError> {
        debug!("Writing output to console");
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        chunks
            .iter()
            .try_for_each(|chunk| handle.write_all(chunk.as_bytes()))
            .and_then(|_| handle.flush())
            .map_err(|source| PackError::OutputWrite {
                path: PathBuf::from("<stdout>"),
                source,
            })
    }
}

pub fn create_writer(output_path: Option<&Path>, chunked: bool) -> Box<dyn OutputWriter> {
    match output_path {
        Some(path) => {
            Box::new(FileWriter::new(path.to_path_buf(), chunked)) as Box<dyn OutputWriter>
        }
        None => Box::new(ConsoleWriter) as Box<dyn OutputWriter>,
    }
}

/// `out/pack.txt` with 3 chunks gives `out/pack_1.txt` .. `out/pack_3.txt`.
pub fn chunk_paths(base: &Path, count: usize) -> Vec<PathBuf> {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = base
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    (1..=count)
        .map(|n| base.with_file_name(format!("{}_{}{}", stem, n, ext)))
        .collect()
}

fn write_file(path: &Path, content: &str) -> Result<(), PackError> {
    debug!("Writing {} bytes to {}", content.len(), path.display());
    fs::write(path, content).map_err(|source| PackError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })
}
