use crate::domain::errors::PackError;
use crate::domain::models::{RepoMetadata, UNKNOWN};
use log::{debug, info};
use std::path::Path;
use std::process::{Command, Stdio};
use tempfile::TempDir;

/// Shallow-clones `url` into a fresh temporary directory. The directory is
/// removed when the returned guard drops, including on failure here.
pub fn clone_repository(url: &str) -> Result<TempDir, PackError> {
    info!("Cloning repository {}...", url);
    let dir = TempDir::new().map_err(PackError::TempDir)?;

    let output = Command::new("git")
        .arg("clone")
        .arg("--depth")
        .arg("1")
        .arg(url)
        .arg(dir.path())
        .stdin(Stdio::null())
        .output()
        .map_err(PackError::GitUnavailable)?;

    if !output.status.success() {
        return Err(PackError::CloneFailed {
            url: url.to_string(),
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    debug!("Cloned {} into {}", url, dir.path().display());
    Ok(dir)
}

/// Origin URL, branch and last commit summary. Each part independently falls
/// back to `Unknown`.
pub fn read_repo_metadata(repo: &Path) -> RepoMetadata {
    RepoMetadata {
        url: git_query(repo, &["config", "--get", "remote.origin.url"]),
        branch: git_query(repo, &["rev-parse", "--abbrev-ref", "HEAD"]),
        last_commit: git_query(repo, &["log", "-1", "--pretty=format:%h - %an, %ar : %s"]),
    }
}

fn git_query(repo: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(args)
        .stdin(Stdio::null())
        .output();

    match output {
        Ok(out) if out.status.success() => {
            let text = String::from_utf8_lossy(&out.stdout).trim().to_string();
            if text.is_empty() {
                UNKNOWN.to_string()
            } else {
                text
            }
        }
        Ok(out) => {
            debug!("git {} exited with {}", args.join(" "), out.status);
            UNKNOWN.to_string()
        }
        Err(e) => {
            debug!("git {} could not run: {}", args.join(" "), e);
            UNKNOWN.to_string()
        }
    }
}
