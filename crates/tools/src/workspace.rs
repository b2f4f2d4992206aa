//! Workspace scoping shared by the file tools.
//!
//! Relative paths from the model are resolved against the workspace root;
//! absolute paths are taken verbatim. The walker skips hidden directories
//! and the configured ignore list (`.git`, `node_modules`, `target`).

use chrono::{DateTime, Utc};
use nohandcoder_core::error::ToolError;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

pub const DEFAULT_IGNORED_DIRS: &[&str] = &[".git", "node_modules", "target"];

#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    ignored_dirs: Vec<String>,
}

/// A regular file found while walking the workspace.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Absolute path on disk
    pub path: PathBuf,
    /// Path relative to the workspace root, `/`-separated
    pub relative: String,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
pub struct WalkOutput {
    pub files: Vec<FileEntry>,
    pub directories: Vec<String>,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ignored_dirs: DEFAULT_IGNORED_DIRS.iter().map(|d| d.to_string()).collect(),
        }
    }

    pub fn with_ignored_dirs(mut self, ignored_dirs: Vec<String>) -> Self {
        self.ignored_dirs = ignored_dirs;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a model-supplied path.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let candidate = Path::new(path);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.root.join(candidate)
        }
    }

    /// Whether the walker should descend into a directory with this name.
    pub fn should_descend(&self, dir_name: &str) -> bool {
        !dir_name.starts_with('.') && !self.ignored_dirs.iter().any(|d| d == dir_name)
    }

    /// Render `path` relative to the root with `/` separators.
    pub fn relative(&self, path: &Path) -> String {
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        rel.components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Recursively enumerate the workspace.
    ///
    /// Results are sorted by relative path. A subdirectory that can't be
    /// read is skipped; an unreadable root is an error.
    pub async fn walk(&self) -> Result<WalkOutput, ToolError> {
        let mut output = WalkOutput::default();
        let mut pending = vec![self.root.clone()];
        let mut is_root = true;

        while let Some(dir) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if is_root => return Err(ToolError::io(dir.display().to_string(), e)),
                Err(e) => {
                    debug!(dir = %dir.display(), error = %e, "Skipping unreadable directory");
                    continue;
                }
            };
            is_root = false;

            loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break,
                    Err(e) => {
                        debug!(dir = %dir.display(), error = %e, "Stopped reading directory");
                        break;
                    }
                };
                let Ok(file_type) = entry.file_type().await else {
                    continue;
                };
                let path = entry.path();

                if file_type.is_dir() {
                    let name = entry.file_name();
                    if self.should_descend(&name.to_string_lossy()) {
                        output.directories.push(self.relative(&path));
                        pending.push(path);
                    }
                } else if file_type.is_file() {
                    let metadata = entry.metadata().await.ok();
                    output.files.push(FileEntry {
                        relative: self.relative(&path),
                        size: metadata.as_ref().map(|m| m.len()).unwrap_or(0),
                        modified: metadata
                            .and_then(|m| m.modified().ok())
                            .map(DateTime::<Utc>::from),
                        path,
                    });
                }
            }
        }

        output.files.sort_by(|a, b| a.relative.cmp(&b.relative));
        output.directories.sort();
        Ok(output)
    }
}
