use std::{
    fmt, io,
    path::{Path, PathBuf},
};

/// Exported machine files left in the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    dir: PathBuf,
    files: Vec<PathBuf>,
}

impl Artifact {
    pub const BUILDER_ID: &'static str = "vmb.hyperv";

    /// Collect every regular file below `dir`, sorted.
    pub async fn from_dir(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        let mut files = Vec::new();
        let mut pending = vec![dir.clone()];

        while let Some(current) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&current).await?;
            while let Some(entry) = entries.next_entry().await? {
                if entry.file_type().await?.is_dir() {
                    pending.push(entry.path());
                } else {
                    files.push(entry.path());
                }
            }
        }
        files.sort();
        Ok(Self { dir, files })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Remove the exported files from disk.
    pub async fn destroy(&self) -> io::Result<()> {
        tokio::fs::remove_dir_all(&self.dir).await
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VM files in directory: {}", self.dir.display())
    }
}
