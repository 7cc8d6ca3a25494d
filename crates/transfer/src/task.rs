use std::path::{Path, PathBuf};

use cofre_protocol::types::TransferMode;

use crate::plan::ChunkPlan;
use crate::validation::validate_remote_path;
use crate::TransferError;

/// One file headed for the server.
///
/// Immutable once created: the source path, its size (captured at creation
/// time), and the remote destination. The transfer mode follows from the
/// size alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferTask {
    source: PathBuf,
    size: u64,
    dest_path: String,
    dest_name: String,
}

impl TransferTask {
    /// Describes an upload of `source` into the remote directory
    /// `dest_path` (`""` = user root), keeping the local file name.
    pub fn new(
        source: impl Into<PathBuf>,
        dest_path: impl Into<String>,
    ) -> Result<Self, TransferError> {
        let source = source.into();
        let dest_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| TransferError::NotAFile(source.display().to_string()))?;
        Self::with_name(source, dest_path, dest_name)
    }

    /// Same as [`new`](Self::new) but stores the file under a different
    /// remote name.
    pub fn with_name(
        source: impl Into<PathBuf>,
        dest_path: impl Into<String>,
        dest_name: impl Into<String>,
    ) -> Result<Self, TransferError> {
        let source = source.into();
        let dest_path = dest_path.into();
        validate_remote_path(&dest_path)?;

        let meta = std::fs::metadata(&source)?;
        if !meta.is_file() {
            return Err(TransferError::NotAFile(source.display().to_string()));
        }

        Ok(Self {
            source,
            size: meta.len(),
            dest_path,
            dest_name: dest_name.into(),
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// File size in bytes, as captured when the task was created.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Remote directory the file lands in (`""` = user root).
    pub fn dest_path(&self) -> &str {
        &self.dest_path
    }

    /// Name the file is stored under remotely.
    pub fn dest_name(&self) -> &str {
        &self.dest_name
    }

    /// Single or chunked, decided purely by size.
    pub fn mode(&self) -> TransferMode {
        TransferMode::for_size(self.size)
    }

    /// The chunk plan this task would follow in chunked mode.
    pub fn plan(&self) -> ChunkPlan {
        ChunkPlan::new(self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn derives_name_from_source() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, b"pdf bytes").unwrap();

        let task = TransferTask::new(&path, "docs").unwrap();
        assert_eq!(task.dest_name(), "report.pdf");
        assert_eq!(task.dest_path(), "docs");
        assert_eq!(task.size(), 9);
        assert_eq!(task.mode(), TransferMode::Single);
    }

    #[test]
    fn explicit_remote_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.tmp");
        std::fs::write(&path, b"x").unwrap();

        let task = TransferTask::with_name(&path, "", "final.bin").unwrap();
        assert_eq!(task.dest_name(), "final.bin");
        assert_eq!(task.dest_path(), "");
    }

    #[test]
    fn rejects_traversal_in_destination() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.bin");
        std::fs::write(&path, b"x").unwrap();

        let result = TransferTask::new(&path, "../evil");
        assert!(matches!(result, Err(TransferError::InvalidPath(_))));
    }

    #[test]
    fn rejects_directory_source() {
        let dir = TempDir::new().unwrap();
        let result = TransferTask::new(dir.path(), "");
        assert!(matches!(result, Err(TransferError::NotAFile(_))));
    }

    #[test]
    fn missing_source_is_io_error() {
        let result = TransferTask::new("/no/such/file.bin", "");
        assert!(matches!(result, Err(TransferError::Io(_))));
    }

    #[test]
    fn plan_matches_size() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.bin");
        std::fs::write(&path, vec![0u8; 1000]).unwrap();

        let task = TransferTask::new(&path, "").unwrap();
        assert_eq!(task.plan().file_size(), 1000);
    }
}
