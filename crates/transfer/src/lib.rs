//! Chunk planning and sequential transfer mechanics.
//!
//! A [`TransferTask`] describes one file headed for the server. Files above
//! the single-upload limit are cut into fixed-size chunks by a
//! [`ChunkPlan`] and read one at a time by a [`ChunkReader`]; the upload
//! driver in `cofre-client` submits them strictly in order, so at most one
//! chunk buffer is alive at any moment.

mod chunked;
mod plan;
mod progress;
mod task;
mod validation;

pub use chunked::{Chunk, ChunkReader};
pub use plan::{ChunkDescriptor, ChunkPlan};
pub use progress::{ProgressSender, SpeedCalculator, TransferUpdate, progress_channel};
pub use task::TransferTask;
pub use validation::validate_remote_path;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid remote path: {0}")]
    InvalidPath(String),

    #[error("source is not a regular file: {0}")]
    NotAFile(String),

    #[error("file changed during transfer: expected {expected} bytes for chunk, got {actual}")]
    ShortRead { expected: u64, actual: u64 },
}
