use std::io::Read;
use std::path::Path;

use crate::plan::{ChunkDescriptor, ChunkPlan};
use crate::TransferError;

/// One chunk read from disk, ready to submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub descriptor: ChunkDescriptor,
    pub data: Vec<u8>,
}

/// Reads a file chunk by chunk, in plan order.
///
/// The reader holds a single open file handle and buffers exactly one
/// chunk at a time. The plan is fixed at open time from the file's size;
/// if the file shrinks mid-transfer the short read is reported as an
/// error rather than silently sending a truncated chunk.
pub struct ChunkReader {
    file: std::fs::File,
    plan: ChunkPlan,
    next_index: u64,
}

impl ChunkReader {
    /// Opens `path` with the protocol chunk size.
    pub fn open(path: &Path) -> Result<Self, TransferError> {
        Self::with_chunk_size(path, 0)
    }

    /// Opens `path` with a custom chunk size (0 = protocol default).
    pub fn with_chunk_size(path: &Path, chunk_size: u64) -> Result<Self, TransferError> {
        let file = std::fs::File::open(path)?;
        let len = file.metadata()?.len();
        Ok(Self {
            file,
            plan: ChunkPlan::with_chunk_size(len, chunk_size),
            next_index: 0,
        })
    }

    /// The plan this reader follows.
    pub fn plan(&self) -> &ChunkPlan {
        &self.plan
    }

    /// Reads the next chunk. Returns `None` once the plan is exhausted.
    ///
    /// Chunks come back strictly in index order; the file is read
    /// sequentially, so no seeking happens between calls.
    pub fn next_chunk(&mut self) -> Result<Option<Chunk>, TransferError> {
        let Some(descriptor) = self.plan.descriptor(self.next_index) else {
            return Ok(None);
        };

        let expected = descriptor.len();
        let mut data = vec![0u8; expected as usize];
        let mut filled = 0usize;
        while filled < data.len() {
            let n = self.file.read(&mut data[filled..])?;
            if n == 0 {
                return Err(TransferError::ShortRead {
                    expected,
                    actual: filled as u64,
                });
            }
            filled += n;
        }

        self.next_index += 1;
        Ok(Some(Chunk { descriptor, data }))
    }
}
