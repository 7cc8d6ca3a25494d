use cofre_protocol::constants::CHUNK_SIZE;

/// One chunk's position within a planned transfer.
///
/// The byte range is half-open: `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkDescriptor {
    /// 0-based chunk index.
    pub index: u64,
    /// Total chunks in the plan this descriptor belongs to.
    pub total_chunks: u64,
    pub start: u64,
    pub end: u64,
}

impl ChunkDescriptor {
    /// Length of this chunk in bytes.
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether this is the final chunk of its plan.
    pub fn is_last(&self) -> bool {
        self.index + 1 == self.total_chunks
    }
}

/// Deterministic slicing of a file into fixed-size chunks.
///
/// `total_chunks = ceil(file_size / chunk_size)`; every chunk is exactly
/// `chunk_size` bytes except the last, which carries the remainder. The
/// ranges are contiguous, non-overlapping, and cover `[0, file_size)`
/// exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    file_size: u64,
    chunk_size: u64,
}

impl ChunkPlan {
    /// Plans `file_size` bytes with the protocol chunk size (5 MiB).
    pub fn new(file_size: u64) -> Self {
        Self::with_chunk_size(file_size, CHUNK_SIZE)
    }

    /// Plans with a custom chunk size. A zero `chunk_size` falls back to
    /// the protocol default.
    pub fn with_chunk_size(file_size: u64, chunk_size: u64) -> Self {
        let chunk_size = if chunk_size == 0 { CHUNK_SIZE } else { chunk_size };
        Self {
            file_size,
            chunk_size,
        }
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    /// Number of chunks in the plan. Zero for an empty file.
    pub fn total_chunks(&self) -> u64 {
        self.file_size.div_ceil(self.chunk_size)
    }

    /// Returns the descriptor at `index`, or `None` past the end.
    pub fn descriptor(&self, index: u64) -> Option<ChunkDescriptor> {
        let total = self.total_chunks();
        if index >= total {
            return None;
        }
        let start = index * self.chunk_size;
        let end = self.file_size.min(start + self.chunk_size);
        Some(ChunkDescriptor {
            index,
            total_chunks: total,
            start,
            end,
        })
    }

    /// Iterates descriptors in index order.
    pub fn iter(&self) -> impl Iterator<Item = ChunkDescriptor> + '_ {
        (0..self.total_chunks()).filter_map(|i| self.descriptor(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: u64 = 1024 * 1024;

    #[test]
    fn total_chunks_is_ceiling_division() {
        assert_eq!(ChunkPlan::new(0).total_chunks(), 0);
        assert_eq!(ChunkPlan::new(1).total_chunks(), 1);
        assert_eq!(ChunkPlan::new(5 * MIB).total_chunks(), 1);
        assert_eq!(ChunkPlan::new(5 * MIB + 1).total_chunks(), 2);
        assert_eq!(ChunkPlan::new(400 * MIB).total_chunks(), 80);
    }

    #[test]
    fn four_hundred_mib_last_chunk_range() {
        let plan = ChunkPlan::new(400 * MIB);
        let last = plan.descriptor(79).unwrap();
        assert_eq!(last.start, 395 * MIB);
        assert_eq!(last.end, 400 * MIB);
        assert!(last.is_last());
        assert!(plan.descriptor(80).is_none());
    }

    #[test]
    fn ranges_cover_file_exactly() {
        // An awkward size: not a multiple of the chunk size.
        let size = 13 * MIB + 4242;
        let plan = ChunkPlan::new(size);

        let mut expected_start = 0;
        let mut covered = 0;
        for desc in plan.iter() {
            assert_eq!(desc.start, expected_start, "ranges must be contiguous");
            assert!(desc.end > desc.start);
            assert!(desc.end <= size);
            covered += desc.len();
            expected_start = desc.end;
        }
        assert_eq!(covered, size, "ranges must cover the whole file");
        assert_eq!(expected_start, size);
    }

    #[test]
    fn all_chunks_full_size_except_last() {
        let plan = ChunkPlan::new(12 * MIB + 1);
        let descs: Vec<_> = plan.iter().collect();
        assert_eq!(descs.len(), 3);
        assert_eq!(descs[0].len(), 5 * MIB);
        assert_eq!(descs[1].len(), 5 * MIB);
        assert_eq!(descs[2].len(), 2 * MIB + 1);
    }

    #[test]
    fn exact_multiple_has_no_short_tail() {
        let plan = ChunkPlan::new(10 * MIB);
        let descs: Vec<_> = plan.iter().collect();
        assert_eq!(descs.len(), 2);
        assert_eq!(descs[1].len(), 5 * MIB);
        assert!(descs[1].is_last());
    }

    #[test]
    fn empty_plan_yields_nothing() {
        let plan = ChunkPlan::new(0);
        assert_eq!(plan.iter().count(), 0);
        assert!(plan.descriptor(0).is_none());
    }

    #[test]
    fn custom_chunk_size() {
        let plan = ChunkPlan::with_chunk_size(10, 4);
        let descs: Vec<_> = plan.iter().collect();
        assert_eq!(descs.len(), 3);
        assert_eq!((descs[2].start, descs[2].end), (8, 10));
    }

    #[test]
    fn zero_chunk_size_falls_back_to_default() {
        let plan = ChunkPlan::with_chunk_size(CHUNK_SIZE * 2, 0);
        assert_eq!(plan.chunk_size(), CHUNK_SIZE);
        assert_eq!(plan.total_chunks(), 2);
    }

    #[test]
    fn descriptor_index_and_total_are_consistent() {
        let plan = ChunkPlan::with_chunk_size(100, 30);
        for (i, desc) in plan.iter().enumerate() {
            assert_eq!(desc.index, i as u64);
            assert_eq!(desc.total_chunks, 4);
        }
    }
}
