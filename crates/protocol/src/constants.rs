/// Default base URL of the storage API.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Size of one upload chunk (5 MiB).
pub const CHUNK_SIZE: u64 = 5 * 1024 * 1024;

/// Largest file sent as a single base64 request (350 MiB).
///
/// Anything above this goes through the chunk endpoint. The server caps
/// single uploads at 500 MiB, so the margin also covers base64 expansion.
pub const SINGLE_UPLOAD_LIMIT: u64 = 350 * 1024 * 1024;

/// Header carrying the 0-based chunk index.
pub const HEADER_CHUNK_INDEX: &str = "X-Chunk-Index";

/// Header carrying the total number of chunks for the file.
pub const HEADER_TOTAL_CHUNKS: &str = "X-Total-Chunks";

/// Header carrying the destination file name.
pub const HEADER_FILE_NAME: &str = "X-File-Name";

/// Header carrying the destination directory path ("" = user root).
pub const HEADER_FILE_PATH: &str = "X-File-Path";
