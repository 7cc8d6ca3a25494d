//! Upload driver: single-request and chunked transfers.
//!
//! [`Uploader`] owns the mode decision and the sequential chunk loop; it
//! talks to the server through the [`UploadTransport`] trait so the loop
//! can be tested against a mock. [`ApiClient`] implements the trait over
//! HTTP.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::{debug, info, warn};

use cofre_protocol::constants::{CHUNK_SIZE, SINGLE_UPLOAD_LIMIT};
use cofre_protocol::messages::{
    ApiReply, BatchFileEntry, BatchUploadRequest, ChunkMeta, SingleUploadRequest,
};
use cofre_protocol::types::TransferMode;
use cofre_transfer::{ChunkReader, ProgressSender, TransferTask, TransferUpdate};

use crate::ClientError;
use crate::http::{ApiClient, decode_json};

/// Byte-level progress callback: `(bytes_sent, bytes_total)` of the
/// request body.
pub type ProgressFn = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Pieces the single-upload body is streamed in.
const STREAM_PIECE: usize = 64 * 1024;

/// Size knobs for the mode decision and the chunk loop.
///
/// The defaults are the protocol constants; tests and unusual deployments
/// can shrink them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    /// Largest file sent as one base64 request.
    pub single_limit: u64,
    /// Chunk size for files above the limit.
    pub chunk_size: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            single_limit: SINGLE_UPLOAD_LIMIT,
            chunk_size: CHUNK_SIZE,
        }
    }
}

/// Abstract submission of upload requests.
///
/// Keeps the driver decoupled from HTTP and testable with mocks; the
/// real implementation lives on [`ApiClient`] below.
pub trait UploadTransport: Send + Sync {
    /// Submits a whole file as one base64 JSON request, reporting body
    /// bytes through `progress` as they go out.
    fn send_single(
        &self,
        req: SingleUploadRequest,
        progress: ProgressFn,
    ) -> Pin<Box<dyn Future<Output = Result<ApiReply, ClientError>> + Send + '_>>;

    /// Submits one chunk as a raw binary body with positional headers and
    /// waits for the acknowledgment.
    fn send_chunk(
        &self,
        meta: ChunkMeta,
        data: Vec<u8>,
    ) -> Pin<Box<dyn Future<Output = Result<ApiReply, ClientError>> + Send + '_>>;

    /// Submits one batch-lot request (small files inside a batch upload).
    fn send_batch_entry(
        &self,
        req: BatchUploadRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ApiReply, ClientError>> + Send + '_>>;
}

/// Result of one completed upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    /// Remote name the upload was submitted under.
    pub file: String,
    pub mode: TransferMode,
    /// Final server message.
    pub message: String,
    /// Name the server actually stored the file under, when it had to
    /// rename to avoid a collision (chunked mode only).
    pub stored_as: Option<String>,
}

/// Per-file result of a batch upload.
#[derive(Debug)]
pub struct BatchItemOutcome {
    pub file: String,
    pub result: Result<UploadOutcome, ClientError>,
}

/// Drives uploads against an [`UploadTransport`].
pub struct Uploader<'a> {
    transport: &'a dyn UploadTransport,
    limits: UploadLimits,
}

impl<'a> Uploader<'a> {
    /// An uploader with the protocol limits (350 MiB / 5 MiB).
    pub fn new(transport: &'a dyn UploadTransport) -> Self {
        Self::with_limits(transport, UploadLimits::default())
    }

    /// An uploader with custom limits.
    pub fn with_limits(transport: &'a dyn UploadTransport, limits: UploadLimits) -> Self {
        Self { transport, limits }
    }

    /// The mode a file of `size` bytes travels in under these limits.
    pub fn mode_for(&self, size: u64) -> TransferMode {
        if size > self.limits.single_limit {
            TransferMode::Chunked
        } else {
            TransferMode::Single
        }
    }

    /// Uploads one file, choosing the mode by size.
    ///
    /// Progress updates land on `progress`; the final server message is
    /// in the returned outcome. A chunk failure aborts the remaining
    /// loop immediately — previously sent chunks stay wherever the
    /// server put them.
    pub async fn upload(
        &self,
        task: &TransferTask,
        progress: &ProgressSender,
    ) -> Result<UploadOutcome, ClientError> {
        match self.mode_for(task.size()) {
            TransferMode::Single => self.upload_single(task, progress).await,
            TransferMode::Chunked => self.upload_chunked(task, progress).await,
        }
    }

    /// Uploads several files in array order.
    ///
    /// Each file independently picks single or chunked mode. There is no
    /// atomicity across files: a failure is recorded for that file and
    /// the batch moves on, leaving earlier uploads in place.
    pub async fn upload_batch(
        &self,
        tasks: &[TransferTask],
        progress: &ProgressSender,
    ) -> Vec<BatchItemOutcome> {
        let mut outcomes = Vec::with_capacity(tasks.len());
        for task in tasks {
            let result = match self.mode_for(task.size()) {
                TransferMode::Single => self.upload_batch_single(task, progress).await,
                TransferMode::Chunked => self.upload_chunked(task, progress).await,
            };
            if let Err(e) = &result {
                warn!(file = task.dest_name(), error = %e, "batch upload item failed");
            }
            outcomes.push(BatchItemOutcome {
                file: task.dest_name().to_string(),
                result,
            });
        }
        outcomes
    }

    async fn upload_single(
        &self,
        task: &TransferTask,
        progress: &ProgressSender,
    ) -> Result<UploadOutcome, ClientError> {
        let data = tokio::fs::read(task.source()).await?;

        let req = SingleUploadRequest {
            file: data,
            filename: task.dest_name().to_string(),
            path: task.dest_path().to_string(),
        };

        let file = task.dest_name().to_string();
        let hook: ProgressFn = {
            let progress = progress.clone();
            let file = file.clone();
            Arc::new(move |sent, total| {
                progress.send(TransferUpdate {
                    file: file.clone(),
                    mode: TransferMode::Single,
                    transferred_bytes: sent,
                    total_bytes: total,
                    percent: if total > 0 {
                        sent as f64 / total as f64 * 100.0
                    } else {
                        100.0
                    },
                });
            })
        };

        let reply = self.transport.send_single(req, hook).await?;
        info!(file = %file, "single upload complete");

        Ok(UploadOutcome {
            file,
            mode: TransferMode::Single,
            message: reply.display_message().to_string(),
            stored_as: None,
        })
    }

    /// One lot request per small file, mirroring the batch endpoint's
    /// one-element `files` array.
    async fn upload_batch_single(
        &self,
        task: &TransferTask,
        progress: &ProgressSender,
    ) -> Result<UploadOutcome, ClientError> {
        let data = tokio::fs::read(task.source()).await?;
        let total = data.len() as u64;

        let req = BatchUploadRequest {
            files: vec![BatchFileEntry {
                file: data,
                filename: task.dest_name().to_string(),
            }],
            path: task.dest_path().to_string(),
        };

        let reply = self.transport.send_batch_entry(req).await?;

        progress.send(TransferUpdate {
            file: task.dest_name().to_string(),
            mode: TransferMode::Single,
            transferred_bytes: total,
            total_bytes: total,
            percent: 100.0,
        });

        Ok(UploadOutcome {
            file: task.dest_name().to_string(),
            mode: TransferMode::Single,
            message: reply.display_message().to_string(),
            stored_as: None,
        })
    }

    async fn upload_chunked(
        &self,
        task: &TransferTask,
        progress: &ProgressSender,
    ) -> Result<UploadOutcome, ClientError> {
        let chunk_size = self.limits.chunk_size;
        let mut reader = tokio::task::spawn_blocking({
            let path = task.source().to_path_buf();
            move || ChunkReader::with_chunk_size(&path, chunk_size)
        })
        .await
        .map_err(|e| ClientError::Upload(format!("task join error: {e}")))??;

        let total_chunks = reader.plan().total_chunks();
        let total_bytes = reader.plan().file_size();
        let file = task.dest_name().to_string();

        debug!(file = %file, total_chunks, total_bytes, "starting chunked upload");

        let mut transferred = 0u64;
        let mut last_reply = ApiReply::default();

        // Strictly sequential: the next chunk is read and sent only after
        // the previous acknowledgment arrived.
        loop {
            let (r, chunk) = tokio::task::spawn_blocking(move || {
                let chunk = reader.next_chunk();
                (reader, chunk)
            })
            .await
            .map_err(|e| ClientError::Upload(format!("task join error: {e}")))?;
            reader = r;

            let Some(chunk) = chunk? else {
                break;
            };

            let index = chunk.descriptor.index;
            let meta = ChunkMeta {
                index,
                total_chunks,
                file_name: file.clone(),
                file_path: task.dest_path().to_string(),
            };

            let reply = self
                .transport
                .send_chunk(meta, chunk.data)
                .await
                .map_err(|e| chunk_failure(index + 1, total_chunks, e))?;

            transferred += chunk.descriptor.len();
            let percent = (index + 1) as f64 / total_chunks as f64 * 100.0;
            progress.send(TransferUpdate {
                file: file.clone(),
                mode: TransferMode::Chunked,
                transferred_bytes: transferred,
                total_bytes,
                percent,
            });
            debug!(file = %file, chunk = index + 1, total_chunks, "chunk acknowledged");

            last_reply = reply;
        }

        info!(file = %file, total_chunks, "chunked upload complete");

        Ok(UploadOutcome {
            file,
            mode: TransferMode::Chunked,
            message: last_reply.display_message().to_string(),
            stored_as: last_reply.file_name,
        })
    }
}

/// Folds a transport error into the chunk-position error shown to the
/// caller (`position` is 1-based).
fn chunk_failure(position: u64, total_chunks: u64, err: ClientError) -> ClientError {
    let message = match err {
        ClientError::Api { message, .. } => message,
        other => other.to_string(),
    };
    ClientError::Chunk {
        position,
        total_chunks,
        message,
    }
}

// ---------------------------------------------------------------------------
// HTTP transport
// ---------------------------------------------------------------------------

impl UploadTransport for ApiClient {
    fn send_single(
        &self,
        req: SingleUploadRequest,
        progress: ProgressFn,
    ) -> Pin<Box<dyn Future<Output = Result<ApiReply, ClientError>> + Send + '_>> {
        Box::pin(async move {
            let token = self.bearer()?.to_string();
            let body = serde_json::to_vec(&req)?;
            let total = body.len() as u64;

            // Stream the serialized body in pieces so the caller sees
            // byte-level progress as the request goes out.
            let pieces: Vec<Vec<u8>> = body.chunks(STREAM_PIECE).map(<[u8]>::to_vec).collect();
            let mut sent = 0u64;
            let stream = futures_util::stream::iter(pieces.into_iter().map(move |piece| {
                sent += piece.len() as u64;
                progress(sent, total);
                Ok::<Vec<u8>, std::io::Error>(piece)
            }));

            let resp = self
                .http
                .post(self.url("/file/upload/single"))
                .bearer_auth(token)
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .header(reqwest::header::CONTENT_LENGTH, total)
                .body(reqwest::Body::wrap_stream(stream))
                .send()
                .await?;
            decode_json(resp).await
        })
    }

    fn send_chunk(
        &self,
        meta: ChunkMeta,
        data: Vec<u8>,
    ) -> Pin<Box<dyn Future<Output = Result<ApiReply, ClientError>> + Send + '_>> {
        Box::pin(async move {
            let mut req = self
                .http
                .post(self.url("/file/upload/chunk"))
                .bearer_auth(self.bearer()?);
            for (name, value) in meta.headers() {
                req = req.header(name, value);
            }
            let resp = req.body(data).send().await?;
            decode_json(resp).await
        })
    }

    fn send_batch_entry(
        &self,
        req: BatchUploadRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ApiReply, ClientError>> + Send + '_>> {
        Box::pin(async move { self.post_json("/file/upload/lot", &req).await })
    }
}

impl ApiClient {
    /// Uploads one file with the protocol limits.
    pub async fn upload_file(
        &self,
        task: &TransferTask,
        progress: &ProgressSender,
    ) -> Result<UploadOutcome, ClientError> {
        Uploader::new(self).upload(task, progress).await
    }

    /// Uploads several files in order with the protocol limits.
    pub async fn upload_files(
        &self,
        tasks: &[TransferTask],
        progress: &ProgressSender,
    ) -> Vec<BatchItemOutcome> {
        Uploader::new(self).upload_batch(tasks, progress).await
    }
}
