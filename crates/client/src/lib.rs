//! Async client for the Cofre file-storage and user-management API.
//!
//! [`ApiClient`] wraps the HTTP surface: auth, user CRUD, directory
//! listing, downloads and folder management. Uploads go through
//! [`Uploader`], which picks single or chunked mode per file and drives
//! the sequential chunk loop with progress reporting.

mod auth;
mod files;
pub mod http;
pub mod session;
pub mod upload;
mod users;

pub use http::ApiClient;
pub use session::Session;
pub use upload::{
    BatchItemOutcome, ProgressFn, UploadLimits, UploadOutcome, UploadTransport, Uploader,
};

/// Errors produced by the client.
///
/// Only two failure kinds exist on the wire: connectivity failures (the
/// request never completed) and application failures (non-2xx with a JSON
/// `error` field). Everything else is local. No variant is retried.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("connection error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("chunk {position} of {total_chunks} failed: {message}")]
    Chunk {
        /// 1-based position of the failed chunk.
        position: u64,
        total_chunks: u64,
        message: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("transfer error: {0}")]
    Transfer(#[from] cofre_transfer::TransferError),

    #[error("upload failed: {0}")]
    Upload(String),

    #[error("not logged in")]
    NotAuthenticated,
}

#[cfg(test)]
pub(crate) mod testutil {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Starts a one-shot mock HTTP server answering with `status` and the
    /// given JSON body. Returns the base URL and the captured request.
    pub async fn mock_server(
        status: u16,
        body: &str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let url = format!("http://127.0.0.1:{port}");
        let body = body.to_string();

        let handle = tokio::spawn(async move {
            let mut request = String::new();
            if let Ok((mut stream, _)) = listener.accept().await {
                // Read until the headers and the declared body have
                // arrived; a single read can return just the head.
                let mut data = Vec::new();
                let mut buf = [0u8; 8192];
                loop {
                    let Ok(n) = stream.read(&mut buf).await else {
                        break;
                    };
                    if n == 0 {
                        break;
                    }
                    data.extend_from_slice(&buf[..n]);
                    if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
                        let head = String::from_utf8_lossy(&data[..pos]).to_lowercase();
                        let body_len = head
                            .lines()
                            .find_map(|l| l.strip_prefix("content-length:"))
                            .and_then(|v| v.trim().parse::<usize>().ok())
                            .unwrap_or(0);
                        if data.len() >= pos + 4 + body_len {
                            break;
                        }
                    }
                }
                request = String::from_utf8_lossy(&data).into_owned();

                let reason = if status < 400 { "OK" } else { "Error" };
                let resp = format!(
                    "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(resp.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
            request
        });

        (url, handle)
    }
}
