use serde::{Deserialize, Serialize};

use crate::constants::{
    HEADER_CHUNK_INDEX, HEADER_FILE_NAME, HEADER_FILE_PATH, HEADER_TOTAL_CHUNKS,
};
use crate::types::{DirListing, DirectoryTree};

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Credentials for `/auth/login`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub boleta: u64,
    pub password: String,
}

/// Successful login: JWT plus the role name shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub access_token: String,
    pub user_type: String,
}

/// Response of `/auth/verify-session`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifySessionResponse {
    pub authenticated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,
}

// ---------------------------------------------------------------------------
// Uploads
// ---------------------------------------------------------------------------

/// Body of `/file/upload/single`.
///
/// `file` is base64-encoded in JSON; the server decodes it before writing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleUploadRequest {
    #[serde(with = "base64_bytes")]
    pub file: Vec<u8>,
    pub filename: String,
    pub path: String,
}

/// One file inside a `/file/upload/lot` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchFileEntry {
    #[serde(with = "base64_bytes")]
    pub file: Vec<u8>,
    pub filename: String,
}

/// Body of `/file/upload/lot`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchUploadRequest {
    pub files: Vec<BatchFileEntry>,
    pub path: String,
}

/// Positional metadata for one chunk of `/file/upload/chunk`.
///
/// The chunk body travels as raw binary; everything the server needs to
/// place it goes in these four headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkMeta {
    /// 0-based position of this chunk.
    pub index: u64,
    pub total_chunks: u64,
    pub file_name: String,
    /// Destination directory ("" = user root).
    pub file_path: String,
}

impl ChunkMeta {
    /// Returns the header name/value pairs for this chunk.
    pub fn headers(&self) -> [(&'static str, String); 4] {
        [
            (HEADER_CHUNK_INDEX, self.index.to_string()),
            (HEADER_TOTAL_CHUNKS, self.total_chunks.to_string()),
            (HEADER_FILE_NAME, self.file_name.clone()),
            (HEADER_FILE_PATH, self.file_path.clone()),
        ]
    }
}

// ---------------------------------------------------------------------------
// File management
// ---------------------------------------------------------------------------

/// Body of `/file/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListRequest {
    #[serde(rename = "dirPath")]
    pub dir_path: String,
}

/// Response of `/file/list`: one directory level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub structure: DirListing,
}

/// Response of `/file/full-list`: the whole tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub structure: DirectoryTree,
}

/// Body of `/file/create-folder`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateFolderRequest {
    pub folder_name: String,
    pub parent_dir: String,
}

/// Body of `/file/move`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub source_path: String,
    pub destination_path: String,
}

/// Body of `/file/delete`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteRequest {
    pub target_path: String,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Body of `POST /users/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUserRequest {
    pub boleta: u64,
    pub email: String,
    pub password: String,
    pub nombre: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_id: Option<u64>,
}

/// Body of `PUT /users/:boleta` — only the fields being changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserUpdateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_id: Option<u64>,
}

// ---------------------------------------------------------------------------
// Generic reply envelope
// ---------------------------------------------------------------------------

/// The server's `{message}` / `{error}` envelope.
///
/// Success replies carry `message`, failures carry `error`; a chunk ack is
/// a success reply whose `message` names the received position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Final name assigned by the server when the last chunk lands and the
    /// file had to be renamed to avoid a collision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

impl ApiReply {
    /// The human-readable outcome string, preferring `message` over `error`.
    pub fn display_message(&self) -> &str {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .unwrap_or("no response body")
    }

    /// The error string for a failed reply.
    pub fn error_message(&self) -> &str {
        self.error
            .as_deref()
            .or(self.message.as_deref())
            .unwrap_or("unknown server error")
    }
}

/// Serializes byte fields as base64 strings, matching the browser clients'
/// `btoa`/`FileReader` encoding.
mod base64_bytes {
    use base64::{Engine, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        STANDARD.encode(data).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}
