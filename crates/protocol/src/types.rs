use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::SINGLE_UPLOAD_LIMIT;

/// How a file travels to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferMode {
    /// One JSON request with the whole file base64-encoded.
    #[serde(rename = "single")]
    Single,
    /// Sequential raw-binary chunks with positional headers.
    #[serde(rename = "chunked")]
    Chunked,
}

impl TransferMode {
    /// Selects the mode for a file of `size` bytes.
    ///
    /// Pure function of size: anything above [`SINGLE_UPLOAD_LIMIT`] is
    /// chunked, everything else (including empty files) goes single.
    pub fn for_size(size: u64) -> Self {
        if size > SINGLE_UPLOAD_LIMIT {
            TransferMode::Chunked
        } else {
            TransferMode::Single
        }
    }
}

/// A user row as the server reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub boleta: u64,
    pub email: String,
    pub nombre: String,
}

/// A file row in a directory listing.
///
/// `size` is in MiB with two decimals and `date` is `dd/mm/YYYY`, exactly
/// as the server formats them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    pub path: String,
    pub size: f64,
    pub date: String,
}

/// Contents of one directory: subfolder names and file rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirListing {
    #[serde(default)]
    pub folders: Vec<String>,
    #[serde(default)]
    pub files: Vec<FileInfo>,
}

/// The full recursive tree returned by `/file/full-list`.
///
/// Keys are folder paths relative to the user root; the root itself is
/// keyed by the empty string.
pub type DirectoryTree = BTreeMap<String, DirListing>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_below_limit_is_single() {
        assert_eq!(TransferMode::for_size(0), TransferMode::Single);
        assert_eq!(TransferMode::for_size(12 * 1024 * 1024), TransferMode::Single);
    }

    #[test]
    fn mode_at_limit_is_single() {
        assert_eq!(TransferMode::for_size(SINGLE_UPLOAD_LIMIT), TransferMode::Single);
    }

    #[test]
    fn mode_above_limit_is_chunked() {
        assert_eq!(
            TransferMode::for_size(SINGLE_UPLOAD_LIMIT + 1),
            TransferMode::Chunked
        );
        assert_eq!(
            TransferMode::for_size(400 * 1024 * 1024),
            TransferMode::Chunked
        );
    }

    #[test]
    fn dir_listing_parses_server_shape() {
        let json = r#"{
            "folders": ["docs", "media"],
            "files": [{"path": "notes.txt", "size": 0.01, "date": "03/11/2024"}]
        }"#;
        let listing: DirListing = serde_json::from_str(json).unwrap();
        assert_eq!(listing.folders, vec!["docs", "media"]);
        assert_eq!(listing.files.len(), 1);
        assert_eq!(listing.files[0].path, "notes.txt");
    }

    #[test]
    fn dir_listing_defaults_missing_fields() {
        let listing: DirListing = serde_json::from_str("{}").unwrap();
        assert!(listing.folders.is_empty());
        assert!(listing.files.is_empty());
    }

    #[test]
    fn directory_tree_root_key_is_empty_string() {
        let json = r#"{
            "": {"folders": ["sub"], "files": []},
            "sub": {"folders": [], "files": [{"path": "sub/a.bin", "size": 2.5, "date": "01/01/2025"}]}
        }"#;
        let tree: DirectoryTree = serde_json::from_str(json).unwrap();
        assert!(tree.contains_key(""));
        assert_eq!(tree[""].folders, vec!["sub"]);
        assert_eq!(tree["sub"].files[0].size, 2.5);
    }

    #[test]
    fn user_record_roundtrip() {
        let user = UserRecord {
            boleta: 2021630000,
            email: "ana@example.mx".into(),
            nombre: "Ana".into(),
        };
        let json = serde_json::to_string(&user).unwrap();
        let parsed: UserRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(user, parsed);
    }
}
