use std::path::{Component, Path};

use crate::TransferError;

/// Validates a destination path before it is sent to the server.
///
/// The API treats `""` as the user's root, so empty paths are accepted.
/// Rejected:
/// - Absolute paths (Unix `/` or Windows `C:\`)
/// - Parent directory traversal (`..`)
/// - Windows prefix components (`C:`, `\\server`)
///
/// The server enforces its own jail; this check just fails obviously bad
/// destinations before any bytes travel.
pub fn validate_remote_path(remote_path: &str) -> Result<(), TransferError> {
    if remote_path.is_empty() {
        return Ok(());
    }

    let path = Path::new(remote_path);

    if path.is_absolute() {
        return Err(TransferError::InvalidPath(format!(
            "absolute path not allowed: {remote_path}"
        )));
    }

    for component in path.components() {
        match component {
            Component::ParentDir => {
                return Err(TransferError::InvalidPath(format!(
                    "parent directory traversal not allowed: {remote_path}"
                )));
            }
            Component::Prefix(_) => {
                return Err(TransferError::InvalidPath(format!(
                    "path prefix not allowed: {remote_path}"
                )));
            }
            Component::RootDir => {
                return Err(TransferError::InvalidPath(format!(
                    "absolute path not allowed: {remote_path}"
                )));
            }
            Component::CurDir | Component::Normal(_) => {}
        }
    }

    Ok(())
}
