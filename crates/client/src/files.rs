//! Directory listing, downloads and folder management.

use tracing::debug;

use cofre_protocol::messages::{
    ApiReply, CreateFolderRequest, DeleteRequest, ListRequest, ListResponse, MoveRequest,
    TreeResponse,
};
use cofre_protocol::types::{DirListing, DirectoryTree};

use crate::ClientError;
use crate::http::ApiClient;

impl ApiClient {
    /// Lists one directory level (`""` = user root).
    pub async fn list_dir(&self, dir: &str) -> Result<DirListing, ClientError> {
        let req = ListRequest {
            dir_path: dir.to_string(),
        };
        let resp: ListResponse = self.post_json("/file/list", &req).await?;
        debug!(
            dir,
            folders = resp.structure.folders.len(),
            files = resp.structure.files.len(),
            "listed directory"
        );
        Ok(resp.structure)
    }

    /// Fetches the user's whole directory tree in one call.
    pub async fn full_tree(&self) -> Result<DirectoryTree, ClientError> {
        let resp: TreeResponse = self.get_json("/file/full-list", &[]).await?;
        Ok(resp.structure)
    }

    /// Downloads one file, returning its bytes.
    pub async fn download_file(&self, file_path: &str) -> Result<Vec<u8>, ClientError> {
        self.get_bytes("/file/download", &[("file_path", file_path)])
            .await
    }

    /// Downloads a folder as a zip archive, returning the archive bytes.
    pub async fn download_folder(&self, folder_path: &str) -> Result<Vec<u8>, ClientError> {
        self.get_bytes("/file/download-folder", &[("folder_path", folder_path)])
            .await
    }

    /// Creates a folder under `parent_dir` (`""` = user root).
    pub async fn create_folder(
        &self,
        folder_name: &str,
        parent_dir: &str,
    ) -> Result<String, ClientError> {
        let req = CreateFolderRequest {
            folder_name: folder_name.to_string(),
            parent_dir: parent_dir.to_string(),
        };
        let reply: ApiReply = self.post_json("/file/create-folder", &req).await?;
        Ok(reply.display_message().to_string())
    }

    /// Moves a file or folder.
    pub async fn move_item(
        &self,
        source_path: &str,
        destination_path: &str,
    ) -> Result<String, ClientError> {
        let req = MoveRequest {
            source_path: source_path.to_string(),
            destination_path: destination_path.to_string(),
        };
        let reply: ApiReply = self.post_json("/file/move", &req).await?;
        Ok(reply.display_message().to_string())
    }

    /// Deletes a file or folder.
    pub async fn delete_item(&self, target_path: &str) -> Result<String, ClientError> {
        let req = DeleteRequest {
            target_path: target_path.to_string(),
        };
        let reply: ApiReply = self.post_json("/file/delete", &req).await?;
        Ok(reply.display_message().to_string())
    }
}
