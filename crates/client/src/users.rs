//! User management endpoints.

use cofre_protocol::messages::{ApiReply, NewUserRequest, UserUpdateRequest};
use cofre_protocol::types::UserRecord;

use crate::ClientError;
use crate::http::ApiClient;

impl ApiClient {
    /// Registers a new user.
    pub async fn create_user(&self, user: &NewUserRequest) -> Result<String, ClientError> {
        let reply: ApiReply = self.post_json("/users/", user).await?;
        Ok(reply.display_message().to_string())
    }

    /// Lists every user.
    pub async fn list_users(&self) -> Result<Vec<UserRecord>, ClientError> {
        self.get_json("/users/", &[]).await
    }

    /// Fetches one user by boleta.
    pub async fn get_user(&self, boleta: u64) -> Result<UserRecord, ClientError> {
        self.get_json(&format!("/users/{boleta}"), &[]).await
    }

    /// Applies a partial update to a user.
    pub async fn update_user(
        &self,
        boleta: u64,
        changes: &UserUpdateRequest,
    ) -> Result<String, ClientError> {
        let reply: ApiReply = self.put_json(&format!("/users/{boleta}"), changes).await?;
        Ok(reply.display_message().to_string())
    }

    /// Deletes a user.
    pub async fn delete_user(&self, boleta: u64) -> Result<String, ClientError> {
        let reply: ApiReply = self.delete_json(&format!("/users/{boleta}")).await?;
        Ok(reply.display_message().to_string())
    }

    /// The record of the currently authenticated user.
    pub async fn current_user_info(&self) -> Result<UserRecord, ClientError> {
        self.get_json("/users/info", &[]).await
    }
}
