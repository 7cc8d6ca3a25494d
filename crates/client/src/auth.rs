//! Login, logout and session verification.

use tracing::info;

use cofre_protocol::messages::{ApiReply, LoginRequest, LoginResponse, VerifySessionResponse};

use crate::ClientError;
use crate::http::ApiClient;

impl ApiClient {
    /// Logs in and stores the returned token and role in the session.
    pub async fn login(
        &mut self,
        boleta: u64,
        password: &str,
    ) -> Result<LoginResponse, ClientError> {
        let req = LoginRequest {
            boleta,
            password: password.to_string(),
        };
        let resp: LoginResponse = self.post_json_public("/auth/login", &req).await?;

        self.session.set_token(resp.access_token.clone());
        self.session.set_user_type(resp.user_type.clone());
        info!(boleta, user_type = %resp.user_type, "logged in");

        Ok(resp)
    }

    /// Logs out on the server, then forgets the token locally.
    ///
    /// The local token is cleared even when the server call fails; the
    /// token is stateless on the server side, so dropping it locally is
    /// what actually ends the session.
    pub async fn logout(&mut self) -> Result<String, ClientError> {
        let result: Result<ApiReply, ClientError> =
            self.post_json("/auth/logout", &serde_json::json!({})).await;
        self.session.clear_token();

        match result {
            Ok(reply) => Ok(reply.display_message().to_string()),
            Err(e) => Err(e),
        }
    }

    /// Asks the server whether the stored token is still valid.
    pub async fn verify_session(&self) -> Result<VerifySessionResponse, ClientError> {
        self.get_json("/auth/verify-session", &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::mock_server;

    #[tokio::test]
    async fn login_stores_token_and_role() {
        let body = r#"{
            "message": "Inicio de sesión exitoso",
            "access_token": "jwt-123",
            "user_type": "Administrador"
        }"#;
        let (url, handle) = mock_server(200, body).await;

        let mut client = ApiClient::new(&url).unwrap();
        let resp = client.login(2021630001, "hunter2").await.unwrap();

        assert_eq!(resp.user_type, "Administrador");
        assert_eq!(client.session().token(), Some("jwt-123"));
        assert_eq!(client.session().user_type(), Some("Administrador"));

        let request = handle.await.unwrap();
        assert!(request.starts_with("POST /auth/login"));
        assert!(request.contains("\"boleta\":2021630001"));
        // Login must not carry a stale bearer header.
        assert!(!request.contains("authorization"));
    }

    #[tokio::test]
    async fn bad_credentials_leave_session_unauthenticated() {
        let (url, _handle) = mock_server(401, r#"{"error":"Credenciales inválidas"}"#).await;

        let mut client = ApiClient::new(&url).unwrap();
        let result = client.login(1, "wrong").await;

        match result {
            Err(ClientError::Api { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "Credenciales inválidas");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
        assert!(!client.session().is_authenticated());
    }

    #[tokio::test]
    async fn logout_clears_token_even_on_server_error() {
        let (url, _handle) = mock_server(500, r#"{"error":"boom"}"#).await;

        let mut client = ApiClient::new(&url).unwrap();
        client.session_mut().set_token("jwt-123");

        let result = client.logout().await;
        assert!(result.is_err());
        assert!(!client.session().is_authenticated());
    }

    #[tokio::test]
    async fn logout_returns_server_message() {
        let (url, _handle) = mock_server(200, r#"{"message":"Cierre de sesión exitoso"}"#).await;

        let mut client = ApiClient::new(&url).unwrap();
        client.session_mut().set_token("jwt-123");

        let message = client.logout().await.unwrap();
        assert_eq!(message, "Cierre de sesión exitoso");
        assert!(!client.session().is_authenticated());
    }

    #[tokio::test]
    async fn verify_session_parses_flags() {
        let (url, _handle) =
            mock_server(200, r#"{"authenticated": true, "user_type": "Academia"}"#).await;

        let mut client = ApiClient::new(&url).unwrap();
        client.session_mut().set_token("jwt-123");

        let resp = client.verify_session().await.unwrap();
        assert!(resp.authenticated);
        assert_eq!(resp.user_type.as_deref(), Some("Academia"));
    }
}
