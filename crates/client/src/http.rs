//! HTTP plumbing shared by every endpoint group.

use serde::Serialize;
use serde::de::DeserializeOwned;

use cofre_protocol::messages::ApiReply;

use crate::ClientError;
use crate::session::Session;

/// Async client for the storage API.
///
/// Owns the [`Session`] (base URL, token, navigation) and a `reqwest`
/// client. Endpoint groups live in their own modules: `auth`, `users`,
/// `files`, and the upload driver in [`crate::upload`].
pub struct ApiClient {
    pub(crate) http: reqwest::Client,
    pub(crate) session: Session,
}

impl ApiClient {
    /// Creates a client for the API at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_session(Session::new(base_url))
    }

    /// Creates a client around an existing session (e.g. a restored
    /// token).
    pub fn with_session(session: Session) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self { http, session })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.session.base_url(), path)
    }

    pub(crate) fn bearer(&self) -> Result<&str, ClientError> {
        self.session.token().ok_or(ClientError::NotAuthenticated)
    }

    /// Authenticated GET returning JSON.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        let resp = self
            .http
            .get(self.url(path))
            .bearer_auth(self.bearer()?)
            .query(query)
            .send()
            .await?;
        decode_json(resp).await
    }

    /// Authenticated GET returning the raw body (downloads).
    pub(crate) async fn get_bytes(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<u8>, ClientError> {
        let resp = self
            .http
            .get(self.url(path))
            .bearer_auth(self.bearer()?)
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(api_error(status.as_u16(), resp).await);
        }
        Ok(resp.bytes().await?.to_vec())
    }

    /// Authenticated POST with a JSON body.
    pub(crate) async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let resp = self
            .http
            .post(self.url(path))
            .bearer_auth(self.bearer()?)
            .json(body)
            .send()
            .await?;
        decode_json(resp).await
    }

    /// Unauthenticated POST (login).
    pub(crate) async fn post_json_public<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let resp = self.http.post(self.url(path)).json(body).send().await?;
        decode_json(resp).await
    }

    /// Authenticated PUT with a JSON body.
    pub(crate) async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let resp = self
            .http
            .put(self.url(path))
            .bearer_auth(self.bearer()?)
            .json(body)
            .send()
            .await?;
        decode_json(resp).await
    }

    /// Authenticated DELETE.
    pub(crate) async fn delete_json<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ClientError> {
        let resp = self
            .http
            .delete(self.url(path))
            .bearer_auth(self.bearer()?)
            .send()
            .await?;
        decode_json(resp).await
    }
}

/// Maps a response to `T` or to the API's error envelope.
pub(crate) async fn decode_json<T: DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(api_error(status.as_u16(), resp).await);
    }
    Ok(resp.json::<T>().await?)
}

/// Builds the application-failure error from a non-2xx response, pulling
/// the human-readable string out of the `{error}` envelope when present.
pub(crate) async fn api_error(status: u16, resp: reqwest::Response) -> ClientError {
    let reply = resp.json::<ApiReply>().await.unwrap_or_default();
    ClientError::Api {
        status,
        message: reply.error_message().to_string(),
    }
}
