//! Session and navigation context.
//!
//! The browser front ends kept the access token, the current directory
//! and the selected item in page-level globals; here that state lives in
//! one explicit [`Session`] owned by the client, so reads and writes are
//! scoped instead of ambient.

use cofre_protocol::constants::DEFAULT_BASE_URL;

/// Authenticated session plus remote-directory navigation state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    base_url: String,
    access_token: Option<String>,
    user_type: Option<String>,
    current_path: String,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl Session {
    /// Creates an unauthenticated session against `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            access_token: None,
            user_type: None,
            current_path: String::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.access_token = Some(token.into());
    }

    /// Forgets the token and role, keeping base URL and navigation.
    pub fn clear_token(&mut self) {
        self.access_token = None;
        self.user_type = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Role name the server reported at login.
    pub fn user_type(&self) -> Option<&str> {
        self.user_type.as_deref()
    }

    pub fn set_user_type(&mut self, user_type: impl Into<String>) {
        self.user_type = Some(user_type.into());
    }

    /// Current remote directory (`""` = user root).
    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    /// Jumps to an arbitrary remote directory.
    pub fn go_to(&mut self, path: impl Into<String>) {
        self.current_path = path.into();
    }

    /// Descends into `folder` relative to the current directory.
    pub fn enter(&mut self, folder: &str) {
        self.current_path = self.join(folder);
    }

    /// Moves to the parent directory. Returns `false` when already at the
    /// root.
    pub fn up(&mut self) -> bool {
        if self.current_path.is_empty() {
            return false;
        }
        self.current_path = match self.current_path.rsplit_once('/') {
            Some((parent, _)) => parent.to_string(),
            None => String::new(),
        };
        true
    }

    /// Joins `name` onto the current directory without changing it.
    pub fn join(&self, name: &str) -> String {
        if self.current_path.is_empty() {
            name.to_string()
        } else {
            format!("{}/{name}", self.current_path)
        }
    }
}
