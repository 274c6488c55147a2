//! Wire types for the HTTP posting service and the session handle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Authenticated handle to the remote service, valid for one run.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub token: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Body of `POST /login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Successful `POST /login` response.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Contents of `<session_dir>/session.json` when a session is cached.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CachedSession {
    pub username: String,
    pub token: String,
    /// RFC 3339 timestamp of the login.
    pub created_at: String,
}
