use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response, multipart};

use super::RemoteService;
use super::error::ServiceError;
use super::types::{CachedSession, LoginRequest, LoginResponse, Session};
use crate::credentials::Credentials;

/// File written inside the session directory when a session is cached.
pub const SESSION_FILE: &str = "session.json";

/// Blocking HTTP client for the posting gateway.
///
/// | Call | Request |
/// |---|---|
/// | login | `POST {base}/login`, JSON `{username, password}` → `{token}` |
/// | upload | `POST {base}/photos`, multipart `caption` + `photo`, bearer token |
/// | logout | `POST {base}/logout`, bearer token |
pub struct HttpService {
    client: Client,
    base_url: String,
    session_dir: PathBuf,
}

impl HttpService {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        session_dir: impl Into<PathBuf>,
    ) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            session_dir: session_dir.into(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint)
    }

    fn cache_session(&self, session: &Session) -> Result<(), ServiceError> {
        fs::create_dir_all(&self.session_dir)?;
        let cached = CachedSession {
            username: session.username.clone(),
            token: session.token.clone(),
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        let json = serde_json::to_string_pretty(&cached).map_err(io::Error::from)?;
        fs::write(self.session_dir.join(SESSION_FILE), json)?;
        Ok(())
    }
}

/// Turn a non-2xx response into [`ServiceError::Status`].
fn check_status(response: Response) -> Result<Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .text()
        .unwrap_or_else(|_| "unknown error".to_string());
    Err(ServiceError::Status {
        status: status.as_u16(),
        message,
    })
}

impl RemoteService for HttpService {
    fn login(&self, credentials: &Credentials, sessionless: bool) -> Result<Session, ServiceError> {
        let response = self
            .client
            .post(self.url("login"))
            .json(&LoginRequest {
                username: &credentials.username,
                password: &credentials.password,
            })
            .send()?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let message = response.text().unwrap_or_default();
            return Err(ServiceError::AuthRejected(format!(
                "status {}: {}",
                status.as_u16(),
                message
            )));
        }

        let body: LoginResponse = check_status(response)?
            .json()
            .map_err(|e| ServiceError::Protocol(format!("login response: {e}")))?;
        let session = Session {
            username: credentials.username.clone(),
            token: body.token,
        };
        if !sessionless {
            self.cache_session(&session)?;
        }
        Ok(session)
    }

    fn upload_photo(&self, session: &Session, photo: &Path, caption: &str) -> Result<(), ServiceError> {
        let form = multipart::Form::new()
            .text("caption", caption.to_string())
            .file("photo", photo)?;
        let response = self
            .client
            .post(self.url("photos"))
            .bearer_auth(&session.token)
            .multipart(form)
            .send()?;
        check_status(response)?;
        Ok(())
    }

    fn logout(&self, session: &Session) -> Result<(), ServiceError> {
        let response = self
            .client
            .post(self.url("logout"))
            .bearer_auth(&session.token)
            .send()?;
        check_status(response)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slash() {
        let svc = HttpService::new("http://gw.local/api/", Duration::from_secs(5), "config").unwrap();
        assert_eq!(svc.url("login"), "http://gw.local/api/login");

        let svc = HttpService::new("http://gw.local", Duration::from_secs(5), "config").unwrap();
        assert_eq!(svc.url("photos"), "http://gw.local/photos");
    }
}
