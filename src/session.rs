//! Authenticated sessions with the remote service.
//!
//! Every run starts from a clean slate: any session state left on disk by a
//! previous run is purged, and login is requested in sessionless mode so
//! nothing new is persisted. Pauses around login and logout are randomized
//! through a [`PacingWindow`] to keep the account's activity pattern human.
//!
//! [`ActiveSession`] is a scoped guard: the session is logged out when the
//! guard is closed or dropped, whichever comes first, so no exit path from a
//! run can leak a logged-in session.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::credentials::Credentials;
use crate::pacing::{Pacer, PacingWindow};
use crate::service::{RemoteService, ServiceError, Session};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("authentication failed: {0}")]
    Auth(#[source] ServiceError),
}

/// Remove the session/cache directory if present.
///
/// Returns whether anything was removed. A missing directory is not an
/// error.
pub fn purge_stale_state(dir: &Path) -> io::Result<bool> {
    match fs::remove_dir_all(dir) {
        Ok(()) => {
            debug!(dir = %dir.display(), "purged stale session state");
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Timing and location knobs for a session.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub session_dir: PathBuf,
    pub pre_login: PacingWindow,
    pub post_login: PacingWindow,
    pub before_logout: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            session_dir: PathBuf::from("config"),
            pre_login: PacingWindow::new(Duration::from_secs(2), Duration::from_secs(4)),
            post_login: PacingWindow::new(Duration::from_secs(3), Duration::from_secs(5)),
            before_logout: Duration::from_secs(1),
        }
    }
}

pub struct SessionManager<'a, S: RemoteService, P: Pacer> {
    service: &'a S,
    pacer: &'a P,
    settings: &'a SessionSettings,
}

impl<'a, S: RemoteService, P: Pacer> SessionManager<'a, S, P> {
    pub fn new(service: &'a S, pacer: &'a P, settings: &'a SessionSettings) -> Self {
        Self {
            service,
            pacer,
            settings,
        }
    }

    /// Purge stale state, wait, log in without persisting, wait again.
    pub fn open(&self, credentials: &Credentials) -> Result<ActiveSession<'a, S, P>, SessionError> {
        if let Err(e) = purge_stale_state(&self.settings.session_dir) {
            warn!(
                dir = %self.settings.session_dir.display(),
                error = %e,
                "could not purge stale session state"
            );
        }

        self.pacer.pause(self.settings.pre_login.sample());
        let session = self
            .service
            .login(credentials, true)
            .map_err(SessionError::Auth)?;
        info!(user = %session.username, "logged in");
        self.pacer.pause(self.settings.post_login.sample());

        Ok(ActiveSession {
            service: self.service,
            pacer: self.pacer,
            before_logout: self.settings.before_logout,
            session: Some(session),
        })
    }
}

/// A logged-in session; logs out on [`close`](Self::close) or drop.
pub struct ActiveSession<'a, S: RemoteService, P: Pacer> {
    service: &'a S,
    pacer: &'a P,
    before_logout: Duration,
    session: Option<Session>,
}

impl<S: RemoteService, P: Pacer> ActiveSession<'_, S, P> {
    pub fn upload_photo(&self, photo: &Path, caption: &str) -> Result<(), ServiceError> {
        match &self.session {
            Some(session) => self.service.upload_photo(session, photo, caption),
            None => Err(ServiceError::Protocol("session already closed".into())),
        }
    }

    /// Log out now. Failures are logged, never returned.
    pub fn close(mut self) {
        self.logout();
    }

    fn logout(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        self.pacer.pause(self.before_logout);
        match self.service.logout(&session) {
            Ok(()) => info!(user = %session.username, "logged out"),
            Err(e) => warn!(user = %session.username, error = %e, "logout failed"),
        }
    }
}

impl<S: RemoteService, P: Pacer> Drop for ActiveSession<'_, S, P> {
    fn drop(&mut self) {
        self.logout();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{MockService, RecordingPacer, ServiceCall, credentials};
    use tempfile::TempDir;

    fn settings(dir: &Path) -> SessionSettings {
        SessionSettings {
            session_dir: dir.to_path_buf(),
            pre_login: PacingWindow::fixed(Duration::from_secs(2)),
            post_login: PacingWindow::fixed(Duration::from_secs(3)),
            before_logout: Duration::from_secs(1),
        }
    }

    #[test]
    fn purge_removes_directory_tree() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("config");
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("nested/session.json"), "{}").unwrap();

        assert!(purge_stale_state(&dir).unwrap());
        assert!(!dir.exists());
    }

    #[test]
    fn purge_missing_directory_is_noop() {
        let tmp = TempDir::new().unwrap();
        assert!(!purge_stale_state(&tmp.path().join("config")).unwrap());
    }

    #[test]
    fn open_purges_paces_and_logs_in_sessionless() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("config");
        fs::create_dir_all(&dir).unwrap();
        let settings = settings(&dir);
        let service = MockService::new();
        let pacer = RecordingPacer::default();

        let session = SessionManager::new(&service, &pacer, &settings)
            .open(&credentials())
            .unwrap();

        assert!(!dir.exists());
        assert_eq!(service.calls(), vec![ServiceCall::Login { sessionless: true }]);
        assert_eq!(
            pacer.pauses(),
            vec![Duration::from_secs(2), Duration::from_secs(3)]
        );

        session.close();
        assert_eq!(service.logouts(), 1);
        assert_eq!(pacer.pauses().last(), Some(&Duration::from_secs(1)));
    }

    #[test]
    fn drop_logs_out_once() {
        let tmp = TempDir::new().unwrap();
        let settings = settings(&tmp.path().join("config"));
        let service = MockService::new();
        let pacer = RecordingPacer::default();

        {
            let session = SessionManager::new(&service, &pacer, &settings)
                .open(&credentials())
                .unwrap();
            session.upload_photo(Path::new("a.jpg"), "caption").unwrap();
        }
        assert_eq!(service.logouts(), 1);
    }

    #[test]
    fn rejected_login_is_auth_error_without_logout() {
        let tmp = TempDir::new().unwrap();
        let settings = settings(&tmp.path().join("config"));
        let service = MockService::new();
        service.push_login(Err(ServiceError::AuthRejected("bad password".into())));
        let pacer = RecordingPacer::default();

        let result = SessionManager::new(&service, &pacer, &settings).open(&credentials());

        assert!(matches!(
            result,
            Err(SessionError::Auth(ServiceError::AuthRejected(_)))
        ));
        assert_eq!(service.logouts(), 0);
    }

    #[test]
    fn logout_failure_is_swallowed() {
        let tmp = TempDir::new().unwrap();
        let settings = settings(&tmp.path().join("config"));
        let service = MockService::with_failing_logout();
        let pacer = RecordingPacer::default();

        let session = SessionManager::new(&service, &pacer, &settings)
            .open(&credentials())
            .unwrap();
        session.close();
        assert_eq!(service.logouts(), 1);
    }
}
