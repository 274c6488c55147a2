//! The remote posting service.
//!
//! The pipeline only talks to the service through [`RemoteService`], so the
//! concrete client is swappable. [`HttpService`] is the bundled
//! implementation; tests use scripted fakes.

pub mod client;
pub mod error;
pub mod types;

pub use client::HttpService;
pub use error::ServiceError;
pub use types::Session;

use crate::credentials::Credentials;
use std::path::Path;

/// Capability exposed by the remote service.
pub trait RemoteService {
    /// Authenticate. With `sessionless` set, the client must not persist any
    /// session state to disk.
    fn login(&self, credentials: &Credentials, sessionless: bool) -> Result<Session, ServiceError>;

    /// Post one photo with its caption.
    fn upload_photo(&self, session: &Session, photo: &Path, caption: &str)
    -> Result<(), ServiceError>;

    fn logout(&self, session: &Session) -> Result<(), ServiceError>;
}

impl<T: RemoteService + ?Sized> RemoteService for &T {
    fn login(&self, credentials: &Credentials, sessionless: bool) -> Result<Session, ServiceError> {
        (**self).login(credentials, sessionless)
    }

    fn upload_photo(
        &self,
        session: &Session,
        photo: &Path,
        caption: &str,
    ) -> Result<(), ServiceError> {
        (**self).upload_photo(session, photo, caption)
    }

    fn logout(&self, session: &Session) -> Result<(), ServiceError> {
        (**self).logout(session)
    }
}
