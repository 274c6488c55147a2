//! Shared test utilities for the daily-post test suite.
//!
//! Provides image fixtures written on the fly, file age control, and
//! scripted stand-ins for the pipeline's seams (`RemoteService`, `Pacer`,
//! `Clock`).
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! write_test_jpeg(&tmp.path().join("a.jpg"), 100, 100);
//! set_age(&tmp.path().join("a.jpg"), 3600);
//!
//! let service = MockService::new();
//! service.push_upload(Err(transient()));
//! ```

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{NaiveDate, NaiveDateTime};

use crate::caption::Clock;
use crate::credentials::Credentials;
use crate::pacing::Pacer;
use crate::service::{RemoteService, ServiceError, Session};

// =========================================================================
// Image fixtures
// =========================================================================

/// Write a gradient RGB JPEG of the given size.
pub fn write_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    img.save(path).unwrap();
}

/// Write a half-transparent RGBA PNG of the given size.
pub fn write_test_png_rgba(path: &Path, width: u32, height: u32) {
    let img = image::RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x % 256) as u8, (y % 256) as u8, 200, 128])
    });
    img.save(path).unwrap();
}

/// Set a file's modification time to `secs` seconds ago.
pub fn set_age(path: &Path, secs: u64) {
    let file = std::fs::File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() - Duration::from_secs(secs))
        .unwrap();
}

// =========================================================================
// Seams
// =========================================================================

pub fn credentials() -> Credentials {
    Credentials::new("songbird", "hunter2")
}

/// A 503, which the pipeline treats as transient.
pub fn transient() -> ServiceError {
    ServiceError::Status {
        status: 503,
        message: "try later".into(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceCall {
    Login { sessionless: bool },
    Upload {
        photo: PathBuf,
        caption: String,
        /// Whether the photo existed on disk when the upload was attempted.
        existed: bool,
    },
    Logout,
}

/// Scripted remote service.
///
/// Queued results are consumed in order; once a queue is empty every call
/// succeeds.
#[derive(Default)]
pub struct MockService {
    login_results: RefCell<VecDeque<Result<(), ServiceError>>>,
    upload_results: RefCell<VecDeque<Result<(), ServiceError>>>,
    fail_logout: bool,
    calls: RefCell<Vec<ServiceCall>>,
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failing_logout() -> Self {
        Self {
            fail_logout: true,
            ..Self::default()
        }
    }

    pub fn push_login(&self, result: Result<(), ServiceError>) {
        self.login_results.borrow_mut().push_back(result);
    }

    pub fn push_upload(&self, result: Result<(), ServiceError>) {
        self.upload_results.borrow_mut().push_back(result);
    }

    pub fn calls(&self) -> Vec<ServiceCall> {
        self.calls.borrow().clone()
    }

    pub fn upload_attempts(&self) -> usize {
        self.count(|c| matches!(c, ServiceCall::Upload { .. }))
    }

    pub fn logouts(&self) -> usize {
        self.count(|c| matches!(c, ServiceCall::Logout))
    }

    fn count(&self, pred: impl Fn(&ServiceCall) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }
}

impl RemoteService for MockService {
    fn login(&self, credentials: &Credentials, sessionless: bool) -> Result<Session, ServiceError> {
        self.calls
            .borrow_mut()
            .push(ServiceCall::Login { sessionless });
        self.login_results
            .borrow_mut()
            .pop_front()
            .unwrap_or(Ok(()))?;
        Ok(Session {
            username: credentials.username.clone(),
            token: "mock-token".into(),
        })
    }

    fn upload_photo(
        &self,
        _session: &Session,
        photo: &Path,
        caption: &str,
    ) -> Result<(), ServiceError> {
        self.calls.borrow_mut().push(ServiceCall::Upload {
            photo: photo.to_path_buf(),
            caption: caption.to_string(),
            existed: photo.exists(),
        });
        self.upload_results
            .borrow_mut()
            .pop_front()
            .unwrap_or(Ok(()))
    }

    fn logout(&self, _session: &Session) -> Result<(), ServiceError> {
        self.calls.borrow_mut().push(ServiceCall::Logout);
        if self.fail_logout {
            return Err(ServiceError::Protocol("mock logout failure".into()));
        }
        Ok(())
    }
}

/// Records pauses instead of sleeping.
#[derive(Default)]
pub struct RecordingPacer {
    pauses: RefCell<Vec<Duration>>,
}

impl RecordingPacer {
    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.borrow().clone()
    }
}

impl Pacer for RecordingPacer {
    fn pause(&self, duration: Duration) {
        self.pauses.borrow_mut().push(duration);
    }
}

/// Clock frozen at a fixed local time.
pub struct FixedClock(pub NaiveDateTime);

impl FixedClock {
    pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Self {
        Self(
            NaiveDate::from_ymd_opt(year, month, day)
                .unwrap()
                .and_hms_opt(hour, minute, 0)
                .unwrap(),
        )
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
