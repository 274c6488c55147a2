//! The daily upload run.
//!
//! [`Pipeline::run_once`] drives one pass through the stages:
//!
//! ```text
//! FolderCheck → Selecting → Normalizing → Authenticating → Uploading → Recording
//!      │            │            │               │              │           │
//!      └────────────┴────────────┴───────────────┴──────────────┴───────────┴──→ Cleanup → Done
//! ```
//!
//! Every path ends in `Cleanup`: the session is closed (best-effort) and each
//! generated artifact that is not the original file is deleted. The ledger
//! records the *original* filename, and only after a successful upload.
//!
//! Nothing escapes `run_once` as an error; failures are reported as
//! [`RunOutcome::Failed`] with the stage that produced them.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::caption::{Clock, render_caption};
use crate::credentials::Credentials;
use crate::imaging::{self, AspectEnvelope, ImageBackend, Quality};
use crate::ledger::UploadLedger;
use crate::pacing::Pacer;
use crate::retry::RetryPolicy;
use crate::select::{Candidate, select_candidate};
use crate::service::{RemoteService, ServiceError};
use crate::session::{SessionManager, SessionSettings, purge_stale_state};
use crate::types::{RunOutcome, RunReport, SkipReason, Stage};

/// Resolved knobs for a run. Built from [`AppConfig`](crate::config::AppConfig).
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub watch_folder: PathBuf,
    pub ledger_path: PathBuf,
    pub quality: Quality,
    pub envelope: AspectEnvelope,
    pub caption_template: String,
    pub date_format: String,
    pub retry: RetryPolicy,
    pub session: SessionSettings,
}

/// Generated files to delete when the run ends.
///
/// The original upload candidate is never deleted, even if it was
/// registered.
#[derive(Debug)]
pub struct Artifacts {
    original: PathBuf,
    paths: Vec<PathBuf>,
}

impl Artifacts {
    pub fn new(original: impl Into<PathBuf>) -> Self {
        Self {
            original: original.into(),
            paths: Vec::new(),
        }
    }

    pub fn register(&mut self, path: &Path) {
        if !self.paths.iter().any(|p| p == path) {
            self.paths.push(path.to_path_buf());
        }
    }

    /// Delete every registered artifact and return those actually removed.
    ///
    /// Missing files are skipped; other errors are logged and ignored.
    pub fn remove_all(&mut self) -> Vec<PathBuf> {
        let mut removed = Vec::new();
        for path in self.paths.drain(..) {
            if path == self.original {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => {
                    debug!(file = %path.display(), "removed artifact");
                    removed.push(path);
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!(file = %path.display(), error = %e, "could not remove artifact"),
            }
        }
        removed
    }
}

impl Drop for Artifacts {
    fn drop(&mut self) {
        self.remove_all();
    }
}

struct StageFailure {
    stage: Stage,
    reason: String,
}

impl StageFailure {
    fn new(stage: Stage, reason: impl ToString) -> Self {
        Self {
            stage,
            reason: reason.to_string(),
        }
    }
}

pub struct Pipeline<B, S, P, C> {
    settings: PipelineSettings,
    credentials: Credentials,
    backend: B,
    service: S,
    pacer: P,
    clock: C,
}

impl<B, S, P, C> Pipeline<B, S, P, C>
where
    B: ImageBackend,
    S: RemoteService,
    P: Pacer,
    C: Clock,
{
    pub fn new(
        settings: PipelineSettings,
        credentials: Credentials,
        backend: B,
        service: S,
        pacer: P,
        clock: C,
    ) -> Self {
        Self {
            settings,
            credentials,
            backend,
            service,
            pacer,
            clock,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Execute one run. Always returns a report; never panics on IO.
    pub fn run_once(&self) -> RunReport {
        let mut report = RunReport::new(RunOutcome::Skipped(SkipReason::NothingToUpload));
        let mut artifacts: Option<Artifacts> = None;

        let outcome = match self.execute(&mut report, &mut artifacts) {
            Ok(outcome) => outcome,
            Err(failure) => {
                warn!(stage = %failure.stage, reason = %failure.reason, "run failed");
                RunOutcome::Failed {
                    stage: failure.stage,
                    reason: failure.reason,
                }
            }
        };

        debug!(stage = %Stage::Cleanup, "entering stage");
        if let Some(mut artifacts) = artifacts {
            report.removed_artifacts = artifacts.remove_all();
        }
        report.outcome = outcome;
        debug!(stage = %Stage::Done, "run finished");
        report
    }

    fn execute(
        &self,
        report: &mut RunReport,
        artifacts: &mut Option<Artifacts>,
    ) -> Result<RunOutcome, StageFailure> {
        let session_dir = &self.settings.session.session_dir;
        if let Err(e) = purge_stale_state(session_dir) {
            warn!(dir = %session_dir.display(), error = %e, "could not purge stale session state");
        }

        debug!(stage = %Stage::FolderCheck, "entering stage");
        let folder = &self.settings.watch_folder;
        if !folder.exists() {
            fs::create_dir_all(folder).map_err(|e| {
                StageFailure::new(
                    Stage::FolderCheck,
                    format!("could not create {}: {e}", folder.display()),
                )
            })?;
            info!(folder = %folder.display(), "created missing watch folder");
            return Ok(RunOutcome::Skipped(SkipReason::FolderCreated));
        }

        debug!(stage = %Stage::Selecting, "entering stage");
        let ledger = UploadLedger::new(&self.settings.ledger_path);
        let Some(candidate) = select_candidate(folder, &ledger)
            .map_err(|e| StageFailure::new(Stage::Selecting, e))?
        else {
            info!(folder = %folder.display(), "nothing new to upload");
            return Ok(RunOutcome::Skipped(SkipReason::NothingToUpload));
        };
        info!(file = %candidate.filename, "selected image");
        report.candidate = Some(candidate.filename.clone());

        debug!(stage = %Stage::Normalizing, "entering stage");
        let generated = artifacts.insert(Artifacts::new(&candidate.path));
        let upload_path = self
            .normalize(&candidate, generated)
            .map_err(|e| StageFailure::new(Stage::Normalizing, e))?;
        report.upload_path = Some(upload_path.clone());

        // The caption belongs to the prepared post, so it fails before login.
        let caption = render_caption(
            &self.settings.caption_template,
            self.clock.today(),
            &self.settings.date_format,
        )
        .map_err(|e| StageFailure::new(Stage::Normalizing, format!("caption: {e}")))?;

        debug!(stage = %Stage::Authenticating, "entering stage");
        let session = SessionManager::new(&self.service, &self.pacer, &self.settings.session)
            .open(&self.credentials)
            .map_err(|e| StageFailure::new(Stage::Authenticating, e))?;

        debug!(stage = %Stage::Uploading, "entering stage");
        let result = self.settings.retry.run(
            &self.pacer,
            |attempt| {
                report.attempts = attempt;
                info!(file = %upload_path.display(), attempt, "uploading");
                session.upload_photo(&upload_path, &caption)
            },
            ServiceError::is_transient,
        );
        if let Err(failure) = result {
            return Err(StageFailure::new(
                Stage::Uploading,
                format!(
                    "gave up after {} attempt(s): {}",
                    failure.attempts, failure.error
                ),
            ));
        }
        info!(file = %candidate.filename, caption = %caption, "uploaded");

        debug!(stage = %Stage::Recording, "entering stage");
        ledger
            .record_uploaded(&candidate.filename)
            .map_err(|e| StageFailure::new(Stage::Recording, e))?;

        session.close();
        Ok(RunOutcome::Succeeded {
            filename: candidate.filename,
        })
    }

    /// Convert to canonical format, then correct the aspect ratio.
    fn normalize(
        &self,
        candidate: &Candidate,
        artifacts: &mut Artifacts,
    ) -> imaging::operations::Result<PathBuf> {
        let converted = imaging::convert_to_canonical(
            &self.backend,
            &candidate.path,
            self.settings.quality,
            |p| artifacts.register(p),
        )?;
        imaging::correct_aspect(
            &self.backend,
            &converted,
            self.settings.envelope,
            self.settings.quality,
            |p| artifacts.register(p),
        )
    }
}
