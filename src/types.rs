//! Types describing one pipeline run.
//!
//! A run always resolves to a [`RunReport`]; errors inside a run become a
//! [`RunOutcome::Failed`] tagged with the [`Stage`] that produced them.

use std::fmt;
use std::path::PathBuf;

/// Pipeline stages, in execution order.
///
/// Any stage may jump to `Cleanup` on failure; `Cleanup` always precedes
/// `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    FolderCheck,
    Selecting,
    Normalizing,
    Authenticating,
    Uploading,
    Recording,
    Cleanup,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::FolderCheck => "folder check",
            Stage::Selecting => "selecting",
            Stage::Normalizing => "normalizing",
            Stage::Authenticating => "authenticating",
            Stage::Uploading => "uploading",
            Stage::Recording => "recording",
            Stage::Cleanup => "cleanup",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The watched folder was missing and has just been created.
    FolderCreated,
    /// Every image in the folder is already in the ledger.
    NothingToUpload,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::FolderCreated => f.write_str("watch folder was missing and has been created"),
            SkipReason::NothingToUpload => f.write_str("nothing new to upload"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Posted and recorded under the original filename.
    Succeeded { filename: String },
    Skipped(SkipReason),
    Failed { stage: Stage, reason: String },
}

impl RunOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, RunOutcome::Failed { .. })
    }
}

/// Everything a caller needs to know about one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub outcome: RunOutcome,
    /// Original filename of the selected image, if one was selected.
    pub candidate: Option<String>,
    /// The file actually sent (the original or a normalized artifact).
    pub upload_path: Option<PathBuf>,
    /// Upload attempts made; zero if the run never reached uploading.
    pub attempts: u32,
    /// Generated artifacts deleted during cleanup.
    pub removed_artifacts: Vec<PathBuf>,
}

impl RunReport {
    pub fn new(outcome: RunOutcome) -> Self {
        Self {
            outcome,
            candidate: None,
            upload_path: None,
            attempts: 0,
            removed_artifacts: Vec::new(),
        }
    }
}
