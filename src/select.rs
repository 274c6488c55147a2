//! Watched-folder scanning and candidate selection.
//!
//! The selector looks at the top level of the watched folder only:
//!
//! ```text
//! UPLOADS/
//! ├── 043-fog.jpg          # newest, already in the ledger → skipped
//! ├── 042-harbour.png      # next newest, not uploaded    → selected
//! ├── 041-lighthouse.jpg   # older
//! ├── notes.txt            # not an image → ignored
//! └── drafts/              # directories → ignored
//! ```
//!
//! Candidates are ordered by modification time, newest first. Files with the
//! same timestamp are ordered by name so a run is reproducible.
//!
//! Scanning is read-only. A missing folder is reported as
//! [`SelectError::FolderMissing`] so the caller can tell "nothing to post"
//! apart from "misconfigured path".

use crate::ledger::{LedgerError, UploadLedger};
use crate::naming;
use std::cmp::Reverse;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SelectError {
    #[error("Watched folder does not exist: {0}")]
    FolderMissing(PathBuf),
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// An image file eligible for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Bare file name; this is what the ledger records.
    pub filename: String,
    /// Full path inside the watched folder.
    pub path: PathBuf,
    pub modified: SystemTime,
    /// Lowercased extension (`jpg`, `jpeg` or `png`).
    pub extension: String,
}

/// List every candidate image in `folder`, newest first.
pub fn list_candidates(folder: &Path) -> Result<Vec<Candidate>, SelectError> {
    if !folder.exists() {
        return Err(SelectError::FolderMissing(folder.to_path_buf()));
    }
    if !folder.is_dir() {
        return Err(SelectError::NotADirectory(folder.to_path_buf()));
    }

    let mut candidates = Vec::new();
    for entry in fs::read_dir(folder)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(folder = %folder.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        let path = entry.path();
        if !naming::is_candidate_image(&path) {
            continue;
        }
        // Follows symlinks, unlike `DirEntry::metadata`. A dangling link or a
        // file deleted mid-scan is skipped, not fatal.
        let (metadata, modified) = match fs::metadata(&path).and_then(|m| {
            let modified = m.modified()?;
            Ok((m, modified))
        }) {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable file");
                continue;
            }
        };
        if !metadata.is_file() {
            continue;
        }
        let Some(filename) = path.file_name().and_then(|n| n.to_str()).map(str::to_string)
        else {
            tracing::warn!(path = %path.display(), "skipping file with non UTF-8 name");
            continue;
        };
        candidates.push(Candidate {
            extension: naming::extension_of(&path).unwrap_or_default(),
            modified,
            filename,
            path,
        });
    }

    candidates.sort_by(|a, b| {
        (Reverse(a.modified), &a.filename).cmp(&(Reverse(b.modified), &b.filename))
    });
    Ok(candidates)
}

/// Pick the newest candidate that the ledger has not seen.
///
/// `Ok(None)` when the folder is empty, holds no images, or everything in it
/// has been posted already.
pub fn select_candidate(
    folder: &Path,
    ledger: &UploadLedger,
) -> Result<Option<Candidate>, SelectError> {
    let uploaded = ledger.entries()?;
    let candidates = list_candidates(folder)?;
    let total = candidates.len();

    let selected = candidates
        .into_iter()
        .find(|c| !uploaded.iter().any(|u| u == &c.filename));

    match &selected {
        Some(c) => tracing::debug!(file = %c.filename, total, "selected candidate"),
        None => tracing::debug!(total, "no unposted candidate"),
    }
    Ok(selected)
}

/// A listed candidate and whether the ledger already has it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyEntry {
    pub candidate: Candidate,
    pub uploaded: bool,
}

/// Every candidate in `folder`, newest first, marked against the ledger.
///
/// Read-only counterpart of [`select_candidate`] for dry runs: the first
/// entry with `uploaded == false` is what a run would pick.
pub fn survey(folder: &Path, ledger: &UploadLedger) -> Result<Vec<SurveyEntry>, SelectError> {
    let uploaded = ledger.entries()?;
    Ok(list_candidates(folder)?
        .into_iter()
        .map(|candidate| SurveyEntry {
            uploaded: uploaded.iter().any(|u| u == &candidate.filename),
            candidate,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{set_age, write_test_jpeg};
    use tempfile::TempDir;

    fn folder_with(files: &[(&str, u64)]) -> TempDir {
        let tmp = TempDir::new().unwrap();
        for (name, age_secs) in files {
            let path = tmp.path().join(name);
            fs::write(&path, "fake image").unwrap();
            set_age(&path, *age_secs);
        }
        tmp
    }

    fn names(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.filename.as_str()).collect()
    }

    #[test]
    fn missing_folder_is_reported() {
        let tmp = TempDir::new().unwrap();
        let err = list_candidates(&tmp.path().join("UPLOADS")).unwrap_err();
        assert!(matches!(err, SelectError::FolderMissing(_)));
    }

    #[test]
    fn file_instead_of_folder_is_reported() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("UPLOADS");
        fs::write(&path, "oops").unwrap();
        assert!(matches!(
            list_candidates(&path).unwrap_err(),
            SelectError::NotADirectory(_)
        ));
    }

    #[test]
    fn lists_newest_first() {
        let tmp = folder_with(&[("old.jpg", 300), ("new.png", 10), ("mid.jpeg", 100)]);
        let found = list_candidates(tmp.path()).unwrap();
        assert_eq!(names(&found), vec!["new.png", "mid.jpeg", "old.jpg"]);
    }

    #[test]
    fn ignores_non_images_hidden_files_and_directories() {
        let tmp = folder_with(&[
            ("photo.JPG", 10),
            ("notes.txt", 5),
            (".cache.jpg", 1),
            ("clip.mp4", 2),
        ]);
        fs::create_dir(tmp.path().join("drafts.jpg")).unwrap();

        let found = list_candidates(tmp.path()).unwrap();
        assert_eq!(names(&found), vec!["photo.JPG"]);
        assert_eq!(found[0].extension, "jpg");
    }

    #[test]
    fn equal_mtimes_ordered_by_name() {
        let tmp = folder_with(&[("b.jpg", 50), ("a.jpg", 50), ("c.jpg", 50)]);
        let found = list_candidates(tmp.path()).unwrap();
        assert_eq!(names(&found), vec!["a.jpg", "b.jpg", "c.jpg"]);
    }

    #[test]
    fn selects_newest_unposted() {
        let tmp = folder_with(&[("fog.jpg", 10), ("harbour.png", 20), ("light.jpg", 30)]);
        let ledger = UploadLedger::new(tmp.path().join("ledger.txt"));
        ledger.record_uploaded("fog.jpg").unwrap();

        let picked = select_candidate(tmp.path(), &ledger).unwrap().unwrap();
        assert_eq!(picked.filename, "harbour.png");
        assert_eq!(picked.path, tmp.path().join("harbour.png"));
    }

    #[test]
    fn never_selects_recorded_files() {
        let tmp = folder_with(&[("a.jpg", 1), ("b.jpg", 2), ("c.jpg", 3), ("d.jpg", 4)]);
        let ledger = UploadLedger::new(tmp.path().join("ledger.txt"));

        let mut picked = Vec::new();
        while let Some(c) = select_candidate(tmp.path(), &ledger).unwrap() {
            assert!(!ledger.is_uploaded(&c.filename).unwrap());
            ledger.record_uploaded(&c.filename).unwrap();
            picked.push(c.filename);
        }
        assert_eq!(picked, vec!["a.jpg", "b.jpg", "c.jpg", "d.jpg"]);
    }

    #[test]
    fn all_uploaded_is_none() {
        let tmp = folder_with(&[("a.jpg", 1)]);
        let ledger = UploadLedger::new(tmp.path().join("ledger.txt"));
        ledger.record_uploaded("a.jpg").unwrap();

        assert_eq!(select_candidate(tmp.path(), &ledger).unwrap(), None);
    }

    #[test]
    fn empty_folder_is_none() {
        let tmp = TempDir::new().unwrap();
        let ledger = UploadLedger::new(tmp.path().join("ledger.txt"));
        assert_eq!(select_candidate(tmp.path(), &ledger).unwrap(), None);
    }

    #[test]
    fn real_image_is_listed() {
        let tmp = TempDir::new().unwrap();
        write_test_jpeg(&tmp.path().join("real.jpg"), 20, 20);
        let found = list_candidates(tmp.path()).unwrap();
        assert_eq!(names(&found), vec!["real.jpg"]);
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_is_skipped() {
        let tmp = folder_with(&[("good.jpg", 10)]);
        std::os::unix::fs::symlink(tmp.path().join("gone.jpg"), tmp.path().join("stale.jpg"))
            .unwrap();

        let found = list_candidates(tmp.path()).unwrap();
        assert_eq!(names(&found), vec!["good.jpg"]);

        let ledger = UploadLedger::new(tmp.path().join("ledger.txt"));
        let picked = select_candidate(tmp.path(), &ledger).unwrap().unwrap();
        assert_eq!(picked.filename, "good.jpg");
    }

    #[test]
    fn survey_marks_uploaded_and_agrees_with_selection() {
        let tmp = folder_with(&[("fog.jpg", 10), ("harbour.png", 20)]);
        let ledger = UploadLedger::new(tmp.path().join("ledger.txt"));
        ledger.record_uploaded("fog.jpg").unwrap();

        let entries = survey(tmp.path(), &ledger).unwrap();
        let marks: Vec<(&str, bool)> = entries
            .iter()
            .map(|e| (e.candidate.filename.as_str(), e.uploaded))
            .collect();
        assert_eq!(marks, vec![("fog.jpg", true), ("harbour.png", false)]);

        let first_open = entries.iter().find(|e| !e.uploaded).map(|e| &e.candidate);
        assert_eq!(first_open, select_candidate(tmp.path(), &ledger).unwrap().as_ref());
    }
}
