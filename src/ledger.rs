//! Append-only record of filenames that have already been posted.
//!
//! The ledger is a plain text file with one filename per line:
//!
//! ```text
//! 041-lighthouse.jpg
//! 042-harbour.png
//! ```
//!
//! It is the single source of truth for "already posted". Lines are only ever
//! appended; nothing rewrites, sorts or deduplicates the file. A ledger that
//! does not exist yet behaves exactly like an empty one.

use std::fs::{self, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("IO error on ledger {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Filename cannot be recorded (contains a line break): {0:?}")]
    InvalidName(String),
}

/// Handle on the ledger file. Cheap to construct; the file is only touched
/// by the methods below.
#[derive(Debug, Clone)]
pub struct UploadLedger {
    path: PathBuf,
}

impl UploadLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `true` iff `filename` appears as an exact line in the ledger.
    pub fn is_uploaded(&self, filename: &str) -> Result<bool, LedgerError> {
        Ok(self.entries()?.iter().any(|line| line == filename))
    }

    /// All recorded filenames, oldest first.
    pub fn entries(&self) -> Result<Vec<String>, LedgerError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };
        Ok(content
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Append `filename` as a new line.
    pub fn record_uploaded(&self, filename: &str) -> Result<(), LedgerError> {
        if filename.contains(['\n', '\r']) {
            return Err(LedgerError::InvalidName(filename.to_string()));
        }
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;

        // A hand-edited ledger may lack its trailing newline.
        let needs_separator = ends_without_newline(&mut file).map_err(|e| self.io_error(e))?;
        let line = if needs_separator {
            format!("\n{filename}\n")
        } else {
            format!("{filename}\n")
        };
        file.write_all(line.as_bytes())
            .and_then(|()| file.sync_data())
            .map_err(|e| self.io_error(e))
    }

    fn io_error(&self, source: io::Error) -> LedgerError {
        LedgerError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

fn ends_without_newline(file: &mut fs::File) -> io::Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::Start(len - 1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}
