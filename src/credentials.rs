//! Account credentials loaded from a `key=value` file.
//!
//! ```text
//! # daily-post login
//! username=harbour.lights
//! password=correct horse battery staple
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. Keys and values are
//! trimmed; everything after the first `=` is the value, so passwords may
//! contain `=`. Unknown keys are tolerated.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CredentialsError {
    #[error("Credentials file not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error reading credentials: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed credentials line {line}: expected key=value")]
    Malformed { line: usize },
    #[error("Credentials file is missing a value for '{0}'")]
    MissingKey(&'static str),
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Read and parse a credentials file.
    pub fn load(path: &Path) -> Result<Self, CredentialsError> {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(CredentialsError::NotFound(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        Self::parse(&content)
    }

    /// Parse `key=value` content. Both `username` and `password` must be
    /// present and non-empty.
    pub fn parse(content: &str) -> Result<Self, CredentialsError> {
        let mut values: HashMap<&str, &str> = HashMap::new();
        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, value) = line
                .split_once('=')
                .ok_or(CredentialsError::Malformed { line: idx + 1 })?;
            values.insert(key.trim(), value.trim());
        }

        let take = |key: &'static str| -> Result<String, CredentialsError> {
            values
                .get(key)
                .filter(|v| !v.is_empty())
                .map(|v| v.to_string())
                .ok_or(CredentialsError::MissingKey(key))
        };

        Ok(Self {
            username: take("username")?,
            password: take("password")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parses_username_and_password() {
        let creds = Credentials::parse("username=harbour\npassword=s3cret\n").unwrap();
        assert_eq!(creds, Credentials::new("harbour", "s3cret"));
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let content = "# account\n\nusername = harbour \n\n# pw below\npassword= s3cret\n";
        let creds = Credentials::parse(content).unwrap();
        assert_eq!(creds.username, "harbour");
        assert_eq!(creds.password, "s3cret");
    }

    #[test]
    fn value_may_contain_equals() {
        let creds = Credentials::parse("username=a\npassword=x=y==\n").unwrap();
        assert_eq!(creds.password, "x=y==");
    }

    #[test]
    fn missing_password_is_reported() {
        let err = Credentials::parse("username=a\n").unwrap_err();
        assert!(matches!(err, CredentialsError::MissingKey("password")));
    }

    #[test]
    fn empty_username_is_missing() {
        let err = Credentials::parse("username=\npassword=x\n").unwrap_err();
        assert!(matches!(err, CredentialsError::MissingKey("username")));
    }

    #[test]
    fn line_without_separator_is_malformed() {
        let err = Credentials::parse("username=a\njust some text\npassword=b").unwrap_err();
        assert!(matches!(err, CredentialsError::Malformed { line: 2 }));
    }

    #[test]
    fn missing_file_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = Credentials::load(&tmp.path().join("login.txt")).unwrap_err();
        assert!(matches!(err, CredentialsError::NotFound(_)));
    }

    #[test]
    fn load_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("login.txt");
        fs::write(&path, "username=a\npassword=b\n").unwrap();
        assert_eq!(Credentials::load(&path).unwrap(), Credentials::new("a", "b"));
    }

    #[test]
    fn debug_redacts_password() {
        let creds = Credentials::new("harbour", "s3cret");
        let shown = format!("{creds:?}");
        assert!(shown.contains("harbour"));
        assert!(!shown.contains("s3cret"));
    }
}
