//! The bearer token persisted between CLI invocations.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::CliError;

/// A single-line file holding the current access token.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored token, or `None` when the file is missing or blank.
    pub fn load(&self) -> Result<Option<String>, CliError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(self.file_error(source)),
        }
    }

    /// The stored token, or `NotLoggedIn`.
    pub fn require(&self) -> Result<String, CliError> {
        self.load()?.ok_or(CliError::NotLoggedIn)
    }

    pub fn save(&self, token: &str) -> Result<(), CliError> {
        fs::write(&self.path, format!("{token}\n")).map_err(|source| self.file_error(source))?;
        debug!(path = %self.path.display(), "token saved");
        Ok(())
    }

    /// Remove the token file. Returns whether there was one.
    pub fn clear(&self) -> Result<bool, CliError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "token cleared");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(self.file_error(source)),
        }
    }

    fn file_error(&self, source: std::io::Error) -> CliError {
        CliError::TokenFile {
            path: self.path.clone(),
            source,
        }
    }
}
