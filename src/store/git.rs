//! Local git checkout backend.
//!
//! Files are read from the working tree and every write becomes a commit on
//! HEAD. The revision token is the blob id of the file contents, the same
//! value GitHub hands out, so both backends behave alike.

use std::fs;
use std::path::{Path, PathBuf};

use git2::Repository;

use super::{ContentStore, StoredFile};
use crate::error::{Error, Result};
use crate::git;
use crate::lock::{write_atomic, FileLock};

const LOCK_FILE: &str = "eventops.lock";

pub struct GitStore {
    repo: Repository,
    workdir: PathBuf,
    lock_path: PathBuf,
    lock_timeout_ms: u64,
}

impl GitStore {
    pub fn open(path: &Path, lock_timeout_ms: u64) -> Result<Self> {
        let repo = git::open_repo(path)?;
        let workdir = git::workdir(&repo)?;
        let lock_path = repo.path().join(LOCK_FILE);
        Ok(Self {
            repo,
            workdir,
            lock_path,
            lock_timeout_ms,
        })
    }

    fn current(&self, path: &str) -> Result<Option<StoredFile>> {
        let full = self.workdir.join(path);
        if !full.is_file() {
            return Ok(None);
        }
        let bytes = fs::read(&full)?;
        let sha = git::blob_sha(&bytes)?;
        let text = String::from_utf8(bytes)
            .map_err(|err| Error::Decode(format!("{path}: {err}")))?;
        Ok(Some(StoredFile { text, sha }))
    }
}

impl ContentStore for GitStore {
    fn read(&self, path: &str) -> Result<Option<StoredFile>> {
        let file = self.current(path)?;
        tracing::debug!(path, found = file.is_some(), "read file from git store");
        Ok(file)
    }

    fn write(&self, path: &str, text: &str, sha: Option<&str>, message: &str) -> Result<String> {
        let _lock = FileLock::acquire(&self.lock_path, self.lock_timeout_ms)?;

        let current = self.current(path)?;
        let current_sha = current.as_ref().map(|file| file.sha.as_str());
        if current_sha != sha {
            tracing::warn!(
                path,
                expected = sha.unwrap_or("<none>"),
                actual = current_sha.unwrap_or("<none>"),
                "rejecting stale write"
            );
            return Err(Error::RevisionConflict(path.to_string()));
        }

        write_atomic(self.workdir.join(path), text.as_bytes())?;
        git::commit_path(&self.repo, Path::new(path), message)?;

        let new_sha = git::blob_sha(text.as_bytes())?;
        tracing::info!(path, sha = %new_sha, message, "wrote file to git store");
        Ok(new_sha)
    }

    fn describe(&self) -> String {
        format!("git:{}", self.workdir.display())
    }
}
