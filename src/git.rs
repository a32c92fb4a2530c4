//! Git repository helpers for the local store backend.
//!
//! This module wraps the few libgit2 operations eventops needs:
//! - Repository discovery and validation
//! - Blob ids for file contents (the store's revision token)
//! - Staging a file and committing it on HEAD

use std::path::{Path, PathBuf};

use git2::{ErrorCode, ObjectType, Oid, Repository, Signature};

use crate::error::{Error, Result};

const FALLBACK_NAME: &str = "eventops";
const FALLBACK_EMAIL: &str = "eventops@localhost";

/// Discover a git repository from a starting path.
pub fn discover_repo(start: &Path) -> Result<Repository> {
    Repository::discover(start).map_err(|err| {
        if err.code() == ErrorCode::NotFound {
            Error::InvalidArgument(format!("not a git repository: {}", start.display()))
        } else {
            Error::Git(err)
        }
    })
}

/// Open a repository and validate it is a non-bare checkout.
pub fn open_repo(start: &Path) -> Result<Repository> {
    let repo = discover_repo(start)?;
    if repo.is_bare() {
        return Err(Error::InvalidArgument(
            "bare repositories are not supported".to_string(),
        ));
    }
    Ok(repo)
}

/// Return the repository workdir (root of the working tree).
pub fn workdir(repo: &Repository) -> Result<PathBuf> {
    repo.workdir()
        .map(|path| path.to_path_buf())
        .ok_or_else(|| Error::OperationFailed("repository has no working directory".to_string()))
}

/// Git blob id of `data`, as hex.
///
/// This is the same value the GitHub Contents API reports as a file's `sha`.
pub fn blob_sha(data: &[u8]) -> Result<String> {
    Ok(Oid::hash_object(ObjectType::Blob, data)?.to_string())
}

/// Stage `rel_path` (relative to the workdir) and commit it on HEAD.
///
/// Works on an unborn branch by creating the root commit.
pub fn commit_path(repo: &Repository, rel_path: &Path, message: &str) -> Result<Oid> {
    let mut index = repo.index()?;
    index.add_path(rel_path)?;
    index.write()?;

    let tree_oid = index.write_tree()?;
    let tree = repo.find_tree(tree_oid)?;

    let parents = match repo.head() {
        Ok(head) => vec![head.peel_to_commit()?],
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            vec![]
        }
        Err(e) => return Err(Error::Git(e)),
    };
    let parent_refs: Vec<&git2::Commit> = parents.iter().collect();

    let signature = signature(repo)?;
    let oid = repo.commit(
        Some("HEAD"),
        &signature,
        &signature,
        message,
        &tree,
        &parent_refs,
    )?;

    tracing::debug!(commit = %oid, path = %rel_path.display(), "committed store file");
    Ok(oid)
}

fn signature(repo: &Repository) -> Result<Signature<'static>> {
    match repo.signature() {
        Ok(sig) => Ok(sig.to_owned()),
        Err(_) => Ok(Signature::now(FALLBACK_NAME, FALLBACK_EMAIL)?),
    }
}
