use std::fs;
use std::path::PathBuf;

use crate::codec;
use crate::error::{Error, IoResultExt, Result};
use crate::hash::Hash;
use crate::repo::Repo;

/// HEAD's two possible states (see spec Design Notes: "Duplicated HEAD handling")
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadState {
    OnBranch(String),
    Detached(Hash),
}

const MAX_INDIRECTION: usize = 32;

/// read the raw content of a reference file, relative to `.git/`, with the
/// single trailing newline stripped
fn read_ref_raw(repo: &Repo, path: &str) -> Result<String> {
    let full = repo.gitdir().join(path);
    let content = fs::read_to_string(&full).with_path(&full)?;
    Ok(content.strip_suffix('\n').unwrap_or(&content).to_string())
}

/// resolve a reference file (given relative to `.git/`) to a final value.
///
/// when `dereference` is true, follows `ref: <path>` chains to either a
/// 40-char hex hash or a dead end; when false, a single read is returned
/// verbatim (used to inspect whether HEAD is itself a symbolic ref).
pub fn resolve(repo: &Repo, path: &str, dereference: bool) -> Result<String> {
    let content = read_ref_raw(repo, path)?;

    if !dereference {
        return Ok(content);
    }

    let mut current = content;
    for _ in 0..MAX_INDIRECTION {
        match current.strip_prefix("ref: ") {
            Some(rel) => current = read_ref_raw(repo, rel)?,
            None => return Ok(current),
        }
    }
    Err(Error::malformed(
        "reference resolution",
        format!("indirection depth exceeded starting at {}", path),
    ))
}

/// dereferenced HEAD: the commit hash it currently points at
pub fn head_hash(repo: &Repo) -> Result<Hash> {
    let hex = resolve(repo, "HEAD", true)?;
    Hash::from_hex(&hex)
}

/// dereferenced HEAD, tolerating a repository with no commits yet
pub fn head_hash_opt(repo: &Repo) -> Result<Option<Hash>> {
    match head_hash(repo) {
        Ok(h) => Ok(Some(h)),
        Err(Error::Io { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// raw content of HEAD, without following `ref:` indirection
pub fn head_ref(repo: &Repo) -> Result<String> {
    resolve(repo, "HEAD", false)
}

/// the branch HEAD is on, or `None` if detached
pub fn current_branch(repo: &Repo) -> Result<Option<String>> {
    let raw = head_ref(repo)?;
    Ok(raw
        .strip_prefix("ref: refs/heads/")
        .map(|s| s.to_string()))
}

/// sum-typed view of HEAD
pub fn read_head(repo: &Repo) -> Result<HeadState> {
    match current_branch(repo)? {
        Some(branch) => Ok(HeadState::OnBranch(branch)),
        None => Ok(HeadState::Detached(head_hash(repo)?)),
    }
}

/// point HEAD at a branch (`ref: refs/heads/<name>\n`)
pub fn set_head_to_branch(repo: &Repo, name: &str) -> Result<()> {
    let path = repo.gitdir().join("HEAD");
    let content = format!("ref: refs/heads/{}\n", name);
    codec::write_file_atomic(&path, content.as_bytes(), &repo.tmp_path())
}

/// detach HEAD at a specific commit hash
pub fn set_head_to_hash(repo: &Repo, hash: &Hash) -> Result<()> {
    let path = repo.gitdir().join("HEAD");
    let content = format!("{}\n", hash.to_hex());
    codec::write_file_atomic(&path, content.as_bytes(), &repo.tmp_path())
}

/// write a branch tip file, always exactly `<40-hex>\n` (spec Q4)
pub fn write_branch_tip(repo: &Repo, name: &str, hash: &Hash) -> Result<()> {
    let path = repo.repo_path(&["refs", "heads", name]);
    let content = format!("{}\n", hash.to_hex());
    codec::write_file_atomic(&path, content.as_bytes(), &repo.tmp_path())
}

/// read a branch tip file
pub fn read_branch_tip(repo: &Repo, name: &str) -> Result<Hash> {
    let path = repo.repo_path(&["refs", "heads", name]);
    let content = fs::read_to_string(&path).with_path(&path)?;
    Hash::from_hex(content.trim_end_matches('\n'))
}

/// write a tag ref file
pub fn write_tag(repo: &Repo, name: &str, hash: &Hash) -> Result<()> {
    let path = repo.repo_path(&["refs", "tags", name]);
    let content = format!("{}\n", hash.to_hex());
    codec::write_file_atomic(&path, content.as_bytes(), &repo.tmp_path())
}

pub fn branch_exists(repo: &Repo, name: &str) -> bool {
    repo.repo_path(&["refs", "heads", name]).is_file()
}

pub fn tag_exists(repo: &Repo, name: &str) -> bool {
    repo.repo_path(&["refs", "tags", name]).is_file()
}

/// list branch names
pub fn list_branches(repo: &Repo) -> Result<Vec<String>> {
    list_names(repo.repo_path(&["refs", "heads"]))
}

/// list tag names
pub fn list_tags(repo: &Repo) -> Result<Vec<String>> {
    list_names(repo.repo_path(&["refs", "tags"]))
}

fn list_names(dir: PathBuf) -> Result<Vec<String>> {
    let mut names = Vec::new();
    if dir.is_dir() {
        for entry in fs::read_dir(&dir).with_path(&dir)? {
            let entry = entry.with_path(&dir)?;
            if entry.path().is_file() {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

/// after a new commit is written, update whatever HEAD currently names:
/// if HEAD is on a branch, move that branch's tip; if detached, move HEAD
/// itself. Returns the resulting head state so callers can report it.
pub fn commit_to_branch(repo: &Repo, hash: &Hash) -> Result<HeadState> {
    match current_branch(repo)? {
        Some(branch) => {
            write_branch_tip(repo, &branch, hash)?;
            tracing::debug!(%branch, %hash, "advanced branch tip");
            Ok(HeadState::OnBranch(branch))
        }
        None => {
            set_head_to_hash(repo, hash)?;
            tracing::debug!(%hash, "HEAD detached");
            Ok(HeadState::Detached(*hash))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_repo() -> (tempfile::TempDir, Repo) {
        let dir = tempdir().unwrap();
        let repo_path = dir.path().join("repo");
        let repo = Repo::init(&repo_path).unwrap();
        (dir, repo)
    }

    fn sample_hash(byte: u8) -> Hash {
        let mut bytes = [0u8; 20];
        bytes[0] = byte;
        Hash::from_bytes(bytes)
    }

    #[test]
    fn fresh_repo_head_is_on_master_with_no_commits() {
        let (_dir, repo) = test_repo();
        assert_eq!(current_branch(&repo).unwrap(), Some("master".to_string()));
        assert!(head_hash_opt(&repo).unwrap().is_none());
    }

    #[test]
    fn commit_to_branch_updates_branch_tip() {
        let (_dir, repo) = test_repo();
        let hash = sample_hash(0xaa);

        let state = commit_to_branch(&repo, &hash).unwrap();
        assert_eq!(state, HeadState::OnBranch("master".to_string()));
        assert_eq!(read_branch_tip(&repo, "master").unwrap(), hash);
        assert_eq!(head_hash(&repo).unwrap(), hash);
    }

    #[test]
    fn detached_head_moves_head_directly() {
        let (_dir, repo) = test_repo();
        let hash = sample_hash(0x11);
        set_head_to_hash(&repo, &hash).unwrap();

        assert_eq!(current_branch(&repo).unwrap(), None);

        let other = sample_hash(0x22);
        let state = commit_to_branch(&repo, &other).unwrap();
        assert_eq!(state, HeadState::Detached(other));
        assert_eq!(head_hash(&repo).unwrap(), other);
    }

    #[test]
    fn branch_tip_always_has_trailing_newline() {
        let (_dir, repo) = test_repo();
        let hash = sample_hash(0x33);
        write_branch_tip(&repo, "master", &hash).unwrap();

        let raw = fs::read_to_string(repo.repo_path(&["refs", "heads", "master"])).unwrap();
        assert_eq!(raw, format!("{}\n", hash.to_hex()));
    }

    #[test]
    fn resolve_follows_indirection() {
        let (_dir, repo) = test_repo();
        let hash = sample_hash(0x44);
        write_branch_tip(&repo, "master", &hash).unwrap();

        let resolved = resolve(&repo, "HEAD", true).unwrap();
        assert_eq!(resolved, hash.to_hex());
    }

    #[test]
    fn read_head_sum_type_on_branch() {
        let (_dir, repo) = test_repo();
        assert_eq!(read_head(&repo).unwrap(), HeadState::OnBranch("master".to_string()));
    }

    #[test]
    fn list_branches_and_tags() {
        let (_dir, repo) = test_repo();
        write_branch_tip(&repo, "master", &sample_hash(1)).unwrap();
        write_branch_tip(&repo, "feature", &sample_hash(2)).unwrap();
        write_tag(&repo, "v1", &sample_hash(3)).unwrap();

        assert_eq!(list_branches(&repo).unwrap(), vec!["feature", "master"]);
        assert_eq!(list_tags(&repo).unwrap(), vec!["v1"]);
    }
}
