use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use crate::error::{Error, IoResultExt};
use crate::hash::Hash;
use crate::object::tree::{MODE_EXECUTABLE, MODE_REGULAR, MODE_SUBMODULE, MODE_SUBTREE, MODE_SYMLINK};
use crate::object::{self, Blob, Commit, Object, ObjectKind, Tree, TreeEntry};
use crate::refs::{self, HeadState};
use crate::repo::Repo;
use crate::resolve;
use crate::Result;

const PLACEHOLDER_IDENTITY: &str = "minigit <minigit@localhost> 0 +0000";

fn derive_mode(path: &Path) -> Result<&'static str> {
    let meta = fs::symlink_metadata(path).with_path(path)?;
    let file_type = meta.file_type();

    if file_type.is_symlink() {
        return Ok(MODE_SYMLINK);
    }
    if file_type.is_dir() {
        return Ok(MODE_SUBTREE);
    }
    if file_type.is_file() {
        return Ok(if meta.permissions().mode() & 0o111 != 0 {
            MODE_EXECUTABLE
        } else {
            MODE_REGULAR
        });
    }
    Err(Error::InvalidMode(format!("{}", path.display())))
}

fn blob_bytes(path: &Path) -> Result<Vec<u8>> {
    let meta = fs::symlink_metadata(path).with_path(path)?;
    if meta.file_type().is_symlink() {
        let target = fs::read_link(path).with_path(path)?;
        Ok(target.to_string_lossy().into_owned().into_bytes())
    } else {
        fs::read(path).with_path(path)
    }
}

/// walk `dir` non-recursively, persisting a blob or subtree per entry and
/// returning the resulting tree's hash
pub fn build_tree_from_dir(repo: &Repo, dir: &Path) -> Result<Hash> {
    let mut entries = Vec::new();

    for entry in fs::read_dir(dir).with_path(dir)? {
        let entry = entry.with_path(dir)?;
        let name = entry.file_name().to_string_lossy().to_string();
        if name == ".git" {
            continue;
        }
        let path = entry.path();

        let mode = derive_mode(&path)?;
        let hash = if mode == MODE_SUBTREE {
            build_tree_from_dir(repo, &path)?
        } else {
            let bytes = blob_bytes(&path)?;
            object::write(repo, &Object::Blob(Blob::new(bytes)), true)?
        };

        entries.push(TreeEntry::new(mode, name, hash)?);
    }

    let tree = Tree::new(entries);
    object::write(repo, &Object::Tree(tree), true)
}

fn worktree_is_empty(repo: &Repo) -> Result<bool> {
    for entry in fs::read_dir(repo.worktree()).with_path(repo.worktree())? {
        let entry = entry.with_path(repo.worktree())?;
        if entry.file_name() != ".git" {
            return Ok(false);
        }
    }
    Ok(true)
}

/// build a tree from the working tree, write a commit on top of the current
/// parent, and advance whatever HEAD currently names. Returns `None` if the
/// working tree (apart from `.git`) is empty.
pub fn commit(repo: &Repo, message: &str) -> Result<Option<Hash>> {
    if worktree_is_empty(repo)? {
        tracing::info!("nothing to commit");
        return Ok(None);
    }

    let tree = build_tree_from_dir(repo, repo.worktree())?;
    let parent = refs::head_hash_opt(repo)?;

    let commit = Commit::new(
        tree,
        parent,
        PLACEHOLDER_IDENTITY.to_string(),
        PLACEHOLDER_IDENTITY.to_string(),
        message.to_string(),
    );
    let hash = object::write(repo, &Object::Commit(commit), true)?;
    refs::commit_to_branch(repo, &hash)?;

    Ok(Some(hash))
}

fn remove_worktree_contents(repo: &Repo) -> Result<()> {
    for entry in fs::read_dir(repo.worktree()).with_path(repo.worktree())? {
        let entry = entry.with_path(repo.worktree())?;
        if entry.file_name() == ".git" {
            continue;
        }
        let path = entry.path();
        if path.is_dir() && !path.is_symlink() {
            fs::remove_dir_all(&path).with_path(&path)?;
        } else {
            fs::remove_file(&path).with_path(&path)?;
        }
    }
    Ok(())
}

fn materialize_tree(repo: &Repo, tree: &Tree, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest).with_path(dest)?;
    for entry in &tree.entries {
        let path = dest.join(&entry.path);
        match entry.mode.as_str() {
            crate::object::tree::MODE_SUBTREE => {
                let obj = object::read(repo, &entry.hash)?;
                let subtree = obj
                    .as_tree()
                    .ok_or_else(|| Error::WrongKind {
                        expected: "tree".to_string(),
                        got: obj.kind().to_string(),
                    })?;
                materialize_tree(repo, subtree, &path)?;
            }
            MODE_SUBMODULE => {
                tracing::warn!(path = %path.display(), "skipping submodule entry");
            }
            _ => {
                let obj = object::read(repo, &entry.hash)?;
                let blob = obj
                    .as_blob()
                    .ok_or_else(|| Error::WrongKind {
                        expected: "blob".to_string(),
                        got: obj.kind().to_string(),
                    })?;
                fs::write(&path, &blob.data).with_path(&path)?;
            }
        }
    }
    Ok(())
}

/// clear the working tree, resolve `name`, point HEAD at it (branch or
/// detached), and materialize the resolved tree into the working tree.
/// Partial failure leaves the filesystem in whatever state it reached; it
/// is not rolled back.
pub fn checkout(repo: &Repo, name: &str) -> Result<HeadState> {
    remove_worktree_contents(repo)?;

    let hash = resolve::resolve_name(repo, name)?;
    if refs::branch_exists(repo, name) {
        refs::set_head_to_branch(repo, name)?;
    } else {
        refs::set_head_to_hash(repo, &hash)?;
    }

    let (_, tree_obj) = resolve::follow_to(repo, &hash, ObjectKind::Tree)?;
    let tree = tree_obj.as_tree().ok_or_else(|| Error::WrongKind {
        expected: "tree".to_string(),
        got: tree_obj.kind().to_string(),
    })?;
    materialize_tree(repo, tree, repo.worktree())?;

    refs::read_head(repo)
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

    #[test]
    fn commit_on_empty_worktree_returns_none() {
        let (_dir, repo) = test_repo();
        assert_eq!(commit(&repo, "empty").unwrap(), None);
    }

    #[test]
    fn commit_builds_tree_and_advances_branch() {
        let (_dir, repo) = test_repo();
        fs::write(repo.worktree().join("file.txt"), b"hello").unwrap();

        let hash = commit(&repo, "first").unwrap().unwrap();
        assert_eq!(refs::head_hash(&repo).unwrap(), hash);
        assert_eq!(refs::read_branch_tip(&repo, "master").unwrap(), hash);
    }

    #[test]
    fn second_commit_has_first_as_parent() {
        let (_dir, repo) = test_repo();
        fs::write(repo.worktree().join("a.txt"), b"a").unwrap();
        let first = commit(&repo, "first").unwrap().unwrap();

        fs::write(repo.worktree().join("b.txt"), b"b").unwrap();
        let second = commit(&repo, "second").unwrap().unwrap();

        let obj = object::read(&repo, &second).unwrap();
        assert_eq!(obj.as_commit().unwrap().parent, Some(first));
    }

    #[test]
    fn commit_nested_directory_builds_subtree() {
        let (_dir, repo) = test_repo();
        fs::create_dir_all(repo.worktree().join("src")).unwrap();
        fs::write(repo.worktree().join("src/lib.rs"), b"fn main() {}").unwrap();

        let hash = commit(&repo, "nested").unwrap().unwrap();
        let obj = object::read(&repo, &hash).unwrap();
        let tree_hash = obj.as_commit().unwrap().tree;
        let tree_obj = object::read(&repo, &tree_hash).unwrap();
        let entry = tree_obj.as_tree().unwrap().get("src").unwrap();
        assert_eq!(entry.mode, MODE_SUBTREE);
    }

    #[test]
    fn checkout_restores_committed_file() {
        let (_dir, repo) = test_repo();
        fs::write(repo.worktree().join("file.txt"), b"original").unwrap();
        commit(&repo, "first").unwrap();

        fs::write(repo.worktree().join("file.txt"), b"modified").unwrap();
        fs::write(repo.worktree().join("extra.txt"), b"extra").unwrap();

        checkout(&repo, "master").unwrap();

        assert_eq!(
            fs::read_to_string(repo.worktree().join("file.txt")).unwrap(),
            "original"
        );
        assert!(!repo.worktree().join("extra.txt").exists());
    }

    #[test]
    fn checkout_onto_branch_sets_head_symbolic() {
        let (_dir, repo) = test_repo();
        fs::write(repo.worktree().join("f").as_path(), b"x").unwrap();
        commit(&repo, "c").unwrap();

        let state = checkout(&repo, "master").unwrap();
        assert_eq!(state, HeadState::OnBranch("master".to_string()));
    }

    #[test]
    fn checkout_onto_raw_hash_detaches_head() {
        let (_dir, repo) = test_repo();
        fs::write(repo.worktree().join("f"), b"x").unwrap();
        let hash = commit(&repo, "c").unwrap().unwrap();

        let state = checkout(&repo, &hash.to_hex()).unwrap();
        assert_eq!(state, HeadState::Detached(hash));
    }
}
