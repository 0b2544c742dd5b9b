use std::fs;

use crate::error::{Error, IoResultExt};
use crate::hash::Hash;
use crate::object::{self, Object, ObjectKind};
use crate::refs;
use crate::repo::Repo;
use crate::Result;

/// is `s` a plausible hex hash fragment: 4 to 40 lowercase hex digits
fn looks_like_hex(s: &str) -> bool {
    (4..=40).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// enumerate every object whose hash starts with `prefix`
fn abbrev_candidates(repo: &Repo, prefix: &str) -> Result<Vec<String>> {
    let mut out = Vec::new();
    let objects_dir = repo.objects_path();
    if !objects_dir.is_dir() {
        return Ok(out);
    }

    let dir_prefix = &prefix[..prefix.len().min(2)];
    for entry in fs::read_dir(&objects_dir).with_path(&objects_dir)? {
        let entry = entry.with_path(&objects_dir)?;
        let dir_name = entry.file_name().to_string_lossy().to_string();
        if dir_name == "tmp" || !dir_name.starts_with(dir_prefix) {
            continue;
        }
        if !entry.path().is_dir() {
            continue;
        }
        for sub in fs::read_dir(entry.path()).with_path(&objects_dir)? {
            let sub = sub.with_path(&objects_dir)?;
            let file_name = sub.file_name().to_string_lossy().to_string();
            let full = format!("{}{}", dir_name, file_name);
            if full.starts_with(prefix) {
                out.push(full);
            }
        }
    }
    out.sort();
    Ok(out)
}

/// resolve an abbreviated or full hex hash, disambiguating prefixes against
/// the object store (spec invariant: ambiguous prefixes are an error, never
/// a silent pick). A full 40-char candidate is accepted without an existence
/// check here; a nonexistent object is caught by the subsequent read.
fn resolve_hex(repo: &Repo, s: &str) -> Result<Hash> {
    if s.len() == 40 {
        return Hash::from_hex(s);
    }

    let candidates = abbrev_candidates(repo, s)?;
    match candidates.len() {
        0 => Err(Error::NotFound(s.to_string())),
        1 => Hash::from_hex(&candidates[0]),
        _ => Err(Error::Ambiguous(s.to_string(), candidates)),
    }
}

/// search `refs/heads/<name>` then `refs/tags/<name>` for a symbolic name
fn resolve_symbolic(repo: &Repo, name: &str) -> Result<Hash> {
    if refs::branch_exists(repo, name) {
        return refs::read_branch_tip(repo, name);
    }
    if refs::tag_exists(repo, name) {
        let path = repo.repo_path(&["refs", "tags", name]);
        let content = fs::read_to_string(&path).with_path(&path)?;
        return Hash::from_hex(content.trim_end_matches('\n'));
    }
    Err(Error::NotFound(name.to_string()))
}

/// resolve a user-supplied name to an object hash: `HEAD`, a branch, a tag,
/// or an abbreviated/full hex hash. Does not follow tag/commit indirection;
/// see [`follow_to`] for that.
pub fn resolve_name(repo: &Repo, name: &str) -> Result<Hash> {
    if name.is_empty() {
        return Err(Error::NotFound(name.to_string()));
    }

    if name == "HEAD" {
        return refs::head_hash(repo);
    }

    if looks_like_hex(name) {
        return resolve_hex(repo, name);
    }

    resolve_symbolic(repo, name)
}

/// follow a resolved hash down to an object of the requested kind: a tag
/// dereferences to its target object, a commit's "tree" kind dereferences to
/// its tree; any other combination is a kind mismatch.
pub fn follow_to(repo: &Repo, hash: &Hash, kind: ObjectKind) -> Result<(Hash, Object)> {
    let mut current_hash = *hash;
    let mut current = object::read(repo, &current_hash)?;

    loop {
        if current.kind() == kind {
            return Ok((current_hash, current));
        }
        match &current {
            Object::Tag(tag) => {
                current_hash = tag.object;
                current = object::read(repo, &current_hash)?;
            }
            Object::Commit(commit) if kind == ObjectKind::Tree => {
                current_hash = commit.tree;
                current = object::read(repo, &current_hash)?;
            }
            other => {
                return Err(Error::WrongKind {
                    expected: kind.to_string(),
                    got: other.kind().to_string(),
                })
            }
        }
    }
}

/// resolve a name and follow it to an object of the requested kind in one step
pub fn resolve_to(repo: &Repo, name: &str, kind: ObjectKind) -> Result<(Hash, Object)> {
    let hash = resolve_name(repo, name)?;
    follow_to(repo, &hash, kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Blob, Commit, Object, Tag, Tree};
    use tempfile::tempdir;

    fn test_repo() -> (tempfile::TempDir, Repo) {
        let dir = tempdir().unwrap();
        let repo_path = dir.path().join("repo");
        let repo = Repo::init(&repo_path).unwrap();
        (dir, repo)
    }

    #[test]
    fn empty_name_is_not_found() {
        let (_dir, repo) = test_repo();
        assert!(matches!(resolve_name(&repo, ""), Err(Error::NotFound(_))));
    }

    #[test]
    fn head_resolves_to_branch_tip() {
        let (_dir, repo) = test_repo();
        let blob_hash = object::write(&repo, &Object::Blob(Blob::new(b"x".to_vec())), true).unwrap();
        let tree = Tree::new(vec![]);
        let tree_hash = object::write(&repo, &Object::Tree(tree), true).unwrap();
        let commit = Commit::new(tree_hash, None, "a".into(), "a".into(), "m".into());
        let commit_hash = object::write(&repo, &Object::Commit(commit), true).unwrap();
        refs::commit_to_branch(&repo, &commit_hash).unwrap();

        assert_eq!(resolve_name(&repo, "HEAD").unwrap(), commit_hash);
        let _ = blob_hash;
    }

    #[test]
    fn full_hex_resolves_when_object_exists() {
        let (_dir, repo) = test_repo();
        let hash = object::write(&repo, &Object::Blob(Blob::new(b"data".to_vec())), true).unwrap();
        assert_eq!(resolve_name(&repo, &hash.to_hex()).unwrap(), hash);
    }

    #[test]
    fn unknown_full_hex_resolves_to_a_candidate_that_does_not_exist() {
        let (_dir, repo) = test_repo();
        let fake = "0".repeat(40);
        let hash = resolve_name(&repo, &fake).unwrap();
        assert!(matches!(object::read(&repo, &hash), Err(Error::NotFound(_))));
    }

    #[test]
    fn abbreviated_hash_resolves_uniquely() {
        let (_dir, repo) = test_repo();
        let hash = object::write(&repo, &Object::Blob(Blob::new(b"unique content".to_vec())), true).unwrap();
        let short = &hash.to_hex()[..8];
        assert_eq!(resolve_name(&repo, short).unwrap(), hash);
    }

    #[test]
    fn branch_name_resolves() {
        let (_dir, repo) = test_repo();
        let hash = object::write(&repo, &Object::Blob(Blob::new(b"y".to_vec())), true).unwrap();
        refs::write_branch_tip(&repo, "topic", &hash).unwrap();
        assert_eq!(resolve_name(&repo, "topic").unwrap(), hash);
    }

    #[test]
    fn follow_to_tree_dereferences_commit() {
        let (_dir, repo) = test_repo();
        let tree_hash = object::write(&repo, &Object::Tree(Tree::new(vec![])), true).unwrap();
        let commit = Commit::new(tree_hash, None, "a".into(), "a".into(), "m".into());
        let commit_hash = object::write(&repo, &Object::Commit(commit), true).unwrap();

        let (resolved_hash, obj) = follow_to(&repo, &commit_hash, ObjectKind::Tree).unwrap();
        assert_eq!(resolved_hash, tree_hash);
        assert!(obj.as_tree().is_some());
    }

    #[test]
    fn follow_to_dereferences_tag_to_commit() {
        let (_dir, repo) = test_repo();
        let tree_hash = object::write(&repo, &Object::Tree(Tree::new(vec![])), true).unwrap();
        let commit = Commit::new(tree_hash, None, "a".into(), "a".into(), "m".into());
        let commit_hash = object::write(&repo, &Object::Commit(commit), true).unwrap();
        let tag = Tag::new(commit_hash, ObjectKind::Commit, "v1".into(), "t".into(), "r\n".into());
        let tag_hash = object::write(&repo, &Object::Tag(tag), true).unwrap();

        let (resolved_hash, obj) = follow_to(&repo, &tag_hash, ObjectKind::Commit).unwrap();
        assert_eq!(resolved_hash, commit_hash);
        assert!(obj.as_commit().is_some());
    }

    #[test]
    fn wrong_kind_with_no_indirection_path_errors() {
        let (_dir, repo) = test_repo();
        let blob_hash = object::write(&repo, &Object::Blob(Blob::new(b"z".to_vec())), true).unwrap();
        assert!(matches!(
            follow_to(&repo, &blob_hash, ObjectKind::Tree),
            Err(Error::WrongKind { .. })
        ));
    }
}
