use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{Error, IoResultExt, Result};

/// a minigit repository: a working-tree root paired with its `.git` directory
pub struct Repo {
    worktree: PathBuf,
    gitdir: PathBuf,
    config: Config,
}

const DESCRIPTION: &str =
    "Unnamed repository; edit this file 'description' to name the repository.\n";
const INITIAL_HEAD: &str = "ref: refs/heads/master\n";

impl Repo {
    /// initialize a new repository at `path`
    ///
    /// `path` must either not exist yet, or be an empty directory.
    pub fn init(path: &Path) -> Result<Self> {
        if path.exists() {
            let mut entries = fs::read_dir(path).with_path(path)?;
            if entries.next().is_some() {
                return Err(Error::AlreadyInitialized(path.to_path_buf()));
            }
        } else {
            fs::create_dir_all(path).with_path(path)?;
        }

        let gitdir = path.join(".git");
        for sub in ["branches", "objects", "refs/tags", "refs/heads"] {
            fs::create_dir_all(gitdir.join(sub)).with_path(&gitdir)?;
        }

        fs::write(gitdir.join("description"), DESCRIPTION).with_path(&gitdir)?;
        fs::write(gitdir.join("HEAD"), INITIAL_HEAD).with_path(&gitdir)?;

        let config = Config::default_for_init();
        config.save(&gitdir.join("config"))?;

        tracing::debug!(path = %path.display(), "initialized repository");

        Ok(Self {
            worktree: path.to_path_buf(),
            gitdir,
            config,
        })
    }

    /// open an existing repository rooted exactly at `path` (no parent walk)
    pub fn open(path: &Path) -> Result<Self> {
        let gitdir = path.join(".git");
        if !gitdir.is_dir() {
            return Err(Error::NotARepository(path.to_path_buf()));
        }
        let config = Config::load(&gitdir.join("config"))?;
        Ok(Self {
            worktree: path.to_path_buf(),
            gitdir,
            config,
        })
    }

    /// walk `start` and its parents until a directory containing `.git/` is found
    pub fn find_root(start: &Path) -> Result<Self> {
        let mut dir = start
            .canonicalize()
            .unwrap_or_else(|_| start.to_path_buf());

        loop {
            if dir.join(".git").is_dir() {
                return Self::open(&dir);
            }
            match dir.parent() {
                Some(parent) => dir = parent.to_path_buf(),
                None => return Err(Error::NotARepository(start.to_path_buf())),
            }
        }
    }

    /// working-tree root
    pub fn worktree(&self) -> &Path {
        &self.worktree
    }

    /// `.git` directory
    pub fn gitdir(&self) -> &Path {
        &self.gitdir
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// compose a path under `.git/` from components, without creating anything
    pub fn repo_path(&self, parts: &[&str]) -> PathBuf {
        let mut p = self.gitdir.clone();
        for part in parts {
            p.push(part);
        }
        p
    }

    /// compose a directory path under `.git/`, creating it (and parents) if requested
    pub fn repo_dir(&self, parts: &[&str], create: bool) -> Result<PathBuf> {
        let p = self.repo_path(parts);
        if create {
            fs::create_dir_all(&p).with_path(&p)?;
        }
        Ok(p)
    }

    /// compose a file path under `.git/`, creating its parent directory if requested
    pub fn repo_file(&self, parts: &[&str], create: bool) -> Result<PathBuf> {
        let p = self.repo_path(parts);
        if create {
            if let Some(parent) = p.parent() {
                fs::create_dir_all(parent).with_path(parent)?;
            }
        }
        Ok(p)
    }

    /// path to the `objects` directory
    pub fn objects_path(&self) -> PathBuf {
        self.gitdir.join("objects")
    }

    /// path to a scratch directory for atomic writes (created on demand)
    pub fn tmp_path(&self) -> PathBuf {
        self.gitdir.join("tmp")
    }
}
