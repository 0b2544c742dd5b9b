//! minigit - a minimal, Git-compatible content-addressed object store
//!
//! Implements a small but faithful subset of Git's plumbing: initializing
//! a repository directory, writing and reading deflate-compressed,
//! SHA-1-addressed objects (blobs, trees, commits, tags), parsing the
//! staged-index binary file, resolving human-friendly names to object
//! identifiers, building commits from the working tree, and switching the
//! working tree between branches and commits.
//!
//! Out of scope: the command-line surface, network transport, packfiles,
//! diff/merge, submodules, reflog, hooks, and GPG signature verification
//! (signatures are preserved verbatim but never validated).
//!
//! # Example
//!
//! ```no_run
//! use minigit::{object, worktree, Repo};
//! use std::path::Path;
//!
//! let repo = Repo::init(Path::new("/path/to/repo")).unwrap();
//! worktree::commit(&repo, "initial commit").unwrap();
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod hash;
pub mod index;
pub mod object;
pub mod refs;
pub mod repo;
pub mod resolve;
pub mod worktree;

pub use config::Config;
pub use error::{Error, Result};
pub use hash::Hash;
pub use index::{Index, IndexEntry};
pub use object::{Object, ObjectKind};
pub use refs::HeadState;
pub use repo::Repo;
