//! minigit CLI - a thin demonstration binary over the minigit library

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use minigit::object::Object;
use minigit::resolve::resolve_to;
use minigit::{index, object, refs, resolve, worktree, ObjectKind, Repo, Result};

#[derive(Parser)]
#[command(name = "minigit")]
#[command(about = "a minimal, Git-compatible content-addressed object store")]
#[command(version)]
struct Cli {
    /// repository path
    #[arg(short, long, default_value = ".")]
    repo: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// initialize a new repository
    Init {
        /// path to create repository at
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// compute (and optionally persist) an object's hash
    HashObject {
        /// file to hash
        path: PathBuf,

        /// object type
        #[arg(short = 't', long, default_value = "blob")]
        object_type: String,

        /// write the object to the store
        #[arg(short = 'w', long)]
        write: bool,
    },

    /// print the contents of an object
    CatFile {
        /// name or hash to inspect
        object: String,

        /// follow through tags/commits to an object of this type
        #[arg(long)]
        r#type: Option<String>,
    },

    /// show the commit history reachable from a name
    Log {
        /// name or hash to start from
        #[arg(default_value = "HEAD")]
        rev: String,
    },

    /// list the contents of a tree
    LsTree {
        /// name or hash to list
        #[arg(default_value = "HEAD")]
        rev: String,

        /// recurse into subtrees
        #[arg(short, long)]
        recursive: bool,
    },

    /// switch the working tree to a branch or commit
    Checkout {
        /// branch name or commit hash
        name: String,
    },

    /// list every reference and the hash it points at
    ShowRef,

    /// create or list tags
    Tag {
        /// tag name to create
        name: Option<String>,

        /// object the tag points at
        #[arg(default_value = "HEAD")]
        target: String,

        /// tag message (creates an annotated tag)
        #[arg(short, long)]
        message: Option<String>,
    },

    /// create or list branches
    Branch {
        /// branch name to create
        name: Option<String>,

        /// commit the branch should point at
        #[arg(default_value = "HEAD")]
        start_point: String,
    },

    /// record the working tree as a new commit
    Commit {
        /// commit message
        #[arg(short, long)]
        message: String,
    },

    /// list entries staged in the index
    LsFiles,

    /// resolve a name to its object hash
    RevParse {
        /// name to resolve
        rev: String,

        /// print an abbreviated (12-char) hash
        #[arg(long)]
        short: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init { path } => {
            Repo::init(&path)?;
            println!("initialized minigit repository at {}", path.display());
        }

        Commands::HashObject {
            path,
            object_type,
            write,
        } => {
            let repo = Repo::find_root(&cli.repo)?;
            let kind = ObjectKind::parse(&object_type)?;
            let bytes = std::fs::read(&path).map_err(|e| minigit::Error::Io {
                path: path.clone(),
                source: e,
            })?;

            let obj = Object::from_payload(kind, &bytes)?;
            let hash = object::write(&repo, &obj, write)?;
            println!("{}", hash);
        }

        Commands::CatFile { object, r#type } => {
            let repo = Repo::find_root(&cli.repo)?;
            let obj = match &r#type {
                Some(t) => {
                    let kind = ObjectKind::parse(t)?;
                    resolve_to(&repo, &object, kind)?.1
                }
                None => {
                    let hash = resolve::resolve_name(&repo, &object)?;
                    minigit::object::read(&repo, &hash)?
                }
            };
            print_object(&obj);
        }

        Commands::Log { rev } => {
            let repo = Repo::find_root(&cli.repo)?;
            let mut current = Some(resolve::resolve_name(&repo, &rev)?);
            while let Some(hash) = current {
                let obj = object::read(&repo, &hash)?;
                let commit = obj.as_commit().ok_or_else(|| minigit::Error::WrongKind {
                    expected: "commit".to_string(),
                    got: obj.kind().to_string(),
                })?;
                println!("commit {}", hash);
                println!("Author: {}", commit.author);
                println!();
                for line in commit.message.lines() {
                    println!("    {}", line);
                }
                println!();
                current = commit.parent;
            }
        }

        Commands::LsTree { rev, recursive } => {
            let repo = Repo::find_root(&cli.repo)?;
            let (_, obj) = resolve_to(&repo, &rev, ObjectKind::Tree)?;
            let tree = obj.as_tree().ok_or_else(|| minigit::Error::WrongKind {
                expected: "tree".to_string(),
                got: obj.kind().to_string(),
            })?;
            print_tree(&repo, tree, "", recursive)?;
        }

        Commands::Checkout { name } => {
            let repo = Repo::find_root(&cli.repo)?;
            let state = worktree::checkout(&repo, &name)?;
            match state {
                minigit::HeadState::OnBranch(branch) => println!("switched to branch '{}'", branch),
                minigit::HeadState::Detached(hash) => println!("HEAD is now at {}", hash),
            }
        }

        Commands::ShowRef => {
            let repo = Repo::find_root(&cli.repo)?;
            for branch in refs::list_branches(&repo)? {
                let hash = refs::read_branch_tip(&repo, &branch)?;
                println!("{} refs/heads/{}", hash, branch);
            }
            for tag in refs::list_tags(&repo)? {
                let path = repo.repo_path(&["refs", "tags", &tag]);
                let hex = std::fs::read_to_string(&path)
                    .map_err(|e| minigit::Error::Io { path: path.clone(), source: e })?;
                println!("{} refs/tags/{}", hex.trim_end(), tag);
            }
        }

        Commands::Tag {
            name,
            target,
            message,
        } => match name {
            Some(name) => {
                let repo = Repo::find_root(&cli.repo)?;
                let target_hash = resolve::resolve_name(&repo, &target)?;
                let hash = match message {
                    Some(msg) => {
                        let target_obj = object::read(&repo, &target_hash)?;
                        let tag = minigit::object::Tag::new(
                            target_hash,
                            target_obj.kind(),
                            name.clone(),
                            "minigit <minigit@localhost> 0 +0000".to_string(),
                            msg,
                        );
                        object::write(&repo, &Object::Tag(tag), true)?
                    }
                    None => target_hash,
                };
                refs::write_tag(&repo, &name, &hash)?;
                println!("{}", hash);
            }
            None => {
                let repo = Repo::find_root(&cli.repo)?;
                for tag in refs::list_tags(&repo)? {
                    println!("{}", tag);
                }
            }
        },

        Commands::Branch { name, start_point } => match name {
            Some(name) => {
                let repo = Repo::find_root(&cli.repo)?;
                let hash = resolve::resolve_name(&repo, &start_point)?;
                refs::write_branch_tip(&repo, &name, &hash)?;
                println!("created branch '{}' at {}", name, hash);
            }
            None => {
                let repo = Repo::find_root(&cli.repo)?;
                let current = refs::current_branch(&repo)?;
                for branch in refs::list_branches(&repo)? {
                    let marker = if Some(&branch) == current.as_ref() { "*" } else { " " };
                    println!("{} {}", marker, branch);
                }
            }
        },

        Commands::Commit { message } => {
            let repo = Repo::find_root(&cli.repo)?;
            match worktree::commit(&repo, &message)? {
                Some(hash) => println!("{}", hash),
                None => println!("nothing to commit"),
            }
        }

        Commands::LsFiles => {
            let repo = Repo::find_root(&cli.repo)?;
            let path = repo.repo_path(&["index"]);
            let bytes = std::fs::read(&path).map_err(|e| minigit::Error::Io { path: path.clone(), source: e })?;
            let idx = index::Index::parse(&bytes)?;
            for entry in idx.entries {
                println!("{} {}", entry.hash, entry.path);
            }
        }

        Commands::RevParse { rev, short } => {
            let repo = Repo::find_root(&cli.repo)?;
            let hash = resolve::resolve_name(&repo, &rev)?;
            if short {
                println!("{}", &hash.to_hex()[..12]);
            } else {
                println!("{}", hash);
            }
        }
    }

    Ok(())
}

fn print_object(obj: &Object) {
    match obj {
        Object::Blob(blob) => {
            io::stdout().write_all(&blob.data).ok();
        }
        Object::Tree(tree) => {
            for entry in &tree.entries {
                println!("{} {} {}", entry.mode, entry.hash, entry.path);
            }
        }
        Object::Commit(commit) => {
            println!("tree {}", commit.tree);
            if let Some(parent) = commit.parent {
                println!("parent {}", parent);
            }
            println!("author {}", commit.author);
            println!("committer {}", commit.committer);
            println!();
            print!("{}", commit.message);
        }
        Object::Tag(tag) => {
            println!("object {}", tag.object);
            println!("type {}", tag.object_kind);
            println!("tag {}", tag.tag);
            println!("tagger {}", tag.tagger);
            println!();
            print!("{}", tag.message);
        }
    }
}

fn print_tree(repo: &Repo, tree: &minigit::object::Tree, prefix: &str, recursive: bool) -> Result<()> {
    for entry in &tree.entries {
        let display_path = if prefix.is_empty() {
            entry.path.clone()
        } else {
            format!("{}/{}", prefix, entry.path)
        };

        if recursive && entry.mode == minigit::object::tree::MODE_SUBTREE {
            let sub = object::read(repo, &entry.hash)?;
            let sub_tree = sub.as_tree().ok_or_else(|| minigit::Error::WrongKind {
                expected: "tree".to_string(),
                got: sub.kind().to_string(),
            })?;
            print_tree(repo, sub_tree, &display_path, recursive)?;
        } else {
            println!("{} {} {}", entry.mode, entry.hash, display_path);
        }
    }
    Ok(())
}
