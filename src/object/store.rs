use std::fs;

use crate::codec::{deflate, inflate};
use crate::error::{Error, IoResultExt};
use crate::hash::{sha1, Hash};
use crate::object::blob::Blob;
use crate::object::commit::Commit;
use crate::object::kind::ObjectKind;
use crate::object::tag::Tag;
use crate::object::tree::Tree;
use crate::repo::Repo;
use crate::Result;

/// the tagged union of the four object variants (spec Design Notes:
/// "Polymorphic object variants")
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Object {
    Blob(Blob),
    Tree(Tree),
    Commit(Commit),
    Tag(Tag),
}

impl Object {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Object::Blob(_) => ObjectKind::Blob,
            Object::Tree(_) => ObjectKind::Tree,
            Object::Commit(_) => ObjectKind::Commit,
            Object::Tag(_) => ObjectKind::Tag,
        }
    }

    pub fn payload(&self) -> Vec<u8> {
        match self {
            Object::Blob(b) => b.serialize(),
            Object::Tree(t) => t.serialize(),
            Object::Commit(c) => c.serialize(),
            Object::Tag(t) => t.serialize(),
        }
    }

    /// build an object of the given kind from its raw (unframed) payload
    pub fn from_payload(kind: ObjectKind, bytes: &[u8]) -> Result<Self> {
        Ok(match kind {
            ObjectKind::Blob => Object::Blob(Blob::parse(bytes)),
            ObjectKind::Tree => Object::Tree(Tree::parse(bytes)?),
            ObjectKind::Commit => Object::Commit(Commit::parse(bytes)?),
            ObjectKind::Tag => Object::Tag(Tag::parse(bytes)?),
        })
    }

    pub fn as_blob(&self) -> Option<&Blob> {
        match self {
            Object::Blob(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_tree(&self) -> Option<&Tree> {
        match self {
            Object::Tree(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_commit(&self) -> Option<&Commit> {
        match self {
            Object::Commit(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_tag(&self) -> Option<&Tag> {
        match self {
            Object::Tag(t) => Some(t),
            _ => None,
        }
    }
}

/// frame an object's payload as `<kind> <size>\0<payload>`
fn frame(obj: &Object) -> Vec<u8> {
    let payload = obj.payload();
    let mut out = Vec::with_capacity(payload.len() + 16);
    out.extend_from_slice(obj.kind().as_str().as_bytes());
    out.push(b' ');
    out.extend_from_slice(payload.len().to_string().as_bytes());
    out.push(0);
    out.extend_from_slice(&payload);
    out
}

fn object_path(repo: &Repo, hash: &Hash) -> std::path::PathBuf {
    repo.objects_path().join(hash.dir_name()).join(hash.file_name())
}

/// write an object, returning its content hash. When `persist` is true
/// (the usual case) the deflated frame is written to the object store;
/// with `persist = false` only the hash is computed (used by `hash-object`
/// without `-w`).
pub fn write(repo: &Repo, obj: &Object, persist: bool) -> Result<Hash> {
    let framed = frame(obj);
    let hash = Hash::from_bytes(sha1(&framed));

    if persist {
        let path = object_path(repo, &hash);
        if !path.exists() {
            let compressed = deflate(&framed)?;
            crate::codec::write_file_atomic(&path, &compressed, &repo.tmp_path())?;
            tracing::debug!(kind = %obj.kind(), %hash, "wrote object");
        }
    }

    Ok(hash)
}

/// read and fully parse an object by hash
pub fn read(repo: &Repo, hash: &Hash) -> Result<Object> {
    let path = object_path(repo, hash);
    let compressed = fs::read(&path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound(hash.to_hex())
        } else {
            Error::Io { path: path.clone(), source: e }
        }
    })?;
    let framed = inflate(&compressed)?;

    let space = framed
        .iter()
        .position(|&b| b == b' ')
        .ok_or_else(|| Error::malformed("object header", "missing space"))?;
    let kind_str = std::str::from_utf8(&framed[..space])
        .map_err(|_| Error::malformed("object header", "kind is not utf-8"))?;
    let kind = ObjectKind::parse(kind_str)?;

    let nul = framed[space..]
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| Error::malformed("object header", "missing NUL terminator"))?
        + space;
    let size_str = std::str::from_utf8(&framed[space + 1..nul])
        .map_err(|_| Error::malformed("object header", "size is not utf-8"))?;
    let size: usize = size_str
        .parse()
        .map_err(|_| Error::malformed("object header", "size is not a number"))?;

    let payload = &framed[nul + 1..];
    if payload.len() != size {
        return Err(Error::malformed(
            "object header",
            format!("declared size {} does not match actual size {}", size, payload.len()),
        ));
    }

    Object::from_payload(kind, payload)
}

/// does an object with this hash exist on disk
pub fn exists(repo: &Repo, hash: &Hash) -> bool {
    object_path(repo, hash).is_file()
}
