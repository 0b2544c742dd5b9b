pub mod blob;
pub mod commit;
pub mod kind;
pub mod kv;
pub mod store;
pub mod tag;
pub mod tree;

pub use blob::Blob;
pub use commit::Commit;
pub use kind::ObjectKind;
pub use store::{exists, read, write, Object};
pub use tag::Tag;
pub use tree::{Tree, TreeEntry};
