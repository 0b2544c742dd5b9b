use crate::error::Error;
use crate::hash::Hash;
use crate::object::kv::{KvField, KvPayload};
use crate::Result;

/// an ordered key/value commit payload: tree, optional parent, author,
/// committer, optional gpgsig, blank line, message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub tree: Hash,
    pub parent: Option<Hash>,
    pub author: String,
    pub committer: String,
    pub gpgsig: Option<String>,
    pub message: String,
}

impl Commit {
    pub fn new(tree: Hash, parent: Option<Hash>, author: String, committer: String, message: String) -> Self {
        Self {
            tree,
            parent,
            author,
            committer,
            gpgsig: None,
            message,
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut fields = vec![KvField {
            key: "tree".to_string(),
            value: self.tree.to_hex(),
        }];
        if let Some(parent) = &self.parent {
            fields.push(KvField {
                key: "parent".to_string(),
                value: parent.to_hex(),
            });
        }
        fields.push(KvField {
            key: "author".to_string(),
            value: self.author.clone(),
        });
        fields.push(KvField {
            key: "committer".to_string(),
            value: self.committer.clone(),
        });
        if let Some(sig) = &self.gpgsig {
            fields.push(KvField {
                key: "gpgsig".to_string(),
                value: sig.clone(),
            });
        }
        KvPayload {
            fields,
            message: self.message.clone(),
        }
        .serialize()
    }

    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let kv = KvPayload::parse(bytes, "commit")?;

        let tree = kv
            .get("tree")
            .ok_or_else(|| Error::malformed("commit", "missing required 'tree' field"))?;
        let tree = Hash::from_hex(tree)?;

        let parent = match kv.get("parent") {
            Some(p) => Some(Hash::from_hex(p)?),
            None => None,
        };

        let author = kv
            .get("author")
            .ok_or_else(|| Error::malformed("commit", "missing required 'author' field"))?
            .to_string();
        let committer = kv
            .get("committer")
            .ok_or_else(|| Error::malformed("commit", "missing required 'committer' field"))?
            .to_string();
        let gpgsig = kv.get("gpgsig").map(|s| s.to_string());

        Ok(Self {
            tree,
            parent,
            author,
            committer,
            gpgsig,
            message: kv.message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(byte: u8) -> Hash {
        let mut bytes = [0u8; 20];
        bytes[0] = byte;
        Hash::from_bytes(bytes)
    }

    #[test]
    fn round_trips_without_parent() {
        let commit = Commit::new(
            h(1),
            None,
            "A <a@example.com> 1 +0000".to_string(),
            "A <a@example.com> 1 +0000".to_string(),
            "initial\n".to_string(),
        );
        let bytes = commit.serialize();
        let parsed = Commit::parse(&bytes).unwrap();
        assert_eq!(parsed, commit);
        assert!(!String::from_utf8_lossy(&bytes).contains("parent"));
    }

    #[test]
    fn round_trips_with_parent_and_gpgsig() {
        let mut commit = Commit::new(
            h(1),
            Some(h(2)),
            "A <a@example.com> 1 +0000".to_string(),
            "B <b@example.com> 2 +0000".to_string(),
            "msg".to_string(),
        );
        commit.gpgsig = Some("-----BEGIN PGP SIGNATURE-----\n abcd\n -----END PGP SIGNATURE-----".to_string());

        let bytes = commit.serialize();
        let parsed = Commit::parse(&bytes).unwrap();
        assert_eq!(parsed, commit);
    }

    #[test]
    fn missing_tree_is_malformed() {
        let raw = b"author a\ncommitter b\n\nmsg\n";
        assert!(Commit::parse(raw).is_err());
    }

    #[test]
    fn missing_author_is_malformed() {
        let raw = b"tree aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa\ncommitter b\n\nmsg\n";
        assert!(Commit::parse(raw).is_err());
    }

    #[test]
    fn absent_parent_does_not_round_trip_as_empty_value() {
        let commit = Commit::new(
            h(9),
            None,
            "a".to_string(),
            "b".to_string(),
            "m".to_string(),
        );
        let text = String::from_utf8(commit.serialize()).unwrap();
        assert!(!text.lines().any(|l| l.starts_with("parent")));
    }
}
