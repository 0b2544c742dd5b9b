use crate::error::Error;
use crate::hash::Hash;
use crate::Result;

pub const MODE_REGULAR: &str = "100644";
pub const MODE_EXECUTABLE: &str = "100755";
pub const MODE_SYMLINK: &str = "120000";
pub const MODE_SUBTREE: &str = "040000";
pub const MODE_SUBMODULE: &str = "160000";

const VALID_MODES: [&str; 5] = [
    MODE_REGULAR,
    MODE_EXECUTABLE,
    MODE_SYMLINK,
    MODE_SUBTREE,
    MODE_SUBMODULE,
];

/// one tree leaf: `<mode> <path>\0<20-byte hash>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub mode: String,
    pub path: String,
    pub hash: Hash,
}

impl TreeEntry {
    pub fn new(mode: impl Into<String>, path: impl Into<String>, hash: Hash) -> Result<Self> {
        let mode = mode.into();
        if !VALID_MODES.contains(&mode.as_str()) || !(mode.len() == 5 || mode.len() == 6) {
            return Err(Error::InvalidMode(mode));
        }
        Ok(Self {
            mode,
            path: path.into(),
            hash,
        })
    }
}

/// an ordered sequence of tree leaves; readers must not assume sorted order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tree {
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    pub fn new(entries: Vec<TreeEntry>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    /// concatenate `mode + ' ' + path + '\0' + 20-byte-hash` for every entry, in order
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for entry in &self.entries {
            out.extend_from_slice(entry.mode.as_bytes());
            out.push(b' ');
            out.extend_from_slice(entry.path.as_bytes());
            out.push(0);
            out.extend_from_slice(entry.hash.as_bytes());
        }
        out
    }

    /// scan: next space -> mode, next NUL -> path, next 20 bytes -> hash; repeat
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut entries = Vec::new();
        let mut rest = bytes;

        while !rest.is_empty() {
            let space = rest
                .iter()
                .position(|&b| b == b' ')
                .ok_or_else(|| Error::malformed("tree entry", "missing mode separator"))?;
            let mode = std::str::from_utf8(&rest[..space])
                .map_err(|_| Error::malformed("tree entry", "mode is not utf-8"))?
                .to_string();
            if !(mode.len() == 5 || mode.len() == 6) {
                return Err(Error::InvalidMode(mode));
            }

            let after_mode = &rest[space + 1..];
            let nul = after_mode
                .iter()
                .position(|&b| b == 0)
                .ok_or_else(|| Error::malformed("tree entry", "missing path terminator"))?;
            let path = std::str::from_utf8(&after_mode[..nul])
                .map_err(|_| Error::malformed("tree entry", "path is not utf-8"))?
                .to_string();

            let after_path = &after_mode[nul + 1..];
            if after_path.len() < 20 {
                return Err(Error::malformed("tree entry", "truncated hash"));
            }
            let hash = Hash::from_bytes_slice(&after_path[..20])?;

            entries.push(TreeEntry { mode, path, hash });
            rest = &after_path[20..];
        }

        Ok(Self { entries })
    }
}
