use crate::error::Error;
use crate::hash::Hash;
use crate::Result;

const SIGNATURE: &[u8; 4] = b"DIRC";

/// one staged-file record from `.git/index`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub ctime: u64,
    pub mtime: u64,
    pub dev: u32,
    pub ino: u32,
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    pub size: u32,
    pub hash: Hash,
    pub flags: u16,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Index {
    pub version: u32,
    pub entries: Vec<IndexEntry>,
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.pos + n > self.bytes.len() {
            return Err(Error::malformed("index", "unexpected end of file"));
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u16(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.take(2)?.try_into().unwrap()))
    }

    fn u32(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.take(4)?.try_into().unwrap()))
    }

    fn u64(&mut self) -> Result<u64> {
        Ok(u64::from_be_bytes(self.take(8)?.try_into().unwrap()))
    }

    fn nul_terminated_str(&mut self) -> Result<String> {
        let rest = &self.bytes[self.pos..];
        let nul = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| Error::malformed("index entry", "path missing NUL terminator"))?;
        let s = std::str::from_utf8(&rest[..nul])
            .map_err(|_| Error::malformed("index entry", "path is not utf-8"))?
            .to_string();
        self.pos += nul;
        Ok(s)
    }
}

impl Index {
    /// parse the binary `.git/index` format: signature, version, entry
    /// count, then that many big-endian fixed/variable records each padded
    /// to a multiple of 8 bytes
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(bytes);

        let sig = cursor.take(4)?;
        if sig != SIGNATURE {
            let mut arr = [0u8; 4];
            arr.copy_from_slice(sig);
            return Err(Error::BadSignature(arr));
        }

        let version = cursor.u32()?;
        let count = cursor.u32()?;

        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let entry_start = cursor.pos;

            let ctime = cursor.u64()?;
            let mtime = cursor.u64()?;
            let dev = cursor.u32()?;
            let ino = cursor.u32()?;
            let mode = cursor.u32()?;
            let uid = cursor.u32()?;
            let gid = cursor.u32()?;
            let size = cursor.u32()?;
            let hash = Hash::from_bytes_slice(cursor.take(20)?)?;
            let flags = cursor.u16()?;
            let path = cursor.nul_terminated_str()?;
            // consume the terminating NUL itself before computing padding
            cursor.take(1)?;

            let entry_len = cursor.pos - entry_start;
            let padded_len = entry_len.div_ceil(8) * 8;
            let padding = padded_len - entry_len;
            if padding > 0 {
                cursor.take(padding)?;
            }

            entries.push(IndexEntry {
                ctime,
                mtime,
                dev,
                ino,
                mode,
                uid,
                gid,
                size,
                hash,
                flags,
                path,
            });
        }

        Ok(Self { version, entries })
    }
}
