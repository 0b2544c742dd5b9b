use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::IoResultExt;
use crate::Result;

/// deflate-compress a byte sequence at best-compression level
pub fn deflate(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(bytes)
        .with_path("<deflate>")?;
    encoder.finish().with_path("<deflate>")
}

/// inflate a deflate-compressed byte sequence
pub fn inflate(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(bytes);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out).with_path("<inflate>")?;
    Ok(out)
}

/// read an entire file's raw bytes; no trailing-newline trimming
pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_path(path)
}

/// overwrite a file's contents atomically via temp-then-rename
///
/// `tmp_dir` should be on the same filesystem as `path` so the rename is atomic.
pub fn write_file_atomic(path: &Path, bytes: &[u8], tmp_dir: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_path(parent)?;
    }
    fs::create_dir_all(tmp_dir).with_path(tmp_dir)?;

    let tmp_path = tmp_dir.join(uuid::Uuid::new_v4().to_string());
    {
        let mut tmp_file = File::create(&tmp_path).with_path(&tmp_path)?;
        tmp_file.write_all(bytes).with_path(&tmp_path)?;
        tmp_file.sync_all().with_path(&tmp_path)?;
    }
    fs::rename(&tmp_path, path).with_path(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn deflate_inflate_roundtrip() {
        let data = b"commit 182\0tree deadbeef";
        let compressed = deflate(data).unwrap();
        let decompressed = inflate(&compressed).unwrap();
        assert_eq!(decompressed, data);
    }

    #[test]
    fn write_then_read_atomic() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out");
        let tmp = dir.path().join("tmp");

        write_file_atomic(&path, b"hello", &tmp).unwrap();
        assert_eq!(read_file(&path).unwrap(), b"hello");

        // overwrite truncates existing content
        write_file_atomic(&path, b"hi", &tmp).unwrap();
        assert_eq!(read_file(&path).unwrap(), b"hi");
    }
}
