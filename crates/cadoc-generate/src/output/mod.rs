//! Writers for generated artifacts.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

pub mod flat;
pub mod sql;

/// Outcome of writing one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub rows: u64,
    pub bytes: u64,
    pub sha256: String,
}

/// Write `bytes` to `path`, counting and hashing what lands on disk.
pub(crate) fn write_hashed(path: &Path, bytes: &[u8], rows: u64) -> std::io::Result<WrittenFile> {
    let mut writer = DigestWriter::new(BufWriter::new(File::create(path)?));
    writer.write_all(bytes)?;
    writer.flush()?;
    Ok(WrittenFile {
        path: path.to_path_buf(),
        rows,
        bytes: writer.bytes,
        sha256: hex::encode(writer.hasher.finalize()),
    })
}

struct DigestWriter<W: Write> {
    inner: W,
    bytes: u64,
    hasher: Sha256,
}

impl<W: Write> DigestWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            bytes: 0,
            hasher: Sha256::new(),
        }
    }
}

impl<W: Write> Write for DigestWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.hasher.update(&buf[..size]);
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
