//! Content fingerprints used for duplicate detection.
//!
//! Two files are duplicates when their SHA-256 digests match. Hashing costs a
//! full read of the file, so the organizer only fingerprints files whose size
//! is shared with at least one other scanned file.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

const BUFFER_SIZE: usize = 64 * 1024;

/// Lower-case hex SHA-256 digest of a file's content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Hashes the file at `path`, streaming it in fixed-size chunks.
    pub fn of_file(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        Self::of_reader(BufReader::new(file))
    }

    /// Hashes everything `reader` yields.
    pub fn of_reader<R: Read>(mut reader: R) -> io::Result<Self> {
        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; BUFFER_SIZE];

        loop {
            let read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            hasher.update(&buffer[..read]);
        }

        Ok(Self(format!("{:x}", hasher.finalize())))
    }

    /// The hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First twelve hex digits, enough to tell groups apart in a summary.
    pub fn short(&self) -> &str {
        &self.0[..12.min(self.0.len())]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_known_digest() {
        let fp = Fingerprint::of_reader(&b"abc"[..]).unwrap();
        assert_eq!(
            fp.as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(fp.short(), "ba7816bf8f01");
    }

    #[test]
    fn test_identical_files_share_fingerprint() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let a = temp_dir.path().join("a.bin");
        let b = temp_dir.path().join("b.bin");
        let c = temp_dir.path().join("c.bin");
        let content = vec![7u8; BUFFER_SIZE * 2 + 13];
        fs::write(&a, &content).unwrap();
        fs::write(&b, &content).unwrap();
        let mut other = content.clone();
        other[BUFFER_SIZE + 1] = 8;
        fs::write(&c, &other).unwrap();

        let fa = Fingerprint::of_file(&a).unwrap();
        assert_eq!(fa, Fingerprint::of_file(&b).unwrap());
        assert_ne!(fa, Fingerprint::of_file(&c).unwrap());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let err = Fingerprint::of_file(&temp_dir.path().join("gone")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
