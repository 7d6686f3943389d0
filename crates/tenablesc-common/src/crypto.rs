//! Content digests for uploaded files
//!
//! Audit files are tracked by the SHA-256 of their content so that an edit on disk shows
//! up as a planned change even though the path attribute stays the same.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::path::Path;
use tenablesc_core::{Error, Result};

/// Lowercase hex SHA-256 of `data`
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Read a file and return its contents together with their hex digest
pub fn read_and_hash(path: impl AsRef<Path>) -> Result<(Vec<u8>, String)> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| io_error(path, e))?;
    let digest = sha256_hex(&data);
    Ok((data, digest))
}

/// Hex digest of a file on disk, streamed
pub fn sha256_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|e| io_error(path, e))?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

fn io_error(path: &Path, e: std::io::Error) -> Error {
    match e.kind() {
        std::io::ErrorKind::NotFound => Error::FileNotFound {
            path: path.display().to_string(),
        },
        _ => Error::Io(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HELLO_DIGEST: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    #[test]
    fn test_file_and_memory_digests_agree() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"hello world").unwrap();

        assert_eq!(sha256_hex(b"hello world"), HELLO_DIGEST);
        assert_eq!(sha256_file(file.path()).unwrap(), HELLO_DIGEST);

        let (data, digest) = read_and_hash(file.path()).unwrap();
        assert_eq!(data, b"hello world");
        assert_eq!(digest, HELLO_DIGEST);
    }

    #[test]
    fn test_missing_file() {
        let err = sha256_file("/nonexistent/audit.xml").unwrap_err();
        assert_eq!(err.code(), "FILE_NOT_FOUND");
        assert!(read_and_hash("/nonexistent/audit.xml").is_err());
    }
}
