use std::{
    fs::File,
    io::{self, BufReader},
    path::{Path, PathBuf},
};

use sha2::{Digest, Sha256};

use super::errors::OnnxExtractorError;

/// Model file pinned to a SHA-256 digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelArtefact {
    /// Location of the ONNX graph on disk.
    pub path: PathBuf,
    /// Expected digest as hexadecimal; case and surrounding whitespace are
    /// ignored.
    pub sha256: String,
}

impl ModelArtefact {
    /// Hash the file and compare it with the pinned digest.
    ///
    /// # Errors
    ///
    /// Returns [`OnnxExtractorError::ChecksumMismatch`] when the digests differ
    /// and [`OnnxExtractorError::Io`] when the file cannot be read.
    pub fn verify(&self) -> Result<(), OnnxExtractorError> {
        let expected = self.sha256.trim().to_ascii_lowercase();
        let actual = sha256_hex(&self.path)?;
        if actual == expected {
            Ok(())
        } else {
            Err(OnnxExtractorError::ChecksumMismatch {
                path: self.path.clone(),
                expected,
                actual,
            })
        }
    }
}

/// Lowercase hexadecimal SHA-256 of the file at `path`.
///
/// # Errors
///
/// Returns [`OnnxExtractorError::Io`] if the file cannot be opened or read.
pub fn sha256_hex(path: &Path) -> Result<String, OnnxExtractorError> {
    let io_error = |source| OnnxExtractorError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = BufReader::new(File::open(path).map_err(io_error)?);
    let mut hasher = Sha256::new();
    io::copy(&mut reader, &mut hasher).map_err(io_error)?;
    Ok(format!("{:x}", hasher.finalize()))
}
