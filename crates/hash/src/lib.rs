#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Artifact checksums for pkgrepo
//!
//! Repositories publish `<file>.sha256` / `<file>.sha1` sidecars next to each
//! artifact. This crate computes those digests, parses sidecar text and
//! verifies files against it.

use pkgrepo_errors::Error;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// Size of chunks for streaming hash computation
const CHUNK_SIZE: usize = 64 * 1024; // 64KB

/// Digest algorithms understood in sidecar files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumAlgorithm {
    Sha256,
    Sha1,
}

impl ChecksumAlgorithm {
    /// Sidecar lookup order, strongest first
    pub const PREFERENCE: [ChecksumAlgorithm; 2] = [Self::Sha256, Self::Sha1];

    /// Sidecar file extension without the dot
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha1 => "sha1",
        }
    }

    /// Length of the hex digest
    #[must_use]
    pub fn hex_len(self) -> usize {
        match self {
            Self::Sha256 => 64,
            Self::Sha1 => 40,
        }
    }

    #[must_use]
    pub fn hasher(self) -> Hasher {
        match self {
            Self::Sha256 => Hasher::Sha256(Sha256::new()),
            Self::Sha1 => Hasher::Sha1(Sha1::new()),
        }
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Incremental digest over one of the supported algorithms
#[derive(Clone)]
pub enum Hasher {
    Sha256(Sha256),
    Sha1(Sha1),
}

impl Hasher {
    pub fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha256(h) => h.update(data),
            Self::Sha1(h) => h.update(data),
        }
    }

    #[must_use]
    pub fn finalize(self) -> Checksum {
        match self {
            Self::Sha256(h) => Checksum {
                algorithm: ChecksumAlgorithm::Sha256,
                hex: hex::encode(h.finalize()),
            },
            Self::Sha1(h) => Checksum {
                algorithm: ChecksumAlgorithm::Sha1,
                hex: hex::encode(h.finalize()),
            },
        }
    }
}

impl fmt::Debug for Hasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let algorithm = match self {
            Self::Sha256(_) => ChecksumAlgorithm::Sha256,
            Self::Sha1(_) => ChecksumAlgorithm::Sha1,
        };
        f.debug_tuple("Hasher").field(&algorithm).finish()
    }
}

/// A hex digest tagged with its algorithm. Hex is stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum {
    algorithm: ChecksumAlgorithm,
    hex: String,
}

impl Checksum {
    /// Build from a hex digest, rejecting wrong lengths and non-hex input.
    #[must_use]
    pub fn from_hex(algorithm: ChecksumAlgorithm, hex: &str) -> Option<Self> {
        let hex = hex.trim();
        if hex.len() == algorithm.hex_len() && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            Some(Self {
                algorithm,
                hex: hex.to_ascii_lowercase(),
            })
        } else {
            None
        }
    }

    /// Parse the contents of a sidecar file.
    ///
    /// Accepts a bare digest, `digest  filename` as written by `sha256sum`,
    /// and `SHA256 (file) = digest`. The first token of the right shape wins.
    #[must_use]
    pub fn parse_sidecar(algorithm: ChecksumAlgorithm, text: &str) -> Option<Self> {
        text.split(|c: char| c.is_whitespace() || c == '=')
            .find_map(|token| Self::from_hex(algorithm, token))
    }

    /// Compute the digest of a byte slice
    #[must_use]
    pub fn from_data(algorithm: ChecksumAlgorithm, data: &[u8]) -> Self {
        let mut hasher = algorithm.hasher();
        hasher.update(data);
        hasher.finalize()
    }

    /// Compute the digest of a file
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or read.
    pub async fn hash_file(algorithm: ChecksumAlgorithm, path: &Path) -> Result<Self, Error> {
        let mut file = File::open(path)
            .await
            .map_err(|e| Error::io_with_path(&e, path))?;

        let mut hasher = algorithm.hasher();
        let mut buffer = vec![0; CHUNK_SIZE];

        loop {
            let n = file
                .read(&mut buffer)
                .await
                .map_err(|e| Error::io_with_path(&e, path))?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }

        Ok(hasher.finalize())
    }

    #[must_use]
    pub fn algorithm(&self) -> ChecksumAlgorithm {
        self.algorithm
    }

    #[must_use]
    pub fn to_hex(&self) -> &str {
        &self.hex
    }

    /// Text written to a sidecar file
    #[must_use]
    pub fn sidecar_contents(&self) -> String {
        format!("{}\n", self.hex)
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.hex)
    }
}

/// Verify a file matches an expected checksum
///
/// # Errors
/// Returns an error if the file cannot be read or hashed.
pub async fn verify_file(path: &Path, expected: &Checksum) -> Result<bool, Error> {
    let actual = Checksum::hash_file(expected.algorithm(), path).await?;
    Ok(actual == *expected)
}
