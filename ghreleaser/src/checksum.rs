use std::fmt;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use md5::Md5;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::utils::relative_name;

/// Digest algorithms that can be written next to a binary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumAlgorithm {
    Md5,
    Sha1,
    Sha256,
}

impl ChecksumAlgorithm {
    /// Suffix used in the sidecar file name
    pub fn extension(&self) -> &'static str {
        match self {
            ChecksumAlgorithm::Md5 => "md5",
            ChecksumAlgorithm::Sha1 => "sha1",
            ChecksumAlgorithm::Sha256 => "sha256",
        }
    }

    /// Hex digest of everything readable from `reader`
    pub fn digest_reader<R: Read>(&self, reader: &mut R) -> io::Result<String> {
        match self {
            ChecksumAlgorithm::Md5 => hash_with::<Md5, _>(reader),
            ChecksumAlgorithm::Sha1 => hash_with::<Sha1, _>(reader),
            ChecksumAlgorithm::Sha256 => hash_with::<Sha256, _>(reader),
        }
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

fn hash_with<D, R>(reader: &mut R) -> io::Result<String>
where
    D: Digest + Write,
    R: Read,
{
    let mut hasher = D::new();
    io::copy(reader, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Hex digest of a file's full contents
pub fn digest_file(path: &Path, algorithm: ChecksumAlgorithm) -> Result<String> {
    let mut file = File::open(path)?;
    Ok(algorithm.digest_reader(&mut file)?)
}

/// Sidecar path for a binary: `<binary>.<algorithm>.txt`
pub fn sidecar_path(binary: &Path, algorithm: ChecksumAlgorithm) -> PathBuf {
    let mut name = binary.as_os_str().to_os_string();
    name.push(format!(".{}.txt", algorithm.extension()));
    PathBuf::from(name)
}

/// Write a checksum sidecar for `binary`.
///
/// The file holds `<hex>  <path relative to output_root>\n`, the format
/// `sha256sum -c` and friends understand.
pub fn write_checksum(
    binary: &Path,
    output_root: &Path,
    algorithm: ChecksumAlgorithm,
) -> Result<PathBuf> {
    let hash_hex = digest_file(binary, algorithm)?;
    let relative = relative_name(binary, output_root);

    let checksum_path = sidecar_path(binary, algorithm);
    let mut checksum_file = File::create(&checksum_path)?;
    writeln!(checksum_file, "{}  {}", hash_hex, relative)?;

    tracing::info!("Generated {} checksum: {}", algorithm, checksum_path.display());
    Ok(checksum_path)
}
