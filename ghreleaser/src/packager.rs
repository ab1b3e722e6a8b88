use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::cli::ArchiveFormat;
use crate::error::{ReleaserError, Result};
use crate::utils::base_name;

/// Archive path for a binary: `<binary>.zip` or `<binary>.tar.gz`
pub fn archive_path(binary: &Path, format: ArchiveFormat) -> PathBuf {
    let mut name = binary.as_os_str().to_os_string();
    name.push(format.extension());
    PathBuf::from(name)
}

/// Wrap a single binary into an archive next to it.
///
/// The entry is named by the binary's base filename. The binary is left in place.
pub fn create_archive(binary: &Path, format: ArchiveFormat) -> Result<PathBuf> {
    let entry_name = base_name(binary).ok_or_else(|| {
        ReleaserError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Invalid binary path: {}", binary.display()),
        ))
    })?;

    // Open the source first so a missing binary leaves no empty archive behind
    let mut source = File::open(binary)?;
    let path = archive_path(binary, format);

    match format {
        ArchiveFormat::Zip => create_zip(&path, entry_name, &mut source)?,
        ArchiveFormat::Tgz => create_tar_gz(&path, entry_name, &mut source)?,
    }

    tracing::info!("Created archive: {}", path.display());
    Ok(path)
}

/// Create a zip archive with one entry
fn create_zip(archive_path: &Path, entry_name: &str, source: &mut File) -> Result<()> {
    let file = File::create(archive_path)?;
    let mut zip = zip::ZipWriter::new(file);

    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .unix_permissions(0o755);

    zip.start_file(entry_name, options)?;
    io::copy(source, &mut zip)?;

    let mut file = zip.finish()?;
    file.flush()?;
    Ok(())
}

/// Create a tar.gz archive with one entry
fn create_tar_gz(archive_path: &Path, entry_name: &str, source: &mut File) -> Result<()> {
    let tar_file = File::create(archive_path)?;
    let gz_encoder = flate2::write::GzEncoder::new(tar_file, flate2::Compression::default());
    let mut tar_builder = tar::Builder::new(gz_encoder);

    tar_builder.append_file(entry_name, source)?;

    let gz_encoder = tar_builder.into_inner()?;
    gz_encoder.finish()?;
    Ok(())
}
