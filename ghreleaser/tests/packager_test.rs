use ghreleaser::checksum::{digest_file, write_checksum, ChecksumAlgorithm};
use ghreleaser::cli::ArchiveFormat;
use ghreleaser::packager::create_archive;
use std::fs::{self, File};
use std::io::Read;
use tempfile::tempdir;

#[test]
fn test_zip_extracts_byte_identical_binary() {
    let temp_dir = tempdir().unwrap();
    let nested = temp_dir.path().join("windows");
    fs::create_dir_all(&nested).unwrap();

    let binary = nested.join("app.exe");
    let content: Vec<u8> = (0..=255u8).cycle().take(64 * 1024).collect();
    fs::write(&binary, &content).unwrap();

    let archive_path = create_archive(&binary, ArchiveFormat::Zip).unwrap();
    assert_eq!(archive_path, nested.join("app.exe.zip"));

    let extract_dir = tempdir().unwrap();
    let mut archive = zip::ZipArchive::new(File::open(&archive_path).unwrap()).unwrap();
    assert_eq!(archive.len(), 1);
    archive.extract(extract_dir.path()).unwrap();

    let extracted = fs::read(extract_dir.path().join("app.exe")).unwrap();
    assert_eq!(extracted, content);
}

#[cfg(unix)]
#[test]
fn test_zip_entry_is_executable() {
    let temp_dir = tempdir().unwrap();
    let binary = temp_dir.path().join("app");
    fs::write(&binary, b"\x7fELF").unwrap();

    let archive_path = create_archive(&binary, ArchiveFormat::Zip).unwrap();

    let mut archive = zip::ZipArchive::new(File::open(&archive_path).unwrap()).unwrap();
    let entry = archive.by_name("app").unwrap();
    assert_eq!(entry.unix_mode().unwrap() & 0o777, 0o755);
}

#[test]
fn test_tar_gz_extracts_byte_identical_binary() {
    let temp_dir = tempdir().unwrap();
    let binary = temp_dir.path().join("app");
    fs::write(&binary, b"binary content").unwrap();

    let archive_path = create_archive(&binary, ArchiveFormat::Tgz).unwrap();
    assert!(archive_path.to_string_lossy().ends_with("app.tar.gz"));

    let decoder = flate2::read::GzDecoder::new(File::open(&archive_path).unwrap());
    let mut archive = tar::Archive::new(decoder);
    let mut entry = archive.entries().unwrap().next().unwrap().unwrap();
    assert_eq!(entry.path().unwrap().to_str(), Some("app"));

    let mut content = Vec::new();
    entry.read_to_end(&mut content).unwrap();
    assert_eq!(content, b"binary content");
}

#[test]
fn test_checksum_sidecar_round_trip() {
    let temp_dir = tempdir().unwrap();
    let binary = temp_dir.path().join("app");
    fs::write(&binary, b"some compiled bytes").unwrap();

    for algorithm in [
        ChecksumAlgorithm::Md5,
        ChecksumAlgorithm::Sha1,
        ChecksumAlgorithm::Sha256,
    ] {
        let sidecar = write_checksum(&binary, temp_dir.path(), algorithm).unwrap();
        let content = fs::read_to_string(&sidecar).unwrap();

        let (hash, name) = content
            .strip_suffix('\n')
            .and_then(|line| line.split_once("  "))
            .unwrap();
        assert_eq!(name, "app");

        let referenced = temp_dir.path().join(name);
        assert_eq!(hash, digest_file(&referenced, algorithm).unwrap());
    }
}

#[test]
fn test_checksum_lengths() {
    let temp_dir = tempdir().unwrap();
    let binary = temp_dir.path().join("app");
    fs::write(&binary, b"x").unwrap();

    for (algorithm, hex_len) in [
        (ChecksumAlgorithm::Md5, 32),
        (ChecksumAlgorithm::Sha1, 40),
        (ChecksumAlgorithm::Sha256, 64),
    ] {
        let hash = digest_file(&binary, algorithm).unwrap();
        assert_eq!(hash.len(), hex_len);
        assert!(hash.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }
}
