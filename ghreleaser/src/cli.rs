use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::checksum::ChecksumAlgorithm;
use crate::error::{ReleaserError, Result};

#[derive(Parser, Debug, Clone)]
#[clap(
    name = "ghreleaser",
    version,
    about = "Cross-compile a build matrix and publish the binaries to a GitHub release",
    long_about = None
)]
pub struct GhreleaserCli {
    /// Configuration file path
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Build matrix file, one `os,arch,name` entry per line
    #[clap(long)]
    pub matrix_file: Option<PathBuf>,

    /// Source directory handed to the toolchain
    #[clap(long)]
    pub src_dir: Option<PathBuf>,

    /// Binary output directory
    #[clap(long)]
    pub out_dir: Option<PathBuf>,

    /// Write an MD5 sum file next to each binary
    #[clap(long)]
    pub sum_md5: bool,

    /// Write a SHA-1 sum file next to each binary
    #[clap(long)]
    pub sum_sha1: bool,

    /// Write a SHA-256 sum file next to each binary
    #[clap(long)]
    pub sum_sha256: bool,

    /// Archive each binary
    #[clap(long)]
    pub zip: bool,

    /// Archive format (zip or tgz)
    #[clap(short, long)]
    pub format: Option<ArchiveFormat>,

    /// Skip the build step, e.g. when the binaries were built elsewhere
    #[clap(long)]
    pub skip_build: bool,

    /// Create a GitHub release and upload everything in the output directory
    #[clap(long)]
    pub cut_release: bool,

    /// GitHub repository (owner/repo)
    #[clap(long)]
    pub repository: Option<String>,

    /// Release tag
    #[clap(long)]
    pub release_tag: Option<String>,

    /// Release name
    #[clap(long)]
    pub release_name: Option<String>,

    /// Release body
    #[clap(long)]
    pub release_message: Option<String>,

    /// Commit, branch or SHA the tag is created from
    #[clap(long)]
    pub release_commitish: Option<String>,

    /// Create the release as a draft [default: true]
    #[clap(long, action = clap::ArgAction::Set)]
    pub release_draft: Option<bool>,

    /// Mark the release as a prerelease [default: false]
    #[clap(long, action = clap::ArgAction::Set)]
    pub release_prerelease: Option<bool>,

    /// Discard toolchain output instead of streaming it
    #[clap(long)]
    pub quiet_toolchain: bool,

    /// Enable verbose output
    #[clap(long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Args {
    pub config: Option<PathBuf>,
    pub matrix_file: Option<PathBuf>,
    pub source_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub checksums: Vec<ChecksumAlgorithm>,
    pub zip: bool,
    pub format: Option<ArchiveFormat>,
    pub skip_build: bool,
    pub cut_release: bool,
    pub repository: Option<String>,
    pub tag: Option<String>,
    pub name: Option<String>,
    pub message: Option<String>,
    pub commitish: Option<String>,
    pub draft: Option<bool>,
    pub prerelease: Option<bool>,
    pub quiet_toolchain: bool,
    pub verbose: bool,
}

impl From<GhreleaserCli> for Args {
    fn from(cli: GhreleaserCli) -> Self {
        let mut checksums = Vec::new();
        if cli.sum_md5 {
            checksums.push(ChecksumAlgorithm::Md5);
        }
        if cli.sum_sha1 {
            checksums.push(ChecksumAlgorithm::Sha1);
        }
        if cli.sum_sha256 {
            checksums.push(ChecksumAlgorithm::Sha256);
        }

        Args {
            config: cli.config,
            matrix_file: cli.matrix_file,
            source_dir: cli.src_dir,
            output_dir: cli.out_dir,
            checksums,
            // Picking a format implies archiving
            zip: cli.zip || cli.format.is_some(),
            format: cli.format,
            skip_build: cli.skip_build,
            cut_release: cli.cut_release,
            repository: cli.repository,
            tag: cli.release_tag,
            name: cli.release_name,
            message: cli.release_message,
            commitish: cli.release_commitish,
            draft: cli.release_draft,
            prerelease: cli.release_prerelease,
            quiet_toolchain: cli.quiet_toolchain,
            verbose: cli.verbose,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveFormat {
    Zip,
    Tgz,
}

impl ArchiveFormat {
    /// Suffix appended to the binary path
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveFormat::Zip => ".zip",
            ArchiveFormat::Tgz => ".tar.gz",
        }
    }
}

impl std::fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArchiveFormat::Zip => write!(f, "zip"),
            ArchiveFormat::Tgz => write!(f, "tgz"),
        }
    }
}

impl Args {
    /// Parse the `owner/repo` repository argument
    pub fn parse_repository(&self) -> Result<(String, String)> {
        let repo = self.repository.as_deref().ok_or_else(|| {
            ReleaserError::Config(
                "No repository given. Use --repository owner/repo or [repository] in the config file"
                    .to_string(),
            )
        })?;

        let parts: Vec<&str> = repo.split('/').collect();
        if parts.len() != 2 || parts.iter().any(|p| p.is_empty()) {
            return Err(ReleaserError::Config(format!(
                "Invalid repository format '{repo}'. Expected: owner/repo"
            )));
        }

        Ok((parts[0].to_string(), parts[1].to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_flags_keep_algorithm_order() {
        let cli = GhreleaserCli::parse_from([
            "ghreleaser",
            "--sum-sha256",
            "--sum-md5",
        ]);
        let args: Args = cli.into();
        assert_eq!(
            args.checksums,
            vec![ChecksumAlgorithm::Md5, ChecksumAlgorithm::Sha256]
        );
    }

    #[test]
    fn test_release_flags() {
        let cli = GhreleaserCli::parse_from([
            "ghreleaser",
            "--cut-release",
            "--release-tag",
            "v1.0.0",
            "--release-draft",
            "false",
            "--release-prerelease",
            "true",
        ]);
        let args: Args = cli.into();
        assert!(args.cut_release);
        assert_eq!(args.tag.as_deref(), Some("v1.0.0"));
        assert_eq!(args.draft, Some(false));
        assert_eq!(args.prerelease, Some(true));
    }

    #[test]
    fn test_format_implies_archive() {
        let cli = GhreleaserCli::parse_from(["ghreleaser", "--format", "tgz"]);
        let args: Args = cli.into();
        assert!(args.zip);
        assert_eq!(args.format, Some(ArchiveFormat::Tgz));
    }

    #[test]
    fn test_unset_flags_stay_unset() {
        let args: Args = GhreleaserCli::parse_from(["ghreleaser"]).into();
        assert!(args.checksums.is_empty());
        assert!(!args.zip);
        assert!(args.draft.is_none());
        assert!(args.output_dir.is_none());
    }
}
