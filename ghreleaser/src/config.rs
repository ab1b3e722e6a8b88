use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::checksum::ChecksumAlgorithm;
use crate::cli::{ArchiveFormat, Args};
use crate::compiler::Streams;
use crate::error::{ReleaserError, Result as ReleaserResult};
use crate::publisher::ReleaseSpec;
use crate::runner::BuildOptions;

/// Project configuration file, relative to the working directory
pub const PROJECT_CONFIG_PATH: &str = ".config/ghreleaser.toml";

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub toolchain: ToolchainConfig,

    #[serde(default)]
    pub release: ReleaseConfig,

    #[serde(default)]
    pub repository: RepositoryConfig,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct BuildConfig {
    #[serde(default = "default_matrix_file")]
    pub matrix_file: PathBuf,

    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default)]
    pub checksums: Vec<ChecksumAlgorithm>,

    /// Archive format; no archives when unset
    #[serde(default)]
    pub archive: Option<ArchiveFormat>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            matrix_file: default_matrix_file(),
            source_dir: default_source_dir(),
            output_dir: default_output_dir(),
            checksums: Vec::new(),
            archive: None,
        }
    }
}

/// How the cross-compiler is invoked.
///
/// `{output}`, `{source}`, `{os}` and `{arch}` in `args` are substituted for
/// every matrix entry. The target platform reaches the toolchain through the
/// `os_env` and `arch_env` environment variables.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ToolchainConfig {
    #[serde(default = "default_program")]
    pub program: String,

    #[serde(default = "default_toolchain_args")]
    pub args: Vec<String>,

    #[serde(default = "default_os_env")]
    pub os_env: String,

    #[serde(default = "default_arch_env")]
    pub arch_env: String,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_toolchain_args(),
            os_env: default_os_env(),
            arch_env: default_arch_env(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ReleaseConfig {
    #[serde(default = "default_draft")]
    pub draft: bool,

    #[serde(default)]
    pub prerelease: bool,

    /// Environment variable holding the GitHub token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Per-request timeout for GitHub uploads
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            draft: default_draft(),
            prerelease: false,
            token_env: default_token_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct RepositoryConfig {
    pub owner: Option<String>,
    pub repo: Option<String>,
}

fn default_matrix_file() -> PathBuf {
    PathBuf::from("ghreleaser.csv")
}

fn default_source_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("build")
}

fn default_program() -> String {
    "go".to_string()
}

fn default_toolchain_args() -> Vec<String> {
    ["build", "-o", "{output}", "{source}"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_os_env() -> String {
    "GOOS".to_string()
}

fn default_arch_env() -> String {
    "GOARCH".to_string()
}

fn default_draft() -> bool {
    true
}

fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Get the user-wide configuration file path
    pub fn default_path() -> PathBuf {
        directories::BaseDirs::new()
            .map(|dirs| dirs.config_dir().join("ghreleaser.toml"))
            .unwrap_or_else(|| PathBuf::from("~/.config/ghreleaser.toml"))
    }

    /// Load the explicit file if given, else the project file, else the user file
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                tracing::warn!("Config file {} not found, using defaults", path.display());
            }
            return Self::load(path);
        }

        let project = Path::new(PROJECT_CONFIG_PATH);
        if project.exists() {
            return Self::load(project);
        }

        Self::load(&Self::default_path())
    }

    /// Merge configuration with command line arguments
    pub fn merge_with_args(&self, args: &mut Args) {
        if args.matrix_file.is_none() {
            args.matrix_file = Some(self.build.matrix_file.clone());
        }

        if args.source_dir.is_none() {
            args.source_dir = Some(self.build.source_dir.clone());
        }

        if args.output_dir.is_none() {
            args.output_dir = Some(self.build.output_dir.clone());
        }

        if args.checksums.is_empty() {
            args.checksums = self.build.checksums.clone();
        }

        if let Some(format) = self.build.archive {
            args.zip = true;
            if args.format.is_none() {
                args.format = Some(format);
            }
        }

        if args.draft.is_none() {
            args.draft = Some(self.release.draft);
        }

        if args.prerelease.is_none() {
            args.prerelease = Some(self.release.prerelease);
        }

        // Apply repository configuration
        if args.repository.is_none() {
            if let (Some(owner), Some(repo)) = (&self.repository.owner, &self.repository.repo) {
                args.repository = Some(format!("{}/{}", owner, repo));
            }
        }
    }
}

/// Everything a run needs, resolved once from arguments and configuration
#[derive(Debug, Clone)]
pub struct Settings {
    pub matrix_file: PathBuf,
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub build: BuildOptions,
    pub toolchain: ToolchainConfig,
    pub streams: Streams,
    pub skip_build: bool,
    pub cut_release: bool,
    /// Present only when `cut_release` is set
    pub publish: Option<PublishSettings>,
}

#[derive(Debug, Clone)]
pub struct PublishSettings {
    pub owner: String,
    pub repo: String,
    pub release: ReleaseSpec,
    pub token_env: String,
    pub timeout: Duration,
}

impl Settings {
    /// Resolve settings from arguments, using `config` for whatever they leave unset
    pub fn resolve(mut args: Args, config: Config) -> ReleaserResult<Self> {
        config.merge_with_args(&mut args);

        let publish = if args.cut_release {
            let (owner, repo) = args.parse_repository()?;

            let tag = args.tag.clone().unwrap_or_default();
            if tag.trim().is_empty() {
                return Err(ReleaserError::Config(
                    "A release tag is required to cut a release (--release-tag)".to_string(),
                ));
            }

            Some(PublishSettings {
                owner,
                repo,
                release: ReleaseSpec {
                    tag,
                    name: args.name.clone().unwrap_or_default(),
                    message: args.message.clone().unwrap_or_default(),
                    commitish: args.commitish.clone().unwrap_or_default(),
                    draft: args.draft.unwrap_or(true),
                    prerelease: args.prerelease.unwrap_or(false),
                },
                token_env: config.release.token_env.clone(),
                timeout: Duration::from_secs(config.release.timeout_secs),
            })
        } else {
            None
        };

        let archive = if args.zip {
            Some(args.format.unwrap_or(ArchiveFormat::Zip))
        } else {
            None
        };

        Ok(Self {
            matrix_file: args.matrix_file.unwrap_or_else(default_matrix_file),
            source_dir: args.source_dir.unwrap_or_else(default_source_dir),
            output_dir: args.output_dir.unwrap_or_else(default_output_dir),
            build: BuildOptions {
                checksums: args.checksums,
                archive,
            },
            toolchain: config.toolchain,
            streams: if args.quiet_toolchain {
                Streams::Discard
            } else {
                Streams::Inherit
            },
            skip_build: args.skip_build,
            cut_release: args.cut_release,
            publish,
        })
    }
}
