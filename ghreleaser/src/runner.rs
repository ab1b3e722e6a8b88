use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::checksum::{self, ChecksumAlgorithm};
use crate::cli::ArchiveFormat;
use crate::compiler::Compiler;
use crate::error::ReleaserError;
use crate::matrix::BuildTarget;
use crate::packager;

/// Post-build steps to run for every successfully compiled target
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOptions {
    pub checksums: Vec<ChecksumAlgorithm>,
    pub archive: Option<ArchiveFormat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Binary,
    ChecksumFile,
    Archive,
}

/// A file produced for one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildArtifact {
    pub path: PathBuf,
    pub kind: ArtifactKind,
}

/// Pipeline stage a failure originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Compile,
    Checksum(ChecksumAlgorithm),
    Archive,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Compile => write!(f, "compile"),
            Stage::Checksum(algorithm) => write!(f, "{algorithm} checksum"),
            Stage::Archive => write!(f, "archive"),
        }
    }
}

#[derive(Debug)]
pub struct StageFailure {
    pub stage: Stage,
    pub error: ReleaserError,
}

/// Result of running the pipeline for a single matrix entry
#[derive(Debug)]
pub struct TargetOutcome {
    pub target: BuildTarget,
    pub artifacts: Vec<BuildArtifact>,
    pub failures: Vec<StageFailure>,
}

impl TargetOutcome {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct BuildReport {
    pub outcomes: Vec<TargetOutcome>,
}

impl BuildReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// Builds every matrix entry in order, isolating failures per entry
pub struct MatrixRunner<'a> {
    compiler: &'a Compiler,
    options: &'a BuildOptions,
    source_dir: &'a Path,
    output_dir: &'a Path,
}

impl<'a> MatrixRunner<'a> {
    pub fn new(
        compiler: &'a Compiler,
        options: &'a BuildOptions,
        source_dir: &'a Path,
        output_dir: &'a Path,
    ) -> Self {
        Self {
            compiler,
            options,
            source_dir,
            output_dir,
        }
    }

    pub fn run(&self, targets: &[BuildTarget]) -> BuildReport {
        let mut report = BuildReport::default();

        for target in targets {
            let start = Instant::now();
            let outcome = self.run_target(target);

            if outcome.is_success() {
                tracing::info!("Built {} in {:?}", target, start.elapsed());
            } else {
                tracing::warn!(
                    "Finished {} with {} failed step(s) in {:?}",
                    target,
                    outcome.failures.len(),
                    start.elapsed()
                );
            }

            report.outcomes.push(outcome);
        }

        tracing::info!(
            "Build matrix finished: {} succeeded, {} failed",
            report.succeeded(),
            report.failed()
        );
        report
    }

    /// Compile one target, then run each post-build step independently
    pub fn run_target(&self, target: &BuildTarget) -> TargetOutcome {
        let mut outcome = TargetOutcome {
            target: target.clone(),
            artifacts: Vec::new(),
            failures: Vec::new(),
        };

        let binary = self.output_dir.join(&target.output_name);

        if let Err(e) = self.compiler.compile(target, self.source_dir, &binary) {
            record_failure(&mut outcome, Stage::Compile, e);
            return outcome;
        }
        outcome.artifacts.push(BuildArtifact {
            path: binary.clone(),
            kind: ArtifactKind::Binary,
        });

        for &algorithm in &self.options.checksums {
            match checksum::write_checksum(&binary, self.output_dir, algorithm) {
                Ok(path) => outcome.artifacts.push(BuildArtifact {
                    path,
                    kind: ArtifactKind::ChecksumFile,
                }),
                Err(e) => record_failure(&mut outcome, Stage::Checksum(algorithm), e),
            }
        }

        if let Some(format) = self.options.archive {
            match packager::create_archive(&binary, format) {
                Ok(path) => outcome.artifacts.push(BuildArtifact {
                    path,
                    kind: ArtifactKind::Archive,
                }),
                Err(e) => record_failure(&mut outcome, Stage::Archive, e),
            }
        }

        outcome
    }
}

fn record_failure(outcome: &mut TargetOutcome, stage: Stage, error: ReleaserError) {
    tracing::error!("{} failed for {}: {}", stage, outcome.target, error);
    outcome.failures.push(StageFailure { stage, error });
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::compiler::Streams;
    use crate::config::ToolchainConfig;
    use std::fs;
    use tempfile::tempdir;

    /// A toolchain that writes `os/arch` into the output, failing for `fail` as OS
    fn script_compiler() -> Compiler {
        let toolchain = ToolchainConfig {
            program: "sh".to_string(),
            args: vec![
                "-c".to_string(),
                r#"[ "$GOOS" = fail ] && exit 1; printf '%s/%s' "$GOOS" "$GOARCH" > "$1""#
                    .to_string(),
                "sh".to_string(),
                "{output}".to_string(),
            ],
            ..ToolchainConfig::default()
        };
        Compiler::new(toolchain, Streams::Discard)
    }

    #[test]
    fn test_failed_target_does_not_stop_the_matrix() {
        let dir = tempdir().unwrap();
        let compiler = script_compiler();
        let options = BuildOptions {
            checksums: vec![ChecksumAlgorithm::Sha256],
            archive: Some(ArchiveFormat::Zip),
        };
        let runner = MatrixRunner::new(&compiler, &options, dir.path(), dir.path());

        let targets = vec![
            BuildTarget::new("fail", "amd64", "broken"),
            BuildTarget::new("linux", "amd64", "app"),
        ];
        let report = runner.run(&targets);

        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.outcomes[0].failures[0].stage, Stage::Compile);
        assert!(report.outcomes[0].artifacts.is_empty());
        assert!(!dir.path().join("broken.sha256.txt").exists());

        assert!(report.outcomes[1].is_success());
        assert_eq!(report.outcomes[1].artifacts.len(), 3);
        assert_eq!(
            fs::read_to_string(dir.path().join("app")).unwrap(),
            "linux/amd64"
        );
        assert!(dir.path().join("app.sha256.txt").exists());
        assert!(dir.path().join("app.zip").exists());
    }

    #[test]
    fn test_each_target_gets_its_own_environment() {
        let dir = tempdir().unwrap();
        let compiler = script_compiler();
        let options = BuildOptions::default();
        let runner = MatrixRunner::new(&compiler, &options, dir.path(), dir.path());

        let targets = vec![
            BuildTarget::new("linux", "arm64", "app-linux"),
            BuildTarget::new("darwin", "amd64", "app-darwin"),
        ];
        let report = runner.run(&targets);

        assert!(report.is_success());
        assert_eq!(
            fs::read_to_string(dir.path().join("app-linux")).unwrap(),
            "linux/arm64"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("app-darwin")).unwrap(),
            "darwin/amd64"
        );
    }

    #[test]
    fn test_post_build_steps_are_independent() {
        let dir = tempdir().unwrap();
        let compiler = script_compiler();
        let options = BuildOptions {
            checksums: vec![ChecksumAlgorithm::Md5, ChecksumAlgorithm::Sha1],
            archive: Some(ArchiveFormat::Zip),
        };
        let runner = MatrixRunner::new(&compiler, &options, dir.path(), dir.path());

        // A directory where the md5 sidecar should go makes that one step fail
        fs::create_dir_all(dir.path().join("app.md5.txt")).unwrap();

        let outcome = runner.run_target(&BuildTarget::new("linux", "amd64", "app"));

        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(
            outcome.failures[0].stage,
            Stage::Checksum(ChecksumAlgorithm::Md5)
        );
        let kinds: Vec<ArtifactKind> = outcome.artifacts.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ArtifactKind::Binary,
                ArtifactKind::ChecksumFile,
                ArtifactKind::Archive
            ]
        );
        assert!(dir.path().join("app.sha1.txt").is_file());
        assert!(dir.path().join("app.zip").is_file());
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Compile.to_string(), "compile");
        assert_eq!(
            Stage::Checksum(ChecksumAlgorithm::Sha256).to_string(),
            "sha256 checksum"
        );
        assert_eq!(Stage::Archive.to_string(), "archive");
    }
}
