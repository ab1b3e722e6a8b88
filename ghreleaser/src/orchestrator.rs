use std::fmt;
use std::fs;
use std::time::Instant;

use crate::compiler::Compiler;
use crate::config::{PublishSettings, Settings};
use crate::error::{ReleaserError, Result};
use crate::github::GitHubClient;
use crate::matrix;
use crate::publisher::{self, PublishReport, ReleaseApi};
use crate::runner::{BuildReport, MatrixRunner};

/// Phases a run moves through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Building,
    Publishing,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Building => "building",
            Phase::Publishing => "publishing",
            Phase::Done => "done",
        };
        f.write_str(name)
    }
}

/// What happened during a run
#[derive(Debug)]
pub struct RunSummary {
    pub phases: Vec<Phase>,
    pub build: Option<BuildReport>,
    pub build_error: Option<ReleaserError>,
    pub release: Option<PublishReport>,
    pub publish_error: Option<ReleaserError>,
}

impl RunSummary {
    fn new() -> Self {
        Self {
            phases: vec![Phase::Idle],
            build: None,
            build_error: None,
            release: None,
            publish_error: None,
        }
    }

    fn enter(&mut self, phase: Phase) {
        tracing::debug!("Entering phase: {}", phase);
        self.phases.push(phase);
    }

    pub fn is_success(&self) -> bool {
        self.build_error.is_none()
            && self.publish_error.is_none()
            && self.build.as_ref().map_or(true, BuildReport::is_success)
    }
}

/// Drives the build matrix and the release publication for one run
pub struct Releaser {
    settings: Settings,
    compiler: Compiler,
}

impl Releaser {
    pub fn new(settings: Settings) -> Self {
        let compiler = Compiler::new(settings.toolchain.clone(), settings.streams);
        Self { settings, compiler }
    }

    /// Run against GitHub, reading the token when publishing starts
    pub async fn run(&self) -> Result<RunSummary> {
        self.run_with(|publish| {
            GitHubClient::from_env(&publish.token_env, publish.timeout)
        })
        .await
    }

    /// Run with a caller-supplied release API.
    ///
    /// `connect` is only called when a release is cut. Its errors are fatal.
    pub async fn run_with<A, F>(&self, connect: F) -> Result<RunSummary>
    where
        A: ReleaseApi + Sync,
        F: FnOnce(&PublishSettings) -> Result<A>,
    {
        let mut summary = RunSummary::new();

        if self.settings.skip_build {
            tracing::info!("Skipping build step");
        } else {
            summary.enter(Phase::Building);
            let start = Instant::now();
            match self.build() {
                Ok(report) => summary.build = Some(report),
                Err(e) => {
                    tracing::error!("Build step failed: {}", e);
                    summary.build_error = Some(e);
                }
            }
            tracing::info!("Build operation took {:?}", start.elapsed());
        }

        if self.settings.cut_release && summary.build_error.is_none() {
            if let Some(publish) = &self.settings.publish {
                summary.enter(Phase::Publishing);
                let start = Instant::now();
                let api = connect(publish)?;

                match self.publish_with(&api, publish).await {
                    Ok(report) => summary.release = Some(report),
                    Err(e) => {
                        tracing::error!("Release failed: {}", e);
                        summary.publish_error = Some(e);
                    }
                }
                tracing::info!("Release operation took {:?}", start.elapsed());
            }
        } else if self.settings.cut_release {
            tracing::warn!("Not cutting a release because the build step failed");
        }

        summary.enter(Phase::Done);
        Ok(summary)
    }

    /// Read the matrix and build every entry into the output directory
    pub fn build(&self) -> Result<BuildReport> {
        let targets = matrix::read_matrix(&self.settings.matrix_file)?;
        tracing::info!(
            "Read {} target(s) from {}",
            targets.len(),
            self.settings.matrix_file.display()
        );

        fs::create_dir_all(&self.settings.output_dir)?;

        let runner = MatrixRunner::new(
            &self.compiler,
            &self.settings.build,
            &self.settings.source_dir,
            &self.settings.output_dir,
        );
        Ok(runner.run(&targets))
    }

    async fn publish_with<A>(&self, api: &A, publish: &PublishSettings) -> Result<PublishReport>
    where
        A: ReleaseApi + Sync,
    {
        publisher::publish(
            api,
            &publish.owner,
            &publish.repo,
            &publish.release,
            &self.settings.output_dir,
        )
        .await
    }
}
