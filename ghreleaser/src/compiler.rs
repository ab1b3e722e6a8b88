use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::config::ToolchainConfig;
use crate::error::{ReleaserError, Result};
use crate::matrix::BuildTarget;

/// Where the toolchain's stdout and stderr go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Streams {
    /// Stream live to this process's stdout/stderr
    Inherit,
    /// Drop the output
    Discard,
}

impl Streams {
    fn stdio(&self) -> Stdio {
        match self {
            Streams::Inherit => Stdio::inherit(),
            Streams::Discard => Stdio::null(),
        }
    }
}

/// Invokes the configured cross-compiler for one target at a time
#[derive(Debug, Clone)]
pub struct Compiler {
    toolchain: ToolchainConfig,
    streams: Streams,
}

impl Compiler {
    pub fn new(toolchain: ToolchainConfig, streams: Streams) -> Self {
        Self { toolchain, streams }
    }

    /// Build the command for one target without running it
    pub fn command(&self, target: &BuildTarget, source_dir: &Path, output: &Path) -> Command {
        let source = source_dir.to_string_lossy();
        let output_str = output.to_string_lossy();

        let mut cmd = Command::new(&self.toolchain.program);
        for arg in &self.toolchain.args {
            cmd.arg(
                arg.replace("{output}", &output_str)
                    .replace("{source}", &source)
                    .replace("{os}", &target.operating_system)
                    .replace("{arch}", &target.architecture),
            );
        }

        cmd.env(&self.toolchain.os_env, &target.operating_system)
            .env(&self.toolchain.arch_env, &target.architecture)
            .stdin(Stdio::null())
            .stdout(self.streams.stdio())
            .stderr(self.streams.stdio());

        cmd
    }

    /// Cross-compile `source_dir` for `target` into `output`
    pub fn compile(&self, target: &BuildTarget, source_dir: &Path, output: &Path) -> Result<()> {
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        tracing::info!("Building {} with {}", target, self.toolchain.program);

        let mut cmd = self.command(target, source_dir, output);
        tracing::debug!("Running {:?}", cmd);

        let status = cmd.status().map_err(|e| ReleaserError::Compile {
            target: target.to_string(),
            reason: format!("failed to start {}: {}", self.toolchain.program, e),
        })?;

        if !status.success() {
            return Err(ReleaserError::Compile {
                target: target.to_string(),
                reason: format!("{} exited with {}", self.toolchain.program, status),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;
    use std::path::PathBuf;

    fn default_compiler() -> Compiler {
        Compiler::new(ToolchainConfig::default(), Streams::Discard)
    }

    #[test]
    fn test_command_substitutes_placeholders() {
        let compiler = default_compiler();
        let target = BuildTarget::new("linux", "amd64", "app");
        let cmd = compiler.command(&target, Path::new("./cmd/app"), Path::new("build/app"));

        assert_eq!(cmd.get_program(), "go");
        let args: Vec<&OsStr> = cmd.get_args().collect();
        assert_eq!(args, vec!["build", "-o", "build/app", "./cmd/app"]);
    }

    #[test]
    fn test_command_sets_target_environment() {
        let compiler = default_compiler();
        let target = BuildTarget::new("windows", "arm64", "app.exe");
        let cmd = compiler.command(&target, Path::new("."), Path::new("build/app.exe"));

        let envs: Vec<(&OsStr, Option<&OsStr>)> = cmd.get_envs().collect();
        assert!(envs.contains(&(OsStr::new("GOOS"), Some(OsStr::new("windows")))));
        assert!(envs.contains(&(OsStr::new("GOARCH"), Some(OsStr::new("arm64")))));
    }

    #[test]
    fn test_missing_program_is_compile_error() {
        let toolchain = ToolchainConfig {
            program: "ghreleaser-no-such-toolchain".to_string(),
            ..ToolchainConfig::default()
        };
        let compiler = Compiler::new(toolchain, Streams::Discard);
        let dir = tempfile::tempdir().unwrap();
        let target = BuildTarget::new("linux", "amd64", "app");

        let err = compiler
            .compile(&target, dir.path(), &dir.path().join("app"))
            .unwrap_err();
        assert!(matches!(err, ReleaserError::Compile { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_compile_runs_toolchain() {
        let toolchain = ToolchainConfig {
            program: "sh".to_string(),
            args: vec![
                "-c".to_string(),
                r#"printf '%s/%s' "$OS" "$ARCH" > "$1""#.to_string(),
                "sh".to_string(),
                "{output}".to_string(),
            ],
            os_env: "OS".to_string(),
            arch_env: "ARCH".to_string(),
        };
        let compiler = Compiler::new(toolchain, Streams::Discard);
        let dir = tempfile::tempdir().unwrap();
        let output: PathBuf = dir.path().join("nested").join("app");
        let target = BuildTarget::new("linux", "arm64", "nested/app");

        compiler.compile(&target, dir.path(), &output).unwrap();

        assert_eq!(fs::read_to_string(&output).unwrap(), "linux/arm64");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_is_compile_error() {
        let toolchain = ToolchainConfig {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), "exit 3".to_string()],
            ..ToolchainConfig::default()
        };
        let compiler = Compiler::new(toolchain, Streams::Discard);
        let dir = tempfile::tempdir().unwrap();
        let target = BuildTarget::new("plan9", "386", "app");

        let err = compiler
            .compile(&target, dir.path(), &dir.path().join("app"))
            .unwrap_err();
        match err {
            ReleaserError::Compile { target, reason } => {
                assert_eq!(target, "plan9/386 (app)");
                assert!(reason.contains("exited with"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
