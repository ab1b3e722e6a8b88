//! # ghreleaser
//!
//! Cross-compile one source tree for a matrix of platforms and publish the
//! results to a GitHub release.
//!
//! ## Overview
//!
//! `ghreleaser` reads a build matrix (one `os,arch,output-name` entry per
//! line), invokes the cross-compiler once per entry, optionally writes checksum
//! sidecars and an archive next to every binary, and optionally creates a
//! GitHub release that carries everything found in the output directory.
//!
//! A failing matrix entry is logged and the remaining entries still build.
//! Publishing stops at the first failed upload.
//!
//! ## Usage
//!
//! ```bash
//! # Build every entry of ghreleaser.csv into ./build with SHA-256 sums and zips
//! ghreleaser --sum-sha256 --zip
//!
//! # Publish binaries built by an earlier step
//! GITHUB_TOKEN=... ghreleaser --skip-build --cut-release \
//!     --repository owner/repo --release-tag v1.0.0
//! ```
//!
//! ## Matrix file
//!
//! ```text
//! linux,amd64,app
//! windows,amd64,app.exe
//! ```
//!
//! ## Configuration
//!
//! Configuration can be specified in `.config/ghreleaser.toml` in your project
//! directory or `~/.config/ghreleaser.toml` for user-wide settings. Command
//! line flags take precedence.

/// Checksum sidecar generation (MD5, SHA-1, SHA-256)
pub mod checksum;

/// Command-line interface definitions and argument parsing
pub mod cli;

/// Toolchain invocation for a single build target
pub mod compiler;

/// Configuration file handling and run settings
pub mod config;

/// Error types and error handling utilities
pub mod error;

/// GitHub API client for creating releases and uploading assets
pub mod github;

/// Build matrix file parsing
pub mod matrix;

/// Build and release state machine
pub mod orchestrator;

/// Single-binary archive creation
pub mod packager;

/// Release creation and asset upload over the output directory
pub mod publisher;

/// Sequential execution of the build matrix
pub mod runner;

/// Path helpers
pub mod utils;
