use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::Result;

/// One entry of the build matrix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTarget {
    pub operating_system: String,
    pub architecture: String,
    pub output_name: String,
}

impl BuildTarget {
    pub fn new(
        operating_system: impl Into<String>,
        architecture: impl Into<String>,
        output_name: impl Into<String>,
    ) -> Self {
        Self {
            operating_system: operating_system.into(),
            architecture: architecture.into(),
            output_name: output_name.into(),
        }
    }

    /// Parse a single `os,arch,name` line
    pub fn parse_line(line: &str) -> Option<Self> {
        let parts: Vec<&str> = line.split(',').collect();
        if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
            return None;
        }

        Some(Self::new(parts[0], parts[1], parts[2]))
    }
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} ({})",
            self.operating_system, self.architecture, self.output_name
        )
    }
}

/// Read build targets from a matrix file
pub fn read_matrix(path: &Path) -> Result<Vec<BuildTarget>> {
    let file = File::open(path)?;
    parse_matrix(BufReader::new(file))
}

/// Parse build targets, skipping malformed lines with a warning
pub fn parse_matrix<R: BufRead>(reader: R) -> Result<Vec<BuildTarget>> {
    let mut targets = Vec::new();

    for (index, raw) in reader.split(b'\n').enumerate() {
        let mut raw = raw?;
        if raw.last() == Some(&b'\r') {
            raw.pop();
        }

        let line = match String::from_utf8(raw) {
            Ok(line) => line,
            Err(_) => {
                tracing::warn!("Skipping matrix line {}: not valid UTF-8", index + 1);
                continue;
            }
        };

        match BuildTarget::parse_line(&line) {
            Some(target) => targets.push(target),
            None => {
                tracing::warn!("Skipping invalid matrix line {}: {:?}", index + 1, line);
            }
        }
    }

    Ok(targets)
}
