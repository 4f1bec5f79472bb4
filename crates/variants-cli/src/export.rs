//! Environment variable export.
//!
//! The default target is envman, the Bitrise collaborator that makes
//! variables visible to subsequent steps. When an env file is configured,
//! KEY=VALUE lines are appended to it instead, which also keeps local runs
//! and tests off the envman binary.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};
use tracing::info;

pub enum Exporter {
    Envman,
    EnvFile(File),
}

impl Exporter {
    pub fn envman() -> Self {
        Exporter::Envman
    }

    pub fn env_file(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open env file {}", path.display()))?;
        Ok(Exporter::EnvFile(file))
    }

    /// Export one variable, logging the exported pair.
    pub fn export(&mut self, key: &str, value: &str) -> Result<()> {
        info!("{} = {}", key, value);
        match self {
            Exporter::Envman => {
                let status = Command::new("envman")
                    .args(["add", "--key", key, "--value", value])
                    .status()
                    .context("failed to run envman")?;
                if !status.success() {
                    bail!("envman add exited with {} for {}", status, key);
                }
                Ok(())
            }
            Exporter::EnvFile(file) => writeln!(file, "{}={}", key, value)
                .context("failed to write env file"),
        }
    }
}
