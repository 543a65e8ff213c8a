//! Report output model for headless diagnostics runs.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Component, Path};

use crate::screen::ScreenKind;

/// Report status for a headless diagnostics run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Passed,
    Failed,
}

/// How far a run got before its report was cut
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunProgress {
    pub elapsed_frames: u64,
    pub elapsed_ms: u64,
    /// Navigation requests in the order the screen raised them
    #[serde(default)]
    pub navigations: Vec<String>,
}

/// Machine-readable result of a headless diagnostics run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadlessReport {
    pub screen: ScreenKind,
    pub status: ReportStatus,
    pub failed_step_index: Option<usize>,
    pub assertion: Option<String>,
    pub message: Option<String>,
    #[serde(flatten)]
    pub progress: RunProgress,
}

impl HeadlessReport {
    pub fn passed(screen: ScreenKind, progress: RunProgress) -> Self {
        Self {
            screen,
            status: ReportStatus::Passed,
            failed_step_index: None,
            assertion: None,
            message: None,
            progress,
        }
    }

    pub fn failed(
        screen: ScreenKind,
        assertion: &str,
        failed_step_index: usize,
        message: String,
        progress: RunProgress,
    ) -> Self {
        Self {
            screen,
            status: ReportStatus::Failed,
            failed_step_index: Some(failed_step_index),
            assertion: Some(assertion.to_string()),
            message: Some(message),
            progress,
        }
    }

    pub fn is_passed(&self) -> bool {
        self.status == ReportStatus::Passed
    }

    pub fn write_to_path(&self, path: &Path) -> Result<()> {
        if path.is_absolute() || path.has_root() {
            bail!("report path must be relative and must not start with a separator");
        }
        if path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
        {
            bail!("report path cannot contain '..' or drive prefixes");
        }
        let payload = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }
        std::fs::write(path, payload)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        Ok(())
    }

    pub fn write_to_writer<W: Write>(&self, writer: &mut W) -> Result<()> {
        let payload = serde_json::to_string_pretty(self)?;
        writer.write_all(payload.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}
