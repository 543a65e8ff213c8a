//! Scenario definition for headless motion diagnostics.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::screen::ScreenKind;

/// A screen to mount and the steps to run against it.
#[derive(Debug, Clone, Deserialize)]
pub struct HeadlessScenario {
    pub screen: ScreenKind,
    pub steps: Vec<ScenarioStep>,
}

impl HeadlessScenario {
    /// Load a scenario from JSON text.
    pub fn from_json(input: &str) -> Result<Self> {
        let scenario: Self = serde_json::from_str(input)?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> Result<()> {
        for (index, step) in self.steps.iter().enumerate() {
            if let ScenarioStep::AssertValue { tolerance, .. } = step {
                if tolerance.is_nan() || *tolerance < 0.0 {
                    bail!("step {index}: tolerance must be >= 0, got {tolerance}");
                }
            }
        }
        Ok(())
    }

    /// Load a scenario from file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("Failed to parse scenario {}", path.display()))
    }
}

fn default_tolerance() -> f64 {
    1e-6
}

/// Scenario steps, applied in order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScenarioStep {
    /// Advance logical time by `ms`, one frame per tick
    Wait { ms: u64 },
    /// Advance a whole number of frames
    Tick { frames: u32 },
    Press { target: String },
    Unmount,
    AssertValue {
        element: String,
        property: String,
        expected: f64,
        #[serde(default = "default_tolerance")]
        tolerance: f64,
    },
    /// The screen has asked to navigate to `to` at some point so far
    AssertNavigated { to: String },
}

impl ScenarioStep {
    /// Assertion name used in reports
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioStep::Wait { .. } => "wait",
            ScenarioStep::Tick { .. } => "tick",
            ScenarioStep::Press { .. } => "press",
            ScenarioStep::Unmount => "unmount",
            ScenarioStep::AssertValue { .. } => "assert_value",
            ScenarioStep::AssertNavigated { .. } => "assert_navigated",
        }
    }
}
