//! Scenario runner that executes headless diagnostics goals.

use anyhow::Result;
use tracing::{debug, info};

use crate::config::GreenhouseConfig;
use crate::headless_assert::{evaluate_assert_navigated, evaluate_assert_value, AssertionResult};
use crate::headless_report::HeadlessReport;
use crate::headless_runtime::{HeadlessRunConfig, HeadlessRuntime};
use crate::headless_scenario::{HeadlessScenario, ScenarioStep};

/// Final outcome of a scenario run.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Passed { report: HeadlessReport },
    Failed { report: HeadlessReport },
}

impl RunOutcome {
    pub fn report(&self) -> &HeadlessReport {
        match self {
            RunOutcome::Passed { report } => report,
            RunOutcome::Failed { report } => report,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RunOutcome::Failed { .. })
    }
}

/// Execute scenario JSON with the frame settings from `config`.
pub fn run_scenario(input: &str, config: &GreenhouseConfig) -> Result<RunOutcome> {
    let scenario = HeadlessScenario::from_json(input)?;
    run_loaded_scenario(&scenario, config.headless.run_config(), config)
}

/// Execute a pre-loaded scenario.
///
/// Failed assertions end the run with a failed report. Errors are reserved
/// for runs that could not be carried out at all: an invalid frame setup, a
/// screen that fails to mount, or an exhausted frame budget.
pub fn run_loaded_scenario(
    scenario: &HeadlessScenario,
    runtime_cfg: HeadlessRunConfig,
    config: &GreenhouseConfig,
) -> Result<RunOutcome> {
    let mut runtime = HeadlessRuntime::new(scenario.screen, runtime_cfg, config)?;

    for (step_index, step) in scenario.steps.iter().enumerate() {
        debug!(step_index, step = step.name(), at_ms = runtime.elapsed_ms(), "scenario step");
        let result = match step {
            ScenarioStep::Wait { ms } => {
                runtime.wait(*ms)?;
                AssertionResult::Passed
            }
            ScenarioStep::Tick { frames } => {
                runtime.run_frames(*frames)?;
                AssertionResult::Passed
            }
            ScenarioStep::Press { target } => match runtime.press(target) {
                Ok(true) => AssertionResult::Passed,
                Ok(false) => AssertionResult::Failed {
                    code: "unknown_target".to_string(),
                    message: format!(
                        "{}: no pressable element '{target}'",
                        scenario.screen
                    ),
                },
                Err(err) => AssertionResult::Failed {
                    code: "press_rejected".to_string(),
                    message: format!("{target}: {err:#}"),
                },
            },
            ScenarioStep::Unmount => {
                runtime.unmount();
                AssertionResult::Passed
            }
            ScenarioStep::AssertValue {
                element,
                property,
                expected,
                tolerance,
            } => evaluate_assert_value(element, property, *expected, *tolerance, &runtime.frame()),
            ScenarioStep::AssertNavigated { to } => {
                evaluate_assert_navigated(to, runtime.navigations())
            }
        };

        if let AssertionResult::Failed { code, message } = result {
            info!(step_index, %code, "scenario failed");
            let report = HeadlessReport::failed(
                scenario.screen,
                step.name(),
                step_index,
                message,
                runtime.progress(),
            );
            return Ok(RunOutcome::Failed { report });
        }
    }

    Ok(RunOutcome::Passed {
        report: HeadlessReport::passed(scenario.screen, runtime.progress()),
    })
}
