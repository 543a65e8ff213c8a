//! Greenhouse Screens
//!
//! The animated screens of the Greenhouse app, each bound to its own
//! orchestration session, plus a headless harness that mounts a screen over
//! a manual clock and checks its motion frame by frame.
//!
//! # Example
//!
//! ```rust
//! use greenhouse_screens::{run_scenario, GreenhouseConfig};
//!
//! let outcome = run_scenario(
//!     r#"{
//!         "screen": "home",
//!         "steps": [
//!             { "type": "press", "target": "box" },
//!             { "type": "wait", "ms": 500 },
//!             { "type": "assert_value", "element": "box", "property": "rotate_y", "expected": 360.0 },
//!             { "type": "assert_navigated", "to": "NextScreen" }
//!         ]
//!     }"#,
//!     &GreenhouseConfig::default(),
//! )
//! .unwrap();
//! assert!(!outcome.is_failed());
//! ```

pub mod config;
pub mod frame;
pub mod headless_assert;
pub mod headless_report;
pub mod headless_runner;
pub mod headless_runtime;
pub mod headless_scenario;
pub mod home;
pub mod screen;
pub mod settings;
pub mod splash;

pub use config::{GreenhouseConfig, CONFIG_FILE};
pub use frame::{Angle, ElementStyle, Frame};
pub use headless_report::{HeadlessReport, ReportStatus, RunProgress};
pub use headless_runner::{run_loaded_scenario, run_scenario, RunOutcome};
pub use headless_runtime::{HeadlessRunConfig, HeadlessRuntime};
pub use headless_scenario::{HeadlessScenario, ScenarioStep};
pub use home::HomeScreen;
pub use screen::{Screen, ScreenEvent, ScreenKind, UnknownScreen};
pub use settings::{SettingsScreen, SETTING_ITEMS};
pub use splash::SplashScreen;
