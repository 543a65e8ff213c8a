//! Greenhouse motion configuration (greenhouse.toml)

use anyhow::{Context, Result};
use greenhouse_animation::DriverConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::headless_runtime::HeadlessRunConfig;

/// File name looked up when a directory is given
pub const CONFIG_FILE: &str = "greenhouse.toml";

/// Top-level configuration. Every table and field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct GreenhouseConfig {
    #[serde(default)]
    pub driver: DriverSection,
    #[serde(default)]
    pub headless: HeadlessSection,
    #[serde(default)]
    pub splash: SplashConfig,
    #[serde(default)]
    pub home: HomeConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
}

/// Frame driver settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DriverSection {
    /// Refresh rate the host ticks at
    #[serde(default = "default_target_fps")]
    pub target_fps: u32,
}

fn default_target_fps() -> u32 {
    60
}

impl Default for DriverSection {
    fn default() -> Self {
        Self {
            target_fps: default_target_fps(),
        }
    }
}

impl DriverSection {
    pub fn driver_config(&self) -> DriverConfig {
        DriverConfig {
            target_fps: self.target_fps,
        }
    }
}

/// Headless diagnostics settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HeadlessSection {
    /// Logical milliseconds between frames
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Frame budget for a whole scenario
    #[serde(default = "default_max_frames")]
    pub max_frames: u32,
}

fn default_tick_ms() -> u64 {
    16
}

fn default_max_frames() -> u32 {
    100_000
}

impl Default for HeadlessSection {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            max_frames: default_max_frames(),
        }
    }
}

impl HeadlessSection {
    pub fn run_config(&self) -> HeadlessRunConfig {
        HeadlessRunConfig {
            tick_ms: self.tick_ms,
            max_frames: self.max_frames,
        }
    }
}

/// Splash screen timings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SplashConfig {
    #[serde(default = "default_splash_fade_ms")]
    pub fade_ms: f64,
    /// Time on screen before moving on
    #[serde(default = "default_splash_hold_ms")]
    pub navigate_after_ms: f64,
    #[serde(default = "default_splash_next")]
    pub next: String,
}

fn default_splash_fade_ms() -> f64 {
    1500.0
}

fn default_splash_hold_ms() -> f64 {
    3000.0
}

fn default_splash_next() -> String {
    "Login".to_string()
}

impl Default for SplashConfig {
    fn default() -> Self {
        Self {
            fade_ms: default_splash_fade_ms(),
            navigate_after_ms: default_splash_hold_ms(),
            next: default_splash_next(),
        }
    }
}

/// Home screen press animation
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HomeConfig {
    #[serde(default = "default_home_press_ms")]
    pub press_ms: f64,
    #[serde(default = "default_home_next")]
    pub next: String,
}

fn default_home_press_ms() -> f64 {
    500.0
}

fn default_home_next() -> String {
    "NextScreen".to_string()
}

impl Default for HomeConfig {
    fn default() -> Self {
        Self {
            press_ms: default_home_press_ms(),
            next: default_home_next(),
        }
    }
}

/// Settings screen choreography.
///
/// Entrances ease out with an overshoot; a larger `*_overshoot` gives a
/// bouncier settle.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SettingsConfig {
    #[serde(default = "default_header_ms")]
    pub header_ms: f64,
    #[serde(default = "default_overshoot")]
    pub header_overshoot: f64,

    #[serde(default = "default_list_delay_ms")]
    pub list_delay_ms: f64,
    #[serde(default = "default_list_ms")]
    pub list_ms: f64,
    #[serde(default = "default_list_overshoot")]
    pub list_overshoot: f64,

    /// Start of the first setting item, relative to mount
    #[serde(default = "default_item_start_ms")]
    pub item_start_ms: f64,
    #[serde(default = "default_item_interval_ms")]
    pub item_interval_ms: f64,
    #[serde(default = "default_item_ms")]
    pub item_ms: f64,
    #[serde(default = "default_overshoot")]
    pub item_overshoot: f64,

    /// One full background turn
    #[serde(default = "default_rotation_period_ms")]
    pub rotation_period_ms: f64,

    #[serde(default = "default_fab_delay_ms")]
    pub fab_delay_ms: f64,
    #[serde(default = "default_fab_ms")]
    pub fab_ms: f64,
    #[serde(default = "default_fab_overshoot")]
    pub fab_overshoot: f64,
}

fn default_header_ms() -> f64 {
    800.0
}

fn default_overshoot() -> f64 {
    1.70158
}

fn default_list_delay_ms() -> f64 {
    400.0
}

fn default_list_ms() -> f64 {
    800.0
}

fn default_list_overshoot() -> f64 {
    2.0
}

fn default_item_start_ms() -> f64 {
    500.0
}

fn default_item_interval_ms() -> f64 {
    100.0
}

fn default_item_ms() -> f64 {
    400.0
}

fn default_rotation_period_ms() -> f64 {
    10_000.0
}

fn default_fab_delay_ms() -> f64 {
    800.0
}

fn default_fab_ms() -> f64 {
    600.0
}

fn default_fab_overshoot() -> f64 {
    2.5
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            header_ms: default_header_ms(),
            header_overshoot: default_overshoot(),
            list_delay_ms: default_list_delay_ms(),
            list_ms: default_list_ms(),
            list_overshoot: default_list_overshoot(),
            item_start_ms: default_item_start_ms(),
            item_interval_ms: default_item_interval_ms(),
            item_ms: default_item_ms(),
            item_overshoot: default_overshoot(),
            rotation_period_ms: default_rotation_period_ms(),
            fab_delay_ms: default_fab_delay_ms(),
            fab_ms: default_fab_ms(),
            fab_overshoot: default_fab_overshoot(),
        }
    }
}

impl GreenhouseConfig {
    /// Load configuration from a file, or from `greenhouse.toml` in a directory
    pub fn load_from_dir(path: &Path) -> Result<Self> {
        let config_path = if path.is_file() {
            path.to_path_buf()
        } else {
            path.join(CONFIG_FILE)
        };

        if !config_path.exists() {
            anyhow::bail!(
                "No {} found in {}. Run `greenhouse init-config` to create one.",
                CONFIG_FILE,
                path.display()
            );
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))
    }

    /// Parse configuration from TOML text
    pub fn from_toml(input: &str) -> Result<Self> {
        Ok(toml::from_str(input)?)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}
