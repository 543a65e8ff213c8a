//! Screen trait and mounting by name

use std::fmt;
use std::str::FromStr;

use greenhouse_animation::{Driver, Orchestrator, Result, ValueId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::GreenhouseConfig;
use crate::frame::Frame;
use crate::home::HomeScreen;
use crate::settings::SettingsScreen;
use crate::splash::SplashScreen;

/// Something a screen asks its host to do
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScreenEvent {
    Navigate { to: String },
}

/// An animated screen bound to one orchestration session.
///
/// Mounting starts the entrance choreography; `unmount` tears every
/// animation down. After unmount, `frame` is empty and `poll` is silent.
pub trait Screen {
    fn name(&self) -> &str;

    /// Current render parameters
    fn frame(&self, driver: &Driver) -> Frame;

    /// Handle a press on `target`. Returns false if the screen has no such
    /// pressable element.
    fn press(&mut self, driver: &mut Driver, target: &str) -> Result<bool>;

    /// Drain events raised since the last poll
    fn poll(&mut self, driver: &mut Driver) -> Vec<ScreenEvent>;

    fn unmount(&mut self, driver: &mut Driver);
}

/// The animated screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenKind {
    Splash,
    Home,
    Settings,
}

impl ScreenKind {
    pub const ALL: [ScreenKind; 3] = [ScreenKind::Splash, ScreenKind::Home, ScreenKind::Settings];

    pub fn as_str(self) -> &'static str {
        match self {
            ScreenKind::Splash => "splash",
            ScreenKind::Home => "home",
            ScreenKind::Settings => "settings",
        }
    }

    /// Mount the screen and start its entrance animations
    pub fn mount(self, driver: &mut Driver, config: &GreenhouseConfig) -> Result<Box<dyn Screen>> {
        Ok(match self {
            ScreenKind::Splash => Box::new(SplashScreen::mount(driver, &config.splash)?),
            ScreenKind::Home => Box::new(HomeScreen::mount(driver, &config.home)?),
            ScreenKind::Settings => Box::new(SettingsScreen::mount(driver, &config.settings)?),
        })
    }
}

impl fmt::Display for ScreenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown screen '{0}' (expected splash, home or settings)")]
pub struct UnknownScreen(pub String);

impl FromStr for ScreenKind {
    type Err = UnknownScreen;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ScreenKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownScreen(s.to_string()))
    }
}

/// Build a screen inside a fresh session, tearing the session down again if
/// any part of the choreography is rejected
pub(crate) fn mount_with<T>(
    driver: &mut Driver,
    name: &str,
    build: impl FnOnce(&mut Orchestrator, &mut Driver) -> Result<T>,
) -> Result<(Orchestrator, T)> {
    let mut session = Orchestrator::new(name);
    match build(&mut session, driver) {
        Ok(parts) => Ok((session, parts)),
        Err(err) => {
            session.cancel(driver);
            Err(err)
        }
    }
}

/// Read a value the screen owns, falling back once its session is gone
pub(crate) fn read_or(driver: &Driver, value: ValueId, fallback: f64) -> f64 {
    driver.read(value).unwrap_or(fallback)
}
