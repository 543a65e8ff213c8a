//! Headless runtime primitives for diagnostics execution.
//!
//! Mounts one screen over a [`ManualClock`] and advances it in fixed logical
//! steps, so a run produces the same frames on every machine.

use anyhow::{bail, Result};
use greenhouse_animation::{Clock, Driver, ManualClock};
use tracing::{debug, info};

use crate::config::GreenhouseConfig;
use crate::frame::Frame;
use crate::headless_report::RunProgress;
use crate::screen::{Screen, ScreenEvent, ScreenKind};

/// Configuration for deterministic headless frame execution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadlessRunConfig {
    /// Logical milliseconds between frames.
    pub tick_ms: u64,
    /// Frame budget for the whole run.
    pub max_frames: u32,
}

impl Default for HeadlessRunConfig {
    fn default() -> Self {
        Self {
            tick_ms: 16,
            max_frames: 100_000,
        }
    }
}

/// Deterministic headless runtime loop.
pub struct HeadlessRuntime {
    cfg: HeadlessRunConfig,
    kind: ScreenKind,
    clock: ManualClock,
    driver: Driver,
    screen: Box<dyn Screen>,
    elapsed_frames: u64,
    navigations: Vec<String>,
}

impl HeadlessRuntime {
    /// Mount `kind` at logical time zero.
    pub fn new(kind: ScreenKind, cfg: HeadlessRunConfig, config: &GreenhouseConfig) -> Result<Self> {
        if cfg.max_frames == 0 {
            bail!("headless max_frames must be > 0");
        }
        if cfg.tick_ms == 0 {
            bail!("headless tick_ms must be > 0");
        }

        let clock = ManualClock::new();
        let mut driver = Driver::with_config(config.driver.driver_config());
        driver.frame_interval_ms()?;
        driver.tick_clock(&clock);
        let screen = kind.mount(&mut driver, config)?;
        info!(screen = %kind, tick_ms = cfg.tick_ms, "headless screen mounted");

        let mut runtime = Self {
            cfg,
            kind,
            clock,
            driver,
            screen,
            elapsed_frames: 0,
            navigations: Vec::new(),
        };
        runtime.collect_events();
        Ok(runtime)
    }

    pub fn config(&self) -> HeadlessRunConfig {
        self.cfg
    }

    pub fn screen(&self) -> ScreenKind {
        self.kind
    }

    pub fn driver(&self) -> &Driver {
        &self.driver
    }

    pub fn elapsed_frames(&self) -> u64 {
        self.elapsed_frames
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.clock.now_ms() as u64
    }

    /// Navigation targets requested so far, oldest first
    pub fn navigations(&self) -> &[String] {
        &self.navigations
    }

    pub fn progress(&self) -> RunProgress {
        RunProgress {
            elapsed_frames: self.elapsed_frames,
            elapsed_ms: self.elapsed_ms(),
            navigations: self.navigations.clone(),
        }
    }

    /// Render parameters at the current logical time
    pub fn frame(&self) -> Frame {
        self.screen.frame(&self.driver)
    }

    /// Run whole frames.
    pub fn run_frames(&mut self, frames: u32) -> Result<()> {
        for _ in 0..frames {
            self.step(self.cfg.tick_ms)?;
        }
        Ok(())
    }

    /// Advance logical time by `ms`. The last frame is shortened so the run
    /// lands exactly on the requested time.
    pub fn wait(&mut self, ms: u64) -> Result<()> {
        let mut remaining_ms = ms;
        while remaining_ms > 0 {
            let step_ms = remaining_ms.min(self.cfg.tick_ms);
            remaining_ms -= step_ms;
            self.step(step_ms)?;
        }
        Ok(())
    }

    /// Press an element on the mounted screen.
    pub fn press(&mut self, target: &str) -> Result<bool> {
        let handled = self.screen.press(&mut self.driver, target)?;
        self.collect_events();
        Ok(handled)
    }

    pub fn unmount(&mut self) {
        self.screen.unmount(&mut self.driver);
    }

    fn step(&mut self, step_ms: u64) -> Result<()> {
        if self.elapsed_frames >= u64::from(self.cfg.max_frames) {
            bail!(
                "headless frame budget of {} frames exhausted at {} ms",
                self.cfg.max_frames,
                self.elapsed_ms()
            );
        }
        self.clock.advance(step_ms as f64);
        self.driver.tick_clock(&self.clock);
        self.elapsed_frames += 1;
        self.collect_events();
        Ok(())
    }

    fn collect_events(&mut self) {
        for event in self.screen.poll(&mut self.driver) {
            match event {
                ScreenEvent::Navigate { to } => {
                    debug!(screen = self.screen.name(), %to, at_ms = self.elapsed_ms(), "navigate");
                    self.navigations.push(to);
                }
            }
        }
    }
}

impl Drop for HeadlessRuntime {
    fn drop(&mut self) {
        self.screen.unmount(&mut self.driver);
    }
}
