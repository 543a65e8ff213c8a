//! Animation driver
//!
//! Owns every animated value and running animation, and advances them all
//! once per frame tick. Scheduling is single-threaded and cooperative: a tick
//! walks the running animations in the order they were started, and every
//! animation sees the same delta for that tick.

use std::collections::VecDeque;

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::clock::{frame_interval_ms, Clock};
use crate::error::{LifecycleError, Result};
use crate::node::{Animation, Node, Step};
use crate::value::{ValueId, ValueStore};

/// Completions kept for `take_completed` before the oldest are dropped
pub const COMPLETED_CAPACITY: usize = 256;

new_key_type! {
    /// Handle to a running (or finished) animation
    pub struct AnimationId;
}

/// Lifecycle of a driven animation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationStatus {
    Running,
    Completed,
    Cancelled,
}

struct Entry {
    /// Runtime state, dropped once the animation stops
    node: Option<Node>,
    targets: SmallVec<[ValueId; 4]>,
    status: AnimationStatus,
}

/// Driver configuration
#[derive(Clone, Copy, Debug)]
pub struct DriverConfig {
    /// Display refresh rate the host ticks at
    pub target_fps: u32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self { target_fps: 60 }
    }
}

/// The per-frame animation driver
pub struct Driver {
    values: ValueStore,
    animations: SlotMap<AnimationId, Entry>,
    /// Running animations in start order
    active: Vec<AnimationId>,
    completed: VecDeque<AnimationId>,
    last_tick_ms: Option<f64>,
    config: DriverConfig,
}

impl Driver {
    pub fn new() -> Self {
        Self::with_config(DriverConfig::default())
    }

    pub fn with_config(config: DriverConfig) -> Self {
        Self {
            values: ValueStore::new(),
            animations: SlotMap::with_key(),
            active: Vec::new(),
            completed: VecDeque::new(),
            last_tick_ms: None,
            config,
        }
    }

    pub fn config(&self) -> DriverConfig {
        self.config
    }

    pub fn set_target_fps(&mut self, fps: u32) {
        self.config.target_fps = fps;
    }

    /// Milliseconds between frames at the configured refresh rate
    pub fn frame_interval_ms(&self) -> Result<f64> {
        frame_interval_ms(self.config.target_fps)
    }

    /// Time of the last tick
    pub fn now_ms(&self) -> f64 {
        self.last_tick_ms.unwrap_or(0.0)
    }

    // ------------------------------------------------------------------
    // Animated values
    // ------------------------------------------------------------------

    /// Create an animated value with a well-defined initial value
    pub fn create_value(&mut self, initial: f64) -> Result<ValueId> {
        self.values.create(initial)
    }

    /// Current value as of the last tick
    pub fn read(&self, id: ValueId) -> Result<f64> {
        self.values.read(id)
    }

    /// Destroy a value, cancelling whatever animation writes it
    pub fn remove_value(&mut self, id: ValueId) -> Result<()> {
        match self.values.remove(id) {
            Some(Some(writer)) => {
                self.cancel(writer);
                Ok(())
            }
            Some(None) => Ok(()),
            None => Err(LifecycleError::UnknownValue.into()),
        }
    }

    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    // ------------------------------------------------------------------
    // Animations
    // ------------------------------------------------------------------

    /// Start an animation.
    ///
    /// Any animation already writing one of its targets is cancelled first.
    /// The animation begins at the current frame time and takes its first
    /// step immediately, so zero-length timings are written before this
    /// returns.
    pub fn drive(&mut self, animation: &Animation) -> Result<AnimationId> {
        let targets = animation.targets();
        if targets.iter().any(|t| !self.values.contains(*t)) {
            return Err(LifecycleError::UnknownValue.into());
        }

        let id = self.animations.insert(Entry {
            node: Some(Node::compile(animation)),
            targets: targets.clone(),
            status: AnimationStatus::Running,
        });

        for target in &targets {
            if let Some(previous) = self.values.attach(*target, id) {
                debug!(?previous, interrupted_by = ?id, "interrupting animation");
                self.cancel(previous);
            }
        }

        self.active.push(id);
        debug!(
            animation = ?id,
            targets = targets.len(),
            duration_ms = ?animation.duration_ms(),
            "animation started"
        );

        self.step(id, 0.0);
        if self.status(id) != Some(AnimationStatus::Running) {
            self.active.retain(|a| *a != id);
        }
        Ok(id)
    }

    /// Stop an animation where it is. Returns false if it was not running.
    ///
    /// Values keep their last written value and no completion is reported.
    pub fn cancel(&mut self, id: AnimationId) -> bool {
        let Some(entry) = self.animations.get_mut(id) else {
            return false;
        };
        if entry.status != AnimationStatus::Running {
            return false;
        }
        entry.status = AnimationStatus::Cancelled;
        entry.node = None;
        for target in &entry.targets {
            self.values.detach(*target, id);
        }
        self.active.retain(|a| *a != id);
        debug!(animation = ?id, "animation cancelled");
        true
    }

    /// Forget a finished animation, cancelling it first if still running
    pub fn release(&mut self, id: AnimationId) -> Option<AnimationStatus> {
        self.cancel(id);
        let entry = self.animations.remove(id)?;
        if entry.status == AnimationStatus::Completed {
            self.completed.retain(|c| *c != id);
        }
        Some(entry.status)
    }

    pub fn status(&self, id: AnimationId) -> Option<AnimationStatus> {
        self.animations.get(id).map(|entry| entry.status)
    }

    pub fn is_running(&self, id: AnimationId) -> bool {
        self.status(id) == Some(AnimationStatus::Running)
    }

    /// Animations that completed since the last call, in completion order.
    ///
    /// Cancelled and released animations never appear here. At most
    /// [`COMPLETED_CAPACITY`] completions are held; older ones are dropped.
    pub fn take_completed(&mut self) -> Vec<AnimationId> {
        self.completed.drain(..).collect()
    }

    /// Completions waiting for `take_completed`
    pub fn pending_completions(&self) -> usize {
        self.completed.len()
    }

    /// Animations the driver still tracks, finished ones included
    pub fn animation_count(&self) -> usize {
        self.animations.len()
    }

    pub fn has_active_animations(&self) -> bool {
        !self.active.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    // ------------------------------------------------------------------
    // Ticking
    // ------------------------------------------------------------------

    /// Advance every running animation to `now_ms`.
    ///
    /// The first tick only establishes the time base. A timestamp earlier
    /// than the previous tick is treated as no time passing.
    pub fn tick(&mut self, now_ms: f64) {
        let dt = match self.last_tick_ms {
            None => 0.0,
            Some(prev) if now_ms < prev => {
                warn!(prev, now_ms, "clock went backwards, clamping frame delta to zero");
                0.0
            }
            Some(prev) => now_ms - prev,
        };
        self.last_tick_ms = Some(self.last_tick_ms.map_or(now_ms, |prev| prev.max(now_ms)));
        self.advance(dt);
    }

    /// Tick using a clock's current time
    pub fn tick_clock(&mut self, clock: &dyn Clock) {
        self.tick(clock.now_ms());
    }

    /// Advance every running animation by `dt_ms`
    pub fn advance(&mut self, dt_ms: f64) {
        let dt = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };
        trace!(dt, active = self.active.len(), "tick");

        for i in 0..self.active.len() {
            let id = self.active[i];
            self.step(id, dt);
        }

        let animations = &self.animations;
        self.active.retain(|id| {
            animations
                .get(*id)
                .is_some_and(|entry| entry.status == AnimationStatus::Running)
        });
    }

    fn step(&mut self, id: AnimationId, dt: f64) {
        let Some(entry) = self.animations.get_mut(id) else {
            return;
        };
        let Some(node) = entry.node.as_mut() else {
            return;
        };

        if let Step::Finished { .. } = node.advance(dt, id, &mut self.values) {
            entry.status = AnimationStatus::Completed;
            entry.node = None;
            for target in &entry.targets {
                self.values.detach(*target, id);
            }
            if self.completed.len() == COMPLETED_CAPACITY {
                self.completed.pop_front();
            }
            self.completed.push_back(id);
            debug!(animation = ?id, "animation completed");
        }
    }
}

impl Default for Driver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Easing;
    use crate::error::{AnimationError, ConfigError};

    const EPS: f64 = 1e-9;

    fn run_for(driver: &mut Driver, total_ms: f64, frame_ms: f64) {
        let mut t = driver.now_ms();
        let end = t + total_ms;
        while t < end - EPS {
            t = (t + frame_ms).min(end);
            driver.tick(t);
        }
    }

    fn started(driver: &mut Driver) {
        driver.tick(0.0);
    }

    #[test]
    fn test_fade_in_scenario() {
        let mut driver = Driver::new();
        started(&mut driver);
        let opacity = driver.create_value(0.0).unwrap();
        let fade = driver
            .drive(&Animation::linear(opacity, 1.0, 400.0).unwrap())
            .unwrap();

        run_for(&mut driver, 200.0, 16.0);
        assert!((driver.read(opacity).unwrap() - 0.5).abs() < EPS);
        assert!(driver.is_running(fade));

        run_for(&mut driver, 200.0, 16.0);
        assert_eq!(driver.read(opacity).unwrap(), 1.0);
        assert_eq!(driver.status(fade), Some(AnimationStatus::Completed));
        assert_eq!(driver.take_completed(), vec![fade]);
        assert!(driver.take_completed().is_empty());
    }

    #[test]
    fn test_timing_progresses_monotonically_to_target() {
        let mut driver = Driver::new();
        started(&mut driver);
        let v = driver.create_value(-3.0).unwrap();
        driver
            .drive(&Animation::timing(v, 7.0, 1000.0, Easing::EaseInOut).unwrap())
            .unwrap();

        let mut last = driver.read(v).unwrap();
        for _ in 0..70 {
            let t = driver.now_ms() + 1000.0 / 60.0;
            driver.tick(t);
            let now = driver.read(v).unwrap();
            assert!(now >= last - EPS, "went backwards: {last} -> {now}");
            last = now;
        }
        assert_eq!(driver.read(v).unwrap(), 7.0);
    }

    #[test]
    fn test_zero_duration_writes_synchronously() {
        let mut driver = Driver::new();
        let v = driver.create_value(1.0).unwrap();
        let id = driver.drive(&Animation::set(v, 0.0).unwrap()).unwrap();
        assert_eq!(driver.read(v).unwrap(), 0.0);
        assert_eq!(driver.status(id), Some(AnimationStatus::Completed));
        assert!(!driver.has_active_animations());
    }

    #[test]
    fn test_sequence_chains_exactly() {
        let mut driver = Driver::new();
        started(&mut driver);
        let scale = driver.create_value(1.0).unwrap();
        let press = Animation::sequence([
            Animation::linear(scale, 0.9, 100.0).unwrap(),
            Animation::linear(scale, 1.1, 100.0).unwrap(),
            Animation::linear(scale, 1.0, 200.0).unwrap(),
        ])
        .unwrap();
        let id = driver.drive(&press).unwrap();

        run_for(&mut driver, 100.0, 30.0);
        assert!((driver.read(scale).unwrap() - 0.9).abs() < EPS);

        // second step is half way after 50 more ms
        run_for(&mut driver, 50.0, 30.0);
        assert!((driver.read(scale).unwrap() - 1.0).abs() < EPS);

        run_for(&mut driver, 249.0, 30.0);
        assert!(driver.is_running(id));
        run_for(&mut driver, 1.0, 30.0);
        assert_eq!(driver.status(id), Some(AnimationStatus::Completed));
        assert_eq!(driver.read(scale).unwrap(), 1.0);
    }

    #[test]
    fn test_later_sibling_waits_for_earlier() {
        let mut driver = Driver::new();
        started(&mut driver);
        let a = driver.create_value(0.0).unwrap();
        let b = driver.create_value(0.0).unwrap();
        let seq = Animation::sequence([
            Animation::linear(a, 1.0, 300.0).unwrap(),
            Animation::linear(b, 1.0, 300.0).unwrap(),
        ])
        .unwrap();
        driver.drive(&seq).unwrap();

        run_for(&mut driver, 299.0, 13.0);
        assert_eq!(driver.read(b).unwrap(), 0.0);
        run_for(&mut driver, 151.0, 13.0);
        assert!((driver.read(b).unwrap() - 0.5).abs() < EPS);
    }

    #[test]
    fn test_parallel_completes_with_slowest() {
        let mut driver = Driver::new();
        started(&mut driver);
        let a = driver.create_value(0.0).unwrap();
        let b = driver.create_value(0.0).unwrap();
        let both = Animation::parallel([
            Animation::linear(a, 1.0, 100.0).unwrap(),
            Animation::linear(b, 1.0, 300.0).unwrap(),
        ])
        .unwrap();
        let id = driver.drive(&both).unwrap();

        run_for(&mut driver, 150.0, 10.0);
        assert_eq!(driver.read(a).unwrap(), 1.0);
        assert!((driver.read(b).unwrap() - 0.5).abs() < EPS);
        assert!(driver.is_running(id));

        run_for(&mut driver, 150.0, 10.0);
        assert_eq!(driver.status(id), Some(AnimationStatus::Completed));
    }

    #[test]
    fn test_finite_loop_runs_n_times() {
        let mut driver = Driver::new();
        started(&mut driver);
        let v = driver.create_value(0.0).unwrap();
        let pulse = Animation::sequence([
            Animation::linear(v, 1.0, 100.0).unwrap(),
            Animation::linear(v, 0.0, 100.0).unwrap(),
        ])
        .unwrap();
        let id = driver.drive(&Animation::repeat(pulse, 3).unwrap()).unwrap();

        run_for(&mut driver, 599.0, 7.0);
        assert!(driver.is_running(id));
        run_for(&mut driver, 1.0, 7.0);
        assert_eq!(driver.status(id), Some(AnimationStatus::Completed));
        assert_eq!(driver.read(v).unwrap(), 0.0);
    }

    #[test]
    fn test_infinite_loop_repeats_exactly_until_cancelled() {
        let mut driver = Driver::new();
        started(&mut driver);
        let angle = driver.create_value(0.0).unwrap();
        let turn = Animation::sequence([
            Animation::linear(angle, 360.0, 1000.0).unwrap(),
            Animation::set(angle, 0.0).unwrap(),
        ])
        .unwrap();
        let spin = driver.drive(&Animation::forever(turn).unwrap()).unwrap();

        // 10.25 turns in 33 ms frames: no drift across iterations
        run_for(&mut driver, 10_250.0, 33.0);
        assert!((driver.read(angle).unwrap() - 90.0).abs() < 1e-6);
        assert!(driver.is_running(spin));

        assert!(driver.cancel(spin));
        let frozen = driver.read(angle).unwrap();
        run_for(&mut driver, 500.0, 16.0);
        assert_eq!(driver.read(angle).unwrap(), frozen);
        assert_eq!(driver.status(spin), Some(AnimationStatus::Cancelled));
        assert!(driver.take_completed().is_empty());
        assert!(!driver.cancel(spin));
    }

    #[test]
    fn test_interruption_starts_from_current_value() {
        let mut driver = Driver::new();
        started(&mut driver);
        let v = driver.create_value(0.0).unwrap();
        let first = driver.drive(&Animation::linear(v, 100.0, 1000.0).unwrap()).unwrap();
        run_for(&mut driver, 250.0, 10.0);
        assert!((driver.read(v).unwrap() - 25.0).abs() < EPS);

        let second = driver.drive(&Animation::linear(v, 0.0, 100.0).unwrap()).unwrap();
        assert_eq!(driver.status(first), Some(AnimationStatus::Cancelled));
        assert!((driver.read(v).unwrap() - 25.0).abs() < EPS);

        run_for(&mut driver, 50.0, 10.0);
        assert!((driver.read(v).unwrap() - 12.5).abs() < EPS);
        run_for(&mut driver, 50.0, 10.0);
        assert_eq!(driver.read(v).unwrap(), 0.0);
        assert_eq!(driver.take_completed(), vec![second]);
    }

    #[test]
    fn test_backwards_clock_is_clamped() {
        let mut driver = Driver::new();
        driver.tick(100.0);
        let v = driver.create_value(0.0).unwrap();
        driver.drive(&Animation::linear(v, 1.0, 100.0).unwrap()).unwrap();
        driver.tick(150.0);
        driver.tick(149.0);
        assert!((driver.read(v).unwrap() - 0.5).abs() < EPS);
        driver.tick(160.0);
        assert!((driver.read(v).unwrap() - 0.6).abs() < EPS);
    }

    #[test]
    fn test_removed_value_cannot_be_driven() {
        let mut driver = Driver::new();
        let v = driver.create_value(0.0).unwrap();
        let id = driver.drive(&Animation::linear(v, 1.0, 100.0).unwrap()).unwrap();
        driver.remove_value(v).unwrap();
        assert_eq!(driver.status(id), Some(AnimationStatus::Cancelled));

        let err = driver
            .drive(&Animation::linear(v, 1.0, 100.0).unwrap())
            .unwrap_err();
        assert_eq!(err, AnimationError::Lifecycle(LifecycleError::UnknownValue));
        assert!(driver.read(v).is_err());
        assert!(driver.remove_value(v).is_err());
    }

    #[test]
    fn test_release_forgets_animation() {
        let mut driver = Driver::new();
        let v = driver.create_value(0.0).unwrap();
        let id = driver.drive(&Animation::linear(v, 1.0, 100.0).unwrap()).unwrap();
        assert_eq!(driver.release(id), Some(AnimationStatus::Cancelled));
        assert_eq!(driver.status(id), None);
    }

    #[test]
    fn test_empty_composites_complete_on_drive() {
        let mut driver = Driver::new();
        started(&mut driver);
        let v = driver.create_value(0.0).unwrap();

        let empty = driver
            .drive(&Animation::sequence(Vec::<Animation>::new()).unwrap())
            .unwrap();
        assert_eq!(driver.status(empty), Some(AnimationStatus::Completed));

        let never = driver
            .drive(&Animation::repeat(Animation::linear(v, 1.0, 100.0).unwrap(), 0).unwrap())
            .unwrap();
        assert_eq!(driver.status(never), Some(AnimationStatus::Completed));
        assert_eq!(driver.read(v).unwrap(), 0.0);
        assert!(!driver.has_active_animations());
        assert_eq!(driver.take_completed(), vec![empty, never]);
    }

    #[test]
    fn test_release_drops_pending_completion() {
        let mut driver = Driver::new();
        let v = driver.create_value(0.0).unwrap();
        let kept = driver.drive(&Animation::set(v, 1.0).unwrap()).unwrap();
        let gone = driver.drive(&Animation::set(v, 2.0).unwrap()).unwrap();
        assert_eq!(driver.pending_completions(), 2);

        assert_eq!(driver.release(gone), Some(AnimationStatus::Completed));
        assert_eq!(driver.animation_count(), 1);
        assert_eq!(driver.take_completed(), vec![kept]);
    }

    #[test]
    fn test_completion_queue_is_bounded() {
        let mut driver = Driver::new();
        let v = driver.create_value(0.0).unwrap();
        let mut last = None;
        for i in 0..COMPLETED_CAPACITY + 10 {
            last = Some(driver.drive(&Animation::set(v, i as f64).unwrap()).unwrap());
        }
        assert_eq!(driver.pending_completions(), COMPLETED_CAPACITY);
        let completed = driver.take_completed();
        assert_eq!(completed.last().copied(), last);
        assert_eq!(driver.pending_completions(), 0);
    }

    #[test]
    fn test_frame_interval() {
        let mut driver = Driver::new();
        assert!((driver.frame_interval_ms().unwrap() - 1000.0 / 60.0).abs() < EPS);
        driver.set_target_fps(0);
        assert_eq!(
            driver.frame_interval_ms().unwrap_err(),
            AnimationError::Config(ConfigError::InvalidFrameRate(0))
        );
    }
}
