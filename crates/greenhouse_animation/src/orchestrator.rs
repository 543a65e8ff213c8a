//! Per-screen animation sessions
//!
//! An [`Orchestrator`] owns the animated values and top-level animations of
//! one mounted screen. It starts them on mount and tears all of them down on
//! unmount, so no animation outlives the view it paints.
//!
//! ```text
//!   new() ──► Active ──cancel()──► TornDown
//!               │ create_value / start / drive
//! ```
//!
//! A remount builds a fresh session; there is no way back to `Active`.

use std::hash::Hash;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, warn};

use crate::driver::{AnimationId, Driver};
use crate::easing::Easing;
use crate::error::{ConfigError, LifecycleError, Result};
use crate::node::Animation;
use crate::value::ValueId;

/// Session lifecycle state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Active,
    TornDown,
}

/// Timing parameters for a staggered entrance
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StaggerPlan {
    /// Initial value of every item
    pub from: f64,
    /// Value each item animates to
    pub to: f64,
    /// Start of the first item, relative to mount
    pub start_ms: f64,
    /// Gap between consecutive item starts
    pub interval_ms: f64,
    pub duration_ms: f64,
    pub easing: Easing,
}

impl StaggerPlan {
    /// Start time of the item at `index`
    pub fn item_start_ms(&self, index: usize) -> f64 {
        self.start_ms + self.interval_ms * index as f64
    }
}

/// Animated values keyed by stable item identity, in declaration order.
///
/// Sized once when created; the set of items never changes afterwards.
#[derive(Clone, Debug)]
pub struct Staggered<K> {
    order: Vec<K>,
    values: FxHashMap<K, ValueId>,
}

impl<K: Eq + Hash + Clone> Staggered<K> {
    pub fn get(&self, key: &K) -> Option<ValueId> {
        self.values.get(key).copied()
    }

    /// Items and their values in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&K, ValueId)> + '_ {
        self.order.iter().map(move |k| (k, self.values[k]))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Composition root for one screen's animations
pub struct Orchestrator {
    name: String,
    state: SessionState,
    values: Vec<ValueId>,
    animations: Vec<AnimationId>,
}

impl Orchestrator {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        debug!(session = %name, "session mounted");
        Self {
            name,
            state: SessionState::Active,
            values: Vec::new(),
            animations: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    fn ensure_active(&self) -> Result<()> {
        match self.state {
            SessionState::Active => Ok(()),
            SessionState::TornDown => Err(LifecycleError::SessionTornDown(self.name.clone()).into()),
        }
    }

    /// Create an animated value owned by this session
    pub fn create_value(&mut self, driver: &mut Driver, initial: f64) -> Result<ValueId> {
        self.ensure_active()?;
        let id = driver.create_value(initial)?;
        self.values.push(id);
        Ok(id)
    }

    /// Start a top-level animation over this session's values
    pub fn start(&mut self, driver: &mut Driver, animation: &Animation) -> Result<AnimationId> {
        self.ensure_active()?;
        if animation.targets().iter().any(|t| !self.values.contains(t)) {
            return Err(LifecycleError::ForeignValue.into());
        }
        let id = driver.drive(animation)?;
        self.prune_finished(driver);
        self.animations.push(id);
        Ok(id)
    }

    /// Release handles of animations that are no longer running
    fn prune_finished(&mut self, driver: &mut Driver) {
        self.animations.retain(|id| {
            if driver.is_running(*id) {
                true
            } else {
                driver.release(*id);
                false
            }
        });
    }

    /// Start a top-level animation after `delay_ms`
    pub fn start_delayed(
        &mut self,
        driver: &mut Driver,
        delay_ms: f64,
        animation: Animation,
    ) -> Result<AnimationId> {
        let delayed = Animation::delayed(delay_ms, animation)?;
        self.start(driver, &delayed)
    }

    /// Gesture entry point: replace whatever currently drives the targets
    pub fn drive(&mut self, driver: &mut Driver, animation: &Animation) -> Result<AnimationId> {
        self.start(driver, animation)
    }

    /// Create one value per item and start its delayed entrance
    pub fn stagger<K, I>(
        &mut self,
        driver: &mut Driver,
        items: I,
        plan: StaggerPlan,
    ) -> Result<Staggered<K>>
    where
        K: Eq + Hash + Clone,
        I: IntoIterator<Item = K>,
    {
        self.ensure_active()?;
        let order: Vec<K> = items.into_iter().collect();
        let mut seen = FxHashSet::default();
        if let Some(index) = order.iter().position(|key| !seen.insert(key)) {
            return Err(ConfigError::DuplicateItem(index).into());
        }

        let mut values = FxHashMap::default();
        values.reserve(order.len());
        for (index, key) in order.iter().enumerate() {
            let value = self.create_value(driver, plan.from)?;
            let entrance = Animation::timing(value, plan.to, plan.duration_ms, plan.easing)?;
            self.start_delayed(driver, plan.item_start_ms(index), entrance)?;
            values.insert(key.clone(), value);
        }

        Ok(Staggered { order, values })
    }

    /// Handles of this session's animations, finished ones until the next start
    pub fn animations(&self) -> &[AnimationId] {
        &self.animations
    }

    /// Number of this session's animations still running
    pub fn running(&self, driver: &Driver) -> usize {
        self.animations
            .iter()
            .filter(|id| driver.is_running(**id))
            .count()
    }

    /// Tear the session down: stop every animation and free every value.
    ///
    /// Safe to call more than once; later calls do nothing.
    pub fn cancel(&mut self, driver: &mut Driver) {
        if self.state == SessionState::TornDown {
            return;
        }
        let stopped = self.running(driver);
        for id in self.animations.drain(..) {
            driver.release(id);
        }
        for value in self.values.drain(..) {
            // already gone if a caller removed it by hand
            let _ = driver.remove_value(value);
        }
        self.state = SessionState::TornDown;
        debug!(session = %self.name, stopped, "session torn down");
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        if self.state == SessionState::Active && !self.values.is_empty() {
            warn!(
                session = %self.name,
                values = self.values.len(),
                "session dropped without cancel; its values stay in the driver"
            );
        }
    }
}
