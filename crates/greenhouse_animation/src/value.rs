//! Animated values
//!
//! An animated value is an observable `f64` written by at most one running
//! animation at a time. Values live in a [`ValueStore`] owned by the driver and
//! are addressed by [`ValueId`] handles.

use slotmap::{new_key_type, SlotMap};

use crate::driver::AnimationId;
use crate::error::{check_finite, LifecycleError, Result};

new_key_type! {
    /// Handle to an animated value
    pub struct ValueId;
}

/// Storage for a single animated value
#[derive(Clone, Debug)]
pub(crate) struct ValueSlot {
    current: f64,
    /// Animation currently allowed to write this value
    driver: Option<AnimationId>,
}

/// All animated values owned by one driver
#[derive(Debug, Default)]
pub(crate) struct ValueStore {
    slots: SlotMap<ValueId, ValueSlot>,
}

impl ValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, initial: f64) -> Result<ValueId> {
        let current = check_finite(initial)?;
        Ok(self.slots.insert(ValueSlot {
            current,
            driver: None,
        }))
    }

    pub fn read(&self, id: ValueId) -> Result<f64> {
        self.slots
            .get(id)
            .map(|slot| slot.current)
            .ok_or_else(|| LifecycleError::UnknownValue.into())
    }

    pub fn contains(&self, id: ValueId) -> bool {
        self.slots.contains_key(id)
    }

    /// Write from a running animation. Ignored unless `writer` owns the value.
    pub fn write(&mut self, id: ValueId, writer: AnimationId, value: f64) {
        if let Some(slot) = self.slots.get_mut(id) {
            if slot.driver == Some(writer) {
                slot.current = value;
            }
        }
    }

    /// Current value for a running animation that is about to start
    pub fn start_value(&self, id: ValueId) -> Option<f64> {
        self.slots.get(id).map(|slot| slot.current)
    }

    /// Hand the value to a new animation, returning the one that lost it.
    pub fn attach(&mut self, id: ValueId, driver: AnimationId) -> Option<AnimationId> {
        let slot = self.slots.get_mut(id)?;
        slot.driver.replace(driver).filter(|prev| *prev != driver)
    }

    /// Release the value if `driver` still owns it
    pub fn detach(&mut self, id: ValueId, driver: AnimationId) {
        if let Some(slot) = self.slots.get_mut(id) {
            if slot.driver == Some(driver) {
                slot.driver = None;
            }
        }
    }

    pub fn driver_of(&self, id: ValueId) -> Option<AnimationId> {
        self.slots.get(id).and_then(|slot| slot.driver)
    }

    /// Remove a value; returns the animation that was writing it, if any
    pub fn remove(&mut self, id: ValueId) -> Option<Option<AnimationId>> {
        self.slots.remove(id).map(|slot| slot.driver)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }
}
