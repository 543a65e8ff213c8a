//! Animation nodes
//!
//! [`Animation`] is the declarative tree built from the five primitives:
//! timing, sequence, parallel, delay and loop. Every constructor validates its
//! input, so a tree that exists is a tree that can run.
//!
//! The driver compiles an `Animation` into a `Node`, the mutable runtime
//! state, and advances it by frame deltas. Each advance reports how much of
//! the delta was left over when a node finished, and composites hand that
//! remainder to whatever runs next. Sequences therefore take exactly the sum
//! of their children and loops repeat without drift.

use smallvec::SmallVec;

use crate::driver::AnimationId;
use crate::easing::Easing;
use crate::error::{check_duration, check_finite, ConfigError, Result};
use crate::value::{ValueId, ValueStore};

/// Tolerance when deciding that accumulated frame time reached a duration
pub(crate) const TIME_EPSILON_MS: f64 = 1e-6;

/// Ease one animated value to a target
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timing {
    pub value: ValueId,
    pub to: f64,
    pub duration_ms: f64,
    pub easing: Easing,
}

/// How many times a loop runs its child
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Iterations {
    Finite(u32),
    Infinite,
}

#[derive(Clone, Debug, PartialEq)]
enum Kind {
    Timing(Timing),
    Delay(f64),
    Sequence(Vec<Animation>),
    Parallel(Vec<Animation>),
    Loop(Box<Animation>, Iterations),
}

/// A validated animation tree
#[derive(Clone, Debug, PartialEq)]
pub struct Animation {
    kind: Kind,
}

impl Animation {
    /// Ease `value` from wherever it is when this node starts to `to`.
    pub fn timing(value: ValueId, to: f64, duration_ms: f64, easing: Easing) -> Result<Self> {
        easing.validate()?;
        Ok(Self {
            kind: Kind::Timing(Timing {
                value,
                to: check_finite(to)?,
                duration_ms: check_duration(duration_ms)?,
                easing,
            }),
        })
    }

    /// Linear timing
    pub fn linear(value: ValueId, to: f64, duration_ms: f64) -> Result<Self> {
        Self::timing(value, to, duration_ms, Easing::Linear)
    }

    /// Write `to` immediately
    pub fn set(value: ValueId, to: f64) -> Result<Self> {
        Self::timing(value, to, 0.0, Easing::Linear)
    }

    /// Wait without writing anything
    pub fn delay(duration_ms: f64) -> Result<Self> {
        Ok(Self {
            kind: Kind::Delay(check_duration(duration_ms)?),
        })
    }

    /// Run children one after another.
    ///
    /// Only the last child may be non-terminating, since nothing chains after it.
    pub fn sequence(children: impl IntoIterator<Item = Animation>) -> Result<Self> {
        let children: Vec<Animation> = children.into_iter().collect();
        let Some((_, init)) = children.split_last() else {
            return Ok(Self {
                kind: Kind::Sequence(children),
            });
        };
        if init.iter().any(|child| !child.is_terminating()) {
            return Err(ConfigError::UnboundedChild("sequence").into());
        }
        Ok(Self {
            kind: Kind::Sequence(children),
        })
    }

    /// Run children together; completes when the slowest completes.
    pub fn parallel(children: impl IntoIterator<Item = Animation>) -> Result<Self> {
        let children: Vec<Animation> = children.into_iter().collect();
        if children.iter().any(|child| !child.is_terminating()) {
            return Err(ConfigError::UnboundedChild("parallel").into());
        }

        let mut seen: SmallVec<[ValueId; 8]> = SmallVec::new();
        for child in &children {
            let targets = child.targets();
            if targets.iter().any(|t| seen.contains(t)) {
                return Err(ConfigError::ConflictingTargets.into());
            }
            seen.extend(targets);
        }

        Ok(Self {
            kind: Kind::Parallel(children),
        })
    }

    /// Repeat `child` a fixed number of times or forever
    pub fn looped(child: Animation, iterations: Iterations) -> Result<Self> {
        let Some(child_ms) = child.duration_ms() else {
            return Err(ConfigError::UnboundedChild("loop").into());
        };
        if iterations == Iterations::Infinite && child_ms <= TIME_EPSILON_MS {
            return Err(ConfigError::ZeroDurationLoop.into());
        }
        Ok(Self {
            kind: Kind::Loop(Box::new(child), iterations),
        })
    }

    pub fn repeat(child: Animation, count: u32) -> Result<Self> {
        Self::looped(child, Iterations::Finite(count))
    }

    pub fn forever(child: Animation) -> Result<Self> {
        Self::looped(child, Iterations::Infinite)
    }

    /// `child` preceded by a delay
    pub fn delayed(delay_ms: f64, child: Animation) -> Result<Self> {
        Self::sequence([Self::delay(delay_ms)?, child])
    }

    /// Total running time, or `None` if the tree never completes
    pub fn duration_ms(&self) -> Option<f64> {
        match &self.kind {
            Kind::Timing(timing) => Some(timing.duration_ms),
            Kind::Delay(ms) => Some(*ms),
            Kind::Sequence(children) => children.iter().map(Animation::duration_ms).sum(),
            Kind::Parallel(children) => children
                .iter()
                .map(Animation::duration_ms)
                .try_fold(0.0_f64, |acc, d| d.map(|d| acc.max(d))),
            Kind::Loop(child, Iterations::Finite(n)) => child.duration_ms().map(|d| d * *n as f64),
            Kind::Loop(_, Iterations::Infinite) => None,
        }
    }

    pub fn is_terminating(&self) -> bool {
        self.duration_ms().is_some()
    }

    /// Animated values this tree writes, in first-use order
    pub fn targets(&self) -> SmallVec<[ValueId; 4]> {
        let mut out = SmallVec::new();
        self.collect_targets(&mut out);
        out
    }

    fn collect_targets(&self, out: &mut SmallVec<[ValueId; 4]>) {
        match &self.kind {
            Kind::Timing(timing) => {
                if !out.contains(&timing.value) {
                    out.push(timing.value);
                }
            }
            Kind::Delay(_) => {}
            Kind::Sequence(children) | Kind::Parallel(children) => {
                for child in children {
                    child.collect_targets(out);
                }
            }
            Kind::Loop(child, _) => child.collect_targets(out),
        }
    }
}

/// Outcome of advancing a node
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Step {
    Running,
    /// Done, with the unused part of the delta
    Finished { leftover_ms: f64 },
}

/// Runtime state of an animation tree
#[derive(Debug)]
pub(crate) enum Node {
    Timing {
        params: Timing,
        /// Captured when the node first advances
        from: Option<f64>,
        elapsed: f64,
    },
    Delay {
        duration_ms: f64,
        elapsed: f64,
    },
    Sequence {
        children: Vec<Node>,
        index: usize,
    },
    Parallel {
        children: Vec<Node>,
        done: SmallVec<[bool; 8]>,
    },
    Loop {
        child: Box<Node>,
        iterations: Iterations,
        completed: u32,
    },
}

impl Node {
    pub fn compile(animation: &Animation) -> Self {
        match &animation.kind {
            Kind::Timing(params) => Node::Timing {
                params: *params,
                from: None,
                elapsed: 0.0,
            },
            Kind::Delay(ms) => Node::Delay {
                duration_ms: *ms,
                elapsed: 0.0,
            },
            Kind::Sequence(children) => Node::Sequence {
                children: children.iter().map(Node::compile).collect(),
                index: 0,
            },
            Kind::Parallel(children) => Node::Parallel {
                children: children.iter().map(Node::compile).collect(),
                done: SmallVec::from_elem(false, children.len()),
            },
            Kind::Loop(child, iterations) => Node::Loop {
                child: Box::new(Node::compile(child)),
                iterations: *iterations,
                completed: 0,
            },
        }
    }

    /// Advance by `dt` milliseconds, writing through `values` as `owner`.
    pub fn advance(&mut self, dt: f64, owner: AnimationId, values: &mut ValueStore) -> Step {
        match self {
            Node::Timing {
                params,
                from,
                elapsed,
            } => {
                let start = *from.get_or_insert_with(|| {
                    values.start_value(params.value).unwrap_or(params.to)
                });
                *elapsed += dt;
                if *elapsed + TIME_EPSILON_MS >= params.duration_ms {
                    values.write(params.value, owner, params.to);
                    return Step::Finished {
                        leftover_ms: (*elapsed - params.duration_ms).max(0.0),
                    };
                }
                let progress = params.easing.apply(*elapsed / params.duration_ms);
                values.write(params.value, owner, start + (params.to - start) * progress);
                Step::Running
            }
            Node::Delay {
                duration_ms,
                elapsed,
            } => {
                *elapsed += dt;
                if *elapsed + TIME_EPSILON_MS >= *duration_ms {
                    Step::Finished {
                        leftover_ms: (*elapsed - *duration_ms).max(0.0),
                    }
                } else {
                    Step::Running
                }
            }
            Node::Sequence { children, index } => {
                let mut dt = dt;
                while let Some(child) = children.get_mut(*index) {
                    match child.advance(dt, owner, values) {
                        Step::Running => return Step::Running,
                        Step::Finished { leftover_ms } => {
                            *index += 1;
                            dt = leftover_ms;
                        }
                    }
                }
                Step::Finished { leftover_ms: dt }
            }
            Node::Parallel { children, done } => {
                let mut all_done = true;
                let mut leftover = dt;
                for (child, done) in children.iter_mut().zip(done.iter_mut()) {
                    if *done {
                        continue;
                    }
                    match child.advance(dt, owner, values) {
                        Step::Running => all_done = false,
                        Step::Finished { leftover_ms } => {
                            *done = true;
                            leftover = leftover.min(leftover_ms);
                        }
                    }
                }
                if all_done {
                    Step::Finished {
                        leftover_ms: leftover,
                    }
                } else {
                    Step::Running
                }
            }
            Node::Loop {
                child,
                iterations,
                completed,
            } => {
                if let Iterations::Finite(n) = *iterations {
                    if *completed >= n {
                        return Step::Finished { leftover_ms: dt };
                    }
                }
                let mut dt = dt;
                loop {
                    match child.advance(dt, owner, values) {
                        Step::Running => return Step::Running,
                        Step::Finished { leftover_ms } => {
                            *completed = completed.saturating_add(1);
                            if let Iterations::Finite(n) = *iterations {
                                if *completed >= n {
                                    return Step::Finished { leftover_ms };
                                }
                            }
                            child.reset();
                            dt = leftover_ms;
                        }
                    }
                }
            }
        }
    }

    /// Return to the initial state so the node can run again
    pub fn reset(&mut self) {
        match self {
            Node::Timing { from, elapsed, .. } => {
                *from = None;
                *elapsed = 0.0;
            }
            Node::Delay { elapsed, .. } => *elapsed = 0.0,
            Node::Sequence { children, index } => {
                *index = 0;
                children.iter_mut().for_each(Node::reset);
            }
            Node::Parallel { children, done } => {
                done.iter_mut().for_each(|d| *d = false);
                children.iter_mut().for_each(Node::reset);
            }
            Node::Loop {
                child, completed, ..
            } => {
                *completed = 0;
                child.reset();
            }
        }
    }
}
