//! Greenhouse Animation Core
//!
//! Time-based motion for the Greenhouse screens, built from a handful of
//! composable primitives over a shared clock.
//!
//! # Features
//!
//! - **Animated values**: observable scalars driven by at most one animation at a time
//! - **Primitives**: timing, sequence, parallel, delay and loop, validated on construction
//! - **Interpolation**: piecewise mappings from a value's domain to transform parameters
//! - **Driver**: single-threaded per-frame ticking with exact carry-over between steps
//! - **Orchestrator**: per-screen sessions that start on mount and tear down on unmount
//!
//! # Example
//!
//! ```rust
//! use greenhouse_animation::{Animation, Driver, Orchestrator};
//!
//! let mut driver = Driver::new();
//! driver.tick(0.0);
//!
//! let mut session = Orchestrator::new("splash");
//! let opacity = session.create_value(&mut driver, 0.0).unwrap();
//! let fade = Animation::linear(opacity, 1.0, 400.0).unwrap();
//! session.start(&mut driver, &fade).unwrap();
//!
//! driver.tick(200.0);
//! assert_eq!(driver.read(opacity).unwrap(), 0.5);
//!
//! session.cancel(&mut driver);
//! ```

pub mod clock;
pub mod driver;
pub mod easing;
pub mod error;
pub mod interpolate;
pub mod node;
pub mod orchestrator;
pub mod value;

pub use clock::{frame_interval_ms, Clock, ManualClock, SystemClock};
pub use driver::{AnimationId, AnimationStatus, Driver, DriverConfig, COMPLETED_CAPACITY};
pub use easing::Easing;
pub use error::{AnimationError, ConfigError, LifecycleError, Result};
pub use interpolate::{interpolate, Extrapolate, Interpolation, Unit};
pub use node::{Animation, Iterations, Timing};
pub use orchestrator::{Orchestrator, SessionState, StaggerPlan, Staggered};
pub use value::ValueId;
