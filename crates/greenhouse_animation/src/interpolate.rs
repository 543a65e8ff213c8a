//! Piecewise interpolation from an animated value's domain to an output range
//!
//! Interpolations are pure: they derive transform and opacity parameters from
//! a value read without touching any animation state.

use smallvec::SmallVec;

use crate::easing::Easing;
use crate::error::{ConfigError, Result};

/// Behaviour outside the input range
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Extrapolate {
    /// Hold the output at the nearest extreme
    #[default]
    Clamp,
    /// Continue the slope of the outermost segment
    Extend,
    /// Return the input unchanged
    Identity,
}

/// Unit suffix for stringified outputs
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Unit {
    #[default]
    None,
    Degrees,
    Radians,
}

impl Unit {
    pub fn format(&self, value: f64) -> String {
        match self {
            Unit::None => format!("{}", round4(value)),
            Unit::Degrees => format!("{}deg", round4(value)),
            Unit::Radians => format!("{}rad", round4(value)),
        }
    }
}

fn round4(value: f64) -> f64 {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    // avoid printing "-0"
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Ordered (input, output) breakpoints
#[derive(Clone, Debug, PartialEq)]
pub struct Interpolation {
    input: SmallVec<[f64; 4]>,
    output: SmallVec<[f64; 4]>,
    easing: Easing,
    left: Extrapolate,
    right: Extrapolate,
    unit: Unit,
}

impl Interpolation {
    /// Build a piecewise-linear mapping; the input range must be non-decreasing.
    pub fn new(input: &[f64], output: &[f64]) -> Result<Self> {
        if input.len() != output.len() {
            return Err(ConfigError::RangeLengthMismatch {
                input: input.len(),
                output: output.len(),
            }
            .into());
        }
        if input.len() < 2 {
            return Err(ConfigError::TooFewBreakpoints(input.len()).into());
        }
        if let Some(bad) = input.iter().chain(output).find(|v| !v.is_finite()) {
            return Err(ConfigError::NonFiniteValue(*bad).into());
        }
        if let Some(i) = input.windows(2).position(|w| w[1] < w[0]) {
            return Err(ConfigError::NonMonotonicDomain(i + 1).into());
        }

        Ok(Self {
            input: SmallVec::from_slice(input),
            output: SmallVec::from_slice(output),
            easing: Easing::Linear,
            left: Extrapolate::Clamp,
            right: Extrapolate::Clamp,
            unit: Unit::None,
        })
    }

    /// Shape each segment with an easing curve
    pub fn with_easing(mut self, easing: Easing) -> Result<Self> {
        easing.validate()?;
        self.easing = easing;
        Ok(self)
    }

    /// Same extrapolation on both sides
    pub fn extrapolate(mut self, mode: Extrapolate) -> Self {
        self.left = mode;
        self.right = mode;
        self
    }

    pub fn extrapolate_left(mut self, mode: Extrapolate) -> Self {
        self.left = mode;
        self
    }

    pub fn extrapolate_right(mut self, mode: Extrapolate) -> Self {
        self.right = mode;
        self
    }

    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }

    /// Evaluate the mapping at `x`
    pub fn eval(&self, x: f64) -> f64 {
        let last = self.input.len() - 1;

        if x < self.input[0] {
            return match self.left {
                Extrapolate::Clamp => self.output[0],
                Extrapolate::Identity => x,
                Extrapolate::Extend => self.segment(0, x, false),
            };
        }
        if x > self.input[last] {
            return match self.right {
                Extrapolate::Clamp => self.output[last],
                Extrapolate::Identity => x,
                Extrapolate::Extend => self.segment(last - 1, x, false),
            };
        }

        // Last segment whose start is <= x
        let i = self.input[..last]
            .iter()
            .rposition(|start| *start <= x)
            .unwrap_or(0);
        self.segment(i, x, true)
    }

    /// Evaluate and format with the configured unit, e.g. `"360deg"`
    pub fn eval_string(&self, x: f64) -> String {
        self.unit.format(self.eval(x))
    }

    fn segment(&self, i: usize, x: f64, eased: bool) -> f64 {
        let (in_lo, in_hi) = (self.input[i], self.input[i + 1]);
        let (out_lo, out_hi) = (self.output[i], self.output[i + 1]);
        if in_hi == in_lo {
            return if x < in_lo { out_lo } else { out_hi };
        }
        let t = (x - in_lo) / (in_hi - in_lo);
        let t = if eased { self.easing.apply(t) } else { t };
        out_lo + (out_hi - out_lo) * t
    }
}

/// One-shot clamped linear interpolation
pub fn interpolate(x: f64, input: &[f64], output: &[f64]) -> Result<f64> {
    Ok(Interpolation::new(input, output)?.eval(x))
}
