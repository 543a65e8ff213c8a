//! Easing curves applied to normalized elapsed time

use crate::error::{ConfigError, Result};

/// Easing function type
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseOutQuart,
    /// Ease out past the target and settle back.
    ///
    /// Stands in for an under-damped spring; `overshoot` of 1.70158 gives
    /// roughly 10% overshoot.
    EaseOutBack { overshoot: f64 },
    CubicBezier(f64, f64, f64, f64),
}

impl Easing {
    /// Standard back-ease overshoot constant
    pub const BACK: Easing = Easing::EaseOutBack {
        overshoot: 1.70158,
    };

    /// Apply the easing function to a progress value.
    ///
    /// Input is clamped to [0, 1]; the endpoints always map to exactly 0 and 1.
    pub fn apply(&self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        if t == 0.0 || t == 1.0 {
            return t;
        }
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t * t,
            Easing::EaseOut => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::EaseInQuad => t * t,
            Easing::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::EaseOutQuart => 1.0 - (1.0 - t).powi(4),
            Easing::EaseOutBack { overshoot } => {
                let c1 = *overshoot;
                let c3 = c1 + 1.0;
                let u = t - 1.0;
                1.0 + c3 * u.powi(3) + c1 * u.powi(2)
            }
            Easing::CubicBezier(x1, y1, x2, y2) => cubic_bezier_ease(t, *x1, *y1, *x2, *y2),
        }
    }

    /// Reject curves that cannot be evaluated.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Easing::EaseOutBack { overshoot } if !overshoot.is_finite() || overshoot < 0.0 => {
                Err(ConfigError::MalformedEasing(format!("overshoot {overshoot}")).into())
            }
            Easing::CubicBezier(x1, y1, x2, y2) => {
                if ![x1, y1, x2, y2].iter().all(|v| v.is_finite()) {
                    return Err(ConfigError::MalformedEasing(
                        "bezier control points must be finite".to_string(),
                    )
                    .into());
                }
                if !(0.0..=1.0).contains(&x1) || !(0.0..=1.0).contains(&x2) {
                    return Err(ConfigError::MalformedEasing(format!(
                        "bezier x control points must lie in [0, 1], got {x1} and {x2}"
                    ))
                    .into());
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// Cubic bezier easing calculation (matches CSS / browser implementations).
///
/// Uses Newton-Raphson with binary-search fallback for robustness.
fn cubic_bezier_ease(x: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let mut p = x;
    for _ in 0..8 {
        let err = bezier_sample(p, x1, x2) - x;
        if err.abs() < 1e-7 {
            return bezier_sample(p, y1, y2);
        }
        let slope = bezier_slope(p, x1, x2);
        if slope.abs() < 1e-7 {
            break;
        }
        p -= err / slope;
    }

    // Binary search fallback (always converges)
    let mut lo = 0.0_f64;
    let mut hi = 1.0_f64;
    p = x;
    for _ in 0..20 {
        let val = bezier_sample(p, x1, x2);
        if (val - x).abs() < 1e-7 {
            break;
        }
        if val < x {
            lo = p;
        } else {
            hi = p;
        }
        p = (lo + hi) * 0.5;
    }

    bezier_sample(p, y1, y2)
}

/// B(t) = 3(1-t)²t·p1 + 3(1-t)t²·p2 + t³, in Horner form
#[inline]
fn bezier_sample(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    ((a * t + b) * t + c) * t
}

#[inline]
fn bezier_slope(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    (3.0 * a * t + 2.0 * b) * t + c
}
