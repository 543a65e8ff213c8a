//! Assertion helpers for headless diagnostics goals.

use crate::frame::Frame;

/// Assertion result with structured failure details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssertionResult {
    Passed,
    Failed { code: String, message: String },
}

impl AssertionResult {
    fn failed(code: &str, message: String) -> Self {
        AssertionResult::Failed {
            code: code.to_string(),
            message,
        }
    }
}

pub fn evaluate_assert_value(
    element: &str,
    property: &str,
    expected: f64,
    tolerance: f64,
    frame: &Frame,
) -> AssertionResult {
    let Some(style) = frame.element(element) else {
        return AssertionResult::failed(
            "missing_element",
            format!("{element}: element not found on {}", frame.screen),
        );
    };
    let Some(actual) = style.property(property) else {
        return AssertionResult::failed(
            "missing_property",
            format!("{element}: no '{property}' property"),
        );
    };
    if (actual - expected).abs() <= tolerance {
        AssertionResult::Passed
    } else {
        AssertionResult::failed(
            "value_mismatch",
            format!(
                "{element}.{property}: expected {expected} (±{tolerance}), got {actual} at {} ms",
                frame.time_ms
            ),
        )
    }
}

pub fn evaluate_assert_navigated(to: &str, navigations: &[String]) -> AssertionResult {
    if navigations.iter().any(|n| n == to) {
        AssertionResult::Passed
    } else if navigations.is_empty() {
        AssertionResult::failed("not_navigated", format!("expected navigation to '{to}', saw none"))
    } else {
        AssertionResult::failed(
            "not_navigated",
            format!(
                "expected navigation to '{to}', saw {}",
                navigations.join(", ")
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::ElementStyle;

    #[test]
    fn test_value_within_tolerance() {
        let frame = Frame::new("splash", 750.0).with("title", ElementStyle::default().faded(0.5));
        assert_eq!(
            evaluate_assert_value("title", "opacity", 0.5001, 1e-3, &frame),
            AssertionResult::Passed
        );
        assert!(matches!(
            evaluate_assert_value("title", "opacity", 1.0, 1e-3, &frame),
            AssertionResult::Failed { ref code, .. } if code == "value_mismatch"
        ));
        assert!(matches!(
            evaluate_assert_value("logo", "opacity", 1.0, 1e-3, &frame),
            AssertionResult::Failed { ref code, .. } if code == "missing_element"
        ));
        assert!(matches!(
            evaluate_assert_value("title", "rotate", 0.0, 1e-3, &frame),
            AssertionResult::Failed { ref code, .. } if code == "missing_property"
        ));
    }

    #[test]
    fn test_navigated() {
        let seen = vec!["Login".to_string()];
        assert_eq!(evaluate_assert_navigated("Login", &seen), AssertionResult::Passed);
        assert_eq!(
            evaluate_assert_navigated("Home", &seen),
            AssertionResult::Failed {
                code: "not_navigated".into(),
                message: "expected navigation to 'Home', saw Login".into(),
            }
        );
    }
}
