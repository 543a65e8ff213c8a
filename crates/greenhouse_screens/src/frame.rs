//! Render parameters handed to the view layer each frame

use std::collections::BTreeMap;
use std::fmt;

use greenhouse_animation::Unit;
use serde::{Serialize, Serializer};

/// An angle as a transform consumes it, e.g. `"360deg"` or `"0.6283rad"`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Angle {
    pub value: f64,
    pub unit: Unit,
}

impl Angle {
    pub fn degrees(value: f64) -> Self {
        Self {
            value,
            unit: Unit::Degrees,
        }
    }

    pub fn radians(value: f64) -> Self {
        Self {
            value,
            unit: Unit::Radians,
        }
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.unit.format(self.value))
    }
}

impl Serialize for Angle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Animated style of one on-screen element
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementStyle {
    pub opacity: f64,
    pub translate_y: f64,
    pub scale: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate: Option<Angle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate_x: Option<Angle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate_y: Option<Angle>,
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            translate_y: 0.0,
            scale: 1.0,
            rotate: None,
            rotate_x: None,
            rotate_y: None,
        }
    }
}

impl ElementStyle {
    /// Numeric value of a named property. Angles report their magnitude in
    /// their own unit.
    pub fn property(&self, name: &str) -> Option<f64> {
        match name {
            "opacity" => Some(self.opacity),
            "translate_y" => Some(self.translate_y),
            "scale" => Some(self.scale),
            "rotate" => self.rotate.map(|a| a.value),
            "rotate_x" => self.rotate_x.map(|a| a.value),
            "rotate_y" => self.rotate_y.map(|a| a.value),
            _ => None,
        }
    }

    pub fn faded(mut self, opacity: f64) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn shifted(mut self, translate_y: f64) -> Self {
        self.translate_y = translate_y;
        self
    }

    pub fn scaled(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn rotated(mut self, angle: Angle) -> Self {
        self.rotate = Some(angle);
        self
    }

    pub fn rotated_x(mut self, angle: Angle) -> Self {
        self.rotate_x = Some(angle);
        self
    }

    pub fn rotated_y(mut self, angle: Angle) -> Self {
        self.rotate_y = Some(angle);
        self
    }
}

/// Everything a screen paints at one instant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub screen: String,
    pub time_ms: f64,
    pub elements: BTreeMap<String, ElementStyle>,
}

impl Frame {
    pub fn new(screen: impl Into<String>, time_ms: f64) -> Self {
        Self {
            screen: screen.into(),
            time_ms,
            elements: BTreeMap::new(),
        }
    }

    pub fn with(mut self, element: impl Into<String>, style: ElementStyle) -> Self {
        self.elements.insert(element.into(), style);
        self
    }

    pub fn insert(&mut self, element: impl Into<String>, style: ElementStyle) {
        self.elements.insert(element.into(), style);
    }

    pub fn element(&self, name: &str) -> Option<&ElementStyle> {
        self.elements.get(name)
    }
}
