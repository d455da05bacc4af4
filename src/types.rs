//! Strongly-typed geometry primitives for plotyard.
//!
//! Data space is whatever coordinate system the records use. Canvas space is
//! SVG pixels: physical inches multiplied by the canvas DPI, y pointing down.

use std::fmt;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::errors::LayoutError;

/// A point in either data space or canvas space.
pub type Point = DVec2;

/// Error type for invalid numeric values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericError {
    /// Value is NaN
    NaN,
    /// Value is infinite
    Infinite,
    /// Value is zero when non-zero required
    Zero,
    /// Value is negative when positive required
    Negative,
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericError::NaN => write!(f, "value is NaN"),
            NumericError::Infinite => write!(f, "value is infinite"),
            NumericError::Zero => write!(f, "value is zero"),
            NumericError::Negative => write!(f, "value is negative"),
        }
    }
}

impl std::error::Error for NumericError {}

/// Physical length in inches
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Length(pub f64);

impl Length {
    /// Create a Length from inches (const-friendly, unchecked).
    #[inline]
    pub const fn inches(val: f64) -> Length {
        Length(val)
    }

    /// Create a non-negative Length with validation
    #[inline]
    pub fn try_non_negative(val: f64) -> Result<Length, NumericError> {
        if val.is_nan() {
            Err(NumericError::NaN)
        } else if val.is_infinite() {
            Err(NumericError::Infinite)
        } else if val < 0.0 {
            Err(NumericError::Negative)
        } else {
            Ok(Length(val))
        }
    }

    /// Get the raw value in inches
    #[inline]
    pub fn raw(self) -> f64 {
        self.0
    }
}

/// Convert inches → px with a given resolution (dots per inch).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scaler {
    pub dpi: f64,
}

impl Scaler {
    /// Create a Scaler with validation (rejects NaN, infinite, zero, negative)
    pub fn try_new(dpi: f64) -> Result<Self, NumericError> {
        if dpi.is_nan() {
            Err(NumericError::NaN)
        } else if dpi.is_infinite() {
            Err(NumericError::Infinite)
        } else if dpi == 0.0 {
            Err(NumericError::Zero)
        } else if dpi < 0.0 {
            Err(NumericError::Negative)
        } else {
            Ok(Scaler { dpi })
        }
    }

    /// Convert a length in inches to raw f64 pixels.
    #[inline]
    pub fn px(&self, l: Length) -> f64 {
        l.0 * self.dpi
    }

    /// Whole pixels, truncated toward zero like the plotter's page size.
    #[inline]
    pub fn whole_px(&self, l: Length) -> f64 {
        self.px(l).trunc()
    }
}

/// Axis-aligned rectangle in data space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataRect {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl DataRect {
    pub const fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        DataRect { x_min, x_max, y_min, y_max }
    }

    /// Reject empty, inverted or non-finite rectangles.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let finite = [self.x_min, self.x_max, self.y_min, self.y_max]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.x_max <= self.x_min || self.y_max <= self.y_min {
            return Err(LayoutError::InvalidRange {
                x_min: self.x_min,
                x_max: self.x_max,
                y_min: self.y_min,
                y_max: self.y_max,
            });
        }
        Ok(())
    }

    pub fn min(&self) -> Point {
        DVec2::new(self.x_min, self.y_min)
    }

    pub fn max(&self) -> Point {
        DVec2::new(self.x_max, self.y_max)
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Width over height.
    pub fn aspect(&self) -> f64 {
        self.width() / self.height()
    }
}

/// Letterboxed drawing area on the canvas, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Viewport {
    pub fn min(&self) -> Point {
        DVec2::new(self.x, self.y)
    }

    pub fn max(&self) -> Point {
        DVec2::new(self.x + self.w, self.y + self.h)
    }

    /// Strictly inside: points on the border are outside.
    pub fn contains_strict(&self, p: Point) -> bool {
        p.x > self.x && p.x < self.x + self.w && p.y > self.y && p.y < self.y + self.h
    }
}

/// Physical canvas description.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanvasSpec {
    pub width: Length,
    pub height: Length,
    pub padding: Length,
    pub scaler: Scaler,
}

impl CanvasSpec {
    pub fn width_px(&self) -> f64 {
        self.scaler.whole_px(self.width)
    }

    pub fn height_px(&self) -> f64 {
        self.scaler.whole_px(self.height)
    }

    pub fn padding_px(&self) -> f64 {
        self.scaler.px(self.padding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_try_non_negative() {
        assert!(Length::try_non_negative(0.25).is_ok());
        assert_eq!(Length::try_non_negative(-1.0), Err(NumericError::Negative));
        assert_eq!(Length::try_non_negative(f64::NAN), Err(NumericError::NaN));
    }

    #[test]
    fn scaler_rejects_bad_dpi() {
        assert_eq!(Scaler::try_new(0.0), Err(NumericError::Zero));
        assert_eq!(Scaler::try_new(-10.0), Err(NumericError::Negative));
        assert_eq!(Scaler::try_new(f64::INFINITY), Err(NumericError::Infinite));
    }

    #[test]
    fn canvas_pixels_truncate() {
        let canvas = CanvasSpec {
            width: Length::inches(23.4),
            height: Length::inches(33.1),
            padding: Length::inches(0.25),
            scaler: Scaler { dpi: 100.0 },
        };
        assert_eq!(canvas.width_px(), 2340.0);
        assert_eq!(canvas.height_px(), 3310.0);
        assert_eq!(canvas.padding_px(), 25.0);

        let coarse = CanvasSpec {
            width: Length::inches(4.25),
            scaler: Scaler { dpi: 10.0 },
            ..canvas
        };
        assert_eq!(coarse.width_px(), 42.0);
        assert_eq!(coarse.padding_px(), 2.5);
    }

    #[test]
    fn data_rect_validation() {
        assert!(DataRect::new(0.0, 10.0, 0.0, 10.0).validate().is_ok());
        assert!(matches!(
            DataRect::new(1.0, 1.0, 0.0, 10.0).validate(),
            Err(LayoutError::InvalidRange { .. })
        ));
        assert!(DataRect::new(0.0, 10.0, 5.0, -5.0).validate().is_err());
        assert!(DataRect::new(0.0, f64::NAN, 0.0, 1.0).validate().is_err());
    }

    #[test]
    fn viewport_strict_containment() {
        let vp = Viewport { x: 0.0, y: 0.0, w: 100.0, h: 100.0 };
        assert!(vp.contains_strict(DVec2::new(50.0, 50.0)));
        assert!(!vp.contains_strict(DVec2::new(0.0, 50.0)));
        assert!(!vp.contains_strict(DVec2::new(50.0, 100.0)));
        assert!(!vp.contains_strict(DVec2::new(200.0, 200.0)));
    }
}
