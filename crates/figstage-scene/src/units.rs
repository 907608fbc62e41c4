//! Conversion of axes data coordinates into figure pixels.

use glam::{DVec2, DVec3};

use crate::node::Axes;

/// Whether a data coordinate is a location or a displacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// A location: measured from the lower limits, centred inside the
    /// available extent, and mirrored on the third axis.
    Absolute,
    /// A displacement such as a size: only scaled.
    Relative,
}

/// Scale and placement of one axes' data box inside its available extent.
///
/// The data span of each axis is divided by the aspect ratio, then the whole
/// box is scaled uniformly by the largest factor that still fits the
/// available width and height. Depth is never a constraint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxesFrame {
    lower: DVec3,
    span: DVec3,
    size: DVec3,
    available: DVec3,
}

impl AxesFrame {
    /// Builds the mapping for `axes` laid out inside `available` pixels.
    #[must_use]
    pub fn new(axes: &Axes, available: DVec2) -> Self {
        let span = axes.upper - axes.lower;
        let unscaled = span / axes.aspect;
        let room = DVec3::new(available.x, available.y, f64::INFINITY);
        let fit = (room / unscaled.abs())
            .to_array()
            .into_iter()
            .filter(|factor| !factor.is_nan())
            .fold(f64::INFINITY, f64::min);
        let scale = if fit.is_finite() { fit } else { 0.0 };
        Self {
            lower: axes.lower,
            span,
            size: unscaled * scale,
            available: available.extend(0.0),
        }
    }

    /// Pixel size of the scaled data box.
    #[must_use]
    pub const fn size(&self) -> DVec3 {
        self.size
    }

    /// Data span per axis.
    #[must_use]
    pub const fn span(&self) -> DVec3 {
        self.span
    }

    /// Maps `coordinate` from data space into pixels.
    ///
    /// An axis whose limits coincide maps every coordinate to zero.
    #[must_use]
    pub fn to_pixels(&self, coordinate: DVec3, conversion: Conversion) -> DVec3 {
        let measured = match conversion {
            Conversion::Absolute => coordinate - self.lower,
            Conversion::Relative => coordinate,
        };
        let ratio = DVec3::select(
            self.span.cmpeq(DVec3::ZERO),
            DVec3::ZERO,
            measured / self.span,
        );
        let pixels = ratio * self.size;
        match conversion {
            Conversion::Relative => pixels,
            Conversion::Absolute => {
                (pixels + (self.available - self.size) * 0.5) * DVec3::new(1.0, 1.0, -1.0)
            }
        }
    }
}
