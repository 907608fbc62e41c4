//! Odometer-style placement parameters.

use std::fmt;

/// Relative slack allowed when comparing a value against its maximum.
const OVERFLOW_EPSILON: f64 = 1e-9;

/// One named axis of a placement search space.
///
/// The current value is `min + steps * increment`, so repeated advancing does
/// not accumulate rounding drift.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementParameter {
    name: &'static str,
    min: f64,
    max: f64,
    increment: f64,
    steps: u64,
}

impl PlacementParameter {
    /// Creates a parameter positioned at `min`.
    ///
    /// `max` may be `f64::INFINITY`. A non-positive or non-finite increment
    /// makes the parameter single-valued.
    #[must_use]
    pub const fn new(name: &'static str, min: f64, max: f64, increment: f64) -> Self {
        Self {
            name,
            min,
            max,
            increment,
            steps: 0,
        }
    }

    /// Parameter name, used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Lower bound.
    #[must_use]
    pub const fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound.
    #[must_use]
    pub const fn max(&self) -> f64 {
        self.max
    }

    /// Step between successive values.
    #[must_use]
    pub const fn increment(&self) -> f64 {
        self.increment
    }

    /// Current value.
    #[must_use]
    pub fn value(&self) -> f64 {
        if self.steps == 0 {
            return self.min;
        }
        #[expect(
            clippy::cast_precision_loss,
            reason = "step counts stay far below 2^52 in any practical search"
        )]
        let offset = self.steps as f64 * self.increment;
        self.min + offset
    }

    /// Moves to the next value. Returns `false` and wraps to `min` on overflow.
    fn advance(&mut self) -> bool {
        if !(self.increment.is_finite() && self.increment > 0.0) {
            self.steps = 0;
            return false;
        }
        self.steps = self.steps.saturating_add(1);
        let slack = OVERFLOW_EPSILON * self.max.abs().max(1.0);
        if self.value() > self.max + slack {
            self.steps = 0;
            return false;
        }
        true
    }

    const fn reset(&mut self) {
        self.steps = 0;
    }
}

/// Ordered parameters advanced like the digits of an odometer.
///
/// The first parameter is the fastest-moving digit.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet {
    parameters: Vec<PlacementParameter>,
}

impl ParameterSet {
    /// Creates a set from parameters ordered fastest first.
    #[must_use]
    pub const fn new(parameters: Vec<PlacementParameter>) -> Self {
        Self { parameters }
    }

    /// Current value of the parameter at `index`.
    #[must_use]
    pub fn value(&self, index: usize) -> Option<f64> {
        self.parameters.get(index).map(PlacementParameter::value)
    }

    /// Iterates the parameters in order.
    pub fn iter(&self) -> impl Iterator<Item = &PlacementParameter> {
        self.parameters.iter()
    }

    /// Number of parameters.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Returns `true` when the set has no parameters.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Advances to the next candidate, carrying overflow into later parameters.
    ///
    /// Returns `false` once the final parameter overflows; every parameter has
    /// then wrapped back to its minimum and the search space is exhausted.
    pub fn advance(&mut self) -> bool {
        self.parameters.iter_mut().any(PlacementParameter::advance)
    }

    /// Returns every parameter to its minimum.
    pub fn reset(&mut self) {
        self.parameters
            .iter_mut()
            .for_each(PlacementParameter::reset);
    }
}

impl fmt::Display for ParameterSet {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, parameter) in self.parameters.iter().enumerate() {
            if index > 0 {
                formatter.write_str(", ")?;
            }
            write!(formatter, "{}:{}", parameter.name, parameter.value())?;
        }
        Ok(())
    }
}
