//! Odometer search for a collision-free placement.

use crate::aabb::Aabb;
use crate::error::PlacementError;
use crate::parameters::ParameterSet;
use crate::strategy::{Placement, PlacementStrategy};

/// Result of a successful placement search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementOutcome {
    /// Committed transform.
    pub placement: Placement,
    /// Native-space box of the placed scene, without the spacing margin.
    pub bounds: Aabb,
    /// Candidates evaluated, including the accepted one.
    pub evaluations: u64,
}

/// Searches a strategy's parameter space for placements that avoid obstacles.
///
/// The parameter set lives for the whole rearrangement pass, so scenes placed
/// later in a pass resume the search where the previous scene stopped.
#[derive(Debug)]
pub struct PlacementEngine<S> {
    strategy: S,
    parameters: ParameterSet,
    margin: f64,
}

impl<S: PlacementStrategy> PlacementEngine<S> {
    /// Creates an engine whose candidate boxes are inflated by `1 + margin`.
    #[must_use]
    pub fn new(strategy: S, margin: f64) -> Self {
        let parameters = strategy.parameters();
        Self {
            strategy,
            parameters,
            margin: margin.max(0.0),
        }
    }

    /// The strategy driving candidate generation.
    #[must_use]
    pub const fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Current position in the search space.
    #[must_use]
    pub const fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    /// Returns the search to its starting candidate.
    pub fn reset(&mut self) {
        self.parameters.reset();
    }

    /// Finds a placement for `local` that overlaps none of `obstacles`.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::Exhausted`] when every candidate collides.
    pub fn place(
        &mut self,
        local: &Aabb,
        obstacles: &[Aabb],
    ) -> Result<PlacementOutcome, PlacementError> {
        self.place_with(local, |candidate| {
            obstacles.iter().any(|obstacle| candidate.intersects(obstacle))
        })
    }

    /// Finds a placement using a caller-supplied collision test.
    ///
    /// `collides` receives the inflated candidate box. The accepted candidate
    /// leaves the parameters in place; exhaustion resets them.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::Exhausted`] once the final parameter overflows.
    pub fn place_with<F>(
        &mut self,
        local: &Aabb,
        mut collides: F,
    ) -> Result<PlacementOutcome, PlacementError>
    where
        F: FnMut(&Aabb) -> bool,
    {
        let inflation = 1.0 + self.margin;
        let mut evaluations = 0_u64;
        loop {
            let placement = self.strategy.candidate(&self.parameters);
            let bounds = placement.apply(local);
            evaluations += 1;
            if !collides(&bounds.inflated(inflation)) {
                return Ok(PlacementOutcome {
                    placement,
                    bounds,
                    evaluations,
                });
            }
            if !self.parameters.advance() {
                self.parameters.reset();
                return Err(PlacementError::exhausted(evaluations));
            }
        }
    }
}
