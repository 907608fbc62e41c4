//! Scalar-to-colour mapping through a figure palette.

use crate::error::DecodeError;

/// Normalised RGB triple.
pub type Rgb = [f64; 3];

/// Ordered palette owned by a figure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Colormap {
    entries: Vec<Rgb>,
}

impl Colormap {
    /// Creates a palette from its entries, lowest scalar first.
    #[must_use]
    pub const fn new(entries: Vec<Rgb>) -> Self {
        Self { entries }
    }

    /// Palette entries.
    #[must_use]
    pub fn entries(&self) -> &[Rgb] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the palette has no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maps each scalar to a palette entry.
    ///
    /// Values are normalised against the observed minimum and maximum of
    /// `values`, then scaled to `[0, len - 1]` and rounded. When every value is
    /// equal the normalised value is taken as 0, so the first entry is used.
    /// Non-finite values also map to the first entry.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Colormap`] when the palette is empty.
    pub fn map_scalars(&self, values: &[f64]) -> Result<Vec<Rgb>, DecodeError> {
        let last = self.entries.len().checked_sub(1).ok_or(DecodeError::Colormap)?;
        let (min, max) = values
            .iter()
            .copied()
            .filter(|value| value.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), value| {
                (lo.min(value), hi.max(value))
            });
        let span = max - min;

        #[expect(
            clippy::cast_precision_loss,
            reason = "palettes hold a few hundred entries at most"
        )]
        let top = last as f64;

        Ok(values
            .iter()
            .map(|&value| {
                let normalised = if span > 0.0 && value.is_finite() {
                    (value - min) / span
                } else {
                    0.0
                };
                self.entry_at(normalised * top, last)
            })
            .collect())
    }

    fn entry_at(&self, position: f64, last: usize) -> Rgb {
        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "position is clamped to [0, last] before the cast"
        )]
        let index = position.round().clamp(0.0, f64::from(u32::MAX)) as usize;
        self.entries
            .get(index.min(last))
            .copied()
            .unwrap_or_default()
    }
}
