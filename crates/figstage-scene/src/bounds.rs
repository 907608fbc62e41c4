//! Bounding volume of a resolved scene in native units.

use figstage_layout::Aabb;

use crate::graph::SceneGraph;

impl SceneGraph {
    /// Encloses all resolved geometry except text, relative to the figure
    /// origin and scaled by `1 / pixels_per_unit`.
    ///
    /// Returns `None` when nothing drawable has resolved. A non-positive
    /// `pixels_per_unit` leaves the box in pixels.
    #[must_use]
    pub fn bounds(&self, pixels_per_unit: f64) -> Option<Aabb> {
        let scale = if pixels_per_unit > 0.0 {
            pixels_per_unit.recip()
        } else {
            1.0
        };
        let points = self
            .iter()
            .filter(|&(id, _)| !self.within_text(id))
            .filter_map(|(_, node)| node.resolved())
            .flat_map(|resolved| {
                let origin = resolved.frame.origin;
                resolved
                    .geometry
                    .extremes()
                    .into_iter()
                    .map(move |point| (point + origin) * scale)
            });
        Aabb::enclosing(points)
    }
}
