//! Live scenes owned by the stage.

use std::collections::BTreeMap;
use std::fmt;

use figstage_layout::{Aabb, Placement};
use figstage_scene::SceneGraph;
use glam::DVec3;
use tracing::debug;

const REGISTRY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::registry");

/// Native position of scenes waiting to be placed, far from the viewer.
pub const PARK_POSITION: DVec3 = DVec3::new(1000.0, 0.0, 0.0);

/// Handle of a live scene. Handles increase monotonically and are never
/// reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SceneId(u64);

impl SceneId {
    /// Raw handle value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "scene-{}", self.0)
    }
}

/// One decoded figure and its placement state.
#[derive(Debug, Clone)]
pub struct SceneEntry {
    graph: SceneGraph,
    local_bounds: Option<Aabb>,
    placement: Option<Placement>,
    parked: bool,
}

impl SceneEntry {
    fn new(graph: SceneGraph) -> Self {
        Self {
            graph,
            local_bounds: None,
            placement: None,
            parked: false,
        }
    }

    /// Decoded scene graph.
    #[must_use]
    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// Mutable access for resolution passes.
    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    /// `true` while some node still awaits resolution.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.graph.needs_resolution()
    }

    /// Bounding box relative to the figure origin, in native units.
    #[must_use]
    pub fn local_bounds(&self) -> Option<Aabb> {
        self.local_bounds
    }

    /// Records the box computed once the scene resolved.
    pub fn set_local_bounds(&mut self, bounds: Option<Aabb>) {
        self.local_bounds = bounds;
    }

    /// Committed transform, if the scene has ever been placed or parked.
    #[must_use]
    pub fn placement(&self) -> Option<Placement> {
        self.placement
    }

    /// `true` while the scene waits outside the working volume.
    #[must_use]
    pub fn is_parked(&self) -> bool {
        self.parked
    }

    /// Native-space box, or `None` when the scene is unplaced or parked.
    ///
    /// Only scenes with a world box act as obstacles for placement.
    #[must_use]
    pub fn world_bounds(&self) -> Option<Aabb> {
        if self.parked {
            return None;
        }
        let placement = self.placement?;
        self.local_bounds.map(|bounds| placement.apply(&bounds))
    }
}

/// Set of live top-level scenes.
///
/// Iteration follows insertion order, which is also the order scenes are
/// placed within a rearrangement pass.
#[derive(Debug, Default)]
pub struct SceneRegistry {
    scenes: BTreeMap<SceneId, SceneEntry>,
    next: u64,
}

impl SceneRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a decoded scene and returns its handle.
    pub fn insert(&mut self, graph: SceneGraph) -> SceneId {
        let id = SceneId(self.next);
        self.next += 1;
        debug!(target: REGISTRY_TARGET, scene = %id, nodes = graph.len(), "scene registered");
        self.scenes.insert(id, SceneEntry::new(graph));
        id
    }

    /// Scene behind `id`.
    #[must_use]
    pub fn get(&self, id: SceneId) -> Option<&SceneEntry> {
        self.scenes.get(&id)
    }

    /// Mutable scene behind `id`.
    pub fn get_mut(&mut self, id: SceneId) -> Option<&mut SceneEntry> {
        self.scenes.get_mut(&id)
    }

    /// Removes one scene.
    pub fn remove(&mut self, id: SceneId) -> Option<SceneEntry> {
        let removed = self.scenes.remove(&id);
        if removed.is_some() {
            debug!(target: REGISTRY_TARGET, scene = %id, "scene removed");
        }
        removed
    }

    /// Removes every scene, returning how many were dropped.
    pub fn clear(&mut self) -> usize {
        let count = self.scenes.len();
        self.scenes.clear();
        debug!(target: REGISTRY_TARGET, count, "registry cleared");
        count
    }

    /// Number of live scenes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// Returns `true` when no scene is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Iterates scenes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (SceneId, &SceneEntry)> {
        self.scenes.iter().map(|(&id, entry)| (id, entry))
    }

    /// Iterates scenes mutably in insertion order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SceneId, &mut SceneEntry)> {
        self.scenes.iter_mut().map(|(&id, entry)| (id, entry))
    }

    /// Returns `true` when any scene still awaits resolution.
    #[must_use]
    pub fn any_pending(&self) -> bool {
        self.scenes.values().any(SceneEntry::is_pending)
    }

    /// Moves a scene outside the working volume so it no longer obstructs
    /// placement.
    pub fn park(&mut self, id: SceneId) {
        if let Some(entry) = self.scenes.get_mut(&id) {
            entry.placement = Some(Placement::at(PARK_POSITION));
            entry.parked = true;
        }
    }

    /// Commits a placement for a scene.
    pub fn place(&mut self, id: SceneId, placement: Placement) {
        if let Some(entry) = self.scenes.get_mut(&id) {
            entry.placement = Some(placement);
            entry.parked = false;
        }
    }

    /// Puts a scene back where it was before a pass parked it.
    pub fn restore(&mut self, id: SceneId, previous: Option<Placement>) {
        if let Some(entry) = self.scenes.get_mut(&id) {
            entry.placement = previous;
            entry.parked = false;
        }
    }

    /// World boxes of every placed scene other than `except`.
    #[must_use]
    pub fn obstacles(&self, except: SceneId) -> Vec<Aabb> {
        self.scenes
            .iter()
            .filter(|&(&id, _)| id != except)
            .filter_map(|(_, entry)| entry.world_bounds())
            .collect()
    }
}
