#![forbid(unsafe_code)]

//! The viewer's observable state registry.
//!
//! [`ViewerState`] owns the five cells the UI binds to. The cells are
//! independent: no write to one notifies another, and nothing in this
//! module mutates them on its own — mutation comes from UI event handlers
//! and from the two tree-loading entry points below.
//!
//! The registry is an injected value, not a global: the application
//! constructs one per process and hands clones of it (cheap, handle-only)
//! to whichever components need access. Tests construct a fresh one each.

use octoview_reactive::Observable;
use tracing::debug;

use crate::tree::{TreeData, TreeDataError};

/// Observable state for one viewer instance.
///
/// Cloning shares the cells; `ViewerState::default()` gives a fresh set
/// with the viewer's startup values.
#[derive(Clone, Debug)]
pub struct ViewerState {
    /// Dark UI theme toggle.
    pub dark_mode: Observable<bool>,
    /// Currently loaded octree dump, `None` until a cloud is loaded.
    pub tree_data: Observable<Option<TreeData>>,
    /// Whether empty voxels are drawn alongside occupied ones.
    pub show_unoccupied: Observable<bool>,
    /// Depth the voxel grid is displayed at. At least 1; clamped to the
    /// loaded tree's depth by [`load_tree`](Self::load_tree).
    pub tree_depth: Observable<u32>,
    /// Lightweight rendering mode (wireframe, no shading).
    pub render_light: Observable<bool>,
}

impl ViewerState {
    /// A registry with the viewer's startup values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dark_mode: Observable::new(false),
            tree_data: Observable::new(None),
            show_unoccupied: Observable::new(true),
            tree_depth: Observable::new(1),
            render_light: Observable::new(false),
        }
    }

    /// Decode a backend `/octree` response and publish it.
    ///
    /// On success the `tree_data` cell is set to `Some(tree)` (one
    /// notification) and `tree_depth` is clamped into `1..=tree.depth`
    /// so the depth slider can't point past the loaded tree. On decode
    /// failure no cell changes.
    pub fn load_tree(&self, body: &str) -> Result<(), TreeDataError> {
        let tree = TreeData::from_json(body)?;
        debug!(
            depth = tree.depth,
            voxels = tree.voxels.len(),
            occupied = tree.occupied_count(),
            "octree loaded"
        );

        let max_depth = tree.depth;
        self.tree_data.set(Some(tree));

        let current = self.tree_depth.get();
        let clamped = current.clamp(1, max_depth);
        if clamped != current {
            debug!(from = current, to = clamped, "tree depth clamped");
            self.tree_depth.set(clamped);
        }
        Ok(())
    }

    /// Drop the loaded tree, returning `tree_data` to `None`. The other
    /// cells keep their values.
    pub fn clear_tree(&self) {
        debug!("octree cleared");
        self.tree_data.set(None);
    }
}

impl Default for ViewerState {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
