#![forbid(unsafe_code)]

//! Persistable snapshot of the viewer's plain-value cells.
//!
//! `tree_data` is deliberately excluded: it is session-local server data
//! re-fetched on demand, not a preference. Where and how the snapshot is
//! stored (file, local storage) is the application shell's business; this
//! module only defines the serde shape and the capture/apply seam.

use serde::{Deserialize, Serialize};

use crate::state::ViewerState;

/// The four user preferences, in a serde-friendly shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub dark_mode: bool,
    pub show_unoccupied: bool,
    pub tree_depth: u32,
    pub render_light: bool,
}

impl Settings {
    /// Snapshot the current preference cells.
    #[must_use]
    pub fn capture(state: &ViewerState) -> Self {
        Self {
            dark_mode: state.dark_mode.get(),
            show_unoccupied: state.show_unoccupied.get(),
            tree_depth: state.tree_depth.get(),
            render_light: state.render_light.get(),
        }
    }

    /// Write the snapshot back into the cells. Each write notifies that
    /// cell's subscribers like any other `set`.
    pub fn apply(&self, state: &ViewerState) {
        state.dark_mode.set(self.dark_mode);
        state.show_unoccupied.set(self.show_unoccupied);
        state.tree_depth.set(self.tree_depth);
        state.render_light.set(self.render_light);
    }
}

impl Default for Settings {
    /// Matches [`ViewerState::new`]'s startup values.
    fn default() -> Self {
        Self {
            dark_mode: false,
            show_unoccupied: true,
            tree_depth: 1,
            render_light: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
