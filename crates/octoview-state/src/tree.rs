#![forbid(unsafe_code)]

//! Octree voxel payload served by the viewer backend.
//!
//! The backend answers `GET /octree?height=N` with a flat voxel dump:
//!
//! ```json
//! {
//!   "rootSize": 12.8,
//!   "treeDepth": 5,
//!   "voxels": [
//!     { "c": { "x": 0.1, "y": -0.2, "z": 0.4 }, "o": true, "d": 3 }
//!   ]
//! }
//! ```
//!
//! Field names are deliberately short on the wire (`c`/`o`/`d`) because a
//! dense cloud produces hundreds of thousands of voxels per response.
//! This module keeps those wire names via serde renames and gives the
//! rest of the viewer long-named, typed access.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Decode failures for an octree payload.
#[derive(Debug, Error)]
pub enum TreeDataError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("tree depth must be at least 1")]
    ZeroDepth,

    #[error("voxel {index} has depth {voxel_depth}, beyond tree depth {tree_depth}")]
    VoxelBeyondDepth {
        index: usize,
        voxel_depth: u8,
        tree_depth: u32,
    },
}

/// Center of one voxel cube, in cloud coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoxelCenter {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// One octree node as rendered by the viewer.
///
/// `occupied` distinguishes nodes that contain cloud points from empty
/// siblings emitted for context; the `show_unoccupied` cell controls
/// whether the latter are drawn at all.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Voxel {
    #[serde(rename = "c")]
    pub center: VoxelCenter,
    #[serde(rename = "o")]
    pub occupied: bool,
    #[serde(rename = "d")]
    pub depth: u8,
}

/// A complete `/octree` response: the cube edge length of the root node,
/// the depth the dump was cut at, and every voxel down to that depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeData {
    #[serde(rename = "rootSize")]
    pub root_size: f64,
    #[serde(rename = "treeDepth")]
    pub depth: u32,
    pub voxels: Vec<Voxel>,
}

impl TreeData {
    /// Decode one response body and validate depth consistency: the dump
    /// depth must be at least 1 and no voxel may sit below it.
    pub fn from_json(body: &str) -> Result<Self, TreeDataError> {
        let tree: Self = serde_json::from_str(body)?;
        if tree.depth == 0 {
            return Err(TreeDataError::ZeroDepth);
        }
        for (index, voxel) in tree.voxels.iter().enumerate() {
            if u32::from(voxel.depth) > tree.depth {
                return Err(TreeDataError::VoxelBeyondDepth {
                    index,
                    voxel_depth: voxel.depth,
                    tree_depth: tree.depth,
                });
            }
        }
        Ok(tree)
    }

    /// Voxels at or above the given depth (root is depth 0).
    pub fn voxels_up_to(&self, depth: u32) -> impl Iterator<Item = &Voxel> {
        self.voxels
            .iter()
            .filter(move |v| u32::from(v.depth) <= depth)
    }

    /// Number of voxels that contain cloud points.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.voxels.iter().filter(|v| v.occupied).count()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
