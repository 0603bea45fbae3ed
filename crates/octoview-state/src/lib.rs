#![forbid(unsafe_code)]

//! Viewer state for OctoView: the five observable cells the UI binds to,
//! the octree payload model behind `tree_data`, and a persistable
//! preference snapshot.

pub mod settings;
pub mod state;
pub mod tree;

pub use settings::Settings;
pub use state::ViewerState;
pub use tree::{TreeData, TreeDataError, Voxel, VoxelCenter};
