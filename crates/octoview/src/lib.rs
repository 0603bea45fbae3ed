#![forbid(unsafe_code)]

//! OctoView public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for users.

pub mod prelude {
    pub use octoview_reactive as reactive;
    pub use octoview_state as state;

    pub use octoview_reactive::{Derived, Observable, Subscription};
    pub use octoview_state::{Settings, TreeData, ViewerState};
}
