//! Kinematic body physics: position/orientation/velocity integration and pure
//! sphere-vs-sphere collision detection. No rigid-body dynamics; the simulation
//! tick owns collision *resolution*, this crate only the geometry.

pub mod body;
pub mod collision;

pub use body::{DisplayHandle, KinematicBody};
pub use collision::spheres_overlap;
