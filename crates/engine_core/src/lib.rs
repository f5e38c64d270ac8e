//! Core engine types and utilities shared across the simulation.
//!
//! This crate provides the foundational types used across the engine:
//! - Transform and kinematic-basis math
//! - Time management (frame timing, smoothing, AI budgets)
//! - Packed entity identity

pub mod identity;
pub mod time;
pub mod transform;

pub use identity::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Mat3, Mat4, Quat, Vec2, Vec3, Vec4};
