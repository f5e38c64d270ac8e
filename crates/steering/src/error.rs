//! Typed errors for the steering kernel.

use thiserror::Error;

/// Programmer errors raised by the steering kernel. All are preconditions on
/// arguments; none are expected to occur given a correctly wired caller.
#[derive(Debug, Error, PartialEq)]
pub enum SteeringError {
    #[error("explore/patrol minimum distance {0} must exceed EXPLORE_DISTANCE_NEW_POSITION")]
    DesiredDistanceTooSmall(f64),
    #[error("explore/patrol distance range is inverted: min {min} > max {max}")]
    InvertedDistanceRange { min: f64, max: f64 },
}
