//! Typed errors for the simulation world. Precondition violations propagate;
//! queries against a dead or unknown id instead return neutral values at the call
//! site and never reach this enum.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    #[error(transparent)]
    RingSystem(#[from] procgen::RingSystemError),
    #[error(transparent)]
    Steering(#[from] steering::SteeringError),
}
