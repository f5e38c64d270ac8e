//! The steering kernel: ten named behaviours, a composable obstacle-avoidance
//! filter, and closed-form intercept math, plus an orrery test-target helper.

pub mod agent;
pub mod constants;
pub mod error;
pub mod intercept;
pub mod kernel;
pub mod orrery;

pub use agent::AgentState;
pub use constants::*;
pub use error::SteeringError;
pub use intercept::{aim_direction, intercept_time_moving, intercept_time_stationary};
pub use kernel::{BehaviourTag, SteeringKernel};
pub use orrery::{Epicycle, Orrery};
