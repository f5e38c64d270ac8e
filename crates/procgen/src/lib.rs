//! Procedural generation for the infinite, deterministic ring-particle field: a
//! pseudorandom hash grid, a Worley point sampler built on it, a fractal noise
//! function, sector indexing/geometry, the analytic density field, and the
//! `RingSystem` that composes all of the above into a query-on-demand field.

pub mod density;
pub mod error;
pub mod noise;
pub mod pseudorandom;
pub mod ring_system;
pub mod sector;
pub mod worley;

pub use density::{Hole, RingParameters};
pub use error::RingSystemError;
pub use noise::noise;
pub use pseudorandom::{
    next_pseudorandom, AxisSeeds, PseudorandomGrid3, QuadraticSeeds, AXIS_W_DEFAULT, AXIS_X_DEFAULT,
    AXIS_Y_DEFAULT, AXIS_Z_DEFAULT,
};
pub use ring_system::{ParticleSummary, RingSystem, DEFAULT_DRAW_HALO_SECTORS, MATERIAL_COUNT};
pub use sector::{center_of, index_of, sphere_vs_cuboid, SectorIndex, SECTOR_EDGE};
pub use worley::{get_points, WorleyPoint3};
