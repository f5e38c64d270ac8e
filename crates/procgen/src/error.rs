//! Typed errors for the procedural ring field.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RingSystemError {
    #[error("sector index {0:?} does not fit in 16-bit signed integers per axis")]
    SectorIndexOutOfRange([i64; 3]),
    #[error("query radius {0} is negative")]
    NegativeRadius(f64),
    #[error("ring parameter out of range: {0}")]
    InvalidParameter(&'static str),
}
