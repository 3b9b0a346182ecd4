//! Renderer error type.
//!
//! Capacity and precondition violations are reported when the world, the
//! camera, or the tile queue is built, before any worker starts.

use thiserror::Error;

use crate::{MAX_QUERY_CANDIDATES, MAX_SPHERES, MAX_TILES};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("scene has {0} spheres, the limit is {}", MAX_SPHERES)]
    TooManySpheres(usize),

    #[error("tile grid has {0} tiles, the limit is {}", MAX_TILES)]
    TooManyTiles(usize),

    #[error("BVH query produced more than {} candidates", MAX_QUERY_CANDIDATES)]
    CandidateOverflow,

    #[error("scratch arena of {capacity} bytes cannot hold a {required} byte candidate batch")]
    ArenaTooSmall { capacity: usize, required: usize },

    #[error("invalid sphere: {0}")]
    InvalidSphere(String),

    #[error("invalid camera: {0}")]
    InvalidCamera(String),

    #[error("invalid render configuration: {0}")]
    InvalidConfig(String),

    #[error("render worker panicked")]
    WorkerPanicked,

    #[error("render finished with {completed} of {total} tiles")]
    IncompleteRender { completed: usize, total: usize },

    #[error("tile {0} was poisoned by a panicking worker")]
    Poisoned(usize),
}

pub type RenderResult<T> = Result<T, RenderError>;
