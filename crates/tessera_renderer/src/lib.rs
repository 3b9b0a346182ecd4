//! Tessera Renderer - CPU Path Tracing
//!
//! A Monte Carlo path tracer over spheres. The pieces, bottom up:
//!
//! - **Materials**: diffuse, metal and dielectric scattering plus emittance
//! - **BVH**: median-split hierarchy over sphere bounding boxes
//! - **Candidate batch**: 4-wide ray/sphere tests over a BVH query's leaves,
//!   allocated from a per-tile scratch arena
//! - **Camera**: thin-lens ray generation
//! - **Integrator**: iterative path tracing with a bounce limit
//! - **Scheduler**: tiles claimed by a fixed worker pool through an atomic cursor
//! - **Framebuffer**: linear radiance and the gamma resolve to RGBA8

mod arena;
mod batch;
mod bvh;
mod camera;
mod error;
mod framebuffer;
mod hit;
mod integrator;
mod material;
mod renderer;
mod sampling;
mod scheduler;
mod sphere;
mod tile;
mod world;

pub mod scene;

/// Most spheres one world may hold.
pub const MAX_SPHERES: usize = 256;
/// Most tiles one render may be split into.
pub const MAX_TILES: usize = 4096;
/// Most candidates a single BVH query may gather. A multiple of the lane width.
pub const MAX_QUERY_CANDIDATES: usize = 256;

pub use arena::{ScratchArena, DEFAULT_ARENA_CAPACITY};
pub use batch::{CandidateBatch, LANES};
pub use bvh::{Bvh, BvhNode};
pub use camera::{Camera, CameraSettings};
pub use error::{RenderError, RenderResult};
pub use framebuffer::{color_to_rgba, encode_channel, Framebuffer, GAMMA};
pub use hit::HitRecord;
pub use integrator::{render_pixel, trace_path, T_MIN};
pub use material::{reflect, reflectance, refract, Color, Material, ScatterResult, Scattering};
pub use renderer::{render, RenderConfig};
pub use sampling::{random_in_unit_disk, random_in_unit_sphere, tile_rng};
pub use scheduler::{RenderJob, RenderQueue};
pub use sphere::Sphere;
pub use tile::{generate_tiles, Tile, TileOutput, TileRect};
pub use world::World;

/// Re-export Vec3 and common math types from tessera_math
pub use tessera_math::{Aabb, Interval, Ray, Vec3, Vec4};
