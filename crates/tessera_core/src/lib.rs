//! Tessera Core - scene description for the Tessera path tracer.
//!
//! This crate provides:
//!
//! - **Scene description types**: `SceneDescription`, `ImageSettings`,
//!   `RenderSettings`, `CameraDescription`, `SphereDescription`,
//!   `MaterialDescription`
//! - **Scene loading**: JSON file parsing with typed errors
//!
//! The types here are plain data. Turning them into renderable geometry
//! (BVH, camera basis, tiles) is the renderer's job.
//!
//! # Example
//!
//! ```ignore
//! use tessera_core::load_scene;
//!
//! let scene = load_scene("scenes/spheres.json")?;
//! println!("Loaded {} spheres", scene.spheres.len());
//! ```

pub mod loader;
pub mod scene;

// Re-export commonly used types
pub use loader::{load_scene, parse_scene, LoadError, LoadResult};
pub use scene::{
    CameraDescription, ImageSettings, MaterialDescription, RenderSettings, SceneDescription,
    SphereDescription,
};
