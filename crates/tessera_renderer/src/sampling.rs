//! Random sampling helpers shared by the camera and the materials.
//!
//! Every function takes the caller's generator explicitly. Workers own one
//! generator per tile, so nothing here touches shared state.

use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use tessera_math::{Vec2, Vec3};

/// Uniform float in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Rejection-sample a point strictly inside the unit sphere.
pub fn random_in_unit_sphere(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = Vec3::new(
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
        );
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Rejection-sample a point strictly inside the unit disk.
pub fn random_in_unit_disk(rng: &mut dyn RngCore) -> Vec2 {
    loop {
        let p = Vec2::new(gen_f32(rng) * 2.0 - 1.0, gen_f32(rng) * 2.0 - 1.0);
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Generator for one tile of one render.
///
/// Mixing the tile index into the master seed keeps tiles statistically
/// independent and makes the image independent of which worker claims
/// which tile.
pub fn tile_rng(seed: u64, tile_index: usize) -> SmallRng {
    let stream = (tile_index as u64)
        .wrapping_add(1)
        .wrapping_mul(0x9E37_79B9_7F4A_7C15);
    SmallRng::seed_from_u64(seed ^ stream)
}
