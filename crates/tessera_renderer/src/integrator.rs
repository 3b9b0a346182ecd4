//! Path tracing integrator.
//!
//! Iterative, bounded-depth form: a path carries a throughput (the product
//! of attenuations so far) and adds emitted and background radiance
//! weighted by it.

use rand::RngCore;
use tessera_math::{Interval, Ray};

use crate::arena::ScratchArena;
use crate::camera::Camera;
use crate::error::RenderResult;
use crate::sampling::gen_f32;
use crate::{Color, World};

/// Minimum hit distance, keeps scattered rays off their own surface.
pub const T_MIN: f32 = 0.001;

/// Estimate the radiance arriving along `ray`.
///
/// At most `max_bounces` intersections are followed. A path that is still
/// alive after that contributes nothing more.
pub fn trace_path(
    world: &World,
    ray: Ray,
    max_bounces: u32,
    arena: &mut ScratchArena,
    rng: &mut dyn RngCore,
) -> RenderResult<Color> {
    let mut throughput = Color::ONE;
    let mut radiance = Color::ZERO;
    let mut ray = ray;

    for _ in 0..max_bounces {
        let Some(rec) = world.hit(&ray, Interval::new(T_MIN, f32::INFINITY), arena)? else {
            radiance += throughput * world.background();
            break;
        };

        radiance += throughput * rec.material.emittance;

        match rec.material.scatter(&ray, &rec, rng) {
            Some(result) => {
                throughput *= result.attenuation;
                ray = result.scattered;
            }
            // Absorbed
            None => break,
        }
    }

    Ok(radiance)
}

/// Average `samples` jittered paths through pixel `(x, y)`.
///
/// Row 0 is the top of the image.
#[allow(clippy::too_many_arguments)]
pub fn render_pixel(
    world: &World,
    camera: &Camera,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    samples: u32,
    max_bounces: u32,
    arena: &mut ScratchArena,
    rng: &mut dyn RngCore,
) -> RenderResult<Color> {
    let mut pixel_color = Color::ZERO;

    for _ in 0..samples {
        let u = (x as f32 + gen_f32(rng)) / width as f32;
        let v = ((height - 1 - y) as f32 + gen_f32(rng)) / height as f32;
        let ray = camera.get_ray(u, v, rng);
        pixel_color += trace_path(world, ray, max_bounces, arena, rng)?;
    }

    // Average the samples
    Ok(pixel_color / samples as f32)
}
