//! Conversion from a loaded scene description to renderer types.

use tessera_core::{MaterialDescription, SceneDescription};

use crate::arena::DEFAULT_ARENA_CAPACITY;
use crate::camera::{Camera, CameraSettings};
use crate::error::{RenderError, RenderResult};
use crate::{Material, RenderConfig, Sphere, World};

/// Build the world, camera and render configuration for a scene.
///
/// Every construction-time check runs here, so a scene that builds can be
/// rendered without hitting a capacity limit.
pub fn build(desc: &SceneDescription) -> RenderResult<(World, Camera, RenderConfig)> {
    let config = RenderConfig {
        width: desc.image.width,
        height: desc.image.height,
        samples_per_pixel: desc.image.spp,
        max_bounces: desc.render.bounces,
        tiles_x: desc.render.tiles_x,
        tiles_y: desc.render.tiles_y,
        workers: desc.render.workers,
        seed: desc.render.seed,
        arena_capacity: DEFAULT_ARENA_CAPACITY,
    };
    config.validate()?;

    let spheres = desc
        .spheres
        .iter()
        .enumerate()
        .map(|(i, s)| {
            Sphere::new(s.center, s.radius, material(&s.material)).map_err(|e| match e {
                RenderError::InvalidSphere(msg) => {
                    RenderError::InvalidSphere(format!("sphere {i}: {msg}"))
                }
                other => other,
            })
        })
        .collect::<RenderResult<Vec<_>>>()?;
    let world = World::new(spheres, desc.background, desc.render.seed)?;

    let camera = CameraSettings::new()
        .with_position(desc.camera.position, desc.camera.at, desc.camera.up)
        .with_lens(desc.camera.fov, desc.camera.aperture)
        .with_aspect_ratio(desc.aspect_ratio())
        .build()?;

    Ok((world, camera, config))
}

fn material(desc: &MaterialDescription) -> Material {
    let base = match *desc {
        MaterialDescription::Lambertian { albedo, .. } => Material::diffuse(albedo),
        MaterialDescription::Metal { albedo, fuzz, .. } => Material::metal(albedo, fuzz),
        MaterialDescription::Dielectric {
            albedo,
            refractive_index,
            ..
        } => Material::dielectric(albedo, refractive_index),
    };
    base.with_emittance(desc.emittance())
}
