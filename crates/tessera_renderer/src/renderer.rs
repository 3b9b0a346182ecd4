//! Render configuration and the top-level render call.
//!
//! Implements Monte Carlo path tracing with:
//! - Iterative path tracing with a bounce limit
//! - Anti-aliasing via jittered multi-sampling
//! - Tile-parallel scheduling over a fixed worker pool
//! - Gamma resolve to 8-bit output

use std::time::Instant;

use crate::arena::DEFAULT_ARENA_CAPACITY;
use crate::batch::CandidateBatch;
use crate::camera::Camera;
use crate::error::{RenderError, RenderResult};
use crate::framebuffer::Framebuffer;
use crate::scheduler::{RenderJob, RenderQueue};
use crate::tile::generate_tiles;
use crate::{World, MAX_TILES};

/// Render configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum surface interactions per path
    pub max_bounces: u32,
    /// Tile grid columns
    pub tiles_x: u32,
    /// Tile grid rows
    pub tiles_y: u32,
    /// Worker threads, 0 = one per available core
    pub workers: usize,
    /// Master seed for every tile generator
    pub seed: u64,
    /// Scratch arena bytes per tile
    pub arena_capacity: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 360,
            samples_per_pixel: 16,
            max_bounces: 8,
            tiles_x: 8,
            tiles_y: 8,
            workers: 0,
            seed: 0x5EED,
            arena_capacity: DEFAULT_ARENA_CAPACITY,
        }
    }
}

impl RenderConfig {
    /// Check every limit before any tile or thread is created.
    pub fn validate(&self) -> RenderResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidConfig(format!(
                "image size {}x{} is empty",
                self.width, self.height
            )));
        }
        if self.samples_per_pixel == 0 {
            return Err(RenderError::InvalidConfig(
                "samples per pixel must be at least 1".to_string(),
            ));
        }
        if self.tiles_x == 0 || self.tiles_y == 0 {
            return Err(RenderError::InvalidConfig(format!(
                "tile grid {}x{} is empty",
                self.tiles_x, self.tiles_y
            )));
        }

        let tiles = self.tiles_x as usize * self.tiles_y as usize;
        if tiles > MAX_TILES {
            return Err(RenderError::TooManyTiles(tiles));
        }
        if self.tiles_x > self.width || self.tiles_y > self.height {
            return Err(RenderError::InvalidConfig(format!(
                "tile grid {}x{} is finer than the {}x{} image",
                self.tiles_x, self.tiles_y, self.width, self.height
            )));
        }

        let required = CandidateBatch::footprint();
        if self.arena_capacity < required {
            return Err(RenderError::ArenaTooSmall {
                capacity: self.arena_capacity,
                required,
            });
        }

        Ok(())
    }

    /// Worker count with 0 resolved to the available parallelism.
    pub fn resolved_workers(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }

    /// Width over height.
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Render the world through `camera` into a linear framebuffer.
///
/// Blocks until every tile is done. The world and camera are shared
/// read-only by all workers.
pub fn render(world: &World, camera: &Camera, config: &RenderConfig) -> RenderResult<Framebuffer> {
    config.validate()?;

    let workers = config.resolved_workers();
    let rects = generate_tiles(config.width, config.height, config.tiles_x, config.tiles_y)?;
    let queue = RenderQueue::new(&rects, config.arena_capacity)?;

    log::info!(
        "Rendering {}x{} at {} spp, {} bounces: {} tiles on {} workers",
        config.width,
        config.height,
        config.samples_per_pixel,
        config.max_bounces,
        queue.len(),
        workers
    );
    let start = Instant::now();

    let job = RenderJob {
        world,
        camera,
        config,
    };
    let outputs = queue.run(job, workers)?;

    let mut framebuffer = Framebuffer::new(config.width, config.height);
    for output in &outputs {
        framebuffer.write_tile(output);
    }

    log::info!("Rendered {} tiles in {:.2?}", outputs.len(), start.elapsed());

    Ok(framebuffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CameraSettings, Color, Material, Sphere, Vec3};

    const SKY: Color = Color::new(0.5, 0.7, 1.0);

    fn single_sphere_scene() -> (World, Camera) {
        let sphere = Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Material::diffuse(Color::new(0.8, 0.3, 0.3)),
        )
        .unwrap();
        let world = World::new(vec![sphere], SKY, 0).unwrap();
        let camera = CameraSettings::new()
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(90.0, 0.0)
            .with_aspect_ratio(1.0)
            .build()
            .unwrap();
        (world, camera)
    }

    fn close(a: Color, b: Color) -> bool {
        (a - b).abs().max_element() < 1e-5
    }

    #[test]
    fn test_default_config_is_valid() {
        RenderConfig::default().validate().unwrap();
        assert!(RenderConfig::default().resolved_workers() >= 1);
    }

    #[test]
    fn test_validate_rejects_bad_config() {
        let base = RenderConfig::default();

        let zero_spp = RenderConfig {
            samples_per_pixel: 0,
            ..base.clone()
        };
        assert!(matches!(zero_spp.validate(), Err(RenderError::InvalidConfig(_))));

        let empty = RenderConfig {
            width: 0,
            ..base.clone()
        };
        assert!(matches!(empty.validate(), Err(RenderError::InvalidConfig(_))));

        let too_fine = RenderConfig {
            width: 4,
            tiles_x: 5,
            ..base.clone()
        };
        assert!(matches!(too_fine.validate(), Err(RenderError::InvalidConfig(_))));

        let too_many = RenderConfig {
            width: 10_000,
            height: 10_000,
            tiles_x: 100,
            tiles_y: 100,
            ..base.clone()
        };
        assert!(matches!(too_many.validate(), Err(RenderError::TooManyTiles(10_000))));

        let tiny_arena = RenderConfig {
            arena_capacity: 256,
            ..base
        };
        assert!(matches!(
            tiny_arena.validate(),
            Err(RenderError::ArenaTooSmall { .. })
        ));
    }

    #[test]
    fn test_render_single_sphere() {
        let (world, camera) = single_sphere_scene();
        let config = RenderConfig {
            width: 64,
            height: 64,
            samples_per_pixel: 16,
            max_bounces: 8,
            tiles_x: 4,
            tiles_y: 4,
            workers: 4,
            ..RenderConfig::default()
        };

        let fb = render(&world, &camera, &config).unwrap();
        assert_eq!((fb.width(), fb.height()), (64, 64));

        // Inside the silhouette every path bounces once and escapes
        let expected = Color::new(0.8, 0.3, 0.3) * SKY;
        assert!(close(fb.get(32, 32), expected), "{}", fb.get(32, 32));
        assert!(close(fb.get(44, 32), expected));

        // Corners and the far side see only the sky
        for (x, y) in [(0, 0), (63, 0), (0, 63), (63, 63), (56, 32)] {
            assert!(close(fb.get(x, y), SKY), "pixel {x},{y} = {}", fb.get(x, y));
        }

        // The sphere subtends about 18.5 pixels of radius
        let covered = fb
            .pixels()
            .iter()
            .filter(|&&c| !close(c, SKY))
            .count() as f32;
        let expected_area = std::f32::consts::PI * 18.5 * 18.5;
        assert!(
            (covered - expected_area).abs() < 0.1 * expected_area,
            "{covered} pixels covered"
        );
    }

    #[test]
    fn test_render_is_independent_of_worker_count() {
        let spheres = vec![
            Sphere::new(
                Vec3::new(0.0, -100.5, -1.0),
                100.0,
                Material::diffuse(Color::new(0.8, 0.8, 0.0)),
            )
            .unwrap(),
            Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, Material::diffuse(Color::new(0.1, 0.2, 0.5)))
                .unwrap(),
            Sphere::new(Vec3::new(-1.0, 0.0, -1.0), 0.5, Material::dielectric(Color::ONE, 1.5))
                .unwrap(),
            Sphere::new(Vec3::new(1.0, 0.0, -1.0), 0.5, Material::metal(Color::new(0.8, 0.6, 0.2), 0.3))
                .unwrap(),
        ];
        let world = World::new(spheres, SKY, 9).unwrap();
        let camera = CameraSettings::new()
            .with_position(Vec3::new(-2.0, 2.0, 1.0), Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(40.0, 0.1)
            .with_aspect_ratio(1.5)
            .build()
            .unwrap();

        let config = RenderConfig {
            width: 24,
            height: 16,
            samples_per_pixel: 4,
            max_bounces: 6,
            tiles_x: 3,
            tiles_y: 2,
            workers: 1,
            seed: 77,
            ..RenderConfig::default()
        };

        let serial = render(&world, &camera, &config).unwrap();
        let parallel = render(
            &world,
            &camera,
            &RenderConfig {
                workers: 4,
                ..config.clone()
            },
        )
        .unwrap();
        assert_eq!(serial.pixels(), parallel.pixels());

        let reseeded = render(&world, &camera, &RenderConfig { seed: 78, ..config }).unwrap();
        assert_ne!(serial.pixels(), reseeded.pixels());
    }

    #[test]
    fn test_render_rejects_invalid_config() {
        let (world, camera) = single_sphere_scene();
        let config = RenderConfig {
            samples_per_pixel: 0,
            ..RenderConfig::default()
        };
        assert!(render(&world, &camera, &config).is_err());
    }
}
