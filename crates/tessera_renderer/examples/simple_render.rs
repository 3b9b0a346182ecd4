//! Simple path tracer example.
//!
//! Renders a field of random spheres and saves to PPM format.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{BufWriter, Write};
use tessera_renderer::{
    render, CameraSettings, Color, Framebuffer, Material, RenderConfig, RenderResult, Sphere,
    Vec3, World,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Tessera Path Tracer - Simple Example");
    println!("====================================");

    // Build the scene
    let start = std::time::Instant::now();
    let world = build_scene()?;
    println!(
        "Scene built in {:?}: {} spheres, BVH depth {}",
        start.elapsed(),
        world.spheres().len(),
        world.bvh().depth()
    );

    let config = RenderConfig {
        width: 800,
        height: 450,
        samples_per_pixel: 32,
        max_bounces: 10,
        tiles_x: 16,
        tiles_y: 9,
        ..RenderConfig::default()
    };

    // Set up camera
    let camera = CameraSettings::new()
        .with_position(
            Vec3::new(13.0, 2.0, 3.0), // look_from
            Vec3::new(0.0, 0.0, 0.0),  // look_at
            Vec3::new(0.0, 1.0, 0.0),  // vup
        )
        .with_lens(20.0, 0.1)
        .with_aspect_ratio(config.aspect_ratio())
        .build()?;

    println!(
        "Rendering {}x{} @ {} spp...",
        config.width, config.height, config.samples_per_pixel
    );

    // Render
    let start = std::time::Instant::now();
    let image = render(&world, &camera, &config)?;
    println!("Rendered in {:?}", start.elapsed());

    // Save as PPM
    let filename = "output.ppm";
    save_ppm(&image, filename)?;
    println!("Saved to {}", filename);

    Ok(())
}

fn build_scene() -> RenderResult<World> {
    let mut rng = StdRng::seed_from_u64(2024);
    let mut spheres = Vec::new();

    // Ground
    spheres.push(Sphere::new(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        Material::diffuse(Color::new(0.5, 0.5, 0.5)),
    )?);

    // Three main spheres
    spheres.push(Sphere::new(
        Vec3::new(0.0, 1.0, 0.0),
        1.0,
        Material::dielectric(Color::ONE, 1.5),
    )?);
    spheres.push(Sphere::new(
        Vec3::new(-4.0, 1.0, 0.0),
        1.0,
        Material::diffuse(Color::new(0.4, 0.2, 0.1)),
    )?);
    spheres.push(Sphere::new(
        Vec3::new(4.0, 1.0, 0.0),
        1.0,
        Material::metal(Color::new(0.7, 0.6, 0.5), 0.0),
    )?);

    // Small random spheres
    for a in -7..7 {
        for b in -7..7 {
            let center = Vec3::new(
                a as f32 + 0.9 * rng.gen::<f32>(),
                0.2,
                b as f32 + 0.9 * rng.gen::<f32>(),
            );
            if (center - Vec3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            let choose_mat: f32 = rng.gen();
            let material = if choose_mat < 0.8 {
                let albedo = Color::new(rng.gen(), rng.gen(), rng.gen())
                    * Color::new(rng.gen(), rng.gen(), rng.gen());
                Material::diffuse(albedo)
            } else if choose_mat < 0.95 {
                let albedo = Color::splat(0.5) + 0.5 * Color::new(rng.gen(), rng.gen(), rng.gen());
                Material::metal(albedo, rng.gen_range(0.0..0.5))
            } else {
                Material::dielectric(Color::ONE, 1.5)
            };
            spheres.push(Sphere::new(center, 0.2, material)?);
        }
    }

    World::new(spheres, Color::new(0.5, 0.7, 1.0), 1)
}

fn save_ppm(image: &Framebuffer, filename: &str) -> std::io::Result<()> {
    let file = File::create(filename)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "P3")?;
    writeln!(writer, "{} {}", image.width(), image.height())?;
    writeln!(writer, "255")?;

    for rgba in image.to_rgba8().chunks_exact(4) {
        writeln!(writer, "{} {} {}", rgba[0], rgba[1], rgba[2])?;
    }

    Ok(())
}
