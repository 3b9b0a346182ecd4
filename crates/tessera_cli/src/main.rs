use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tessera_core::SceneDescription;

/// Render a sphere scene with the Tessera path tracer.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scene file (JSON)
    #[arg(value_name = "SCENE")]
    scene: PathBuf,

    /// Output PNG, defaults to the scene's image name
    #[arg(long, short = 'o', value_name = "FILE")]
    output: Option<PathBuf>,

    /// Samples per pixel
    #[arg(long, value_name = "NUM")]
    spp: Option<u32>,

    /// Maximum bounces per path
    #[arg(long, value_name = "NUM")]
    bounces: Option<u32>,

    /// Worker threads, 0 = one per core
    #[arg(long, short = 't', value_name = "NUM")]
    workers: Option<usize>,

    /// Master random seed
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,
}

impl Args {
    /// Apply command line overrides on top of the scene file.
    fn apply(&self, scene: &mut SceneDescription) {
        if let Some(spp) = self.spp {
            scene.image.spp = spp;
        }
        if let Some(bounces) = self.bounces {
            scene.render.bounces = bounces;
        }
        if let Some(workers) = self.workers {
            scene.render.workers = workers;
        }
        if let Some(seed) = self.seed {
            scene.render.seed = seed;
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let start = Instant::now();

    let mut scene = tessera_core::load_scene(&args.scene)
        .with_context(|| format!("Failed to load scene {}", args.scene.display()))?;
    args.apply(&mut scene);

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&scene.image.name));

    let (world, camera, config) =
        tessera_renderer::scene::build(&scene).context("Failed to build scene")?;
    let framebuffer =
        tessera_renderer::render(&world, &camera, &config).context("Render failed")?;

    let image = image::RgbaImage::from_raw(
        framebuffer.width(),
        framebuffer.height(),
        framebuffer.to_rgba8(),
    )
    .context("Framebuffer size does not match the image")?;
    image
        .save(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    log::info!(
        "Wrote {} ({}x{}) in {:.2?}",
        output.display(),
        framebuffer.width(),
        framebuffer.height(),
        start.elapsed()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_override_scene() {
        let args = Args::parse_from([
            "tessera",
            "scene.json",
            "--spp",
            "64",
            "--bounces",
            "3",
            "-t",
            "2",
            "--seed",
            "9",
        ]);
        let mut scene = SceneDescription::default();
        args.apply(&mut scene);

        assert_eq!(scene.image.spp, 64);
        assert_eq!(scene.render.bounces, 3);
        assert_eq!(scene.render.workers, 2);
        assert_eq!(scene.render.seed, 9);
        assert!(args.output.is_none());
    }

    #[test]
    fn test_args_keep_scene_values() {
        let args = Args::parse_from(["tessera", "scene.json", "-o", "out.png"]);
        let mut scene = SceneDescription::default();
        args.apply(&mut scene);

        assert_eq!(scene.image.spp, SceneDescription::default().image.spp);
        assert_eq!(args.output, Some(PathBuf::from("out.png")));
    }
}
