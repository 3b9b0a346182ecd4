//! Scene file loading.
//!
//! Scenes are JSON documents shaped like [`SceneDescription`]. Loading only
//! checks what the file itself can get wrong (syntax, missing fields,
//! nonsensical numbers); capacity limits belong to the renderer.

use std::path::Path;

use thiserror::Error;

use crate::scene::{MaterialDescription, SceneDescription};

/// Errors that can occur during scene loading.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid scene: {0}")]
    Invalid(String),
}

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Load a scene file from disk.
pub fn load_scene<P: AsRef<Path>>(path: P) -> LoadResult<SceneDescription> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let scene = parse_scene(&text)?;

    log::info!(
        "Loaded scene {}: {} spheres, {}x{} @ {} spp",
        path.display(),
        scene.spheres.len(),
        scene.image.width,
        scene.image.height,
        scene.image.spp
    );

    Ok(scene)
}

/// Parse a scene from a JSON string.
pub fn parse_scene(text: &str) -> LoadResult<SceneDescription> {
    let scene: SceneDescription = serde_json::from_str(text)?;
    validate(&scene)?;
    Ok(scene)
}

fn validate(scene: &SceneDescription) -> LoadResult<()> {
    if scene.image.width == 0 || scene.image.height == 0 {
        return Err(LoadError::Invalid(format!(
            "image size must be non-zero, got {}x{}",
            scene.image.width, scene.image.height
        )));
    }
    if scene.image.spp == 0 {
        return Err(LoadError::Invalid("spp must be at least 1".to_string()));
    }

    for (i, sphere) in scene.spheres.iter().enumerate() {
        if !sphere.center.is_finite() {
            return Err(LoadError::Invalid(format!("sphere {i}: center is not finite")));
        }
        if !(sphere.radius.is_finite() && sphere.radius > 0.0) {
            return Err(LoadError::Invalid(format!(
                "sphere {i}: radius must be positive, got {}",
                sphere.radius
            )));
        }

        let albedo = sphere.material.albedo();
        if albedo.max_element() > 1.0 || albedo.min_element() < 0.0 {
            log::warn!("sphere {i}: albedo {albedo} is outside [0, 1] and will not conserve energy");
        }

        match sphere.material {
            MaterialDescription::Metal { fuzz, .. } if !(0.0..=1.0).contains(&fuzz) => {
                return Err(LoadError::Invalid(format!(
                    "sphere {i}: metal fuzz must be in [0, 1], got {fuzz}"
                )));
            }
            MaterialDescription::Dielectric { refractive_index, .. }
                if !(refractive_index.is_finite() && refractive_index > 0.0) =>
            {
                return Err(LoadError::Invalid(format!(
                    "sphere {i}: refractive index must be positive, got {refractive_index}"
                )));
            }
            _ => {}
        }
    }

    Ok(())
}
