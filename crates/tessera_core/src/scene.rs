//! Scene description types for Tessera.
//!
//! These mirror the scene file one-to-one. Every section except `camera`
//! may be omitted and falls back to its `Default`.

use serde::Deserialize;
use tessera_math::Vec3;

/// A complete scene file: output image, render knobs, camera, and geometry.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct SceneDescription {
    pub image: ImageSettings,
    pub render: RenderSettings,
    pub camera: CameraDescription,
    /// Radiance returned for rays that leave the scene
    pub background: Vec3,
    pub spheres: Vec<SphereDescription>,
}

impl SceneDescription {
    /// Aspect ratio to build the camera with.
    ///
    /// An explicit `camera.aspect_ratio` wins; otherwise it follows the
    /// output resolution.
    pub fn aspect_ratio(&self) -> f32 {
        self.camera
            .aspect_ratio
            .unwrap_or(self.image.width as f32 / self.image.height.max(1) as f32)
    }
}

/// Output image settings.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ImageSettings {
    pub width: u32,
    pub height: u32,
    /// Samples per pixel
    pub spp: u32,
    /// Default output file name
    pub name: String,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            width: 640,
            height: 360,
            spp: 16,
            name: "output.png".to_string(),
        }
    }
}

/// Path tracing and scheduling knobs.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Maximum bounces per path
    pub bounces: u32,
    pub tiles_x: u32,
    pub tiles_y: u32,
    /// Worker threads (0 = one per available core)
    pub workers: usize,
    pub seed: u64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            bounces: 8,
            tiles_x: 8,
            tiles_y: 8,
            workers: 0,
            seed: 0x5EED,
        }
    }
}

/// Look-at camera parameters.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CameraDescription {
    pub position: Vec3,
    /// Look-at target; also sets the focus distance
    pub at: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Lens aperture diameter (0 = pinhole)
    pub aperture: f32,
    pub aspect_ratio: Option<f32>,
}

impl Default for CameraDescription {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            at: Vec3::new(0.0, 0.0, -1.0),
            up: Vec3::Y,
            fov: 90.0,
            aperture: 0.0,
            aspect_ratio: None,
        }
    }
}

/// One sphere and its surface.
#[derive(Clone, Debug, Deserialize)]
pub struct SphereDescription {
    pub center: Vec3,
    pub radius: f32,
    pub material: MaterialDescription,
}

/// Surface material, tagged by `type` in the scene file.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MaterialDescription {
    Lambertian {
        albedo: Vec3,
        #[serde(default)]
        emittance: Vec3,
    },
    Metal {
        albedo: Vec3,
        #[serde(default)]
        fuzz: f32,
        #[serde(default)]
        emittance: Vec3,
    },
    Dielectric {
        #[serde(default = "white")]
        albedo: Vec3,
        refractive_index: f32,
        #[serde(default)]
        emittance: Vec3,
    },
}

fn white() -> Vec3 {
    Vec3::ONE
}

impl MaterialDescription {
    pub fn albedo(&self) -> Vec3 {
        match self {
            MaterialDescription::Lambertian { albedo, .. }
            | MaterialDescription::Metal { albedo, .. }
            | MaterialDescription::Dielectric { albedo, .. } => *albedo,
        }
    }

    pub fn emittance(&self) -> Vec3 {
        match self {
            MaterialDescription::Lambertian { emittance, .. }
            | MaterialDescription::Metal { emittance, .. }
            | MaterialDescription::Dielectric { emittance, .. } => *emittance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio_from_image() {
        let mut scene = SceneDescription::default();
        scene.image.width = 200;
        scene.image.height = 100;
        assert_eq!(scene.aspect_ratio(), 2.0);

        scene.camera.aspect_ratio = Some(1.5);
        assert_eq!(scene.aspect_ratio(), 1.5);
    }

    #[test]
    fn test_material_accessors() {
        let glass = MaterialDescription::Dielectric {
            albedo: Vec3::ONE,
            refractive_index: 1.5,
            emittance: Vec3::ZERO,
        };
        assert_eq!(glass.albedo(), Vec3::ONE);
        assert_eq!(glass.emittance(), Vec3::ZERO);

        let lamp = MaterialDescription::Lambertian {
            albedo: Vec3::ZERO,
            emittance: Vec3::splat(4.0),
        };
        assert_eq!(lamp.emittance(), Vec3::splat(4.0));
    }
}
