//! Thin-lens camera for ray generation.
//!
//! The lens rectangle sits at the look-at distance, so everything on the
//! focus plane stays sharp whatever the aperture; points in front of or
//! behind it blur as the aperture grows.

use rand::RngCore;
use tessera_math::{Ray, Vec3};

use crate::error::{RenderError, RenderResult};
use crate::sampling::random_in_unit_disk;

/// Look-at parameters a [`Camera`] is built from.
#[derive(Debug, Clone, Copy)]
pub struct CameraSettings {
    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,
    vfov: f32,     // Vertical field of view in degrees
    aperture: f32, // Lens diameter, 0 = pinhole
    aspect_ratio: f32,
}

impl CameraSettings {
    /// Pinhole camera at the origin looking down -Z.
    pub fn new() -> Self {
        Self {
            look_from: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 90.0,
            aperture: 0.0,
            aspect_ratio: 16.0 / 9.0,
        }
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f32, aperture: f32) -> Self {
        self.vfov = vfov;
        self.aperture = aperture;
        self
    }

    /// Set the width / height ratio of the image.
    pub fn with_aspect_ratio(mut self, aspect_ratio: f32) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    /// Validate the settings and compute the camera basis.
    pub fn build(&self) -> RenderResult<Camera> {
        Camera::look_at(self)
    }
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self::new()
    }
}

/// An immutable camera, shared by every worker.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    position: Vec3,
    // Orthonormal basis
    right: Vec3,
    up: Vec3,
    back: Vec3,
    // Lens rectangle at the focus distance, relative to `position`
    lower_left: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
    aperture: f32,
}

impl Camera {
    /// Build a camera from look-at settings.
    pub fn look_at(settings: &CameraSettings) -> RenderResult<Self> {
        let CameraSettings {
            look_from,
            look_at,
            vup,
            vfov,
            aperture,
            aspect_ratio,
        } = *settings;

        if !(look_from.is_finite() && look_at.is_finite() && vup.is_finite()) {
            return Err(RenderError::InvalidCamera(
                "position, target and up must be finite".to_string(),
            ));
        }
        if !(vfov > 0.0 && vfov < 180.0) {
            return Err(RenderError::InvalidCamera(format!(
                "vertical fov must be in (0, 180) degrees, got {vfov}"
            )));
        }
        if !(aspect_ratio.is_finite() && aspect_ratio > 0.0) {
            return Err(RenderError::InvalidCamera(format!(
                "aspect ratio must be positive, got {aspect_ratio}"
            )));
        }
        if !(aperture.is_finite() && aperture >= 0.0) {
            return Err(RenderError::InvalidCamera(format!(
                "aperture must be non-negative, got {aperture}"
            )));
        }

        let focus_dist = (look_from - look_at).length();
        if focus_dist < 1e-6 {
            return Err(RenderError::InvalidCamera(
                "position and target coincide".to_string(),
            ));
        }

        // Calculate camera basis vectors
        let back = (look_from - look_at) / focus_dist;
        let side = vup.cross(back);
        if side.length_squared() < 1e-12 {
            return Err(RenderError::InvalidCamera(
                "up vector is parallel to the view direction".to_string(),
            ));
        }
        let right = side.normalize();
        let up = back.cross(right);

        // Lens rectangle at the focus distance
        let half_height = (vfov.to_radians() / 2.0).tan();
        let half_width = half_height * aspect_ratio;

        let lower_left = (right * -half_width - up * half_height - back) * focus_dist;
        let horizontal = right * (2.0 * half_width * focus_dist);
        let vertical = up * (2.0 * half_height * focus_dist);

        Ok(Self {
            position: look_from,
            right,
            up,
            back,
            lower_left,
            horizontal,
            vertical,
            aperture,
        })
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Right, up and back axes of the camera.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        (self.right, self.up, self.back)
    }

    /// Generate a ray through image coordinates `(u, v)`.
    ///
    /// `(0, 0)` is the lower-left corner of the image and `(1, 1)` the
    /// upper-right. The origin is jittered across the lens disk.
    pub fn get_ray(&self, u: f32, v: f32, rng: &mut dyn RngCore) -> Ray {
        let offset = if self.aperture > 0.0 {
            let p = random_in_unit_disk(rng) * (0.5 * self.aperture);
            self.right * p.x + self.up * p.y
        } else {
            Vec3::ZERO
        };

        let target = self.lower_left + u * self.horizontal + v * self.vertical;
        Ray::new(self.position + offset, target - offset)
    }
}
