//! Surface materials and scattering.
//!
//! A material is a closed set of scattering models plus an optional
//! emittance. Matching on the enum keeps scattering free of dynamic
//! dispatch in the integrator's inner loop.

use rand::RngCore;
use tessera_math::{Ray, Vec3};

use crate::hit::HitRecord;
use crate::sampling::{gen_f32, random_in_unit_sphere};

/// Color type alias (linear RGB, typically 0-1)
pub type Color = Vec3;

/// How a surface redirects incoming light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scattering {
    /// Lambertian diffuse reflection.
    Diffuse { albedo: Color },
    /// Specular reflection, blurred by `fuzz` (0 = perfect mirror).
    Metal { albedo: Color, fuzz: f32 },
    /// Glass-like refraction with Fresnel (Schlick) reflection.
    Dielectric { albedo: Color, refractive_index: f32 },
}

/// Surface material: a scattering model and an emitted radiance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub scattering: Scattering,
    pub emittance: Color,
}

/// Outcome of a successful scatter.
#[derive(Debug, Clone, Copy)]
pub struct ScatterResult {
    pub attenuation: Color,
    pub scattered: Ray,
}

impl Material {
    /// Create a Lambertian material with the given albedo.
    pub fn diffuse(albedo: Color) -> Self {
        Self::from_scattering(Scattering::Diffuse { albedo })
    }

    /// Create a metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `fuzz`: Roughness, 0.0 = perfect mirror, 1.0 = very rough
    pub fn metal(albedo: Color, fuzz: f32) -> Self {
        Self::from_scattering(Scattering::Metal {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        })
    }

    /// Create a dielectric material.
    ///
    /// - `albedo`: Tint filter, usually white
    /// - `refractive_index`: 1.0 = air, 1.5 = glass, 2.4 = diamond
    pub fn dielectric(albedo: Color, refractive_index: f32) -> Self {
        Self::from_scattering(Scattering::Dielectric {
            albedo,
            refractive_index,
        })
    }

    fn from_scattering(scattering: Scattering) -> Self {
        Self {
            scattering,
            emittance: Color::ZERO,
        }
    }

    /// Make this material emit light.
    pub fn with_emittance(mut self, emittance: Color) -> Self {
        self.emittance = emittance;
        self
    }

    pub fn albedo(&self) -> Color {
        match self.scattering {
            Scattering::Diffuse { albedo }
            | Scattering::Metal { albedo, .. }
            | Scattering::Dielectric { albedo, .. } => albedo,
        }
    }

    /// Scatter an incoming ray at a hit point.
    ///
    /// `rec.normal` is the outward surface normal. Returns `None` when the
    /// ray is absorbed.
    pub fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let direction = match self.scattering {
            Scattering::Diffuse { .. } => {
                let direction = rec.normal + random_in_unit_sphere(rng);
                // Catch degenerate scatter direction
                if direction.length_squared() < 1e-8 {
                    rec.normal
                } else {
                    direction.normalize()
                }
            }
            Scattering::Metal { fuzz, .. } => {
                let reflected = reflect(ray_in.direction().normalize(), rec.normal);
                // The unperturbed reflection decides absorption
                if reflected.dot(rec.normal) <= 0.0 {
                    return None;
                }
                let direction = reflected + fuzz * random_in_unit_sphere(rng);
                if direction.length_squared() < 1e-8 {
                    reflected
                } else {
                    direction
                }
            }
            Scattering::Dielectric {
                refractive_index, ..
            } => dielectric_direction(ray_in.direction(), rec.normal, refractive_index, rng),
        };

        Some(ScatterResult {
            attenuation: self.albedo(),
            scattered: Ray::new(rec.p, direction),
        })
    }
}

/// Choose between reflection and refraction at a dielectric boundary.
fn dielectric_direction(
    incoming: Vec3,
    outward_normal: Vec3,
    refractive_index: f32,
    rng: &mut dyn RngCore,
) -> Vec3 {
    let unit_direction = incoming.normalize();
    let d_dot_n = unit_direction.dot(outward_normal);

    // Leaving the medium when travelling along the outward normal
    let (normal, ratio, cosine) = if d_dot_n > 0.0 {
        (-outward_normal, refractive_index, refractive_index * d_dot_n)
    } else {
        (outward_normal, 1.0 / refractive_index, -d_dot_n)
    };

    match refract(unit_direction, normal, ratio) {
        Some(refracted) if gen_f32(rng) >= reflectance(cosine.min(1.0), refractive_index) => {
            refracted
        }
        // Total internal reflection, or Fresnel chose reflection
        _ => reflect(unit_direction, normal),
    }
}

/// Schlick's approximation for Fresnel reflectance.
///
/// `r0` is the reflectance at normal incidence; the `(1 - cos)^5` term
/// vanishes there and reaches `1 - r0` at grazing incidence.
pub fn reflectance(cosine: f32, refractive_index: f32) -> f32 {
    let r0 = ((1.0 - refractive_index) / (1.0 + refractive_index)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit vector through a surface with normal `n` facing it.
///
/// Returns `None` on total internal reflection, i.e. when the Snell
/// discriminant is not positive.
#[inline]
pub fn refract(uv: Vec3, n: Vec3, ni_over_nt: f32) -> Option<Vec3> {
    let dt = uv.dot(n);
    let discriminant = 1.0 - ni_over_nt * ni_over_nt * (1.0 - dt * dt);
    if discriminant > 0.0 {
        Some(ni_over_nt * (uv - n * dt) - n * discriminant.sqrt())
    } else {
        None
    }
}
