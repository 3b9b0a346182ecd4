//! Sphere primitive for ray tracing.

use tessera_math::{Aabb, Interval, Ray, Vec3};

use crate::error::{RenderError, RenderResult};
use crate::hit::HitRecord;
use crate::Material;

/// A sphere primitive.
///
/// The bounding box is cached and recomputed whenever the center or the
/// radius changes.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Material,
    bbox: Aabb,
}

impl Sphere {
    /// Create a new sphere.
    ///
    /// The center must be finite and the radius finite and positive.
    pub fn new(center: Vec3, radius: f32, material: Material) -> RenderResult<Self> {
        check_shape(center, radius)?;
        Ok(Self {
            center,
            radius,
            material,
            bbox: bounding_box(center, radius),
        })
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    /// Move the sphere.
    pub fn set_center(&mut self, center: Vec3) -> RenderResult<()> {
        check_shape(center, self.radius)?;
        self.center = center;
        self.bbox = bounding_box(center, self.radius);
        Ok(())
    }

    /// Resize the sphere.
    pub fn set_radius(&mut self, radius: f32) -> RenderResult<()> {
        check_shape(self.center, radius)?;
        self.radius = radius;
        self.bbox = bounding_box(self.center, radius);
        Ok(())
    }

    /// Test this sphere alone against a ray.
    ///
    /// Same root selection as the batch tester: the near root when it lies
    /// past `ray_t.min`, otherwise the far root (the ray starts inside).
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let oc = ray.origin() - self.center;
        let a = ray.direction().dot(ray.direction());
        let b = ray.direction().dot(oc);
        let c = oc.dot(oc) - self.radius * self.radius;

        let discriminant = b * b - a * c;
        if discriminant <= 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();
        let near = (-b - sqrtd) / a;
        let far = (-b + sqrtd) / a;
        let t = if near > ray_t.min { near } else { far };
        if !ray_t.surrounds(t) {
            return None;
        }

        Some(self.record(ray, t))
    }

    /// Build the hit record for a known parameter `t`.
    pub(crate) fn record(&self, ray: &Ray, t: f32) -> HitRecord<'_> {
        let p = ray.at(t);
        HitRecord {
            t,
            p,
            normal: (p - self.center).normalize(),
            material: &self.material,
        }
    }
}

fn bounding_box(center: Vec3, radius: f32) -> Aabb {
    let rvec = Vec3::splat(radius);
    Aabb::from_points(center - rvec, center + rvec)
}

fn check_shape(center: Vec3, radius: f32) -> RenderResult<()> {
    if !center.is_finite() {
        return Err(RenderError::InvalidSphere(format!(
            "center {center} is not finite"
        )));
    }
    if !(radius.is_finite() && radius > 0.0) {
        return Err(RenderError::InvalidSphere(format!(
            "radius must be positive, got {radius}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    fn grey() -> Material {
        Material::diffuse(Color::new(0.5, 0.5, 0.5))
    }

    #[test]
    fn test_sphere_hit_analytic() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0, grey()).unwrap();
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let rec = sphere.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert!((rec.t - 4.0).abs() < 1e-5);
        assert!((rec.p - Vec3::new(0.0, 0.0, -4.0)).length() < 1e-5);
        assert!((rec.normal - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, grey()).unwrap();

        // Ray pointing away from sphere
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        assert!(sphere.hit(&ray, Interval::new(0.001, f32::INFINITY)).is_none());
    }

    #[test]
    fn test_sphere_hit_from_inside_uses_far_root() {
        let sphere = Sphere::new(Vec3::ZERO, 2.0, grey()).unwrap();
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        let rec = sphere.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert!((rec.t - 2.0).abs() < 1e-5);
        // Outward normal, not flipped towards the ray
        assert!((rec.normal - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_sphere_hit_outside_interval() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0, grey()).unwrap();
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        assert!(sphere.hit(&ray, Interval::new(0.001, 3.0)).is_none());
    }

    #[test]
    fn test_sphere_bbox_follows_changes() {
        let mut sphere = Sphere::new(Vec3::ZERO, 1.0, grey()).unwrap();
        assert_eq!(sphere.bounding_box().min(), Vec3::splat(-1.0));

        sphere.set_center(Vec3::new(2.0, 0.0, 0.0)).unwrap();
        sphere.set_radius(0.5).unwrap();
        assert_eq!(sphere.bounding_box().min(), Vec3::new(1.5, -0.5, -0.5));
        assert_eq!(sphere.bounding_box().max(), Vec3::new(2.5, 0.5, 0.5));
    }

    #[test]
    fn test_sphere_rejects_degenerate_shape() {
        assert!(Sphere::new(Vec3::ZERO, 0.0, grey()).is_err());
        assert!(Sphere::new(Vec3::ZERO, -1.0, grey()).is_err());
        assert!(Sphere::new(Vec3::ZERO, f32::NAN, grey()).is_err());
        assert!(Sphere::new(Vec3::new(f32::INFINITY, 0.0, 0.0), 1.0, grey()).is_err());

        let mut sphere = Sphere::new(Vec3::ZERO, 1.0, grey()).unwrap();
        assert!(sphere.set_radius(0.0).is_err());
        assert_eq!(sphere.radius(), 1.0);
    }
}
