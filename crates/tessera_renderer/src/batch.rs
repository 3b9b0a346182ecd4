//! Candidate batch for 4-wide ray/sphere testing.
//!
//! A BVH query appends every sphere whose leaf box the ray crosses. The
//! batch stores them structure-of-arrays so four spheres load straight into
//! `Vec4` lanes, then a sequential scan picks the nearest valid root.

use bumpalo::Bump;
use tessera_math::{Interval, Ray, Vec3, Vec4};

use crate::error::{RenderError, RenderResult};
use crate::MAX_QUERY_CANDIDATES;

/// Spheres tested per group.
pub const LANES: usize = 4;

/// Sphere data gathered by one BVH query, allocated from a scratch arena.
pub struct CandidateBatch<'a> {
    center_x: &'a mut [f32],
    center_y: &'a mut [f32],
    center_z: &'a mut [f32],
    radius: &'a mut [f32],
    t_hit: &'a mut [f32],
    sphere: &'a mut [u32],
    len: usize,
}

impl<'a> CandidateBatch<'a> {
    /// Bytes one batch takes out of an arena, with slack for alignment.
    pub const fn footprint() -> usize {
        let lanes = 5 * std::mem::size_of::<f32>() + std::mem::size_of::<u32>();
        MAX_QUERY_CANDIDATES * lanes + 6 * 16
    }

    /// Allocate a zero-filled batch in `bump`.
    pub(crate) fn new_in(bump: &'a Bump) -> Self {
        Self {
            center_x: bump.alloc_slice_fill_copy(MAX_QUERY_CANDIDATES, 0.0),
            center_y: bump.alloc_slice_fill_copy(MAX_QUERY_CANDIDATES, 0.0),
            center_z: bump.alloc_slice_fill_copy(MAX_QUERY_CANDIDATES, 0.0),
            radius: bump.alloc_slice_fill_copy(MAX_QUERY_CANDIDATES, 0.0),
            t_hit: bump.alloc_slice_fill_copy(MAX_QUERY_CANDIDATES, f32::INFINITY),
            sphere: bump.alloc_slice_fill_copy(MAX_QUERY_CANDIDATES, 0),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append one candidate sphere.
    ///
    /// Overflow is an error, never a silent drop: a missing candidate would
    /// make geometry vanish.
    pub fn push(&mut self, sphere: u32, center: Vec3, radius: f32) -> RenderResult<()> {
        let i = self.len;
        if i == MAX_QUERY_CANDIDATES {
            return Err(RenderError::CandidateOverflow);
        }

        self.center_x[i] = center.x;
        self.center_y[i] = center.y;
        self.center_z[i] = center.z;
        self.radius[i] = radius;
        self.t_hit[i] = f32::INFINITY;
        self.sphere[i] = sphere;
        self.len += 1;
        Ok(())
    }

    /// Find the nearest candidate hit strictly inside `ray_t`.
    ///
    /// Returns the candidate's sphere index and its ray parameter. Lanes
    /// with a non-positive discriminant hold `f32::INFINITY`; padding lanes
    /// past `len` are computed with the rest of their group and ignored.
    pub fn nearest(&mut self, ray: &Ray, ray_t: Interval) -> Option<(u32, f32)> {
        let groups = self.len.div_ceil(LANES);

        let origin = ray.origin();
        let direction = ray.direction();
        let ox = Vec4::splat(origin.x);
        let oy = Vec4::splat(origin.y);
        let oz = Vec4::splat(origin.z);
        let dx = Vec4::splat(direction.x);
        let dy = Vec4::splat(direction.y);
        let dz = Vec4::splat(direction.z);

        // Shared by every sphere
        let a = Vec4::splat(direction.dot(direction));
        let t_min = Vec4::splat(ray_t.min);
        let miss = Vec4::splat(f32::INFINITY);

        for group in 0..groups {
            let lanes = group * LANES..(group + 1) * LANES;

            let cx = Vec4::from_slice(&self.center_x[lanes.clone()]);
            let cy = Vec4::from_slice(&self.center_y[lanes.clone()]);
            let cz = Vec4::from_slice(&self.center_z[lanes.clone()]);
            let r = Vec4::from_slice(&self.radius[lanes.clone()]);

            let ocx = ox - cx;
            let ocy = oy - cy;
            let ocz = oz - cz;

            let b = dx * ocx + dy * ocy + dz * ocz;
            let c = (ocx * ocx + ocy * ocy + ocz * ocz) - r * r;
            let discriminant = b * b - a * c;

            let sqrtd = sqrt4(discriminant);
            let near = (-b - sqrtd) / a;
            let far = (-b + sqrtd) / a;
            // Far root when the ray starts inside the sphere
            let t = Vec4::select(near.cmpgt(t_min), near, far);
            let t = Vec4::select(discriminant.cmpgt(Vec4::ZERO), t, miss);

            t.write_to_slice(&mut self.t_hit[lanes]);
        }

        let mut nearest: Option<(u32, f32)> = None;
        for i in 0..self.len {
            let t = self.t_hit[i];
            if ray_t.surrounds(t) && nearest.map_or(true, |(_, best)| t < best) {
                nearest = Some((self.sphere[i], t));
            }
        }
        nearest
    }
}

/// Lane-wise square root. Negative lanes produce NaN and are masked by the caller.
#[inline]
fn sqrt4(v: Vec4) -> Vec4 {
    Vec4::new(v.x.sqrt(), v.y.sqrt(), v.z.sqrt(), v.w.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch_from<'a>(bump: &'a Bump, spheres: &[(Vec3, f32)]) -> CandidateBatch<'a> {
        let mut batch = CandidateBatch::new_in(bump);
        for (i, (center, radius)) in spheres.iter().enumerate() {
            batch.push(i as u32, *center, *radius).unwrap();
        }
        batch
    }

    #[test]
    fn test_empty_batch_misses() {
        let bump = Bump::new();
        let mut batch = CandidateBatch::new_in(&bump);
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);
        assert!(batch.is_empty());
        assert!(batch.nearest(&ray, Interval::new(0.001, f32::INFINITY)).is_none());
    }

    #[test]
    fn test_analytic_nearest() {
        let bump = Bump::new();
        let mut batch = batch_from(&bump, &[(Vec3::new(0.0, 0.0, -5.0), 1.0)]);
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);

        let (sphere, t) = batch.nearest(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert_eq!(sphere, 0);
        assert!((t - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_nearest_across_groups() {
        // Six spheres along -z: spans two groups with two padding lanes
        let spheres: Vec<(Vec3, f32)> = [9.0, 7.0, 12.0, 20.0, 3.0, 15.0]
            .iter()
            .map(|&z| (Vec3::new(0.0, 0.0, -z), 0.5))
            .collect();
        let bump = Bump::new();
        let mut batch = batch_from(&bump, &spheres);
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);

        let (sphere, t) = batch.nearest(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert_eq!(sphere, 4);
        assert!((t - 2.5).abs() < 1e-5);

        // Clipping t_max below the closest sphere leaves nothing
        assert!(batch.nearest(&ray, Interval::new(0.001, 2.0)).is_none());

        // Raising t_min past the closest sphere's far side picks the next
        let (sphere, _) = batch.nearest(&ray, Interval::new(3.6, f32::INFINITY)).unwrap();
        assert_eq!(sphere, 1);
    }

    #[test]
    fn test_grazing_and_missing_lanes() {
        let bump = Bump::new();
        let mut batch = batch_from(
            &bump,
            &[
                // Exactly tangent: discriminant 0, not a hit
                (Vec3::new(1.0, 0.0, -5.0), 1.0),
                // Far off to the side
                (Vec3::new(10.0, 0.0, -5.0), 1.0),
            ],
        );
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);
        assert!(batch.nearest(&ray, Interval::new(0.001, f32::INFINITY)).is_none());
    }

    #[test]
    fn test_unnormalized_direction_scales_t() {
        let bump = Bump::new();
        let mut batch = batch_from(&bump, &[(Vec3::new(0.0, 0.0, -5.0), 1.0)]);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -2.0));

        let (_, t) = batch.nearest(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert!((t - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_overflow_is_an_error() {
        let bump = Bump::new();
        let mut batch = CandidateBatch::new_in(&bump);
        for i in 0..MAX_QUERY_CANDIDATES {
            batch.push(i as u32, Vec3::ZERO, 1.0).unwrap();
        }
        assert!(matches!(
            batch.push(0, Vec3::ZERO, 1.0),
            Err(RenderError::CandidateOverflow)
        ));
        assert_eq!(batch.len(), MAX_QUERY_CANDIDATES);
    }
}
