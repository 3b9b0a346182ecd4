//! Intersection results.

use tessera_math::Vec3;

use crate::Material;

/// Record of the nearest ray-sphere intersection.
///
/// Borrowed from the world that produced it; only valid for the query that
/// returned it.
#[derive(Debug, Clone, Copy)]
pub struct HitRecord<'a> {
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Point of intersection
    pub p: Vec3,
    /// Outward surface normal (unit length, not flipped towards the ray)
    pub normal: Vec3,
    /// Material of the struck sphere
    pub material: &'a Material,
}
