//! The renderable world: spheres, their BVH, and the background.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tessera_math::{Interval, Ray};

use crate::arena::ScratchArena;
use crate::bvh::Bvh;
use crate::error::{RenderError, RenderResult};
use crate::hit::HitRecord;
use crate::{Color, Sphere, MAX_SPHERES};

/// Owns every sphere and the BVH built over them.
///
/// Read-only once built, so workers share it by reference.
#[derive(Debug)]
pub struct World {
    spheres: Vec<Sphere>,
    bvh: Bvh,
    background: Color,
}

impl World {
    /// Build a world and its BVH.
    ///
    /// `bvh_seed` drives the random split axes, so the same seed always
    /// yields the same tree.
    pub fn new(spheres: Vec<Sphere>, background: Color, bvh_seed: u64) -> RenderResult<Self> {
        if spheres.len() > MAX_SPHERES {
            return Err(RenderError::TooManySpheres(spheres.len()));
        }

        let mut rng = StdRng::seed_from_u64(bvh_seed);
        let bvh = Bvh::new(&spheres, &mut rng);

        log::info!(
            "World: {} spheres, BVH {} nodes, depth {}",
            spheres.len(),
            bvh.node_count(),
            bvh.depth()
        );

        Ok(Self {
            spheres,
            bvh,
            background,
        })
    }

    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }

    /// Radiance for rays that leave the scene.
    pub fn background(&self) -> Color {
        self.background
    }

    /// Nearest hit via BVH query plus batch intersection.
    ///
    /// The candidate batch lives in `arena` only for the duration of this
    /// call; the arena is reset before returning.
    pub fn hit(
        &self,
        ray: &Ray,
        ray_t: Interval,
        arena: &mut ScratchArena,
    ) -> RenderResult<Option<HitRecord<'_>>> {
        let nearest = {
            let mut batch = arena.candidate_batch();
            let gathered = self.bvh.query(&self.spheres, ray, ray_t, &mut batch);
            gathered.map(|()| batch.nearest(ray, ray_t))
        };
        arena.reset();

        Ok(nearest?.map(|(sphere, t)| self.spheres[sphere as usize].record(ray, t)))
    }

    /// Nearest hit by testing every sphere in turn.
    ///
    /// Reference for [`World::hit`]; both use the same root selection.
    pub fn hit_linear(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let mut closest: Option<HitRecord<'_>> = None;
        for sphere in &self.spheres {
            let max = closest.map_or(ray_t.max, |rec| rec.t);
            if let Some(rec) = sphere.hit(ray, Interval::new(ray_t.min, max)) {
                closest = Some(rec);
            }
        }
        closest
    }
}
