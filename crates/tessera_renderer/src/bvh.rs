//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree over sphere indices, built once per scene by median split
//! on a randomly chosen axis. Every leaf holds exactly one sphere. Queries
//! do not search for the closest hit themselves: they gather every sphere
//! whose leaf box the ray crosses into a [`CandidateBatch`], which then
//! resolves the nearest hit four spheres at a time.

use rand::Rng;
use tessera_math::{Aabb, Interval, Ray};

use crate::batch::CandidateBatch;
use crate::error::RenderResult;
use crate::Sphere;

/// BVH node - either a branch with two children or a single-sphere leaf.
#[derive(Debug)]
pub enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// Leaf node referencing one sphere by index.
    Leaf { sphere: u32, bbox: Aabb },
}

impl BvhNode {
    /// Build a tree over `indices` into `spheres`.
    ///
    /// `indices` is reordered in place. It must not be empty.
    fn build(spheres: &[Sphere], indices: &mut [u32], rng: &mut impl Rng) -> Self {
        match indices.len() {
            1 => Self::leaf(spheres, indices[0]),
            2 => Self::branch(
                Self::leaf(spheres, indices[0]),
                Self::leaf(spheres, indices[1]),
            ),
            n => {
                let axis = rng.gen_range(0..3);
                indices.sort_unstable_by(|&a, &b| {
                    let a_min = spheres[a as usize].bounding_box().axis_interval(axis).min;
                    let b_min = spheres[b as usize].bounding_box().axis_interval(axis).min;
                    a_min
                        .partial_cmp(&b_min)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });

                // Split at midpoint
                let (left, right) = indices.split_at_mut(n / 2);
                Self::branch(
                    Self::build(spheres, left, rng),
                    Self::build(spheres, right, rng),
                )
            }
        }
    }

    fn leaf(spheres: &[Sphere], sphere: u32) -> Self {
        BvhNode::Leaf {
            sphere,
            bbox: spheres[sphere as usize].bounding_box(),
        }
    }

    fn branch(left: BvhNode, right: BvhNode) -> Self {
        let bbox = Aabb::surrounding(&left.bounding_box(), &right.bounding_box());
        BvhNode::Branch {
            left: Box::new(left),
            right: Box::new(right),
            bbox,
        }
    }

    pub fn bounding_box(&self) -> Aabb {
        match self {
            BvhNode::Leaf { bbox, .. } | BvhNode::Branch { bbox, .. } => *bbox,
        }
    }

    /// Append every sphere whose leaf box the ray crosses within `ray_t`.
    ///
    /// Both children of a surviving branch are always visited; the batch
    /// sorts out which candidate is nearest.
    fn query(
        &self,
        spheres: &[Sphere],
        ray: &Ray,
        ray_t: Interval,
        batch: &mut CandidateBatch<'_>,
    ) -> RenderResult<()> {
        if !self.bounding_box().hit(ray, ray_t) {
            return Ok(());
        }

        match self {
            BvhNode::Leaf { sphere, .. } => {
                let s = &spheres[*sphere as usize];
                batch.push(*sphere, s.center(), s.radius())
            }
            BvhNode::Branch { left, right, .. } => {
                left.query(spheres, ray, ray_t, batch)?;
                right.query(spheres, ray, ray_t, batch)
            }
        }
    }

    fn count_nodes(&self) -> usize {
        match self {
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.count_nodes() + right.count_nodes(),
        }
    }

    fn depth(&self) -> usize {
        match self {
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// The BVH for one world. Empty worlds have no root.
#[derive(Debug)]
pub struct Bvh {
    root: Option<BvhNode>,
}

impl Bvh {
    /// Build a BVH over all `spheres`.
    pub fn new(spheres: &[Sphere], rng: &mut impl Rng) -> Self {
        if spheres.is_empty() {
            return Self { root: None };
        }

        let mut indices: Vec<u32> = (0..spheres.len() as u32).collect();
        let root = BvhNode::build(spheres, &mut indices, rng);

        log::debug!(
            "Built BVH over {} spheres: {} nodes, depth {}",
            spheres.len(),
            root.count_nodes(),
            root.depth()
        );

        Self { root: Some(root) }
    }

    pub fn root(&self) -> Option<&BvhNode> {
        self.root.as_ref()
    }

    pub fn node_count(&self) -> usize {
        self.root.as_ref().map_or(0, BvhNode::count_nodes)
    }

    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, BvhNode::depth)
    }

    /// Gather the candidate spheres for `ray` into `batch`.
    pub fn query(
        &self,
        spheres: &[Sphere],
        ray: &Ray,
        ray_t: Interval,
        batch: &mut CandidateBatch<'_>,
    ) -> RenderResult<()> {
        match &self.root {
            Some(root) => root.query(spheres, ray, ray_t, batch),
            None => Ok(()),
        }
    }
}
