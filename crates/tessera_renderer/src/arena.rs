//! Per-tile scratch memory.
//!
//! Each tile owns one bump arena with a fixed budget. Every BVH query carves
//! its candidate batch out of it and the arena is reset straight after, so
//! a tile renders all of its pixels without touching the global allocator.

use bumpalo::Bump;

use crate::batch::CandidateBatch;
use crate::error::{RenderError, RenderResult};

/// Default scratch budget per tile.
pub const DEFAULT_ARENA_CAPACITY: usize = 16 * 1024;

/// Fixed-capacity bump allocator with O(1) reset.
pub struct ScratchArena {
    bump: Bump,
    capacity: usize,
}

impl ScratchArena {
    /// Create an arena holding at most `capacity` bytes.
    ///
    /// Fails when `capacity` cannot fit one full candidate batch.
    pub fn new(capacity: usize) -> RenderResult<Self> {
        let required = CandidateBatch::footprint();
        if capacity < required {
            return Err(RenderError::ArenaTooSmall { capacity, required });
        }

        let bump = Bump::with_capacity(capacity);
        // Never grow past the first chunk
        bump.set_allocation_limit(Some(capacity));

        Ok(Self { bump, capacity })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Allocate an empty candidate batch for one query.
    pub fn candidate_batch(&self) -> CandidateBatch<'_> {
        CandidateBatch::new_in(&self.bump)
    }

    /// Release everything allocated since the last reset.
    pub fn reset(&mut self) {
        self.bump.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_math::Vec3;

    #[test]
    fn test_arena_rejects_tiny_capacity() {
        let err = ScratchArena::new(64).err().unwrap();
        assert!(matches!(err, RenderError::ArenaTooSmall { capacity: 64, .. }));
    }

    #[test]
    fn test_arena_reuses_memory_after_reset() {
        let mut arena = ScratchArena::new(DEFAULT_ARENA_CAPACITY).unwrap();
        assert_eq!(arena.capacity(), DEFAULT_ARENA_CAPACITY);

        {
            let mut batch = arena.candidate_batch();
            batch.push(0, Vec3::ZERO, 1.0).unwrap();
        }
        arena.reset();
        let chunk_bytes = arena.bump.allocated_bytes();

        // Thousands of queries on one arena: no new chunks
        for i in 0..10_000 {
            let mut batch = arena.candidate_batch();
            batch.push(i, Vec3::ONE, 0.5).unwrap();
            assert_eq!(batch.len(), 1);
            drop(batch);
            arena.reset();
        }
        assert_eq!(arena.bump.allocated_bytes(), chunk_bytes);
    }
}
