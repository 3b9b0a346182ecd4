//! Tile-parallel work scheduling.
//!
//! A [`RenderQueue`] holds every tile of one render and two atomic counters.
//! Workers claim tiles with a fetch-and-increment on the cursor and render
//! each claimed tile to completion. Each tile sits behind its own mutex,
//! which only the claiming worker ever locks.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;

use crate::camera::Camera;
use crate::error::{RenderError, RenderResult};
use crate::tile::{Tile, TileOutput, TileRect};
use crate::{RenderConfig, World};

/// Read-only state shared by every worker of one render.
#[derive(Clone, Copy)]
pub struct RenderJob<'a> {
    pub world: &'a World,
    pub camera: &'a Camera,
    pub config: &'a RenderConfig,
}

/// Work queue for one render.
pub struct RenderQueue {
    tiles: Vec<Mutex<Tile>>,
    next: AtomicUsize,
    completed: AtomicUsize,
}

impl RenderQueue {
    /// Allocate one tile with its own scratch arena per rectangle.
    pub fn new(rects: &[TileRect], arena_capacity: usize) -> RenderResult<Self> {
        let tiles = rects
            .iter()
            .map(|&rect| Tile::new(rect, arena_capacity).map(Mutex::new))
            .collect::<RenderResult<Vec<_>>>()?;

        Ok(Self {
            tiles,
            next: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        })
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Number of tiles rendered so far.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Acquire)
    }

    /// Claim the next unrendered tile, if any.
    fn claim(&self) -> Option<usize> {
        let index = self.next.fetch_add(1, Ordering::Relaxed);
        (index < self.tiles.len()).then_some(index)
    }

    /// Stop handing out tiles.
    fn drain(&self) {
        self.next.store(self.tiles.len(), Ordering::Relaxed);
    }

    /// Claim and render tiles until the queue is exhausted.
    fn work(&self, job: RenderJob<'_>) -> RenderResult<Vec<TileOutput>> {
        let mut outputs = Vec::new();

        while let Some(index) = self.claim() {
            let rendered = self.tiles[index]
                .lock()
                .map_err(|_| RenderError::Poisoned(index))
                .and_then(|mut tile| tile.render(job.world, job.camera, job.config));

            match rendered {
                Ok(output) => {
                    let done = self.completed.fetch_add(1, Ordering::AcqRel) + 1;
                    log::debug!(
                        "Tile {} ({}x{} at {},{}) done, {}/{}",
                        index,
                        output.rect.width,
                        output.rect.height,
                        output.rect.x,
                        output.rect.y,
                        done,
                        self.tiles.len()
                    );
                    outputs.push(output);
                }
                Err(e) => {
                    self.drain();
                    return Err(e);
                }
            }
        }

        Ok(outputs)
    }

    /// Render every tile on `workers` threads, the calling thread included.
    ///
    /// Returns once all workers have joined. Fails with the first worker
    /// error, or with [`RenderError::IncompleteRender`] if any tile is
    /// left unrendered.
    pub fn run(&self, job: RenderJob<'_>, workers: usize) -> RenderResult<Vec<TileOutput>> {
        let workers = workers.max(1);

        let results: Vec<RenderResult<Vec<TileOutput>>> = thread::scope(|s| {
            let handles: Vec<_> = (1..workers)
                .map(|_| s.spawn(move || self.work(job)))
                .collect();

            let mut results = vec![self.work(job)];
            for handle in handles {
                results.push(handle.join().unwrap_or(Err(RenderError::WorkerPanicked)));
            }
            results
        });

        let mut outputs = Vec::with_capacity(self.tiles.len());
        for result in results {
            outputs.extend(result?);
        }

        let completed = self.completed();
        if completed != self.tiles.len() {
            return Err(RenderError::IncompleteRender {
                completed,
                total: self.tiles.len(),
            });
        }

        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::DEFAULT_ARENA_CAPACITY;
    use crate::tile::generate_tiles;
    use crate::{CameraSettings, Color};

    const SKY: Color = Color::new(0.2, 0.4, 0.6);

    fn job_parts(width: u32, height: u32) -> (World, Camera, RenderConfig) {
        let world = World::new(Vec::new(), SKY, 0).unwrap();
        let camera = CameraSettings::new()
            .with_aspect_ratio(width as f32 / height as f32)
            .build()
            .unwrap();
        let config = RenderConfig {
            width,
            height,
            samples_per_pixel: 2,
            max_bounces: 2,
            ..RenderConfig::default()
        };
        (world, camera, config)
    }

    #[test]
    fn test_every_tile_rendered_once() {
        let (world, camera, config) = job_parts(37, 23);
        let rects = generate_tiles(37, 23, 5, 4).unwrap();
        let queue = RenderQueue::new(&rects, DEFAULT_ARENA_CAPACITY).unwrap();
        let job = RenderJob {
            world: &world,
            camera: &camera,
            config: &config,
        };

        let outputs = queue.run(job, 4).unwrap();
        assert_eq!(outputs.len(), rects.len());
        assert_eq!(queue.completed(), rects.len());

        let mut indices: Vec<usize> = outputs.iter().map(|o| o.rect.index).collect();
        indices.sort_unstable();
        assert_eq!(indices, (0..rects.len()).collect::<Vec<_>>());

        for output in &outputs {
            assert_eq!(output.pixels.len(), output.rect.pixel_count());
            assert!(output.pixels.iter().all(|&c| c == SKY));
        }
    }

    #[test]
    fn test_more_workers_than_tiles() {
        let (world, camera, config) = job_parts(8, 8);
        let rects = generate_tiles(8, 8, 1, 2).unwrap();
        let queue = RenderQueue::new(&rects, DEFAULT_ARENA_CAPACITY).unwrap();
        let job = RenderJob {
            world: &world,
            camera: &camera,
            config: &config,
        };

        assert_eq!(queue.run(job, 16).unwrap().len(), 2);
    }

    #[test]
    fn test_queue_rejects_small_arena() {
        let rects = generate_tiles(8, 8, 2, 2).unwrap();
        assert!(matches!(
            RenderQueue::new(&rects, 128),
            Err(RenderError::ArenaTooSmall { .. })
        ));
    }
}
