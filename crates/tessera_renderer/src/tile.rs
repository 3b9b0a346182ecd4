//! Tile partitioning of the output raster.
//!
//! The image is split into a `tiles_x` by `tiles_y` grid. Each tile is
//! rendered start to finish by one worker, using its own scratch arena and
//! its own random generator.

use crate::arena::ScratchArena;
use crate::camera::Camera;
use crate::error::{RenderError, RenderResult};
use crate::integrator::render_pixel;
use crate::sampling::tile_rng;
use crate::{Color, RenderConfig, World, MAX_TILES};

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRect {
    /// X coordinate of the tile's top-left corner
    pub x: u32,
    /// Y coordinate of the tile's top-left corner
    pub y: u32,
    /// Width of the tile in pixels
    pub width: u32,
    /// Height of the tile in pixels
    pub height: u32,
    /// Index of this tile in the render order
    pub index: usize,
}

impl TileRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Split a `width` x `height` raster into a `tiles_x` x `tiles_y` grid.
///
/// Tiles are `width / tiles_x` by `height / tiles_y` pixels; the last
/// column and the last row absorb the remainder, so every pixel belongs to
/// exactly one tile. Tiles are returned in spiral order from the center,
/// with `index` matching their position in the returned list.
pub fn generate_tiles(
    width: u32,
    height: u32,
    tiles_x: u32,
    tiles_y: u32,
) -> RenderResult<Vec<TileRect>> {
    if tiles_x == 0 || tiles_y == 0 {
        return Err(RenderError::InvalidConfig(format!(
            "tile grid {tiles_x}x{tiles_y} is empty"
        )));
    }
    let count = tiles_x as usize * tiles_y as usize;
    if count > MAX_TILES {
        return Err(RenderError::TooManyTiles(count));
    }
    if tiles_x > width || tiles_y > height {
        return Err(RenderError::InvalidConfig(format!(
            "tile grid {tiles_x}x{tiles_y} is finer than the {width}x{height} image"
        )));
    }

    let tile_w = width / tiles_x;
    let tile_h = height / tiles_y;
    if width % tiles_x != 0 || height % tiles_y != 0 {
        log::debug!(
            "Edge tiles absorb {} extra columns and {} extra rows",
            width % tiles_x,
            height % tiles_y
        );
    }

    let mut tiles = Vec::with_capacity(count);
    for row in 0..tiles_y {
        let y = row * tile_h;
        let h = if row == tiles_y - 1 { height - y } else { tile_h };
        for col in 0..tiles_x {
            let x = col * tile_w;
            let w = if col == tiles_x - 1 { width - x } else { tile_w };
            tiles.push(TileRect::new(x, y, w, h, tiles.len()));
        }
    }

    // Sort by distance from center (spiral order)
    sort_spiral(&mut tiles, width, height);

    // Update indices after sorting
    for (i, tile) in tiles.iter_mut().enumerate() {
        tile.index = i;
    }

    Ok(tiles)
}

/// Sort tiles by distance from the image center.
fn sort_spiral(tiles: &mut [TileRect], width: u32, height: u32) {
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;
    let distance = |t: &TileRect| {
        let dx = t.x as f32 + t.width as f32 / 2.0 - center_x;
        let dy = t.y as f32 + t.height as f32 / 2.0 - center_y;
        dx * dx + dy * dy
    };

    // Stable, so equidistant tiles keep row-major order
    tiles.sort_by(|a, b| {
        distance(a)
            .partial_cmp(&distance(b))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// A tile and the scratch memory it renders with.
pub struct Tile {
    rect: TileRect,
    arena: ScratchArena,
}

impl Tile {
    pub fn new(rect: TileRect, arena_capacity: usize) -> RenderResult<Self> {
        Ok(Self {
            rect,
            arena: ScratchArena::new(arena_capacity)?,
        })
    }

    pub fn rect(&self) -> TileRect {
        self.rect
    }

    /// Render every pixel of the tile.
    ///
    /// The generator is derived from the render seed and the tile index
    /// alone, so the result does not depend on which worker runs it.
    pub fn render(
        &mut self,
        world: &World,
        camera: &Camera,
        config: &RenderConfig,
    ) -> RenderResult<TileOutput> {
        let rect = self.rect;
        let mut rng = tile_rng(config.seed, rect.index);
        let mut pixels = Vec::with_capacity(rect.pixel_count());

        for local_y in 0..rect.height {
            for local_x in 0..rect.width {
                let color = render_pixel(
                    world,
                    camera,
                    rect.x + local_x,
                    rect.y + local_y,
                    config.width,
                    config.height,
                    config.samples_per_pixel,
                    config.max_bounces,
                    &mut self.arena,
                    &mut rng,
                )?;
                pixels.push(color);
            }
        }

        Ok(TileOutput { rect, pixels })
    }
}

/// Result of rendering a tile.
#[derive(Debug, Clone)]
pub struct TileOutput {
    /// The tile that was rendered
    pub rect: TileRect,
    /// Linear pixel colors in row-major order
    pub pixels: Vec<Color>,
}
