use std::collections::HashMap;

use eframe::egui::{Color32, ColorImage};

use crate::canvas::pixel_store::PixelDelta;
use crate::canvas::project::{Frame, Layer, LayerId};
use crate::utils::color::Color;
use crate::utils::geometry::IRect;
use crate::utils::profiler::ScopeTimer;

pub const DEFAULT_CHUNK_SIZE: i32 = 64;

#[derive(Debug, Clone)]
/// Rasterized tile of one layer. `data` stays `None` while the tile is fully transparent.
pub struct Chunk {
    size: i32,
    data: Option<Vec<Color32>>,
}

impl Chunk {
    fn blank(size: i32) -> Self {
        Self { size, data: None }
    }

    pub fn is_blank(&self) -> bool {
        self.data.is_none()
    }

    /// Premultiplied pixel at tile-local `(lx, ly)`.
    pub fn pixel(&self, lx: i32, ly: i32) -> Color32 {
        match &self.data {
            Some(data) => data[(ly * self.size + lx) as usize],
            None => Color32::TRANSPARENT,
        }
    }

    fn set(&mut self, lx: i32, ly: i32, color: Option<Color>) {
        let size = self.size;
        let value = color.map_or(Color32::TRANSPARENT, |c| c.to_color32());
        if self.data.is_none() && value == Color32::TRANSPARENT {
            return;
        }
        let data = self
            .data
            .get_or_insert_with(|| vec![Color32::TRANSPARENT; (size * size) as usize]);
        data[(ly * size + lx) as usize] = value;
    }
}

/// Tiled raster mirror of every layer's sparse map, keyed by layer id.
///
/// Chunks are derived data: they are built lazily from the layer map, patched
/// per delta, and may be dropped at any time. Callers must route every
/// [`PixelDelta`] through [`ChunkCache::apply_delta`], call
/// [`ChunkCache::drop_layer`] when a layer goes away, [`ChunkCache::clear`] when the
/// active frame switches, and [`ChunkCache::invalidate`] after changing layer
/// visibility, opacity or order.
pub struct ChunkCache {
    chunk_size: i32,
    layers: HashMap<LayerId, HashMap<(i32, i32), Chunk>>,
    raster: ColorImage,
    raster_view: Option<IRect>,
    dirty: bool,
    compositions: u64,
}

impl ChunkCache {
    pub fn new(chunk_size: i32) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            layers: HashMap::new(),
            raster: ColorImage::new([0, 0], Color32::TRANSPARENT),
            raster_view: None,
            dirty: true,
            compositions: 0,
        }
    }

    /// Size of a chunk edge in pixels.
    pub fn chunk_size(&self) -> i32 {
        self.chunk_size
    }

    /// Chunk coordinate owning world pixel `(x, y)`; floors for negative values.
    pub fn chunk_coord(&self, x: i32, y: i32) -> (i32, i32) {
        (x.div_euclid(self.chunk_size), y.div_euclid(self.chunk_size))
    }

    /// World pixel range covered by chunk `(cx, cy)`.
    pub fn chunk_rect(&self, cx: i32, cy: i32) -> IRect {
        IRect::new(
            cx * self.chunk_size,
            cy * self.chunk_size,
            self.chunk_size,
            self.chunk_size,
        )
    }

    /// The cached chunk, building it from the layer's sparse map on first request.
    pub fn ensure_chunk(&mut self, layer: &Layer, cx: i32, cy: i32) -> &Chunk {
        let size = self.chunk_size;
        self.layers
            .entry(layer.id)
            .or_default()
            .entry((cx, cy))
            .or_insert_with(|| build_chunk(layer, size, cx, cy))
    }

    /// Chunk if already cached; never builds.
    pub fn cached_chunk(&self, layer: LayerId, cx: i32, cy: i32) -> Option<&Chunk> {
        self.layers.get(&layer)?.get(&(cx, cy))
    }

    pub fn cached_chunk_count(&self, layer: LayerId) -> usize {
        self.layers.get(&layer).map_or(0, HashMap::len)
    }

    /// Patch the single pixel in its owning chunk. Chunks not yet built are
    /// left alone; they will read the already-updated map when built.
    pub fn apply_delta(&mut self, layer: LayerId, x: i32, y: i32, new: Option<Color>) {
        self.dirty = true;
        let (cx, cy) = self.chunk_coord(x, y);
        let size = self.chunk_size;
        if let Some(chunk) = self
            .layers
            .get_mut(&layer)
            .and_then(|chunks| chunks.get_mut(&(cx, cy)))
        {
            chunk.set(x - cx * size, y - cy * size, new);
        }
    }

    pub fn apply_deltas(&mut self, deltas: &[PixelDelta]) {
        for d in deltas {
            self.apply_delta(d.layer, d.x, d.y, d.new);
        }
    }

    /// Tear down every chunk of a removed (or wholesale replaced) layer.
    pub fn drop_layer(&mut self, layer: LayerId) {
        self.layers.remove(&layer);
        self.dirty = true;
    }

    /// Drop all chunks, e.g. when the active frame switches.
    pub fn clear(&mut self) {
        self.layers.clear();
        self.dirty = true;
    }

    /// Force the next compose to re-run without dropping chunks.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// How many times compose actually re-rendered (reuses are not counted).
    pub fn compositions(&self) -> u64 {
        self.compositions
    }

    /// Composite every visible layer of `frame`, bottom to top, over `viewport`.
    ///
    /// Re-renders only when pixel data changed or the viewport moved since
    /// the last call; otherwise the previous raster is returned.
    pub fn compose(&mut self, frame: &Frame, viewport: IRect) -> &ColorImage {
        if !self.dirty && self.raster_view == Some(viewport) {
            return &self.raster;
        }
        let _timer = ScopeTimer::new("chunk_compose");

        let w = viewport.w.max(0) as usize;
        let h = viewport.h.max(0) as usize;
        let mut out = ColorImage::new([w, h], Color32::TRANSPARENT);

        if !viewport.is_empty() {
            let size = self.chunk_size;
            let (cx0, cy0) = self.chunk_coord(viewport.x, viewport.y);
            let (cx1, cy1) = self.chunk_coord(viewport.max_x() - 1, viewport.max_y() - 1);

            for layer in &frame.layers {
                if !layer.visible || layer.opacity == 0 {
                    continue;
                }
                let opacity = layer.opacity as u32;
                let chunks = self.layers.entry(layer.id).or_default();

                for cy in cy0..=cy1 {
                    for cx in cx0..=cx1 {
                        let rect = IRect::new(cx * size, cy * size, size, size);
                        let Some(area) = rect.intersection(&viewport) else {
                            continue;
                        };
                        let chunk = chunks
                            .entry((cx, cy))
                            .or_insert_with(|| build_chunk(layer, size, cx, cy));
                        let Some(data) = chunk.data.as_ref() else {
                            continue;
                        };

                        for y in area.y..area.max_y() {
                            let src_row = ((y - rect.y) * size) as usize;
                            let dst_row = (y - viewport.y) as usize * w;
                            for x in area.x..area.max_x() {
                                let pixel = data[src_row + (x - rect.x) as usize];
                                if pixel.a() == 0 {
                                    continue;
                                }
                                let dst = &mut out.pixels[dst_row + (x - viewport.x) as usize];
                                *dst = alpha_over(apply_opacity_scale(pixel, opacity), *dst);
                            }
                        }
                    }
                }
            }
        }

        log::debug!(
            "composed {}x{} viewport at ({}, {})",
            viewport.w,
            viewport.h,
            viewport.x,
            viewport.y
        );
        self.raster = out;
        self.raster_view = Some(viewport);
        self.dirty = false;
        self.compositions += 1;
        &self.raster
    }
}

/// Replay the sparse-map entries that fall inside chunk `(cx, cy)`.
fn build_chunk(layer: &Layer, size: i32, cx: i32, cy: i32) -> Chunk {
    let rect = IRect::new(cx * size, cy * size, size, size);
    let mut chunk = Chunk::blank(size);
    if layer.pixel_count() < rect.area() {
        for ((x, y), color) in layer.pixels() {
            if rect.contains(x, y) {
                chunk.set(x - rect.x, y - rect.y, Some(color));
            }
        }
    } else {
        for y in rect.y..rect.max_y() {
            for x in rect.x..rect.max_x() {
                if let Some(color) = layer.pixel(x, y) {
                    chunk.set(x - rect.x, y - rect.y, Some(color));
                }
            }
        }
    }
    log::trace!("built chunk ({cx}, {cy}) of layer {:?}", layer.id);
    chunk
}

/// Uncached reference render straight from the sparse maps.
pub fn render_direct(frame: &Frame, viewport: IRect) -> ColorImage {
    let w = viewport.w.max(0) as usize;
    let h = viewport.h.max(0) as usize;
    let mut out = ColorImage::new([w, h], Color32::TRANSPARENT);
    for layer in &frame.layers {
        if !layer.visible || layer.opacity == 0 {
            continue;
        }
        for y in viewport.y..viewport.max_y() {
            for x in viewport.x..viewport.max_x() {
                let Some(color) = layer.pixel(x, y) else {
                    continue;
                };
                let pixel = color.to_color32();
                if pixel.a() == 0 {
                    continue;
                }
                let idx = (y - viewport.y) as usize * w + (x - viewport.x) as usize;
                out.pixels[idx] = alpha_over(
                    apply_opacity_scale(pixel, layer.opacity as u32),
                    out.pixels[idx],
                );
            }
        }
    }
    out
}

/// Standard "source over" alpha compositing for premultiplied colors.
pub fn alpha_over(src: Color32, dst: Color32) -> Color32 {
    let src_a = src.a() as u32;
    let dst_a = dst.a() as u32;
    let inv = 255 - src_a;
    let out_a = src_a + (dst_a * inv + 127) / 255;
    if out_a == 0 {
        return Color32::TRANSPARENT;
    }

    let out_r = src.r() as u32 + (dst.r() as u32 * inv + 127) / 255;
    let out_g = src.g() as u32 + (dst.g() as u32 * inv + 127) / 255;
    let out_b = src.b() as u32 + (dst.b() as u32 * inv + 127) / 255;

    Color32::from_rgba_premultiplied(
        out_r.min(255) as u8,
        out_g.min(255) as u8,
        out_b.min(255) as u8,
        out_a.min(255) as u8,
    )
}

#[inline]
fn apply_opacity_scale(color: Color32, opacity_scale: u32) -> Color32 {
    if opacity_scale >= 255 {
        return color;
    }
    let a = (color.a() as u32 * opacity_scale + 127) / 255;
    let r = (color.r() as u32 * opacity_scale + 127) / 255;
    let g = (color.g() as u32 * opacity_scale + 127) / 255;
    let b = (color.b() as u32 * opacity_scale + 127) / 255;
    Color32::from_rgba_premultiplied(r as u8, g as u8, b as u8, a as u8)
}
