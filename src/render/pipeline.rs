//! Frame rendering: color mapping followed by optional edge and bloom passes.
//!
//! Every stage is a full-frame `Frame -> Frame` transform. Stage order is
//! fixed: color map, edge detection, horizontal blur, vertical blur,
//! composite with tone mapping.

#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

use crate::compute::SimulationState;
use crate::schema::RenderSettings;

use super::palette::{color_of, Rgb};

/// Five-tap symmetric blur weights (center first).
pub const BLUR_WEIGHTS: [f32; 5] = [0.227027, 0.1945946, 0.1216216, 0.054054, 0.016216];

/// An RGB image with channels in [0, 1]. Row 0 is the bottom row.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl Frame {
    /// Black frame.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0.0; 3]; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Rgb {
        self.pixels[y * self.width + x]
    }

    /// Clamp-to-edge fetch.
    #[inline]
    fn fetch(&self, x: isize, y: isize) -> Rgb {
        let x = x.clamp(0, self.width as isize - 1) as usize;
        let y = y.clamp(0, self.height as isize - 1) as usize;
        self.pixels[y * self.width + x]
    }

    /// RGBA8 bytes, top row first, opaque alpha.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.width * self.height * 4);
        for row in self.pixels.chunks_exact(self.width.max(1)).rev() {
            for p in row {
                bytes.extend(p.iter().map(|&c| (c.clamp(0.0, 1.0) * 255.0).round() as u8));
                bytes.push(255);
            }
        }
        bytes
    }

    fn resize(&mut self, width: usize, height: usize) {
        if self.width != width || self.height != height {
            *self = Frame::new(width, height);
        }
    }
}

/// Map the current buffer's inhibitor channel to colors.
pub fn color_map(state: &SimulationState, settings: &RenderSettings, out: &mut Frame) {
    let cells = state.current();

    #[cfg(not(target_arch = "wasm32"))]
    out.pixels
        .par_iter_mut()
        .zip(cells.par_iter())
        .for_each(|(p, c)| *p = color_of(settings, c.v, c.obstacle));

    #[cfg(target_arch = "wasm32")]
    for (p, c) in out.pixels.iter_mut().zip(cells) {
        *p = color_of(settings, c.v, c.obstacle);
    }
}

/// Sobel gradient magnitude per channel, added to the source by `strength`.
pub fn edge_detect(src: &Frame, strength: f32, out: &mut Frame) {
    for y in 0..src.height as isize {
        for x in 0..src.width as isize {
            let tl = src.fetch(x - 1, y - 1);
            let tc = src.fetch(x, y - 1);
            let tr = src.fetch(x + 1, y - 1);
            let ml = src.fetch(x - 1, y);
            let mr = src.fetch(x + 1, y);
            let bl = src.fetch(x - 1, y + 1);
            let bc = src.fetch(x, y + 1);
            let br = src.fetch(x + 1, y + 1);
            let original = src.fetch(x, y);

            let mut color = [0.0; 3];
            for c in 0..3 {
                let gx = -tl[c] - 2.0 * ml[c] - bl[c] + tr[c] + 2.0 * mr[c] + br[c];
                let gy = -tl[c] - 2.0 * tc[c] - tr[c] + bl[c] + 2.0 * bc[c] + br[c];
                let edge = (gx * gx + gy * gy).sqrt();
                color[c] = (original[c] + edge * strength).clamp(0.0, 1.0);
            }
            out.pixels[y as usize * src.width + x as usize] = color;
        }
    }
}

/// Blur direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// One separable blur pass. Taps are `spacing` texels apart and sampled
/// with linear interpolation.
pub fn blur(src: &Frame, axis: Axis, spacing: f32, out: &mut Frame) {
    for y in 0..src.height {
        for x in 0..src.width {
            let mut color = scale(src.pixel(x, y), BLUR_WEIGHTS[0]);
            for (i, &weight) in BLUR_WEIGHTS.iter().enumerate().skip(1) {
                let offset = i as f32 * spacing;
                let ahead = sample_along(src, x, y, axis, offset);
                let behind = sample_along(src, x, y, axis, -offset);
                for c in 0..3 {
                    color[c] += (ahead[c] + behind[c]) * weight;
                }
            }
            out.pixels[y * src.width + x] = clamp01(color);
        }
    }
}

/// Linearly interpolated sample `offset` texels from (x, y) along `axis`.
fn sample_along(src: &Frame, x: usize, y: usize, axis: Axis, offset: f32) -> Rgb {
    let base = match axis {
        Axis::Horizontal => x,
        Axis::Vertical => y,
    } as f32
        + offset;
    let i0 = base.floor();
    let t = base - i0;
    let i0 = i0 as isize;
    let (a, b) = match axis {
        Axis::Horizontal => (src.fetch(i0, y as isize), src.fetch(i0 + 1, y as isize)),
        Axis::Vertical => (src.fetch(x as isize, i0), src.fetch(x as isize, i0 + 1)),
    };
    [
        a[0] * (1.0 - t) + b[0] * t,
        a[1] * (1.0 - t) + b[1] * t,
        a[2] * (1.0 - t) + b[2] * t,
    ]
}

/// `scene + bloom * strength`, then Reinhard tone mapping.
pub fn composite(scene: &Frame, bloom: &Frame, strength: f32, out: &mut Frame) {
    for ((p, s), b) in out.pixels.iter_mut().zip(&scene.pixels).zip(&bloom.pixels) {
        for c in 0..3 {
            let v = s[c] + b[c] * strength;
            p[c] = v / (1.0 + v);
        }
    }
}

#[inline]
fn scale(c: Rgb, k: f32) -> Rgb {
    [c[0] * k, c[1] * k, c[2] * k]
}

#[inline]
fn clamp01(c: Rgb) -> Rgb {
    [c[0].clamp(0.0, 1.0), c[1].clamp(0.0, 1.0), c[2].clamp(0.0, 1.0)]
}

/// Reusable render targets. Only ever reads the current buffer.
#[derive(Debug, Clone)]
pub struct RenderPipeline {
    targets: [Frame; 3],
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl RenderPipeline {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            targets: [
                Frame::new(width, height),
                Frame::new(width, height),
                Frame::new(width, height),
            ],
        }
    }

    /// Render the latest committed state.
    pub fn render(&mut self, state: &SimulationState, settings: &RenderSettings) -> &Frame {
        for target in &mut self.targets {
            target.resize(state.width, state.height);
        }

        let [t0, t1, t2] = &mut self.targets;
        color_map(state, settings, t0);
        if !settings.needs_post_processing() {
            return &self.targets[0];
        }

        let out = match (settings.edge_enabled, settings.bloom_enabled) {
            (false, false) => 0,
            (true, false) => {
                edge_detect(t0, settings.edge_strength, t1);
                1
            }
            (false, true) => {
                bloom(t0, t1, t2, settings);
                1
            }
            (true, true) => {
                edge_detect(t0, settings.edge_strength, t1);
                bloom(t1, t0, t2, settings);
                0
            }
        };

        &self.targets[out]
    }
}

/// Blur `scene` into `blurred` (via `scratch`) and composite into `scratch`.
fn bloom(scene: &Frame, scratch: &mut Frame, blurred: &mut Frame, settings: &RenderSettings) {
    blur(scene, Axis::Horizontal, settings.bloom_radius, scratch);
    blur(scratch, Axis::Vertical, settings.bloom_radius, blurred);
    composite(scene, blurred, settings.bloom_strength, scratch);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::Cell;
    use crate::schema::Palette;

    fn state_with(cells: &[Cell], width: usize, height: usize) -> SimulationState {
        let mut state = SimulationState::new(width, height).unwrap();
        state.fill_both(cells).unwrap();
        state
    }

    fn gray() -> RenderSettings {
        RenderSettings {
            palette: Palette::Grayscale,
            ..Default::default()
        }
    }

    #[test]
    fn test_blur_weights_normalized() {
        let total = BLUR_WEIGHTS[0] + 2.0 * BLUR_WEIGHTS[1..].iter().sum::<f32>();
        assert!((total - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_color_map_only_passes_through() {
        let cells: Vec<Cell> = (0..16).map(|i| Cell::new(0.5, i as f32 / 15.0, 0.0)).collect();
        let state = state_with(&cells, 4, 4);
        let mut pipeline = RenderPipeline::default();
        let frame = pipeline.render(&state, &gray());
        for (p, c) in frame.pixels().iter().zip(&cells) {
            assert!((p[0] - c.v).abs() < 1e-6);
        }
    }

    #[test]
    fn test_edge_zero_on_flat_image() {
        let state = state_with(&vec![Cell::new(0.5, 0.4, 0.0); 25], 5, 5);
        let settings = RenderSettings {
            edge_enabled: true,
            edge_strength: 1.0,
            ..gray()
        };
        let mut pipeline = RenderPipeline::default();
        let frame = pipeline.render(&state, &settings);
        assert!(frame.pixels().iter().all(|p| (p[0] - 0.4).abs() < 1e-6));
    }

    #[test]
    fn test_edge_highlights_step() {
        let cells: Vec<Cell> = (0..36)
            .map(|i| Cell::new(0.5, if i % 6 < 3 { 0.0 } else { 1.0 }, 0.0))
            .collect();
        let state = state_with(&cells, 6, 6);
        let settings = RenderSettings {
            edge_enabled: true,
            ..gray()
        };
        let mut pipeline = RenderPipeline::default();
        let frame = pipeline.render(&state, &settings);
        // Dark side of the step brightens
        assert!(frame.pixel(2, 3)[0] > 0.5);
        assert_eq!(frame.pixel(0, 3)[0], 0.0);
    }

    #[test]
    fn test_bloom_tone_maps_flat_image() {
        let state = state_with(&vec![Cell::new(0.5, 1.0, 0.0); 16], 4, 4);
        let settings = RenderSettings {
            bloom_enabled: true,
            bloom_strength: 1.0,
            ..gray()
        };
        let mut pipeline = RenderPipeline::default();
        let frame = pipeline.render(&state, &settings);
        // (1 + 1) / (1 + 2)
        for p in frame.pixels() {
            assert!((p[0] - 2.0 / 3.0).abs() < 1e-3, "{:?}", p);
        }
    }

    #[test]
    fn test_edge_and_bloom_output_in_range() {
        let cells: Vec<Cell> = (0..64)
            .map(|i| Cell::new(0.5, ((i * 7) % 11) as f32 / 10.0, 0.0))
            .collect();
        let state = state_with(&cells, 8, 8);
        let settings = RenderSettings {
            edge_enabled: true,
            bloom_enabled: true,
            ..Default::default()
        };
        let mut pipeline = RenderPipeline::default();
        let frame = pipeline.render(&state, &settings);
        assert_eq!((frame.width(), frame.height()), (8, 8));
        for p in frame.pixels() {
            assert!(p.iter().all(|c| (0.0..1.0).contains(c)));
        }
    }

    #[test]
    fn test_render_does_not_touch_state() {
        let cells = vec![Cell::new(0.2, 0.7, 1.0); 9];
        let state = state_with(&cells, 3, 3);
        let index = state.current_index();
        let settings = RenderSettings {
            bloom_enabled: true,
            edge_enabled: true,
            ..Default::default()
        };
        RenderPipeline::default().render(&state, &settings);
        assert_eq!(state.current(), cells.as_slice());
        assert_eq!(state.current_index(), index);
    }

    #[test]
    fn test_rgba_rows_top_first() {
        let mut cells = vec![Cell::new(1.0, 0.0, 0.0); 4];
        cells[2] = Cell::new(1.0, 1.0, 0.0); // (0, 1): top-left
        let state = state_with(&cells, 2, 2);
        let bytes = RenderPipeline::default().render(&state, &gray()).to_rgba8();
        assert_eq!(&bytes[0..4], &[255, 255, 255, 255]);
        assert_eq!(&bytes[8..12], &[0, 0, 0, 255]);
    }
}
