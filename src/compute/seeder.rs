//! Initial conditions: procedural seed patterns and image seeds.
//!
//! Procedural patterns use a float hash of the cell coordinate and the seed
//! value instead of an ambient RNG, so a `(mode, value)` pair always
//! reproduces the same grid.

use image::imageops::{self, FilterType};

use crate::schema::{SeedMode, SeedSpec};

use super::Cell;

/// Number of spots placed by [`SeedMode::RandomSpots`].
const SPOT_COUNT: usize = 20;
/// Half extent of the center square, in normalized coordinates.
const CENTER_HALF_EXTENT: f32 = 0.05;
/// Seeded (u, v) value used by the center square and the spots.
const SEEDED: (f32, f32) = (0.5, 0.25);
/// Peak-to-peak baseline jitter.
const JITTER: f32 = 0.01;

/// Errors raised while preparing a seed.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Failed to decode seed image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Image decode worker exited without a result")]
    WorkerLost,
}

#[inline]
fn fract(x: f32) -> f32 {
    x - x.floor()
}

/// Deterministic pseudo-random value in [0, 1) for point `p` and `seed`.
#[inline]
pub fn hash(p: (f32, f32), seed: f32) -> f32 {
    let mut x = fract(p.0 * 123.34 + seed);
    let mut y = fract(p.1 * 456.21 + seed);
    let d = x * (x + 45.32) + y * (y + 45.32);
    x += d;
    y += d;
    fract(x * y)
}

/// A circular spot in normalized coordinates.
#[derive(Debug, Clone, Copy)]
struct Spot {
    center: (f32, f32),
    radius: f32,
}

/// Generates procedural initial states for one grid shape.
#[derive(Debug, Clone, Copy)]
pub struct Seeder {
    width: usize,
    height: usize,
}

impl Seeder {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Generate a full grid for `spec`. Obstacles are always cleared.
    pub fn generate(&self, spec: SeedSpec) -> Vec<Cell> {
        let seed = spec.value;
        let spots = match spec.mode {
            SeedMode::RandomSpots => spots(seed),
            _ => Vec::new(),
        };

        let w = self.width as f32;
        let h = self.height as f32;
        let mut cells = Vec::with_capacity(self.width * self.height);

        for y in 0..self.height {
            for x in 0..self.width {
                // Cell centers, matching fragment coordinates
                let frag = (x as f32 + 0.5, y as f32 + 0.5);
                let uv = (frag.0 / w, frag.1 / h);
                let (u, v) = match spec.mode {
                    SeedMode::CenterSquare => {
                        let inside = (uv.0 - 0.5).abs() < CENTER_HALF_EXTENT
                            && (uv.1 - 0.5).abs() < CENTER_HALF_EXTENT;
                        let base = if inside { SEEDED } else { (1.0, 0.0) };
                        jitter(base, frag, seed)
                    }
                    SeedMode::RandomSpots => {
                        let inside = spots.iter().any(|spot| {
                            let dx = uv.0 - spot.center.0;
                            let dy = uv.1 - spot.center.1;
                            (dx * dx + dy * dy).sqrt() < spot.radius
                        });
                        let base = if inside { SEEDED } else { (1.0, 0.0) };
                        jitter(base, frag, seed)
                    }
                    SeedMode::RandomNoise => {
                        if hash(frag, seed) > 0.9 {
                            (
                                0.5 + (hash(offset(frag, 50.0), seed) - 0.5) * 0.5,
                                0.25 + (hash(offset(frag, 150.0), seed) - 0.5) * 0.1,
                            )
                        } else {
                            (1.0, 0.0)
                        }
                    }
                    SeedMode::Clear => (1.0, 0.0),
                };
                cells.push(Cell::new(u.clamp(0.0, 1.0), v.clamp(0.0, 1.0), 0.0));
            }
        }

        cells
    }
}

#[inline]
fn offset(p: (f32, f32), by: f32) -> (f32, f32) {
    (p.0 + by, p.1 + by)
}

#[inline]
fn jitter(base: (f32, f32), frag: (f32, f32), seed: f32) -> (f32, f32) {
    (
        base.0 + (hash(frag, seed) - 0.5) * JITTER,
        base.1 + (hash(offset(frag, 100.0), seed) - 0.5) * JITTER,
    )
}

fn spots(seed: f32) -> Vec<Spot> {
    (0..SPOT_COUNT)
        .map(|i| {
            let i = i as f32;
            Spot {
                center: (hash((i, 0.0), seed), hash((0.0, i), seed)),
                radius: 0.01 + hash((i, i), seed) * 0.03,
            }
        })
        .collect()
}

/// A decoded image resampled to grid resolution, stored as brightness.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSeed {
    width: usize,
    height: usize,
    /// Brightness in [0, 1], image row order (row 0 is the top of the image).
    brightness: Vec<f32>,
}

impl ImageSeed {
    /// Decode encoded image bytes (png or jpeg) and resample to `width` x `height`.
    pub fn from_bytes(bytes: &[u8], width: usize, height: usize) -> Result<Self, SeedError> {
        let img = image::load_from_memory(bytes)?;
        Ok(Self::from_image(&img.to_rgb8(), width, height))
    }

    /// Resample an already decoded image.
    pub fn from_image(img: &image::RgbImage, width: usize, height: usize) -> Self {
        let resized = imageops::resize(img, width as u32, height as u32, FilterType::Triangle);
        let brightness = resized
            .pixels()
            .map(|p| (p[0] as f32 + p[1] as f32 + p[2] as f32) / (3.0 * 255.0))
            .collect();
        Self {
            width,
            height,
            brightness,
        }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Grid cells for this image: `u = 1 - b/2`, `v = b/2`, no obstacles.
    ///
    /// The top image row lands on the top grid row.
    pub fn to_cells(&self) -> Vec<Cell> {
        let mut cells = Vec::with_capacity(self.brightness.len());
        for y in 0..self.height {
            let row = self.height - 1 - y;
            let start = row * self.width;
            for &b in &self.brightness[start..start + self.width] {
                cells.push(Cell::new(1.0 - 0.5 * b, 0.5 * b, 0.0));
            }
        }
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_in_unit_range() {
        for i in 0..500 {
            let p = (i as f32 * 0.37 + 0.5, i as f32 * 1.91 + 0.5);
            let h = hash(p, 12345.0);
            assert!((0.0..1.0).contains(&h), "hash {} out of range", h);
        }
    }

    #[test]
    fn test_seed_deterministic() {
        let seeder = Seeder::new(40, 30);
        for mode in [
            SeedMode::CenterSquare,
            SeedMode::RandomSpots,
            SeedMode::RandomNoise,
            SeedMode::Clear,
        ] {
            let spec = SeedSpec::new(mode, 777.0);
            assert_eq!(seeder.generate(spec), seeder.generate(spec));
        }
    }

    #[test]
    fn test_different_seed_values_differ() {
        let seeder = Seeder::new(40, 30);
        let a = seeder.generate(SeedSpec::new(SeedMode::RandomNoise, 1.0));
        let b = seeder.generate(SeedSpec::new(SeedMode::RandomNoise, 2.0));
        assert_ne!(a, b);
    }

    #[test]
    fn test_clear_is_exact_baseline() {
        let cells = Seeder::new(7, 3).generate(SeedSpec::new(SeedMode::Clear, 42.0));
        assert!(cells.iter().all(|&c| c == Cell::BASELINE));
    }

    #[test]
    fn test_center_square() {
        let cells = Seeder::new(100, 100).generate(SeedSpec::new(SeedMode::CenterSquare, 3.0));
        let center = cells[50 * 100 + 50];
        assert!((center.u - 0.5).abs() <= 0.005 + 1e-6);
        assert!((center.v - 0.25).abs() <= 0.005 + 1e-6);

        let corner = cells[0];
        assert!(corner.u >= 0.995 && corner.u <= 1.0);
        assert!(corner.v >= 0.0 && corner.v <= 0.005 + 1e-6);
        assert!(cells.iter().all(|c| c.obstacle == 0.0 && c.reserved == 1.0));
    }

    #[test]
    fn test_random_noise_sparse() {
        let cells = Seeder::new(128, 128).generate(SeedSpec::new(SeedMode::RandomNoise, 5.0));
        let seeded = cells.iter().filter(|&&c| c != Cell::BASELINE).count();
        // Roughly 10% of cells
        assert!(seeded > 0 && seeded < cells.len() / 4, "{} seeded", seeded);
        for c in cells.iter().filter(|&&c| c != Cell::BASELINE) {
            assert!((0.25..=0.75).contains(&c.u));
            assert!((0.2..=0.3).contains(&c.v));
        }
    }

    #[test]
    fn test_all_modes_in_range() {
        for mode in [SeedMode::CenterSquare, SeedMode::RandomSpots, SeedMode::RandomNoise] {
            let cells = Seeder::new(64, 48).generate(SeedSpec::new(mode, 99_999.0));
            for c in &cells {
                assert!((0.0..=1.0).contains(&c.u) && (0.0..=1.0).contains(&c.v));
            }
        }
    }

    #[test]
    fn test_image_seed_mapping() {
        // 2x2 image: top row white, bottom row black
        let img = image::RgbImage::from_fn(2, 2, |_, y| {
            if y == 0 {
                image::Rgb([255, 255, 255])
            } else {
                image::Rgb([0, 0, 0])
            }
        });
        let seed = ImageSeed::from_image(&img, 2, 2);
        let cells = seed.to_cells();

        // Grid row 1 is the top row
        assert_eq!(cells[2], Cell::new(0.5, 0.5, 0.0));
        assert_eq!(cells[3], Cell::new(0.5, 0.5, 0.0));
        assert_eq!(cells[0], Cell::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_image_seed_from_png_bytes() {
        let img = image::RgbImage::from_pixel(8, 8, image::Rgb([255, 255, 255]));
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();

        let seed = ImageSeed::from_bytes(&bytes, 4, 4).unwrap();
        assert_eq!(seed.dimensions(), (4, 4));
        assert!(seed.to_cells().iter().all(|c| (c.v - 0.5).abs() < 1e-6));
    }

    #[test]
    fn test_image_seed_rejects_garbage() {
        assert!(matches!(
            ImageSeed::from_bytes(b"not an image", 4, 4),
            Err(SeedError::Decode(_))
        ));
    }
}
