use nalgebra::Point3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DEFAULT_SEED: u64 = 0x5eed_c010;

/// Display colors for clusters, indexed by cluster position.
///
/// The palette only grows: asking for index `i` extends it to `i + 1` colors
/// if needed, and the color at an index never changes once drawn. Colors come
/// from a seeded generator, so two palettes with the same seed agree.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    colors: Vec<Point3<f32>>,
    rng: StdRng,
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }
}

impl ColorPalette {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            colors: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Grow to at least `count` colors.
    pub fn ensure(&mut self, count: usize) {
        while self.colors.len() < count {
            let [r, g, b]: [u8; 3] = self.rng.gen();
            self.colors.push(Point3::new(
                r as f32 / 255.0,
                g as f32 / 255.0,
                b as f32 / 255.0,
            ));
        }
    }

    pub fn color(&mut self, index: usize) -> Point3<f32> {
        self.ensure(index + 1);
        self.colors[index]
    }

    /// The first `count` colors.
    pub fn colors(&mut self, count: usize) -> &[Point3<f32>] {
        self.ensure(count);
        &self.colors[..count]
    }
}
