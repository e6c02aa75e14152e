use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Color space the color histogram is computed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpace {
    Rgb,
    #[default]
    Hsv,
}

/// RGB in `[0, 1]` to HSV in `[0, 1]` (hue as a fraction of a turn).
pub fn rgb_to_hsv(rgb: &Point3<f32>) -> Point3<f32> {
    let (r, g, b) = (
        rgb.x.clamp(0.0, 1.0),
        rgb.y.clamp(0.0, 1.0),
        rgb.z.clamp(0.0, 1.0),
    );
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let v = max;
    let s = if max > 0.0 { delta / max } else { 0.0 };

    let h = if delta <= 0.0 {
        0.0
    } else if max == r {
        ((g - b) / delta).rem_euclid(6.0) / 6.0
    } else if max == g {
        ((b - r) / delta + 2.0) / 6.0
    } else {
        ((r - g) / delta + 4.0) / 6.0
    };

    Point3::new(h, s, v)
}

/// Convert `rgb` into `space`. Channels stay in `[0, 1]`.
pub fn convert_color(rgb: &Point3<f32>, space: ColorSpace) -> Point3<f32> {
    match space {
        ColorSpace::Rgb => *rgb,
        ColorSpace::Hsv => rgb_to_hsv(rgb),
    }
}
