//! Fixed-bin histograms over cluster colors and surface normals.

use crate::color::{convert_color, ColorSpace};
use nalgebra::{Point3, Vector3};

/// Count `values` into `bins` equal-width bins over `[lo, hi]`.
/// Values outside the range are ignored; `hi` itself lands in the last bin.
pub fn histogram<I>(values: I, bins: usize, lo: f32, hi: f32) -> Vec<f32>
where
    I: IntoIterator<Item = f32>,
{
    let mut hist = vec![0.0; bins];
    if bins == 0 || hi <= lo {
        return hist;
    }

    let scale = bins as f32 / (hi - lo);
    for v in values {
        if !(lo..=hi).contains(&v) {
            continue;
        }
        let bin = (((v - lo) * scale) as usize).min(bins - 1);
        hist[bin] += 1.0;
    }
    hist
}

/// Scale `features` in place to sum to one. All-zero input is left alone.
pub fn normalize_sum(features: &mut [f32]) {
    let sum: f32 = features.iter().sum();
    if sum > 0.0 {
        for v in features.iter_mut() {
            *v /= sum;
        }
    }
}

/// Per-channel color histograms, concatenated and normalized. Length `3 * bins`.
pub fn compute_color_histograms(colors: &[Point3<f32>], bins: usize, space: ColorSpace) -> Vec<f32> {
    let converted: Vec<Point3<f32>> = colors.iter().map(|c| convert_color(c, space)).collect();

    let mut features = Vec::with_capacity(3 * bins);
    for channel in 0..3 {
        features.extend(histogram(converted.iter().map(|c| c[channel]), bins, 0.0, 1.0));
    }
    normalize_sum(&mut features);
    features
}

/// Histograms of the x, y and z normal components over `[-1, 1]`. Length `3 * bins`.
pub fn compute_normal_histograms(normals: &[Vector3<f32>], bins: usize) -> Vec<f32> {
    let mut features = Vec::with_capacity(3 * bins);
    for axis in 0..3 {
        features.extend(histogram(normals.iter().map(|n| n[axis]), bins, -1.0, 1.0));
    }
    normalize_sum(&mut features);
    features
}
