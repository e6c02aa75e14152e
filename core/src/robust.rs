//! Robust Estimation Module
//!
//! Generic RANSAC engine used for model fitting under outliers. The plane
//! segmenter is its main client.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::marker::PhantomData;

/// Configuration for robust estimation
#[derive(Debug, Clone)]
pub struct RobustConfig {
    /// Maximum model error for a sample to count as an inlier (inclusive).
    pub threshold: f64,
    pub max_iterations: usize,
    /// Probability of having drawn at least one outlier-free sample; drives early termination.
    pub confidence: f64,
    /// Fixed seed for reproducible sampling. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for RobustConfig {
    fn default() -> Self {
        Self {
            threshold: 1.0,
            max_iterations: 1000,
            confidence: 0.99,
            seed: None,
        }
    }
}

/// Result of robust estimation
#[derive(Debug, Clone)]
pub struct RobustResult<M> {
    pub model: Option<M>,
    pub inliers: Vec<bool>,
    pub num_inliers: usize,
    pub residual: f64,
    pub iterations: usize,
}

impl<M> RobustResult<M> {
    fn empty(n: usize) -> Self {
        Self {
            model: None,
            inliers: vec![false; n],
            num_inliers: 0,
            residual: f64::INFINITY,
            iterations: 0,
        }
    }

    pub fn inlier_indices(&self) -> Vec<usize> {
        self.inliers
            .iter()
            .enumerate()
            .filter(|(_, &is_inlier)| is_inlier)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Trait for models that can be estimated robustly
pub trait RobustModel<D> {
    type Model: Clone;

    /// Minimum number of data points required to estimate the model
    fn min_sample_size(&self) -> usize;

    /// Estimate model from a minimal sample. `None` for degenerate samples.
    fn estimate(&self, data: &[&D]) -> Option<Self::Model>;

    /// Compute error for a single data point against the model
    fn compute_error(&self, model: &Self::Model, data: &D) -> f64;
}

/// Generic RANSAC engine
pub struct Ransac<D, M: RobustModel<D>> {
    config: RobustConfig,
    _phantom: PhantomData<(D, M)>,
}

impl<D, M: RobustModel<D>> Ransac<D, M> {
    pub fn new(config: RobustConfig) -> Self {
        Self {
            config,
            _phantom: PhantomData,
        }
    }

    pub fn config(&self) -> &RobustConfig {
        &self.config
    }

    pub fn run(&self, estimator: &M, data: &[D]) -> RobustResult<M::Model> {
        let n = data.len();
        let k = estimator.min_sample_size();

        if n < k || k == 0 {
            return RobustResult::empty(n);
        }

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut best = RobustResult::empty(n);
        let mut required = self.config.max_iterations;
        let mut iteration = 0;

        while iteration < required {
            iteration += 1;

            let sample: Vec<&D> = rand::seq::index::sample(&mut rng, n, k)
                .iter()
                .map(|i| &data[i])
                .collect();

            let Some(model) = estimator.estimate(&sample) else {
                continue;
            };

            let mut inliers = vec![false; n];
            let mut num_inliers = 0;
            let mut total_error = 0.0;

            for (j, d) in data.iter().enumerate() {
                let err = estimator.compute_error(&model, d);
                if err <= self.config.threshold {
                    inliers[j] = true;
                    num_inliers += 1;
                    total_error += err;
                }
            }

            let residual = if num_inliers > 0 {
                total_error / num_inliers as f64
            } else {
                f64::INFINITY
            };

            if num_inliers > best.num_inliers
                || (num_inliers == best.num_inliers && num_inliers > 0 && residual < best.residual)
            {
                best.model = Some(model);
                best.inliers = inliers;
                best.num_inliers = num_inliers;
                best.residual = residual;

                required = required.min(self.required_iterations(num_inliers, n, k));
            }
        }

        best.iterations = iteration;
        best
    }

    /// Iterations needed to hit `confidence` given the current inlier ratio.
    fn required_iterations(&self, num_inliers: usize, n: usize, k: usize) -> usize {
        let ratio = num_inliers as f64 / n as f64;
        let p_good = ratio.powi(k as i32);
        if p_good >= 1.0 {
            return 1;
        }
        if p_good <= f64::EPSILON {
            return self.config.max_iterations;
        }

        let needed = (1.0 - self.config.confidence).ln() / (1.0 - p_good).ln();
        if needed.is_finite() && needed > 0.0 {
            (needed.ceil() as usize).min(self.config.max_iterations)
        } else {
            self.config.max_iterations
        }
    }
}
