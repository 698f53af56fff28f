//! Uniform-level quantization of a random parameter matrix and the 2-D PCA
//! projection used by the quantization scatter figure.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

const POWER_ITERATIONS: usize = 500;
const CONVERGENCE: f64 = 1e-12;

#[derive(Debug, Clone)]
pub struct QuantizationParams {
    pub n_points: usize,
    pub dim: usize,
    pub seed: u64,
    pub initial_levels: usize,
    pub lower_levels: Vec<usize>,
}

impl Default for QuantizationParams {
    fn default() -> Self {
        Self {
            n_points: 4,
            dim: 10,
            seed: 42,
            initial_levels: 64,
            lower_levels: vec![32, 16, 8, 4],
        }
    }
}

/// 2-D coordinates of the initial points and of each lower-precision copy.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantizationProjection {
    pub initial: Vec<(f64, f64)>,
    pub lowered: Vec<(usize, Vec<(f64, f64)>)>,
}

/// `n` rows of `dim` samples drawn uniformly from `[-1, 1)`.
pub fn uniform_samples(n: usize, dim: usize, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| (0..dim).map(|_| rng.random_range(-1.0..1.0)).collect())
        .collect()
}

/// `levels` evenly spaced values from `min` to `max` inclusive.
pub fn bin_edges(min: f64, max: f64, levels: usize) -> Vec<f64> {
    match levels {
        0 => Vec::new(),
        1 => vec![min],
        _ => {
            let step = (max - min) / (levels - 1) as f64;
            (0..levels).map(|i| min + step * i as f64).collect()
        }
    }
}

/// Snap every entry onto `levels` edges spanning the matrix range. An entry
/// maps to the largest edge strictly below it; the minimum maps to itself.
pub fn quantize(data: &[Vec<f64>], levels: usize) -> Vec<Vec<f64>> {
    let (min, max) = data
        .iter()
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    let edges = bin_edges(min, max, levels);
    if edges.is_empty() || !min.is_finite() {
        return data.to_vec();
    }
    data.iter()
        .map(|row| {
            row.iter()
                .map(|value| {
                    let below = edges.partition_point(|edge| edge < value);
                    edges[below.saturating_sub(1).min(edges.len() - 1)]
                })
                .collect()
        })
        .collect()
}

fn column_means(rows: &[Vec<f64>]) -> Vec<f64> {
    let dim = rows.first().map_or(0, Vec::len);
    let mut means = vec![0.0; dim];
    for row in rows {
        for (mean, value) in means.iter_mut().zip(row) {
            *mean += value;
        }
    }
    let n = rows.len().max(1) as f64;
    means.iter_mut().for_each(|mean| *mean /= n);
    means
}

fn covariance(rows: &[Vec<f64>], means: &[f64]) -> Vec<Vec<f64>> {
    let dim = means.len();
    let mut cov = vec![vec![0.0; dim]; dim];
    for row in rows {
        for i in 0..dim {
            let di = row[i] - means[i];
            for j in i..dim {
                cov[i][j] += di * (row[j] - means[j]);
            }
        }
    }
    let denom = rows.len().saturating_sub(1).max(1) as f64;
    for i in 0..dim {
        for j in i..dim {
            cov[i][j] /= denom;
            cov[j][i] = cov[i][j];
        }
    }
    cov
}

fn mat_vec(matrix: &[Vec<f64>], v: &[f64]) -> Vec<f64> {
    matrix.iter().map(|row| dot(row, v)).collect()
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn normalize(v: &mut [f64]) -> bool {
    let norm = dot(v, v).sqrt();
    if norm <= f64::EPSILON {
        return false;
    }
    v.iter_mut().for_each(|x| *x /= norm);
    true
}

fn orthogonalize(v: &mut [f64], basis: &[Vec<f64>]) {
    for b in basis {
        let proj = dot(v, b);
        v.iter_mut().zip(b).for_each(|(x, y)| *x -= proj * y);
    }
}

/// Unit vector orthogonal to `basis`, taken from the standard basis.
fn fallback_direction(dim: usize, basis: &[Vec<f64>]) -> Vec<f64> {
    for axis in 0..dim {
        let mut v = vec![0.0; dim];
        v[axis] = 1.0;
        orthogonalize(&mut v, basis);
        if normalize(&mut v) {
            return v;
        }
    }
    vec![0.0; dim]
}

/// Top `k` principal axes of the rows, by power iteration with deflation.
/// Each axis is signed so its largest-magnitude entry is positive.
pub fn principal_components(rows: &[Vec<f64>], k: usize) -> Vec<Vec<f64>> {
    let means = column_means(rows);
    let dim = means.len();
    let mut cov = covariance(rows, &means);
    let mut components: Vec<Vec<f64>> = Vec::with_capacity(k);

    for _ in 0..k.min(dim) {
        // Start from the heaviest column so the start is never orthogonal to
        // a dominant axis.
        let mut v = cov
            .iter()
            .max_by(|a, b| dot(a, a).total_cmp(&dot(b, b)))
            .cloned()
            .unwrap_or_default();
        orthogonalize(&mut v, &components);
        if !normalize(&mut v) {
            v = fallback_direction(dim, &components);
        }

        for _ in 0..POWER_ITERATIONS {
            let mut next = mat_vec(&cov, &v);
            orthogonalize(&mut next, &components);
            if !normalize(&mut next) {
                break;
            }
            let delta: f64 = next.iter().zip(&v).map(|(a, b)| (a - b).abs()).sum();
            v = next;
            if delta < CONVERGENCE {
                break;
            }
        }

        let lambda = dot(&v, &mat_vec(&cov, &v));
        for i in 0..dim {
            for j in 0..dim {
                cov[i][j] -= lambda * v[i] * v[j];
            }
        }
        let flip = v
            .iter()
            .copied()
            .max_by(|a, b| a.abs().total_cmp(&b.abs()))
            .is_some_and(|largest| largest < 0.0);
        if flip {
            v.iter_mut().for_each(|x| *x = -*x);
        }
        debug!(component = components.len(), variance = lambda, "principal component");
        components.push(v);
    }
    components
}

/// Project mean-centered rows onto the first two principal axes.
pub fn pca_2d(rows: &[Vec<f64>]) -> Vec<(f64, f64)> {
    let means = column_means(rows);
    let components = principal_components(rows, 2);
    let axis = |idx: usize| components.get(idx).cloned().unwrap_or_else(|| vec![0.0; means.len()]);
    let (first, second) = (axis(0), axis(1));
    rows.iter()
        .map(|row| {
            let centered: Vec<f64> = row.iter().zip(&means).map(|(v, m)| v - m).collect();
            (dot(&centered, &first), dot(&centered, &second))
        })
        .collect()
}

/// Quantize the seeded matrix at every precision and project all copies
/// into one shared PCA plane.
pub fn quantization_projection(params: &QuantizationParams) -> QuantizationProjection {
    let data = uniform_samples(params.n_points, params.dim, params.seed);
    let mut stacked = quantize(&data, params.initial_levels);
    for levels in &params.lower_levels {
        stacked.extend(quantize(&data, *levels));
    }

    let projected = pca_2d(&stacked);
    let mut chunks = projected.chunks(params.n_points.max(1));
    let initial = chunks.next().map(<[_]>::to_vec).unwrap_or_default();
    let lowered = params
        .lower_levels
        .iter()
        .zip(chunks)
        .map(|(levels, chunk)| (*levels, chunk.to_vec()))
        .collect();
    QuantizationProjection { initial, lowered }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn samples_are_seeded_and_bounded() {
        let a = uniform_samples(4, 10, 42);
        let b = uniform_samples(4, 10, 42);
        assert_eq!(a, b);
        assert_ne!(a, uniform_samples(4, 10, 7));
        assert!(a.iter().flatten().all(|v| (-1.0..1.0).contains(v)));
        assert_eq!(a.len(), 4);
        assert_eq!(a[0].len(), 10);
    }

    #[test]
    fn bin_edges_span_the_range() {
        assert_eq!(bin_edges(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(bin_edges(2.0, 3.0, 1), vec![2.0]);
        assert!(bin_edges(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn quantize_rounds_down_to_edges() {
        let data = vec![vec![0.0, 0.3, 0.5], vec![0.74, 0.76, 1.0]];
        let q = quantize(&data, 5);
        assert_eq!(q, vec![vec![0.0, 0.25, 0.25], vec![0.5, 0.75, 0.75]]);
    }

    #[test]
    fn quantized_values_are_bin_edges() {
        let data = uniform_samples(4, 10, 42);
        let (min, max) = data
            .iter()
            .flatten()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
        for levels in [64, 8, 4] {
            let edges = bin_edges(min, max, levels);
            for value in quantize(&data, levels).iter().flatten() {
                assert!(edges.contains(value));
            }
        }
    }

    #[test]
    fn components_are_orthonormal() {
        let data = uniform_samples(20, 6, 3);
        let components = principal_components(&data, 2);
        assert_eq!(components.len(), 2);
        assert_relative_eq!(dot(&components[0], &components[0]), 1.0, epsilon = 1e-9);
        assert_relative_eq!(dot(&components[1], &components[1]), 1.0, epsilon = 1e-9);
        assert_relative_eq!(dot(&components[0], &components[1]), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn first_component_follows_the_dominant_axis() {
        let rows: Vec<Vec<f64>> = (0..10)
            .map(|i| {
                let t = i as f64;
                vec![3.0 * t, 0.1 * (i % 2) as f64, 0.0]
            })
            .collect();
        let components = principal_components(&rows, 2);
        assert_relative_eq!(components[0][0], 1.0, epsilon = 1e-3);
        let projected = pca_2d(&rows);
        assert!(projected[9].0 > projected[0].0);
        let mean_first: f64 = projected.iter().map(|p| p.0).sum::<f64>() / projected.len() as f64;
        assert_relative_eq!(mean_first, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn projection_groups_points_by_precision() {
        let params = QuantizationParams::default();
        let result = quantization_projection(&params);
        assert_eq!(result.initial.len(), params.n_points);
        assert_eq!(result.lowered.len(), params.lower_levels.len());
        assert_eq!(result.lowered[0].0, 32);
        assert!(result.lowered.iter().all(|(_, points)| points.len() == params.n_points));
        assert_eq!(result, quantization_projection(&params));
    }
}
