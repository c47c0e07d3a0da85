//! Summary statistics of root-to-leaf distances within a subtree.

use crate::model::{AnnotationValue, GeneTree, VertexIndex};

/// Relative tolerance under which the variance counts as zero.
const VARIANCE_RESOLUTION: f64 = 1e-15;

/// Statistics of the distances from a subtree root to each of its leaves.
///
/// `width` is the farthest-leaf distance. `kurt` is the population excess
/// kurtosis and `skew` the Fisher-Pearson skewness; both are NaN when all
/// distances are equal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchStats {
    pub leafno: usize,
    pub median: f64,
    pub mean: f64,
    pub width: f64,
    pub sum: f64,
    pub kurt: f64,
    pub skew: f64,
}

impl BranchStats {
    /// Computes the statistics of a non-empty list of distances.
    ///
    /// An empty list yields NaN everywhere and `leafno == 0`.
    ///
    /// # Example
    /// ```
    /// # use cladenorm::analysis::BranchStats;
    /// let stats = BranchStats::from_distances(&[1.0, 2.0, 3.0, 10.0]);
    /// assert_eq!(stats.median, 2.5);
    /// assert_eq!(stats.mean, 4.0);
    /// assert_eq!(stats.width, 10.0);
    /// assert_eq!(stats.sum, 16.0);
    /// ```
    pub fn from_distances(distances: &[f64]) -> Self {
        let n = distances.len();
        let sum: f64 = distances.iter().sum();
        let mean = sum / n as f64;
        let width = distances.iter().copied().fold(f64::NAN, f64::max);

        let central_moment = |k: i32| distances.iter().map(|d| (d - mean).powi(k)).sum::<f64>() / n as f64;
        let m2 = central_moment(2);
        let m3 = central_moment(3);
        let m4 = central_moment(4);

        let (kurt, skew) = if m2 <= (VARIANCE_RESOLUTION * mean).powi(2) {
            (f64::NAN, f64::NAN)
        } else {
            (m4 / (m2 * m2) - 3.0, m3 / m2.powf(1.5))
        };

        BranchStats {
            leafno: n,
            median: median(distances),
            mean,
            width,
            sum,
            kurt,
            skew,
        }
    }

    /// Returns the fields as `(name, value)` pairs, names prefixed with `prefix`.
    pub fn fields(&self, prefix: &str) -> Vec<(String, AnnotationValue)> {
        vec![
            (format!("{prefix}leafno"), self.leafno.into()),
            (format!("{prefix}median"), self.median.into()),
            (format!("{prefix}mean"), self.mean.into()),
            (format!("{prefix}width"), self.width.into()),
            (format!("{prefix}sum"), self.sum.into()),
            (format!("{prefix}kurt"), self.kurt.into()),
            (format!("{prefix}skew"), self.skew.into()),
        ]
    }
}

/// Computes [BranchStats] over the distances from `vertex` to each leaf below it.
pub fn branch_stats(tree: &GeneTree, vertex: VertexIndex) -> BranchStats {
    let distances: Vec<f64> = tree
        .leaf_distances_from(vertex)
        .into_iter()
        .map(|(_, dist)| dist)
        .collect();
    BranchStats::from_distances(&distances)
}

/// Median with the mean of the two central values for even counts.
fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::newick::parse_str;

    #[test]
    fn test_single_leaf() {
        let stats = BranchStats::from_distances(&[0.7]);
        assert_eq!(stats.leafno, 1);
        assert_eq!(stats.median, 0.7);
        assert_eq!(stats.mean, 0.7);
        assert_eq!(stats.width, 0.7);
        assert_eq!(stats.sum, 0.7);
        assert!(stats.kurt.is_nan());
        assert!(stats.skew.is_nan());
    }

    #[test]
    fn test_moments() {
        // Population moments of 1, 2, 3, 10: mean 4, m2 12.5, m3 45, m4 ~344.5
        let stats = BranchStats::from_distances(&[1.0, 2.0, 3.0, 10.0]);
        let m2: f64 = 12.5;
        let m3: f64 = (27.0 + 8.0 + 1.0) * -1.0 / 4.0 + 216.0 / 4.0;
        let m4: f64 = (81.0 + 16.0 + 1.0 + 1296.0) / 4.0;
        assert!((stats.skew - m3 / m2.powf(1.5)).abs() < 1e-12);
        assert!((stats.kurt - (m4 / (m2 * m2) - 3.0)).abs() < 1e-12);
    }

    #[test]
    fn test_symmetric_distances_have_zero_skew() {
        let stats = BranchStats::from_distances(&[1.0, 2.0, 3.0]);
        assert!(stats.skew.abs() < 1e-12);
        assert!((stats.kurt - (-1.5)).abs() < 1e-12);
    }

    #[test]
    fn test_branch_stats_measures_from_subtree_root() {
        let tree = parse_str("((a:1,b:3)x:100,c:1);").unwrap();
        let x = tree.pre_order_iter().find(|v| v.name() == Some("x")).unwrap().index();
        let stats = branch_stats(&tree, x);
        assert_eq!(stats.leafno, 2);
        assert_eq!(stats.width, 3.0);
        assert_eq!(stats.median, 2.0);
    }

    #[test]
    fn test_fields_are_prefixed() {
        let names: Vec<String> = BranchStats::from_distances(&[1.0])
            .fields("norm_")
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names[0], "norm_leafno");
        assert_eq!(names.len(), 7);
    }
}
