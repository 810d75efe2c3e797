//! Piecewise linear function through a sorted list of points.

/// A monotonic non-decreasing piecewise linear function.
///
/// Consecutive points may share their `x`, which makes a vertical jump. Querying exactly at such
/// `x` resolves to the highest `y` of the jump.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Graph {
    points: Vec<(f64, f64)>,
    lead_slope: f64,
    tail_slope: f64,
}

impl Graph {
    /// Creates a graph from `points` sorted by `x`.
    ///
    /// Queries before the first point are extrapolated with `lead_slope`, and the ones after the
    /// last point with `tail_slope`.
    pub(crate) fn new(points: Vec<(f64, f64)>, lead_slope: f64, tail_slope: f64) -> Self {
        debug_assert!(points.is_sorted_by(|a, b| a.0 <= b.0));
        Self {
            points,
            lead_slope,
            tail_slope,
        }
    }

    /// Creates the inverse graph by swapping the axes of every point.
    pub(crate) fn inverted(&self) -> Self {
        Self {
            points: self.points.iter().map(|&(x, y)| (y, x)).collect(),
            lead_slope: self.lead_slope.recip(),
            tail_slope: self.tail_slope.recip(),
        }
    }

    pub(crate) fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Evaluates the function at `x` in `O(log n)`.
    pub(crate) fn query(&self, x: f64) -> f64 {
        let index = self.points.partition_point(|&(px, _)| px <= x);
        let before = index.checked_sub(1).and_then(|i| self.points.get(i));
        match (before, self.points.get(index)) {
            (Some(&(x0, y0)), Some(&(x1, y1))) => y0 + (x - x0) * (y1 - y0) / (x1 - x0),
            (Some(&(x0, y0)), None) => y0 + (x - x0) * self.tail_slope,
            (None, Some(&(x1, y1))) => y1 + (x - x1) * self.lead_slope,
            (None, None) => x * self.lead_slope,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_and_extrapolate() {
        let graph = Graph::new(vec![(0.0, 0.0), (2.0, 4.0), (3.0, 4.0)], 2.0, 1.0);
        assert_eq!(graph.query(1.0), 2.0);
        assert_eq!(graph.query(2.5), 4.0);
        assert_eq!(graph.query(-1.0), -2.0);
        assert_eq!(graph.query(5.0), 6.0);
    }

    #[test]
    fn test_vertical_jump_takes_highest() {
        let graph = Graph::new(vec![(0.0, 0.0), (1.0, 1.0), (1.0, 3.0), (2.0, 4.0)], 1.0, 1.0);
        assert_eq!(graph.query(1.0), 3.0);
        assert_eq!(graph.query(0.5), 0.5);
        assert_eq!(graph.query(1.5), 3.5);

        let inverse = graph.inverted();
        assert_eq!(inverse.query(2.0), 1.0);
        assert_eq!(inverse.query(3.5), 1.5);
    }
}
