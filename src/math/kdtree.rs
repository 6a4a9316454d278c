//! A static 3-D kd-tree for nearest-point lookup.
//!
//! Ties in distance resolve to the point with the lowest input index, so
//! the answer never depends on tree shape.

use nalgebra::Point3;

use crate::domain::DistanceMetric;

impl DistanceMetric {
    /// Distance in the metric's comparison units (squared for Euclidean).
    pub fn distance(self, a: &Point3<f64>, b: &Point3<f64>) -> f64 {
        match self {
            DistanceMetric::Euclidean => nalgebra::distance_squared(a, b),
            DistanceMetric::Manhattan => (a - b).iter().map(|d| d.abs()).sum(),
        }
    }

    /// Lower bound on the distance to any point across a splitting plane `diff` away.
    fn plane_bound(self, diff: f64) -> f64 {
        match self {
            DistanceMetric::Euclidean => diff * diff,
            DistanceMetric::Manhattan => diff.abs(),
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    point: usize,
    axis: usize,
    left: Option<usize>,
    right: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct KdTree {
    points: Vec<Point3<f64>>,
    nodes: Vec<Node>,
    root: Option<usize>,
    metric: DistanceMetric,
}

impl KdTree {
    pub fn build(points: Vec<Point3<f64>>, metric: DistanceMetric) -> Self {
        let mut order: Vec<usize> = (0..points.len()).collect();
        let mut nodes = Vec::with_capacity(points.len());
        let root = build_node(&points, &mut order, 0, &mut nodes);
        Self {
            points,
            nodes,
            root,
            metric,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Input index of the nearest point, or `None` for an empty tree.
    pub fn nearest(&self, query: &Point3<f64>) -> Option<usize> {
        let mut best: Option<(f64, usize)> = None;
        if let Some(root) = self.root {
            self.search(root, query, &mut best);
        }
        best.map(|(_, idx)| idx)
    }

    fn search(&self, node_idx: usize, query: &Point3<f64>, best: &mut Option<(f64, usize)>) {
        let node = &self.nodes[node_idx];
        let point = &self.points[node.point];

        let d = self.metric.distance(query, point);
        let better = match *best {
            None => true,
            Some((bd, bi)) => d < bd || (d == bd && node.point < bi),
        };
        if better {
            *best = Some((d, node.point));
        }

        let diff = query[node.axis] - point[node.axis];
        let (near, far) = if diff < 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        if let Some(n) = near {
            self.search(n, query, best);
        }
        // Visit on equality too: an equidistant point may carry a lower index.
        if let Some(f) = far {
            let within = match *best {
                None => true,
                Some((bd, _)) => self.metric.plane_bound(diff) <= bd,
            };
            if within {
                self.search(f, query, best);
            }
        }
    }
}

fn build_node(points: &[Point3<f64>], order: &mut [usize], depth: usize, nodes: &mut Vec<Node>) -> Option<usize> {
    if order.is_empty() {
        return None;
    }
    let axis = depth % 3;
    order.sort_by(|&a, &b| points[a][axis].total_cmp(&points[b][axis]).then(a.cmp(&b)));

    let mid = order.len() / 2;
    let point = order[mid];
    let (left_half, rest) = order.split_at_mut(mid);
    let right_half = &mut rest[1..];

    let left = build_node(points, left_half, depth + 1, nodes);
    let right = build_node(points, right_half, depth + 1, nodes);

    nodes.push(Node {
        point,
        axis,
        left,
        right,
    });
    Some(nodes.len() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute_force(points: &[Point3<f64>], q: &Point3<f64>, metric: DistanceMetric) -> usize {
        let mut best = 0;
        for (i, p) in points.iter().enumerate() {
            if metric.distance(q, p) < metric.distance(q, &points[best]) {
                best = i;
            }
        }
        best
    }

    fn lattice() -> Vec<Point3<f64>> {
        let mut pts = Vec::new();
        for a in 0..7 {
            for t in 0..5 {
                for s in [-0.5, 0.5] {
                    pts.push(Point3::new(a as f64 * 0.37, 1990.0 + t as f64 * 2.5, s));
                }
            }
        }
        pts
    }

    #[test]
    fn agrees_with_brute_force() {
        let points = lattice();
        for metric in [DistanceMetric::Euclidean, DistanceMetric::Manhattan] {
            let tree = KdTree::build(points.clone(), metric);
            for k in 0..40 {
                let q = Point3::new(k as f64 * 0.071, 1988.0 + k as f64 * 0.61, (k % 3) as f64 * 0.5 - 0.5);
                assert_eq!(tree.nearest(&q), Some(brute_force(&points, &q, metric)), "query {k}");
            }
        }
    }

    #[test]
    fn ties_resolve_to_first_seen() {
        // Both points are exactly 1.0 away from the query; index 0 must win
        // regardless of which one the tree visits first.
        let points = vec![Point3::new(2.0, 0.0, 0.0), Point3::new(0.0, 0.0, 0.0)];
        let tree = KdTree::build(points, DistanceMetric::Euclidean);
        assert_eq!(tree.nearest(&Point3::new(1.0, 0.0, 0.0)), Some(0));

        let dup = vec![Point3::new(1.0, 1.0, 1.0); 4];
        let tree = KdTree::build(dup, DistanceMetric::Manhattan);
        assert_eq!(tree.nearest(&Point3::new(1.0, 1.0, 1.0)), Some(0));
    }

    #[test]
    fn empty_tree_has_no_nearest() {
        let tree = KdTree::build(Vec::new(), DistanceMetric::Euclidean);
        assert!(tree.is_empty());
        assert_eq!(tree.nearest(&Point3::origin()), None);
    }
}
