//! Bounded hexagonal play area.
//!
//! A [`HexGrid`] of radius `N` contains every coordinate within `N` steps of
//! the origin (a hexagon, not a rectangle). Adjacency is precomputed once at
//! construction so boundary hexes simply have fewer neighbors.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::hex::{HexCoord, DIRECTION_COUNT};

/// Largest supported grid radius.
pub const MAX_RADIUS: u32 = 64;

/// The set of valid coordinates for a hexagonal map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "GridSpec", into = "GridSpec")]
pub struct HexGrid {
    radius: u32,
    /// In-grid neighbors of every coordinate, in direction order.
    adjacency: BTreeMap<HexCoord, Vec<HexCoord>>,
}

/// Serialized form of a grid; adjacency is rebuilt on load.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct GridSpec {
    radius: u32,
}

impl From<GridSpec> for HexGrid {
    fn from(spec: GridSpec) -> Self {
        Self::new(spec.radius)
    }
}

impl From<HexGrid> for GridSpec {
    fn from(grid: HexGrid) -> Self {
        Self {
            radius: grid.radius,
        }
    }
}

impl HexGrid {
    /// Build a grid of all hexes within `radius` of the origin.
    ///
    /// # Panics
    ///
    /// Panics if `radius` exceeds [`MAX_RADIUS`].
    #[must_use]
    pub fn new(radius: u32) -> Self {
        assert!(radius <= MAX_RADIUS, "HexGrid radius must be <= {MAX_RADIUS}");

        let n = radius as i32;
        let mut adjacency = BTreeMap::new();
        for q in -n..=n {
            let r_min = (-n).max(-q - n);
            let r_max = n.min(-q + n);
            for r in r_min..=r_max {
                adjacency.insert(HexCoord::new(q, r), Vec::with_capacity(DIRECTION_COUNT));
            }
        }

        let coords: Vec<HexCoord> = adjacency.keys().copied().collect();
        for coord in coords {
            let neighbors: Vec<HexCoord> = coord
                .neighbors()
                .into_iter()
                .filter(|n| n.length() <= radius as i32)
                .collect();
            adjacency.insert(coord, neighbors);
        }

        Self { radius, adjacency }
    }

    /// Grid radius.
    #[must_use]
    pub const fn radius(&self) -> u32 {
        self.radius
    }

    /// Number of hexes in the grid (`3N² + 3N + 1`).
    #[must_use]
    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    /// Whether the grid is empty. A grid always contains at least the origin.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Whether `(q, r)` lies inside the grid.
    #[must_use]
    pub fn is_valid(&self, q: i32, r: i32) -> bool {
        self.contains(HexCoord::new(q, r))
    }

    /// Whether `coord` lies inside the grid.
    #[must_use]
    pub fn contains(&self, coord: HexCoord) -> bool {
        self.adjacency.contains_key(&coord)
    }

    /// The coordinate at `(q, r)` if it lies inside the grid.
    #[must_use]
    pub fn get(&self, q: i32, r: i32) -> Option<HexCoord> {
        let coord = HexCoord::new(q, r);
        self.contains(coord).then_some(coord)
    }

    /// All coordinates in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = HexCoord> + '_ {
        self.adjacency.keys().copied()
    }

    /// In-grid neighbors of `coord`, in direction order. Empty if `coord` is outside.
    #[must_use]
    pub fn neighbors_of(&self, coord: HexCoord) -> &[HexCoord] {
        self.adjacency.get(&coord).map_or(&[], Vec::as_slice)
    }

    /// All in-grid coordinates within `range` steps of `center`, in row-major order.
    #[must_use]
    pub fn hexes_in_range(&self, center: HexCoord, range: u32) -> Vec<HexCoord> {
        let n = range as i32;
        let mut hexes = Vec::new();
        for dq in -n..=n {
            let dr_min = (-n).max(-dq - n);
            let dr_max = n.min(-dq + n);
            for dr in dr_min..=dr_max {
                let coord = center + HexCoord::new(dq, dr);
                if self.contains(coord) {
                    hexes.push(coord);
                }
            }
        }
        hexes.sort();
        hexes
    }

    /// Hexes at exactly `radius` steps from `center`, walking the ring edge by edge.
    ///
    /// The walk starts at `center + SW * radius` and follows the directions in
    /// order. Radius 0 yields `[center]`. Hexes outside the grid are skipped.
    #[must_use]
    pub fn ring(&self, center: HexCoord, radius: u32) -> Vec<HexCoord> {
        ring_unbounded(center, radius)
            .into_iter()
            .filter(|coord| self.contains(*coord))
            .collect()
    }

    /// Center followed by rings 1 through `radius`.
    #[must_use]
    pub fn spiral(&self, center: HexCoord, radius: u32) -> Vec<HexCoord> {
        (0..=radius).flat_map(|k| self.ring(center, k)).collect()
    }
}

/// The full ring around `center`, ignoring grid bounds.
#[must_use]
pub fn ring_unbounded(center: HexCoord, radius: u32) -> Vec<HexCoord> {
    if radius == 0 {
        return vec![center];
    }

    let steps = radius as i32;
    let mut hexes = Vec::with_capacity(DIRECTION_COUNT * radius as usize);
    let mut current = center + HexCoord::direction(4) * steps;
    for side in 0..DIRECTION_COUNT {
        for _ in 0..steps {
            hexes.push(current);
            current = current.neighbor(side);
        }
    }
    hexes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_size() {
        assert_eq!(HexGrid::new(0).len(), 1);
        assert_eq!(HexGrid::new(1).len(), 7);
        assert_eq!(HexGrid::new(3).len(), 37);
    }

    #[test]
    fn test_grid_is_hexagonal() {
        let grid = HexGrid::new(2);
        assert!(grid.is_valid(2, -2));
        assert!(grid.is_valid(-2, 0));
        // (2, 2) is inside a rectangle but three steps from the origin
        assert!(!grid.is_valid(2, 2));
        assert_eq!(grid.get(1, 1), Some(HexCoord::new(1, 1)));
        assert_eq!(grid.get(3, 0), None);
    }

    #[test]
    fn test_neighbor_boundary() {
        let grid = HexGrid::new(3);
        assert_eq!(grid.neighbors_of(HexCoord::ORIGIN).len(), 6);

        for coord in grid.ring(HexCoord::ORIGIN, 3) {
            assert!(grid.neighbors_of(coord).len() < 6, "edge hex {coord}");
        }
        // Corner hexes touch three in-grid cells
        assert_eq!(grid.neighbors_of(HexCoord::new(3, 0)).len(), 3);
        assert!(grid.neighbors_of(HexCoord::new(9, 9)).is_empty());
    }

    #[test]
    fn test_ring_zero_is_center() {
        let grid = HexGrid::new(2);
        let center = HexCoord::new(1, 0);
        assert_eq!(grid.ring(center, 0), vec![center]);
    }

    #[test]
    fn test_ring_walks_edges() {
        let grid = HexGrid::new(5);
        let ring = grid.ring(HexCoord::ORIGIN, 2);
        assert_eq!(ring.len(), 12);
        assert_eq!(ring[0], HexCoord::new(-2, 2));
        for window in ring.windows(2) {
            assert_eq!(window[0].distance(window[1]), 1);
        }
        for hex in &ring {
            assert_eq!(hex.distance(HexCoord::ORIGIN), 2);
        }
    }

    #[test]
    fn test_ring_clipped_by_grid() {
        let grid = HexGrid::new(2);
        let ring = grid.ring(HexCoord::new(2, 0), 1);
        assert!(ring.iter().all(|c| grid.contains(*c)));
        assert_eq!(ring.len(), 3);
    }

    #[test]
    fn test_hexes_in_range() {
        let grid = HexGrid::new(4);
        assert_eq!(grid.hexes_in_range(HexCoord::ORIGIN, 1).len(), 7);
        assert_eq!(grid.hexes_in_range(HexCoord::ORIGIN, 2).len(), 19);

        // Near the edge, out-of-grid hexes are dropped
        let edge = grid.hexes_in_range(HexCoord::new(4, 0), 1);
        assert_eq!(edge.len(), 4);
        assert!(edge.iter().all(|c| c.distance(HexCoord::new(4, 0)) <= 1));
    }

    #[test]
    fn test_spiral_covers_grid() {
        let grid = HexGrid::new(3);
        let spiral = grid.spiral(HexCoord::ORIGIN, 3);
        assert_eq!(spiral.len(), grid.len());
        assert_eq!(spiral[0], HexCoord::ORIGIN);
    }

    #[test]
    fn test_grid_serde_rebuilds_adjacency() {
        let grid = HexGrid::new(2);
        let text = ron::to_string(&grid).unwrap();
        let restored: HexGrid = ron::from_str(&text).unwrap();
        assert_eq!(grid, restored);
    }
}
