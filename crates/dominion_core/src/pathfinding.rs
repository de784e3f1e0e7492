//! A* pathfinding over a [`HexGrid`].
//!
//! Every edge costs 1 and the heuristic is hex distance, which is admissible
//! and consistent, so the first time the goal is popped the path is optimal.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

use crate::grid::HexGrid;
use crate::hex::HexCoord;

/// A node in the A* open set priority queue.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct AStarNode {
    coord: HexCoord,
    /// g + h
    f_score: i32,
    /// Heuristic component, preferred low on f ties (closer to goal first).
    h_score: i32,
}

impl Ord for AStarNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap, so comparisons are reversed for min-heap behavior.
        // Ties: lower h first, then lower coordinate in row-major order.
        other
            .f_score
            .cmp(&self.f_score)
            .then_with(|| other.h_score.cmp(&self.h_score))
            .then_with(|| other.coord.cmp(&self.coord))
    }
}

impl PartialOrd for AStarNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl HexGrid {
    /// Shortest path from `start` to `goal`, inclusive of both ends.
    ///
    /// Returns an empty path if either endpoint is outside the grid or the goal
    /// is unreachable. `start == goal` yields `[start]`.
    #[must_use]
    pub fn find_path(&self, start: HexCoord, goal: HexCoord) -> Vec<HexCoord> {
        find_path_where(self, start, goal, |_| true)
    }

    /// Shortest path that only steps onto hexes accepted by `passable`.
    ///
    /// The endpoints themselves must be passable.
    #[must_use]
    pub fn find_path_avoiding<F>(&self, start: HexCoord, goal: HexCoord, passable: F) -> Vec<HexCoord>
    where
        F: Fn(HexCoord) -> bool,
    {
        find_path_where(self, start, goal, passable)
    }
}

fn find_path_where<F>(grid: &HexGrid, start: HexCoord, goal: HexCoord, passable: F) -> Vec<HexCoord>
where
    F: Fn(HexCoord) -> bool,
{
    if !grid.contains(start) || !grid.contains(goal) {
        return Vec::new();
    }
    if !passable(start) || !passable(goal) {
        return Vec::new();
    }
    if start == goal {
        return vec![start];
    }

    let mut open_set = BinaryHeap::new();
    let mut came_from: BTreeMap<HexCoord, HexCoord> = BTreeMap::new();
    let mut g_score: BTreeMap<HexCoord, i32> = BTreeMap::new();

    let start_h = start.distance(goal);
    g_score.insert(start, 0);
    open_set.push(AStarNode {
        coord: start,
        f_score: start_h,
        h_score: start_h,
    });

    while let Some(current) = open_set.pop() {
        if current.coord == goal {
            return reconstruct_path(&came_from, goal);
        }

        let current_g = g_score.get(&current.coord).copied().unwrap_or(i32::MAX);
        // Stale heap entry superseded by a cheaper route
        if current.f_score - current.h_score > current_g {
            continue;
        }

        for &neighbor in grid.neighbors_of(current.coord) {
            if !passable(neighbor) {
                continue;
            }

            let tentative_g = current_g + 1;
            let neighbor_g = g_score.get(&neighbor).copied().unwrap_or(i32::MAX);

            if tentative_g < neighbor_g {
                came_from.insert(neighbor, current.coord);
                g_score.insert(neighbor, tentative_g);

                let h = neighbor.distance(goal);
                open_set.push(AStarNode {
                    coord: neighbor,
                    f_score: tentative_g + h,
                    h_score: h,
                });
            }
        }
    }

    Vec::new()
}

/// Reconstruct path from came_from map.
fn reconstruct_path(came_from: &BTreeMap<HexCoord, HexCoord>, goal: HexCoord) -> Vec<HexCoord> {
    let mut path = vec![goal];
    let mut current = goal;

    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }

    path.reverse();
    path
}
