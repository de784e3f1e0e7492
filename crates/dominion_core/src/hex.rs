//! Cube-coordinate hex math.
//!
//! Coordinates are stored in axial form `(q, r)`; the third cube component
//! is always derived as `s = -q - r`, so the `q + r + s == 0` invariant holds
//! by construction for every [`HexCoord`] that exists.
//!
//! # Direction order
//!
//! Directions are numbered counter-clockwise starting East:
//!
//! | index | name | offset `(q, r)` |
//! |---|---|---|
//! | 0 | East | `(+1, 0)` |
//! | 1 | Northeast | `(+1, -1)` |
//! | 2 | Northwest | `(0, -1)` |
//! | 3 | West | `(-1, 0)` |
//! | 4 | Southwest | `(-1, +1)` |
//! | 5 | Southeast | `(0, +1)` |
//!
//! # Pixel layout
//!
//! Pixel conversions use a pointy-top orientation with y growing downwards.
//! Corner `i` of a hex sits at angle `60° * i - 30°`.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::{fixed_serde, sqrt3, Fixed, Point};

/// Number of neighbors of a hex.
pub const DIRECTION_COUNT: usize = 6;

/// A hex cell address in cube coordinates (stored axially).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct HexCoord {
    /// Column axis.
    pub q: i32,
    /// Row axis.
    pub r: i32,
}

impl HexCoord {
    /// The origin hex.
    pub const ORIGIN: Self = Self { q: 0, r: 0 };

    /// Unit offsets in direction order (see module docs).
    pub const DIRECTIONS: [Self; DIRECTION_COUNT] = [
        Self { q: 1, r: 0 },  // East
        Self { q: 1, r: -1 }, // Northeast
        Self { q: 0, r: -1 }, // Northwest
        Self { q: -1, r: 0 }, // West
        Self { q: -1, r: 1 }, // Southwest
        Self { q: 0, r: 1 },  // Southeast
    ];

    /// Create a coordinate from its axial components.
    #[must_use]
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Create a coordinate from full cube components.
    ///
    /// Returns `None` if `q + r + s != 0`.
    #[must_use]
    pub const fn from_cube(q: i32, r: i32, s: i32) -> Option<Self> {
        if q + r + s == 0 {
            Some(Self { q, r })
        } else {
            None
        }
    }

    /// The derived third cube component.
    #[inline]
    #[must_use]
    pub const fn s(self) -> i32 {
        -self.q - self.r
    }

    /// Componentwise sum.
    #[must_use]
    pub const fn add(self, other: Self) -> Self {
        Self::new(self.q + other.q, self.r + other.r)
    }

    /// Componentwise difference.
    #[must_use]
    pub const fn subtract(self, other: Self) -> Self {
        Self::new(self.q - other.q, self.r - other.r)
    }

    /// Multiply every component by `factor`.
    #[must_use]
    pub const fn scale(self, factor: i32) -> Self {
        Self::new(self.q * factor, self.r * factor)
    }

    /// Distance from the origin in hex steps.
    #[must_use]
    pub const fn length(self) -> i32 {
        (self.q.abs() + self.r.abs() + self.s().abs()) / 2
    }

    /// Hex-step distance between two coordinates.
    #[must_use]
    pub const fn distance(self, other: Self) -> i32 {
        self.subtract(other).length()
    }

    /// The unit offset for `direction`, wrapping modulo 6.
    #[must_use]
    pub const fn direction(direction: usize) -> Self {
        Self::DIRECTIONS[direction % DIRECTION_COUNT]
    }

    /// The adjacent hex in `direction` (wrapping modulo 6).
    #[must_use]
    pub const fn neighbor(self, direction: usize) -> Self {
        self.add(Self::direction(direction))
    }

    /// All six adjacent hexes, in direction order.
    #[must_use]
    pub fn neighbors(self) -> [Self; DIRECTION_COUNT] {
        Self::DIRECTIONS.map(|d| self.add(d))
    }

    /// Whether `other` is one step away.
    #[must_use]
    pub const fn is_adjacent(self, other: Self) -> bool {
        self.distance(other) == 1
    }
}

impl Ord for HexCoord {
    /// Row-major ordering so coordinate-keyed collections iterate deterministically.
    fn cmp(&self, other: &Self) -> Ordering {
        (self.r, self.q).cmp(&(other.r, other.q))
    }
}

impl PartialOrd for HexCoord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::ops::Add for HexCoord {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        HexCoord::add(self, rhs)
    }
}

impl std::ops::Sub for HexCoord {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self.subtract(rhs)
    }
}

impl std::ops::Mul<i32> for HexCoord {
    type Output = Self;

    fn mul(self, rhs: i32) -> Self::Output {
        self.scale(rhs)
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.q, self.r, self.s())
    }
}

/// A cube coordinate with fractional components, produced by pixel picking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FractionalHex {
    /// Fractional q.
    pub q: Fixed,
    /// Fractional r.
    pub r: Fixed,
    /// Fractional s.
    pub s: Fixed,
}

impl FractionalHex {
    /// Create a fractional hex from q and r, deriving s.
    #[must_use]
    pub fn new(q: Fixed, r: Fixed) -> Self {
        Self { q, r, s: -q - r }
    }
}

/// Round a fractional cube coordinate to the nearest valid hex.
///
/// Each component is rounded independently, then the component with the
/// largest rounding error is recomputed from the other two. Rounding all three
/// independently would break `q + r + s == 0`.
#[must_use]
pub fn hex_round(frac: FractionalHex) -> HexCoord {
    let mut q = frac.q.round();
    let mut r = frac.r.round();
    let s = frac.s.round();

    let q_diff = (q - frac.q).abs();
    let r_diff = (r - frac.r).abs();
    let s_diff = (s - frac.s).abs();

    if q_diff > r_diff && q_diff > s_diff {
        q = -r - s;
    } else if r_diff > s_diff {
        r = -q - s;
    }

    HexCoord::new(q.to_num::<i32>(), r.to_num::<i32>())
}

/// Pixel-space parameters for a pointy-top hex layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HexLayout {
    /// Distance from a hex center to any corner.
    #[serde(with = "fixed_serde")]
    pub size: Fixed,
    /// Pixel position of the origin hex center.
    pub origin: Point,
}

impl HexLayout {
    /// Create a layout with the given hex size and origin.
    #[must_use]
    pub const fn new(size: Fixed, origin: Point) -> Self {
        Self { size, origin }
    }

    /// Center of `hex` in pixel space.
    #[must_use]
    pub fn hex_to_pixel(&self, hex: HexCoord) -> Point {
        hex_to_pixel(hex, self.size, self.origin)
    }

    /// The hex containing pixel `point`.
    #[must_use]
    pub fn pixel_to_hex(&self, point: Point) -> HexCoord {
        pixel_to_hex(point, self.size, self.origin)
    }

    /// The six corners of `hex`.
    #[must_use]
    pub fn corners(&self, hex: HexCoord) -> [Point; DIRECTION_COUNT] {
        corners(self.hex_to_pixel(hex), self.size)
    }
}

impl Default for HexLayout {
    /// Size 45 around the pixel origin.
    fn default() -> Self {
        Self::new(Fixed::from_num(45), Point::ZERO)
    }
}

/// Center of `hex` in pixel space for a pointy-top layout.
#[must_use]
pub fn hex_to_pixel(hex: HexCoord, size: Fixed, origin: Point) -> Point {
    let root3 = sqrt3();
    let q = Fixed::from_num(hex.q);
    let r = Fixed::from_num(hex.r);

    let x = size * (root3 * q + root3 * r / Fixed::from_num(2));
    let y = size * (Fixed::from_num(3) * r / Fixed::from_num(2));
    Point::new(x, y) + origin
}

/// Fractional hex under pixel `point` for a pointy-top layout.
#[must_use]
pub fn pixel_to_fractional(point: Point, size: Fixed, origin: Point) -> FractionalHex {
    let local = point - origin;
    let px = local.x / size;
    let py = local.y / size;

    let q = (sqrt3() * px - py) / Fixed::from_num(3);
    let r = Fixed::from_num(2) * py / Fixed::from_num(3);
    FractionalHex::new(q, r)
}

/// The hex containing pixel `point` for a pointy-top layout.
#[must_use]
pub fn pixel_to_hex(point: Point, size: Fixed, origin: Point) -> HexCoord {
    hex_round(pixel_to_fractional(point, size, origin))
}

/// Corner offsets of a unit pointy-top hex, starting at -30° and stepping 60°.
fn unit_corner_offsets() -> [Point; DIRECTION_COUNT] {
    let half_root3 = sqrt3() / Fixed::from_num(2);
    let half = Fixed::ONE / Fixed::from_num(2);
    [
        Point::new(half_root3, -half),      // -30°
        Point::new(Fixed::ZERO, -Fixed::ONE), // -90°
        Point::new(-half_root3, -half),     // -150°
        Point::new(-half_root3, half),      // 150°
        Point::new(Fixed::ZERO, Fixed::ONE),  // 90°
        Point::new(half_root3, half),       // 30°
    ]
}

/// The six corners of a hex centered at `center`.
///
/// Corner `i` lies between the edges facing directions `i` and `i + 1`,
/// matching the orientation used by [`hex_to_pixel`].
#[must_use]
pub fn corners(center: Point, size: Fixed) -> [Point; DIRECTION_COUNT] {
    unit_corner_offsets().map(|offset| center + offset.scale(size))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(n: i32) -> Fixed {
        Fixed::from_num(n)
    }

    #[test]
    fn test_cube_invariant() {
        let hex = HexCoord::new(3, -5);
        assert_eq!(hex.q + hex.r + hex.s(), 0);
        assert_eq!(HexCoord::from_cube(1, 2, -3), Some(HexCoord::new(1, 2)));
        assert_eq!(HexCoord::from_cube(1, 2, 3), None);
    }

    #[test]
    fn test_arithmetic() {
        let a = HexCoord::new(1, -2);
        let b = HexCoord::new(3, 1);
        assert_eq!(a.add(b), HexCoord::new(4, -1));
        assert_eq!(a.subtract(b), HexCoord::new(-2, -3));
        assert_eq!(a.scale(3), HexCoord::new(3, -6));
        assert_eq!(a + b, HexCoord::new(4, -1));
        assert_eq!(b - a, HexCoord::new(2, 3));
        assert_eq!(a * -1, HexCoord::new(-1, 2));
    }

    #[test]
    fn test_distance() {
        let a = HexCoord::new(0, 0);
        let b = HexCoord::new(3, -1);
        assert_eq!(a.distance(b), 3);
        assert_eq!(b.distance(a), 3);
        assert_eq!(a.distance(a), 0);
        assert_eq!(HexCoord::new(-2, 2).distance(HexCoord::new(2, -2)), 4);
    }

    #[test]
    fn test_direction_zero_is_east() {
        assert_eq!(HexCoord::ORIGIN.neighbor(0), HexCoord::new(1, 0));
        assert_eq!(HexCoord::ORIGIN.neighbor(3), HexCoord::new(-1, 0));
        // Wraps modulo six
        assert_eq!(HexCoord::ORIGIN.neighbor(6), HexCoord::new(1, 0));
    }

    #[test]
    fn test_neighbors_are_adjacent_in_order() {
        let center = HexCoord::new(2, -1);
        let neighbors = center.neighbors();
        for (dir, neighbor) in neighbors.iter().enumerate() {
            assert_eq!(center.distance(*neighbor), 1);
            assert_eq!(*neighbor, center.neighbor(dir));
        }
    }

    #[test]
    fn test_hex_round_recomputes_largest_error() {
        // q=0.6, r=0.3 (s=-0.9): naive rounding gives (1, 0, -1)
        let frac = FractionalHex::new(
            fixed(6) / fixed(10),
            fixed(3) / fixed(10),
        );
        let hex = hex_round(frac);
        assert_eq!(hex.q + hex.r + hex.s(), 0);
        assert_eq!(hex, HexCoord::new(1, 0));

        // q=0.4, r=0.4 (s=-0.8): naive rounding gives (0, 0, -1), which is invalid.
        // q and r tie on error, so r is recomputed.
        let frac = FractionalHex::new(fixed(4) / fixed(10), fixed(4) / fixed(10));
        let hex = hex_round(frac);
        assert_eq!(hex.q + hex.r + hex.s(), 0);
        assert_eq!(hex, HexCoord::new(0, 1));
    }

    #[test]
    fn test_hex_to_pixel_origin() {
        let origin = Point::from_ints(100, 50);
        let center = hex_to_pixel(HexCoord::ORIGIN, fixed(45), origin);
        assert_eq!(center, origin);

        // One step south-east moves down by 1.5 * size
        let se = hex_to_pixel(HexCoord::new(0, 1), fixed(10), Point::ZERO);
        assert_eq!(se.y, fixed(15));
    }

    #[test]
    fn test_pixel_round_trip() {
        let layout = HexLayout::new(fixed(45), Point::from_ints(400, 300));
        for q in -3..=3 {
            for r in -3..=3 {
                let hex = HexCoord::new(q, r);
                if hex.length() > 3 {
                    continue;
                }
                let pixel = layout.hex_to_pixel(hex);
                assert_eq!(layout.pixel_to_hex(pixel), hex, "round trip failed for {hex}");
            }
        }
    }

    #[test]
    fn test_corners_are_at_size_distance() {
        let size = fixed(45);
        let center = Point::from_ints(10, 10);
        let epsilon = fixed(1) / fixed(1000);
        for corner in corners(center, size) {
            let dist_sq = corner.distance_squared(center);
            assert!((dist_sq - size * size).abs() < epsilon);
        }
    }

    #[test]
    fn test_corner_pick_stays_in_hex_vicinity() {
        let layout = HexLayout::default();
        let hex = HexCoord::new(1, 1);
        for corner in layout.corners(hex) {
            let picked = layout.pixel_to_hex(corner);
            assert!(picked.distance(hex) <= 1);
        }
    }

    #[test]
    fn test_ordering_is_row_major() {
        let mut hexes = vec![
            HexCoord::new(1, 0),
            HexCoord::new(-1, 1),
            HexCoord::new(0, -1),
            HexCoord::new(0, 0),
        ];
        hexes.sort();
        assert_eq!(
            hexes,
            vec![
                HexCoord::new(0, -1),
                HexCoord::new(0, 0),
                HexCoord::new(1, 0),
                HexCoord::new(-1, 1),
            ]
        );
    }
}
