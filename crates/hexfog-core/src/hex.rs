//! Hex coordinate systems and grid geometry.
//!
//! This module provides the three interchangeable coordinate encodings used by the grid:
//! - `OffsetCoord`: column/row in the rectangular layout (identity of a cell)
//! - `AxialCoord`: two cube axes, orientation independent once derived
//! - `CubeCoord`: three axes summing to zero, used for distance and rounding
//!
//! Flat-top grids use the odd-q offset layout (odd columns shifted by half a hex),
//! pointy-top grids use odd-r (odd rows shifted). `HexMetrics` turns coordinates into
//! world-space positions on the x/z plane and back.

use serde::{Deserialize, Serialize};
use std::fmt;

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Layout of the hexes in the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Flat edge at the top, columns are staggered
    #[default]
    FlatTop,
    /// Corner at the top, rows are staggered
    PointyTop,
}

/// Offset coordinate: column and row in the rectangular grid.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct OffsetCoord {
    pub col: i32,
    pub row: i32,
}

/// Offset deltas (col, row) for flat-top grids, even columns
const FLAT_EVEN_NEIGHBORS: [(i32, i32); 6] = [(1, 0), (1, -1), (0, -1), (-1, -1), (-1, 0), (0, 1)];
/// Offset deltas (col, row) for flat-top grids, odd columns
const FLAT_ODD_NEIGHBORS: [(i32, i32); 6] = [(1, 1), (1, 0), (0, -1), (-1, 0), (-1, 1), (0, 1)];
/// Offset deltas (col, row) for pointy-top grids, even rows
const POINTY_EVEN_NEIGHBORS: [(i32, i32); 6] =
    [(1, 0), (0, -1), (-1, -1), (-1, 0), (-1, 1), (0, 1)];
/// Offset deltas (col, row) for pointy-top grids, odd rows
const POINTY_ODD_NEIGHBORS: [(i32, i32); 6] = [(1, 0), (1, -1), (0, -1), (-1, 0), (0, 1), (1, 1)];

impl OffsetCoord {
    /// Create a new offset coordinate
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Convert to axial coordinates for the given orientation
    pub fn to_axial(self, orientation: Orientation) -> AxialCoord {
        match orientation {
            Orientation::FlatTop => {
                AxialCoord::new(self.col, self.row - (self.col - (self.col & 1)) / 2)
            }
            Orientation::PointyTop => {
                AxialCoord::new(self.col - (self.row - (self.row & 1)) / 2, self.row)
            }
        }
    }

    /// Convert to cube coordinates for the given orientation
    pub fn to_cube(self, orientation: Orientation) -> CubeCoord {
        self.to_axial(orientation).to_cube()
    }

    /// The six neighboring offset coordinates.
    ///
    /// Staggered layouts shift every other column (flat-top) or row (pointy-top) by
    /// half a hex, so the neighbor pattern depends on that column's or row's parity.
    pub fn neighbors(self, orientation: Orientation) -> [OffsetCoord; 6] {
        let deltas = match orientation {
            Orientation::FlatTop if self.col & 1 == 1 => FLAT_ODD_NEIGHBORS,
            Orientation::FlatTop => FLAT_EVEN_NEIGHBORS,
            Orientation::PointyTop if self.row & 1 == 1 => POINTY_ODD_NEIGHBORS,
            Orientation::PointyTop => POINTY_EVEN_NEIGHBORS,
        };
        deltas.map(|(dc, dr)| OffsetCoord::new(self.col + dc, self.row + dr))
    }

    /// Distance to another offset coordinate (in hex steps)
    pub fn distance_to(self, other: OffsetCoord, orientation: Orientation) -> u32 {
        self.to_axial(orientation)
            .distance_to(&other.to_axial(orientation))
    }
}

impl fmt::Display for OffsetCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// Axial coordinate for hex grid.
///
/// In axial coordinates:
/// - `q` increases going east (right)
/// - `r` increases going southeast
/// - The third coordinate `s` (not stored) satisfies: q + r + s = 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct AxialCoord {
    pub q: i32,
    pub r: i32,
}

/// Axial direction vectors, clockwise starting from East
pub const AXIAL_DIRECTIONS: [(i32, i32); 6] = [(1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1), (0, 1)];

impl AxialCoord {
    /// Create a new axial coordinate
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// The implicit third coordinate (s = -q - r)
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Convert to cube coordinates
    pub const fn to_cube(self) -> CubeCoord {
        CubeCoord {
            x: self.q,
            y: self.r,
            z: -self.q - self.r,
        }
    }

    /// Convert back to offset coordinates for the given orientation
    pub fn to_offset(self, orientation: Orientation) -> OffsetCoord {
        match orientation {
            Orientation::FlatTop => {
                OffsetCoord::new(self.q, self.r + (self.q - (self.q & 1)) / 2)
            }
            Orientation::PointyTop => {
                OffsetCoord::new(self.q + (self.r - (self.r & 1)) / 2, self.r)
            }
        }
    }

    /// The six neighboring hexes in clockwise order starting from East
    pub fn neighbors(&self) -> [AxialCoord; 6] {
        AXIAL_DIRECTIONS.map(|(dq, dr)| AxialCoord::new(self.q + dq, self.r + dr))
    }

    /// Distance to another hex (in hex steps)
    pub fn distance_to(&self, other: &AxialCoord) -> u32 {
        self.to_cube().distance_to(&other.to_cube())
    }

    /// All hexes at exactly `radius` steps, walking the ring clockwise.
    pub fn ring(&self, radius: u32) -> Vec<AxialCoord> {
        if radius == 0 {
            return vec![*self];
        }
        let radius = radius as i32;
        let (sq, sr) = AXIAL_DIRECTIONS[4];
        let mut current = AxialCoord::new(self.q + sq * radius, self.r + sr * radius);
        let mut ring = Vec::with_capacity(6 * radius as usize);
        for (dq, dr) in AXIAL_DIRECTIONS {
            for _ in 0..radius {
                ring.push(current);
                current = AxialCoord::new(current.q + dq, current.r + dr);
            }
        }
        ring
    }
}

/// Cube coordinate. Fields are private so every value satisfies x + y + z == 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CubeCoord {
    x: i32,
    y: i32,
    z: i32,
}

impl CubeCoord {
    /// Create a cube coordinate, or `None` if the components do not sum to zero
    pub fn new(x: i32, y: i32, z: i32) -> Option<Self> {
        (x + y + z == 0).then_some(Self { x, y, z })
    }

    pub const fn x(&self) -> i32 {
        self.x
    }

    pub const fn y(&self) -> i32 {
        self.y
    }

    pub const fn z(&self) -> i32 {
        self.z
    }

    /// Drop the third component
    pub const fn to_axial(self) -> AxialCoord {
        AxialCoord::new(self.x, self.y)
    }

    /// Half the sum of absolute component deltas
    pub fn distance_to(&self, other: &CubeCoord) -> u32 {
        let dx = (self.x - other.x).unsigned_abs();
        let dy = (self.y - other.y).unsigned_abs();
        let dz = (self.z - other.z).unsigned_abs();
        (dx + dy + dz) / 2
    }

    /// Round fractional cube coordinates to the nearest hex.
    ///
    /// The component with the largest rounding residual is recomputed from the other
    /// two so the result still sums to zero.
    pub fn round(x: f64, y: f64, z: f64) -> Self {
        let mut rx = x.round();
        let mut ry = y.round();
        let mut rz = z.round();

        let x_diff = (rx - x).abs();
        let y_diff = (ry - y).abs();
        let z_diff = (rz - z).abs();

        if x_diff > y_diff && x_diff > z_diff {
            rx = -ry - rz;
        } else if y_diff > z_diff {
            ry = -rx - rz;
        } else {
            rz = -rx - ry;
        }

        Self {
            x: rx as i32,
            y: ry as i32,
            z: rz as i32,
        }
    }
}

/// A position in world space. Hexes lie on the x/z plane, y is up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl WorldPoint {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl std::ops::Add for WorldPoint {
    type Output = WorldPoint;

    fn add(self, rhs: WorldPoint) -> WorldPoint {
        WorldPoint::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

/// Size and orientation of the hexes, used to lay cells out in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HexMetrics {
    /// Center-to-corner distance
    pub size: f64,
    pub orientation: Orientation,
}

impl HexMetrics {
    pub const fn new(size: f64, orientation: Orientation) -> Self {
        Self { size, orientation }
    }

    /// Center-to-corner distance
    pub fn outer_radius(&self) -> f64 {
        self.size
    }

    /// Center-to-edge distance
    pub fn inner_radius(&self) -> f64 {
        self.size * SQRT_3 / 2.0
    }

    /// World-space center of the cell at an offset coordinate
    pub fn center(&self, coord: OffsetCoord) -> WorldPoint {
        let col = coord.col as f64;
        let row = coord.row as f64;
        match self.orientation {
            Orientation::FlatTop => {
                let shift = if coord.col & 1 == 1 { 0.5 } else { 0.0 };
                WorldPoint::new(
                    col * self.outer_radius() * 1.5,
                    0.0,
                    (row + shift) * self.inner_radius() * 2.0,
                )
            }
            Orientation::PointyTop => {
                let shift = if coord.row & 1 == 1 { 0.5 } else { 0.0 };
                WorldPoint::new(
                    (col + shift) * self.inner_radius() * 2.0,
                    0.0,
                    row * self.outer_radius() * 1.5,
                )
            }
        }
    }

    /// Offset of corner `index` (0-5) from the cell center
    pub fn corner(&self, index: usize) -> WorldPoint {
        let mut angle = -60.0 * (index % 6) as f64;
        if self.orientation == Orientation::PointyTop {
            angle -= 30.0;
        }
        let radians = angle.to_radians();
        WorldPoint::new(self.size * radians.cos(), 0.0, self.size * radians.sin())
    }

    /// All six corner offsets
    pub fn corners(&self) -> [WorldPoint; 6] {
        std::array::from_fn(|i| self.corner(i))
    }

    /// The axial coordinate of the hex containing a point local to the grid origin
    pub fn axial_at(&self, x: f64, z: f64) -> AxialCoord {
        let (q, r) = match self.orientation {
            Orientation::FlatTop => (
                (2.0 / 3.0 * x) / self.size,
                (-1.0 / 3.0 * x + SQRT_3 / 3.0 * z) / self.size,
            ),
            Orientation::PointyTop => (
                (SQRT_3 / 3.0 * x - 1.0 / 3.0 * z) / self.size,
                (2.0 / 3.0 * z) / self.size,
            ),
        };
        CubeCoord::round(q, r, -q - r).to_axial()
    }

    /// The offset coordinate of the hex containing a point local to the grid origin
    pub fn offset_at(&self, x: f64, z: f64) -> OffsetCoord {
        self.axial_at(x, z).to_offset(self.orientation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const ORIENTATIONS: [Orientation; 2] = [Orientation::FlatTop, Orientation::PointyTop];

    #[test]
    fn test_offset_axial_round_trip() {
        for orientation in ORIENTATIONS {
            for col in -7..=12 {
                for row in -7..=12 {
                    let offset = OffsetCoord::new(col, row);
                    let axial = offset.to_axial(orientation);
                    assert_eq!(axial.to_offset(orientation), offset, "{:?}", orientation);
                    assert_eq!(axial.to_cube().to_axial(), axial);
                }
            }
        }
    }

    #[test]
    fn test_cube_invariant() {
        for orientation in ORIENTATIONS {
            let cube = OffsetCoord::new(5, -3).to_cube(orientation);
            assert_eq!(cube.x() + cube.y() + cube.z(), 0);
        }
        assert!(CubeCoord::new(1, 2, -3).is_some());
        assert!(CubeCoord::new(1, 2, 3).is_none());
    }

    #[test]
    fn test_cube_round_keeps_zero_sum() {
        let samples = [
            (0.4, 0.4, -0.8),
            (1.6, -0.7, -0.9),
            (-2.5, 1.2, 1.3),
            (0.49, 0.01, -0.5),
            (3.3, -3.4, 0.1),
        ];
        for (x, y, z) in samples {
            let cube = CubeCoord::round(x, y, z);
            assert_eq!(cube.x() + cube.y() + cube.z(), 0, "rounding ({x}, {y}, {z})");
        }
    }

    #[test]
    fn test_hex_neighbors() {
        let center = AxialCoord::new(0, 0);
        let neighbors = center.neighbors();

        let unique: HashSet<_> = neighbors.iter().collect();
        assert_eq!(unique.len(), 6);

        for neighbor in &neighbors {
            assert_eq!(center.distance_to(neighbor), 1);
        }
    }

    #[test]
    fn test_offset_neighbors_match_axial_neighbors() {
        // Both parities in both layouts
        for orientation in ORIENTATIONS {
            for coord in [
                OffsetCoord::new(4, 4),
                OffsetCoord::new(5, 4),
                OffsetCoord::new(4, 5),
                OffsetCoord::new(-3, -1),
            ] {
                let from_offset: HashSet<AxialCoord> = coord
                    .neighbors(orientation)
                    .iter()
                    .map(|n| n.to_axial(orientation))
                    .collect();
                let from_axial: HashSet<AxialCoord> =
                    coord.to_axial(orientation).neighbors().into_iter().collect();
                assert_eq!(from_offset, from_axial, "{coord} {orientation:?}");
            }
        }
    }

    #[test]
    fn test_hex_distance() {
        let a = AxialCoord::new(0, 0);
        let b = AxialCoord::new(2, -1);
        assert_eq!(a.distance_to(&b), 2);

        let c = AxialCoord::new(-3, 3);
        assert_eq!(a.distance_to(&c), 3);
    }

    #[test]
    fn test_distance_metric_laws() {
        let points: Vec<AxialCoord> = (-3..=3)
            .flat_map(|q| (-3..=3).map(move |r| AxialCoord::new(q * 2 - 1, r + q)))
            .collect();
        for a in &points {
            assert_eq!(a.distance_to(a), 0);
            for b in &points {
                assert_eq!(a.distance_to(b), b.distance_to(a));
                for c in points.iter().step_by(5) {
                    assert!(a.distance_to(c) <= a.distance_to(b) + b.distance_to(c));
                }
            }
        }
    }

    #[test]
    fn test_ring_sizes() {
        let center = AxialCoord::new(2, -1);
        assert_eq!(center.ring(0), vec![center]);
        for radius in 1..5 {
            let ring = center.ring(radius);
            assert_eq!(ring.len(), 6 * radius as usize);
            assert!(ring.iter().all(|h| h.distance_to(&center) == radius));
            let unique: HashSet<_> = ring.iter().collect();
            assert_eq!(unique.len(), ring.len());
        }
    }

    #[test]
    fn test_point_round_trip() {
        for orientation in ORIENTATIONS {
            let metrics = HexMetrics::new(2.5, orientation);
            for col in 0..10 {
                for row in 0..10 {
                    let coord = OffsetCoord::new(col, row);
                    let center = metrics.center(coord);
                    assert_eq!(metrics.offset_at(center.x, center.z), coord);
                    // Anywhere well inside the hex resolves to the same cell
                    let nudged = metrics.offset_at(
                        center.x + metrics.inner_radius() * 0.4,
                        center.z - metrics.inner_radius() * 0.3,
                    );
                    assert_eq!(nudged, coord, "{orientation:?}");
                }
            }
        }
    }

    #[test]
    fn test_corners_lie_on_outer_radius() {
        for orientation in ORIENTATIONS {
            let metrics = HexMetrics::new(3.0, orientation);
            let corners = metrics.corners();
            for corner in corners {
                let length = (corner.x * corner.x + corner.z * corner.z).sqrt();
                assert!((length - 3.0).abs() < 1e-9);
            }
        }
        let flat = HexMetrics::new(1.0, Orientation::FlatTop).corner(0);
        assert!((flat.x - 1.0).abs() < 1e-9 && flat.z.abs() < 1e-9);
        let pointy = HexMetrics::new(1.0, Orientation::PointyTop).corner(0);
        assert!(pointy.x > 0.0 && pointy.z < 0.0);
    }
}
