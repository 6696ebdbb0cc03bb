//! Points and court geometry.

use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

/// Length of a tennis court, baseline to baseline (meters).
pub const COURT_LENGTH_M: f64 = 23.77;

/// Width of a singles court, sideline to sideline (meters).
pub const COURT_SINGLES_WIDTH_M: f64 = 8.23;

/// Along-court position of the net in normalized coordinates (meters).
pub const NET_X_M: f64 = COURT_LENGTH_M / 2.0;

/// A 2-D point. Pixels before normalization, meters after.
///
/// Serialized as a two-element array `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    pub const ZERO: Coord = Coord { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length of this point treated as a vector.
    pub fn norm(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: Coord) -> f64 {
        (*self - other).norm()
    }

    /// Z component of the cross product of two vectors.
    pub fn cross(&self, other: Coord) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn dot(&self, other: Coord) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f64; 2]> for Coord {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Coord> for [f64; 2] {
    fn from(c: Coord) -> Self {
        [c.x, c.y]
    }
}

impl Add for Coord {
    type Output = Coord;

    fn add(self, rhs: Coord) -> Coord {
        Coord::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Coord {
    type Output = Coord;

    fn sub(self, rhs: Coord) -> Coord {
        Coord::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Coord {
    type Output = Coord;

    fn mul(self, rhs: f64) -> Coord {
        Coord::new(self.x * rhs, self.y * rhs)
    }
}

/// The singles court as a quadrilateral.
///
/// Corners are always in the winding order top-left, top-right,
/// bottom-right, bottom-left as seen by the camera. In pixel space the top
/// edge is the far baseline; in normalized space the court is the rectangle
/// `(0,0)-(0,W)-(L,W)-(L,0)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Court {
    pub tl: Coord,
    pub tr: Coord,
    pub br: Coord,
    pub bl: Coord,
}

impl Court {
    pub fn new(tl: Coord, tr: Coord, br: Coord, bl: Coord) -> Self {
        Self { tl, tr, br, bl }
    }

    /// Build a court from a corner list. Returns `None` unless exactly four
    /// corners are given.
    pub fn from_corners(corners: &[Coord]) -> Option<Self> {
        match corners {
            [tl, tr, br, bl] => Some(Self::new(*tl, *tr, *br, *bl)),
            _ => None,
        }
    }

    /// The canonical court in meters.
    pub fn canonical() -> Self {
        Self::new(
            Coord::new(0.0, 0.0),
            Coord::new(0.0, COURT_SINGLES_WIDTH_M),
            Coord::new(COURT_LENGTH_M, COURT_SINGLES_WIDTH_M),
            Coord::new(COURT_LENGTH_M, 0.0),
        )
    }

    /// Corners in winding order.
    pub fn corners(&self) -> [Coord; 4] {
        [self.tl, self.tr, self.br, self.bl]
    }

    /// Along-court net position on the normalized court.
    pub fn net_x(&self) -> f64 {
        NET_X_M
    }

    /// Pixel-space `y` of the net line, halfway between the baselines.
    pub fn net_line_y(&self) -> f64 {
        (self.tl.y + self.bl.y) / 2.0
    }

    /// Whether `p` lies inside the court or on one of its edges.
    pub fn contains(&self, p: Coord) -> bool {
        convex_quad_contains(&self.corners(), p)
    }

    /// Shortest distance from `p` to any edge of the court.
    pub fn distance_to_edges(&self, p: Coord) -> f64 {
        let corners = self.corners();
        (0..4)
            .map(|i| distance_to_segment(p, corners[i], corners[(i + 1) % 4]))
            .fold(f64::INFINITY, f64::min)
    }

    /// Whether `p` lies inside the court, or outside it by at most `margin`.
    pub fn contains_with_margin(&self, p: Coord, margin: f64) -> bool {
        self.contains(p) || self.distance_to_edges(p) <= margin
    }
}

/// Point-in-convex-quadrilateral test.
///
/// `p` is inside when the cross products of every edge with the vector to
/// `p` share a sign. Points on an edge count as inside. Works for either
/// winding direction.
pub fn convex_quad_contains(quad: &[Coord; 4], p: Coord) -> bool {
    let mut has_pos = false;
    let mut has_neg = false;
    for i in 0..4 {
        let a = quad[i];
        let b = quad[(i + 1) % 4];
        let cross = (b - a).cross(p - a);
        if cross > 0.0 {
            has_pos = true;
        } else if cross < 0.0 {
            has_neg = true;
        }
    }
    !(has_pos && has_neg)
}

/// Distance from `p` to the segment `a`-`b`.
pub fn distance_to_segment(p: Coord, a: Coord, b: Coord) -> f64 {
    let ab = b - a;
    let len_sq = ab.dot(ab);
    if len_sq <= f64::EPSILON {
        return p.distance_to(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance_to(a + ab * t)
}
