//! Court rectification: pixel space to court meters.
//!
//! A planar homography is fitted to the four pixel-space court corners so
//! that they land on the canonical singles court:
//!
//! ```text
//! tl -> (0, 0)    tr -> (0, W)    br -> (L, W)    bl -> (L, 0)
//! ```
//!
//! with `L = 23.77 m` and `W = 8.23 m`. The homography only describes the
//! ground plane, so an airborne ball projects too far from the net. A
//! first-order parallax correction pulls the along-court coordinate back
//! towards the net in proportion to a per-point height factor.

use nalgebra::{Matrix3, SMatrix, SVector, Vector3};
use rallycast_common::{RallycastError, RallycastResult};
use rallycast_match_model::frame::{Ball, Frame, NormalizedFrame, Player};
use rallycast_match_model::geometry::{Coord, Court, NET_X_M};
use serde::{Deserialize, Serialize};

const EPS: f64 = 1e-9;

/// Configuration for the perspective normalizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Along-court shift (meters) applied at height factor 1.0.
    pub parallax_shift_m: f64,

    /// Height factor applied to the ball. Players and corners are always 0.
    pub ball_height_factor: f64,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            parallax_shift_m: 1.25,
            ball_height_factor: 0.0,
        }
    }
}

/// Maps pixel coordinates onto the canonical court.
#[derive(Debug, Clone)]
pub struct PerspectiveNormalizer {
    config: NormalizerConfig,
    matrix: Matrix3<f64>,
    inverse: Matrix3<f64>,
    pixel_court: Court,
    court: Court,
}

impl PerspectiveNormalizer {
    /// Build a normalizer from pixel corners (tl, tr, br, bl).
    pub fn new(corners: &[Coord]) -> RallycastResult<Self> {
        Self::with_config(corners, NormalizerConfig::default())
    }

    /// Build a normalizer with explicit parallax settings.
    ///
    /// Fails with `InvalidCalibration` unless exactly four finite corners
    /// are given, no three of which are collinear.
    pub fn with_config(corners: &[Coord], config: NormalizerConfig) -> RallycastResult<Self> {
        let pixel_court = Court::from_corners(corners).ok_or_else(|| {
            RallycastError::invalid_calibration(format!(
                "expected 4 court corners, got {}",
                corners.len()
            ))
        })?;
        let src = pixel_court.corners();
        check_non_degenerate(&src)?;

        let dst = Court::canonical().corners();
        let matrix = solve_homography(&src, &dst)?;
        let inverse = matrix.try_inverse().ok_or_else(|| {
            RallycastError::invalid_calibration("court homography is not invertible")
        })?;

        let mut normalizer = Self {
            config,
            matrix,
            inverse,
            pixel_court,
            court: Court::canonical(),
        };

        let mapped: Option<Vec<Coord>> = src
            .iter()
            .map(|&p| normalizer.transform_point(p, 0.0))
            .collect();
        if let Some(court) = mapped.as_deref().and_then(Court::from_corners) {
            normalizer.court = court;
        }

        tracing::debug!(
            corners = ?src,
            "Court calibration accepted"
        );
        Ok(normalizer)
    }

    /// The pixel-to-court homography.
    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    /// The court as calibrated, in pixels.
    pub fn pixel_court(&self) -> &Court {
        &self.pixel_court
    }

    /// The court after normalization, in meters.
    pub fn court(&self) -> &Court {
        &self.court
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Map a batch of pixel points to court meters.
    ///
    /// `height_factors[i]` applies to `points[i]`; missing entries count as
    /// 0. Returns `None` if any point sits on the horizon line of the
    /// homography and has no finite image.
    pub fn transform(
        &self,
        points: &[Coord],
        height_factors: Option<&[f64]>,
    ) -> Option<Vec<Coord>> {
        points
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                let h = height_factors
                    .and_then(|factors| factors.get(i).copied())
                    .unwrap_or(0.0);
                self.transform_point(p, h)
            })
            .collect()
    }

    /// Map a single pixel point to court meters with a height factor.
    pub fn transform_point(&self, p: Coord, height_factor: f64) -> Option<Coord> {
        let mapped = project(&self.matrix, p)?;
        Some(Coord::new(
            self.apply_parallax(mapped.x, height_factor),
            mapped.y,
        ))
    }

    /// Map a court point (meters, no parallax) back to pixels.
    pub fn to_pixel(&self, p: Coord) -> Option<Coord> {
        project(&self.inverse, p)
    }

    /// Shift an along-court coordinate towards the net for an airborne point.
    ///
    /// The shift is added on the far side (`x < net_x`) and subtracted on
    /// the near side.
    pub fn apply_parallax(&self, x: f64, height_factor: f64) -> f64 {
        let correction = height_factor * self.config.parallax_shift_m;
        if x < NET_X_M {
            x + correction
        } else {
            x - correction
        }
    }

    /// Normalize a pixel-space frame.
    ///
    /// An object that cannot be mapped is dropped from the frame, the same
    /// as if it had not been detected.
    pub fn normalize_frame(&self, frame: &Frame) -> NormalizedFrame {
        let ball = frame.ball.and_then(|b| {
            self.transform_point(b.pos, self.config.ball_height_factor)
                .map(Ball::new)
        });
        let player = |p: Option<Player>| {
            p.and_then(|p| {
                self.transform_point(p.pos, 0.0)
                    .map(|pos| Player::new(pos, p.role))
            })
        };
        let court = if frame.court == self.pixel_court {
            self.court
        } else {
            self.transform(&frame.court.corners(), None)
                .as_deref()
                .and_then(Court::from_corners)
                .unwrap_or(self.court)
        };

        NormalizedFrame::new(ball, court, player(frame.player1), player(frame.player2))
    }
}

/// Apply a homography to a point, dividing out the projective weight.
fn project(matrix: &Matrix3<f64>, p: Coord) -> Option<Coord> {
    let v = matrix * Vector3::new(p.x, p.y, 1.0);
    let w = v[2];
    if !w.is_finite() || w.abs() <= EPS {
        return None;
    }
    let mapped = Coord::new(v[0] / w, v[1] / w);
    mapped.is_finite().then_some(mapped)
}

/// Reject corner sets where any three corners are (nearly) collinear.
fn check_non_degenerate(corners: &[Coord; 4]) -> RallycastResult<()> {
    if corners.iter().any(|c| !c.is_finite()) {
        return Err(RallycastError::invalid_calibration(
            "court corners must be finite",
        ));
    }

    let extent = corners
        .iter()
        .flat_map(|a| corners.iter().map(move |b| a.distance_to(*b)))
        .fold(0.0, f64::max);
    if extent <= EPS {
        return Err(RallycastError::invalid_calibration(
            "court corners coincide",
        ));
    }

    let tolerance = 1e-9 * extent * extent;
    for skip in 0..4 {
        let tri: Vec<Coord> = (0..4).filter(|&i| i != skip).map(|i| corners[i]).collect();
        let doubled_area = (tri[1] - tri[0]).cross(tri[2] - tri[0]);
        if doubled_area.abs() <= tolerance {
            return Err(RallycastError::invalid_calibration(
                "three court corners are collinear",
            ));
        }
    }
    Ok(())
}

/// Similarity transform moving `points` to their centroid and scaling them
/// to a mean distance of sqrt(2). Conditions the linear solve.
fn conditioning_transform(points: &[Coord; 4]) -> Matrix3<f64> {
    let n = points.len() as f64;
    let cx = points.iter().map(|p| p.x).sum::<f64>() / n;
    let cy = points.iter().map(|p| p.y).sum::<f64>() / n;
    let centroid = Coord::new(cx, cy);
    let mean_dist = points.iter().map(|p| p.distance_to(centroid)).sum::<f64>() / n;
    let s = if mean_dist > EPS {
        std::f64::consts::SQRT_2 / mean_dist
    } else {
        1.0
    };
    Matrix3::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0)
}

/// Solve for the homography taking `src[i]` to `dst[i]`, with `h33 = 1`.
fn solve_homography(src: &[Coord; 4], dst: &[Coord; 4]) -> RallycastResult<Matrix3<f64>> {
    let t_src = conditioning_transform(src);
    let t_dst = conditioning_transform(dst);
    let condition = |t: &Matrix3<f64>, pts: &[Coord; 4]| -> Option<Vec<Coord>> {
        pts.iter().map(|&p| project(t, p)).collect()
    };
    let singular =
        || RallycastError::invalid_calibration("court corners do not define a homography");
    let src_n = condition(&t_src, src).ok_or_else(singular)?;
    let dst_n = condition(&t_dst, dst).ok_or_else(singular)?;

    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();

    for (i, (s, d)) in src_n.iter().zip(dst_n.iter()).enumerate() {
        let r = 2 * i;
        a[(r, 0)] = s.x;
        a[(r, 1)] = s.y;
        a[(r, 2)] = 1.0;
        a[(r, 6)] = -d.x * s.x;
        a[(r, 7)] = -d.x * s.y;
        b[r] = d.x;

        a[(r + 1, 3)] = s.x;
        a[(r + 1, 4)] = s.y;
        a[(r + 1, 5)] = 1.0;
        a[(r + 1, 6)] = -d.y * s.x;
        a[(r + 1, 7)] = -d.y * s.y;
        b[r + 1] = d.y;
    }

    let h = a.lu().solve(&b).ok_or_else(singular)?;
    let h_n = Matrix3::new(h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0);

    let t_dst_inv = t_dst.try_inverse().ok_or_else(singular)?;
    let h = t_dst_inv * h_n * t_src;
    let scale = h[(2, 2)];
    if !scale.is_finite() || scale.abs() <= EPS {
        return Err(singular());
    }
    Ok(h / scale)
}
