//! Raw detector output and the detection stream file format.
//!
//! A detection stream is stored as JSONL. The first line is a `#`-prefixed
//! header carrying the frame rate and the four pixel-space court corners;
//! every following line is one frame of detector candidates:
//!
//! ```text
//! # {"schema_version":"1.0","fps":60,"court":[[746,257],[1183,254],[1879,836],[27,841]]}
//! {"balls":[{"bbox":[950,500,962,512],"confidence":0.41}],"people":[]}
//! ```

use serde::{Deserialize, Serialize};

use crate::geometry::Coord;

/// Current detection stream schema version.
pub const DETECTION_SCHEMA_VERSION: &str = "1.0";

/// Axis-aligned bounding box in pixels, serialized as `[x1, y1, x2, y2]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Box of the given size centered on `(cx, cy)`.
    pub fn centered(cx: f64, cy: f64, w: f64, h: f64) -> Self {
        Self::new(cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0)
    }

    pub fn width(&self) -> f64 {
        (self.x2 - self.x1).abs()
    }

    pub fn height(&self) -> f64 {
        (self.y2 - self.y1).abs()
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn center(&self) -> Coord {
        Coord::new((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    /// Bottom-center of the box, where a standing person touches the ground.
    pub fn foot_point(&self) -> Coord {
        Coord::new((self.x1 + self.x2) / 2.0, self.y1.max(self.y2))
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from([x1, y1, x2, y2]: [f64; 4]) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

/// A single detector candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub bbox: BoundingBox,
    pub confidence: f64,
}

impl Detection {
    pub fn new(bbox: BoundingBox, confidence: f64) -> Self {
        Self { bbox, confidence }
    }
}

/// All candidates the detector produced for one video frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionFrame {
    /// Ball candidates.
    #[serde(default)]
    pub balls: Vec<Detection>,

    /// Person candidates.
    #[serde(default)]
    pub people: Vec<Detection>,
}

impl DetectionFrame {
    pub fn new(balls: Vec<Detection>, people: Vec<Detection>) -> Self {
        Self { balls, people }
    }

    /// A frame in which nothing was detected.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Detection stream header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionStreamHeader {
    /// Schema version for forward compatibility.
    pub schema_version: String,

    /// Frame rate of the source video, when the detector recorded it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<u32>,

    /// Court corners in pixels: top-left, top-right, bottom-right, bottom-left.
    ///
    /// Kept as a list so that a malformed calibration surfaces as a
    /// calibration error rather than a parse error.
    pub court: Vec<Coord>,
}

/// A parsed detection stream.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionStream {
    pub header: DetectionStreamHeader,
    pub frames: Vec<DetectionFrame>,
}

/// Errors raised while parsing a detection stream.
#[derive(Debug, thiserror::Error)]
pub enum DetectionParseError {
    #[error("detection stream has no `#` header line")]
    MissingHeader,

    #[error("invalid detection stream header: {source}")]
    Header { source: serde_json::Error },

    #[error("invalid detection frame on line {line}: {source}")]
    Frame {
        line: usize,
        source: serde_json::Error,
    },
}

/// Parse a detection stream from JSONL content.
///
/// Blank lines and `#` comment lines after the header are skipped.
pub fn parse_detection_stream(jsonl: &str) -> Result<DetectionStream, DetectionParseError> {
    let mut lines = jsonl
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let header = match lines.next() {
        Some((_, line)) if line.starts_with('#') => {
            serde_json::from_str(line.trim_start_matches('#').trim())
                .map_err(|source| DetectionParseError::Header { source })?
        }
        _ => return Err(DetectionParseError::MissingHeader),
    };

    let frames = lines
        .filter(|(_, line)| !line.starts_with('#'))
        .map(|(line_no, line)| {
            serde_json::from_str(line).map_err(|source| DetectionParseError::Frame {
                line: line_no,
                source,
            })
        })
        .collect::<Result<Vec<DetectionFrame>, _>>()?;

    Ok(DetectionStream { header, frames })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# {\"schema_version\":\"1.0\",\"fps\":60,\"court\":[[746,257],[1183,254],[1879,836],[27,841]]}
{\"balls\":[{\"bbox\":[950,500,962,512],\"confidence\":0.41}],\"people\":[]}

{\"people\":[{\"bbox\":[900,700,960,830],\"confidence\":0.9}]}
# a comment
{}
";

    #[test]
    fn test_bbox_geometry() {
        let bbox = BoundingBox::new(10.0, 20.0, 30.0, 60.0);
        assert_eq!(bbox.width(), 20.0);
        assert_eq!(bbox.height(), 40.0);
        assert_eq!(bbox.area(), 800.0);
        assert_eq!(bbox.center(), Coord::new(20.0, 40.0));
        assert_eq!(bbox.foot_point(), Coord::new(20.0, 60.0));
    }

    #[test]
    fn test_centered_bbox() {
        let bbox = BoundingBox::centered(100.0, 50.0, 10.0, 4.0);
        assert_eq!(bbox, BoundingBox::new(95.0, 48.0, 105.0, 52.0));
    }

    #[test]
    fn test_parse_sample_stream() {
        let stream = parse_detection_stream(SAMPLE).unwrap();
        assert_eq!(stream.header.fps, Some(60));
        assert_eq!(stream.header.schema_version, DETECTION_SCHEMA_VERSION);
        assert_eq!(stream.header.court.len(), 4);
        assert_eq!(stream.frames.len(), 3);
        assert_eq!(stream.frames[0].balls.len(), 1);
        assert!(stream.frames[1].balls.is_empty());
        assert_eq!(stream.frames[1].people.len(), 1);
        assert_eq!(stream.frames[2], DetectionFrame::empty());
    }

    #[test]
    fn test_missing_header_is_rejected() {
        let err = parse_detection_stream("{\"balls\":[]}\n").unwrap_err();
        assert!(matches!(err, DetectionParseError::MissingHeader));
        assert!(matches!(
            parse_detection_stream("").unwrap_err(),
            DetectionParseError::MissingHeader
        ));
    }

    #[test]
    fn test_bad_frame_reports_line_number() {
        let content = "# {\"schema_version\":\"1.0\",\"court\":[]}\n{}\n{\"balls\": 3}\n";
        match parse_detection_stream(content).unwrap_err() {
            DetectionParseError::Frame { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_header_fps_is_optional() {
        let content = "# {\"schema_version\":\"1.0\",\"court\":[[0,0],[0,1],[1,1],[1,0]]}\n";
        let stream = parse_detection_stream(content).unwrap();
        assert_eq!(stream.header.fps, None);
        assert!(stream.frames.is_empty());
    }
}
