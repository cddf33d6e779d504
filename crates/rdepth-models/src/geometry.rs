//! Image-plane geometry for annotated objects and mask regions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Axis-aligned box in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BoundingBox {
    /// Left edge x-coordinate
    pub x: f64,
    /// Top edge y-coordinate
    pub y: f64,
    /// Box width
    pub width: f64,
    /// Box height
    pub height: f64,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Right edge x-coordinate.
    #[inline]
    pub fn x2(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge y-coordinate.
    #[inline]
    pub fn y2(&self) -> f64 {
        self.y + self.height
    }

    /// Box area in pixels.
    #[inline]
    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Check whether two boxes share any area.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.x < other.x2() && other.x < self.x2() && self.y < other.y2() && other.y < self.y2()
    }

    /// Smallest box containing all points. `None` for an empty slice.
    pub fn enclosing(points: &[Point]) -> Option<BoundingBox> {
        if points.is_empty() {
            return None;
        }

        let x = points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let y = points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let x2 = points.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let y2 = points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

        Some(BoundingBox::new(x, y, x2 - x, y2 - y))
    }
}

/// Point in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Oriented 3D box in the ego frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Box3d {
    /// Center (x, y, z) in meters
    pub center: [f64; 3],
    /// Size (width, length, height) in meters
    pub size: [f64; 3],
    /// Heading around the z axis in radians
    pub yaw: f64,
}

/// Geometry handed to mask rasterization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MaskRegion {
    Rect { rect: BoundingBox },
    Polygon { points: Vec<Point> },
}

impl MaskRegion {
    /// Axis-aligned rectangle enclosing the region.
    pub fn bounding_rect(&self) -> Option<BoundingBox> {
        match self {
            MaskRegion::Rect { rect } => Some(*rect),
            MaskRegion::Polygon { points } => BoundingBox::enclosing(points),
        }
    }

    /// Replace the region with its enclosing rectangle.
    pub fn boxified(&self) -> MaskRegion {
        match self.bounding_rect() {
            Some(rect) => MaskRegion::Rect { rect },
            None => self.clone(),
        }
    }
}
