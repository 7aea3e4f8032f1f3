use serde::{Deserialize, Serialize};

/// A pointer or touch position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Bounding rectangle of the drawing surface in viewport coordinates,
/// as reported by the rendering layer at the time of an event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl SurfaceRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Map a viewport point into raster coordinates of a `surface_width` x
    /// `surface_height` surface. The surface may be displayed scaled, so the
    /// offset is also scaled by raster size over displayed size.
    pub fn to_surface(&self, point: Point, surface_width: u32, surface_height: u32) -> Point {
        let scale = |raster: u32, displayed: f32| {
            if displayed > 0.0 {
                raster as f32 / displayed
            } else {
                1.0
            }
        };

        Point {
            x: (point.x - self.left) * scale(surface_width, self.width),
            y: (point.y - self.top) * scale(surface_height, self.height),
        }
    }
}
