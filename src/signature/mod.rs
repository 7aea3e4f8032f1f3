mod geometry;
mod pad;

pub use geometry::{Point, SurfaceRect};
pub use pad::{SignaturePad, StrokeStyle};
