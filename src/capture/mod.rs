mod artifact;
mod buffer;
#[cfg(test)]
mod tests;

pub use artifact::{EncodedImage, ImageFormat};
pub use buffer::{parse_hex_color, CaptureBuffer};
