//! Pixel format conversion for raster frames.
//!
//! Frames move between indexed (1, 4 and 8 bits per pixel) and truecolor
//! (5-5-5, 5-6-5 and 24-bit) layouts with [`Frame::reformat`]. Reducing
//! truecolor to a palette builds one with octree quantization.

pub mod frame;

pub use frame::convert::is_supported;
pub use frame::error::FrameError;
pub use frame::quantize::palette::{Color, Palette};
pub use frame::{Frame, PixelFormat};

pub use frame::codec;
pub use frame::quantize;
