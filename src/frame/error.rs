use super::PixelFormat;

use thiserror::Error;

/// Reason why a frame couldn't be built, accessed or reformatted.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FrameError {
	/// There is no conversion routine for this pair of pixel formats.
	#[error("no conversion from {from:?} to {to:?}")]
	UnsupportedConversion {
		from: PixelFormat,
		to: PixelFormat,
	},
	/// A buffer, palette, coordinate or index doesn't fit the frame.
	#[error("invalid argument: {0}")]
	InvalidArgument(String),
	/// The octree had no leaf on the path of a color it was built from.
	///
	/// This is a bug in tree construction or reduction, never a property
	/// of the input image.
	#[error("no octree leaf for color {color:#08x}")]
	PaletteLookupFailure {
		color: u32,
	},
}

impl FrameError {
	pub(crate) fn invalid(msg: impl Into<String>) -> Self {
		FrameError::InvalidArgument(msg.into())
	}
}
