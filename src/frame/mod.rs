pub mod codec;
pub mod convert;
pub mod error;
pub mod image;
pub mod pixel;
pub mod quantize;

use error::FrameError;
use quantize::palette::Palette;

/// Layout of the pixels in a frame's buffer.
///
/// Indexed formats store palette positions; the others store colors
/// directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
	Indexed1,
	Indexed4,
	Indexed8,
	Rgb555,
	Rgb565,
	Rgb24,
}

impl PixelFormat {
	pub fn bits_per_pixel(self) -> usize {
		match self {
			PixelFormat::Indexed1 => 1,
			PixelFormat::Indexed4 => 4,
			PixelFormat::Indexed8 => 8,
			PixelFormat::Rgb555 | PixelFormat::Rgb565 => 16,
			PixelFormat::Rgb24 => 24,
		}
	}

	pub fn is_indexed(self) -> bool {
		matches!(self, PixelFormat::Indexed1 | PixelFormat::Indexed4 | PixelFormat::Indexed8)
	}

	/// Number of palette entries an indexed format can address, or 0 for
	/// formats without a palette.
	pub fn palette_capacity(self) -> usize {
		if self.is_indexed() { 1 << self.bits_per_pixel() } else { 0 }
	}

	/// Bytes per scanline for a given width, padded to a multiple of 4.
	pub fn stride(self, width: usize) -> usize {
		((width * self.bits_per_pixel() + 7) / 8 + 3) & !3
	}

	/// Maps a bit count to a format. 15 selects 5-5-5 and 16 selects 5-6-5.
	pub fn from_bit_count(bits: u32) -> Option<Self> {
		match bits {
			1 => Some(PixelFormat::Indexed1),
			4 => Some(PixelFormat::Indexed4),
			8 => Some(PixelFormat::Indexed8),
			15 => Some(PixelFormat::Rgb555),
			16 => Some(PixelFormat::Rgb565),
			24 => Some(PixelFormat::Rgb24),
			_ => None,
		}
	}
}

/// Bytes per scanline of a 1-bit mask, padded to a multiple of 4.
pub fn mask_stride(width: usize) -> usize {
	((width + 7) / 8 + 3) & !3
}

/// A single raster image: pixel buffer, palette and optional mask.
///
/// The buffer always holds exactly `height * stride` bytes. Indexed frames
/// always carry a palette and truecolor frames never do. Cloning copies
/// every buffer.
///
/// 24-bit pixels are stored blue, green, red; 16-bit pixels are
/// little-endian words.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
	width: usize,
	height: usize,
	stride: usize,
	mask_stride: usize,
	pixel_format: PixelFormat,
	data: Vec<u8>,
	palette: Option<Palette>,
	mask: Option<Vec<u8>>,
	transparent_pixel: Option<usize>,
}

impl Frame {
	/// Allocates a zeroed frame.
	///
	/// Indexed frames start with an all-black palette that fills the
	/// format's capacity.
	pub fn new(width: usize, height: usize, pixel_format: PixelFormat) -> Self {
		let stride = pixel_format.stride(width);
		let palette = if pixel_format.is_indexed() {
			Some(Palette::from(vec![0; pixel_format.palette_capacity()]))
		} else {
			None
		};
		Frame {
			width,
			height,
			stride,
			mask_stride: mask_stride(width),
			pixel_format,
			data: vec![0; height * stride],
			palette,
			mask: None,
			transparent_pixel: None,
		}
	}

	/// Builds a frame around a buffer supplied by a loader.
	///
	/// `data` must be exactly `height * stride` bytes, and `palette` must
	/// be present (with 1 to `2^bpp` entries) iff the format is indexed.
	/// A frame with zero width or height may have an empty palette.
	pub fn from_parts(
		width: usize,
		height: usize,
		pixel_format: PixelFormat,
		data: Vec<u8>,
		palette: Option<Palette>
	) -> Result<Self, FrameError> {
		let stride = pixel_format.stride(width);
		if data.len() != height * stride {
			return Err(FrameError::invalid(format!(
				"buffer holds {} bytes, {}x{} {:?} needs {}",
				data.len(), width, height, pixel_format, height * stride
			)));
		}
		check_palette(pixel_format, width * height > 0, palette.as_ref())?;
		Ok(Frame {
			width,
			height,
			stride,
			mask_stride: mask_stride(width),
			pixel_format,
			data,
			palette,
			mask: None,
			transparent_pixel: None,
		})
	}

	pub fn width(&self) -> usize { self.width }
	pub fn height(&self) -> usize { self.height }
	pub fn stride(&self) -> usize { self.stride }
	pub fn mask_stride(&self) -> usize { self.mask_stride }
	pub fn pixel_format(&self) -> PixelFormat { self.pixel_format }
	pub fn data(&self) -> &[u8] { &self.data }

	/// Mutable access to the pixel buffer. The length can't change, so the
	/// stride invariant holds.
	pub fn data_mut(&mut self) -> &mut [u8] { &mut self.data }

	pub fn palette(&self) -> Option<&Palette> { self.palette.as_ref() }

	/// Replaces the palette of an indexed frame.
	pub fn set_palette(&mut self, palette: Palette) -> Result<(), FrameError> {
		check_palette(self.pixel_format, self.width * self.height > 0, Some(&palette))?;
		self.palette = Some(palette);
		Ok(())
	}

	pub fn mask(&self) -> Option<&[u8]> { self.mask.as_deref() }

	/// Gives the frame an empty (all zero) mask if it has none.
	pub fn add_mask(&mut self) {
		if self.mask.is_none() {
			self.mask = Some(vec![0; self.height * self.mask_stride]);
		}
	}

	/// Replaces the mask with a buffer of `height * mask_stride` bytes.
	pub fn set_mask_data(&mut self, mask: Vec<u8>) -> Result<(), FrameError> {
		if mask.len() != self.height * self.mask_stride {
			return Err(FrameError::invalid(format!(
				"mask holds {} bytes, expected {}",
				mask.len(), self.height * self.mask_stride
			)));
		}
		self.mask = Some(mask);
		Ok(())
	}

	/// Index into the palette of the pixel value treated as transparent.
	pub fn transparent_pixel(&self) -> Option<usize> { self.transparent_pixel }

	pub fn set_transparent_pixel(&mut self, index: Option<usize>) {
		self.transparent_pixel = index;
	}

	/// The bytes of scanline `line`, padding included.
	pub fn scan_line(&self, line: usize) -> Option<&[u8]> {
		if line < self.height {
			Some(&self.data[line * self.stride..(line + 1) * self.stride])
		} else {
			None
		}
	}

	/// Overwrites scanline `line` with exactly `stride` bytes.
	pub fn set_scan_line(&mut self, line: usize, bytes: &[u8]) -> Result<(), FrameError> {
		let stride = self.stride;
		let height = self.height;
		copy_line(&mut self.data, stride, height, line, bytes)
	}

	pub fn mask_line(&self, line: usize) -> Option<&[u8]> {
		match self.mask {
			Some(ref mask) if line < self.height =>
				Some(&mask[line * self.mask_stride..(line + 1) * self.mask_stride]),
			_ => None,
		}
	}

	/// Overwrites mask line `line` with exactly `mask_stride` bytes,
	/// adding a mask first if needed.
	pub fn set_mask_line(&mut self, line: usize, bytes: &[u8]) -> Result<(), FrameError> {
		self.add_mask();
		let (stride, height) = (self.mask_stride, self.height);
		match self.mask {
			Some(ref mut mask) => copy_line(mask, stride, height, line, bytes),
			None => Ok(()),
		}
	}

	pub(crate) fn row(&self, y: usize) -> &[u8] {
		&self.data[y * self.stride..(y + 1) * self.stride]
	}

	pub(crate) fn row_mut(&mut self, y: usize) -> &mut [u8] {
		let stride = self.stride;
		&mut self.data[y * stride..(y + 1) * stride]
	}

	pub(crate) fn mask_row_mut(&mut self, y: usize) -> Option<&mut [u8]> {
		let stride = self.mask_stride;
		self.mask.as_mut().map(|m| &mut m[y * stride..(y + 1) * stride])
	}

	pub(crate) fn copy_mask_from(&mut self, other: &Frame) {
		self.mask = other.mask.clone();
	}

	pub(crate) fn replace_palette(&mut self, palette: Option<Palette>) {
		self.palette = palette;
	}
}

/// A frame without pixels may carry an empty palette.
fn check_palette(
	format: PixelFormat,
	has_pixels: bool,
	palette: Option<&Palette>
) -> Result<(), FrameError> {
	match (format.is_indexed(), palette) {
		(true, None) => Err(FrameError::invalid(format!("{:?} frame needs a palette", format))),
		(false, Some(_)) => Err(FrameError::invalid(format!("{:?} frame can't have a palette", format))),
		(true, Some(p)) if (has_pixels && p.is_empty()) || p.len() > format.palette_capacity() =>
			Err(FrameError::invalid(format!(
				"{:?} frame takes 1 to {} palette entries, got {}",
				format, format.palette_capacity(), p.len()
			))),
		_ => Ok(()),
	}
}

fn copy_line(
	buffer: &mut [u8],
	stride: usize,
	height: usize,
	line: usize,
	bytes: &[u8]
) -> Result<(), FrameError> {
	if line >= height {
		return Err(FrameError::invalid(format!("line {} past height {}", line, height)));
	}
	if bytes.len() != stride {
		return Err(FrameError::invalid(format!(
			"line holds {} bytes, stride is {}", bytes.len(), stride
		)));
	}
	buffer[line * stride..(line + 1) * stride].copy_from_slice(bytes);
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	const FORMATS: [PixelFormat; 6] = [
		PixelFormat::Indexed1,
		PixelFormat::Indexed4,
		PixelFormat::Indexed8,
		PixelFormat::Rgb555,
		PixelFormat::Rgb565,
		PixelFormat::Rgb24,
	];

	#[test]
	fn stride_is_padded_to_four_bytes() {
		for format in FORMATS.iter() {
			for &width in [1, 3, 7, 8, 16, 17].iter() {
				let stride = format.stride(width);
				assert_eq!(stride % 4, 0, "{:?} width {}", format, width);
				assert!(stride >= (width * format.bits_per_pixel() + 7) / 8);
				assert!(stride < (width * format.bits_per_pixel() + 7) / 8 + 4);
			}
		}
	}

	#[test]
	fn known_strides() {
		assert_eq!(PixelFormat::Indexed1.stride(17), 4);
		assert_eq!(PixelFormat::Indexed4.stride(9), 8);
		assert_eq!(PixelFormat::Rgb24.stride(3), 12);
		assert_eq!(PixelFormat::Rgb24.stride(5), 16);
		assert_eq!(mask_stride(33), 8);
	}

	#[test]
	fn new_indexed_frame_has_full_palette() {
		let frame = Frame::new(5, 2, PixelFormat::Indexed4);
		assert_eq!(frame.palette().map(|p| p.len()), Some(16));
		assert_eq!(frame.data().len(), 2 * 4);
		assert!(Frame::new(5, 2, PixelFormat::Rgb565).palette().is_none());
	}

	#[test]
	fn from_parts_rejects_bad_buffers() {
		assert!(matches!(
			Frame::from_parts(3, 2, PixelFormat::Rgb24, vec![0; 17], None),
			Err(FrameError::InvalidArgument(_))
		));
		assert!(matches!(
			Frame::from_parts(3, 2, PixelFormat::Indexed8, vec![0; 8], None),
			Err(FrameError::InvalidArgument(_))
		));
		assert!(matches!(
			Frame::from_parts(3, 2, PixelFormat::Rgb24, vec![0; 24], Some(Palette::from(vec![0]))),
			Err(FrameError::InvalidArgument(_))
		));
		assert!(matches!(
			Frame::from_parts(3, 1, PixelFormat::Indexed1, vec![0; 4], Some(Palette::from(vec![0; 3]))),
			Err(FrameError::InvalidArgument(_))
		));
		assert!(Frame::from_parts(3, 2, PixelFormat::Rgb24, vec![0; 24], None).is_ok());
	}

	#[test]
	fn empty_palettes_only_fit_empty_frames() {
		assert!(matches!(
			Frame::from_parts(2, 1, PixelFormat::Indexed8, vec![0; 4], Some(Palette::default())),
			Err(FrameError::InvalidArgument(_))
		));
		let empty = Frame::from_parts(0, 2, PixelFormat::Indexed8, vec![], Some(Palette::default())).unwrap();
		assert_eq!(empty.palette().map(|p| p.len()), Some(0));
	}

	#[test]
	fn scan_lines_are_checked() {
		let mut frame = Frame::new(2, 2, PixelFormat::Indexed8);
		frame.set_scan_line(1, &[7, 8, 0, 0]).unwrap();
		assert_eq!(frame.scan_line(1), Some(&[7, 8, 0, 0][..]));
		assert_eq!(frame.scan_line(2), None);
		assert!(frame.set_scan_line(2, &[0; 4]).is_err());
		assert!(frame.set_scan_line(0, &[0; 3]).is_err());
	}

	#[test]
	fn mask_lines_add_a_mask() {
		let mut frame = Frame::new(9, 3, PixelFormat::Rgb24);
		assert_eq!(frame.mask_line(0), None);
		frame.set_mask_line(2, &[0x80, 0x80, 0, 0]).unwrap();
		assert_eq!(frame.mask().map(|m| m.len()), Some(12));
		assert_eq!(frame.mask_line(2), Some(&[0x80, 0x80, 0, 0][..]));
		assert!(frame.set_mask_data(vec![0; 11]).is_err());
	}
}
