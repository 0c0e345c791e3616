//! Conversion of whole frames from one pixel format to another.
//!
//! Every supported `(source, target)` pair has an entry in [`CONVERSIONS`];
//! anything else is rejected before a destination frame is touched.

use super::codec;
use super::error::FrameError;
use super::quantize;
use super::quantize::palette::{Color, Palette};
use super::{Frame, PixelFormat};

use super::PixelFormat::*;

/// Fills `dst`, a zeroed frame of the target format and the source's size,
/// from `src`.
type Routine = fn(&Frame, &mut Frame) -> Result<(), FrameError>;

const CONVERSIONS: &[(PixelFormat, PixelFormat, Routine)] = &[
	// Index packing only; the palette is kept.
	(Indexed1, Indexed4, widen_indices),
	(Indexed1, Indexed8, widen_indices),
	(Indexed4, Indexed8, widen_indices),
	// Palette lookup.
	(Indexed1, Rgb555, expand_palette),
	(Indexed1, Rgb565, expand_palette),
	(Indexed1, Rgb24, expand_palette),
	(Indexed4, Rgb555, expand_palette),
	(Indexed4, Rgb565, expand_palette),
	(Indexed4, Rgb24, expand_palette),
	(Indexed8, Rgb555, expand_palette),
	(Indexed8, Rgb565, expand_palette),
	(Indexed8, Rgb24, expand_palette),
	// Channel rescaling.
	(Rgb555, Rgb565, repack),
	(Rgb555, Rgb24, repack),
	(Rgb565, Rgb555, repack),
	(Rgb565, Rgb24, repack),
	(Rgb24, Rgb555, repack),
	(Rgb24, Rgb565, repack),
	// Octree quantization.
	(Rgb555, Indexed4, quantize_colors),
	(Rgb555, Indexed8, quantize_colors),
	(Rgb565, Indexed4, quantize_colors),
	(Rgb565, Indexed8, quantize_colors),
	(Rgb24, Indexed4, quantize_colors),
	(Rgb24, Indexed8, quantize_colors),
];

/// Looks up the routine converting `from` into `to`.
fn routine(from: PixelFormat, to: PixelFormat) -> Option<Routine> {
	CONVERSIONS.iter()
		.find(|(f, t, _)| *f == from && *t == to)
		.map(|(_, _, r)| *r)
}

/// Whether [`Frame::reformat`] can turn `from` into `to`.
pub fn is_supported(from: PixelFormat, to: PixelFormat) -> bool {
	from == to || routine(from, to).is_some()
}

impl Frame {
	/// Converts the frame into `format`, returning a new frame.
	///
	/// Reformatting into the frame's own format is a deep copy. The mask,
	/// if any, is copied unchanged whatever the formats. On error nothing
	/// is returned and `self` is untouched.
	pub fn reformat(&self, format: PixelFormat) -> Result<Frame, FrameError> {
		if format == self.pixel_format() {
			return Ok(self.clone());
		}
		let convert = routine(self.pixel_format(), format)
			.ok_or(FrameError::UnsupportedConversion { from: self.pixel_format(), to: format })?;
		tracing::debug!(
			from = ?self.pixel_format(),
			to = ?format,
			width = self.width(),
			height = self.height(),
			"reformatting frame"
		);
		let mut converted = Frame::new(self.width(), self.height(), format);
		converted.copy_mask_from(self);
		convert(self, &mut converted)?;
		Ok(converted)
	}
}

fn source_palette(src: &Frame) -> Result<&Palette, FrameError> {
	src.palette()
		.ok_or_else(|| FrameError::invalid(format!("{:?} frame has no palette", src.pixel_format())))
}

fn palette_color(palette: &Palette, index: u8) -> Result<Color, FrameError> {
	palette.get(index as usize).ok_or_else(|| FrameError::invalid(format!(
		"pixel index {} past palette of {} entries", index, palette.len()
	)))
}

fn widen_indices(src: &Frame, dst: &mut Frame) -> Result<(), FrameError> {
	let from_bits = src.pixel_format().bits_per_pixel();
	let to_bits = dst.pixel_format().bits_per_pixel();
	let palette = source_palette(src)?;
	for y in 0..src.height() {
		let indices = codec::unpack_indices(from_bits, src.row(y), src.width());
		for &index in indices.iter() {
			palette_color(palette, index)?;
		}
		codec::pack_indices(to_bits, dst.row_mut(y), &indices);
	}
	dst.replace_palette(Some(palette.clone()));
	dst.set_transparent_pixel(src.transparent_pixel());
	Ok(())
}

fn expand_palette(src: &Frame, dst: &mut Frame) -> Result<(), FrameError> {
	let bits = src.pixel_format().bits_per_pixel();
	let palette = source_palette(src)?;
	let format = dst.pixel_format();
	for y in 0..src.height() {
		let colors = codec::unpack_indices(bits, src.row(y), src.width())
			.into_iter()
			.map(|index| palette_color(palette, index))
			.collect::<Result<Vec<_>, _>>()?;
		codec::pack_rgb(format, dst.row_mut(y), &colors);
	}
	Ok(())
}

fn repack(src: &Frame, dst: &mut Frame) -> Result<(), FrameError> {
	let (from, to) = (src.pixel_format(), dst.pixel_format());
	for y in 0..src.height() {
		let colors = codec::unpack_rgb(from, src.row(y), src.width());
		codec::pack_rgb(to, dst.row_mut(y), &colors);
	}
	Ok(())
}

fn quantize_colors(src: &Frame, dst: &mut Frame) -> Result<(), FrameError> {
	let format = src.pixel_format();
	let width = src.width();
	let pixels = (0..src.height())
		.flat_map(|y| codec::unpack_rgb(format, src.row(y), width))
		.collect::<Vec<_>>();
	let (palette, indices) = quantize::quantize(&pixels, dst.pixel_format().palette_capacity())?;
	let bits = dst.pixel_format().bits_per_pixel();
	if width > 0 {
		for (y, line) in indices.chunks(width).enumerate() {
			codec::pack_indices(bits, dst.row_mut(y), line);
		}
	}
	dst.replace_palette(Some(palette));
	Ok(())
}
