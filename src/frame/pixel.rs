use bitvec::prelude::*;

use super::codec;
use super::error::FrameError;
use super::quantize::palette::Color;

impl super::Frame {
	fn check_bounds(&self, x: usize, y: usize) -> Result<(), FrameError> {
		if x >= self.width() || y >= self.height() {
			return Err(FrameError::invalid(format!(
				"pixel ({}, {}) outside {}x{} frame", x, y, self.width(), self.height()
			)));
		}
		Ok(())
	}

	/// Color of the pixel at (`x`, `y`) as packed `0xRRGGBB`.
	///
	/// Indexed pixels are looked up in the palette; 16-bit pixels have
	/// their channels widened to 8 bits.
	pub fn get_pixel(&self, x: usize, y: usize) -> Result<Color, FrameError> {
		self.check_bounds(x, y)?;
		let format = self.pixel_format();
		let row = self.row(y);
		if !format.is_indexed() {
			return Ok(codec::read_rgb(format, row, x));
		}
		let index = codec::read_index(format.bits_per_pixel(), row, x) as usize;
		self.palette()
			.and_then(|p| p.get(index))
			.ok_or_else(|| FrameError::invalid(format!("pixel index {} has no palette entry", index)))
	}

	/// Sets the pixel at (`x`, `y`) to `color`.
	///
	/// Indexed frames store the closest palette entry instead; 16-bit
	/// frames keep the top bits of each channel.
	pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) -> Result<(), FrameError> {
		self.check_bounds(x, y)?;
		let format = self.pixel_format();
		if !format.is_indexed() {
			codec::write_rgb(format, self.row_mut(y), x, color);
			return Ok(());
		}
		let index = self.palette()
			.and_then(|p| p.nearest(color))
			.ok_or_else(|| FrameError::invalid("indexed frame has an empty palette"))?;
		codec::write_index(format.bits_per_pixel(), self.row_mut(y), x, index as u8);
		Ok(())
	}

	/// Whether the mask bit of (`x`, `y`) is set. Frames without a mask
	/// have no bits set.
	pub fn get_mask(&self, x: usize, y: usize) -> Result<bool, FrameError> {
		self.check_bounds(x, y)?;
		Ok(self.mask_line(y)
			.map(|line| line.view_bits::<Msb0>()[x])
			.unwrap_or(false))
	}

	/// Sets or clears the mask bit of (`x`, `y`), adding a mask first if the
	/// frame has none.
	pub fn set_mask(&mut self, x: usize, y: usize, value: bool) -> Result<(), FrameError> {
		self.check_bounds(x, y)?;
		self.add_mask();
		if let Some(line) = self.mask_row_mut(y) {
			line.view_bits_mut::<Msb0>().set(x, value);
		}
		Ok(())
	}
}
