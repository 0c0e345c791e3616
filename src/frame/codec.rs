//! Bit-exact packing and unpacking of single pixels and whole scanlines.
//!
//! Indexed pixels are read and written as palette positions, truecolor
//! pixels as packed `0xRRGGBB` colors. Narrow channels are widened with
//! `v * 255 / (2^n - 1)` and narrowed by keeping the top `n` bits, so a
//! round trip through a 16-bit format is lossy for most colors.

use bitvec::prelude::*;

use super::PixelFormat;
use super::quantize::palette::{channels, rgb, Color};

/// Widens an `bits`-wide channel value to 8 bits.
pub fn promote(value: u8, bits: u32) -> u8 {
	(value as u32 * 255 / ((1 << bits) - 1)) as u8
}

/// Narrows an 8-bit channel value to its top `bits` bits.
pub fn demote(value: u8, bits: u32) -> u8 {
	value >> (8 - bits)
}

/// Packs a color as `0RRRRRGG GGGBBBBB`.
pub fn pack_555(color: Color) -> u16 {
	let (r, g, b) = channels(color);
	(demote(r, 5) as u16) << 10 | (demote(g, 5) as u16) << 5 | demote(b, 5) as u16
}

pub fn unpack_555(word: u16) -> Color {
	rgb(
		promote((word >> 10 & 0x1F) as u8, 5),
		promote((word >> 5 & 0x1F) as u8, 5),
		promote((word & 0x1F) as u8, 5),
	)
}

/// Packs a color as `RRRRRGGG GGGBBBBB`.
pub fn pack_565(color: Color) -> u16 {
	let (r, g, b) = channels(color);
	(demote(r, 5) as u16) << 11 | (demote(g, 6) as u16) << 5 | demote(b, 5) as u16
}

pub fn unpack_565(word: u16) -> Color {
	rgb(
		promote((word >> 11) as u8, 5),
		promote((word >> 5 & 0x3F) as u8, 6),
		promote((word & 0x1F) as u8, 5),
	)
}

/// Reads the palette position of pixel `x` from an indexed scanline.
///
/// `bits` is 1, 4 or 8. Within a byte the leftmost pixel sits in the most
/// significant bits.
pub fn read_index(bits: usize, row: &[u8], x: usize) -> u8 {
	match bits {
		1 => row.view_bits::<Msb0>()[x] as u8,
		4 => if x % 2 == 0 { row[x / 2] >> 4 } else { row[x / 2] & 0x0F },
		_ => row[x],
	}
}

/// Stores palette position `index` for pixel `x`, leaving the other pixels
/// sharing its byte alone.
pub fn write_index(bits: usize, row: &mut [u8], x: usize, index: u8) {
	match bits {
		1 => row.view_bits_mut::<Msb0>().set(x, index & 1 != 0),
		4 => {
			let byte = &mut row[x / 2];
			*byte = if x % 2 == 0 {
				(*byte & 0x0F) | index << 4
			} else {
				(*byte & 0xF0) | (index & 0x0F)
			};
		},
		_ => row[x] = index,
	}
}

/// Reads the color of pixel `x` from a truecolor scanline.
pub fn read_rgb(format: PixelFormat, row: &[u8], x: usize) -> Color {
	debug_assert!(!format.is_indexed());
	match format {
		PixelFormat::Rgb555 => unpack_555(u16::from_le_bytes([row[2 * x], row[2 * x + 1]])),
		PixelFormat::Rgb565 => unpack_565(u16::from_le_bytes([row[2 * x], row[2 * x + 1]])),
		_ => rgb(row[3 * x + 2], row[3 * x + 1], row[3 * x]),
	}
}

/// Stores `color` as pixel `x` of a truecolor scanline.
pub fn write_rgb(format: PixelFormat, row: &mut [u8], x: usize, color: Color) {
	debug_assert!(!format.is_indexed());
	match format {
		PixelFormat::Rgb555 => row[2 * x..2 * x + 2].copy_from_slice(&pack_555(color).to_le_bytes()),
		PixelFormat::Rgb565 => row[2 * x..2 * x + 2].copy_from_slice(&pack_565(color).to_le_bytes()),
		_ => {
			let (r, g, b) = channels(color);
			row[3 * x..3 * x + 3].copy_from_slice(&[b, g, r]);
		},
	}
}

/// Reads the first `width` palette positions of an indexed scanline.
pub fn unpack_indices(bits: usize, row: &[u8], width: usize) -> Vec<u8> {
	match bits {
		1 => row.view_bits::<Msb0>()[..width].iter().by_vals().map(u8::from).collect(),
		_ => (0..width).map(|x| read_index(bits, row, x)).collect(),
	}
}

/// Writes palette positions from the start of an indexed scanline.
pub fn pack_indices(bits: usize, row: &mut [u8], indices: &[u8]) {
	match bits {
		8 => row[..indices.len()].copy_from_slice(indices),
		_ => {
			for (x, &index) in indices.iter().enumerate() {
				write_index(bits, row, x, index);
			}
		},
	}
}

/// Reads the first `width` colors of a truecolor scanline.
pub fn unpack_rgb(format: PixelFormat, row: &[u8], width: usize) -> Vec<Color> {
	(0..width).map(|x| read_rgb(format, row, x)).collect()
}

/// Writes colors from the start of a truecolor scanline.
pub fn pack_rgb(format: PixelFormat, row: &mut [u8], colors: &[Color]) {
	for (x, &color) in colors.iter().enumerate() {
		write_rgb(format, row, x, color);
	}
}
