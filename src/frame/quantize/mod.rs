pub mod octree;
pub mod palette;

use super::error::FrameError;
use palette::{channels, Color, Palette};

fn abs_sub(a: u8, b: u8) -> u32 {
	(a as i32 - b as i32).unsigned_abs()
}

fn vec3_len_squared(a: u32, b: u32, c: u32) -> u32 {
	a * a + b * b + c * c
}

/// Squared Euclidean distance between two colors in RGB space.
pub fn color_distance(a: Color, b: Color) -> u32 {
	let (ar, ag, ab) = channels(a);
	let (br, bg, bb) = channels(b);
	vec3_len_squared(abs_sub(ar, br), abs_sub(ag, bg), abs_sub(ab, bb))
}

/// Finds the palette entry closest to `color`.
///
/// Equally close entries resolve to the lowest index. Only an empty palette
/// has no match.
pub fn nearest_index(palette: &[Color], color: Color) -> Option<usize> {
	palette.iter()
		.enumerate()
		.map(|(ind, &col)| (color_distance(color, col), ind))
		.min()
		.map(|(_, ind)| ind)
}

/// Builds a palette of at most `max_colors` entries for `pixels` and maps
/// every pixel onto it.
///
/// `pixels` must be in row-major order. The first pass feeds every pixel
/// to a fresh octree and reduces it; the second classifies each pixel by
/// descending the frozen tree, skipping the descent for runs of one color.
pub fn quantize(pixels: &[Color], max_colors: usize) -> Result<(Palette, Vec<u8>), FrameError> {
	let mut tree = octree::Octree::new();
	for &pixel in pixels {
		tree.add_color(pixel);
	}
	let distinct = tree.leaf_count();
	let palette = tree.create_palette(max_colors)?;
	tracing::debug!(distinct, colors = palette.len(), max_colors, "built octree palette");

	let mut indices = Vec::with_capacity(pixels.len());
	let mut previous: Option<(Color, u8)> = None;
	for &pixel in pixels {
		let index = match previous {
			Some((color, index)) if color == pixel => index,
			_ => {
				let index = tree.palette_index(pixel)? as u8;
				previous = Some((pixel, index));
				index
			}
		};
		indices.push(index);
	}
	Ok((palette, indices))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn nearest_picks_closest_entry() {
		let palette = [0x000000, 0xFFFFFF, 0xFF0000];
		assert_eq!(nearest_index(&palette, 0xF00000), Some(2));
		assert_eq!(nearest_index(&palette, 0xEEEEEE), Some(1));
		assert_eq!(nearest_index(&palette, 0x202020), Some(0));
	}

	#[test]
	fn nearest_breaks_ties_low() {
		assert_eq!(nearest_index(&[0x000000, 0x020000], 0x010000), Some(0));
		assert_eq!(nearest_index(&[0x123456, 0x123456], 0x123456), Some(0));
	}

	#[test]
	fn nearest_needs_entries() {
		assert_eq!(nearest_index(&[], 0x123456), None);
	}

	#[test]
	fn distance_is_squared() {
		assert_eq!(color_distance(0x000000, 0x030400), 25);
		assert_eq!(color_distance(0xFFFFFF, 0x000000), 3 * 255 * 255);
	}

	#[test]
	fn quantize_maps_every_pixel() {
		let pixels = [0xFF0000, 0xFF0000, 0x00FF00, 0x0000FF, 0x000000, 0xFF0000];
		let (palette, indices) = quantize(&pixels, 256).unwrap();
		assert_eq!(palette.len(), 4);
		for (&pixel, &index) in pixels.iter().zip(indices.iter()) {
			assert_eq!(palette.get(index as usize), Some(pixel));
		}
	}

	#[test]
	fn quantize_handles_empty_input() {
		let (palette, indices) = quantize(&[], 16).unwrap();
		assert!(palette.is_empty());
		assert!(indices.is_empty());
	}
}
