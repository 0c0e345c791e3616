use bitvec::prelude::*;

use super::error::FrameError;
use super::quantize::palette::{channels, rgb};
use super::{Frame, PixelFormat};

/// Alpha values below this count as transparent when building a mask.
const ALPHA_THRESHOLD: u8 = 128;

impl Frame {
	/// Copies an `image` buffer into a 24-bit frame.
	pub fn from_rgb_image(img: &::image::RgbImage) -> Frame {
		let mut frame = Frame::new(img.width() as usize, img.height() as usize, PixelFormat::Rgb24);
		for (x, y, pixel) in img.enumerate_pixels() {
			let [r, g, b] = pixel.0;
			super::codec::write_rgb(PixelFormat::Rgb24, frame.row_mut(y as usize), x as usize, rgb(r, g, b));
		}
		frame
	}

	/// Copies an `image` buffer with alpha into a 24-bit frame.
	///
	/// Alpha is reduced to a 1-bit mask: a set bit marks a pixel whose alpha
	/// is below one half. Fully opaque images get no mask.
	pub fn from_rgba_image(img: &::image::RgbaImage) -> Frame {
		let mut frame = Frame::new(img.width() as usize, img.height() as usize, PixelFormat::Rgb24);
		for (x, y, pixel) in img.enumerate_pixels() {
			let [r, g, b, a] = pixel.0;
			let (x, y) = (x as usize, y as usize);
			super::codec::write_rgb(PixelFormat::Rgb24, frame.row_mut(y), x, rgb(r, g, b));
			if a < ALPHA_THRESHOLD {
				frame.add_mask();
				if let Some(line) = frame.mask_row_mut(y) {
					line.view_bits_mut::<Msb0>().set(x, true);
				}
			}
		}
		frame
	}

	/// Renders the frame into an `image` buffer, whatever its format.
	pub fn to_rgb_image(&self) -> Result<::image::RgbImage, FrameError> {
		let mut img = ::image::RgbImage::new(self.width() as u32, self.height() as u32);
		for (x, y, pixel) in img.enumerate_pixels_mut() {
			let (r, g, b) = channels(self.get_pixel(x as usize, y as usize)?);
			*pixel = ::image::Rgb([r, g, b]);
		}
		Ok(img)
	}

	/// Renders the frame with masked pixels fully transparent.
	pub fn to_rgba_image(&self) -> Result<::image::RgbaImage, FrameError> {
		let mut img = ::image::RgbaImage::new(self.width() as u32, self.height() as u32);
		for (x, y, pixel) in img.enumerate_pixels_mut() {
			let (x, y) = (x as usize, y as usize);
			let (r, g, b) = channels(self.get_pixel(x, y)?);
			let a = if self.get_mask(x, y)? { 0 } else { 255 };
			*pixel = ::image::Rgba([r, g, b, a]);
		}
		Ok(img)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn alpha_becomes_mask() {
		let mut img = ::image::RgbaImage::new(3, 1);
		img.put_pixel(0, 0, ::image::Rgba([10, 20, 30, 255]));
		img.put_pixel(1, 0, ::image::Rgba([40, 50, 60, 0]));
		img.put_pixel(2, 0, ::image::Rgba([70, 80, 90, 127]));
		let frame = Frame::from_rgba_image(&img);
		assert_eq!(frame.get_pixel(1, 0), Ok(0x28323C));
		assert_eq!(frame.mask_line(0), Some(&[0b0110_0000, 0, 0, 0][..]));

		let back = frame.to_rgba_image().unwrap();
		assert_eq!(back.get_pixel(0, 0).0, [10, 20, 30, 255]);
		assert_eq!(back.get_pixel(1, 0).0, [40, 50, 60, 0]);
		assert_eq!(back.get_pixel(2, 0).0, [70, 80, 90, 0]);
	}

	#[test]
	fn opaque_images_have_no_mask() {
		let img = ::image::RgbaImage::from_pixel(2, 2, ::image::Rgba([1, 2, 3, 255]));
		assert!(Frame::from_rgba_image(&img).mask().is_none());
	}

	#[test]
	fn rgb_images_round_trip() {
		let img = ::image::RgbImage::from_fn(4, 3, |x, y| ::image::Rgb([x as u8 * 60, y as u8 * 80, 7]));
		let frame = Frame::from_rgb_image(&img);
		assert_eq!(frame.to_rgb_image().unwrap(), img);
	}
}
