/// A packed `0xRRGGBB` color.
pub type Color = u32;

/// Splits a packed color into its red, green and blue bytes.
pub fn channels(color: Color) -> (u8, u8, u8) {
	((color >> 16) as u8, (color >> 8) as u8, color as u8)
}

/// Packs red, green and blue bytes into one color.
pub fn rgb(r: u8, g: u8, b: u8) -> Color {
	(r as u32) << 16 | (g as u32) << 8 | b as u32
}

/// An ordered list of colors referenced by position from indexed pixels.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Palette {
	colors: Vec<Color>,
}

impl Palette {
	pub fn len(&self) -> usize {
		self.colors.len()
	}

	pub fn is_empty(&self) -> bool {
		self.colors.is_empty()
	}

	/// The number of bits needed to address every entry.
	pub fn width(&self) -> u8 {
		match self.colors.len() {
			0 | 1 => 0,
			n => (usize::BITS - (n - 1).leading_zeros()) as u8,
		}
	}

	pub fn get(&self, index: usize) -> Option<Color> {
		self.colors.get(index).copied()
	}

	pub fn as_slice(&self) -> &[Color] {
		&self.colors
	}

	/// Index of the entry closest to `color`; see
	/// [`nearest_index`](super::nearest_index).
	pub fn nearest(&self, color: Color) -> Option<usize> {
		super::nearest_index(&self.colors, color)
	}
}

impl From<Vec<Color>> for Palette {
	fn from(colors: Vec<Color>) -> Self {
		Palette { colors }
	}
}

impl std::ops::Deref for Palette {
	type Target = [Color];

	fn deref(&self) -> &[Color] {
		&self.colors
	}
}
