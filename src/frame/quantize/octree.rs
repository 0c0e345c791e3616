use super::palette::{channels, rgb, Color, Palette};
use crate::frame::error::FrameError;

/// Depth of the leaves of a freshly built tree: one level per bit of an
/// 8-bit channel.
const MAX_DEPTH: usize = 8;

/// Handle of a node in the arena.
type NodeId = usize;

const ROOT: NodeId = 0;

/// A cube of RGB space.
///
/// Leaves accumulate the colors that fall inside them; interior nodes only
/// point at up to 8 children, one per combination of the next red, green
/// and blue bits.
#[derive(Clone, Debug, Default)]
struct OctreeNode {
	leaf: bool,
	pixel_count: u64,
	red: u64,
	green: u64,
	blue: u64,
	children: [Option<NodeId>; 8],
	palette_index: usize,
}

impl OctreeNode {
	fn increment(&mut self, color: Color) {
		let (r, g, b) = channels(color);
		self.pixel_count += 1;
		self.red += r as u64;
		self.green += g as u64;
		self.blue += b as u64;
	}

	fn mean(&self) -> Color {
		rgb(
			(self.red / self.pixel_count) as u8,
			(self.green / self.pixel_count) as u8,
			(self.blue / self.pixel_count) as u8,
		)
	}
}

/// Child slot of `color` below a node at `level`: bit `7 - level` of red,
/// green and blue, in that order from most to least significant.
fn child_slot(color: Color, level: usize) -> usize {
	let (r, g, b) = channels(color);
	let bit = 7 - level;
	((r >> bit & 1) as usize) << 2 | ((g >> bit & 1) as usize) << 1 | (b >> bit & 1) as usize
}

/// Color quantization tree.
///
/// Every node lives in `nodes` and refers to its children by index; the
/// per-level reducible lists are only a secondary index into the arena.
/// Nodes folded away by [`reduce`](Octree::reduce) stay in the arena but
/// become unreachable.
#[derive(Debug)]
pub struct Octree {
	nodes: Vec<OctreeNode>,
	/// Interior nodes not yet folded, by level, in registration order.
	/// Level 0 (the root) is never registered.
	reducible: [Vec<NodeId>; MAX_DEPTH],
	leaf_count: usize,
	/// Last color added and the leaf it landed in.
	previous: Option<(Color, NodeId)>,
}

impl Default for Octree {
	fn default() -> Self {
		Self::new()
	}
}

impl Octree {
	pub fn new() -> Self {
		Octree {
			nodes: vec![OctreeNode::default()],
			reducible: Default::default(),
			leaf_count: 0,
			previous: None,
		}
	}

	/// Number of leaves, i.e. the palette size if built now.
	pub fn leaf_count(&self) -> usize {
		self.leaf_count
	}

	/// Adds one pixel of `color` to the tree.
	///
	/// A run of identical colors only descends the tree once.
	pub fn add_color(&mut self, color: Color) {
		if let Some((previous, leaf)) = self.previous {
			if previous == color {
				self.nodes[leaf].increment(color);
				return;
			}
		}
		let mut id = ROOT;
		let mut level = 0;
		while !self.nodes[id].leaf {
			let slot = child_slot(color, level);
			level += 1;
			let existing = self.nodes[id].children[slot];
			id = match existing {
				Some(child) => child,
				None => {
					let child = self.insert_node(level);
					self.nodes[id].children[slot] = Some(child);
					child
				}
			};
		}
		self.nodes[id].increment(color);
		self.previous = Some((color, id));
	}

	fn insert_node(&mut self, level: usize) -> NodeId {
		let id = self.nodes.len();
		let leaf = level == MAX_DEPTH;
		self.nodes.push(OctreeNode { leaf, ..Default::default() });
		if leaf {
			self.leaf_count += 1;
		} else {
			self.reducible[level].push(id);
		}
		id
	}

	/// Folds the most recently registered node of the deepest level that
	/// has one into a leaf. Returns the change in leaf count, which is 0
	/// for a node with a single child.
	fn fold_deepest(&mut self) -> Option<usize> {
		let level = (1..MAX_DEPTH).rev().find(|&l| !self.reducible[l].is_empty())?;
		let id = self.reducible[level].pop()?;
		let mut folded = 0;
		for slot in 0..8 {
			if let Some(child) = self.nodes[id].children[slot].take() {
				let child = self.nodes[child].clone();
				let node = &mut self.nodes[id];
				node.red += child.red;
				node.green += child.green;
				node.blue += child.blue;
				node.pixel_count += child.pixel_count;
				folded += 1;
			}
		}
		self.nodes[id].leaf = true;
		// The node was interior, so it adds one leaf for the ones it took in.
		self.leaf_count = self.leaf_count + 1 - folded;
		self.previous = None;
		Some(folded - 1)
	}

	/// Merges clusters until the leaf count drops.
	///
	/// Nodes are folded deepest level first and, within a level, most
	/// recently created first. Returns how many leaves disappeared, or
	/// `None` once nothing below the root is left to fold.
	pub fn reduce(&mut self) -> Option<usize> {
		let before = self.leaf_count;
		while self.leaf_count == before {
			self.fold_deepest()?;
		}
		Some(before - self.leaf_count)
	}

	/// Reduces the tree to at most `max_colors` leaves and numbers them.
	///
	/// Leaves are numbered depth first, children in slot order; each entry
	/// is the truncated mean of the colors in its leaf.
	pub fn create_palette(&mut self, max_colors: usize) -> Result<Palette, FrameError> {
		// The root is never folded, so up to 8 leaves can remain.
		if max_colors < 8 {
			return Err(FrameError::invalid(format!(
				"octree palette needs room for 8 colors, got {}", max_colors
			)));
		}
		let mut reductions = 0;
		while self.leaf_count > max_colors {
			if self.reduce().is_none() {
				break;
			}
			reductions += 1;
		}
		tracing::trace!(leaves = self.leaf_count, reductions, "octree reduced");

		let mut colors = Vec::with_capacity(self.leaf_count);
		let mut stack = vec![ROOT];
		while let Some(id) = stack.pop() {
			if self.nodes[id].leaf {
				self.nodes[id].palette_index = colors.len();
				colors.push(self.nodes[id].mean());
			} else {
				stack.extend(self.nodes[id].children.iter().rev().flatten());
			}
		}
		Ok(Palette::from(colors))
	}

	/// Palette position of the leaf `color` falls into.
	///
	/// Only meaningful after [`create_palette`](Octree::create_palette). The
	/// first leaf on the color's path wins; no distance search happens.
	pub fn palette_index(&self, color: Color) -> Result<usize, FrameError> {
		let mut id = ROOT;
		let mut level = 0;
		while !self.nodes[id].leaf {
			id = self.nodes[id].children[child_slot(color, level)]
				.ok_or(FrameError::PaletteLookupFailure { color })?;
			level += 1;
		}
		Ok(self.nodes[id].palette_index)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn tree_of(colors: &[Color]) -> Octree {
		let mut tree = Octree::new();
		for &color in colors {
			tree.add_color(color);
		}
		tree
	}

	#[test]
	fn slot_takes_red_green_blue_bits() {
		assert_eq!(child_slot(0xFF0000, 0), 4);
		assert_eq!(child_slot(0x00FF00, 0), 2);
		assert_eq!(child_slot(0x0000FF, 0), 1);
		assert_eq!(child_slot(0x010101, 7), 7);
		assert_eq!(child_slot(0x010101, 6), 0);
	}

	#[test]
	fn repeated_colors_share_a_leaf() {
		let mut tree = tree_of(&[0x102030, 0x102030, 0x102030]);
		assert_eq!(tree.leaf_count(), 1);
		let palette = tree.create_palette(256).unwrap();
		assert_eq!(palette.as_slice(), &[0x102030]);
		assert_eq!(tree.palette_index(0x102030), Ok(0));
		let leaf = tree.previous.map(|(_, leaf)| leaf);
		assert_eq!(leaf.map(|l| tree.nodes[l].pixel_count), Some(3));
	}

	#[test]
	fn alternating_colors_count_separately() {
		let mut tree = tree_of(&[0x000000, 0xFFFFFF, 0x000000, 0xFFFFFF, 0x000000]);
		assert_eq!(tree.leaf_count(), 2);
		tree.create_palette(256).unwrap();
		let counts: Vec<_> = tree.nodes.iter()
			.filter(|n| n.leaf)
			.map(|n| n.pixel_count)
			.collect();
		assert_eq!(counts, vec![3, 2]);
	}

	#[test]
	fn palette_is_in_slot_order() {
		let mut tree = tree_of(&[0xFF0000, 0x00FF00, 0x0000FF, 0x000000]);
		let palette = tree.create_palette(256).unwrap();
		assert_eq!(palette.as_slice(), &[0x000000, 0x0000FF, 0x00FF00, 0xFF0000]);
		assert_eq!(tree.palette_index(0xFF0000), Ok(3));
	}

	#[test]
	fn reduce_folds_newest_node_first() {
		// 0 and 1 split at level 7 under one node, 2 and 3 under a second
		// node registered later at the same level.
		let mut tree = tree_of(&[0x000000, 0x000001, 0x000002, 0x000003]);
		assert_eq!(tree.leaf_count(), 4);
		let palette = tree.create_palette(8).unwrap();
		assert_eq!(palette.len(), 4);

		let mut tree = tree_of(&[0x000000, 0x000001, 0x000002, 0x000003]);
		assert_eq!(tree.reduce(), Some(1));
		assert_eq!(tree.leaf_count(), 3);
		let palette = tree.create_palette(8).unwrap();
		assert_eq!(palette.as_slice(), &[0x000000, 0x000001, 0x000002]);
		assert_eq!(tree.palette_index(0x000003), Ok(2));
		assert_eq!(tree.palette_index(0x000001), Ok(1));
	}

	#[test]
	fn reduce_strictly_shrinks() {
		let colors: Vec<Color> = (0..600u32).map(|n| n.wrapping_mul(0x9E3779B1) & 0xFFFFFF).collect();
		let mut tree = tree_of(&colors);
		let mut leaves = tree.leaf_count();
		while let Some(removed) = tree.reduce() {
			assert!(removed >= 1);
			assert_eq!(tree.leaf_count(), leaves - removed);
			leaves = tree.leaf_count();
		}
		assert!(tree.leaf_count() <= 8);
	}

	#[test]
	fn reduce_clears_the_run_cache() {
		let mut tree = tree_of(&[0x000000, 0x000001]);
		assert!(tree.previous.is_some());
		tree.reduce();
		assert!(tree.previous.is_none());
		tree.add_color(0x000001);
		assert_eq!(tree.leaf_count(), 1);
		let palette = tree.create_palette(8).unwrap();
		assert_eq!(palette.as_slice(), &[0x000000]);
	}

	#[test]
	fn palette_respects_bound() {
		let colors: Vec<Color> = (0..4096u32).map(|n| (n & 0xF) << 20 | (n >> 4 & 0xF) << 12 | (n >> 8) << 4).collect();
		let mut tree = tree_of(&colors);
		assert_eq!(tree.leaf_count(), 4096);
		let palette = tree.create_palette(16).unwrap();
		assert!(palette.len() <= 16);
		for &color in colors.iter() {
			assert!(tree.palette_index(color).unwrap() < palette.len());
		}
	}

	#[test]
	fn unseen_color_fails_lookup() {
		let mut tree = tree_of(&[0x000000]);
		tree.create_palette(256).unwrap();
		assert_eq!(
			tree.palette_index(0xFFFFFF),
			Err(FrameError::PaletteLookupFailure { color: 0xFFFFFF })
		);
	}

	#[test]
	fn small_palettes_are_rejected() {
		let mut tree = tree_of(&[0x000000]);
		assert!(matches!(tree.create_palette(2), Err(FrameError::InvalidArgument(_))));
	}
}
