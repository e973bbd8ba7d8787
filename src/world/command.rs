use crate::nbt::tag::Map;

/// One record of the blueprint command stream.
///
/// The blueprint front end lexes glyph lines into these; end-of-layer
/// ticks and the rest of the blueprint syntax are consumed upstream
/// and never reach the engine. Entity and block-entity compounds
/// arrive fully built (name, UUID halves, attribute subtree) with
/// placeholder coordinates that the edit engine stamps.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
	/// Write a block id and 4-bit data value at a world position.
	Block {
		x: i32,
		y: i32,
		z: i32,
		id: u16,
		data: u8,
	},
	/// Insert an entity compound into the target chunk's `Entities`.
	Entity {
		x: i32,
		y: i32,
		z: i32,
		nbt: Map,
	},
	/// Insert a block-entity compound into the target chunk's
	/// `TileEntities`.
	BlockEntity {
		x: i32,
		y: i32,
		z: i32,
		nbt: Map,
	},
}
