use crate::error::{WorldError, WorldResult};
use crate::math::coord::BlockCoord;
use crate::nbt::tag::{ListTag, Map, NamedTag, Tag, TagId};
use crate::nbt::tagref::ValueRefMut;

use super::index::ChunkIndex;

/// What became of one edit. Edits aimed at a chunk slot that holds no
/// data are demoted to `Skipped` rather than failing the run; the
/// session tallies both outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
	Applied,
	Skipped,
}

/// One 16x16x256 column of a region, either an empty slot or a decoded
/// tag tree with its path index. Chunks also remember their local and
/// absolute coordinates so the save pass can verify slot alignment.
pub struct Chunk {
	ix: i32,
	iz: i32,
	cx: i32,
	cz: i32,
	data: Option<NamedTag>,
	index: ChunkIndex,
	/// With the reset flag on, the first block-entity edit against this
	/// chunk clears the `TileEntities` the file came with. Consumed by
	/// that first edit.
	reset_needed: bool,
}

macro_rules! typed_lookup {
	($(#[$attr:meta])* $name:ident, $into:ident, $expected:ident, $type:ty) => {
		$(#[$attr])*
		fn $name(&mut self, key: &str) -> WorldResult<Option<&mut $type>> {
			match self.find_mut(key) {
				None => Ok(None),
				Some(value) => {
					let found = value.tag_id();
					match value.$into() {
						Some(value) => Ok(Some(value)),
						None => Err(WorldError::UnexpectedTag {
							path: key.to_owned(),
							expected: TagId::$expected,
							found,
						}),
					}
				}
			}
		}
	};
}

impl Chunk {
	/// A slot with no chunk data.
	pub fn empty(ix: i32, iz: i32, cx: i32, cz: i32, reset_needed: bool) -> Self {
		Self {
			ix,
			iz,
			cx,
			cz,
			data: None,
			index: ChunkIndex::default(),
			reset_needed,
		}
	}

	/// Wraps a decoded chunk tree, building its path index.
	pub fn with_data(
		ix: i32,
		iz: i32,
		cx: i32,
		cz: i32,
		reset_needed: bool,
		data: NamedTag,
	) -> WorldResult<Self> {
		let index = ChunkIndex::build(&data)?;
		Ok(Self {
			ix,
			iz,
			cx,
			cz,
			data: Some(data),
			index,
			reset_needed,
		})
	}

	pub fn ix(&self) -> i32 {
		self.ix
	}

	pub fn iz(&self) -> i32 {
		self.iz
	}

	pub fn cx(&self) -> i32 {
		self.cx
	}

	pub fn cz(&self) -> i32 {
		self.cz
	}

	pub fn is_populated(&self) -> bool {
		self.data.is_some()
	}

	pub fn data(&self) -> Option<&NamedTag> {
		self.data.as_ref()
	}

	pub fn index(&self) -> &ChunkIndex {
		&self.index
	}

	/// Walks to the node behind an index key, if the chunk has data and
	/// the key is indexed.
	fn find_mut(&mut self, key: &str) -> Option<ValueRefMut<'_>> {
		let path = self.index.get(key)?.clone();
		self.data.as_mut()?.tag.find_child_mut(path.path())
	}

	typed_lookup!(byte_array_mut, into_byte_array, ByteArray, Vec<i8>);
	typed_lookup!(int_array_mut, into_int_array, IntArray, Vec<i32>);
	typed_lookup!(list_mut, into_list, List, ListTag);
	typed_lookup!(byte_mut, into_byte, Byte, i8);

	/// Writes a block id and its 4-bit data value at a world position
	/// inside this chunk. Callers must have constrained `pos.y` to
	/// `0..256` already.
	///
	/// Sections the write needs that the file did not store are
	/// synthesized as all-air first, so the column stays contiguous up
	/// to the written height. The height map rises for non-air writes
	/// and `LightPopulated` is cleared so the game relights the chunk
	/// on next load.
	pub fn set_block(&mut self, pos: BlockCoord, id: u16, data: u8) -> WorldResult<EditOutcome> {
		if self.data.is_none() {
			return Ok(EditOutcome::Skipped);
		}
		let (chunk_ix, chunk_iz) = (self.ix, self.iz);

		let cy = pos.section_y();
		self.ensure_sections(cy as usize)?;

		let blocks_key = format!("Sections/{cy}/Blocks");
		let data_key = format!("Sections/{cy}/Data");
		// Both targets must exist before either is touched.
		if !self.index.contains(&blocks_key) || !self.index.contains(&data_key) {
			return Ok(EditOutcome::Skipped);
		}

		let voxel = pos.voxel_index();

		let Some(blocks) = self.byte_array_mut(&blocks_key)? else {
			return Ok(EditOutcome::Skipped);
		};
		if blocks.len() <= voxel {
			return WorldError::custom(format!(
				"Blocks array of length {} in chunk ({chunk_ix}, {chunk_iz}) cannot hold voxel {voxel}.",
				blocks.len(),
			));
		}
		// The format reserves 12 bits per block id but the upper nybble
		// lives in an optional second array that nothing here writes;
		// only the legacy 8-bit portion is stored.
		blocks[voxel] = (id & 0xFF) as u8 as i8;

		let Some(nibbles) = self.byte_array_mut(&data_key)? else {
			return Ok(EditOutcome::Skipped);
		};
		let half = voxel / 2;
		if nibbles.len() <= half {
			return WorldError::custom(format!(
				"Data array of length {} in chunk ({chunk_ix}, {chunk_iz}) cannot hold voxel {voxel}.",
				nibbles.len(),
			));
		}
		// One nybble per voxel: even voxels own the low nybble, odd
		// voxels the high one. The neighbor's nybble is preserved.
		let current = nibbles[half] as u8;
		let packed = if voxel % 2 == 0 {
			(current & 0xF0) | (data & 0x0F)
		} else {
			(current & 0x0F) | (data << 4)
		};
		nibbles[half] = packed as i8;

		// The height map feeds light calculations. Air does not raise
		// it, so light keeps shining down to the highest solid block.
		let (ix, _, iz) = pos.chunk_local();
		let column = (iz * 16 + ix) as usize;
		let Some(height_map) = self.int_array_mut("HeightMap")? else {
			return Err(WorldError::MissingChunkData("HeightMap".to_owned()));
		};
		if height_map.len() <= column {
			return WorldError::custom(format!(
				"HeightMap of length {} in chunk ({chunk_ix}, {chunk_iz}) cannot hold column {column}.",
				height_map.len(),
			));
		}
		if id != 0 && pos.y > height_map[column] {
			height_map[column] = pos.y;
		}

		// Zero tells the game to recalculate lighting for this chunk.
		let Some(light_populated) = self.byte_mut("LightPopulated")? else {
			return Err(WorldError::MissingChunkData("LightPopulated".to_owned()));
		};
		*light_populated = 0;

		Ok(EditOutcome::Applied)
	}

	/// Empty sections of a chunk are not stored in the region file, but
	/// we might want to build into them anyway. Any missing section
	/// from the bottom of the column up to `cy` is appended as all-air,
	/// and the paths the block writer reads are patched into the index.
	fn ensure_sections(&mut self, cy: usize) -> WorldResult<()> {
		for i in 0..=cy {
			if self.index.contains(&format!("Sections/{i}/Y")) {
				continue;
			}
			let section = Map::from([
				("Y".to_owned(), Tag::Byte(i as i8)),
				("Blocks".to_owned(), Tag::ByteArray(vec![0; 4096])),
				("Data".to_owned(), Tag::ByteArray(vec![0; 2048])),
				("SkyLight".to_owned(), Tag::ByteArray(vec![0; 2048])),
				("BlockLight".to_owned(), Tag::ByteArray(vec![0; 2048])),
			]);
			let Some(sections) = self.list_mut("Sections")? else {
				return Err(WorldError::MissingChunkData("Sections".to_owned()));
			};
			match sections {
				ListTag::Compound(list) => list.push(section),
				ListTag::Empty => *sections = ListTag::Compound(vec![section]),
				other => {
					return Err(WorldError::UnexpectedTag {
						path: "Sections".to_owned(),
						expected: TagId::Compound,
						found: other.id(),
					})
				}
			}
			let Some(sections_path) = self.index.get("Sections").cloned() else {
				return Err(WorldError::MissingChunkData("Sections".to_owned()));
			};
			let section_path = sections_path.join(i);
			for member in ["Y", "Blocks", "Data"] {
				self.index
					.insert(format!("Sections/{i}/{member}"), section_path.join(member));
			}
		}
		Ok(())
	}

	/// Appends a pre-built entity compound to this chunk's `Entities`
	/// list, stamping its position list (the fourth child: three
	/// doubles) with the given coordinates. The compound is consumed.
	pub fn add_entity(&mut self, pos: BlockCoord, mut entity: Map) -> WorldResult<EditOutcome> {
		if self.data.is_none() || !self.index.contains("Entities") {
			return Ok(EditOutcome::Skipped);
		}

		// We generated the entity ourselves, so the position list is at
		// a known child offset. Entities saved back out by the game
		// carry no such guarantee, but we never edit those.
		let Some((_, Tag::List(ListTag::Double(position)))) = entity.get_index_mut(3) else {
			return WorldError::custom("entity compound has no position list at child index 3");
		};
		if position.len() != 3 {
			return WorldError::custom(format!(
				"entity position list has {} entries instead of 3",
				position.len()
			));
		}
		position[0] = pos.x as f64;
		position[1] = pos.y as f64;
		position[2] = pos.z as f64;

		self.append_to_list("Entities", entity)?;
		Ok(EditOutcome::Applied)
	}

	/// Appends a pre-built block-entity compound to this chunk's
	/// `TileEntities` list, stamping its int coordinates (children 1,
	/// 2 and 3). The compound is consumed.
	///
	/// The game crashes when a chunk carries two block entities at the
	/// same coordinates, which is exactly what re-running a blueprint
	/// against an already-built world produces. When the chunk's reset
	/// flag is armed, the first write drops the list the file came
	/// with; edits of the same run then stack normally.
	pub fn add_block_entity(&mut self, pos: BlockCoord, mut entity: Map) -> WorldResult<EditOutcome> {
		if self.data.is_none() || !self.index.contains("TileEntities") {
			return Ok(EditOutcome::Skipped);
		}

		if self.reset_needed {
			if let Some(list) = self.list_mut("TileEntities")? {
				match list {
					ListTag::Compound(entries) => entries.clear(),
					_ => *list = ListTag::Empty,
				}
			}
			self.reset_needed = false;
		}

		for (child, value) in [(1usize, pos.x), (2, pos.y), (3, pos.z)] {
			let Some((_, Tag::Int(coord))) = entity.get_index_mut(child) else {
				return WorldError::custom(format!(
					"block entity compound has no int coordinate at child index {child}"
				));
			};
			*coord = value;
		}

		self.append_to_list("TileEntities", entity)?;
		Ok(EditOutcome::Applied)
	}

	/// Appends a compound to one of the chunk's open-ended lists. An
	/// empty list takes on the compound element type with the first
	/// append.
	fn append_to_list(&mut self, key: &str, entry: Map) -> WorldResult<()> {
		let Some(list) = self.list_mut(key)? else {
			return Err(WorldError::MissingChunkData(key.to_owned()));
		};
		match list {
			ListTag::Compound(entries) => entries.push(entry),
			ListTag::Empty => *list = ListTag::Compound(vec![entry]),
			other => {
				return Err(WorldError::UnexpectedTag {
					path: key.to_owned(),
					expected: TagId::Compound,
					found: other.id(),
				})
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::nbt::tagpath::TagPath;
	use crate::world::testutil::{blank_chunk_root, block_entity_compound, entity_compound};

	fn populated_chunk() -> Chunk {
		Chunk::with_data(0, 0, 0, 0, false, blank_chunk_root(0, 0)).unwrap()
	}

	fn blocks_of(chunk: &Chunk, section: usize) -> Vec<i8> {
		let path = TagPath::parse(format!("Level/Sections/{section}/Blocks")).unwrap();
		chunk
			.data()
			.unwrap()
			.tag
			.find_child(path.path())
			.unwrap()
			.as_byte_array()
			.unwrap()
			.clone()
	}

	fn height_at(chunk: &Chunk, column: usize) -> i32 {
		let path = chunk.index().get("HeightMap").unwrap();
		chunk.data().unwrap().tag.find_child(path.path()).unwrap().as_int_array().unwrap()[column]
	}

	#[test]
	fn writes_into_an_empty_slot_are_skipped() {
		let mut chunk = Chunk::empty(0, 0, 0, 0, false);
		let outcome = chunk.set_block(BlockCoord::new(0, 0, 0), 1, 0).unwrap();
		assert_eq!(outcome, EditOutcome::Skipped);
	}

	#[test]
	fn high_write_synthesizes_sections_below() {
		// Placing at y=33 lands in section 2; sections 0 and 1 must be
		// created as all-air along the way.
		let mut chunk = populated_chunk();
		let outcome = chunk
			.set_block(BlockCoord::new(15, 33, 15), 98, 0)
			.unwrap();
		assert_eq!(outcome, EditOutcome::Applied);
		for section in 0..=2 {
			assert!(chunk.index().contains(&format!("Sections/{section}/Y")));
			assert!(chunk.index().contains(&format!("Sections/{section}/Blocks")));
		}
		let voxel = ((33 % 16) * 256 + 15 * 16 + 15) as usize;
		let blocks = blocks_of(&chunk, 2);
		assert_eq!(blocks[voxel], 98u8 as i8);
		assert!(blocks.iter().enumerate().all(|(i, &b)| i == voxel || b == 0));
		assert!(blocks_of(&chunk, 0).iter().all(|&b| b == 0));
		assert!(blocks_of(&chunk, 1).iter().all(|&b| b == 0));
		assert_eq!(height_at(&chunk, 15 * 16 + 15), 33);
		// Section Y bytes count up from the bottom.
		for section in 0..=2i64 {
			let path = TagPath::parse(&format!("Level/Sections/{section}/Y")).unwrap();
			let y = chunk.data().unwrap().tag.find_child(path.path()).unwrap();
			assert_eq!(y.as_byte(), Some(&(section as i8)));
		}
	}

	#[test]
	fn light_population_flag_is_cleared() {
		let mut chunk = populated_chunk();
		chunk.set_block(BlockCoord::new(0, 0, 0), 1, 0).unwrap();
		let path = chunk.index().get("LightPopulated").unwrap();
		let light = chunk.data().unwrap().tag.find_child(path.path()).unwrap();
		assert_eq!(light.as_byte(), Some(&0));
	}

	#[test]
	fn data_nybbles_pack_low_then_high() {
		let mut chunk = populated_chunk();
		chunk.set_block(BlockCoord::new(0, 0, 0), 67, 0x3).unwrap();
		chunk.set_block(BlockCoord::new(1, 0, 0), 67, 0x5).unwrap();
		let path = TagPath::parse("Level/Sections/0/Data").unwrap();
		let data = chunk.data().unwrap().tag.find_child(path.path()).unwrap();
		assert_eq!(data.as_byte_array().unwrap()[0] as u8, 0x53);
	}

	#[test]
	fn neighbor_nybble_survives() {
		let mut chunk = populated_chunk();
		chunk.set_block(BlockCoord::new(0, 0, 0), 1, 0xF).unwrap();
		chunk.set_block(BlockCoord::new(1, 0, 0), 1, 0x0).unwrap();
		let path = TagPath::parse("Level/Sections/0/Data").unwrap();
		let data = chunk.data().unwrap().tag.find_child(path.path()).unwrap();
		assert_eq!(data.as_byte_array().unwrap()[0] as u8, 0x0F);
	}

	#[test]
	fn block_writes_are_idempotent() {
		let mut once = populated_chunk();
		once.set_block(BlockCoord::new(3, 20, 9), 42, 7).unwrap();
		let mut twice = populated_chunk();
		twice.set_block(BlockCoord::new(3, 20, 9), 42, 7).unwrap();
		twice.set_block(BlockCoord::new(3, 20, 9), 42, 7).unwrap();
		assert_eq!(once.data(), twice.data());
	}

	#[test]
	fn height_map_ignores_air_and_lower_writes() {
		let mut chunk = populated_chunk();
		chunk.set_block(BlockCoord::new(2, 40, 2), 1, 0).unwrap();
		assert_eq!(height_at(&chunk, 2 * 16 + 2), 40);
		// Air placed higher does not raise the column.
		chunk.set_block(BlockCoord::new(2, 50, 2), 0, 0).unwrap();
		assert_eq!(height_at(&chunk, 2 * 16 + 2), 40);
		// A lower solid block does not either.
		chunk.set_block(BlockCoord::new(2, 10, 2), 1, 0).unwrap();
		assert_eq!(height_at(&chunk, 2 * 16 + 2), 40);
		// A higher one does.
		chunk.set_block(BlockCoord::new(2, 41, 2), 1, 0).unwrap();
		assert_eq!(height_at(&chunk, 2 * 16 + 2), 41);
	}

	#[test]
	fn entities_are_stamped_and_appended() {
		let mut chunk = populated_chunk();
		let outcome = chunk
			.add_entity(BlockCoord::new(10, 64, -3), entity_compound("Sheep"))
			.unwrap();
		assert_eq!(outcome, EditOutcome::Applied);
		let path = chunk.index().get("Entities").unwrap().clone();
		let list = chunk.data().unwrap().tag.find_child(path.path()).unwrap();
		let ListTag::Compound(entities) = list.as_list().unwrap() else {
			panic!("expected a compound list");
		};
		assert_eq!(entities.len(), 1);
		let Some(Tag::List(ListTag::Double(position))) = entities[0].get("Pos") else {
			panic!("expected a Pos list");
		};
		assert_eq!(position, &vec![10.0, 64.0, -3.0]);
	}

	#[test]
	fn block_entities_reset_once_when_armed() {
		let mut chunk = Chunk::with_data(0, 0, 0, 0, true, blank_chunk_root(0, 0)).unwrap();
		// Preload a stale entry like a previous run would have left.
		chunk
			.append_to_list("TileEntities", {
				let Tag::Compound(map) = crate::compound!(("id", "Chest")) else {
					unreachable!()
				};
				map
			})
			.unwrap();
		chunk
			.add_block_entity(BlockCoord::new(1, 2, 3), block_entity_compound("Chest"))
			.unwrap();
		chunk
			.add_block_entity(BlockCoord::new(1, 2, 3), block_entity_compound("Chest"))
			.unwrap();
		let path = chunk.index().get("TileEntities").unwrap().clone();
		let list = chunk.data().unwrap().tag.find_child(path.path()).unwrap();
		let ListTag::Compound(entries) = list.as_list().unwrap() else {
			panic!("expected a compound list");
		};
		// The stale entry is gone; both writes of this run remain, with
		// no dedup between them.
		assert_eq!(entries.len(), 2);
		assert_eq!(entries[0].get("x"), Some(&Tag::Int(1)));
		assert_eq!(entries[0].get("y"), Some(&Tag::Int(2)));
		assert_eq!(entries[0].get("z"), Some(&Tag::Int(3)));
	}

	#[test]
	fn block_entities_stack_when_reset_is_off() {
		let mut chunk = populated_chunk();
		for _ in 0..2 {
			chunk
				.add_block_entity(BlockCoord::new(4, 5, 6), block_entity_compound("Chest"))
				.unwrap();
		}
		let path = chunk.index().get("TileEntities").unwrap().clone();
		let list = chunk.data().unwrap().tag.find_child(path.path()).unwrap();
		assert_eq!(list.as_list().unwrap().len(), 2);
	}
}
