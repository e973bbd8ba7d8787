//! Fixture builders shared by the world-level tests. Region files are
//! written with the low-level primitives rather than [Region::save] so
//! the load path is tested against independently produced bytes.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::compound;
use crate::ioext::{Writable, WriteExt};
use crate::nbt::tag::{ListTag, Map, NamedTag, Tag};
use crate::WorldResult;

use super::io::region::{
	chunk_pad_size,
	chunk_sector_count,
	RegionCoord,
	RegionHeader,
	RegionSector,
	Timestamp,
};

/// A chunk tree with the attributes the edit engine consumes and no
/// stored sections.
pub(crate) fn blank_chunk_root(cx: i32, cz: i32) -> NamedTag {
	let level = compound! {
		("xPos", cx),
		("zPos", cz),
		("LightPopulated", 1i8),
		("HeightMap", vec![0i32; 256]),
		("Sections", Tag::List(ListTag::Empty)),
		("Entities", Tag::List(ListTag::Empty)),
		("TileEntities", Tag::List(ListTag::Empty)),
	};
	NamedTag::new(compound! { ("Level", level) })
}

/// A generated entity compound in the layout the entity builder
/// produces: id, the UUID halves, then the position placeholder at
/// child index 3.
pub(crate) fn entity_compound(id: &str) -> Map {
	let tag = compound! {
		("id", id),
		("UUIDMost", 0x1234_5678_9abc_def0i64),
		("UUIDLeast", 0x0fed_cba9_8765_4321i64),
		("Pos", crate::list![0.0f64, 0.0, 0.0]),
		("Health", 20.0f32),
	};
	let Tag::Compound(map) = tag else {
		unreachable!()
	};
	map
}

/// A generated block-entity compound: id, then the int coordinate
/// placeholders at child indices 1, 2 and 3.
pub(crate) fn block_entity_compound(id: &str) -> Map {
	let tag = compound! {
		("id", id),
		("x", 0i32),
		("y", 0i32),
		("z", 0i32),
		("Items", Tag::List(ListTag::Empty)),
	};
	let Tag::Compound(map) = tag else {
		unreachable!()
	};
	map
}

pub(crate) fn temp_path(name: &str) -> PathBuf {
	std::env::temp_dir().join(format!("worldsmith-{}-{name}", std::process::id()))
}

/// Creates a fresh world directory under the system temp dir.
pub(crate) fn temp_world_dir(name: &str) -> PathBuf {
	let dir = temp_path(&format!("world-{name}"));
	let _ = fs::remove_dir_all(&dir);
	fs::create_dir_all(&dir).unwrap();
	dir
}

/// Writes a region file holding the given chunks at their local chunk
/// coordinates, with sequential sector offsets and timestamp 1.
pub(crate) fn write_region_fixture(
	path: &Path,
	chunks: &[(i32, i32, NamedTag)],
) -> WorldResult<()> {
	let mut header = RegionHeader::default();
	let mut payloads = Vec::new();
	let mut next_sector = 2u32;
	for (ix, iz, root) in chunks {
		let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
		root.write_to(&mut encoder)?;
		let compressed = encoder.finish()?;
		let payload_len = (compressed.len() + 1) as u32;
		let count = chunk_sector_count(payload_len);
		let coord = RegionCoord::new(*ix, *iz);
		header.sectors[coord] = RegionSector::new(next_sector, count as u8);
		header.timestamps[coord] = Timestamp::from(1u32);
		next_sector += count;
		payloads.push(compressed);
	}
	let mut writer = BufWriter::new(File::create(path)?);
	header.write_to(&mut writer)?;
	for compressed in &payloads {
		let payload_len = (compressed.len() + 1) as u32;
		writer.write_value(payload_len)?;
		writer.write_value(2u8)?;
		writer.write_all(compressed)?;
		writer.write_zeroes(chunk_pad_size(payload_len) as u64)?;
	}
	writer.flush()?;
	Ok(())
}
