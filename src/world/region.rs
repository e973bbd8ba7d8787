use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use tracing::info;

use crate::error::{WorldError, WorldResult};
use crate::ioext::{Readable, Writable, WriteExt};
use crate::nbt::format::dump_named_tag;
use crate::nbt::io::read_named_tag;

use super::chunk::Chunk;
use super::io::region::{
	chunk_pad_size,
	chunk_sector_count,
	CompressionScheme,
	RegionCoord,
	RegionHeader,
	RegionSector,
};

/// One loaded region file: 32x32 chunk slots plus the header they were
/// read with. Chunks stay resident, and dirty or not, until
/// [Region::save] rewrites the whole file.
pub struct Region {
	pub rx: i32,
	pub rz: i32,
	header: RegionHeader,
	chunks: Vec<Chunk>,
}

impl Region {
	/// Reads a whole region file into memory, decompressing and
	/// decoding every populated chunk and building each chunk's path
	/// index.
	///
	/// `reset_block_entities` arms every chunk's one-shot tile-entity
	/// reset; `trace_nbt` turns on the decoder's per-tag trace lines.
	pub fn load(
		path: &Path,
		rx: i32,
		rz: i32,
		reset_block_entities: bool,
		trace_nbt: bool,
	) -> WorldResult<Self> {
		info!(target: "worldsmith::region", "loading region file {}", path.display());
		let buf = fs::read(path)?;
		if buf.len() < 8192 {
			return Err(WorldError::TruncatedHeader);
		}
		let header = RegionHeader::read_from(&mut &buf[..8192])?;

		let mut chunks = Vec::with_capacity(1024);
		for index in 0..1024usize {
			let ix = (index % 32) as i32;
			let iz = (index / 32) as i32;
			let cx = ix + rx * 32;
			let cz = iz + rz * 32;

			let sector = header.sectors[index];
			let timestamp: u32 = header.timestamps[index].into();
			// A slot only holds a chunk when offset, sector count and
			// timestamp are all non-zero. The format does not say so
			// outright, but it is the convention the game observes.
			if sector.sector_offset() == 0 || sector.sector_count() == 0 || timestamp == 0 {
				chunks.push(Chunk::empty(ix, iz, cx, cz, reset_block_entities));
				continue;
			}

			let truncated = || WorldError::TruncatedChunk { x: ix, z: iz };
			let range = sector.offset() as usize..sector.end_offset() as usize;
			let slice = buf.get(range).ok_or_else(truncated)?;
			let length = u32::from_be_bytes([slice[0], slice[1], slice[2], slice[3]]) as usize;
			let code = slice[4];
			// The format permits gzip as well, but every chunk ever
			// observed is zlib; gzip support would be premature until a
			// file shows up needing it.
			if CompressionScheme::from_code(code) != Some(CompressionScheme::ZLib) {
				return Err(WorldError::UnsupportedCompression {
					scheme: code,
					x: ix,
					z: iz,
				});
			}
			if length == 0 {
				return Err(truncated());
			}
			let payload = slice.get(5..4 + length).ok_or_else(truncated)?;

			let trace_label = trace_nbt.then(|| format!("chunk {ix}, {iz}"));
			let mut decoder = ZlibDecoder::new(payload);
			let root = read_named_tag(&mut decoder, trace_label.as_deref())?;
			chunks.push(Chunk::with_data(
				ix,
				iz,
				cx,
				cz,
				reset_block_entities,
				root,
			)?);
		}

		Ok(Self {
			rx,
			rz,
			header,
			chunks,
		})
	}

	/// Serializes every populated chunk and rewrites the region file
	/// with a header rebuilt from scratch. Chunk data is laid out in
	/// slot order starting at sector 2; timestamps are carried over
	/// from load unchanged. With `dump` set, each chunk's tree is
	/// printed to stdout before compression.
	pub fn save(&mut self, path: &Path, dump: bool) -> WorldResult<()> {
		info!(target: "worldsmith::region", "saving region file {}", path.display());

		// Compress first: the header needs every chunk's sector count
		// before anything can be written.
		let mut payloads: Vec<Option<Vec<u8>>> = Vec::with_capacity(1024);
		let mut next_sector: u32 = 2;
		for index in 0..1024usize {
			let chunk = &self.chunks[index];
			if chunk.ix() != (index % 32) as i32 || chunk.iz() != (index / 32) as i32 {
				return Err(WorldError::ChunkMisaligned {
					index,
					ix: chunk.ix(),
					iz: chunk.iz(),
				});
			}
			let Some(root) = chunk.data() else {
				self.header.sectors[index] = RegionSector::empty();
				payloads.push(None);
				continue;
			};
			if dump {
				dump_named_tag(&mut std::io::stdout(), root)?;
			}
			let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
			root.write_to(&mut encoder)?;
			let compressed = encoder.finish()?;
			// The stored length includes the compression code byte.
			let payload_len = (compressed.len() + 1) as u32;
			let count = chunk_sector_count(payload_len);
			if count > 255 {
				return Err(WorldError::ChunkTooLarge {
					x: chunk.ix(),
					z: chunk.iz(),
				});
			}
			self.header.sectors[index] = RegionSector::new(next_sector, count as u8);
			next_sector += count;
			payloads.push(Some(compressed));
		}

		let file = File::create(path)?;
		let mut writer = BufWriter::new(file);
		self.header.write_to(&mut writer)?;
		for compressed in payloads.iter().flatten() {
			let payload_len = (compressed.len() + 1) as u32;
			writer.write_value(payload_len)?;
			CompressionScheme::ZLib.write_to(&mut writer)?;
			writer.write_all(compressed)?;
			writer.write_zeroes(chunk_pad_size(payload_len) as u64)?;
		}
		writer.flush()?;
		Ok(())
	}

	/// The chunk slot for an absolute chunk coordinate.
	pub fn chunk(&self, cx: i32, cz: i32) -> &Chunk {
		&self.chunks[RegionCoord::new(cx, cz).index()]
	}

	/// The chunk slot for an absolute chunk coordinate.
	pub fn chunk_mut(&mut self, cx: i32, cz: i32) -> &mut Chunk {
		&mut self.chunks[RegionCoord::new(cx, cz).index()]
	}

	pub fn header(&self) -> &RegionHeader {
		&self.header
	}

	pub fn chunks(&self) -> &[Chunk] {
		&self.chunks
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::math::coord::BlockCoord;
	use crate::nbt::tagpath::TagPath;
	use crate::world::io::region::is_multiple_of_4096;
	use crate::world::testutil::{blank_chunk_root, temp_path, write_region_fixture};

	#[test]
	fn load_save_reload_preserves_chunks() {
		let path = temp_path("region-roundtrip.mca");
		write_region_fixture(&path, &[(0, 0, blank_chunk_root(0, 0)), (3, 1, blank_chunk_root(3, 1))])
			.unwrap();
		let mut region = Region::load(&path, 0, 0, false, false).unwrap();
		let before: Vec<_> = region
			.chunks()
			.iter()
			.filter_map(|chunk| chunk.data().cloned())
			.collect();
		region.save(&path, false).unwrap();
		let reloaded = Region::load(&path, 0, 0, false, false).unwrap();
		let after: Vec<_> = reloaded
			.chunks()
			.iter()
			.filter_map(|chunk| chunk.data().cloned())
			.collect();
		assert_eq!(before.len(), 2);
		assert_eq!(before, after);
		std::fs::remove_file(&path).unwrap();
	}

	#[test]
	fn saved_offsets_are_sequential_and_disjoint() {
		let path = temp_path("region-offsets.mca");
		let fixture: Vec<_> = (0..5)
			.map(|i| (i, 0, blank_chunk_root(i, 0)))
			.collect();
		write_region_fixture(&path, &fixture).unwrap();
		let mut region = Region::load(&path, 0, 0, false, false).unwrap();
		region.save(&path, false).unwrap();

		let bytes = std::fs::read(&path).unwrap();
		assert!(is_multiple_of_4096(bytes.len() as u64));
		let reloaded = Region::load(&path, 0, 0, false, false).unwrap();
		let mut expected_offset = 2u64;
		for i in 0..5usize {
			let sector = reloaded.header().sectors[i];
			assert_eq!(sector.sector_offset(), expected_offset);
			assert!(sector.sector_count() >= 1);
			// The length prefix must sit exactly at the header's offset.
			let at = sector.offset() as usize;
			let length = u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]);
			assert!(length > 0);
			assert_eq!(bytes[at + 4], 2);
			expected_offset += sector.sector_count();
		}
		assert!(reloaded.header().sectors[5usize].is_empty());
		std::fs::remove_file(&path).unwrap();
	}

	#[test]
	fn edit_into_blank_chunk_then_save_and_reload() {
		let path = temp_path("region-edit.mca");
		write_region_fixture(&path, &[(0, 0, blank_chunk_root(0, 0))]).unwrap();
		let mut region = Region::load(&path, 0, 0, false, false).unwrap();
		region
			.chunk_mut(0, 0)
			.set_block(BlockCoord::new(0, 0, 0), 1, 0)
			.unwrap();
		region.save(&path, false).unwrap();

		let reloaded = Region::load(&path, 0, 0, false, false).unwrap();
		let sector = reloaded.header().sectors[0usize];
		assert!(sector.sector_offset() >= 2);
		assert!(sector.sector_count() >= 1);
		let chunk = reloaded.chunk(0, 0);
		let sections = chunk
			.data()
			.unwrap()
			.tag
			.find_child(TagPath::parse("Level/Sections").unwrap().path())
			.unwrap();
		assert_eq!(sections.as_list().unwrap().len(), 1);
		let blocks = chunk
			.data()
			.unwrap()
			.tag
			.find_child(TagPath::parse("Level/Sections/0/Blocks").unwrap().path())
			.unwrap();
		let blocks = blocks.as_byte_array().unwrap();
		assert_eq!(blocks[0], 1);
		assert!(blocks[1..].iter().all(|&b| b == 0));
		let height = chunk
			.data()
			.unwrap()
			.tag
			.find_child(TagPath::parse("Level/HeightMap/0").unwrap().path())
			.unwrap();
		assert_eq!(height.as_int(), Some(&0));
		std::fs::remove_file(&path).unwrap();
	}

	#[test]
	fn high_edit_survives_the_round_trip() {
		let path = temp_path("region-high-edit.mca");
		write_region_fixture(&path, &[(0, 0, blank_chunk_root(0, 0))]).unwrap();
		let mut region = Region::load(&path, 0, 0, false, false).unwrap();
		region
			.chunk_mut(0, 0)
			.set_block(BlockCoord::new(0, 64, 0), 1, 0)
			.unwrap();
		region.save(&path, false).unwrap();

		let reloaded = Region::load(&path, 0, 0, false, false).unwrap();
		let blocks = reloaded
			.chunk(0, 0)
			.data()
			.unwrap()
			.tag
			.find_child(TagPath::parse("Level/Sections/4/Blocks").unwrap().path())
			.unwrap();
		assert_eq!(blocks.as_byte_array().unwrap()[0], 1);
		std::fs::remove_file(&path).unwrap();
	}

	#[test]
	fn foreign_compression_code_aborts_the_load() {
		let path = temp_path("region-gzip.mca");
		write_region_fixture(&path, &[(0, 0, blank_chunk_root(0, 0))]).unwrap();
		// Corrupt the compression byte of slot 0 (sector 2, after the
		// 4-byte length).
		let mut bytes = std::fs::read(&path).unwrap();
		bytes[2 * 4096 + 4] = 1;
		std::fs::write(&path, &bytes).unwrap();
		assert!(matches!(
			Region::load(&path, 0, 0, false, false),
			Err(WorldError::UnsupportedCompression { scheme: 1, x: 0, z: 0 })
		));
		std::fs::remove_file(&path).unwrap();
	}

	#[test]
	fn header_shorter_than_two_sectors_is_fatal() {
		let path = temp_path("region-short.mca");
		std::fs::write(&path, vec![0u8; 100]).unwrap();
		assert!(matches!(
			Region::load(&path, 0, 0, false, false),
			Err(WorldError::TruncatedHeader)
		));
		std::fs::remove_file(&path).unwrap();
	}

	#[test]
	fn zeroed_timestamp_means_no_chunk() {
		let path = temp_path("region-timestamp.mca");
		write_region_fixture(&path, &[(0, 0, blank_chunk_root(0, 0))]).unwrap();
		let mut bytes = std::fs::read(&path).unwrap();
		// Clear slot 0's timestamp; the offset and count stay put.
		bytes[4096..4100].fill(0);
		std::fs::write(&path, &bytes).unwrap();
		let region = Region::load(&path, 0, 0, false, false).unwrap();
		assert!(!region.chunk(0, 0).is_populated());
		std::fs::remove_file(&path).unwrap();
	}
}
