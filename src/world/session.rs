use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{WorldError, WorldResult};
use crate::math::coord::BlockCoord;
use crate::nbt::tag::Map;

use super::chunk::EditOutcome;
use super::command::Command;
use super::region::Region;

/// Behavior switches for one editing session. All default to off.
#[derive(Debug, Default, Clone, Copy)]
pub struct SessionFlags {
	/// Treat air blocks like null glyphs: id 0 writes are counted as
	/// skipped and leave the chunk alone. Useful when re-running a
	/// blueprint over a world that has been played in; things players
	/// add tend to sit in the blueprint's empty spaces, and this keeps
	/// them.
	pub treat_air_as_skip: bool,
	/// Skip every entity write. Blocks replace themselves on a re-run,
	/// but entities are always new; without this a second run doubles
	/// the livestock.
	pub skip_entities: bool,
	/// Arm the one-shot tile-entity reset on every loaded chunk; the
	/// first block-entity write against a chunk then drops the list
	/// the file came with. Suppresses the duplicate block entities a
	/// re-run would otherwise pile up, which crash the game.
	pub reset_block_entities: bool,
	/// Print a readable dump of every populated chunk's tag tree to
	/// stdout while saving.
	pub emit_decoded_dump: bool,
	/// Emit one trace line per parsed tag, with chunk context, while
	/// decoding.
	pub verbose_nbt_trace: bool,
}

/// Applied and skipped tallies for one edit kind.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
	pub applied: u64,
	pub skipped: u64,
}

impl Tally {
	fn record(&mut self, outcome: EditOutcome) {
		match outcome {
			EditOutcome::Applied => self.applied += 1,
			EditOutcome::Skipped => self.skipped += 1,
		}
	}

	fn skip(&mut self) {
		self.skipped += 1;
	}
}

/// Per-kind edit tallies, reported when the session flushes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EditCounters {
	pub blocks: Tally,
	pub entities: Tally,
	pub block_entities: Tally,
}

impl std::fmt::Display for EditCounters {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"blocks: {} applied, {} skipped; entities: {} applied, {} skipped; block entities: {} applied, {} skipped",
			self.blocks.applied,
			self.blocks.skipped,
			self.entities.applied,
			self.entities.skipped,
			self.block_entities.applied,
			self.block_entities.skipped,
		)
	}
}

/// An editing session over one world directory.
///
/// The session owns every region it touches: regions are loaded on
/// first edit and stay resident, dirty trees and all, until
/// [WorldSession::save_all] flushes them back over the original files.
/// Ownership flows downward from here: session, then regions, then
/// chunks, then each chunk's tree and index.
pub struct WorldSession {
	dir: PathBuf,
	flags: SessionFlags,
	regions: Vec<Region>,
	counters: EditCounters,
}

impl WorldSession {
	pub fn open(dir: impl AsRef<Path>, flags: SessionFlags) -> Self {
		Self {
			dir: dir.as_ref().to_owned(),
			flags,
			regions: Vec::new(),
			counters: EditCounters::default(),
		}
	}

	pub fn flags(&self) -> &SessionFlags {
		&self.flags
	}

	pub fn counters(&self) -> &EditCounters {
		&self.counters
	}

	pub fn loaded_regions(&self) -> usize {
		self.regions.len()
	}

	fn region_file(dir: &Path, rx: i32, rz: i32) -> PathBuf {
		dir.join(format!("r.{rx}.{rz}.mca"))
	}

	/// Returns the cached region holding `(rx, rz)`, loading it on
	/// first touch. Lookup is a linear scan; a blueprint rarely spans
	/// more than a few regions.
	fn lookup_region<'a>(
		regions: &'a mut Vec<Region>,
		dir: &Path,
		flags: &SessionFlags,
		rx: i32,
		rz: i32,
	) -> WorldResult<&'a mut Region> {
		if let Some(position) = regions
			.iter()
			.position(|region| region.rx == rx && region.rz == rz)
		{
			return Ok(&mut regions[position]);
		}
		let region = Region::load(
			&Self::region_file(dir, rx, rz),
			rx,
			rz,
			flags.reset_block_entities,
			flags.verbose_nbt_trace,
		)?;
		regions.push(region);
		let last = regions.len() - 1;
		Ok(&mut regions[last])
	}

	/// Routes a block write to its chunk. The region is chosen by x
	/// and z alone; y only selects the section within the chunk and
	/// must lie in `0..256`.
	pub fn place_block(&mut self, x: i32, y: i32, z: i32, id: u16, data: u8) -> WorldResult<()> {
		if self.flags.treat_air_as_skip && id == 0 {
			self.counters.blocks.skip();
			return Ok(());
		}
		WorldError::range_check(y, 0..256)?;
		let pos = BlockCoord::new(x, y, z);
		let region_pos = pos.region_coord();
		let chunk_pos = pos.chunk_coord();
		let outcome = {
			let region = Self::lookup_region(
				&mut self.regions,
				&self.dir,
				&self.flags,
				region_pos.x,
				region_pos.z,
			)?;
			region.chunk_mut(chunk_pos.x, chunk_pos.z).set_block(pos, id, data)?
		};
		self.counters.blocks.record(outcome);
		Ok(())
	}

	/// Routes an entity insertion to its chunk. The compound is
	/// consumed by the chunk's list.
	pub fn place_entity(&mut self, x: i32, y: i32, z: i32, nbt: Map) -> WorldResult<()> {
		if self.flags.skip_entities {
			self.counters.entities.skip();
			return Ok(());
		}
		let pos = BlockCoord::new(x, y, z);
		let region_pos = pos.region_coord();
		let chunk_pos = pos.chunk_coord();
		let outcome = {
			let region = Self::lookup_region(
				&mut self.regions,
				&self.dir,
				&self.flags,
				region_pos.x,
				region_pos.z,
			)?;
			region.chunk_mut(chunk_pos.x, chunk_pos.z).add_entity(pos, nbt)?
		};
		self.counters.entities.record(outcome);
		Ok(())
	}

	/// Routes a block-entity insertion to its chunk. The compound is
	/// consumed by the chunk's list.
	pub fn place_block_entity(&mut self, x: i32, y: i32, z: i32, nbt: Map) -> WorldResult<()> {
		let pos = BlockCoord::new(x, y, z);
		let region_pos = pos.region_coord();
		let chunk_pos = pos.chunk_coord();
		let outcome = {
			let region = Self::lookup_region(
				&mut self.regions,
				&self.dir,
				&self.flags,
				region_pos.x,
				region_pos.z,
			)?;
			region
				.chunk_mut(chunk_pos.x, chunk_pos.z)
				.add_block_entity(pos, nbt)?
		};
		self.counters.block_entities.record(outcome);
		Ok(())
	}

	/// Dispatches one record of the blueprint command stream.
	pub fn apply(&mut self, command: Command) -> WorldResult<()> {
		match command {
			Command::Block { x, y, z, id, data } => self.place_block(x, y, z, id, data),
			Command::Entity { x, y, z, nbt } => self.place_entity(x, y, z, nbt),
			Command::BlockEntity { x, y, z, nbt } => self.place_block_entity(x, y, z, nbt),
		}
	}

	/// Flushes every cached region back over its file, in cache order,
	/// and reports the edit tallies. There is no transaction across
	/// regions; a crash mid-save corrupts the region being written and
	/// no other.
	pub fn save_all(&mut self) -> WorldResult<EditCounters> {
		for region in &mut self.regions {
			let path = Self::region_file(&self.dir, region.rx, region.rz);
			region.save(&path, self.flags.emit_decoded_dump)?;
		}
		info!(target: "worldsmith::session", "{}", self.counters);
		Ok(self.counters)
	}
}
