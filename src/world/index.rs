use std::collections::HashMap;

use crate::error::{WorldError, WorldResult};
use crate::nbt::tag::{ListTag, NamedTag, Tag};
use crate::nbt::tagpath::{TagPath, TagPathPart};

/// A path-keyed directory into a chunk's decoded tag tree.
///
/// Chunk data is an unordered hierarchy, which makes it cumbersome to
/// go hunting for a given node on every edit, so each chunk gets a map
/// from a flat name like `Sections/3/Blocks` to the [TagPath] that
/// reaches it. Entries hold path fragments rather than references, so
/// the index never aliases the tree it describes; lookups walk the
/// path on demand.
///
/// The index is built exactly once, when the chunk is decoded. Any
/// path the edit engine may read it must first ensure is present; the
/// section synthesis in the edit engine patches new entries in as it
/// appends sections.
#[derive(Debug, Default)]
pub struct ChunkIndex {
	paths: HashMap<String, TagPath>,
}

impl ChunkIndex {
	/// Builds the directory for a freshly decoded chunk. The root
	/// compound's first child is the per-chunk `Level` compound by
	/// convention; every named child of `Level` gets an entry, and the
	/// members of each section get `Sections/{i}/{member}` entries.
	pub fn build(root: &NamedTag) -> WorldResult<Self> {
		let mut paths = HashMap::new();
		let Tag::Compound(root_map) = &root.tag else {
			return Err(WorldError::MissingChunkData("Level".to_owned()));
		};
		let Some((_, Tag::Compound(level))) = root_map.get_index(0) else {
			return Err(WorldError::MissingChunkData("Level".to_owned()));
		};
		let level_path = TagPath(vec![TagPathPart::AtIndex(0)]);
		paths.insert("Level".to_owned(), level_path.clone());
		for (name, tag) in level {
			let child_path = level_path.join(name.as_str());
			if name == "Sections" {
				if let Tag::List(ListTag::Compound(sections)) = tag {
					for (i, section) in sections.iter().enumerate() {
						let section_path = child_path.join(i);
						for member in section.keys() {
							paths.insert(
								format!("Sections/{i}/{member}"),
								section_path.join(member.as_str()),
							);
						}
					}
				}
			}
			paths.insert(name.clone(), child_path);
		}
		Ok(Self { paths })
	}

	pub fn get(&self, key: &str) -> Option<&TagPath> {
		self.paths.get(key)
	}

	pub fn contains(&self, key: &str) -> bool {
		self.paths.contains_key(key)
	}

	pub fn insert(&mut self, key: String, path: TagPath) {
		self.paths.insert(key, path);
	}

	pub fn len(&self) -> usize {
		self.paths.len()
	}

	pub fn is_empty(&self) -> bool {
		self.paths.is_empty()
	}
}
