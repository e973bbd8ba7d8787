

use thiserror::Error;

use crate::nbt::tag::TagId;

/// The master error type.
#[derive(Debug, Error)]
pub enum WorldError {
	#[error("IO Error: {0}")]
	IoError(#[from] std::io::Error),
	#[error("Failed to convert to UTF-8 string.")]
	FromUtf8Error(#[from] std::string::FromUtf8Error),
	#[error("Unsupported Tag ID: {0}")]
	UnsupportedTagId(u8),
	#[error("Encountered the End Tag ID marker.")]
	EndTagMarker,
	#[error("Negative length prefix: {0}")]
	InvalidLength(i32),
	#[error("Unsupported compression scheme {scheme} for chunk ({x}, {z}); only zlib (2) is written in practice.")]
	UnsupportedCompression { scheme: u8, x: i32, z: i32 },
	#[error("Region file too small to hold its header.")]
	TruncatedHeader,
	#[error("Region file truncated reading chunk ({x}, {z}).")]
	TruncatedChunk { x: i32, z: i32 },
	#[error("Chunk at linear index {index} carries unexpected local coordinates ({ix}, {iz}).")]
	ChunkMisaligned { index: usize, ix: i32, iz: i32 },
	#[error("Compressed chunk ({x}, {z}) does not fit in 255 sectors.")]
	ChunkTooLarge { x: i32, z: i32 },
	#[error("Chunk data is missing \"{0}\".")]
	MissingChunkData(String),
	#[error("Unexpected tag at \"{path}\": expected {expected}, found {found}.")]
	UnexpectedTag { path: String, expected: TagId, found: TagId },
	#[error("Out of range error.")]
	OutOfRange,
	#[error("{0}")]
	Custom(String),
}

pub type WorldResult<T> = Result<T, WorldError>;

impl WorldError {

	pub fn range_check<T, R>(value: T, range: R) -> Result<(), WorldError>
	where
	T: PartialOrd + Sized,
	R: std::ops::RangeBounds<T> {
		if range.contains(&value) {
			Ok(())
		} else {
			Err(WorldError::OutOfRange)
		}
	}

	pub fn custom<T, S: AsRef<str>>(msg: S) -> Result<T, Self> {
		Err(WorldError::Custom(msg.as_ref().to_owned()))
	}
}
