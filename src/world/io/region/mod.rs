pub mod header;
pub mod sector;
pub use sector::RegionSector;
pub mod timestamp;
pub use timestamp::Timestamp;
pub mod coord;
pub use coord::RegionCoord;
pub mod compressionscheme;
pub use compressionscheme::CompressionScheme;
pub use header::{RegionHeader, SectorTable, TimestampTable};

/*  How do Region files work?

    Region files have an 8KiB header that contains two tables, each table
    with 1024 32-bit elements.

    The first table is the Sector Offset table. Sector offsets are 2
    values, the actual offset, and the size. Both of these values are
    packed into 4 bytes. The offset is 3 bytes big-endian and the size is
    1 byte. They are laid out in memory like so: |offset(3)|size(1)|
    This layout means that when these 4 bytes are turned into a single
    32-bit unsigned integer, the individual values can be accessed like so:
        For the offset: value_u32 >> 8
        For the size:   value_u32 & 0xFF

    Directly after the offset table is the timestamp table, which also
    contains 1024 32-bit elements. The timestamps are Unix timestamps.

    These 1024 elements in these 2 tables represent data associated with
    some chunk that may be written to the file. There are 32x32 potential
    slots for chunks. A slot only holds a chunk when its offset, its
    sector count, and its timestamp are all non-zero.

    Both values within the sector offset must be multiplied by 4096 to get
    a byte position: the offset is measured in 4KiB sectors from the start
    of the file, so the lowest offset of real chunk data is 2, directly
    after the two header sectors.

    At that position sits a 32-bit unsigned (big-endian) integer holding
    the byte length of the data that follows it, then one byte naming the
    compression scheme (1 for GZip, 2 for ZLib, 3 for uncompressed; only
    ZLib occurs in practice and only ZLib is accepted here), then
    (length - 1) bytes of compressed NBT. After the chunk come pad bytes
    up to the next 4KiB boundary; the file size must stay a multiple of
    4096 or the game rejects it.
*/

/// Tests if a value is a multiple of 4096.
pub const fn is_multiple_of_4096(n: u64) -> bool {
	(n & 4095) == 0
}

/// Counts the 4KiB sectors reserved for a chunk whose payload (the
/// compression byte plus the compressed bytes) is `payload_len` long.
/// The 4-byte length prefix shares the first sector with the payload.
pub const fn chunk_sector_count(payload_len: u32) -> u32 {
	(payload_len + 4) / 4096 + 1
}

/// The number of zero bytes that pad a chunk of `payload_len` out to
/// its sector boundary.
pub const fn chunk_pad_size(payload_len: u32) -> u32 {
	chunk_sector_count(payload_len) * 4096 - (payload_len + 4)
}
