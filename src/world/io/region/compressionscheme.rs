use std::io::Write;

use crate::{
    WorldResult,
    ioext::*,
};

/// Compression scheme used for chunk payloads.
/// The format permits all three; in practice every chunk on disk is
/// ZLib, and that is the only scheme this crate will decode or encode.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionScheme {
    /// GZip compression is used.
    GZip = 1,
    /// ZLib compression is used.
    ZLib = 2,
    /// Data is uncompressed.
    Uncompressed = 3,
}

impl CompressionScheme {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::GZip),
            2 => Some(Self::ZLib),
            3 => Some(Self::Uncompressed),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

impl Writable for CompressionScheme {
    fn write_to<W: Write>(&self, writer: &mut W) -> WorldResult<usize> {
        writer.write_value(self.code())
    }
}
