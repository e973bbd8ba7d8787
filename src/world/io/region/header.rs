use crate::{
    ioext::*,
    WorldResult,
};

use super::sector::*;
use super::timestamp::*;
use super::coord::*;

use std::{
    io::{
        Read, Write,
    },
    ops::{
        Index, IndexMut,
    },
};

/// A table of 1024 elements, one per potential chunk in a 32x32 chunk
/// region file.
#[derive(Debug, Clone)]
pub struct RegionTable<T>(Box<[T; 1024]>);

/// The sector table, containing information about where chunks exist
/// in the file.
pub type SectorTable = RegionTable<RegionSector>;

/// The timestamp table, which tells the last modification time for
/// each chunk.
pub type TimestampTable = RegionTable<Timestamp>;

/// The header at the beginning of every region file:
/// 1024 [RegionSector] elements followed by 1024 [Timestamp] elements.
#[derive(Debug, Clone, Default)]
pub struct RegionHeader {
    pub sectors: SectorTable,
    pub timestamps: TimestampTable,
}

impl<T> RegionTable<T> {
    /// Returns an iterator of the elements in the table.
    pub fn iter(&self) -> std::slice::Iter<T> {
        self.0.iter()
    }

    /// Returns a mutable iterator of the elements in the table.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<T> {
        self.0.iter_mut()
    }
}

impl<T: Default + Copy> Default for RegionTable<T> {
    fn default() -> Self {
        Self(Box::new([T::default(); 1024]))
    }
}

impl<C: Into<RegionCoord>, T> Index<C> for RegionTable<T> {
    type Output = T;

    fn index(&self, index: C) -> &Self::Output {
        let coord: RegionCoord = index.into();
        &self.0[coord.index()]
    }
}

impl<C: Into<RegionCoord>, T> IndexMut<C> for RegionTable<T> {
    fn index_mut(&mut self, index: C) -> &mut Self::Output {
        let coord: RegionCoord = index.into();
        &mut self.0[coord.index()]
    }
}

impl<T: Readable + Default + Copy> Readable for RegionTable<T> {
    fn read_from<R: Read>(reader: &mut R) -> WorldResult<Self> {
        let mut table = Box::new([T::default(); 1024]);
        for element in table.iter_mut() {
            *element = T::read_from(reader)?;
        }
        Ok(Self(table))
    }
}

impl<T: Writable> Writable for RegionTable<T> {
    fn write_to<W: Write>(&self, writer: &mut W) -> WorldResult<usize> {
        let mut write_size: usize = 0;
        for element in self.0.iter() {
            write_size += element.write_to(writer)?;
        }
        Ok(write_size)
    }
}

impl Readable for RegionHeader {
    fn read_from<R: Read>(reader: &mut R) -> WorldResult<Self> {
        Ok(Self {
            sectors: SectorTable::read_from(reader)?,
            timestamps: TimestampTable::read_from(reader)?,
        })
    }
}

impl Writable for RegionHeader {
    fn write_to<W: Write>(&self, writer: &mut W) -> WorldResult<usize> {
        Ok(
            self.sectors.write_to(writer)? + self.timestamps.write_to(writer)?
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_header_is_all_zeroes() {
        let header = RegionHeader::default();
        let mut buf = Vec::new();
        assert_eq!(header.write_to(&mut buf).unwrap(), 8192);
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn header_round_trip() {
        let mut header = RegionHeader::default();
        header.sectors[(0i32, 0i32)] = RegionSector::new(2, 1);
        header.sectors[(31i32, 31i32)] = RegionSector::new(3, 2);
        header.timestamps[(0i32, 0i32)] = Timestamp::from(1234u32);
        let mut buf = Vec::new();
        header.write_to(&mut buf).unwrap();
        let decoded = RegionHeader::read_from(&mut buf.as_slice()).unwrap();
        assert_eq!(decoded.sectors[0usize], RegionSector::new(2, 1));
        assert_eq!(decoded.sectors[1023usize], RegionSector::new(3, 2));
        assert_eq!(decoded.timestamps[0usize], Timestamp::from(1234u32));
        assert!(decoded.sectors[5usize].is_empty());
    }
}
