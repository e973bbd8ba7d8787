use std::io::{
	Read,
	Write,
};

use tracing::trace;

use crate::error::{WorldError, WorldResult};
use crate::ioext::{Readable, ReadExt, Writable, WriteExt};

use super::tag::{
	ListTag,
	Map,
	NamedTag,
	Tag,
	TagId,
};

/// Reads a complete named tag from a stream. This is the entry point
/// for decoding a chunk's decompressed payload.
///
/// `trace_ctx` is the chunk context prepended to the per-tag trace
/// lines emitted while decoding; pass `None` for silence.
///
/// An end marker in root position is an error; roots are always
/// fully-formed named tags.
pub fn read_named_tag<R: Read>(reader: &mut R, trace_ctx: Option<&str>) -> WorldResult<NamedTag> {
	match read_named(reader, trace_ctx)? {
		Some((name, tag)) => Ok(NamedTag { name, tag }),
		None => Err(WorldError::EndTagMarker),
	}
}

/// Writes a complete named tag to a stream, returning the number of
/// bytes written.
pub fn write_named_tag<W: Write>(writer: &mut W, name: &str, tag: &Tag) -> WorldResult<usize> {
	let mut written = writer.write_value(tag.id().value())?;
	written += write_string(writer, name)?;
	written += write_payload(writer, tag)?;
	Ok(written)
}

impl Readable for NamedTag {
	fn read_from<R: Read>(reader: &mut R) -> WorldResult<Self> {
		read_named_tag(reader, None)
	}
}

impl Writable for NamedTag {
	fn write_to<W: Write>(&self, writer: &mut W) -> WorldResult<usize> {
		write_named_tag(writer, &self.name, &self.tag)
	}
}

/// Reads one named tag, or `None` for the end marker that terminates a
/// compound. The marker is a lone ID byte; it has no name, not even a
/// zero name length.
fn read_named<R: Read>(reader: &mut R, trace_ctx: Option<&str>) -> WorldResult<Option<(String, Tag)>> {
	let id = TagId::try_from(reader.read_value::<u8>()?)?;
	if id == TagId::End {
		return Ok(None);
	}
	let name = read_string(reader)?;
	if let Some(ctx) = trace_ctx {
		trace!(target: "worldsmith::nbt", "{ctx}; type {id}; name {name}");
	}
	let tag = read_payload(reader, id, trace_ctx)?;
	Ok(Some((name, tag)))
}

fn read_string<R: Read>(reader: &mut R) -> WorldResult<String> {
	let length = reader.read_value::<u16>()? as usize;
	let mut buf = vec![0u8; length];
	reader.read_exact(&mut buf)?;
	Ok(String::from_utf8(buf)?)
}

/// Reads an array or list length, rejecting negatives.
fn read_length<R: Read>(reader: &mut R) -> WorldResult<usize> {
	let length = reader.read_value::<i32>()?;
	if length < 0 {
		return Err(WorldError::InvalidLength(length));
	}
	Ok(length as usize)
}

fn read_byte_array<R: Read>(reader: &mut R) -> WorldResult<Vec<i8>> {
	let length = read_length(reader)?;
	let mut buf = vec![0u8; length];
	reader.read_exact(&mut buf)?;
	Ok(buf.into_iter().map(|byte| byte as i8).collect())
}

fn read_int_array<R: Read>(reader: &mut R) -> WorldResult<Vec<i32>> {
	let length = read_length(reader)?;
	(0..length).map(|_| reader.read_value::<i32>()).collect()
}

fn read_long_array<R: Read>(reader: &mut R) -> WorldResult<Vec<i64>> {
	let length = read_length(reader)?;
	(0..length).map(|_| reader.read_value::<i64>()).collect()
}

fn read_payload<R: Read>(reader: &mut R, id: TagId, trace_ctx: Option<&str>) -> WorldResult<Tag> {
	Ok(match id {
		// Handled by the callers; a payload read for End is a bug
		// upstream in the framing.
		TagId::End => return Err(WorldError::EndTagMarker),
		TagId::Byte => Tag::Byte(reader.read_value()?),
		TagId::Short => Tag::Short(reader.read_value()?),
		TagId::Int => Tag::Int(reader.read_value()?),
		TagId::Long => Tag::Long(reader.read_value()?),
		TagId::Float => Tag::Float(reader.read_value()?),
		TagId::Double => Tag::Double(reader.read_value()?),
		TagId::ByteArray => Tag::ByteArray(read_byte_array(reader)?),
		TagId::String => Tag::String(read_string(reader)?),
		TagId::List => Tag::List(read_list(reader, trace_ctx)?),
		TagId::Compound => Tag::Compound(read_compound(reader, trace_ctx)?),
		TagId::IntArray => Tag::IntArray(read_int_array(reader)?),
		TagId::LongArray => Tag::LongArray(read_long_array(reader)?),
	})
}

/// Lists store one element tag and a length, then that many bare
/// payloads. A zero-length list is legal with any element tag
/// (including the end tag) and decodes as `Empty`.
fn read_list<R: Read>(reader: &mut R, trace_ctx: Option<&str>) -> WorldResult<ListTag> {
	let element = TagId::try_from(reader.read_value::<u8>()?)?;
	let length = read_length(reader)?;
	if length == 0 {
		return Ok(ListTag::Empty);
	}
	macro_rules! read_elements {
		($read:expr) => {
			(0..length).map(|_| $read).collect::<WorldResult<_>>()?
		};
	}
	Ok(match element {
		TagId::End => return Err(WorldError::EndTagMarker),
		TagId::Byte => ListTag::Byte(read_elements!(reader.read_value::<i8>())),
		TagId::Short => ListTag::Short(read_elements!(reader.read_value::<i16>())),
		TagId::Int => ListTag::Int(read_elements!(reader.read_value::<i32>())),
		TagId::Long => ListTag::Long(read_elements!(reader.read_value::<i64>())),
		TagId::Float => ListTag::Float(read_elements!(reader.read_value::<f32>())),
		TagId::Double => ListTag::Double(read_elements!(reader.read_value::<f64>())),
		TagId::ByteArray => ListTag::ByteArray(read_elements!(read_byte_array(reader))),
		TagId::String => ListTag::String(read_elements!(read_string(reader))),
		TagId::List => ListTag::List(read_elements!(read_list(reader, trace_ctx))),
		TagId::Compound => ListTag::Compound(read_elements!(read_compound(reader, trace_ctx))),
		TagId::IntArray => ListTag::IntArray(read_elements!(read_int_array(reader))),
		TagId::LongArray => ListTag::LongArray(read_elements!(read_long_array(reader))),
	})
}

/// Compounds have no length prefix; children accumulate until the end
/// marker, which is consumed but not kept.
fn read_compound<R: Read>(reader: &mut R, trace_ctx: Option<&str>) -> WorldResult<Map> {
	let mut map = Map::new();
	while let Some((name, tag)) = read_named(reader, trace_ctx)? {
		map.insert(name, tag);
	}
	Ok(map)
}

fn write_string<W: Write>(writer: &mut W, value: &str) -> WorldResult<usize> {
	WorldError::range_check(value.len(), 0..=u16::MAX as usize)?;
	let mut written = writer.write_value(value.len() as u16)?;
	writer.write_all(value.as_bytes())?;
	written += value.len();
	Ok(written)
}

fn write_byte_array<W: Write>(writer: &mut W, value: &[i8]) -> WorldResult<usize> {
	let mut written = writer.write_value(value.len() as i32)?;
	let bytes: Vec<u8> = value.iter().map(|&byte| byte as u8).collect();
	writer.write_all(&bytes)?;
	written += bytes.len();
	Ok(written)
}

fn write_int_array<W: Write>(writer: &mut W, value: &[i32]) -> WorldResult<usize> {
	let mut written = writer.write_value(value.len() as i32)?;
	for element in value {
		written += writer.write_value(*element)?;
	}
	Ok(written)
}

fn write_long_array<W: Write>(writer: &mut W, value: &[i64]) -> WorldResult<usize> {
	let mut written = writer.write_value(value.len() as i32)?;
	for element in value {
		written += writer.write_value(*element)?;
	}
	Ok(written)
}

fn write_payload<W: Write>(writer: &mut W, tag: &Tag) -> WorldResult<usize> {
	Ok(match tag {
		Tag::Byte(value) => writer.write_value(*value)?,
		Tag::Short(value) => writer.write_value(*value)?,
		Tag::Int(value) => writer.write_value(*value)?,
		Tag::Long(value) => writer.write_value(*value)?,
		Tag::Float(value) => writer.write_value(*value)?,
		Tag::Double(value) => writer.write_value(*value)?,
		Tag::ByteArray(value) => write_byte_array(writer, value)?,
		Tag::String(value) => write_string(writer, value)?,
		Tag::List(value) => write_list(writer, value)?,
		Tag::Compound(value) => write_compound(writer, value)?,
		Tag::IntArray(value) => write_int_array(writer, value)?,
		Tag::LongArray(value) => write_long_array(writer, value)?,
	})
}

/// List elements are bare payloads: no per-element tag ID and no name,
/// not even a zero name length.
fn write_list<W: Write>(writer: &mut W, list: &ListTag) -> WorldResult<usize> {
	let mut written = writer.write_value(list.id().value())?;
	written += writer.write_value(list.len() as i32)?;
	macro_rules! write_elements {
		($list:expr, $write:expr) => {
			for element in $list {
				written += $write(writer, element)?;
			}
		};
	}
	match list {
		ListTag::Empty => (),
		ListTag::Byte(list) => write_elements!(list, |w: &mut W, v: &i8| w.write_value(*v)),
		ListTag::Short(list) => write_elements!(list, |w: &mut W, v: &i16| w.write_value(*v)),
		ListTag::Int(list) => write_elements!(list, |w: &mut W, v: &i32| w.write_value(*v)),
		ListTag::Long(list) => write_elements!(list, |w: &mut W, v: &i64| w.write_value(*v)),
		ListTag::Float(list) => write_elements!(list, |w: &mut W, v: &f32| w.write_value(*v)),
		ListTag::Double(list) => write_elements!(list, |w: &mut W, v: &f64| w.write_value(*v)),
		ListTag::ByteArray(list) => write_elements!(list, |w: &mut W, v: &Vec<i8>| write_byte_array(w, v)),
		ListTag::String(list) => write_elements!(list, |w: &mut W, v: &String| write_string(w, v)),
		ListTag::List(list) => write_elements!(list, write_list),
		ListTag::Compound(list) => write_elements!(list, write_compound),
		ListTag::IntArray(list) => write_elements!(list, |w: &mut W, v: &Vec<i32>| write_int_array(w, v)),
		ListTag::LongArray(list) => write_elements!(list, |w: &mut W, v: &Vec<i64>| write_long_array(w, v)),
	}
	Ok(written)
}

/// The end marker was consumed while decoding, so one is appended
/// after the children here.
fn write_compound<W: Write>(writer: &mut W, map: &Map) -> WorldResult<usize> {
	let mut written = 0;
	for (name, tag) in map {
		written += write_named_tag(writer, name, tag)?;
	}
	written += writer.write_value(TagId::End.value())?;
	Ok(written)
}
