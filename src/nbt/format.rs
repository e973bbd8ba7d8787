//! Human readable rendering of tag trees, used by diagnostics and the
//! decoded-dump flag.

use std::io::{self, Write};

use super::tag::{
	ListTag,
	Map,
	NamedTag,
	Tag,
	TagId,
};

/// Tests whether a string can appear in a path or dump without
/// quoting.
pub fn is_identifier(s: &str) -> bool {
	!s.is_empty()
		&& s.chars()
			.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+' | '.'))
}

/// Writes a string with the usual escapes for quotes, backslashes and
/// control characters.
pub fn write_escaped_string<W: std::fmt::Write>(f: &mut W, s: &str) -> std::fmt::Result {
	for c in s.chars() {
		match c {
			'"' => write!(f, "\\\"")?,
			'\\' => write!(f, "\\\\")?,
			'\n' => write!(f, "\\n")?,
			'\r' => write!(f, "\\r")?,
			'\t' => write!(f, "\\t")?,
			other => write!(f, "{other}")?,
		}
	}
	Ok(())
}

fn quoted(name: &str) -> String {
	if is_identifier(name) {
		name.to_owned()
	} else {
		let mut buf = String::with_capacity(name.len() + 2);
		buf.push('"');
		let _ = write_escaped_string(&mut buf, name);
		buf.push('"');
		buf
	}
}

/// Writes an indented dump of a whole tree, one line per scalar and
/// one header plus braces per collection. Array contents are
/// summarized by length; chunks carry multi-kilobyte arrays that are
/// useless to print element by element.
pub fn dump_named_tag<W: Write>(writer: &mut W, root: &NamedTag) -> io::Result<()> {
	dump_tag(writer, Some(root.name.as_str()), &root.tag, 0)
}

fn indent<W: Write>(writer: &mut W, depth: usize) -> io::Result<()> {
	for _ in 0..depth {
		write!(writer, "  ")?;
	}
	Ok(())
}

fn header(name: Option<&str>, id: TagId) -> String {
	match name {
		Some(name) => format!("{}({})", id.title(), quoted(name)),
		None => id.title().to_owned(),
	}
}

fn dump_tag<W: Write>(writer: &mut W, name: Option<&str>, tag: &Tag, depth: usize) -> io::Result<()> {
	indent(writer, depth)?;
	let head = header(name, tag.id());
	match tag {
		Tag::Byte(value) => writeln!(writer, "{head}: {value}"),
		Tag::Short(value) => writeln!(writer, "{head}: {value}"),
		Tag::Int(value) => writeln!(writer, "{head}: {value}"),
		Tag::Long(value) => writeln!(writer, "{head}: {value}"),
		Tag::Float(value) => writeln!(writer, "{head}: {value}"),
		Tag::Double(value) => writeln!(writer, "{head}: {value}"),
		Tag::String(value) => {
			let mut escaped = String::new();
			let _ = write_escaped_string(&mut escaped, value);
			writeln!(writer, "{head}: \"{escaped}\"")
		}
		Tag::ByteArray(value) => writeln!(writer, "{head}: [{} bytes]", value.len()),
		Tag::IntArray(value) => writeln!(writer, "{head}: [{} ints]", value.len()),
		Tag::LongArray(value) => writeln!(writer, "{head}: [{} longs]", value.len()),
		Tag::List(list) => dump_list(writer, &head, list, depth),
		Tag::Compound(map) => dump_compound(writer, &head, map, depth),
	}
}

fn dump_compound<W: Write>(writer: &mut W, head: &str, map: &Map, depth: usize) -> io::Result<()> {
	writeln!(writer, "{head}: {} entries {{", map.len())?;
	for (name, tag) in map {
		dump_tag(writer, Some(name.as_str()), tag, depth + 1)?;
	}
	indent(writer, depth)?;
	writeln!(writer, "}}")
}

fn dump_list<W: Write>(writer: &mut W, head: &str, list: &ListTag, depth: usize) -> io::Result<()> {
	writeln!(
		writer,
		"{head}: {} entries of {} {{",
		list.len(),
		list.id().title()
	)?;
	macro_rules! scalar_elements {
		($list:expr) => {
			for value in $list {
				indent(writer, depth + 1)?;
				writeln!(writer, "{value}")?;
			}
		};
	}
	match list {
		ListTag::Empty => (),
		ListTag::Byte(list) => scalar_elements!(list),
		ListTag::Short(list) => scalar_elements!(list),
		ListTag::Int(list) => scalar_elements!(list),
		ListTag::Long(list) => scalar_elements!(list),
		ListTag::Float(list) => scalar_elements!(list),
		ListTag::Double(list) => scalar_elements!(list),
		ListTag::String(list) => {
			for value in list {
				indent(writer, depth + 1)?;
				let mut escaped = String::new();
				let _ = write_escaped_string(&mut escaped, value);
				writeln!(writer, "\"{escaped}\"")?;
			}
		}
		ListTag::ByteArray(list) => {
			for value in list {
				indent(writer, depth + 1)?;
				writeln!(writer, "[{} bytes]", value.len())?;
			}
		}
		ListTag::IntArray(list) => {
			for value in list {
				indent(writer, depth + 1)?;
				writeln!(writer, "[{} ints]", value.len())?;
			}
		}
		ListTag::LongArray(list) => {
			for value in list {
				indent(writer, depth + 1)?;
				writeln!(writer, "[{} longs]", value.len())?;
			}
		}
		ListTag::List(list) => {
			for value in list {
				indent(writer, depth + 1)?;
				dump_list(writer, TagId::List.title(), value, depth + 1)?;
			}
		}
		ListTag::Compound(list) => {
			for map in list {
				indent(writer, depth + 1)?;
				dump_compound(writer, TagId::Compound.title(), map, depth + 1)?;
			}
		}
	}
	indent(writer, depth)?;
	writeln!(writer, "}}")
}
