use std::fmt::Display;
use std::str::FromStr;

use chumsky::prelude::*;

use thiserror::Error;

use crate::for_each_int_type;

/// One step of a path into a tag tree: either a key into a compound,
/// or an index into a list, array, or the insertion order of a
/// compound. Negative indices count from the end.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Debug)]
pub enum TagPathPart {
	AtIndex(i64),
	AtKey(String),
}

impl From<&str> for TagPathPart {
	fn from(value: &str) -> Self {
		TagPathPart::AtKey(value.to_owned())
	}
}

impl From<String> for TagPathPart {
	fn from(value: String) -> Self {
		TagPathPart::AtKey(value)
	}
}

macro_rules! __tagpathpart_numeric_impl {
	($type:ty) => {
		impl From<$type> for TagPathPart {
			fn from(value: $type) -> Self {
				TagPathPart::AtIndex(value as i64)
			}
		}
	};
}

for_each_int_type!(__tagpathpart_numeric_impl);

// List positions arrive as usize from enumerate and len.
impl From<usize> for TagPathPart {
	fn from(value: usize) -> Self {
		TagPathPart::AtIndex(value as i64)
	}
}

#[derive(Debug, Error)]
pub enum TagPathError {
	#[error("Failed to parse tag path.")]
	ParseError(Vec<Simple<char>>),
}

/// A parsed path into a tag tree, in the slash-separated syntax the
/// chunk index is keyed by: `Level/Sections/3/Blocks`. A segment made
/// of digits (with an optional leading `-`) is an index; any other
/// segment is a key.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Debug, Default)]
pub struct TagPath(pub Vec<TagPathPart>);

impl TagPath {
	pub fn parse<S: AsRef<str>>(source: S) -> Result<Self, TagPathError> {
		path_parser()
			.parse(source.as_ref())
			.map(Self)
			.map_err(TagPathError::ParseError)
	}

	pub fn path(&self) -> &[TagPathPart] {
		&self.0
	}

	pub fn join<T: Into<TagPathPart>>(&self, part: T) -> TagPath {
		let mut parts = self.0.clone();
		parts.push(part.into());
		TagPath(parts)
	}
}

impl FromStr for TagPath {
	type Err = TagPathError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		TagPath::parse(s)
	}
}

impl<T: Into<TagPathPart>> From<Vec<T>> for TagPath {
	fn from(value: Vec<T>) -> Self {
		TagPath(value.into_iter().map(T::into).collect())
	}
}

/// Returns a parser for the slash-separated path syntax.
fn path_parser() -> impl Parser<char, Vec<TagPathPart>, Error = Simple<char>> {
	let segment = filter(|c: &char| *c != '/')
		.repeated()
		.at_least(1)
		.collect::<String>()
		.map(|segment: String| {
			let digits = segment.strip_prefix('-').unwrap_or(&segment);
			if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
				match segment.parse::<i64>() {
					Ok(index) => TagPathPart::AtIndex(index),
					// Out of i64 range; fall back to treating the
					// segment as a key.
					Err(_) => TagPathPart::AtKey(segment),
				}
			} else {
				TagPathPart::AtKey(segment)
			}
		});

	segment
		.separated_by(just('/'))
		.at_least(1)
		.then_ignore(end())
}

impl Display for TagPath {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let mut first = true;
		self.0.iter().try_for_each(|part| {
			if !first {
				write!(f, "/")?;
			}
			first = false;
			match part {
				TagPathPart::AtIndex(index) => write!(f, "{index}"),
				TagPathPart::AtKey(key) => write!(f, "{key}"),
			}
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parse_mixed_path() {
		let path = TagPath::parse("Level/Sections/3/Blocks").unwrap();
		assert_eq!(
			path.path(),
			&[
				TagPathPart::AtKey("Level".to_owned()),
				TagPathPart::AtKey("Sections".to_owned()),
				TagPathPart::AtIndex(3),
				TagPathPart::AtKey("Blocks".to_owned()),
			]
		);
	}

	#[test]
	fn parse_negative_index() {
		let path = TagPath::parse("Entities/-1").unwrap();
		assert_eq!(path.path()[1], TagPathPart::AtIndex(-1));
	}

	#[test]
	fn dash_alone_is_a_key() {
		let path = TagPath::parse("-").unwrap();
		assert_eq!(path.path()[0], TagPathPart::AtKey("-".to_owned()));
	}

	#[test]
	fn display_round_trips() {
		let source = "Level/Sections/0/Data";
		let path = TagPath::parse(source).unwrap();
		assert_eq!(path.to_string(), source);
		assert_eq!(TagPath::parse(path.to_string()).unwrap(), path);
	}

	#[test]
	fn empty_and_doubled_separators_fail() {
		assert!(TagPath::parse("").is_err());
		assert!(TagPath::parse("Level//Blocks").is_err());
	}

	#[test]
	fn join_extends_the_path() {
		let path = TagPath::parse("Level/Sections").unwrap();
		let extended = path.join(2usize).join("Y");
		assert_eq!(extended.to_string(), "Level/Sections/2/Y");
	}
}
