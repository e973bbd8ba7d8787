use indexmap::IndexMap;

use crate::error::WorldError;

/// The named children of a compound tag.
/// Insertion order is preserved because generated entity and
/// block-entity compounds are addressed positionally when their
/// coordinates are stamped.
pub type Map = IndexMap<String, Tag>;

/// The thirteen wire-format tag IDs.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TagId {
	End = 0,
	Byte = 1,
	Short = 2,
	Int = 3,
	Long = 4,
	Float = 5,
	Double = 6,
	ByteArray = 7,
	String = 8,
	List = 9,
	Compound = 10,
	IntArray = 11,
	LongArray = 12,
}

impl TagId {
	pub fn value(self) -> u8 {
		self as u8
	}

	/// The classic `TAG_*` name, used by diagnostics and tree dumps.
	pub fn title(self) -> &'static str {
		match self {
			TagId::End => "TAG_End",
			TagId::Byte => "TAG_Byte",
			TagId::Short => "TAG_Short",
			TagId::Int => "TAG_Int",
			TagId::Long => "TAG_Long",
			TagId::Float => "TAG_Float",
			TagId::Double => "TAG_Double",
			TagId::ByteArray => "TAG_Byte_Array",
			TagId::String => "TAG_String",
			TagId::List => "TAG_List",
			TagId::Compound => "TAG_Compound",
			TagId::IntArray => "TAG_Int_Array",
			TagId::LongArray => "TAG_Long_Array",
		}
	}
}

impl TryFrom<u8> for TagId {
	type Error = WorldError;

	fn try_from(value: u8) -> Result<Self, Self::Error> {
		Ok(match value {
			0 => TagId::End,
			1 => TagId::Byte,
			2 => TagId::Short,
			3 => TagId::Int,
			4 => TagId::Long,
			5 => TagId::Float,
			6 => TagId::Double,
			7 => TagId::ByteArray,
			8 => TagId::String,
			9 => TagId::List,
			10 => TagId::Compound,
			11 => TagId::IntArray,
			12 => TagId::LongArray,
			unsupported => return Err(WorldError::UnsupportedTagId(unsupported)),
		})
	}
}

impl std::fmt::Display for TagId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{} (0x{:02x})", self.title(), self.value())
	}
}

/// One value in an NBT tree.
/// There is no `End` variant; the end marker is framing for compounds
/// on the wire, not a value. Names live in the parent compound's map,
/// so a list element (which is nameless on the wire) is just a bare
/// payload and the encoder cannot give it a header by accident.
#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
	Byte(i8),
	Short(i16),
	Int(i32),
	Long(i64),
	Float(f32),
	Double(f64),
	ByteArray(Vec<i8>),
	String(String),
	List(ListTag),
	Compound(Map),
	IntArray(Vec<i32>),
	LongArray(Vec<i64>),
}

/// A homogeneous list. The variant carries the element-tag
/// discriminant that the wire format stores ahead of the payloads.
/// A zero-length list is `Empty` and encodes with the end tag as its
/// element type.
#[derive(Debug, Clone, PartialEq)]
pub enum ListTag {
	Empty,
	Byte(Vec<i8>),
	Short(Vec<i16>),
	Int(Vec<i32>),
	Long(Vec<i64>),
	Float(Vec<f32>),
	Double(Vec<f64>),
	ByteArray(Vec<Vec<i8>>),
	String(Vec<String>),
	List(Vec<ListTag>),
	Compound(Vec<Map>),
	IntArray(Vec<Vec<i32>>),
	LongArray(Vec<Vec<i64>>),
}

/// The root wire form: a tag with a name (possibly empty).
#[derive(Debug, Clone, PartialEq)]
pub struct NamedTag {
	pub name: String,
	pub tag: Tag,
}

impl Tag {
	pub fn id(&self) -> TagId {
		match self {
			Tag::Byte(_) => TagId::Byte,
			Tag::Short(_) => TagId::Short,
			Tag::Int(_) => TagId::Int,
			Tag::Long(_) => TagId::Long,
			Tag::Float(_) => TagId::Float,
			Tag::Double(_) => TagId::Double,
			Tag::ByteArray(_) => TagId::ByteArray,
			Tag::String(_) => TagId::String,
			Tag::List(_) => TagId::List,
			Tag::Compound(_) => TagId::Compound,
			Tag::IntArray(_) => TagId::IntArray,
			Tag::LongArray(_) => TagId::LongArray,
		}
	}
}

impl ListTag {
	/// The element tag stored on the wire ahead of the payloads.
	pub fn id(&self) -> TagId {
		match self {
			ListTag::Empty => TagId::End,
			ListTag::Byte(_) => TagId::Byte,
			ListTag::Short(_) => TagId::Short,
			ListTag::Int(_) => TagId::Int,
			ListTag::Long(_) => TagId::Long,
			ListTag::Float(_) => TagId::Float,
			ListTag::Double(_) => TagId::Double,
			ListTag::ByteArray(_) => TagId::ByteArray,
			ListTag::String(_) => TagId::String,
			ListTag::List(_) => TagId::List,
			ListTag::Compound(_) => TagId::Compound,
			ListTag::IntArray(_) => TagId::IntArray,
			ListTag::LongArray(_) => TagId::LongArray,
		}
	}

	pub fn len(&self) -> usize {
		match self {
			ListTag::Empty => 0,
			ListTag::Byte(list) => list.len(),
			ListTag::Short(list) => list.len(),
			ListTag::Int(list) => list.len(),
			ListTag::Long(list) => list.len(),
			ListTag::Float(list) => list.len(),
			ListTag::Double(list) => list.len(),
			ListTag::ByteArray(list) => list.len(),
			ListTag::String(list) => list.len(),
			ListTag::List(list) => list.len(),
			ListTag::Compound(list) => list.len(),
			ListTag::IntArray(list) => list.len(),
			ListTag::LongArray(list) => list.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl NamedTag {
	/// Wraps a tag with an empty name, the usual form for chunk roots.
	pub fn new(tag: Tag) -> Self {
		Self {
			name: String::new(),
			tag,
		}
	}

	pub fn with_name<S: Into<String>>(name: S, tag: Tag) -> Self {
		Self {
			name: name.into(),
			tag,
		}
	}
}

macro_rules! tag_from_impls {
	($($type:ty => $variant:ident;)+) => {
		$(
			impl From<$type> for Tag {
				fn from(value: $type) -> Self {
					Tag::$variant(value)
				}
			}
		)+
	};
}

tag_from_impls!(
	i8 => Byte;
	i16 => Short;
	i32 => Int;
	i64 => Long;
	f32 => Float;
	f64 => Double;
	Vec<i8> => ByteArray;
	String => String;
	ListTag => List;
	Map => Compound;
	Vec<i32> => IntArray;
	Vec<i64> => LongArray;
);

impl From<&str> for Tag {
	fn from(value: &str) -> Self {
		Tag::String(value.to_owned())
	}
}

macro_rules! list_from_impls {
	($($type:ty => $variant:ident;)+) => {
		$(
			impl From<Vec<$type>> for ListTag {
				fn from(value: Vec<$type>) -> Self {
					if value.is_empty() {
						ListTag::Empty
					} else {
						ListTag::$variant(value)
					}
				}
			}
		)+
	};
}

list_from_impls!(
	i8 => Byte;
	i16 => Short;
	i32 => Int;
	i64 => Long;
	f32 => Float;
	f64 => Double;
	String => String;
	ListTag => List;
	Map => Compound;
);
