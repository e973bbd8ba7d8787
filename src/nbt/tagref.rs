/*
Borrowed views into a tag tree. The chunk index stores paths rather
than references, so every mutation walks the tree from the root; these
types are the cursor for that walk. There is no fundamental difference
between stepping into a named child of a compound and stepping into an
element of a list or array.
*/

use super::tag::{
	ListTag,
	Map,
	Tag,
	TagId,
};
use super::tagpath::TagPathPart;

/// A shared view of one value in a tag tree.
#[derive(Clone, Copy)]
pub enum ValueRef<'a> {
	Byte(&'a i8),
	Short(&'a i16),
	Int(&'a i32),
	Long(&'a i64),
	Float(&'a f32),
	Double(&'a f64),
	ByteArray(&'a Vec<i8>),
	String(&'a String),
	List(&'a ListTag),
	Compound(&'a Map),
	IntArray(&'a Vec<i32>),
	LongArray(&'a Vec<i64>),
}

/// A mutable view of one value in a tag tree.
pub enum ValueRefMut<'a> {
	Byte(&'a mut i8),
	Short(&'a mut i16),
	Int(&'a mut i32),
	Long(&'a mut i64),
	Float(&'a mut f32),
	Double(&'a mut f64),
	ByteArray(&'a mut Vec<i8>),
	String(&'a mut String),
	List(&'a mut ListTag),
	Compound(&'a mut Map),
	IntArray(&'a mut Vec<i32>),
	LongArray(&'a mut Vec<i64>),
}

/// Resolves a possibly negative index against a length. Negative
/// indices count back from the end.
fn resolve_index(len: usize, index: i64) -> Option<usize> {
	let index = if index >= 0 {
		index
	} else {
		len as i64 + index
	};
	if index >= 0 && index < len as i64 {
		Some(index as usize)
	} else {
		None
	}
}

macro_rules! array_child {
	($enum_type:ident::$variant:ident(&mut $vec:ident[$index:ident])) => {
		resolve_index($vec.len(), $index).map(|i| $enum_type::$variant(&mut $vec[i]))
	};
	($enum_type:ident::$variant:ident(&$vec:ident[$index:ident])) => {
		resolve_index($vec.len(), $index).map(|i| $enum_type::$variant(&$vec[i]))
	};
}

macro_rules! list_child_dry {
	($enum_type:ident; mut; $list:ident[$index:ident]) => {
		match $list {
			ListTag::Empty => None,
			ListTag::Byte(list) => array_child!($enum_type::Byte(&mut list[$index])),
			ListTag::Short(list) => array_child!($enum_type::Short(&mut list[$index])),
			ListTag::Int(list) => array_child!($enum_type::Int(&mut list[$index])),
			ListTag::Long(list) => array_child!($enum_type::Long(&mut list[$index])),
			ListTag::Float(list) => array_child!($enum_type::Float(&mut list[$index])),
			ListTag::Double(list) => array_child!($enum_type::Double(&mut list[$index])),
			ListTag::ByteArray(list) => array_child!($enum_type::ByteArray(&mut list[$index])),
			ListTag::String(list) => array_child!($enum_type::String(&mut list[$index])),
			ListTag::List(list) => array_child!($enum_type::List(&mut list[$index])),
			ListTag::Compound(list) => array_child!($enum_type::Compound(&mut list[$index])),
			ListTag::IntArray(list) => array_child!($enum_type::IntArray(&mut list[$index])),
			ListTag::LongArray(list) => array_child!($enum_type::LongArray(&mut list[$index])),
		}
	};
	($enum_type:ident; ; $list:ident[$index:ident]) => {
		match $list {
			ListTag::Empty => None,
			ListTag::Byte(list) => array_child!($enum_type::Byte(&list[$index])),
			ListTag::Short(list) => array_child!($enum_type::Short(&list[$index])),
			ListTag::Int(list) => array_child!($enum_type::Int(&list[$index])),
			ListTag::Long(list) => array_child!($enum_type::Long(&list[$index])),
			ListTag::Float(list) => array_child!($enum_type::Float(&list[$index])),
			ListTag::Double(list) => array_child!($enum_type::Double(&list[$index])),
			ListTag::ByteArray(list) => array_child!($enum_type::ByteArray(&list[$index])),
			ListTag::String(list) => array_child!($enum_type::String(&list[$index])),
			ListTag::List(list) => array_child!($enum_type::List(&list[$index])),
			ListTag::Compound(list) => array_child!($enum_type::Compound(&list[$index])),
			ListTag::IntArray(list) => array_child!($enum_type::IntArray(&list[$index])),
			ListTag::LongArray(list) => array_child!($enum_type::LongArray(&list[$index])),
		}
	};
}

impl<'a> ValueRef<'a> {
	pub fn tag_id(&self) -> TagId {
		match self {
			ValueRef::Byte(_) => TagId::Byte,
			ValueRef::Short(_) => TagId::Short,
			ValueRef::Int(_) => TagId::Int,
			ValueRef::Long(_) => TagId::Long,
			ValueRef::Float(_) => TagId::Float,
			ValueRef::Double(_) => TagId::Double,
			ValueRef::ByteArray(_) => TagId::ByteArray,
			ValueRef::String(_) => TagId::String,
			ValueRef::List(_) => TagId::List,
			ValueRef::Compound(_) => TagId::Compound,
			ValueRef::IntArray(_) => TagId::IntArray,
			ValueRef::LongArray(_) => TagId::LongArray,
		}
	}

	/// Steps into a child. An index steps into a list, an array, or a
	/// compound's insertion order; a key steps into a compound.
	pub fn get_child(self, at: &TagPathPart) -> Option<ValueRef<'a>> {
		match at {
			&TagPathPart::AtIndex(index) => match self {
				ValueRef::List(list) => list_child_dry!(ValueRef; ; list[index]),
				ValueRef::ByteArray(array) => array_child!(ValueRef::Byte(&array[index])),
				ValueRef::IntArray(array) => array_child!(ValueRef::Int(&array[index])),
				ValueRef::LongArray(array) => array_child!(ValueRef::Long(&array[index])),
				ValueRef::Compound(map) => resolve_index(map.len(), index)
					.and_then(|i| map.get_index(i))
					.map(|(_, tag)| ValueRef::from(tag)),
				_ => None,
			},
			TagPathPart::AtKey(key) => match self {
				ValueRef::Compound(map) => map.get(key).map(ValueRef::from),
				_ => None,
			},
		}
	}

	pub fn find_child(self, path: &[TagPathPart]) -> Option<ValueRef<'a>> {
		path.iter().try_fold(self, |walker, part| walker.get_child(part))
	}

	pub fn as_byte_array(self) -> Option<&'a Vec<i8>> {
		if let ValueRef::ByteArray(array) = self {
			Some(array)
		} else {
			None
		}
	}

	pub fn as_int_array(self) -> Option<&'a Vec<i32>> {
		if let ValueRef::IntArray(array) = self {
			Some(array)
		} else {
			None
		}
	}

	pub fn as_list(self) -> Option<&'a ListTag> {
		if let ValueRef::List(list) = self {
			Some(list)
		} else {
			None
		}
	}

	pub fn as_compound(self) -> Option<&'a Map> {
		if let ValueRef::Compound(map) = self {
			Some(map)
		} else {
			None
		}
	}

	pub fn as_byte(self) -> Option<&'a i8> {
		if let ValueRef::Byte(value) = self {
			Some(value)
		} else {
			None
		}
	}

	pub fn as_int(self) -> Option<&'a i32> {
		if let ValueRef::Int(value) = self {
			Some(value)
		} else {
			None
		}
	}
}

impl<'a> ValueRefMut<'a> {
	pub fn tag_id(&self) -> TagId {
		match self {
			ValueRefMut::Byte(_) => TagId::Byte,
			ValueRefMut::Short(_) => TagId::Short,
			ValueRefMut::Int(_) => TagId::Int,
			ValueRefMut::Long(_) => TagId::Long,
			ValueRefMut::Float(_) => TagId::Float,
			ValueRefMut::Double(_) => TagId::Double,
			ValueRefMut::ByteArray(_) => TagId::ByteArray,
			ValueRefMut::String(_) => TagId::String,
			ValueRefMut::List(_) => TagId::List,
			ValueRefMut::Compound(_) => TagId::Compound,
			ValueRefMut::IntArray(_) => TagId::IntArray,
			ValueRefMut::LongArray(_) => TagId::LongArray,
		}
	}

	/// Steps into a child, consuming the view so the borrow moves down
	/// the tree instead of stacking up.
	pub fn into_child(self, at: &TagPathPart) -> Option<ValueRefMut<'a>> {
		match at {
			&TagPathPart::AtIndex(index) => match self {
				ValueRefMut::List(list) => list_child_dry!(ValueRefMut; mut; list[index]),
				ValueRefMut::ByteArray(array) => array_child!(ValueRefMut::Byte(&mut array[index])),
				ValueRefMut::IntArray(array) => array_child!(ValueRefMut::Int(&mut array[index])),
				ValueRefMut::LongArray(array) => array_child!(ValueRefMut::Long(&mut array[index])),
				ValueRefMut::Compound(map) => resolve_index(map.len(), index)
					.and_then(|i| map.get_index_mut(i))
					.map(|(_, tag)| ValueRefMut::from(tag)),
				_ => None,
			},
			TagPathPart::AtKey(key) => match self {
				ValueRefMut::Compound(map) => map.get_mut(key).map(ValueRefMut::from),
				_ => None,
			},
		}
	}

	pub fn find_child(self, path: &[TagPathPart]) -> Option<ValueRefMut<'a>> {
		path.iter().try_fold(self, |walker, part| walker.into_child(part))
	}

	pub fn into_byte_array(self) -> Option<&'a mut Vec<i8>> {
		if let ValueRefMut::ByteArray(array) = self {
			Some(array)
		} else {
			None
		}
	}

	pub fn into_int_array(self) -> Option<&'a mut Vec<i32>> {
		if let ValueRefMut::IntArray(array) = self {
			Some(array)
		} else {
			None
		}
	}

	pub fn into_list(self) -> Option<&'a mut ListTag> {
		if let ValueRefMut::List(list) = self {
			Some(list)
		} else {
			None
		}
	}

	pub fn into_compound(self) -> Option<&'a mut Map> {
		if let ValueRefMut::Compound(map) = self {
			Some(map)
		} else {
			None
		}
	}

	pub fn into_byte(self) -> Option<&'a mut i8> {
		if let ValueRefMut::Byte(value) = self {
			Some(value)
		} else {
			None
		}
	}
}

impl Tag {
	pub fn get_child<'a>(&'a self, at: &TagPathPart) -> Option<ValueRef<'a>> {
		ValueRef::from(self).get_child(at)
	}

	pub fn find_child<'a>(&'a self, path: &[TagPathPart]) -> Option<ValueRef<'a>> {
		ValueRef::from(self).find_child(path)
	}

	pub fn find_child_mut<'a>(&'a mut self, path: &[TagPathPart]) -> Option<ValueRefMut<'a>> {
		ValueRefMut::from(self).find_child(path)
	}
}

impl<'a> From<&'a Tag> for ValueRef<'a> {
	fn from(value: &'a Tag) -> Self {
		match value {
			Tag::Byte(val) => ValueRef::Byte(val),
			Tag::Short(val) => ValueRef::Short(val),
			Tag::Int(val) => ValueRef::Int(val),
			Tag::Long(val) => ValueRef::Long(val),
			Tag::Float(val) => ValueRef::Float(val),
			Tag::Double(val) => ValueRef::Double(val),
			Tag::ByteArray(val) => ValueRef::ByteArray(val),
			Tag::String(val) => ValueRef::String(val),
			Tag::List(val) => ValueRef::List(val),
			Tag::Compound(val) => ValueRef::Compound(val),
			Tag::IntArray(val) => ValueRef::IntArray(val),
			Tag::LongArray(val) => ValueRef::LongArray(val),
		}
	}
}

impl<'a> From<&'a mut Tag> for ValueRefMut<'a> {
	fn from(value: &'a mut Tag) -> Self {
		match value {
			Tag::Byte(val) => ValueRefMut::Byte(val),
			Tag::Short(val) => ValueRefMut::Short(val),
			Tag::Int(val) => ValueRefMut::Int(val),
			Tag::Long(val) => ValueRefMut::Long(val),
			Tag::Float(val) => ValueRefMut::Float(val),
			Tag::Double(val) => ValueRefMut::Double(val),
			Tag::ByteArray(val) => ValueRefMut::ByteArray(val),
			Tag::String(val) => ValueRefMut::String(val),
			Tag::List(val) => ValueRefMut::List(val),
			Tag::Compound(val) => ValueRefMut::Compound(val),
			Tag::IntArray(val) => ValueRefMut::IntArray(val),
			Tag::LongArray(val) => ValueRefMut::LongArray(val),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::compound;
	use crate::nbt::tagpath::TagPath;

	fn sample() -> Tag {
		let section = compound! {
			("Y", 2i8),
			("Blocks", vec![7i8; 16]),
		};
		let Tag::Compound(section) = section else {
			unreachable!()
		};
		compound! {
			("Sections", ListTag::Compound(vec![section])),
			("HeightMap", vec![3i32; 4]),
		}
	}

	#[test]
	fn walk_by_key_and_index() {
		let tree = sample();
		let path = TagPath::parse("Sections/0/Y").unwrap();
		let value = tree.find_child(path.path()).unwrap();
		assert_eq!(value.as_byte(), Some(&2));
	}

	#[test]
	fn walk_into_arrays() {
		let tree = sample();
		let path = TagPath::parse("Sections/0/Blocks/5").unwrap();
		assert_eq!(tree.find_child(path.path()).unwrap().as_byte(), Some(&7));
		let path = TagPath::parse("HeightMap/-1").unwrap();
		assert_eq!(tree.find_child(path.path()).unwrap().as_int(), Some(&3));
	}

	#[test]
	fn positional_access_into_compounds() {
		let tree = sample();
		let path = TagPath::from(vec![TagPathPart::AtIndex(1)]);
		let value = tree.find_child(path.path()).unwrap();
		assert_eq!(value.tag_id(), TagId::IntArray);
	}

	#[test]
	fn mutation_through_a_path() {
		let mut tree = sample();
		let path = TagPath::parse("Sections/0/Blocks").unwrap();
		let blocks = tree
			.find_child_mut(path.path())
			.and_then(ValueRefMut::into_byte_array)
			.unwrap();
		blocks[0] = 42;
		let check = TagPath::parse("Sections/0/Blocks/0").unwrap();
		assert_eq!(tree.find_child(check.path()).unwrap().as_byte(), Some(&42));
	}

	#[test]
	fn out_of_range_index_is_none() {
		let tree = sample();
		let path = TagPath::parse("HeightMap/4").unwrap();
		assert!(tree.find_child(path.path()).is_none());
		let path = TagPath::parse("HeightMap/-5").unwrap();
		assert!(tree.find_child(path.path()).is_none());
	}
}
