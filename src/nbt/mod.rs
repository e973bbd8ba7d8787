pub mod tag;
pub mod io;
pub mod tagref;
pub mod tagpath;
pub mod format;
pub mod macros;

pub use tag::{
	ListTag,
	Map,
	NamedTag,
	Tag,
	TagId,
};
