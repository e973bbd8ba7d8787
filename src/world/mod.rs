pub mod chunk;
pub mod command;
pub mod index;
pub mod io;
pub mod region;
pub mod session;

pub use chunk::{Chunk, EditOutcome};
pub use command::Command;
pub use index::ChunkIndex;
pub use region::Region;
pub use session::{EditCounters, SessionFlags, WorldSession};

#[cfg(test)]
pub(crate) mod testutil;
