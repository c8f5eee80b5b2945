pub mod errors;
#[allow(clippy::module_inception)]
mod fsystem;
pub mod path;

pub use fsystem::{Entry, EntryKind, FileSystem, NodeId};
