//! Index structures: the radix trie, the gazetteer built on top of it, and
//! its on-disk snapshot format.

pub mod gazetteer;
pub mod snapshot;
pub mod trie;

pub use gazetteer::{BuildStats, EntityId, EntityRecord, Gazetteer, GazetteerBuilder};
pub use trie::RadixTrie;
