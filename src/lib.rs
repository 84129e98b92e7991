#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// Errors reported by constructors and cursors.
pub mod error;

/// Table sizing rules and the key mixer.
pub mod hash_common;

/// A `u64`-keyed hash map with a default return value.
///
/// This module provides `LongMap`, which wraps a `LongTable` and adds the
/// map conveniences: the default return value, key and value iterators, and
/// the equality and hash-code contract.
pub mod hash_map;

pub mod hash_table;

/// A `u64` hash set.
///
/// This module provides `LongSet`, a `LongTable` without values.
pub mod hash_set;

pub use error::Error;
pub use error::ErrorKind;
pub use hash_map::Entry;
pub use hash_map::LongMap;
pub use hash_set::LongSet;
pub use hash_table::LongTable;
