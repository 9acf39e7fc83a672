#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// The allocation capability the table engine consumes.
///
/// This module provides the `Allocator` trait and the `Global` adapter over
/// the global allocator. Callers inject an implementation to control where
/// bucket arrays and entries live.
pub mod allocator;

/// A key-value map built on the open-addressing `HashTable`.
///
/// This module provides a `HashMap` that wraps the `HashTable` and provides
/// a standard key-value map interface with configurable hashers.
pub mod hash_map;

pub mod hash_table;

pub use allocator::Allocator;
pub use allocator::Global;
pub use hash_map::DefaultHashBuilder;
pub use hash_map::HashMap;
pub use hash_table::HashTable;
