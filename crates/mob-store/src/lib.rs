//! Key-value persistence for Mobiliaria.
//!
//! This crate is the boundary between the in-memory stores and durable local
//! storage. It plays the role browser local storage plays in a web client:
//! string keys, string values, synchronous calls, and a hard capacity limit.
//!
//! # Storage Backends
//!
//! All backends implement the [`KeyValueStore`] trait:
//!
//! - [`InMemoryKeyValueStore`] -- `HashMap`-based store for tests and embedding
//! - [`FileKeyValueStore`] -- one JSON file per key under a data directory
//!
//! # Design Rules
//!
//! 1. Writes are all-or-nothing: the previous value stays readable until the
//!    new one fully replaces it.
//! 2. Capacity is checked before anything is written. Exceeding it is an
//!    error, never a partial write.
//! 3. The store never interprets values. JSON encoding lives in [`json`].
//! 4. Nothing is retried. Capacity errors are not transient.

pub mod error;
pub mod file;
pub mod json;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use file::FileKeyValueStore;
pub use json::{read_json, write_json};
pub use memory::InMemoryKeyValueStore;
pub use traits::{validate_key, KeyValueStore, DEFAULT_QUOTA_BYTES};
