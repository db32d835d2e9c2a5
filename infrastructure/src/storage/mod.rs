//! Session persistence over a key-value store
//!
//! The [`SessionGateway`] serializes the whole collection into one JSON
//! envelope and hands it to a [`KeyValueStore`]. Two stores are provided:
//! a directory of files for real use and an in-memory map for tests.

mod file_store;
mod gateway;
mod kv;

pub use file_store::FileKeyValueStore;
pub use gateway::{SESSIONS_KEY, SessionGateway};
pub use kv::{KeyValueStore, MemoryKeyValueStore, StorageError};
