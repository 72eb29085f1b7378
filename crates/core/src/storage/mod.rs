//! Durable client-side key/value storage.

mod client_store;
mod file_store;
mod memory_store;

pub use client_store::{read_json, write_json, ClientStore};
pub use file_store::{FileClientStore, STORE_FILE_NAME};
pub use memory_store::MemoryClientStore;
