//! Local persistence for client-side state

mod file_store;

pub use file_store::FileKeyValueStore;
