//! Durable queue snapshot storage

mod file;

pub use file::FileQueueStore;
