// Adapters layer: concrete implementations of the domain ports.

pub mod catalog;
pub mod storage;

pub use catalog::InMemoryCatalog;
pub use storage::LocalStorage;
