//! Database access.
//!
//! One libsql-backed store holds both credential records and tasks. The
//! store is the single boundary where storage-layer faults (duplicate keys,
//! malformed rows) are translated into the application error taxonomy.

pub mod store;

pub use store::Store;
