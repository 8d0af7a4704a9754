//! In-memory storage for table rows, definitions and auto-increment state

mod store;

pub use store::TableStore;
