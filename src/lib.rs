pub mod alloc;
pub mod config;
pub mod db;
pub mod deserialization;
pub mod error;
pub mod field_value;
pub mod http;
pub mod import;
pub mod inventory;
pub mod row;
pub mod serialization;
pub mod types;

pub use crate::alloc::{Allocation, AllocationEngine, EngineConfig, Outcome};
pub use crate::db::InventoryDb;
pub use crate::error::{AllocError, RecordError};
pub use crate::inventory::{ContactRecord, InventoryStore, MemoryInventory, RecordDraft};
