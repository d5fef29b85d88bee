pub mod memory;
pub mod record;
pub mod store;

pub use memory::MemoryInventory;
pub use record::{ContactField, ContactFields, ContactRecord, RecordDraft};
pub use store::{InventoryStore, MarkOutcome, StoreError};
