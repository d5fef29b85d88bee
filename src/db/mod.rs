pub mod db;
pub mod types;

pub use db::InventoryDb;
pub use types::InventoryDbConfig;
