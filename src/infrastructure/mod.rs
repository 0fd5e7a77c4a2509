pub mod memory_store;
pub mod record_store;
pub mod rest_store;

pub use memory_store::{MemoryStore, StoreCall, StoreOp};
pub use record_store::{insert_record, update_records, Collection, Filter, RecordStore};
pub use rest_store::RestStore;
