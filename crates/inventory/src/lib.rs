//! Mattress inventory: the record model and the store that owns it.
//!
//! Records are created only after their asset has been minted elsewhere, change
//! only through status transitions, and are never deleted. The whole collection
//! is mirrored to a single key of client-local storage after every mutation.

mod wire;

pub mod attributes;
pub mod error;
pub mod persistence;
pub mod record;
pub mod status;
pub mod storage;
pub mod store;

pub use attributes::{
    COLLECTION_LOCATION, Cleanliness, ConditionAssessment, MaterialComposition,
    MattressAttributes, MattressSize, Reusability, SizeReference,
};
pub use error::InventoryError;
pub use persistence::STORAGE_KEY;
pub use record::MattressRecord;
pub use status::{MattressStatus, TransitionPolicy};
pub use storage::{FileStorage, InMemoryStorage, KeyValueStorage, StorageError};
pub use store::InventoryStore;
