pub mod error;
pub mod events;
pub mod identity;
pub mod record;
pub mod router;
pub mod source;
pub mod store;
pub mod updater;

#[cfg(test)]
mod testing;

pub use alloy_primitives::{Address, B256, U256};

pub use error::UpdateError;
pub use events::{EventContext, EventKind, VaultEvent};
pub use identity::{VaultId, resolve, to_db_hex};
pub use record::{VaultRecord, VaultSnapshot};
pub use router::{Dispatched, EventHandler, EventRouter};
pub use source::{BlockTag, ReadContext, SourceError, VaultSource};
pub use store::{MemoryVaultStore, StoreError, VaultStore};
pub use updater::VaultUpdater;
