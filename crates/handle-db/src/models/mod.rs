pub mod indexer_state;
pub mod vault;

pub use indexer_state::{IndexerState, IndexerStateUpdate, IndexerStatus, NewIndexerState};
pub use vault::{NewVault, Vault, VaultUpdate};
