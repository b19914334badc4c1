pub mod contracts;
pub mod logs;
pub mod provider;
pub mod treasury;

pub use logs::{LogError, TreasuryFeed, TreasuryLogs, plan_range};
pub use provider::connect;
pub use treasury::EvmVaultSource;
