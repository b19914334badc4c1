use thiserror::Error;

use crate::{source::SourceError, store::StoreError};

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("vault refresh aborted: {0}")]
    Source(#[from] SourceError),

    #[error("vault persistence failed: {0}")]
    Store(#[from] StoreError),
}
