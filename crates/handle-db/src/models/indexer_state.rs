use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::indexer_state;

/// Indexer status variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexerStatus {
    Active,
    Error,
    Synced,
}

impl IndexerStatus {
    /// Convert to string for database storage
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Error => "error",
            Self::Synced => "synced",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "error" => Some(Self::Error),
            "synced" => Some(Self::Synced),
            _ => None,
        }
    }
}

impl std::fmt::Display for IndexerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Queryable, Selectable, Identifiable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = indexer_state)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct IndexerState {
    pub id: i32,
    pub treasury_address: String,
    pub last_processed_block: i64,
    pub last_error: Option<String>,
    pub last_error_at: Option<DateTime<Utc>>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl IndexerState {
    pub fn status_enum(&self) -> Option<IndexerStatus> {
        IndexerStatus::parse(&self.status)
    }

    /// Check if the indexer stopped on an error
    pub fn is_error(&self) -> bool {
        self.status_enum() == Some(IndexerStatus::Error)
    }

    /// Check if the indexer is synced
    pub fn is_synced(&self) -> bool {
        self.status_enum() == Some(IndexerStatus::Synced)
    }
}

#[derive(Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = indexer_state)]
pub struct NewIndexerState {
    pub treasury_address: String,
    pub last_processed_block: i64,
    pub status: String,
}

#[derive(Default, AsChangeset, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = indexer_state)]
pub struct IndexerStateUpdate {
    pub last_processed_block: Option<i64>,
    // `Some(None)` clears the column
    pub last_error: Option<Option<String>>,
    pub last_error_at: Option<Option<DateTime<Utc>>>,
    pub status: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl IndexerState {
    /// Find indexer state by treasury address
    pub fn find_by_treasury(
        treasury_address: &str,
        conn: &mut PgConnection,
    ) -> QueryResult<Option<Self>> {
        indexer_state::table
            .filter(indexer_state::treasury_address.eq(treasury_address))
            .first(conn)
            .optional()
    }

    pub fn create(new_state: &NewIndexerState, conn: &mut PgConnection) -> QueryResult<Self> {
        diesel::insert_into(indexer_state::table)
            .values(new_state)
            .returning(Self::as_returning())
            .get_result(conn)
    }

    pub fn update(&self, updates: &IndexerStateUpdate, conn: &mut PgConnection) -> QueryResult<Self> {
        diesel::update(indexer_state::table.filter(indexer_state::id.eq(self.id)))
            .set(updates)
            .returning(Self::as_returning())
            .get_result(conn)
    }

    /// Create the state at `start_block` when the treasury has none yet
    pub fn find_or_create(
        treasury_address: &str,
        start_block: i64,
        conn: &mut PgConnection,
    ) -> QueryResult<Self> {
        match Self::find_by_treasury(treasury_address, conn)? {
            Some(state) => Ok(state),
            None => Self::create(
                &NewIndexerState {
                    treasury_address: treasury_address.to_string(),
                    last_processed_block: start_block,
                    status: IndexerStatus::Active.as_str().to_string(),
                },
                conn,
            ),
        }
    }

    /// Move the checkpoint forward, keeping a synced status and clearing errors
    pub fn checkpoint(
        treasury_address: &str,
        last_processed_block: i64,
        conn: &mut PgConnection,
    ) -> QueryResult<Self> {
        let current_state = Self::find_by_treasury(treasury_address, conn)?
            .ok_or(diesel::result::Error::NotFound)?;

        let new_status = if current_state.is_synced() {
            IndexerStatus::Synced
        } else {
            IndexerStatus::Active
        };

        current_state.update(
            &IndexerStateUpdate {
                last_processed_block: Some(last_processed_block),
                last_error: Some(None),
                last_error_at: Some(None),
                status: Some(new_status.as_str().to_string()),
                updated_at: Some(Utc::now()),
            },
            conn,
        )
    }

    pub fn set_status(
        treasury_address: &str,
        status: IndexerStatus,
        conn: &mut PgConnection,
    ) -> QueryResult<Self> {
        let current_state = Self::find_by_treasury(treasury_address, conn)?
            .ok_or(diesel::result::Error::NotFound)?;
        current_state.update(
            &IndexerStateUpdate {
                status: Some(status.as_str().to_string()),
                updated_at: Some(Utc::now()),
                ..Default::default()
            },
            conn,
        )
    }

    /// Record an error for the indexer state
    pub fn record_error(
        treasury_address: &str,
        error_message: String,
        conn: &mut PgConnection,
    ) -> QueryResult<Self> {
        let current_state = Self::find_by_treasury(treasury_address, conn)?
            .ok_or(diesel::result::Error::NotFound)?;
        current_state.update(
            &IndexerStateUpdate {
                last_error: Some(Some(error_message)),
                last_error_at: Some(Some(Utc::now())),
                status: Some(IndexerStatus::Error.as_str().to_string()),
                updated_at: Some(Utc::now()),
                ..Default::default()
            },
            conn,
        )
    }
}
