pub mod errors;
pub mod models;
pub mod pool;
pub mod schema;
pub mod store;

use deadpool_diesel::postgres::{Manager, Pool};
use deadpool_diesel::Runtime;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

pub use errors::{DatabaseError, ErrorKind};
pub use pool::HandlePool;
pub use store::PgVaultStore;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub fn init_pool(database_url: &str, max_size: usize) -> Result<Pool, ErrorKind> {
    let manager = Manager::new(database_url, Runtime::Tokio1);
    Pool::builder(manager)
        .max_size(max_size)
        .build()
        .map_err(|e| ErrorKind::Pool(e.to_string()))
}

pub async fn run_migrations(pool: &Pool) -> Result<(), ErrorKind> {
    let conn = pool
        .get()
        .await
        .map_err(|e| ErrorKind::Pool(e.to_string()))?;

    let applied = conn
        .interact(|conn| {
            conn.run_pending_migrations(MIGRATIONS)
                .map(|versions| versions.iter().map(ToString::to_string).collect::<Vec<_>>())
                .map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| ErrorKind::Migration(e.to_string()))?
        .map_err(ErrorKind::Migration)?;

    if applied.is_empty() {
        tracing::info!("[handle_db] 🗃️ Database schema is up to date");
    } else {
        tracing::info!("[handle_db] 🗃️ Applied migrations: {}", applied.join(", "));
    }

    Ok(())
}
