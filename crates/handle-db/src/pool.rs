use std::future::Future;

use deadpool_diesel::postgres::Pool;
use diesel::PgConnection;

use crate::errors::DatabaseError;

/// Runs diesel closures on a pooled connection.
pub trait HandlePool {
    /// Every failure is labelled with `operation` and logged. Missing rows are
    /// returned quietly, since callers usually treat them as `None`.
    fn run<F, T, E>(
        &self,
        operation: impl Into<String> + Send,
        f: F,
    ) -> impl Future<Output = Result<T, DatabaseError>> + Send
    where
        F: FnOnce(&mut PgConnection) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: Into<DatabaseError> + Send + 'static;
}

impl HandlePool for Pool {
    async fn run<F, T, E>(&self, operation: impl Into<String> + Send, f: F) -> Result<T, DatabaseError>
    where
        F: FnOnce(&mut PgConnection) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: Into<DatabaseError> + Send + 'static,
    {
        let operation = operation.into();

        let conn = self
            .get()
            .await
            .map_err(|e| DatabaseError::PoolError {
                operation: operation.clone(),
                message: e.to_string(),
            })
            .inspect_err(log_failure)?;

        conn.interact(f)
            .await
            .map_err(|e| DatabaseError::InteractionError {
                operation: operation.clone(),
                message: e.to_string(),
            })
            .inspect_err(log_failure)?
            .map_err(|e| Into::<DatabaseError>::into(e).with_operation(&operation))
            .inspect_err(log_failure)
    }
}

fn log_failure(error: &DatabaseError) {
    if !error.is_not_found() {
        tracing::error!(operation = error.operation(), "[handle_db] ❌ {error}");
    }
}
