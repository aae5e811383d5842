//! `PostgreSQL` durable store for the eventform intake pipeline.
//!
//! [`PostgresStore`] implements every durable-side provider trait from
//! `eventform-core` over a single [`PgPool`]:
//!
//! - [`EventDirectory`](eventform_core::providers::EventDirectory) and
//!   [`FormDirectory`](eventform_core::providers::FormDirectory): read-only lookups
//! - [`VisitorStore`](eventform_core::providers::VisitorStore): visitor upsert and the
//!   atomic max-rank session upsert
//! - [`SubmissionStore`](eventform_core::providers::SubmissionStore): transactional
//!   commit plus organizer reads
//!
//! # Example
//!
//! ```no_run
//! use eventform_postgres::PostgresStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = sqlx::PgPool::connect("postgres://localhost/eventform").await?;
//! let store = PostgresStore::new(pool);
//! store.migrate().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod directory;
mod rows;
mod submissions;
mod visitors;

pub use submissions::PgSubmissionTransaction;

use eventform_core::providers::Readiness;
use eventform_core::{IntakeError, Result};
use rows::db_error;
use sqlx::PgPool;
use sqlx::pool::PoolConnection;

/// `PostgreSQL` implementation of the durable store and directory.
#[derive(Clone)]
pub struct PostgresStore {
    /// Connection pool.
    pool: PgPool,
}

impl PostgresStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// Returns error if migrations fail.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| IntakeError::Database(format!("Migration failed: {e}")))?;

        tracing::info!("Database migrations applied");
        Ok(())
    }

    async fn acquire(&self) -> Result<PoolConnection<sqlx::Postgres>> {
        self.pool
            .acquire()
            .await
            .map_err(|e| db_error("acquire connection", &e))
    }
}

impl Readiness for PostgresStore {
    async fn check_ready(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("ping database", &e))?;
        Ok(())
    }
}
