//! Database lifecycle, owned by the process composition root.
//!
//! The connection pool is created once at startup and handed to the
//! stores; there is no ambient global handle. TLS is carried by the
//! sqlx rustls runtime stack.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::store::StoreError;

/// A connected Postgres database.
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect a pool and verify the server answers a ping.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        tracing::info!("connecting to database");

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| StoreError::Backend(format!("connect: {e}")))?;

        let db = Self { pool };
        db.healthcheck().await?;
        tracing::info!("database connection established");

        Ok(db)
    }

    /// Ping the server.
    pub async fn healthcheck(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(format!("ping: {e}")))?;
        Ok(())
    }

    /// Create the tables if they do not exist yet.
    ///
    /// `user_id` on projects is the legacy owner column and is only ever
    /// populated by pre-existing data, never by this code.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                role TEXT NOT NULL,
                hashed_password TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS projects (
                id UUID PRIMARY KEY,
                name TEXT,
                description TEXT NOT NULL,
                status TEXT NOT NULL,
                deadline TIMESTAMPTZ NOT NULL,
                author_id UUID,
                user_id UUID,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS tasks (
                id UUID PRIMARY KEY,
                project_id UUID NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                status TEXT NOT NULL,
                priority TEXT NOT NULL,
                due_date TIMESTAMPTZ NOT NULL,
                assigned_to UUID,
                created_by UUID NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#,
        ];

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::Backend(format!("ensure_schema: {e}")))?;
        }

        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close the pool. Idempotent.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("database connection closed");
    }
}
