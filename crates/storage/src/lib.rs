//! `taskboard-storage` — the storage collaborator behind the auth core and
//! the HTTP surface.
//!
//! Store traits describe what the rest of the system may ask of storage;
//! an in-memory implementation backs tests and dev mode, Postgres backs
//! production. The stores also implement the auth crate's directory
//! traits, so the auth core never links against this crate's internals.

pub mod database;
pub mod memory;
pub mod postgres;
pub mod records;
pub mod store;

pub use database::Database;
pub use memory::{InMemoryProjectStore, InMemoryTaskStore, InMemoryUserStore};
pub use postgres::{PostgresProjectStore, PostgresTaskStore, PostgresUserStore};
pub use records::{
    ProjectRecord, ProjectStatus, ProjectUpdate, TaskPriority, TaskRecord, TaskStatus, TaskUpdate,
    UserRecord, UserUpdate,
};
pub use store::{ProjectStore, StoreError, TaskFilter, TaskScope, TaskStore, UserStore};
