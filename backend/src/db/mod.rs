//! Database module for the travel data store.
//!
//! This module provides abstractions for database operations via the Repository pattern,
//! allowing different storage backends to be swapped easily.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  HTTP handlers (crate::http)                            │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │  Arc<dyn FullRepository>
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository traits (repository/)                        │
//! │  - TravelRepository: airports, flight paths, hotels     │
//! │  - UserRepository: accounts and bookings                │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴──────────────────┐
//!     │                                  │
//! ┌───▼──────────────────┐   ┌───────────▼──────────────────┐
//! │ LocalRepository      │   │ PostgresRepository           │
//! │ (in-memory, seeded   │   │ (Diesel + r2d2, embedded     │
//! │  from a dataset)     │   │  migrations)                 │
//! └──────────────────────┘   └──────────────────────────────┘
//! ```
//!
//! The module includes:
//! - `repository`: Trait definitions and `RepositoryError`
//! - `repositories::local`: In-memory implementation for tests and local development
//! - `repositories::postgres`: Postgres implementation with Diesel ORM
//! - `dataset`: Travel dataset documents used for seeding and imports
//! - `factory`, `repo_config`: Backend selection from env or `repository.toml`
//!
//! # Usage
//! ```ignore
//! use travel_rust::db::RepositoryFactory;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = RepositoryFactory::from_env().await?;
//!     let airports = repo.search_airports("SFO").await?;
//!     Ok(())
//! }
//! ```

#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod dataset;
pub mod factory;
pub mod queries;
pub mod repo_config;
pub mod repositories;
pub mod repository;

// Postgres config is colocated with the repository implementation.
#[cfg(feature = "postgres-repo")]
pub use repositories::postgres::{PoolStats, PostgresConfig};
#[cfg(not(feature = "postgres-repo"))]
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    _private: (),
}

pub use dataset::{ImportSummary, TravelDataset};
pub use factory::{RepositoryBuilder, RepositoryFactory, RepositoryType};
pub use repo_config::{LocalConfig, RepositoryConfig};
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::PostgresRepository;
pub use repository::{
    ErrorContext, FullRepository, RepositoryError, RepositoryResult, TravelRepository,
    UserRepository,
};
