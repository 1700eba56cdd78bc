//! Travel document queries.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{Airport, Envelope, Flight, Hotel};
use crate::db::dataset::{ImportSummary, TravelDataset};
use crate::services::HotelFilter;

/// Repository trait for the travel dataset.
///
/// Search results are wrapped in an [`Envelope`] whose context lists the
/// queries that produced them.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait TravelRepository: Send + Sync {
    /// Check if the backing store is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Search airports by FAA code, ICAO code or name prefix.
    ///
    /// See [`crate::services::AirportQuery::classify`] for how the key is
    /// interpreted.
    async fn search_airports(&self, search_key: &str) -> RepositoryResult<Envelope<Vec<Airport>>>;

    /// Find scheduled flights between two airports, by airport name.
    ///
    /// # Arguments
    /// * `from` - Source airport name
    /// * `to` - Destination airport name
    /// * `day` - Day of week, Sunday = 0
    ///
    /// # Returns
    /// * `Ok(Envelope<Vec<Flight>>)` - Flights ordered by airline name, each
    ///   carrying a quoted price and flight time
    /// * `Err(RepositoryError)` - If either lookup fails
    async fn find_flight_paths(
        &self,
        from: &str,
        to: &str,
        day: u32,
    ) -> RepositoryResult<Envelope<Vec<Flight>>>;

    /// Search hotels by description and location phrases.
    ///
    /// Returns at most [`crate::services::HOTEL_SEARCH_LIMIT`] hotels.
    async fn find_hotels(&self, filter: &HotelFilter) -> RepositoryResult<Envelope<Vec<Hotel>>>;

    /// Load a dataset into the store, skipping documents whose id already
    /// exists.
    async fn import_dataset(&self, dataset: &TravelDataset) -> RepositoryResult<ImportSummary>;
}
