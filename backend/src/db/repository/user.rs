//! User accounts and bookings.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{BookedFlight, BookingData, Envelope};

/// Repository trait for users and their booked flights.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a user.
    ///
    /// # Errors
    /// `RepositoryError::Conflict` when a user with this name exists.
    async fn create_user(&self, user: &str, password: &str) -> RepositoryResult<()>;

    /// Fetch the stored password of a user.
    ///
    /// # Errors
    /// `RepositoryError::NotFound` when the user does not exist.
    async fn get_user_password(&self, user: &str) -> RepositoryResult<String>;

    /// Fetch the flights booked by a user, in booking order.
    async fn get_user_flights(&self, user: &str) -> RepositoryResult<Envelope<Vec<BookedFlight>>>;

    /// Book flights for a user.
    ///
    /// Each flight is stamped with today's date, stored under a fresh id and
    /// appended to the user's list. The user document is replaced only if it
    /// was not modified since it was read; otherwise the booking fails with
    /// `RepositoryError::Conflict`.
    async fn update_user_flights(
        &self,
        user: &str,
        flights: Vec<BookedFlight>,
    ) -> RepositoryResult<Envelope<BookingData>>;
}
