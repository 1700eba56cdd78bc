//! Repository traits for the travel data store.
//!
//! The store is split by concern:
//! - [`TravelRepository`]: read-only travel documents (airports, routes, hotels)
//! - [`UserRepository`]: user accounts and their booked flights
//!
//! [`FullRepository`] combines both and is implemented automatically for any
//! type implementing each of them.

pub mod error;
pub mod travel;
pub mod user;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use travel::TravelRepository;
pub use user::UserRepository;

/// Combined repository used by the HTTP layer.
pub trait FullRepository: TravelRepository + UserRepository {}

impl<T> FullRepository for T where T: TravelRepository + UserRepository {}
