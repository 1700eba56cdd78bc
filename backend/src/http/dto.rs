//! Request and response shapes owned by the HTTP layer.
//!
//! Payload DTOs live in [`crate::api`]; this module holds query strings,
//! path segments and the failure body.

use serde::{Deserialize, Serialize};

/// Query string of `GET /api/airports`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AirportSearchQuery {
    #[serde(default)]
    pub search: String,
}

/// Query string of `GET /api/flightPaths/{from}/{to}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlightSearchQuery {
    /// Leave date, `MM/DD/YYYY`
    #[serde(default)]
    pub leave: String,
}

/// Path segments of the hotel search routes.
#[derive(Debug, Clone, Deserialize)]
pub struct HotelSearchPath {
    pub description: String,
    pub location: Option<String>,
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureResponse {
    pub failure: String,
}
