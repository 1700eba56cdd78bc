//! Public API surface for the travel backend.
//!
//! This file consolidates the DTO types returned by the repository layer and
//! serialized by the HTTP API. Field names follow the wire contract of the
//! travel-sample frontend, which is why most of them are lowercase run-ons.

use serde::{Deserialize, Serialize};

/// Queries issued while producing a response, in issue order.
///
/// Serialized as a plain JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryContext(pub Vec<String>);

impl QueryContext {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Record a query in the context.
    pub fn add(&mut self, query: impl Into<String>) {
        self.0.push(query.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }
}

/// Response envelope shared by every successful endpoint.
///
/// ```json
/// { "data": ..., "context": ["SELECT ..."] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
    #[serde(default)]
    pub context: QueryContext,
}

impl<T> Envelope<T> {
    pub fn new(data: T, context: QueryContext) -> Self {
        Self { data, context }
    }

    /// Wrap a payload that was not produced by a recorded query.
    pub fn bare(data: T) -> Self {
        Self {
            data,
            context: QueryContext::new(),
        }
    }
}

/// Airport search result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    pub airportname: String,
}

/// Flight search result: one scheduled departure on a route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    /// Airline name
    pub name: String,
    pub flight: String,
    #[serde(default)]
    pub equipment: String,
    pub utc: String,
    pub sourceairport: String,
    pub destinationairport: String,
    pub price: f64,
    pub flighttime: i64,
}

/// Hotel search result. Fields missing from the stored document are empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hotel {
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A flight booked by a user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookedFlight {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub flight: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub sourceairport: String,
    #[serde(default)]
    pub destinationairport: String,
    #[serde(default)]
    pub bookedon: String,
}

/// Payload of the login and signup responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenData {
    pub token: String,
}

/// Payload of the booking response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingData {
    pub added: Vec<BookedFlight>,
}

/// Login and signup request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
}

/// Booking request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookFlightsRequest {
    #[serde(default)]
    pub flights: Vec<BookedFlight>,
}

pub type AirportSearchResponse = Envelope<Vec<Airport>>;
pub type FlightSearchResponse = Envelope<Vec<Flight>>;
pub type HotelSearchResponse = Envelope<Vec<Hotel>>;
pub type TokenResponse = Envelope<TokenData>;
pub type UserFlightsResponse = Envelope<Vec<BookedFlight>>;
pub type BookFlightsResponse = Envelope<BookingData>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_serializes_data_and_context() {
        let mut context = QueryContext::new();
        context.add("SELECT airportname FROM airports WHERE faa = $1");
        let envelope = Envelope::new(
            vec![Airport {
                airportname: "San Francisco Intl".to_string(),
            }],
            context,
        );

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            value,
            json!({
                "data": [{"airportname": "San Francisco Intl"}],
                "context": ["SELECT airportname FROM airports WHERE faa = $1"]
            })
        );
    }

    #[test]
    fn test_bare_envelope_has_empty_context_array() {
        let envelope = Envelope::bare(TokenData {
            token: "abc".to_string(),
        });
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["context"], json!([]));
        assert_eq!(value["data"]["token"], "abc");
    }

    #[test]
    fn test_booked_flight_tolerates_missing_fields() {
        let flight: BookedFlight = serde_json::from_value(json!({
            "name": "US Airways",
            "flight": "US229",
            "sourceairport": "SFO",
            "destinationairport": "LAX",
            "price": 158.38
        }))
        .unwrap();

        assert_eq!(flight.flight, "US229");
        assert_eq!(flight.bookedon, "");
        assert_eq!(flight.date, "");
    }

    #[test]
    fn test_credentials_default_to_empty() {
        let creds: Credentials = serde_json::from_str("{}").unwrap();
        assert_eq!(creds, Credentials::default());
    }
}
