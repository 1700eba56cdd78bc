//! Travel dataset documents used to seed and import repository content.
//!
//! The dataset mirrors the document shapes of the travel-sample bucket:
//! airports, airlines, routes (with their weekly schedule) and hotels.
//! User documents and booked flights are never part of a dataset.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::repository::{RepositoryError, RepositoryResult};

/// Sample dataset bundled with the crate.
const SAMPLE_DATASET: &str = include_str!("../../data/travel-sample.json");

/// Airport document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportDoc {
    pub id: String,
    pub airportname: String,
    #[serde(default)]
    pub faa: Option<String>,
    #[serde(default)]
    pub icao: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
}

/// Airline document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirlineDoc {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub iata: Option<String>,
    #[serde(default)]
    pub icao: Option<String>,
    #[serde(default)]
    pub callsign: Option<String>,
    #[serde(default)]
    pub country: String,
}

/// One weekly departure of a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Day of week, Sunday = 0.
    pub day: u32,
    pub utc: String,
    pub flight: String,
}

/// Route document: an airline flying between two FAA codes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDoc {
    pub id: String,
    pub airlineid: String,
    pub sourceairport: String,
    pub destinationairport: String,
    #[serde(default)]
    pub equipment: String,
    #[serde(default)]
    pub schedule: Vec<ScheduleEntry>,
}

/// Hotel document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelDoc {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl HotelDoc {
    /// Project the document onto the search result shape.
    pub fn to_hotel(&self) -> crate::api::Hotel {
        crate::api::Hotel {
            country: self.country.clone().unwrap_or_default(),
            city: self.city.clone().unwrap_or_default(),
            state: self.state.clone().unwrap_or_default(),
            address: self.address.clone().unwrap_or_default(),
            name: self.name.clone(),
            description: self.description.clone().unwrap_or_default(),
        }
    }
}

/// A complete travel dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TravelDataset {
    #[serde(default)]
    pub airports: Vec<AirportDoc>,
    #[serde(default)]
    pub airlines: Vec<AirlineDoc>,
    #[serde(default)]
    pub routes: Vec<RouteDoc>,
    #[serde(default)]
    pub hotels: Vec<HotelDoc>,
}

/// Counts of documents written by an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub airports: usize,
    pub airlines: usize,
    pub routes: usize,
    pub hotels: usize,
}

impl ImportSummary {
    pub fn total(&self) -> usize {
        self.airports + self.airlines + self.routes + self.hotels
    }
}

impl TravelDataset {
    /// Parse a dataset from JSON text.
    pub fn from_json(json: &str) -> RepositoryResult<Self> {
        serde_json::from_str(json).map_err(|e| {
            RepositoryError::validation(format!("Failed to parse travel dataset: {}", e))
        })
    }

    /// Load a dataset from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> RepositoryResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            RepositoryError::configuration(format!(
                "Failed to read travel dataset {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&content)
    }

    /// The dataset bundled with the crate.
    pub fn sample() -> RepositoryResult<Self> {
        Self::from_json(SAMPLE_DATASET)
    }

    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
            && self.airlines.is_empty()
            && self.routes.is_empty()
            && self.hotels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_dataset_parses() {
        let dataset = TravelDataset::sample().unwrap();
        assert!(!dataset.airports.is_empty());
        assert!(!dataset.airlines.is_empty());
        assert!(!dataset.routes.is_empty());
        assert!(!dataset.hotels.is_empty());
    }

    #[test]
    fn test_sample_routes_reference_known_airlines() {
        let dataset = TravelDataset::sample().unwrap();
        for route in &dataset.routes {
            assert!(
                dataset.airlines.iter().any(|a| a.id == route.airlineid),
                "route {} references unknown airline {}",
                route.id,
                route.airlineid
            );
            assert!(route.schedule.iter().all(|s| s.day < 7));
        }
    }

    #[test]
    fn test_missing_collections_default_to_empty() {
        let dataset = TravelDataset::from_json(r#"{"airports": []}"#).unwrap();
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_invalid_json_is_a_validation_error() {
        let err = TravelDataset::from_json("{").unwrap_err();
        assert!(matches!(err, RepositoryError::ValidationError { .. }));
    }

    #[test]
    fn test_hotel_projection_fills_missing_fields() {
        let doc = HotelDoc {
            id: "hotel_1".to_string(),
            name: "Somewhere".to_string(),
            description: None,
            country: Some("France".to_string()),
            city: None,
            state: None,
            address: None,
        };
        let hotel = doc.to_hotel();
        assert_eq!(hotel.name, "Somewhere");
        assert_eq!(hotel.country, "France");
        assert_eq!(hotel.city, "");
        assert_eq!(hotel.description, "");
    }
}
