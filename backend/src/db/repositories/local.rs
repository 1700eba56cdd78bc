//! In-memory local repository implementation.
//!
//! This module provides a local implementation of all repository traits
//! suitable for unit testing and local development. Travel documents are
//! kept in ordered maps keyed by document id, users and booked flights in
//! hash maps, all behind a single `RwLock`.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::{Airport, BookedFlight, BookingData, Envelope, Flight, Hotel, QueryContext};
use crate::db::dataset::{
    AirlineDoc, AirportDoc, HotelDoc, ImportSummary, RouteDoc, TravelDataset,
};
use crate::db::queries;
use crate::db::repository::{
    ErrorContext, RepositoryError, RepositoryResult, TravelRepository, UserRepository,
};
use crate::services::{quote_flight, today_stamp, AirportQuery, HotelFilter, HOTEL_SEARCH_LIMIT};

/// In-memory local repository.
///
/// Cloning shares the underlying data, so a clone handed to the HTTP layer
/// observes writes made through the original.
///
/// # Example
/// ```
/// use travel_rust::db::repositories::LocalRepository;
///
/// let repo = LocalRepository::with_sample_data().unwrap();
/// assert!(repo.airport_count() > 0);
/// ```
#[derive(Clone, Default)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

#[derive(Debug, Clone)]
struct StoredUser {
    password: String,
    flights: Vec<String>,
    revision: u64,
}

struct LocalData {
    airports: BTreeMap<String, AirportDoc>,
    airlines: BTreeMap<String, AirlineDoc>,
    routes: BTreeMap<String, RouteDoc>,
    hotels: BTreeMap<String, HotelDoc>,

    users: HashMap<String, StoredUser>,
    booked_flights: HashMap<String, BookedFlight>,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            airports: BTreeMap::new(),
            airlines: BTreeMap::new(),
            routes: BTreeMap::new(),
            hotels: BTreeMap::new(),
            users: HashMap::new(),
            booked_flights: HashMap::new(),
            is_healthy: true,
        }
    }
}

impl LocalData {
    fn import(&mut self, dataset: &TravelDataset) -> ImportSummary {
        fn insert_new<T: Clone>(
            map: &mut BTreeMap<String, T>,
            docs: &[T],
            id: impl Fn(&T) -> &str,
        ) -> usize {
            let mut inserted = 0;
            for doc in docs {
                if !map.contains_key(id(doc)) {
                    map.insert(id(doc).to_string(), doc.clone());
                    inserted += 1;
                }
            }
            inserted
        }

        ImportSummary {
            airports: insert_new(&mut self.airports, &dataset.airports, |d| d.id.as_str()),
            airlines: insert_new(&mut self.airlines, &dataset.airlines, |d| d.id.as_str()),
            routes: insert_new(&mut self.routes, &dataset.routes, |d| d.id.as_str()),
            hotels: insert_new(&mut self.hotels, &dataset.hotels, |d| d.id.as_str()),
        }
    }

    fn faa_for(&self, airportname: &str) -> Option<&str> {
        self.airports
            .values()
            .find(|a| a.airportname == airportname)
            .and_then(|a| a.faa.as_deref())
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository seeded with `dataset`.
    pub fn with_dataset(dataset: &TravelDataset) -> Self {
        let repo = Self::new();
        repo.data.write().import(dataset);
        repo
    }

    /// Create a repository seeded with the bundled sample dataset.
    pub fn with_sample_data() -> RepositoryResult<Self> {
        Ok(Self::with_dataset(&TravelDataset::sample()?))
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all data from the repository.
    pub fn clear(&self) {
        let mut data = self.data.write();
        *data = LocalData {
            is_healthy: data.is_healthy,
            ..Default::default()
        };
    }

    pub fn airport_count(&self) -> usize {
        self.data.read().airports.len()
    }

    pub fn hotel_count(&self) -> usize {
        self.data.read().hotels.len()
    }

    pub fn user_count(&self) -> usize {
        self.data.read().users.len()
    }

    /// Number of booked flight documents across all users.
    pub fn booked_flight_count(&self) -> usize {
        self.data.read().booked_flights.len()
    }

    /// Helper to check health and return error if unhealthy.
    fn check_health(&self, operation: &str) -> RepositoryResult<()> {
        if self.data.read().is_healthy {
            Ok(())
        } else {
            Err(RepositoryError::connection_with_context(
                "Database is not healthy",
                ErrorContext::new(operation),
            ))
        }
    }
}

#[async_trait]
impl TravelRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn search_airports(&self, search_key: &str) -> RepositoryResult<Envelope<Vec<Airport>>> {
        self.check_health("search_airports")?;

        let query = AirportQuery::classify(search_key);
        let mut context = QueryContext::new();
        context.add(queries::airport_search(&query));

        let data = self.data.read();
        let airports = data
            .airports
            .values()
            .filter(|a| query.matches(a.faa.as_deref(), a.icao.as_deref(), &a.airportname))
            .map(|a| Airport {
                airportname: a.airportname.clone(),
            })
            .collect();

        Ok(Envelope::new(airports, context))
    }

    async fn find_flight_paths(
        &self,
        from: &str,
        to: &str,
        day: u32,
    ) -> RepositoryResult<Envelope<Vec<Flight>>> {
        self.check_health("find_flight_paths")?;

        let mut context = QueryContext::new();
        context.add(queries::AIRPORT_FAA_CODES);
        context.add(queries::FLIGHT_PATHS);

        let data = self.data.read();
        let (from_faa, to_faa) = match (data.faa_for(from), data.faa_for(to)) {
            (Some(from_faa), Some(to_faa)) => (from_faa, to_faa),
            _ => return Ok(Envelope::new(Vec::new(), context)),
        };

        let mut rows: Vec<(&AirlineDoc, &RouteDoc, &str, &str)> = Vec::new();
        for route in data.routes.values() {
            if route.sourceairport != from_faa || route.destinationairport != to_faa {
                continue;
            }
            let Some(airline) = data.airlines.get(&route.airlineid) else {
                continue;
            };
            for entry in route.schedule.iter().filter(|s| s.day == day) {
                rows.push((airline, route, entry.flight.as_str(), entry.utc.as_str()));
            }
        }
        // Byte order, matching `COLLATE "C"` in the Postgres statement.
        rows.sort_by(|(a, ..), (b, ..)| a.name.cmp(&b.name));

        let mut rng = rand::thread_rng();
        let flights = rows
            .into_iter()
            .map(|(airline, route, flight, utc)| {
                let quote = quote_flight(&mut rng);
                Flight {
                    name: airline.name.clone(),
                    flight: flight.to_string(),
                    equipment: route.equipment.clone(),
                    utc: utc.to_string(),
                    sourceairport: route.sourceairport.clone(),
                    destinationairport: route.destinationairport.clone(),
                    price: quote.price,
                    flighttime: quote.flighttime,
                }
            })
            .collect();

        Ok(Envelope::new(flights, context))
    }

    async fn find_hotels(&self, filter: &HotelFilter) -> RepositoryResult<Envelope<Vec<Hotel>>> {
        self.check_health("find_hotels")?;

        let mut context = QueryContext::new();
        context.add(queries::HOTEL_SEARCH);

        let data = self.data.read();
        let mut hotels: Vec<Hotel> = data
            .hotels
            .values()
            .map(HotelDoc::to_hotel)
            .filter(|h| {
                let location_ok = filter.location.as_deref().map_or(true, |phrase| {
                    [&h.country, &h.city, &h.state, &h.address]
                        .iter()
                        .any(|field| HotelFilter::phrase_matches(phrase, field))
                });
                let description_ok = filter.description.as_deref().map_or(true, |phrase| {
                    HotelFilter::phrase_matches(phrase, &h.description)
                        || HotelFilter::phrase_matches(phrase, &h.name)
                });
                location_ok && description_ok
            })
            .collect();
        hotels.sort_by(|a, b| a.name.cmp(&b.name));
        hotels.truncate(HOTEL_SEARCH_LIMIT);

        Ok(Envelope::new(hotels, context))
    }

    async fn import_dataset(&self, dataset: &TravelDataset) -> RepositoryResult<ImportSummary> {
        self.check_health("import_dataset")?;
        Ok(self.data.write().import(dataset))
    }
}

#[async_trait]
impl UserRepository for LocalRepository {
    async fn create_user(&self, user: &str, password: &str) -> RepositoryResult<()> {
        self.check_health("create_user")?;

        let mut data = self.data.write();
        if data.users.contains_key(user) {
            return Err(RepositoryError::conflict_with_context(
                "user already exists",
                ErrorContext::new("create_user")
                    .with_entity("user")
                    .with_entity_id(user),
            ));
        }
        data.users.insert(
            user.to_string(),
            StoredUser {
                password: password.to_string(),
                flights: Vec::new(),
                revision: 0,
            },
        );
        Ok(())
    }

    async fn get_user_password(&self, user: &str) -> RepositoryResult<String> {
        self.check_health("get_user_password")?;

        self.data
            .read()
            .users
            .get(user)
            .map(|u| u.password.clone())
            .ok_or_else(|| user_not_found("get_user_password", user))
    }

    async fn get_user_flights(&self, user: &str) -> RepositoryResult<Envelope<Vec<BookedFlight>>> {
        self.check_health("get_user_flights")?;

        let data = self.data.read();
        let stored = data
            .users
            .get(user)
            .ok_or_else(|| user_not_found("get_user_flights", user))?;

        let flights = stored
            .flights
            .iter()
            .map(|id| {
                data.booked_flights.get(id).cloned().ok_or_else(|| {
                    RepositoryError::not_found_with_context(
                        "booked flight does not exist",
                        ErrorContext::new("get_user_flights")
                            .with_entity("booked_flight")
                            .with_entity_id(id),
                    )
                })
            })
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok(Envelope::bare(flights))
    }

    async fn update_user_flights(
        &self,
        user: &str,
        flights: Vec<BookedFlight>,
    ) -> RepositoryResult<Envelope<BookingData>> {
        self.check_health("update_user_flights")?;

        let staged = self.stage_booking(user, flights)?;
        let added = self.commit_booking(staged)?;
        Ok(Envelope::bare(BookingData { added }))
    }
}

/// Bookings prepared against one revision of a user, not yet written.
struct StagedBooking {
    user: String,
    updated: StoredUser,
    read_revision: u64,
    documents: Vec<(String, BookedFlight)>,
    added: Vec<BookedFlight>,
}

impl LocalRepository {
    /// Read the user and stamp the new flights. Holds no lock on return.
    fn stage_booking(
        &self,
        user: &str,
        flights: Vec<BookedFlight>,
    ) -> RepositoryResult<StagedBooking> {
        let mut updated = self
            .data
            .read()
            .users
            .get(user)
            .cloned()
            .ok_or_else(|| user_not_found("update_user_flights", user))?;
        let read_revision = updated.revision;

        let booked_on = today_stamp();
        let mut added = Vec::with_capacity(flights.len());
        let mut documents = Vec::with_capacity(flights.len());
        for mut flight in flights {
            flight.bookedon = booked_on.clone();
            let id = Uuid::new_v4().to_string();
            updated.flights.push(id.clone());
            documents.push((id, flight.clone()));
            added.push(flight);
        }
        updated.revision = read_revision + 1;

        Ok(StagedBooking {
            user: user.to_string(),
            updated,
            read_revision,
            documents,
            added,
        })
    }

    /// Replace the user if it is still at the staged revision.
    fn commit_booking(&self, staged: StagedBooking) -> RepositoryResult<Vec<BookedFlight>> {
        let mut data = self.data.write();
        let current = data
            .users
            .get_mut(&staged.user)
            .ok_or_else(|| user_not_found("update_user_flights", &staged.user))?;
        if current.revision != staged.read_revision {
            return Err(RepositoryError::conflict_with_context(
                "user document was modified concurrently",
                ErrorContext::new("update_user_flights")
                    .with_entity("user")
                    .with_entity_id(&staged.user),
            ));
        }
        *current = staged.updated;
        data.booked_flights.extend(staged.documents);

        Ok(staged.added)
    }
}

fn user_not_found(operation: &str, user: &str) -> RepositoryError {
    RepositoryError::not_found_with_context(
        "user does not exist",
        ErrorContext::new(operation)
            .with_entity("user")
            .with_entity_id(user),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_repo() -> LocalRepository {
        LocalRepository::with_sample_data().unwrap()
    }

    fn booked(flight: &str) -> BookedFlight {
        BookedFlight {
            name: "American Airlines".into(),
            flight: flight.into(),
            price: 120.5,
            date: "12/15/2020".into(),
            sourceairport: "SFO".into(),
            destinationairport: "LAX".into(),
            bookedon: String::new(),
        }
    }

    #[tokio::test]
    async fn test_health_check() {
        let repo = LocalRepository::new();
        assert!(repo.health_check().await.unwrap());

        repo.set_healthy(false);
        assert!(!repo.health_check().await.unwrap());
        let err = repo.search_airports("SFO").await.unwrap_err();
        assert!(matches!(err, RepositoryError::ConnectionError { .. }));
    }

    #[tokio::test]
    async fn test_search_airports_by_code_and_prefix() {
        let repo = sample_repo();

        let by_faa = repo.search_airports("sfo").await.unwrap();
        assert_eq!(by_faa.data.len(), 1);
        assert_eq!(by_faa.data[0].airportname, "San Francisco Intl");
        assert_eq!(by_faa.context.0, vec![queries::AIRPORTS_BY_FAA.to_string()]);

        let by_icao = repo.search_airports("KSMO").await.unwrap();
        assert_eq!(by_icao.data[0].airportname, "Santa Monica Municipal");

        let by_name = repo.search_airports("San").await.unwrap();
        let names: Vec<_> = by_name.data.iter().map(|a| a.airportname.as_str()).collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"San Francisco Intl"));
        assert!(names.contains(&"Santa Monica Municipal"));

        let none = repo.search_airports("XYZ").await.unwrap();
        assert!(none.data.is_empty());
    }

    #[tokio::test]
    async fn test_find_flight_paths_orders_by_airline() {
        let repo = sample_repo();

        // Tuesday
        let result = repo
            .find_flight_paths("San Francisco Intl", "Los Angeles Intl", 2)
            .await
            .unwrap();
        let airlines: Vec<_> = result.data.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            airlines,
            vec![
                "American Airlines",
                "US Airways",
                "United Airlines",
                "United Airlines"
            ]
        );
        assert_eq!(result.context.len(), 2);

        for flight in &result.data {
            assert_eq!(flight.sourceairport, "SFO");
            assert_eq!(flight.destinationairport, "LAX");
            assert!((0..=8000).contains(&flight.flighttime));
            assert!(flight.price >= 0.0 && flight.price <= 1000.0);
        }
    }

    #[tokio::test]
    async fn test_find_flight_paths_unknown_airport_is_empty() {
        let repo = sample_repo();
        let result = repo
            .find_flight_paths("Nowhere", "Los Angeles Intl", 2)
            .await
            .unwrap();
        assert!(result.data.is_empty());

        // Santa Monica has no FAA code.
        let result = repo
            .find_flight_paths("Santa Monica Municipal", "Los Angeles Intl", 2)
            .await
            .unwrap();
        assert!(result.data.is_empty());
    }

    #[tokio::test]
    async fn test_find_hotels_filters() {
        let repo = sample_repo();

        let result = repo
            .find_hotels(&HotelFilter::new("Four star", "London"))
            .await
            .unwrap();
        assert_eq!(result.data.len(), 1);
        assert_eq!(result.data[0].name, "The Savoy");

        let result = repo.find_hotels(&HotelFilter::new("pool", "*")).await.unwrap();
        let names: Vec<_> = result.data.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["Ace Hotel Downtown", "Hotel Le Bristol"]);

        let result = repo
            .find_hotels(&HotelFilter::new("", "california"))
            .await
            .unwrap();
        let names: Vec<_> = result.data.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["Ace Hotel Downtown", "Fairmont San Francisco"]);

        let all = repo.find_hotels(&HotelFilter::default()).await.unwrap();
        assert_eq!(all.data.len(), repo.hotel_count());
    }

    #[tokio::test]
    async fn test_missing_hotel_fields_are_empty() {
        let repo = sample_repo();
        let result = repo
            .find_hotels(&HotelFilter::new("Nowhere", ""))
            .await
            .unwrap();
        assert_eq!(result.data.len(), 1);
        assert_eq!(result.data[0].city, "");
        assert_eq!(result.data[0].description, "");
    }

    #[tokio::test]
    async fn test_hotel_search_is_capped() {
        let mut dataset = TravelDataset::default();
        for i in 0..150 {
            dataset.hotels.push(HotelDoc {
                id: format!("hotel_{}", i),
                name: format!("Hotel {:03}", i),
                description: Some("Budget".into()),
                country: Some("France".into()),
                city: None,
                state: None,
                address: None,
            });
        }
        let repo = LocalRepository::with_dataset(&dataset);
        let result = repo.find_hotels(&HotelFilter::default()).await.unwrap();
        assert_eq!(result.data.len(), HOTEL_SEARCH_LIMIT);
    }

    #[tokio::test]
    async fn test_import_skips_existing_ids() {
        let repo = LocalRepository::new();
        let dataset = TravelDataset::sample().unwrap();

        let first = repo.import_dataset(&dataset).await.unwrap();
        assert_eq!(first.airports, dataset.airports.len());
        assert_eq!(
            first.total(),
            dataset.airports.len()
                + dataset.airlines.len()
                + dataset.routes.len()
                + dataset.hotels.len()
        );

        let second = repo.import_dataset(&dataset).await.unwrap();
        assert_eq!(second.total(), 0);
    }

    #[tokio::test]
    async fn test_create_user_conflict() {
        let repo = LocalRepository::new();
        repo.create_user("alice", "secret").await.unwrap();

        let err = repo.create_user("alice", "other").await.unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(repo.get_user_password("alice").await.unwrap(), "secret");
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let repo = LocalRepository::new();
        assert!(repo.get_user_password("bob").await.unwrap_err().is_not_found());
        assert!(repo.get_user_flights("bob").await.unwrap_err().is_not_found());
        assert!(repo
            .update_user_flights("bob", vec![booked("AA345")])
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_booking_appends_in_order() {
        let repo = LocalRepository::new();
        repo.create_user("alice", "secret").await.unwrap();

        let empty = repo.get_user_flights("alice").await.unwrap();
        assert!(empty.data.is_empty());

        let booking = repo
            .update_user_flights("alice", vec![booked("AA345"), booked("UA016")])
            .await
            .unwrap();
        assert_eq!(booking.data.added.len(), 2);
        let stamp = &booking.data.added[0].bookedon;
        assert!(chrono::NaiveDate::parse_from_str(stamp, crate::services::DATE_FORMAT).is_ok());

        repo.update_user_flights("alice", vec![booked("US404")])
            .await
            .unwrap();

        let flights = repo.get_user_flights("alice").await.unwrap();
        let codes: Vec<_> = flights.data.iter().map(|f| f.flight.as_str()).collect();
        assert_eq!(codes, vec!["AA345", "UA016", "US404"]);
        assert_eq!(repo.booked_flight_count(), 3);
    }

    #[tokio::test]
    async fn test_stale_revision_is_a_conflict() {
        let repo = LocalRepository::new();
        repo.create_user("alice", "secret").await.unwrap();

        let stale = repo.stage_booking("alice", vec![booked("AA345")]).unwrap();
        repo.update_user_flights("alice", vec![booked("UA016")])
            .await
            .unwrap();

        let err = repo.commit_booking(stale).unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(err.context().operation.as_deref(), Some("update_user_flights"));

        let flights = repo.get_user_flights("alice").await.unwrap();
        let codes: Vec<_> = flights.data.iter().map(|f| f.flight.as_str()).collect();
        assert_eq!(codes, vec!["UA016"]);
        assert_eq!(repo.booked_flight_count(), 1);
    }

    #[tokio::test]
    async fn test_booking_for_deleted_user_is_not_found() {
        let repo = LocalRepository::new();
        repo.create_user("alice", "secret").await.unwrap();

        let staged = repo.stage_booking("alice", vec![booked("AA345")]).unwrap();
        repo.clear();

        assert!(repo.commit_booking(staged).unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_clear_keeps_health() {
        let repo = sample_repo();
        repo.set_healthy(false);
        repo.clear();
        assert_eq!(repo.airport_count(), 0);
        assert!(!repo.health_check().await.unwrap());
    }
}
