//! Integration tests of the in-memory repository through the repository traits.

use std::sync::Arc;

use travel_rust::api::BookedFlight;
use travel_rust::db::repository::{FullRepository, RepositoryError};
use travel_rust::db::{LocalConfig, LocalRepository, RepositoryFactory, TravelDataset};
use travel_rust::services::HotelFilter;

const EXTRA_DATASET: &str = r#"{
    "airports": [
        {"id": "airport_9001", "airportname": "Reykjavik Keflavik", "faa": "KEF", "icao": "BIKF", "city": "Reykjavik", "country": "Iceland"}
    ],
    "airlines": [
        {"id": "airline_9001", "name": "Icelandair", "iata": "FI", "icao": "ICE", "country": "Iceland"}
    ],
    "routes": [],
    "hotels": [
        {"id": "hotel_9001", "name": "Blue Lagoon Retreat", "description": "Geothermal spa", "country": "Iceland", "city": "Grindavik"}
    ]
}"#;

fn repo() -> Arc<dyn FullRepository> {
    Arc::new(LocalRepository::with_sample_data().unwrap())
}

fn flight(code: &str) -> BookedFlight {
    BookedFlight {
        name: "United Airlines".to_string(),
        flight: code.to_string(),
        price: 99.0,
        date: "01/07/2025".to_string(),
        sourceairport: "SFO".to_string(),
        destinationairport: "LAX".to_string(),
        bookedon: String::new(),
    }
}

#[tokio::test]
async fn test_import_then_search() {
    let repo = repo();
    let dataset = TravelDataset::from_json(EXTRA_DATASET).unwrap();

    let summary = repo.import_dataset(&dataset).await.unwrap();
    assert_eq!(summary.airports, 1);
    assert_eq!(summary.airlines, 1);
    assert_eq!(summary.hotels, 1);
    assert_eq!(summary.total(), 3);

    let airports = repo.search_airports("KEF").await.unwrap();
    assert_eq!(airports.data[0].airportname, "Reykjavik Keflavik");

    let hotels = repo
        .find_hotels(&HotelFilter::new("spa", "iceland"))
        .await
        .unwrap();
    assert_eq!(hotels.data.len(), 1);
    assert_eq!(hotels.data[0].state, "");

    // Re-importing writes nothing new.
    let again = repo.import_dataset(&dataset).await.unwrap();
    assert_eq!(again.total(), 0);
}

#[tokio::test]
async fn test_dataset_file_seeds_repository() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("extra.json");
    std::fs::write(&path, EXTRA_DATASET).unwrap();

    let config = LocalConfig {
        dataset: Some(path),
        empty: false,
    };
    let repo = RepositoryFactory::create_local(&config).unwrap();

    assert_eq!(repo.search_airports("BIKF").await.unwrap().data.len(), 1);
    assert!(repo.search_airports("SFO").await.unwrap().data.is_empty());
}

#[tokio::test]
async fn test_malformed_dataset_is_rejected() {
    assert!(matches!(
        TravelDataset::from_json("{\"airports\": 7}"),
        Err(RepositoryError::ValidationError { .. })
    ));
}

#[tokio::test]
async fn test_user_lifecycle() {
    let repo = repo();
    repo.create_user("alice", "secret").await.unwrap();
    assert_eq!(repo.get_user_password("alice").await.unwrap(), "secret");

    let err = repo.create_user("alice", "again").await.unwrap_err();
    assert!(err.is_conflict());

    let flights = repo.get_user_flights("alice").await.unwrap();
    assert!(flights.data.is_empty());
    assert!(flights.context.is_empty());
}

#[tokio::test]
async fn test_bookings_accumulate_in_order() {
    let repo = repo();
    repo.create_user("alice", "secret").await.unwrap();

    let first = repo
        .update_user_flights("alice", vec![flight("UA1"), flight("UA2")])
        .await
        .unwrap();
    assert_eq!(first.data.added.len(), 2);
    assert!(first.data.added.iter().all(|f| !f.bookedon.is_empty()));

    repo.update_user_flights("alice", vec![flight("UA3")])
        .await
        .unwrap();

    let codes: Vec<_> = repo
        .get_user_flights("alice")
        .await
        .unwrap()
        .data
        .into_iter()
        .map(|f| f.flight)
        .collect();
    assert_eq!(codes, vec!["UA1", "UA2", "UA3"]);
}

#[tokio::test]
async fn test_empty_booking_is_accepted() {
    let repo = repo();
    repo.create_user("alice", "secret").await.unwrap();

    let result = repo.update_user_flights("alice", Vec::new()).await.unwrap();
    assert!(result.data.added.is_empty());
}

#[tokio::test]
async fn test_booking_for_unknown_user_is_not_found() {
    let repo = repo();
    let err = repo
        .update_user_flights("ghost", vec![flight("UA1")])
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_bookings_never_lose_flights() {
    let repo = repo();
    repo.create_user("alice", "secret").await.unwrap();

    let mut tasks = Vec::new();
    for i in 0..16 {
        let repo = Arc::clone(&repo);
        tasks.push(tokio::spawn(async move {
            repo.update_user_flights("alice", vec![flight(&format!("UA{}", i))])
                .await
        }));
    }

    let mut booked = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(result) => booked += result.data.added.len(),
            Err(e) => assert!(e.is_conflict(), "unexpected error: {}", e),
        }
    }

    let stored = repo.get_user_flights("alice").await.unwrap().data;
    assert_eq!(stored.len(), booked);
}
