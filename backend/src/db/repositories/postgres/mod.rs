//! Postgres repository implementation using Diesel.
//!
//! Travel documents live in relational tables (see the embedded migrations):
//! routes are split into `routes` and `route_schedules`, users keep their
//! booked flight ids in a `TEXT[]` column next to a revision counter used for
//! optimistic concurrency.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures
//! - Automatic migration execution
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel::sql_types::{Integer, Nullable, Text};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task;
use uuid::Uuid;

use crate::api::{Airport, BookedFlight, BookingData, Envelope, Flight, Hotel, QueryContext};
use crate::db::dataset::{ImportSummary, TravelDataset};
use crate::db::queries;
use crate::db::repository::{
    ErrorContext, RepositoryError, RepositoryResult, TravelRepository, UserRepository,
};
use crate::services::{quote_flight, today_stamp, AirportQuery, HotelFilter};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Rows per INSERT statement during imports; keeps bind parameters well
/// under the Postgres limit.
const IMPORT_BATCH_SIZE: usize = 1000;

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    ///
    /// Unparseable numeric values fall back to their defaults.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let defaults = Self::default();
        Ok(Self {
            database_url,
            max_pool_size: env_or("PG_POOL_MAX", defaults.max_pool_size),
            min_pool_size: env_or("PG_POOL_MIN", defaults.min_pool_size),
            connection_timeout_sec: env_or("PG_CONN_TIMEOUT_SEC", defaults.connection_timeout_sec),
            idle_timeout_sec: env_or("PG_IDLE_TIMEOUT_SEC", defaults.idle_timeout_sec),
            max_retries: env_or("PG_MAX_RETRIES", defaults.max_retries),
            retry_delay_ms: env_or("PG_RETRY_DELAY_MS", defaults.retry_delay_ms),
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Pool health statistics.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Number of connections currently in use
    pub connections_in_use: u32,
    /// Number of idle connections
    pub idle_connections: u32,
    /// Maximum pool size
    pub max_size: u32,
    /// Total queries executed
    pub total_queries: u64,
    /// Total failed queries
    pub failed_queries: u64,
    /// Total retried operations
    pub retried_operations: u64,
}

/// Diesel-backed repository for Postgres.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
    total_queries: Arc<AtomicU64>,
    failed_queries: Arc<AtomicU64>,
    retried_operations: Arc<AtomicU64>,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    ///
    /// # Returns
    /// * `Ok(PostgresRepository)` on success
    /// * `Err(RepositoryError)` if connection or migration fails
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::timeout_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
                RepositoryError::internal_with_context(
                    format!("Migration failed: {}", e),
                    ErrorContext::new("run_migrations"),
                )
            })?;
        }

        Ok(Self {
            pool,
            config,
            total_queries: Arc::new(AtomicU64::new(0)),
            failed_queries: Arc::new(AtomicU64::new(0)),
            retried_operations: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Execute a database operation on the blocking pool, retrying transient
    /// failures with exponential backoff.
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;
        let total_queries = self.total_queries.clone();
        let failed_queries = self.failed_queries.clone();
        let retried_operations = self.retried_operations.clone();

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    retried_operations.fetch_add(1, Ordering::Relaxed);
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2;
                }

                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::timeout_with_context(
                            e.to_string(),
                            ErrorContext::new("get_connection")
                                .with_details(format!("attempt={}", attempt + 1)),
                        );
                        if attempt < max_retries {
                            log::warn!("{}; retrying", err);
                            last_error = Some(err);
                            continue;
                        }
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(err);
                    }
                };

                total_queries.fetch_add(1, Ordering::Relaxed);
                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        log::warn!("{}; retrying", e);
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => {
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(e);
                    }
                }
            }

            failed_queries.fetch_add(1, Ordering::Relaxed);
            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }

    /// Get pool health statistics.
    pub fn get_pool_stats(&self) -> PoolStats {
        let state = self.pool.state();
        PoolStats {
            connections_in_use: state.connections - state.idle_connections,
            idle_connections: state.idle_connections,
            max_size: self.config.max_pool_size,
            total_queries: self.total_queries.load(Ordering::Relaxed),
            failed_queries: self.failed_queries.load(Ordering::Relaxed),
            retried_operations: self.retried_operations.load(Ordering::Relaxed),
        }
    }
}

fn with_operation(operation: &'static str) -> impl Fn(diesel::result::Error) -> RepositoryError {
    move |err| RepositoryError::from(err).with_operation(operation)
}

fn load_user(
    conn: &mut PgConnection,
    operation: &'static str,
    user: &str,
) -> RepositoryResult<UserRow> {
    users::table
        .find(user)
        .select(UserRow::as_select())
        .first(conn)
        .optional()
        .map_err(with_operation(operation))?
        .ok_or_else(|| {
            RepositoryError::not_found_with_context(
                "user does not exist",
                ErrorContext::new(operation)
                    .with_entity("user")
                    .with_entity_id(user),
            )
        })
}

fn insert_dataset(
    conn: &mut PgConnection,
    dataset: &TravelDataset,
) -> RepositoryResult<ImportSummary> {
    let op = with_operation("import_dataset");
    let mut summary = ImportSummary::default();

    for chunk in dataset.airports.chunks(IMPORT_BATCH_SIZE) {
        let rows: Vec<NewAirportRow> = chunk.iter().map(NewAirportRow::from).collect();
        summary.airports += diesel::insert_into(airports::table)
            .values(&rows)
            .on_conflict_do_nothing()
            .execute(conn)
            .map_err(&op)?;
    }

    for chunk in dataset.airlines.chunks(IMPORT_BATCH_SIZE) {
        let rows: Vec<NewAirlineRow> = chunk.iter().map(NewAirlineRow::from).collect();
        summary.airlines += diesel::insert_into(airlines::table)
            .values(&rows)
            .on_conflict_do_nothing()
            .execute(conn)
            .map_err(&op)?;
    }

    for chunk in dataset.routes.chunks(IMPORT_BATCH_SIZE) {
        let rows: Vec<NewRouteRow> = chunk.iter().map(NewRouteRow::from).collect();
        let inserted: Vec<String> = diesel::insert_into(routes::table)
            .values(&rows)
            .on_conflict_do_nothing()
            .returning(routes::id)
            .get_results(conn)
            .map_err(&op)?;
        summary.routes += inserted.len();

        // Schedules of routes that already existed are left untouched.
        let schedules: Vec<NewRouteScheduleRow> = chunk
            .iter()
            .filter(|route| inserted.contains(&route.id))
            .flat_map(|route| {
                route
                    .schedule
                    .iter()
                    .map(move |entry| NewRouteScheduleRow::new(&route.id, entry))
            })
            .collect();
        for batch in schedules.chunks(IMPORT_BATCH_SIZE) {
            diesel::insert_into(route_schedules::table)
                .values(batch)
                .on_conflict_do_nothing()
                .execute(conn)
                .map_err(&op)?;
        }
    }

    for chunk in dataset.hotels.chunks(IMPORT_BATCH_SIZE) {
        let rows: Vec<NewHotelRow> = chunk.iter().map(NewHotelRow::from).collect();
        summary.hotels += diesel::insert_into(hotels::table)
            .values(&rows)
            .on_conflict_do_nothing()
            .execute(conn)
            .map_err(&op)?;
    }

    Ok(summary)
}

#[async_trait]
impl TravelRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(with_operation("health_check"))
        })
        .await
    }

    async fn search_airports(&self, search_key: &str) -> RepositoryResult<Envelope<Vec<Airport>>> {
        let query = AirportQuery::classify(search_key);
        let statement = queries::airport_search(&query);
        let param = query
            .prefix_pattern()
            .unwrap_or_else(|| query.param().to_string());

        let rows: Vec<AirportNameRow> = self
            .with_conn(move |conn| {
                sql_query(statement)
                    .bind::<Text, _>(param)
                    .load(conn)
                    .map_err(with_operation("search_airports"))
            })
            .await?;

        let mut context = QueryContext::new();
        context.add(statement);
        let airports = rows
            .into_iter()
            .map(|row| Airport {
                airportname: row.airportname,
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
        let from = from.to_string();
        let to = to.to_string();
        let day = day as i32;

        let rows: Vec<FlightPathRow> = self
            .with_conn(move |conn| {
                let op = with_operation("find_flight_paths");
                let codes: FaaCodesRow = sql_query(queries::AIRPORT_FAA_CODES)
                    .bind::<Text, _>(from)
                    .bind::<Text, _>(to)
                    .get_result(conn)
                    .map_err(&op)?;

                // `= NULL` never matches, so unknown airports yield no flights.
                sql_query(queries::FLIGHT_PATHS)
                    .bind::<Nullable<Text>, _>(codes.from_faa)
                    .bind::<Nullable<Text>, _>(codes.to_faa)
                    .bind::<Integer, _>(day)
                    .load(conn)
                    .map_err(&op)
            })
            .await?;

        let mut context = QueryContext::new();
        context.add(queries::AIRPORT_FAA_CODES);
        context.add(queries::FLIGHT_PATHS);

        let mut rng = rand::thread_rng();
        let flights = rows
            .into_iter()
            .map(|row| {
                let quote = quote_flight(&mut rng);
                Flight {
                    name: row.name,
                    flight: row.flight,
                    equipment: row.equipment,
                    utc: row.utc,
                    sourceairport: row.sourceairport,
                    destinationairport: row.destinationairport,
                    price: quote.price,
                    flighttime: quote.flighttime,
                }
            })
            .collect();
        Ok(Envelope::new(flights, context))
    }

    async fn find_hotels(&self, filter: &HotelFilter) -> RepositoryResult<Envelope<Vec<Hotel>>> {
        let location = filter.location.as_deref().map(HotelFilter::like_pattern);
        let description = filter.description.as_deref().map(HotelFilter::like_pattern);

        let rows: Vec<HotelRow> = self
            .with_conn(move |conn| {
                sql_query(queries::HOTEL_SEARCH)
                    .bind::<Nullable<Text>, _>(location)
                    .bind::<Nullable<Text>, _>(description)
                    .load(conn)
                    .map_err(with_operation("find_hotels"))
            })
            .await?;

        let mut context = QueryContext::new();
        context.add(queries::HOTEL_SEARCH);
        Ok(Envelope::new(
            rows.into_iter().map(Hotel::from).collect(),
            context,
        ))
    }

    async fn import_dataset(&self, dataset: &TravelDataset) -> RepositoryResult<ImportSummary> {
        let dataset = Arc::new(dataset.clone());
        self.with_conn(move |conn| {
            conn.transaction::<_, RepositoryError, _>(|tx| insert_dataset(tx, &dataset))
        })
        .await
    }
}

#[async_trait]
impl UserRepository for PostgresRepository {
    async fn create_user(&self, user: &str, password: &str) -> RepositoryResult<()> {
        let user = user.to_string();
        let password = password.to_string();

        self.with_conn(move |conn| {
            let result = diesel::insert_into(users::table)
                .values(NewUserRow {
                    name: &user,
                    password: &password,
                })
                .execute(conn);

            match result.map_err(RepositoryError::from) {
                Ok(_) => Ok(()),
                Err(e) if e.is_conflict() => Err(RepositoryError::conflict_with_context(
                    "user already exists",
                    ErrorContext::new("create_user")
                        .with_entity("user")
                        .with_entity_id(&user),
                )),
                Err(e) => Err(e.with_operation("create_user")),
            }
        })
        .await
    }

    async fn get_user_password(&self, user: &str) -> RepositoryResult<String> {
        let user = user.to_string();
        self.with_conn(move |conn| {
            load_user(conn, "get_user_password", &user).map(|row| row.password)
        })
        .await
    }

    async fn get_user_flights(&self, user: &str) -> RepositoryResult<Envelope<Vec<BookedFlight>>> {
        let user = user.to_string();

        let flights = self
            .with_conn(move |conn| {
                let row = load_user(conn, "get_user_flights", &user)?;
                let mut by_id: HashMap<String, BookedFlightRow> = booked_flights::table
                    .filter(booked_flights::id.eq_any(row.flights.clone()))
                    .select(BookedFlightRow::as_select())
                    .load(conn)
                    .map_err(with_operation("get_user_flights"))?
                    .into_iter()
                    .map(|flight| (flight.id.clone(), flight))
                    .collect();

                row.flights
                    .iter()
                    .map(|id| {
                        by_id.remove(id).map(BookedFlight::from).ok_or_else(|| {
                            RepositoryError::not_found_with_context(
                                "booked flight does not exist",
                                ErrorContext::new("get_user_flights")
                                    .with_entity("booked_flight")
                                    .with_entity_id(id),
                            )
                        })
                    })
                    .collect::<RepositoryResult<Vec<_>>>()
            })
            .await?;

        Ok(Envelope::bare(flights))
    }

    async fn update_user_flights(
        &self,
        user: &str,
        flights: Vec<BookedFlight>,
    ) -> RepositoryResult<Envelope<BookingData>> {
        let user = user.to_string();

        let added = self
            .with_conn(move |conn| {
                conn.transaction::<_, RepositoryError, _>(|tx| {
                    let op = with_operation("update_user_flights");
                    let stored = load_user(tx, "update_user_flights", &user)?;

                    let booked_on = today_stamp();
                    let mut flight_ids = stored.flights.clone();
                    let mut added = Vec::with_capacity(flights.len());
                    let mut rows = Vec::with_capacity(flights.len());
                    for mut flight in flights.clone() {
                        flight.bookedon = booked_on.clone();
                        let id = Uuid::new_v4().to_string();
                        flight_ids.push(id.clone());
                        rows.push(BookedFlightRow::new(id, flight.clone()));
                        added.push(flight);
                    }

                    diesel::insert_into(booked_flights::table)
                        .values(&rows)
                        .execute(tx)
                        .map_err(&op)?;

                    let updated = diesel::update(
                        users::table
                            .filter(users::name.eq(&user))
                            .filter(users::revision.eq(stored.revision)),
                    )
                    .set((
                        users::flights.eq(&flight_ids),
                        users::revision.eq(stored.revision + 1),
                    ))
                    .execute(tx)
                    .map_err(&op)?;

                    if updated == 0 {
                        return Err(RepositoryError::conflict_with_context(
                            "user document was modified concurrently",
                            ErrorContext::new("update_user_flights")
                                .with_entity("user")
                                .with_entity_id(&user),
                        ));
                    }
                    Ok(added)
                })
            })
            .await?;

        Ok(Envelope::bare(BookingData { added }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_url_keeps_defaults() {
        let config = PostgresConfig::with_url("postgres://localhost/travel");
        assert_eq!(config.database_url, "postgres://localhost/travel");
        assert_eq!(config.max_pool_size, 10);
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_migrations_are_embedded() {
        use diesel::migration::MigrationSource;

        let names: Vec<String> = MigrationSource::<diesel::pg::Pg>::migrations(&MIGRATIONS)
            .unwrap()
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        assert!(names.iter().any(|n| n.contains("create_travel_tables")));
    }
}
