//! Query text reported in response contexts.
//!
//! The Postgres backend executes these statements; the in-memory backend
//! evaluates the same filters and records the same text, so both report
//! identical contexts for identical requests.

use crate::services::AirportQuery;

pub const AIRPORTS_BY_FAA: &str = "SELECT airportname FROM airports WHERE faa = $1";

pub const AIRPORTS_BY_ICAO: &str = "SELECT airportname FROM airports WHERE icao = $1";

pub const AIRPORTS_BY_NAME_PREFIX: &str =
    "SELECT airportname FROM airports WHERE LOWER(airportname) LIKE $1";

pub const AIRPORT_FAA_CODES: &str = "SELECT \
     (SELECT faa FROM airports WHERE airportname = $1 LIMIT 1) AS from_faa, \
     (SELECT faa FROM airports WHERE airportname = $2 LIMIT 1) AS to_faa";

pub const FLIGHT_PATHS: &str = "SELECT a.name, s.flight, s.utc, r.sourceairport, \
     r.destinationairport, r.equipment \
     FROM routes AS r \
     JOIN route_schedules AS s ON s.route_id = r.id \
     JOIN airlines AS a ON a.id = r.airlineid \
     WHERE r.sourceairport = $1 AND r.destinationairport = $2 AND s.day = $3 \
     ORDER BY a.name COLLATE \"C\" ASC";

pub const HOTEL_SEARCH: &str = "SELECT name, description, country, city, state, address \
     FROM hotels \
     WHERE ($1::text IS NULL OR country ILIKE $1 OR city ILIKE $1 \
     OR state ILIKE $1 OR address ILIKE $1) \
     AND ($2::text IS NULL OR description ILIKE $2 OR name ILIKE $2) \
     ORDER BY name COLLATE \"C\" \
     LIMIT 100";

/// Statement used for an airport search.
pub fn airport_search(query: &AirportQuery) -> &'static str {
    match query {
        AirportQuery::Faa(_) => AIRPORTS_BY_FAA,
        AirportQuery::Icao(_) => AIRPORTS_BY_ICAO,
        AirportQuery::NamePrefix(_) => AIRPORTS_BY_NAME_PREFIX,
    }
}
