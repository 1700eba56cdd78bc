use diesel::prelude::*;
use diesel::sql_types::{Nullable, Text};

use super::schema::{airlines, airports, booked_flights, hotels, route_schedules, routes, users};
use crate::api::{BookedFlight, Hotel};
use crate::db::dataset::{AirlineDoc, AirportDoc, HotelDoc, RouteDoc, ScheduleEntry};

// ==================== Travel documents ====================

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = airports)]
pub struct NewAirportRow<'a> {
    pub id: &'a str,
    pub airportname: &'a str,
    pub faa: Option<&'a str>,
    pub icao: Option<&'a str>,
    pub city: &'a str,
    pub country: &'a str,
}

impl<'a> From<&'a AirportDoc> for NewAirportRow<'a> {
    fn from(doc: &'a AirportDoc) -> Self {
        Self {
            id: &doc.id,
            airportname: &doc.airportname,
            faa: doc.faa.as_deref(),
            icao: doc.icao.as_deref(),
            city: &doc.city,
            country: &doc.country,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = airlines)]
pub struct NewAirlineRow<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub iata: Option<&'a str>,
    pub icao: Option<&'a str>,
    pub callsign: Option<&'a str>,
    pub country: &'a str,
}

impl<'a> From<&'a AirlineDoc> for NewAirlineRow<'a> {
    fn from(doc: &'a AirlineDoc) -> Self {
        Self {
            id: &doc.id,
            name: &doc.name,
            iata: doc.iata.as_deref(),
            icao: doc.icao.as_deref(),
            callsign: doc.callsign.as_deref(),
            country: &doc.country,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = routes)]
pub struct NewRouteRow<'a> {
    pub id: &'a str,
    pub airlineid: &'a str,
    pub sourceairport: &'a str,
    pub destinationairport: &'a str,
    pub equipment: &'a str,
}

impl<'a> From<&'a RouteDoc> for NewRouteRow<'a> {
    fn from(doc: &'a RouteDoc) -> Self {
        Self {
            id: &doc.id,
            airlineid: &doc.airlineid,
            sourceairport: &doc.sourceairport,
            destinationairport: &doc.destinationairport,
            equipment: &doc.equipment,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = route_schedules)]
pub struct NewRouteScheduleRow<'a> {
    pub route_id: &'a str,
    pub day: i32,
    pub utc: &'a str,
    pub flight: &'a str,
}

impl<'a> NewRouteScheduleRow<'a> {
    pub fn new(route_id: &'a str, entry: &'a ScheduleEntry) -> Self {
        Self {
            route_id,
            day: entry.day as i32,
            utc: &entry.utc,
            flight: &entry.flight,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = hotels)]
pub struct NewHotelRow<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub country: Option<&'a str>,
    pub city: Option<&'a str>,
    pub state: Option<&'a str>,
    pub address: Option<&'a str>,
}

impl<'a> From<&'a HotelDoc> for NewHotelRow<'a> {
    fn from(doc: &'a HotelDoc) -> Self {
        Self {
            id: &doc.id,
            name: &doc.name,
            description: doc.description.as_deref(),
            country: doc.country.as_deref(),
            city: doc.city.as_deref(),
            state: doc.state.as_deref(),
            address: doc.address.as_deref(),
        }
    }
}

// ==================== Search rows ====================

#[derive(Debug, Clone, QueryableByName)]
pub struct AirportNameRow {
    #[diesel(sql_type = Text)]
    pub airportname: String,
}

#[derive(Debug, Clone, QueryableByName)]
pub struct FaaCodesRow {
    #[diesel(sql_type = Nullable<Text>)]
    pub from_faa: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub to_faa: Option<String>,
}

/// Route schedule entry joined with its airline, before pricing.
#[derive(Debug, Clone, QueryableByName)]
pub struct FlightPathRow {
    #[diesel(sql_type = Text)]
    pub name: String,
    #[diesel(sql_type = Text)]
    pub flight: String,
    #[diesel(sql_type = Text)]
    pub utc: String,
    #[diesel(sql_type = Text)]
    pub sourceairport: String,
    #[diesel(sql_type = Text)]
    pub destinationairport: String,
    #[diesel(sql_type = Text)]
    pub equipment: String,
}

#[derive(Debug, Clone, QueryableByName)]
pub struct HotelRow {
    #[diesel(sql_type = Text)]
    pub name: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub description: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub country: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub city: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub state: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub address: Option<String>,
}

impl From<HotelRow> for Hotel {
    fn from(row: HotelRow) -> Self {
        Hotel {
            country: row.country.unwrap_or_default(),
            city: row.city.unwrap_or_default(),
            state: row.state.unwrap_or_default(),
            address: row.address.unwrap_or_default(),
            name: row.name,
            description: row.description.unwrap_or_default(),
        }
    }
}

// ==================== Users ====================

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub name: String,
    pub password: String,
    pub flights: Vec<String>,
    pub revision: i64,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow<'a> {
    pub name: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = booked_flights)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BookedFlightRow {
    pub id: String,
    pub name: String,
    pub flight: String,
    pub price: f64,
    pub date: String,
    pub sourceairport: String,
    pub destinationairport: String,
    pub bookedon: String,
}

impl BookedFlightRow {
    pub fn new(id: String, flight: BookedFlight) -> Self {
        Self {
            id,
            name: flight.name,
            flight: flight.flight,
            price: flight.price,
            date: flight.date,
            sourceairport: flight.sourceairport,
            destinationairport: flight.destinationairport,
            bookedon: flight.bookedon,
        }
    }
}

impl From<BookedFlightRow> for BookedFlight {
    fn from(row: BookedFlightRow) -> Self {
        BookedFlight {
            name: row.name,
            flight: row.flight,
            price: row.price,
            date: row.date,
            sourceairport: row.sourceairport,
            destinationairport: row.destinationairport,
            bookedon: row.bookedon,
        }
    }
}
