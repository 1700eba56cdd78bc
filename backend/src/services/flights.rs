//! Flight search helpers: leave-date parsing and fare quoting.

use chrono::{Datelike, NaiveDate, Utc};
use rand::Rng;

/// Date format used by the `leave` query parameter and booking stamps.
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// Upper bound of a quoted flight time, in minutes.
const MAX_FLIGHT_TIME: f64 = 8000.0;

/// Parse a `MM/DD/YYYY` leave date into a day of week, Sunday = 0.
pub fn leave_day_of_week(leave: &str) -> Result<u32, chrono::ParseError> {
    let date = NaiveDate::parse_from_str(leave, DATE_FORMAT)?;
    Ok(date.weekday().num_days_from_sunday())
}

/// Today's date in booking format (UTC).
pub fn today_stamp() -> String {
    Utc::now().format(DATE_FORMAT).to_string()
}

/// Simulated flight time and fare.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightQuote {
    pub flighttime: i64,
    pub price: f64,
}

/// Quote a flight: a random flight time up to 8000 and a fare of one
/// eighth of it, rounded up to the cent.
pub fn quote_flight<R: Rng + ?Sized>(rng: &mut R) -> FlightQuote {
    let flighttime = (rng.gen::<f64>() * MAX_FLIGHT_TIME).ceil() as i64;
    let price = (flighttime as f64 / 8.0 * 100.0).ceil() / 100.0;
    FlightQuote { flighttime, price }
}
