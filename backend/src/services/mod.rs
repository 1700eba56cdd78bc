//! Request-to-query helpers shared by the HTTP layer and every repository
//! backend.
//!
//! Nothing in here touches storage. The functions translate raw request
//! parameters into the typed filters the repositories execute, so that the
//! in-memory and Postgres backends agree on the meaning of a search.

pub mod airports;
pub mod flights;
pub mod hotels;

pub use airports::AirportQuery;
pub use flights::{leave_day_of_week, quote_flight, today_stamp, FlightQuote, DATE_FORMAT};
pub use hotels::{HotelFilter, HOTEL_SEARCH_LIMIT};

/// Escape `LIKE` wildcards so user input matches literally.
pub(crate) fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
