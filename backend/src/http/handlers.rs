//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! repository for data access.

use axum::{extract::State, Json};

use super::dto::{AirportSearchQuery, FlightSearchQuery, HotelSearchPath};
use super::error::{AppError, BAD_PASSWORD, USER_EXISTS, USER_NOT_FOUND};
use super::extract::{AuthenticatedUser, JsonBody, PathParams, QueryParams};
use super::state::AppState;
use crate::api::{
    AirportSearchResponse, BookFlightsRequest, BookFlightsResponse, Credentials, Envelope,
    FlightSearchResponse, HotelSearchResponse, TokenData, TokenResponse, UserFlightsResponse,
};
use crate::services::{leave_day_of_week, HotelFilter};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Travel search
// =============================================================================

/// GET /api/airports?search=
pub async fn search_airports(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<AirportSearchQuery>,
) -> HandlerResult<AirportSearchResponse> {
    let result = state.repository.search_airports(&query.search).await?;
    Ok(Json(result))
}

/// GET /api/flightPaths/{from}/{to}?leave=MM/DD/YYYY
pub async fn search_flight_paths(
    State(state): State<AppState>,
    PathParams((from, to)): PathParams<(String, String)>,
    QueryParams(query): QueryParams<FlightSearchQuery>,
) -> HandlerResult<FlightSearchResponse> {
    let day = leave_day_of_week(&query.leave)
        .map_err(|e| AppError::Internal(format!("invalid leave date {:?}: {}", query.leave, e)))?;

    let result = state.repository.find_flight_paths(&from, &to, day).await?;
    Ok(Json(result))
}

/// GET /api/hotel/{description}[/{location}]
///
/// `*` in either segment disables that filter.
pub async fn search_hotels(
    State(state): State<AppState>,
    PathParams(path): PathParams<HotelSearchPath>,
) -> HandlerResult<HotelSearchResponse> {
    let filter = HotelFilter::new(&path.description, path.location.as_deref().unwrap_or(""));
    let result = state.repository.find_hotels(&filter).await?;
    Ok(Json(result))
}

// =============================================================================
// Users
// =============================================================================

/// POST /api/user/login
pub async fn user_login(
    State(state): State<AppState>,
    JsonBody(credentials): JsonBody<Credentials>,
) -> HandlerResult<TokenResponse> {
    let password = match state.repository.get_user_password(&credentials.user).await {
        Ok(password) => password,
        Err(e) if e.is_not_found() => return Err(AppError::Unauthorized(USER_NOT_FOUND.into())),
        Err(e) => return Err(e.into()),
    };

    if password != credentials.password {
        return Err(AppError::Unauthorized(BAD_PASSWORD.into()));
    }

    let token = state.signer.issue(&credentials.user)?;
    Ok(Json(Envelope::bare(TokenData { token })))
}

/// POST /api/user/signup
pub async fn user_signup(
    State(state): State<AppState>,
    JsonBody(credentials): JsonBody<Credentials>,
) -> HandlerResult<TokenResponse> {
    match state
        .repository
        .create_user(&credentials.user, &credentials.password)
        .await
    {
        Ok(()) => {}
        Err(e) if e.is_conflict() => return Err(AppError::Conflict(USER_EXISTS.into())),
        Err(e) => return Err(e.into()),
    }

    tracing::info!(user = %credentials.user, "user signed up");
    let token = state.signer.issue(&credentials.user)?;
    Ok(Json(Envelope::bare(TokenData { token })))
}

/// GET /api/user/{username}/flights
///
/// The token names the user; the path segment is not consulted.
pub async fn user_flights(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> HandlerResult<UserFlightsResponse> {
    let result = state.repository.get_user_flights(&user).await?;
    Ok(Json(result))
}

/// POST /api/user/{username}/flights
pub async fn book_flights(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    JsonBody(request): JsonBody<BookFlightsRequest>,
) -> HandlerResult<BookFlightsResponse> {
    let count = request.flights.len();
    let result = state
        .repository
        .update_user_flights(&user, request.flights)
        .await?;

    tracing::info!(user = %user, flights = count, "flights booked");
    Ok(Json(result))
}
