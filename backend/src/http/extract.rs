//! Request extractors.

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::{request::Parts, HeaderMap},
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::error::AppError;
use super::state::AppState;
use crate::auth::{AUTHENTICATION_HEADER, AUTHORIZATION_HEADER};

/// JSON request body.
///
/// Unlike `axum::Json`, this accepts any content type and reports
/// undecodable bodies as internal errors.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::Internal(e.body_text()))?;

        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|e| AppError::Internal(e.to_string()))
    }
}

/// Query string parameters.
///
/// When a key repeats, its first value wins. Rejections render as the
/// failure envelope.
#[derive(Debug, Clone)]
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        serde_json::from_value(Value::Object(first_values(pairs)))
            .map(QueryParams)
            .map_err(|e| AppError::BadRequest(e.to_string()))
    }
}

fn first_values(pairs: Vec<(String, String)>) -> Map<String, Value> {
    let mut map = Map::new();
    for (key, value) in pairs {
        map.entry(key).or_insert(Value::String(value));
    }
    map
}

/// Path segments. Rejections render as the failure envelope.
#[derive(Debug, Clone)]
pub struct PathParams<T>(pub T);

impl<S, T> FromRequestParts<S> for PathParams<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        Ok(PathParams(value))
    }
}

/// The user named by a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub String);

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = state.signer.verify_headers(
            header(&parts.headers, AUTHORIZATION_HEADER),
            header(&parts.headers, AUTHENTICATION_HEADER),
        )?;
        Ok(AuthenticatedUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_value_of_repeated_key_wins() {
        let pairs = vec![
            ("search".to_string(), "SFO".to_string()),
            ("other".to_string(), "x".to_string()),
            ("search".to_string(), "LAX".to_string()),
        ];
        let map = first_values(pairs);
        assert_eq!(map["search"], "SFO");
        assert_eq!(map.len(), 2);
    }
}
