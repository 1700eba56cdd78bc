//! # Travel Rust Backend
//!
//! REST backend of a travel booking demo: airport lookup, flight path
//! search with simulated fares, hotel search, user accounts and flight
//! bookings guarded by bearer tokens.
//!
//! ## Architecture
//!
//! - [`api`]: wire types and the `{"data", "context"}` envelope
//! - [`auth`]: token signing and verification
//! - [`config`]: server settings from the environment
//! - [`db`]: repository traits, backends and configuration
//! - [`services`]: request normalization shared by the backends
//! - [`http`]: Axum-based HTTP server and request handlers

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod logging;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
