//! # Vietnam Fire Risk Backend
//!
//! Wildfire-risk scoring for locations in Vietnam.
//!
//! The crate combines live satellite hotspots (NASA FIRMS), daily weather
//! (Open-Meteo) and province boundaries into a feature record, runs it
//! through a fitted preprocessing pipeline and scores it with a
//! gradient-boosted classifier. The same pipeline is fit offline by the
//! training binary, so training and serving share every transformation.
//!
//! ## Architecture
//!
//! - [`geo`]: point-in-polygon province lookup over GeoJSON boundaries
//! - [`adapters`]: FIRMS and Open-Meteo clients behind async traits
//! - [`features`]: derived features shared by training and serving
//! - [`preprocessing`]: fit/transform pipeline and its persisted state
//! - [`model`]: classifier trait, GBDT implementation and metrics
//! - [`training`]: CSV loading and the offline fit
//! - [`services`]: request-level operations used by the HTTP layer
//! - [`http`]: Axum router, handlers and error mapping
//! - [`config`]: TOML + environment configuration

pub mod adapters;
pub mod config;
pub mod features;
pub mod geo;
pub mod model;
pub mod models;
pub mod preprocessing;
pub mod services;
pub mod training;

#[cfg(feature = "http-server")]
pub mod http;
