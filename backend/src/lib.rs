//! # Coverage API
//!
//! REST service for the South America coverage table used by a Watson
//! Assistant skill.
//!
//! The assistant looks up a coverage record by GBG or by customer short name;
//! administrators list, add and delete records, and can reset the table to a
//! pair of sample rows.
//!
//! ## Architecture
//!
//! - [`models`]: coverage records, input validation, pagination
//! - [`db`]: repository trait, in-memory and PostgreSQL backends, services
//! - [`config`]: process configuration from the environment
//! - [`http`]: Axum router, API-key middleware, OpenAPI document
//!

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod config;
pub mod db;
pub mod models;

#[cfg(feature = "http-server")]
pub mod http;
