//! Client for a Letterboxd film recommendation service.
//!
//! [`models::FilterState`] holds what the user picked (mode, usernames and
//! filters). [`services::RequestController`] turns it into one request against
//! the recommendation service and publishes the request's lifecycle as a
//! [`models::RequestStatus`]. The [`api`] module exposes both over HTTP for a view
//! layer.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
