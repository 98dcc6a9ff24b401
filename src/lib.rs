//! famcal-server: HTTP proxy between the calendar front end and the hub.
//!
//! The proxy exposes a small unauthenticated JSON surface for listing,
//! creating, updating and deleting events across heterogeneous calendar
//! integrations, plus the display configuration and an optional weather
//! forecast. Persistence and correctness live entirely in the backends;
//! this layer only shapes payloads and walks fallback chains.

pub mod config;
pub mod hub;
pub mod routes;
pub mod state;
