//! Business logic services.
//!
//! The assignment engine and its random selection, the thin team, user and
//! statistics services, and the HTTP server that exposes them.

pub mod assignment;
pub mod http_server;
pub mod selection;
pub mod statistics;
pub mod teams;
pub mod users;
