//! In-memory user administration service and the client-side pieces that
//! drive it: a remote API client, a list synchroniser, a form model and a
//! search filter.

pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod state;
pub mod users;
