//! Web API module for the hn-stories application.

pub mod error;
pub mod middleware;
pub mod routes;
pub mod status;
pub mod stories;

pub use routes::*;
