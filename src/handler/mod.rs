//! Request handler module
//!
//! Route matching and dispatch of each request to the quiz bridge.

pub mod router;
pub mod routes;

pub use router::handle_request;
