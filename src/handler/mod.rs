//! Request handler module
//!
//! Responsible for request routing dispatch and the analysis route handlers.

pub mod router;
pub mod routes;

// Re-export main entry point
pub use router::handle_request;
