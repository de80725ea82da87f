//! HTTP protocol layer module
//!
//! Response builders and CORS constants, decoupled from the routing logic.

pub mod response;

// Re-export commonly used functions
pub use response::{
    build_404_response, build_405_response, build_413_response, build_500_response,
    build_error_response, build_options_response, build_result_response, iso_timestamp,
    json_response,
};
