//! HTTP protocol layer module
//!
//! Response builders, form decoding and cookie parsing, decoupled from quiz logic.

pub mod cookie;
pub mod form;
pub mod response;

// Re-export commonly used types
pub use cookie::find_cookie;
pub use form::FormData;
pub use response::{
    build_400_response, build_404_response, build_405_response, build_413_response,
    build_500_response, build_health_response, build_html_response, build_json_response,
    build_redirect_response,
};
