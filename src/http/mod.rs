//! HTTP protocol layer module
//!
//! Range parsing and response builders, decoupled from routing and the catalog.

pub mod range;
pub mod response;

// Re-export commonly used types
pub use range::{parse_range_header, ByteRange, RangeParseResult};
pub use response::{
    build_404_response, build_416_response, build_500_response, build_media_response,
    build_options_response, build_partial_response, json_response, with_allow_header,
};
