//! HTTP protocol layer module
//!
//! Protocol helpers shared by both serve modes: content types, byte ranges and response builders.

pub mod mime;
pub mod range;
pub mod response;

pub use range::{parse_range_header, RangeParseResult};
pub use response::{
    build_400_response, build_403_response, build_404_response, build_405_response,
    build_416_response, build_500_response, build_html_response, build_options_response,
    build_redirect_response, ResponseBody,
};
