//! Data Transfer Objects for REST request/response serialization.
//!
//! All snowflake ids travel as JSON strings; chat platforms serialize
//! them that way because they exceed JavaScript's exact integer range.

pub mod common_dto;
pub mod contest_dto;
pub mod exchange_dto;

pub use common_dto::*;
pub use contest_dto::*;
pub use exchange_dto::*;
