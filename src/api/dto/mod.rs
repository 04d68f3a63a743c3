//! Data Transfer Objects for REST request/response serialization.
//!
//! Identifiers are exposed as plain UUIDs and timestamps as RFC 3339
//! strings; domain rows are converted at the handler boundary.

pub mod auth_dto;
pub mod common_dto;
pub mod entry_dto;
pub mod event_dto;
pub mod prize_dto;

pub use auth_dto::*;
pub use common_dto::*;
pub use entry_dto::*;
pub use event_dto::*;
pub use prize_dto::*;
