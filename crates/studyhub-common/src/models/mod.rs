//! Core domain models shared across all StudyHub crates.
//!
//! These are the "truth" types: what the remote document store holds and the
//! client deserializes. Field names serialize in camelCase to match the
//! external collection schema, which is consumed as-is.

pub mod announcement;
pub mod course;
pub mod join_request;
pub mod message;
pub mod user;

pub use announcement::*;
pub use course::*;
pub use join_request::*;
pub use message::*;
pub use user::*;
