//! # studyhub-common
//!
//! Shared types, configuration, error handling, and utilities used across all
//! StudyHub crates. This is the foundation layer; no business logic, just
//! primitives and contracts.

pub mod collections;
pub mod config;
pub mod error;
pub mod ids;
pub mod models;
pub mod validation;
