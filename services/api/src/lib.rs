//! services/api/src/lib.rs
//!
//! The HTTP service and its adapters, shared by the `api`, `openapi` and `wizard` binaries.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
