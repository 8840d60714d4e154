//! Core types and trait definitions for the Ninas visit tracker.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it.

pub mod display;
pub mod error;
pub mod store;
pub mod visit;

pub use error::{Error, Result};
