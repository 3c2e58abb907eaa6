//! Core types for MockStack
//!
//! This crate provides the error surface shared by every MockStack service
//! emulator and by the client adapters wrapping them.

pub mod error;

pub use error::{ErrorCode, ServiceError};
