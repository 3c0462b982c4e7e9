//! OPAQ Format - Core primitives for opaque-wrapper serialization
//!
//! This crate provides the wire-level building blocks shared by the object-graph
//! engine and the wrapper codec catalogue, with no heap or I/O dependencies:
//!
//! - Wire constants (class ids, reference markers)
//! - Variable-length integer encoding (ULEB128/ZigZag)
//! - Error types
//! - Security limits

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod constants;
pub mod error;
pub mod limits;
pub mod varint;

// Re-export commonly used types
pub use error::{OpaqError, Result};
pub use limits::Limits;
