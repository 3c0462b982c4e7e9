//! OPAQ Codec - Codecs for opaque collection wrappers
//!
//! This crate teaches the [`opaq_graph::Engine`] to handle collection types
//! that hide their contents behind factory functions:
//!
//! - Synchronized and unmodifiable views (seven kinds per family, one tagged
//!   codec per family)
//! - Enum-keyed maps
//! - Fixed-size lists backed by an array
//!
//! Call [`register_all`] on an engine (or any [`RegistrationTarget`]) before
//! encoding, decoding or copying such values.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod accessor;
pub mod as_list;
pub mod catalogue;
pub mod enum_map;
pub mod registration;
pub mod wrappers;

// Re-export commonly used types
pub use opaq_format::{OpaqError, Result};
pub use opaq_graph::RegistrationTarget;

// Re-export our own types
pub use as_list::ArraysAsListSerializer;
pub use catalogue::{Catalogue, WrapperKind};
pub use enum_map::EnumMapSerializer;
pub use registration::{
    register_all, register_arrays_as_list, register_enum_map, register_synchronized,
    register_unmodifiable, RecordingTarget,
};
pub use wrappers::WrapperCollectionsSerializer;
