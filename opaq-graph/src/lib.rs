//! OPAQ Graph - Object heap and reference-tracking serialization engine
//!
//! This crate provides the runtime the wrapper codecs plug into:
//!
//! - A dynamic heap of identity-bearing objects with intrinsic monitors
//! - The host collection library, including the opaque view and list classes
//!   that only its factory functions can create
//! - Privileged field handles for reading a view's delegate
//! - The [`Engine`]: class registry, write/read/copy contexts and the default
//!   serializers for arrays, collections and maps
//! - Structural equality over object graphs

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod builtin;
pub mod class;
pub mod collections;
pub mod context;
pub mod engine;
mod equality;
pub mod io;
pub mod object;
pub mod privileged;
pub mod value;

// Re-export commonly used types
pub use opaq_format::{Limits, OpaqError, Result};

pub use class::{Class, EnumConst, EnumType, LibraryClass, Primitive, ViewFamily, ViewShape};
pub use context::{CopyContext, ReadContext, WriteContext};
pub use engine::{Engine, EngineConfig, RegistrationTarget, Serializer};
pub use object::ObjRef;
pub use value::Value;
