//! Error types for OPAQ

use thiserror::Error;

/// OPAQ error types
#[derive(Debug, Error)]
pub enum OpaqError {
    /// A codec was handed a concrete runtime type outside its catalogue.
    #[error("The type {0} is not supported")]
    UnsupportedType(String),
    /// A wrapper tag read from the wire is outside the registered range.
    #[error("Unknown wrapper tag {tag} (catalogue has {registered} kinds)")]
    UnknownTag {
        /// Tag found on the wire
        tag: u64,
        /// Number of kinds in the catalogue
        registered: usize,
    },
    /// An enum-keyed map without entries cannot carry its key type on the wire.
    #[error("An EnumMap must not be empty to be serialized, the key type can not be inferred")]
    EmptyEnumMap,
    /// One-time privileged accessor setup failed; no fallback exists.
    #[error("Could not initialize delegate accessor: {0}")]
    AccessorInit(String),
    /// Encountered unexpected end of input.
    #[error("Unexpected end of input")]
    UnexpectedEof,
    /// A configured security limit was exceeded.
    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),
    /// Input bytes are structurally invalid.
    #[error("Corrupt input: {0}")]
    Corrupt(String),
    /// Value could not be used where the expected type is required.
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Expected type
        expected: String,
        /// Type actually found
        found: String,
    },
    /// The operation is not supported by this collection (read-only or fixed-size).
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),
    /// Positional access outside the collection bounds.
    #[error("Index {index} out of bounds for length {len}")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Collection length
        len: usize,
    },
    /// The class has no registration in the engine.
    #[error("Class is not registered: {0}")]
    UnregisteredClass(String),
    /// A class id read from the wire has no registration.
    #[error("Unknown class id: {0}")]
    UnknownClassId(u64),
    /// A back-reference points at an object that does not exist (yet).
    #[error("Unresolved back-reference to object {0}")]
    UnresolvedReference(u64),
    /// Failure while accessing or rebuilding a wrapper's delegate.
    #[error("{kind}: {source}")]
    Delegate {
        /// Catalogue entry being processed
        kind: String,
        /// Underlying failure
        #[source]
        source: Box<OpaqError>,
    },
    /// JSON configuration parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl OpaqError {
    /// Wrap a delegate access or reconstruction failure for `kind`.
    pub fn delegate(kind: impl Into<String>, source: OpaqError) -> Self {
        OpaqError::Delegate {
            kind: kind.into(),
            source: Box::new(source),
        }
    }

    /// Innermost error, looking through `Delegate` wrapping.
    pub fn root_cause(&self) -> &OpaqError {
        match self {
            OpaqError::Delegate { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, OpaqError>;
