//! Codec errors.

use thiserror::Error;
use yang_data::WriterError;

/// Errors raised while building or using the codec tree.
///
/// None of these are retried: input is either structurally valid against the
/// schema or the failure is permanent.
#[derive(Debug, Error, PartialEq)]
pub enum CodecError {
    /// The module owning a requested node is not part of the schema.
    #[error("missing schema: {0}")]
    MissingSchema(String),
    /// A parent/child pairing is not valid in the schema.
    #[error("incorrect nesting: {0}")]
    IncorrectNesting(String),
    /// A referenced object type is not known to the runtime.
    #[error("missing class: {0}")]
    MissingClass(String),
    /// A path step does not fit the node it is applied to.
    #[error("malformed path: {0}")]
    MalformedPath(String),
    /// A tree node has the wrong shape for its codec context.
    #[error("malformed data: {0}")]
    MalformedData(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("no codec matched value {value} of union {union}")]
    NoCodecMatched { union: String, value: String },
    /// Always a defect.
    #[error("internal invariant violated: {0}")]
    Internal(String),
    #[error(transparent)]
    Writer(#[from] WriterError),
}

pub type Result<T, E = CodecError> = std::result::Result<T, E>;
