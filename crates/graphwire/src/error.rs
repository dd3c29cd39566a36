// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Crate-wide error type.

/// Errors returned by graphwire operations.
///
/// Every error is terminal for the serialize/deserialize call that raised
/// it: the input is either well-formed or it is not, so there is no retry
/// path and no partial result.
#[derive(Debug)]
pub enum Error {
    // ========================================================================
    // Type system
    // ========================================================================
    /// Decode referenced a type id never registered in this session
    /// (corrupt or foreign stream).
    UnknownTypeId(u32),
    /// A leaf type has no codec entry and cannot be serialized
    /// (e.g. a template declared opaque over a non-owned resource).
    UnsupportedType(String),
    /// Argument count does not match the template's declared arity.
    ArityMismatch {
        template: String,
        expected: usize,
        found: usize,
    },

    // ========================================================================
    // Graph walk
    // ========================================================================
    /// A record value is missing a field its schema declares.
    FieldMissing { type_name: String, field: String },
    /// A value's runtime variant does not match its declared type.
    ValueMismatch { expected: String, found: String },
    /// Structural nesting exceeded the configured depth limit.
    DepthLimitExceeded(usize),

    // ========================================================================
    // Decode
    // ========================================================================
    /// A back-reference points at an object id not present in the stream.
    DanglingReference(u32),
    /// The constructor collaborator could not instantiate a reconstructed type.
    ConstructionError(String),
    /// Length prefixes or payload layout inconsistent with the available bytes.
    MalformedStream(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnknownTypeId(id) => write!(f, "Unknown type id: {}", id),
            Error::UnsupportedType(name) => write!(f, "Unsupported leaf type: {}", name),
            Error::ArityMismatch {
                template,
                expected,
                found,
            } => write!(
                f,
                "Arity mismatch for {}: expected {} argument(s), found {}",
                template, expected, found
            ),
            Error::FieldMissing { type_name, field } => {
                write!(f, "Value of type {} is missing field: {}", type_name, field)
            }
            Error::ValueMismatch { expected, found } => {
                write!(f, "Value mismatch: expected {}, found {}", expected, found)
            }
            Error::DepthLimitExceeded(limit) => {
                write!(f, "Graph nesting exceeded depth limit: {}", limit)
            }
            Error::DanglingReference(id) => {
                write!(f, "Back-reference to unknown object id: {}", id)
            }
            Error::ConstructionError(msg) => write!(f, "Construction failed: {}", msg),
            Error::MalformedStream(msg) => write!(f, "Malformed stream: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Convenient alias for API results using the crate `Error` type.
pub type Result<T> = core::result::Result<T, Error>;
