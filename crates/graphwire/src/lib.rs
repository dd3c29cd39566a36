// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # Graphwire - Identity-preserving object-graph serialization
//!
//! A binary serializer for runtime-described object graphs: shared
//! references are written once and restored as shared, cycles are legal in
//! both directions, and generic types round-trip through a compact
//! session-scoped type-id encoding.
//!
//! ## Quick Start
//!
//! ```rust
//! use graphwire::{ConcreteType, Instance, PrimitiveKind, Result, Session, TemplateBuilder, TypedValue};
//!
//! fn main() -> Result<()> {
//!     let session = Session::new();
//!
//!     // Describe a record type at runtime
//!     let point = TemplateBuilder::new("Point")
//!         .field("x", PrimitiveKind::F64)
//!         .field("y", PrimitiveKind::F64)
//!         .build();
//!     let ty = ConcreteType::leaf(&point)?;
//!
//!     // Build a value and round-trip it
//!     let value = Instance::new(&ty, session.schemas())?;
//!     value.set("x", 1.0f64)?;
//!     value.set("y", 2.0f64)?;
//!
//!     let bytes = session.serialize(&TypedValue::new(ty, &value))?;
//!     let rebuilt = session.deserialize(&bytes)?;
//!     assert_eq!(rebuilt.value.as_instance().unwrap().get::<f64>("x")?, 1.0);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +--------------------------------------------------------------+
//! |                         Session                              |
//! |     serialize / deserialize, shared registry + schemas       |
//! +--------------------------------------------------------------+
//! |                        Graph Layer                           |
//! |   GraphSerializer (identity dedup, cycle-safe walk)          |
//! |   GraphDeserializer (two-pass reconstruction)                |
//! +--------------------------------------------------------------+
//! |                        Type Layer                            |
//! |   TemplateType / ConcreteType | TypeRegistry | SchemaCache   |
//! +--------------------------------------------------------------+
//! |                        Wire Layer                            |
//! |   type-id codec | primitive codec | entry-list framing       |
//! +--------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Session`] | Entry point; owns the registry and schema cache |
//! | [`TemplateBuilder`] | Fluent runtime description of record types |
//! | [`ConcreteType`] | A template with all generic arguments bound |
//! | [`Instance`] | A composite graph node with shared, mutable storage |
//! | [`TypedValue`] | A value paired with its concrete type; the root unit |
//! | [`Entry`] | One serialized object in the flat output list |
//!
//! ## Modules Overview
//!
//! - [`session`] - Session facade (start here)
//! - [`builder`] - Runtime type description
//! - [`value`] - Values, instances and typed accessors
//! - [`graph`] / [`degraph`] - The graph walk in both directions
//! - [`wire`] - Byte-level framing

/// Fluent builder API for record templates.
pub mod builder;
/// Instance construction hooks for graph reconstruction.
pub mod construct;
/// Entry-list reconstruction back into an object graph.
pub mod degraph;
/// Runtime type descriptors (templates, concrete types, field declarations).
pub mod descriptor;
/// Error and result types.
pub mod error;
/// Identity-deduplicating object-graph walk.
pub mod graph;
/// Primitive leaf codec.
pub mod primitive;
/// Session-scoped template-type id registry.
pub mod registry;
/// Concrete field/element layouts with caching.
pub mod schema;
/// Session facade over registry, schemas, graph walk and framing.
pub mod session;
/// Recursive codec between concrete types and flat type-id lists.
pub mod type_codec;
/// Runtime values and graph instances.
pub mod value;
/// Byte-stream framing for entry lists.
pub mod wire;

pub use builder::TemplateBuilder;
pub use construct::{Constructor, DescriptorConstructor};
pub use degraph::GraphDeserializer;
pub use descriptor::{ConcreteType, FieldDecl, PrimitiveKind, TemplateKind, TemplateType, TypeExpr};
pub use error::{Error, Result};
pub use graph::{Entry, GraphSerializer, TypedValue, DEFAULT_MAX_DEPTH};
pub use registry::TypeRegistry;
pub use schema::{FieldSlot, Schema, SchemaCache};
pub use session::Session;
pub use value::{Body, FromValue, Instance, IntoValue, Value};

/// Graphwire version string.
pub const VERSION: &str = "0.1.0";
