// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Session facade over registry, schemas, graph walk and framing.

use crate::construct::{Constructor, DescriptorConstructor};
use crate::degraph::GraphDeserializer;
use crate::error::Result;
use crate::graph::{Entry, GraphSerializer, TypedValue, DEFAULT_MAX_DEPTH};
use crate::registry::TypeRegistry;
use crate::schema::SchemaCache;
use crate::wire::{decode_stream, encode_stream};
use std::sync::Arc;

/// A serialization session: the type-id registry and schema cache shared by
/// every encode and decode performed through it.
///
/// Type ids are meaningful only relative to a session's registry, so bytes
/// produced by one session must be decoded through a session holding the
/// same registry. Sessions are cheap to clone and safe to share across
/// threads; each `serialize`/`deserialize` call walks one graph and holds
/// no state between calls.
#[derive(Clone)]
pub struct Session {
    registry: Arc<TypeRegistry>,
    schemas: Arc<SchemaCache>,
    max_depth: usize,
}

impl Session {
    /// Create a session with a fresh registry and schema cache.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(TypeRegistry::new()),
            schemas: Arc::new(SchemaCache::new()),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Create a session over an existing registry. Lets several sessions
    /// (or a persisted registry) agree on type ids.
    pub fn with_registry(registry: Arc<TypeRegistry>) -> Self {
        Self {
            registry,
            schemas: Arc::new(SchemaCache::new()),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Override the structural depth limit for serialization.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// The session's type-id registry.
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// The session's schema cache.
    pub fn schemas(&self) -> &Arc<SchemaCache> {
        &self.schemas
    }

    /// Serialize a root value to bytes.
    pub fn serialize(&self, root: &TypedValue) -> Result<Vec<u8>> {
        Ok(encode_stream(&self.serialize_entries(root)?))
    }

    /// Serialize a root value to an entry list, without framing.
    pub fn serialize_entries(&self, root: &TypedValue) -> Result<Vec<Entry>> {
        GraphSerializer::new(&self.registry, &self.schemas)
            .with_max_depth(self.max_depth)
            .serialize(root)
    }

    /// Deserialize bytes back into an object graph.
    pub fn deserialize(&self, bytes: &[u8]) -> Result<TypedValue> {
        self.deserialize_with(bytes, &DescriptorConstructor)
    }

    /// Deserialize bytes, constructing instances through `constructor`.
    pub fn deserialize_with(
        &self,
        bytes: &[u8],
        constructor: &dyn Constructor,
    ) -> Result<TypedValue> {
        self.deserialize_entries_with(&decode_stream(bytes)?, constructor)
    }

    /// Deserialize an already-parsed entry list.
    pub fn deserialize_entries(&self, entries: &[Entry]) -> Result<TypedValue> {
        self.deserialize_entries_with(entries, &DescriptorConstructor)
    }

    /// Deserialize an entry list through a custom constructor.
    pub fn deserialize_entries_with(
        &self,
        entries: &[Entry],
        constructor: &dyn Constructor,
    ) -> Result<TypedValue> {
        GraphDeserializer::new(&self.registry, &self.schemas, constructor).deserialize(entries)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
