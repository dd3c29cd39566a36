// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Concrete field/element layout of a type, with caching.

use crate::descriptor::{ConcreteType, PrimitiveKind, TemplateKind};
use crate::error::{Error, Result};
use dashmap::DashMap;
use std::sync::Arc;

/// One serializable member of a concrete record type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSlot {
    /// Field name.
    pub name: String,
    /// Fully-bound declared type.
    pub declared: ConcreteType,
}

/// Concrete layout a graph walk follows for one type.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    /// Leaf handled by the primitive codec.
    Primitive(PrimitiveKind),
    /// Record members, sorted by name. Field order must not depend on
    /// declaration order, which is not guaranteed stable across runtimes.
    Record { fields: Vec<FieldSlot> },
    /// Array-like: cardinality plus a homogeneous element type stand in
    /// for a field list.
    Sequence { element: ConcreteType },
}

/// Computes and caches [`Schema`]s.
///
/// Non-generic record schemas are computed once and cached against the
/// template name for the cache's lifetime. Generic instantiations are
/// recomputed per call: their field types depend on the bound arguments,
/// and the cost is accepted for correctness rather than optimized away.
#[derive(Debug, Default)]
pub struct SchemaCache {
    records: DashMap<String, Arc<Schema>>,
}

impl SchemaCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the schema for a concrete type.
    ///
    /// Fails with [`Error::UnsupportedType`] for opaque leaf templates —
    /// those must never silently serialize as empty objects.
    pub fn schema_for(&self, ty: &ConcreteType) -> Result<Arc<Schema>> {
        let template = ty.template();
        match &template.kind {
            TemplateKind::Primitive(kind) => Ok(Arc::new(Schema::Primitive(*kind))),
            TemplateKind::Sequence => Ok(Arc::new(Schema::Sequence {
                element: ty.args()[0].clone(),
            })),
            TemplateKind::Opaque => Err(Error::UnsupportedType(template.name.clone())),
            TemplateKind::Record { fields } => {
                if !template.is_generic() {
                    if let Some(cached) = self.records.get(&template.name) {
                        return Ok(cached.clone());
                    }
                }

                let mut slots = fields
                    .iter()
                    .map(|decl| {
                        Ok(FieldSlot {
                            name: decl.name.clone(),
                            declared: decl.declared.bind(ty.args())?,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                slots.sort_by(|a, b| a.name.cmp(&b.name));
                let schema = Arc::new(Schema::Record { fields: slots });

                if !template.is_generic() {
                    self.records
                        .insert(template.name.clone(), schema.clone());
                }
                Ok(schema)
            }
        }
    }

    /// Number of cached record schemas.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if nothing is cached yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
