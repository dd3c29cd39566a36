// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Identity-deduplicating object-graph walk.

use crate::descriptor::ConcreteType;
use crate::error::{Error, Result};
use crate::primitive::encode_primitive;
use crate::registry::TypeRegistry;
use crate::schema::{Schema, SchemaCache};
use crate::type_codec::encode_type;
use crate::value::{Body, Instance, IntoValue, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Default bound on structural nesting depth.
///
/// Recursion depth tracks the graph's structural depth (field nesting plus
/// generic nesting); cycles are cut by the identity table, but a
/// pathologically deep acyclic chain is a stack-exhaustion risk without
/// this bound.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// One serialized object: its type-id list, session object id and payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Flat type encoding; fully determines the concrete type including
    /// every nested generic argument.
    pub type_ids: Vec<u32>,
    /// Session-unique object id, assigned from 1 in first-seen order.
    pub object_id: u32,
    /// Field/element bytes; back-references to other entries appear as
    /// 4-byte object ids.
    pub payload: Vec<u8>,
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type: ")?;
        for (i, id) in self.type_ids.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", id)?;
        }
        write!(f, " id: {} payload: {} byte(s)", self.object_id, self.payload.len())
    }
}

/// The unit the graph walk operates on: a concrete type paired with a value.
#[derive(Debug, Clone)]
pub struct TypedValue {
    /// Declared concrete type of the value.
    pub ty: ConcreteType,
    /// The value itself.
    pub value: Value,
}

impl TypedValue {
    /// Pair a value with its concrete type.
    pub fn new(ty: ConcreteType, value: impl IntoValue) -> Self {
        Self {
            ty,
            value: value.into_value(),
        }
    }
}

/// Walks a root value depth-first and emits a flat, reference-linked entry
/// list.
///
/// Composite objects are deduplicated by `Arc` pointer identity: the first
/// visit claims an object id and records it *before* recursing into the
/// payload, so a self-reference discovered mid-recursion resolves to the
/// claimed id instead of recursing forever. Primitive leaves are inlined
/// and never enter the identity table.
pub struct GraphSerializer<'a> {
    registry: &'a TypeRegistry,
    schemas: &'a SchemaCache,
    identities: HashMap<*const Instance, u32>,
    entries: Vec<Entry>,
    next_id: u32,
    depth: usize,
    max_depth: usize,
}

impl<'a> GraphSerializer<'a> {
    /// Create a serializer session over shared registry and schema cache.
    pub fn new(registry: &'a TypeRegistry, schemas: &'a SchemaCache) -> Self {
        Self {
            registry,
            schemas,
            identities: HashMap::new(),
            entries: Vec::new(),
            next_id: 0,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Override the structural depth limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Serialize a root value into an entry list.
    ///
    /// Entries are returned in id-assignment order: the root is id 1 and
    /// dependencies receive increasing ids as first encountered in the
    /// depth-first, field-order traversal.
    pub fn serialize(mut self, root: &TypedValue) -> Result<Vec<Entry>> {
        self.visit(&root.ty, &root.value)?;
        Ok(self.entries)
    }

    fn visit(&mut self, declared: &ConcreteType, value: &Value) -> Result<u32> {
        if let Value::Ref(instance) = value {
            if let Some(&id) = self.identities.get(&Arc::as_ptr(instance)) {
                return Ok(id);
            }
        }

        if self.depth >= self.max_depth {
            return Err(Error::DepthLimitExceeded(self.max_depth));
        }
        self.depth += 1;
        let result = self.visit_new(declared, value);
        self.depth -= 1;
        result
    }

    fn visit_new(&mut self, declared: &ConcreteType, value: &Value) -> Result<u32> {
        // the entry carries the instance's own type; Null has only the
        // declared type to go by
        let ty = match value {
            Value::Ref(instance) => instance.ty(),
            _ => declared,
        };
        let schema = self.schemas.schema_for(ty)?;

        self.next_id += 1;
        let id = self.next_id;
        let index = self.entries.len();
        self.entries.push(Entry {
            type_ids: encode_type(self.registry, ty),
            object_id: id,
            payload: Vec::new(),
        });
        // claim the id before recursing so cycles resolve to it
        if let Value::Ref(instance) = value {
            self.identities.insert(Arc::as_ptr(instance), id);
        }
        log::trace!("[GraphSerializer::visit] {} -> id {}", ty, id);

        let payload = self.payload(value, &schema)?;
        self.entries[index].payload = payload;
        Ok(id)
    }

    fn payload(&mut self, value: &Value, schema: &Schema) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        match (value, schema) {
            // only a root-level entry can be a primitive
            (value, Schema::Primitive(kind)) => encode_primitive(*kind, value, &mut out)?,
            // a null composite has no sub-elements
            (Value::Null, _) => {}
            (Value::Ref(instance), Schema::Sequence { element }) => match &*instance.body() {
                Body::Sequence(items) => {
                    out.extend((items.len() as u32).to_le_bytes());
                    for item in items {
                        self.encode_slot(element, item, &mut out)?;
                    }
                }
                Body::Record(_) => {
                    return Err(Error::ValueMismatch {
                        expected: "sequence".to_string(),
                        found: "record".to_string(),
                    })
                }
            },
            (Value::Ref(instance), Schema::Record { fields }) => match &*instance.body() {
                Body::Record(map) => {
                    for slot in fields {
                        let field_value =
                            map.get(&slot.name).ok_or_else(|| Error::FieldMissing {
                                type_name: instance.ty().to_string(),
                                field: slot.name.clone(),
                            })?;
                        self.encode_slot(&slot.declared, field_value, &mut out)?;
                    }
                }
                Body::Sequence(_) => {
                    return Err(Error::ValueMismatch {
                        expected: "record".to_string(),
                        found: "sequence".to_string(),
                    })
                }
            },
            (value, _) => {
                return Err(Error::ValueMismatch {
                    expected: "composite value".to_string(),
                    found: value.kind_name().to_string(),
                })
            }
        }
        Ok(out)
    }

    /// One field/element: primitives inline, composites as a 4-byte
    /// back-reference to the visited entry's id.
    fn encode_slot(
        &mut self,
        declared: &ConcreteType,
        value: &Value,
        out: &mut Vec<u8>,
    ) -> Result<()> {
        match declared.primitive_kind() {
            Some(kind) => encode_primitive(kind, value, out),
            None => {
                let id = self.visit(declared, value)?;
                out.extend(id.to_le_bytes());
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TemplateBuilder;
    use crate::descriptor::{PrimitiveKind, TemplateType};

    fn int_list_type() -> ConcreteType {
        let list = TemplateType::sequence("List");
        ConcreteType::new(list, vec![ConcreteType::primitive(PrimitiveKind::I32)])
            .expect("List<i32>")
    }

    #[test]
    fn test_sequence_of_integers_single_entry() {
        let registry = TypeRegistry::new();
        let schemas = SchemaCache::new();
        let ty = int_list_type();

        let seq = Instance::new(&ty, &schemas).expect("new");
        for v in 1..=7i32 {
            seq.push(v).expect("push");
        }

        let entries = GraphSerializer::new(&registry, &schemas)
            .serialize(&TypedValue::new(ty, &seq))
            .expect("serialize");

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].object_id, 1);
        assert_eq!(entries[0].type_ids.len(), 2);
        // element count then 7 little-endian i32s
        assert_eq!(&entries[0].payload[..4], &7u32.to_le_bytes());
        assert_eq!(entries[0].payload.len(), 4 + 7 * 4);
        assert_eq!(&entries[0].payload[4..8], &1i32.to_le_bytes());
        assert_eq!(&entries[0].payload[28..32], &7i32.to_le_bytes());
    }

    #[test]
    fn test_shared_reference_collapses_to_one_entry() {
        let registry = TypeRegistry::new();
        let schemas = SchemaCache::new();

        let point = TemplateBuilder::new("Point")
            .field("x", PrimitiveKind::I32)
            .build();
        let segment = TemplateBuilder::new("Segment")
            .ref_field("start", &point)
            .ref_field("end", &point)
            .build();

        let point_ty = ConcreteType::leaf(&point).expect("point ty");
        let segment_ty = ConcreteType::leaf(&segment).expect("segment ty");

        let shared = Instance::new(&point_ty, &schemas).expect("point");
        shared.set("x", 5i32).expect("set");
        let root = Instance::new(&segment_ty, &schemas).expect("segment");
        root.set("start", &shared).expect("start");
        root.set("end", &shared).expect("end");

        let entries = GraphSerializer::new(&registry, &schemas)
            .serialize(&TypedValue::new(segment_ty, &root))
            .expect("serialize");

        // one entry for the segment, exactly one for the shared point
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].object_id, 2);
        // both fields back-reference id 2
        assert_eq!(&entries[0].payload[..4], &2u32.to_le_bytes());
        assert_eq!(&entries[0].payload[4..8], &2u32.to_le_bytes());
    }

    #[test]
    fn test_self_cycle_terminates_with_one_entry() {
        let registry = TypeRegistry::new();
        let schemas = SchemaCache::new();

        let node = TemplateBuilder::new("SelfNode").build();
        // a record whose single field points at another SelfNode
        let node = TemplateBuilder::new("SelfNode").ref_field("next", &node).build();
        let ty = ConcreteType::leaf(&node).expect("ty");

        let instance = Instance::new(&ty, &schemas).expect("new");
        instance.set("next", &instance).expect("self ref");

        let entries = GraphSerializer::new(&registry, &schemas)
            .serialize(&TypedValue::new(ty, &instance))
            .expect("serialize");

        assert_eq!(entries.len(), 1);
        // payload is a single back-reference to the entry's own id
        assert_eq!(entries[0].payload, 1u32.to_le_bytes().to_vec());
    }

    #[test]
    fn test_null_composite_yields_empty_payload() {
        let registry = TypeRegistry::new();
        let schemas = SchemaCache::new();

        let point = TemplateBuilder::new("Point")
            .field("x", PrimitiveKind::I32)
            .build();
        let holder = TemplateBuilder::new("Holder")
            .ref_field("target", &point)
            .build();
        let ty = ConcreteType::leaf(&holder).expect("ty");

        let instance = Instance::new(&ty, &schemas).expect("new");
        // "target" defaults to Null

        let entries = GraphSerializer::new(&registry, &schemas)
            .serialize(&TypedValue::new(ty, &instance))
            .expect("serialize");

        assert_eq!(entries.len(), 2);
        assert!(entries[1].payload.is_empty());
    }

    #[test]
    fn test_opaque_leaf_fails_explicitly() {
        let registry = TypeRegistry::new();
        let schemas = SchemaCache::new();

        let socket = TemplateType::opaque("TcpSocket");
        let holder = TemplateBuilder::new("Holder")
            .ref_field("socket", &socket)
            .build();
        let holder_ty = ConcreteType::leaf(&holder).expect("ty");

        let instance = Instance::new(&holder_ty, &schemas).expect("new");
        // Instance::new leaves the opaque field Null; serializing Null of an
        // opaque declared type must still fail, not emit an empty object
        let result = GraphSerializer::new(&registry, &schemas)
            .serialize(&TypedValue::new(holder_ty, &instance));
        assert!(matches!(result, Err(Error::UnsupportedType(_))));
    }

    #[test]
    fn test_depth_limit_guards_deep_chains() {
        let registry = TypeRegistry::new();
        let schemas = SchemaCache::new();

        let node = TemplateBuilder::new("Chain").build();
        let node = TemplateBuilder::new("Chain").ref_field("next", &node).build();
        let ty = ConcreteType::leaf(&node).expect("ty");

        let mut head = Instance::new(&ty, &schemas).expect("tail");
        for _ in 0..40 {
            let parent = Instance::new(&ty, &schemas).expect("node");
            parent.set("next", &head).expect("link");
            head = parent;
        }

        let result = GraphSerializer::new(&registry, &schemas)
            .with_max_depth(16)
            .serialize(&TypedValue::new(ty, &head));
        assert!(matches!(result, Err(Error::DepthLimitExceeded(16))));
    }

    #[test]
    fn test_typed_value_conversions() {
        let schemas = SchemaCache::new();
        let ty = int_list_type();
        let seq = Instance::new(&ty, &schemas).expect("new");

        // a borrowed instance, an owned primitive and a raw Value must all
        // convert at the root
        let from_ref = TypedValue::new(ty.clone(), &seq);
        assert!(matches!(from_ref.value, Value::Ref(_)));

        let from_int = TypedValue::new(ConcreteType::primitive(PrimitiveKind::I32), 7i32);
        assert!(matches!(from_int.value, Value::I32(7)));

        let from_value = TypedValue::new(ty, Value::Null);
        assert!(from_value.value.is_null());
    }

    #[test]
    fn test_entry_display() {
        let entry = Entry {
            type_ids: vec![1, 2],
            object_id: 3,
            payload: vec![0; 8],
        };
        assert_eq!(entry.to_string(), "type: 1,2 id: 3 payload: 8 byte(s)");
    }
}
