// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Entry-list reconstruction back into an object graph.

use crate::construct::Constructor;
use crate::descriptor::ConcreteType;
use crate::error::{Error, Result};
use crate::graph::{Entry, TypedValue};
use crate::primitive::decode_primitive;
use crate::registry::TypeRegistry;
use crate::schema::{Schema, SchemaCache};
use crate::type_codec::decode_type;
use crate::value::Value;
use crate::wire::Cursor;
use std::sync::Arc;

/// One resolved entry during reconstruction.
struct Slot<'e> {
    ty: ConcreteType,
    schema: Arc<Schema>,
    value: Value,
    payload: &'e [u8],
}

/// Rebuilds an object graph from a flat entry list.
///
/// Reconstruction is two-pass: every entry's type is decoded and its
/// instance constructed first, then payloads are populated. Back-references
/// therefore resolve regardless of entry order, including references to
/// entries that appear later in the list.
pub struct GraphDeserializer<'a> {
    registry: &'a TypeRegistry,
    schemas: &'a SchemaCache,
    constructor: &'a dyn Constructor,
}

impl<'a> GraphDeserializer<'a> {
    /// Create a deserializer over shared registry, schema cache and
    /// constructor.
    pub fn new(
        registry: &'a TypeRegistry,
        schemas: &'a SchemaCache,
        constructor: &'a dyn Constructor,
    ) -> Self {
        Self {
            registry,
            schemas,
            constructor,
        }
    }

    /// Reconstruct the graph and return the root (object id 1).
    ///
    /// The entry list must carry exactly the object ids `1..=N` for its `N`
    /// entries; duplicates and out-of-range ids are rejected before any
    /// payload is touched.
    pub fn deserialize(&self, entries: &[Entry]) -> Result<TypedValue> {
        if entries.is_empty() {
            return Err(Error::MalformedStream("empty entry list".to_string()));
        }

        let count = entries.len();
        let mut slots: Vec<Option<Slot<'_>>> = Vec::with_capacity(count);
        slots.resize_with(count, || None);

        // pass 1: decode types, construct instances, settle leaf values
        for entry in entries {
            let id = entry.object_id as usize;
            if id == 0 || id > count {
                return Err(Error::MalformedStream(format!(
                    "object id {} outside 1..={}",
                    entry.object_id, count
                )));
            }
            if slots[id - 1].is_some() {
                return Err(Error::MalformedStream(format!(
                    "duplicate object id {}",
                    entry.object_id
                )));
            }

            let (ty, rest) = decode_type(self.registry, &entry.type_ids)?;
            if !rest.is_empty() {
                return Err(Error::MalformedStream(format!(
                    "{} leftover type id(s) in entry {}",
                    rest.len(),
                    entry.object_id
                )));
            }
            let schema = self.schemas.schema_for(&ty)?;
            log::trace!(
                "[GraphDeserializer::deserialize] entry {} is {}",
                entry.object_id,
                ty
            );

            let value = match schema.as_ref() {
                Schema::Primitive(kind) => {
                    let mut cursor = Cursor::new(&entry.payload);
                    let value = decode_primitive(*kind, &mut cursor)?;
                    Self::expect_consumed(&cursor, entry.object_id)?;
                    value
                }
                // an absent object was serialized as its declared type with
                // an empty payload; a present-but-empty sequence still
                // carries its 4-byte element count, and a record with fields
                // always carries them, so empty here can only mean null
                _ if entry.payload.is_empty() && Self::expects_content(&schema) => Value::Null,
                _ => Value::Ref(self.constructor.construct(&ty)?),
            };
            slots[id - 1] = Some(Slot {
                ty,
                schema,
                value,
                payload: &entry.payload,
            });
        }

        // every id 1..=count is present exactly once past this point
        let slots: Vec<Slot<'_>> = slots.into_iter().flatten().collect();

        // pass 2: populate composite payloads
        for (index, slot) in slots.iter().enumerate() {
            let instance = match &slot.value {
                Value::Ref(instance) => instance.clone(),
                _ => continue,
            };
            let mut cursor = Cursor::new(slot.payload);
            match slot.schema.as_ref() {
                Schema::Sequence { element } => {
                    let len = cursor.read_u32()?;
                    for _ in 0..len {
                        let item = self.decode_slot(element, &mut cursor, &slots)?;
                        instance.push(item)?;
                    }
                }
                Schema::Record { fields } => {
                    for field in fields {
                        let value = self.decode_slot(&field.declared, &mut cursor, &slots)?;
                        instance.set_value(&field.name, value)?;
                    }
                }
                Schema::Primitive(_) => unreachable!("primitive entries settle in pass 1"),
            }
            // slots are indexed by object id
            Self::expect_consumed(&cursor, index as u32 + 1)?;
        }

        let root = &slots[0];
        Ok(TypedValue {
            ty: root.ty.clone(),
            value: root.value.clone(),
        })
    }

    /// One field/element: primitives inline, anything else a 4-byte
    /// back-reference into the slot table.
    fn decode_slot(
        &self,
        declared: &ConcreteType,
        cursor: &mut Cursor<'_>,
        slots: &[Slot<'_>],
    ) -> Result<Value> {
        match declared.primitive_kind() {
            Some(kind) => decode_primitive(kind, cursor),
            None => {
                let id = cursor.read_u32()?;
                let slot = slots
                    .get(id.wrapping_sub(1) as usize)
                    .filter(|_| id != 0)
                    .ok_or(Error::DanglingReference(id))?;
                // a crafted stream may point the reference at an entry of a
                // foreign type
                if !slot.ty.same_signature(declared) {
                    return Err(Error::MalformedStream(format!(
                        "back-reference {} has type {}, field declares {}",
                        id, slot.ty, declared
                    )));
                }
                Ok(slot.value.clone())
            }
        }
    }

    fn expects_content(schema: &Schema) -> bool {
        match schema {
            Schema::Sequence { .. } => true,
            Schema::Record { fields } => !fields.is_empty(),
            Schema::Primitive(_) => false,
        }
    }

    fn expect_consumed(cursor: &Cursor<'_>, object_id: u32) -> Result<()> {
        if cursor.is_empty() {
            Ok(())
        } else {
            Err(Error::MalformedStream(format!(
                "{} trailing payload byte(s) in entry {}",
                cursor.remaining(),
                object_id
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TemplateBuilder;
    use crate::construct::DescriptorConstructor;
    use crate::descriptor::{PrimitiveKind, TemplateType};
    use crate::graph::GraphSerializer;
    use crate::value::Instance;

    fn deserialize(
        registry: &TypeRegistry,
        schemas: &SchemaCache,
        entries: &[Entry],
    ) -> Result<TypedValue> {
        GraphDeserializer::new(registry, schemas, &DescriptorConstructor).deserialize(entries)
    }

    #[test]
    fn test_empty_entry_list_fails() {
        let registry = TypeRegistry::new();
        let schemas = SchemaCache::new();
        assert!(matches!(
            deserialize(&registry, &schemas, &[]),
            Err(Error::MalformedStream(_))
        ));
    }

    #[test]
    fn test_record_round_trip() {
        let registry = TypeRegistry::new();
        let schemas = SchemaCache::new();

        let person = TemplateBuilder::new("Person")
            .field("name", PrimitiveKind::Str)
            .field("age", PrimitiveKind::I32)
            .build();
        let ty = ConcreteType::leaf(&person).expect("ty");

        let original = Instance::new(&ty, &schemas).expect("new");
        original.set("name", "Ada").expect("name");
        original.set("age", 36i32).expect("age");

        let entries = GraphSerializer::new(&registry, &schemas)
            .serialize(&TypedValue::new(ty.clone(), &original))
            .expect("serialize");
        let rebuilt = deserialize(&registry, &schemas, &entries).expect("deserialize");

        assert_eq!(rebuilt.ty, ty);
        let instance = rebuilt.value.as_instance().expect("instance");
        assert_eq!(instance.get::<String>("name").expect("name"), "Ada");
        assert_eq!(instance.get::<i32>("age").expect("age"), 36);
    }

    #[test]
    fn test_shared_reference_identity_preserved() {
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
        shared.set("x", 9i32).expect("x");
        let root = Instance::new(&segment_ty, &schemas).expect("segment");
        root.set("start", &shared).expect("start");
        root.set("end", &shared).expect("end");

        let entries = GraphSerializer::new(&registry, &schemas)
            .serialize(&TypedValue::new(segment_ty, &root))
            .expect("serialize");
        let rebuilt = deserialize(&registry, &schemas, &entries).expect("deserialize");

        let segment = rebuilt.value.as_instance().expect("segment");
        let start: Arc<Instance> = segment.get("start").expect("start");
        let end: Arc<Instance> = segment.get("end").expect("end");
        // one decoded object, observed through both fields
        assert!(Arc::ptr_eq(&start, &end));
        assert_eq!(start.get::<i32>("x").expect("x"), 9);
    }

    #[test]
    fn test_cycle_round_trip() {
        let registry = TypeRegistry::new();
        let schemas = SchemaCache::new();

        let node = TemplateBuilder::new("Node").build();
        let node = TemplateBuilder::new("Node").ref_field("next", &node).build();
        let ty = ConcreteType::leaf(&node).expect("ty");

        let a = Instance::new(&ty, &schemas).expect("a");
        let b = Instance::new(&ty, &schemas).expect("b");
        a.set("next", &b).expect("a->b");
        b.set("next", &a).expect("b->a");

        let entries = GraphSerializer::new(&registry, &schemas)
            .serialize(&TypedValue::new(ty, &a))
            .expect("serialize");
        assert_eq!(entries.len(), 2);

        let rebuilt = deserialize(&registry, &schemas, &entries).expect("deserialize");
        let a2 = rebuilt.value.as_instance().expect("a").clone();
        let b2: Arc<Instance> = a2.get("next").expect("next");
        let back: Arc<Instance> = b2.get("next").expect("back");
        assert!(Arc::ptr_eq(&a2, &back));
    }

    #[test]
    fn test_null_field_round_trip() {
        let registry = TypeRegistry::new();
        let schemas = SchemaCache::new();

        let point = TemplateBuilder::new("Point")
            .field("x", PrimitiveKind::I32)
            .build();
        let holder = TemplateBuilder::new("Holder")
            .ref_field("target", &point)
            .build();
        let ty = ConcreteType::leaf(&holder).expect("ty");

        let original = Instance::new(&ty, &schemas).expect("new");
        let entries = GraphSerializer::new(&registry, &schemas)
            .serialize(&TypedValue::new(ty, &original))
            .expect("serialize");

        let rebuilt = deserialize(&registry, &schemas, &entries).expect("deserialize");
        let holder = rebuilt.value.as_instance().expect("holder");
        assert!(holder.get_value("target").expect("target").is_null());
    }

    #[test]
    fn test_empty_sequence_is_not_null() {
        let registry = TypeRegistry::new();
        let schemas = SchemaCache::new();

        let list = TemplateType::sequence("List");
        let ty = ConcreteType::new(list, vec![ConcreteType::primitive(PrimitiveKind::I32)])
            .expect("ty");
        let empty = Instance::new(&ty, &schemas).expect("new");

        let entries = GraphSerializer::new(&registry, &schemas)
            .serialize(&TypedValue::new(ty, &empty))
            .expect("serialize");
        // present-but-empty carries its element count
        assert_eq!(entries[0].payload, 0u32.to_le_bytes().to_vec());

        let rebuilt = deserialize(&registry, &schemas, &entries).expect("deserialize");
        let seq = rebuilt.value.as_instance().expect("sequence");
        assert!(seq.is_empty());
    }

    #[test]
    fn test_forward_reference_resolves() {
        let registry = TypeRegistry::new();
        let schemas = SchemaCache::new();

        let point = TemplateBuilder::new("Point")
            .field("x", PrimitiveKind::I32)
            .build();
        let holder = TemplateBuilder::new("Holder")
            .ref_field("target", &point)
            .build();
        let holder_ty = ConcreteType::leaf(&holder).expect("holder ty");
        let point_ty = ConcreteType::leaf(&point).expect("point ty");

        let holder_ids = crate::type_codec::encode_type(&registry, &holder_ty);
        let point_ids = crate::type_codec::encode_type(&registry, &point_ty);

        // the dependency appears before the root and the root's back-ref
        // points forward in id space
        let entries = vec![
            Entry {
                type_ids: point_ids,
                object_id: 2,
                payload: 7i32.to_le_bytes().to_vec(),
            },
            Entry {
                type_ids: holder_ids,
                object_id: 1,
                payload: 2u32.to_le_bytes().to_vec(),
            },
        ];

        let rebuilt = deserialize(&registry, &schemas, &entries).expect("deserialize");
        let holder = rebuilt.value.as_instance().expect("holder");
        let target: Arc<Instance> = holder.get("target").expect("target");
        assert_eq!(target.get::<i32>("x").expect("x"), 7);
    }

    #[test]
    fn test_dangling_reference_fails() {
        let registry = TypeRegistry::new();
        let schemas = SchemaCache::new();

        let point = TemplateBuilder::new("Point")
            .field("x", PrimitiveKind::I32)
            .build();
        let holder = TemplateBuilder::new("Holder")
            .ref_field("target", &point)
            .build();
        let holder_ty = ConcreteType::leaf(&holder).expect("holder ty");
        let holder_ids = crate::type_codec::encode_type(&registry, &holder_ty);

        let entries = vec![Entry {
            type_ids: holder_ids,
            object_id: 1,
            payload: 9u32.to_le_bytes().to_vec(),
        }];

        assert!(matches!(
            deserialize(&registry, &schemas, &entries),
            Err(Error::DanglingReference(9))
        ));
    }

    #[test]
    fn test_foreign_typed_back_reference_fails() {
        let registry = TypeRegistry::new();
        let schemas = SchemaCache::new();

        let point = TemplateBuilder::new("Point")
            .field("x", PrimitiveKind::I32)
            .build();
        let holder = TemplateBuilder::new("Holder")
            .ref_field("target", &point)
            .build();
        let holder_ty = ConcreteType::leaf(&holder).expect("holder ty");
        let holder_ids = crate::type_codec::encode_type(&registry, &holder_ty);
        let int_ids =
            crate::type_codec::encode_type(&registry, &ConcreteType::primitive(PrimitiveKind::I32));

        // entry 2 is an i32, but the holder's field declares Point
        let entries = vec![
            Entry {
                type_ids: holder_ids,
                object_id: 1,
                payload: 2u32.to_le_bytes().to_vec(),
            },
            Entry {
                type_ids: int_ids,
                object_id: 2,
                payload: 5i32.to_le_bytes().to_vec(),
            },
        ];

        assert!(matches!(
            deserialize(&registry, &schemas, &entries),
            Err(Error::MalformedStream(_))
        ));
    }

    #[test]
    fn test_duplicate_object_id_fails() {
        let registry = TypeRegistry::new();
        let schemas = SchemaCache::new();

        let int_ids =
            crate::type_codec::encode_type(&registry, &ConcreteType::primitive(PrimitiveKind::I32));
        let entry = Entry {
            type_ids: int_ids,
            object_id: 1,
            payload: 1i32.to_le_bytes().to_vec(),
        };

        assert!(matches!(
            deserialize(&registry, &schemas, &[entry.clone(), entry]),
            Err(Error::MalformedStream(_))
        ));
    }

    #[test]
    fn test_out_of_range_object_id_fails() {
        let registry = TypeRegistry::new();
        let schemas = SchemaCache::new();

        let int_ids =
            crate::type_codec::encode_type(&registry, &ConcreteType::primitive(PrimitiveKind::I32));
        let entry = Entry {
            type_ids: int_ids,
            object_id: 3,
            payload: 1i32.to_le_bytes().to_vec(),
        };

        assert!(matches!(
            deserialize(&registry, &schemas, &[entry]),
            Err(Error::MalformedStream(_))
        ));
    }

    #[test]
    fn test_trailing_payload_bytes_fail() {
        let registry = TypeRegistry::new();
        let schemas = SchemaCache::new();

        let list = TemplateType::sequence("List");
        let ty = ConcreteType::new(list, vec![ConcreteType::primitive(PrimitiveKind::I32)])
            .expect("ty");
        let seq = Instance::new(&ty, &schemas).expect("new");
        seq.push(1i32).expect("push");

        let mut entries = GraphSerializer::new(&registry, &schemas)
            .serialize(&TypedValue::new(ty, &seq))
            .expect("serialize");
        entries[0].payload.push(0);

        assert!(matches!(
            deserialize(&registry, &schemas, &entries),
            Err(Error::MalformedStream(_))
        ));
    }

    #[test]
    fn test_primitive_root_round_trip() {
        let registry = TypeRegistry::new();
        let schemas = SchemaCache::new();

        let ty = ConcreteType::primitive(PrimitiveKind::I64);
        let entries = GraphSerializer::new(&registry, &schemas)
            .serialize(&TypedValue::new(ty, -42i64))
            .expect("serialize");
        assert_eq!(entries.len(), 1);

        let rebuilt = deserialize(&registry, &schemas, &entries).expect("deserialize");
        assert_eq!(rebuilt.value.as_i64(), Some(-42));
    }
}
