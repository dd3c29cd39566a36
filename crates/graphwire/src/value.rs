// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime values and graph instances.

use crate::descriptor::{ConcreteType, PrimitiveKind, TemplateKind};
use crate::error::{Error, Result};
use crate::schema::{Schema, SchemaCache};
use parking_lot::{RwLock, RwLockReadGuard};
use std::collections::HashMap;
use std::sync::Arc;

/// A runtime value.
///
/// Primitive leaves are held inline; composites are [`Instance`]s behind an
/// `Arc`, so shared references and cycles are expressible and object
/// identity is `Arc` pointer identity.
#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    Char(char),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Str(String),
    /// Reference to a composite instance.
    Ref(Arc<Instance>),
    /// Absent composite.
    Null,
}

impl Value {
    /// Variant name for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Char(_) => "char",
            Self::I8(_) => "i8",
            Self::I16(_) => "i16",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::U16(_) => "u16",
            Self::U32(_) => "u32",
            Self::U64(_) => "u64",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::Str(_) => "string",
            Self::Ref(_) => "ref",
            Self::Null => "null",
        }
    }

    /// Check if value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Try to get as instance reference.
    pub fn as_instance(&self) -> Option<&Arc<Instance>> {
        match self {
            Self::Ref(instance) => Some(instance),
            _ => None,
        }
    }

    /// Try to get as i32.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::I32(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::F64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Zero/empty value for a primitive kind.
    pub fn default_for(kind: PrimitiveKind) -> Value {
        match kind {
            PrimitiveKind::Bool => Value::Bool(false),
            PrimitiveKind::Char => Value::Char('\0'),
            PrimitiveKind::I8 => Value::I8(0),
            PrimitiveKind::I16 => Value::I16(0),
            PrimitiveKind::I32 => Value::I32(0),
            PrimitiveKind::I64 => Value::I64(0),
            PrimitiveKind::U16 => Value::U16(0),
            PrimitiveKind::U32 => Value::U32(0),
            PrimitiveKind::U64 => Value::U64(0),
            PrimitiveKind::F32 => Value::F32(0.0),
            PrimitiveKind::F64 => Value::F64(0.0),
            PrimitiveKind::Str => Value::Str(String::new()),
        }
    }
}

// Conversion traits
macro_rules! impl_value_from {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Self::$variant(v)
            }
        }
    };
}

impl_value_from!(bool, Bool);
impl_value_from!(char, Char);
impl_value_from!(i8, I8);
impl_value_from!(i16, I16);
impl_value_from!(i32, I32);
impl_value_from!(i64, I64);
impl_value_from!(u16, U16);
impl_value_from!(u32, U32);
impl_value_from!(u64, U64);
impl_value_from!(f32, F32);
impl_value_from!(f64, F64);
impl_value_from!(String, Str);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<Arc<Instance>> for Value {
    fn from(v: Arc<Instance>) -> Self {
        Self::Ref(v)
    }
}

/// Storage of one composite instance.
#[derive(Debug)]
pub enum Body {
    /// Named fields of a record.
    Record(HashMap<String, Value>),
    /// Elements of an array-like value, in iteration order.
    Sequence(Vec<Value>),
}

/// A composite graph node: a concrete type plus its field/element storage.
///
/// The body sits behind an `RwLock` so cyclic graphs can be built: allocate
/// the instances first, then wire fields through [`Instance::set`].
#[derive(Debug)]
pub struct Instance {
    ty: ConcreteType,
    body: RwLock<Body>,
}

impl Instance {
    /// Create a default-initialized instance: record fields get zero/empty
    /// primitives and `Null` composites, sequences start empty.
    pub fn new(ty: &ConcreteType, schemas: &SchemaCache) -> Result<Arc<Self>> {
        let body = match schemas.schema_for(ty)?.as_ref() {
            Schema::Record { fields } => {
                let mut map = HashMap::with_capacity(fields.len());
                for slot in fields {
                    let default = match slot.declared.primitive_kind() {
                        Some(kind) => Value::default_for(kind),
                        None => Value::Null,
                    };
                    map.insert(slot.name.clone(), default);
                }
                Body::Record(map)
            }
            Schema::Sequence { .. } => Body::Sequence(Vec::new()),
            Schema::Primitive(kind) => {
                return Err(Error::ValueMismatch {
                    expected: "composite type".to_string(),
                    found: kind.name().to_string(),
                })
            }
        };
        Ok(Arc::new(Self {
            ty: ty.clone(),
            body: RwLock::new(body),
        }))
    }

    /// Create an instance with empty storage, fields/elements to be filled
    /// afterwards. Used by constructors during graph reconstruction.
    pub fn hollow(ty: ConcreteType) -> Result<Arc<Self>> {
        let body = match ty.template().kind {
            TemplateKind::Record { .. } => Body::Record(HashMap::new()),
            TemplateKind::Sequence => Body::Sequence(Vec::new()),
            TemplateKind::Primitive(_) | TemplateKind::Opaque => {
                return Err(Error::ConstructionError(format!(
                    "{} is not a composite type",
                    ty
                )))
            }
        };
        Ok(Arc::new(Self {
            ty,
            body: RwLock::new(body),
        }))
    }

    /// Concrete type of this instance.
    pub fn ty(&self) -> &ConcreteType {
        &self.ty
    }

    /// Read access to the underlying storage.
    pub fn body(&self) -> RwLockReadGuard<'_, Body> {
        self.body.read()
    }

    /// Get a field value by name.
    pub fn get<T: FromValue>(&self, name: &str) -> Result<T> {
        T::from_value(&self.get_value(name)?)
    }

    /// Get a field as a raw [`Value`].
    pub fn get_value(&self, name: &str) -> Result<Value> {
        self.check_field(name)?;
        match &*self.body.read() {
            Body::Record(fields) => fields.get(name).cloned().ok_or(Error::FieldMissing {
                type_name: self.ty.to_string(),
                field: name.to_string(),
            }),
            Body::Sequence(_) => Err(Error::ValueMismatch {
                expected: "record".to_string(),
                found: "sequence".to_string(),
            }),
        }
    }

    /// Set a field value by name.
    pub fn set<T: IntoValue>(&self, name: &str, value: T) -> Result<()> {
        self.set_value(name, value.into_value())
    }

    /// Set a field from a raw [`Value`].
    pub fn set_value(&self, name: &str, value: Value) -> Result<()> {
        self.check_field(name)?;
        match &mut *self.body.write() {
            Body::Record(fields) => {
                fields.insert(name.to_string(), value);
                Ok(())
            }
            Body::Sequence(_) => Err(Error::ValueMismatch {
                expected: "record".to_string(),
                found: "sequence".to_string(),
            }),
        }
    }

    /// Append an element to a sequence instance.
    pub fn push(&self, value: impl IntoValue) -> Result<()> {
        match &mut *self.body.write() {
            Body::Sequence(items) => {
                items.push(value.into_value());
                Ok(())
            }
            Body::Record(_) => Err(Error::ValueMismatch {
                expected: "sequence".to_string(),
                found: "record".to_string(),
            }),
        }
    }

    /// Element at `index` of a sequence instance.
    pub fn element(&self, index: usize) -> Result<Value> {
        match &*self.body.read() {
            Body::Sequence(items) => items.get(index).cloned().ok_or(Error::MalformedStream(
                format!("element index {} out of bounds", index),
            )),
            Body::Record(_) => Err(Error::ValueMismatch {
                expected: "sequence".to_string(),
                found: "record".to_string(),
            }),
        }
    }

    /// Number of elements (sequences) or fields (records).
    pub fn len(&self) -> usize {
        match &*self.body.read() {
            Body::Sequence(items) => items.len(),
            Body::Record(fields) => fields.len(),
        }
    }

    /// Whether the instance holds no elements or fields.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_field(&self, name: &str) -> Result<()> {
        match &self.ty.template().kind {
            TemplateKind::Record { fields } => {
                if fields.iter().any(|f| f.name == name) {
                    Ok(())
                } else {
                    Err(Error::FieldMissing {
                        type_name: self.ty.to_string(),
                        field: name.to_string(),
                    })
                }
            }
            _ => Err(Error::ValueMismatch {
                expected: "record".to_string(),
                found: self.ty.to_string(),
            }),
        }
    }
}

/// Trait for converting from a [`Value`].
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self>;
}

/// Trait for converting into a [`Value`].
pub trait IntoValue {
    fn into_value(self) -> Value;
}

macro_rules! impl_from_value {
    ($ty:ty, $variant:ident, $name:expr) => {
        impl FromValue for $ty {
            fn from_value(value: &Value) -> Result<Self> {
                match value {
                    Value::$variant(v) => Ok(v.clone()),
                    other => Err(Error::ValueMismatch {
                        expected: $name.to_string(),
                        found: other.kind_name().to_string(),
                    }),
                }
            }
        }
    };
}

impl_from_value!(bool, Bool, "bool");
impl_from_value!(char, Char, "char");
impl_from_value!(i8, I8, "i8");
impl_from_value!(i16, I16, "i16");
impl_from_value!(i32, I32, "i32");
impl_from_value!(i64, I64, "i64");
impl_from_value!(u16, U16, "u16");
impl_from_value!(u32, U32, "u32");
impl_from_value!(u64, U64, "u64");
impl_from_value!(f32, F32, "f32");
impl_from_value!(f64, F64, "f64");
impl_from_value!(String, Str, "string");

impl FromValue for Arc<Instance> {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Ref(instance) => Ok(instance.clone()),
            other => Err(Error::ValueMismatch {
                expected: "ref".to_string(),
                found: other.kind_name().to_string(),
            }),
        }
    }
}

macro_rules! impl_into_value {
    ($ty:ty, $variant:ident) => {
        impl IntoValue for $ty {
            fn into_value(self) -> Value {
                Value::$variant(self)
            }
        }
    };
}

impl_into_value!(bool, Bool);
impl_into_value!(char, Char);
impl_into_value!(i8, I8);
impl_into_value!(i16, I16);
impl_into_value!(i32, I32);
impl_into_value!(i64, I64);
impl_into_value!(u16, U16);
impl_into_value!(u32, U32);
impl_into_value!(u64, U64);
impl_into_value!(f32, F32);
impl_into_value!(f64, F64);
impl_into_value!(String, Str);

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::Str(self.to_string())
    }
}

impl IntoValue for Arc<Instance> {
    fn into_value(self) -> Value {
        Value::Ref(self)
    }
}

impl IntoValue for &Arc<Instance> {
    fn into_value(self) -> Value {
        Value::Ref(self.clone())
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}
