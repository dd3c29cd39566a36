// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime type descriptors: erased templates and bound concrete types.

use crate::error::{Error, Result};
use std::fmt;
use std::sync::Arc;

/// Primitive leaf kinds.
///
/// This set is closed: anything outside it is either a composite (record or
/// sequence template) or an opaque leaf that fails serialization explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    U16,
    U32,
    U64,
    F32,
    F64,
    Str,
}

impl PrimitiveKind {
    /// Canonical type name, also the registry key of the primitive template.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Char => "char",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Str => "string",
        }
    }

    /// Encoded width in bytes (None for variable-width text).
    pub fn size(&self) -> Option<usize> {
        match self {
            Self::Bool | Self::I8 => Some(1),
            Self::I16 | Self::U16 => Some(2),
            Self::Char | Self::I32 | Self::U32 | Self::F32 => Some(4),
            Self::I64 | Self::U64 | Self::F64 => Some(8),
            Self::Str => None,
        }
    }
}

/// Declared type of a field inside a template.
///
/// Unlike [`ConcreteType`], a `TypeExpr` may reference the enclosing
/// template's generic parameters; binding concrete arguments turns it into
/// a `ConcreteType`.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    /// Primitive leaf.
    Primitive(PrimitiveKind),
    /// The enclosing template's n-th generic parameter.
    Param(usize),
    /// Instantiation of another template.
    Instance {
        template: Arc<TemplateType>,
        args: Vec<TypeExpr>,
    },
}

impl TypeExpr {
    /// Instantiation of a non-generic template.
    pub fn of(template: &Arc<TemplateType>) -> Self {
        Self::Instance {
            template: template.clone(),
            args: Vec::new(),
        }
    }

    /// Substitute the enclosing template's bound arguments into this
    /// expression, producing a concrete type.
    pub fn bind(&self, args: &[ConcreteType]) -> Result<ConcreteType> {
        match self {
            Self::Primitive(kind) => Ok(ConcreteType::primitive(*kind)),
            Self::Param(index) => args.get(*index).cloned().ok_or(Error::ArityMismatch {
                template: format!("parameter #{}", index),
                expected: index + 1,
                found: args.len(),
            }),
            Self::Instance {
                template,
                args: inner,
            } => {
                let bound = inner
                    .iter()
                    .map(|expr| expr.bind(args))
                    .collect::<Result<Vec<_>>>()?;
                ConcreteType::new(template.clone(), bound)
            }
        }
    }
}

/// Field declaration inside a record template.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    /// Field name.
    pub name: String,
    /// Declared type; may reference the template's generic parameters.
    pub declared: TypeExpr,
}

impl FieldDecl {
    /// Create a field declaration.
    pub fn new(name: impl Into<String>, declared: TypeExpr) -> Self {
        Self {
            name: name.into(),
            declared,
        }
    }
}

/// Template kind enumeration.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateKind {
    /// Primitive leaf; registered so primitives can appear inside generic
    /// signatures (e.g. "List of i32").
    Primitive(PrimitiveKind),
    /// Composite with named fields. Generic when arity > 0, in which case
    /// field types may reference [`TypeExpr::Param`].
    Record { fields: Vec<FieldDecl> },
    /// Array-like template of arity 1; the single generic argument is the
    /// homogeneous element type. No field list.
    Sequence,
    /// Non-serializable leaf (stands for non-owned resources such as open
    /// sockets). Serialization fails explicitly instead of emitting an
    /// empty object.
    Opaque,
}

/// A runtime type with its generic parameters erased.
///
/// Templates are the unit of type-id assignment: every distinct template
/// encountered during a session receives one registry id, and concrete
/// instantiations are encoded as the template id followed by the encodings
/// of the bound arguments.
#[derive(Debug, PartialEq)]
pub struct TemplateType {
    /// Unique template name (the registry key).
    pub name: String,
    /// Number of generic parameters this template declares.
    pub arity: usize,
    /// Template kind.
    pub kind: TemplateKind,
}

impl TemplateType {
    /// Primitive leaf template.
    pub fn primitive(kind: PrimitiveKind) -> Arc<Self> {
        Arc::new(Self {
            name: kind.name().to_string(),
            arity: 0,
            kind: TemplateKind::Primitive(kind),
        })
    }

    /// Non-generic record template.
    pub fn record(name: impl Into<String>, fields: Vec<FieldDecl>) -> Arc<Self> {
        Self::generic_record(name, 0, fields)
    }

    /// Generic record template with the given arity.
    pub fn generic_record(
        name: impl Into<String>,
        arity: usize,
        fields: Vec<FieldDecl>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            arity,
            kind: TemplateKind::Record { fields },
        })
    }

    /// Array-like template (arity 1, element type = the generic argument).
    pub fn sequence(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            arity: 1,
            kind: TemplateKind::Sequence,
        })
    }

    /// Opaque leaf template; any serialization attempt is a hard error.
    pub fn opaque(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            arity: 0,
            kind: TemplateKind::Opaque,
        })
    }

    /// Whether this template declares generic parameters.
    pub fn is_generic(&self) -> bool {
        self.arity > 0
    }

    /// Whether this template is array-like.
    pub fn is_sequence(&self) -> bool {
        matches!(self.kind, TemplateKind::Sequence)
    }

    /// Primitive kind if this is a primitive template.
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self.kind {
            TemplateKind::Primitive(kind) => Some(kind),
            _ => None,
        }
    }
}

/// A fully-instantiated type: a template plus one bound argument per
/// declared generic parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcreteType {
    template: Arc<TemplateType>,
    args: Vec<ConcreteType>,
}

impl ConcreteType {
    /// Bind arguments to a template. Fails with [`Error::ArityMismatch`]
    /// unless exactly `template.arity` arguments are supplied.
    pub fn new(template: Arc<TemplateType>, args: Vec<ConcreteType>) -> Result<Self> {
        if args.len() != template.arity {
            return Err(Error::ArityMismatch {
                template: template.name.clone(),
                expected: template.arity,
                found: args.len(),
            });
        }
        Ok(Self { template, args })
    }

    /// Instantiate a non-generic template.
    pub fn leaf(template: &Arc<TemplateType>) -> Result<Self> {
        Self::new(template.clone(), Vec::new())
    }

    /// Concrete primitive type.
    pub fn primitive(kind: PrimitiveKind) -> Self {
        Self {
            template: TemplateType::primitive(kind),
            args: Vec::new(),
        }
    }

    /// The erased template.
    pub fn template(&self) -> &Arc<TemplateType> {
        &self.template
    }

    /// Bound generic arguments, in declaration order.
    pub fn args(&self) -> &[ConcreteType] {
        &self.args
    }

    /// Primitive kind if this is a primitive type.
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        self.template.primitive_kind()
    }

    /// Whether two concrete types carry the same signature: equal template
    /// names and recursively matching arguments. Template identity follows
    /// the registry's name keying, not descriptor pointer identity.
    pub fn same_signature(&self, other: &ConcreteType) -> bool {
        self.template.name == other.template.name
            && self.args.len() == other.args.len()
            && self
                .args
                .iter()
                .zip(&other.args)
                .all(|(a, b)| a.same_signature(b))
    }
}

impl fmt::Display for ConcreteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.template.name)?;
        if !self.args.is_empty() {
            write!(f, "<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", arg)?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}
