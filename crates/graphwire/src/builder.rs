// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder API for record templates.

use crate::descriptor::{FieldDecl, PrimitiveKind, TemplateType, TypeExpr};
use std::sync::Arc;

/// Builder for record [`TemplateType`]s.
#[derive(Debug)]
pub struct TemplateBuilder {
    name: String,
    arity: usize,
    fields: Vec<FieldDecl>,
}

impl TemplateBuilder {
    /// Start a non-generic record template.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arity: 0,
            fields: Vec::new(),
        }
    }

    /// Start a generic record template with the given arity.
    pub fn generic(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
            fields: Vec::new(),
        }
    }

    /// Add a primitive field.
    pub fn field(mut self, name: impl Into<String>, kind: PrimitiveKind) -> Self {
        self.fields
            .push(FieldDecl::new(name, TypeExpr::Primitive(kind)));
        self
    }

    /// Add a field whose type is the template's n-th generic parameter.
    pub fn param_field(mut self, name: impl Into<String>, index: usize) -> Self {
        self.fields.push(FieldDecl::new(name, TypeExpr::Param(index)));
        self
    }

    /// Add a field of another non-generic template's type.
    pub fn ref_field(mut self, name: impl Into<String>, template: &Arc<TemplateType>) -> Self {
        self.fields.push(FieldDecl::new(name, TypeExpr::of(template)));
        self
    }

    /// Add a field with an arbitrary declared type expression.
    pub fn typed_field(mut self, name: impl Into<String>, declared: TypeExpr) -> Self {
        self.fields.push(FieldDecl::new(name, declared));
        self
    }

    /// Build the template.
    pub fn build(self) -> Arc<TemplateType> {
        TemplateType::generic_record(self.name, self.arity, self.fields)
    }
}
