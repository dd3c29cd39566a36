// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Session-scoped template-type id registry.

use crate::descriptor::TemplateType;
use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Assigns a stable numeric id to each distinct template type seen during a
/// session and resolves ids back to templates.
///
/// Ids start at 1 and follow first-seen order; an id is never reassigned or
/// freed. Templates are keyed by name, so re-building a template under the
/// same name maps to the same id — this is what keeps repeated
/// [`encode_type`](crate::type_codec::encode_type) calls stable within a
/// session. Allocation is serialized behind a mutex so independent
/// serialize calls may share one registry.
///
/// A registry is an owned value passed into each session; there is no
/// process-wide instance.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    ids: HashMap<String, u32>,
    // reverse lookup arena; index = id - 1
    templates: Vec<Arc<TemplateType>>,
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the template's id, assigning the next one on first sight.
    pub fn get_or_assign(&self, template: &Arc<TemplateType>) -> u32 {
        let mut inner = self.inner.lock();
        if let Some(&id) = inner.ids.get(&template.name) {
            return id;
        }
        inner.templates.push(template.clone());
        let id = inner.templates.len() as u32;
        inner.ids.insert(template.name.clone(), id);
        log::trace!("[TypeRegistry::get_or_assign] {} -> {}", template.name, id);
        id
    }

    /// Resolve an id to its template. Fails with [`Error::UnknownTypeId`]
    /// for ids never assigned in this session.
    pub fn lookup(&self, id: u32) -> Result<Arc<TemplateType>> {
        let inner = self.inner.lock();
        if id == 0 {
            return Err(Error::UnknownTypeId(id));
        }
        inner
            .templates
            .get(id as usize - 1)
            .cloned()
            .ok_or(Error::UnknownTypeId(id))
    }

    /// Number of registered templates.
    pub fn len(&self) -> usize {
        self.inner.lock().templates.len()
    }

    /// Returns `true` if no templates are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::PrimitiveKind;

    #[test]
    fn test_first_seen_order_starting_at_one() {
        let registry = TypeRegistry::new();
        let list = TemplateType::sequence("List");
        let int = TemplateType::primitive(PrimitiveKind::I32);

        assert_eq!(registry.get_or_assign(&list), 1);
        assert_eq!(registry.get_or_assign(&int), 2);
        // idempotent
        assert_eq!(registry.get_or_assign(&list), 1);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_lookup_round_trip() {
        let registry = TypeRegistry::new();
        let list = TemplateType::sequence("List");
        let id = registry.get_or_assign(&list);

        let resolved = registry.lookup(id).expect("lookup");
        assert_eq!(resolved.name, "List");
    }

    #[test]
    fn test_unknown_id_fails() {
        let registry = TypeRegistry::new();
        assert!(matches!(registry.lookup(0), Err(Error::UnknownTypeId(0))));
        assert!(matches!(registry.lookup(7), Err(Error::UnknownTypeId(7))));
    }

    #[test]
    fn test_same_name_same_id() {
        let registry = TypeRegistry::new();
        let a = TemplateType::primitive(PrimitiveKind::I32);
        let b = TemplateType::primitive(PrimitiveKind::I32);
        assert_eq!(registry.get_or_assign(&a), registry.get_or_assign(&b));
    }

    #[test]
    fn test_concurrent_assignment_is_unique() {
        let registry = std::sync::Arc::new(TypeRegistry::new());
        let mut handles = Vec::new();
        for t in 0..8 {
            let registry = registry.clone();
            handles.push(std::thread::spawn(move || {
                let mut ids = Vec::new();
                for i in 0..50 {
                    let template = TemplateType::opaque(format!("T{}_{}", t, i));
                    ids.push(registry.get_or_assign(&template));
                }
                ids
            }));
        }

        let mut all: Vec<u32> = handles
            .into_iter()
            .flat_map(|h| h.join().expect("join"))
            .collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 8 * 50);
        assert_eq!(registry.len(), 8 * 50);
    }
}
