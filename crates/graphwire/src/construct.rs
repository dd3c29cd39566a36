// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Instance construction during graph reconstruction.

use crate::descriptor::ConcreteType;
use crate::error::{Error, Result};
use crate::value::Instance;
use std::sync::Arc;

/// Produces the instance a decoded entry is populated into.
///
/// The deserializer constructs every instance before populating any of
/// them, so implementations must not assume fields or elements are present
/// at construction time. A custom implementation can intern instances,
/// attach side tables or veto types the application refuses to
/// reconstruct.
pub trait Constructor: Send + Sync {
    /// Produce an empty instance of the given concrete type.
    fn construct(&self, ty: &ConcreteType) -> Result<Arc<Instance>>;
}

/// Default [`Constructor`]: empty storage straight from the descriptor.
#[derive(Debug, Default)]
pub struct DescriptorConstructor;

impl Constructor for DescriptorConstructor {
    fn construct(&self, ty: &ConcreteType) -> Result<Arc<Instance>> {
        Instance::hollow(ty.clone())
    }
}

/// [`Constructor`] that rejects every type. Useful as a building block for
/// allow-list policies layered on top of [`DescriptorConstructor`].
#[derive(Debug, Default)]
pub struct RejectingConstructor;

impl Constructor for RejectingConstructor {
    fn construct(&self, ty: &ConcreteType) -> Result<Arc<Instance>> {
        Err(Error::ConstructionError(format!(
            "construction of {} refused",
            ty
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TemplateBuilder;
    use crate::descriptor::PrimitiveKind;
    use crate::value::Body;

    #[test]
    fn test_descriptor_constructor_builds_hollow_records() {
        let point = TemplateBuilder::new("Point")
            .field("x", PrimitiveKind::I32)
            .build();
        let ty = ConcreteType::leaf(&point).expect("leaf");

        let instance = DescriptorConstructor.construct(&ty).expect("construct");
        assert!(matches!(&*instance.body(), Body::Record(map) if map.is_empty()));
    }

    #[test]
    fn test_primitive_construction_fails() {
        let ty = ConcreteType::primitive(PrimitiveKind::I32);
        assert!(matches!(
            DescriptorConstructor.construct(&ty),
            Err(Error::ConstructionError(_))
        ));
    }

    #[test]
    fn test_rejecting_constructor() {
        let point = TemplateBuilder::new("Point")
            .field("x", PrimitiveKind::I32)
            .build();
        let ty = ConcreteType::leaf(&point).expect("leaf");
        assert!(matches!(
            RejectingConstructor.construct(&ty),
            Err(Error::ConstructionError(_))
        ));
    }
}
