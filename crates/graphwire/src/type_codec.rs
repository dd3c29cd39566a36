// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Recursive codec between concrete types and flat type-id lists.
//!
//! A concrete type encodes as its template's registry id followed by each
//! generic argument's encoding, in declaration order. Declaration order is
//! the only information that tells the decoder where one argument's
//! encoding ends and the next begins, so both directions are strictly
//! sequential.

use crate::descriptor::ConcreteType;
use crate::error::{Error, Result};
use crate::registry::TypeRegistry;

/// Bound on generic-nesting depth when decoding an id list. Decode input
/// may be hostile, so recursion cannot be left bounded only by the list
/// length.
const MAX_TYPE_DEPTH: usize = 128;

/// Encode a concrete type as a flat ordered id list, registering any
/// templates not yet seen by `registry`.
pub fn encode_type(registry: &TypeRegistry, ty: &ConcreteType) -> Vec<u32> {
    let mut ids = Vec::with_capacity(1 + ty.args().len());
    push_type(registry, ty, &mut ids);
    ids
}

fn push_type(registry: &TypeRegistry, ty: &ConcreteType, ids: &mut Vec<u32>) {
    ids.push(registry.get_or_assign(ty.template()));
    for arg in ty.args() {
        push_type(registry, arg, ids);
    }
}

/// Decode the concrete type at the front of `ids`, returning it together
/// with the ids left over.
///
/// Each recursive call consumes a variable-length prefix and the next
/// argument's decode must start exactly where the previous one stopped;
/// the consumption order is a hard invariant and must not be reordered.
pub fn decode_type<'a>(
    registry: &TypeRegistry,
    ids: &'a [u32],
) -> Result<(ConcreteType, &'a [u32])> {
    decode_type_at(registry, ids, 0)
}

fn decode_type_at<'a>(
    registry: &TypeRegistry,
    ids: &'a [u32],
    depth: usize,
) -> Result<(ConcreteType, &'a [u32])> {
    if depth >= MAX_TYPE_DEPTH {
        return Err(Error::MalformedStream(format!(
            "type nesting exceeds depth limit {}",
            MAX_TYPE_DEPTH
        )));
    }
    let (&first, mut rest) = ids
        .split_first()
        .ok_or_else(|| Error::MalformedStream("truncated type id list".to_string()))?;
    let template = registry.lookup(first)?;

    let mut args = Vec::with_capacity(template.arity);
    for _ in 0..template.arity {
        let (arg, remaining) = decode_type_at(registry, rest, depth + 1)?;
        args.push(arg);
        rest = remaining;
    }

    Ok((ConcreteType::new(template, args)?, rest))
}
