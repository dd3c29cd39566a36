// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Primitive leaf codec.
//!
//! Closed little-endian encoding per [`PrimitiveKind`]: fixed width for
//! numeric kinds, one byte for bool, the u32 scalar value for char, and a
//! u32 length prefix plus UTF-8 bytes for text. Anything outside the closed
//! set never reaches this module — it fails earlier with
//! `UnsupportedType`.

use crate::descriptor::PrimitiveKind;
use crate::error::{Error, Result};
use crate::value::Value;
use crate::wire::Cursor;

/// Append the encoding of `value` to `out`.
///
/// Fails with [`Error::ValueMismatch`] if the value's variant does not
/// match the declared kind.
pub fn encode_primitive(kind: PrimitiveKind, value: &Value, out: &mut Vec<u8>) -> Result<()> {
    match (kind, value) {
        (PrimitiveKind::Bool, Value::Bool(v)) => out.push(u8::from(*v)),
        (PrimitiveKind::Char, Value::Char(v)) => out.extend((*v as u32).to_le_bytes()),
        (PrimitiveKind::I8, Value::I8(v)) => out.extend(v.to_le_bytes()),
        (PrimitiveKind::I16, Value::I16(v)) => out.extend(v.to_le_bytes()),
        (PrimitiveKind::I32, Value::I32(v)) => out.extend(v.to_le_bytes()),
        (PrimitiveKind::I64, Value::I64(v)) => out.extend(v.to_le_bytes()),
        (PrimitiveKind::U16, Value::U16(v)) => out.extend(v.to_le_bytes()),
        (PrimitiveKind::U32, Value::U32(v)) => out.extend(v.to_le_bytes()),
        (PrimitiveKind::U64, Value::U64(v)) => out.extend(v.to_le_bytes()),
        (PrimitiveKind::F32, Value::F32(v)) => out.extend(v.to_le_bytes()),
        (PrimitiveKind::F64, Value::F64(v)) => out.extend(v.to_le_bytes()),
        (PrimitiveKind::Str, Value::Str(s)) => {
            out.extend((s.len() as u32).to_le_bytes());
            out.extend(s.as_bytes());
        }
        (kind, value) => {
            return Err(Error::ValueMismatch {
                expected: kind.name().to_string(),
                found: value.kind_name().to_string(),
            })
        }
    }
    Ok(())
}

/// Decode one leaf of the given kind from the cursor.
pub fn decode_primitive(kind: PrimitiveKind, cursor: &mut Cursor<'_>) -> Result<Value> {
    match kind {
        PrimitiveKind::Bool => {
            let bytes = cursor.read(1)?;
            match bytes[0] {
                0 => Ok(Value::Bool(false)),
                1 => Ok(Value::Bool(true)),
                other => Err(Error::MalformedStream(format!(
                    "invalid bool byte: {}",
                    other
                ))),
            }
        }
        PrimitiveKind::Char => {
            let scalar = cursor.read_u32()?;
            char::from_u32(scalar)
                .map(Value::Char)
                .ok_or_else(|| Error::MalformedStream(format!("invalid char scalar: {}", scalar)))
        }
        PrimitiveKind::I8 => {
            let bytes = cursor.read(1)?;
            Ok(Value::I8(bytes[0] as i8))
        }
        PrimitiveKind::I16 => {
            let bytes = cursor.read(2)?;
            Ok(Value::I16(i16::from_le_bytes([bytes[0], bytes[1]])))
        }
        PrimitiveKind::I32 => {
            let bytes = cursor.read(4)?;
            Ok(Value::I32(i32::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3],
            ])))
        }
        PrimitiveKind::I64 => {
            let bytes = cursor.read(8)?;
            Ok(Value::I64(i64::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
            ])))
        }
        PrimitiveKind::U16 => {
            let bytes = cursor.read(2)?;
            Ok(Value::U16(u16::from_le_bytes([bytes[0], bytes[1]])))
        }
        PrimitiveKind::U32 => Ok(Value::U32(cursor.read_u32()?)),
        PrimitiveKind::U64 => {
            let bytes = cursor.read(8)?;
            Ok(Value::U64(u64::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
            ])))
        }
        PrimitiveKind::F32 => {
            let bytes = cursor.read(4)?;
            Ok(Value::F32(f32::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3],
            ])))
        }
        PrimitiveKind::F64 => {
            let bytes = cursor.read(8)?;
            Ok(Value::F64(f64::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
            ])))
        }
        PrimitiveKind::Str => {
            let len = cursor.read_u32()? as usize;
            let bytes = cursor.read(len)?;
            String::from_utf8(bytes.to_vec())
                .map(Value::Str)
                .map_err(|e| Error::MalformedStream(format!("invalid UTF-8 text: {}", e)))
        }
    }
}
