// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Byte-stream framing for entry lists.
//!
//! Layout (little-endian, all integers unsigned):
//!
//! ```text
//! Stream := EntryCount:u32 Entry*
//! Entry  := TypeIdCount:u32 TypeId:u32{TypeIdCount} ObjectId:u32
//!           PayloadLen:u32 Payload:byte{PayloadLen}
//! ```
//!
//! Framing is purely mechanical; every semantic decision lives in the
//! graph walk and the type codec.

use crate::error::{Error, Result};
use crate::graph::Entry;

/// Bounds-checked reader over a byte slice.
#[derive(Debug)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Wrap a byte slice.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Whether all bytes were consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Consume exactly `count` bytes.
    pub fn read(&mut self, count: usize) -> Result<&'a [u8]> {
        if count > self.remaining() {
            return Err(Error::MalformedStream(format!(
                "need {} byte(s), have {}",
                count,
                self.remaining()
            )));
        }
        let slice = &self.buf[self.pos..self.pos + count];
        self.pos += count;
        Ok(slice)
    }

    /// Consume a little-endian u32.
    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.read(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

/// Serialize an entry list to bytes.
pub fn encode_stream(entries: &[Entry]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend((entries.len() as u32).to_le_bytes());
    for entry in entries {
        out.extend((entry.type_ids.len() as u32).to_le_bytes());
        for id in &entry.type_ids {
            out.extend(id.to_le_bytes());
        }
        out.extend(entry.object_id.to_le_bytes());
        out.extend((entry.payload.len() as u32).to_le_bytes());
        out.extend(&entry.payload);
    }
    out
}

/// Parse an entry list from bytes.
///
/// Every length prefix is validated against the remaining input before any
/// allocation; trailing bytes after the final entry are an error.
pub fn decode_stream(bytes: &[u8]) -> Result<Vec<Entry>> {
    let mut cursor = Cursor::new(bytes);
    let entry_count = cursor.read_u32()? as usize;

    let mut entries = Vec::new();
    for _ in 0..entry_count {
        let type_id_count = cursor.read_u32()? as usize;
        // division form: the multiplication could overflow usize on 32-bit
        // targets for a hostile count
        if type_id_count > cursor.remaining() / 4 {
            return Err(Error::MalformedStream(format!(
                "type id count {} exceeds remaining input",
                type_id_count
            )));
        }
        let mut type_ids = Vec::with_capacity(type_id_count);
        for _ in 0..type_id_count {
            type_ids.push(cursor.read_u32()?);
        }

        let object_id = cursor.read_u32()?;
        let payload_len = cursor.read_u32()? as usize;
        let payload = cursor.read(payload_len)?.to_vec();

        entries.push(Entry {
            type_ids,
            object_id,
            payload,
        });
    }

    if !cursor.is_empty() {
        return Err(Error::MalformedStream(format!(
            "{} trailing byte(s) after final entry",
            cursor.remaining()
        )));
    }
    Ok(entries)
}
