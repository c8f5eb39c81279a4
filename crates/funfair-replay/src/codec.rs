//! Binary encode/decode for the replay format.
//!
//! All integers are little-endian. The format is intentionally simple:
//! no compression, no alignment padding, no self-describing schema.
//! Wire stability comes from the action kind and parameter tags in
//! `funfair-core`, which are append-only.

use std::io::{Read, Write};

use funfair_core::action::{Action, ActionKind, ActionParams, ParamKey, ParamValue};
use funfair_core::id::{EntityId, PeerId};

use crate::error::ReplayError;
use crate::types::{Frame, ReplayHeader};
use crate::{FORMAT_VERSION, MAGIC};

// Parameter value type tags. Append-only.
const PARAM_I32: u8 = 0;
const PARAM_U32: u8 = 1;
const PARAM_I64: u8 = 2;
const PARAM_BOOL: u8 = 3;
const PARAM_ENTITY: u8 = 4;

// ── Primitive writers ───────────────────────────────────────────

/// Write a single byte.
pub fn write_u8(w: &mut dyn Write, v: u8) -> Result<(), ReplayError> {
    w.write_all(&[v])?;
    Ok(())
}

/// Write a little-endian u16.
pub fn write_u16_le(w: &mut dyn Write, v: u16) -> Result<(), ReplayError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian u32.
pub fn write_u32_le(w: &mut dyn Write, v: u32) -> Result<(), ReplayError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian u64.
pub fn write_u64_le(w: &mut dyn Write, v: u64) -> Result<(), ReplayError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian i32.
pub fn write_i32_le(w: &mut dyn Write, v: i32) -> Result<(), ReplayError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian i64.
pub fn write_i64_le(w: &mut dyn Write, v: i64) -> Result<(), ReplayError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

// ── Primitive readers ───────────────────────────────────────────

/// Read a single byte.
pub fn read_u8(r: &mut dyn Read) -> Result<u8, ReplayError> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

/// Read a little-endian u16.
pub fn read_u16_le(r: &mut dyn Read) -> Result<u16, ReplayError> {
    let mut buf = [0u8; 2];
    r.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

/// Read a little-endian u32.
pub fn read_u32_le(r: &mut dyn Read) -> Result<u32, ReplayError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Read a little-endian u64.
pub fn read_u64_le(r: &mut dyn Read) -> Result<u64, ReplayError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

/// Read a little-endian i32.
pub fn read_i32_le(r: &mut dyn Read) -> Result<i32, ReplayError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

/// Read a little-endian i64.
pub fn read_i64_le(r: &mut dyn Read) -> Result<i64, ReplayError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(i64::from_le_bytes(buf))
}

// ── Header encode/decode ────────────────────────────────────────

/// Encode the replay file header (magic, version, session parameters).
pub fn encode_header(w: &mut dyn Write, header: &ReplayHeader) -> Result<(), ReplayError> {
    w.write_all(&MAGIC)?;
    write_u16_le(w, FORMAT_VERSION)?;
    write_u64_le(w, header.seed)?;
    write_u64_le(w, header.config_hash)?;
    write_u32_le(w, header.ticks_per_second)?;
    Ok(())
}

/// Decode and validate the replay file header.
pub fn decode_header(r: &mut dyn Read) -> Result<ReplayHeader, ReplayError> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(ReplayError::InvalidMagic);
    }

    let version = read_u16_le(r)?;
    if version != FORMAT_VERSION {
        return Err(ReplayError::UnsupportedVersion { found: version });
    }

    Ok(ReplayHeader {
        seed: read_u64_le(r)?,
        config_hash: read_u64_le(r)?,
        ticks_per_second: read_u32_le(r)?,
    })
}

// ── Action encode/decode ────────────────────────────────────────

/// Encode a single action: kind tag, issuer, parameter map.
pub fn encode_action(w: &mut dyn Write, action: &Action) -> Result<(), ReplayError> {
    write_u16_le(w, action.kind.wire_tag())?;
    // Presence flag + value for the optional issuer.
    match action.issuer {
        Some(peer) => {
            write_u8(w, 1)?;
            write_u32_le(w, peer.0)?;
        }
        None => write_u8(w, 0)?,
    }
    write_u32_le(w, action.params.len() as u32)?;
    for (key, value) in &action.params.0 {
        write_u16_le(w, key.0)?;
        match value {
            ParamValue::I32(v) => {
                write_u8(w, PARAM_I32)?;
                write_i32_le(w, *v)?;
            }
            ParamValue::U32(v) => {
                write_u8(w, PARAM_U32)?;
                write_u32_le(w, *v)?;
            }
            ParamValue::I64(v) => {
                write_u8(w, PARAM_I64)?;
                write_i64_le(w, *v)?;
            }
            ParamValue::Bool(v) => {
                write_u8(w, PARAM_BOOL)?;
                write_u8(w, *v as u8)?;
            }
            ParamValue::Entity(v) => {
                write_u8(w, PARAM_ENTITY)?;
                write_u32_le(w, v.0)?;
            }
        }
    }
    Ok(())
}

/// Decode a single action.
pub fn decode_action(r: &mut dyn Read) -> Result<Action, ReplayError> {
    let tag = read_u16_le(r)?;
    let kind = ActionKind::from_wire_tag(tag).ok_or(ReplayError::UnknownActionKind { tag })?;

    let issuer = match read_u8(r)? {
        0 => None,
        1 => Some(PeerId(read_u32_le(r)?)),
        flag => {
            return Err(ReplayError::MalformedFrame {
                detail: format!("invalid issuer presence flag: {flag}"),
            })
        }
    };

    let param_count = read_u32_le(r)? as usize;
    let mut params = ActionParams::new();
    for _ in 0..param_count {
        let key = ParamKey(read_u16_le(r)?);
        let value = match read_u8(r)? {
            PARAM_I32 => ParamValue::I32(read_i32_le(r)?),
            PARAM_U32 => ParamValue::U32(read_u32_le(r)?),
            PARAM_I64 => ParamValue::I64(read_i64_le(r)?),
            PARAM_BOOL => ParamValue::Bool(read_u8(r)? != 0),
            PARAM_ENTITY => ParamValue::Entity(EntityId(read_u32_le(r)?)),
            tag => return Err(ReplayError::UnknownParamType { tag }),
        };
        params.set(key, value);
    }

    Ok(Action {
        kind,
        params,
        issuer,
    })
}

// ── Frame encode/decode ─────────────────────────────────────────

/// Encode a single replay frame.
pub fn encode_frame(w: &mut dyn Write, frame: &Frame) -> Result<(), ReplayError> {
    write_u64_le(w, frame.tick)?;
    write_u32_le(w, frame.actions.len() as u32)?;
    for action in &frame.actions {
        encode_action(w, action)?;
    }
    write_u64_le(w, frame.checksum)?;
    Ok(())
}

/// Decode a single replay frame.
///
/// Returns `Ok(None)` on clean EOF (no bytes available),
/// `Ok(Some(frame))` on success, or an error on truncated/corrupt
/// data.
pub fn decode_frame(r: &mut dyn Read) -> Result<Option<Frame>, ReplayError> {
    // Read the tick header byte-by-byte to distinguish clean EOF
    // (zero bytes available) from truncation (1-7 bytes before EOF).
    let mut tick_buf = [0u8; 8];
    let mut filled = 0;
    while filled < 8 {
        match r.read(&mut tick_buf[filled..]) {
            Ok(0) => {
                if filled == 0 {
                    return Ok(None);
                }
                return Err(ReplayError::MalformedFrame {
                    detail: format!("truncated frame header: got {filled} of 8 bytes for tick"),
                });
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(ReplayError::Io(e)),
        }
    }
    let tick = u64::from_le_bytes(tick_buf);

    let action_count = read_u32_le(r)? as usize;
    // The count is untrusted input; cap the preallocation so a corrupt
    // frame surfaces as a decode error instead of an absurd allocation.
    let mut actions = Vec::with_capacity(action_count.min(1024));
    for _ in 0..action_count {
        actions.push(decode_action(r)?);
    }

    let checksum = read_u64_le(r)?;

    Ok(Some(Frame {
        tick,
        actions,
        checksum,
    }))
}
