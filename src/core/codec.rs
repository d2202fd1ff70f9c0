//! Two's-complement byte codec and the length-prefix wire format.
//!
//! Signed integers are stored as the shortest big-endian two's-complement
//! byte sequence that decodes back to the same value. Variable length byte
//! payloads are preceded by a length header whose first byte tells how the
//! length is encoded:
//!
//! ┌──────────────────┬──────────────┬──────────────────────────────────┐
//! │ First byte       │ Header size  │ Length                           │
//! ├──────────────────┼──────────────┼──────────────────────────────────┤
//! │ 0x80 | L (L<=31) │ 1 byte       │ L bytes                          │
//! │ 0xA0             │ 3 bytes      │ following u16 (big-endian)       │
//! │ 0xC0             │ 5 bytes      │ following i32 (big-endian)       │
//! │ high bit clear   │ 4 bytes      │ ceil(bits / 8), legacy bit count │
//! └──────────────────┴──────────────┴──────────────────────────────────┘
//!
//! A legacy bit count of zero means the length is unknown and the payload
//! runs to the end of the input.

use num_bigint::{BigInt, BigUint, Sign};

use crate::config::FormatVersion;
use crate::sql::types::TypeId;
use crate::{Result, TypeError};

const SHORT_LENGTH: u8 = 0x80;
const SHORT_LENGTH_MASK: u8 = 0x1F;
const MEDIUM_LENGTH: u8 = 0xA0;
const LONG_LENGTH: u8 = 0xC0;

/// Largest payload the compact one-byte header can describe.
const SHORT_LENGTH_MAX: usize = 31;

/// Length taken from a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Length {
    /// Exactly this many payload bytes follow.
    Exact(usize),
    /// Legacy zero header, the payload is the rest of the input.
    Unknown,
}

/// Encodes `value` as a minimal big-endian two's-complement byte sequence.
///
/// Zero encodes as a single `0x00` byte.
pub fn to_twos_complement(value: &BigInt) -> Vec<u8> {
    let mut bytes = value.magnitude().to_bytes_be();

    match value.sign() {
        Sign::Minus => {
            negate_in_place(&mut bytes);
            // magnitude above 2^(8n-1) needs an extra sign byte
            if bytes[0] & 0x80 == 0 {
                bytes.insert(0, 0xFF);
            }
        }
        _ => {
            if bytes[0] & 0x80 != 0 {
                bytes.insert(0, 0x00);
            }
        }
    }

    let redundant = bytes.len() - minimal(&bytes).len();
    bytes.drain(..redundant);
    bytes
}

/// Interprets `bytes` as a big-endian two's-complement integer of any length.
pub fn from_twos_complement(bytes: &[u8]) -> BigInt {
    match bytes.first() {
        None => BigInt::default(),
        Some(first) if first & 0x80 == 0 => BigInt::from_bytes_be(Sign::Plus, bytes),
        Some(_) => {
            let mut magnitude = bytes.to_vec();
            negate_in_place(&mut magnitude);
            BigInt::from_biguint(Sign::Minus, BigUint::from_bytes_be(&magnitude))
        }
    }
}

/// Strips redundant leading sign bytes.
///
/// A leading `0x00` (or `0xFF`) is only dropped while the byte after it has
/// the same sign bit, so the represented value never changes.
pub fn minimal(bytes: &[u8]) -> &[u8] {
    let mut start = 0;

    while start + 1 < bytes.len() {
        let (lead, next) = (bytes[start], bytes[start + 1]);
        let redundant = match lead {
            0x00 => next & 0x80 == 0,
            0xFF => next & 0x80 != 0,
            _ => false,
        };

        if !redundant {
            break;
        }
        start += 1;
    }

    &bytes[start..]
}

/// Two's-complement negation of a big-endian byte sequence: invert, add one.
fn negate_in_place(bytes: &mut [u8]) {
    bytes.iter_mut().for_each(|b| *b = !*b);

    for byte in bytes.iter_mut().rev() {
        let (sum, carry) = byte.overflowing_add(1);
        *byte = sum;
        if !carry {
            break;
        }
    }
}

/// Appends the length header for a `len` byte payload.
///
/// [`FormatVersion::Legacy`] writes the 4-byte bit count, anything newer the
/// compact 1, 3 or 5 byte header.
pub fn write_length(buf: &mut Vec<u8>, len: usize, version: FormatVersion) -> Result<()> {
    match version {
        FormatVersion::Legacy => {
            let bits = len
                .checked_mul(8)
                .and_then(|bits| i32::try_from(bits).ok())
                .ok_or(TypeError::OutOfRange(TypeId::VarBinary))?;
            buf.extend_from_slice(&bits.to_be_bytes());
        }
        FormatVersion::Current => match len {
            0..=SHORT_LENGTH_MAX => buf.push(SHORT_LENGTH | len as u8),
            32..=0xFFFF => {
                buf.push(MEDIUM_LENGTH);
                buf.extend_from_slice(&(len as u16).to_be_bytes());
            }
            _ => {
                let len = i32::try_from(len).map_err(|_| TypeError::OutOfRange(TypeId::VarBinary))?;
                buf.push(LONG_LENGTH);
                buf.extend_from_slice(&len.to_be_bytes());
            }
        },
    }

    Ok(())
}

/// Reads a length header from the front of `bytes`.
///
/// Returns the decoded length and the size of the header.
pub fn read_length(bytes: &[u8]) -> Result<(Length, usize)> {
    let first = *bytes
        .first()
        .ok_or_else(|| TypeError::corrupted("missing length header"))?;

    if first & 0x80 == 0 {
        let bits = i32::from_be_bytes(take_header(bytes)?) as usize;
        tracing::trace!(bits, "decoding legacy bit-count length");

        let length = match bits {
            0 => Length::Unknown,
            bits => Length::Exact(bits.div_ceil(8)),
        };
        return Ok((length, 4));
    }

    Ok(match first {
        LONG_LENGTH => {
            let header: [u8; 5] = take_header(bytes)?;
            let len = i32::from_be_bytes([header[1], header[2], header[3], header[4]]);
            let len = usize::try_from(len)
                .map_err(|_| TypeError::corrupted(format!("negative length {len}")))?;
            (Length::Exact(len), 5)
        }
        MEDIUM_LENGTH => {
            let header: [u8; 3] = take_header(bytes)?;
            let len = u16::from_be_bytes([header[1], header[2]]);
            (Length::Exact(len as usize), 3)
        }
        short => (Length::Exact((short & SHORT_LENGTH_MASK) as usize), 1),
    })
}

fn take_header<const N: usize>(bytes: &[u8]) -> Result<[u8; N]> {
    bytes
        .get(..N)
        .and_then(|header| header.try_into().ok())
        .ok_or_else(|| TypeError::corrupted("truncated length header"))
}

/// Writes a length-prefixed byte payload.
pub fn write_prefixed(buf: &mut Vec<u8>, payload: &[u8], version: FormatVersion) -> Result<()> {
    write_length(buf, payload.len(), version)?;
    buf.extend_from_slice(payload);
    Ok(())
}

/// Reads a length-prefixed byte payload.
///
/// Returns the payload and the total number of bytes consumed.
pub fn read_prefixed(bytes: &[u8]) -> Result<(&[u8], usize)> {
    let (length, header) = read_length(bytes)?;
    let content = &bytes[header..];

    let len = match length {
        Length::Exact(len) => len,
        Length::Unknown => content.len(),
    };

    let payload = content
        .get(..len)
        .ok_or_else(|| TypeError::corrupted(format!("expected {len} payload bytes")))?;

    Ok((payload, header + len))
}

/// Writes an integer as a length-prefixed two's-complement payload.
pub fn write_integer(buf: &mut Vec<u8>, value: &BigInt, version: FormatVersion) -> Result<()> {
    write_prefixed(buf, &to_twos_complement(value), version)
}

/// Reads an integer written by [`write_integer`].
pub fn read_integer(bytes: &[u8]) -> Result<(BigInt, usize)> {
    let (payload, consumed) = read_prefixed(bytes)?;
    Ok((from_twos_complement(payload), consumed))
}
