//! `CHAR FOR BIT DATA` and `VARCHAR FOR BIT DATA` values.
//!
//! Binary strings compare like blank-padded character strings: the shorter
//! value is treated as if it were extended with `0x20` bytes, so trailing pad
//! bytes never make two values different.

use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::ops::Range;

use crate::config::FormatVersion;
use crate::core::codec;
use crate::sql::types::TypeId;
use crate::{Result, TypeError};

/// Byte a shorter binary string is padded with.
pub const PAD_BYTE: u8 = 0x20;

#[derive(Debug, Clone, Default)]
pub struct BinaryString {
    bytes: Vec<u8>,
}

/// Orders two byte sequences, padding the shorter one with [`PAD_BYTE`].
pub fn compare_padded(lhs: &[u8], rhs: &[u8]) -> Ordering {
    let common = lhs.len().min(rhs.len());

    match lhs[..common].cmp(&rhs[..common]) {
        Ordering::Equal => {}
        unequal => return unequal,
    }

    let is_padding = |tail: &[u8]| tail.iter().all(|b| *b == PAD_BYTE);
    match lhs.len().cmp(&rhs.len()) {
        Ordering::Greater if !is_padding(&lhs[common..]) => Ordering::Greater,
        Ordering::Less if !is_padding(&rhs[common..]) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

/// Index range selected by a 1-based `SUBSTR(start, length)` over a value of
/// `len` elements.
///
/// A negative `start` counts back from the end, `-1` being the last element.
/// Without a `length` the rest of the value is taken. A zero start, a
/// negative length, or a length running past the end of the value is an
/// error. A start outside the value selects nothing.
pub(crate) fn substring_range(len: usize, start: i64, length: Option<i64>) -> Result<Range<usize>> {
    if start == 0 || length.is_some_and(|length| length < 0) {
        return Err(TypeError::SubstringRange);
    }

    let len = len as i64;
    let first = match start < 0 {
        true => len + start + 1,
        _ => start,
    };

    if first < 1 || first > len {
        return Ok(0..0);
    }

    let available = len - first + 1;
    let take = match length {
        None => available,
        Some(length) if length <= available => length,
        Some(_) => return Err(TypeError::SubstringRange),
    };

    let from = (first - 1) as usize;
    Ok(from..from + take as usize)
}

fn trim_padding(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|b| *b != PAD_BYTE)
        .map_or(0, |last| last + 1);
    &bytes[..end]
}

impl BinaryString {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn compare(&self, other: &Self) -> Ordering {
        compare_padded(&self.bytes, &other.bytes)
    }

    pub fn concat(&self, other: &Self) -> Self {
        let mut bytes = Vec::with_capacity(self.len() + other.len());
        bytes.extend_from_slice(&self.bytes);
        bytes.extend_from_slice(&other.bytes);
        Self { bytes }
    }

    /// 1-based `SUBSTR` over bytes, see [`substring_range`].
    pub fn substring(&self, start: i64, length: Option<i64>) -> Result<Self> {
        let range = substring_range(self.len(), start, length)?;
        Ok(Self::new(&self.bytes[range]))
    }

    /// Keeps at most the first `width` bytes.
    pub fn truncate(&self, width: usize) -> Self {
        Self::new(&self.bytes[..self.len().min(width)])
    }

    /// Fits the value into a column of `width` bytes. Fixed width columns
    /// are padded. Cutting off anything but pad bytes is an error when
    /// `error_on_truncation` is set.
    pub fn set_width(&self, width: usize, fixed: bool, error_on_truncation: bool) -> Result<Self> {
        let type_id = match fixed {
            true => TypeId::Binary,
            _ => TypeId::VarBinary,
        };

        if self.len() > width {
            let cut = &self.bytes[width..];
            if error_on_truncation && cut.iter().any(|b| *b != PAD_BYTE) {
                return Err(TypeError::Truncation { type_id, width });
            }
            return Ok(self.truncate(width));
        }

        let mut bytes = self.bytes.clone();
        if fixed {
            bytes.resize(width, PAD_BYTE);
        }
        Ok(Self { bytes })
    }

    /// Rejects values longer than the declared width of the host variable
    /// they are fetched into, even if only pad bytes would be lost.
    pub fn check_host_variable(&self, declared: usize) -> Result<()> {
        match self.len() > declared {
            true => Err(TypeError::Truncation {
                type_id: TypeId::VarBinary,
                width: declared,
            }),
            _ => Ok(()),
        }
    }

    pub fn encode(&self, buf: &mut Vec<u8>, version: FormatVersion) -> Result<()> {
        codec::write_prefixed(buf, &self.bytes, version)
    }

    pub fn decode(bytes: &[u8]) -> Result<(Self, usize)> {
        let (payload, consumed) = codec::read_prefixed(bytes)?;
        Ok((Self::new(payload), consumed))
    }
}

impl PartialEq for BinaryString {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other).is_eq()
    }
}

impl Eq for BinaryString {}

impl PartialOrd for BinaryString {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BinaryString {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl Hash for BinaryString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        trim_padding(&self.bytes).hash(state);
    }
}

impl From<Vec<u8>> for BinaryString {
    fn from(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

impl From<&[u8]> for BinaryString {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes)
    }
}

impl Display for BinaryString {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for byte in &self.bytes {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn bin(bytes: &[u8]) -> BinaryString {
        BinaryString::new(bytes)
    }

    fn hash_of(value: &BinaryString) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn pad_equality() {
        assert_eq!(bin(&[0x41]), bin(&[0x41, 0x20, 0x20]));
        assert_ne!(bin(&[0x41]), bin(&[0x41, 0x00]));
        assert_eq!(bin(&[]), bin(&[0x20]));
    }

    #[test]
    fn ordering() {
        assert_eq!(bin(&[0x41]).compare(&bin(&[0x41, 0x00])), Ordering::Less);
        assert_eq!(bin(&[0x41, 0x21]).compare(&bin(&[0x41])), Ordering::Greater);
        // unsigned bytes
        assert_eq!(bin(&[0xFF]).compare(&bin(&[0x01])), Ordering::Greater);
        assert_eq!(bin(&[0x01, 0x02]).compare(&bin(&[0x01, 0x03, 0x00])), Ordering::Less);
    }

    #[test]
    fn hash_ignores_padding() {
        assert_eq!(hash_of(&bin(b"ab")), hash_of(&bin(b"ab   ")));
        assert_ne!(hash_of(&bin(b"ab")), hash_of(&bin(b"ab\0")));
    }

    #[test]
    fn concatenation() {
        assert_eq!(bin(b"ab").concat(&bin(b"cd")).as_bytes(), b"abcd");
        assert_eq!(bin(b"").concat(&bin(b"x")).as_bytes(), b"x");
    }

    #[test]
    fn substrings() {
        let value = bin(b"abcdef");
        assert_eq!(value.substring(2, Some(3)).unwrap().as_bytes(), b"bcd");
        assert_eq!(value.substring(4, None).unwrap().as_bytes(), b"def");
        assert_eq!(value.substring(6, Some(1)).unwrap().as_bytes(), b"f");
        assert_eq!(value.substring(-2, None).unwrap().as_bytes(), b"ef");
        assert_eq!(value.substring(-6, Some(2)).unwrap().as_bytes(), b"ab");
        assert_eq!(value.substring(1, Some(0)).unwrap().as_bytes(), b"");
    }

    #[test]
    fn substring_outside_value_is_empty() {
        let value = bin(b"abc");
        assert!(value.substring(4, None).unwrap().is_empty());
        assert!(value.substring(10, Some(2)).unwrap().is_empty());
        assert!(value.substring(-4, None).unwrap().is_empty());
        assert!(bin(b"").substring(1, None).unwrap().is_empty());
    }

    #[test]
    fn substring_range_errors() {
        let value = bin(b"abc");
        assert_eq!(value.substring(0, None), Err(TypeError::SubstringRange));
        assert_eq!(value.substring(1, Some(-1)), Err(TypeError::SubstringRange));
        assert_eq!(value.substring(2, Some(3)), Err(TypeError::SubstringRange));
    }

    #[test]
    fn widths() {
        assert_eq!(bin(b"abcdef").truncate(2).as_bytes(), b"ab");
        assert_eq!(bin(b"ab").truncate(5).as_bytes(), b"ab");

        let padded = bin(b"ab").set_width(4, true, true).unwrap();
        assert_eq!(padded.as_bytes(), b"ab  ");

        let trimmed = bin(b"ab  ").set_width(2, false, true).unwrap();
        assert_eq!(trimmed.as_bytes(), b"ab");

        assert_eq!(
            bin(b"abc").set_width(2, false, true),
            Err(TypeError::Truncation {
                type_id: TypeId::VarBinary,
                width: 2
            })
        );
        assert_eq!(bin(b"abc").set_width(2, true, false).unwrap().as_bytes(), b"ab");
    }

    #[test]
    fn host_variables() {
        assert!(bin(b"ab").check_host_variable(2).is_ok());
        assert_eq!(
            bin(b"ab ").check_host_variable(2),
            Err(TypeError::Truncation {
                type_id: TypeId::VarBinary,
                width: 2
            })
        );
    }

    #[test]
    fn binary_format() {
        let mut buf = Vec::new();
        bin(b"hi").encode(&mut buf, FormatVersion::Current).unwrap();
        assert_eq!(buf, vec![0x82, b'h', b'i']);

        let mut buf = Vec::new();
        bin(b"hi").encode(&mut buf, FormatVersion::Legacy).unwrap();
        assert_eq!(buf, vec![0, 0, 0, 16, b'h', b'i']);

        let (decoded, consumed) = BinaryString::decode(&[0x82, b'h', b'i', 0xFF]).unwrap();
        assert_eq!(decoded.as_bytes(), b"hi");
        assert_eq!(consumed, 3);
    }

    #[test]
    fn hex_display() {
        assert_eq!(bin(&[0x00, 0xAB, 0x10]).to_string(), "00ab10");
    }
}
