//! Fixed-capacity text fields

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Text that fits a fixed-width record field of `N` bytes
///
/// Holds at most `N` bytes and never a NUL. Longer input is truncated on
/// construction; a field that fills its whole capacity is stored without a
/// terminator on the wire.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct FixedText<const N: usize> {
    bytes: Vec<u8>,
}

impl<const N: usize> FixedText<N> {
    pub const CAPACITY: usize = N;

    /// Build from bytes, cutting at the first NUL or at capacity
    pub fn new(text: impl AsRef<[u8]>) -> Self {
        let text = text.as_ref();
        let end = text
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(text.len())
            .min(N);
        FixedText {
            bytes: text[..end].to_vec(),
        }
    }

    /// Decode a wire field: read up to capacity, stop at the first NUL
    pub fn from_wire(field: &[u8]) -> Self {
        Self::new(&field[..field.len().min(N)])
    }

    /// Decode a wire field whose used length is stored separately
    pub fn from_wire_with_len(field: &[u8], len: usize) -> Self {
        Self::from_wire(&field[..len.min(field.len())])
    }

    /// Write into a wire field, zero-filling the remainder
    pub fn write_wire(&self, field: &mut [u8]) {
        let n = self.bytes.len().min(field.len());
        field[..n].copy_from_slice(&self.bytes[..n]);
        field[n..].fill(0);
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

impl<const N: usize> From<&str> for FixedText<N> {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl<const N: usize> From<String> for FixedText<N> {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl<const N: usize> fmt::Display for FixedText<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.bytes))
    }
}

impl<const N: usize> fmt::Debug for FixedText<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", String::from_utf8_lossy(&self.bytes))
    }
}

impl<const N: usize> Serialize for FixedText<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string_lossy())
    }
}

impl<'de, const N: usize> Deserialize<'de> for FixedText<N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Self::new(text))
    }
}
