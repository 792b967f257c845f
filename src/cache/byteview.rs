use std::fmt;
use std::sync::Arc;

/// Immutable snapshot of cached bytes.
///
/// Clones share the same backing buffer. Callers that need owned bytes get a
/// fresh copy from [`ByteView::byte_slice`], so cached storage can never be
/// mutated through a returned value.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ByteView {
    b: Arc<[u8]>,
}

impl ByteView {
    /// Copies `bytes` into a new snapshot.
    pub fn new(bytes: &[u8]) -> Self {
        Self { b: Arc::from(bytes) }
    }

    pub fn len(&self) -> usize {
        self.b.len()
    }

    pub fn is_empty(&self) -> bool {
        self.b.is_empty()
    }

    /// Returns an owned copy of the bytes.
    pub fn byte_slice(&self) -> Vec<u8> {
        self.b.to_vec()
    }

    /// Read-only view of the bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.b
    }
}

impl From<Vec<u8>> for ByteView {
    fn from(bytes: Vec<u8>) -> Self {
        Self {
            b: Arc::from(bytes.into_boxed_slice()),
        }
    }
}

impl From<&str> for ByteView {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes())
    }
}

impl fmt::Display for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.b))
    }
}

impl fmt::Debug for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteView")
            .field("len", &self.b.len())
            .field("value", &String::from_utf8_lossy(&self.b))
            .finish()
    }
}
