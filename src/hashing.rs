//! Table and node identifier hashing.
//!
//! Table identifiers on the wire are hex-encoded SHA-256 digests of the
//! logical table name; node identity is derived the same way from a
//! machine key and the engine's base path.

use sha2::{Digest, Sha256};

/// Width in bytes of the NUL-padded type-identifier field in the `.dat` footer.
pub const TYPE_IDENTIFIER_WIDTH: usize = 64;

/// Returns `hex(SHA-256(name))`, always 64 ASCII characters.
pub fn table_identifier(name: &str) -> String {
    let digest = Sha256::digest(name.as_bytes());
    hex::encode(digest)
}

/// Derives a stable node identity from a machine-identifying key and a base path.
///
/// Stable across restarts for the same (machine, base_path) pair, so a node
/// can resume PROCESSING tasks it previously claimed.
pub fn node_identity(machine_key: &str, base_path: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(machine_key.as_bytes());
    hasher.update(b"|");
    hasher.update(base_path.as_bytes());
    hex::encode(hasher.finalize())
}

/// Pads a type identifier to the fixed 64-byte NUL-padded wire field.
pub fn pad_type_identifier(identifier: &str) -> [u8; TYPE_IDENTIFIER_WIDTH] {
    let mut buf = [0u8; TYPE_IDENTIFIER_WIDTH];
    let bytes = identifier.as_bytes();
    let len = bytes.len().min(TYPE_IDENTIFIER_WIDTH);
    buf[..len].copy_from_slice(&bytes[..len]);
    buf
}

/// Strips trailing NUL padding and decodes UTF-8, as the parser does on read.
pub fn unpad_type_identifier(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}
