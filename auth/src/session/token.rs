use std::fmt;
use std::fmt::Write as _;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::rand_core::RngCore;

/// Opaque session token.
///
/// Generated tokens carry 256 bits from the OS random source, hex encoded.
/// Tokens presented by clients are wrapped as-is; they are only ever compared,
/// never parsed.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    const ENTROPY_BYTES: usize = 32;

    /// Generate a fresh random token.
    pub fn generate() -> Self {
        let mut bytes = [0u8; Self::ENTROPY_BYTES];
        OsRng.fill_bytes(&mut bytes);

        let mut encoded = String::with_capacity(Self::ENTROPY_BYTES * 2);
        for byte in bytes {
            // Writing into a String cannot fail
            let _ = write!(encoded, "{:02x}", byte);
        }

        Self(encoded)
    }

    /// Wrap a token received from a client.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens are bearer secrets; keep them out of logs and panics.
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}
