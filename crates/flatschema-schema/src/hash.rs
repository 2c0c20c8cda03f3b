///
/// FNV-1a 64-bit hash (compile-time safe).
///
/// Used only for **static, non-cryptographic identifiers**: the raw entity
/// hash that seeds entity numeric IDs and UIDs. The output is part of the
/// persisted model contract, so the constants below must never change.
///
/// Reference: Fowler–Noll–Vo hash, FNV-1a variant (64-bit, prime = 0x100000001b3)
///

#[allow(clippy::unreadable_literal)]
const OFFSET_BASIS: u64 = 0xcbf29ce484222325;

#[allow(clippy::unreadable_literal)]
const PRIME: u64 = 0x100000001b3;

#[must_use]
pub const fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash = OFFSET_BASIS;
    let mut i = 0;

    while i < bytes.len() {
        hash ^= bytes[i] as u64;
        hash = hash.wrapping_mul(PRIME);
        i += 1;
    }

    hash
}

///
/// Fnv1a64
/// Streaming form of `fnv1a_64`; writing several slices is equivalent
/// to hashing their concatenation.
///

#[derive(Clone, Copy, Debug)]
pub struct Fnv1a64(u64);

impl Fnv1a64 {
    #[must_use]
    pub const fn new() -> Self {
        Self(OFFSET_BASIS)
    }

    pub fn write(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.0 ^= u64::from(*byte);
            self.0 = self.0.wrapping_mul(PRIME);
        }
    }

    #[must_use]
    pub const fn finish(self) -> u64 {
        self.0
    }
}

impl Default for Fnv1a64 {
    fn default() -> Self {
        Self::new()
    }
}

/// Raw 64-bit hash of one entity, keyed by `"{namespace} {name}"`.
#[must_use]
pub fn entity_hash(namespace: &str, name: &str) -> u64 {
    let mut hasher = Fnv1a64::new();
    hasher.write(namespace.as_bytes());
    hasher.write(b" ");
    hasher.write(name.as_bytes());

    hasher.finish()
}

///
/// TESTS
///
