//! Injected randomness for the handshake driver.
//!
//! The driver needs exactly one kind of randomness: the 28 random bytes
//! behind the timestamp in the hello random. The source is handed to
//! [`DtlsClientProtocol::new`](crate::DtlsClientProtocol::new) rather than
//! pulled from a process-wide singleton, and can be seeded so a handshake
//! fixture replays byte-for-byte.

use std::fmt;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Byte source for the client hello random.
///
/// With a seed, bytes come from a deterministic `StdRng` stream; without
/// one, from the thread-local generator.
pub struct SeededRng {
    inner: Option<StdRng>,
}

impl SeededRng {
    /// Create a byte source, deterministic when `seed` is `Some`.
    pub fn new(seed: Option<u64>) -> Self {
        let inner = seed.map(StdRng::seed_from_u64);
        Self { inner }
    }

    /// Fill `dest` with random bytes.
    pub fn fill_bytes(&mut self, dest: &mut [u8]) {
        match self.inner.as_mut() {
            Some(rng) => rng.fill_bytes(dest),
            None => rand::rng().fill_bytes(dest),
        }
    }
}

impl fmt::Debug for SeededRng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = if self.inner.is_some() {
            "seeded"
        } else {
            "thread"
        };
        write!(f, "SeededRng({})", mode)
    }
}
